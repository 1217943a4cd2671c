//! In-memory module graph shared by the integration tests.
//!
//! Modules are transformed the first time they are loaded, the way a
//! bundler drives the plugin.

#![allow(dead_code)]

use esmify_commonjs::dynamic::normalize_path;
use esmify_commonjs::{CommonJsOptions, CommonJsPlugin, ModuleHost, ResolvedId, TransformOutput};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

pub struct MemoryHost {
    pub plugin: CommonJsPlugin,
    files: HashMap<String, String>,
    started: Mutex<HashSet<String>>,
    outputs: Mutex<HashMap<String, Option<TransformOutput>>>,
}

impl MemoryHost {
    /// Files are keyed by absolute id. The plugin's cwd defaults to `/app`.
    pub fn new(options: CommonJsOptions, files: &[(&str, &str)]) -> Self {
        let options = CommonJsOptions {
            cwd: options.cwd.clone().or_else(|| Some(PathBuf::from("/app"))),
            ..options
        };
        Self {
            plugin: CommonJsPlugin::new(options).unwrap(),
            files: files
                .iter()
                .map(|(id, code)| (id.to_string(), code.to_string()))
                .collect(),
            started: Mutex::new(HashSet::new()),
            outputs: Mutex::new(HashMap::new()),
        }
    }

    pub fn build(&self, entry: &str) -> esmify_commonjs::Result<()> {
        self.load(entry)
    }

    pub fn output(&self, id: &str) -> Option<TransformOutput> {
        self.outputs.lock().get(id).cloned().flatten()
    }

    /// Transformed code of `id`; panics when the module was left as is.
    pub fn code(&self, id: &str) -> String {
        match self.output(id) {
            Some(output) => output.code,
            None => panic!("{id} was not transformed"),
        }
    }

    /// Source of a synthetic module.
    pub fn synthetic(&self, id: &str) -> String {
        match self.plugin.load(id).unwrap() {
            Some(code) => code,
            None => panic!("{id:?} is not a synthetic module"),
        }
    }
}

impl ModuleHost for MemoryHost {
    fn resolve(&self, source: &str, importer: &str) -> Option<ResolvedId> {
        if !source.starts_with('.') && !source.starts_with('/') {
            return Some(ResolvedId::external(source));
        }
        let dir = Path::new(importer).parent()?;
        let base = normalize_path(&dir.join(source)).to_string_lossy().into_owned();
        [
            base.clone(),
            format!("{base}.js"),
            format!("{base}.json"),
            format!("{base}/index.js"),
        ]
        .into_iter()
        .find(|candidate| self.files.contains_key(candidate))
        .map(ResolvedId::internal)
    }

    fn load(&self, id: &str) -> esmify_commonjs::Result<()> {
        if !self.started.lock().insert(id.to_string()) {
            return Ok(());
        }
        let Some(code) = self.files.get(id) else {
            return Ok(());
        };
        let output = self.plugin.transform(code, id, self)?;
        self.outputs.lock().insert(id.to_string(), output);
        Ok(())
    }
}
