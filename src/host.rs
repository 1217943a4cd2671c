// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! File system module host.
//!
//! Every module is transformed at most once, either because it was
//! discovered under the project directory or because another module
//! required it first. Declarative modules are then linked: their static
//! imports go through `resolve_id`, which may redirect them to a proxy.

use esmify_commonjs::dynamic::normalize_path;
use esmify_commonjs::{
    CommonJsPlugin, CommonJsType, InteropError, ModuleClassification, ModuleHost, ModuleMeta, ResolvedId,
    TransformOutput,
};
use esmify_syntax::ast::{ExportNamedDeclaration, Statement};
use esmify_syntax::EditBuffer;
use parking_lot::Mutex;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Extensions probed when resolving and collected during discovery.
pub const EXTENSIONS: &[&str] = &[".js", ".cjs", ".mjs", ".json"];

type Slot = Arc<OnceLock<Result<Option<TransformOutput>, InteropError>>>;

/// Outcome of one module.
#[derive(Debug)]
pub struct ModuleResult {
    pub id: String,
    pub result: Result<Option<TransformOutput>, InteropError>,
}

/// Transforms the modules of one project directory.
pub struct FsHost {
    plugin: CommonJsPlugin,
    modules: Mutex<HashMap<String, Slot>>,
    /// Declarative modules whose imports were redirected
    linked: Mutex<HashMap<String, Result<TransformOutput, InteropError>>>,
}

impl FsHost {
    pub fn new(plugin: CommonJsPlugin) -> Self {
        Self {
            plugin,
            modules: Mutex::new(HashMap::new()),
            linked: Mutex::new(HashMap::new()),
        }
    }

    pub fn plugin(&self) -> &CommonJsPlugin {
        &self.plugin
    }

    fn slot(&self, id: &str) -> Slot {
        let mut modules = self.modules.lock();
        Arc::clone(modules.entry(id.to_string()).or_default())
    }

    fn transform_file(&self, id: &str) -> Result<Option<TransformOutput>, InteropError> {
        let code = std::fs::read_to_string(id).map_err(|err| InteropError::io(Path::new(id), err))?;
        debug!(id, "transforming");
        self.plugin.transform(&code, id, self)
    }

    /// Transforms `id` unless that already happened, and returns the outcome.
    pub fn transform(&self, id: &str) -> Result<Option<TransformOutput>, InteropError> {
        self.slot(id).get_or_init(|| self.transform_file(id)).clone()
    }

    /// Transforms every file in parallel, then links the declarative
    /// ones.
    pub fn transform_all(&self, files: &[PathBuf]) -> Vec<ModuleResult> {
        files.par_iter().for_each(|path| {
            let id = path.to_string_lossy();
            let _ = self.transform(&id);
        });
        files.par_iter().for_each(|path| self.link(&path.to_string_lossy()));
        self.results()
    }

    /// Redirects the static imports of declarative module `id`. Must run
    /// after `id` was transformed.
    pub fn link(&self, id: &str) {
        let code = match self.slot(id).get() {
            Some(Ok(Some(output))) if output.classification == ModuleClassification::Declarative => {
                Ok(output.code.clone())
            }
            Some(Ok(None)) if self.plugin.classification(id) == Some(ModuleClassification::Declarative) => {
                std::fs::read_to_string(id).map_err(|err| InteropError::io(Path::new(id), err))
            }
            _ => return,
        };
        let linked = code.and_then(|code| self.redirect_imports(&code, id));
        match linked {
            Ok(None) => {}
            Ok(Some(output)) => {
                self.linked.lock().insert(id.to_string(), Ok(output));
            }
            Err(err) => {
                self.linked.lock().insert(id.to_string(), Err(err));
            }
        }
    }

    fn redirect_imports(&self, code: &str, id: &str) -> Result<Option<TransformOutput>, InteropError> {
        let program = esmify_syntax::parse_module(code).map_err(|err| InteropError::parse(id, err))?;
        let mut edit = EditBuffer::new(code);
        let mut redirected = false;
        for statement in &program.body {
            let source = match statement {
                Statement::Import(import) => &import.source,
                Statement::ExportAll(export) => &export.source,
                Statement::ExportNamed(ExportNamedDeclaration {
                    source: Some(source), ..
                }) => source,
                _ => continue,
            };
            let Some(target) = self.plugin.resolve_id(&source.value, Some(id), self)? else {
                continue;
            };
            if target == source.value {
                continue;
            }
            debug!(id, from = %source.value, to = %target.escape_debug(), "redirected import");
            let literal = serde_json::Value::String(target).to_string();
            edit.overwrite(source.span.start, source.span.end, literal)
                .map_err(|err| InteropError::transform(id, err))?;
            redirected = true;
        }
        if !redirected {
            return Ok(None);
        }
        Ok(Some(TransformOutput {
            code: edit.to_string(),
            map: self.plugin.options().source_map.then(|| edit.generate_map(id, true)),
            meta: ModuleMeta {
                commonjs: Some(CommonJsType::NotCommonJs),
            },
            classification: ModuleClassification::Declarative,
            synthetic_named_exports: None,
        }))
    }

    /// Every module transformed so far, including the ones only reached
    /// through `require` or `resolve_id`, sorted by id. Linked modules
    /// report their redirected code.
    pub fn results(&self) -> Vec<ModuleResult> {
        let modules: Vec<(String, Slot)> = self
            .modules
            .lock()
            .iter()
            .map(|(id, slot)| (id.clone(), Arc::clone(slot)))
            .collect();
        let linked = self.linked.lock();
        let mut results: Vec<ModuleResult> = modules
            .into_iter()
            .filter_map(|(id, slot)| {
                let result = match linked.get(&id) {
                    Some(result) => result.clone().map(Some),
                    None => slot.get().cloned()?,
                };
                Some(ModuleResult { id, result })
            })
            .collect();
        results.sort_by(|a, b| a.id.cmp(&b.id));
        results
    }

    /// Loads every synthetic module the outputs refer to, following the
    /// synthetic modules' own imports.
    pub fn load_synthetic(&self, results: &[ModuleResult]) -> Result<BTreeMap<String, String>, InteropError> {
        let mut pending: Vec<String> = results
            .iter()
            .filter_map(|module| module.result.as_ref().ok()?.as_ref())
            .flat_map(|output| synthetic_imports(&output.code))
            .collect();
        let mut loaded = BTreeMap::new();
        while let Some(id) = pending.pop() {
            if loaded.contains_key(&id) {
                continue;
            }
            if let Some(code) = self.plugin.load(&id)? {
                pending.extend(synthetic_imports(&code));
                loaded.insert(id, code);
            }
        }
        Ok(loaded)
    }
}

impl ModuleHost for FsHost {
    fn resolve(&self, source: &str, importer: &str) -> Option<ResolvedId> {
        if !(source.starts_with("./") || source.starts_with("../") || source.starts_with('/')) {
            return Some(ResolvedId::external(source));
        }
        let parent = Path::new(importer).parent().unwrap_or(Path::new("."));
        let resolved = resolve_file(&normalize_path(&parent.join(source)))?;
        trace!(source, importer, resolved = %resolved.display(), "resolved");
        Some(ResolvedId::internal(resolved.to_string_lossy()))
    }

    fn load(&self, id: &str) -> Result<(), InteropError> {
        self.transform(id).map(|_| ())
    }
}

/// Probes the exact path, then with each extension, then the directory
/// index.
fn resolve_file(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    for ext in EXTENSIONS {
        let mut file_name = path.file_name()?.to_os_string();
        file_name.push(ext);
        let with_ext = path.with_file_name(file_name);
        if with_ext.is_file() {
            return Some(with_ext);
        }
    }
    if path.is_dir() {
        return EXTENSIONS
            .iter()
            .map(|ext| path.join(format!("index{ext}")))
            .find(|index| index.is_file());
    }
    None
}

/// Module files under `root`, skipping `node_modules` and hidden
/// directories.
pub fn discover(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            entry.depth() == 0 || !(name == "node_modules" || (entry.file_type().is_dir() && name.starts_with('.')))
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            let name = path.to_string_lossy();
            EXTENSIONS.iter().any(|ext| name.ends_with(ext))
        })
        .collect();
    files.sort();
    files
}

/// Synthetic ids (`"\u0000..."`) quoted in `code`.
fn synthetic_imports(code: &str) -> Vec<String> {
    const MARKER: &str = "\"\\u0000";
    let mut ids = Vec::new();
    let mut rest = code;
    while let Some(start) = rest.find(MARKER) {
        let literal = &rest[start..];
        let Some(end) = literal[1..].find('"') else {
            break;
        };
        if let Ok(id) = serde_json::from_str::<String>(&literal[..end + 2]) {
            ids.push(id);
        }
        rest = &literal[end + 2..];
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use esmify_commonjs::{CommonJsOptions, StrictRequires};
    use std::fs;
    use tempfile::TempDir;

    fn project(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (path, code) in files {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, code).unwrap();
        }
        dir
    }

    fn host(dir: &TempDir) -> FsHost {
        let options = CommonJsOptions {
            cwd: Some(dir.path().to_path_buf()),
            ..CommonJsOptions::default()
        };
        FsHost::new(CommonJsPlugin::new(options).unwrap())
    }

    #[test]
    fn test_discover_skips_node_modules() {
        let dir = project(&[
            ("index.js", ""),
            ("lib/util.cjs", ""),
            ("lib/readme.md", ""),
            ("node_modules/dep/index.js", ""),
            (".cache/x.js", ""),
        ]);
        let files: Vec<_> = discover(dir.path())
            .into_iter()
            .map(|path| path.strip_prefix(dir.path()).unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(files, vec!["index.js", "lib/util.cjs"]);
    }

    #[test]
    fn test_resolve_probes_extensions_and_index() {
        let dir = project(&[("a.js", ""), ("lib/index.js", ""), ("data.json", "{}")]);
        let host = host(&dir);
        let importer = dir.path().join("main.js").to_string_lossy().into_owned();
        let resolve = |source: &str| host.resolve(source, &importer).unwrap();

        assert_eq!(resolve("./a").id, dir.path().join("a.js").to_string_lossy());
        assert_eq!(resolve("./lib").id, dir.path().join("lib/index.js").to_string_lossy());
        assert_eq!(resolve("./data.json").id, dir.path().join("data.json").to_string_lossy());
        assert_eq!(resolve("lodash"), ResolvedId::external("lodash"));
        assert!(host.resolve("./missing", &importer).is_none());
    }

    #[test]
    fn test_transform_all_and_synthetic_modules() {
        let dir = project(&[
            ("main.js", "const dep = require('./dep');\nmodule.exports = dep;"),
            ("dep.js", "exports.value = global.value;"),
        ]);
        let host = host(&dir);
        let results = host.transform_all(&discover(dir.path()));
        assert_eq!(results.len(), 2);
        for module in &results {
            let output = module.result.as_ref().unwrap().as_ref().unwrap();
            assert_eq!(output.classification, ModuleClassification::LegacyUnwrapped);
        }

        let synthetic = host.load_synthetic(&results).unwrap();
        let dep = dir.path().join("dep.js").to_string_lossy().into_owned();
        assert!(synthetic.contains_key(&format!("\0{dep}?commonjs-proxy")));
        assert!(synthetic.contains_key(&format!("\0{dep}?commonjs-exports")));
        assert!(synthetic.contains_key("\0commonjsHelpers.js"));
    }

    #[test]
    fn test_es_import_of_wrapped_module_is_redirected() {
        let dir = project(&[
            ("main.js", "import b from './b.js';\nexport * from './b.js';\nconsole.log(b);"),
            ("b.js", "module.exports = 1;"),
        ]);
        let options = CommonJsOptions {
            cwd: Some(dir.path().to_path_buf()),
            strict_requires: StrictRequires::Always,
            ..CommonJsOptions::default()
        };
        let host = FsHost::new(CommonJsPlugin::new(options).unwrap());
        let results = host.transform_all(&discover(dir.path()));

        let b = dir.path().join("b.js").to_string_lossy().into_owned();
        let es_import = format!("\0{b}?commonjs-es-import");
        let literal = serde_json::to_string(&es_import).unwrap();
        let output = |name: &str| {
            let module = results.iter().find(|module| module.id.ends_with(name)).unwrap();
            module.result.clone().unwrap().unwrap()
        };
        assert!(output("b.js").code.ends_with("export { requireB as __require };"));
        let main = output("main.js");
        assert_eq!(main.classification, ModuleClassification::Declarative);
        assert_eq!(
            main.code,
            format!("import b from {literal};\nexport * from {literal};\nconsole.log(b);")
        );

        let synthetic = host.load_synthetic(&results).unwrap();
        let proxy = &synthetic[&es_import];
        assert!(proxy.contains("var bExports = requireB();"));
        assert!(synthetic.contains_key("\0commonjsHelpers.js"));
    }

    #[test]
    fn test_imports_of_unwrapped_modules_are_kept() {
        let dir = project(&[
            ("main.js", "import b from './b.js';\nconsole.log(b);"),
            ("b.js", "module.exports = 1;"),
        ]);
        let host = host(&dir);
        let results = host.transform_all(&discover(dir.path()));
        let main = results.iter().find(|module| module.id.ends_with("main.js")).unwrap();
        assert!(main.result.as_ref().unwrap().is_none());
    }

    #[test]
    fn test_synthetic_imports() {
        let code = "import * as h from \"\\u0000commonjsHelpers.js\";\nimport x from \"./x\";\nimport \"\\u0000/a.js?commonjs-proxy\";";
        assert_eq!(
            synthetic_imports(code),
            vec!["\0commonjsHelpers.js", "\0/a.js?commonjs-proxy"]
        );
    }
}
