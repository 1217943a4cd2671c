// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The dynamic require registry.
//!
//! Requires whose target is only known at run time are resolved against a
//! table of every file configured in `dynamicRequireTargets`. The table is
//! keyed by paths relative to the common directory of all targets and the
//! configured root, always starting with `/`, and is emitted as the
//! `\0commonjs-dynamic-modules` module.

use crate::error::{InteropError, Result};
use crate::filter::normalize_path_slashes;
use globset::GlobBuilder;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Name of the stub export used when no targets are configured.
pub const COMMONJS_REQUIRE_EXPORT: &str = "commonjsRequire";

/// Name of the factory export used when targets are configured.
pub const CREATE_COMMONJS_REQUIRE_EXPORT: &str = "createCommonjsRequire";

const FAILED_REQUIRE_ERROR: &str = "throw new Error('Could not dynamically require \"' + path + '\". Please configure the dynamicRequireTargets or/and ignoreDynamicRequires options of esmify appropriately for this require call to work.');";

/// Table of modules reachable through non-constant requires.
#[derive(Debug, Clone, Default)]
pub struct DynamicRequireTable {
    root: PathBuf,
    common_dir: Option<PathBuf>,
    modules: BTreeMap<String, PathBuf>,
}

impl DynamicRequireTable {
    /// An empty table rooted at `root`.
    pub fn empty(root: &Path) -> Self {
        Self {
            root: normalize_path(root),
            common_dir: None,
            modules: BTreeMap::new(),
        }
    }

    /// Expands `targets` (globs, `!` negates) relative to `cwd` and builds
    /// the table. Directories contribute their package entry point.
    pub fn build(targets: &[String], root: &Path, cwd: &Path) -> Result<Self> {
        let root = normalize_path(&cwd.join(root));
        let mut by_path: Vec<(PathBuf, PathBuf)> = Vec::new();
        let mut dirs: Vec<PathBuf> = Vec::new();

        for target in targets {
            let (negated, pattern) = match target.strip_prefix('!') {
                Some(pattern) => (true, pattern),
                None => (false, target.as_str()),
            };
            for path in expand_pattern(pattern, cwd)? {
                let mut entries = Vec::new();
                if path.is_dir() {
                    let module = normalize_path(&path.join(package_entry_point(&path)));
                    entries.push((path.clone(), module.clone()));
                    entries.push((module.clone(), module));
                    if !negated {
                        dirs.push(path);
                    }
                } else {
                    if !negated && let Some(parent) = path.parent() {
                        dirs.push(parent.to_path_buf());
                    }
                    entries.push((path.clone(), path));
                }
                for (key, module) in entries {
                    by_path.retain(|(known, _)| *known != key);
                    if !negated {
                        by_path.push((key, module));
                    }
                }
            }
        }

        if dirs.is_empty() {
            return Ok(Self::empty(&root));
        }
        dirs.push(root.clone());
        let common_dir = common_dir(&dirs);

        let mut modules = BTreeMap::new();
        for (path, module) in by_path {
            modules.insert(virtual_path_in(&path, &common_dir), module);
        }
        info!(
            common_dir = %common_dir.display(),
            modules = modules.len(),
            "built dynamic require table"
        );
        Ok(Self {
            root,
            common_dir: Some(common_dir),
            modules,
        })
    }

    /// True when at least one target is configured.
    pub fn is_enabled(&self) -> bool {
        !self.modules.is_empty()
    }

    /// The configured root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Common directory of the targets and the root.
    pub fn common_dir(&self) -> Option<&Path> {
        self.common_dir.as_deref()
    }

    /// Keys and module files, in key order.
    pub fn modules(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.modules.iter().map(|(key, path)| (key.as_str(), path.as_path()))
    }

    /// Returns true if `id` is one of the table's modules.
    pub fn contains_module(&self, id: &str) -> bool {
        self.modules.values().any(|path| path_matches_id(path, id))
    }

    /// The `/`-anchored table key of `path`.
    pub fn virtual_path(&self, path: &Path) -> String {
        match &self.common_dir {
            Some(common_dir) => virtual_path_in(path, common_dir),
            None => normalize_path_slashes(&path.to_string_lossy()),
        }
    }

    /// Resolves a table key such as `a/b.js` or `/a/b.js`.
    ///
    /// Keys that climb above the common directory are a configuration error.
    pub fn lookup(&self, key: &str) -> Result<Option<&Path>> {
        let Some(common_dir) = &self.common_dir else {
            return Ok(None);
        };
        let mut parts: Vec<&str> = Vec::new();
        for part in key.split(['/', '\\']) {
            match part {
                "" | "." => {}
                ".." => {
                    if parts.pop().is_none() {
                        let attempted = normalize_path(&common_dir.join(key.trim_start_matches('/')));
                        return Err(outside_root(&attempted.to_string_lossy(), &common_dir.to_string_lossy()));
                    }
                }
                part => parts.push(part),
            }
        }
        let key = format!("/{}", parts.join("/"));
        Ok(self.modules.get(&key).map(PathBuf::as_path))
    }

    /// Fails if module `id`, which performs dynamic requires, lies outside
    /// the configured root.
    pub fn check_within_root(&self, id: &str) -> Result<()> {
        let path = Path::new(id);
        if path.starts_with(&self.root) {
            return Ok(());
        }
        Err(outside_root(id, &self.root.to_string_lossy()))
    }

    /// Source of the `\0commonjs-dynamic-modules` module.
    pub fn registry_module_source(&self, ignore_dynamic_requires: bool) -> String {
        if !self.is_enabled() {
            return format!("export function {COMMONJS_REQUIRE_EXPORT}(path) {{\n\t{FAILED_REQUIRE_ERROR}\n}}");
        }

        let mut code = String::new();
        for (index, (_, module)) in self.modules.iter().enumerate() {
            let id = json_string(&module.to_string_lossy());
            if is_json(module) {
                let _ = writeln!(code, "import json{index} from {id};");
            } else {
                let _ = writeln!(code, "import {{ __require as require{index} }} from {id};");
            }
        }

        code.push_str("\nvar dynamicModules;\n\nfunction getDynamicModules() {\n\treturn dynamicModules || (dynamicModules = {\n");
        let props: Vec<String> = self
            .modules
            .iter()
            .enumerate()
            .map(|(index, (key, module))| {
                let factory = if is_json(module) {
                    format!("function () {{ return json{index}; }}")
                } else {
                    format!("require{index}")
                };
                format!("\t\t{}: {factory}", json_string(key))
            })
            .collect();
        code.push_str(&props.join(",\n"));
        code.push_str("\n\t});\n}\n\n");

        let fallback = if ignore_dynamic_requires {
            "return require(path);"
        } else {
            FAILED_REQUIRE_ERROR
        };
        let _ = write!(
            code,
            "export function {CREATE_COMMONJS_REQUIRE_EXPORT}(originalModuleDir) {{
	function handleRequire(path) {{
		var resolvedPath = commonjsResolve(path, originalModuleDir);
		if (resolvedPath !== null) {{
			return getDynamicModules()[resolvedPath]();
		}}
		{fallback}
	}}
	handleRequire.resolve = function (path) {{
		var resolvedPath = commonjsResolve(path, originalModuleDir);
		if (resolvedPath !== null) {{
			return resolvedPath;
		}}
		return require.resolve(path);
	}}
	return handleRequire;
}}
"
        );
        code.push_str(RESOLVE_RUNTIME);
        code
    }
}

const RESOLVE_RUNTIME: &str = r"
function commonjsResolve (path, originalModuleDir) {
	var shouldTryNodeModules = isPossibleNodeModulesPath(path);
	path = normalize(path);
	var relPath;
	if (path[0] === '/') {
		originalModuleDir = '';
	}
	var modules = getDynamicModules();
	var checkedExtensions = ['', '.js', '.json'];
	while (true) {
		if (!shouldTryNodeModules) {
			relPath = normalize(originalModuleDir + '/' + path);
		} else {
			relPath = normalize(originalModuleDir + '/node_modules/' + path);
		}

		if (relPath.endsWith('/..')) {
			break;
		}

		for (var extensionIndex = 0; extensionIndex < checkedExtensions.length; extensionIndex++) {
			var resolvedPath = relPath + checkedExtensions[extensionIndex];
			if (modules[resolvedPath]) {
				return resolvedPath;
			}
		}
		if (!shouldTryNodeModules) break;
		var nextDir = normalize(originalModuleDir + '/..');
		if (nextDir === originalModuleDir) break;
		originalModuleDir = nextDir;
	}
	return null;
}

function isPossibleNodeModulesPath (modulePath) {
	var c0 = modulePath[0];
	if (c0 === '/' || c0 === '\\') return false;
	var c1 = modulePath[1], c2 = modulePath[2];
	if ((c0 === '.' && (!c2 || c2 === '/' || c2 === '\\')) ||
		(c0 === '.' && c1 === '.' && (!c2 || c2 === '/' || c2 === '\\'))) return false;
	if (c1 === ':' && (c2 === '/' || c2 === '\\')) return false;
	return true;
}

function normalize (path) {
	path = path.replace(/\\/g, '/');
	var parts = path.split('/');
	var slashed = parts[0] === '';
	for (var i = 1; i < parts.length; i++) {
		if (parts[i] === '.' || parts[i] === '') {
			parts.splice(i--, 1);
		}
	}
	for (var i = 1; i < parts.length; i++) {
		if (parts[i] !== '..') continue;
		if (i > 0 && parts[i - 1] !== '..' && parts[i - 1] !== '.') {
			parts.splice(--i, 2);
			i--;
		}
	}
	path = parts.join('/');
	if (slashed && path[0] !== '/') path = '/' + path;
	else if (path.length === 0) path = '.';
	return path;
}
";

fn outside_root(id: &str, root: &str) -> InteropError {
    let suggested_root = Path::new(id)
        .parent()
        .map(|parent| parent.to_string_lossy().into_owned())
        .unwrap_or_else(|| "/".to_string());
    InteropError::DynamicRequireOutsideRoot {
        id: id.to_string(),
        root: root.to_string(),
        suggested_root,
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

fn path_matches_id(path: &Path, id: &str) -> bool {
    normalize_path_slashes(&path.to_string_lossy()) == normalize_path_slashes(id)
}

/// Quotes `value` as a JavaScript string literal.
pub(crate) fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn virtual_path_in(path: &Path, common_dir: &Path) -> String {
    let path = normalize_path_slashes(&path.to_string_lossy());
    let common = normalize_path_slashes(&common_dir.to_string_lossy());
    let common = common.trim_end_matches('/');
    match path.strip_prefix(common) {
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        Some("") => "/".to_string(),
        _ => path,
    }
}

/// Lexically resolves `.` and `..` components.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Longest directory shared by all `dirs`.
fn common_dir(dirs: &[PathBuf]) -> PathBuf {
    let mut common: Vec<Component<'_>> = dirs[0].components().collect();
    for dir in &dirs[1..] {
        let shared = common
            .iter()
            .zip(dir.components())
            .take_while(|(a, b)| **a == *b)
            .count();
        common.truncate(shared);
    }
    common.into_iter().collect()
}

fn package_entry_point(dir: &Path) -> String {
    let manifest = dir.join("package.json");
    let main = std::fs::read_to_string(&manifest)
        .ok()
        .and_then(|text| serde_json::from_str::<serde_json::Value>(&text).ok())
        .and_then(|json| json.get("main").and_then(|main| main.as_str()).map(str::to_string));
    match main {
        Some(main) if !main.is_empty() => main,
        _ => {
            debug!(dir = %dir.display(), "no package main, using index.js");
            "index.js".to_string()
        }
    }
}

fn has_glob_syntax(part: &str) -> bool {
    part.contains(['*', '?', '[', '{'])
}

/// Expands one glob (or plain path) into existing paths.
fn expand_pattern(pattern: &str, cwd: &Path) -> Result<Vec<PathBuf>> {
    let pattern = normalize_path_slashes(pattern);
    let absolute = if Path::new(&pattern).is_absolute() {
        pattern
    } else {
        format!(
            "{}/{}",
            normalize_path_slashes(&cwd.to_string_lossy()).trim_end_matches('/'),
            pattern.trim_start_matches("./")
        )
    };

    if !has_glob_syntax(&absolute) {
        let path = normalize_path(Path::new(&absolute));
        return Ok(if path.exists() { vec![path] } else { Vec::new() });
    }

    let base: Vec<&str> = absolute.split('/').take_while(|part| !has_glob_syntax(part)).collect();
    let base = match base.join("/") {
        base if base.is_empty() => "/".to_string(),
        base => base,
    };
    let matcher = GlobBuilder::new(&normalize_path_slashes(&normalize_path(Path::new(&absolute)).to_string_lossy()))
        .literal_separator(true)
        .build()
        .map_err(|err| InteropError::invalid_option("dynamicRequireTargets", err.to_string()))?
        .compile_matcher();

    let mut matches = Vec::new();
    for entry in WalkDir::new(&base).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if matcher.is_match(normalize_path_slashes(&path.to_string_lossy())) {
            matches.push(path.to_path_buf());
        }
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("lib/a")).unwrap();
        fs::create_dir_all(root.join("lib/pkg")).unwrap();
        fs::write(root.join("lib/a/b.js"), "module.exports = 1;").unwrap();
        fs::write(root.join("lib/a/c.js"), "module.exports = 2;").unwrap();
        fs::write(root.join("lib/data.json"), "{}").unwrap();
        fs::write(root.join("lib/pkg/package.json"), r#"{ "main": "main.js" }"#).unwrap();
        fs::write(root.join("lib/pkg/main.js"), "module.exports = 3;").unwrap();
        dir
    }

    fn targets(patterns: &[&str]) -> Vec<String> {
        patterns.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_empty_table_is_disabled() {
        let dir = fixture();
        let table = DynamicRequireTable::build(&[], dir.path(), dir.path()).unwrap();
        assert!(!table.is_enabled());
        let source = table.registry_module_source(false);
        assert!(source.contains("export function commonjsRequire(path)"));
        assert!(source.contains("ignoreDynamicRequires options of esmify"));
        assert!(!source.contains("rollup"));
    }

    #[test]
    fn test_lookup_relative_to_root() {
        let dir = fixture();
        let table = DynamicRequireTable::build(&targets(&["lib/a/*.js"]), dir.path(), dir.path()).unwrap();
        let root = normalize_path(dir.path());
        assert_eq!(table.common_dir(), Some(root.as_path()));

        let found = table.lookup("lib/a/b.js").unwrap().unwrap();
        assert_eq!(found, root.join("lib/a/b.js"));
        assert_eq!(table.lookup("/lib/a/./c.js").unwrap().unwrap(), root.join("lib/a/c.js"));
        assert_eq!(table.lookup("lib/missing.js").unwrap(), None);
    }

    #[test]
    fn test_lookup_outside_root_fails() {
        let dir = fixture();
        let table = DynamicRequireTable::build(&targets(&["lib/a/*.js"]), dir.path(), dir.path()).unwrap();
        let err = table.lookup("../elsewhere.js").unwrap_err();
        assert_eq!(err.code(), "DYNAMIC_REQUIRE_OUTSIDE_ROOT");
    }

    #[test]
    fn test_negation_and_directories() {
        let dir = fixture();
        let table = DynamicRequireTable::build(
            &targets(&["lib/**/*.js", "!lib/a/c.js", "lib/pkg", "lib/data.json"]),
            dir.path(),
            dir.path(),
        )
        .unwrap();
        let keys: Vec<&str> = table.modules().map(|(key, _)| key).collect();
        assert_eq!(
            keys,
            vec!["/lib/a/b.js", "/lib/data.json", "/lib/pkg", "/lib/pkg/main.js"]
        );
        let root = normalize_path(dir.path());
        assert!(table.contains_module(&root.join("lib/pkg/main.js").to_string_lossy()));
        assert!(!table.contains_module(&root.join("lib/a/c.js").to_string_lossy()));
    }

    #[test]
    fn test_registry_module_source() {
        let dir = fixture();
        let table = DynamicRequireTable::build(&targets(&["lib/a/b.js", "lib/data.json"]), dir.path(), dir.path())
            .unwrap();
        let code = table.registry_module_source(false);
        assert!(code.contains("import { __require as require0 } from"));
        assert!(code.contains("import json1 from"));
        assert!(code.contains("\"/lib/a/b.js\": require0"));
        assert!(code.contains("\"/lib/data.json\": function () { return json1; }"));
        assert!(code.contains("export function createCommonjsRequire(originalModuleDir)"));
        assert!(code.contains("Could not dynamically require"));
        esmify_syntax::parse_module(&code).unwrap();

        let code = table.registry_module_source(true);
        assert!(code.contains("return require(path);"));
    }

    #[test]
    fn test_check_within_root() {
        let table = DynamicRequireTable::empty(Path::new("/project"));
        assert!(table.check_within_root("/project/src/a.js").is_ok());
        let err = table.check_within_root("/other/src/a.js").unwrap_err();
        let InteropError::DynamicRequireOutsideRoot { suggested_root, root, .. } = err else {
            panic!("expected outside root error");
        };
        assert_eq!(root, "/project");
        assert_eq!(suggested_root, "/other/src");
    }

    #[test]
    fn test_common_dir_includes_root() {
        let dirs = vec![PathBuf::from("/a/b/c"), PathBuf::from("/a/b/d"), PathBuf::from("/a/e")];
        assert_eq!(common_dir(&dirs), PathBuf::from("/a"));
        assert_eq!(virtual_path_in(Path::new("/a/b/c/x.js"), Path::new("/a")), "/b/c/x.js");
        assert_eq!(virtual_path_in(Path::new("/a/b"), Path::new("/")), "/a/b");
    }
}
