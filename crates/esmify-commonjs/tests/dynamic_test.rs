//! Requires whose target is only known at run time.

mod common;

use common::MemoryHost;
use esmify_commonjs::{CommonJsOptions, ModuleClassification, DYNAMIC_MODULES_ID};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MAIN: &str = "module.exports = function (name) {\n\treturn require('./lib/' + name);\n};";

struct Project {
    _dir: TempDir,
    root: PathBuf,
}

impl Project {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        fs::create_dir_all(root.join("lib")).unwrap();
        fs::write(root.join("main.js"), MAIN).unwrap();
        fs::write(root.join("lib/a.js"), "module.exports = 'a';").unwrap();
        fs::write(root.join("lib/b.json"), "{\"b\": true}").unwrap();
        Self { _dir: dir, root }
    }

    fn id(&self, relative: &str) -> String {
        self.root.join(relative).to_string_lossy().into_owned()
    }

    fn host(&self, root: Option<&Path>) -> MemoryHost {
        let options = CommonJsOptions {
            cwd: Some(self.root.clone()),
            dynamic_require_targets: vec!["lib/*.js".to_string(), "lib/*.json".to_string()],
            dynamic_require_root: root.map(Path::to_path_buf),
            ..CommonJsOptions::default()
        };
        let main = self.id("main.js");
        let a = self.id("lib/a.js");
        MemoryHost::new(options, &[(&main, MAIN), (&a, "module.exports = 'a';")])
    }
}

#[test]
fn test_registry_module_lists_targets() {
    let project = Project::new();
    let host = project.host(None);
    let table = host.plugin.dynamic_table();
    assert!(table.is_enabled());
    let keys: Vec<&str> = table.modules().map(|(key, _)| key).collect();
    assert_eq!(keys, vec!["/lib/a.js", "/lib/b.json"]);

    let registry = host.synthetic(DYNAMIC_MODULES_ID);
    assert!(registry.contains(&format!(
        "import {{ __require as require0 }} from \"{}\";",
        project.id("lib/a.js")
    )));
    assert!(registry.contains(&format!("import json1 from \"{}\";", project.id("lib/b.json"))));
    assert!(registry.contains("\t\t\"/lib/a.js\": require0,\n\t\t\"/lib/b.json\": function () { return json1; }"));
    assert!(registry.contains("export function createCommonjsRequire(originalModuleDir) {"));
    assert!(registry.contains("Could not dynamically require"));
}

#[test]
fn test_dynamic_require_uses_registry() {
    let project = Project::new();
    let host = project.host(None);
    host.build(&project.id("main.js")).unwrap();
    let main = host.code(&project.id("main.js"));
    assert!(main.starts_with("import { createCommonjsRequire } from \"\\u0000commonjs-dynamic-modules\";"));
    assert!(main.contains("return createCommonjsRequire(\"/\")('./lib/' + name);"));
}

#[test]
fn test_targets_are_wrapped() {
    let project = Project::new();
    let host = project.host(None);
    let a = project.id("lib/a.js");
    host.build(&a).unwrap();
    let output = host.output(&a).unwrap();
    assert_eq!(output.classification, ModuleClassification::LegacyWrapped);
    assert!(output.code.ends_with("export { requireA as __require };"));
}

#[test]
fn test_requiring_module_outside_root_fails() {
    let project = Project::new();
    let host = project.host(Some(Path::new("lib")));
    let err = host.build(&project.id("main.js")).unwrap_err();
    assert_eq!(err.code(), "DYNAMIC_REQUIRE_OUTSIDE_ROOT");
    assert_eq!(err.id(), Some(project.id("main.js").as_str()));
}

#[test]
fn test_ignore_dynamic_requires_falls_back_to_require() {
    let project = Project::new();
    let options = CommonJsOptions {
        cwd: Some(project.root.clone()),
        dynamic_require_targets: vec!["lib/*.js".to_string()],
        ignore_dynamic_requires: true,
        ..CommonJsOptions::default()
    };
    let host = MemoryHost::new(options, &[]);
    assert!(host.synthetic(DYNAMIC_MODULES_ID).contains("\t\treturn require(path);"));
}

#[test]
fn test_dynamic_membership_overrides_exclude_but_not_ignore() {
    let project = Project::new();
    let a = project.id("lib/a.js");
    let options = CommonJsOptions {
        cwd: Some(project.root.clone()),
        dynamic_require_targets: vec!["lib/*.js".to_string()],
        exclude: vec!["lib/**".to_string()],
        ..CommonJsOptions::default()
    }
    .ignore_with(|id| id == "fs");
    let source = "var fs = require('fs');\nmodule.exports = fs;";
    let host = MemoryHost::new(options, &[(a.as_str(), source)]);
    host.build(&a).unwrap();

    let output = host.output(&a).unwrap();
    assert_eq!(output.classification, ModuleClassification::LegacyWrapped);
    assert!(output.code.contains("\tvar fs = require('fs');"));
}

#[test]
fn test_dynamic_prefix_outside_table_fails() {
    let project = Project::new();
    let options = CommonJsOptions {
        cwd: Some(project.root.clone()),
        dynamic_require_targets: vec!["lib/*.js".to_string()],
        ..CommonJsOptions::default()
    };
    let main = project.id("main.js");
    let escaping = "module.exports = function (name) {\n\treturn require(`../vendor/${name}`);\n};";
    let host = MemoryHost::new(options.clone(), &[(main.as_str(), escaping)]);
    let err = host.build(&main).unwrap_err();
    assert_eq!(err.code(), "DYNAMIC_REQUIRE_OUTSIDE_ROOT");

    let nested = "module.exports = function (name) {\n\treturn require('./lib/../lib/' + name);\n};";
    let host = MemoryHost::new(options, &[(main.as_str(), nested)]);
    host.build(&main).unwrap();
}
