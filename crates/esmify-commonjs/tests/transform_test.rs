//! Conversion of single modules and their direct requires.

mod common;

use common::MemoryHost;
use esmify_commonjs::{CommonJsOptions, ExportShape, ModuleClassification, TryCatchMode, TryCatchPolicy};

#[test]
fn test_module_exports_replacement() {
    let host = MemoryHost::new(CommonJsOptions::default(), &[("/app/foo.js", "module.exports = 42;")]);
    host.build("/app/foo.js").unwrap();
    let output = host.output("/app/foo.js").unwrap();
    assert_eq!(
        output.code,
        "var foo = 42;\n\nexport default foo;\nexport { foo as __moduleExports };"
    );
    assert_eq!(output.classification, ModuleClassification::LegacyUnwrapped);
    assert_eq!(output.synthetic_named_exports, Some("__moduleExports"));
}

#[test]
fn test_require_of_commonjs_module() {
    let host = MemoryHost::new(
        CommonJsOptions::default(),
        &[
            ("/app/main.js", "const dep = require('./dep');\nmodule.exports = dep.value;"),
            ("/app/dep.js", "exports.value = 1;"),
        ],
    );
    host.build("/app/main.js").unwrap();
    assert_eq!(
        host.code("/app/main.js"),
        "import require$$0 from \"\\u0000/app/dep.js?commonjs-proxy\";\n\n\
         const dep = require$$0;\nvar main = dep.value;\n\n\
         export default main;\nexport { main as __moduleExports };"
    );
    assert_eq!(
        host.synthetic("\0/app/dep.js?commonjs-proxy"),
        "export { __moduleExports as default } from \"/app/dep.js\";"
    );
    assert!(host.plugin.registry().has_named_exports("/app/dep.js"));
}

#[test]
fn test_side_effect_require_becomes_bare_import() {
    let host = MemoryHost::new(
        CommonJsOptions::default(),
        &[
            ("/app/main.js", "require('./polyfill');\nexports.ready = true;"),
            ("/app/polyfill.js", "global.patched = true;"),
        ],
    );
    host.build("/app/main.js").unwrap();
    let main = host.code("/app/main.js");
    assert!(main.contains("import \"\\u0000/app/polyfill.js?commonjs-proxy\";"));
    assert!(!main.contains("require("));
    assert!(host.code("/app/polyfill.js").contains("commonjsHelpers.commonjsGlobal.patched = true;"));
}

#[test]
fn test_external_require() {
    let host = MemoryHost::new(
        CommonJsOptions::default(),
        &[("/app/main.js", "const path = require('path');\nmodule.exports = path.join('a');")],
    );
    host.build("/app/main.js").unwrap();
    assert!(host
        .code("/app/main.js")
        .contains("import require$$0 from \"\\u0000path?commonjs-external\";"));
    assert_eq!(host.synthetic("\0path?commonjs-external"), "export { default } from \"path\";");
}

#[test]
fn test_ignored_require_is_left_alone() {
    let options = CommonJsOptions::default().ignore_with(|id| id == "fs");
    let host = MemoryHost::new(options, &[("/app/main.js", "const fs = require('fs');\nmodule.exports = fs;")]);
    host.build("/app/main.js").unwrap();
    let code = host.code("/app/main.js");
    assert!(code.contains("const fs = require('fs');"));
    assert!(!code.contains("commonjs-external"));
}

#[test]
fn test_try_catch_policies() {
    let code = "let x;\ntry { x = require('optional'); } catch (e) {}\nmodule.exports = x;";
    let run = |policy: TryCatchPolicy| {
        let options = CommonJsOptions {
            ignore_try_catch: policy,
            ..CommonJsOptions::default()
        };
        let host = MemoryHost::new(options, &[("/app/main.js", code)]);
        host.build("/app/main.js").unwrap();
        host.code("/app/main.js")
    };

    let untouched = run(TryCatchPolicy::Fixed(TryCatchMode::Untouched));
    assert!(untouched.contains("x = require('optional');"));
    assert!(!untouched.contains("optional?commonjs-external"));

    let removed = run(TryCatchPolicy::Fixed(TryCatchMode::Remove));
    assert!(removed.contains("x = undefined;"));
    assert!(!removed.contains("import "));

    let converted = run(TryCatchPolicy::Listed(vec!["other".to_string()]));
    assert!(converted.contains("x = require$$0;"));
    assert!(converted.contains("import require$$0 from \"\\u0000optional?commonjs-external\";"));
}

#[test]
fn test_mixed_es_modules() {
    let files = [
        ("/app/main.js", "import a from './a';\nconst b = require('./b');\nexport default a + b;"),
        ("/app/a.js", "export default 1;"),
        ("/app/b.js", "module.exports = 2;"),
    ];

    let host = MemoryHost::new(CommonJsOptions::default(), &files);
    host.build("/app/main.js").unwrap();
    assert!(host.output("/app/main.js").is_none());
    assert_eq!(
        host.plugin.classification("/app/main.js"),
        Some(ModuleClassification::Declarative)
    );

    let host = MemoryHost::new(
        CommonJsOptions {
            transform_mixed_es_modules: true,
            ..CommonJsOptions::default()
        },
        &files,
    );
    host.build("/app/main.js").unwrap();
    let output = host.output("/app/main.js").unwrap();
    assert!(output.code.contains("import require$$0 from \"\\u0000/app/b.js?commonjs-proxy\";"));
    assert!(output.code.contains("const b = require$$0;"));
    assert!(output.code.contains("export default a + b;"));
    assert!(!output.code.contains("__moduleExports"));
    assert_eq!(output.synthetic_named_exports, None);
}

#[test]
fn test_dynamic_require_needs_configuration() {
    let files = [("/app/main.js", "module.exports = require(name);")];
    let host = MemoryHost::new(CommonJsOptions::default(), &files);
    let err = host.build("/app/main.js").unwrap_err();
    assert_eq!(err.code(), "DYNAMIC_REQUIRE_DISABLED");
    assert_eq!(err.id(), Some("/app/main.js"));

    let host = MemoryHost::new(
        CommonJsOptions {
            ignore_dynamic_requires: true,
            ..CommonJsOptions::default()
        },
        &files,
    );
    host.build("/app/main.js").unwrap();
    assert!(host.code("/app/main.js").contains("var main = require(name);"));
}

#[test]
fn test_require_json() {
    let host = MemoryHost::new(
        CommonJsOptions::default(),
        &[
            ("/app/main.js", "module.exports = require('./data.json').version;"),
            ("/app/data.json", "{\"version\": 1}"),
        ],
    );
    host.build("/app/main.js").unwrap();
    assert!(host
        .code("/app/main.js")
        .contains("import require$$0 from \"\\u0000/app/data.json?commonjs-proxy\";"));
    assert_eq!(host.plugin.classification("/app/data.json"), Some(ModuleClassification::Ignored));
    assert_eq!(
        host.synthetic("\0/app/data.json?commonjs-proxy"),
        "export { default } from \"/app/data.json\";"
    );
}

#[test]
fn test_plain_scripts_are_left_alone() {
    let host = MemoryHost::new(CommonJsOptions::default(), &[("/app/plain.js", "var a = 1;\nconsole.log(a);")]);
    host.build("/app/plain.js").unwrap();
    assert!(host.output("/app/plain.js").is_none());
    assert_eq!(
        host.plugin.classification("/app/plain.js"),
        Some(ModuleClassification::Declarative)
    );
}

#[test]
fn test_output_is_not_transformed_again() {
    let source = "exports.a = 1;\nmodule.exports.b = 2;";
    let host = MemoryHost::new(CommonJsOptions::default(), &[("/app/foo.js", source)]);
    host.build("/app/foo.js").unwrap();
    let first = host.code("/app/foo.js");

    let again = MemoryHost::new(CommonJsOptions::default(), &[("/app/foo.js", first.as_str())]);
    again.build("/app/foo.js").unwrap();
    assert!(again.output("/app/foo.js").is_none());
}

#[test]
fn test_function_export_has_no_named_exports() {
    let host = MemoryHost::new(
        CommonJsOptions::default(),
        &[("/app/foo.js", "module.exports = function () { return 1; };")],
    );
    host.build("/app/foo.js").unwrap();
    assert_eq!(
        host.code("/app/foo.js"),
        "var foo = function () { return 1; };\n\nexport default foo;\nexport { foo as __moduleExports };"
    );
    assert!(host.plugin.registry().has_default_export("/app/foo.js"));
    assert!(!host.plugin.registry().has_named_exports("/app/foo.js"));
}

#[test]
fn test_named_assignments_record_no_default_export() {
    let host = MemoryHost::new(CommonJsOptions::default(), &[("/app/lib.js", "exports.a = 1;\nexports.b = 2;")]);
    host.build("/app/lib.js").unwrap();
    assert!(host.code("/app/lib.js").ends_with("export { lib as __moduleExports, a, b };"));
    assert_eq!(
        host.plugin.registry().shape("/app/lib.js"),
        Some(ExportShape {
            has_default_export: false,
            has_named_exports: true,
        })
    );
}
