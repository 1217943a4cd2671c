//! What `require` returns for each kind of target.

mod common;

use common::MemoryHost;
use esmify_commonjs::{CommonJsOptions, DefaultIsModuleExports, IdMatcher, RequireReturnsDefault};

const ESM_TARGET: [(&str, &str); 2] = [
    ("/app/main.js", "module.exports = require('./esm');"),
    ("/app/esm.js", "export default 1;\nexport const named = 2;"),
];

const ESM_PROXY: &str = "\0/app/esm.js?commonjs-proxy";

fn esm_proxy(policy: RequireReturnsDefault) -> String {
    let host = MemoryHost::new(
        CommonJsOptions {
            require_returns_default: policy,
            ..CommonJsOptions::default()
        },
        &ESM_TARGET,
    );
    host.build("/app/main.js").unwrap();
    host.synthetic(ESM_PROXY)
}

#[test]
fn test_es_module_target_policies() {
    assert_eq!(
        esm_proxy(RequireReturnsDefault::False),
        "import { getAugmentedNamespace } from \"\\u0000commonjsHelpers.js\"; import * as esm from \"/app/esm.js\"; export default /*@__PURE__*/getAugmentedNamespace(esm);"
    );
    assert_eq!(
        esm_proxy(RequireReturnsDefault::Auto),
        "import * as esm from \"/app/esm.js\"; export default esm;"
    );
    assert_eq!(
        esm_proxy(RequireReturnsDefault::Preferred),
        "export { default } from \"/app/esm.js\";"
    );
    assert_eq!(
        esm_proxy(RequireReturnsDefault::True),
        "export { default } from \"/app/esm.js\";"
    );
    assert_eq!(
        esm_proxy(RequireReturnsDefault::Namespace),
        "import * as esm from \"/app/esm.js\"; export default esm;"
    );
}

#[test]
fn test_per_id_policy() {
    let options = CommonJsOptions::default().require_returns_default_with(|id| {
        if id.ends_with("esm.js") {
            RequireReturnsDefault::True
        } else {
            RequireReturnsDefault::False
        }
    });
    let host = MemoryHost::new(options, &ESM_TARGET);
    host.build("/app/main.js").unwrap();
    assert_eq!(host.synthetic(ESM_PROXY), "export { default } from \"/app/esm.js\";");
}

#[test]
fn test_commonjs_target_proxy() {
    let host = MemoryHost::new(
        CommonJsOptions::default(),
        &[
            ("/app/main.js", "module.exports = require('./cjs');"),
            ("/app/cjs.js", "module.exports = { a: 1 };"),
        ],
    );
    host.build("/app/main.js").unwrap();
    assert_eq!(
        host.synthetic("\0/app/cjs.js?commonjs-proxy"),
        "export { __moduleExports as default } from \"/app/cjs.js\";"
    );
}

#[test]
fn test_proxy_before_transform_is_not_ready() {
    let host = MemoryHost::new(CommonJsOptions::default(), &ESM_TARGET);
    let err = host.plugin.load(ESM_PROXY).unwrap_err();
    assert_eq!(err.code(), "SHAPE_NOT_READY");
    let err = host.plugin.load("\0/app/esm.js?commonjs-es-import").unwrap_err();
    assert_eq!(err.code(), "SHAPE_NOT_READY");
}

#[test]
fn test_esm_externals() {
    let options = CommonJsOptions {
        esm_externals: IdMatcher::List(vec!["esm-lib".to_string()]),
        require_returns_default: RequireReturnsDefault::Auto,
        ..CommonJsOptions::default()
    };
    let host = MemoryHost::new(options, &[]);
    assert_eq!(
        host.synthetic("\0esm-lib?commonjs-external"),
        "import * as esmLib from \"esm-lib\"; import { getDefaultExportFromNamespaceIfNotNamed } from \"\\u0000commonjsHelpers.js\"; export default /*@__PURE__*/getDefaultExportFromNamespaceIfNotNamed(esmLib);"
    );
    assert_eq!(
        host.synthetic("\0cjs-lib?commonjs-external"),
        "export { default } from \"cjs-lib\";"
    );
}

#[test]
fn test_placeholders() {
    let host = MemoryHost::new(CommonJsOptions::default(), &[]);
    assert_eq!(
        host.synthetic("\0/app/some-module.js?commonjs-module"),
        "var someModule = {exports: {}}; export {someModule as __module}"
    );
    assert_eq!(
        host.synthetic("\0/app/some-module.js?commonjs-exports"),
        "var someModule = {}; export {someModule as __exports}"
    );
}

#[test]
fn test_default_is_module_exports_for_es_imports() {
    let files = [
        ("/app/main.js", "import b from './b';"),
        ("/app/b.js", "module.exports = 1;"),
    ];
    let run = |default_is_module_exports| {
        let host = MemoryHost::new(
            CommonJsOptions {
                default_is_module_exports,
                strict_requires: esmify_commonjs::StrictRequires::Always,
                ..CommonJsOptions::default()
            },
            &files,
        );
        let id = host.plugin.resolve_id("./b", Some("/app/main.js"), &host).unwrap().unwrap();
        host.synthetic(&id)
    };
    assert!(run(DefaultIsModuleExports::True).ends_with("export { bExports as default };"));
    let code = run(DefaultIsModuleExports::False);
    assert!(code.starts_with("import { __require as requireB }"));
    assert!(code.ends_with("export default bExports.default;"));
}

#[test]
fn test_converted_module_default_export() {
    let code = "Object.defineProperty(exports, '__esModule', { value: true });\nexports.default = 'x';\nexports.named = 'y';";
    let run = |default_is_module_exports| {
        let host = MemoryHost::new(
            CommonJsOptions {
                default_is_module_exports,
                ..CommonJsOptions::default()
            },
            &[("/app/lib.js", code)],
        );
        host.build("/app/lib.js").unwrap();
        host.code("/app/lib.js")
    };
    assert!(run(DefaultIsModuleExports::Auto).contains("export { lib as __moduleExports, named, _default as default };"));
    assert!(run(DefaultIsModuleExports::False).contains("_default as default"));
    let module_exports = run(DefaultIsModuleExports::True);
    assert!(module_exports.contains("export default lib;"));
    assert!(module_exports.contains("export { lib as __moduleExports, named };"));
}

#[test]
fn test_named_only_es_module_target() {
    let files = [
        ("/app/main.js", "const { a } = require('./named');\nmodule.exports = a;"),
        ("/app/named.js", "export const a = 1;\nexport function b() {}"),
    ];
    let run = |policy| {
        let host = MemoryHost::new(
            CommonJsOptions {
                require_returns_default: policy,
                ..CommonJsOptions::default()
            },
            &files,
        );
        host.build("/app/main.js").unwrap();
        assert!(host
            .code("/app/main.js")
            .contains("import require$$0 from \"\\u0000/app/named.js?commonjs-proxy\";"));
        assert!(!host.plugin.registry().has_default_export("/app/named.js"));
        host.synthetic("\0/app/named.js?commonjs-proxy")
    };
    assert_eq!(
        run(RequireReturnsDefault::False),
        "import { getAugmentedNamespace } from \"\\u0000commonjsHelpers.js\"; import * as named from \"/app/named.js\"; export default /*@__PURE__*/getAugmentedNamespace(named);"
    );
    assert_eq!(
        run(RequireReturnsDefault::Preferred),
        "import * as named from \"/app/named.js\"; export default named;"
    );
}
