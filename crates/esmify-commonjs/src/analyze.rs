// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Top-level statement analysis.
//!
//! Looks only at the statements of the module body: the import and export
//! declarations decide whether a file is an ES module and which export
//! facts it contributes to the registry.

use esmify_syntax::ast::{ExportAllDeclaration, Program, Statement};
use regex::Regex;
use std::sync::LazyLock;

/// What the top level of a module declares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopLevelAnalysis {
    /// Has at least one `import` or `export` statement
    pub is_es_module: bool,
    /// Exports something as `default`
    pub has_default_export: bool,
    /// Exports something under another name
    pub has_named_exports: bool,
}

/// Scans the top-level statements of `program`.
pub fn analyze_top_level_statements(program: &Program) -> TopLevelAnalysis {
    let mut analysis = TopLevelAnalysis::default();
    for statement in &program.body {
        match statement {
            Statement::ExportDefault(_) => {
                analysis.is_es_module = true;
                analysis.has_default_export = true;
            }
            Statement::ExportNamed(export) => {
                analysis.is_es_module = true;
                if export.declaration.is_some() {
                    analysis.has_named_exports = true;
                }
                for specifier in &export.specifiers {
                    if specifier.exported.name == "default" {
                        analysis.has_default_export = true;
                    } else {
                        analysis.has_named_exports = true;
                    }
                }
            }
            Statement::ExportAll(ExportAllDeclaration { exported, .. }) => {
                analysis.is_es_module = true;
                if exported.as_ref().is_some_and(|name| name.name == "default") {
                    analysis.has_default_export = true;
                } else {
                    analysis.has_named_exports = true;
                }
            }
            Statement::Import(_) => analysis.is_es_module = true,
            _ => {}
        }
    }
    analysis
}

static CJS_KEYWORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:require|module|exports|global)\b").expect("valid keyword pattern"));

static CJS_KEYWORDS_NO_GLOBAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:require|module|exports)\b").expect("valid keyword pattern"));

/// Cheap textual check for CommonJS markers.
pub fn has_cjs_keywords(code: &str, ignore_global: bool) -> bool {
    if ignore_global {
        CJS_KEYWORDS_NO_GLOBAL.is_match(code)
    } else {
        CJS_KEYWORDS.is_match(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esmify_syntax::parse_module;

    fn analyze(code: &str) -> TopLevelAnalysis {
        analyze_top_level_statements(&parse_module(code).unwrap())
    }

    #[test]
    fn test_commonjs_module() {
        let analysis = analyze("const a = require('a');\nmodule.exports = a;");
        assert_eq!(analysis, TopLevelAnalysis::default());
    }

    #[test]
    fn test_export_forms() {
        assert!(analyze("export default 1;").has_default_export);
        assert!(analyze("export const a = 1;").has_named_exports);

        let analysis = analyze("const a = 1; export { a as default };");
        assert!(analysis.has_default_export);
        assert!(!analysis.has_named_exports);

        let analysis = analyze("export * as default from './a';");
        assert!(analysis.has_default_export);
        assert!(!analysis.has_named_exports);

        let analysis = analyze("export * from './a';");
        assert!(analysis.has_named_exports);
    }

    #[test]
    fn test_import_only() {
        let analysis = analyze("import './polyfill';\nrequire('x');");
        assert!(analysis.is_es_module);
        assert!(!analysis.has_default_export);
        assert!(!analysis.has_named_exports);
    }

    #[test]
    fn test_nested_exports_are_not_analyzed() {
        let analysis = analyze("function f() { return 'export default 1'; }");
        assert!(!analysis.is_es_module);
    }

    #[test]
    fn test_has_cjs_keywords() {
        assert!(has_cjs_keywords("module.exports = 1", false));
        assert!(has_cjs_keywords("global.x = 1", false));
        assert!(!has_cjs_keywords("global.x = 1", true));
        assert!(!has_cjs_keywords("const modules = []; exportsFoo()", false));
        assert!(!has_cjs_keywords("export default 1", false));
    }
}
