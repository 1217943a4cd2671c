// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Proxy module generation.
//!
//! Each [`ProxyKind`] maps to one generator. Generators are pure over the
//! base id and what the [`ExportRegistry`] knows about it, so a proxy can be
//! regenerated at any time and always yields the same text once the base
//! module has been transformed.

use crate::dynamic::json_string;
use crate::error::{InteropError, Result};
use crate::ids::{ProxyKind, HELPERS_ID};
use crate::names::{capitalize, get_name};
use crate::options::{DefaultIsModuleExports, IdMatcher, RequireReturnsDefault};
use crate::registry::{CommonJsType, ExportRegistry};
use std::sync::Arc;
use tracing::debug;

/// Generates the source of proxy modules.
pub struct ProxySynthesizer {
    registry: Arc<ExportRegistry>,
    esm_externals: IdMatcher,
    default_is_module_exports: DefaultIsModuleExports,
    require_returns_default: Box<dyn Fn(&str) -> RequireReturnsDefault + Send + Sync>,
}

impl std::fmt::Debug for ProxySynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxySynthesizer")
            .field("esm_externals", &self.esm_externals)
            .field("default_is_module_exports", &self.default_is_module_exports)
            .finish_non_exhaustive()
    }
}

impl ProxySynthesizer {
    /// Creates a synthesizer reading export facts from `registry`.
    pub fn new(
        registry: Arc<ExportRegistry>,
        esm_externals: IdMatcher,
        default_is_module_exports: DefaultIsModuleExports,
        require_returns_default: impl Fn(&str) -> RequireReturnsDefault + Send + Sync + 'static,
    ) -> Self {
        Self {
            registry,
            esm_externals,
            default_is_module_exports,
            require_returns_default: Box::new(require_returns_default),
        }
    }

    /// Source of the `kind` proxy for `id`.
    pub fn generate(&self, kind: ProxyKind, id: &str) -> Result<String> {
        debug!(?kind, id, "generating proxy");
        match kind {
            ProxyKind::ModulePlaceholder => Ok(module_placeholder(id)),
            ProxyKind::ExportsPlaceholder => Ok(exports_placeholder(id)),
            ProxyKind::External => Ok(self.external_proxy(id)),
            ProxyKind::EsImport => self.es_import_proxy(id),
            ProxyKind::RequireProxy => self.static_require_proxy(id),
        }
    }

    /// Proxy for a module outside the graph.
    pub fn external_proxy(&self, id: &str) -> String {
        let policy = if self.esm_externals.matches(id) {
            (self.require_returns_default)(id)
        } else {
            RequireReturnsDefault::True
        };
        unknown_require_proxy(id, policy)
    }

    /// What a `require` of module `id` inside the graph returns.
    pub fn static_require_proxy(&self, id: &str) -> Result<String> {
        let meta = self
            .registry
            .meta(id)
            .ok_or_else(|| InteropError::ShapeNotReady { id: id.to_string() })?;
        let policy = (self.require_returns_default)(id);
        let source = json_string(id);

        match meta.commonjs {
            Some(CommonJsType::CommonJs | CommonJsType::Wrapped) => {
                Ok(format!("export {{ __moduleExports as default }} from {source};"))
            }
            None => Ok(unknown_require_proxy(id, policy)),
            Some(CommonJsType::NotCommonJs) => {
                let name = get_name(id);
                if policy == RequireReturnsDefault::False {
                    return Ok(format!(
                        "import {{ getAugmentedNamespace }} from {helpers}; import * as {name} from {source}; export default /*@__PURE__*/getAugmentedNamespace({name});",
                        helpers = json_string(HELPERS_ID)
                    ));
                }
                let namespace_as_default = policy != RequireReturnsDefault::True
                    && (policy == RequireReturnsDefault::Namespace
                        || !self.registry.has_default_export(id)
                        || (policy == RequireReturnsDefault::Auto && self.registry.has_named_exports(id)));
                if namespace_as_default {
                    Ok(format!("import * as {name} from {source}; export default {name};"))
                } else {
                    Ok(format!("export {{ default }} from {source};"))
                }
            }
        }
    }

    /// Lets a declarative importer use a wrapped CommonJS module.
    pub fn es_import_proxy(&self, id: &str) -> Result<String> {
        if !self.registry.is_analyzed(id) {
            return Err(InteropError::ShapeNotReady { id: id.to_string() });
        }
        let name = get_name(id);
        let exports_name = format!("{name}Exports");
        let require_name = format!("require{}", capitalize(&name));
        let mut code = String::new();
        if self.default_is_module_exports == DefaultIsModuleExports::Auto {
            code.push_str(&format!(
                "import {{ getDefaultExportFromCjs }} from {};\n",
                json_string(HELPERS_ID)
            ));
        }
        code.push_str(&format!(
            "import {{ __require as {require_name} }} from {};\nvar {exports_name} = {require_name}();\nexport {{ {exports_name} as __moduleExports }};\n",
            json_string(id)
        ));
        code.push_str(&match self.default_is_module_exports {
            DefaultIsModuleExports::True => format!("export {{ {exports_name} as default }};"),
            DefaultIsModuleExports::False => format!("export default {exports_name}.default;"),
            DefaultIsModuleExports::Auto => {
                format!("export default /*@__PURE__*/getDefaultExportFromCjs({exports_name});")
            }
        });
        Ok(code)
    }
}

/// `var x = {exports: {}}; export {x as __module}`
pub fn module_placeholder(id: &str) -> String {
    let name = get_name(id);
    format!("var {name} = {{exports: {{}}}}; export {{{name} as __module}}")
}

/// `var x = {}; export {x as __exports}`
pub fn exports_placeholder(id: &str) -> String {
    let name = get_name(id);
    format!("var {name} = {{}}; export {{{name} as __exports}}")
}

/// Adapts a module whose shape is unknown according to `policy`.
pub fn unknown_require_proxy(id: &str, policy: RequireReturnsDefault) -> String {
    let source = json_string(id);
    if policy == RequireReturnsDefault::True || id.ends_with(".json") {
        return format!("export {{ default }} from {source};");
    }
    let name = get_name(id);
    let helper = match policy {
        RequireReturnsDefault::Auto => "getDefaultExportFromNamespaceIfNotNamed",
        RequireReturnsDefault::Preferred => "getDefaultExportFromNamespaceIfPresent",
        RequireReturnsDefault::False => "getAugmentedNamespace",
        RequireReturnsDefault::Namespace | RequireReturnsDefault::True => {
            return format!("import * as {name} from {source}; export default {name};");
        }
    };
    format!(
        "import * as {name} from {source}; import {{ {helper} }} from {helpers}; export default /*@__PURE__*/{helper}({name});",
        helpers = json_string(HELPERS_ID)
    )
}
