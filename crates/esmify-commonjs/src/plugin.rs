// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The host-facing plugin.
//!
//! [`CommonJsPlugin`] owns every build-wide structure (filters, the dynamic
//! require table, the require graph and the export registry) and exposes the
//! hooks a bundler calls: [`build_start`](CommonJsPlugin::build_start),
//! [`resolve_id`](CommonJsPlugin::resolve_id), [`load`](CommonJsPlugin::load),
//! [`transform`](CommonJsPlugin::transform) and
//! [`build_end`](CommonJsPlugin::build_end). All hooks take `&self` and may
//! run concurrently for different modules.

use crate::analyze::{analyze_top_level_statements, has_cjs_keywords};
use crate::dynamic::DynamicRequireTable;
use crate::error::{InteropError, Result, Warning, WarningCode};
use crate::filter::IdFilter;
use crate::helpers::helpers_module_source;
use crate::ids::{is_synthetic, is_wrapped_id, wrap_id, ProxyKind, DYNAMIC_MODULES_ID, HELPERS_ID};
use crate::options::{CommonJsOptions, IdFn, StrictRequires};
use crate::proxies::ProxySynthesizer;
use crate::registry::{CommonJsType, ExportRegistry, ModuleMeta};
use crate::resolve::{ModuleHost, RequireResolver};
use crate::transform::{transform_commonjs, TransformSettings};
use dashmap::{DashMap, DashSet};
use esmify_syntax::SourceMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// How a module was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleClassification {
    /// ES module or plain script, left as is
    Declarative,
    /// CommonJS converted in place
    LegacyUnwrapped,
    /// CommonJS converted into a lazy `__require` getter
    LegacyWrapped,
    /// Stand-in for a module outside the graph
    External,
    /// Outside the plugin's filters
    Ignored,
}

impl ModuleClassification {
    /// Stable label for reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleClassification::Declarative => "declarative",
            ModuleClassification::LegacyUnwrapped => "commonjs",
            ModuleClassification::LegacyWrapped => "commonjs-wrapped",
            ModuleClassification::External => "external",
            ModuleClassification::Ignored => "ignored",
        }
    }
}

impl std::fmt::Display for ModuleClassification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CommonJsType> for ModuleClassification {
    fn from(commonjs: CommonJsType) -> Self {
        match commonjs {
            CommonJsType::NotCommonJs => ModuleClassification::Declarative,
            CommonJsType::CommonJs => ModuleClassification::LegacyUnwrapped,
            CommonJsType::Wrapped => ModuleClassification::LegacyWrapped,
        }
    }
}

/// A converted module.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// ES module source
    pub code: String,
    /// Source map, when enabled
    pub map: Option<SourceMap>,
    /// Meta to attach to the module
    pub meta: ModuleMeta,
    /// How the module was handled
    pub classification: ModuleClassification,
    /// Export whose properties the host should expose as named exports
    pub synthetic_named_exports: Option<&'static str>,
}

/// Which modules are always wrapped.
enum StrictFilter {
    All,
    Nothing,
    Globs(IdFilter),
    Custom(IdFn<bool>),
}

impl StrictFilter {
    fn new(strict_requires: &StrictRequires, cwd: &Path) -> Result<Self> {
        Ok(match strict_requires {
            StrictRequires::Always => StrictFilter::All,
            StrictRequires::Never | StrictRequires::Auto | StrictRequires::Debug => StrictFilter::Nothing,
            StrictRequires::Matching(patterns) => {
                StrictFilter::Globs(IdFilter::new("strictRequires", patterns, &[], cwd)?)
            }
            StrictRequires::Custom(f) => StrictFilter::Custom(Arc::clone(f)),
        })
    }

    fn matches(&self, id: &str) -> bool {
        match self {
            StrictFilter::All => !is_synthetic(id),
            StrictFilter::Nothing => false,
            StrictFilter::Globs(filter) => filter.matches(id),
            StrictFilter::Custom(f) => f(id),
        }
    }
}

/// The CommonJS interop plugin.
pub struct CommonJsPlugin {
    options: CommonJsOptions,
    cwd: PathBuf,
    filter: IdFilter,
    strict: StrictFilter,
    dynamic: DynamicRequireTable,
    resolver: RequireResolver,
    registry: Arc<ExportRegistry>,
    proxies: ProxySynthesizer,
    /// (importer, wrapped module) pairs emitted by our own rewrites
    own_imports: DashSet<(String, String)>,
    classifications: DashMap<String, ModuleClassification>,
}

impl std::fmt::Debug for CommonJsPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommonJsPlugin")
            .field("options", &self.options)
            .field("cwd", &self.cwd)
            .field("dynamic", &self.dynamic)
            .finish_non_exhaustive()
    }
}

impl CommonJsPlugin {
    /// Validates the options and builds the dynamic require table.
    pub fn new(options: CommonJsOptions) -> Result<Self> {
        let cwd = match &options.cwd {
            Some(cwd) => cwd.clone(),
            None => std::env::current_dir().map_err(|err| InteropError::io(Path::new("."), err))?,
        };
        let filter = IdFilter::new("include/exclude", &options.include, &options.exclude, &cwd)?;
        let strict = StrictFilter::new(&options.strict_requires, &cwd)?;
        let root = options.dynamic_require_root.clone().unwrap_or_else(|| cwd.clone());
        let dynamic = if options.dynamic_require_targets.is_empty() {
            DynamicRequireTable::empty(&cwd.join(&root))
        } else {
            DynamicRequireTable::build(&options.dynamic_require_targets, &root, &cwd)?
        };
        let resolver = RequireResolver::new(options.strict_requires.detects_cycles_and_conditional());
        let registry = Arc::new(ExportRegistry::new());
        let policy_options = options.clone();
        let proxies = ProxySynthesizer::new(
            Arc::clone(&registry),
            options.esm_externals.clone(),
            options.default_is_module_exports,
            move |id| policy_options.require_returns_default_for(id),
        );
        debug!(cwd = %cwd.display(), dynamic = dynamic.is_enabled(), "commonjs plugin ready");

        Ok(Self {
            options,
            cwd,
            filter,
            strict,
            dynamic,
            resolver,
            registry,
            proxies,
            own_imports: DashSet::new(),
            classifications: DashMap::new(),
        })
    }

    /// The options the plugin was built with.
    pub fn options(&self) -> &CommonJsOptions {
        &self.options
    }

    /// Build-wide export facts.
    pub fn registry(&self) -> &ExportRegistry {
        &self.registry
    }

    /// The dynamic require table.
    pub fn dynamic_table(&self) -> &DynamicRequireTable {
        &self.dynamic
    }

    /// Warnings for the start of a build.
    pub fn build_start(&self) -> Vec<Warning> {
        let mut warnings = Vec::new();
        if self.options.named_exports.is_some() {
            warnings.push(Warning {
                code: WarningCode::DeprecatedOption,
                message: "The namedExports option is deprecated. Named exports are now handled automatically."
                    .to_string(),
                ids: Vec::new(),
            });
        }
        for warning in &warnings {
            warn!(code = %warning.code, "{}", warning.message);
        }
        warnings
    }

    /// Warnings for the end of a build.
    pub fn build_end(&self) -> Vec<Warning> {
        if !matches!(self.options.strict_requires, StrictRequires::Debug) {
            return Vec::new();
        }
        let ids = self.resolver.wrapped_ids();
        let message = if ids.is_empty() {
            "The commonjs plugin did not wrap any files.".to_string()
        } else {
            let listed: Vec<String> = ids
                .iter()
                .map(|id| format!("\t{}", serde_json::Value::String(self.relative_id(id))))
                .collect();
            format!(
                "The commonjs plugin automatically wrapped the following files:\n[\n{}\n]",
                listed.join(",\n")
            )
        };
        warn!(code = %WarningCode::WrappedIds, "{message}");
        vec![Warning {
            code: WarningCode::WrappedIds,
            message,
            ids,
        }]
    }

    fn relative_id(&self, id: &str) -> String {
        match Path::new(id).strip_prefix(&self.cwd) {
            Ok(relative) => relative.to_string_lossy().into_owned(),
            Err(_) => id.to_string(),
        }
    }

    /// What `transform` recorded about `id`.
    pub fn meta(&self, id: &str) -> Option<ModuleMeta> {
        self.registry.meta(id)
    }

    /// How `id` was handled, once it went through `transform`.
    pub fn classification(&self, id: &str) -> Option<ModuleClassification> {
        self.classifications.get(id).map(|entry| *entry)
    }

    fn finish(&self, id: &str, commonjs: Option<CommonJsType>, classification: ModuleClassification) {
        self.registry.mark_analyzed(id, ModuleMeta { commonjs });
        self.classifications.insert(id.to_string(), classification);
        debug!(id, ?classification, "classified");
    }

    /// Dynamic require targets bypass include/exclude but not the extension
    /// check.
    fn is_included(&self, id: &str, in_dynamic_table: bool) -> bool {
        let path = Path::new(id);
        if path.extension().is_some_and(|ext| ext == "cjs") {
            return true;
        }
        (in_dynamic_table || self.filter.matches(id))
            && self.options.extensions.iter().any(|ext| id.ends_with(ext.as_str()))
    }

    /// Converts module `id`. Returns `None` when the module is left as is.
    pub fn transform(&self, code: &str, id: &str, host: &dyn ModuleHost) -> Result<Option<TransformOutput>> {
        if is_synthetic(id) {
            if is_wrapped_id(id, ProxyKind::External) {
                self.classifications.insert(id.to_string(), ModuleClassification::External);
            }
            return Ok(None);
        }

        let in_dynamic_table = self.dynamic.contains_module(id);
        if !self.is_included(id, in_dynamic_table) {
            self.finish(id, None, ModuleClassification::Ignored);
            return Ok(None);
        }

        let program = esmify_syntax::parse_module(code).map_err(|err| InteropError::parse(id, err))?;
        let analysis = analyze_top_level_statements(&program);
        if analysis.has_default_export {
            self.registry.record_default_export(id);
        }
        if analysis.has_named_exports {
            self.registry.record_named_exports(id);
        }

        let is_es_module = analysis.is_es_module;
        let ignore_global = self.options.ignore_global || is_es_module;
        let passthrough = !in_dynamic_table
            && ((!has_cjs_keywords(code, self.options.ignore_global) && !self.resolver.is_required_id(id))
                || (is_es_module && !self.options.transform_mixed_es_modules));
        if passthrough {
            self.finish(id, Some(CommonJsType::NotCommonJs), ModuleClassification::Declarative);
            return Ok(None);
        }

        let settings = TransformSettings {
            id,
            is_es_module,
            ignore_global,
            ignore_dynamic_requires: self.options.ignore_dynamic_requires && !self.dynamic.is_enabled(),
            needs_require_wrapper: !is_es_module && (in_dynamic_table || self.strict.matches(id)),
            options: &self.options,
            dynamic: &self.dynamic,
            resolver: &self.resolver,
            host,
        };
        let Some(rewritten) = transform_commonjs(&program, code, &settings)? else {
            self.finish(id, Some(CommonJsType::NotCommonJs), ModuleClassification::Declarative);
            return Ok(None);
        };

        // The `export default` of a converted module is the interop
        // binding. Only a whole-object assignment counts as a default.
        if rewritten.commonjs.is_commonjs() {
            if rewritten.assigns_module_exports {
                self.registry.record_default_export(id);
            }
            if rewritten.has_named_exports {
                self.registry.record_named_exports(id);
            }
        }
        for wrapped in &rewritten.wrapped_imports {
            self.own_imports.insert((id.to_string(), wrapped.clone()));
        }
        let meta = ModuleMeta {
            commonjs: Some(rewritten.commonjs),
        };
        let classification = ModuleClassification::from(rewritten.commonjs);
        self.finish(id, meta.commonjs, classification);

        Ok(Some(TransformOutput {
            code: rewritten.code,
            map: rewritten.map,
            meta,
            classification,
            synthetic_named_exports: (rewritten.commonjs == CommonJsType::CommonJs).then_some("__moduleExports"),
        }))
    }

    /// Source of a synthetic module, `None` for ids this plugin does not
    /// own.
    pub fn load(&self, id: &str) -> Result<Option<String>> {
        if id == HELPERS_ID {
            return Ok(Some(helpers_module_source().to_string()));
        }
        if id == DYNAMIC_MODULES_ID {
            return Ok(Some(
                self.dynamic
                    .registry_module_source(self.options.ignore_dynamic_requires),
            ));
        }
        match ProxyKind::parse(id) {
            Some((kind, base)) => self.proxies.generate(kind, base).map(Some),
            None => Ok(None),
        }
    }

    /// Resolves `importee`. Synthetic ids resolve to themselves; an ES
    /// module importing a wrapped CommonJS module is sent to its
    /// `?commonjs-es-import` proxy. `None` leaves resolution to the host.
    pub fn resolve_id(&self, importee: &str, importer: Option<&str>, host: &dyn ModuleHost) -> Result<Option<String>> {
        if is_synthetic(importee) {
            return Ok(Some(importee.to_string()));
        }
        let Some(importer) = importer else {
            return Ok(None);
        };
        if is_synthetic(importer) {
            return Ok(None);
        }
        let Some(resolved) = host.resolve(importee, importer) else {
            return Ok(None);
        };
        if resolved.external
            || self
                .own_imports
                .contains(&(importer.to_string(), resolved.id.clone()))
        {
            return Ok(None);
        }
        host.load(&resolved.id)?;
        if self.resolver.known_type(&resolved.id) == Some(CommonJsType::Wrapped) {
            debug!(importer, id = %resolved.id, "importing wrapped module through es-import proxy");
            return Ok(Some(wrap_id(&resolved.id, ProxyKind::EsImport)));
        }
        Ok(None)
    }
}
