// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The CommonJS rewrite.
//!
//! A module goes through three stages:
//!
//! 1. **Collection** walks the tree once and records every CommonJS
//!    construct ([`collect`]).
//! 2. **Requires** resolves the constant require sources through the host,
//!    which fixes the final type of the module, and turns the calls into
//!    imports ([`imports`]).
//! 3. **Exports** rewrites the export assignments and builds the trailing
//!    `export` declarations ([`exports`]).
//!
//! The body is then optionally moved into a function (when it touches
//! `module` or `exports` in ways that cannot be tracked) and into the lazy
//! `requireX` getter (when the module is wrapped).

mod collect;
mod exports;
mod imports;

use crate::dynamic::{json_string, DynamicRequireTable, COMMONJS_REQUIRE_EXPORT, CREATE_COMMONJS_REQUIRE_EXPORT};
use crate::error::{InteropError, Result};
use crate::ids::{wrap_id, ProxyKind, DYNAMIC_MODULES_ID, HELPERS_ID};
use crate::names::{capitalize, get_name, NameTable};
use crate::options::CommonJsOptions;
use crate::registry::CommonJsType;
use crate::resolve::{ModuleHost, RequireResolver};
use collect::{CollectOptions, Collected, ExportRoot};
use esmify_syntax::ast::Program;
use esmify_syntax::lexer::Span;
use esmify_syntax::scope::collect_names;
use esmify_syntax::{EditBuffer, SourceMap};
use exports::{ExportContext, rewrite_exports};
use imports::{RequireContext, rewrite_requires};
use std::ops::{Deref, DerefMut};
use std::path::Path;
use tracing::debug;

/// Per-module inputs of [`transform_commonjs`].
pub struct TransformSettings<'a> {
    /// Module id
    pub id: &'a str,
    /// The module contains `import` / `export` declarations
    pub is_es_module: bool,
    /// Leave free `global` references alone
    pub ignore_global: bool,
    /// Leave non-constant requires alone instead of failing
    pub ignore_dynamic_requires: bool,
    /// The module must be wrapped no matter what the graph says
    pub needs_require_wrapper: bool,
    /// Plugin options
    pub options: &'a CommonJsOptions,
    /// Dynamic require targets
    pub dynamic: &'a DynamicRequireTable,
    /// Build-wide require graph
    pub resolver: &'a RequireResolver,
    /// Resolves and loads required modules
    pub host: &'a dyn ModuleHost,
}

/// A rewritten module.
#[derive(Debug, Clone)]
pub struct Rewritten {
    /// ES module source
    pub code: String,
    /// Map back to the CommonJS source
    pub map: Option<SourceMap>,
    /// How the module was converted
    pub commonjs: CommonJsType,
    /// Exposes named exports besides the default
    pub has_named_exports: bool,
    /// `module.exports` is assigned as a whole somewhere
    pub assigns_module_exports: bool,
    /// Wrapped modules imported through their `__require` getter
    pub wrapped_imports: Vec<String>,
}

/// How exports reach the importer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExportMode {
    /// ES module, exports are left alone
    None,
    /// Through the `__module` placeholder
    Module,
    /// Through the `__exports` placeholder
    Exports,
    /// A single local variable replacing `module.exports`
    Replace,
}

/// Generated names of one module.
#[derive(Debug)]
pub(crate) struct Names {
    pub exports: String,
    pub module: String,
    pub require_fn: String,
    pub has_required: String,
    pub helpers: String,
    pub dynamic_require: Option<String>,
    /// `exports` as it was before any reassignment of `module.exports`
    pub exports_alias: Option<String>,
}

/// An [`EditBuffer`] whose failures name the module.
pub(crate) struct ModuleEdit<'a> {
    buffer: EditBuffer<'a>,
    id: &'a str,
}

impl<'a> ModuleEdit<'a> {
    fn new(code: &'a str, id: &'a str) -> Self {
        Self {
            buffer: EditBuffer::new(code),
            id,
        }
    }

    pub fn overwrite(&mut self, span: Span, content: impl Into<String>) -> Result<()> {
        self.buffer
            .overwrite(span.start, span.end, content)
            .map_err(|err| InteropError::transform(self.id, err))
    }

    pub fn remove(&mut self, span: Span) -> Result<()> {
        self.buffer
            .remove(span.start, span.end)
            .map_err(|err| InteropError::transform(self.id, err))
    }

    pub fn prepend_right(&mut self, index: usize, content: &str) -> Result<()> {
        self.buffer
            .prepend_right(index, content)
            .map_err(|err| InteropError::transform(self.id, err))
    }
}

impl<'a> Deref for ModuleEdit<'a> {
    type Target = EditBuffer<'a>;

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl DerefMut for ModuleEdit<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

/// Rewrites one parsed module. Returns `None` when there is nothing to
/// convert.
pub fn transform_commonjs(program: &Program, code: &str, settings: &TransformSettings<'_>) -> Result<Option<Rewritten>> {
    let id = settings.id;
    let options = settings.options;
    let collected = collect::collect(
        program,
        &CollectOptions {
            id,
            code,
            is_es_module: settings.is_es_module,
            ignore_global: settings.ignore_global,
            ignore_dynamic_requires: settings.ignore_dynamic_requires,
            ignore: &options.ignore,
            dynamic: settings.dynamic,
        },
    )?;

    let uses = collected.uses;
    let should_wrap = !settings.is_es_module
        && (collected.should_wrap || (uses.exports && !collected.module_exports_assignments.is_empty()));
    let is_required = settings.resolver.is_required_id(id);
    if !(should_wrap
        || is_required
        || settings.needs_require_wrapper
        || uses.module
        || uses.exports
        || uses.require
        || (uses.global && !settings.ignore_global)
        || !collected.markers.is_empty())
    {
        return Ok(None);
    }

    let mode = export_mode(&collected, settings.is_es_module, should_wrap);
    let mut table = NameTable::new(collect_names(program));
    let names = generate_names(id, &collected, mode, should_wrap, settings.dynamic, &mut table);
    debug!(id, ?mode, should_wrap, "rewriting CommonJS module");

    let mut edit = ModuleEdit::new(code, id);
    let mut uses_helpers = false;

    for (span, replacement) in &collected.fixed_replacements {
        edit.overwrite(*span, replacement.as_str())?;
    }
    for global in &collected.replaced_globals {
        let replacement = format!("{}.commonjsGlobal", names.helpers);
        edit.overwrite(global.span, shorthand(global.shorthand, "global", replacement))?;
        uses_helpers = true;
    }
    if let Some(dynamic_require) = &names.dynamic_require {
        let replacement = if settings.dynamic.is_enabled() {
            let dir = Path::new(id).parent().unwrap_or_else(|| Path::new("/"));
            format!("{dynamic_require}({})", json_string(&settings.dynamic.virtual_path(dir)))
        } else {
            dynamic_require.clone()
        };
        for require in &collected.replaced_requires {
            edit.overwrite(require.span, shorthand(require.shorthand, "require", replacement.clone()))?;
        }
    }

    let leading_comment = match code.starts_with("/*").then(|| code[2..].find("*/")).flatten() {
        Some(end) => {
            let end = end + 4;
            edit.remove(Span::new(0, end))?;
            format!("{}\n", &code[..end])
        }
        None => String::new(),
    };

    let initial_type = if settings.needs_require_wrapper {
        CommonJsType::Wrapped
    } else if !settings.is_es_module {
        CommonJsType::CommonJs
    } else {
        CommonJsType::NotCommonJs
    };
    let requires = rewrite_requires(
        &mut edit,
        &collected.requires,
        &RequireContext {
            id,
            initial_type,
            resolver: settings.resolver,
            host: settings.host,
            ignore_try_catch: &options.ignore_try_catch,
        },
        &mut table,
    )?;
    let uses_require_wrapper = requires.parent_type == CommonJsType::Wrapped;

    let export_block = rewrite_exports(
        &mut edit,
        &ExportContext {
            collected: &collected,
            mode,
            names: &names,
            wrapped: should_wrap,
            uses_require_wrapper,
            default_is_module_exports: options.default_is_module_exports,
            code,
        },
        &mut table,
    )?;
    uses_helpers |= export_block.uses_helpers;

    let import_block = import_block(&names, mode, uses_helpers, settings.dynamic.is_enabled(), id, &requires.lines);

    if should_wrap {
        wrap_in_function(&mut edit, &collected, mode, &names);
    }
    if uses_require_wrapper {
        wrap_in_require_getter(&mut edit, &collected, mode, &names);
    }

    edit.trim();
    edit.prepend(&format!("{leading_comment}{import_block}"));
    if !export_block.declarations.is_empty() {
        edit.append(&format!("\n\n{}", export_block.declarations.join("\n")));
    }

    Ok(Some(Rewritten {
        code: edit.to_string(),
        map: options.source_map.then(|| edit.generate_map(id, true)),
        commonjs: requires.parent_type,
        has_named_exports: export_block.has_named_exports,
        assigns_module_exports: !collected.module_exports_assignments.is_empty(),
        wrapped_imports: requires.wrapped_imports,
    }))
}

fn export_mode(collected: &Collected, is_es_module: bool, should_wrap: bool) -> ExportMode {
    if is_es_module {
        return ExportMode::None;
    }
    if should_wrap {
        return if collected.uses.module {
            ExportMode::Module
        } else {
            ExportMode::Exports
        };
    }
    if collected.first_top_level_module_exports().is_some() {
        if collected.named_assignments.is_empty() && collected.markers.is_empty() {
            ExportMode::Replace
        } else {
            ExportMode::Module
        }
    } else if collected.module_exports_assignments.is_empty() {
        ExportMode::Exports
    } else {
        ExportMode::Module
    }
}

fn generate_names(
    id: &str,
    collected: &Collected,
    mode: ExportMode,
    should_wrap: bool,
    dynamic: &DynamicRequireTable,
    table: &mut NameTable,
) -> Names {
    let base = get_name(id);
    let capitalized = capitalize(&base);
    let exports = table.deconflict(&base);
    let module = table.deconflict(&format!("{base}Module"));
    let require_fn = table.deconflict(&format!("require{capitalized}"));
    let has_required = table.deconflict(&format!("hasRequired{capitalized}"));
    let helpers = table.deconflict("commonjsHelpers");
    let dynamic_require = (!collected.replaced_requires.is_empty()).then(|| {
        table.deconflict(if dynamic.is_enabled() {
            CREATE_COMMONJS_REQUIRE_EXPORT
        } else {
            COMMONJS_REQUIRE_EXPORT
        })
    });
    // Inside the wrapper function `exports` is a parameter.
    let needs_alias = mode == ExportMode::Module
        && !should_wrap
        && (collected
            .named_assignments
            .iter()
            .any(|assignment| assignment.root == ExportRoot::Exports)
            || collected.markers.iter().any(|marker| marker.root == ExportRoot::Exports));
    let exports_alias = needs_alias.then(|| table.deconflict(&format!("{base}Exports")));
    Names {
        exports,
        module,
        require_fn,
        has_required,
        helpers,
        dynamic_require,
        exports_alias,
    }
}

fn shorthand(is_shorthand: bool, key: &str, replacement: String) -> String {
    if is_shorthand {
        format!("{key}: {replacement}")
    } else {
        replacement
    }
}

fn import_block(
    names: &Names,
    mode: ExportMode,
    uses_helpers: bool,
    dynamic_enabled: bool,
    id: &str,
    require_imports: &[String],
) -> String {
    let mut lines = Vec::new();
    if uses_helpers {
        lines.push(format!("import * as {} from {};", names.helpers, json_string(HELPERS_ID)));
    }
    if let Some(dynamic_require) = &names.dynamic_require {
        let export = if dynamic_enabled {
            CREATE_COMMONJS_REQUIRE_EXPORT
        } else {
            COMMONJS_REQUIRE_EXPORT
        };
        let specifier = if dynamic_require == export {
            export.to_string()
        } else {
            format!("{export} as {dynamic_require}")
        };
        lines.push(format!("import {{ {specifier} }} from {};", json_string(DYNAMIC_MODULES_ID)));
    }
    match mode {
        ExportMode::Module => {
            lines.push(format!(
                "import {{ __module as {} }} from {};",
                names.module,
                json_string(&wrap_id(id, ProxyKind::ModulePlaceholder))
            ));
            if let Some(alias) = &names.exports_alias {
                lines.push(format!("var {alias} = {}.exports;", names.module));
            }
        }
        ExportMode::Exports => lines.push(format!(
            "import {{ __exports as {} }} from {};",
            names.exports,
            json_string(&wrap_id(id, ProxyKind::ExportsPlaceholder))
        )),
        ExportMode::None | ExportMode::Replace => {}
    }
    lines.extend(require_imports.iter().cloned());
    if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n\n", lines.join("\n"))
    }
}

/// Moves the body into `(function (module, exports) { ... })`.
fn wrap_in_function(edit: &mut ModuleEdit<'_>, collected: &Collected, mode: ExportMode, names: &Names) {
    let (params, args) = if mode == ExportMode::Module {
        let module_exports = format!("{}.exports", names.module);
        if collected.uses.exports {
            ("module, exports", format!("{}, {module_exports}", names.module))
        } else {
            ("module", names.module.clone())
        }
    } else {
        ("exports", names.exports.clone())
    };
    edit.trim();
    edit.indent("\t", &collected.template_spans);
    edit.prepend(&format!("(function ({params}) {{\n"));
    edit.append(&format!("\n}} ({args}));"));
}

/// Moves the body into the lazy `requireX` getter.
fn wrap_in_require_getter(edit: &mut ModuleEdit<'_>, collected: &Collected, mode: ExportMode, names: &Names) {
    let exported = if mode == ExportMode::Module {
        format!("{}.exports", names.module)
    } else {
        names.exports.clone()
    };
    let has_required = &names.has_required;
    edit.trim();
    edit.indent("\t", &collected.template_spans);
    edit.prepend(&format!(
        "var {has_required};\n\nfunction {} () {{\n\tif ({has_required}) return {exported};\n\t{has_required} = 1;\n",
        names.require_fn
    ));
    edit.append(&format!("\n\treturn {exported};\n}}"));
    if mode == ExportMode::Replace {
        edit.prepend(&format!("var {};\n", names.exports));
    }
}
