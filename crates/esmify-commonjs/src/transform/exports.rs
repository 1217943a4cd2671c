// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Export rewriting.
//!
//! Turns the recorded `module.exports` / `exports.x` assignments into
//! references to the exports handle and builds the trailing `export`
//! declarations.

use super::collect::{Collected, ExportRoot, NamedAssignment};
use super::{ExportMode, ModuleEdit, Names};
use crate::error::Result;
use crate::names::NameTable;
use crate::options::DefaultIsModuleExports;
use esmify_syntax::lexer::Span;

/// Declarations appended after the module body.
#[derive(Debug, Default)]
pub(crate) struct ExportBlock {
    pub declarations: Vec<String>,
    /// The declarations reference the helpers namespace
    pub uses_helpers: bool,
    pub has_named_exports: bool,
}

pub(crate) struct ExportContext<'a> {
    pub collected: &'a Collected,
    pub mode: ExportMode,
    pub names: &'a Names,
    /// The body was moved into a function taking `module` / `exports`
    pub wrapped: bool,
    pub uses_require_wrapper: bool,
    pub default_is_module_exports: DefaultIsModuleExports,
    pub code: &'a str,
}

impl ExportContext<'_> {
    fn module_exports(&self) -> String {
        format!("{}.exports", self.names.module)
    }

    /// The expression an assignment through `root` writes to.
    fn property_target(&self, root: ExportRoot) -> String {
        match (self.mode, root) {
            (ExportMode::Module, ExportRoot::Module) => self.module_exports(),
            (ExportMode::Module, ExportRoot::Exports) => self
                .names
                .exports_alias
                .clone()
                .unwrap_or_else(|| self.module_exports()),
            _ => self.names.exports.clone(),
        }
    }

    fn property(&self, assignment: &NamedAssignment) -> String {
        format!("{}.{}", self.property_target(assignment.root), assignment.name)
    }
}

pub(crate) fn rewrite_exports(
    edit: &mut ModuleEdit<'_>,
    context: &ExportContext<'_>,
    table: &mut NameTable,
) -> Result<ExportBlock> {
    if context.mode == ExportMode::None {
        return Ok(ExportBlock::default());
    }
    if context.uses_require_wrapper {
        return rewrite_for_require_wrapper(edit, context);
    }
    match context.mode {
        ExportMode::Replace => rewrite_replaced(edit, context),
        _ if context.wrapped => Ok(wrapped_exports(context)),
        _ => rewrite_inline(edit, context, table),
    }
}

/// The module body runs inside `requireX`, so only the getter is exported.
fn rewrite_for_require_wrapper(edit: &mut ModuleEdit<'_>, context: &ExportContext<'_>) -> Result<ExportBlock> {
    let collected = context.collected;
    if !context.wrapped {
        if context.mode == ExportMode::Replace {
            for assignment in &collected.module_exports_assignments {
                edit.overwrite(assignment.left, &context.names.exports)?;
            }
        } else {
            for assignment in &collected.module_exports_assignments {
                edit.overwrite(assignment.left, context.module_exports())?;
            }
            for assignment in &collected.named_assignments {
                edit.overwrite(assignment_left(assignment), context.property(assignment))?;
            }
            for marker in &collected.markers {
                edit.overwrite(marker.target, context.property_target(marker.root))?;
            }
        }
    }
    Ok(ExportBlock {
        declarations: vec![export_list(&[format!("{} as __require", context.names.require_fn)])],
        ..ExportBlock::default()
    })
}

fn rewrite_replaced(edit: &mut ModuleEdit<'_>, context: &ExportContext<'_>) -> Result<ExportBlock> {
    let exports = &context.names.exports;
    for assignment in &context.collected.module_exports_assignments {
        edit.overwrite(assignment.left, exports)?;
    }
    if let Some(first) = context.collected.first_top_level_module_exports() {
        edit.prepend_right(first.left.start, "var ")?;
    }
    Ok(ExportBlock {
        declarations: vec![
            format!("export default {exports};"),
            export_list(&[format!("{exports} as __moduleExports")]),
        ],
        ..ExportBlock::default()
    })
}

fn wrapped_exports(context: &ExportContext<'_>) -> ExportBlock {
    let names = context.names;
    let exports = &names.exports;
    let mut block = ExportBlock::default();
    if context.mode == ExportMode::Module {
        block.declarations.push(format!("var {exports} = {};", context.module_exports()));
    }

    let detect_es_module = !context.collected.markers.is_empty() || context.code.contains("__esModule");
    let default_export = match context.default_is_module_exports {
        DefaultIsModuleExports::Auto if detect_es_module => {
            block.uses_helpers = true;
            format!(
                "export default /*@__PURE__*/{}.getDefaultExportFromCjs({exports});",
                names.helpers
            )
        }
        DefaultIsModuleExports::False => format!("export default {exports}.default;"),
        _ => format!("export default {exports};"),
    };
    block.declarations.push(default_export);
    block
        .declarations
        .push(export_list(&[format!("{exports} as __moduleExports")]));
    block
}

/// Named assignments become local bindings that stay in sync with the
/// exports object.
fn rewrite_inline(
    edit: &mut ModuleEdit<'_>,
    context: &ExportContext<'_>,
    table: &mut NameTable,
) -> Result<ExportBlock> {
    let collected = context.collected;
    let names = context.names;
    let mut block = ExportBlock::default();
    let mut specifiers = vec![format!("{} as __moduleExports", names.exports)];
    let mut default_binding: Option<String> = None;

    for assignment in &collected.module_exports_assignments {
        edit.overwrite(assignment.left, context.module_exports())?;
    }

    // Writes through `module.exports.x` before the last top-level
    // reassignment land on an object that is thrown away; writes through
    // `exports.x` after any reassignment are no longer visible.
    let reassigned_at = collected
        .module_exports_assignments
        .iter()
        .filter(|assignment| assignment.top_level)
        .map(|assignment| assignment.left.start)
        .last();
    let is_live = |assignment: &NamedAssignment| match assignment.root {
        ExportRoot::Module => reassigned_at.is_none_or(|at| assignment.start > at),
        ExportRoot::Exports => reassigned_at.is_none(),
    };

    for (name, assignments) in group_by_name(&collected.named_assignments) {
        if !assignments.iter().any(|assignment| is_live(assignment)) {
            for assignment in &assignments {
                edit.overwrite(assignment_left(assignment), context.property(assignment))?;
            }
            continue;
        }

        let binding = table.deconflict(if name == "default" { "_default" } else { name });
        let declared_at = assignments
            .iter()
            .position(|assignment| assignment.top_level && is_live(assignment));
        for (index, assignment) in assignments.iter().enumerate() {
            let property = context.property(assignment);
            let replacement = if Some(index) == declared_at {
                format!("var {binding} = {property}")
            } else if is_live(assignment) {
                format!("{binding} = {property}")
            } else {
                property
            };
            edit.overwrite(assignment_left(assignment), replacement)?;
        }
        if declared_at.is_none() {
            edit.prepend(&format!("var {binding};\n"));
        }

        if name == "default" {
            default_binding = Some(binding);
        } else {
            block.has_named_exports = true;
            specifiers.push(if binding == name {
                binding
            } else {
                format!("{binding} as {name}")
            });
        }
    }

    for marker in &collected.markers {
        edit.overwrite(marker.target, context.property_target(marker.root))?;
    }
    let restorable = !collected.markers.is_empty();

    if context.mode == ExportMode::Module {
        block
            .declarations
            .push(format!("var {} = {};", names.exports, context.module_exports()));
    }

    if !restorable || context.default_is_module_exports == DefaultIsModuleExports::True {
        block.declarations.push(format!("export default {};", names.exports));
    } else if collected.module_exports_assignments.is_empty()
        || context.default_is_module_exports == DefaultIsModuleExports::False
    {
        let local = default_binding.as_deref().unwrap_or(&names.exports);
        specifiers.push(format!("{local} as default"));
    } else {
        block.uses_helpers = true;
        block.declarations.push(format!(
            "export default /*@__PURE__*/{}.getDefaultExportFromCjs({});",
            names.helpers, names.exports
        ));
    }

    block.declarations.push(export_list(&specifiers));
    Ok(block)
}

fn assignment_left(assignment: &NamedAssignment) -> Span {
    Span::new(assignment.start, assignment.left_end)
}

/// Assignments grouped by exported name, in first-seen order.
fn group_by_name(assignments: &[NamedAssignment]) -> Vec<(&str, Vec<&NamedAssignment>)> {
    let mut groups: Vec<(&str, Vec<&NamedAssignment>)> = Vec::new();
    for assignment in assignments {
        match groups.iter_mut().find(|(name, _)| *name == assignment.name) {
            Some((_, group)) => group.push(assignment),
            None => groups.push((&assignment.name, vec![assignment])),
        }
    }
    groups
}

fn export_list(specifiers: &[String]) -> String {
    format!("export {{ {} }};", specifiers.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, start: usize, root: ExportRoot) -> NamedAssignment {
        NamedAssignment {
            name: name.to_string(),
            start,
            left_end: start + 1,
            root,
            top_level: true,
        }
    }

    #[test]
    fn test_group_by_name_keeps_first_seen_order() {
        let assignments = vec![
            named("b", 0, ExportRoot::Exports),
            named("a", 5, ExportRoot::Exports),
            named("b", 10, ExportRoot::Module),
        ];
        let groups = group_by_name(&assignments);
        let summary: Vec<_> = groups.iter().map(|(name, group)| (*name, group.len())).collect();
        assert_eq!(summary, vec![("b", 2), ("a", 1)]);
    }

    #[test]
    fn test_export_list() {
        assert_eq!(
            export_list(&["foo as __moduleExports".to_string(), "a".to_string()]),
            "export { foo as __moduleExports, a };"
        );
    }
}
