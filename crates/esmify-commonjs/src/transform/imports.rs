// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Rewrites constant `require` calls into imports.

use super::collect::RequireSite;
use super::ModuleEdit;
use crate::dynamic::json_string;
use crate::error::Result;
use crate::names::NameTable;
use crate::options::{TryCatchMode, TryCatchPolicy};
use crate::registry::CommonJsType;
use crate::resolve::{ModuleHost, RequireRequest, RequireResolver, RequireTarget};
use tracing::trace;

/// Import statements for the required modules.
#[derive(Debug)]
pub(crate) struct RequireImports {
    pub lines: Vec<String>,
    /// Wrapped modules imported through `__require`
    pub wrapped_imports: Vec<String>,
    /// Final type of the requiring module
    pub parent_type: CommonJsType,
}

pub(crate) struct RequireContext<'a> {
    pub id: &'a str,
    pub initial_type: CommonJsType,
    pub resolver: &'a RequireResolver,
    pub host: &'a dyn ModuleHost,
    pub ignore_try_catch: &'a TryCatchPolicy,
}

pub(crate) fn rewrite_requires(
    edit: &mut ModuleEdit<'_>,
    sites: &[RequireSite],
    context: &RequireContext<'_>,
    table: &mut NameTable,
) -> Result<RequireImports> {
    let groups = group_by_source(sites);
    let requests: Vec<RequireRequest> = groups
        .iter()
        .map(|(source, sites)| RequireRequest {
            source: source.to_string(),
            is_conditional: sites.iter().all(|site| site.inside_conditional),
        })
        .collect();
    let resolved = context
        .resolver
        .resolve_require_sources(context.id, context.initial_type, &requests, context.host)?;

    let mut imports = RequireImports {
        lines: Vec::new(),
        wrapped_imports: Vec::new(),
        parent_type: resolved.parent_type,
    };
    let mut next_uid = 0;
    for ((source, sites), target) in groups.iter().zip(&resolved.targets) {
        let mut name: Option<String> = None;
        let mut converted = false;
        for site in sites {
            let mode = if site.inside_try && target.is_external() {
                context.ignore_try_catch.mode(source)
            } else {
                TryCatchMode::Convert
            };
            match mode {
                TryCatchMode::Untouched => trace!(source, "require left in try block"),
                TryCatchMode::Remove => {
                    if site.uses_return_value {
                        edit.overwrite(site.call, "undefined")?;
                    } else {
                        edit.remove(site.to_be_removed)?;
                    }
                }
                TryCatchMode::Convert => {
                    converted = true;
                    if target.is_wrapped() {
                        let name = name.get_or_insert_with(|| uid(table, &mut next_uid));
                        edit.overwrite(site.call, format!("{name}()"))?;
                    } else if site.uses_return_value {
                        let name = name.get_or_insert_with(|| uid(table, &mut next_uid));
                        edit.overwrite(site.call, name.as_str())?;
                    } else {
                        edit.remove(site.to_be_removed)?;
                    }
                }
            }
        }
        if converted {
            imports.lines.push(import_line(target, name.as_deref()));
            if target.is_wrapped() {
                imports.wrapped_imports.push(target.id.clone());
            }
        }
    }
    Ok(imports)
}

fn import_line(target: &RequireTarget, name: Option<&str>) -> String {
    match name {
        Some(name) if target.is_wrapped() => {
            format!("import {{ __require as {name} }} from {};", json_string(&target.id))
        }
        Some(name) => format!("import {name} from {};", json_string(&target.import_id())),
        None => format!("import {};", json_string(&target.import_id())),
    }
}

/// The next free `require$$N`.
fn uid(table: &mut NameTable, next: &mut usize) -> String {
    loop {
        let candidate = format!("require$${next}");
        *next += 1;
        if !table.contains(&candidate) {
            return table.deconflict(&candidate);
        }
    }
}

/// Sites grouped by source, in first-seen order.
fn group_by_source(sites: &[RequireSite]) -> Vec<(&str, Vec<&RequireSite>)> {
    let mut groups: Vec<(&str, Vec<&RequireSite>)> = Vec::new();
    for site in sites {
        match groups.iter_mut().find(|(source, _)| *source == site.source) {
            Some((_, group)) => group.push(site),
            None => groups.push((&site.source, vec![site])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn test_uid_skips_taken_names() {
        let taken: FxHashSet<String> = ["require$$0".to_string()].into_iter().collect();
        let mut table = NameTable::new(taken);
        let mut next = 0;
        assert_eq!(uid(&mut table, &mut next), "require$$1");
        assert_eq!(uid(&mut table, &mut next), "require$$2");
        assert!(table.contains("require$$2"));
    }
}
