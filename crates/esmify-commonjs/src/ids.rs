// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Synthetic module ids.
//!
//! Every module this crate generates is addressed by an id starting with a
//! NUL byte, which hosts treat as "virtual, do not touch the file system".
//! Proxies carry the id of the module they stand for plus a suffix naming
//! their kind, so the id alone is enough to regenerate them.

/// The shared helper module.
pub const HELPERS_ID: &str = "\0commonjsHelpers.js";

/// The dynamic require registry module.
pub const DYNAMIC_MODULES_ID: &str = "\0commonjs-dynamic-modules";

/// Kind of a proxy module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyKind {
    /// `{ exports: {} }` placeholder for modules using `module`
    ModulePlaceholder,
    /// `{}` placeholder for modules only using `exports`
    ExportsPlaceholder,
    /// Adapts a module outside the graph
    External,
    /// Lets an ES module import a wrapped CommonJS module
    EsImport,
    /// What a `require` of a module inside the graph returns
    RequireProxy,
}

impl ProxyKind {
    /// Every kind, in suffix matching order.
    pub const ALL: [ProxyKind; 5] = [
        ProxyKind::ModulePlaceholder,
        ProxyKind::ExportsPlaceholder,
        ProxyKind::External,
        ProxyKind::EsImport,
        ProxyKind::RequireProxy,
    ];

    /// The id suffix of this kind.
    pub fn suffix(&self) -> &'static str {
        match self {
            ProxyKind::ModulePlaceholder => "?commonjs-module",
            ProxyKind::ExportsPlaceholder => "?commonjs-exports",
            ProxyKind::External => "?commonjs-external",
            ProxyKind::EsImport => "?commonjs-es-import",
            ProxyKind::RequireProxy => "?commonjs-proxy",
        }
    }

    /// Splits a synthetic id into its kind and base id.
    pub fn parse(id: &str) -> Option<(ProxyKind, &str)> {
        ProxyKind::ALL
            .into_iter()
            .find_map(|kind| unwrap_id(id, kind).map(|base| (kind, base)))
    }
}

/// Builds the synthetic id of a `kind` proxy for `id`.
pub fn wrap_id(id: &str, kind: ProxyKind) -> String {
    format!("\0{id}{}", kind.suffix())
}

/// Returns the base id if `id` is a `kind` proxy id.
pub fn unwrap_id(id: &str, kind: ProxyKind) -> Option<&str> {
    id.strip_prefix('\0')?.strip_suffix(kind.suffix())
}

/// Returns true if `id` is a `kind` proxy id.
pub fn is_wrapped_id(id: &str, kind: ProxyKind) -> bool {
    unwrap_id(id, kind).is_some()
}

/// Returns true for ids that do not name a file.
pub fn is_synthetic(id: &str) -> bool {
    id.starts_with('\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_and_unwrap() {
        let id = wrap_id("/src/foo.js", ProxyKind::RequireProxy);
        assert_eq!(id, "\0/src/foo.js?commonjs-proxy");
        assert_eq!(unwrap_id(&id, ProxyKind::RequireProxy), Some("/src/foo.js"));
        assert_eq!(unwrap_id(&id, ProxyKind::External), None);
        assert!(is_synthetic(&id));
        assert!(!is_synthetic("/src/foo.js"));
    }

    #[test]
    fn test_parse_every_kind() {
        for kind in ProxyKind::ALL {
            let id = wrap_id("lodash", kind);
            assert_eq!(ProxyKind::parse(&id), Some((kind, "lodash")));
        }
        assert_eq!(ProxyKind::parse(HELPERS_ID), None);
        assert_eq!(ProxyKind::parse("/src/foo.js?commonjs-proxy"), None);
    }
}
