// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Build-wide facts about modules.
//!
//! Every transform records what it learned about its own module here, and
//! proxy generation reads it back. Writes only ever add facts, so
//! concurrent transforms never conflict and an aborted build can keep
//! whatever was recorded.

use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;

/// How a module was handled, as reported back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommonJsType {
    /// Not converted (an ES module or a file without CommonJS markers)
    NotCommonJs,
    /// Converted in place
    CommonJs,
    /// Converted into a lazily executed factory
    Wrapped,
}

impl CommonJsType {
    /// True for both converted forms.
    pub fn is_commonjs(&self) -> bool {
        !matches!(self, CommonJsType::NotCommonJs)
    }
}

/// What the plugin recorded about a module that passed through `transform`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleMeta {
    /// `None` when the module was outside the plugin's filters
    pub commonjs: Option<CommonJsType>,
}

/// Export facts of one module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportShape {
    /// Exposes a default-like export
    pub has_default_export: bool,
    /// Exposes named exports
    pub has_named_exports: bool,
}

/// Append-only export facts for every module of a build.
#[derive(Debug, Default)]
pub struct ExportRegistry {
    default_exports: DashSet<String>,
    named_exports: DashSet<String>,
    metas: DashMap<String, ModuleMeta>,
}

impl ExportRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `id` has a default-like export.
    pub fn record_default_export(&self, id: &str) {
        self.default_exports.insert(id.to_string());
    }

    /// Records that `id` has named exports.
    pub fn record_named_exports(&self, id: &str) {
        self.named_exports.insert(id.to_string());
    }

    /// Returns true once a default export was recorded for `id`.
    pub fn has_default_export(&self, id: &str) -> bool {
        self.default_exports.contains(id)
    }

    /// Returns true once named exports were recorded for `id`.
    pub fn has_named_exports(&self, id: &str) -> bool {
        self.named_exports.contains(id)
    }

    /// Marks `id` as transformed. Its shape is final from now on.
    ///
    /// The first recorded meta wins.
    pub fn mark_analyzed(&self, id: &str, meta: ModuleMeta) {
        self.metas.entry(id.to_string()).or_insert(meta);
    }

    /// Returns true once `id` went through `transform`.
    pub fn is_analyzed(&self, id: &str) -> bool {
        self.metas.contains_key(id)
    }

    /// What was recorded about `id`, if it went through `transform`.
    pub fn meta(&self, id: &str) -> Option<ModuleMeta> {
        self.metas.get(id).map(|entry| *entry)
    }

    /// The export shape of `id`, or `None` while it has not been
    /// transformed yet.
    pub fn shape(&self, id: &str) -> Option<ExportShape> {
        if !self.is_analyzed(id) {
            return None;
        }
        Some(ExportShape {
            has_default_export: self.has_default_export(id),
            has_named_exports: self.has_named_exports(id),
        })
    }
}

/// Ordered, de-duplicated list of ids that were wrapped.
#[derive(Debug, Default)]
pub struct WrappedIdLog {
    ids: Mutex<Vec<String>>,
}

impl WrappedIdLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` unless it is already listed.
    pub fn record(&self, id: &str) {
        let mut ids = self.ids.lock();
        if !ids.iter().any(|known| known == id) {
            ids.push(id.to_string());
        }
    }

    /// Logged ids in recording order.
    pub fn ids(&self) -> Vec<String> {
        self.ids.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_shape_is_deferred_until_analyzed() {
        let registry = ExportRegistry::new();
        registry.record_named_exports("/a.js");
        assert_eq!(registry.shape("/a.js"), None);

        registry.mark_analyzed(
            "/a.js",
            ModuleMeta {
                commonjs: Some(CommonJsType::NotCommonJs),
            },
        );
        assert_eq!(
            registry.shape("/a.js"),
            Some(ExportShape {
                has_default_export: false,
                has_named_exports: true,
            })
        );
    }

    #[test]
    fn test_writes_are_idempotent() {
        let registry = ExportRegistry::new();
        registry.record_default_export("/a.js");
        registry.record_default_export("/a.js");
        assert!(registry.has_default_export("/a.js"));
        assert!(!registry.has_named_exports("/a.js"));

        let first = ModuleMeta {
            commonjs: Some(CommonJsType::Wrapped),
        };
        registry.mark_analyzed("/a.js", first);
        registry.mark_analyzed("/a.js", ModuleMeta { commonjs: None });
        assert_eq!(registry.meta("/a.js"), Some(first));
    }

    #[test]
    fn test_concurrent_writers() {
        let registry = Arc::new(ExportRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    let id = format!("/m{}.js", i % 4);
                    registry.record_default_export(&id);
                    registry.record_named_exports(&id);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        for i in 0..4 {
            assert!(registry.has_default_export(&format!("/m{i}.js")));
        }
    }

    #[test]
    fn test_wrapped_id_log() {
        let log = WrappedIdLog::new();
        log.record("/b.js");
        log.record("/a.js");
        log.record("/b.js");
        assert_eq!(log.ids(), vec!["/b.js", "/a.js"]);
    }
}
