// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Require-target resolution.
//!
//! For every require source of a module the resolver asks the host where it
//! points, records the require edge and makes sure the target is transformed
//! before the importer is finalized, so that the target's CommonJS type is
//! known when the import form is chosen.
//!
//! With cycle and conditional detection on, a converted module that is only
//! ever required conditionally, or that sits on a require cycle, is promoted
//! to the wrapped form. Once a module's type was handed out to an importer it
//! never changes again during the build.

use crate::error::Result;
use crate::ids::{wrap_id, ProxyKind};
use crate::registry::{CommonJsType, WrappedIdLog};
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

/// Where the host resolved a specifier to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedId {
    /// Resolved module id
    pub id: String,
    /// The module is not part of the graph
    pub external: bool,
}

impl ResolvedId {
    /// A module inside the graph.
    pub fn internal(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            external: false,
        }
    }

    /// A module outside the graph.
    pub fn external(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            external: true,
        }
    }
}

/// Capabilities the build host provides to the engine.
pub trait ModuleHost: Send + Sync {
    /// Resolves `source` as imported from `importer`. `None` when it cannot
    /// be resolved.
    fn resolve(&self, source: &str, importer: &str) -> Option<ResolvedId>;

    /// Makes sure `id` has gone through the plugin's `transform`.
    fn load(&self, id: &str) -> Result<()>;
}

/// One distinct require source of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireRequest {
    /// Specifier as written
    pub source: String,
    /// Every require of this source is inside a conditional context
    pub is_conditional: bool,
}

/// How one require source ends up being imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequireTarget {
    /// Specifier as written
    pub source: String,
    /// Resolved id (a synthetic id for externals)
    pub id: String,
    /// Type of the target, if it is a converted or analyzed module
    pub commonjs: Option<CommonJsType>,
    allow_proxy: bool,
}

impl RequireTarget {
    /// The target is imported through its `__require` getter.
    pub fn is_wrapped(&self) -> bool {
        self.allow_proxy && self.commonjs == Some(CommonJsType::Wrapped)
    }

    /// The target could not be resolved into the graph.
    pub fn is_external(&self) -> bool {
        ProxyKind::parse(&self.id).is_some_and(|(kind, _)| kind == ProxyKind::External)
    }

    /// The id the rewritten module imports from.
    pub fn import_id(&self) -> String {
        if !self.allow_proxy || self.is_wrapped() {
            self.id.clone()
        } else {
            wrap_id(&self.id, ProxyKind::RequireProxy)
        }
    }
}

/// Result of resolving the require sources of one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequires {
    /// Final type of the requiring module
    pub parent_type: CommonJsType,
    /// One entry per requested source, in request order
    pub targets: Vec<RequireTarget>,
}

#[derive(Debug, Default)]
struct RequireGraph {
    known_types: FxHashMap<String, CommonJsType>,
    required: FxHashSet<String>,
    unconditionally_required: FxHashSet<String>,
    dependencies: FxHashMap<String, FxHashSet<String>>,
    fully_analyzed: FxHashSet<String>,
}

impl RequireGraph {
    fn is_cyclic(&self, id: &str) -> bool {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut stack: Vec<&str> = match self.dependencies.get(id) {
            Some(deps) => deps.iter().map(String::as_str).collect(),
            None => return false,
        };
        while let Some(dependency) = stack.pop() {
            if dependency == id {
                return true;
            }
            if !seen.insert(dependency) {
                continue;
            }
            if let Some(children) = self.dependencies.get(dependency) {
                stack.extend(children.iter().map(String::as_str));
            }
        }
        false
    }

    fn is_only_conditionally_required(&self, id: &str) -> bool {
        self.required.contains(id) && !self.unconditionally_required.contains(id)
    }
}

/// Tracks require edges and the CommonJS type of every module.
#[derive(Debug)]
pub struct RequireResolver {
    detect_cycles_and_conditional: bool,
    graph: Mutex<RequireGraph>,
    wrapped: WrappedIdLog,
}

impl RequireResolver {
    /// Creates a resolver. `detect_cycles_and_conditional` enables the
    /// automatic promotion to the wrapped form.
    pub fn new(detect_cycles_and_conditional: bool) -> Self {
        Self {
            detect_cycles_and_conditional,
            graph: Mutex::new(RequireGraph::default()),
            wrapped: WrappedIdLog::new(),
        }
    }

    /// Ids that ended up wrapped, in the order they were decided.
    pub fn wrapped_ids(&self) -> Vec<String> {
        self.wrapped.ids()
    }

    /// Returns true once any converted module required `id`.
    pub fn is_required_id(&self, id: &str) -> bool {
        self.graph.lock().required.contains(id)
    }

    /// The type recorded for `id`, if it has been seen as a requiring module.
    pub fn known_type(&self, id: &str) -> Option<CommonJsType> {
        self.graph.lock().known_types.get(id).copied()
    }

    fn set_type(&self, graph: &mut RequireGraph, id: &str, commonjs: CommonJsType) {
        if commonjs == CommonJsType::Wrapped {
            self.wrapped.record(id);
        }
        graph.known_types.insert(id.to_string(), commonjs);
    }

    fn set_initial_parent_type(&self, parent: &str, initial: CommonJsType) {
        let mut graph = self.graph.lock();
        if graph.fully_analyzed.contains(parent) {
            return;
        }
        let commonjs = if self.detect_cycles_and_conditional
            && initial == CommonJsType::CommonJs
            && graph.is_only_conditionally_required(parent)
        {
            CommonJsType::Wrapped
        } else {
            initial
        };
        self.set_type(&mut graph, parent, commonjs);
    }

    fn type_for_fully_analyzed(&self, graph: &mut RequireGraph, id: &str) -> Option<CommonJsType> {
        let known = graph.known_types.get(id).copied();
        if known != Some(CommonJsType::CommonJs)
            || !self.detect_cycles_and_conditional
            || graph.fully_analyzed.contains(id)
        {
            return known;
        }
        if graph.is_cyclic(id) || graph.is_only_conditionally_required(id) {
            debug!(id, "promoting to wrapped");
            self.set_type(graph, id, CommonJsType::Wrapped);
            return Some(CommonJsType::Wrapped);
        }
        known
    }

    /// Records the edge and returns whether the child should be loaded.
    /// Adding the edge and checking for a cycle happen under one lock, so
    /// of two modules requiring each other at the same time exactly one
    /// waits for the other.
    fn add_require_edge(&self, parent: &str, child: &str, is_conditional: bool) -> bool {
        let mut graph = self.graph.lock();
        graph.required.insert(child.to_string());
        let parent_wrapped = graph.known_types.get(parent) == Some(&CommonJsType::Wrapped);
        if !(is_conditional || parent_wrapped) {
            graph.unconditionally_required.insert(child.to_string());
        }
        graph
            .dependencies
            .entry(parent.to_string())
            .or_default()
            .insert(child.to_string());
        !graph.is_cyclic(child)
    }

    /// Resolves the require sources of `parent`, loading every resolved
    /// target first, and fixes the final type of the parent and its targets.
    pub fn resolve_require_sources(
        &self,
        parent: &str,
        initial: CommonJsType,
        requests: &[RequireRequest],
        host: &dyn ModuleHost,
    ) -> Result<ResolvedRequires> {
        self.set_initial_parent_type(parent, initial);

        let mut resolved: Vec<(String, bool)> = Vec::with_capacity(requests.len());
        for request in requests {
            if request.source.starts_with('\0') {
                resolved.push((request.source.clone(), false));
                continue;
            }
            let target = match host.resolve(&request.source, parent) {
                None => wrap_id(&request.source, ProxyKind::External),
                Some(ResolvedId { id, external: true }) => wrap_id(&id, ProxyKind::External),
                Some(ResolvedId { id, external: false }) => {
                    if self.add_require_edge(parent, &id, request.is_conditional) {
                        host.load(&id)?;
                    }
                    resolved.push((id, true));
                    continue;
                }
            };
            resolved.push((target, false));
        }

        let mut graph = self.graph.lock();
        let parent_type = self
            .type_for_fully_analyzed(&mut graph, parent)
            .unwrap_or(initial);
        graph.fully_analyzed.insert(parent.to_string());

        let targets = requests
            .iter()
            .zip(resolved)
            .map(|(request, (id, allow_proxy))| {
                let commonjs = self.type_for_fully_analyzed(&mut graph, &id);
                graph.fully_analyzed.insert(id.clone());
                RequireTarget {
                    source: request.source.clone(),
                    id,
                    commonjs,
                    allow_proxy,
                }
            })
            .collect();

        Ok(ResolvedRequires { parent_type, targets })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InteropError;

    struct StaticHost;

    impl ModuleHost for StaticHost {
        fn resolve(&self, source: &str, _importer: &str) -> Option<ResolvedId> {
            match source {
                "fs" => Some(ResolvedId::external("fs")),
                "missing" => None,
                "broken" => Some(ResolvedId::internal("/broken.js")),
                other => Some(ResolvedId::internal(format!("/{}.js", other.trim_start_matches("./")))),
            }
        }

        fn load(&self, id: &str) -> Result<()> {
            if id == "/broken.js" {
                return Err(InteropError::Transform {
                    id: id.to_string(),
                    message: "boom".into(),
                });
            }
            Ok(())
        }
    }

    fn request(source: &str, is_conditional: bool) -> RequireRequest {
        RequireRequest {
            source: source.to_string(),
            is_conditional,
        }
    }

    #[test]
    fn test_externals_and_synthetic_sources() {
        let resolver = RequireResolver::new(true);
        let resolved = resolver
            .resolve_require_sources(
                "/a.js",
                CommonJsType::CommonJs,
                &[request("fs", false), request("missing", false), request("\0virtual", false)],
                &StaticHost,
            )
            .unwrap();
        assert_eq!(resolved.parent_type, CommonJsType::CommonJs);
        assert_eq!(resolved.targets[0].import_id(), "\0fs?commonjs-external");
        assert!(resolved.targets[0].is_external());
        assert_eq!(resolved.targets[1].import_id(), "\0missing?commonjs-external");
        assert_eq!(resolved.targets[2].import_id(), "\0virtual");
        assert!(!resolver.is_required_id("fs"));
    }

    #[test]
    fn test_internal_target_goes_through_proxy() {
        let resolver = RequireResolver::new(true);
        resolver
            .resolve_require_sources("/b.js", CommonJsType::CommonJs, &[], &StaticHost)
            .unwrap();
        let resolved = resolver
            .resolve_require_sources("/a.js", CommonJsType::CommonJs, &[request("./b", false)], &StaticHost)
            .unwrap();
        let target = &resolved.targets[0];
        assert_eq!(target.commonjs, Some(CommonJsType::CommonJs));
        assert!(!target.is_wrapped());
        assert_eq!(target.import_id(), "\0/b.js?commonjs-proxy");
        assert!(resolver.is_required_id("/b.js"));
    }

    /// Transforms modules on load, the way a real host does.
    struct GraphHost<'a> {
        resolver: &'a RequireResolver,
        edges: FxHashMap<&'static str, Vec<RequireRequest>>,
        loaded: Mutex<FxHashSet<String>>,
    }

    impl<'a> GraphHost<'a> {
        fn new(resolver: &'a RequireResolver, edges: &[(&'static str, &'static str, bool)]) -> Self {
            let mut map: FxHashMap<&'static str, Vec<RequireRequest>> = FxHashMap::default();
            for (from, to, is_conditional) in edges {
                map.entry(*from).or_default().push(request(to, *is_conditional));
            }
            Self {
                resolver,
                edges: map,
                loaded: Mutex::new(FxHashSet::default()),
            }
        }
    }

    impl ModuleHost for GraphHost<'_> {
        fn resolve(&self, source: &str, _importer: &str) -> Option<ResolvedId> {
            Some(ResolvedId::internal(format!("/{}.js", source.trim_start_matches("./"))))
        }

        fn load(&self, id: &str) -> Result<()> {
            if !self.loaded.lock().insert(id.to_string()) {
                return Ok(());
            }
            let requests = self.edges.get(id).cloned().unwrap_or_default();
            self.resolver
                .resolve_require_sources(id, CommonJsType::CommonJs, &requests, self)?;
            Ok(())
        }
    }

    #[test]
    fn test_conditionally_required_module_is_wrapped() {
        let resolver = RequireResolver::new(true);
        let host = GraphHost::new(&resolver, &[("/a.js", "./c", true), ("/a.js", "./d", false)]);
        host.load("/a.js").unwrap();
        assert_eq!(resolver.known_type("/c.js"), Some(CommonJsType::Wrapped));
        assert_eq!(resolver.known_type("/d.js"), Some(CommonJsType::CommonJs));
        assert_eq!(resolver.known_type("/a.js"), Some(CommonJsType::CommonJs));
        assert_eq!(resolver.wrapped_ids(), vec!["/c.js"]);
    }

    #[test]
    fn test_cycle_is_wrapped() {
        let resolver = RequireResolver::new(true);
        let host = GraphHost::new(&resolver, &[("/a.js", "./b", false), ("/b.js", "./a", false)]);
        host.load("/a.js").unwrap();
        assert_eq!(resolver.known_type("/a.js"), Some(CommonJsType::Wrapped));
        assert_eq!(resolver.known_type("/b.js"), Some(CommonJsType::Wrapped));
    }

    #[test]
    fn test_detection_disabled_keeps_types() {
        let resolver = RequireResolver::new(false);
        let host = GraphHost::new(&resolver, &[("/a.js", "./b", true), ("/b.js", "./a", false)]);
        host.load("/a.js").unwrap();
        assert_eq!(resolver.known_type("/b.js"), Some(CommonJsType::CommonJs));
        assert!(resolver.wrapped_ids().is_empty());
    }

    #[test]
    fn test_explicitly_wrapped_parent_is_logged() {
        let resolver = RequireResolver::new(false);
        let resolved = resolver
            .resolve_require_sources("/w.js", CommonJsType::Wrapped, &[], &StaticHost)
            .unwrap();
        assert_eq!(resolved.parent_type, CommonJsType::Wrapped);
        assert_eq!(resolver.known_type("/w.js"), Some(CommonJsType::Wrapped));
        assert_eq!(resolver.wrapped_ids(), vec!["/w.js"]);
    }

    #[test]
    fn test_load_errors_propagate() {
        let resolver = RequireResolver::new(true);
        let err = resolver
            .resolve_require_sources("/a.js", CommonJsType::CommonJs, &[request("broken", false)], &StaticHost)
            .unwrap_err();
        assert_eq!(err.code(), "TRANSFORM_ERROR");
    }
}
