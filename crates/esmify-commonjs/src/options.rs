// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Plugin options.
//!
//! Options deserialize from the usual camelCase JSON configuration. Values
//! that may also be a function of the module id in a JavaScript config are
//! available as closures through the `*_with` builder methods.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// A per-id callback.
pub type IdFn<T> = Arc<dyn Fn(&str) -> T + Send + Sync>;

/// A per-id callback stored in a plain options field.
#[derive(Clone)]
pub struct Callback<T>(pub IdFn<T>);

impl<T> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// Raw JSON shape shared by the bool-or-string-or-list options.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// `true` / `false`
    Bool(bool),
    /// A keyword or a single pattern
    Name(String),
    /// A list of ids or patterns
    List(Vec<String>),
}

/// Matches ids against a fixed answer, a list or a callback.
#[derive(Clone)]
pub enum IdMatcher {
    /// Same answer for every id
    Bool(bool),
    /// Ids listed verbatim
    List(Vec<String>),
    /// Callback
    Custom(IdFn<bool>),
}

impl IdMatcher {
    /// Wraps a callback.
    pub fn custom(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        IdMatcher::Custom(Arc::new(f))
    }

    /// Returns true if `id` matches.
    pub fn matches(&self, id: &str) -> bool {
        match self {
            IdMatcher::Bool(value) => *value,
            IdMatcher::List(ids) => ids.iter().any(|listed| listed == id),
            IdMatcher::Custom(f) => f(id),
        }
    }
}

impl Default for IdMatcher {
    fn default() -> Self {
        IdMatcher::Bool(false)
    }
}

impl fmt::Debug for IdMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdMatcher::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            IdMatcher::List(ids) => f.debug_tuple("List").field(ids).finish(),
            IdMatcher::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for IdMatcher {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match OptionValue::deserialize(deserializer)? {
            OptionValue::Bool(value) => Ok(IdMatcher::Bool(value)),
            OptionValue::Name(id) => Ok(IdMatcher::List(vec![id])),
            OptionValue::List(ids) => Ok(IdMatcher::List(ids)),
        }
    }
}

/// What to do with a require of an external module inside `try`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryCatchMode {
    /// Leave the `require` call as written
    Untouched,
    /// Convert it like any other require
    Convert,
    /// Drop it
    Remove,
}

/// `ignoreTryCatch`
#[derive(Clone)]
pub enum TryCatchPolicy {
    /// Same mode for every id
    Fixed(TryCatchMode),
    /// Listed sources stay untouched, others are converted
    Listed(Vec<String>),
    /// Callback
    Custom(IdFn<TryCatchMode>),
}

impl TryCatchPolicy {
    /// Mode for a require of `source`.
    pub fn mode(&self, source: &str) -> TryCatchMode {
        match self {
            TryCatchPolicy::Fixed(mode) => *mode,
            TryCatchPolicy::Listed(ids) if ids.iter().any(|id| id == source) => TryCatchMode::Untouched,
            TryCatchPolicy::Listed(_) => TryCatchMode::Convert,
            TryCatchPolicy::Custom(f) => f(source),
        }
    }
}

impl Default for TryCatchPolicy {
    fn default() -> Self {
        TryCatchPolicy::Fixed(TryCatchMode::Untouched)
    }
}

impl fmt::Debug for TryCatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryCatchPolicy::Fixed(mode) => f.debug_tuple("Fixed").field(mode).finish(),
            TryCatchPolicy::Listed(ids) => f.debug_tuple("Listed").field(ids).finish(),
            TryCatchPolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for TryCatchPolicy {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match OptionValue::deserialize(deserializer)? {
            OptionValue::Bool(true) => Ok(TryCatchPolicy::Fixed(TryCatchMode::Untouched)),
            OptionValue::Bool(false) => Ok(TryCatchPolicy::Fixed(TryCatchMode::Convert)),
            OptionValue::Name(name) if name == "remove" => Ok(TryCatchPolicy::Fixed(TryCatchMode::Remove)),
            OptionValue::Name(name) => Err(serde::de::Error::custom(format!(
                "unknown ignoreTryCatch mode \"{name}\", expected true, false, \"remove\" or a list"
            ))),
            OptionValue::List(ids) => Ok(TryCatchPolicy::Listed(ids)),
        }
    }
}

/// `strictRequires`
#[derive(Clone, Default)]
pub enum StrictRequires {
    /// Wrap every CommonJS module
    Always,
    /// Never wrap unless a module needs it
    Never,
    /// Wrap modules that are conditionally required or part of a cycle
    #[default]
    Auto,
    /// `Auto`, and report the wrapped modules at the end of the build
    Debug,
    /// Wrap modules matching these globs
    Matching(Vec<String>),
    /// Callback
    Custom(IdFn<bool>),
}

impl StrictRequires {
    /// Whether cycles and conditional requires promote modules to wrapped.
    pub fn detects_cycles_and_conditional(&self) -> bool {
        matches!(self, StrictRequires::Auto | StrictRequires::Debug)
    }
}

impl fmt::Debug for StrictRequires {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrictRequires::Always => f.write_str("Always"),
            StrictRequires::Never => f.write_str("Never"),
            StrictRequires::Auto => f.write_str("Auto"),
            StrictRequires::Debug => f.write_str("Debug"),
            StrictRequires::Matching(patterns) => f.debug_tuple("Matching").field(patterns).finish(),
            StrictRequires::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for StrictRequires {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match OptionValue::deserialize(deserializer)? {
            OptionValue::Bool(true) => StrictRequires::Always,
            OptionValue::Bool(false) => StrictRequires::Never,
            OptionValue::Name(name) if name == "auto" => StrictRequires::Auto,
            OptionValue::Name(name) if name == "debug" => StrictRequires::Debug,
            OptionValue::Name(pattern) => StrictRequires::Matching(vec![pattern]),
            OptionValue::List(patterns) => StrictRequires::Matching(patterns),
        })
    }
}

/// `requireReturnsDefault`: what a `require` of an ES module returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequireReturnsDefault {
    /// The default export
    True,
    /// The namespace, made to look like CommonJS output
    #[default]
    False,
    /// The default export if it is the only export, else the namespace
    Auto,
    /// The default export if there is one, else the namespace
    Preferred,
    /// The raw namespace
    Namespace,
}

impl<'de> Deserialize<'de> for RequireReturnsDefault {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match OptionValue::deserialize(deserializer)? {
            OptionValue::Bool(true) => Ok(RequireReturnsDefault::True),
            OptionValue::Bool(false) => Ok(RequireReturnsDefault::False),
            OptionValue::Name(name) => match name.as_str() {
                "auto" => Ok(RequireReturnsDefault::Auto),
                "preferred" => Ok(RequireReturnsDefault::Preferred),
                "namespace" => Ok(RequireReturnsDefault::Namespace),
                other => Err(serde::de::Error::custom(format!(
                    "unknown requireReturnsDefault mode \"{other}\""
                ))),
            },
            OptionValue::List(_) => Err(serde::de::Error::custom(
                "requireReturnsDefault must be a boolean or one of \"auto\", \"preferred\", \"namespace\"",
            )),
        }
    }
}

/// `defaultIsModuleExports`: what the default export of a converted module is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultIsModuleExports {
    /// `module.exports`
    True,
    /// `module.exports.default`
    False,
    /// `module.exports.default` for transpiled ES modules, else `module.exports`
    #[default]
    Auto,
}

impl<'de> Deserialize<'de> for DefaultIsModuleExports {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match OptionValue::deserialize(deserializer)? {
            OptionValue::Bool(true) => Ok(DefaultIsModuleExports::True),
            OptionValue::Bool(false) => Ok(DefaultIsModuleExports::False),
            OptionValue::Name(name) if name == "auto" => Ok(DefaultIsModuleExports::Auto),
            _ => Err(serde::de::Error::custom(
                "defaultIsModuleExports must be true, false or \"auto\"",
            )),
        }
    }
}

fn string_or_list<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    match OptionValue::deserialize(deserializer)? {
        OptionValue::Name(value) => Ok(vec![value]),
        OptionValue::List(values) => Ok(values),
        OptionValue::Bool(_) => Err(serde::de::Error::custom("expected a string or a list of strings")),
    }
}

fn default_extensions() -> Vec<String> {
    vec![".js".to_string()]
}

fn default_true() -> bool {
    true
}

/// Options of the CommonJS plugin.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonJsOptions {
    /// Globs of modules to transform (all when empty)
    #[serde(default, deserialize_with = "string_or_list")]
    pub include: Vec<String>,
    /// Globs of modules to leave alone
    #[serde(default, deserialize_with = "string_or_list")]
    pub exclude: Vec<String>,
    /// Extensions treated as CommonJS candidates (`.cjs` always is)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Require sources left as `require` calls
    #[serde(default)]
    pub ignore: IdMatcher,
    /// Leave `global` alone
    #[serde(default)]
    pub ignore_global: bool,
    /// Leave non-constant requires alone instead of failing
    #[serde(default)]
    pub ignore_dynamic_requires: bool,
    /// Handling of requires of external modules inside `try`
    #[serde(default)]
    pub ignore_try_catch: TryCatchPolicy,
    /// Which modules are wrapped in lazy factories
    #[serde(default)]
    pub strict_requires: StrictRequires,
    /// Files reachable through non-constant requires
    #[serde(default, deserialize_with = "string_or_list")]
    pub dynamic_require_targets: Vec<String>,
    /// Directory the dynamic require table is rooted at
    #[serde(default)]
    pub dynamic_require_root: Option<PathBuf>,
    /// Which external modules are ES modules
    #[serde(default)]
    pub esm_externals: IdMatcher,
    /// What a `require` of an ES module returns
    #[serde(default)]
    pub require_returns_default: RequireReturnsDefault,
    /// Per-id override of `require_returns_default`
    #[serde(skip)]
    pub require_returns_default_fn: Option<Callback<RequireReturnsDefault>>,
    /// What the default export of a converted module is
    #[serde(default)]
    pub default_is_module_exports: DefaultIsModuleExports,
    /// Rewrite requires inside ES modules too
    #[serde(default)]
    pub transform_mixed_es_modules: bool,
    /// Produce source maps
    #[serde(default = "default_true")]
    pub source_map: bool,
    /// Removed option, only warned about
    #[serde(default)]
    pub named_exports: Option<serde_json::Value>,
    /// Base directory for relative globs (the current directory when unset)
    #[serde(skip)]
    pub cwd: Option<PathBuf>,
}

impl Default for CommonJsOptions {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            extensions: default_extensions(),
            ignore: IdMatcher::default(),
            ignore_global: false,
            ignore_dynamic_requires: false,
            ignore_try_catch: TryCatchPolicy::default(),
            strict_requires: StrictRequires::default(),
            dynamic_require_targets: Vec::new(),
            dynamic_require_root: None,
            esm_externals: IdMatcher::default(),
            require_returns_default: RequireReturnsDefault::default(),
            require_returns_default_fn: None,
            default_is_module_exports: DefaultIsModuleExports::default(),
            transform_mixed_es_modules: false,
            source_map: true,
            named_exports: None,
            cwd: None,
        }
    }
}

impl CommonJsOptions {
    /// Parses options from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Decides per require source whether to leave it alone.
    pub fn ignore_with(mut self, f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.ignore = IdMatcher::custom(f);
        self
    }

    /// Decides per external id whether it is an ES module.
    pub fn esm_externals_with(mut self, f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.esm_externals = IdMatcher::custom(f);
        self
    }

    /// Decides per require source what happens inside `try`.
    pub fn ignore_try_catch_with(mut self, f: impl Fn(&str) -> TryCatchMode + Send + Sync + 'static) -> Self {
        self.ignore_try_catch = TryCatchPolicy::Custom(Arc::new(f));
        self
    }

    /// Decides per module whether it is wrapped.
    pub fn strict_requires_with(mut self, f: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.strict_requires = StrictRequires::Custom(Arc::new(f));
        self
    }

    /// Decides per required ES module what `require` returns.
    pub fn require_returns_default_with(
        mut self,
        f: impl Fn(&str) -> RequireReturnsDefault + Send + Sync + 'static,
    ) -> Self {
        self.require_returns_default_fn = Some(Callback(Arc::new(f)));
        self
    }

    /// `requireReturnsDefault` for `id`.
    pub fn require_returns_default_for(&self, id: &str) -> RequireReturnsDefault {
        match &self.require_returns_default_fn {
            Some(Callback(f)) => f(id),
            None => self.require_returns_default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CommonJsOptions::from_json("{}").unwrap();
        assert_eq!(options.extensions, vec![".js"]);
        assert!(options.source_map);
        assert!(options.strict_requires.detects_cycles_and_conditional());
        assert_eq!(options.ignore_try_catch.mode("x"), TryCatchMode::Untouched);
        assert_eq!(options.default_is_module_exports, DefaultIsModuleExports::Auto);
        assert_eq!(options.require_returns_default, RequireReturnsDefault::False);
        assert!(!options.esm_externals.matches("lodash"));
    }

    #[test]
    fn test_bool_or_string_values() {
        let options = CommonJsOptions::from_json(
            r#"{
                "include": "node_modules/**",
                "ignore": ["fs", "path"],
                "ignoreTryCatch": "remove",
                "strictRequires": ["src/**/*.js"],
                "esmExternals": true,
                "requireReturnsDefault": "preferred",
                "defaultIsModuleExports": false,
                "sourceMap": false
            }"#,
        )
        .unwrap();
        assert_eq!(options.include, vec!["node_modules/**"]);
        assert!(options.ignore.matches("fs"));
        assert!(!options.ignore.matches("os"));
        assert_eq!(options.ignore_try_catch.mode("x"), TryCatchMode::Remove);
        assert!(matches!(options.strict_requires, StrictRequires::Matching(ref p) if p.len() == 1));
        assert!(options.esm_externals.matches("anything"));
        assert_eq!(options.require_returns_default, RequireReturnsDefault::Preferred);
        assert_eq!(options.default_is_module_exports, DefaultIsModuleExports::False);
        assert!(!options.source_map);
    }

    #[test]
    fn test_try_catch_list() {
        let options = CommonJsOptions::from_json(r#"{ "ignoreTryCatch": ["optional-dep"] }"#).unwrap();
        assert_eq!(options.ignore_try_catch.mode("optional-dep"), TryCatchMode::Untouched);
        assert_eq!(options.ignore_try_catch.mode("other"), TryCatchMode::Convert);
    }

    #[test]
    fn test_rejects_unknown_keywords() {
        assert!(CommonJsOptions::from_json(r#"{ "ignoreTryCatch": "keep" }"#).is_err());
        assert!(CommonJsOptions::from_json(r#"{ "requireReturnsDefault": "maybe" }"#).is_err());
        assert!(CommonJsOptions::from_json(r#"{ "defaultIsModuleExports": "yes" }"#).is_err());
    }

    #[test]
    fn test_builders() {
        let options = CommonJsOptions::default()
            .ignore_with(|id| id.starts_with("node:"))
            .require_returns_default_with(|id| {
                if id.ends_with(".mjs") {
                    RequireReturnsDefault::Namespace
                } else {
                    RequireReturnsDefault::Auto
                }
            });
        assert!(options.ignore.matches("node:fs"));
        assert_eq!(options.require_returns_default_for("/a.mjs"), RequireReturnsDefault::Namespace);
        assert_eq!(options.require_returns_default_for("/a.js"), RequireReturnsDefault::Auto);
    }
}
