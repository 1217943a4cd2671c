// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Include/exclude glob filtering of module ids.

use crate::error::{InteropError, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Decides whether a module id is selected by include/exclude globs.
///
/// Relative patterns are resolved against a base directory; patterns that
/// are absolute or start with `**` are used as written. Synthetic ids never
/// match.
#[derive(Debug, Clone, Default)]
pub struct IdFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl IdFilter {
    /// A filter accepting every file id.
    pub fn all() -> Self {
        Self::default()
    }

    /// Compiles the patterns. `option` names the option in errors.
    pub fn new(option: &str, include: &[String], exclude: &[String], base: &Path) -> Result<Self> {
        Ok(Self {
            include: compile(option, include, base)?,
            exclude: compile(option, exclude, base)?,
        })
    }

    /// Returns true if `id` is included and not excluded.
    pub fn matches(&self, id: &str) -> bool {
        if id.contains('\0') {
            return false;
        }
        let id = normalize_path_slashes(id);
        if self.exclude.as_ref().is_some_and(|set| set.is_match(&id)) {
            return false;
        }
        match &self.include {
            Some(set) => set.is_match(&id),
            None => true,
        }
    }
}

fn compile(option: &str, patterns: &[String], base: &Path) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = resolve_pattern(pattern, base);
        let glob = GlobBuilder::new(&pattern)
            .literal_separator(true)
            .build()
            .map_err(|err| InteropError::invalid_option(option, err.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map(Some)
        .map_err(|err| InteropError::invalid_option(option, err.to_string()))
}

fn resolve_pattern(pattern: &str, base: &Path) -> String {
    let pattern = normalize_path_slashes(pattern);
    if pattern.starts_with("**") || Path::new(&pattern).is_absolute() || pattern.starts_with('/') {
        return pattern;
    }
    let pattern = pattern.trim_start_matches("./");
    let base = normalize_path_slashes(&base.to_string_lossy());
    format!("{}/{pattern}", base.trim_end_matches('/'))
}

/// Converts Windows separators to `/`.
pub fn normalize_path_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(include: &[&str], exclude: &[&str]) -> IdFilter {
        let include: Vec<String> = include.iter().map(|s| s.to_string()).collect();
        let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
        IdFilter::new("include", &include, &exclude, Path::new("/project")).unwrap()
    }

    #[test]
    fn test_empty_filter_accepts_files_only() {
        let all = IdFilter::all();
        assert!(all.matches("/project/a.js"));
        assert!(!all.matches("\0/project/a.js?commonjs-proxy"));
    }

    #[test]
    fn test_relative_patterns_use_base() {
        let filter = filter(&["node_modules/**"], &[]);
        assert!(filter.matches("/project/node_modules/lodash/index.js"));
        assert!(!filter.matches("/project/src/index.js"));
    }

    #[test]
    fn test_exclude_wins() {
        let filter = filter(&["**/*.js"], &["**/vendor/**"]);
        assert!(filter.matches("/project/src/a.js"));
        assert!(!filter.matches("/project/vendor/a.js"));
    }

    #[test]
    fn test_star_does_not_cross_directories() {
        let filter = filter(&["src/*.js"], &[]);
        assert!(filter.matches("/project/src/a.js"));
        assert!(!filter.matches("/project/src/nested/a.js"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = IdFilter::new("strictRequires", &["src/[".to_string()], &[], Path::new("/")).unwrap_err();
        assert_eq!(err.code(), "INVALID_OPTION");
    }
}
