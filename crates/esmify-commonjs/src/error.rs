// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error and warning types for the interop engine

use esmify_syntax::{EditError, Location};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for interop operations
pub type Result<T> = std::result::Result<T, InteropError>;

/// Broad class of an [`InteropError`], for hosts that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The build configuration cannot work for this module graph
    Configuration,
    /// A module could not be parsed or rewritten
    Transform,
    /// A require target cannot be determined without running the program
    Resolution,
    /// Proxy generation was requested before the facts it needs exist
    NotReady,
    /// Reading a file failed
    Io,
}

/// Errors that can occur while transforming modules
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InteropError {
    /// A dynamic require happens in a module outside `dynamicRequireRoot`
    #[error(
        "\"{id}\" contains dynamic require statements but it is not within the current dynamicRequireRoot \"{root}\". You should set dynamicRequireRoot to \"{suggested_root}\" or one of its parent directories."
    )]
    DynamicRequireOutsideRoot {
        /// Offending module
        id: String,
        /// Configured root
        root: String,
        /// A root that would contain the module
        suggested_root: String,
    },

    /// A dynamic require while no dynamic require targets are configured
    #[error(
        "{id} ({location}): dynamic require of a non-constant target; configure dynamicRequireTargets or set ignoreDynamicRequires to leave it untouched"
    )]
    DynamicRequireDisabled {
        /// Offending module
        id: String,
        /// Position of the require call
        location: Location,
    },

    /// The module is not valid JavaScript
    #[error("{id} ({location}): {message}")]
    Parse {
        /// Offending module
        id: String,
        /// Parser message
        message: String,
        /// Position of the offending token
        location: Location,
    },

    /// Rewriting failed after the module was parsed
    #[error("{id}: could not transform module: {message}")]
    Transform {
        /// Offending module
        id: String,
        /// What went wrong
        message: String,
    },

    /// A proxy was requested before its module went through `transform`
    #[error("export shape of \"{id}\" is not known yet, transform the module first")]
    ShapeNotReady {
        /// Module whose shape is missing
        id: String,
    },

    /// An option value cannot be used
    #[error("invalid value for option \"{option}\": {reason}")]
    InvalidOption {
        /// Option name as written in the configuration
        option: String,
        /// Why it was rejected
        reason: String,
    },

    /// File system error
    #[error("{}: {message}", path.display())]
    Io {
        /// Path being read
        path: PathBuf,
        /// Error message
        message: String,
    },
}

impl InteropError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            InteropError::DynamicRequireOutsideRoot { .. } => "DYNAMIC_REQUIRE_OUTSIDE_ROOT",
            InteropError::DynamicRequireDisabled { .. } => "DYNAMIC_REQUIRE_DISABLED",
            InteropError::Parse { .. } => "PARSE_ERROR",
            InteropError::Transform { .. } => "TRANSFORM_ERROR",
            InteropError::ShapeNotReady { .. } => "SHAPE_NOT_READY",
            InteropError::InvalidOption { .. } => "INVALID_OPTION",
            InteropError::Io { .. } => "IO_ERROR",
        }
    }

    /// Error class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            InteropError::DynamicRequireOutsideRoot { .. } | InteropError::InvalidOption { .. } => {
                ErrorKind::Configuration
            }
            InteropError::DynamicRequireDisabled { .. } => ErrorKind::Resolution,
            InteropError::Parse { .. } | InteropError::Transform { .. } => ErrorKind::Transform,
            InteropError::ShapeNotReady { .. } => ErrorKind::NotReady,
            InteropError::Io { .. } => ErrorKind::Io,
        }
    }

    /// The module the error is about, when there is one.
    pub fn id(&self) -> Option<&str> {
        match self {
            InteropError::DynamicRequireOutsideRoot { id, .. }
            | InteropError::DynamicRequireDisabled { id, .. }
            | InteropError::Parse { id, .. }
            | InteropError::Transform { id, .. }
            | InteropError::ShapeNotReady { id } => Some(id),
            InteropError::InvalidOption { .. } | InteropError::Io { .. } => None,
        }
    }

    /// Wraps a parser error for module `id`.
    pub fn parse(id: &str, err: esmify_syntax::Error) -> Self {
        let esmify_syntax::Error::Syntax { message, location, .. } = err;
        InteropError::Parse {
            id: id.to_string(),
            message,
            location,
        }
    }

    /// Wraps an edit failure for module `id`.
    pub fn transform(id: &str, err: EditError) -> Self {
        InteropError::Transform {
            id: id.to_string(),
            message: err.to_string(),
        }
    }

    /// Creates an option error.
    pub fn invalid_option(option: &str, reason: impl Into<String>) -> Self {
        InteropError::InvalidOption {
            option: option.to_string(),
            reason: reason.into(),
        }
    }

    /// Creates an I/O error for `path`.
    pub fn io(path: &Path, err: std::io::Error) -> Self {
        InteropError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Code of a non-fatal diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCode {
    /// End-of-build list of modules that were wrapped
    WrappedIds,
    /// A removed option is still set
    DeprecatedOption,
}

impl WarningCode {
    /// Stable machine-readable code.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::WrappedIds => "WRAPPED_IDS",
            WarningCode::DeprecatedOption => "DEPRECATED_OPTION",
        }
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal diagnostic for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Warning code
    pub code: WarningCode,
    /// Human readable message
    pub message: String,
    /// Module ids the warning is about
    pub ids: Vec<String>,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_kinds() {
        let err = InteropError::DynamicRequireOutsideRoot {
            id: "/other/x.js".into(),
            root: "/project".into(),
            suggested_root: "/other".into(),
        };
        assert_eq!(err.code(), "DYNAMIC_REQUIRE_OUTSIDE_ROOT");
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.id(), Some("/other/x.js"));
        assert!(err.to_string().contains("dynamicRequireRoot to \"/other\""));

        let err = InteropError::ShapeNotReady { id: "/a.js".into() };
        assert_eq!(err.code(), "SHAPE_NOT_READY");
        assert_eq!(err.kind(), ErrorKind::NotReady);
    }

    #[test]
    fn test_parse_error_keeps_location() {
        let syntax = esmify_syntax::parse_module("var a = ;").unwrap_err();
        let err = InteropError::parse("/src/a.js", syntax);
        let InteropError::Parse { location, .. } = &err else {
            panic!("expected parse error");
        };
        assert_eq!(location.line, 1);
        assert_eq!(err.code(), "PARSE_ERROR");
        assert!(err.to_string().starts_with("/src/a.js (1:"));
    }

    #[test]
    fn test_warning_display() {
        let warning = Warning {
            code: WarningCode::DeprecatedOption,
            message: "namedExports is deprecated".into(),
            ids: Vec::new(),
        };
        assert_eq!(warning.to_string(), "[DEPRECATED_OPTION] namedExports is deprecated");
    }
}
