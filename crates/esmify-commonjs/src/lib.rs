// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # esmify-commonjs
//!
//! Converts CommonJS modules into ES modules inside a module graph.
//!
//! ## Overview
//!
//! - Detects which modules use `require`, `module` and `exports`
//! - Rewrites constant `require` calls into imports, wrapping modules that
//!   sit in cycles or are only required conditionally in lazy getters
//! - Rewrites `exports.x` / `module.exports` into a default export plus
//!   live named exports
//! - Serves the synthetic helper, proxy and dynamic-require modules the
//!   rewritten code imports
//!
//! The bundler side is abstracted behind [`ModuleHost`]; all build state
//! lives in one [`CommonJsPlugin`].
//!
//! ## Quick Start
//!
//! ```rust
//! use esmify_commonjs::{CommonJsOptions, CommonJsPlugin, ModuleHost, ResolvedId};
//!
//! struct Isolated;
//!
//! impl ModuleHost for Isolated {
//!     fn resolve(&self, _source: &str, _importer: &str) -> Option<ResolvedId> {
//!         None
//!     }
//!
//!     fn load(&self, _id: &str) -> esmify_commonjs::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let plugin = CommonJsPlugin::new(CommonJsOptions {
//!     cwd: Some("/app".into()),
//!     ..CommonJsOptions::default()
//! })
//! .unwrap();
//! let output = plugin
//!     .transform("exports.answer = 42;", "/app/answer.js", &Isolated)
//!     .unwrap()
//!     .unwrap();
//! assert!(output.code.contains("as __moduleExports"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analyze;
pub mod dynamic;
pub mod error;
pub mod filter;
pub mod helpers;
pub mod ids;
pub mod names;
pub mod options;
pub mod plugin;
pub mod proxies;
pub mod registry;
pub mod resolve;
pub mod transform;

pub use error::{ErrorKind, InteropError, Result, Warning, WarningCode};
pub use ids::{ProxyKind, DYNAMIC_MODULES_ID, HELPERS_ID};
pub use options::{
    CommonJsOptions, DefaultIsModuleExports, IdMatcher, RequireReturnsDefault, StrictRequires, TryCatchMode,
    TryCatchPolicy,
};
pub use plugin::{CommonJsPlugin, ModuleClassification, TransformOutput};
pub use registry::{CommonJsType, ExportRegistry, ExportShape, ModuleMeta};
pub use resolve::{ModuleHost, ResolvedId};
