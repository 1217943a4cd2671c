// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! JavaScript parser that produces a span-annotated AST.
//!
//! ## Structure
//!
//! - `parser.rs` - `Parser` struct, token helpers and statements
//! - `expressions.rs` - expressions, precedence climbing, arrows, cover grammar
//! - `functions.rs` - functions, classes and binding patterns
//! - `modules.rs` - `import` / `export` declarations
//!
//! Regular expressions and template continuations are re-scanned on demand,
//! since only the parser knows whether `/` starts a regex.

#[allow(clippy::module_inception)]
mod parser;

mod expressions;
mod functions;
mod modules;

pub use parser::{ParseResult, Parser};
