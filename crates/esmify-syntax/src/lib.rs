// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # esmify-syntax
//!
//! JavaScript syntax support for source-to-source rewriting.
//!
//! ## Overview
//!
//! This crate provides what a code transform needs to edit JavaScript in
//! place rather than regenerate it:
//! - Lexer and parser for ECMAScript 2024 scripts and modules
//! - A span-annotated, ESTree-like AST
//! - Lexical scope tracking with `var`/function hoisting
//! - An edit buffer over the original text that emits source maps
//!
//! ## Quick Start
//!
//! ```rust
//! use esmify_syntax::{EditBuffer, parse_module};
//!
//! let source = "var x = require('x');";
//! let program = parse_module(source).unwrap();
//! assert_eq!(program.body.len(), 1);
//!
//! let mut buffer = EditBuffer::new(source);
//! buffer.overwrite(8, 20, "x$1").unwrap();
//! assert_eq!(buffer.to_string(), "var x = x$1;");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ast;
pub mod edit;
pub mod lexer;
pub mod location;
pub mod parser;
pub mod scope;
pub mod sourcemap;

pub use edit::{EditBuffer, EditError};
pub use location::{LineIndex, Location};
pub use parser::Parser;
pub use sourcemap::SourceMap;

/// Errors produced while reading JavaScript source.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The source is not valid JavaScript
    #[error("SyntaxError: {message} ({location})")]
    Syntax {
        /// What went wrong
        message: String,
        /// Byte offset of the offending token
        offset: usize,
        /// Line and column of the offending token
        location: Location,
    },
}

/// Result type for parsing.
pub type Result<T> = std::result::Result<T, Error>;

/// Parses JavaScript source into a [`ast::Program`].
///
/// Module syntax and script syntax are both accepted, including a top-level
/// `return`.
pub fn parse_module(source: &str) -> Result<ast::Program> {
    Parser::new(source).parse_program()
}
