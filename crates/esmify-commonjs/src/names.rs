// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Identifier generation for rewritten modules.

use rustc_hash::FxHashSet;
use std::path::Path;

const RESERVED: &[&str] = &[
    "break", "case", "class", "catch", "const", "continue", "debugger", "default", "delete", "do",
    "else", "export", "extends", "finally", "for", "function", "if", "import", "in", "instanceof",
    "let", "new", "return", "super", "switch", "this", "throw", "try", "typeof", "var", "void",
    "while", "with", "yield", "enum", "await", "implements", "package", "protected", "static",
    "interface", "private", "public",
];

const BUILTINS: &[&str] = &[
    "arguments", "Infinity", "NaN", "undefined", "null", "true", "false", "eval", "uneval",
    "isFinite", "isNaN", "parseFloat", "parseInt", "decodeURI", "decodeURIComponent", "encodeURI",
    "encodeURIComponent", "escape", "unescape", "Object", "Function", "Boolean", "Symbol", "Error",
    "EvalError", "InternalError", "RangeError", "ReferenceError", "SyntaxError", "TypeError",
    "URIError", "Number", "Math", "Date", "String", "RegExp", "Array", "Int8Array", "Uint8Array",
    "Uint8ClampedArray", "Int16Array", "Uint16Array", "Int32Array", "Uint32Array", "Float32Array",
    "Float64Array", "Map", "Set", "WeakMap", "WeakSet", "SIMD", "ArrayBuffer", "DataView", "JSON",
    "Promise", "Generator", "GeneratorFunction", "Reflect", "Proxy", "Intl",
];

/// Turns arbitrary text into a valid, non-reserved identifier.
///
/// `-x` becomes `X`, other invalid characters become `_`, and names that
/// start with a digit or are reserved get a leading `_`.
pub fn make_legal_identifier(text: &str) -> String {
    let mut identifier = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '-'
            && let Some(&next) = chars.peek()
            && (next.is_ascii_alphanumeric() || next == '_')
        {
            identifier.extend(next.to_uppercase());
            chars.next();
            continue;
        }
        if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
            identifier.push(c);
        } else {
            identifier.push('_');
        }
    }
    let starts_with_digit = identifier.starts_with(|c: char| c.is_ascii_digit());
    if starts_with_digit || RESERVED.contains(&identifier.as_str()) || BUILTINS.contains(&identifier.as_str()) {
        identifier.insert(0, '_');
    }
    if identifier.is_empty() {
        identifier.push('_');
    }
    identifier
}

/// Base variable name for a module: its file stem, or the directory name
/// for `index` files.
pub fn get_name(id: &str) -> String {
    let path = Path::new(id);
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = make_legal_identifier(&stem);
    if name != "index" {
        return name;
    }
    let parent = path
        .parent()
        .and_then(Path::file_name)
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    make_legal_identifier(&parent)
}

/// Uppercases the first character.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Names already taken in one module.
#[derive(Debug, Default)]
pub struct NameTable {
    taken: FxHashSet<String>,
}

impl NameTable {
    /// Starts from every name declared or referenced in the module.
    pub fn new(taken: FxHashSet<String>) -> Self {
        Self { taken }
    }

    /// Returns true if `name` is in use.
    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Returns `base` made legal, suffixed with `_1`, `_2`... until it is
    /// free, and reserves it.
    pub fn deconflict(&mut self, base: &str) -> String {
        let mut name = make_legal_identifier(base);
        let mut i = 1;
        while self.taken.contains(&name) {
            name = make_legal_identifier(&format!("{base}_{i}"));
            i += 1;
        }
        self.taken.insert(name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_legal_identifier() {
        assert_eq!(make_legal_identifier("foo-bar"), "fooBar");
        assert_eq!(make_legal_identifier("foo.bar"), "foo_bar");
        assert_eq!(make_legal_identifier("1up"), "_1up");
        assert_eq!(make_legal_identifier("default"), "_default");
        assert_eq!(make_legal_identifier("Object"), "_Object");
        assert_eq!(make_legal_identifier(""), "_");
        assert_eq!(make_legal_identifier("$el"), "$el");
    }

    #[test]
    fn test_get_name() {
        assert_eq!(get_name("/project/src/some-module.js"), "someModule");
        assert_eq!(get_name("/project/node_modules/left-pad/index.js"), "leftPad");
        assert_eq!(get_name("lodash"), "lodash");
        assert_eq!(get_name("/data/config.json"), "config");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("foo"), "Foo");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_deconflict() {
        let taken = ["foo", "foo_1"].iter().map(|s| s.to_string()).collect();
        let mut names = NameTable::new(taken);
        assert_eq!(names.deconflict("foo"), "foo_2");
        assert_eq!(names.deconflict("foo"), "foo_3");
        assert_eq!(names.deconflict("bar"), "bar");
        assert!(names.contains("bar"));
    }
}
