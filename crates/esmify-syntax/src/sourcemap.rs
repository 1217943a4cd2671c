// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Source map v3 output.

use serde::{Deserialize, Serialize};

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// A version 3 source map with a single source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    /// Always 3
    pub version: u8,
    /// Name of the generated file
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub file: Option<String>,
    /// Original sources
    pub sources: Vec<String>,
    /// Original source texts, parallel to `sources`
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub sources_content: Vec<Option<String>>,
    /// Symbol names
    pub names: Vec<String>,
    /// Base64 VLQ mappings
    pub mappings: String,
}

impl SourceMap {
    /// Serializes the map to JSON.
    pub fn to_json(&self) -> String {
        // A struct of strings always serializes
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Appends the base64 VLQ encoding of `value`.
pub fn encode_vlq(value: i64, out: &mut String) {
    let mut vlq = if value < 0 {
        ((-value) << 1) | 1
    } else {
        value << 1
    };
    loop {
        let mut digit = (vlq & 0b11111) as usize;
        vlq >>= 5;
        if vlq > 0 {
            digit |= 0b100000;
        }
        out.push(BASE64[digit] as char);
        if vlq == 0 {
            break;
        }
    }
}

/// Builds the `mappings` string from segments given in generated order.
#[derive(Debug, Default)]
pub struct MappingsBuilder {
    out: String,
    line: usize,
    segments_on_line: usize,
    previous_generated_column: i64,
    previous_original_line: i64,
    previous_original_column: i64,
}

impl MappingsBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a segment mapping a generated position to an original one.
    /// Positions are 0-based; generated positions must not go backwards.
    pub fn add(
        &mut self,
        generated_line: usize,
        generated_column: usize,
        original_line: usize,
        original_column: usize,
    ) {
        while self.line < generated_line {
            self.out.push(';');
            self.line += 1;
            self.segments_on_line = 0;
            self.previous_generated_column = 0;
        }
        if self.segments_on_line > 0 {
            self.out.push(',');
        }

        let generated_column = generated_column as i64;
        let original_line = original_line as i64;
        let original_column = original_column as i64;

        encode_vlq(generated_column - self.previous_generated_column, &mut self.out);
        // Single source, index delta is always zero
        encode_vlq(0, &mut self.out);
        encode_vlq(original_line - self.previous_original_line, &mut self.out);
        encode_vlq(original_column - self.previous_original_column, &mut self.out);

        self.previous_generated_column = generated_column;
        self.previous_original_line = original_line;
        self.previous_original_column = original_column;
        self.segments_on_line += 1;
    }

    /// Returns the encoded mappings.
    pub fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vlq(value: i64) -> String {
        let mut out = String::new();
        encode_vlq(value, &mut out);
        out
    }

    #[test]
    fn test_encode_vlq() {
        assert_eq!(vlq(0), "A");
        assert_eq!(vlq(1), "C");
        assert_eq!(vlq(-1), "D");
        assert_eq!(vlq(15), "e");
        assert_eq!(vlq(16), "gB");
        assert_eq!(vlq(123), "2H");
    }

    #[test]
    fn test_mappings_builder() {
        let mut builder = MappingsBuilder::new();
        builder.add(0, 0, 0, 0);
        builder.add(0, 4, 0, 4);
        builder.add(2, 2, 1, 0);
        assert_eq!(builder.finish(), "AAAA,IAAI;;EACJ");
    }

    #[test]
    fn test_to_json_field_names() {
        let map = SourceMap {
            version: 3,
            file: None,
            sources: vec!["input.js".into()],
            sources_content: vec![Some("x".into())],
            names: Vec::new(),
            mappings: "AAAA".into(),
        };
        let json: serde_json::Value = serde_json::from_str(&map.to_json()).unwrap();
        assert_eq!(json["version"], 3);
        assert_eq!(json["sourcesContent"][0], "x");
        assert!(json.get("file").is_none());
    }
}
