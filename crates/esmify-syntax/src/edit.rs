// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! In-place editing of source text.
//!
//! [`EditBuffer`] keeps the original text and a list of chunks covering it.
//! Edits split chunks at their boundaries and replace or decorate them, so
//! every unedited byte still knows where it came from and a source map can
//! be produced at the end.
//!
//! Insertions come in two flavors. `*_left` insertions at an index stick to
//! the text ending there, `*_right` insertions to the text starting there.
//! Removing or overwriting a range drops whatever was attached inside it.

use crate::lexer::Span;
use crate::location::LineIndex;
use crate::sourcemap::{MappingsBuilder, SourceMap};
use std::fmt;
use thiserror::Error;

/// Errors from [`EditBuffer`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The range lies outside the original text
    #[error("range {start}..{end} is out of bounds (length {len})")]
    OutOfBounds {
        /// Range start
        start: usize,
        /// Range end
        end: usize,
        /// Length of the original text
        len: usize,
    },
    /// An edited chunk cannot be split again
    #[error("cannot split a chunk that has already been edited (at {index})")]
    SplitEdited {
        /// Requested split point
        index: usize,
    },
    /// Overwriting requires a non-empty range
    #[error("cannot overwrite an empty range at {index}")]
    EmptyOverwrite {
        /// Range position
        index: usize,
    },
}

#[derive(Debug, Clone)]
struct Chunk {
    start: usize,
    end: usize,
    intro: String,
    outro: String,
    /// Replacement text, `None` while the original text is kept
    edit: Option<String>,
    /// Text inserted in front of original offsets (indentation)
    inserts: Vec<(usize, String)>,
}

impl Chunk {
    fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            intro: String::new(),
            outro: String::new(),
            edit: None,
            inserts: Vec::new(),
        }
    }

    fn clear(&mut self, content: String) {
        self.intro.clear();
        self.outro.clear();
        self.inserts.clear();
        self.edit = Some(content);
    }
}

/// An editable view of a source text.
#[derive(Debug, Clone)]
pub struct EditBuffer<'a> {
    original: &'a str,
    intro: String,
    outro: String,
    chunks: Vec<Chunk>,
}

impl<'a> EditBuffer<'a> {
    /// Creates a buffer over `original`.
    pub fn new(original: &'a str) -> Self {
        Self {
            original,
            intro: String::new(),
            outro: String::new(),
            chunks: vec![Chunk::new(0, original.len())],
        }
    }

    /// The text the buffer was created from.
    pub fn original(&self) -> &'a str {
        self.original
    }

    /// Returns true once any edit or insertion has been made.
    pub fn has_changed(&self) -> bool {
        !self.intro.is_empty()
            || !self.outro.is_empty()
            || self.chunks.iter().any(|chunk| {
                chunk.edit.is_some()
                    || !chunk.intro.is_empty()
                    || !chunk.outro.is_empty()
                    || !chunk.inserts.is_empty()
            })
    }

    /// Replaces `start..end` with `content`.
    pub fn overwrite(&mut self, start: usize, end: usize, content: impl Into<String>) -> Result<(), EditError> {
        self.check_range(start, end)?;
        if start == end {
            return Err(EditError::EmptyOverwrite { index: start });
        }
        let (first, last) = self.split_range(start, end)?;
        self.chunks[first].clear(content.into());
        for chunk in &mut self.chunks[first + 1..=last] {
            chunk.clear(String::new());
        }
        Ok(())
    }

    /// Removes `start..end`. Removing an empty range does nothing.
    pub fn remove(&mut self, start: usize, end: usize) -> Result<(), EditError> {
        self.check_range(start, end)?;
        if start == end {
            return Ok(());
        }
        let (first, last) = self.split_range(start, end)?;
        for chunk in &mut self.chunks[first..=last] {
            chunk.clear(String::new());
        }
        Ok(())
    }

    /// Inserts `content` at `index`, after earlier left-insertions there.
    pub fn append_left(&mut self, index: usize, content: &str) -> Result<(), EditError> {
        match self.chunk_ending_at(index)? {
            Some(chunk) => self.chunks[chunk].outro.push_str(content),
            None => self.intro.push_str(content),
        }
        Ok(())
    }

    /// Inserts `content` at `index`, before earlier left-insertions there.
    pub fn prepend_left(&mut self, index: usize, content: &str) -> Result<(), EditError> {
        match self.chunk_ending_at(index)? {
            Some(chunk) => self.chunks[chunk].outro.insert_str(0, content),
            None => self.intro.insert_str(0, content),
        }
        Ok(())
    }

    /// Inserts `content` at `index`, after earlier right-insertions there.
    pub fn append_right(&mut self, index: usize, content: &str) -> Result<(), EditError> {
        match self.chunk_starting_at(index)? {
            Some(chunk) => self.chunks[chunk].intro.push_str(content),
            None => self.outro.push_str(content),
        }
        Ok(())
    }

    /// Inserts `content` at `index`, before earlier right-insertions there.
    pub fn prepend_right(&mut self, index: usize, content: &str) -> Result<(), EditError> {
        match self.chunk_starting_at(index)? {
            Some(chunk) => self.chunks[chunk].intro.insert_str(0, content),
            None => self.outro.insert_str(0, content),
        }
        Ok(())
    }

    /// Adds `content` at the very beginning of the output.
    pub fn prepend(&mut self, content: &str) {
        self.intro.insert_str(0, content);
    }

    /// Adds `content` at the very end of the output.
    pub fn append(&mut self, content: &str) {
        self.outro.push_str(content);
    }

    /// Removes leading and trailing whitespace from the output.
    pub fn trim(&mut self) {
        self.trim_start();
        self.trim_end();
    }

    fn trim_start(&mut self) {
        let original = self.original;
        trim_start_in_place(&mut self.intro);
        if !self.intro.is_empty() {
            return;
        }
        let mut i = 0;
        while i < self.chunks.len() {
            trim_start_in_place(&mut self.chunks[i].intro);
            if !self.chunks[i].intro.is_empty() {
                return;
            }
            let chunk = &mut self.chunks[i];
            match &mut chunk.edit {
                Some(content) => {
                    trim_start_in_place(content);
                    if !content.is_empty() {
                        return;
                    }
                }
                None => {
                    let text = &original[chunk.start..chunk.end];
                    let trimmed = text.len() - text.trim_start().len();
                    if chunk.inserts.iter().any(|(at, _)| *at < chunk.start + trimmed) {
                        return;
                    }
                    if trimmed < text.len() {
                        if trimmed > 0 {
                            let at = chunk.start + trimmed;
                            self.split_chunk(i, at);
                            self.chunks[i].clear(String::new());
                        }
                        return;
                    }
                    chunk.clear(String::new());
                }
            }
            trim_start_in_place(&mut self.chunks[i].outro);
            if !self.chunks[i].outro.is_empty() {
                return;
            }
            i += 1;
        }
        trim_start_in_place(&mut self.outro);
    }

    fn trim_end(&mut self) {
        let original = self.original;
        trim_end_in_place(&mut self.outro);
        if !self.outro.is_empty() {
            return;
        }
        let mut i = self.chunks.len();
        while i > 0 {
            i -= 1;
            trim_end_in_place(&mut self.chunks[i].outro);
            if !self.chunks[i].outro.is_empty() {
                return;
            }
            let chunk = &mut self.chunks[i];
            match &mut chunk.edit {
                Some(content) => {
                    trim_end_in_place(content);
                    if !content.is_empty() {
                        return;
                    }
                }
                None => {
                    let text = &original[chunk.start..chunk.end];
                    let kept = text.trim_end().len();
                    if kept > 0 {
                        if kept < text.len() {
                            let at = chunk.start + kept;
                            self.split_chunk(i, at);
                            self.chunks[i + 1].clear(String::new());
                        }
                        return;
                    }
                    if !chunk.inserts.is_empty() {
                        return;
                    }
                    chunk.clear(String::new());
                }
            }
            trim_end_in_place(&mut self.chunks[i].intro);
            if !self.chunks[i].intro.is_empty() {
                return;
            }
        }
        trim_end_in_place(&mut self.intro);
    }

    /// Prefixes every non-empty output line with `indent`, except lines
    /// starting inside one of the `exclude` ranges of the original text.
    pub fn indent(&mut self, indent: &str, exclude: &[Span]) {
        let original = self.original;
        let is_excluded = |offset: usize| exclude.iter().any(|span| span.start <= offset && offset < span.end);
        let mut at_line_start = true;

        self.intro = indent_generated(&self.intro, indent, &mut at_line_start);
        for chunk in &mut self.chunks {
            chunk.intro = indent_generated(&chunk.intro, indent, &mut at_line_start);
            match &chunk.edit {
                Some(content) => {
                    let indented = indent_generated(content, indent, &mut at_line_start);
                    chunk.edit = Some(indented);
                }
                None => {
                    for (offset, ch) in original[chunk.start..chunk.end].char_indices() {
                        let offset = chunk.start + offset;
                        if at_line_start && ch != '\n' && ch != '\r' && !is_excluded(offset) {
                            chunk.inserts.push((offset, indent.to_string()));
                        }
                        at_line_start = ch == '\n';
                    }
                    chunk.inserts.sort_by_key(|(offset, _)| *offset);
                }
            }
            chunk.outro = indent_generated(&chunk.outro, indent, &mut at_line_start);
        }
        self.outro = indent_generated(&self.outro, indent, &mut at_line_start);
    }

    /// Builds a source map from the output back to the original text.
    pub fn generate_map(&self, source: &str, include_content: bool) -> SourceMap {
        let index = LineIndex::new(self.original);
        let mut builder = MappingsBuilder::new();
        let mut position = GeneratedPosition::default();

        position.advance(&self.intro);
        for chunk in &self.chunks {
            position.advance(&chunk.intro);
            match &chunk.edit {
                Some(content) => {
                    if !content.is_empty() {
                        let original = index.locate(self.original, chunk.start);
                        builder.add(position.line, position.column, original.line - 1, original.column);
                        position.advance(content);
                    }
                }
                None => {
                    let start = index.locate(self.original, chunk.start);
                    let (mut line, mut column) = (start.line - 1, start.column);
                    let mut inserts = chunk.inserts.iter().peekable();
                    let mut map_next = true;
                    for (offset, ch) in self.original[chunk.start..chunk.end].char_indices() {
                        let offset = chunk.start + offset;
                        while let Some((_, text)) = inserts.next_if(|(at, _)| *at <= offset) {
                            position.advance(text);
                        }
                        if map_next && ch != '\n' && ch != '\r' {
                            builder.add(position.line, position.column, line, column);
                            map_next = false;
                        }
                        if ch == '\n' {
                            line += 1;
                            column = 0;
                            map_next = true;
                        } else {
                            column += ch.len_utf16();
                        }
                        position.advance_char(ch);
                    }
                }
            }
            position.advance(&chunk.outro);
        }

        SourceMap {
            version: 3,
            file: None,
            sources: vec![source.to_string()],
            sources_content: if include_content {
                vec![Some(self.original.to_string())]
            } else {
                Vec::new()
            },
            names: Vec::new(),
            mappings: builder.finish(),
        }
    }

    fn check_range(&self, start: usize, end: usize) -> Result<(), EditError> {
        let len = self.original.len();
        if start > end || end > len || !self.original.is_char_boundary(start) || !self.original.is_char_boundary(end) {
            return Err(EditError::OutOfBounds { start, end, len });
        }
        Ok(())
    }

    /// Splits so that `start` and `end` are chunk boundaries and returns the
    /// indices of the first and last chunk inside the range.
    fn split_range(&mut self, start: usize, end: usize) -> Result<(usize, usize), EditError> {
        self.split_at(start)?;
        self.split_at(end)?;
        let first = self.chunks.partition_point(|chunk| chunk.start < start);
        let last = self.chunks.partition_point(|chunk| chunk.end <= end) - 1;
        Ok((first, last))
    }

    fn chunk_ending_at(&mut self, index: usize) -> Result<Option<usize>, EditError> {
        self.check_range(index, index)?;
        if index == 0 {
            return Ok(None);
        }
        self.split_at(index)?;
        Ok(Some(self.chunks.partition_point(|chunk| chunk.end < index)))
    }

    fn chunk_starting_at(&mut self, index: usize) -> Result<Option<usize>, EditError> {
        self.check_range(index, index)?;
        if index == self.original.len() {
            return Ok(None);
        }
        self.split_at(index)?;
        Ok(Some(self.chunks.partition_point(|chunk| chunk.start < index)))
    }

    /// Makes `index` a chunk boundary.
    fn split_at(&mut self, index: usize) -> Result<(), EditError> {
        if index == 0 || index == self.original.len() {
            return Ok(());
        }
        let i = self.chunks.partition_point(|chunk| chunk.end <= index);
        let chunk = &self.chunks[i];
        if chunk.start == index {
            return Ok(());
        }
        if matches!(&chunk.edit, Some(content) if !content.is_empty()) {
            return Err(EditError::SplitEdited { index });
        }
        self.split_chunk(i, index);
        Ok(())
    }

    /// Splits chunk `i` at `index`. The left part keeps the intro, the right
    /// part the outro.
    fn split_chunk(&mut self, i: usize, index: usize) {
        let chunk = &mut self.chunks[i];
        let mut right = Chunk::new(index, chunk.end);
        chunk.end = index;
        right.outro = std::mem::take(&mut chunk.outro);
        right.edit = chunk.edit.clone();
        let split = chunk.inserts.partition_point(|(at, _)| *at < index);
        right.inserts = chunk.inserts.split_off(split);
        self.chunks.insert(i + 1, right);
    }
}

impl fmt::Display for EditBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.intro)?;
        for chunk in &self.chunks {
            f.write_str(&chunk.intro)?;
            match &chunk.edit {
                Some(content) => f.write_str(content)?,
                None => {
                    let mut cursor = chunk.start;
                    for (at, text) in &chunk.inserts {
                        f.write_str(&self.original[cursor..*at])?;
                        f.write_str(text)?;
                        cursor = *at;
                    }
                    f.write_str(&self.original[cursor..chunk.end])?;
                }
            }
            f.write_str(&chunk.outro)?;
        }
        f.write_str(&self.outro)
    }
}

#[derive(Debug, Default)]
struct GeneratedPosition {
    line: usize,
    column: usize,
}

impl GeneratedPosition {
    fn advance(&mut self, text: &str) {
        for ch in text.chars() {
            self.advance_char(ch);
        }
    }

    fn advance_char(&mut self, ch: char) {
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += ch.len_utf16();
        }
    }
}

fn indent_generated(text: &str, indent: &str, at_line_start: &mut bool) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if *at_line_start && ch != '\n' && ch != '\r' {
            out.push_str(indent);
        }
        *at_line_start = ch == '\n';
        out.push(ch);
    }
    out
}

fn trim_start_in_place(text: &mut String) {
    let trimmed = text.len() - text.trim_start().len();
    text.drain(..trimmed);
}

fn trim_end_in_place(text: &mut String) {
    let kept = text.trim_end().len();
    text.truncate(kept);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_and_remove() {
        let mut buffer = EditBuffer::new("var a = require('a');\nvar b = 2;\n");
        buffer.overwrite(8, 20, "a$1").unwrap();
        buffer.remove(22, 33).unwrap();
        assert_eq!(buffer.to_string(), "var a = a$1;\n");
        assert!(buffer.has_changed());
    }

    #[test]
    fn test_unchanged_buffer() {
        let buffer = EditBuffer::new("x");
        assert!(!buffer.has_changed());
        assert_eq!(buffer.to_string(), "x");
    }

    #[test]
    fn test_left_and_right_insertions() {
        let mut buffer = EditBuffer::new("ab");
        buffer.append_left(1, "1").unwrap();
        buffer.append_left(1, "2").unwrap();
        buffer.prepend_left(1, "0").unwrap();
        buffer.append_right(1, "4").unwrap();
        buffer.prepend_right(1, "3").unwrap();
        assert_eq!(buffer.to_string(), "a01234b");
    }

    #[test]
    fn test_insertions_at_edges() {
        let mut buffer = EditBuffer::new("body");
        buffer.append_left(0, "<").unwrap();
        buffer.prepend_right(4, ">").unwrap();
        buffer.prepend("import x;\n");
        buffer.append("\nexport y;");
        assert_eq!(buffer.to_string(), "import x;\n<body>\nexport y;");
    }

    #[test]
    fn test_remove_drops_attached_insertions() {
        let mut buffer = EditBuffer::new("abc");
        buffer.append_right(1, "X").unwrap();
        buffer.append_left(1, "Y").unwrap();
        buffer.remove(1, 2).unwrap();
        assert_eq!(buffer.to_string(), "aYc");
    }

    #[test]
    fn test_split_edited_chunk_fails() {
        let mut buffer = EditBuffer::new("abcdef");
        buffer.overwrite(1, 5, "X").unwrap();
        assert_eq!(buffer.overwrite(2, 3, "Y"), Err(EditError::SplitEdited { index: 2 }));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut buffer = EditBuffer::new("abc");
        assert!(matches!(buffer.remove(2, 9), Err(EditError::OutOfBounds { .. })));
        assert!(matches!(buffer.overwrite(1, 1, "x"), Err(EditError::EmptyOverwrite { .. })));
    }

    #[test]
    fn test_trim() {
        let mut buffer = EditBuffer::new("\n\n  var a;\n  \n");
        buffer.trim();
        assert_eq!(buffer.to_string(), "var a;");

        let mut buffer = EditBuffer::new("  a  ");
        buffer.prepend("\n");
        buffer.append(" \n");
        buffer.trim();
        assert_eq!(buffer.to_string(), "a");
    }

    #[test]
    fn test_indent_skips_excluded_lines() {
        let source = "a();\nvar t = `x\ny`;\n\nb();";
        let mut buffer = EditBuffer::new(source);
        let template_start = source.find('`').unwrap();
        let template_end = source.rfind('`').unwrap() + 1;
        buffer.indent("\t", &[Span::new(template_start, template_end)]);
        assert_eq!(buffer.to_string(), "\ta();\n\tvar t = `x\ny`;\n\n\tb();");
    }

    #[test]
    fn test_indent_generated_text() {
        let mut buffer = EditBuffer::new("x = 1;");
        buffer.overwrite(0, 1, "exports.x").unwrap();
        buffer.prepend("var exports = {};\n");
        buffer.indent("  ", &[]);
        assert_eq!(buffer.to_string(), "  var exports = {};\n  exports.x = 1;");
    }

    #[test]
    fn test_generate_map() {
        let mut buffer = EditBuffer::new("a;\nb;");
        buffer.prepend("import x;\n");
        let map = buffer.generate_map("input.js", true);
        assert_eq!(map.sources, vec!["input.js".to_string()]);
        assert_eq!(map.sources_content, vec![Some("a;\nb;".to_string())]);
        // line 0 is unmapped, then `a;` and `b;` map to lines 0 and 1
        assert_eq!(map.mappings, ";AAAA;AACA");
    }

    #[test]
    fn test_generate_map_for_edits() {
        let mut buffer = EditBuffer::new("foo(bar);");
        buffer.overwrite(4, 7, "baz$1").unwrap();
        let map = buffer.generate_map("input.js", false);
        assert!(map.sources_content.is_empty());
        assert_eq!(map.mappings, "AAAA,IAAI,KAAG");
    }
}
