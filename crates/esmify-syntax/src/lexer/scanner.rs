// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The scanner that produces tokens from source text.

use super::{Span, Token, TokenKind};

/// A scanner that tokenizes JavaScript source code.
///
/// The scanner is context free: `/` always comes out as [`TokenKind::Slash`]
/// (or [`TokenKind::SlashEqual`]) and `}` as [`TokenKind::RightBrace`]. The
/// parser knows when a regular expression or a template continuation is
/// expected and asks for a rescan with [`Scanner::rescan_regex`] or
/// [`Scanner::rescan_template_continuation`].
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    source: &'a str,
    current_pos: usize,
    newline_before: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner for the given source code.
    pub fn new(source: &'a str) -> Self {
        let mut scanner = Self {
            source,
            current_pos: 0,
            newline_before: false,
        };
        if source.starts_with("#!") {
            while let Some(ch) = scanner.peek() {
                if is_line_terminator(ch) {
                    break;
                }
                scanner.advance();
            }
        }
        scanner
    }

    /// Returns the source text being scanned.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        self.newline_before = false;
        self.skip_whitespace_and_comments();

        let start = self.current_pos;
        let newline_before = self.newline_before;

        let Some((_pos, ch)) = self.advance() else {
            return Token {
                kind: TokenKind::Eof,
                span: Span::new(start, start),
                newline_before,
            };
        };

        let kind = match ch {
            // Single-character tokens
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '~' => TokenKind::Tilde,
            '@' => TokenKind::At,

            // Multi-character tokens
            '.' => self.scan_dot(),
            '+' => self.scan_plus(),
            '-' => self.scan_minus(),
            '*' => self.scan_star(),
            '/' => self.scan_slash(),
            '%' => self.scan_percent(),
            '<' => self.scan_less_than(),
            '>' => self.scan_greater_than(),
            '=' => self.scan_equal(),
            '!' => self.scan_bang(),
            '&' => self.scan_ampersand(),
            '|' => self.scan_pipe(),
            '^' => self.scan_caret(),
            '?' => self.scan_question(),

            // String literals
            '"' | '\'' => self.scan_string(ch),

            // Template literals
            '`' => self.scan_template_chunk(),

            // Numbers
            '0'..='9' => self.scan_number(ch),

            // Identifiers and keywords
            _ if is_id_start(ch) => self.scan_identifier(ch),

            // Private identifiers
            '#' => self.scan_private_identifier(),

            _ => TokenKind::Invalid,
        };

        Token {
            kind,
            span: Span::new(start, self.current_pos),
            newline_before,
        }
    }

    /// Re-reads a `/` or `/=` token as a regular expression literal.
    pub fn rescan_regex(&mut self, token: &Token) -> Token {
        self.current_pos = token.span.start + 1;
        let kind = self.scan_regex_body();
        Token {
            kind,
            span: Span::new(token.span.start, self.current_pos),
            newline_before: token.newline_before,
        }
    }

    /// Re-reads a `}` token as the continuation of a template literal after
    /// a `${ ... }` substitution.
    pub fn rescan_template_continuation(&mut self, token: &Token) -> Token {
        self.current_pos = token.span.start + 1;
        let kind = self.scan_template_chunk();
        Token {
            kind,
            span: Span::new(token.span.start, self.current_pos),
            newline_before: token.newline_before,
        }
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let ch = self.source[self.current_pos..].chars().next()?;
        let pos = self.current_pos;
        self.current_pos += ch.len_utf8();
        Some((pos, ch))
    }

    fn peek(&self) -> Option<char> {
        self.source[self.current_pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.source[self.current_pos..].chars();
        iter.next();
        iter.next()
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(ch) if is_line_terminator(ch) => {
                    self.newline_before = true;
                    self.advance();
                }
                Some(ch) if ch.is_whitespace() || ch == '\u{feff}' => {
                    self.advance();
                }
                Some('/') => {
                    match self.peek_next() {
                        Some('/') => {
                            self.advance();
                            self.advance();
                            while let Some(ch) = self.peek() {
                                if is_line_terminator(ch) {
                                    break;
                                }
                                self.advance();
                            }
                        }
                        Some('*') => {
                            self.advance();
                            self.advance();
                            let mut prev = ' ';
                            while let Some((_, ch)) = self.advance() {
                                if is_line_terminator(ch) {
                                    self.newline_before = true;
                                }
                                if prev == '*' && ch == '/' {
                                    break;
                                }
                                prev = ch;
                            }
                        }
                        // Division or a regular expression
                        _ => break,
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_dot(&mut self) -> TokenKind {
        match self.peek() {
            Some('.') if self.peek_next() == Some('.') => {
                self.advance();
                self.advance();
                TokenKind::Ellipsis
            }
            Some(ch) if ch.is_ascii_digit() => self.scan_number('.'),
            _ => TokenKind::Dot,
        }
    }

    fn scan_plus(&mut self) -> TokenKind {
        match self.peek() {
            Some('+') => {
                self.advance();
                TokenKind::PlusPlus
            }
            Some('=') => {
                self.advance();
                TokenKind::PlusEqual
            }
            _ => TokenKind::Plus,
        }
    }

    fn scan_minus(&mut self) -> TokenKind {
        match self.peek() {
            Some('-') => {
                self.advance();
                TokenKind::MinusMinus
            }
            Some('=') => {
                self.advance();
                TokenKind::MinusEqual
            }
            _ => TokenKind::Minus,
        }
    }

    fn scan_star(&mut self) -> TokenKind {
        match self.peek() {
            Some('*') => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::StarStarEqual
                } else {
                    TokenKind::StarStar
                }
            }
            Some('=') => {
                self.advance();
                TokenKind::StarEqual
            }
            _ => TokenKind::Star,
        }
    }

    fn scan_slash(&mut self) -> TokenKind {
        match self.peek() {
            Some('=') => {
                self.advance();
                TokenKind::SlashEqual
            }
            _ => TokenKind::Slash,
        }
    }

    fn scan_percent(&mut self) -> TokenKind {
        if self.peek() == Some('=') {
            self.advance();
            TokenKind::PercentEqual
        } else {
            TokenKind::Percent
        }
    }

    fn scan_less_than(&mut self) -> TokenKind {
        match self.peek() {
            Some('<') => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::LeftShiftEqual
                } else {
                    TokenKind::LeftShift
                }
            }
            Some('=') => {
                self.advance();
                TokenKind::LessThanEqual
            }
            _ => TokenKind::LessThan,
        }
    }

    fn scan_greater_than(&mut self) -> TokenKind {
        match self.peek() {
            Some('>') => {
                self.advance();
                match self.peek() {
                    Some('>') => {
                        self.advance();
                        if self.peek() == Some('=') {
                            self.advance();
                            TokenKind::UnsignedRightShiftEqual
                        } else {
                            TokenKind::UnsignedRightShift
                        }
                    }
                    Some('=') => {
                        self.advance();
                        TokenKind::RightShiftEqual
                    }
                    _ => TokenKind::RightShift,
                }
            }
            Some('=') => {
                self.advance();
                TokenKind::GreaterThanEqual
            }
            _ => TokenKind::GreaterThan,
        }
    }

    fn scan_equal(&mut self) -> TokenKind {
        match self.peek() {
            Some('=') => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::StrictEqual
                } else {
                    TokenKind::EqualEqual
                }
            }
            Some('>') => {
                self.advance();
                TokenKind::Arrow
            }
            _ => TokenKind::Equal,
        }
    }

    fn scan_bang(&mut self) -> TokenKind {
        match self.peek() {
            Some('=') => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::StrictNotEqual
                } else {
                    TokenKind::NotEqual
                }
            }
            _ => TokenKind::Bang,
        }
    }

    fn scan_ampersand(&mut self) -> TokenKind {
        match self.peek() {
            Some('&') => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::AmpersandAmpersandEqual
                } else {
                    TokenKind::AmpersandAmpersand
                }
            }
            Some('=') => {
                self.advance();
                TokenKind::AmpersandEqual
            }
            _ => TokenKind::Ampersand,
        }
    }

    fn scan_pipe(&mut self) -> TokenKind {
        match self.peek() {
            Some('|') => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::PipePipeEqual
                } else {
                    TokenKind::PipePipe
                }
            }
            Some('=') => {
                self.advance();
                TokenKind::PipeEqual
            }
            _ => TokenKind::Pipe,
        }
    }

    fn scan_caret(&mut self) -> TokenKind {
        if self.peek() == Some('=') {
            self.advance();
            TokenKind::CaretEqual
        } else {
            TokenKind::Caret
        }
    }

    fn scan_question(&mut self) -> TokenKind {
        match self.peek() {
            Some('?') => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::QuestionQuestionEqual
                } else {
                    TokenKind::QuestionQuestion
                }
            }
            // `a?.5:b` is a conditional, not optional chaining
            Some('.') if !self.peek_next().is_some_and(|ch| ch.is_ascii_digit()) => {
                self.advance();
                TokenKind::QuestionDot
            }
            _ => TokenKind::Question,
        }
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        let mut value = String::new();

        loop {
            match self.advance() {
                None => return TokenKind::Invalid,
                Some((_, ch)) if ch == quote => break,
                Some((_, '\n' | '\r')) => return TokenKind::Invalid,
                Some((_, '\\')) => {
                    if !self.scan_escape(&mut value) {
                        return TokenKind::Invalid;
                    }
                }
                Some((_, ch)) => value.push(ch),
            }
        }

        TokenKind::String(value)
    }

    /// Scans one template chunk after its opening backtick or closing `}`.
    fn scan_template_chunk(&mut self) -> TokenKind {
        let mut cooked = String::new();

        loop {
            match self.advance() {
                None => return TokenKind::Invalid,
                Some((_, '`')) => {
                    return TokenKind::Template { cooked, tail: true };
                }
                Some((_, '$')) if self.peek() == Some('{') => {
                    self.advance();
                    return TokenKind::Template {
                        cooked,
                        tail: false,
                    };
                }
                Some((_, '\\')) => {
                    // Invalid escapes are legal in tagged templates; keep going
                    self.scan_escape(&mut cooked);
                }
                Some((_, '\r')) => {
                    if self.peek() == Some('\n') {
                        self.advance();
                    }
                    cooked.push('\n');
                }
                Some((_, ch)) => cooked.push(ch),
            }
        }
    }

    /// Scans the escape sequence following a backslash. Returns false when
    /// the input ends inside the escape.
    fn scan_escape(&mut self, value: &mut String) -> bool {
        let Some((_, escaped)) = self.advance() else {
            return false;
        };
        match escaped {
            'n' => value.push('\n'),
            'r' => value.push('\r'),
            't' => value.push('\t'),
            'b' => value.push('\u{8}'),
            'f' => value.push('\u{c}'),
            'v' => value.push('\u{b}'),
            '0' if !self.peek().is_some_and(|ch| ch.is_ascii_digit()) => value.push('\0'),
            'x' => {
                let code = self.scan_hex_digits(2);
                match code.and_then(char::from_u32) {
                    Some(ch) => value.push(ch),
                    None => value.push('x'),
                }
            }
            'u' => {
                let code = if self.peek() == Some('{') {
                    self.advance();
                    let mut digits = String::new();
                    while let Some(ch) = self.peek() {
                        self.advance();
                        if ch == '}' {
                            break;
                        }
                        digits.push(ch);
                    }
                    u32::from_str_radix(&digits, 16).ok()
                } else {
                    self.scan_hex_digits(4)
                };
                match code.and_then(char::from_u32) {
                    Some(ch) => value.push(ch),
                    // Lone surrogates have no `char`; keep a replacement
                    None => value.push('\u{fffd}'),
                }
            }
            '\r' => {
                // Line continuation
                if self.peek() == Some('\n') {
                    self.advance();
                }
            }
            ch if is_line_terminator(ch) => {}
            ch => value.push(ch),
        }
        true
    }

    fn scan_hex_digits(&mut self, count: usize) -> Option<u32> {
        let mut digits = String::with_capacity(count);
        for _ in 0..count {
            match self.peek() {
                Some(ch) if ch.is_ascii_hexdigit() => {
                    digits.push(ch);
                    self.advance();
                }
                _ => return None,
            }
        }
        u32::from_str_radix(&digits, 16).ok()
    }

    fn scan_regex_body(&mut self) -> TokenKind {
        let mut pattern = String::new();
        let mut in_class = false;

        loop {
            match self.advance() {
                None => return TokenKind::Invalid,
                Some((_, ch)) if is_line_terminator(ch) => return TokenKind::Invalid,
                Some((_, '\\')) => {
                    pattern.push('\\');
                    match self.advance() {
                        Some((_, ch)) if !is_line_terminator(ch) => pattern.push(ch),
                        _ => return TokenKind::Invalid,
                    }
                }
                Some((_, '[')) => {
                    in_class = true;
                    pattern.push('[');
                }
                Some((_, ']')) => {
                    in_class = false;
                    pattern.push(']');
                }
                Some((_, '/')) if !in_class => break,
                Some((_, ch)) => pattern.push(ch),
            }
        }

        let mut flags = String::new();
        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                flags.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        TokenKind::RegExp { pattern, flags }
    }

    fn scan_number(&mut self, first: char) -> TokenKind {
        let mut value = String::from(first);

        // Handle hex, octal, binary
        if first == '0' {
            match self.peek() {
                Some('x' | 'X') => return self.scan_radix_number(16, "0x"),
                Some('o' | 'O') => return self.scan_radix_number(8, "0o"),
                Some('b' | 'B') => return self.scan_radix_number(2, "0b"),
                _ => {}
            }
        }

        let mut fractional = first == '.';
        self.scan_digits(&mut value);

        if !fractional && self.peek() == Some('.') {
            fractional = true;
            value.push('.');
            self.advance();
            self.scan_digits(&mut value);
        }

        // Exponent part
        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_next(), Some('+' | '-'));
            let mut lookahead = self.source[self.current_pos..].chars().skip(if signed { 2 } else { 1 });
            if lookahead.next().is_some_and(|ch| ch.is_ascii_digit()) {
                value.push('e');
                self.advance();
                if signed {
                    if let Some((_, sign)) = self.advance() {
                        value.push(sign);
                    }
                }
                self.scan_digits(&mut value);
            }
        }

        // BigInt suffix
        if !fractional && self.peek() == Some('n') {
            self.advance();
            return TokenKind::BigInt(value);
        }

        match value.parse::<f64>() {
            Ok(n) => TokenKind::Number(n),
            Err(_) => TokenKind::Invalid,
        }
    }

    fn scan_digits(&mut self, value: &mut String) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '_' {
                if ch != '_' {
                    value.push(ch);
                }
                self.advance();
            } else {
                break;
            }
        }
    }

    fn scan_radix_number(&mut self, radix: u32, prefix: &str) -> TokenKind {
        self.advance(); // consume the radix letter
        let mut value = String::new();

        while let Some(ch) = self.peek() {
            if ch.is_digit(radix) || ch == '_' {
                if ch != '_' {
                    value.push(ch);
                }
                self.advance();
            } else {
                break;
            }
        }

        if self.peek() == Some('n') {
            self.advance();
            return TokenKind::BigInt(format!("{prefix}{value}"));
        }

        match u64::from_str_radix(&value, radix) {
            Ok(n) => TokenKind::Number(n as f64),
            Err(_) => TokenKind::Invalid,
        }
    }

    fn scan_identifier(&mut self, first: char) -> TokenKind {
        let mut name = String::from(first);

        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        // Check for keywords
        match name.as_str() {
            "await" => TokenKind::Await,
            "break" => TokenKind::Break,
            "case" => TokenKind::Case,
            "catch" => TokenKind::Catch,
            "class" => TokenKind::Class,
            "const" => TokenKind::Const,
            "continue" => TokenKind::Continue,
            "debugger" => TokenKind::Debugger,
            "default" => TokenKind::Default,
            "delete" => TokenKind::Delete,
            "do" => TokenKind::Do,
            "else" => TokenKind::Else,
            "enum" => TokenKind::Enum,
            "export" => TokenKind::Export,
            "extends" => TokenKind::Extends,
            "false" => TokenKind::False,
            "finally" => TokenKind::Finally,
            "for" => TokenKind::For,
            "function" => TokenKind::Function,
            "if" => TokenKind::If,
            "import" => TokenKind::Import,
            "in" => TokenKind::In,
            "instanceof" => TokenKind::Instanceof,
            "let" => TokenKind::Let,
            "new" => TokenKind::New,
            "null" => TokenKind::Null,
            "return" => TokenKind::Return,
            "static" => TokenKind::Static,
            "super" => TokenKind::Super,
            "switch" => TokenKind::Switch,
            "this" => TokenKind::This,
            "throw" => TokenKind::Throw,
            "true" => TokenKind::True,
            "try" => TokenKind::Try,
            "typeof" => TokenKind::Typeof,
            "var" => TokenKind::Var,
            "void" => TokenKind::Void,
            "while" => TokenKind::While,
            "with" => TokenKind::With,
            "yield" => TokenKind::Yield,
            "async" => TokenKind::Async,
            _ => TokenKind::Identifier(name),
        }
    }

    fn scan_private_identifier(&mut self) -> TokenKind {
        let mut name = String::new();

        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if name.is_empty() {
            TokenKind::Invalid
        } else {
            TokenKind::PrivateIdentifier(name)
        }
    }
}

/// Checks if a character terminates a line.
pub(crate) fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Checks if a character can start an identifier.
pub(crate) fn is_id_start(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_xid::UnicodeXID::is_xid_start(ch)
}

/// Checks if a character can continue an identifier.
pub(crate) fn is_id_continue(ch: char) -> bool {
    ch == '_'
        || ch == '$'
        || ch == '\u{200c}'
        || ch == '\u{200d}'
        || unicode_xid::UnicodeXID::is_xid_continue(ch)
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::new(source).map(|token| token.kind).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let mut scanner = Scanner::new("{ } ( )");
        assert!(matches!(scanner.next_token().kind, TokenKind::LeftBrace));
        assert!(matches!(scanner.next_token().kind, TokenKind::RightBrace));
        assert!(matches!(scanner.next_token().kind, TokenKind::LeftParen));
        assert!(matches!(scanner.next_token().kind, TokenKind::RightParen));
        assert!(matches!(scanner.next_token().kind, TokenKind::Eof));
    }

    #[test]
    fn test_numbers() {
        let mut scanner = Scanner::new("42 3.14 0xff 0b1010 .5 1e3 10n 1_000");
        assert!(matches!(scanner.next_token().kind, TokenKind::Number(n) if n == 42.0));
        assert!(matches!(scanner.next_token().kind, TokenKind::Number(n) if n == 3.14));
        assert!(matches!(scanner.next_token().kind, TokenKind::Number(n) if n == 255.0));
        assert!(matches!(scanner.next_token().kind, TokenKind::Number(n) if n == 10.0));
        assert!(matches!(scanner.next_token().kind, TokenKind::Number(n) if n == 0.5));
        assert!(matches!(scanner.next_token().kind, TokenKind::Number(n) if n == 1000.0));
        assert!(matches!(scanner.next_token().kind, TokenKind::BigInt(ref v) if v == "10"));
        assert!(matches!(scanner.next_token().kind, TokenKind::Number(n) if n == 1000.0));
    }

    #[test]
    fn test_strings_and_escapes() {
        assert_eq!(
            kinds(r#"'a\nb' "\x41B\u{43}""#),
            vec![
                TokenKind::String("a\nb".into()),
                TokenKind::String("ABC".into())
            ]
        );
        assert_eq!(kinds("'open"), vec![TokenKind::Invalid]);
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("require module exports typeof"),
            vec![
                TokenKind::Identifier("require".into()),
                TokenKind::Identifier("module".into()),
                TokenKind::Identifier("exports".into()),
                TokenKind::Typeof,
            ]
        );
    }

    #[test]
    fn test_comments_and_newlines() {
        let mut scanner = Scanner::new("a // line\n/* block */ b /* multi\nline */ c");
        let a = scanner.next_token();
        assert!(!a.newline_before);
        let b = scanner.next_token();
        assert_eq!(b.kind, TokenKind::Identifier("b".into()));
        assert!(b.newline_before);
        let c = scanner.next_token();
        assert_eq!(c.kind, TokenKind::Identifier("c".into()));
        assert!(c.newline_before);
    }

    #[test]
    fn test_hashbang_is_skipped() {
        assert_eq!(
            kinds("#!/usr/bin/env node\nx"),
            vec![TokenKind::Identifier("x".into())]
        );
    }

    #[test]
    fn test_rescan_regex() {
        let mut scanner = Scanner::new("/a[/]b\\//gi.test");
        let slash = scanner.next_token();
        assert_eq!(slash.kind, TokenKind::Slash);
        let regex = scanner.rescan_regex(&slash);
        assert_eq!(
            regex.kind,
            TokenKind::RegExp {
                pattern: "a[/]b\\/".into(),
                flags: "gi".into()
            }
        );
        assert_eq!(regex.span, Span::new(0, 11));
        assert_eq!(scanner.next_token().kind, TokenKind::Dot);
    }

    #[test]
    fn test_template_with_substitution() {
        let mut scanner = Scanner::new("`a${x}b`");
        assert_eq!(
            scanner.next_token().kind,
            TokenKind::Template {
                cooked: "a".into(),
                tail: false
            }
        );
        assert_eq!(scanner.next_token().kind, TokenKind::Identifier("x".into()));
        let brace = scanner.next_token();
        assert_eq!(brace.kind, TokenKind::RightBrace);
        let tail = scanner.rescan_template_continuation(&brace);
        assert_eq!(
            tail.kind,
            TokenKind::Template {
                cooked: "b".into(),
                tail: true
            }
        );
        assert_eq!(scanner.next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn test_optional_chaining_vs_conditional() {
        assert_eq!(
            kinds("a?.b"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::QuestionDot,
                TokenKind::Identifier("b".into())
            ]
        );
        assert_eq!(
            kinds("a?.5:1"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::Question,
                TokenKind::Number(0.5),
                TokenKind::Colon,
                TokenKind::Number(1.0)
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("=== !== => ** ??= ... >>>="),
            vec![
                TokenKind::StrictEqual,
                TokenKind::StrictNotEqual,
                TokenKind::Arrow,
                TokenKind::StarStar,
                TokenKind::QuestionQuestionEqual,
                TokenKind::Ellipsis,
                TokenKind::UnsignedRightShiftEqual,
            ]
        );
    }
}
