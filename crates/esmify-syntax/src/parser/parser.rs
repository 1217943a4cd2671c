// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The recursive descent parser: token handling and statements.

use crate::Error;
use crate::ast::*;
use crate::lexer::{Scanner, Span, Token, TokenKind};
use crate::location::Location;

/// Parser result type.
pub type ParseResult<T> = std::result::Result<T, Error>;

/// A recursive descent parser for JavaScript scripts and modules.
///
/// Both goals are accepted at once: `import`/`export` may appear at the top
/// level and so may `return`, since CommonJS bodies are function bodies.
pub struct Parser<'a> {
    pub(super) source: &'a str,
    pub(super) scanner: Scanner<'a>,
    pub(super) current: Token,
    pub(super) prev_end: usize,
    pub(super) in_function: bool,
    pub(super) in_async: bool,
    pub(super) in_generator: bool,
    pub(super) no_in: bool,
}

/// Saved parser state for speculative parsing.
#[derive(Clone)]
pub(super) struct Snapshot<'a> {
    scanner: Scanner<'a>,
    current: Token,
    prev_end: usize,
    flags: (bool, bool, bool, bool),
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given source code.
    pub fn new(source: &'a str) -> Self {
        let mut scanner = Scanner::new(source);
        let current = scanner.next_token();
        Self {
            source,
            scanner,
            current,
            prev_end: 0,
            in_function: false,
            in_async: false,
            in_generator: false,
            no_in: false,
        }
    }

    /// Parses a complete program.
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut body = Vec::new();
        while !self.is_at_end() {
            body.push(self.parse_statement()?);
        }
        Ok(Program {
            body,
            span: Span::new(0, self.source.len()),
        })
    }

    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        match &self.current.kind {
            TokenKind::LeftBrace => Ok(Statement::Block(self.parse_block()?)),
            TokenKind::Var => self.parse_variable_statement(VariableKind::Var),
            TokenKind::Const => self.parse_variable_statement(VariableKind::Const),
            TokenKind::Let if self.let_starts_declaration() => {
                self.parse_variable_statement(VariableKind::Let)
            }
            TokenKind::Function => {
                let function = self.parse_function(false, true)?;
                Ok(Statement::FunctionDeclaration(function))
            }
            TokenKind::Async if self.async_function_follows() => {
                let function = self.parse_function(true, true)?;
                Ok(Statement::FunctionDeclaration(function))
            }
            TokenKind::Class => Ok(Statement::ClassDeclaration(self.parse_class(true)?)),
            TokenKind::If => self.parse_if_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Do => self.parse_do_while_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Break | TokenKind::Continue => self.parse_jump_statement(),
            TokenKind::Throw => self.parse_throw_statement(),
            TokenKind::Try => self.parse_try_statement(),
            TokenKind::Switch => self.parse_switch_statement(),
            TokenKind::With => self.parse_with_statement(),
            TokenKind::Debugger => {
                let start = self.current.span.start;
                self.advance();
                self.consume_semicolon()?;
                Ok(Statement::Debugger(self.span_from(start)))
            }
            TokenKind::Semicolon => {
                let span = self.current.span;
                self.advance();
                Ok(Statement::Empty(span))
            }
            TokenKind::Import if !self.import_expression_follows() => self.parse_import_declaration(),
            TokenKind::Export => self.parse_export_declaration(),
            _ => {
                if self.current_identifier().is_some() && self.peek().kind == TokenKind::Colon {
                    return self.parse_labeled_statement();
                }
                self.parse_expression_statement()
            }
        }
    }

    pub(super) fn parse_block(&mut self) -> ParseResult<BlockStatement> {
        let start = self.current.span.start;
        self.expect(&TokenKind::LeftBrace)?;
        let mut body = Vec::new();
        while !self.check(&TokenKind::RightBrace) {
            if self.is_at_end() {
                return self.error("Unterminated block");
            }
            body.push(self.parse_statement()?);
        }
        self.advance();
        Ok(BlockStatement {
            body,
            span: self.span_from(start),
        })
    }

    fn parse_variable_statement(&mut self, kind: VariableKind) -> ParseResult<Statement> {
        let declaration = self.parse_variable_declaration(kind)?;
        self.consume_semicolon()?;
        let span = self.span_from(declaration.span.start);
        Ok(Statement::VariableDeclaration(VariableDeclaration {
            span,
            ..declaration
        }))
    }

    /// Parses `var|let|const a = 1, b` without the trailing semicolon.
    pub(super) fn parse_variable_declaration(
        &mut self,
        kind: VariableKind,
    ) -> ParseResult<VariableDeclaration> {
        let start = self.current.span.start;
        self.advance(); // consume var/let/const

        let mut declarations = Vec::new();
        loop {
            let decl_start = self.current.span.start;
            let id = self.parse_binding_target()?;
            let init = if self.eat(&TokenKind::Equal) {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            declarations.push(VariableDeclarator {
                id,
                init,
                span: self.span_from(decl_start),
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        Ok(VariableDeclaration {
            kind,
            declarations,
            span: self.span_from(start),
        })
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let start = self.current.span.start;
        let expression = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Statement::Expression(ExpressionStatement {
            expression,
            span: self.span_from(start),
        }))
    }

    fn parse_if_statement(&mut self) -> ParseResult<Statement> {
        let start = self.current.span.start;
        self.advance(); // consume 'if'
        self.expect(&TokenKind::LeftParen)?;
        let test = self.with_in(|p| p.parse_expression())?;
        self.expect(&TokenKind::RightParen)?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Statement::If(IfStatement {
            test,
            consequent,
            alternate,
            span: self.span_from(start),
        }))
    }

    fn parse_while_statement(&mut self) -> ParseResult<Statement> {
        let start = self.current.span.start;
        self.advance(); // consume 'while'
        self.expect(&TokenKind::LeftParen)?;
        let test = self.with_in(|p| p.parse_expression())?;
        self.expect(&TokenKind::RightParen)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Statement::While(WhileStatement {
            test,
            body,
            span: self.span_from(start),
        }))
    }

    fn parse_do_while_statement(&mut self) -> ParseResult<Statement> {
        let start = self.current.span.start;
        self.advance(); // consume 'do'
        let body = Box::new(self.parse_statement()?);
        self.expect(&TokenKind::While)?;
        self.expect(&TokenKind::LeftParen)?;
        let test = self.with_in(|p| p.parse_expression())?;
        self.expect(&TokenKind::RightParen)?;
        // A semicolon is always inserted after do-while
        self.eat(&TokenKind::Semicolon);
        Ok(Statement::DoWhile(DoWhileStatement {
            body,
            test,
            span: self.span_from(start),
        }))
    }

    fn parse_for_statement(&mut self) -> ParseResult<Statement> {
        let start = self.current.span.start;
        self.advance(); // consume 'for'
        let is_await = self.eat(&TokenKind::Await);
        self.expect(&TokenKind::LeftParen)?;

        let init = match &self.current.kind {
            TokenKind::Semicolon => None,
            TokenKind::Var => Some(ForInit::VariableDeclaration(
                self.without_in(|p| p.parse_variable_declaration(VariableKind::Var))?,
            )),
            TokenKind::Const => Some(ForInit::VariableDeclaration(
                self.without_in(|p| p.parse_variable_declaration(VariableKind::Const))?,
            )),
            TokenKind::Let if self.let_starts_declaration() => Some(ForInit::VariableDeclaration(
                self.without_in(|p| p.parse_variable_declaration(VariableKind::Let))?,
            )),
            _ => Some(ForInit::Expression(self.without_in(|p| p.parse_expression())?)),
        };

        let is_of = self.check_contextual("of");
        if let Some(init) = init.clone().filter(|_| is_of || self.check(&TokenKind::In)) {
            self.advance(); // consume 'in' / 'of'
            let left = match init {
                ForInit::VariableDeclaration(declaration) => ForInLeft::VariableDeclaration(declaration),
                ForInit::Expression(expression) => ForInLeft::Pattern(self.expression_to_pattern(expression)?),
            };
            let right = if is_of {
                self.with_in(|p| p.parse_assignment())?
            } else {
                self.with_in(|p| p.parse_expression())?
            };
            self.expect(&TokenKind::RightParen)?;
            let body = Box::new(self.parse_statement()?);
            let span = self.span_from(start);
            return Ok(if is_of {
                Statement::ForOf(ForOfStatement {
                    left,
                    right,
                    body,
                    is_await,
                    span,
                })
            } else {
                Statement::ForIn(ForInStatement {
                    left,
                    right,
                    body,
                    span,
                })
            });
        }

        self.expect(&TokenKind::Semicolon)?;
        let test = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.with_in(|p| p.parse_expression())?)
        };
        self.expect(&TokenKind::Semicolon)?;
        let update = if self.check(&TokenKind::RightParen) {
            None
        } else {
            Some(self.with_in(|p| p.parse_expression())?)
        };
        self.expect(&TokenKind::RightParen)?;
        let body = Box::new(self.parse_statement()?);

        Ok(Statement::For(ForStatement {
            init,
            test,
            update,
            body,
            span: self.span_from(start),
        }))
    }

    fn parse_return_statement(&mut self) -> ParseResult<Statement> {
        let start = self.current.span.start;
        self.advance(); // consume 'return'
        let argument = if self.at_statement_end() {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_semicolon()?;
        Ok(Statement::Return(ReturnStatement {
            argument,
            span: self.span_from(start),
        }))
    }

    fn parse_jump_statement(&mut self) -> ParseResult<Statement> {
        let start = self.current.span.start;
        let is_break = self.check(&TokenKind::Break);
        self.advance(); // consume 'break' / 'continue'
        let label = match self.current_identifier() {
            Some(name) if !self.current.newline_before => {
                let span = self.current.span;
                self.advance();
                Some(Identifier { name, span })
            }
            _ => None,
        };
        self.consume_semicolon()?;
        let jump = JumpStatement {
            label,
            span: self.span_from(start),
        };
        Ok(if is_break {
            Statement::Break(jump)
        } else {
            Statement::Continue(jump)
        })
    }

    fn parse_throw_statement(&mut self) -> ParseResult<Statement> {
        let start = self.current.span.start;
        self.advance(); // consume 'throw'
        if self.current.newline_before {
            return self.error("Illegal newline after throw");
        }
        let argument = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Statement::Throw(ThrowStatement {
            argument,
            span: self.span_from(start),
        }))
    }

    fn parse_try_statement(&mut self) -> ParseResult<Statement> {
        let start = self.current.span.start;
        self.advance(); // consume 'try'
        let block = self.parse_block()?;

        let handler = if self.check(&TokenKind::Catch) {
            let catch_start = self.current.span.start;
            self.advance();
            let param = if self.eat(&TokenKind::LeftParen) {
                let param = self.parse_binding_target()?;
                self.expect(&TokenKind::RightParen)?;
                Some(param)
            } else {
                None
            };
            let body = self.parse_block()?;
            Some(CatchClause {
                param,
                body,
                span: self.span_from(catch_start),
            })
        } else {
            None
        };

        let finalizer = if self.eat(&TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return self.error("Missing catch or finally after try");
        }

        Ok(Statement::Try(TryStatement {
            block,
            handler,
            finalizer,
            span: self.span_from(start),
        }))
    }

    fn parse_switch_statement(&mut self) -> ParseResult<Statement> {
        let start = self.current.span.start;
        self.advance(); // consume 'switch'
        self.expect(&TokenKind::LeftParen)?;
        let discriminant = self.with_in(|p| p.parse_expression())?;
        self.expect(&TokenKind::RightParen)?;
        self.expect(&TokenKind::LeftBrace)?;

        let mut cases = Vec::new();
        while !self.check(&TokenKind::RightBrace) {
            let case_start = self.current.span.start;
            let test = if self.eat(&TokenKind::Case) {
                Some(self.with_in(|p| p.parse_expression())?)
            } else if self.eat(&TokenKind::Default) {
                None
            } else {
                return self.unexpected();
            };
            self.expect(&TokenKind::Colon)?;
            let mut consequent = Vec::new();
            while !matches!(
                self.current.kind,
                TokenKind::Case | TokenKind::Default | TokenKind::RightBrace | TokenKind::Eof
            ) {
                consequent.push(self.parse_statement()?);
            }
            cases.push(SwitchCase {
                test,
                consequent,
                span: self.span_from(case_start),
            });
        }
        self.advance(); // consume '}'

        Ok(Statement::Switch(SwitchStatement {
            discriminant,
            cases,
            span: self.span_from(start),
        }))
    }

    fn parse_with_statement(&mut self) -> ParseResult<Statement> {
        let start = self.current.span.start;
        self.advance(); // consume 'with'
        self.expect(&TokenKind::LeftParen)?;
        let object = self.with_in(|p| p.parse_expression())?;
        self.expect(&TokenKind::RightParen)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Statement::With(WithStatement {
            object,
            body,
            span: self.span_from(start),
        }))
    }

    fn parse_labeled_statement(&mut self) -> ParseResult<Statement> {
        let start = self.current.span.start;
        let label = self.parse_binding_identifier()?;
        self.expect(&TokenKind::Colon)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Statement::Labeled(LabeledStatement {
            label,
            body,
            span: self.span_from(start),
        }))
    }

    // ----- lookahead helpers -----

    fn let_starts_declaration(&self) -> bool {
        let next = self.peek();
        matches!(next.kind, TokenKind::LeftBracket | TokenKind::LeftBrace)
            || identifier_like(&next.kind)
    }

    pub(super) fn async_function_follows(&self) -> bool {
        let next = self.peek();
        next.kind == TokenKind::Function && !next.newline_before
    }

    fn import_expression_follows(&self) -> bool {
        matches!(self.peek().kind, TokenKind::LeftParen | TokenKind::Dot)
    }

    // ----- token helpers -----

    pub(super) fn advance(&mut self) {
        self.prev_end = self.current.span.end;
        self.current = self.scanner.next_token();
    }

    pub(super) fn peek(&self) -> Token {
        self.scanner.clone().next_token()
    }

    pub(super) fn check(&self, kind: &TokenKind) -> bool {
        &self.current.kind == kind
    }

    pub(super) fn check_contextual(&self, word: &str) -> bool {
        matches!(&self.current.kind, TokenKind::Identifier(name) if name == word)
    }

    pub(super) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn expect(&mut self, kind: &TokenKind) -> ParseResult<()> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            self.error(format!(
                "Expected {} but found {}",
                describe_kind(kind),
                self.describe_current()
            ))
        }
    }

    /// Applies automatic semicolon insertion.
    pub(super) fn consume_semicolon(&mut self) -> ParseResult<()> {
        if self.eat(&TokenKind::Semicolon) || self.at_statement_end() {
            Ok(())
        } else {
            self.error(format!("Expected ';' but found {}", self.describe_current()))
        }
    }

    /// True when a statement may end here without a semicolon.
    pub(super) fn at_statement_end(&self) -> bool {
        matches!(
            self.current.kind,
            TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof
        ) || self.current.newline_before
    }

    pub(super) fn is_at_end(&self) -> bool {
        self.check(&TokenKind::Eof)
    }

    pub(super) fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end.max(start))
    }

    /// Returns the name when the current token can be used as an identifier
    /// reference or binding in the current context.
    pub(super) fn current_identifier(&self) -> Option<String> {
        match &self.current.kind {
            TokenKind::Identifier(name) => Some(name.clone()),
            TokenKind::Let | TokenKind::Static | TokenKind::Async => {
                self.current.kind.keyword_text().map(str::to_string)
            }
            TokenKind::Yield if !self.in_generator => Some("yield".to_string()),
            TokenKind::Await if !self.await_is_operator() => Some("await".to_string()),
            _ => None,
        }
    }

    pub(super) fn await_is_operator(&self) -> bool {
        self.in_async || !self.in_function
    }

    pub(super) fn parse_binding_identifier(&mut self) -> ParseResult<Identifier> {
        match self.current_identifier() {
            Some(name) => {
                let span = self.current.span;
                self.advance();
                Ok(Identifier { name, span })
            }
            None => self.error(format!(
                "Expected identifier but found {}",
                self.describe_current()
            )),
        }
    }

    /// Parses an identifier name, where reserved words are allowed
    /// (property names, export names).
    pub(super) fn parse_identifier_name(&mut self) -> ParseResult<Identifier> {
        let name = match &self.current.kind {
            TokenKind::Identifier(name) => name.clone(),
            kind => match kind.keyword_text() {
                Some(text) => text.to_string(),
                None => {
                    return self.error(format!(
                        "Expected property name but found {}",
                        self.describe_current()
                    ));
                }
            },
        };
        let span = self.current.span;
        self.advance();
        Ok(Identifier { name, span })
    }

    pub(super) fn snapshot(&self) -> Snapshot<'a> {
        Snapshot {
            scanner: self.scanner.clone(),
            current: self.current.clone(),
            prev_end: self.prev_end,
            flags: (self.in_function, self.in_async, self.in_generator, self.no_in),
        }
    }

    pub(super) fn restore(&mut self, snapshot: Snapshot<'a>) {
        self.scanner = snapshot.scanner;
        self.current = snapshot.current;
        self.prev_end = snapshot.prev_end;
        (self.in_function, self.in_async, self.in_generator, self.no_in) = snapshot.flags;
    }

    /// Runs `f` with the `in` operator allowed.
    pub(super) fn with_in<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let saved = std::mem::replace(&mut self.no_in, false);
        let result = f(self);
        self.no_in = saved;
        result
    }

    /// Runs `f` with the `in` operator disallowed (for-loop heads).
    pub(super) fn without_in<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let saved = std::mem::replace(&mut self.no_in, true);
        let result = f(self);
        self.no_in = saved;
        result
    }

    /// Runs `f` inside a function context.
    pub(super) fn with_function_context<T>(
        &mut self,
        is_async: bool,
        is_generator: bool,
        f: impl FnOnce(&mut Self) -> ParseResult<T>,
    ) -> ParseResult<T> {
        let saved = (self.in_function, self.in_async, self.in_generator, self.no_in);
        self.in_function = true;
        self.in_async = is_async;
        self.in_generator = is_generator;
        self.no_in = false;
        let result = f(self);
        (self.in_function, self.in_async, self.in_generator, self.no_in) = saved;
        result
    }

    // ----- errors -----

    pub(super) fn error<T>(&self, message: impl Into<String>) -> ParseResult<T> {
        Err(self.error_at(self.current.span.start, message))
    }

    pub(super) fn error_at(&self, offset: usize, message: impl Into<String>) -> Error {
        Error::Syntax {
            message: message.into(),
            offset,
            location: Location::from_offset(self.source, offset),
        }
    }

    pub(super) fn unexpected<T>(&self) -> ParseResult<T> {
        self.error(format!("Unexpected {}", self.describe_current()))
    }

    fn describe_current(&self) -> String {
        match self.current.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Invalid => "invalid or unterminated token".to_string(),
            _ => format!("'{}'", self.current.span.slice(self.source)),
        }
    }
}

/// True for tokens that can name a binding.
pub(super) fn identifier_like(kind: &TokenKind) -> bool {
    matches!(kind, TokenKind::Identifier(_)) || kind.is_contextual_keyword()
}

fn describe_kind(kind: &TokenKind) -> String {
    let text = match kind {
        TokenKind::LeftBrace => "{",
        TokenKind::RightBrace => "}",
        TokenKind::LeftParen => "(",
        TokenKind::RightParen => ")",
        TokenKind::LeftBracket => "[",
        TokenKind::RightBracket => "]",
        TokenKind::Semicolon => ";",
        TokenKind::Comma => ",",
        TokenKind::Colon => ":",
        TokenKind::Equal => "=",
        TokenKind::Arrow => "=>",
        other => return other.keyword_text().map(|t| format!("'{t}'")).unwrap_or_else(|| format!("{other:?}")),
    };
    format!("'{text}'")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(src: &str) -> Program {
        Parser::new(src)
            .parse_program()
            .unwrap_or_else(|e| panic!("failed to parse {src:?}: {e}"))
    }

    fn parse_stmt(src: &str) -> Statement {
        let mut program = parse_ok(src);
        assert_eq!(program.body.len(), 1, "expected one statement in {src:?}");
        program.body.remove(0)
    }

    fn parse_err(src: &str) -> Error {
        Parser::new(src).parse_program().expect_err("expected a syntax error")
    }

    #[test]
    fn test_parse_variable_declaration() {
        let stmt = parse_stmt("var x = 42;");
        let Statement::VariableDeclaration(decl) = stmt else {
            panic!("expected variable declaration");
        };
        assert_eq!(decl.kind, VariableKind::Var);
        assert_eq!(decl.declarations.len(), 1);
        assert_eq!(decl.span, Span::new(0, 11));
    }

    #[test]
    fn test_parse_destructuring_declaration() {
        let stmt = parse_stmt("const { a, b: [c, ...d], e = 1 } = require('x');");
        let Statement::VariableDeclaration(decl) = stmt else {
            panic!("expected variable declaration");
        };
        let mut names = Vec::new();
        decl.declarations[0].id.bound_names(&mut names);
        let names: Vec<&str> = names.iter().map(|id| id.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "d", "e"]);
    }

    #[test]
    fn test_asi_between_lines() {
        let program = parse_ok("var a = 1\nvar b = 2\na\n++b");
        assert_eq!(program.body.len(), 4);
    }

    #[test]
    fn test_restricted_return() {
        let program = parse_ok("function f() { return\n42 }");
        let Statement::FunctionDeclaration(function) = &program.body[0] else {
            panic!("expected function");
        };
        let Statement::Return(ret) = &function.body.statements[0] else {
            panic!("expected return");
        };
        assert!(ret.argument.is_none());
        assert_eq!(function.body.statements.len(), 2);
    }

    #[test]
    fn test_top_level_return() {
        let stmt = parse_stmt("return;");
        assert!(matches!(stmt, Statement::Return(_)));
    }

    #[test]
    fn test_parse_control_flow() {
        parse_ok("if (a) b(); else { c() }");
        parse_ok("for (var i = 0; i < 10; i++) {}");
        parse_ok("for (const k in obj) {}");
        parse_ok("for (let [k, v] of map) {}");
        parse_ok("for (x of list);");
        parse_ok("while (x) { break; }");
        parse_ok("do x++; while (x < 5)");
        parse_ok("outer: for (;;) { continue outer; }");
        parse_ok("switch (x) { case 1: a(); break; default: b(); }");
        parse_ok("try { a() } catch { b() } finally { c() }");
        parse_ok("try { a() } catch ({ message }) {}");
        parse_ok("with (obj) { x; }");
        parse_ok("debugger;");
    }

    #[test]
    fn test_for_in_with_in_inside_parens() {
        let stmt = parse_stmt("for (var i = ('a' in b) ? 1 : 0; i < 2; i++) {}");
        assert!(matches!(stmt, Statement::For(_)));
    }

    #[test]
    fn test_regex_after_paren_statement() {
        let stmt = parse_stmt("if (x) /foo/.test(y);");
        let Statement::If(if_stmt) = stmt else {
            panic!("expected if");
        };
        assert!(matches!(*if_stmt.consequent, Statement::Expression(_)));
    }

    #[test]
    fn test_let_as_identifier() {
        let stmt = parse_stmt("let = 5;");
        assert!(matches!(stmt, Statement::Expression(_)));
    }

    #[test]
    fn test_parse_error_missing_semicolon() {
        let err = parse_err("var a = 1 var b = 2");
        let Error::Syntax { location, .. } = err;
        assert_eq!(location.line, 1);
        assert_eq!(location.column, 10);
    }

    #[test]
    fn test_parse_error_unterminated_block() {
        let err = parse_err("function f() {\n  return 1;\n");
        assert!(err.to_string().contains("SyntaxError"));
    }

    #[test]
    fn test_parse_error_try_without_handler() {
        parse_err("try {}");
    }
}
