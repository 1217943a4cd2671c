// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! `import` and `export` declarations.

use super::parser::{ParseResult, Parser};
use crate::ast::*;
use crate::lexer::TokenKind;

impl Parser<'_> {
    pub(super) fn parse_import_declaration(&mut self) -> ParseResult<Statement> {
        let start = self.current.span.start;
        self.advance(); // consume 'import'

        let mut specifiers = Vec::new();
        if !matches!(self.current.kind, TokenKind::String(_)) {
            if self.current_identifier().is_some() {
                specifiers.push(ImportSpecifier::Default(self.parse_binding_identifier()?));
                if self.eat(&TokenKind::Comma) {
                    self.parse_import_clause_tail(&mut specifiers)?;
                }
            } else {
                self.parse_import_clause_tail(&mut specifiers)?;
            }
            self.expect_contextual("from")?;
        }

        let source = self.parse_string_literal()?;
        self.skip_import_attributes()?;
        self.consume_semicolon()?;

        Ok(Statement::Import(ImportDeclaration {
            specifiers,
            source,
            span: self.span_from(start),
        }))
    }

    /// `* as ns` or `{ a, b as c }`.
    fn parse_import_clause_tail(&mut self, specifiers: &mut Vec<ImportSpecifier>) -> ParseResult<()> {
        if self.eat(&TokenKind::Star) {
            self.expect_contextual("as")?;
            specifiers.push(ImportSpecifier::Namespace(self.parse_binding_identifier()?));
            return Ok(());
        }

        self.expect(&TokenKind::LeftBrace)?;
        while !self.check(&TokenKind::RightBrace) {
            let imported = self.parse_module_export_name()?;
            let local = if self.check_contextual("as") {
                self.advance();
                self.parse_binding_identifier()?
            } else {
                if matches!(self.source.as_bytes().get(imported.span.start), Some(b'"' | b'\'')) {
                    return Err(self.error_at(imported.span.start, "String import names need a local binding"));
                }
                Identifier {
                    name: imported.name.clone(),
                    span: imported.span,
                }
            };
            specifiers.push(ImportSpecifier::Named { imported, local });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightBrace)
    }

    pub(super) fn parse_export_declaration(&mut self) -> ParseResult<Statement> {
        let start = self.current.span.start;
        self.advance(); // consume 'export'

        match self.current.kind {
            TokenKind::Default => {
                self.advance();
                let declaration = match self.current.kind {
                    TokenKind::Function => ExportDefaultKind::Function(self.parse_function(false, true)?),
                    TokenKind::Async if self.async_function_follows() => {
                        ExportDefaultKind::Function(self.parse_function(true, true)?)
                    }
                    TokenKind::Class => ExportDefaultKind::Class(self.parse_class(false)?),
                    _ => {
                        let expression = self.with_in(|p| p.parse_assignment())?;
                        self.consume_semicolon()?;
                        ExportDefaultKind::Expression(expression)
                    }
                };
                Ok(Statement::ExportDefault(ExportDefaultDeclaration {
                    declaration,
                    span: self.span_from(start),
                }))
            }
            TokenKind::Star => {
                self.advance();
                let exported = if self.check_contextual("as") {
                    self.advance();
                    Some(self.parse_module_export_name()?)
                } else {
                    None
                };
                self.expect_contextual("from")?;
                let source = self.parse_string_literal()?;
                self.skip_import_attributes()?;
                self.consume_semicolon()?;
                Ok(Statement::ExportAll(ExportAllDeclaration {
                    exported,
                    source,
                    span: self.span_from(start),
                }))
            }
            TokenKind::LeftBrace => {
                self.advance();
                let mut specifiers = Vec::new();
                while !self.check(&TokenKind::RightBrace) {
                    let specifier_start = self.current.span.start;
                    let local = self.parse_module_export_name()?;
                    let exported = if self.check_contextual("as") {
                        self.advance();
                        self.parse_module_export_name()?
                    } else {
                        local.clone()
                    };
                    specifiers.push(ExportSpecifier {
                        local,
                        exported,
                        span: self.span_from(specifier_start),
                    });
                    if !self.eat(&TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(&TokenKind::RightBrace)?;
                let source = if self.check_contextual("from") {
                    self.advance();
                    let source = self.parse_string_literal()?;
                    self.skip_import_attributes()?;
                    Some(source)
                } else {
                    None
                };
                self.consume_semicolon()?;
                Ok(Statement::ExportNamed(ExportNamedDeclaration {
                    declaration: None,
                    specifiers,
                    source,
                    span: self.span_from(start),
                }))
            }
            TokenKind::Var | TokenKind::Let | TokenKind::Const | TokenKind::Function | TokenKind::Class => {
                self.parse_exported_declaration(start)
            }
            TokenKind::Async if self.async_function_follows() => self.parse_exported_declaration(start),
            _ => self.unexpected(),
        }
    }

    fn parse_exported_declaration(&mut self, start: usize) -> ParseResult<Statement> {
        let declaration = self.parse_statement()?;
        Ok(Statement::ExportNamed(ExportNamedDeclaration {
            declaration: Some(Box::new(declaration)),
            specifiers: Vec::new(),
            source: None,
            span: self.span_from(start),
        }))
    }

    fn parse_module_export_name(&mut self) -> ParseResult<ModuleExportName> {
        if let TokenKind::String(value) = &self.current.kind {
            let name = ModuleExportName {
                name: value.clone(),
                span: self.current.span,
            };
            self.advance();
            return Ok(name);
        }
        let id = self.parse_identifier_name()?;
        Ok(ModuleExportName {
            name: id.name,
            span: id.span,
        })
    }

    fn parse_string_literal(&mut self) -> ParseResult<StringLiteral> {
        let TokenKind::String(value) = &self.current.kind else {
            return self.error("Expected a module specifier string");
        };
        let literal = StringLiteral {
            value: value.clone(),
            span: self.current.span,
        };
        self.advance();
        Ok(literal)
    }

    /// Skips `with { type: 'json' }` (or the older `assert { ... }`).
    fn skip_import_attributes(&mut self) -> ParseResult<()> {
        let is_attributes = (self.check(&TokenKind::With) || self.check_contextual("assert"))
            && !self.current.newline_before
            && self.peek().kind == TokenKind::LeftBrace;
        if is_attributes {
            self.advance();
            self.parse_left_hand_side()?;
        }
        Ok(())
    }

    fn expect_contextual(&mut self, word: &str) -> ParseResult<()> {
        if self.check_contextual(word) {
            self.advance();
            Ok(())
        } else {
            self.error(format!("Expected '{word}'"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Program {
        Parser::new(src)
            .parse_program()
            .unwrap_or_else(|e| panic!("failed to parse {src:?}: {e}"))
    }

    #[test]
    fn test_import_forms() {
        let program = parse(
            "import 'side';\nimport a from 'a';\nimport * as ns from 'ns';\nimport b, { c, d as e, 'f g' as h } from 'b';\nimport data from './data.json' with { type: 'json' };",
        );
        assert_eq!(program.body.len(), 5);
        let Statement::Import(import) = &program.body[3] else {
            panic!("expected import");
        };
        let locals: Vec<&str> = import.specifiers.iter().map(|s| s.local().name.as_str()).collect();
        assert_eq!(locals, vec!["b", "c", "e", "h"]);
        assert_eq!(import.source.value, "b");
    }

    #[test]
    fn test_export_forms() {
        let program = parse(
            "export var a = 1;\nexport function f() {}\nexport class C {}\nexport { a as default, f };\nexport * from 'x';\nexport * as ns from 'y';\nexport { z } from 'z';\nexport default a + 1;",
        );
        assert_eq!(program.body.len(), 8);
        assert!(program.body.iter().all(Statement::is_module_declaration));
        let Statement::ExportNamed(named) = &program.body[3] else {
            panic!("expected named export");
        };
        assert_eq!(named.specifiers[0].exported.name, "default");
    }

    #[test]
    fn test_export_default_anonymous_function() {
        let program = parse("export default function () { return 1; }");
        let Statement::ExportDefault(decl) = &program.body[0] else {
            panic!("expected default export");
        };
        assert!(matches!(&decl.declaration, ExportDefaultKind::Function(f) if f.id.is_none()));
    }

    #[test]
    fn test_import_call_is_expression() {
        let program = parse("import('./lazy').then(m => m.default);");
        assert!(matches!(program.body[0], Statement::Expression(_)));
    }
}
