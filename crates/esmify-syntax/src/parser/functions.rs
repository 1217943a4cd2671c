// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Functions, classes and binding patterns.

use super::parser::{ParseResult, Parser};
use crate::ast::*;
use crate::lexer::TokenKind;

impl Parser<'_> {
    /// Parses `[async] function [*] [name] (params) { body }`.
    ///
    /// Declarations may still omit the name (`export default function () {}`).
    pub(super) fn parse_function(&mut self, is_async: bool, is_declaration: bool) -> ParseResult<Function> {
        let start = self.current.span.start;
        if is_async {
            self.advance(); // consume 'async'
        }
        self.expect(&TokenKind::Function)?;
        let is_generator = self.eat(&TokenKind::Star);

        // Expression names are bound inside the function, so yield/await
        // follow the function's own context
        let id = if is_declaration {
            self.current_identifier()
                .map(|_| self.parse_binding_identifier())
                .transpose()?
        } else {
            self.with_function_context(is_async, is_generator, |p| {
                p.current_identifier()
                    .map(|_| p.parse_binding_identifier())
                    .transpose()
            })?
        };

        let (params, body) = self.with_function_context(is_async, is_generator, |p| {
            let params = p.parse_formal_params()?;
            let body = p.parse_function_body()?;
            Ok((params, body))
        })?;

        Ok(Function {
            id,
            params,
            body,
            is_async,
            is_generator,
            span: self.span_from(start),
        })
    }

    /// Parses a parenthesized parameter list.
    pub(super) fn parse_formal_params(&mut self) -> ParseResult<Vec<Pattern>> {
        self.expect(&TokenKind::LeftParen)?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RightParen) {
            if self.check(&TokenKind::Ellipsis) {
                params.push(self.parse_rest_element()?);
                break;
            }
            params.push(self.parse_binding_element()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(params)
    }

    /// Parses `{ statements }` of a function.
    pub(super) fn parse_function_body(&mut self) -> ParseResult<FunctionBody> {
        let start = self.current.span.start;
        self.expect(&TokenKind::LeftBrace)?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RightBrace) {
            if self.is_at_end() {
                return self.error("Unterminated function body");
            }
            statements.push(self.parse_statement()?);
        }
        self.advance();
        Ok(FunctionBody {
            statements,
            span: self.span_from(start),
        })
    }

    /// Parses a class declaration or expression.
    pub(super) fn parse_class(&mut self, is_declaration: bool) -> ParseResult<Class> {
        let start = self.current.span.start;
        self.advance(); // consume 'class'

        let id = match self.current_identifier() {
            Some(_) => Some(self.parse_binding_identifier()?),
            None if is_declaration && !self.check(&TokenKind::Extends) && !self.check(&TokenKind::LeftBrace) => {
                return self.unexpected();
            }
            None => None,
        };

        let super_class = if self.eat(&TokenKind::Extends) {
            Some(Box::new(self.parse_left_hand_side()?))
        } else {
            None
        };

        self.expect(&TokenKind::LeftBrace)?;
        let mut body = Vec::new();
        while !self.check(&TokenKind::RightBrace) {
            if self.eat(&TokenKind::Semicolon) {
                continue;
            }
            if self.is_at_end() {
                return self.error("Unterminated class body");
            }
            body.push(self.parse_class_member()?);
        }
        self.advance();

        Ok(Class {
            id,
            super_class,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_class_member(&mut self) -> ParseResult<ClassMember> {
        let start = self.current.span.start;

        let mut is_static = false;
        if self.check(&TokenKind::Static) {
            let next = self.peek().kind;
            if next == TokenKind::LeftBrace {
                self.advance();
                let block = self.with_function_context(false, false, |p| p.parse_function_body())?;
                return Ok(ClassMember::StaticBlock(block));
            }
            if !matches!(
                next,
                TokenKind::LeftParen | TokenKind::Equal | TokenKind::Semicolon | TokenKind::RightBrace
            ) {
                self.advance();
                is_static = true;
            }
        }

        let modifiers = self.parse_method_modifiers();
        let key = self.parse_property_key()?;

        if modifiers.is_method() || self.check(&TokenKind::LeftParen) {
            let value = self.parse_method_function(start, modifiers.is_async, modifiers.is_generator)?;
            let kind = match modifiers.accessor {
                Some(PropertyKind::Get) => MethodKind::Get,
                Some(PropertyKind::Set) => MethodKind::Set,
                _ if !is_static
                    && !modifiers.is_method()
                    && key.static_name().as_deref() == Some("constructor") =>
                {
                    MethodKind::Constructor
                }
                _ => MethodKind::Method,
            };
            return Ok(ClassMember::Method(MethodDefinition {
                key,
                value,
                kind,
                is_static,
                span: self.span_from(start),
            }));
        }

        let value = if self.eat(&TokenKind::Equal) {
            Some(self.with_function_context(false, false, |p| p.parse_assignment())?)
        } else {
            None
        };
        self.consume_semicolon()?;
        Ok(ClassMember::Property(ClassProperty {
            key,
            value,
            is_static,
            span: self.span_from(start),
        }))
    }

    /// Parses a binding name or destructuring pattern.
    pub(super) fn parse_binding_target(&mut self) -> ParseResult<Pattern> {
        match self.current.kind {
            TokenKind::LeftBrace => self.parse_object_binding(),
            TokenKind::LeftBracket => self.parse_array_binding(),
            _ => Ok(Pattern::Identifier(self.parse_binding_identifier()?)),
        }
    }

    /// Parses a binding target with an optional default value.
    fn parse_binding_element(&mut self) -> ParseResult<Pattern> {
        let start = self.current.span.start;
        let target = self.parse_binding_target()?;
        if !self.eat(&TokenKind::Equal) {
            return Ok(target);
        }
        let right = self.with_in(|p| p.parse_assignment())?;
        Ok(Pattern::Assignment(AssignmentPattern {
            left: Box::new(target),
            right: Box::new(right),
            span: self.span_from(start),
        }))
    }

    fn parse_rest_element(&mut self) -> ParseResult<Pattern> {
        let start = self.current.span.start;
        self.expect(&TokenKind::Ellipsis)?;
        let argument = self.parse_binding_target()?;
        Ok(Pattern::Rest(RestElement {
            argument: Box::new(argument),
            span: self.span_from(start),
        }))
    }

    fn parse_object_binding(&mut self) -> ParseResult<Pattern> {
        let start = self.current.span.start;
        self.advance(); // consume '{'
        let mut properties = Vec::new();
        let mut rest = None;

        while !self.check(&TokenKind::RightBrace) {
            if self.check(&TokenKind::Ellipsis) {
                self.advance();
                rest = Some(Box::new(Pattern::Identifier(self.parse_binding_identifier()?)));
                break;
            }

            let property_start = self.current.span.start;
            let key = self.parse_property_key()?;
            let (value, shorthand) = if self.eat(&TokenKind::Colon) {
                (self.parse_binding_element()?, false)
            } else {
                let PropertyKey::Identifier(id) = &key else {
                    return self.unexpected();
                };
                let target = Pattern::Identifier(id.clone());
                let value = if self.eat(&TokenKind::Equal) {
                    let right = self.with_in(|p| p.parse_assignment())?;
                    Pattern::Assignment(AssignmentPattern {
                        left: Box::new(target),
                        right: Box::new(right),
                        span: self.span_from(property_start),
                    })
                } else {
                    target
                };
                (value, true)
            };

            properties.push(PatternProperty {
                key,
                value,
                shorthand,
                span: self.span_from(property_start),
            });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightBrace)?;

        Ok(Pattern::Object(ObjectPattern {
            properties,
            rest,
            span: self.span_from(start),
        }))
    }

    fn parse_array_binding(&mut self) -> ParseResult<Pattern> {
        let start = self.current.span.start;
        self.advance(); // consume '['
        let mut elements = Vec::new();

        while !self.check(&TokenKind::RightBracket) {
            if self.eat(&TokenKind::Comma) {
                elements.push(None);
                continue;
            }
            if self.check(&TokenKind::Ellipsis) {
                elements.push(Some(self.parse_rest_element()?));
                break;
            }
            elements.push(Some(self.parse_binding_element()?));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightBracket)?;

        Ok(Pattern::Array(ArrayPattern {
            elements,
            span: self.span_from(start),
        }))
    }
}
