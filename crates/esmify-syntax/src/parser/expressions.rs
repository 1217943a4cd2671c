// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Expression parsing.

use super::parser::{ParseResult, Parser, identifier_like};
use crate::ast::*;
use crate::lexer::TokenKind;

/// Either kind of infix operator handled by precedence climbing.
#[derive(Clone, Copy)]
enum InfixOperator {
    Binary(BinaryOperator),
    Logical(LogicalOperator),
}

impl Parser<'_> {
    /// Parses a full expression, including the comma operator.
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expression> {
        let start = self.current.span.start;
        let first = self.parse_assignment()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat(&TokenKind::Comma) {
            expressions.push(self.parse_assignment()?);
        }
        Ok(Expression::Sequence(SequenceExpression {
            expressions,
            span: self.span_from(start),
        }))
    }

    /// Parses an assignment expression (arrows and `yield` included).
    pub(super) fn parse_assignment(&mut self) -> ParseResult<Expression> {
        if self.check(&TokenKind::Yield) && self.in_generator {
            return self.parse_yield();
        }
        if let Some(arrow) = self.try_parse_arrow()? {
            return Ok(arrow);
        }

        let start = self.current.span.start;
        let left = self.parse_conditional()?;

        if !self.current.kind.is_assignment_operator() {
            return Ok(left);
        }

        let operator = match self.current.kind {
            TokenKind::Equal => AssignmentOperator::Assign,
            TokenKind::AmpersandAmpersandEqual
            | TokenKind::PipePipeEqual
            | TokenKind::QuestionQuestionEqual => AssignmentOperator::Logical,
            _ => AssignmentOperator::Compound,
        };
        let target = if operator == AssignmentOperator::Assign {
            self.expression_to_pattern(left)?
        } else {
            self.simple_assignment_target(left)?
        };
        self.advance(); // consume operator
        let right = self.parse_assignment()?;

        Ok(Expression::Assignment(AssignmentExpression {
            operator,
            left: Box::new(target),
            right: Box::new(right),
            span: self.span_from(start),
        }))
    }

    fn parse_yield(&mut self) -> ParseResult<Expression> {
        let start = self.current.span.start;
        self.advance(); // consume 'yield'
        let delegate = !self.current.newline_before && self.eat(&TokenKind::Star);
        let argument = if delegate || !self.yield_argument_absent() {
            Some(Box::new(self.parse_assignment()?))
        } else {
            None
        };
        Ok(Expression::Yield(YieldExpression {
            argument,
            delegate,
            span: self.span_from(start),
        }))
    }

    fn yield_argument_absent(&self) -> bool {
        self.current.newline_before
            || matches!(
                self.current.kind,
                TokenKind::RightParen
                    | TokenKind::RightBracket
                    | TokenKind::RightBrace
                    | TokenKind::Comma
                    | TokenKind::Semicolon
                    | TokenKind::Colon
                    | TokenKind::Eof
            )
            || (self.current.kind == TokenKind::In && self.no_in)
    }

    /// Recognizes the arrow function forms and parses them. Parenthesized
    /// parameter lists are parsed speculatively and rolled back when no
    /// `=>` follows.
    fn try_parse_arrow(&mut self) -> ParseResult<Option<Expression>> {
        let start = self.current.span.start;

        // x => ...
        if self.current_identifier().is_some() && self.peek().kind == TokenKind::Arrow {
            let param = Pattern::Identifier(self.parse_binding_identifier()?);
            return self.parse_arrow_rest(start, vec![param], false).map(Some);
        }

        if self.check(&TokenKind::Async) {
            let next = self.peek();
            if next.newline_before {
                return Ok(None);
            }
            // async x => ...
            if identifier_like(&next.kind) && next.kind != TokenKind::Async {
                let snapshot = self.snapshot();
                self.advance(); // consume 'async'
                if self.current_identifier().is_some() && self.peek().kind == TokenKind::Arrow {
                    let param = Pattern::Identifier(self.parse_binding_identifier()?);
                    return self.parse_arrow_rest(start, vec![param], true).map(Some);
                }
                self.restore(snapshot);
                return Ok(None);
            }
            // async (...) => ...
            if next.kind == TokenKind::LeftParen {
                return self.try_parse_parenthesized_arrow(start, true);
            }
            return Ok(None);
        }

        if self.check(&TokenKind::LeftParen) {
            return self.try_parse_parenthesized_arrow(start, false);
        }

        Ok(None)
    }

    fn try_parse_parenthesized_arrow(
        &mut self,
        start: usize,
        is_async: bool,
    ) -> ParseResult<Option<Expression>> {
        let snapshot = self.snapshot();
        if is_async {
            self.advance();
        }
        let params = self.with_function_context(is_async, false, |p| p.parse_formal_params());
        match params {
            Ok(params) if self.check(&TokenKind::Arrow) && !self.current.newline_before => {
                self.parse_arrow_rest(start, params, is_async).map(Some)
            }
            _ => {
                self.restore(snapshot);
                Ok(None)
            }
        }
    }

    fn parse_arrow_rest(
        &mut self,
        start: usize,
        params: Vec<Pattern>,
        is_async: bool,
    ) -> ParseResult<Expression> {
        self.expect(&TokenKind::Arrow)?;
        let no_in = self.no_in;
        let body = self.with_function_context(is_async, false, |p| {
            if p.check(&TokenKind::LeftBrace) {
                Ok(ArrowBody::Block(p.parse_function_body()?))
            } else {
                // A concise body keeps the enclosing `in` restriction
                p.no_in = no_in;
                Ok(ArrowBody::Expression(Box::new(p.parse_assignment()?)))
            }
        })?;
        Ok(Expression::Arrow(Box::new(ArrowFunction {
            params,
            body,
            is_async,
            span: self.span_from(start),
        })))
    }

    fn parse_conditional(&mut self) -> ParseResult<Expression> {
        let start = self.current.span.start;
        let test = self.parse_binary(0)?;
        if !self.eat(&TokenKind::Question) {
            return Ok(test);
        }
        let consequent = self.with_in(|p| p.parse_assignment())?;
        self.expect(&TokenKind::Colon)?;
        let alternate = self.parse_assignment()?;
        Ok(Expression::Conditional(ConditionalExpression {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
            span: self.span_from(start),
        }))
    }

    /// Precedence climbing over binary and logical operators.
    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<Expression> {
        let start = self.current.span.start;
        let mut left = self.parse_unary()?;

        while let Some((precedence, operator)) = self.infix_operator() {
            if precedence <= min_precedence {
                break;
            }
            self.advance();
            let right = match operator {
                // ** is right-associative
                InfixOperator::Binary(BinaryOperator::Exp) => self.parse_binary(precedence - 1)?,
                _ => self.parse_binary(precedence)?,
            };
            let span = self.span_from(start);
            left = match operator {
                InfixOperator::Binary(operator) => Expression::Binary(BinaryExpression {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                    span,
                }),
                InfixOperator::Logical(operator) => Expression::Logical(LogicalExpression {
                    operator,
                    left: Box::new(left),
                    right: Box::new(right),
                    span,
                }),
            };
        }

        Ok(left)
    }

    fn infix_operator(&self) -> Option<(u8, InfixOperator)> {
        use BinaryOperator as B;
        use InfixOperator::{Binary, Logical};
        let entry = match self.current.kind {
            TokenKind::QuestionQuestion => (1, Logical(LogicalOperator::NullishCoalescing)),
            TokenKind::PipePipe => (2, Logical(LogicalOperator::Or)),
            TokenKind::AmpersandAmpersand => (3, Logical(LogicalOperator::And)),
            TokenKind::Pipe => (4, Binary(B::BitwiseOr)),
            TokenKind::Caret => (5, Binary(B::BitwiseXor)),
            TokenKind::Ampersand => (6, Binary(B::BitwiseAnd)),
            TokenKind::EqualEqual => (7, Binary(B::Equal)),
            TokenKind::NotEqual => (7, Binary(B::NotEqual)),
            TokenKind::StrictEqual => (7, Binary(B::StrictEqual)),
            TokenKind::StrictNotEqual => (7, Binary(B::StrictNotEqual)),
            TokenKind::LessThan => (8, Binary(B::LessThan)),
            TokenKind::LessThanEqual => (8, Binary(B::LessThanEqual)),
            TokenKind::GreaterThan => (8, Binary(B::GreaterThan)),
            TokenKind::GreaterThanEqual => (8, Binary(B::GreaterThanEqual)),
            TokenKind::Instanceof => (8, Binary(B::Instanceof)),
            TokenKind::In if !self.no_in => (8, Binary(B::In)),
            TokenKind::LeftShift => (9, Binary(B::LeftShift)),
            TokenKind::RightShift => (9, Binary(B::RightShift)),
            TokenKind::UnsignedRightShift => (9, Binary(B::UnsignedRightShift)),
            TokenKind::Plus => (10, Binary(B::Add)),
            TokenKind::Minus => (10, Binary(B::Sub)),
            TokenKind::Star => (11, Binary(B::Mul)),
            TokenKind::Slash => (11, Binary(B::Div)),
            TokenKind::Percent => (11, Binary(B::Mod)),
            TokenKind::StarStar => (12, Binary(B::Exp)),
            _ => return None,
        };
        Some(entry)
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        let start = self.current.span.start;
        let operator = match self.current.kind {
            TokenKind::Bang => Some(UnaryOperator::Not),
            TokenKind::Tilde => Some(UnaryOperator::BitwiseNot),
            TokenKind::Plus => Some(UnaryOperator::Plus),
            TokenKind::Minus => Some(UnaryOperator::Minus),
            TokenKind::Typeof => Some(UnaryOperator::Typeof),
            TokenKind::Void => Some(UnaryOperator::Void),
            TokenKind::Delete => Some(UnaryOperator::Delete),
            _ => None,
        };
        if let Some(operator) = operator {
            self.advance();
            let argument = self.parse_unary()?;
            return Ok(Expression::Unary(UnaryExpression {
                operator,
                argument: Box::new(argument),
                span: self.span_from(start),
            }));
        }

        if matches!(self.current.kind, TokenKind::PlusPlus | TokenKind::MinusMinus) {
            let operator = if self.check(&TokenKind::PlusPlus) {
                UpdateOperator::Increment
            } else {
                UpdateOperator::Decrement
            };
            self.advance();
            let argument = self.parse_unary()?;
            return Ok(Expression::Update(UpdateExpression {
                operator,
                prefix: true,
                argument: Box::new(argument),
                span: self.span_from(start),
            }));
        }

        if self.check(&TokenKind::Await) && self.await_is_operator() {
            self.advance();
            let argument = self.parse_unary()?;
            return Ok(Expression::Await(AwaitExpression {
                argument: Box::new(argument),
                span: self.span_from(start),
            }));
        }

        let expression = self.parse_left_hand_side()?;
        if matches!(self.current.kind, TokenKind::PlusPlus | TokenKind::MinusMinus)
            && !self.current.newline_before
        {
            let operator = if self.check(&TokenKind::PlusPlus) {
                UpdateOperator::Increment
            } else {
                UpdateOperator::Decrement
            };
            self.advance();
            return Ok(Expression::Update(UpdateExpression {
                operator,
                prefix: false,
                argument: Box::new(expression),
                span: self.span_from(start),
            }));
        }
        Ok(expression)
    }

    /// Parses member accesses, calls, optional chains and tagged templates.
    pub(super) fn parse_left_hand_side(&mut self) -> ParseResult<Expression> {
        let start = self.current.span.start;
        let base = if self.check(&TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        self.parse_suffixes(start, base, true)
    }

    fn parse_suffixes(
        &mut self,
        start: usize,
        mut expression: Expression,
        allow_call: bool,
    ) -> ParseResult<Expression> {
        loop {
            match &self.current.kind {
                TokenKind::Dot => {
                    self.advance();
                    let property = self.parse_member_name()?;
                    expression = Expression::Member(MemberExpression {
                        object: Box::new(expression),
                        property,
                        optional: false,
                        span: self.span_from(start),
                    });
                }
                TokenKind::QuestionDot if allow_call => {
                    self.advance();
                    expression = match self.current.kind {
                        TokenKind::LeftParen => {
                            let arguments = self.parse_arguments()?;
                            Expression::Call(CallExpression {
                                callee: Box::new(expression),
                                arguments,
                                optional: true,
                                span: self.span_from(start),
                            })
                        }
                        TokenKind::LeftBracket => {
                            self.advance();
                            let property = self.with_in(|p| p.parse_expression())?;
                            self.expect(&TokenKind::RightBracket)?;
                            Expression::Member(MemberExpression {
                                object: Box::new(expression),
                                property: MemberProperty::Computed(Box::new(property)),
                                optional: true,
                                span: self.span_from(start),
                            })
                        }
                        _ => {
                            let property = self.parse_member_name()?;
                            Expression::Member(MemberExpression {
                                object: Box::new(expression),
                                property,
                                optional: true,
                                span: self.span_from(start),
                            })
                        }
                    };
                }
                TokenKind::LeftBracket => {
                    self.advance();
                    let property = self.with_in(|p| p.parse_expression())?;
                    self.expect(&TokenKind::RightBracket)?;
                    expression = Expression::Member(MemberExpression {
                        object: Box::new(expression),
                        property: MemberProperty::Computed(Box::new(property)),
                        optional: false,
                        span: self.span_from(start),
                    });
                }
                TokenKind::LeftParen if allow_call => {
                    let arguments = self.parse_arguments()?;
                    expression = Expression::Call(CallExpression {
                        callee: Box::new(expression),
                        arguments,
                        optional: false,
                        span: self.span_from(start),
                    });
                }
                TokenKind::Template { .. } => {
                    let quasi = self.parse_template()?;
                    expression = Expression::TaggedTemplate(TaggedTemplate {
                        tag: Box::new(expression),
                        quasi,
                        span: self.span_from(start),
                    });
                }
                _ => return Ok(expression),
            }
        }
    }

    fn parse_member_name(&mut self) -> ParseResult<MemberProperty> {
        if let TokenKind::PrivateIdentifier(name) = &self.current.kind {
            let id = Identifier {
                name: name.clone(),
                span: self.current.span,
            };
            self.advance();
            return Ok(MemberProperty::Private(id));
        }
        Ok(MemberProperty::Identifier(self.parse_identifier_name()?))
    }

    fn parse_new(&mut self) -> ParseResult<Expression> {
        let start = self.current.span.start;
        let new_span = self.current.span;
        self.advance(); // consume 'new'

        if self.eat(&TokenKind::Dot) {
            let property = self.parse_identifier_name()?;
            if property.name != "target" {
                return Err(self.error_at(property.span.start, "Expected new.target"));
            }
            return Ok(Expression::MetaProperty(MetaProperty {
                meta: Identifier {
                    name: "new".to_string(),
                    span: new_span,
                },
                property,
                span: self.span_from(start),
            }));
        }

        let callee_start = self.current.span.start;
        let callee = if self.check(&TokenKind::New) {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        let callee = self.parse_suffixes(callee_start, callee, false)?;
        let arguments = if self.check(&TokenKind::LeftParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };

        Ok(Expression::New(NewExpression {
            callee: Box::new(callee),
            arguments,
            span: self.span_from(start),
        }))
    }

    /// Parses `( args )`, spreads and trailing commas included.
    fn parse_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        self.expect(&TokenKind::LeftParen)?;
        self.with_in(|p| {
            let mut arguments = Vec::new();
            while !p.check(&TokenKind::RightParen) {
                arguments.push(p.parse_spread_or_assignment()?);
                if !p.eat(&TokenKind::Comma) {
                    break;
                }
            }
            p.expect(&TokenKind::RightParen)?;
            Ok(arguments)
        })
    }

    fn parse_spread_or_assignment(&mut self) -> ParseResult<Expression> {
        if !self.check(&TokenKind::Ellipsis) {
            return self.parse_assignment();
        }
        let start = self.current.span.start;
        self.advance();
        let argument = self.parse_assignment()?;
        Ok(Expression::Spread(SpreadElement {
            argument: Box::new(argument),
            span: self.span_from(start),
        }))
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let span = self.current.span;

        if self.check(&TokenKind::Async) && self.async_function_follows() {
            let function = self.parse_function(true, false)?;
            return Ok(Expression::Function(Box::new(function)));
        }
        if let Some(name) = self.current_identifier() {
            self.advance();
            return Ok(Expression::Identifier(Identifier { name, span }));
        }

        let value = match &self.current.kind {
            TokenKind::Number(n) => Some(LiteralValue::Number(*n)),
            TokenKind::BigInt(raw) => Some(LiteralValue::BigInt(raw.clone())),
            TokenKind::String(s) => Some(LiteralValue::String(s.clone())),
            TokenKind::True => Some(LiteralValue::Boolean(true)),
            TokenKind::False => Some(LiteralValue::Boolean(false)),
            TokenKind::Null => Some(LiteralValue::Null),
            _ => None,
        };
        if let Some(value) = value {
            self.advance();
            return Ok(Expression::Literal(Literal { value, span }));
        }

        match self.current.kind {
            TokenKind::Slash | TokenKind::SlashEqual => {
                let token = self.scanner.rescan_regex(&self.current);
                self.current = token;
                let TokenKind::RegExp { pattern, flags } = &self.current.kind else {
                    return self.error("Invalid regular expression");
                };
                let value = LiteralValue::RegExp {
                    pattern: pattern.clone(),
                    flags: flags.clone(),
                };
                let span = self.current.span;
                self.advance();
                Ok(Expression::Literal(Literal { value, span }))
            }
            TokenKind::Template { .. } => Ok(Expression::Template(self.parse_template()?)),
            TokenKind::This => {
                self.advance();
                Ok(Expression::This(span))
            }
            TokenKind::Super => {
                self.advance();
                Ok(Expression::Super(span))
            }
            TokenKind::Function => {
                let function = self.parse_function(false, false)?;
                Ok(Expression::Function(Box::new(function)))
            }
            TokenKind::Class => Ok(Expression::Class(Box::new(self.parse_class(false)?))),
            TokenKind::LeftParen => {
                self.advance();
                let expression = self.with_in(|p| p.parse_expression())?;
                self.expect(&TokenKind::RightParen)?;
                Ok(Expression::Paren(ParenthesizedExpression {
                    expression: Box::new(expression),
                    span: self.span_from(span.start),
                }))
            }
            TokenKind::LeftBracket => self.parse_array_literal(),
            TokenKind::LeftBrace => self.parse_object_literal(),
            TokenKind::Import => self.parse_import_expression(),
            _ => self.unexpected(),
        }
    }

    /// Parses a template literal starting at the current template token.
    fn parse_template(&mut self) -> ParseResult<TemplateLiteral> {
        let start = self.current.span.start;
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();

        loop {
            let TokenKind::Template { cooked, tail } = &self.current.kind else {
                return self.error("Unterminated template literal");
            };
            let tail = *tail;
            quasis.push(TemplateElement {
                cooked: cooked.clone(),
                span: self.current.span,
            });
            self.advance();
            if tail {
                break;
            }

            expressions.push(self.with_in(|p| p.parse_expression())?);
            if !self.check(&TokenKind::RightBrace) {
                return self.error("Expected '}' after template substitution");
            }
            let token = self.scanner.rescan_template_continuation(&self.current);
            self.current = token;
        }

        Ok(TemplateLiteral {
            quasis,
            expressions,
            span: self.span_from(start),
        })
    }

    fn parse_array_literal(&mut self) -> ParseResult<Expression> {
        let start = self.current.span.start;
        self.advance(); // consume '['
        let elements = self.with_in(|p| {
            let mut elements = Vec::new();
            while !p.check(&TokenKind::RightBracket) {
                if p.eat(&TokenKind::Comma) {
                    elements.push(None);
                    continue;
                }
                elements.push(Some(p.parse_spread_or_assignment()?));
                if !p.eat(&TokenKind::Comma) {
                    break;
                }
            }
            p.expect(&TokenKind::RightBracket)?;
            Ok(elements)
        })?;
        Ok(Expression::Array(ArrayExpression {
            elements,
            span: self.span_from(start),
        }))
    }

    fn parse_object_literal(&mut self) -> ParseResult<Expression> {
        let start = self.current.span.start;
        self.advance(); // consume '{'
        let properties = self.with_in(|p| {
            let mut properties = Vec::new();
            while !p.check(&TokenKind::RightBrace) {
                properties.push(p.parse_object_member()?);
                if !p.eat(&TokenKind::Comma) {
                    break;
                }
            }
            p.expect(&TokenKind::RightBrace)?;
            Ok(properties)
        })?;
        Ok(Expression::Object(ObjectExpression {
            properties,
            span: self.span_from(start),
        }))
    }

    fn parse_object_member(&mut self) -> ParseResult<ObjectMember> {
        let start = self.current.span.start;

        if self.eat(&TokenKind::Ellipsis) {
            let argument = self.parse_assignment()?;
            return Ok(ObjectMember::Spread(SpreadElement {
                argument: Box::new(argument),
                span: self.span_from(start),
            }));
        }

        let modifiers = self.parse_method_modifiers();
        let key = self.parse_property_key()?;

        if modifiers.is_method() || self.check(&TokenKind::LeftParen) {
            let value = self.parse_method_function(start, modifiers.is_async, modifiers.is_generator)?;
            return Ok(ObjectMember::Property(Property {
                key,
                value: Expression::Function(Box::new(value)),
                kind: modifiers.property_kind(),
                shorthand: false,
                method: modifiers.accessor.is_none(),
                span: self.span_from(start),
            }));
        }

        if self.eat(&TokenKind::Colon) {
            let value = self.parse_assignment()?;
            return Ok(ObjectMember::Property(Property {
                key,
                value,
                kind: PropertyKind::Init,
                shorthand: false,
                method: false,
                span: self.span_from(start),
            }));
        }

        // Shorthand `{ a }`, or the cover form `{ a = 1 }` that is only
        // valid once converted to a pattern
        let PropertyKey::Identifier(id) = &key else {
            return self.unexpected();
        };
        let reference = Expression::Identifier(id.clone());
        let value = if self.eat(&TokenKind::Equal) {
            let right = self.parse_assignment()?;
            Expression::Assignment(AssignmentExpression {
                operator: AssignmentOperator::Assign,
                left: Box::new(Pattern::Identifier(id.clone())),
                right: Box::new(right),
                span: self.span_from(start),
            })
        } else {
            reference
        };
        Ok(ObjectMember::Property(Property {
            key,
            value,
            kind: PropertyKind::Init,
            shorthand: true,
            method: false,
            span: self.span_from(start),
        }))
    }

    /// Parses a property key of an object literal, object pattern or class.
    pub(super) fn parse_property_key(&mut self) -> ParseResult<PropertyKey> {
        let span = self.current.span;
        match &self.current.kind {
            TokenKind::String(s) => {
                let value = LiteralValue::String(s.clone());
                self.advance();
                Ok(PropertyKey::Literal(Literal { value, span }))
            }
            TokenKind::Number(n) => {
                let value = LiteralValue::Number(*n);
                self.advance();
                Ok(PropertyKey::Literal(Literal { value, span }))
            }
            TokenKind::BigInt(raw) => {
                let value = LiteralValue::BigInt(raw.clone());
                self.advance();
                Ok(PropertyKey::Literal(Literal { value, span }))
            }
            TokenKind::PrivateIdentifier(name) => {
                let id = Identifier {
                    name: name.clone(),
                    span,
                };
                self.advance();
                Ok(PropertyKey::Private(id))
            }
            TokenKind::LeftBracket => {
                self.advance();
                let expression = self.with_in(|p| p.parse_assignment())?;
                self.expect(&TokenKind::RightBracket)?;
                Ok(PropertyKey::Computed(Box::new(expression)))
            }
            _ => Ok(PropertyKey::Identifier(self.parse_identifier_name()?)),
        }
    }

    fn parse_import_expression(&mut self) -> ParseResult<Expression> {
        let start = self.current.span.start;
        let import_span = self.current.span;
        self.advance(); // consume 'import'

        if self.eat(&TokenKind::Dot) {
            let property = self.parse_identifier_name()?;
            if property.name != "meta" {
                return Err(self.error_at(property.span.start, "Expected import.meta"));
            }
            return Ok(Expression::MetaProperty(MetaProperty {
                meta: Identifier {
                    name: "import".to_string(),
                    span: import_span,
                },
                property,
                span: self.span_from(start),
            }));
        }

        self.expect(&TokenKind::LeftParen)?;
        let (source, options) = self.with_in(|p| {
            let source = p.parse_assignment()?;
            let mut options = None;
            if p.eat(&TokenKind::Comma) && !p.check(&TokenKind::RightParen) {
                options = Some(Box::new(p.parse_assignment()?));
                p.eat(&TokenKind::Comma);
            }
            p.expect(&TokenKind::RightParen)?;
            Ok((source, options))
        })?;

        Ok(Expression::Import(ImportExpression {
            source: Box::new(source),
            options,
            span: self.span_from(start),
        }))
    }

    /// Narrows the left side of a compound assignment.
    fn simple_assignment_target(&self, expression: Expression) -> ParseResult<Pattern> {
        let target = match expression.unparenthesized() {
            Expression::Identifier(id) => Some(Pattern::Identifier(id.clone())),
            Expression::Member(_) => None,
            _ => return Err(self.error_at(expression.span().start, "Invalid assignment target")),
        };
        Ok(target.unwrap_or_else(|| Pattern::Expression(Box::new(expression))))
    }

    /// Reinterprets an expression parsed with the cover grammar as an
    /// assignment pattern.
    pub(super) fn expression_to_pattern(&self, expression: Expression) -> ParseResult<Pattern> {
        let span = expression.span();
        match expression {
            Expression::Identifier(id) => Ok(Pattern::Identifier(id)),
            Expression::Member(_) => Ok(Pattern::Expression(Box::new(expression))),
            Expression::Paren(paren) => match *paren.expression {
                inner @ (Expression::Identifier(_) | Expression::Member(_) | Expression::Paren(_)) => {
                    self.expression_to_pattern(inner)
                }
                _ => Err(self.error_at(span.start, "Invalid assignment target")),
            },
            Expression::Array(array) => {
                let mut elements = Vec::with_capacity(array.elements.len());
                for element in array.elements {
                    let pattern = match element {
                        None => None,
                        Some(Expression::Spread(spread)) => Some(Pattern::Rest(RestElement {
                            argument: Box::new(self.expression_to_pattern(*spread.argument)?),
                            span: spread.span,
                        })),
                        Some(element) => Some(self.expression_to_pattern(element)?),
                    };
                    elements.push(pattern);
                }
                Ok(Pattern::Array(ArrayPattern {
                    elements,
                    span: array.span,
                }))
            }
            Expression::Object(object) => {
                let mut properties = Vec::new();
                let mut rest = None;
                for member in object.properties {
                    match member {
                        ObjectMember::Spread(spread) => {
                            rest = Some(Box::new(self.expression_to_pattern(*spread.argument)?));
                        }
                        ObjectMember::Property(property) => {
                            if property.method || property.kind != PropertyKind::Init {
                                return Err(self.error_at(property.span.start, "Invalid destructuring target"));
                            }
                            properties.push(PatternProperty {
                                key: property.key,
                                value: self.expression_to_pattern(property.value)?,
                                shorthand: property.shorthand,
                                span: property.span,
                            });
                        }
                    }
                }
                Ok(Pattern::Object(ObjectPattern {
                    properties,
                    rest,
                    span: object.span,
                }))
            }
            Expression::Assignment(assignment) if assignment.operator == AssignmentOperator::Assign => {
                Ok(Pattern::Assignment(AssignmentPattern {
                    left: assignment.left,
                    right: assignment.right,
                    span: assignment.span,
                }))
            }
            _ => Err(self.error_at(span.start, "Invalid assignment target")),
        }
    }
}

/// Prefixes of a method definition: `get`, `set`, `async`, `*`.
#[derive(Debug, Default, Clone, Copy)]
pub(super) struct MethodModifiers {
    pub(super) accessor: Option<PropertyKind>,
    pub(super) is_async: bool,
    pub(super) is_generator: bool,
}

impl MethodModifiers {
    pub(super) fn is_method(&self) -> bool {
        self.accessor.is_some() || self.is_async || self.is_generator
    }

    pub(super) fn property_kind(&self) -> PropertyKind {
        self.accessor.unwrap_or(PropertyKind::Init)
    }
}

impl Parser<'_> {
    /// Consumes method prefixes. A prefix word followed by something that
    /// ends a key (`(`, `:`, `,`, `=`, `}`, `;`) is the key itself.
    pub(super) fn parse_method_modifiers(&mut self) -> MethodModifiers {
        let mut modifiers = MethodModifiers::default();

        let accessor = match &self.current.kind {
            TokenKind::Identifier(name) if name == "get" => Some(PropertyKind::Get),
            TokenKind::Identifier(name) if name == "set" => Some(PropertyKind::Set),
            _ => None,
        };
        if accessor.is_some() && !self.next_ends_key() {
            self.advance();
            modifiers.accessor = accessor;
            return modifiers;
        }

        if self.check(&TokenKind::Async) && !self.next_ends_key() && !self.peek().newline_before {
            self.advance();
            modifiers.is_async = true;
        }
        if self.eat(&TokenKind::Star) {
            modifiers.is_generator = true;
        }
        modifiers
    }

    fn next_ends_key(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::LeftParen
                | TokenKind::Colon
                | TokenKind::Comma
                | TokenKind::Equal
                | TokenKind::RightBrace
                | TokenKind::Semicolon
        )
    }

    /// Parses the parameter list and body of a method.
    pub(super) fn parse_method_function(
        &mut self,
        start: usize,
        is_async: bool,
        is_generator: bool,
    ) -> ParseResult<Function> {
        let (params, body) = self.with_function_context(is_async, is_generator, |p| {
            let params = p.parse_formal_params()?;
            let body = p.parse_function_body()?;
            Ok((params, body))
        })?;
        Ok(Function {
            id: None,
            params,
            body,
            is_async,
            is_generator,
            span: self.span_from(start),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Span;

    fn parse_expr(src: &str) -> Expression {
        let mut program = Parser::new(src)
            .parse_program()
            .unwrap_or_else(|e| panic!("failed to parse {src:?}: {e}"));
        match program.body.remove(0) {
            Statement::Expression(stmt) => stmt.expression,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn test_precedence() {
        let Expression::Binary(add) = parse_expr("1 + 2 * 3") else {
            panic!("expected binary");
        };
        assert_eq!(add.operator, BinaryOperator::Add);
        assert!(matches!(*add.right, Expression::Binary(BinaryExpression { operator: BinaryOperator::Mul, .. })));
    }

    #[test]
    fn test_exponent_is_right_associative() {
        let Expression::Binary(exp) = parse_expr("a ** b ** c") else {
            panic!("expected binary");
        };
        assert!(matches!(*exp.left, Expression::Identifier(_)));
        assert!(matches!(*exp.right, Expression::Binary(_)));
    }

    #[test]
    fn test_logical_expression() {
        let Expression::Logical(or) = parse_expr("a && b || c") else {
            panic!("expected logical");
        };
        assert_eq!(or.operator, LogicalOperator::Or);
        assert!(matches!(*or.left, Expression::Logical(_)));
    }

    #[test]
    fn test_member_assignment() {
        let Expression::Assignment(assign) = parse_expr("module.exports.foo = 1") else {
            panic!("expected assignment");
        };
        let Pattern::Expression(target) = &*assign.left else {
            panic!("expected member target");
        };
        assert_eq!(target.span(), Span::new(0, 18));
    }

    #[test]
    fn test_destructuring_assignment() {
        let Expression::Paren(paren) = parse_expr("({ a, b: [c], d = 1 } = obj)") else {
            panic!("expected paren");
        };
        let Expression::Assignment(assign) = *paren.expression else {
            panic!("expected assignment");
        };
        let mut names = Vec::new();
        assign.left.bound_names(&mut names);
        let names: Vec<&str> = names.iter().map(|id| id.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_arrow_functions() {
        assert!(matches!(parse_expr("x => x * 2"), Expression::Arrow(_)));
        assert!(matches!(parse_expr("(a, { b }, ...c) => {}"), Expression::Arrow(_)));
        assert!(matches!(parse_expr("async (a = 1) => await a"), Expression::Arrow(_)));
        assert!(matches!(parse_expr("async x => x"), Expression::Arrow(_)));
        assert!(matches!(parse_expr("() => ({})"), Expression::Arrow(_)));
    }

    #[test]
    fn test_parenthesized_is_not_arrow() {
        assert!(matches!(parse_expr("(a, b)"), Expression::Paren(_)));
        assert!(matches!(parse_expr("async(a, b)"), Expression::Call(_)));
    }

    #[test]
    fn test_call_and_member_chain() {
        let Expression::Call(call) = parse_expr("require('a').b.c(1, ...rest)") else {
            panic!("expected call");
        };
        assert_eq!(call.arguments.len(), 2);
        assert!(matches!(*call.callee, Expression::Member(_)));
    }

    #[test]
    fn test_optional_chaining() {
        let Expression::Call(call) = parse_expr("a?.b?.[c]?.(d)") else {
            panic!("expected call");
        };
        assert!(call.optional);
    }

    #[test]
    fn test_new_expression() {
        let Expression::New(new) = parse_expr("new Foo.Bar(1)") else {
            panic!("expected new");
        };
        assert_eq!(new.arguments.len(), 1);
        assert!(matches!(*new.callee, Expression::Member(_)));
        assert!(matches!(parse_expr("new Foo().bar()"), Expression::Call(_)));
    }

    #[test]
    fn test_regex_literal() {
        let Expression::Call(call) = parse_expr("/[/]+/g.exec(s)") else {
            panic!("expected call");
        };
        let Expression::Member(member) = *call.callee else {
            panic!("expected member");
        };
        assert!(matches!(
            &*member.object,
            Expression::Literal(Literal { value: LiteralValue::RegExp { flags, .. }, .. }) if flags == "g"
        ));
    }

    #[test]
    fn test_division_is_not_regex() {
        assert!(matches!(parse_expr("a / b / c"), Expression::Binary(_)));
    }

    #[test]
    fn test_template_literal() {
        let Expression::Template(template) = parse_expr("`a${b}c${ { d: 1 }.d }e`") else {
            panic!("expected template");
        };
        assert_eq!(template.quasis.len(), 3);
        assert_eq!(template.expressions.len(), 2);
        assert_eq!(template.quasis[2].cooked, "e");
    }

    #[test]
    fn test_tagged_template() {
        assert!(matches!(parse_expr("tag`x${y}`"), Expression::TaggedTemplate(_)));
    }

    #[test]
    fn test_object_literal_members() {
        let Expression::Paren(paren) = parse_expr(
            "({ a, b: 1, [c]: 2, 'd': 3, get e() {}, set e(v) {}, async f() {}, *g() {}, ...h, get: 1, default: 2 })",
        ) else {
            panic!("expected paren");
        };
        let Expression::Object(object) = *paren.expression else {
            panic!("expected object");
        };
        assert_eq!(object.properties.len(), 11);
    }

    #[test]
    fn test_import_expression_and_meta() {
        assert!(matches!(parse_expr("import('./a')"), Expression::Import(_)));
        assert!(matches!(parse_expr("import.meta.url"), Expression::Member(_)));
    }

    #[test]
    fn test_typeof_unary() {
        let Expression::Binary(cmp) = parse_expr("typeof module === 'object'") else {
            panic!("expected binary");
        };
        assert!(matches!(
            *cmp.left,
            Expression::Unary(UnaryExpression { operator: UnaryOperator::Typeof, .. })
        ));
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert!(Parser::new("a + b = c").parse_program().is_err());
        assert!(Parser::new("f() += 1").parse_program().is_err());
    }
}
