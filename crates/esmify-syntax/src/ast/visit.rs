// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Read-only AST traversal.
//!
//! Implement [`Visit`] and override the hooks you care about; call the
//! matching `walk_*` function from an override to keep descending.
//! Identifiers are reported either as references or as bindings, member
//! property names and non-computed keys are not reported at all.

#![allow(missing_docs)]

use super::*;

/// A read-only visitor over the AST.
pub trait Visit<'ast> {
    fn visit_program(&mut self, program: &'ast Program) {
        walk_program(self, program);
    }

    fn visit_statement(&mut self, statement: &'ast Statement) {
        walk_statement(self, statement);
    }

    fn visit_block(&mut self, block: &'ast BlockStatement) {
        walk_block(self, block);
    }

    fn visit_variable_declaration(&mut self, declaration: &'ast VariableDeclaration) {
        walk_variable_declaration(self, declaration);
    }

    fn visit_catch_clause(&mut self, clause: &'ast CatchClause) {
        walk_catch_clause(self, clause);
    }

    fn visit_expression(&mut self, expression: &'ast Expression) {
        walk_expression(self, expression);
    }

    fn visit_function(&mut self, function: &'ast Function) {
        walk_function(self, function);
    }

    fn visit_arrow(&mut self, arrow: &'ast ArrowFunction) {
        walk_arrow(self, arrow);
    }

    fn visit_class(&mut self, class: &'ast Class) {
        walk_class(self, class);
    }

    fn visit_static_block(&mut self, body: &'ast FunctionBody) {
        for statement in &body.statements {
            self.visit_statement(statement);
        }
    }

    fn visit_property_key(&mut self, key: &'ast PropertyKey) {
        if let PropertyKey::Computed(expression) = key {
            self.visit_expression(expression);
        }
    }

    /// A declaration pattern (variables, parameters, catch bindings).
    fn visit_pattern(&mut self, pattern: &'ast Pattern) {
        walk_pattern(self, pattern);
    }

    /// The target of an assignment or of a for-in/of head without a
    /// declaration.
    fn visit_assignment_target(&mut self, pattern: &'ast Pattern) {
        walk_assignment_target(self, pattern);
    }

    fn visit_identifier_reference(&mut self, _id: &'ast Identifier) {}

    fn visit_binding_identifier(&mut self, _id: &'ast Identifier) {}
}

pub fn walk_program<'ast, V: Visit<'ast> + ?Sized>(visitor: &mut V, program: &'ast Program) {
    for statement in &program.body {
        visitor.visit_statement(statement);
    }
}

pub fn walk_block<'ast, V: Visit<'ast> + ?Sized>(visitor: &mut V, block: &'ast BlockStatement) {
    for statement in &block.body {
        visitor.visit_statement(statement);
    }
}

pub fn walk_variable_declaration<'ast, V: Visit<'ast> + ?Sized>(
    visitor: &mut V,
    declaration: &'ast VariableDeclaration,
) {
    for declarator in &declaration.declarations {
        visitor.visit_pattern(&declarator.id);
        if let Some(init) = &declarator.init {
            visitor.visit_expression(init);
        }
    }
}

pub fn walk_catch_clause<'ast, V: Visit<'ast> + ?Sized>(visitor: &mut V, clause: &'ast CatchClause) {
    if let Some(param) = &clause.param {
        visitor.visit_pattern(param);
    }
    visitor.visit_block(&clause.body);
}

pub fn walk_statement<'ast, V: Visit<'ast> + ?Sized>(visitor: &mut V, statement: &'ast Statement) {
    match statement {
        Statement::VariableDeclaration(declaration) => visitor.visit_variable_declaration(declaration),
        Statement::FunctionDeclaration(function) => visitor.visit_function(function),
        Statement::ClassDeclaration(class) => visitor.visit_class(class),
        Statement::Expression(statement) => visitor.visit_expression(&statement.expression),
        Statement::Block(block) => visitor.visit_block(block),
        Statement::If(statement) => {
            visitor.visit_expression(&statement.test);
            visitor.visit_statement(&statement.consequent);
            if let Some(alternate) = &statement.alternate {
                visitor.visit_statement(alternate);
            }
        }
        Statement::Switch(statement) => {
            visitor.visit_expression(&statement.discriminant);
            for case in &statement.cases {
                if let Some(test) = &case.test {
                    visitor.visit_expression(test);
                }
                for statement in &case.consequent {
                    visitor.visit_statement(statement);
                }
            }
        }
        Statement::While(statement) => {
            visitor.visit_expression(&statement.test);
            visitor.visit_statement(&statement.body);
        }
        Statement::DoWhile(statement) => {
            visitor.visit_statement(&statement.body);
            visitor.visit_expression(&statement.test);
        }
        Statement::For(statement) => {
            match &statement.init {
                Some(ForInit::VariableDeclaration(declaration)) => {
                    visitor.visit_variable_declaration(declaration)
                }
                Some(ForInit::Expression(expression)) => visitor.visit_expression(expression),
                None => {}
            }
            if let Some(test) = &statement.test {
                visitor.visit_expression(test);
            }
            if let Some(update) = &statement.update {
                visitor.visit_expression(update);
            }
            visitor.visit_statement(&statement.body);
        }
        Statement::ForIn(ForInStatement { left, right, body, .. })
        | Statement::ForOf(ForOfStatement { left, right, body, .. }) => {
            match left {
                ForInLeft::VariableDeclaration(declaration) => visitor.visit_variable_declaration(declaration),
                ForInLeft::Pattern(pattern) => visitor.visit_assignment_target(pattern),
            }
            visitor.visit_expression(right);
            visitor.visit_statement(body);
        }
        Statement::Return(statement) => {
            if let Some(argument) = &statement.argument {
                visitor.visit_expression(argument);
            }
        }
        Statement::Throw(statement) => visitor.visit_expression(&statement.argument),
        Statement::Try(statement) => {
            visitor.visit_block(&statement.block);
            if let Some(handler) = &statement.handler {
                visitor.visit_catch_clause(handler);
            }
            if let Some(finalizer) = &statement.finalizer {
                visitor.visit_block(finalizer);
            }
        }
        Statement::With(statement) => {
            visitor.visit_expression(&statement.object);
            visitor.visit_statement(&statement.body);
        }
        Statement::Labeled(statement) => visitor.visit_statement(&statement.body),
        Statement::Import(import) => {
            for specifier in &import.specifiers {
                visitor.visit_binding_identifier(specifier.local());
            }
        }
        Statement::ExportNamed(export) => {
            if let Some(declaration) = &export.declaration {
                visitor.visit_statement(declaration);
            }
        }
        Statement::ExportDefault(export) => match &export.declaration {
            ExportDefaultKind::Function(function) => visitor.visit_function(function),
            ExportDefaultKind::Class(class) => visitor.visit_class(class),
            ExportDefaultKind::Expression(expression) => visitor.visit_expression(expression),
        },
        Statement::Break(_)
        | Statement::Continue(_)
        | Statement::Debugger(_)
        | Statement::Empty(_)
        | Statement::ExportAll(_) => {}
    }
}

pub fn walk_function<'ast, V: Visit<'ast> + ?Sized>(visitor: &mut V, function: &'ast Function) {
    if let Some(id) = &function.id {
        visitor.visit_binding_identifier(id);
    }
    for param in &function.params {
        visitor.visit_pattern(param);
    }
    for statement in &function.body.statements {
        visitor.visit_statement(statement);
    }
}

pub fn walk_arrow<'ast, V: Visit<'ast> + ?Sized>(visitor: &mut V, arrow: &'ast ArrowFunction) {
    for param in &arrow.params {
        visitor.visit_pattern(param);
    }
    match &arrow.body {
        ArrowBody::Expression(expression) => visitor.visit_expression(expression),
        ArrowBody::Block(body) => {
            for statement in &body.statements {
                visitor.visit_statement(statement);
            }
        }
    }
}

pub fn walk_class<'ast, V: Visit<'ast> + ?Sized>(visitor: &mut V, class: &'ast Class) {
    if let Some(id) = &class.id {
        visitor.visit_binding_identifier(id);
    }
    if let Some(super_class) = &class.super_class {
        visitor.visit_expression(super_class);
    }
    for member in &class.body {
        match member {
            ClassMember::Method(method) => {
                visitor.visit_property_key(&method.key);
                visitor.visit_function(&method.value);
            }
            ClassMember::Property(property) => {
                visitor.visit_property_key(&property.key);
                if let Some(value) = &property.value {
                    visitor.visit_expression(value);
                }
            }
            ClassMember::StaticBlock(body) => visitor.visit_static_block(body),
        }
    }
}

pub fn walk_expression<'ast, V: Visit<'ast> + ?Sized>(visitor: &mut V, expression: &'ast Expression) {
    match expression {
        Expression::Identifier(id) => visitor.visit_identifier_reference(id),
        Expression::Literal(_)
        | Expression::This(_)
        | Expression::Super(_)
        | Expression::MetaProperty(_) => {}
        Expression::Template(template) => {
            for expression in &template.expressions {
                visitor.visit_expression(expression);
            }
        }
        Expression::TaggedTemplate(tagged) => {
            visitor.visit_expression(&tagged.tag);
            for expression in &tagged.quasi.expressions {
                visitor.visit_expression(expression);
            }
        }
        Expression::Array(array) => {
            for element in array.elements.iter().flatten() {
                visitor.visit_expression(element);
            }
        }
        Expression::Object(object) => {
            for member in &object.properties {
                match member {
                    ObjectMember::Property(property) => {
                        visitor.visit_property_key(&property.key);
                        visitor.visit_expression(&property.value);
                    }
                    ObjectMember::Spread(spread) => visitor.visit_expression(&spread.argument),
                }
            }
        }
        Expression::Function(function) => visitor.visit_function(function),
        Expression::Arrow(arrow) => visitor.visit_arrow(arrow),
        Expression::Class(class) => visitor.visit_class(class),
        Expression::Unary(unary) => visitor.visit_expression(&unary.argument),
        Expression::Update(update) => visitor.visit_expression(&update.argument),
        Expression::Binary(binary) => {
            visitor.visit_expression(&binary.left);
            visitor.visit_expression(&binary.right);
        }
        Expression::Logical(logical) => {
            visitor.visit_expression(&logical.left);
            visitor.visit_expression(&logical.right);
        }
        Expression::Assignment(assignment) => {
            visitor.visit_assignment_target(&assignment.left);
            visitor.visit_expression(&assignment.right);
        }
        Expression::Conditional(conditional) => {
            visitor.visit_expression(&conditional.test);
            visitor.visit_expression(&conditional.consequent);
            visitor.visit_expression(&conditional.alternate);
        }
        Expression::Call(call) => {
            visitor.visit_expression(&call.callee);
            for argument in &call.arguments {
                visitor.visit_expression(argument);
            }
        }
        Expression::New(new) => {
            visitor.visit_expression(&new.callee);
            for argument in &new.arguments {
                visitor.visit_expression(argument);
            }
        }
        Expression::Member(member) => {
            visitor.visit_expression(&member.object);
            if let MemberProperty::Computed(property) = &member.property {
                visitor.visit_expression(property);
            }
        }
        Expression::Sequence(sequence) => {
            for expression in &sequence.expressions {
                visitor.visit_expression(expression);
            }
        }
        Expression::Spread(spread) => visitor.visit_expression(&spread.argument),
        Expression::Yield(yield_expression) => {
            if let Some(argument) = &yield_expression.argument {
                visitor.visit_expression(argument);
            }
        }
        Expression::Await(await_expression) => visitor.visit_expression(&await_expression.argument),
        Expression::Paren(paren) => visitor.visit_expression(&paren.expression),
        Expression::Import(import) => {
            visitor.visit_expression(&import.source);
            if let Some(options) = &import.options {
                visitor.visit_expression(options);
            }
        }
    }
}

pub fn walk_pattern<'ast, V: Visit<'ast> + ?Sized>(visitor: &mut V, pattern: &'ast Pattern) {
    match pattern {
        Pattern::Identifier(id) => visitor.visit_binding_identifier(id),
        Pattern::Object(object) => {
            for property in &object.properties {
                visitor.visit_property_key(&property.key);
                visitor.visit_pattern(&property.value);
            }
            if let Some(rest) = &object.rest {
                visitor.visit_pattern(rest);
            }
        }
        Pattern::Array(array) => {
            for element in array.elements.iter().flatten() {
                visitor.visit_pattern(element);
            }
        }
        Pattern::Assignment(assignment) => {
            visitor.visit_pattern(&assignment.left);
            visitor.visit_expression(&assignment.right);
        }
        Pattern::Rest(rest) => visitor.visit_pattern(&rest.argument),
        Pattern::Expression(expression) => visitor.visit_expression(expression),
    }
}

pub fn walk_assignment_target<'ast, V: Visit<'ast> + ?Sized>(visitor: &mut V, pattern: &'ast Pattern) {
    match pattern {
        Pattern::Identifier(id) => visitor.visit_identifier_reference(id),
        Pattern::Object(object) => {
            for property in &object.properties {
                visitor.visit_property_key(&property.key);
                visitor.visit_assignment_target(&property.value);
            }
            if let Some(rest) = &object.rest {
                visitor.visit_assignment_target(rest);
            }
        }
        Pattern::Array(array) => {
            for element in array.elements.iter().flatten() {
                visitor.visit_assignment_target(element);
            }
        }
        Pattern::Assignment(assignment) => {
            visitor.visit_assignment_target(&assignment.left);
            visitor.visit_expression(&assignment.right);
        }
        Pattern::Rest(rest) => visitor.visit_assignment_target(&rest.argument),
        Pattern::Expression(expression) => visitor.visit_expression(expression),
    }
}
