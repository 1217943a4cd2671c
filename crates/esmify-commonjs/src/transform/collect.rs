// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The collection walk.
//!
//! One pass over the module records every construct the rewrite needs:
//! export assignments, require calls, free `module` / `exports` / `global`
//! references and the conditional context each require sits in. Nothing is
//! edited here. Replacements that depend on generated names are recorded
//! and applied by the caller once the names are final.

use crate::dynamic::DynamicRequireTable;
use crate::error::{InteropError, Result};
use crate::options::IdMatcher;
use esmify_syntax::ast::visit::{self, Visit};
use esmify_syntax::ast::*;
use esmify_syntax::lexer::Span;
use esmify_syntax::scope::{ScopeKind, ScopeStack};
use esmify_syntax::Location;
use regex::Regex;
use rustc_hash::FxHashSet;
use std::path::Path;
use std::sync::LazyLock;

static EXPORTS_KEYPATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:module\.)?exports(?:\.([A-Za-z_$][\w$]*))?$").expect("valid keypath pattern")
});

/// Which handle an export assignment goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExportRoot {
    /// `module.exports`
    Module,
    /// `exports`
    Exports,
}

/// Free CommonJS variables the module refers to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Uses {
    pub module: bool,
    pub exports: bool,
    pub require: bool,
    pub global: bool,
}

/// `exports.name = ...` or `module.exports.name = ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NamedAssignment {
    pub name: String,
    /// Start of the assignment expression
    pub start: usize,
    /// End of its left-hand side
    pub left_end: usize,
    pub root: ExportRoot,
    pub top_level: bool,
}

/// `module.exports = ...`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ModuleExportsAssignment {
    pub left: Span,
    pub top_level: bool,
}

/// A top-level `__esModule` marker. `target` is the exports handle inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EsModuleMarker {
    pub target: Span,
    pub root: ExportRoot,
}

/// A `require` call with a constant source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RequireSite {
    pub source: String,
    pub call: Span,
    pub uses_return_value: bool,
    /// What to delete when the value is not used: the whole statement, or
    /// only the call when the statement sits in a conditional branch
    pub to_be_removed: Span,
    pub inside_try: bool,
    pub inside_conditional: bool,
}

/// An identifier to replace once names are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Replacement {
    pub span: Span,
    /// The identifier is a shorthand property and needs its key spelled out
    pub shorthand: bool,
}

/// Everything the walk found.
#[derive(Debug, Default)]
pub(crate) struct Collected {
    pub uses: Uses,
    pub should_wrap: bool,
    pub module_exports_assignments: Vec<ModuleExportsAssignment>,
    pub named_assignments: Vec<NamedAssignment>,
    pub markers: Vec<EsModuleMarker>,
    pub requires: Vec<RequireSite>,
    pub replaced_globals: Vec<Replacement>,
    pub replaced_requires: Vec<Replacement>,
    /// Replacements that do not depend on generated names
    pub fixed_replacements: Vec<(Span, String)>,
    /// Template literal bodies, never re-indented
    pub template_spans: Vec<Span>,
}

impl Collected {
    pub fn first_top_level_module_exports(&self) -> Option<&ModuleExportsAssignment> {
        self.module_exports_assignments.iter().find(|assignment| assignment.top_level)
    }
}

/// Inputs of the walk.
pub(crate) struct CollectOptions<'a> {
    pub id: &'a str,
    pub code: &'a str,
    pub is_es_module: bool,
    pub ignore_global: bool,
    pub ignore_dynamic_requires: bool,
    pub ignore: &'a IdMatcher,
    pub dynamic: &'a DynamicRequireTable,
}

/// Walks `program` once.
pub(crate) fn collect(program: &Program, options: &CollectOptions<'_>) -> Result<Collected> {
    let mut collector = Collector {
        options,
        collected: Collected::default(),
        scopes: ScopeStack::new(),
        function_depth: 0,
        this_depth: 0,
        conditional_end: None,
        try_end: None,
        top_level_expression: None,
        statement_expression: None,
        imported_variables: FxHashSet::default(),
        shorthand_values: FxHashSet::default(),
        iife_callees: FxHashSet::default(),
        error: None,
    };
    collector.scopes.declare_program_scope(&program.body);
    collector.visit_program(program);
    match collector.error {
        Some(err) => Err(err),
        None => Ok(collector.collected),
    }
}

struct Collector<'o> {
    options: &'o CollectOptions<'o>,
    collected: Collected,
    scopes: ScopeStack,
    /// Functions and arrows around the current node
    function_depth: usize,
    /// Scopes with their own `this`
    this_depth: usize,
    /// Everything up to this offset runs conditionally
    conditional_end: Option<usize>,
    try_end: Option<usize>,
    /// Expression of the program-level statement being walked
    top_level_expression: Option<Span>,
    /// (expression, statement) of the innermost expression statement
    statement_expression: Option<(Span, Span)>,
    /// Variables initialized from a `require` call
    imported_variables: FxHashSet<String>,
    shorthand_values: FxHashSet<usize>,
    iife_callees: FxHashSet<usize>,
    error: Option<InteropError>,
}

impl Collector<'_> {
    fn enter(&mut self, start: usize) {
        if self.conditional_end.is_some_and(|end| start > end) {
            self.conditional_end = None;
        }
        if self.try_end.is_some_and(|end| start > end) {
            self.try_end = None;
        }
    }

    fn fail(&mut self, err: InteropError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn is_free(&self, name: &str) -> bool {
        !self.scopes.contains(name)
    }

    fn mark_used(&mut self, root: ExportRoot) {
        match root {
            ExportRoot::Module => self.collected.uses.module = true,
            ExportRoot::Exports => self.collected.uses.exports = true,
        }
    }

    fn check_dynamic_require(&mut self) {
        if let Err(err) = self.options.dynamic.check_within_root(self.options.id) {
            self.fail(err);
        }
    }

    /// A relative static prefix such as `'../lib/' + name` must not climb
    /// out of the dynamic require table.
    fn check_dynamic_prefix(&mut self, call: &CallExpression) {
        let Some(prefix) = call.arguments.first().and_then(static_prefix) else {
            return;
        };
        if !(prefix.starts_with("./") || prefix.starts_with("../")) {
            return;
        }
        let dynamic = self.options.dynamic;
        let dir = Path::new(self.options.id).parent().unwrap_or_else(|| Path::new("/"));
        let base = dynamic.virtual_path(dir);
        let prefix_dir = &prefix[..prefix.rfind('/').map_or(0, |index| index + 1)];
        let key = format!("{}/{prefix_dir}", base.trim_end_matches('/'));
        if let Err(err) = dynamic.lookup(&key) {
            self.fail(err);
        }
    }

    fn replace_require(&mut self, span: Span, shorthand: bool) {
        if self.options.dynamic.is_enabled() {
            self.check_dynamic_require();
        }
        self.collected.replaced_requires.push(Replacement { span, shorthand });
    }

    fn visit_conditional_statement(&mut self, statement: &Statement) {
        let span = statement.span();
        self.enter(span.start);
        self.conditional_end.get_or_insert(span.end);
        self.visit_statement(statement);
    }

    fn visit_conditional_expression(&mut self, expression: &Expression) {
        let span = expression.span();
        self.enter(span.start);
        self.conditional_end.get_or_insert(span.end);
        self.visit_expression(expression);
    }

    fn visit_assignment(&mut self, expression: &Expression, assignment: &AssignmentExpression) {
        let Pattern::Expression(target) = assignment.left.as_ref() else {
            visit::walk_expression(self, expression);
            return;
        };
        let Expression::Member(member) = target.unparenthesized() else {
            visit::walk_expression(self, expression);
            return;
        };
        let Some((root, path)) = keypath(target) else {
            visit::walk_expression(self, expression);
            return;
        };
        let captures = match EXPORTS_KEYPATH.captures(&path) {
            Some(captures) if self.is_free(root) => captures,
            _ => {
                visit::walk_expression(self, expression);
                return;
            }
        };

        let root = if root == "module" { ExportRoot::Module } else { ExportRoot::Exports };
        self.mark_used(root);
        let top_level = self.top_level_expression == Some(assignment.span);

        if path == "module.exports" {
            self.collected.module_exports_assignments.push(ModuleExportsAssignment {
                left: target.span(),
                top_level,
            });
        } else if let Some(name) = captures.get(1).map(|name| name.as_str().to_string()) {
            if name == "__esModule" {
                if top_level {
                    self.collected.markers.push(EsModuleMarker {
                        target: member.object.span(),
                        root,
                    });
                } else {
                    self.collected.should_wrap = true;
                }
            } else {
                self.collected.named_assignments.push(NamedAssignment {
                    name,
                    start: assignment.span.start,
                    left_end: target.span().end,
                    root,
                    top_level,
                });
            }
        }
        self.visit_expression(&assignment.right);
    }

    fn visit_call(&mut self, expression: &Expression, call: &CallExpression) {
        if let Some(root) = es_module_marker_root(call, &self.scopes) {
            self.mark_used(root);
            if self.top_level_expression == Some(call.span) {
                self.collected.markers.push(EsModuleMarker {
                    target: call.arguments[0].span(),
                    root,
                });
                for argument in &call.arguments[1..] {
                    self.visit_expression(argument);
                }
            } else {
                self.collected.should_wrap = true;
                visit::walk_expression(self, expression);
            }
            return;
        }

        let is_require = matches!(call.callee.as_ref(), Expression::Identifier(callee) if callee.name == "require")
            && !call.arguments.is_empty()
            && self.is_free("require");
        if !is_require {
            if self.conditional_end.is_none()
                && keypath(&call.callee).is_some_and(|(root, _)| self.imported_variables.contains(root))
            {
                // Anything after calling into a required module may depend on
                // what that call did.
                self.conditional_end = Some(usize::MAX);
            }
            if matches!(call.callee.unparenthesized(), Expression::Function(_) | Expression::Arrow(_)) {
                self.iife_callees.insert(call.callee.unparenthesized().span().start);
            }
            visit::walk_expression(self, expression);
            return;
        }

        self.collected.uses.require = true;
        let Some(source) = static_require_source(call) else {
            if self.options.dynamic.is_enabled() {
                self.replace_require(call.callee.span(), false);
                self.check_dynamic_prefix(call);
            } else if !self.options.ignore_dynamic_requires {
                self.fail(InteropError::DynamicRequireDisabled {
                    id: self.options.id.to_string(),
                    location: Location::from_offset(self.options.code, call.span.start),
                });
            }
            for argument in &call.arguments {
                self.visit_expression(argument);
            }
            return;
        };
        if self.options.ignore.matches(&source) {
            return;
        }

        let statement = match self.statement_expression {
            Some((expression, statement)) if expression == call.span => Some(statement),
            _ => None,
        };
        let innermost_try = matches!(
            (self.try_end, self.conditional_end),
            (Some(try_end), Some(conditional_end)) if try_end < conditional_end
        );
        let to_be_removed = match statement {
            Some(statement) if self.conditional_end.is_none() || innermost_try => statement,
            _ => call.span,
        };
        self.collected.requires.push(RequireSite {
            source,
            call: call.span,
            uses_return_value: statement.is_none(),
            to_be_removed,
            inside_try: self.try_end.is_some(),
            inside_conditional: self.conditional_end.is_some(),
        });
    }

    fn visit_member(&mut self, expression: &Expression, member: &MemberExpression) {
        if let Expression::Identifier(object) = member.object.unparenthesized() {
            if object.name == "require" && self.is_free("require") {
                match member.property.static_name() {
                    Some("cache" | "main" | "extensions") => {
                        self.collected.uses.require = true;
                        return;
                    }
                    Some("resolve") => {
                        self.collected.uses.require = true;
                        if self.options.dynamic.is_enabled() {
                            self.replace_require(object.span, false);
                        }
                        return;
                    }
                    _ => {}
                }
            }
            if object.name == "module"
                && member.property.static_name() == Some("require")
                && !self.options.dynamic.is_enabled()
                && self.is_free("module")
            {
                self.collected.uses.require = true;
                self.replace_require(member.span, false);
                return;
            }
        }
        visit::walk_expression(self, expression);
    }

    fn visit_typeof(&mut self, expression: &Expression, unary: &UnaryExpression) {
        if !self.options.is_es_module
            && let Some((root, path)) = keypath(&unary.argument)
            && self.is_free(root)
            && matches!(path.as_str(), "module" | "exports" | "module.exports")
        {
            self.collected.fixed_replacements.push((unary.span, "'object'".to_string()));
            return;
        }
        visit::walk_expression(self, expression);
    }

    fn visit_scoped_statement(&mut self, statement: &Statement, head: Option<&VariableDeclaration>) {
        self.scopes.push(ScopeKind::Block);
        if let Some(declaration) = head
            && declaration.kind != VariableKind::Var
        {
            for declarator in &declaration.declarations {
                self.scopes.declare_pattern(&declarator.id);
            }
        }
        visit::walk_statement(self, statement);
        self.scopes.pop();
    }
}

impl<'ast> Visit<'ast> for Collector<'_> {
    fn visit_program(&mut self, program: &'ast Program) {
        for statement in &program.body {
            self.top_level_expression = match statement {
                Statement::Expression(statement) => Some(statement.expression.unparenthesized().span()),
                _ => None,
            };
            self.visit_statement(statement);
        }
        self.top_level_expression = None;
    }

    fn visit_statement(&mut self, statement: &'ast Statement) {
        self.enter(statement.span().start);
        match statement {
            Statement::Expression(expression_statement) => {
                let saved = self
                    .statement_expression
                    .replace((expression_statement.expression.unparenthesized().span(), expression_statement.span));
                self.visit_expression(&expression_statement.expression);
                self.statement_expression = saved;
            }
            Statement::If(if_statement) => {
                self.visit_expression(&if_statement.test);
                let test = literal_truthiness(&if_statement.test);
                if test == Some(false) {
                    if let Some(alternate) = &if_statement.alternate {
                        self.visit_statement(alternate);
                    }
                } else if if_statement.alternate.is_some() && test == Some(true) {
                    self.visit_statement(&if_statement.consequent);
                } else {
                    self.visit_conditional_statement(&if_statement.consequent);
                    if let Some(alternate) = &if_statement.alternate {
                        self.visit_conditional_statement(alternate);
                    }
                }
            }
            Statement::Try(try_statement) => {
                self.try_end.get_or_insert(try_statement.block.span.end);
                self.conditional_end.get_or_insert(try_statement.span.end);
                visit::walk_statement(self, statement);
            }
            Statement::Return(_) => {
                if self.function_depth == 0 {
                    self.collected.should_wrap = true;
                }
                visit::walk_statement(self, statement);
            }
            Statement::Switch(switch) => {
                self.visit_expression(&switch.discriminant);
                self.scopes.push(ScopeKind::Block);
                for case in &switch.cases {
                    self.scopes.declare_block_scope(&case.consequent);
                }
                for case in &switch.cases {
                    if let Some(test) = &case.test {
                        self.visit_expression(test);
                    }
                    for statement in &case.consequent {
                        self.visit_statement(statement);
                    }
                }
                self.scopes.pop();
            }
            Statement::For(for_statement) => {
                let head = match &for_statement.init {
                    Some(ForInit::VariableDeclaration(declaration)) => Some(declaration),
                    _ => None,
                };
                self.visit_scoped_statement(statement, head);
            }
            Statement::ForIn(ForInStatement { left, .. }) | Statement::ForOf(ForOfStatement { left, .. }) => {
                let head = match left {
                    ForInLeft::VariableDeclaration(declaration) => Some(declaration),
                    ForInLeft::Pattern(_) => None,
                };
                self.visit_scoped_statement(statement, head);
            }
            _ => visit::walk_statement(self, statement),
        }
    }

    fn visit_block(&mut self, block: &'ast BlockStatement) {
        self.scopes.push(ScopeKind::Block);
        self.scopes.declare_block_scope(&block.body);
        visit::walk_block(self, block);
        self.scopes.pop();
    }

    fn visit_catch_clause(&mut self, clause: &'ast CatchClause) {
        self.scopes.push(ScopeKind::Block);
        if let Some(param) = &clause.param {
            self.scopes.declare_pattern(param);
        }
        visit::walk_catch_clause(self, clause);
        self.scopes.pop();
    }

    fn visit_variable_declaration(&mut self, declaration: &'ast VariableDeclaration) {
        for declarator in &declaration.declarations {
            self.visit_pattern(&declarator.id);
            let Some(init) = &declarator.init else {
                continue;
            };
            self.visit_expression(init);
            if let Pattern::Identifier(id) = &declarator.id
                && self
                    .collected
                    .requires
                    .last()
                    .is_some_and(|site| site.call == init.unparenthesized().span())
            {
                self.imported_variables.insert(id.name.clone());
            }
        }
    }

    fn visit_expression(&mut self, expression: &'ast Expression) {
        self.enter(expression.span().start);
        match expression {
            Expression::Assignment(assignment) => self.visit_assignment(expression, assignment),
            Expression::Call(call) => self.visit_call(expression, call),
            Expression::Member(member) => self.visit_member(expression, member),
            Expression::Unary(unary) if unary.operator == UnaryOperator::Typeof => {
                self.visit_typeof(expression, unary)
            }
            Expression::Conditional(conditional) => {
                self.visit_expression(&conditional.test);
                let test = literal_truthiness(&conditional.test);
                match test {
                    Some(false) => self.visit_expression(&conditional.alternate),
                    Some(true) => self.visit_expression(&conditional.consequent),
                    None => {
                        self.visit_conditional_expression(&conditional.consequent);
                        self.visit_conditional_expression(&conditional.alternate);
                    }
                }
            }
            Expression::Logical(logical) => {
                self.visit_expression(&logical.left);
                let left = literal_truthiness(&logical.left);
                match (logical.operator, left) {
                    (LogicalOperator::And, Some(false)) | (LogicalOperator::Or, Some(true)) => {}
                    (LogicalOperator::And, Some(true)) | (LogicalOperator::Or, Some(false)) => {
                        self.visit_expression(&logical.right)
                    }
                    _ => self.visit_conditional_expression(&logical.right),
                }
            }
            Expression::This(span) => {
                if self.this_depth == 0 && !self.options.is_es_module {
                    self.collected.uses.exports = true;
                    self.collected.should_wrap = true;
                    self.collected.fixed_replacements.push((*span, "exports".to_string()));
                }
            }
            Expression::Object(object) => {
                for member in &object.properties {
                    if let ObjectMember::Property(Property {
                        shorthand: true,
                        value: Expression::Identifier(value),
                        ..
                    }) = member
                    {
                        self.shorthand_values.insert(value.span.start);
                    }
                }
                visit::walk_expression(self, expression);
            }
            Expression::Template(template) => {
                self.collected.template_spans.push(template_body(template.span));
                visit::walk_expression(self, expression);
            }
            Expression::TaggedTemplate(tagged) => {
                self.collected.template_spans.push(template_body(tagged.quasi.span));
                visit::walk_expression(self, expression);
            }
            _ => visit::walk_expression(self, expression),
        }
    }

    fn visit_function(&mut self, function: &'ast Function) {
        self.enter(function.span.start);
        if !self.iife_callees.contains(&function.span.start) {
            self.conditional_end.get_or_insert(function.span.end);
        }
        self.function_depth += 1;
        self.this_depth += 1;
        self.scopes.push(ScopeKind::Function);
        if let Some(id) = &function.id {
            self.scopes.declare(&id.name);
        }
        self.scopes
            .declare_function_scope(&function.params, &function.body.statements);
        visit::walk_function(self, function);
        self.scopes.pop();
        self.this_depth -= 1;
        self.function_depth -= 1;
    }

    fn visit_arrow(&mut self, arrow: &'ast ArrowFunction) {
        self.enter(arrow.span.start);
        if !self.iife_callees.contains(&arrow.span.start) {
            self.conditional_end.get_or_insert(arrow.span.end);
        }
        self.function_depth += 1;
        self.scopes.push(ScopeKind::Function);
        let statements = match &arrow.body {
            ArrowBody::Block(body) => body.statements.as_slice(),
            ArrowBody::Expression(_) => &[],
        };
        self.scopes.declare_function_scope(&arrow.params, statements);
        visit::walk_arrow(self, arrow);
        self.scopes.pop();
        self.function_depth -= 1;
    }

    fn visit_class(&mut self, class: &'ast Class) {
        self.this_depth += 1;
        self.scopes.push(ScopeKind::Block);
        if let Some(id) = &class.id {
            self.scopes.declare(&id.name);
        }
        visit::walk_class(self, class);
        self.scopes.pop();
        self.this_depth -= 1;
    }

    fn visit_static_block(&mut self, body: &'ast FunctionBody) {
        self.scopes.push(ScopeKind::Function);
        self.scopes.declare_function_scope(&[], &body.statements);
        for statement in &body.statements {
            self.visit_statement(statement);
        }
        self.scopes.pop();
    }

    fn visit_identifier_reference(&mut self, id: &'ast Identifier) {
        if !self.is_free(&id.name) {
            return;
        }
        let shorthand = self.shorthand_values.contains(&id.span.start);
        match id.name.as_str() {
            "require" => {
                self.collected.uses.require = true;
                if !self.options.ignore_dynamic_requires {
                    self.replace_require(id.span, shorthand);
                }
            }
            "module" => {
                self.collected.should_wrap = true;
                self.collected.uses.module = true;
            }
            "exports" => {
                self.collected.should_wrap = true;
                self.collected.uses.exports = true;
            }
            "global" => {
                self.collected.uses.global = true;
                if !self.options.ignore_global {
                    self.collected.replaced_globals.push(Replacement { span: id.span, shorthand });
                }
            }
            "define" => {
                let replacement = if shorthand { "define: undefined" } else { "undefined" };
                self.collected.fixed_replacements.push((id.span, replacement.to_string()));
            }
            _ => {}
        }
    }
}

/// `a.b.c` as (`"a"`, `"a.b.c"`), for identifier roots and dotted
/// properties only.
fn keypath(expression: &Expression) -> Option<(&str, String)> {
    match expression.unparenthesized() {
        Expression::Identifier(id) => Some((id.name.as_str(), id.name.clone())),
        Expression::Member(member) => {
            let property = member.property.static_name()?;
            let (root, path) = keypath(&member.object)?;
            Some((root, format!("{path}.{property}")))
        }
        _ => None,
    }
}

/// Lines starting inside a template body must keep their indentation.
fn template_body(span: Span) -> Span {
    Span::new(span.start + 1, span.end)
}

fn literal_truthiness(expression: &Expression) -> Option<bool> {
    match expression.unparenthesized() {
        Expression::Literal(literal) => Some(literal.value.is_truthy()),
        _ => None,
    }
}

/// The source of `require("x")` or ``require(`x`)``.
fn static_require_source(call: &CallExpression) -> Option<String> {
    let [argument] = call.arguments.as_slice() else {
        return None;
    };
    match argument.unparenthesized() {
        Expression::Literal(Literal {
            value: LiteralValue::String(source),
            ..
        }) => Some(source.clone()),
        Expression::Template(template) if template.expressions.is_empty() => {
            template.quasis.first().map(|quasi| quasi.cooked.clone())
        }
        _ => None,
    }
}

/// Leading string of a concatenation or template.
fn static_prefix(argument: &Expression) -> Option<&str> {
    match argument.unparenthesized() {
        Expression::Literal(Literal {
            value: LiteralValue::String(value),
            ..
        }) => Some(value.as_str()),
        Expression::Binary(binary) if binary.operator == BinaryOperator::Add => static_prefix(&binary.left),
        Expression::Template(template) => template.quasis.first().map(|quasi| quasi.cooked.as_str()),
        _ => None,
    }
}

/// `Object.defineProperty(exports, '__esModule', ...)` and its
/// `module.exports` form.
fn es_module_marker_root(call: &CallExpression, scopes: &ScopeStack) -> Option<ExportRoot> {
    let (object, path) = keypath(&call.callee)?;
    if path != "Object.defineProperty" || scopes.contains(object) || call.arguments.len() < 2 {
        return None;
    }
    match call.arguments[1].unparenthesized() {
        Expression::Literal(Literal {
            value: LiteralValue::String(key),
            ..
        }) if key == "__esModule" => {}
        _ => return None,
    }
    let (root, path) = keypath(&call.arguments[0])?;
    if scopes.contains(root) {
        return None;
    }
    match path.as_str() {
        "exports" => Some(ExportRoot::Exports),
        "module.exports" => Some(ExportRoot::Module),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn collect_with(code: &str, is_es_module: bool, dynamic: &DynamicRequireTable) -> Result<Collected> {
        let program = esmify_syntax::parse_module(code).unwrap();
        let ignore = IdMatcher::List(vec!["ignored".into()]);
        collect(
            &program,
            &CollectOptions {
                id: "/project/src/main.js",
                code,
                is_es_module,
                ignore_global: false,
                ignore_dynamic_requires: false,
                ignore: &ignore,
                dynamic,
            },
        )
    }

    fn run(code: &str) -> Collected {
        collect_with(code, false, &DynamicRequireTable::empty(Path::new("/project"))).unwrap()
    }

    #[test]
    fn test_export_assignments() {
        let collected = run("exports.a = 1;\nmodule.exports.b = 2;\nif (x) { exports.c = 3; }\nmodule.exports = {};");
        let names: Vec<_> = collected
            .named_assignments
            .iter()
            .map(|assignment| (assignment.name.as_str(), assignment.root, assignment.top_level))
            .collect();
        assert_eq!(
            names,
            vec![
                ("a", ExportRoot::Exports, true),
                ("b", ExportRoot::Module, true),
                ("c", ExportRoot::Exports, false),
            ]
        );
        assert_eq!(collected.module_exports_assignments.len(), 1);
        assert!(collected.first_top_level_module_exports().is_some());
        assert!(collected.uses.module && collected.uses.exports);
        assert!(!collected.should_wrap);
    }

    #[test]
    fn test_shadowed_exports_are_not_collected() {
        let collected = run("function f(exports) { exports.a = 1; }\nvar module = {}; module.exports = 1;");
        assert!(collected.named_assignments.is_empty());
        assert!(collected.module_exports_assignments.is_empty());
        assert!(!collected.uses.exports);
    }

    #[test]
    fn test_bare_references_force_wrapping() {
        assert!(run("exports['a'] = 1;").should_wrap);
        assert!(run("var e = exports;").should_wrap);
        assert!(run("if (x) return;\nexports.a = 1;").should_wrap);
        assert!(run("if (x) exports.__esModule = true;").should_wrap);
        assert!(!run("function f() { return 1; }\nexports.a = 1;").should_wrap);
    }

    #[test]
    fn test_es_module_markers() {
        let collected = run("Object.defineProperty(exports, '__esModule', { value: true });\nexports.__esModule = true;");
        assert_eq!(collected.markers.len(), 2);
        assert_eq!(collected.markers[0].target, Span::new(22, 29));
        assert!(collected.named_assignments.is_empty());
        assert!(!collected.should_wrap);
    }

    #[test]
    fn test_require_sites() {
        let code = "var a = require('a');\nrequire('b');\nif (x) require('c');\ntry { require('d'); } catch (e) {}\nrequire('ignored');";
        let collected = run(code);
        let sites: Vec<_> = collected
            .requires
            .iter()
            .map(|site| (site.source.as_str(), site.uses_return_value, site.inside_conditional, site.inside_try))
            .collect();
        assert_eq!(
            sites,
            vec![
                ("a", true, false, false),
                ("b", false, false, false),
                ("c", false, true, false),
                ("d", false, true, true),
            ]
        );
        // Unconditional statements are removed whole, conditional ones only
        // lose the call.
        assert_eq!(&code[collected.requires[1].to_be_removed.start..collected.requires[1].to_be_removed.end], "require('b');");
        assert_eq!(collected.requires[2].to_be_removed, collected.requires[2].call);
        assert_eq!(&code[collected.requires[3].to_be_removed.start..collected.requires[3].to_be_removed.end], "require('d');");
    }

    #[test]
    fn test_dead_branches_are_skipped() {
        let collected = run("if (false) { require('a'); } else { require('b'); }\ntrue || require('c');\nnull && require('d');\nvar e = 1 ? require('e') : require('f');");
        let sources: Vec<_> = collected.requires.iter().map(|site| site.source.as_str()).collect();
        assert_eq!(sources, vec!["b", "e"]);
        assert!(collected.requires.iter().all(|site| !site.inside_conditional));
    }

    #[test]
    fn test_conditional_contexts() {
        let collected = run("x && require('a');\nx ?? require('b');\nfunction f() { require('c'); }\n(function () { require('d'); })();\nrequire('e');");
        let conditional: Vec<_> = collected
            .requires
            .iter()
            .map(|site| (site.source.as_str(), site.inside_conditional))
            .collect();
        assert_eq!(
            conditional,
            vec![("a", true), ("b", true), ("c", true), ("d", false), ("e", false)]
        );
    }

    #[test]
    fn test_calls_into_required_modules_deoptimize() {
        let collected = run("var setup = require('setup');\nsetup();\nrequire('later');");
        assert!(!collected.requires[0].inside_conditional);
        assert!(collected.requires[1].inside_conditional);
    }

    #[test]
    fn test_identifier_rewrites() {
        let code = "if (typeof module === 'object') {}\nif (typeof define === 'function' && define.amd) {}\nglobal.x = 1;\nvar o = { global };\nvar r = require;";
        let collected = run(code);
        let fixed: Vec<_> = collected
            .fixed_replacements
            .iter()
            .map(|(span, text)| (&code[span.start..span.end], text.as_str()))
            .collect();
        assert_eq!(
            fixed,
            vec![
                ("typeof module", "'object'"),
                ("define", "undefined"),
                ("define", "undefined"),
            ]
        );
        assert_eq!(collected.replaced_globals.len(), 2);
        assert!(collected.replaced_globals[1].shorthand);
        assert_eq!(collected.replaced_requires.len(), 1);
        assert!(!collected.should_wrap);
    }

    #[test]
    fn test_top_level_this() {
        let collected = run("this.a = 1;\nfunction f() { return this; }\nvar g = () => this;");
        assert_eq!(collected.fixed_replacements.len(), 2);
        assert!(collected.should_wrap);
        assert!(collected.uses.exports);
    }

    #[test]
    fn test_require_properties() {
        let collected = run("if (require.main === module) {}\nrequire.cache;\nrequire.resolve('x');");
        assert!(collected.replaced_requires.is_empty());
        assert!(collected.uses.require);
    }

    #[test]
    fn test_dynamic_require_without_table_fails() {
        let err = collect_with("require(name);", false, &DynamicRequireTable::empty(Path::new("/project"))).unwrap_err();
        assert_eq!(err.code(), "DYNAMIC_REQUIRE_DISABLED");
        assert!(err.to_string().contains("(1:0)"));
    }

    #[test]
    fn test_template_spans_are_recorded() {
        let collected = run("var s = `a\nb`;\nexports.s = s;");
        assert_eq!(collected.template_spans, vec![Span::new(9, 13)]);
    }
}
