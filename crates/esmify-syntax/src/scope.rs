// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Lexical scopes.
//!
//! A [`ScopeStack`] follows a traversal: push a scope when entering a
//! function or block, declare its hoisted names up front, pop on exit. Name
//! lookups then answer whether an identifier refers to a local binding.

use crate::ast::visit::{self, Visit};
use crate::ast::*;
use rustc_hash::FxHashSet;

/// The kind of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The outermost scope of a file
    Module,
    /// Function body (receives `var` declarations)
    Function,
    /// Block, loop head or catch clause
    Block,
}

#[derive(Debug)]
struct Scope {
    kind: ScopeKind,
    names: FxHashSet<String>,
}

/// A stack of lexical scopes.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    /// Creates a stack holding only the module scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                kind: ScopeKind::Module,
                names: FxHashSet::default(),
            }],
        }
    }

    /// Enters a new scope.
    pub fn push(&mut self, kind: ScopeKind) {
        self.scopes.push(Scope {
            kind,
            names: FxHashSet::default(),
        });
    }

    /// Leaves the current scope. The module scope is never popped.
    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Number of scopes, the module scope included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// True while no function or block scope is open.
    pub fn is_module_scope(&self) -> bool {
        self.scopes.len() == 1
    }

    /// True when no function scope is open (blocks may be).
    pub fn is_outside_functions(&self) -> bool {
        !self.scopes.iter().any(|scope| scope.kind == ScopeKind::Function)
    }

    /// Declares a name in the current scope.
    pub fn declare(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.names.insert(name.to_string());
        }
    }

    /// Declares a name in the nearest function (or module) scope.
    pub fn declare_var(&mut self, name: &str) {
        if let Some(scope) = self
            .scopes
            .iter_mut()
            .rev()
            .find(|scope| scope.kind != ScopeKind::Block)
        {
            scope.names.insert(name.to_string());
        }
    }

    /// Declares every name bound by a pattern in the current scope.
    pub fn declare_pattern(&mut self, pattern: &Pattern) {
        let mut names = Vec::new();
        pattern.bound_names(&mut names);
        for id in names {
            self.declare(&id.name);
        }
    }

    /// Returns true if `name` is bound in any open scope.
    pub fn contains(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.names.contains(name))
    }

    /// Returns true if `name` is bound in an open scope other than the
    /// module scope.
    pub fn contains_local(&self, name: &str) -> bool {
        self.scopes.iter().skip(1).any(|scope| scope.names.contains(name))
    }

    /// Declares what a function body hoists: its parameters, every `var`
    /// anywhere in the body and the body's own lexical declarations.
    pub fn declare_function_scope(&mut self, params: &[Pattern], statements: &[Statement]) {
        for param in params {
            self.declare_pattern(param);
        }
        self.declare_program_scope(statements);
    }

    /// Declares the hoisted names of a module or function body.
    pub fn declare_program_scope(&mut self, statements: &[Statement]) {
        for statement in statements {
            self.hoist_vars(statement);
        }
        self.declare_block_scope(statements);
    }

    /// Declares the lexical names of a block: `let`, `const`, classes and
    /// function declarations.
    pub fn declare_block_scope(&mut self, statements: &[Statement]) {
        for statement in statements {
            let statement = match statement {
                Statement::ExportNamed(ExportNamedDeclaration {
                    declaration: Some(declaration),
                    ..
                }) => declaration.as_ref(),
                other => other,
            };
            match statement {
                Statement::VariableDeclaration(declaration) if declaration.kind != VariableKind::Var => {
                    for declarator in &declaration.declarations {
                        self.declare_pattern(&declarator.id);
                    }
                }
                Statement::FunctionDeclaration(Function { id: Some(id), .. })
                | Statement::ClassDeclaration(Class { id: Some(id), .. }) => self.declare(&id.name),
                Statement::ExportDefault(ExportDefaultDeclaration {
                    declaration: ExportDefaultKind::Function(Function { id: Some(id), .. }),
                    ..
                })
                | Statement::ExportDefault(ExportDefaultDeclaration {
                    declaration: ExportDefaultKind::Class(Class { id: Some(id), .. }),
                    ..
                }) => self.declare(&id.name),
                Statement::Import(import) => {
                    for specifier in &import.specifiers {
                        self.declare(&specifier.local().name);
                    }
                }
                _ => {}
            }
        }
    }

    /// Declares the `var` bindings of a statement into the function scope,
    /// descending into nested blocks but not into functions.
    fn hoist_vars(&mut self, statement: &Statement) {
        match statement {
            Statement::VariableDeclaration(declaration) => self.hoist_declaration(declaration),
            Statement::ExportNamed(ExportNamedDeclaration {
                declaration: Some(declaration),
                ..
            }) => self.hoist_vars(declaration),
            Statement::Block(block) => {
                for statement in &block.body {
                    self.hoist_vars(statement);
                }
            }
            Statement::If(statement) => {
                self.hoist_vars(&statement.consequent);
                if let Some(alternate) = &statement.alternate {
                    self.hoist_vars(alternate);
                }
            }
            Statement::Switch(statement) => {
                for case in &statement.cases {
                    for statement in &case.consequent {
                        self.hoist_vars(statement);
                    }
                }
            }
            Statement::While(WhileStatement { body, .. })
            | Statement::DoWhile(DoWhileStatement { body, .. })
            | Statement::With(WithStatement { body, .. })
            | Statement::Labeled(LabeledStatement { body, .. }) => self.hoist_vars(body),
            Statement::For(statement) => {
                if let Some(ForInit::VariableDeclaration(declaration)) = &statement.init {
                    self.hoist_declaration(declaration);
                }
                self.hoist_vars(&statement.body);
            }
            Statement::ForIn(ForInStatement { left, body, .. })
            | Statement::ForOf(ForOfStatement { left, body, .. }) => {
                if let ForInLeft::VariableDeclaration(declaration) = left {
                    self.hoist_declaration(declaration);
                }
                self.hoist_vars(body);
            }
            Statement::Try(statement) => {
                for statement in &statement.block.body {
                    self.hoist_vars(statement);
                }
                if let Some(handler) = &statement.handler {
                    for statement in &handler.body.body {
                        self.hoist_vars(statement);
                    }
                }
                if let Some(finalizer) = &statement.finalizer {
                    for statement in &finalizer.body {
                        self.hoist_vars(statement);
                    }
                }
            }
            _ => {}
        }
    }

    fn hoist_declaration(&mut self, declaration: &VariableDeclaration) {
        if declaration.kind != VariableKind::Var {
            return;
        }
        for declarator in &declaration.declarations {
            let mut names = Vec::new();
            declarator.id.bound_names(&mut names);
            for id in names {
                self.declare_var(&id.name);
            }
        }
    }
}

/// Collects every identifier name that is declared or referenced anywhere
/// in a program.
pub fn collect_names(program: &Program) -> FxHashSet<String> {
    struct Collector(FxHashSet<String>);

    impl<'ast> Visit<'ast> for Collector {
        fn visit_identifier_reference(&mut self, id: &'ast Identifier) {
            self.0.insert(id.name.clone());
        }

        fn visit_binding_identifier(&mut self, id: &'ast Identifier) {
            self.0.insert(id.name.clone());
        }
    }

    let mut collector = Collector(FxHashSet::default());
    visit::walk_program(&mut collector, program);
    collector.0
}
