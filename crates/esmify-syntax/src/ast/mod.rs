// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Abstract Syntax Tree (AST) definitions for JavaScript.
//!
//! These structures are designed to be ESTree-compatible where possible.
//! Every node carries the byte [`Span`] it was parsed from so that
//! source-to-source tools can edit the original text in place.

use crate::lexer::Span;

pub mod visit;

/// A complete JavaScript program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// The statements in the program
    pub body: Vec<Statement>,
    /// Span of the whole source
    pub span: Span,
}

/// An identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    /// The name of the identifier
    pub name: String,
    /// Source span
    pub span: Span,
}

/// A JavaScript statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Variable declaration (var, let, const)
    VariableDeclaration(VariableDeclaration),
    /// Function declaration
    FunctionDeclaration(Function),
    /// Class declaration
    ClassDeclaration(Class),
    /// Expression statement
    Expression(ExpressionStatement),
    /// Block statement { ... }
    Block(BlockStatement),
    /// If statement
    If(IfStatement),
    /// Switch statement
    Switch(SwitchStatement),
    /// While statement
    While(WhileStatement),
    /// Do-while statement
    DoWhile(DoWhileStatement),
    /// For statement
    For(ForStatement),
    /// For-in statement
    ForIn(ForInStatement),
    /// For-of statement
    ForOf(ForOfStatement),
    /// Return statement
    Return(ReturnStatement),
    /// Break statement with optional label
    Break(JumpStatement),
    /// Continue statement with optional label
    Continue(JumpStatement),
    /// Throw statement
    Throw(ThrowStatement),
    /// Try statement
    Try(TryStatement),
    /// With statement
    With(WithStatement),
    /// Labeled statement
    Labeled(LabeledStatement),
    /// Debugger statement
    Debugger(Span),
    /// Empty statement (;)
    Empty(Span),
    /// `import ... from '...'`
    Import(ImportDeclaration),
    /// `export { ... }`, `export <declaration>`
    ExportNamed(ExportNamedDeclaration),
    /// `export default ...`
    ExportDefault(ExportDefaultDeclaration),
    /// `export * from '...'`
    ExportAll(ExportAllDeclaration),
}

impl Statement {
    /// Returns the source span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Statement::VariableDeclaration(s) => s.span,
            Statement::FunctionDeclaration(s) => s.span,
            Statement::ClassDeclaration(s) => s.span,
            Statement::Expression(s) => s.span,
            Statement::Block(s) => s.span,
            Statement::If(s) => s.span,
            Statement::Switch(s) => s.span,
            Statement::While(s) => s.span,
            Statement::DoWhile(s) => s.span,
            Statement::For(s) => s.span,
            Statement::ForIn(s) => s.span,
            Statement::ForOf(s) => s.span,
            Statement::Return(s) => s.span,
            Statement::Break(s) | Statement::Continue(s) => s.span,
            Statement::Throw(s) => s.span,
            Statement::Try(s) => s.span,
            Statement::With(s) => s.span,
            Statement::Labeled(s) => s.span,
            Statement::Debugger(span) | Statement::Empty(span) => *span,
            Statement::Import(s) => s.span,
            Statement::ExportNamed(s) => s.span,
            Statement::ExportDefault(s) => s.span,
            Statement::ExportAll(s) => s.span,
        }
    }

    /// Returns true for `import` and `export` statements.
    pub fn is_module_declaration(&self) -> bool {
        matches!(
            self,
            Statement::Import(_)
                | Statement::ExportNamed(_)
                | Statement::ExportDefault(_)
                | Statement::ExportAll(_)
        )
    }
}

/// Variable declaration kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// var declaration
    Var,
    /// let declaration
    Let,
    /// const declaration
    Const,
}

/// A variable declaration statement.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    /// The kind of declaration
    pub kind: VariableKind,
    /// The declarators
    pub declarations: Vec<VariableDeclarator>,
    /// Source span
    pub span: Span,
}

/// A single variable declarator.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    /// The binding being declared
    pub id: Pattern,
    /// Optional initializer expression
    pub init: Option<Expression>,
    /// Source span
    pub span: Span,
}

/// A function declaration, expression or method body.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// The function name
    pub id: Option<Identifier>,
    /// The parameters
    pub params: Vec<Pattern>,
    /// The function body
    pub body: FunctionBody,
    /// Whether this is an async function
    pub is_async: bool,
    /// Whether this is a generator function
    pub is_generator: bool,
    /// Source span
    pub span: Span,
}

/// The braces-delimited body of a function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionBody {
    /// Statements of the body
    pub statements: Vec<Statement>,
    /// Span including the braces
    pub span: Span,
}

/// An arrow function expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowFunction {
    /// The parameters
    pub params: Vec<Pattern>,
    /// The body
    pub body: ArrowBody,
    /// Whether this is an async arrow
    pub is_async: bool,
    /// Source span
    pub span: Span,
}

/// Arrow function body.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    /// Concise body
    Expression(Box<Expression>),
    /// Block body
    Block(FunctionBody),
}

/// A class declaration or expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    /// The class name
    pub id: Option<Identifier>,
    /// `extends` clause
    pub super_class: Option<Box<Expression>>,
    /// Members of the class body
    pub body: Vec<ClassMember>,
    /// Source span
    pub span: Span,
}

/// A member of a class body.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    /// Method, getter, setter or constructor
    Method(MethodDefinition),
    /// Field definition
    Property(ClassProperty),
    /// `static { ... }`
    StaticBlock(FunctionBody),
}

/// Kind of a method definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// constructor
    Constructor,
    /// plain method
    Method,
    /// get accessor
    Get,
    /// set accessor
    Set,
}

/// A class method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDefinition {
    /// Method name
    pub key: PropertyKey,
    /// Method function
    pub value: Function,
    /// Method kind
    pub kind: MethodKind,
    /// Whether the method is static
    pub is_static: bool,
    /// Source span
    pub span: Span,
}

/// A class field.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProperty {
    /// Field name
    pub key: PropertyKey,
    /// Initializer
    pub value: Option<Expression>,
    /// Whether the field is static
    pub is_static: bool,
    /// Source span
    pub span: Span,
}

/// An expression statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    /// The expression
    pub expression: Expression,
    /// Source span including the semicolon
    pub span: Span,
}

/// A block statement.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    /// The statements in the block
    pub body: Vec<Statement>,
    /// Source span
    pub span: Span,
}

/// An if statement.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    /// The test condition
    pub test: Expression,
    /// The consequent
    pub consequent: Box<Statement>,
    /// The optional alternate
    pub alternate: Option<Box<Statement>>,
    /// Source span
    pub span: Span,
}

/// A while statement.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    /// The test condition
    pub test: Expression,
    /// The loop body
    pub body: Box<Statement>,
    /// Source span
    pub span: Span,
}

/// A do-while statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStatement {
    /// The loop body
    pub body: Box<Statement>,
    /// The test condition
    pub test: Expression,
    /// Source span
    pub span: Span,
}

/// A for statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    /// Initializer
    pub init: Option<ForInit>,
    /// Test condition
    pub test: Option<Expression>,
    /// Update expression
    pub update: Option<Expression>,
    /// Loop body
    pub body: Box<Statement>,
    /// Source span
    pub span: Span,
}

/// Initializer of a classic for loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    /// Variable declaration
    VariableDeclaration(VariableDeclaration),
    /// Expression
    Expression(Expression),
}

/// Left side of a for-in or for-of loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInLeft {
    /// Variable declaration
    VariableDeclaration(VariableDeclaration),
    /// Assignment target
    Pattern(Pattern),
}

/// A for-in statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ForInStatement {
    /// Left side
    pub left: ForInLeft,
    /// Object being iterated
    pub right: Expression,
    /// Loop body
    pub body: Box<Statement>,
    /// Source span
    pub span: Span,
}

/// A for-of statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ForOfStatement {
    /// Left side
    pub left: ForInLeft,
    /// Iterable
    pub right: Expression,
    /// Loop body
    pub body: Box<Statement>,
    /// `for await`
    pub is_await: bool,
    /// Source span
    pub span: Span,
}

/// A switch statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStatement {
    /// The discriminant
    pub discriminant: Expression,
    /// The cases
    pub cases: Vec<SwitchCase>,
    /// Source span
    pub span: Span,
}

/// A case clause (`test` is `None` for `default`).
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// Case test
    pub test: Option<Expression>,
    /// Case body
    pub consequent: Vec<Statement>,
    /// Source span
    pub span: Span,
}

/// A return statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    /// The returned value
    pub argument: Option<Expression>,
    /// Source span
    pub span: Span,
}

/// `break` or `continue`.
#[derive(Debug, Clone, PartialEq)]
pub struct JumpStatement {
    /// Optional label
    pub label: Option<Identifier>,
    /// Source span
    pub span: Span,
}

/// A throw statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStatement {
    /// The thrown value
    pub argument: Expression,
    /// Source span
    pub span: Span,
}

/// A try statement.
#[derive(Debug, Clone, PartialEq)]
pub struct TryStatement {
    /// The protected block
    pub block: BlockStatement,
    /// Catch clause
    pub handler: Option<CatchClause>,
    /// Finally block
    pub finalizer: Option<BlockStatement>,
    /// Source span
    pub span: Span,
}

/// A catch clause.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    /// Optional binding
    pub param: Option<Pattern>,
    /// Handler body
    pub body: BlockStatement,
    /// Source span
    pub span: Span,
}

/// A with statement.
#[derive(Debug, Clone, PartialEq)]
pub struct WithStatement {
    /// Scope object
    pub object: Expression,
    /// Body
    pub body: Box<Statement>,
    /// Source span
    pub span: Span,
}

/// A labeled statement.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStatement {
    /// The label
    pub label: Identifier,
    /// The labeled statement
    pub body: Box<Statement>,
    /// Source span
    pub span: Span,
}

/// An import declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDeclaration {
    /// Imported bindings (empty for side-effect imports)
    pub specifiers: Vec<ImportSpecifier>,
    /// Module specifier
    pub source: StringLiteral,
    /// Source span
    pub span: Span,
}

/// An import specifier.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportSpecifier {
    /// `import x from`
    Default(Identifier),
    /// `import * as x from`
    Namespace(Identifier),
    /// `import { a as b } from`
    Named {
        /// Name in the exporting module
        imported: ModuleExportName,
        /// Local binding
        local: Identifier,
    },
}

impl ImportSpecifier {
    /// Returns the local binding.
    pub fn local(&self) -> &Identifier {
        match self {
            ImportSpecifier::Default(local)
            | ImportSpecifier::Namespace(local)
            | ImportSpecifier::Named { local, .. } => local,
        }
    }
}

/// An identifier or string used as an import/export name.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleExportName {
    /// The name
    pub name: String,
    /// Source span
    pub span: Span,
}

/// A named export declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportNamedDeclaration {
    /// `export var|function|class ...`
    pub declaration: Option<Box<Statement>>,
    /// `export { a as b }`
    pub specifiers: Vec<ExportSpecifier>,
    /// `from '...'` for re-exports
    pub source: Option<StringLiteral>,
    /// Source span
    pub span: Span,
}

/// An export specifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    /// Local name (or name in the source module for re-exports)
    pub local: ModuleExportName,
    /// Exported name
    pub exported: ModuleExportName,
    /// Source span
    pub span: Span,
}

/// A default export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDefaultDeclaration {
    /// Exported declaration or expression
    pub declaration: ExportDefaultKind,
    /// Source span
    pub span: Span,
}

/// What an `export default` exports.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDefaultKind {
    /// `export default function ...`
    Function(Function),
    /// `export default class ...`
    Class(Class),
    /// `export default <expression>`
    Expression(Expression),
}

/// `export * from` or `export * as name from`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportAllDeclaration {
    /// Namespace name
    pub exported: Option<ModuleExportName>,
    /// Module specifier
    pub source: StringLiteral,
    /// Source span
    pub span: Span,
}

/// A string literal with its cooked value.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    /// Cooked value
    pub value: String,
    /// Source span including quotes
    pub span: Span,
}

/// A JavaScript expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Identifier reference
    Identifier(Identifier),
    /// Literal value
    Literal(Literal),
    /// Template literal
    Template(TemplateLiteral),
    /// Tagged template
    TaggedTemplate(TaggedTemplate),
    /// `this`
    This(Span),
    /// `super`
    Super(Span),
    /// Array literal
    Array(ArrayExpression),
    /// Object literal
    Object(ObjectExpression),
    /// Function expression
    Function(Box<Function>),
    /// Arrow function
    Arrow(Box<ArrowFunction>),
    /// Class expression
    Class(Box<Class>),
    /// Unary operation
    Unary(UnaryExpression),
    /// `++x`, `x--`
    Update(UpdateExpression),
    /// Binary operation
    Binary(BinaryExpression),
    /// `&&`, `||`, `??`
    Logical(LogicalExpression),
    /// Assignment
    Assignment(AssignmentExpression),
    /// `a ? b : c`
    Conditional(ConditionalExpression),
    /// Function call
    Call(CallExpression),
    /// `new X()`
    New(NewExpression),
    /// Member access
    Member(MemberExpression),
    /// Comma expression
    Sequence(SequenceExpression),
    /// `...x` in arrays, calls and argument lists
    Spread(SpreadElement),
    /// `yield x`
    Yield(YieldExpression),
    /// `await x`
    Await(AwaitExpression),
    /// `( x )`
    Paren(ParenthesizedExpression),
    /// `new.target`, `import.meta`
    MetaProperty(MetaProperty),
    /// `import(source)`
    Import(ImportExpression),
}

impl Expression {
    /// Returns the source span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expression::Identifier(e) => e.span,
            Expression::Literal(e) => e.span,
            Expression::Template(e) => e.span,
            Expression::TaggedTemplate(e) => e.span,
            Expression::This(span) | Expression::Super(span) => *span,
            Expression::Array(e) => e.span,
            Expression::Object(e) => e.span,
            Expression::Function(e) => e.span,
            Expression::Arrow(e) => e.span,
            Expression::Class(e) => e.span,
            Expression::Unary(e) => e.span,
            Expression::Update(e) => e.span,
            Expression::Binary(e) => e.span,
            Expression::Logical(e) => e.span,
            Expression::Assignment(e) => e.span,
            Expression::Conditional(e) => e.span,
            Expression::Call(e) => e.span,
            Expression::New(e) => e.span,
            Expression::Member(e) => e.span,
            Expression::Sequence(e) => e.span,
            Expression::Spread(e) => e.span,
            Expression::Yield(e) => e.span,
            Expression::Await(e) => e.span,
            Expression::Paren(e) => e.span,
            Expression::MetaProperty(e) => e.span,
            Expression::Import(e) => e.span,
        }
    }

    /// Strips any number of enclosing parentheses.
    pub fn unparenthesized(&self) -> &Expression {
        let mut expr = self;
        while let Expression::Paren(paren) = expr {
            expr = &paren.expression;
        }
        expr
    }

    /// Returns the identifier name if this is a plain identifier reference.
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expression::Identifier(id) => Some(&id.name),
            _ => None,
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// The value
    pub value: LiteralValue,
    /// Source span (the raw text is `span.slice(source)`)
    pub span: Span,
}

/// Literal values.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Number
    Number(f64),
    /// BigInt, as written
    BigInt(String),
    /// String (cooked)
    String(String),
    /// Boolean
    Boolean(bool),
    /// null
    Null,
    /// Regular expression
    RegExp {
        /// Pattern
        pattern: String,
        /// Flags
        flags: String,
    },
}

impl LiteralValue {
    /// Static truthiness of the literal, following JavaScript `ToBoolean`.
    pub fn is_truthy(&self) -> bool {
        match self {
            LiteralValue::Number(n) => *n != 0.0 && !n.is_nan(),
            LiteralValue::BigInt(raw) => raw.trim_start_matches("0x").trim_start_matches("0o").trim_start_matches("0b").chars().any(|c| c != '0'),
            LiteralValue::String(s) => !s.is_empty(),
            LiteralValue::Boolean(b) => *b,
            LiteralValue::Null => false,
            LiteralValue::RegExp { .. } => true,
        }
    }
}

/// A template literal.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLiteral {
    /// Static chunks; always one more than `expressions`
    pub quasis: Vec<TemplateElement>,
    /// Substitutions
    pub expressions: Vec<Expression>,
    /// Source span
    pub span: Span,
}

/// A static chunk of a template literal.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateElement {
    /// Cooked text
    pub cooked: String,
    /// Source span
    pub span: Span,
}

/// A tagged template.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedTemplate {
    /// Tag function
    pub tag: Box<Expression>,
    /// Template
    pub quasi: TemplateLiteral,
    /// Source span
    pub span: Span,
}

/// An array literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpression {
    /// Elements (`None` for holes)
    pub elements: Vec<Option<Expression>>,
    /// Source span
    pub span: Span,
}

/// An object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectExpression {
    /// Members
    pub properties: Vec<ObjectMember>,
    /// Source span
    pub span: Span,
}

/// A member of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectMember {
    /// `key: value`, shorthand, method or accessor
    Property(Property),
    /// `...x`
    Spread(SpreadElement),
}

/// Kind of an object property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Plain property
    Init,
    /// Getter
    Get,
    /// Setter
    Set,
}

/// An object literal property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property key
    pub key: PropertyKey,
    /// Property value (a function for methods and accessors)
    pub value: Expression,
    /// Property kind
    pub kind: PropertyKind,
    /// `{ a }`
    pub shorthand: bool,
    /// `{ a() {} }`
    pub method: bool,
    /// Source span
    pub span: Span,
}

/// A property key.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    /// Identifier name (keywords allowed)
    Identifier(Identifier),
    /// String or number literal
    Literal(Literal),
    /// `[expr]`
    Computed(Box<Expression>),
    /// `#name` (class members only)
    Private(Identifier),
}

impl PropertyKey {
    /// Returns the static name of the key, if it has one.
    pub fn static_name(&self) -> Option<String> {
        match self {
            PropertyKey::Identifier(id) => Some(id.name.clone()),
            PropertyKey::Literal(Literal {
                value: LiteralValue::String(s),
                ..
            }) => Some(s.clone()),
            PropertyKey::Literal(Literal {
                value: LiteralValue::Number(n),
                ..
            }) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// A unary expression.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    /// Operator
    pub operator: UnaryOperator,
    /// Operand
    pub argument: Box<Expression>,
    /// Source span
    pub span: Span,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// -
    Minus,
    /// +
    Plus,
    /// !
    Not,
    /// ~
    BitwiseNot,
    /// typeof
    Typeof,
    /// void
    Void,
    /// delete
    Delete,
}

/// An update expression.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    /// Operator
    pub operator: UpdateOperator,
    /// Whether the operator precedes the operand
    pub prefix: bool,
    /// Operand
    pub argument: Box<Expression>,
    /// Source span
    pub span: Span,
}

/// Update operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOperator {
    /// ++
    Increment,
    /// --
    Decrement,
}

/// A binary expression.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    /// Operator
    pub operator: BinaryOperator,
    /// Left operand
    pub left: Box<Expression>,
    /// Right operand
    pub right: Box<Expression>,
    /// Source span
    pub span: Span,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// +
    Add,
    /// -
    Sub,
    /// *
    Mul,
    /// /
    Div,
    /// %
    Mod,
    /// **
    Exp,
    /// ==
    Equal,
    /// !=
    NotEqual,
    /// ===
    StrictEqual,
    /// !==
    StrictNotEqual,
    /// <
    LessThan,
    /// <=
    LessThanEqual,
    /// >
    GreaterThan,
    /// >=
    GreaterThanEqual,
    /// <<
    LeftShift,
    /// >>
    RightShift,
    /// >>>
    UnsignedRightShift,
    /// &
    BitwiseAnd,
    /// |
    BitwiseOr,
    /// ^
    BitwiseXor,
    /// in
    In,
    /// instanceof
    Instanceof,
}

/// A logical expression.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpression {
    /// Operator
    pub operator: LogicalOperator,
    /// Left operand
    pub left: Box<Expression>,
    /// Right operand (evaluated conditionally)
    pub right: Box<Expression>,
    /// Source span
    pub span: Span,
}

/// Logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    /// &&
    And,
    /// ||
    Or,
    /// ??
    NullishCoalescing,
}

/// An assignment expression.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpression {
    /// Operator
    pub operator: AssignmentOperator,
    /// Target
    pub left: Box<Pattern>,
    /// Value
    pub right: Box<Expression>,
    /// Source span
    pub span: Span,
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    /// =
    Assign,
    /// +=, -=, ... (any compound form)
    Compound,
    /// &&=, ||=, ??=
    Logical,
}

/// A conditional expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpression {
    /// Test
    pub test: Box<Expression>,
    /// Value when truthy
    pub consequent: Box<Expression>,
    /// Value when falsy
    pub alternate: Box<Expression>,
    /// Source span
    pub span: Span,
}

/// A call expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    /// Callee
    pub callee: Box<Expression>,
    /// Arguments (may contain spreads)
    pub arguments: Vec<Expression>,
    /// `f?.()`
    pub optional: bool,
    /// Source span
    pub span: Span,
}

/// A new expression.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpression {
    /// Constructor
    pub callee: Box<Expression>,
    /// Arguments
    pub arguments: Vec<Expression>,
    /// Source span
    pub span: Span,
}

/// A member expression.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpression {
    /// Object
    pub object: Box<Expression>,
    /// Property
    pub property: MemberProperty,
    /// `a?.b`
    pub optional: bool,
    /// Source span
    pub span: Span,
}

/// Member property.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberProperty {
    /// `a.b`
    Identifier(Identifier),
    /// `a.#b`
    Private(Identifier),
    /// `a[b]`
    Computed(Box<Expression>),
}

impl MemberProperty {
    /// Returns the property name for non-computed access.
    pub fn static_name(&self) -> Option<&str> {
        match self {
            MemberProperty::Identifier(id) => Some(&id.name),
            _ => None,
        }
    }
}

/// A sequence expression.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceExpression {
    /// Expressions
    pub expressions: Vec<Expression>,
    /// Source span
    pub span: Span,
}

/// A spread element.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadElement {
    /// Spread argument
    pub argument: Box<Expression>,
    /// Source span
    pub span: Span,
}

/// A yield expression.
#[derive(Debug, Clone, PartialEq)]
pub struct YieldExpression {
    /// Yielded value
    pub argument: Option<Box<Expression>>,
    /// `yield*`
    pub delegate: bool,
    /// Source span
    pub span: Span,
}

/// An await expression.
#[derive(Debug, Clone, PartialEq)]
pub struct AwaitExpression {
    /// Awaited value
    pub argument: Box<Expression>,
    /// Source span
    pub span: Span,
}

/// A parenthesized expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ParenthesizedExpression {
    /// Inner expression
    pub expression: Box<Expression>,
    /// Source span including parentheses
    pub span: Span,
}

/// `new.target` or `import.meta`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaProperty {
    /// `new` or `import`
    pub meta: Identifier,
    /// `target` or `meta`
    pub property: Identifier,
    /// Source span
    pub span: Span,
}

/// A dynamic `import()`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportExpression {
    /// Module specifier expression
    pub source: Box<Expression>,
    /// Optional options argument
    pub options: Option<Box<Expression>>,
    /// Source span
    pub span: Span,
}

/// A binding or assignment target.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Plain name
    Identifier(Identifier),
    /// `{ a, b: c }`
    Object(ObjectPattern),
    /// `[a, b]`
    Array(ArrayPattern),
    /// `a = 1` inside a pattern
    Assignment(AssignmentPattern),
    /// `...rest`
    Rest(RestElement),
    /// Member expression target (assignment only)
    Expression(Box<Expression>),
}

impl Pattern {
    /// Returns the source span of this pattern.
    pub fn span(&self) -> Span {
        match self {
            Pattern::Identifier(p) => p.span,
            Pattern::Object(p) => p.span,
            Pattern::Array(p) => p.span,
            Pattern::Assignment(p) => p.span,
            Pattern::Rest(p) => p.span,
            Pattern::Expression(e) => e.span(),
        }
    }

    /// Collects every name bound by this pattern.
    pub fn bound_names<'a>(&'a self, names: &mut Vec<&'a Identifier>) {
        match self {
            Pattern::Identifier(id) => names.push(id),
            Pattern::Object(object) => {
                for property in &object.properties {
                    property.value.bound_names(names);
                }
                if let Some(rest) = &object.rest {
                    rest.bound_names(names);
                }
            }
            Pattern::Array(array) => {
                for element in array.elements.iter().flatten() {
                    element.bound_names(names);
                }
            }
            Pattern::Assignment(assignment) => assignment.left.bound_names(names),
            Pattern::Rest(rest) => rest.argument.bound_names(names),
            Pattern::Expression(_) => {}
        }
    }
}

/// An object destructuring pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPattern {
    /// Properties
    pub properties: Vec<PatternProperty>,
    /// `...rest`
    pub rest: Option<Box<Pattern>>,
    /// Source span
    pub span: Span,
}

/// A property of an object pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternProperty {
    /// Key
    pub key: PropertyKey,
    /// Target
    pub value: Pattern,
    /// `{ a }`
    pub shorthand: bool,
    /// Source span
    pub span: Span,
}

/// An array destructuring pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPattern {
    /// Elements (`None` for holes)
    pub elements: Vec<Option<Pattern>>,
    /// Source span
    pub span: Span,
}

/// A defaulted pattern element.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentPattern {
    /// Target
    pub left: Box<Pattern>,
    /// Default value
    pub right: Box<Expression>,
    /// Source span
    pub span: Span,
}

/// A rest element.
#[derive(Debug, Clone, PartialEq)]
pub struct RestElement {
    /// Target
    pub argument: Box<Pattern>,
    /// Source span
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str, start: usize) -> Identifier {
        Identifier {
            name: name.into(),
            span: Span::new(start, start + name.len()),
        }
    }

    #[test]
    fn test_unparenthesized() {
        let inner = Expression::Identifier(ident("a", 2));
        let wrapped = Expression::Paren(ParenthesizedExpression {
            expression: Box::new(Expression::Paren(ParenthesizedExpression {
                expression: Box::new(inner.clone()),
                span: Span::new(1, 4),
            })),
            span: Span::new(0, 5),
        });
        assert_eq!(wrapped.unparenthesized(), &inner);
        assert_eq!(wrapped.span(), Span::new(0, 5));
    }

    #[test]
    fn test_bound_names() {
        let pattern = Pattern::Object(ObjectPattern {
            properties: vec![PatternProperty {
                key: PropertyKey::Identifier(ident("a", 2)),
                value: Pattern::Assignment(AssignmentPattern {
                    left: Box::new(Pattern::Identifier(ident("b", 5))),
                    right: Box::new(Expression::Literal(Literal {
                        value: LiteralValue::Number(1.0),
                        span: Span::new(9, 10),
                    })),
                    span: Span::new(5, 10),
                }),
                shorthand: false,
                span: Span::new(2, 10),
            }],
            rest: Some(Box::new(Pattern::Identifier(ident("rest", 15)))),
            span: Span::new(0, 20),
        });
        let mut names = Vec::new();
        pattern.bound_names(&mut names);
        let names: Vec<&str> = names.iter().map(|id| id.name.as_str()).collect();
        assert_eq!(names, vec!["b", "rest"]);
    }

    #[test]
    fn test_literal_truthiness() {
        assert!(LiteralValue::Number(1.0).is_truthy());
        assert!(!LiteralValue::Number(0.0).is_truthy());
        assert!(!LiteralValue::String(String::new()).is_truthy());
        assert!(LiteralValue::String("0".into()).is_truthy());
        assert!(!LiteralValue::Null.is_truthy());
        assert!(!LiteralValue::BigInt("0".into()).is_truthy());
    }

    #[test]
    fn test_property_key_static_name() {
        let key = PropertyKey::Literal(Literal {
            value: LiteralValue::String("default".into()),
            span: Span::new(0, 9),
        });
        assert_eq!(key.static_name().as_deref(), Some("default"));
        let computed = PropertyKey::Computed(Box::new(Expression::Identifier(ident("x", 1))));
        assert_eq!(computed.static_name(), None);
    }
}
