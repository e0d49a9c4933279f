//! file: core/src/ast/kind.rs
//! description: AST node kind definitions and operator enums.
//!
//! Defines the closed `AstNodeKind` enum covering the PHP expressions,
//! statements and declarations the parser produces, along with the operator
//! enums shared by the parser and the lowering passes.
//!
use super::node::AstNode;

/// Represents binary operators in the AST. The same set backs compound
/// assignments (`$a += 1` is an `AssignOp` carrying `Add`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,          // +
    Sub,          // -
    Mul,          // *
    Div,          // /
    Mod,          // %
    Pow,          // **
    Concat,       // .
    ShiftLeft,    // <<
    ShiftRight,   // >>
    BitAnd,       // &
    BitOr,        // |
    BitXor,       // ^
    BooleanAnd,   // &&
    BooleanOr,    // ||
    LogicalAnd,   // and
    LogicalOr,    // or
    LogicalXor,   // xor
    Eq,           // ==
    Ne,           // !=
    Identical,    // ===
    NotIdentical, // !==
    Lt,           // <
    Le,           // <=
    Gt,           // >
    Ge,           // >=
    Spaceship,    // <=>
    Coalesce,     // ??
}

/// Represents unary operators in the AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Plus,    // +
    Minus,   // -
    Not,     // !
    BitNot,  // ~
    Silence, // @
    PreInc,  // ++$x
    PreDec,  // --$x
    PostInc, // $x++
    PostDec, // $x--
}

impl UnaryOperator {
    pub fn is_postfix(&self) -> bool {
        matches!(self, UnaryOperator::PostInc | UnaryOperator::PostDec)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastType {
    Int,
    Float,
    String,
    Bool,
    Array,
    Object,
    Unset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncludeKind {
    Include,
    IncludeOnce,
    Require,
    RequireOnce,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AstNodeKind {
    Script { body: Vec<AstNode> },

    // Names
    Identifier { name: String },
    Name { parts: Vec<String>, fully_qualified: bool },

    // Scalars
    Integer { value: i64 },
    Float { value: f64 },
    String { value: String },
    Interpolated { parts: Vec<AstNode> },
    StringPart { value: String },
    ShellExec { parts: Vec<AstNode> },
    MagicConst { name: String },

    // Variables and member access
    Variable { name: String },
    VariableVariable { expr: Box<AstNode> },
    ConstFetch { name: Box<AstNode> },
    ClassConstFetch { class: Box<AstNode>, name: Box<AstNode> },
    PropertyFetch { object: Box<AstNode>, property: Box<AstNode>, nullsafe: bool },
    StaticPropertyFetch { class: Box<AstNode>, property: Box<AstNode> },
    ArrayDimFetch { base: Box<AstNode>, index: Option<Box<AstNode>> },

    // Operators
    Assign { target: Box<AstNode>, value: Box<AstNode> },
    AssignRef { target: Box<AstNode>, value: Box<AstNode> },
    AssignOp { op: BinaryOperator, target: Box<AstNode>, value: Box<AstNode> },
    BinaryOp { left: Box<AstNode>, op: BinaryOperator, right: Box<AstNode> },
    UnaryOp { op: UnaryOperator, expr: Box<AstNode> },
    Cast { ty: CastType, expr: Box<AstNode> },
    Ternary { condition: Box<AstNode>, then_expr: Option<Box<AstNode>>, else_expr: Box<AstNode> },
    InstanceOf { expr: Box<AstNode>, class: Box<AstNode> },

    // Calls
    Call { callee: Box<AstNode>, args: Vec<AstNode> },
    MethodCall { object: Box<AstNode>, method: Box<AstNode>, args: Vec<AstNode>, nullsafe: bool },
    StaticCall { class: Box<AstNode>, method: Box<AstNode>, args: Vec<AstNode> },
    Argument { value: Box<AstNode>, unpack: bool, by_ref: bool, name: Option<String> },
    New { class: Box<AstNode>, args: Vec<AstNode> },

    // Compound literals. `None` slots are skipped positions in destructuring.
    Array { items: Vec<Option<AstNode>> },
    List { items: Vec<Option<AstNode>> },
    ArrayItem { key: Option<Box<AstNode>>, value: Box<AstNode>, by_ref: bool, unpack: bool },

    // Language constructs
    Isset { vars: Vec<AstNode> },
    Empty { expr: Box<AstNode> },
    Exit { expr: Option<Box<AstNode>> },
    Eval { expr: Box<AstNode> },
    Clone { expr: Box<AstNode> },
    Print { expr: Box<AstNode> },
    Include { kind: IncludeKind, expr: Box<AstNode> },
    Yield { value: Option<Box<AstNode>> },
    YieldFrom { expr: Box<AstNode> },

    Closure {
        params: Vec<AstNode>,
        uses: Vec<AstNode>,
        body: Vec<AstNode>,
        by_ref: bool,
        is_static: bool,
        arrow: bool,
    },
    ClosureUse { var: Box<AstNode>, by_ref: bool },
    Param {
        name: String,
        default: Option<Box<AstNode>>,
        by_ref: bool,
        variadic: bool,
        type_hint: Option<String>,
    },

    // Statements
    ExpressionStmt { expr: Box<AstNode> },
    Echo { exprs: Vec<AstNode> },
    Return { value: Option<Box<AstNode>> },
    Block { statements: Vec<AstNode> },
    If { condition: Box<AstNode>, then_branch: Vec<AstNode>, else_branch: Option<Vec<AstNode>> },
    While { condition: Box<AstNode>, body: Vec<AstNode> },
    DoWhile { body: Vec<AstNode>, condition: Box<AstNode> },
    For { init: Vec<AstNode>, conditions: Vec<AstNode>, step: Vec<AstNode>, body: Vec<AstNode> },
    Foreach {
        iterable: Box<AstNode>,
        key: Option<Box<AstNode>>,
        value: Box<AstNode>,
        by_ref: bool,
        body: Vec<AstNode>,
    },
    Switch { subject: Box<AstNode>, cases: Vec<AstNode> },
    Case { test: Option<Box<AstNode>>, body: Vec<AstNode> },
    Break { levels: Option<u32> },
    Continue { levels: Option<u32> },
    TryCatch { body: Vec<AstNode>, catches: Vec<AstNode>, finally: Option<Vec<AstNode>> },
    Catch { types: Vec<AstNode>, var: Option<Box<AstNode>>, body: Vec<AstNode> },
    Throw { expr: Box<AstNode> },
    Global { vars: Vec<AstNode> },
    Static { vars: Vec<AstNode> },
    StaticVar { var: Box<AstNode>, default: Option<Box<AstNode>> },
    Unset { vars: Vec<AstNode> },
    Const { items: Vec<AstNode> },
    ConstItem { name: String, value: Box<AstNode> },
    Declare { items: Vec<AstNode> },
    Namespace { name: Option<Box<AstNode>>, body: Option<Vec<AstNode>> },
    /// `prefix` is set for group imports, `use A\{B, C};`.
    Use { kind: Option<String>, prefix: Option<Box<AstNode>>, items: Vec<AstNode> },
    UseItem { kind: Option<String>, name: Box<AstNode>, alias: Option<String> },
    Goto { label: String },
    Label { name: String },
    InlineHtml { value: String },
    Nop,

    // Declarations
    FunctionDecl { name: String, params: Vec<AstNode>, body: Vec<AstNode>, by_ref: bool },
    ClassDecl {
        name: Option<String>,
        modifiers: Vec<String>,
        extends: Option<Box<AstNode>>,
        implements: Vec<AstNode>,
        members: Vec<AstNode>,
    },
    InterfaceDecl { name: String, extends: Vec<AstNode>, members: Vec<AstNode> },
    TraitDecl { name: String, members: Vec<AstNode> },
    MethodDecl {
        name: String,
        modifiers: Vec<String>,
        params: Vec<AstNode>,
        body: Option<Vec<AstNode>>,
        by_ref: bool,
    },
    PropertyDecl { modifiers: Vec<String>, props: Vec<AstNode> },
    PropertyItem { name: String, default: Option<Box<AstNode>> },
    ClassConst { modifiers: Vec<String>, items: Vec<AstNode> },
    TraitUse { traits: Vec<AstNode> },
}

impl AstNodeKind {
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            AstNodeKind::Identifier { .. }
                | AstNodeKind::Name { .. }
                | AstNodeKind::Integer { .. }
                | AstNodeKind::Float { .. }
                | AstNodeKind::String { .. }
                | AstNodeKind::Interpolated { .. }
                | AstNodeKind::ShellExec { .. }
                | AstNodeKind::MagicConst { .. }
                | AstNodeKind::Variable { .. }
                | AstNodeKind::VariableVariable { .. }
                | AstNodeKind::ConstFetch { .. }
                | AstNodeKind::ClassConstFetch { .. }
                | AstNodeKind::PropertyFetch { .. }
                | AstNodeKind::StaticPropertyFetch { .. }
                | AstNodeKind::ArrayDimFetch { .. }
                | AstNodeKind::Assign { .. }
                | AstNodeKind::AssignRef { .. }
                | AstNodeKind::AssignOp { .. }
                | AstNodeKind::BinaryOp { .. }
                | AstNodeKind::UnaryOp { .. }
                | AstNodeKind::Cast { .. }
                | AstNodeKind::Ternary { .. }
                | AstNodeKind::InstanceOf { .. }
                | AstNodeKind::Call { .. }
                | AstNodeKind::MethodCall { .. }
                | AstNodeKind::StaticCall { .. }
                | AstNodeKind::New { .. }
                | AstNodeKind::Array { .. }
                | AstNodeKind::List { .. }
                | AstNodeKind::Isset { .. }
                | AstNodeKind::Empty { .. }
                | AstNodeKind::Exit { .. }
                | AstNodeKind::Eval { .. }
                | AstNodeKind::Clone { .. }
                | AstNodeKind::Print { .. }
                | AstNodeKind::Include { .. }
                | AstNodeKind::Yield { .. }
                | AstNodeKind::YieldFrom { .. }
                | AstNodeKind::Closure { .. }
        )
    }

    /// Calls are the only expressions that allocate a temporary.
    pub fn is_call(&self) -> bool {
        matches!(
            self,
            AstNodeKind::Call { .. } | AstNodeKind::MethodCall { .. } | AstNodeKind::StaticCall { .. }
        )
    }
}

use std::fmt;

impl fmt::Display for AstNodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AstNodeKind::Script { .. } => "Script",
            AstNodeKind::Identifier { .. } => "Identifier",
            AstNodeKind::Name { .. } => "Name",
            AstNodeKind::Integer { .. } => "Integer",
            AstNodeKind::Float { .. } => "Float",
            AstNodeKind::String { .. } => "String",
            AstNodeKind::Interpolated { .. } => "Interpolated",
            AstNodeKind::StringPart { .. } => "StringPart",
            AstNodeKind::ShellExec { .. } => "ShellExec",
            AstNodeKind::MagicConst { .. } => "MagicConst",
            AstNodeKind::Variable { .. } => "Variable",
            AstNodeKind::VariableVariable { .. } => "VariableVariable",
            AstNodeKind::ConstFetch { .. } => "ConstFetch",
            AstNodeKind::ClassConstFetch { .. } => "ClassConstFetch",
            AstNodeKind::PropertyFetch { .. } => "PropertyFetch",
            AstNodeKind::StaticPropertyFetch { .. } => "StaticPropertyFetch",
            AstNodeKind::ArrayDimFetch { .. } => "ArrayDimFetch",
            AstNodeKind::Assign { .. } => "Assign",
            AstNodeKind::AssignRef { .. } => "AssignRef",
            AstNodeKind::AssignOp { .. } => "AssignOp",
            AstNodeKind::BinaryOp { .. } => "BinaryOp",
            AstNodeKind::UnaryOp { .. } => "UnaryOp",
            AstNodeKind::Cast { .. } => "Cast",
            AstNodeKind::Ternary { .. } => "Ternary",
            AstNodeKind::InstanceOf { .. } => "InstanceOf",
            AstNodeKind::Call { .. } => "Call",
            AstNodeKind::MethodCall { .. } => "MethodCall",
            AstNodeKind::StaticCall { .. } => "StaticCall",
            AstNodeKind::Argument { .. } => "Argument",
            AstNodeKind::New { .. } => "New",
            AstNodeKind::Array { .. } => "Array",
            AstNodeKind::List { .. } => "List",
            AstNodeKind::ArrayItem { .. } => "ArrayItem",
            AstNodeKind::Isset { .. } => "Isset",
            AstNodeKind::Empty { .. } => "Empty",
            AstNodeKind::Exit { .. } => "Exit",
            AstNodeKind::Eval { .. } => "Eval",
            AstNodeKind::Clone { .. } => "Clone",
            AstNodeKind::Print { .. } => "Print",
            AstNodeKind::Include { .. } => "Include",
            AstNodeKind::Yield { .. } => "Yield",
            AstNodeKind::YieldFrom { .. } => "YieldFrom",
            AstNodeKind::Closure { .. } => "Closure",
            AstNodeKind::ClosureUse { .. } => "ClosureUse",
            AstNodeKind::Param { .. } => "Param",
            AstNodeKind::ExpressionStmt { .. } => "ExpressionStmt",
            AstNodeKind::Echo { .. } => "Echo",
            AstNodeKind::Return { .. } => "Return",
            AstNodeKind::Block { .. } => "Block",
            AstNodeKind::If { .. } => "If",
            AstNodeKind::While { .. } => "While",
            AstNodeKind::DoWhile { .. } => "DoWhile",
            AstNodeKind::For { .. } => "For",
            AstNodeKind::Foreach { .. } => "Foreach",
            AstNodeKind::Switch { .. } => "Switch",
            AstNodeKind::Case { .. } => "Case",
            AstNodeKind::Break { .. } => "Break",
            AstNodeKind::Continue { .. } => "Continue",
            AstNodeKind::TryCatch { .. } => "TryCatch",
            AstNodeKind::Catch { .. } => "Catch",
            AstNodeKind::Throw { .. } => "Throw",
            AstNodeKind::Global { .. } => "Global",
            AstNodeKind::Static { .. } => "Static",
            AstNodeKind::StaticVar { .. } => "StaticVar",
            AstNodeKind::Unset { .. } => "Unset",
            AstNodeKind::Const { .. } => "Const",
            AstNodeKind::ConstItem { .. } => "ConstItem",
            AstNodeKind::Declare { .. } => "Declare",
            AstNodeKind::Namespace { .. } => "Namespace",
            AstNodeKind::Use { .. } => "Use",
            AstNodeKind::UseItem { .. } => "UseItem",
            AstNodeKind::Goto { .. } => "Goto",
            AstNodeKind::Label { .. } => "Label",
            AstNodeKind::InlineHtml { .. } => "InlineHtml",
            AstNodeKind::Nop => "Nop",
            AstNodeKind::FunctionDecl { .. } => "FunctionDecl",
            AstNodeKind::ClassDecl { .. } => "ClassDecl",
            AstNodeKind::InterfaceDecl { .. } => "InterfaceDecl",
            AstNodeKind::TraitDecl { .. } => "TraitDecl",
            AstNodeKind::MethodDecl { .. } => "MethodDecl",
            AstNodeKind::PropertyDecl { .. } => "PropertyDecl",
            AstNodeKind::PropertyItem { .. } => "PropertyItem",
            AstNodeKind::ClassConst { .. } => "ClassConst",
            AstNodeKind::TraitUse { .. } => "TraitUse",
        };
        write!(f, "{}", name)
    }
}
