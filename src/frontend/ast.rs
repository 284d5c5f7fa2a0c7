//! Abstract Syntax Tree for the Rust subset.
//!
//! Every node exclusively owns its children; the tree has no back
//! references. Nodes record the 1-based source line where they start so
//! semantic diagnostics can point back into the source.

use crate::types::Ty;
use std::fmt;

/// A complete program (compilation unit)
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub items: Vec<Item>,
}

/// Top-level items
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Function(Function),
    Struct(StructDef),
    Enum(EnumDef),
    Trait(TraitDef),
    Impl(ImplBlock),
    Const(ConstDef),
    Static(StaticDef),
}

/// Function definition
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub params: Vec<Param>,
    pub ret_type: Option<Ty>,
    pub body: Vec<Stmt>,
    pub line: u32,
}

/// Function parameter: `name: type` or the receiver shorthand `&self`
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Named { name: String, ty: Ty },
    SelfRef,
}

/// Struct definition
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<Field>,
    pub line: u32,
}

/// Struct field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Ty,
}

/// Enum definition (unit variants only)
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDef {
    pub name: String,
    pub variants: Vec<String>,
    pub line: u32,
}

/// Trait definition: a list of method signatures
#[derive(Debug, Clone, PartialEq)]
pub struct TraitDef {
    pub name: String,
    pub methods: Vec<FunctionSig>,
    pub line: u32,
}

/// Method signature inside a trait
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSig {
    pub name: String,
    pub params: Vec<Param>,
    pub ret_type: Option<Ty>,
    pub line: u32,
}

/// `impl Type { ... }` or `impl Trait for Type { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ImplBlock {
    pub target: String,
    pub trait_name: Option<String>,
    pub methods: Vec<Function>,
    pub line: u32,
}

/// `const NAME: type = expr;`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDef {
    pub name: String,
    pub ty: Ty,
    pub value: Expr,
    pub line: u32,
}

/// `static [mut] NAME: type = expr;`
#[derive(Debug, Clone, PartialEq)]
pub struct StaticDef {
    pub name: String,
    pub mutable: bool,
    pub ty: Ty,
    pub value: Expr,
    pub line: u32,
}

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `let [mut] name [: type] [= expr];`
    Let {
        name: String,
        mutable: bool,
        ty: Option<Ty>,
        value: Option<Expr>,
        line: u32,
    },
    /// `name <op> expr;` with op one of `=`, `+=`, `-=`, `*=`, `/=`
    Assign {
        name: String,
        op: AssignOp,
        value: Expr,
        line: u32,
    },
    /// `if cond { ... } [else { ... }]`
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    /// `while cond { ... }`
    While { cond: Expr, body: Vec<Stmt> },
    /// `for var in iter { ... }`
    For {
        var: String,
        iter: Expr,
        body: Vec<Stmt>,
    },
    /// `loop { ... }`
    Loop { body: Vec<Stmt> },
    /// `break;`
    Break { line: u32 },
    /// `continue;`
    Continue { line: u32 },
    /// `return [expr];`
    Return { value: Option<Expr>, line: u32 },
    /// `println!("fmt", args...);` (and the other print macros)
    Println {
        format: String,
        args: Vec<Expr>,
        line: u32,
    },
    /// Bare expression statement
    Expr(Expr),
}

/// Compound-assignment operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
        };
        write!(f, "{}", s)
    }
}

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value; the literal kind keeps identifier references and
    /// string/number/bool literals distinguishable downstream
    Literal { value: Literal, line: u32 },
    /// Identifier reference
    Ident { name: String, line: u32 },
    /// Arithmetic binary operation
    Binary {
        left: Box<Expr>,
        op: ArithOp,
        right: Box<Expr>,
        line: u32,
    },
    /// Comparison
    Comparison {
        left: Box<Expr>,
        op: CmpOp,
        right: Box<Expr>,
        line: u32,
    },
    /// Logical `&&`
    And {
        left: Box<Expr>,
        right: Box<Expr>,
        line: u32,
    },
    /// Logical `||`
    Or {
        left: Box<Expr>,
        right: Box<Expr>,
        line: u32,
    },
    /// Logical `!` (prefix)
    Not { operand: Box<Expr>, line: u32 },
    /// `start..end`
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
        line: u32,
    },
    /// `Name {}`
    StructInit { name: String, line: u32 },
    /// `[a, b, c]`
    Array { elements: Vec<Expr>, line: u32 },
    /// `(a, b)`; the one-element form requires a trailing comma
    Tuple { elements: Vec<Expr>, line: u32 },
    /// `vec![a, b, c]`
    Vec { elements: Vec<Expr>, line: u32 },
    /// `input()`
    Input { line: u32 },
}

impl Expr {
    /// Source line where this expression starts
    pub fn line(&self) -> u32 {
        match self {
            Expr::Literal { line, .. }
            | Expr::Ident { line, .. }
            | Expr::Binary { line, .. }
            | Expr::Comparison { line, .. }
            | Expr::And { line, .. }
            | Expr::Or { line, .. }
            | Expr::Not { line, .. }
            | Expr::Range { line, .. }
            | Expr::StructInit { line, .. }
            | Expr::Array { line, .. }
            | Expr::Tuple { line, .. }
            | Expr::Vec { line, .. }
            | Expr::Input { line } => *line,
        }
    }
}

/// Literal value with its processed representation
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i32),
    Float(f64),
    Str(String),
    Char(char),
    Bool(bool),
}

/// Arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
            ArithOp::Mod => "%",
        };
        write!(f, "{}", s)
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        };
        write!(f, "{}", s)
    }
}
