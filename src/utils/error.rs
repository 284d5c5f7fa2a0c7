//! Diagnostic types for the analysis pipeline.
//!
//! Lexical problems never reach this module: the lexer encodes them as
//! `Error` tokens so scanning can always continue. Syntactic and semantic
//! problems are collected into ordered lists; none of them aborts a
//! pipeline call.

use crate::types::Ty;
use thiserror::Error;

/// Result type alias for parser internals
pub type Result<T> = std::result::Result<T, SyntaxError>;

/// A syntax diagnostic recorded during parsing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("syntax error at line {line}: unexpected token `{token}` ({kind})")]
    UnexpectedToken {
        token: String,
        kind: String,
        line: u32,
    },

    #[error("syntax error: unexpected end of input")]
    UnexpectedEof,
}

impl SyntaxError {
    /// Get the source line this diagnostic points at, if any
    pub fn line(&self) -> Option<u32> {
        match self {
            Self::UnexpectedToken { line, .. } => Some(*line),
            Self::UnexpectedEof => None,
        }
    }
}

/// A semantic diagnostic recorded during the tree walk
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    #[error("line {line}: type mismatch: expected `{expected}` but found `{found}` in the binding of `{name}`")]
    TypeMismatch {
        name: String,
        expected: Ty,
        found: Ty,
        line: u32,
    },

    #[error("line {line}: type mismatch in reassignment: `{name}` has type `{expected}` but a value of type `{found}` was assigned")]
    AssignTypeMismatch {
        name: String,
        expected: Ty,
        found: Ty,
        line: u32,
    },

    #[error("line {line}: cannot assign to immutable variable `{name}`")]
    AssignToImmutable { name: String, line: u32 },

    #[error("line {line}: undeclared variable `{name}`")]
    UndeclaredVariable { name: String, line: u32 },

    #[error("line {line}: operator `{op}` requires numeric operands, found `{ty}`")]
    NonNumericOperand { op: String, ty: Ty, line: u32 },

    #[error("line {line}: mismatched operand types `{left}` and `{right}` for operator `{op}`")]
    OperandTypeMismatch {
        op: String,
        left: Ty,
        right: Ty,
        line: u32,
    },

    #[error("line {line}: operator `{op}` requires boolean operands, found `{ty}`")]
    NonBooleanOperand { op: String, ty: Ty, line: u32 },

    #[error("line {line}: range bounds must be numeric, found `{ty}`")]
    NonNumericRangeBound { ty: Ty, line: u32 },

    #[error("line {line}: `break` outside of a loop")]
    BreakOutsideLoop { line: u32 },

    #[error("line {line}: `continue` outside of a loop")]
    ContinueOutsideLoop { line: u32 },

    #[error("line {line}: `return` outside of a function")]
    ReturnOutsideFunction { line: u32 },
}

impl SemanticError {
    /// Get the source line this diagnostic points at
    pub fn line(&self) -> u32 {
        match self {
            Self::TypeMismatch { line, .. }
            | Self::AssignTypeMismatch { line, .. }
            | Self::AssignToImmutable { line, .. }
            | Self::UndeclaredVariable { line, .. }
            | Self::NonNumericOperand { line, .. }
            | Self::OperandTypeMismatch { line, .. }
            | Self::NonBooleanOperand { line, .. }
            | Self::NonNumericRangeBound { line, .. }
            | Self::BreakOutsideLoop { line }
            | Self::ContinueOutsideLoop { line }
            | Self::ReturnOutsideFunction { line } => *line,
        }
    }
}
