//! Type tags used by the semantic analyzer.
//!
//! These are deliberately shallow: the analyzer compares tags for equality
//! and classifies them as numeric/boolean, nothing more.

use std::fmt;

/// The type of an expression or symbol, as far as inference can tell.
#[derive(Debug, Clone, PartialEq)]
pub enum Ty {
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
    Bool,
    Char,
    /// String slice (`&str`), the type of string literals
    Str,
    /// Owned `String`, the type of `input()`
    String,
    /// Empty tuple `()`
    Unit,
    /// A user-defined struct type, named after its declaration
    Named(std::string::String),
    /// Fixed-size array `[T; N]`, derived from the first element
    Array(Box<Ty>, usize),
    /// Tuple of the element types
    Tuple(Vec<Ty>),
    /// `vec![...]` literal, element type from the first element
    Vec(Box<Ty>),
    /// Inference could not determine a type
    Unknown,
    /// The expression referenced a name that is not in scope
    Undeclared,
}

impl Ty {
    /// Check if this is one of the numeric tags
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Ty::I32 | Ty::I64 | Ty::U32 | Ty::U64 | Ty::F32 | Ty::F64
        )
    }

    /// Unknown and Undeclared are both unresolved: type-mismatch checks
    /// skip them so one failure does not cascade into follow-on noise.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Ty::Unknown | Ty::Undeclared)
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::I32 => write!(f, "i32"),
            Ty::I64 => write!(f, "i64"),
            Ty::U32 => write!(f, "u32"),
            Ty::U64 => write!(f, "u64"),
            Ty::F32 => write!(f, "f32"),
            Ty::F64 => write!(f, "f64"),
            Ty::Bool => write!(f, "bool"),
            Ty::Char => write!(f, "char"),
            Ty::Str => write!(f, "&str"),
            Ty::String => write!(f, "String"),
            Ty::Unit => write!(f, "()"),
            Ty::Named(name) => write!(f, "{}", name),
            Ty::Array(elem, len) => write!(f, "[{}; {}]", elem, len),
            Ty::Tuple(elems) => {
                write!(f, "(")?;
                for (i, ty) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", ty)?;
                }
                write!(f, ")")
            }
            Ty::Vec(elem) => write!(f, "Vec<{}>", elem),
            Ty::Unknown => write!(f, "<unknown>"),
            Ty::Undeclared => write!(f, "<undeclared>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Ty::I32.to_string(), "i32");
        assert_eq!(Ty::Str.to_string(), "&str");
        assert_eq!(Ty::Array(Box::new(Ty::I32), 3).to_string(), "[i32; 3]");
        assert_eq!(
            Ty::Tuple(vec![Ty::I32, Ty::Bool]).to_string(),
            "(i32, bool)"
        );
        assert_eq!(Ty::Array(Box::new(Ty::Unknown), 0).to_string(), "[<unknown>; 0]");
    }

    #[test]
    fn test_numeric_classification() {
        assert!(Ty::I32.is_numeric());
        assert!(Ty::F64.is_numeric());
        assert!(!Ty::Bool.is_numeric());
        assert!(!Ty::Str.is_numeric());
        assert!(Ty::Unknown.is_unresolved());
        assert!(Ty::Undeclared.is_unresolved());
    }
}
