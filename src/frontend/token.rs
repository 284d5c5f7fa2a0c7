//! Token definitions for the Rust-subset lexer

/// A token produced by the lexer.
///
/// `line`/`column` are 1-based. `literal` holds the processed value for
/// number/string/char tokens; for `Error` tokens it carries the lexical
/// diagnostic message.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub raw_text: String,
    pub literal: Option<TokenValue>,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        raw_text: impl Into<String>,
        literal: Option<TokenValue>,
        line: u32,
        column: u32,
    ) -> Self {
        Self {
            kind,
            raw_text: raw_text.into(),
            literal,
            line,
            column,
        }
    }

    pub fn eof(line: u32, column: u32) -> Self {
        Self::new(TokenKind::Eof, "", None, line, column)
    }

    /// An error token carrying a lexical diagnostic message
    pub fn error(message: impl Into<String>, raw_text: impl Into<String>, line: u32, column: u32) -> Self {
        Self::new(
            TokenKind::Error,
            raw_text,
            Some(TokenValue::Str(message.into())),
            line,
            column,
        )
    }
}

/// Processed literal value carried by a token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    Int(i32),
    Float(f64),
    Str(String),
    Char(char),
}

impl std::fmt::Display for TokenValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenValue::Int(v) => write!(f, "{}", v),
            TokenValue::Float(v) => write!(f, "{}", v),
            TokenValue::Str(v) => write!(f, "{}", v),
            TokenValue::Char(v) => write!(f, "{}", v),
        }
    }
}

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // ============ Keywords ============
    /// fn
    Fn,
    /// let
    Let,
    /// mut
    Mut,
    /// return
    Return,
    /// const
    Const,
    /// static
    Static,
    /// if
    If,
    /// else
    Else,
    /// while
    While,
    /// for
    For,
    /// in
    In,
    /// loop
    Loop,
    /// break
    Break,
    /// continue
    Continue,
    /// struct
    Struct,
    /// enum
    Enum,
    /// trait
    Trait,
    /// impl
    Impl,
    /// mod
    Mod,
    /// use
    Use,
    /// pub
    Pub,
    /// where
    Where,
    /// self
    SelfValue,
    /// Self
    SelfType,
    /// true
    True,
    /// false
    False,
    /// input (keyboard read)
    Input,

    // ============ Type keywords ============
    I32,
    I64,
    U32,
    U64,
    F32,
    F64,
    BoolType,
    CharType,
    /// str
    StrType,
    /// String
    StringType,
    /// Box
    BoxType,
    /// Vec
    VecType,
    /// Option
    OptionType,
    /// Some
    SomeValue,
    /// None
    NoneValue,

    // ============ Identifiers and literals ============
    /// Identifier (variable, function, struct name)
    Ident,
    /// Integer literal (i32)
    Number,
    /// Floating-point literal (f64)
    Float,
    /// String literal
    Str,
    /// Character literal
    CharLit,

    // ============ Operators ============
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// =
    Equals,
    /// ==
    EqEq,
    /// !=
    NotEq,
    /// <
    Lt,
    /// <=
    Le,
    /// >
    Gt,
    /// >=
    Ge,
    /// &&
    AndAnd,
    /// ||
    OrOr,
    /// !
    Not,
    /// +=
    PlusEq,
    /// -=
    MinusEq,
    /// *=
    StarEq,
    /// /=
    SlashEq,
    /// ->
    Arrow,
    /// ..
    DotDot,
    /// .
    Dot,
    /// &
    Amp,

    // ============ Delimiters ============
    /// (
    LParen,
    /// )
    RParen,
    /// {
    LBrace,
    /// }
    RBrace,
    /// [
    LBracket,
    /// ]
    RBracket,
    /// ,
    Comma,
    /// :
    Colon,
    /// ;
    Semicolon,

    // ============ Macro calls ============
    /// println! / print! / eprintln! / eprint!
    MacroPrint,
    /// vec!
    MacroVec,

    // ============ Special ============
    /// Lexical error; the token's literal holds the message
    Error,
    /// End of input
    Eof,
}

impl TokenKind {
    /// Try to convert an identifier run to a keyword
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "fn" => Some(TokenKind::Fn),
            "let" => Some(TokenKind::Let),
            "mut" => Some(TokenKind::Mut),
            "return" => Some(TokenKind::Return),
            "const" => Some(TokenKind::Const),
            "static" => Some(TokenKind::Static),
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "while" => Some(TokenKind::While),
            "for" => Some(TokenKind::For),
            "in" => Some(TokenKind::In),
            "loop" => Some(TokenKind::Loop),
            "break" => Some(TokenKind::Break),
            "continue" => Some(TokenKind::Continue),
            "struct" => Some(TokenKind::Struct),
            "enum" => Some(TokenKind::Enum),
            "trait" => Some(TokenKind::Trait),
            "impl" => Some(TokenKind::Impl),
            "mod" => Some(TokenKind::Mod),
            "use" => Some(TokenKind::Use),
            "pub" => Some(TokenKind::Pub),
            "where" => Some(TokenKind::Where),
            "self" => Some(TokenKind::SelfValue),
            "Self" => Some(TokenKind::SelfType),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            "input" => Some(TokenKind::Input),
            "i32" => Some(TokenKind::I32),
            "i64" => Some(TokenKind::I64),
            "u32" => Some(TokenKind::U32),
            "u64" => Some(TokenKind::U64),
            "f32" => Some(TokenKind::F32),
            "f64" => Some(TokenKind::F64),
            "bool" => Some(TokenKind::BoolType),
            "char" => Some(TokenKind::CharType),
            "str" => Some(TokenKind::StrType),
            "String" => Some(TokenKind::StringType),
            "Box" => Some(TokenKind::BoxType),
            "Vec" => Some(TokenKind::VecType),
            "Option" => Some(TokenKind::OptionType),
            "Some" => Some(TokenKind::SomeValue),
            "None" => Some(TokenKind::NoneValue),
            _ => None,
        }
    }

    /// Binding power of a binary operator, lowest to highest.
    /// Returns None if the token is not a binary operator.
    pub fn binary_binding_power(&self) -> Option<u8> {
        match self {
            // Logical OR (lowest)
            TokenKind::OrOr => Some(1),

            // Logical AND
            TokenKind::AndAnd => Some(2),

            // Comparison (all equal precedence)
            TokenKind::EqEq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::Le
            | TokenKind::Gt
            | TokenKind::Ge => Some(3),

            // Range
            TokenKind::DotDot => Some(4),

            // Additive
            TokenKind::Plus | TokenKind::Minus => Some(5),

            // Multiplicative (highest for binary)
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => Some(6),

            _ => None,
        }
    }

    /// Check if this token starts a top-level item
    pub fn starts_item(&self) -> bool {
        matches!(
            self,
            TokenKind::Fn
                | TokenKind::Struct
                | TokenKind::Enum
                | TokenKind::Trait
                | TokenKind::Impl
                | TokenKind::Const
                | TokenKind::Static
        )
    }
}
