//! Lexer for the Rust subset.
//!
//! Converts source text into an ordered token sequence. The scanner is
//! total: it never fails on bad input. Unrecognized or malformed input
//! becomes an `Error` token and scanning resumes at the next character.

use crate::frontend::token::{Token, TokenKind, TokenValue};

/// The lexer state. One instance per `tokenize` call; nothing is shared
/// across invocations.
pub struct Lexer {
    /// Source code as chars
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    /// Start position of the current token
    start: usize,
    /// Current 1-based line
    line: u32,
    /// Current 1-based column
    column: u32,
    /// Line at the start of the current token
    start_line: u32,
    /// Column at the start of the current token
    start_column: u32,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            start: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source.get(self.pos + offset).copied()
    }

    /// Advance one character, updating line/column bookkeeping
    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if let Some(c) = c {
            self.pos += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        c
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Raw text of the current token
    fn lexeme(&self) -> String {
        self.source[self.start..self.pos].iter().collect()
    }

    fn make_token(&self, kind: TokenKind, literal: Option<TokenValue>) -> Token {
        Token::new(kind, self.lexeme(), literal, self.start_line, self.start_column)
    }

    fn error_token(&self, message: impl Into<String>) -> Token {
        Token::error(message, self.lexeme(), self.start_line, self.start_column)
    }

    /// Skip whitespace and comments. `//` and `///` are consumed to end of
    /// line; `/* ... */` is non-nested, the first `*/` closes it, and an
    /// unterminated block comment silently consumes to end of input.
    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                '/' if self.peek_next() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                '/' if self.peek_next() == Some('*') => {
                    self.advance(); // /
                    self.advance(); // *
                    while !self.is_at_end() {
                        if self.peek() == Some('*') && self.peek_next() == Some('/') {
                            self.advance();
                            self.advance();
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Read an identifier, keyword, or macro-call head
    fn read_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text = self.lexeme();

        // Macro heads are single tokens when the identifier run is
        // immediately followed by `!`. This check must come before the
        // keyword/ident decision so the `!` is not lexed separately.
        if self.peek() == Some('!') {
            match text.as_str() {
                "println" | "print" | "eprintln" | "eprint" => {
                    self.advance();
                    return self.make_token(TokenKind::MacroPrint, None);
                }
                "vec" => {
                    self.advance();
                    return self.make_token(TokenKind::MacroVec, None);
                }
                _ => {}
            }
        }

        let kind = TokenKind::keyword_from_str(&text).unwrap_or(TokenKind::Ident);
        self.make_token(kind, None)
    }

    /// Read a number literal. Floating-point iff it has a fractional part
    /// or an exponent; otherwise a 32-bit integer.
    fn read_number(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        let mut is_float = false;

        // Fractional part: only if a digit follows the dot, so `0..10`
        // stays Number DotDot Number.
        if self.peek() == Some('.') && self.peek_next().map_or(false, |c| c.is_ascii_digit()) {
            is_float = true;
            self.advance(); // .
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        // Exponent: e/E, optional sign, at least one digit
        if matches!(self.peek(), Some('e') | Some('E')) {
            let has_exp = match self.peek_next() {
                Some(c) if c.is_ascii_digit() => true,
                Some('+') | Some('-') => self.peek_at(2).map_or(false, |c| c.is_ascii_digit()),
                _ => false,
            };
            if has_exp {
                is_float = true;
                self.advance(); // e
                if matches!(self.peek(), Some('+') | Some('-')) {
                    self.advance();
                }
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }

        let text = self.lexeme();
        if is_float {
            match text.parse::<f64>() {
                Ok(v) => self.make_token(TokenKind::Float, Some(TokenValue::Float(v))),
                Err(_) => self.error_token(format!("invalid numeric literal `{}`", text)),
            }
        } else {
            match text.parse::<i32>() {
                Ok(v) => self.make_token(TokenKind::Number, Some(TokenValue::Int(v))),
                Err(_) => self.error_token(format!("invalid numeric literal `{}`", text)),
            }
        }
    }

    /// Decode one escape sequence after the backslash has been consumed.
    /// Unknown escapes are preserved as the two literal characters.
    fn push_escape(value: &mut String, c: char) {
        match c {
            '\\' => value.push('\\'),
            '"' => value.push('"'),
            '\'' => value.push('\''),
            'n' => value.push('\n'),
            't' => value.push('\t'),
            'r' => value.push('\r'),
            other => {
                value.push('\\');
                value.push(other);
            }
        }
    }

    /// Read a string literal, decoding escapes
    fn read_string(&mut self) -> Token {
        self.advance(); // opening quote

        let mut value = String::new();
        loop {
            match self.peek() {
                None => return self.error_token("unterminated string literal"),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.advance() {
                        Some(c) => Self::push_escape(&mut value, c),
                        None => return self.error_token("unterminated string literal"),
                    }
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }

        self.make_token(TokenKind::Str, Some(TokenValue::Str(value)))
    }

    /// Read a character literal: exactly one char or one escape sequence
    fn read_char(&mut self) -> Token {
        self.advance(); // opening quote

        let c = match self.peek() {
            None => return self.error_token("unterminated character literal"),
            Some('\'') => {
                self.advance();
                return self.error_token("empty character literal");
            }
            Some('\\') => {
                self.advance();
                match self.advance() {
                    Some('n') => '\n',
                    Some('t') => '\t',
                    Some('r') => '\r',
                    Some(c) => c,
                    None => return self.error_token("unterminated character literal"),
                }
            }
            Some(c) => {
                self.advance();
                c
            }
        };

        if self.peek() == Some('\'') {
            self.advance();
            self.make_token(TokenKind::CharLit, Some(TokenValue::Char(c)))
        } else {
            self.error_token("unterminated character literal")
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();
        self.start = self.pos;
        self.start_line = self.line;
        self.start_column = self.column;

        let c = match self.peek() {
            Some(c) => c,
            None => return Token::eof(self.line, self.column),
        };

        if c.is_ascii_alphabetic() || c == '_' {
            return self.read_identifier();
        }
        if c.is_ascii_digit() {
            return self.read_number();
        }
        if c == '"' {
            return self.read_string();
        }
        if c == '\'' {
            return self.read_char();
        }

        // Operators and delimiters, longest match first
        self.advance();
        let kind = match c {
            '+' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::PlusEq
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::Arrow
                } else if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::MinusEq
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::StarEq
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::SlashEq
                } else {
                    TokenKind::Slash
                }
            }
            '%' => TokenKind::Percent,
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::EqEq
                } else {
                    TokenKind::Equals
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::NotEq
                } else {
                    TokenKind::Not
                }
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                if self.peek() == Some('&') {
                    self.advance();
                    TokenKind::AndAnd
                } else {
                    TokenKind::Amp
                }
            }
            '|' => {
                if self.peek() == Some('|') {
                    self.advance();
                    TokenKind::OrOr
                } else {
                    return self.error_token("unrecognized character '|'");
                }
            }
            '.' => {
                if self.peek() == Some('.') {
                    self.advance();
                    TokenKind::DotDot
                } else {
                    TokenKind::Dot
                }
            }
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            other => return self.error_token(format!("unrecognized character '{}'", other)),
        };

        self.make_token(kind, None)
    }

    /// Tokenize the entire source, ending with exactly one Eof token
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = Lexer::new("fn main() { }").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Fn);
        assert_eq!(tokens[1].kind, TokenKind::Ident);
        assert_eq!(tokens[1].raw_text, "main");
        assert_eq!(tokens[2].kind, TokenKind::LParen);
        assert_eq!(tokens[3].kind, TokenKind::RParen);
        assert_eq!(tokens[4].kind, TokenKind::LBrace);
        assert_eq!(tokens[5].kind, TokenKind::RBrace);
        assert_eq!(tokens[6].kind, TokenKind::Eof);
    }

    #[test]
    fn test_numbers() {
        let tokens = Lexer::new("42 3.14 1e3 2.5e-2").tokenize();
        assert_eq!(tokens[0].literal, Some(TokenValue::Int(42)));
        assert_eq!(tokens[1].literal, Some(TokenValue::Float(3.14)));
        assert_eq!(tokens[2].literal, Some(TokenValue::Float(1e3)));
        assert_eq!(tokens[3].literal, Some(TokenValue::Float(2.5e-2)));
    }

    #[test]
    fn test_integer_overflow_is_error_token() {
        let tokens = Lexer::new("99999999999999999999").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].raw_text, "99999999999999999999");
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn test_range_is_not_a_float() {
        assert_eq!(
            kinds("0..10"),
            vec![
                TokenKind::Number,
                TokenKind::DotDot,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        let tokens = Lexer::new(r#""a \"b\nc\td""#).tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(
            tokens[0].literal,
            Some(TokenValue::Str("a \"b\nc\td".to_string()))
        );
    }

    #[test]
    fn test_unknown_escape_is_preserved() {
        let tokens = Lexer::new(r#""a\qb""#).tokenize();
        assert_eq!(tokens[0].literal, Some(TokenValue::Str("a\\qb".to_string())));
    }

    #[test]
    fn test_unterminated_string() {
        let tokens = Lexer::new("\"never closed").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(
            tokens[0].literal,
            Some(TokenValue::Str("unterminated string literal".to_string()))
        );
    }

    #[test]
    fn test_char_literals() {
        let tokens = Lexer::new(r"'c' '\n'").tokenize();
        assert_eq!(tokens[0].literal, Some(TokenValue::Char('c')));
        assert_eq!(tokens[1].literal, Some(TokenValue::Char('\n')));
    }

    #[test]
    fn test_macro_heads() {
        let tokens = Lexer::new("println! print! eprintln! eprint! vec! foo!").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::MacroPrint);
        assert_eq!(tokens[0].raw_text, "println!");
        assert_eq!(tokens[1].kind, TokenKind::MacroPrint);
        assert_eq!(tokens[2].kind, TokenKind::MacroPrint);
        assert_eq!(tokens[3].kind, TokenKind::MacroPrint);
        assert_eq!(tokens[4].kind, TokenKind::MacroVec);
        // an unknown head stays an identifier followed by `!`
        assert_eq!(tokens[5].kind, TokenKind::Ident);
        assert_eq!(tokens[6].kind, TokenKind::Not);
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(kinds("// line\n/// doc\nlet"), vec![TokenKind::Let, TokenKind::Eof]);
        assert_eq!(
            kinds("/* block\nwith lines */ let"),
            vec![TokenKind::Let, TokenKind::Eof]
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        // consumes to end of input without emitting an error token
        assert_eq!(kinds("/* never closed"), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_block_comment_is_not_nested() {
        // the first */ closes the comment
        assert_eq!(
            kinds("/* a /* b */ let"),
            vec![TokenKind::Let, TokenKind::Eof]
        );
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            kinds("-> == != <= >= && || += -= *= /= .."),
            vec![
                TokenKind::Arrow,
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::PlusEq,
                TokenKind::MinusEq,
                TokenKind::StarEq,
                TokenKind::SlashEq,
                TokenKind::DotDot,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_unrecognized_character() {
        let tokens = Lexer::new("let x = 1 @").tokenize();
        let err = tokens.iter().find(|t| t.kind == TokenKind::Error).unwrap();
        assert_eq!(
            err.literal,
            Some(TokenValue::Str("unrecognized character '@'".to_string()))
        );
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn test_line_and_column_tracking() {
        let tokens = Lexer::new("let x\nlet y").tokenize();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 5));
        assert_eq!((tokens[2].line, tokens[2].column), (2, 1));
        assert_eq!((tokens[3].line, tokens[3].column), (2, 5));
    }

    #[test]
    fn test_block_comment_advances_lines() {
        let tokens = Lexer::new("/* one\ntwo */ let").tokenize();
        assert_eq!(tokens[0].line, 2);
    }
}
