//! rustlite - Lexical, syntactic and semantic analysis for a Rust subset.
//!
//! The pipeline has three stages, each a pure function over its input:
//!
//! 1. [`tokenize`] turns source text into a token list (lexical problems
//!    become `Error` tokens, never failures),
//! 2. [`parse`] builds a syntax tree plus an ordered list of syntax
//!    diagnostics,
//! 3. [`analyze`] walks the tree and returns an ordered list of semantic
//!    diagnostics.
//!
//! No stage mutates the output of a previous stage, every call starts
//! from fresh state, and nothing here performs I/O; see [`report`] for
//! the serializable shapes a presentation layer consumes.

pub mod frontend;
pub mod report;
pub mod types;
pub mod utils;

pub use frontend::ast::Program;
pub use frontend::token::{Token, TokenKind, TokenValue};
pub use types::Ty;
pub use utils::{SemanticError, SyntaxError};

/// Tokenize source text. Always terminates and always ends the stream
/// with exactly one `Eof` token.
pub fn tokenize(source: &str) -> Vec<Token> {
    let tokens = frontend::lexer::Lexer::new(source).tokenize();
    log::debug!("tokenized {} tokens", tokens.len());
    tokens
}

/// Parse source text. The tree is absent only when diagnostics exist and
/// no top-level item could be completed.
pub fn parse(source: &str) -> (Option<Program>, Vec<SyntaxError>) {
    let (program, errors) = frontend::parser::parse(source);
    log::debug!(
        "parsed {} items, {} syntax diagnostics",
        program.as_ref().map(|p| p.items.len()).unwrap_or(0),
        errors.len()
    );
    (program, errors)
}

/// Analyze a syntax tree. Read-only over the tree; repeated calls on the
/// same tree yield the same diagnostics.
pub fn analyze(program: &Program) -> Vec<SemanticError> {
    let errors = frontend::semantic::analyze(program);
    log::debug!("analysis produced {} diagnostics", errors.len());
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::ast::{Expr, Item, Literal, Stmt};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_binding_end_to_end() {
        let source = "fn main() { let x = 5; }";
        let (program, syntax_errors) = parse(source);
        assert_eq!(syntax_errors, vec![]);

        let program = program.expect("valid program should produce a tree");
        let Item::Function(main) = &program.items[0] else {
            panic!("expected a function item");
        };
        assert_eq!(main.name, "main");
        assert_eq!(main.body.len(), 1);
        assert!(matches!(
            &main.body[0],
            Stmt::Let { name, value: Some(Expr::Literal { value: Literal::Int(5), .. }), .. }
                if name == "x"
        ));

        assert_eq!(analyze(&program), vec![]);
    }

    #[test]
    fn test_immutability_beats_type_mismatch() {
        // `x = true` is both an immutable reassignment and a type clash;
        // only the mutability finding is reported
        let (program, syntax_errors) = parse("fn main() { let x = 5; x = true; }");
        assert_eq!(syntax_errors, vec![]);

        let errors = analyze(&program.unwrap());
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "line 1: cannot assign to immutable variable `x`"
        );
    }

    #[test]
    fn test_break_at_function_top_level() {
        let (program, syntax_errors) = parse("fn main() { break; }");
        assert_eq!(syntax_errors, vec![]);

        let errors = analyze(&program.unwrap());
        assert_eq!(errors, vec![SemanticError::BreakOutsideLoop { line: 1 }]);
    }

    #[test]
    fn test_string_escapes_are_decoded() {
        let tokens = tokenize(r#""a \"b\nc\td""#);
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(
            tokens[0].literal,
            Some(TokenValue::Str("a \"b\nc\td".to_string()))
        );
    }

    #[test]
    fn test_range_tokens_and_for_node() {
        let tokens = tokenize("0..10");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Number,
                TokenKind::DotDot,
                TokenKind::Number,
                TokenKind::Eof
            ]
        );

        let (program, syntax_errors) = parse("fn main() { for i in 0..10 {} }");
        assert_eq!(syntax_errors, vec![]);
        let Item::Function(main) = &program.unwrap().items[0] else {
            panic!("expected a function item");
        };
        assert!(matches!(
            &main.body[0],
            Stmt::For { iter: Expr::Range { .. }, .. }
        ));
    }

    #[test]
    fn test_unterminated_block_comment_is_silent() {
        let tokens = tokenize("/* never closed");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn test_tokenize_always_ends_with_one_eof() {
        for source in ["", "fn", "\"open", "let x = 5;", "@#$", "/* a */ b"] {
            let tokens = tokenize(source);
            let eofs = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
            assert_eq!(eofs, 1, "source {:?}", source);
            assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        }
    }

    #[test]
    fn test_raw_text_round_trip_preserves_kinds() {
        let source = "fn main() { let mut x = 1; while x < 10 { x += 1; } }";
        let first = tokenize(source);

        let joined: Vec<String> = first
            .iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| t.raw_text.clone())
            .collect();
        let second = tokenize(&joined.join(" "));

        let first_kinds: Vec<TokenKind> = first.iter().map(|t| t.kind).collect();
        let second_kinds: Vec<TokenKind> = second.iter().map(|t| t.kind).collect();
        assert_eq!(first_kinds, second_kinds);
    }

    #[test]
    fn test_valid_program_has_no_diagnostics() {
        let source = "struct Point { x: f64, y: f64 }\n\
                      const LIMIT: i32 = 10;\n\
                      fn main() {\n\
                      \tlet mut total = 0;\n\
                      \tfor i in 0..LIMIT {\n\
                      \t\tif i % 2 == 0 {\n\
                      \t\t\ttotal += i;\n\
                      \t\t}\n\
                      \t}\n\
                      \tprintln!(\"total = {}\", total);\n\
                      }";
        let (program, syntax_errors) = parse(source);
        assert_eq!(syntax_errors, vec![]);
        let program = program.expect("valid program should produce a tree");
        assert_eq!(analyze(&program), vec![]);
    }
}
