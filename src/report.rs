//! Serializable records for downstream consumers.
//!
//! The pipeline itself performs no I/O; these records are the shape a
//! presentation layer (the CLI's `--json` mode, or any HTTP/log
//! formatter) receives: tokens as `{type, value, line}` triples and
//! diagnostics as `{type, message, line}` triples.

use crate::frontend::token::{Token, TokenKind};
use crate::utils::{SemanticError, SyntaxError};
use serde::Serialize;

/// One token as seen on the wire
#[derive(Debug, Clone, Serialize)]
pub struct TokenRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    pub line: u32,
}

impl From<&Token> for TokenRecord {
    fn from(token: &Token) -> Self {
        let value = match &token.literal {
            Some(literal) => literal.to_string(),
            None => token.raw_text.clone(),
        };
        Self {
            kind: format!("{:?}", token.kind),
            value,
            line: token.line,
        }
    }
}

/// One diagnostic as seen on the wire
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub line: Option<u32>,
}

impl DiagnosticRecord {
    /// A lexical diagnostic extracted from an `Error` token
    pub fn lexical(token: &Token) -> Self {
        let message = match &token.literal {
            Some(literal) => literal.to_string(),
            None => format!("unrecognized input `{}`", token.raw_text),
        };
        Self {
            kind: "lexical".to_string(),
            message,
            line: Some(token.line),
        }
    }

    pub fn syntax(error: &SyntaxError) -> Self {
        Self {
            kind: "syntax".to_string(),
            message: error.to_string(),
            line: error.line(),
        }
    }

    pub fn semantic(error: &SemanticError) -> Self {
        Self {
            kind: "semantic".to_string(),
            message: error.to_string(),
            line: Some(error.line()),
        }
    }
}

/// Full result of one analysis run
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub status: String,
    pub tokens: Vec<TokenRecord>,
    pub errors: Vec<DiagnosticRecord>,
}

impl AnalysisReport {
    pub fn new(tokens: Vec<TokenRecord>, errors: Vec<DiagnosticRecord>) -> Self {
        let status = if errors.is_empty() { "ok" } else { "error" };
        Self {
            status: status.to_string(),
            tokens,
            errors,
        }
    }
}

/// Collect the lexical diagnostics hiding in a token stream
pub fn lexical_diagnostics(tokens: &[Token]) -> Vec<DiagnosticRecord> {
    tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Error)
        .map(DiagnosticRecord::lexical)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;

    #[test]
    fn test_token_record_shape() {
        let tokens = Lexer::new("let x = 5;").tokenize();
        let record = TokenRecord::from(&tokens[3]);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "Number");
        assert_eq!(json["value"], "5");
        assert_eq!(json["line"], 1);
    }

    #[test]
    fn test_lexical_diagnostics_from_error_tokens() {
        let tokens = Lexer::new("let s = \"open").tokenize();
        let diags = lexical_diagnostics(&tokens);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, "lexical");
        assert_eq!(diags[0].message, "unterminated string literal");
    }

    #[test]
    fn test_report_status() {
        let report = AnalysisReport::new(Vec::new(), Vec::new());
        assert_eq!(report.status, "ok");

        let diag = DiagnosticRecord {
            kind: "semantic".to_string(),
            message: "boom".to_string(),
            line: Some(1),
        };
        let report = AnalysisReport::new(Vec::new(), vec![diag]);
        assert_eq!(report.status, "error");
    }
}
