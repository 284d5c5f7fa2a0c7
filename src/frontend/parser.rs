//! Parser for the Rust subset.
//!
//! Recursive descent with binding powers for expressions. The parser
//! never fails hard on malformed input: each unexpected token (or an
//! unexpected end of input) is recorded as a diagnostic and the driver
//! resynchronizes — inside a block it skips past the next `;`, at the
//! top level it skips to the next item-starting keyword. The tree is
//! absent only when no top-level item could be completed.

use crate::frontend::ast::*;
use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind, TokenValue};
use crate::types::Ty;
use crate::utils::{Result, SyntaxError};

/// Parse source text into a syntax tree plus an ordered diagnostic list
pub fn parse(source: &str) -> (Option<Program>, Vec<SyntaxError>) {
    let tokens = Lexer::new(source).tokenize();
    Parser::new(tokens).parse_program()
}

/// The parser state. One instance per `parse` call.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    errors: Vec<SyntaxError>,
    /// `Name {}` is only a struct-init where a brace cannot open a block;
    /// cleared while parsing `if`/`while` conditions and `for` iterables
    allow_struct_init: bool,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        // the helpers below rely on a terminal Eof being present
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let line = tokens.last().map(|t| t.line).unwrap_or(1);
            tokens.push(Token::eof(line, 1));
        }
        Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            allow_struct_init: true,
        }
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    fn current_line(&self) -> u32 {
        self.current().line
    }

    fn peek_kind(&self) -> TokenKind {
        self.tokens
            .get(self.pos + 1)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn is_at_end(&self) -> bool {
        self.current_kind() == TokenKind::Eof
    }

    fn unexpected(&self) -> SyntaxError {
        let token = self.current();
        if token.kind == TokenKind::Eof {
            SyntaxError::UnexpectedEof
        } else {
            SyntaxError::UnexpectedToken {
                token: token.raw_text.clone(),
                kind: format!("{:?}", token.kind),
                line: token.line,
            }
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected())
        }
    }

    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Run `f` with struct-init parsing switched on or off, restoring the
    /// previous setting afterwards
    fn with_struct_init<T>(
        &mut self,
        allow: bool,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let prev = self.allow_struct_init;
        self.allow_struct_init = allow;
        let result = f(self);
        self.allow_struct_init = prev;
        result
    }

    // ==================== Recovery ====================

    /// Skip past the next `;`, or stop before `}` so the enclosing block
    /// can close
    fn synchronize_stmt(&mut self) {
        while !self.is_at_end() {
            match self.current_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Skip to the next token that can start a top-level item
    fn synchronize_item(&mut self) {
        self.advance();
        while !self.is_at_end() && !self.current_kind().starts_item() {
            self.advance();
        }
    }

    // ==================== Program and Items ====================

    /// Parse a complete program, collecting diagnostics along the way
    pub fn parse_program(mut self) -> (Option<Program>, Vec<SyntaxError>) {
        let mut items = Vec::new();

        while !self.is_at_end() {
            match self.parse_item() {
                Ok(item) => items.push(item),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize_item();
                }
            }
        }

        if items.is_empty() && !self.errors.is_empty() {
            (None, self.errors)
        } else {
            (Some(Program { items }), self.errors)
        }
    }

    fn parse_item(&mut self) -> Result<Item> {
        match self.current_kind() {
            TokenKind::Fn => Ok(Item::Function(self.parse_function()?)),
            TokenKind::Struct => Ok(Item::Struct(self.parse_struct()?)),
            TokenKind::Enum => Ok(Item::Enum(self.parse_enum()?)),
            TokenKind::Trait => Ok(Item::Trait(self.parse_trait()?)),
            TokenKind::Impl => Ok(Item::Impl(self.parse_impl()?)),
            TokenKind::Const => Ok(Item::Const(self.parse_const()?)),
            TokenKind::Static => Ok(Item::Static(self.parse_static()?)),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_function(&mut self) -> Result<Function> {
        let line = self.current_line();
        self.expect(TokenKind::Fn)?;
        let name = self.expect(TokenKind::Ident)?.raw_text;

        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;

        let ret_type = if self.consume(TokenKind::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let body = self.parse_block()?;

        Ok(Function {
            name,
            params,
            ret_type,
            body,
            line,
        })
    }

    fn parse_params(&mut self) -> Result<Vec<Param>> {
        let mut params = Vec::new();

        while !self.check(TokenKind::RParen) && !self.is_at_end() {
            params.push(self.parse_param()?);
            if !self.consume(TokenKind::Comma) {
                break;
            }
        }

        Ok(params)
    }

    fn parse_param(&mut self) -> Result<Param> {
        if self.check(TokenKind::Amp) && self.peek_kind() == TokenKind::SelfValue {
            self.advance();
            self.advance();
            return Ok(Param::SelfRef);
        }

        let name = self.expect(TokenKind::Ident)?.raw_text;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        Ok(Param::Named { name, ty })
    }

    /// Parse a type annotation: a primitive type keyword, `&str`, or a
    /// struct name
    fn parse_type(&mut self) -> Result<Ty> {
        if self.consume(TokenKind::Amp) {
            self.expect(TokenKind::StrType)?;
            return Ok(Ty::Str);
        }

        let token = self.current().clone();
        let ty = match token.kind {
            TokenKind::I32 => Ty::I32,
            TokenKind::I64 => Ty::I64,
            TokenKind::U32 => Ty::U32,
            TokenKind::U64 => Ty::U64,
            TokenKind::F32 => Ty::F32,
            TokenKind::F64 => Ty::F64,
            TokenKind::BoolType => Ty::Bool,
            TokenKind::CharType => Ty::Char,
            TokenKind::StrType => Ty::Str,
            TokenKind::StringType => Ty::String,
            TokenKind::Ident => Ty::Named(token.raw_text.clone()),
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(ty)
    }

    fn parse_struct(&mut self) -> Result<StructDef> {
        let line = self.current_line();
        self.expect(TokenKind::Struct)?;
        let name = self.expect(TokenKind::Ident)?.raw_text;
        self.expect(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            let field_name = self.expect(TokenKind::Ident)?.raw_text;
            self.expect(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            fields.push(Field {
                name: field_name,
                ty,
            });
            if !self.consume(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RBrace)?;
        Ok(StructDef { name, fields, line })
    }

    fn parse_enum(&mut self) -> Result<EnumDef> {
        let line = self.current_line();
        self.expect(TokenKind::Enum)?;
        let name = self.expect(TokenKind::Ident)?.raw_text;
        self.expect(TokenKind::LBrace)?;

        let mut variants = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            variants.push(self.expect(TokenKind::Ident)?.raw_text);
            if !self.consume(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::RBrace)?;
        Ok(EnumDef {
            name,
            variants,
            line,
        })
    }

    fn parse_trait(&mut self) -> Result<TraitDef> {
        let line = self.current_line();
        self.expect(TokenKind::Trait)?;
        let name = self.expect(TokenKind::Ident)?.raw_text;
        self.expect(TokenKind::LBrace)?;

        let mut methods = Vec::new();
        while self.check(TokenKind::Fn) {
            methods.push(self.parse_fn_sig()?);
        }

        self.expect(TokenKind::RBrace)?;
        Ok(TraitDef {
            name,
            methods,
            line,
        })
    }

    fn parse_fn_sig(&mut self) -> Result<FunctionSig> {
        let line = self.current_line();
        self.expect(TokenKind::Fn)?;
        let name = self.expect(TokenKind::Ident)?.raw_text;

        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;

        let ret_type = if self.consume(TokenKind::Arrow) {
            Some(self.parse_type()?)
        } else {
            None
        };

        self.expect(TokenKind::Semicolon)?;
        Ok(FunctionSig {
            name,
            params,
            ret_type,
            line,
        })
    }

    fn parse_impl(&mut self) -> Result<ImplBlock> {
        let line = self.current_line();
        self.expect(TokenKind::Impl)?;
        let first = self.expect(TokenKind::Ident)?.raw_text;

        let (trait_name, target) = if self.consume(TokenKind::For) {
            (Some(first), self.expect(TokenKind::Ident)?.raw_text)
        } else {
            (None, first)
        };

        self.expect(TokenKind::LBrace)?;
        let mut methods = Vec::new();
        while self.check(TokenKind::Fn) {
            methods.push(self.parse_function()?);
        }
        self.expect(TokenKind::RBrace)?;

        Ok(ImplBlock {
            target,
            trait_name,
            methods,
            line,
        })
    }

    fn parse_const(&mut self) -> Result<ConstDef> {
        let line = self.current_line();
        self.expect(TokenKind::Const)?;
        let name = self.expect(TokenKind::Ident)?.raw_text;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        self.expect(TokenKind::Equals)?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(ConstDef {
            name,
            ty,
            value,
            line,
        })
    }

    fn parse_static(&mut self) -> Result<StaticDef> {
        let line = self.current_line();
        self.expect(TokenKind::Static)?;
        let mutable = self.consume(TokenKind::Mut);
        let name = self.expect(TokenKind::Ident)?.raw_text;
        self.expect(TokenKind::Colon)?;
        let ty = self.parse_type()?;
        self.expect(TokenKind::Equals)?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(StaticDef {
            name,
            mutable,
            ty,
            value,
            line,
        })
    }

    // ==================== Statements ====================

    /// Parse statements until the closing brace; statement-level errors
    /// are recorded and recovery continues inside the same block
    fn parse_block(&mut self) -> Result<Vec<Stmt>> {
        self.expect(TokenKind::LBrace)?;

        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            match self.parse_stmt() {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize_stmt();
                }
            }
        }

        self.expect(TokenKind::RBrace)?;
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.current_kind() {
            TokenKind::Let => self.parse_let(),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Loop => {
                self.advance();
                let body = self.parse_block()?;
                Ok(Stmt::Loop { body })
            }
            TokenKind::Break => {
                let line = self.current_line();
                self.advance();
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Break { line })
            }
            TokenKind::Continue => {
                let line = self.current_line();
                self.advance();
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Continue { line })
            }
            TokenKind::Return => {
                let line = self.current_line();
                self.advance();
                let value = if self.check(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Return { value, line })
            }
            TokenKind::MacroPrint => self.parse_println(),
            TokenKind::Ident if self.peek_kind_is_assign_op() => self.parse_assign(),
            _ => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn peek_kind_is_assign_op(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Equals
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
        )
    }

    fn parse_let(&mut self) -> Result<Stmt> {
        let line = self.current_line();
        self.expect(TokenKind::Let)?;
        let mutable = self.consume(TokenKind::Mut);
        let name = self.expect(TokenKind::Ident)?.raw_text;

        let ty = if self.consume(TokenKind::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };

        let value = if self.consume(TokenKind::Equals) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Let {
            name,
            mutable,
            ty,
            value,
            line,
        })
    }

    fn parse_assign(&mut self) -> Result<Stmt> {
        let line = self.current_line();
        let name = self.expect(TokenKind::Ident)?.raw_text;

        let op = match self.advance().kind {
            TokenKind::Equals => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::AddAssign,
            TokenKind::MinusEq => AssignOp::SubAssign,
            TokenKind::StarEq => AssignOp::MulAssign,
            TokenKind::SlashEq => AssignOp::DivAssign,
            _ => unreachable!("caller checked for an assignment operator"),
        };

        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Assign {
            name,
            op,
            value,
            line,
        })
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::If)?;
        let cond = self.parse_condition()?;
        let then_body = self.parse_block()?;

        let else_body = if self.consume(TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Stmt::If {
            cond,
            then_body,
            else_body,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::While)?;
        let cond = self.parse_condition()?;
        let body = self.parse_block()?;
        Ok(Stmt::While { cond, body })
    }

    fn parse_for(&mut self) -> Result<Stmt> {
        self.expect(TokenKind::For)?;
        let var = self.expect(TokenKind::Ident)?.raw_text;
        self.expect(TokenKind::In)?;
        let iter = self.parse_condition()?;
        let body = self.parse_block()?;
        Ok(Stmt::For { var, iter, body })
    }

    fn parse_println(&mut self) -> Result<Stmt> {
        let line = self.current_line();
        self.expect(TokenKind::MacroPrint)?;
        self.expect(TokenKind::LParen)?;

        let fmt_token = self.expect(TokenKind::Str)?;
        let format = match fmt_token.literal {
            Some(TokenValue::Str(s)) => s,
            _ => fmt_token.raw_text,
        };

        let mut args = Vec::new();
        while self.consume(TokenKind::Comma) {
            args.push(self.parse_expr()?);
        }

        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::Println { format, args, line })
    }

    /// Parse a condition or iterable: struct-init is suppressed so the
    /// following `{` opens the body block
    fn parse_condition(&mut self) -> Result<Expr> {
        self.with_struct_init(false, |p| p.parse_expr())
    }

    // ==================== Expressions ====================

    fn parse_expr(&mut self) -> Result<Expr> {
        self.parse_expr_bp(0)
    }

    /// Parse an expression with a minimum binding power. All binary
    /// operators are left-associative.
    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let op_kind = self.current_kind();
            let Some(bp) = op_kind.binary_binding_power() else {
                break;
            };
            if bp < min_bp {
                break;
            }

            self.advance();
            let right = self.parse_expr_bp(bp + 1)?;
            let line = left.line();

            left = match op_kind {
                TokenKind::Plus => Self::binary(left, ArithOp::Add, right, line),
                TokenKind::Minus => Self::binary(left, ArithOp::Sub, right, line),
                TokenKind::Star => Self::binary(left, ArithOp::Mul, right, line),
                TokenKind::Slash => Self::binary(left, ArithOp::Div, right, line),
                TokenKind::Percent => Self::binary(left, ArithOp::Mod, right, line),
                TokenKind::EqEq => Self::comparison(left, CmpOp::Eq, right, line),
                TokenKind::NotEq => Self::comparison(left, CmpOp::Ne, right, line),
                TokenKind::Lt => Self::comparison(left, CmpOp::Lt, right, line),
                TokenKind::Le => Self::comparison(left, CmpOp::Le, right, line),
                TokenKind::Gt => Self::comparison(left, CmpOp::Gt, right, line),
                TokenKind::Ge => Self::comparison(left, CmpOp::Ge, right, line),
                TokenKind::AndAnd => Expr::And {
                    left: Box::new(left),
                    right: Box::new(right),
                    line,
                },
                TokenKind::OrOr => Expr::Or {
                    left: Box::new(left),
                    right: Box::new(right),
                    line,
                },
                TokenKind::DotDot => Expr::Range {
                    start: Box::new(left),
                    end: Box::new(right),
                    line,
                },
                _ => unreachable!("binary_binding_power covered the operator set"),
            };
        }

        Ok(left)
    }

    fn binary(left: Expr, op: ArithOp, right: Expr, line: u32) -> Expr {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
            line,
        }
    }

    fn comparison(left: Expr, op: CmpOp, right: Expr, line: u32) -> Expr {
        Expr::Comparison {
            left: Box::new(left),
            op,
            right: Box::new(right),
            line,
        }
    }

    /// Prefix `!` binds tighter than every binary operator
    fn parse_unary(&mut self) -> Result<Expr> {
        if self.check(TokenKind::Not) {
            let line = self.current_line();
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Not {
                operand: Box::new(operand),
                line,
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        let token = self.current().clone();
        let line = token.line;

        match token.kind {
            TokenKind::Number => {
                self.advance();
                match token.literal {
                    Some(TokenValue::Int(v)) => Ok(Expr::Literal {
                        value: Literal::Int(v),
                        line,
                    }),
                    _ => Err(self.unexpected()),
                }
            }
            TokenKind::Float => {
                self.advance();
                match token.literal {
                    Some(TokenValue::Float(v)) => Ok(Expr::Literal {
                        value: Literal::Float(v),
                        line,
                    }),
                    _ => Err(self.unexpected()),
                }
            }
            TokenKind::Str => {
                self.advance();
                match token.literal {
                    Some(TokenValue::Str(s)) => Ok(Expr::Literal {
                        value: Literal::Str(s),
                        line,
                    }),
                    _ => Err(self.unexpected()),
                }
            }
            TokenKind::CharLit => {
                self.advance();
                match token.literal {
                    Some(TokenValue::Char(c)) => Ok(Expr::Literal {
                        value: Literal::Char(c),
                        line,
                    }),
                    _ => Err(self.unexpected()),
                }
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal {
                    value: Literal::Bool(true),
                    line,
                })
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal {
                    value: Literal::Bool(false),
                    line,
                })
            }
            TokenKind::Ident => {
                self.advance();
                if self.allow_struct_init && self.check(TokenKind::LBrace) {
                    self.advance();
                    self.expect(TokenKind::RBrace)?;
                    return Ok(Expr::StructInit {
                        name: token.raw_text,
                        line,
                    });
                }
                Ok(Expr::Ident {
                    name: token.raw_text,
                    line,
                })
            }
            TokenKind::LParen => self.parse_paren_or_tuple(line),
            TokenKind::LBracket => {
                self.advance();
                let elements = self.parse_expr_list(TokenKind::RBracket)?;
                self.expect(TokenKind::RBracket)?;
                Ok(Expr::Array { elements, line })
            }
            TokenKind::MacroVec => {
                self.advance();
                self.expect(TokenKind::LBracket)?;
                let elements = self.parse_expr_list(TokenKind::RBracket)?;
                self.expect(TokenKind::RBracket)?;
                Ok(Expr::Vec { elements, line })
            }
            TokenKind::Input => {
                self.advance();
                self.expect(TokenKind::LParen)?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::Input { line })
            }
            _ => Err(self.unexpected()),
        }
    }

    /// `(expr)` bypasses precedence; `()`, `(a,)` and `(a, b, ...)` are
    /// tuple literals. The one-element tuple needs its trailing comma to
    /// stay distinguishable from a parenthesized expression.
    fn parse_paren_or_tuple(&mut self, line: u32) -> Result<Expr> {
        self.expect(TokenKind::LParen)?;

        self.with_struct_init(true, |p| {
            if p.consume(TokenKind::RParen) {
                return Ok(Expr::Tuple {
                    elements: Vec::new(),
                    line,
                });
            }

            let first = p.parse_expr()?;
            if p.consume(TokenKind::Comma) {
                let mut elements = vec![first];
                while !p.check(TokenKind::RParen) && !p.is_at_end() {
                    elements.push(p.parse_expr()?);
                    if !p.consume(TokenKind::Comma) {
                        break;
                    }
                }
                p.expect(TokenKind::RParen)?;
                return Ok(Expr::Tuple { elements, line });
            }

            p.expect(TokenKind::RParen)?;
            Ok(first)
        })
    }

    /// Comma-separated expressions up to (not including) `close`
    fn parse_expr_list(&mut self, close: TokenKind) -> Result<Vec<Expr>> {
        self.with_struct_init(true, |p| {
            let mut elements = Vec::new();
            while !p.check(close) && !p.is_at_end() {
                elements.push(p.parse_expr()?);
                if !p.consume(TokenKind::Comma) {
                    break;
                }
            }
            Ok(elements)
        })
    }
}
