//! Semantic analysis for the Rust subset.
//!
//! A single walk over the syntax tree checks declarations, mutability
//! and type agreement. The walk never stops on an error: each finding
//! is appended to an ordered diagnostic list and checking continues.
//!
//! Unresolvable types (`Unknown`, `Undeclared`) are excluded from
//! mismatch checks so one faulty declaration does not cascade into a
//! chain of follow-up diagnostics.

use crate::frontend::ast::*;
use crate::types::Ty;
use crate::utils::SemanticError;
use std::collections::HashMap;

/// Run semantic analysis over a program. Each call builds a fresh
/// analyzer, so analyzing the same tree twice yields the same list.
pub fn analyze(program: &Program) -> Vec<SemanticError> {
    let mut analyzer = SemanticAnalyzer::new();
    analyzer.check_program(program);
    analyzer.errors
}

/// A declared symbol
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub ty: Ty,
    pub mutable: bool,
    pub depth: usize,
    pub declared_at_line: u32,
}

/// One lexical scope; `parent` indexes into the scope arena
#[derive(Debug)]
struct Scope {
    parent: Option<usize>,
    depth: usize,
    symbols: HashMap<String, Symbol>,
}

/// Arena of scopes forming a parent-linked tree. Scopes are pushed and
/// never removed; leaving a scope only moves the cursor back to the
/// parent.
#[derive(Debug)]
struct ScopeStack {
    scopes: Vec<Scope>,
    current: usize,
}

impl ScopeStack {
    fn new() -> Self {
        Self {
            scopes: vec![Scope {
                parent: None,
                depth: 0,
                symbols: HashMap::new(),
            }],
            current: 0,
        }
    }

    fn enter(&mut self) {
        let depth = self.scopes[self.current].depth + 1;
        self.scopes.push(Scope {
            parent: Some(self.current),
            depth,
            symbols: HashMap::new(),
        });
        self.current = self.scopes.len() - 1;
    }

    fn depth(&self) -> usize {
        self.scopes[self.current].depth
    }

    fn exit(&mut self) {
        if let Some(parent) = self.scopes[self.current].parent {
            self.current = parent;
        }
    }

    /// Declare a symbol in the current scope. Redeclaring a name shadows
    /// the previous symbol.
    fn define(&mut self, symbol: Symbol) {
        self.scopes[self.current]
            .symbols
            .insert(symbol.name.clone(), symbol);
    }

    /// Resolve a name through the parent chain
    fn lookup(&self, name: &str) -> Option<&Symbol> {
        let mut index = Some(self.current);
        while let Some(i) = index {
            if let Some(symbol) = self.scopes[i].symbols.get(name) {
                return Some(symbol);
            }
            index = self.scopes[i].parent;
        }
        None
    }
}

/// Tree-walking analyzer. One instance per `analyze` call.
struct SemanticAnalyzer {
    scopes: ScopeStack,
    errors: Vec<SemanticError>,
    in_function: bool,
    in_loop: bool,
}

impl SemanticAnalyzer {
    fn new() -> Self {
        Self {
            scopes: ScopeStack::new(),
            errors: Vec::new(),
            in_function: false,
            in_loop: false,
        }
    }

    fn check_program(&mut self, program: &Program) {
        for item in &program.items {
            self.check_item(item);
        }
    }

    fn check_item(&mut self, item: &Item) {
        match item {
            Item::Function(f) => self.check_function(f),
            Item::Impl(block) => {
                for method in &block.methods {
                    self.check_function(method);
                }
            }
            Item::Const(c) => {
                let found = self.check_expr(&c.value);
                if !found.is_unresolved() && found != c.ty {
                    self.errors.push(SemanticError::TypeMismatch {
                        name: c.name.clone(),
                        expected: c.ty.clone(),
                        found,
                        line: c.line,
                    });
                    return;
                }
                self.scopes.define(Symbol {
                    name: c.name.clone(),
                    ty: c.ty.clone(),
                    mutable: false,
                    depth: self.scopes.depth(),
                    declared_at_line: c.line,
                });
            }
            Item::Static(s) => {
                let found = self.check_expr(&s.value);
                if !found.is_unresolved() && found != s.ty {
                    self.errors.push(SemanticError::TypeMismatch {
                        name: s.name.clone(),
                        expected: s.ty.clone(),
                        found,
                        line: s.line,
                    });
                    return;
                }
                self.scopes.define(Symbol {
                    name: s.name.clone(),
                    ty: s.ty.clone(),
                    mutable: s.mutable,
                    depth: self.scopes.depth(),
                    declared_at_line: s.line,
                });
            }
            // type declarations carry no checked code
            Item::Struct(_) | Item::Enum(_) | Item::Trait(_) => {}
        }
    }

    fn check_function(&mut self, f: &Function) {
        let was_in_function = self.in_function;
        let was_in_loop = self.in_loop;
        self.in_function = true;
        self.in_loop = false;

        self.scopes.enter();
        for param in &f.params {
            if let Param::Named { name, ty } = param {
                self.scopes.define(Symbol {
                    name: name.clone(),
                    ty: ty.clone(),
                    mutable: false,
                    depth: self.scopes.depth(),
                    declared_at_line: f.line,
                });
            }
        }
        self.check_body(&f.body);
        self.scopes.exit();

        self.in_function = was_in_function;
        self.in_loop = was_in_loop;
    }

    fn check_body(&mut self, body: &[Stmt]) {
        for stmt in body {
            self.check_stmt(stmt);
        }
    }

    /// Check statements in their own scope
    fn check_block(&mut self, body: &[Stmt]) {
        self.scopes.enter();
        self.check_body(body);
        self.scopes.exit();
    }

    fn check_loop_body(&mut self, body: &[Stmt]) {
        let was_in_loop = self.in_loop;
        self.in_loop = true;
        self.check_block(body);
        self.in_loop = was_in_loop;
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let {
                name,
                mutable,
                ty,
                value,
                line,
            } => self.check_let(name, *mutable, ty, value, *line),

            Stmt::Assign {
                name,
                op,
                value,
                line,
            } => self.check_assign(name, *op, value, *line),

            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                self.check_expr(cond);
                self.check_block(then_body);
                if let Some(else_body) = else_body {
                    self.check_block(else_body);
                }
            }

            Stmt::While { cond, body } => {
                self.check_expr(cond);
                self.check_loop_body(body);
            }

            Stmt::For { var, iter, body } => {
                let var_ty = self.loop_variable_type(iter);
                let was_in_loop = self.in_loop;
                self.in_loop = true;
                self.scopes.enter();
                self.scopes.define(Symbol {
                    name: var.clone(),
                    ty: var_ty,
                    mutable: false,
                    depth: self.scopes.depth(),
                    declared_at_line: iter.line(),
                });
                self.check_body(body);
                self.scopes.exit();
                self.in_loop = was_in_loop;
            }

            Stmt::Loop { body } => self.check_loop_body(body),

            Stmt::Break { line } => {
                if !self.in_loop {
                    self.errors
                        .push(SemanticError::BreakOutsideLoop { line: *line });
                }
            }

            Stmt::Continue { line } => {
                if !self.in_loop {
                    self.errors
                        .push(SemanticError::ContinueOutsideLoop { line: *line });
                }
            }

            Stmt::Return { value, line } => {
                if !self.in_function {
                    self.errors
                        .push(SemanticError::ReturnOutsideFunction { line: *line });
                }
                if let Some(value) = value {
                    self.check_expr(value);
                }
            }

            Stmt::Println { args, .. } => {
                for arg in args {
                    self.check_expr(arg);
                }
            }

            Stmt::Expr(expr) => {
                self.check_expr(expr);
            }
        }
    }

    fn check_let(
        &mut self,
        name: &str,
        mutable: bool,
        declared: &Option<Ty>,
        value: &Option<Expr>,
        line: u32,
    ) {
        let inferred = value.as_ref().map(|v| self.check_expr(v));

        if let (Some(declared), Some(inferred)) = (declared, &inferred) {
            if !inferred.is_unresolved() && declared != inferred {
                self.errors.push(SemanticError::TypeMismatch {
                    name: name.to_string(),
                    expected: declared.clone(),
                    found: inferred.clone(),
                    line,
                });
                // a symbol with a contradictory type would only mislead
                // later checks
                return;
            }
        }

        let ty = declared
            .clone()
            .or(inferred)
            .unwrap_or(Ty::Unknown);
        self.scopes.define(Symbol {
            name: name.to_string(),
            ty,
            mutable,
            depth: self.scopes.depth(),
            declared_at_line: line,
        });
    }

    fn check_assign(&mut self, name: &str, op: AssignOp, value: &Expr, line: u32) {
        let Some(symbol) = self.scopes.lookup(name) else {
            self.errors.push(SemanticError::UndeclaredVariable {
                name: name.to_string(),
                line,
            });
            return;
        };
        let expected = symbol.ty.clone();
        let mutable = symbol.mutable;

        // mutability is decided before the value is even looked at, so
        // an immutable target yields exactly one diagnostic
        if !mutable {
            self.errors.push(SemanticError::AssignToImmutable {
                name: name.to_string(),
                line,
            });
            return;
        }

        if op != AssignOp::Assign && !expected.is_unresolved() && !expected.is_numeric() {
            self.errors.push(SemanticError::NonNumericOperand {
                op: op.to_string(),
                ty: expected.clone(),
                line,
            });
            return;
        }

        let found = self.check_expr(value);
        if !expected.is_unresolved() && !found.is_unresolved() && expected != found {
            self.errors.push(SemanticError::AssignTypeMismatch {
                name: name.to_string(),
                expected,
                found,
                line,
            });
        }
    }

    /// Element type the `for` variable takes from its iterable
    fn loop_variable_type(&mut self, iter: &Expr) -> Ty {
        let iter_ty = self.check_expr(iter);
        match iter_ty {
            ty if ty.is_numeric() => ty,
            Ty::Vec(elem) => *elem,
            Ty::Array(elem, _) => *elem,
            _ => Ty::I32,
        }
    }

    /// Check an expression and infer its type. Diagnostics are recorded
    /// as a side effect; the returned type is the best available guess.
    fn check_expr(&mut self, expr: &Expr) -> Ty {
        match expr {
            Expr::Literal { value, .. } => match value {
                Literal::Int(_) => Ty::I32,
                Literal::Float(_) => Ty::F64,
                Literal::Str(_) => Ty::Str,
                Literal::Char(_) => Ty::Char,
                Literal::Bool(_) => Ty::Bool,
            },

            Expr::Ident { name, line } => match self.scopes.lookup(name) {
                Some(symbol) => symbol.ty.clone(),
                None => {
                    self.errors.push(SemanticError::UndeclaredVariable {
                        name: name.clone(),
                        line: *line,
                    });
                    Ty::Undeclared
                }
            },

            Expr::Binary {
                left,
                op,
                right,
                line,
            } => self.check_arithmetic(left, *op, right, *line),

            Expr::Comparison {
                left,
                op,
                right,
                line,
            } => {
                let l = self.check_expr(left);
                let r = self.check_expr(right);
                if !l.is_unresolved() && !r.is_unresolved() && l != r {
                    self.errors.push(SemanticError::OperandTypeMismatch {
                        op: op.to_string(),
                        left: l,
                        right: r,
                        line: *line,
                    });
                }
                Ty::Bool
            }

            Expr::And { left, right, line } => {
                self.check_boolean_operand("&&", left, *line);
                self.check_boolean_operand("&&", right, *line);
                Ty::Bool
            }

            Expr::Or { left, right, line } => {
                self.check_boolean_operand("||", left, *line);
                self.check_boolean_operand("||", right, *line);
                Ty::Bool
            }

            Expr::Not { operand, line } => {
                self.check_boolean_operand("!", operand, *line);
                Ty::Bool
            }

            Expr::Range { start, end, line } => {
                let s = self.check_range_bound(start, *line);
                let e = self.check_range_bound(end, *line);
                match (s, e) {
                    (Some(s), Some(e)) if s == e => s,
                    (Some(s), None) => s,
                    (None, Some(e)) => e,
                    _ => Ty::I32,
                }
            }

            Expr::StructInit { name, .. } => Ty::Named(name.clone()),

            Expr::Array { elements, .. } => {
                let mut elem_ty = Ty::Unknown;
                for (i, element) in elements.iter().enumerate() {
                    let ty = self.check_expr(element);
                    if i == 0 {
                        elem_ty = ty;
                    }
                }
                Ty::Array(Box::new(elem_ty), elements.len())
            }

            Expr::Tuple { elements, .. } => {
                let tys: Vec<Ty> = elements.iter().map(|e| self.check_expr(e)).collect();
                if tys.is_empty() {
                    Ty::Unit
                } else {
                    Ty::Tuple(tys)
                }
            }

            Expr::Vec { elements, .. } => {
                let mut elem_ty = Ty::Unknown;
                for (i, element) in elements.iter().enumerate() {
                    let ty = self.check_expr(element);
                    if i == 0 {
                        elem_ty = ty;
                    }
                }
                Ty::Vec(Box::new(elem_ty))
            }

            Expr::Input { .. } => Ty::String,
        }
    }

    fn check_arithmetic(&mut self, left: &Expr, op: ArithOp, right: &Expr, line: u32) -> Ty {
        let l = self.check_expr(left);
        let r = self.check_expr(right);

        let mut ok = true;
        if !l.is_unresolved() && !l.is_numeric() {
            self.errors.push(SemanticError::NonNumericOperand {
                op: op.to_string(),
                ty: l.clone(),
                line,
            });
            ok = false;
        }
        if !r.is_unresolved() && !r.is_numeric() {
            self.errors.push(SemanticError::NonNumericOperand {
                op: op.to_string(),
                ty: r.clone(),
                line,
            });
            ok = false;
        }

        if ok && !l.is_unresolved() && !r.is_unresolved() && l != r {
            self.errors.push(SemanticError::OperandTypeMismatch {
                op: op.to_string(),
                left: l.clone(),
                right: r,
                line,
            });
            return l;
        }

        if l.is_numeric() {
            l
        } else if r.is_numeric() {
            r
        } else {
            Ty::Unknown
        }
    }

    fn check_boolean_operand(&mut self, op: &str, operand: &Expr, line: u32) {
        let ty = self.check_expr(operand);
        if !ty.is_unresolved() && ty != Ty::Bool {
            self.errors.push(SemanticError::NonBooleanOperand {
                op: op.to_string(),
                ty,
                line,
            });
        }
    }

    fn check_range_bound(&mut self, bound: &Expr, line: u32) -> Option<Ty> {
        let ty = self.check_expr(bound);
        if ty.is_unresolved() {
            return None;
        }
        if !ty.is_numeric() {
            self.errors
                .push(SemanticError::NonNumericRangeBound { ty, line });
            return None;
        }
        Some(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::parse;

    fn check(source: &str) -> Vec<SemanticError> {
        let (program, errors) = parse(source);
        assert!(errors.is_empty(), "syntax errors in test input: {:?}", errors);
        analyze(&program.expect("test input should parse"))
    }

    #[test]
    fn test_valid_program_is_clean() {
        let errors = check(
            "fn main() {\n\
             \tlet mut total = 0;\n\
             \tfor i in 0..10 {\n\
             \t\ttotal += i;\n\
             \t}\n\
             \tprintln!(\"{}\", total);\n\
             }",
        );
        assert!(errors.is_empty(), "unexpected diagnostics: {:?}", errors);
    }

    #[test]
    fn test_assign_to_immutable_reports_once() {
        let errors = check("fn main() {\n\tlet x = 5;\n\tx = 6;\n}");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            SemanticError::AssignToImmutable {
                name: "x".to_string(),
                line: 3
            }
        );
        assert_eq!(
            errors[0].to_string(),
            "line 3: cannot assign to immutable variable `x`"
        );
    }

    #[test]
    fn test_declared_type_mismatch_does_not_cascade() {
        // the bad binding reports once; the later use of `x` resolves to
        // nothing but stays silent in the mismatch check
        let errors = check("fn main() {\n\tlet x: i32 = \"hello\";\n\tlet y = x;\n}");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            SemanticError::TypeMismatch { name, expected: Ty::I32, found: Ty::Str, line: 2 }
                if name == "x"
        ));
    }

    #[test]
    fn test_undeclared_variable() {
        let errors = check("fn main() { let y = missing + 1; }");
        assert_eq!(
            errors,
            vec![SemanticError::UndeclaredVariable {
                name: "missing".to_string(),
                line: 1
            }]
        );
    }

    #[test]
    fn test_assignment_to_undeclared() {
        let errors = check("fn main() { ghost = 1; }");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            SemanticError::UndeclaredVariable { name, .. } if name == "ghost"
        ));
    }

    #[test]
    fn test_reassignment_type_mismatch() {
        let errors = check("fn main() {\n\tlet mut x = 1;\n\tx = 2.5;\n}");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            SemanticError::AssignTypeMismatch { expected: Ty::I32, found: Ty::F64, .. }
        ));
    }

    #[test]
    fn test_mixed_arithmetic_is_a_mismatch() {
        let errors = check("fn main() { let x = 1 + 2.5; }");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            SemanticError::OperandTypeMismatch { left: Ty::I32, right: Ty::F64, .. }
        ));
    }

    #[test]
    fn test_arithmetic_needs_numbers() {
        let errors = check("fn main() { let x = \"a\" + 1; }");
        assert!(errors
            .iter()
            .any(|e| matches!(e, SemanticError::NonNumericOperand { ty: Ty::Str, .. })));
    }

    #[test]
    fn test_logic_needs_booleans() {
        let errors = check("fn main() { let x = 1 && true; }");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            SemanticError::NonBooleanOperand { ty: Ty::I32, .. }
        ));
    }

    #[test]
    fn test_comparison_yields_bool() {
        let errors = check("fn main() { let ok = 1 < 2 && 3 >= 3; }");
        assert!(errors.is_empty(), "unexpected diagnostics: {:?}", errors);
    }

    #[test]
    fn test_range_bounds_must_be_numeric() {
        let errors = check("fn main() { for c in 'a'..'z' {} }");
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            &errors[0],
            SemanticError::NonNumericRangeBound { ty: Ty::Char, .. }
        ));
    }

    #[test]
    fn test_break_outside_loop() {
        let errors = check("fn main() { break; }");
        assert_eq!(errors, vec![SemanticError::BreakOutsideLoop { line: 1 }]);
    }

    #[test]
    fn test_continue_inside_loop_is_fine() {
        let errors = check("fn main() { loop { continue; break; } }");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_loop_flag_does_not_leak_into_nested_fn_items() {
        // `if` bodies inside a loop are still in the loop
        let errors = check("fn main() { while true { if true { break; } } }");
        assert!(errors.is_empty(), "unexpected diagnostics: {:?}", errors);
    }

    #[test]
    fn test_block_scope_hides_inner_bindings() {
        let errors = check(
            "fn main() {\n\
             \tif true {\n\
             \t\tlet inner = 1;\n\
             \t}\n\
             \tinner = 2;\n\
             }",
        );
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            SemanticError::UndeclaredVariable { name, line: 5 } if name == "inner"
        ));
    }

    #[test]
    fn test_shadowing_is_allowed() {
        let errors = check("fn main() {\n\tlet x = 1;\n\tlet x = \"text\";\n\tlet y = x;\n}");
        assert!(errors.is_empty(), "unexpected diagnostics: {:?}", errors);
    }

    #[test]
    fn test_params_are_immutable() {
        let errors = check("fn set(value: i32) { value = 3; }");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            SemanticError::AssignToImmutable { name, .. } if name == "value"
        ));
    }

    #[test]
    fn test_for_variable_takes_the_bound_type() {
        let errors = check("fn main() { for i in 0..5 { let x: i32 = i; } }");
        assert!(errors.is_empty(), "unexpected diagnostics: {:?}", errors);
    }

    #[test]
    fn test_for_variable_is_scoped_to_the_loop() {
        let errors = check("fn main() { for i in 0..5 {} let y = i; }");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            SemanticError::UndeclaredVariable { name, .. } if name == "i"
        ));
    }

    #[test]
    fn test_return_inside_function_is_fine() {
        let errors = check("fn main() { return; }");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_const_and_static_are_global() {
        let errors = check(
            "const MAX: i32 = 100;\n\
             static mut COUNT: i32 = 0;\n\
             fn main() {\n\
             \tlet limit = MAX;\n\
             \tCOUNT = limit;\n\
             \tMAX = 1;\n\
             }",
        );
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            SemanticError::AssignToImmutable { name, .. } if name == "MAX"
        ));
    }

    #[test]
    fn test_const_value_must_match_annotation() {
        let errors = check("const PI: f64 = 3;");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            SemanticError::TypeMismatch { expected: Ty::F64, found: Ty::I32, .. }
        ));
    }

    #[test]
    fn test_vec_and_input_inference() {
        let errors = check(
            "fn main() {\n\
             \tlet v = vec![1, 2, 3];\n\
             \tfor n in v {\n\
             \t\tlet m: i32 = n;\n\
             \t}\n\
             \tlet s: String = input();\n\
             }",
        );
        assert!(errors.is_empty(), "unexpected diagnostics: {:?}", errors);
    }

    #[test]
    fn test_compound_assign_needs_numeric_target() {
        let errors = check("fn main() {\n\tlet mut s = \"a\";\n\ts += \"b\";\n}");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            SemanticError::NonNumericOperand { ty: Ty::Str, .. }
        ));
    }

    #[test]
    fn test_analysis_is_repeatable() {
        let (program, _) = parse("fn main() { let x = 5; x = 6; }");
        let program = program.unwrap();
        let first = analyze(&program);
        let second = analyze(&program);
        assert_eq!(first, second);
    }
}
