//! Expression evaluation against a constant environment.
//!
//! Evaluation never stops at the first problem: both sides of every
//! binary operation are evaluated so one pass reports every undefined
//! name in an expression. Division by zero is warning-grade and yields
//! the IEEE-754 result (±infinity, or NaN for `0/0`).

use std::collections::HashMap;

use lsys_graphics::types::Scalar;

use crate::ast::{BinOp, Expr, ExprKind};
use crate::error::{CompilerError, ErrorKind};

/// Resolved constants: name → value.
pub type Environment = HashMap<String, Scalar>;

/// A successfully evaluated expression and any warnings raised on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluated {
    pub value: Scalar,
    pub warnings: Vec<CompilerError>,
}

/// Evaluate `expr` against `env`.
///
/// # Errors
///
/// Returns every error-grade diagnostic found in the expression
/// (currently only [`ErrorKind::UndefinedVariable`]).
pub fn evaluate(expr: &Expr, env: &Environment) -> Result<Evaluated, Vec<CompilerError>> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    match eval_node(expr, env, &mut errors, &mut warnings) {
        Some(value) if errors.is_empty() => Ok(Evaluated { value, warnings }),
        _ => Err(errors),
    }
}

fn eval_node(
    expr: &Expr,
    env: &Environment,
    errors: &mut Vec<CompilerError>,
    warnings: &mut Vec<CompilerError>,
) -> Option<Scalar> {
    match &expr.kind {
        ExprKind::Number(n) => Some(*n),
        ExprKind::Variable(name) => {
            let value = env.get(name).copied();
            if value.is_none() {
                errors.push(
                    CompilerError::new(
                        ErrorKind::UndefinedVariable,
                        format!("Variable '{name}' is not defined."),
                    )
                    .with_span(expr.span),
                );
            }
            value
        }
        ExprKind::Binop { op, lhs, rhs } => {
            let l = eval_node(lhs, env, errors, warnings);
            let r = eval_node(rhs, env, errors, warnings);
            let (l, r) = (l?, r?);
            Some(match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => {
                    if r == 0.0 {
                        warnings.push(
                            CompilerError::new(ErrorKind::DivisionByZero, "Division by zero.")
                                .with_span(expr.span),
                        );
                    }
                    l / r
                }
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Span;

    fn num(n: Scalar) -> Expr {
        Expr::number(n, Span::new(0, 1))
    }

    fn var(name: &str, at: usize) -> Expr {
        Expr::variable(name, Span::new(at, at + name.len()))
    }

    fn env(pairs: &[(&str, Scalar)]) -> Environment {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect()
    }

    #[test]
    fn literal() {
        let r = evaluate(&num(2.5), &Environment::new()).unwrap();
        assert!((r.value - 2.5).abs() < 1e-12);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn variable_lookup() {
        let r = evaluate(&var("angle1", 0), &env(&[("angle1", 45.0)])).unwrap();
        assert!((r.value - 45.0).abs() < 1e-12);
    }

    #[test]
    fn arithmetic() {
        let e = Expr::binop(
            BinOp::Sub,
            Expr::binop(BinOp::Mul, num(3.0), var("x", 4)),
            Expr::binop(BinOp::Div, num(8.0), num(2.0)),
        );
        let r = evaluate(&e, &env(&[("x", 5.0)])).unwrap();
        assert!((r.value - 11.0).abs() < 1e-12);
    }

    #[test]
    fn undefined_variable_carries_span() {
        let errs = evaluate(&var("nope", 7), &Environment::new()).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].kind, ErrorKind::UndefinedVariable);
        assert_eq!(errs[0].span, Span::new(7, 11));
        assert!(errs[0].message.contains("'nope'"));
    }

    #[test]
    fn errors_from_both_sides_are_collected() {
        let e = Expr::binop(BinOp::Add, var("a", 0), var("b", 4));
        let errs = evaluate(&e, &Environment::new()).unwrap_err();
        assert_eq!(errs.len(), 2);
        assert_eq!(errs[1].span, Span::new(4, 5));
    }

    #[test]
    fn division_by_zero_is_a_warning_with_ieee_result() {
        let e = Expr::binop(BinOp::Div, num(1.0), num(0.0));
        let r = evaluate(&e, &Environment::new()).unwrap();
        assert!(r.value.is_infinite() && r.value > 0.0);
        assert_eq!(r.warnings.len(), 1);
        assert_eq!(r.warnings[0].kind, ErrorKind::DivisionByZero);
        assert!(!r.warnings[0].is_error());
    }

    #[test]
    fn negative_division_by_zero() {
        let e = Expr::binop(BinOp::Div, num(-2.0), num(0.0));
        let r = evaluate(&e, &Environment::new()).unwrap();
        assert_eq!(r.value, Scalar::NEG_INFINITY);
    }
}
