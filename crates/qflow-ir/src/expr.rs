//! Classical expression trees.
//!
//! Expressions are built with plain constructor functions and evaluated
//! lazily against an [`EvalContext`]. Evaluation never mutates the context.
//!
//! ```rust
//! use qflow_ir::{ClassicalState, EvalContext, Expr, ExprBuilder, Value};
//!
//! let b = ExprBuilder::new();
//! let parity = Expr::xor(b.rec(-1), b.rec(-2));
//!
//! let mut state = ClassicalState::new();
//! state.record_block(&[true, false], false);
//! assert_eq!(parity.eval(&state).unwrap(), Value::Bool(true));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::{EvalContext, Value};
use crate::error::{EvalError, EvalResult};

/// A classical expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    /// Constant value.
    Literal(Value),
    /// Variable reference by name.
    Var(String),
    /// Measurement record reference, negative indices from the end.
    Rec(i64),
    /// Boolean exclusive or.
    Xor(Box<Expr>, Box<Expr>),
    /// Boolean and, short-circuiting.
    And(Box<Expr>, Box<Expr>),
    /// Boolean or, short-circuiting.
    Or(Box<Expr>, Box<Expr>),
    /// Boolean negation.
    Not(Box<Expr>),
    /// Checked integer addition.
    Add(Box<Expr>, Box<Expr>),
    /// Euclidean remainder.
    Mod(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn rec(index: i64) -> Self {
        Expr::Rec(index)
    }

    pub fn xor(lhs: Expr, rhs: Expr) -> Self {
        Expr::Xor(Box::new(lhs), Box::new(rhs))
    }

    pub fn and(lhs: Expr, rhs: Expr) -> Self {
        Expr::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Expr, rhs: Expr) -> Self {
        Expr::Or(Box::new(lhs), Box::new(rhs))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn add(lhs: Expr, rhs: Expr) -> Self {
        Expr::Add(Box::new(lhs), Box::new(rhs))
    }

    pub fn modulo(lhs: Expr, rhs: Expr) -> Self {
        Expr::Mod(Box::new(lhs), Box::new(rhs))
    }

    /// Evaluate against a context.
    pub fn eval<C: EvalContext + ?Sized>(&self, ctx: &C) -> EvalResult<Value> {
        let value = match self {
            Expr::Literal(v) => *v,
            Expr::Var(name) => ctx
                .variable(name)
                .ok_or_else(|| EvalError::MissingBinding(name.clone()))?,
            Expr::Rec(index) => Value::Bool(ctx.rec(*index)?),
            Expr::Xor(a, b) => Value::Bool(a.eval(ctx)?.truthy() ^ b.eval(ctx)?.truthy()),
            Expr::And(a, b) => Value::Bool(a.eval(ctx)?.truthy() && b.eval(ctx)?.truthy()),
            Expr::Or(a, b) => Value::Bool(a.eval(ctx)?.truthy() || b.eval(ctx)?.truthy()),
            Expr::Not(a) => Value::Bool(!a.eval(ctx)?.truthy()),
            Expr::Add(a, b) => {
                let sum = a
                    .eval(ctx)?
                    .as_int()
                    .checked_add(b.eval(ctx)?.as_int())
                    .ok_or(EvalError::Overflow("add"))?;
                Value::Int(sum)
            }
            Expr::Mod(a, b) => {
                let lhs = a.eval(ctx)?.as_int();
                let rhs = b.eval(ctx)?.as_int();
                if rhs == 0 {
                    return Err(EvalError::DivisionByZero);
                }
                Value::Int(lhs.checked_rem_euclid(rhs).ok_or(EvalError::Overflow("mod"))?)
            }
        };
        Ok(value)
    }

    /// Evaluate and coerce to a bit.
    pub fn eval_bool<C: EvalContext + ?Sized>(&self, ctx: &C) -> EvalResult<bool> {
        self.eval(ctx).map(Value::truthy)
    }
}

impl From<Value> for Expr {
    fn from(v: Value) -> Self {
        Expr::Literal(v)
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Expr::Literal(Value::Bool(b))
    }
}

impl From<i64> for Expr {
    fn from(i: i64) -> Self {
        Expr::Literal(Value::Int(i))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(v) => write!(f, "{v}"),
            Expr::Var(name) => write!(f, "vars[{name:?}]"),
            Expr::Rec(i) => write!(f, "rec({i})"),
            Expr::Xor(a, b) => write!(f, "({a} ^ {b})"),
            Expr::And(a, b) => write!(f, "({a} & {b})"),
            Expr::Or(a, b) => write!(f, "({a} | {b})"),
            Expr::Not(a) => write!(f, "~{a}"),
            Expr::Add(a, b) => write!(f, "({a} + {b})"),
            Expr::Mod(a, b) => write!(f, "({a} % {b})"),
        }
    }
}

/// Convenience constructor for record and variable references.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExprBuilder;

impl ExprBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Reference to measurement record bit `index`.
    pub fn rec(&self, index: i64) -> Expr {
        Expr::Rec(index)
    }

    /// Reference to a classical variable.
    pub fn var(&self, name: impl Into<String>) -> Expr {
        Expr::Var(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ClassicalState;

    fn ctx() -> ClassicalState {
        let mut s = ClassicalState::new();
        s.record_block(&[true, false, true], true);
        s.bind("n", Value::Int(7));
        s.bind("flag", Value::Bool(false));
        s
    }

    #[test]
    fn test_boolean_ops() {
        let s = ctx();
        assert_eq!(Expr::xor(Expr::rec(0), Expr::rec(-1)).eval(&s), Ok(Value::Bool(false)));
        assert_eq!(Expr::and(Expr::rec(0), Expr::rec(1)).eval(&s), Ok(Value::Bool(false)));
        assert_eq!(Expr::or(Expr::rec(1), Expr::var("n")).eval(&s), Ok(Value::Bool(true)));
        assert_eq!(Expr::not(Expr::var("flag")).eval(&s), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_short_circuit_skips_missing() {
        let s = ctx();
        let e = Expr::and(Expr::literal(false), Expr::var("missing"));
        assert_eq!(e.eval(&s), Ok(Value::Bool(false)));
        let e = Expr::or(Expr::literal(true), Expr::var("missing"));
        assert_eq!(e.eval(&s), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_arithmetic() {
        let s = ctx();
        let e = Expr::modulo(Expr::add(Expr::var("n"), Expr::rec(0)), Expr::literal(3_i64));
        assert_eq!(e.eval(&s), Ok(Value::Int(2)));
        let e = Expr::modulo(Expr::literal(-1_i64), Expr::literal(3_i64));
        assert_eq!(e.eval(&s), Ok(Value::Int(2)));
        let e = Expr::modulo(Expr::var("n"), Expr::literal(0_i64));
        assert_eq!(e.eval(&s), Err(EvalError::DivisionByZero));
        let e = Expr::add(Expr::literal(i64::MAX), Expr::literal(1_i64));
        assert_eq!(e.eval(&s), Err(EvalError::Overflow("add")));
    }

    #[test]
    fn test_missing_binding() {
        let s = ctx();
        assert_eq!(
            Expr::var("x").eval(&s),
            Err(EvalError::MissingBinding("x".into()))
        );
    }

    #[test]
    fn test_display() {
        let b = ExprBuilder::new();
        let e = Expr::xor(b.rec(-1), Expr::not(b.var("x")));
        assert_eq!(e.to_string(), "(rec(-1) ^ ~vars[\"x\"])");
    }
}
