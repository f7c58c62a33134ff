//! Conditions accepted by control nodes, and operands of `Let`/`Emit`.

use std::fmt;
use std::sync::Arc;

use crate::cond::Cond;
use crate::context::{EvalContext, Value};
use crate::error::EvalResult;
use crate::expr::Expr;

type PredicateFn = dyn Fn(&dyn EvalContext) -> EvalResult<Value> + Send + Sync;

/// An opaque function over the runtime context.
///
/// Predicates can be evaluated by the interpreter but carry no structure,
/// so they cannot be lowered or serialized. Equality is pointer identity.
#[derive(Clone)]
pub struct Predicate {
    func: Arc<PredicateFn>,
    label: Option<String>,
}

impl Predicate {
    /// Wrap a function returning a value.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&dyn EvalContext) -> EvalResult<Value> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            label: None,
        }
    }

    /// Wrap an infallible boolean function.
    pub fn from_fn<F>(func: F) -> Self
    where
        F: Fn(&dyn EvalContext) -> bool + Send + Sync + 'static,
    {
        Self::new(move |ctx| Ok(Value::Bool(func(ctx))))
    }

    /// Attach a label used in diagnostics.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Invoke the predicate.
    pub fn call(&self, ctx: &dyn EvalContext) -> EvalResult<Value> {
        (self.func)(ctx)
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "<predicate {label}>"),
            None => write!(f, "<predicate>"),
        }
    }
}

/// Condition of an `If`, `While`, or `DoWhile` node.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Structured condition; lowerable and serializable.
    Structured(Cond),
    /// Expression condition; coerced to a bit.
    Expr(Expr),
    /// Opaque predicate; interpreter only.
    Predicate(Predicate),
}

impl Condition {
    /// Evaluate to a bit.
    pub fn eval<C: EvalContext>(&self, ctx: &C) -> EvalResult<bool> {
        match self {
            Condition::Structured(c) => c.eval(ctx),
            Condition::Expr(e) => e.eval_bool(ctx),
            Condition::Predicate(p) => p.call(ctx).map(Value::truthy),
        }
    }

    /// The structured condition, if this is one.
    pub fn as_structured(&self) -> Option<&Cond> {
        match self {
            Condition::Structured(c) => Some(c),
            _ => None,
        }
    }

    /// Name of the condition kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Condition::Structured(c) => c.kind(),
            Condition::Expr(_) => "Expr",
            Condition::Predicate(_) => "Predicate",
        }
    }
}

impl From<Cond> for Condition {
    fn from(c: Cond) -> Self {
        Condition::Structured(c)
    }
}

impl From<Expr> for Condition {
    fn from(e: Expr) -> Self {
        Condition::Expr(e)
    }
}

impl From<Predicate> for Condition {
    fn from(p: Predicate) -> Self {
        Condition::Predicate(p)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Structured(c) => write!(f, "{c}"),
            Condition::Expr(e) => write!(f, "{e}"),
            Condition::Predicate(p) => write!(f, "{p}"),
        }
    }
}

/// Right-hand side of a `Let` or `Emit` node.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Expr(Expr),
    Predicate(Predicate),
}

impl Operand {
    /// Evaluate to a value.
    pub fn eval<C: EvalContext>(&self, ctx: &C) -> EvalResult<Value> {
        match self {
            Operand::Expr(e) => e.eval(ctx),
            Operand::Predicate(p) => p.call(ctx),
        }
    }
}

impl From<Expr> for Operand {
    fn from(e: Expr) -> Self {
        Operand::Expr(e)
    }
}

impl From<Predicate> for Operand {
    fn from(p: Predicate) -> Self {
        Operand::Predicate(p)
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Expr(Expr::Literal(v))
    }
}

impl From<bool> for Operand {
    fn from(b: bool) -> Self {
        Operand::Expr(Expr::from(b))
    }
}

impl From<i64> for Operand {
    fn from(i: i64) -> Self {
        Operand::Expr(Expr::from(i))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Expr(e) => write!(f, "{e}"),
            Operand::Predicate(p) => write!(f, "{p}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ClassicalState;

    #[test]
    fn test_predicate_sees_context() {
        let p = Predicate::from_fn(|ctx| ctx.measurements().len() == 2);
        let cond = Condition::from(p);
        let mut s = ClassicalState::new();
        assert_eq!(cond.eval(&s), Ok(false));
        s.record_block(&[false, false], false);
        assert_eq!(cond.eval(&s), Ok(true));
        assert_eq!(cond.kind(), "Predicate");
        assert!(cond.as_structured().is_none());
    }

    #[test]
    fn test_predicate_equality_is_identity() {
        let p = Predicate::from_fn(|_| true);
        let q = Predicate::from_fn(|_| true);
        assert_eq!(p, p.clone());
        assert_ne!(p, q);
    }

    #[test]
    fn test_expr_condition_truthiness() {
        let mut s = ClassicalState::new();
        s.bind("n", Value::Int(2));
        let cond = Condition::from(Expr::var("n"));
        assert_eq!(cond.eval(&s), Ok(true));
        assert_eq!(cond.kind(), "Expr");
    }
}
