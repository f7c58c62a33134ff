//! Error types for the interpreter.

use qflow_ir::EvalError;
use qflow_sim::SimError;
use thiserror::Error;

/// Errors that abort a shot.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ExecError {
    /// Condition or expression evaluation failed.
    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),

    /// A loop tried to run its body more often than allowed.
    #[error("{kind} loop exceeded max_iterations={max_iterations}")]
    IterationBudgetExceeded {
        /// `While` or `DoWhile`.
        kind: &'static str,
        /// The configured budget.
        max_iterations: u32,
    },

    /// The simulator rejected a block.
    #[error("Simulator error: {0}")]
    Simulator(#[from] SimError),
}

/// Result type for interpreter operations.
pub type ExecResult<T> = Result<T, ExecError>;
