//! Error types for the lowering pass.

use qflow_ir::EvalError;
use thiserror::Error;

/// Errors that can occur while lowering a circuit.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    /// A condition without inspectable structure was found.
    #[error(
        "Cannot lower {node} node with a {found} condition; use LastMeas or MeasParity instead"
    )]
    UnstructuredCondition {
        /// Kind of the node holding the condition.
        node: &'static str,
        /// Kind of the offending condition.
        found: &'static str,
    },

    /// Instruction with no dataflow counterpart.
    #[error("Unsupported instruction: {0}")]
    UnsupportedInstruction(String),

    /// A condition index does not resolve against the lowered values.
    #[error("Condition index error: {0}")]
    Eval(#[from] EvalError),

    /// The produced module violates a structural invariant.
    #[error("Invalid dataflow module: {0}")]
    InvalidModule(String),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the module failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for lowering operations.
pub type ExportResult<T> = Result<T, ExportError>;
