//! Error types for the codec.

use qflow_ir::IrError;
use thiserror::Error;

/// Errors that can occur while encoding or decoding circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// The node or condition has no wire representation.
    #[error("Cannot serialize {kind}: only blocks, control nodes and LastMeas/MeasParity conditions are supported")]
    Unsupported {
        /// Kind of the rejected node or condition.
        kind: &'static str,
    },

    /// Malformed message bytes.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The message decoded into an invalid circuit.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
