//! Error types for the simulator crate.

use thiserror::Error;

/// Errors raised by a simulator while applying instructions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SimError {
    /// Instructions reference more qubits than the simulator holds.
    #[error("Instructions need {requested} qubits but the simulator supports at most {max}")]
    TooManyQubits {
        /// Qubits required by the instructions.
        requested: u32,
        /// Configured limit.
        max: u32,
    },

    /// Instruction target the simulator cannot act on.
    #[error("Invalid target for {instruction}: {reason}")]
    InvalidTarget {
        /// Name of the instruction.
        instruction: String,
        /// Why the target was rejected.
        reason: String,
    },
}

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;
