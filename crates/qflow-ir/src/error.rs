//! Error types for the IR crate.

use thiserror::Error;

/// Errors that can occur while parsing instruction text.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Lexer error (invalid token).
    #[error("Lexer error at position {position}: {message}")]
    LexerError { position: usize, message: String },

    /// Unexpected token.
    #[error("Unexpected token at line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input: {0}")]
    UnexpectedEof(String),

    /// Instruction name is not recognised.
    #[error("Unknown instruction '{name}' at line {line}")]
    UnknownInstruction { line: usize, name: String },

    /// Wrong number of parenthesised arguments.
    #[error("Instruction '{name}' expects {expected} arguments, got {got}")]
    WrongArgumentCount {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Argument value outside the accepted range.
    #[error("Instruction '{name}' has invalid argument {value}")]
    InvalidArgument { name: String, value: f64 },

    /// Target kind not accepted by the instruction.
    #[error("Instruction '{name}' does not accept target '{target}'")]
    InvalidTarget { name: String, target: String },

    /// Two-qubit instruction with an odd number of targets.
    #[error("Two-qubit instruction '{name}' needs an even number of targets, got {got}")]
    OddTargetCount { name: String, got: usize },

    /// Two-qubit instruction acting twice on the same qubit.
    #[error("Instruction '{name}' targets qubit {qubit} twice in one pair")]
    RepeatedPairTarget { name: String, qubit: u32 },

    /// REPEAT with a zero count.
    #[error("REPEAT count must be positive at line {line}")]
    InvalidRepeatCount { line: usize },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors raised while building or querying circuits.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum IrError {
    /// Block text could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Operation requires a circuit made of blocks only.
    #[error("Operation requires a static circuit, found {node} node")]
    StaticCircuitRequired {
        /// Kind of the first dynamic node found.
        node: &'static str,
    },

    /// Loop budget of zero iterations.
    #[error("{node} loop needs a positive iteration limit")]
    InvalidIterationLimit {
        /// Kind of loop node being built.
        node: &'static str,
    },
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;

/// Errors raised while evaluating conditions and expressions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EvalError {
    /// Index outside the current last-block window.
    #[error("Index {index} out of range for last-block window of size {len}")]
    WindowIndexOutOfRange { index: usize, len: usize },

    /// Index outside the global measurement record.
    #[error("Index {index} out of range for measurement record of size {len}")]
    RecordIndexOutOfRange { index: i64, len: usize },

    /// Variable read before any binding.
    #[error("Variable '{0}' is not bound")]
    MissingBinding(String),

    /// Modulo by zero.
    #[error("Division by zero in modulo expression")]
    DivisionByZero,

    /// Integer overflow in arithmetic.
    #[error("Integer overflow in {0}")]
    Overflow(&'static str),

    /// Free-form predicate reported a failure.
    #[error("Predicate failed: {0}")]
    Predicate(String),
}

/// Result type for condition and expression evaluation.
pub type EvalResult<T> = Result<T, EvalError>;
