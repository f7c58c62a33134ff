//! qflow circuit representation
//!
//! This crate holds the abstract syntax of dynamic circuits: blocks of
//! primitive instructions interleaved with classical control flow.
//!
//! # Core Components
//!
//! - **Instructions**: [`OpCode`], [`Instruction`] and the line-oriented text
//!   form parsed by [`parse_instructions`]
//! - **Conditions**: structured [`Cond`] values, [`Expr`] trees and opaque
//!   [`Predicate`]s, unified in [`Condition`]
//! - **Runtime view**: the [`EvalContext`] trait and the per-shot
//!   [`ClassicalState`]
//! - **Circuit**: [`Circuit`] builder over [`Node`]s
//!
//! # Example: Repeat Until Success
//!
//! ```rust
//! use qflow_ir::{Circuit, Cond};
//!
//! let mut circuit = Circuit::new();
//! circuit
//!     .block("R 0")?
//!     .do_while_with_limit("H 0\nM 0", Cond::last_meas(0), 100)?;
//!
//! assert_eq!(circuit.len(), 2);
//! assert!(!circuit.is_static());
//! # Ok::<(), qflow_ir::IrError>(())
//! ```
//!
//! # Supported Instructions
//!
//! | Instruction | Targets | Description |
//! |-------------|---------|-------------|
//! | `I`, `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `H`, `S`, `S_DAG`, `T`, `T_DAG` | 1 | Clifford and T gates |
//! | `SQRT_X`, `SQRT_Y` (and `_DAG`) | 1 | Square-root Pauli gates |
//! | `CX`, `CY`, `CZ`, `SWAP`, `ISWAP` | 2 | Two-qubit gates |
//! | `M`, `MX`, `MY`, `MR` | 1 | Measurements |
//! | `R`, `RX`, `RY` | 1 | Resets |
//! | `X_ERROR`, `Y_ERROR`, `Z_ERROR`, `DEPOLARIZE1` | 1 | Noise channels |
//! | `TICK`, `DETECTOR`, `OBSERVABLE_INCLUDE`, `QUBIT_COORDS`, `SHIFT_COORDS` | any | Annotations |

pub mod circuit;
pub mod cond;
pub mod condition;
pub mod context;
pub mod error;
pub mod expr;
pub mod instruction;
pub mod node;
pub mod opcode;
pub mod text;

pub use circuit::{Body, Circuit};
pub use cond::Cond;
pub use condition::{Condition, Operand, Predicate};
pub use context::{ClassicalState, EvalContext, Value, resolve_index};
pub use error::{EvalError, EvalResult, IrError, IrResult, ParseError, ParseResult};
pub use expr::{Expr, ExprBuilder};
pub use instruction::{Instruction, Operation, Target, collect_qubits, format_instructions};
pub use node::{Block, DEFAULT_MAX_ITERATIONS, Node};
pub use opcode::{Basis, OpClass, OpCode};
pub use text::{parse_instructions, validate_instructions};
