//! qflow interpreter
//!
//! Executes a [`Circuit`](qflow_ir::Circuit) shot by shot against a fresh
//! [`Simulator`](qflow_sim::Simulator), walking its nodes in order and
//! keeping the classical state (measurement record, last-block window,
//! variables, outputs) in a per-shot [`ExecContext`].
//!
//! # Example: Repeat Until Success
//!
//! ```rust
//! use qflow_exec::CircuitExt;
//! use qflow_ir::{Circuit, Cond};
//!
//! let mut circuit = Circuit::new();
//! circuit.do_while_with_limit("H 0\nM 0", Cond::last_meas(0), 100)?;
//!
//! let shots = circuit.compile_sampler(Some(1234)).sample(20)?;
//! for record in shots {
//!     assert_eq!(record.last(), Some(&false));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod interpreter;
pub mod sampler;

pub use config::{ConfigError, SamplerConfig};
pub use context::ExecContext;
pub use error::{ExecError, ExecResult};
pub use interpreter::execute;
pub use sampler::{CircuitExt, DynamicSampler, ShotResult};
