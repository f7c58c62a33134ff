//! SSA lowering of dynamic circuits.
//!
//! The interpreter mutates one simulator in place; this crate instead
//! threads explicit value identities for every qubit and every measurement
//! bit through the circuit, producing a [`DataflowModule`] made of nested
//! regions with explicit sources and targets.
//!
//! # Example
//!
//! ```
//! use qflow_export::{OpKind, to_dataflow};
//! use qflow_ir::{Circuit, Cond};
//!
//! let mut circuit = Circuit::parse("H 0\nM 0")?;
//! circuit.conditional(Cond::last_meas(0), "X 1")?;
//!
//! let module = to_dataflow(&circuit, "main")?;
//! let entry = module.entry().unwrap();
//! assert!(entry
//!     .body
//!     .operations
//!     .iter()
//!     .any(|op| matches!(op.kind, OpKind::Select { .. })));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Lowering rules
//!
//! | Construct | Dataflow |
//! |-----------|----------|
//! | gates | `qubit.gate`, one per target or pair |
//! | `M`, `MX`, `MY` | `qubit.measure_nd`, wrapped in a basis change |
//! | `R`, `RX`, `RY`, `MR` | `qubit.reset`, plus basis preparation or a measurement |
//! | `REPEAT` | unrolled |
//! | `If` | `scf.select` over a pass-through and a taken region |
//! | `While` | `scf.while` with condition and body regions |
//! | `DoWhile` | `scf.do_while`, the condition reading the body's state |
//! | `Let`, `Emit` | omitted |
//!
//! Conditions must be `LastMeas` or `MeasParity`; expression and predicate
//! conditions are rejected before anything is emitted.

pub mod dataflow;
pub mod error;
pub mod exporter;
mod state;

pub use dataflow::{DataflowModule, DataflowOp, Function, OpKind, Region, ValueId, ValueType};
pub use error::{ExportError, ExportResult};
pub use exporter::{Exporter, to_dataflow, validate_circuit};
