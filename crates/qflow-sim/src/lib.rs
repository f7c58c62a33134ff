//! qflow simulator collaborator
//!
//! The interpreter talks to quantum state only through the [`Simulator`]
//! trait: apply a block of instructions, get back the bits it produced.
//! [`StatevectorSimulator`] is a seeded reference implementation that
//! allocates qubits on first use.
//!
//! # Features
//!
//! - **Exact Simulation**: Full statevector representation
//! - **Measurement Family**: `M`, `MX`, `MY`, `MR` and `R`, `RX`, `RY`
//! - **Pauli Noise**: `X_ERROR`, `Y_ERROR`, `Z_ERROR`, `DEPOLARIZE1`
//! - **Determinism**: identical seeds give identical records
//!
//! # Example
//!
//! ```rust
//! use qflow_ir::parse_instructions;
//! use qflow_sim::{Simulator, StatevectorSimulator};
//!
//! let mut sim = StatevectorSimulator::new(Some(7));
//! let bits = sim.apply(&parse_instructions("X 0\nM 0").unwrap()).unwrap();
//! assert_eq!(bits, vec![true]);
//! ```

pub mod error;
pub mod simulator;
pub mod statevector;

pub use error::{SimError, SimResult};
pub use simulator::{
    DEFAULT_MAX_QUBITS, Simulator, SimulatorFactory, StatevectorFactory, StatevectorSimulator,
};
pub use statevector::Statevector;
