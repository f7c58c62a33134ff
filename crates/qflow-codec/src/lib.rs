//! Wire codec for dynamic circuits.
//!
//! Circuits are mapped onto a flat, tagged message schema and encoded as
//! JSON so another execution engine can run them. Only the structured part
//! of the language is representable: blocks, `If`/`While`/`DoWhile`, and
//! `LastMeas`/`MeasParity` conditions. `Let`, `Emit`, expression
//! conditions and predicates are rejected with [`CodecError::Unsupported`].
//!
//! # Example
//!
//! ```
//! use qflow_codec::{decode, encode};
//! use qflow_ir::{Circuit, Cond};
//!
//! let mut circuit = Circuit::parse("H 0\nM 0")?;
//! circuit.while_loop_with_limit(Cond::last_meas(0), "H 0\nM 0", 50)?;
//!
//! let bytes = encode(&circuit)?;
//! assert_eq!(decode(&bytes)?, circuit);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod message;

use tracing::debug;

use qflow_ir::Circuit;

pub use error::{CodecError, CodecResult};
pub use message::{CircuitMessage, ConditionMessage, NodeMessage};

/// Map a circuit onto its message form.
pub fn to_message(circuit: &Circuit) -> CodecResult<CircuitMessage> {
    CircuitMessage::try_from(circuit)
}

/// Rebuild a circuit from its message form.
pub fn from_message(message: &CircuitMessage) -> CodecResult<Circuit> {
    Circuit::try_from(message)
}

/// Encode a circuit as bytes.
pub fn encode(circuit: &Circuit) -> CodecResult<Vec<u8>> {
    let message = to_message(circuit)?;
    let bytes = serde_json::to_vec(&message)?;
    debug!("Encoded {} nodes into {} bytes", circuit.len(), bytes.len());
    Ok(bytes)
}

/// Decode bytes produced by [`encode`].
pub fn decode(bytes: &[u8]) -> CodecResult<Circuit> {
    let message: CircuitMessage = serde_json::from_slice(bytes)?;
    let circuit = from_message(&message)?;
    debug!("Decoded {} nodes from {} bytes", circuit.len(), bytes.len());
    Ok(circuit)
}
