//! Instruction opcodes understood inside blocks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How an opcode consumes its targets and what it does to state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpClass {
    /// Unitary applied to every target independently.
    SingleQubit,
    /// Unitary applied to consecutive target pairs.
    TwoQubit,
    /// Measurement producing one bit per target.
    Measure,
    /// Reset of every target.
    Reset,
    /// Measurement followed by a reset to the zero state.
    MeasureReset,
    /// Stochastic Pauli noise channel, one probability argument.
    Noise,
    /// Annotation with no effect on the quantum state.
    Annotation,
}

/// Measurement or preparation basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Basis {
    /// Pauli-X eigenbasis.
    X,
    /// Pauli-Y eigenbasis.
    Y,
    /// Pauli-Z (computational) eigenbasis.
    Z,
}

/// A primitive instruction name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpCode {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford and T gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    SDag,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    TDag,
    /// sqrt(X) gate.
    SqrtX,
    /// sqrt(X)-dagger gate.
    SqrtXDag,
    /// sqrt(Y) gate.
    SqrtY,
    /// sqrt(Y)-dagger gate.
    SqrtYDag,

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// SWAP gate.
    Swap,
    /// iSWAP gate.
    ISwap,

    // Measurement and reset
    /// Z-basis measurement.
    M,
    /// X-basis measurement.
    MX,
    /// Y-basis measurement.
    MY,
    /// Reset to |0⟩.
    R,
    /// Reset to |+⟩.
    RX,
    /// Reset to |+i⟩.
    RY,
    /// Z-basis measurement followed by reset to |0⟩.
    MR,

    // Noise channels
    /// Bit flip with probability p.
    XError,
    /// Y flip with probability p.
    YError,
    /// Phase flip with probability p.
    ZError,
    /// Uniformly random Pauli with probability p.
    Depolarize1,

    // Annotations
    /// Time-slice marker.
    Tick,
    /// Detector declaration over measurement record targets.
    Detector,
    /// Logical observable declaration over measurement record targets.
    ObservableInclude,
    /// Qubit coordinate annotation.
    QubitCoords,
    /// Coordinate offset annotation.
    ShiftCoords,
}

impl OpCode {
    /// Look up an opcode by name, case-insensitively, accepting aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        let op = match name.to_ascii_uppercase().as_str() {
            "I" => OpCode::I,
            "X" => OpCode::X,
            "Y" => OpCode::Y,
            "Z" => OpCode::Z,
            "H" | "H_XZ" => OpCode::H,
            "S" | "SQRT_Z" => OpCode::S,
            "S_DAG" | "SQRT_Z_DAG" => OpCode::SDag,
            "T" => OpCode::T,
            "T_DAG" => OpCode::TDag,
            "SQRT_X" => OpCode::SqrtX,
            "SQRT_X_DAG" => OpCode::SqrtXDag,
            "SQRT_Y" => OpCode::SqrtY,
            "SQRT_Y_DAG" => OpCode::SqrtYDag,
            "CX" | "CNOT" | "ZCX" => OpCode::CX,
            "CY" | "ZCY" => OpCode::CY,
            "CZ" | "ZCZ" => OpCode::CZ,
            "SWAP" => OpCode::Swap,
            "ISWAP" => OpCode::ISwap,
            "M" | "MZ" => OpCode::M,
            "MX" => OpCode::MX,
            "MY" => OpCode::MY,
            "R" | "RZ" => OpCode::R,
            "RX" => OpCode::RX,
            "RY" => OpCode::RY,
            "MR" | "MRZ" => OpCode::MR,
            "X_ERROR" => OpCode::XError,
            "Y_ERROR" => OpCode::YError,
            "Z_ERROR" => OpCode::ZError,
            "DEPOLARIZE1" => OpCode::Depolarize1,
            "TICK" => OpCode::Tick,
            "DETECTOR" => OpCode::Detector,
            "OBSERVABLE_INCLUDE" => OpCode::ObservableInclude,
            "QUBIT_COORDS" => OpCode::QubitCoords,
            "SHIFT_COORDS" => OpCode::ShiftCoords,
            _ => return None,
        };
        Some(op)
    }

    /// Canonical name, as written back out in instruction text.
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            OpCode::I => "I",
            OpCode::X => "X",
            OpCode::Y => "Y",
            OpCode::Z => "Z",
            OpCode::H => "H",
            OpCode::S => "S",
            OpCode::SDag => "S_DAG",
            OpCode::T => "T",
            OpCode::TDag => "T_DAG",
            OpCode::SqrtX => "SQRT_X",
            OpCode::SqrtXDag => "SQRT_X_DAG",
            OpCode::SqrtY => "SQRT_Y",
            OpCode::SqrtYDag => "SQRT_Y_DAG",
            OpCode::CX => "CX",
            OpCode::CY => "CY",
            OpCode::CZ => "CZ",
            OpCode::Swap => "SWAP",
            OpCode::ISwap => "ISWAP",
            OpCode::M => "M",
            OpCode::MX => "MX",
            OpCode::MY => "MY",
            OpCode::R => "R",
            OpCode::RX => "RX",
            OpCode::RY => "RY",
            OpCode::MR => "MR",
            OpCode::XError => "X_ERROR",
            OpCode::YError => "Y_ERROR",
            OpCode::ZError => "Z_ERROR",
            OpCode::Depolarize1 => "DEPOLARIZE1",
            OpCode::Tick => "TICK",
            OpCode::Detector => "DETECTOR",
            OpCode::ObservableInclude => "OBSERVABLE_INCLUDE",
            OpCode::QubitCoords => "QUBIT_COORDS",
            OpCode::ShiftCoords => "SHIFT_COORDS",
        }
    }

    /// Classify how this opcode consumes targets.
    #[inline]
    pub fn class(self) -> OpClass {
        match self {
            OpCode::I
            | OpCode::X
            | OpCode::Y
            | OpCode::Z
            | OpCode::H
            | OpCode::S
            | OpCode::SDag
            | OpCode::T
            | OpCode::TDag
            | OpCode::SqrtX
            | OpCode::SqrtXDag
            | OpCode::SqrtY
            | OpCode::SqrtYDag => OpClass::SingleQubit,

            OpCode::CX | OpCode::CY | OpCode::CZ | OpCode::Swap | OpCode::ISwap => {
                OpClass::TwoQubit
            }

            OpCode::M | OpCode::MX | OpCode::MY => OpClass::Measure,
            OpCode::R | OpCode::RX | OpCode::RY => OpClass::Reset,
            OpCode::MR => OpClass::MeasureReset,

            OpCode::XError | OpCode::YError | OpCode::ZError | OpCode::Depolarize1 => {
                OpClass::Noise
            }

            OpCode::Tick
            | OpCode::Detector
            | OpCode::ObservableInclude
            | OpCode::QubitCoords
            | OpCode::ShiftCoords => OpClass::Annotation,
        }
    }

    /// Basis of a measurement or reset opcode.
    pub fn basis(self) -> Option<Basis> {
        match self {
            OpCode::M | OpCode::R | OpCode::MR => Some(Basis::Z),
            OpCode::MX | OpCode::RX => Some(Basis::X),
            OpCode::MY | OpCode::RY => Some(Basis::Y),
            _ => None,
        }
    }

    /// Whether this opcode appends bits to the measurement record.
    #[inline]
    pub fn produces_measurements(self) -> bool {
        matches!(self.class(), OpClass::Measure | OpClass::MeasureReset)
    }

    /// Whether targets of this opcode are measurement record references.
    #[inline]
    pub fn takes_record_targets(self) -> bool {
        matches!(self, OpCode::Detector | OpCode::ObservableInclude)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
