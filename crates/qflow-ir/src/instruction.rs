//! Primitive instructions executed inside blocks.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::opcode::{OpClass, OpCode};

/// An instruction target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// A qubit index.
    Qubit(u32),
    /// A measurement record reference, `rec[-k]`.
    Rec(i64),
}

impl Target {
    /// The qubit index, if this target names a qubit.
    #[inline]
    pub fn qubit(self) -> Option<u32> {
        match self {
            Target::Qubit(q) => Some(q),
            Target::Rec(_) => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Qubit(q) => write!(f, "{q}"),
            Target::Rec(r) => write!(f, "rec[{r}]"),
        }
    }
}

/// A single opcode applied to its arguments and targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// The opcode.
    pub opcode: OpCode,
    /// Parenthesised arguments, e.g. noise probabilities or coordinates.
    pub args: Vec<f64>,
    /// Targets in source order.
    pub targets: Vec<Target>,
}

impl Operation {
    /// Create an operation over qubit targets with no arguments.
    pub fn new(opcode: OpCode, qubits: impl IntoIterator<Item = u32>) -> Self {
        Self {
            opcode,
            args: Vec::new(),
            targets: qubits.into_iter().map(Target::Qubit).collect(),
        }
    }

    /// Attach arguments.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = f64>) -> Self {
        self.args = args.into_iter().collect();
        self
    }

    /// Qubit indices in target order.
    pub fn qubits(&self) -> impl Iterator<Item = u32> + '_ {
        self.targets.iter().filter_map(|t| t.qubit())
    }

    /// Number of measurement bits this operation appends to the record.
    pub fn measurement_count(&self) -> usize {
        if self.opcode.produces_measurements() {
            self.qubits().count()
        } else {
            0
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(ToString::to_string).collect();
            write!(f, "({})", args.join(", "))?;
        }
        for target in &self.targets {
            write!(f, " {target}")?;
        }
        Ok(())
    }
}

/// One line of block text: an operation or a repeated sub-block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// A single operation.
    Op(Operation),
    /// `REPEAT count { body }`.
    Repeat {
        /// Number of repetitions, at least one.
        count: u64,
        /// Repeated instructions.
        body: Vec<Instruction>,
    },
}

impl Instruction {
    /// Create a gate, measurement, or reset over the given qubits.
    pub fn op(opcode: OpCode, qubits: impl IntoIterator<Item = u32>) -> Self {
        Instruction::Op(Operation::new(opcode, qubits))
    }

    /// Create a noise channel with probability `p`.
    pub fn noise(opcode: OpCode, p: f64, qubits: impl IntoIterator<Item = u32>) -> Self {
        Instruction::Op(Operation::new(opcode, qubits).with_args([p]))
    }

    /// Create a repeat block.
    pub fn repeat(count: u64, body: Vec<Instruction>) -> Self {
        Instruction::Repeat { count, body }
    }

    /// Insert every qubit touched by this instruction into `out`.
    pub fn collect_qubits(&self, out: &mut BTreeSet<u32>) {
        match self {
            Instruction::Op(op) => out.extend(op.qubits()),
            Instruction::Repeat { body, .. } => {
                for inst in body {
                    inst.collect_qubits(out);
                }
            }
        }
    }

    /// Number of measurement bits produced when executed.
    pub fn measurement_count(&self) -> usize {
        match self {
            Instruction::Op(op) => op.measurement_count(),
            Instruction::Repeat { count, body } => {
                let per: usize = body.iter().map(Instruction::measurement_count).sum();
                per.saturating_mul(usize::try_from(*count).unwrap_or(usize::MAX))
            }
        }
    }

    /// Whether this instruction (or its body) contains the given class.
    pub fn contains_class(&self, class: OpClass) -> bool {
        match self {
            Instruction::Op(op) => op.opcode.class() == class,
            Instruction::Repeat { body, .. } => body.iter().any(|i| i.contains_class(class)),
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "    ".repeat(indent);
        match self {
            Instruction::Op(op) => writeln!(f, "{pad}{op}"),
            Instruction::Repeat { count, body } => {
                writeln!(f, "{pad}REPEAT {count} {{")?;
                for inst in body {
                    inst.write_indented(f, indent + 1)?;
                }
                writeln!(f, "{pad}}}")
            }
        }
    }
}

impl From<Operation> for Instruction {
    fn from(op: Operation) -> Self {
        Instruction::Op(op)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

/// Render a list of instructions as block text, one per line.
pub fn format_instructions(instructions: &[Instruction]) -> String {
    instructions.iter().map(ToString::to_string).collect()
}

/// Every qubit referenced by `instructions`, sorted.
pub fn collect_qubits(instructions: &[Instruction]) -> BTreeSet<u32> {
    let mut out = BTreeSet::new();
    for inst in instructions {
        inst.collect_qubits(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let insts = vec![
            Instruction::op(OpCode::H, [0]),
            Instruction::noise(OpCode::XError, 0.1, [1, 2]),
            Instruction::repeat(2, vec![Instruction::op(OpCode::M, [0])]),
        ];
        assert_eq!(
            format_instructions(&insts),
            "H 0\nX_ERROR(0.1) 1 2\nREPEAT 2 {\n    M 0\n}\n"
        );
    }

    #[test]
    fn test_collect_qubits_recurses() {
        let insts = vec![
            Instruction::op(OpCode::CX, [3, 1]),
            Instruction::repeat(5, vec![Instruction::op(OpCode::M, [7])]),
        ];
        let qubits: Vec<u32> = collect_qubits(&insts).into_iter().collect();
        assert_eq!(qubits, vec![1, 3, 7]);
    }

    #[test]
    fn test_measurement_count() {
        let inst = Instruction::repeat(
            3,
            vec![
                Instruction::op(OpCode::H, [0]),
                Instruction::op(OpCode::MR, [0, 1]),
            ],
        );
        assert_eq!(inst.measurement_count(), 6);
        assert!(inst.contains_class(OpClass::MeasureReset));
        assert!(!inst.contains_class(OpClass::Noise));
    }

    #[test]
    fn test_record_target_display() {
        let op = Operation {
            opcode: OpCode::Detector,
            args: vec![],
            targets: vec![Target::Rec(-1), Target::Rec(-2)],
        };
        assert_eq!(op.to_string(), "DETECTOR rec[-1] rec[-2]");
    }
}
