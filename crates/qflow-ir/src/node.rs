//! AST nodes.

use std::collections::BTreeSet;

use crate::circuit::Circuit;
use crate::condition::{Condition, Operand};
use crate::instruction::Instruction;

/// Default iteration budget of `While` and `DoWhile` loops.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10_000;

/// A block of primitive instructions executed as one unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Instructions in execution order.
    pub instructions: Vec<Instruction>,
    /// Whether the bits produced here replace the last-block window.
    pub capture_as_last: bool,
}

impl Block {
    pub fn new(instructions: Vec<Instruction>, capture_as_last: bool) -> Self {
        Self {
            instructions,
            capture_as_last,
        }
    }
}

/// One node of a circuit.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Instructions submitted to the simulator atomically.
    Block(Block),
    /// Run `body` once if `cond` holds.
    If { cond: Condition, body: Circuit },
    /// Check `cond` before every iteration.
    While {
        cond: Condition,
        body: Circuit,
        max_iterations: u32,
    },
    /// Run `body`, then repeat while `cond` holds.
    DoWhile {
        cond: Condition,
        body: Circuit,
        max_iterations: u32,
    },
    /// Bind a classical variable.
    Let { name: String, expr: Operand },
    /// Append a classical output bit.
    Emit {
        expr: Operand,
        name: Option<String>,
    },
}

impl Node {
    /// Name of the node kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Block(_) => "Block",
            Node::If { .. } => "If",
            Node::While { .. } => "While",
            Node::DoWhile { .. } => "DoWhile",
            Node::Let { .. } => "Let",
            Node::Emit { .. } => "Emit",
        }
    }

    /// The condition of a control node.
    pub fn condition(&self) -> Option<&Condition> {
        match self {
            Node::If { cond, .. } | Node::While { cond, .. } | Node::DoWhile { cond, .. } => {
                Some(cond)
            }
            _ => None,
        }
    }

    /// The body of a control node.
    pub fn body(&self) -> Option<&Circuit> {
        match self {
            Node::If { body, .. } | Node::While { body, .. } | Node::DoWhile { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }

    /// Insert every qubit touched by this node (recursively) into `out`.
    pub fn collect_qubits(&self, out: &mut BTreeSet<u32>) {
        match self {
            Node::Block(block) => {
                for inst in &block.instructions {
                    inst.collect_qubits(out);
                }
            }
            Node::If { body, .. } | Node::While { body, .. } | Node::DoWhile { body, .. } => {
                for node in body.nodes() {
                    node.collect_qubits(out);
                }
            }
            Node::Let { .. } | Node::Emit { .. } => {}
        }
    }
}

impl From<Block> for Node {
    fn from(block: Block) -> Self {
        Node::Block(block)
    }
}
