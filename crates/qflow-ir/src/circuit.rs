//! High-level circuit builder API.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::condition::{Condition, Operand};
use crate::error::{IrError, IrResult};
use crate::instruction::{Instruction, format_instructions};
use crate::node::{Block, DEFAULT_MAX_ITERATIONS, Node};
use crate::text::{parse_instructions, validate_instructions};

/// Anything accepted as a block or as the body of a control node.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Instruction text, parsed on use.
    Text(String),
    /// Already parsed instructions.
    Instructions(Vec<Instruction>),
    /// A sub-circuit, inlined.
    Circuit(Circuit),
    /// A single node, inlined.
    Node(Node),
}

impl Body {
    /// Normalize into a circuit. Raw instructions become one capturing block.
    pub fn into_circuit(self) -> IrResult<Circuit> {
        let nodes = self.into_nodes(true)?;
        Ok(Circuit { nodes })
    }

    fn into_nodes(self, capture_as_last: bool) -> IrResult<Vec<Node>> {
        let nodes = match self {
            Body::Text(text) => {
                let instructions = parse_instructions(&text)?;
                vec![Node::Block(Block::new(instructions, capture_as_last))]
            }
            Body::Instructions(instructions) => {
                validate_instructions(&instructions)?;
                vec![Node::Block(Block::new(instructions, capture_as_last))]
            }
            Body::Circuit(circuit) => circuit.nodes,
            Body::Node(node) => vec![node],
        };
        Ok(nodes)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<Vec<Instruction>> for Body {
    fn from(instructions: Vec<Instruction>) -> Self {
        Body::Instructions(instructions)
    }
}

impl From<Instruction> for Body {
    fn from(instruction: Instruction) -> Self {
        Body::Instructions(vec![instruction])
    }
}

impl From<Circuit> for Body {
    fn from(circuit: Circuit) -> Self {
        Body::Circuit(circuit)
    }
}

impl From<&Circuit> for Body {
    fn from(circuit: &Circuit) -> Self {
        Body::Circuit(circuit.clone())
    }
}

impl From<Node> for Body {
    fn from(node: Node) -> Self {
        Body::Node(node)
    }
}

/// A dynamic circuit: an ordered sequence of nodes.
///
/// Nodes can only be appended through the builder methods; once appended
/// they are never changed or removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Circuit {
    nodes: Vec<Node>,
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a circuit holding one capturing block parsed from `text`.
    pub fn parse(text: &str) -> IrResult<Self> {
        let mut circuit = Self::new();
        circuit.block(text)?;
        Ok(circuit)
    }

    /// The nodes, in control order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of top-level nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the circuit has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // =========================================================================
    // Builders
    // =========================================================================

    /// Append a capturing block, or inline a sub-circuit or node.
    pub fn block(&mut self, body: impl Into<Body>) -> IrResult<&mut Self> {
        self.block_with(body, true)
    }

    /// Append a block with an explicit capture flag.
    ///
    /// The flag only applies to raw text or instructions; inlined circuits
    /// and nodes keep their own blocks.
    pub fn block_with(&mut self, body: impl Into<Body>, capture_as_last: bool) -> IrResult<&mut Self> {
        let nodes = body.into().into_nodes(capture_as_last)?;
        self.nodes.extend(nodes);
        Ok(self)
    }

    /// Append an `If` node.
    pub fn conditional(
        &mut self,
        cond: impl Into<Condition>,
        body: impl Into<Body>,
    ) -> IrResult<&mut Self> {
        let body = body.into().into_circuit()?;
        self.nodes.push(Node::If {
            cond: cond.into(),
            body,
        });
        Ok(self)
    }

    /// Append a `While` node with the default iteration budget.
    pub fn while_loop(
        &mut self,
        cond: impl Into<Condition>,
        body: impl Into<Body>,
    ) -> IrResult<&mut Self> {
        self.while_loop_with_limit(cond, body, DEFAULT_MAX_ITERATIONS)
    }

    /// Append a `While` node running its body at most `max_iterations` times.
    pub fn while_loop_with_limit(
        &mut self,
        cond: impl Into<Condition>,
        body: impl Into<Body>,
        max_iterations: u32,
    ) -> IrResult<&mut Self> {
        if max_iterations == 0 {
            return Err(IrError::InvalidIterationLimit { node: "While" });
        }
        let body = body.into().into_circuit()?;
        self.nodes.push(Node::While {
            cond: cond.into(),
            body,
            max_iterations,
        });
        Ok(self)
    }

    /// Append a `DoWhile` node with the default iteration budget.
    pub fn do_while(
        &mut self,
        body: impl Into<Body>,
        cond: impl Into<Condition>,
    ) -> IrResult<&mut Self> {
        self.do_while_with_limit(body, cond, DEFAULT_MAX_ITERATIONS)
    }

    /// Append a `DoWhile` node running its body at most `max_iterations` times.
    pub fn do_while_with_limit(
        &mut self,
        body: impl Into<Body>,
        cond: impl Into<Condition>,
        max_iterations: u32,
    ) -> IrResult<&mut Self> {
        if max_iterations == 0 {
            return Err(IrError::InvalidIterationLimit { node: "DoWhile" });
        }
        let body = body.into().into_circuit()?;
        self.nodes.push(Node::DoWhile {
            cond: cond.into(),
            body,
            max_iterations,
        });
        Ok(self)
    }

    /// Append a `Let` node.
    pub fn let_var(&mut self, name: impl Into<String>, expr: impl Into<Operand>) -> &mut Self {
        self.nodes.push(Node::Let {
            name: name.into(),
            expr: expr.into(),
        });
        self
    }

    /// Append an unnamed `Emit` node.
    pub fn emit(&mut self, expr: impl Into<Operand>) -> &mut Self {
        self.nodes.push(Node::Emit {
            expr: expr.into(),
            name: None,
        });
        self
    }

    /// Append a named `Emit` node.
    pub fn emit_named(&mut self, expr: impl Into<Operand>, name: impl Into<String>) -> &mut Self {
        self.nodes.push(Node::Emit {
            expr: expr.into(),
            name: Some(name.into()),
        });
        self
    }

    /// Append every node of `other`.
    pub fn extend(&mut self, other: &Circuit) -> &mut Self {
        self.nodes.extend(other.nodes.iter().cloned());
        self
    }

    /// Sequence `self` then `other` into a new circuit.
    #[must_use]
    pub fn concat(&self, other: &Circuit) -> Circuit {
        let mut out = self.clone();
        out.extend(other);
        out
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Whether every node is a block.
    pub fn is_static(&self) -> bool {
        self.nodes.iter().all(|n| matches!(n, Node::Block(_)))
    }

    /// Concatenate the instructions of every block.
    ///
    /// Fails with [`IrError::StaticCircuitRequired`] on the first non-block node.
    pub fn to_flat_instructions(&self) -> IrResult<Vec<Instruction>> {
        let mut out = Vec::new();
        for node in &self.nodes {
            match node {
                Node::Block(block) => out.extend(block.instructions.iter().cloned()),
                other => {
                    return Err(IrError::StaticCircuitRequired { node: other.kind() });
                }
            }
        }
        Ok(out)
    }

    /// Every qubit referenced anywhere in the circuit, sorted.
    pub fn qubits(&self) -> BTreeSet<u32> {
        let mut out = BTreeSet::new();
        for node in &self.nodes {
            node.collect_qubits(&mut out);
        }
        out
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        for node in &self.nodes {
            match node {
                Node::Block(block) => {
                    writeln!(f, "{pad}Block:")?;
                    for line in format_instructions(&block.instructions).lines() {
                        writeln!(f, "{pad}  {line}")?;
                    }
                }
                Node::If { cond, body } => {
                    writeln!(f, "{pad}If {cond}:")?;
                    body.write_indented(f, indent + 1)?;
                }
                Node::While { cond, body, .. } => {
                    writeln!(f, "{pad}While {cond}:")?;
                    body.write_indented(f, indent + 1)?;
                }
                Node::DoWhile { cond, body, .. } => {
                    writeln!(f, "{pad}Do:")?;
                    body.write_indented(f, indent + 1)?;
                    writeln!(f, "{pad}While {cond}")?;
                }
                Node::Let { name, expr } => writeln!(f, "{pad}Let {name} = {expr}")?,
                Node::Emit { expr, name: Some(name) } => writeln!(f, "{pad}Emit {name} = {expr}")?,
                Node::Emit { expr, name: None } => writeln!(f, "{pad}Emit {expr}")?,
            }
        }
        Ok(())
    }
}

impl FromStr for Circuit {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
