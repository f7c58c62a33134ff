//! Message schema and the mapping to and from circuits.

use serde::{Deserialize, Serialize};

use qflow_ir::{Circuit, Cond, Condition, DEFAULT_MAX_ITERATIONS, Node, format_instructions};

use crate::error::{CodecError, CodecResult};

/// A circuit on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitMessage {
    pub nodes: Vec<NodeMessage>,
}

/// One node on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeMessage {
    Block {
        text: String,
        #[serde(default = "default_capture")]
        capture_as_last: bool,
    },
    If {
        condition: ConditionMessage,
        body: CircuitMessage,
    },
    While {
        condition: ConditionMessage,
        body: CircuitMessage,
        /// Zero or absent means the default budget.
        #[serde(default)]
        max_iterations: u32,
    },
    DoWhile {
        condition: ConditionMessage,
        body: CircuitMessage,
        #[serde(default)]
        max_iterations: u32,
    },
}

fn default_capture() -> bool {
    true
}

/// A structured condition on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ConditionMessage {
    LastMeas { index: usize },
    MeasParity { indices: Vec<i64> },
}

impl TryFrom<&Condition> for ConditionMessage {
    type Error = CodecError;

    fn try_from(cond: &Condition) -> CodecResult<Self> {
        match cond.as_structured() {
            Some(Cond::LastMeas { index }) => Ok(ConditionMessage::LastMeas { index: *index }),
            Some(Cond::MeasParity { indices }) => Ok(ConditionMessage::MeasParity {
                indices: indices.clone(),
            }),
            None => Err(CodecError::Unsupported { kind: cond.kind() }),
        }
    }
}

impl From<&ConditionMessage> for Cond {
    fn from(msg: &ConditionMessage) -> Self {
        match msg {
            ConditionMessage::LastMeas { index } => Cond::last_meas(*index),
            ConditionMessage::MeasParity { indices } => Cond::meas_parity(indices.iter().copied()),
        }
    }
}

impl TryFrom<&Circuit> for CircuitMessage {
    type Error = CodecError;

    fn try_from(circuit: &Circuit) -> CodecResult<Self> {
        let nodes = circuit
            .nodes()
            .iter()
            .map(NodeMessage::try_from)
            .collect::<CodecResult<Vec<_>>>()?;
        Ok(Self { nodes })
    }
}

impl TryFrom<&Node> for NodeMessage {
    type Error = CodecError;

    fn try_from(node: &Node) -> CodecResult<Self> {
        let message = match node {
            Node::Block(block) => NodeMessage::Block {
                text: format_instructions(&block.instructions),
                capture_as_last: block.capture_as_last,
            },
            Node::If { cond, body } => NodeMessage::If {
                condition: cond.try_into()?,
                body: body.try_into()?,
            },
            Node::While {
                cond,
                body,
                max_iterations,
            } => NodeMessage::While {
                condition: cond.try_into()?,
                body: body.try_into()?,
                max_iterations: *max_iterations,
            },
            Node::DoWhile {
                cond,
                body,
                max_iterations,
            } => NodeMessage::DoWhile {
                condition: cond.try_into()?,
                body: body.try_into()?,
                max_iterations: *max_iterations,
            },
            Node::Let { .. } | Node::Emit { .. } => {
                return Err(CodecError::Unsupported { kind: node.kind() });
            }
        };
        Ok(message)
    }
}

impl TryFrom<&CircuitMessage> for Circuit {
    type Error = CodecError;

    fn try_from(msg: &CircuitMessage) -> CodecResult<Self> {
        let mut circuit = Circuit::new();
        for node in &msg.nodes {
            match node {
                NodeMessage::Block {
                    text,
                    capture_as_last,
                } => {
                    circuit.block_with(text.as_str(), *capture_as_last)?;
                }
                NodeMessage::If { condition, body } => {
                    circuit.conditional(Cond::from(condition), Circuit::try_from(body)?)?;
                }
                NodeMessage::While {
                    condition,
                    body,
                    max_iterations,
                } => {
                    circuit.while_loop_with_limit(
                        Cond::from(condition),
                        Circuit::try_from(body)?,
                        budget(*max_iterations),
                    )?;
                }
                NodeMessage::DoWhile {
                    condition,
                    body,
                    max_iterations,
                } => {
                    circuit.do_while_with_limit(
                        Circuit::try_from(body)?,
                        Cond::from(condition),
                        budget(*max_iterations),
                    )?;
                }
            }
        }
        Ok(circuit)
    }
}

fn budget(max_iterations: u32) -> u32 {
    if max_iterations == 0 {
        DEFAULT_MAX_ITERATIONS
    } else {
        max_iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qflow_ir::Expr;

    #[test]
    fn test_condition_messages() {
        let cond = Condition::from(Cond::meas_parity([0, -1]));
        let msg = ConditionMessage::try_from(&cond).unwrap();
        assert_eq!(
            msg,
            ConditionMessage::MeasParity {
                indices: vec![0, -1]
            }
        );
        assert_eq!(Cond::from(&msg), Cond::meas_parity([0, -1]));

        let expr = Condition::from(Expr::rec(-1));
        assert!(matches!(
            ConditionMessage::try_from(&expr),
            Err(CodecError::Unsupported { kind: "Expr" })
        ));
    }

    #[test]
    fn test_zero_budget_becomes_default() {
        assert_eq!(budget(0), DEFAULT_MAX_ITERATIONS);
        assert_eq!(budget(7), 7);
    }

    #[test]
    fn test_block_capture_defaults_to_true() {
        let node: NodeMessage = serde_json::from_str(r#"{"type": "block", "text": "M 0"}"#).unwrap();
        assert_eq!(
            node,
            NodeMessage::Block {
                text: "M 0".into(),
                capture_as_last: true
            }
        );
    }
}
