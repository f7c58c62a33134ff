//! Lowering of a dynamic circuit into a [`DataflowModule`].

use rustc_hash::FxHashMap;
use tracing::{debug, info, instrument, trace};

use qflow_ir::{Circuit, Cond, Condition, Instruction, Node, OpCode, Operation};

use crate::dataflow::{DataflowModule, DataflowOp, Function, OpKind, Region, ValueId, ValueType};
use crate::error::{ExportError, ExportResult};
use crate::state::ExportState;

/// Gate lowering: dataflow name, adjoint flag and qubit grouping.
#[derive(Debug, Clone, Copy)]
struct GateSpec {
    name: &'static str,
    adjoint: bool,
    arity: Arity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arity {
    /// One gate per target.
    Single,
    /// One gate per (control, target) pair.
    Controlled,
    /// One gate per symmetric pair.
    Pair,
}

fn gate_spec(opcode: OpCode) -> Option<GateSpec> {
    let (name, adjoint, arity) = match opcode {
        OpCode::I => ("i", false, Arity::Single),
        OpCode::X => ("x", false, Arity::Single),
        OpCode::Y => ("y", false, Arity::Single),
        OpCode::Z => ("z", false, Arity::Single),
        OpCode::H => ("h", false, Arity::Single),
        OpCode::S => ("s", false, Arity::Single),
        OpCode::SDag => ("s", true, Arity::Single),
        OpCode::T => ("t", false, Arity::Single),
        OpCode::TDag => ("t", true, Arity::Single),
        OpCode::CX => ("x", false, Arity::Controlled),
        OpCode::CY => ("y", false, Arity::Controlled),
        OpCode::CZ => ("z", false, Arity::Controlled),
        OpCode::Swap => ("swap", false, Arity::Pair),
        _ => return None,
    };
    Some(GateSpec {
        name,
        adjoint,
        arity,
    })
}

/// Id of the value stored at arena position `index`.
fn value_id(index: usize) -> ExportResult<ValueId> {
    u32::try_from(index)
        .map(ValueId)
        .map_err(|_| ExportError::InvalidModule(format!("value index {index} exceeds u32 range")))
}

/// Reject any condition without inspectable structure, anywhere in the tree.
pub fn validate_circuit(circuit: &Circuit) -> ExportResult<()> {
    for node in circuit.nodes() {
        if let Some(cond) = node.condition() {
            if cond.as_structured().is_none() {
                return Err(ExportError::UnstructuredCondition {
                    node: node.kind(),
                    found: cond.kind(),
                });
            }
        }
        if let Some(body) = node.body() {
            validate_circuit(body)?;
        }
    }
    Ok(())
}

/// Lowers one circuit. Construction validates the whole tree, so a
/// rejected circuit never produces any output.
pub struct Exporter<'a> {
    circuit: &'a Circuit,
    /// Qubit index to slot in [`ExportState::qubits`].
    slots: FxHashMap<u32, usize>,
    /// Type of every value created so far.
    values: Vec<ValueType>,
}

impl<'a> Exporter<'a> {
    /// Validate `circuit` and prepare to lower it.
    pub fn new(circuit: &'a Circuit) -> ExportResult<Self> {
        validate_circuit(circuit)?;
        let slots = circuit
            .qubits()
            .into_iter()
            .enumerate()
            .map(|(slot, q)| (q, slot))
            .collect();
        Ok(Self {
            circuit,
            slots,
            values: Vec::new(),
        })
    }

    /// Lower into a module whose single entry function is `name`.
    #[instrument(skip(self))]
    pub fn export(mut self, name: &str) -> ExportResult<DataflowModule> {
        let circuit = self.circuit;
        debug!(
            "Lowering {} nodes over {} qubits",
            circuit.len(),
            self.slots.len()
        );

        // Slots follow ascending qubit order.
        let mut state = ExportState::default();
        for _ in 0..self.slots.len() {
            let outputs =
                self.emit(&mut state, OpKind::QubitAlloc, Vec::new(), &[ValueType::Qubit])?;
            state.qubits.extend(outputs);
        }

        self.lower_nodes(circuit.nodes(), &mut state)?;

        for q in state.qubits.clone() {
            self.emit(&mut state, OpKind::QubitFree, vec![q], &[])?;
        }

        let body = Region::new(Vec::new(), Vec::new(), state.operations);
        let module = DataflowModule {
            functions: vec![Function {
                name: name.to_string(),
                body,
            }],
            entrypoint: 0,
            values: self.values,
        };
        module.validate()?;

        info!(
            function = name,
            operations = module.functions[0].body.num_operations(),
            values = module.num_values(),
            "Lowering completed"
        );
        Ok(module)
    }

    // =========================================================================
    // Value and operation helpers
    // =========================================================================

    fn fresh(&mut self, ty: ValueType) -> ExportResult<ValueId> {
        let id = value_id(self.values.len())?;
        self.values.push(ty);
        Ok(id)
    }

    fn fresh_like(&mut self, ids: &[ValueId]) -> ExportResult<Vec<ValueId>> {
        ids.iter()
            .map(|id| {
                let ty = self.values[id.0 as usize];
                self.fresh(ty)
            })
            .collect()
    }

    fn emit(
        &mut self,
        state: &mut ExportState,
        kind: OpKind,
        inputs: Vec<ValueId>,
        output_types: &[ValueType],
    ) -> ExportResult<Vec<ValueId>> {
        let outputs = output_types
            .iter()
            .map(|&ty| self.fresh(ty))
            .collect::<ExportResult<Vec<_>>>()?;
        state.push(DataflowOp::new(kind, inputs, outputs.clone()));
        Ok(outputs)
    }

    fn slot(&self, qubit: u32) -> ExportResult<usize> {
        self.slots
            .get(&qubit)
            .copied()
            .ok_or_else(|| ExportError::InvalidModule(format!("qubit {qubit} was never allocated")))
    }

    fn gate(
        &mut self,
        state: &mut ExportState,
        name: &str,
        adjoint: bool,
        num_controls: u32,
        qubits: &[u32],
    ) -> ExportResult<()> {
        let slots = qubits
            .iter()
            .map(|&q| self.slot(q))
            .collect::<ExportResult<Vec<_>>>()?;
        let inputs: Vec<ValueId> = slots.iter().map(|&s| state.qubits[s]).collect();
        let types = vec![ValueType::Qubit; inputs.len()];
        let kind = OpKind::Gate {
            name: name.to_string(),
            adjoint,
            num_controls,
        };
        let outputs = self.emit(state, kind, inputs, &types)?;
        for (slot, id) in slots.into_iter().zip(outputs) {
            state.qubits[slot] = id;
        }
        Ok(())
    }

    fn measure(&mut self, state: &mut ExportState, qubit: u32) -> ExportResult<()> {
        let slot = self.slot(qubit)?;
        let input = state.qubits[slot];
        let outputs = self.emit(
            state,
            OpKind::MeasureNd,
            vec![input],
            &[ValueType::Qubit, ValueType::Bit],
        )?;
        state.qubits[slot] = outputs[0];
        state.measurements.push(outputs[1]);
        Ok(())
    }

    fn reset(&mut self, state: &mut ExportState, qubit: u32) -> ExportResult<()> {
        let slot = self.slot(qubit)?;
        let input = state.qubits[slot];
        let outputs = self.emit(state, OpKind::Reset, vec![input], &[ValueType::Qubit])?;
        state.qubits[slot] = outputs[0];
        Ok(())
    }

    // =========================================================================
    // Instructions
    // =========================================================================

    fn lower_instructions(
        &mut self,
        instructions: &[Instruction],
        state: &mut ExportState,
    ) -> ExportResult<()> {
        for inst in instructions {
            match inst {
                Instruction::Op(op) => self.lower_operation(op, state)?,
                Instruction::Repeat { count, body } => {
                    for _ in 0..*count {
                        self.lower_instructions(body, state)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn lower_operation(&mut self, op: &Operation, state: &mut ExportState) -> ExportResult<()> {
        let qubits: Vec<u32> = op.qubits().collect();
        match op.opcode {
            OpCode::M => {
                for &q in &qubits {
                    self.measure(state, q)?;
                }
            }
            OpCode::MX => {
                for &q in &qubits {
                    self.gate(state, "h", false, 0, &[q])?;
                    self.measure(state, q)?;
                    self.gate(state, "h", false, 0, &[q])?;
                }
            }
            OpCode::MY => {
                for &q in &qubits {
                    self.gate(state, "s", true, 0, &[q])?;
                    self.gate(state, "h", false, 0, &[q])?;
                    self.measure(state, q)?;
                    self.gate(state, "h", false, 0, &[q])?;
                    self.gate(state, "s", false, 0, &[q])?;
                }
            }
            OpCode::MR => {
                for &q in &qubits {
                    self.measure(state, q)?;
                    self.reset(state, q)?;
                }
            }
            OpCode::R => {
                for &q in &qubits {
                    self.reset(state, q)?;
                }
            }
            OpCode::RX => {
                for &q in &qubits {
                    self.reset(state, q)?;
                    self.gate(state, "h", false, 0, &[q])?;
                }
            }
            OpCode::RY => {
                for &q in &qubits {
                    self.reset(state, q)?;
                    self.gate(state, "h", false, 0, &[q])?;
                    self.gate(state, "s", false, 0, &[q])?;
                }
            }
            OpCode::Tick
            | OpCode::Detector
            | OpCode::ObservableInclude
            | OpCode::QubitCoords
            | OpCode::ShiftCoords => {
                trace!("Skipping annotation {}", op.opcode);
            }
            opcode => {
                let spec = gate_spec(opcode)
                    .ok_or_else(|| ExportError::UnsupportedInstruction(opcode.name().to_string()))?;
                match spec.arity {
                    Arity::Single => {
                        for &q in &qubits {
                            self.gate(state, spec.name, spec.adjoint, 0, &[q])?;
                        }
                    }
                    Arity::Controlled => {
                        for pair in qubits.chunks_exact(2) {
                            // Target first, then control.
                            self.gate(state, spec.name, spec.adjoint, 1, &[pair[1], pair[0]])?;
                        }
                    }
                    Arity::Pair => {
                        for pair in qubits.chunks_exact(2) {
                            self.gate(state, spec.name, spec.adjoint, 0, pair)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Conditions
    // =========================================================================

    fn lower_condition(
        &mut self,
        cond: &Condition,
        state: &mut ExportState,
    ) -> ExportResult<ValueId> {
        let cond = cond.as_structured().ok_or(ExportError::UnstructuredCondition {
            node: "condition",
            found: cond.kind(),
        })?;
        match cond {
            Cond::LastMeas { index } => Ok(state.last(*index)?),
            Cond::MeasParity { indices } => {
                let bits = indices
                    .iter()
                    .map(|&i| state.rec(i))
                    .collect::<Result<Vec<_>, _>>()?;
                let Some((&first, rest)) = bits.split_first() else {
                    let out = self.emit(
                        state,
                        OpKind::ConstBit { value: false },
                        Vec::new(),
                        &[ValueType::Bit],
                    )?;
                    return Ok(out[0]);
                };
                let mut acc = first;
                for &bit in rest {
                    acc = self.emit(state, OpKind::Xor, vec![acc, bit], &[ValueType::Bit])?[0];
                }
                Ok(acc)
            }
        }
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    fn lower_nodes(&mut self, nodes: &[Node], state: &mut ExportState) -> ExportResult<()> {
        for node in nodes {
            self.lower_node(node, state)?;
        }
        Ok(())
    }

    /// Lower one node into `state`.
    ///
    /// Control nodes carry only the enclosing state (qubits, then the bits
    /// measured so far) through their regions. Bits measured inside a branch
    /// or loop body are local to it: a `While` condition is lowered against
    /// the state on loop entry, so a `LastMeas` condition reads the same
    /// pre-loop bit on every check even when the body measures again. Only
    /// the `DoWhile` condition sees the bits of the iteration it follows.
    fn lower_node(&mut self, node: &Node, state: &mut ExportState) -> ExportResult<()> {
        match node {
            Node::Block(block) => {
                let start = state.measurements.len();
                self.lower_instructions(&block.instructions, state)?;
                if block.capture_as_last {
                    state.capture_window(start);
                }
            }

            Node::If { cond, body } => {
                let selector = self.lower_condition(cond, state)?;
                let inputs = state.values();

                let mut taken = state.fork();
                self.lower_nodes(body.nodes(), &mut taken)?;
                let branches = vec![
                    Region::passthrough(inputs.clone()),
                    Region::new(inputs.clone(), taken.prefix(inputs.len()), taken.operations),
                ];

                let outputs = self.fresh_like(&inputs)?;
                let mut op_inputs = Vec::with_capacity(inputs.len() + 1);
                op_inputs.push(selector);
                op_inputs.extend(inputs);
                state.push(DataflowOp::new(
                    OpKind::Select { branches },
                    op_inputs,
                    outputs.clone(),
                ));
                state.adopt(&outputs);
            }

            Node::While { cond, body, .. } => {
                let inputs = state.values();

                let mut check = state.fork();
                let bit = self.lower_condition(cond, &mut check)?;
                let condition = Region::new(inputs.clone(), vec![bit], check.operations);

                let mut iteration = state.fork();
                self.lower_nodes(body.nodes(), &mut iteration)?;
                let body = Region::new(
                    inputs.clone(),
                    iteration.prefix(inputs.len()),
                    iteration.operations,
                );

                let outputs = self.fresh_like(&inputs)?;
                state.push(DataflowOp::new(
                    OpKind::While { condition, body },
                    inputs,
                    outputs.clone(),
                ));
                state.adopt(&outputs);
            }

            Node::DoWhile { cond, body, .. } => {
                let inputs = state.values();

                let mut iteration = state.fork();
                self.lower_nodes(body.nodes(), &mut iteration)?;
                let carried = iteration.prefix(inputs.len());

                // The condition sees everything the body produced.
                let mut check = iteration.fork();
                let bit = self.lower_condition(cond, &mut check)?;
                let condition = Region::new(carried.clone(), vec![bit], check.operations);
                let body = Region::new(inputs.clone(), carried, iteration.operations);

                let outputs = self.fresh_like(&inputs)?;
                state.push(DataflowOp::new(
                    OpKind::DoWhile { body, condition },
                    inputs,
                    outputs.clone(),
                ));
                state.adopt(&outputs);
            }

            Node::Let { name, .. } => trace!("Omitting Let {}", name),
            Node::Emit { .. } => trace!("Omitting Emit"),
        }
        Ok(())
    }
}

/// Lower `circuit` into a module with entry function `name`.
pub fn to_dataflow(circuit: &Circuit, name: &str) -> ExportResult<DataflowModule> {
    Exporter::new(circuit)?.export(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(module: &DataflowModule) -> &[DataflowOp] {
        &module.functions[0].body.operations
    }

    #[test]
    fn test_value_id_range() {
        assert_eq!(value_id(7).unwrap(), ValueId(7));
        assert_eq!(value_id(u32::MAX as usize).unwrap(), ValueId(u32::MAX));
        #[cfg(target_pointer_width = "64")]
        assert!(matches!(
            value_id(u32::MAX as usize + 1),
            Err(ExportError::InvalidModule(_))
        ));
    }

    #[test]
    fn test_allocates_and_frees_in_qubit_order() {
        let c = Circuit::parse("H 5\nH 2").unwrap();
        let m = to_dataflow(&c, "main").unwrap();
        let ops = ops(&m);
        assert_eq!(ops[0].kind, OpKind::QubitAlloc);
        assert_eq!(ops[1].kind, OpKind::QubitAlloc);
        // H 5 touches the second slot.
        assert_eq!(ops[2].inputs, vec![ops[1].outputs[0]]);
        assert_eq!(ops[3].inputs, vec![ops[0].outputs[0]]);
        assert_eq!(ops[4].inputs, ops[3].outputs);
        assert_eq!(ops[5].inputs, ops[2].outputs);
        assert_eq!(ops.len(), 6);
    }

    #[test]
    fn test_controlled_gate_orders_target_first() {
        let c = Circuit::parse("CX 0 1").unwrap();
        let m = to_dataflow(&c, "main").unwrap();
        let cx = &ops(&m)[2];
        assert_eq!(
            cx.kind,
            OpKind::Gate {
                name: "x".into(),
                adjoint: false,
                num_controls: 1
            }
        );
        let q0 = ops(&m)[0].outputs[0];
        let q1 = ops(&m)[1].outputs[0];
        assert_eq!(cx.inputs, vec![q1, q0]);
    }

    #[test]
    fn test_basis_measurement_wraps_with_basis_change() {
        let c = Circuit::parse("MY 0").unwrap();
        let m = to_dataflow(&c, "main").unwrap();
        let names: Vec<String> = ops(&m)
            .iter()
            .map(|op| match &op.kind {
                OpKind::Gate { name, adjoint, .. } if *adjoint => format!("{name}_dag"),
                OpKind::Gate { name, .. } => name.clone(),
                other => other.mnemonic().to_string(),
            })
            .collect();
        assert_eq!(
            names,
            vec![
                "qubit.alloc",
                "s_dag",
                "h",
                "qubit.measure_nd",
                "h",
                "s",
                "qubit.free"
            ]
        );
    }

    #[test]
    fn test_repeat_is_unrolled() {
        let c = Circuit::parse("REPEAT 3 {\nM 0\n}").unwrap();
        let m = to_dataflow(&c, "main").unwrap();
        let measures = ops(&m)
            .iter()
            .filter(|op| op.kind == OpKind::MeasureNd)
            .count();
        assert_eq!(measures, 3);
    }

    #[test]
    fn test_noise_is_unsupported() {
        let c = Circuit::parse("X_ERROR(0.1) 0").unwrap();
        assert!(matches!(
            to_dataflow(&c, "main"),
            Err(ExportError::UnsupportedInstruction(name)) if name == "X_ERROR"
        ));
    }

    #[test]
    fn test_empty_parity_is_constant_false() {
        let mut c = Circuit::new();
        c.conditional(Cond::meas_parity(Vec::new()), "X 0").unwrap();
        let m = to_dataflow(&c, "main").unwrap();
        assert_eq!(ops(&m)[1].kind, OpKind::ConstBit { value: false });
    }
}
