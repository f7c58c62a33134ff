//! Structured dataflow module produced by the lowering pass.
//!
//! Every value is defined exactly once. Operations consume the identities
//! of their inputs and produce fresh identities for their outputs; control
//! flow is expressed by operations that own nested [`Region`]s.

use std::fmt;
use std::path::Path;

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::error::{ExportError, ExportResult};

/// Identity of one SSA value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Type of an SSA value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// A qubit handle.
    Qubit,
    /// A single classical bit.
    Bit,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Qubit => write!(f, "qubit"),
            ValueType::Bit => write!(f, "i1"),
        }
    }
}

/// What an operation does.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OpKind {
    /// Allocate a qubit in |0⟩: `() -> (qubit)`.
    QubitAlloc,
    /// Release a qubit: `(qubit) -> ()`.
    QubitFree,
    /// Apply a named gate.
    ///
    /// Inputs are the target qubits followed by `num_controls` control
    /// qubits; outputs follow the same order.
    Gate {
        name: String,
        adjoint: bool,
        num_controls: u32,
    },
    /// Non-destructive Z measurement: `(qubit) -> (qubit, bit)`.
    MeasureNd,
    /// Reset to |0⟩: `(qubit) -> (qubit)`.
    Reset,
    /// `(bit, bit) -> (bit)`.
    Xor,
    /// `() -> (bit)`.
    ConstBit { value: bool },
    /// Two-way select: inputs are the selector bit followed by the state;
    /// branch 0 runs when the selector is false, branch 1 when it is true.
    Select { branches: Vec<Region> },
    /// Check `condition`, run `body`, repeat.
    While { condition: Region, body: Region },
    /// Run `body`, check `condition`, repeat.
    DoWhile { body: Region, condition: Region },
}

impl OpKind {
    /// Textual mnemonic.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            OpKind::QubitAlloc => "qubit.alloc",
            OpKind::QubitFree => "qubit.free",
            OpKind::Gate { .. } => "qubit.gate",
            OpKind::MeasureNd => "qubit.measure_nd",
            OpKind::Reset => "qubit.reset",
            OpKind::Xor => "int.xor",
            OpKind::ConstBit { .. } => "int.const",
            OpKind::Select { .. } => "scf.select",
            OpKind::While { .. } => "scf.while",
            OpKind::DoWhile { .. } => "scf.do_while",
        }
    }

    /// Nested regions, in evaluation order.
    pub fn regions(&self) -> Vec<&Region> {
        match self {
            OpKind::Select { branches } => branches.iter().collect(),
            OpKind::While { condition, body } => vec![condition, body],
            OpKind::DoWhile { body, condition } => vec![body, condition],
            _ => Vec::new(),
        }
    }
}

/// One operation with its value wiring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataflowOp {
    #[serde(flatten)]
    pub kind: OpKind,
    pub inputs: Vec<ValueId>,
    pub outputs: Vec<ValueId>,
}

impl DataflowOp {
    pub fn new(kind: OpKind, inputs: Vec<ValueId>, outputs: Vec<ValueId>) -> Self {
        Self {
            kind,
            inputs,
            outputs,
        }
    }
}

/// A sequence of operations with explicit entry and exit values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Region {
    pub sources: Vec<ValueId>,
    pub targets: Vec<ValueId>,
    pub operations: Vec<DataflowOp>,
}

impl Region {
    pub fn new(sources: Vec<ValueId>, targets: Vec<ValueId>, operations: Vec<DataflowOp>) -> Self {
        Self {
            sources,
            targets,
            operations,
        }
    }

    /// Region returning its sources unchanged.
    pub fn passthrough(values: Vec<ValueId>) -> Self {
        Self::new(values.clone(), values, Vec::new())
    }

    /// Number of operations, counting nested regions.
    pub fn num_operations(&self) -> usize {
        self.operations
            .iter()
            .map(|op| 1 + op.kind.regions().iter().map(|r| r.num_operations()).sum::<usize>())
            .sum()
    }
}

/// A named function whose body is a single region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub name: String,
    pub body: Region,
}

/// A complete dataflow module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataflowModule {
    /// Functions of the module.
    pub functions: Vec<Function>,
    /// Index of the entry function.
    pub entrypoint: usize,
    /// Type of every value, indexed by [`ValueId`].
    pub values: Vec<ValueType>,
}

impl DataflowModule {
    /// The entry function.
    pub fn entry(&self) -> Option<&Function> {
        self.functions.get(self.entrypoint)
    }

    /// Type of a value.
    pub fn value_type(&self, id: ValueId) -> Option<ValueType> {
        self.values.get(id.0 as usize).copied()
    }

    /// Number of values defined in the module.
    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> ExportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON form to `path`.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> ExportResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Check structural invariants.
    ///
    /// - every value is defined once and before it is used
    /// - operand and result counts and types match each operation kind
    /// - select branches and loop bodies map the op's state to a state of
    ///   the same arity; loop conditions map it to a single bit
    pub fn validate(&self) -> ExportResult<()> {
        if self.entry().is_none() {
            return Err(ExportError::InvalidModule(format!(
                "entrypoint {} out of range for {} functions",
                self.entrypoint,
                self.functions.len()
            )));
        }
        let mut checker = Checker {
            module: self,
            defined: FxHashSet::default(),
        };
        for function in &self.functions {
            checker.region(&function.body)?;
        }
        Ok(())
    }
}

struct Checker<'a> {
    module: &'a DataflowModule,
    defined: FxHashSet<ValueId>,
}

impl Checker<'_> {
    fn ty(&self, id: ValueId) -> ExportResult<ValueType> {
        self.module
            .value_type(id)
            .ok_or_else(|| ExportError::InvalidModule(format!("unknown value {id}")))
    }

    fn use_value(&self, id: ValueId) -> ExportResult<ValueType> {
        if !self.defined.contains(&id) {
            return Err(ExportError::InvalidModule(format!(
                "value {id} used before definition"
            )));
        }
        self.ty(id)
    }

    fn define(&mut self, id: ValueId) -> ExportResult<ValueType> {
        if !self.defined.insert(id) {
            return Err(ExportError::InvalidModule(format!(
                "value {id} defined twice"
            )));
        }
        self.ty(id)
    }

    fn region(&mut self, region: &Region) -> ExportResult<()> {
        for &id in &region.sources {
            self.use_value(id)?;
        }
        for op in &region.operations {
            self.operation(op)?;
        }
        for &id in &region.targets {
            self.use_value(id)?;
        }
        Ok(())
    }

    fn types_of(&self, ids: &[ValueId]) -> ExportResult<Vec<ValueType>> {
        ids.iter().map(|&id| self.ty(id)).collect()
    }

    fn operation(&mut self, op: &DataflowOp) -> ExportResult<()> {
        let mut inputs = Vec::with_capacity(op.inputs.len());
        for &id in &op.inputs {
            inputs.push(self.use_value(id)?);
        }
        for region in op.kind.regions() {
            self.region(region)?;
        }
        let mut outputs = Vec::with_capacity(op.outputs.len());
        for &id in &op.outputs {
            outputs.push(self.define(id)?);
        }

        use ValueType::{Bit, Qubit};
        let mismatch = || {
            ExportError::InvalidModule(format!(
                "{} expects a different signature, got ({}) -> ({})",
                op.kind.mnemonic(),
                join(&op.inputs),
                join(&op.outputs)
            ))
        };
        match &op.kind {
            OpKind::QubitAlloc => check(inputs.is_empty() && outputs == [Qubit], mismatch),
            OpKind::QubitFree => check(inputs == [Qubit] && outputs.is_empty(), mismatch),
            OpKind::Gate { num_controls, .. } => check(
                !inputs.is_empty()
                    && (*num_controls as usize) < inputs.len()
                    && inputs.iter().all(|t| *t == Qubit)
                    && inputs == outputs,
                mismatch,
            ),
            OpKind::MeasureNd => check(inputs == [Qubit] && outputs == [Qubit, Bit], mismatch),
            OpKind::Reset => check(inputs == [Qubit] && outputs == [Qubit], mismatch),
            OpKind::Xor => check(inputs == [Bit, Bit] && outputs == [Bit], mismatch),
            OpKind::ConstBit { .. } => check(inputs.is_empty() && outputs == [Bit], mismatch),
            OpKind::Select { branches } => {
                check(
                    branches.len() == 2 && inputs.first() == Some(&Bit),
                    mismatch,
                )?;
                let state = &inputs[1..];
                check(state == outputs.as_slice(), mismatch)?;
                for branch in branches {
                    self.state_region(branch, state)?;
                }
                Ok(())
            }
            OpKind::While { condition, body } | OpKind::DoWhile { body, condition } => {
                check(inputs == outputs, mismatch)?;
                self.state_region(body, &inputs)?;
                self.condition_region(condition, inputs.len())
            }
        }
    }

    fn state_region(&self, region: &Region, state: &[ValueType]) -> ExportResult<()> {
        let sources = self.types_of(&region.sources)?;
        let targets = self.types_of(&region.targets)?;
        if sources != state || targets != state {
            return Err(ExportError::InvalidModule(format!(
                "region arity mismatch: expected {} values, got {} sources and {} targets",
                state.len(),
                sources.len(),
                targets.len()
            )));
        }
        Ok(())
    }

    fn condition_region(&self, region: &Region, arity: usize) -> ExportResult<()> {
        let targets = self.types_of(&region.targets)?;
        if region.sources.len() != arity || targets != [ValueType::Bit] {
            return Err(ExportError::InvalidModule(format!(
                "condition region must map {arity} values to one bit, got {} sources and {} targets",
                region.sources.len(),
                targets.len()
            )));
        }
        Ok(())
    }
}

fn check(ok: bool, err: impl FnOnce() -> ExportError) -> ExportResult<()> {
    if ok { Ok(()) } else { Err(err()) }
}

fn join(ids: &[ValueId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Text form
// =============================================================================

impl fmt::Display for DataflowModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "module {{")?;
        for (i, function) in self.functions.iter().enumerate() {
            let entry = if i == self.entrypoint { " entry" } else { "" };
            writeln!(f, "  func @{}{entry} {{", function.name)?;
            write_ops(f, &function.body.operations, 2)?;
            writeln!(f, "  }}")?;
        }
        writeln!(f, "}}")
    }
}

fn write_ops(f: &mut fmt::Formatter<'_>, ops: &[DataflowOp], indent: usize) -> fmt::Result {
    let pad = "  ".repeat(indent);
    for op in ops {
        write!(f, "{pad}")?;
        if !op.outputs.is_empty() {
            write!(f, "{} = ", join(&op.outputs))?;
        }
        write!(f, "{}", op.kind.mnemonic())?;
        match &op.kind {
            OpKind::Gate {
                name,
                adjoint,
                num_controls,
            } => {
                write!(f, " \"{name}\"")?;
                if *adjoint {
                    write!(f, " adj")?;
                }
                if *num_controls > 0 {
                    write!(f, " ctrl({num_controls})")?;
                }
            }
            OpKind::ConstBit { value } => write!(f, " {}", u8::from(*value))?,
            _ => {}
        }
        if !op.inputs.is_empty() {
            write!(f, " {}", join(&op.inputs))?;
        }
        let regions = op.kind.regions();
        if regions.is_empty() {
            writeln!(f)?;
            continue;
        }
        writeln!(f, " {{")?;
        for region in regions {
            writeln!(
                f,
                "{pad}  ({}) -> ({}) {{",
                join(&region.sources),
                join(&region.targets)
            )?;
            write_ops(f, &region.operations, indent + 2)?;
            writeln!(f, "{pad}  }}")?;
        }
        writeln!(f, "{pad}}}")?;
    }
    Ok(())
}
