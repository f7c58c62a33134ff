//! Per-region lowering state.

use qflow_ir::{EvalError, resolve_index};

use crate::dataflow::{DataflowOp, ValueId};

/// Current SSA identities of one region under construction.
///
/// Qubit identities live in slots ordered by qubit index. Forking copies the
/// identity arrays and starts an empty operation list, so sibling regions
/// never share emitted operations.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExportState {
    pub(crate) qubits: Vec<ValueId>,
    pub(crate) measurements: Vec<ValueId>,
    pub(crate) operations: Vec<DataflowOp>,
    window_start: usize,
    window_len: usize,
}

impl ExportState {
    pub(crate) fn new(qubits: Vec<ValueId>) -> Self {
        Self {
            qubits,
            ..Self::default()
        }
    }

    /// Same identities and window, no operations.
    pub(crate) fn fork(&self) -> Self {
        Self {
            qubits: self.qubits.clone(),
            measurements: self.measurements.clone(),
            operations: Vec::new(),
            window_start: self.window_start,
            window_len: self.window_len,
        }
    }

    /// Qubit identities followed by measurement identities.
    pub(crate) fn values(&self) -> Vec<ValueId> {
        self.qubits
            .iter()
            .chain(&self.measurements)
            .copied()
            .collect()
    }

    /// The first `arity` values; identities created past that point stay
    /// local to the region.
    pub(crate) fn prefix(&self, arity: usize) -> Vec<ValueId> {
        let mut values = self.values();
        values.truncate(arity);
        values
    }

    /// Replace the leading identities with the outputs of a control op.
    pub(crate) fn adopt(&mut self, outputs: &[ValueId]) {
        let (qubits, measurements) = outputs.split_at(outputs.len().min(self.qubits.len()));
        self.qubits[..qubits.len()].copy_from_slice(qubits);
        self.measurements[..measurements.len()].copy_from_slice(measurements);
    }

    pub(crate) fn push(&mut self, op: DataflowOp) {
        self.operations.push(op);
    }

    /// Record the measurements produced since `start` as the last block.
    pub(crate) fn capture_window(&mut self, start: usize) {
        self.window_start = start;
        self.window_len = self.measurements.len() - start;
    }

    /// Identity of bit `index` of the last capturing block.
    pub(crate) fn last(&self, index: usize) -> Result<ValueId, EvalError> {
        if index >= self.window_len {
            return Err(EvalError::WindowIndexOutOfRange {
                index,
                len: self.window_len,
            });
        }
        Ok(self.measurements[self.window_start + index])
    }

    /// Identity of record bit `index`, negative counting from the end.
    pub(crate) fn rec(&self, index: i64) -> Result<ValueId, EvalError> {
        let len = self.measurements.len();
        resolve_index(index, len)
            .map(|i| self.measurements[i])
            .ok_or(EvalError::RecordIndexOutOfRange { index, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(range: std::ops::Range<u32>) -> Vec<ValueId> {
        range.map(ValueId).collect()
    }

    #[test]
    fn test_fork_copies_identities_not_operations() {
        let mut state = ExportState::new(ids(0..2));
        state.measurements = ids(2..3);
        state.push(DataflowOp::new(
            crate::dataflow::OpKind::Xor,
            ids(2..4),
            ids(4..5),
        ));
        let fork = state.fork();
        assert_eq!(fork.values(), ids(0..3));
        assert!(fork.operations.is_empty());
    }

    #[test]
    fn test_window_and_record_lookup() {
        let mut state = ExportState::new(ids(0..1));
        state.measurements = ids(1..3);
        state.capture_window(1);
        assert_eq!(state.last(0), Ok(ValueId(2)));
        assert_eq!(
            state.last(1),
            Err(EvalError::WindowIndexOutOfRange { index: 1, len: 1 })
        );
        assert_eq!(state.rec(-2), Ok(ValueId(1)));
        assert_eq!(
            state.rec(2),
            Err(EvalError::RecordIndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_adopt_replaces_prefix() {
        let mut state = ExportState::new(ids(0..2));
        state.measurements = ids(2..4);
        state.adopt(&ids(10..13));
        assert_eq!(state.values(), vec![ValueId(10), ValueId(11), ValueId(12), ValueId(3)]);
        assert_eq!(state.prefix(3), ids(10..13));
    }
}
