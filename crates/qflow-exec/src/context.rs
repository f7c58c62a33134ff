//! Per-shot execution context.

use qflow_ir::{Block, ClassicalState, EvalContext, Value};
use qflow_sim::Simulator;
use tracing::trace;

use crate::error::ExecResult;

/// Runtime state of one shot: a simulator handle and the classical state.
///
/// Created at the start of a shot and dropped at its end.
pub struct ExecContext<S> {
    simulator: S,
    state: ClassicalState,
}

impl<S: Simulator> ExecContext<S> {
    /// Fresh context with an empty record, window, variables and outputs.
    pub fn new(simulator: S) -> Self {
        Self {
            simulator,
            state: ClassicalState::new(),
        }
    }

    /// The simulator.
    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    /// The classical state.
    pub fn state(&self) -> &ClassicalState {
        &self.state
    }

    /// Drop the simulator and keep the classical state.
    pub fn into_state(self) -> ClassicalState {
        self.state
    }

    /// Submit a block and record what it produced.
    pub(crate) fn run_block(&mut self, block: &Block) -> ExecResult<()> {
        let bits = self.simulator.apply(&block.instructions)?;
        trace!(
            produced = bits.len(),
            capture = block.capture_as_last,
            "Block executed"
        );
        self.state.record_block(&bits, block.capture_as_last);
        Ok(())
    }

    pub(crate) fn bind(&mut self, name: &str, value: Value) {
        self.state.bind(name, value);
    }

    pub(crate) fn push_output(&mut self, bit: bool, name: Option<&str>) {
        self.state.push_output(bit, name);
    }
}

impl<S> EvalContext for ExecContext<S> {
    fn measurements(&self) -> &[bool] {
        self.state.record()
    }

    fn last_block(&self) -> &[bool] {
        self.state.window()
    }

    fn variable(&self, name: &str) -> Option<Value> {
        self.state.variable(name)
    }
}
