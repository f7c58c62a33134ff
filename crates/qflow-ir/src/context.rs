//! Runtime classical state seen by conditions and expressions.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, EvalResult};

/// A classical value: a bit or an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
}

impl Value {
    /// Truthiness: `true`, or any non-zero integer.
    #[inline]
    pub fn truthy(self) -> bool {
        match self {
            Value::Bool(b) => b,
            Value::Int(i) => i != 0,
        }
    }

    /// Integer view: booleans count as 0 or 1.
    #[inline]
    pub fn as_int(self) -> i64 {
        match self {
            Value::Bool(b) => i64::from(b),
            Value::Int(i) => i,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
        }
    }
}

/// Resolve a possibly negative index against a sequence length.
///
/// Negative indices count from the end. Returns `None` when the resolved
/// position falls outside `0..len`.
#[inline]
pub fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len_i = i64::try_from(len).ok()?;
    let resolved = if index < 0 { len_i + index } else { index };
    if (0..len_i).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

/// Read-only view of the classical state of one shot.
pub trait EvalContext {
    /// The full measurement record, oldest first.
    fn measurements(&self) -> &[bool];

    /// Bits produced by the most recent capturing block.
    fn last_block(&self) -> &[bool];

    /// Current binding of a classical variable.
    fn variable(&self, name: &str) -> Option<Value>;

    /// Record bit at `index`, negative indices counting from the end.
    fn rec(&self, index: i64) -> EvalResult<bool> {
        let record = self.measurements();
        resolve_index(index, record.len())
            .map(|i| record[i])
            .ok_or(EvalError::RecordIndexOutOfRange {
                index,
                len: record.len(),
            })
    }

    /// Bit at `index` of the last-block window.
    fn last(&self, index: usize) -> EvalResult<bool> {
        let window = self.last_block();
        window
            .get(index)
            .copied()
            .ok_or(EvalError::WindowIndexOutOfRange {
                index,
                len: window.len(),
            })
    }
}

/// Classical bookkeeping for one shot: record, window, variables, outputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassicalState {
    record: Vec<bool>,
    window: Vec<bool>,
    variables: FxHashMap<String, Value>,
    outputs: Vec<bool>,
    output_names: Vec<String>,
}

impl ClassicalState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append freshly produced bits to the record, replacing the window when capturing.
    pub fn record_block(&mut self, bits: &[bool], capture: bool) {
        self.record.extend_from_slice(bits);
        if capture {
            self.window = bits.to_vec();
        }
    }

    /// Bind or rebind a variable.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    /// Append an output bit, and its name when given.
    pub fn push_output(&mut self, bit: bool, name: Option<&str>) {
        self.outputs.push(bit);
        if let Some(name) = name {
            self.output_names.push(name.to_string());
        }
    }

    /// Measurement record.
    pub fn record(&self) -> &[bool] {
        &self.record
    }

    /// Current last-block window.
    pub fn window(&self) -> &[bool] {
        &self.window
    }

    /// Variable bindings.
    pub fn variables(&self) -> &FxHashMap<String, Value> {
        &self.variables
    }

    /// Emitted output bits.
    pub fn outputs(&self) -> &[bool] {
        &self.outputs
    }

    /// Names of named emissions, in order.
    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    /// Split into owned parts: record, outputs, output names, variables.
    pub fn into_parts(self) -> (Vec<bool>, Vec<bool>, Vec<String>, FxHashMap<String, Value>) {
        (self.record, self.outputs, self.output_names, self.variables)
    }
}

impl EvalContext for ClassicalState {
    fn measurements(&self) -> &[bool] {
        &self.record
    }

    fn last_block(&self) -> &[bool] {
        &self.window
    }

    fn variable(&self, name: &str) -> Option<Value> {
        self.variables.get(name).copied()
    }
}
