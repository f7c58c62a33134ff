//! Structured conditions over measurement results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::EvalContext;
use crate::error::EvalResult;

/// A structured, serializable condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cond {
    /// True iff bit `index` of the last-block window is set.
    LastMeas {
        /// Position inside the window.
        index: usize,
    },
    /// True iff an odd number of the referenced record bits are set.
    ///
    /// Negative indices count from the end of the record at evaluation time.
    /// An empty index list is always false.
    MeasParity {
        /// Record positions.
        indices: Vec<i64>,
    },
}

impl Cond {
    /// `LastMeas(index)`.
    pub fn last_meas(index: usize) -> Self {
        Cond::LastMeas { index }
    }

    /// `MeasParity(indices)`.
    pub fn meas_parity(indices: impl IntoIterator<Item = i64>) -> Self {
        Cond::MeasParity {
            indices: indices.into_iter().collect(),
        }
    }

    /// Evaluate against a context without modifying it.
    pub fn eval<C: EvalContext + ?Sized>(&self, ctx: &C) -> EvalResult<bool> {
        match self {
            Cond::LastMeas { index } => ctx.last(*index),
            Cond::MeasParity { indices } => indices
                .iter()
                .try_fold(false, |acc, &i| -> EvalResult<bool> { Ok(acc ^ ctx.rec(i)?) }),
        }
    }

    /// Name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Cond::LastMeas { .. } => "LastMeas",
            Cond::MeasParity { .. } => "MeasParity",
        }
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cond::LastMeas { index } => write!(f, "LastMeas({index})"),
            Cond::MeasParity { indices } => {
                let parts: Vec<String> = indices.iter().map(ToString::to_string).collect();
                write!(f, "MeasParity([{}])", parts.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ClassicalState;
    use crate::error::EvalError;

    fn state(record: &[bool], window: &[bool]) -> ClassicalState {
        let mut s = ClassicalState::new();
        s.record_block(record, false);
        s.record_block(window, true);
        s
    }

    #[test]
    fn test_last_meas() {
        let s = state(&[true, true], &[false, true]);
        assert_eq!(Cond::last_meas(0).eval(&s), Ok(false));
        assert_eq!(Cond::last_meas(1).eval(&s), Ok(true));
        assert_eq!(
            Cond::last_meas(2).eval(&s),
            Err(EvalError::WindowIndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_parity() {
        let s = state(&[true, false, true], &[]);
        assert_eq!(Cond::meas_parity([0, 1]).eval(&s), Ok(true));
        assert_eq!(Cond::meas_parity([0, 2]).eval(&s), Ok(false));
        assert_eq!(Cond::meas_parity([-1]).eval(&s), Ok(true));
        assert_eq!(Cond::meas_parity(Vec::new()).eval(&s), Ok(false));
        assert!(matches!(
            Cond::meas_parity([-4]).eval(&s),
            Err(EvalError::RecordIndexOutOfRange { index: -4, .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Cond::last_meas(3).to_string(), "LastMeas(3)");
        assert_eq!(Cond::meas_parity([0, -1]).to_string(), "MeasParity([0, -1])");
    }
}
