//! Circuits used by the demos.

use clap::ValueEnum;

use qflow_ir::{Circuit, Cond, Expr, IrResult};

/// Circuits selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemoCircuit {
    /// Repeat `H; M` until the outcome is 0.
    RepeatUntilSuccess,
    /// Copy a random bit onto a second qubit by feed-forward.
    FeedForward,
    /// Re-prepare two qubits until their parity is even, then emit it.
    EvenParity,
}

impl DemoCircuit {
    /// Build the circuit.
    pub fn build(self, max_iterations: u32) -> IrResult<Circuit> {
        match self {
            DemoCircuit::RepeatUntilSuccess => repeat_until_success(max_iterations),
            DemoCircuit::FeedForward => feed_forward(),
            DemoCircuit::EvenParity => even_parity(max_iterations),
        }
    }

    /// Short description for output.
    pub fn description(self) -> &'static str {
        match self {
            DemoCircuit::RepeatUntilSuccess => {
                "DoWhile(H 0; M 0) while the last outcome is 1; the final bit is always 0"
            }
            DemoCircuit::FeedForward => {
                "H 0; M 0, then X 1 if the outcome was 1; both recorded bits always agree"
            }
            DemoCircuit::EvenParity => {
                "Re-measure two random qubits while their parity is odd; the emitted parity is always 0"
            }
        }
    }
}

/// `DoWhile([H 0, M 0], LastMeas(0))`.
pub fn repeat_until_success(max_iterations: u32) -> IrResult<Circuit> {
    let mut c = Circuit::new();
    c.do_while_with_limit("R 0\nH 0\nM 0", Cond::last_meas(0), max_iterations)?;
    Ok(c)
}

/// Measure a random bit and copy it onto qubit 1.
pub fn feed_forward() -> IrResult<Circuit> {
    let mut c = Circuit::parse("H 0\nM 0")?;
    c.conditional(Cond::last_meas(0), "X 1")?;
    c.block("M 1")?;
    Ok(c)
}

/// Two random bits, re-drawn until their parity is even.
pub fn even_parity(max_iterations: u32) -> IrResult<Circuit> {
    let draw = "R 0 1\nH 0 1\nM 0 1";
    let mut c = Circuit::parse(draw)?;
    c.while_loop_with_limit(Cond::meas_parity([-2, -1]), draw, max_iterations)?;
    c.let_var("parity", Expr::xor(Expr::rec(-2), Expr::rec(-1)));
    c.emit_named(Expr::var("parity"), "parity");
    Ok(c)
}
