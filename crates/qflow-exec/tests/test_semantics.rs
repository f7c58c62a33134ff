//! End-to-end interpreter semantics over the statevector simulator.

use qflow_exec::{CircuitExt, DynamicSampler, ExecError};
use qflow_ir::{Circuit, Cond, EvalContext, EvalError, Expr, Predicate, Value};

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn known_state_measures_deterministically_for_any_seed() {
    let zero = Circuit::parse("M 0").unwrap();
    let one = Circuit::parse("X 0\nM 0").unwrap();
    for seed in [0_u64, 1, 7, 99, 12345] {
        for record in zero.compile_sampler(Some(seed)).sample(5).unwrap() {
            assert_eq!(record, vec![false]);
        }
        for record in one.compile_sampler(Some(seed)).sample(5).unwrap() {
            assert_eq!(record, vec![true]);
        }
    }
}

#[test]
fn same_seed_gives_same_traces() {
    let mut c = Circuit::new();
    c.block("H 0 1 2\nM 0 1 2").unwrap();
    c.conditional(Cond::meas_parity([0, 1, 2]), "H 3\nM 3").unwrap();
    c.emit(Expr::rec(-1));

    let a = DynamicSampler::new(c.clone(), Some(2024))
        .sample_with_classical(40)
        .unwrap();
    let b = DynamicSampler::new(c, Some(2024))
        .sample_with_classical(40)
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn shots_are_isolated() {
    let mut c = Circuit::new();
    c.block("X 0\nM 0").unwrap();
    c.let_var("k", Expr::add(Expr::rec(-1), Expr::literal(1_i64)));
    for shot in c.compile_sampler(Some(5)).sample_with_classical(4).unwrap() {
        assert_eq!(shot.measurements, vec![true]);
        assert_eq!(shot.variables.get("k"), Some(&Value::Int(2)));
    }
}

// ---------------------------------------------------------------------------
// Loops
// ---------------------------------------------------------------------------

#[test]
fn do_while_runs_body_once_when_condition_starts_false() {
    let mut c = Circuit::new();
    c.block("M 0").unwrap();
    c.do_while("M 2", Cond::last_meas(0)).unwrap();
    let records = c.compile_sampler(Some(0)).sample(3).unwrap();
    for record in records {
        assert_eq!(record, vec![false, false]);
    }
}

#[test]
fn while_skips_body_when_condition_starts_false() {
    let mut c = Circuit::new();
    c.block("M 0").unwrap();
    c.while_loop(Cond::last_meas(0), "M 2").unwrap();
    let records = c.compile_sampler(Some(0)).sample(3).unwrap();
    for record in records {
        assert_eq!(record, vec![false]);
    }
}

#[test]
fn while_budget_exceeded_is_an_error() {
    let mut c = Circuit::new();
    c.block("X 0\nM 0").unwrap();
    c.while_loop_with_limit(Cond::last_meas(0), "M 0", 7).unwrap();
    let result = c.compile_sampler(Some(1)).sample(2);
    assert_eq!(
        result,
        Err(ExecError::IterationBudgetExceeded {
            kind: "While",
            max_iterations: 7
        })
    );
}

#[test]
fn do_while_budget_counts_first_iteration() {
    let mut c = Circuit::new();
    c.do_while_with_limit("X 0\nM 0\nX 0", Cond::last_meas(0), 1)
        .unwrap();
    assert_eq!(
        c.compile_sampler(None).sample(1),
        Err(ExecError::IterationBudgetExceeded {
            kind: "DoWhile",
            max_iterations: 1
        })
    );

    let mut ok = Circuit::new();
    ok.do_while_with_limit("M 0", Cond::last_meas(0), 1).unwrap();
    assert_eq!(ok.compile_sampler(None).sample(1).unwrap(), vec![vec![false]]);
}

#[test]
fn loop_body_may_reach_exactly_the_budget() {
    let mut body = Circuit::new();
    body.block("M 0")
        .unwrap()
        .let_var("i", Expr::add(Expr::var("i"), Expr::literal(1_i64)))
        .let_var(
            "done",
            Predicate::new(|ctx| {
                let i = ctx.variable("i").map_or(0, Value::as_int);
                Ok(Value::Bool(i >= 4))
            }),
        );

    let mut c = Circuit::new();
    c.let_var("i", 0_i64).let_var("done", false);
    c.while_loop_with_limit(Expr::not(Expr::var("done")), body, 4)
        .unwrap();

    let shots = c.compile_sampler(Some(0)).sample_with_classical(1).unwrap();
    assert_eq!(shots[0].measurements.len(), 4);
    assert_eq!(shots[0].variables.get("i"), Some(&Value::Int(4)));
    assert_eq!(shots[0].variables.get("done"), Some(&Value::Bool(true)));
}

#[test]
fn unbound_variable_in_condition_is_an_error() {
    let mut c = Circuit::new();
    c.while_loop(Expr::var("done"), "M 0").unwrap();
    assert!(matches!(
        c.compile_sampler(Some(0)).sample(1),
        Err(ExecError::Eval(EvalError::MissingBinding(_)))
    ));
}

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

#[test]
fn parity_matches_xor_of_record_bits() {
    let mut c = Circuit::new();
    c.block("H 0 1 2\nM 0 1 2").unwrap();
    c.conditional(Cond::meas_parity([0, 2]), "X 3").unwrap();
    c.block("M 3").unwrap();
    c.emit(Expr::xor(Expr::rec(2), Expr::rec(0)));
    c.emit(Expr::xor(Expr::rec(-1), Expr::rec(-4)));
    let shots = c.compile_sampler(Some(11)).sample_with_classical(30).unwrap();
    for shot in shots {
        let m = &shot.measurements;
        assert_eq!(m[3], m[0] ^ m[2]);
        assert_eq!(shot.outputs, vec![m[0] ^ m[2], m[3] ^ m[0]]);
    }
}

#[test]
fn parity_of_last_bit_is_that_bit() {
    let mut c = Circuit::new();
    c.block("H 0\nM 0").unwrap();
    c.conditional(Cond::meas_parity([-1]), "X 1").unwrap();
    c.block("M 1").unwrap();
    for record in c.compile_sampler(Some(8)).sample(20).unwrap() {
        assert_eq!(record[0], record[1]);
    }
}

#[test]
fn last_meas_sees_only_latest_capturing_block() {
    let mut c = Circuit::new();
    c.block("X 0 1\nM 0 1").unwrap();
    c.block("M 2 3").unwrap();
    c.block_with("X 4\nM 4", false).unwrap();
    c.emit(Expr::rec(-1));
    c.conditional(Cond::last_meas(0), "X 5").unwrap();
    c.conditional(Cond::last_meas(1), "X 5").unwrap();
    c.block_with("M 5", false).unwrap();
    let shots = c.compile_sampler(Some(0)).sample_with_classical(1).unwrap();
    assert_eq!(
        shots[0].measurements,
        vec![true, true, false, false, true, false]
    );
    assert_eq!(shots[0].outputs, vec![true]);
}

#[test]
fn last_meas_out_of_window_is_an_error() {
    let mut c = Circuit::new();
    c.block("M 0").unwrap();
    c.conditional(Cond::last_meas(1), "X 0").unwrap();
    assert_eq!(
        c.compile_sampler(Some(0)).sample(1),
        Err(ExecError::Eval(EvalError::WindowIndexOutOfRange {
            index: 1,
            len: 1
        }))
    );
}

#[test]
fn parity_out_of_record_is_an_error() {
    let mut c = Circuit::new();
    c.block("M 0").unwrap();
    c.conditional(Cond::meas_parity([-2]), "X 0").unwrap();
    assert_eq!(
        c.compile_sampler(Some(0)).sample(1),
        Err(ExecError::Eval(EvalError::RecordIndexOutOfRange {
            index: -2,
            len: 1
        }))
    );
}

#[test]
fn predicate_conditions_are_evaluated() {
    let mut c = Circuit::new();
    c.block("X 0\nM 0").unwrap();
    c.conditional(
        Predicate::from_fn(|ctx| ctx.measurements().iter().all(|&b| b)),
        "M 0",
    )
    .unwrap();
    assert_eq!(
        c.compile_sampler(Some(0)).sample(1).unwrap(),
        vec![vec![true, true]]
    );
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn feed_forward_copies_measurement() {
    let mut c = Circuit::new();
    c.block("H 0\nM 0").unwrap();
    c.conditional(Cond::last_meas(0), "X 1").unwrap();
    c.block("M 1").unwrap();
    let records = c.compile_sampler(Some(99)).sample(64).unwrap();
    assert!(records.iter().any(|r| r[0]));
    assert!(records.iter().any(|r| !r[0]));
    for record in records {
        assert_eq!(record.len(), 2);
        assert_eq!(record[0], record[1]);
    }
}

#[test]
fn repeat_until_success_ends_on_false() {
    let mut c = Circuit::new();
    c.do_while_with_limit("H 0\nM 0", Cond::last_meas(0), 100)
        .unwrap();
    for seed in [0_u64, 3, 17] {
        for record in c.compile_sampler(Some(seed)).sample(25).unwrap() {
            assert_eq!(record.last(), Some(&false));
            assert!(record[..record.len() - 1].iter().all(|&b| b));
        }
    }
}
