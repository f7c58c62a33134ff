//! Tests for the statevector simulator through the `Simulator` trait.

use qflow_ir::{Instruction, OpCode, parse_instructions};
use qflow_sim::{SimError, Simulator, SimulatorFactory, StatevectorFactory};

fn bits(factory: &StatevectorFactory, seed: u64, text: &str) -> Vec<bool> {
    let mut sim = factory.create(Some(seed)).unwrap();
    sim.apply(&parse_instructions(text).unwrap()).unwrap()
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn deterministic_states_measure_identically_for_any_seed() {
    let factory = StatevectorFactory::new();
    for seed in 0..50 {
        assert_eq!(bits(&factory, seed, "M 0"), vec![false]);
        assert_eq!(bits(&factory, seed, "X 0\nM 0"), vec![true]);
        assert_eq!(bits(&factory, seed, "H 0\nH 0\nM 0"), vec![false]);
    }
}

#[test]
fn equal_seeds_reproduce_random_outcomes() {
    let factory = StatevectorFactory::new();
    let text = "H 0 1 2 3 4 5\nM 0 1 2 3 4 5";
    for seed in 0..10 {
        assert_eq!(bits(&factory, seed, text), bits(&factory, seed, text));
    }
}

#[test]
fn superposition_produces_both_outcomes() {
    let factory = StatevectorFactory::new();
    let outcomes: Vec<bool> = (0..64).map(|s| bits(&factory, s, "H 0\nM 0")[0]).collect();
    assert!(outcomes.iter().any(|&b| b));
    assert!(outcomes.iter().any(|&b| !b));
}

// ---------------------------------------------------------------------------
// Record bookkeeping
// ---------------------------------------------------------------------------

#[test]
fn record_accumulates_across_blocks() {
    let factory = StatevectorFactory::new();
    let mut sim = factory.create(Some(0)).unwrap();
    sim.apply(&[Instruction::op(OpCode::X, [0]), Instruction::op(OpCode::M, [0])])
        .unwrap();
    let none = sim.apply(&[Instruction::op(OpCode::H, [1])]).unwrap();
    assert!(none.is_empty());
    sim.apply(&[Instruction::op(OpCode::M, [0])]).unwrap();
    assert_eq!(sim.measurement_record(), &[true, true]);
}

#[test]
fn annotations_do_not_touch_state() {
    let factory = StatevectorFactory::new();
    let text = "QUBIT_COORDS(0, 1) 0\nTICK\nX 0\nM 0\nDETECTOR rec[-1]\nOBSERVABLE_INCLUDE(0) rec[-1]\nSHIFT_COORDS(1)";
    assert_eq!(bits(&factory, 0, text), vec![true]);
}

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

#[test]
fn qubit_limit_is_enforced() {
    let factory = StatevectorFactory::with_max_qubits(4);
    assert_eq!(factory.max_qubits(), 4);
    let mut sim = factory.create(None).unwrap();
    let result = sim.apply(&parse_instructions("H 4").unwrap());
    assert!(matches!(
        result,
        Err(SimError::TooManyQubits {
            requested: 5,
            max: 4
        })
    ));
}
