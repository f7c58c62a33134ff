//! Integration tests for the demo circuits.
//!
//! Every demo circuit is sampled with fixed seeds and lowered, so the
//! behaviour each demo advertises is checked end to end.

use qflow_demos::bit_string;
use qflow_demos::circuits::{DemoCircuit, even_parity, feed_forward, repeat_until_success};
use qflow_exec::CircuitExt;

/// The last recorded bit of repeat-until-success is always 0.
#[test]
fn test_repeat_until_success_ends_on_zero() {
    let c = repeat_until_success(200).unwrap();
    for record in c.compile_sampler(Some(11)).sample(50).unwrap() {
        assert!(!record.is_empty());
        assert_eq!(record.last(), Some(&false));
    }
}

/// Feed-forward copies the first bit onto the second.
#[test]
fn test_feed_forward_bits_agree() {
    let c = feed_forward().unwrap();
    for record in c.compile_sampler(Some(5)).sample(50).unwrap() {
        assert_eq!(record.len(), 2);
        assert_eq!(record[0], record[1]);
    }
}

/// The emitted parity of the even-parity loop is always 0.
#[test]
fn test_even_parity_emits_zero() {
    let c = even_parity(200).unwrap();
    for shot in c.compile_sampler(Some(3)).sample_with_classical(30).unwrap() {
        assert_eq!(shot.outputs, vec![false]);
        assert_eq!(shot.output_names, vec!["parity".to_string()]);
        assert_eq!(shot.measurements.len() % 2, 0);
    }
}

/// Every demo circuit lowers to a valid module.
#[test]
fn test_all_demo_circuits_lower() {
    for circuit in [
        DemoCircuit::RepeatUntilSuccess,
        DemoCircuit::FeedForward,
        DemoCircuit::EvenParity,
    ] {
        let c = circuit.build(100).unwrap();
        let module = qflow_export::to_dataflow(&c, "main").unwrap();
        module.validate().unwrap();
    }
}

/// Only circuits without classical nodes cross the wire.
#[test]
fn test_codec_accepts_structured_demos_only() {
    let rus = repeat_until_success(100).unwrap();
    let bytes = qflow_codec::encode(&rus).unwrap();
    assert_eq!(qflow_codec::decode(&bytes).unwrap(), rus);

    assert!(qflow_codec::encode(&even_parity(100).unwrap()).is_err());
}

#[test]
fn test_bit_string() {
    assert_eq!(bit_string(&[true, false, true]), "101");
    assert_eq!(bit_string(&[]), "");
}
