//! Integration tests for the wire codec.

use qflow_codec::{CodecError, NodeMessage, decode, encode, from_message, to_message};
use qflow_ir::{Circuit, Cond, DEFAULT_MAX_ITERATIONS, Expr, Node, Predicate};

fn nested_circuit() -> Circuit {
    let mut inner = Circuit::parse("H 1\nM 1").unwrap();
    inner
        .conditional(Cond::meas_parity([-1, 0]), "X 2\nCX 2 3")
        .unwrap();

    let mut c = Circuit::parse("RX 0\nMX 0\nX_ERROR(0.125) 1").unwrap();
    c.block_with("REPEAT 2 {\n    M 0\n    TICK\n}", false).unwrap();
    c.while_loop_with_limit(Cond::last_meas(0), inner.clone(), 17)
        .unwrap();
    c.do_while(inner, Cond::last_meas(0)).unwrap();
    c.conditional(Cond::meas_parity(Vec::new()), Circuit::new())
        .unwrap();
    c
}

// ----------------------------------------------------------------------------
// Round trip
// ----------------------------------------------------------------------------

#[test]
fn nested_circuit_round_trips() {
    let c = nested_circuit();
    let bytes = encode(&c).unwrap();
    assert_eq!(decode(&bytes).unwrap(), c);
}

#[test]
fn message_round_trip_keeps_budgets_and_capture_flags() {
    let c = nested_circuit();
    let message = to_message(&c).unwrap();

    assert!(matches!(
        &message.nodes[1],
        NodeMessage::Block {
            capture_as_last: false,
            ..
        }
    ));
    assert!(matches!(
        &message.nodes[2],
        NodeMessage::While {
            max_iterations: 17,
            ..
        }
    ));
    assert!(matches!(
        &message.nodes[3],
        NodeMessage::DoWhile { max_iterations, .. } if *max_iterations == DEFAULT_MAX_ITERATIONS
    ));
    assert_eq!(from_message(&message).unwrap(), c);
}

#[test]
fn missing_budget_decodes_to_default() {
    let json = br#"{"nodes": [
        {"type": "block", "text": "H 0\nM 0"},
        {"type": "do_while",
         "condition": {"kind": "LastMeas", "index": 0},
         "body": {"nodes": [{"type": "block", "text": "H 0\nM 0", "capture_as_last": true}]},
         "max_iterations": 0},
        {"type": "while",
         "condition": {"kind": "MeasParity", "indices": [-1]},
         "body": {"nodes": []}}
    ]}"#;
    let c = decode(json).unwrap();

    let budgets: Vec<u32> = c
        .nodes()
        .iter()
        .filter_map(|n| match n {
            Node::While { max_iterations, .. } | Node::DoWhile { max_iterations, .. } => {
                Some(*max_iterations)
            }
            _ => None,
        })
        .collect();
    assert_eq!(budgets, vec![DEFAULT_MAX_ITERATIONS, DEFAULT_MAX_ITERATIONS]);
}

// ----------------------------------------------------------------------------
// Rejection
// ----------------------------------------------------------------------------

#[test]
fn let_and_emit_are_rejected() {
    let mut c = Circuit::parse("M 0").unwrap();
    c.let_var("b", Expr::rec(-1));
    assert!(matches!(
        encode(&c),
        Err(CodecError::Unsupported { kind: "Let" })
    ));

    let mut c = Circuit::parse("M 0").unwrap();
    c.emit(Expr::rec(-1));
    assert!(matches!(
        encode(&c),
        Err(CodecError::Unsupported { kind: "Emit" })
    ));
}

#[test]
fn nested_predicate_is_rejected() {
    let mut body = Circuit::parse("M 0").unwrap();
    body.conditional(Predicate::from_fn(|_| true), "X 0").unwrap();
    let mut c = Circuit::new();
    c.do_while(body, Cond::last_meas(0)).unwrap();

    assert!(matches!(
        encode(&c),
        Err(CodecError::Unsupported { kind: "Predicate" })
    ));
}

#[test]
fn malformed_bytes_are_rejected() {
    assert!(matches!(decode(b"{\"nodes\": 3}"), Err(CodecError::Json(_))));
    assert!(matches!(
        decode(br#"{"nodes": [{"type": "block", "text": "FROB 0"}]}"#),
        Err(CodecError::Ir(_))
    ));
}
