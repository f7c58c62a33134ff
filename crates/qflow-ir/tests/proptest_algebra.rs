//! Property-based tests for circuit composition, parity, and instruction text.

use proptest::prelude::*;
use qflow_ir::{
    ClassicalState, Circuit, Cond, Instruction, OpCode, format_instructions, parse_instructions,
};

/// Instructions drawn from gates, measurements, resets, and noise.
fn arb_instruction() -> impl Strategy<Value = Instruction> {
    let single = prop_oneof![
        Just(OpCode::H),
        Just(OpCode::X),
        Just(OpCode::S),
        Just(OpCode::SDag),
        Just(OpCode::M),
        Just(OpCode::MX),
        Just(OpCode::R),
        Just(OpCode::MR),
    ];
    let pair = prop_oneof![Just(OpCode::CX), Just(OpCode::CZ), Just(OpCode::Swap)];
    let noise = prop_oneof![Just(OpCode::XError), Just(OpCode::ZError)];
    prop_oneof![
        (single, prop::collection::vec(0_u32..8, 1..4))
            .prop_map(|(op, qs)| Instruction::op(op, qs)),
        (pair, 0_u32..8, 1_u32..8).prop_map(|(op, a, d)| Instruction::op(op, [a, (a + d) % 8])),
        (noise, 0_u32..=4, 0_u32..8)
            .prop_map(|(op, p, q)| Instruction::noise(op, f64::from(p) / 4.0, [q])),
    ]
}

fn arb_instructions() -> impl Strategy<Value = Vec<Instruction>> {
    prop::collection::vec(arb_instruction(), 0..8).prop_flat_map(|flat| {
        let repeat = prop::collection::vec(arb_instruction(), 1..4)
            .prop_map(|body| Instruction::repeat(2, body));
        (Just(flat), prop::option::of(repeat)).prop_map(|(mut flat, rep)| {
            flat.extend(rep);
            flat
        })
    })
}

fn arb_circuit() -> impl Strategy<Value = Circuit> {
    prop::collection::vec((arb_instructions(), any::<bool>(), 0_u8..3), 0..4).prop_map(|parts| {
        let mut c = Circuit::new();
        for (insts, capture, kind) in parts {
            match kind {
                0 => {
                    c.block_with(insts, capture).unwrap();
                }
                1 => {
                    c.conditional(Cond::last_meas(0), insts).unwrap();
                }
                _ => {
                    c.emit_named(capture, "flag");
                }
            }
        }
        c
    })
}

proptest! {
    #[test]
    fn concat_is_associative(a in arb_circuit(), b in arb_circuit(), c in arb_circuit()) {
        prop_assert_eq!(a.concat(&b).concat(&c), a.concat(&b.concat(&c)));
    }

    #[test]
    fn concat_preserves_node_count(a in arb_circuit(), b in arb_circuit()) {
        prop_assert_eq!(a.concat(&b).len(), a.len() + b.len());
    }

    #[test]
    fn parity_is_commutative(
        record in prop::collection::vec(any::<bool>(), 1..12),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..6),
    ) {
        let mut state = ClassicalState::new();
        state.record_block(&record, false);
        let len = i64::try_from(record.len()).unwrap();
        let indices: Vec<i64> = picks
            .iter()
            .enumerate()
            .map(|(k, ix)| {
                let i = i64::try_from(ix.index(record.len())).unwrap();
                if k % 2 == 0 { i } else { i - len }
            })
            .collect();
        let mut reversed = indices.clone();
        reversed.reverse();

        let forward = Cond::meas_parity(indices.clone()).eval(&state).unwrap();
        let backward = Cond::meas_parity(reversed).eval(&state).unwrap();
        prop_assert_eq!(forward, backward);

        let expected = indices.iter().fold(false, |acc, &i| {
            let pos = if i < 0 { i + len } else { i };
            acc ^ record[usize::try_from(pos).unwrap()]
        });
        prop_assert_eq!(forward, expected);
    }

    #[test]
    fn text_round_trips(insts in arb_instructions()) {
        let text = format_instructions(&insts);
        let parsed = parse_instructions(&text).unwrap();
        prop_assert_eq!(parsed, insts);
    }
}
