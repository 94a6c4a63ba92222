#![cfg(test)]

// Property tests for SpanMap kept inside the crate so they can check chain
// layout through the internal `Chains` view.

use crate::config::{Storage, DEFAULT_CAPACITY};
use crate::span_map::SpanMap;
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations: indices shrink toward earlier keys and the pools
// shrink in length, which keeps failing cases small.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, usize),
    Get(usize),
    Contains(usize),
    Remove(usize),
    Resize(usize),
}

type Scenario = (Vec<Vec<u8>>, Vec<Vec<u8>>, Vec<Op>);

fn arb_scenario() -> impl Strategy<Value = Scenario> {
    let keys = proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..4), 1..=10);
    let values = proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..6), 1..=4);
    (keys, values).prop_flat_map(|(keys, values)| {
        let k = 0..keys.len();
        let v = 0..values.len();
        let op = prop_oneof![
            4 => (k.clone(), v).prop_map(|(k, v)| Op::Insert(k, v)),
            2 => k.clone().prop_map(Op::Get),
            1 => k.clone().prop_map(Op::Contains),
            2 => k.prop_map(Op::Remove),
            1 => (0usize..40).prop_map(Op::Resize),
        ];
        proptest::collection::vec(op, 1..80)
            .prop_map(move |ops| (keys.clone(), values.clone(), ops))
    })
}

/// Drive `sut` through `ops`, mirroring each step in a `HashMap` model and
/// checking structural invariants after every step.
fn run<'a>(
    sut: &mut SpanMap<'a>,
    keys: &'a [Vec<u8>],
    values: &'a [Vec<u8>],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<&'a [u8], &'a [u8]> = HashMap::new();
    let resize = sut.resize_enabled();
    let mut last_cap = sut.capacity();

    for op in ops {
        match op {
            Op::Insert(k, v) => {
                let (k, v) = (&keys[k][..], &values[v][..]);
                let before = sut.len();
                let existed = model.insert(k, v).is_some();
                sut.insert(k, v).map_err(|e| TestCaseError::fail(e.to_string()))?;
                let expected = if existed { before } else { before + 1 };
                prop_assert_eq!(sut.len(), expected);
            }
            Op::Get(k) => {
                let k = &keys[k][..];
                prop_assert_eq!(sut.get(k), model.get(k).copied());
            }
            Op::Contains(k) => {
                let k = &keys[k][..];
                prop_assert_eq!(sut.contains(k), model.contains_key(k));
            }
            Op::Remove(k) => {
                let k = &keys[k][..];
                let before = sut.len();
                let present = model.remove(k).is_some();
                prop_assert_eq!(sut.remove(k), present);
                prop_assert!(!sut.contains(k));
                let expected = if present { before - 1 } else { before };
                prop_assert_eq!(sut.len(), expected);
            }
            Op::Resize(n) => {
                let len = sut.len();
                sut.resize(n).map_err(|e| TestCaseError::fail(e.to_string()))?;
                prop_assert_eq!(sut.len(), len);
                if !resize {
                    let requested = if n == 0 { DEFAULT_CAPACITY } else { n };
                    prop_assert_eq!(sut.capacity(), requested);
                }
                // Right after re-slotting the collision count is exact.
                let chains = sut.chains();
                let occupied = chains.chain_lengths().iter().filter(|&&n| n > 0).count();
                prop_assert_eq!(chains.collisions(), len - occupied);
                last_cap = sut.capacity();
            }
        }

        let chains = sut.chains();
        prop_assert_eq!(chains.reachable(), sut.len());
        prop_assert_eq!(sut.len(), model.len());
        prop_assert!(sut.capacity() >= 1);
        // Head removals never decrement, so the counter only over-counts.
        let occupied = chains.chain_lengths().iter().filter(|&&n| n > 0).count();
        prop_assert!(chains.collisions() >= sut.len() - occupied);
        if resize {
            prop_assert!(sut.capacity() >= last_cap, "automatic growth never shrinks");
            last_cap = sut.capacity();
        } else {
            prop_assert_eq!(sut.capacity(), last_cap, "capacity only moves on explicit resize");
        }
    }

    for (k, v) in &model {
        prop_assert_eq!(sut.get(k), Some(*v));
    }
    Ok(())
}

fn constant(_: &[u8]) -> u32 {
    7
}

// Property: state-machine equivalence with `HashMap` in borrow mode with the
// default hasher and a small table that grows often.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_borrow_mode_matches_model((keys, values, ops) in arb_scenario()) {
        let mut sut = SpanMap::builder().capacity(2).max_load(0.25).build().unwrap();
        run(&mut sut, &keys, &values, ops)?;
    }
}

// Property: same invariants in copy mode with resizing disabled; capacity
// only changes through explicit resize.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_copy_mode_without_growth((keys, values, ops) in arb_scenario()) {
        let mut sut = SpanMap::builder()
            .storage(Storage::Copy)
            .capacity(3)
            .max_load(0.0)
            .disable_resize()
            .build()
            .unwrap();
        run(&mut sut, &keys, &values, ops)?;
    }
}

// Property: worst-case collisions (every key shares one digest) stress
// chain walking, update-in-place and unlinking.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_constant_hasher_matches_model((keys, values, ops) in arb_scenario()) {
        let mut sut = SpanMap::builder()
            .hasher(constant)
            .capacity(4)
            .max_load(4.0)
            .build()
            .unwrap();
        run(&mut sut, &keys, &values, ops)?;
    }
}
