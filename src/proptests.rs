use crate::dispatcher::Slot;
use crate::{linear, minimal_perfect_hash, Config, Dispatcher, KeyIndex, Switch, MISS};
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::HashSet;

/// Walks the slot tree, checking level shape, and returns the keys below it.
fn validate_slot<K>(slot: &Slot<K>, config: &Config, indices: &mut Vec<i32>) -> usize {
    match slot {
        Slot::Empty => 0,
        Slot::Leaf { index, .. } => {
            indices.push(*index);
            1
        }
        Slot::Scan(entries) => {
            assert!(entries.len() >= 2, "scan slot must hold a stuck group");
            indices.extend(entries.iter().map(|(_, i)| *i));
            entries.len()
        }
        Slot::Level(level) => {
            let mut occupied = 0usize;
            let mut total = 0usize;
            for s in level.slots.iter() {
                let c = validate_slot(s, config, indices);
                if c > 0 {
                    occupied += 1;
                }
                total += c;
            }
            assert!(occupied >= 2, "hashed level must not be degenerate");
            assert_eq!(
                level.slots.len(),
                config.table_size(total).unwrap(),
                "level size must be ceil(keys / load_factor)"
            );
            total
        }
    }
}

fn validate_dispatcher<K, H>(d: &Dispatcher<K, H>) {
    let mut indices = Vec::new();
    let total = validate_slot(d.root(), d.config(), &mut indices);
    assert_eq!(total, d.len());
    indices.sort_unstable();
    let expected: Vec<i32> = (0..d.len() as i32).collect();
    assert_eq!(indices, expected, "leaf indices must be exactly 0..len");
}

#[derive(Clone, Copy, Debug, Arbitrary)]
enum LoadFactor {
    Full,
    Standard,
    Half,
    Sparse,
}

impl LoadFactor {
    fn value(self) -> f64 {
        match self {
            LoadFactor::Full => 1.0,
            LoadFactor::Standard => 0.75,
            LoadFactor::Half => 0.5,
            LoadFactor::Sparse => 0.3,
        }
    }
}

fn key_set_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-zA-Z0-9_]{0,12}", 0..=300).prop_map(|s| s.into_iter().collect())
}

fn byte_key_set_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::hash_set(prop::collection::vec(any::<u8>(), 0..=16), 0..=100)
        .prop_map(|s| s.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_bijection_and_misses(
        keys in key_set_strategy(),
        probes in prop::collection::vec("[a-zA-Z0-9_]{0,12}", 0..=200),
        lf in any::<LoadFactor>(),
    ) {
        let config = Config::default().with_load_factor(lf.value());
        let d = Dispatcher::with_config(keys.clone(), config).unwrap();
        validate_dispatcher(&d);

        let mut got: Vec<i32> = keys.iter().map(|k| d.lookup(k.as_str())).collect();
        got.sort_unstable();
        let expected: Vec<i32> = (0..keys.len() as i32).collect();
        prop_assert_eq!(got, expected);

        let members: HashSet<&str> = keys.iter().map(String::as_str).collect();
        for p in &probes {
            if !members.contains(p.as_str()) {
                prop_assert_eq!(d.lookup(p.as_str()), MISS);
            }
        }
    }

    #[test]
    fn prop_byte_keys(keys in byte_key_set_strategy()) {
        let d = minimal_perfect_hash(keys.clone()).unwrap();
        validate_dispatcher(&d);
        let reference = linear::<[u8], _>(&keys);
        let mut seen = vec![false; keys.len()];
        for k in &keys {
            let idx = d.get(k.as_slice()).unwrap();
            prop_assert!(!seen[idx]);
            seen[idx] = true;
            prop_assert!(reference.index_of(k.as_slice()) != MISS);
        }
    }

    #[test]
    fn prop_determinism(
        keys in key_set_strategy(),
        probes in prop::collection::vec("[a-z]{0,6}", 0..=50),
    ) {
        let a = minimal_perfect_hash(keys.clone()).unwrap();
        let b = minimal_perfect_hash(keys.clone()).unwrap();
        for k in keys.iter().chain(probes.iter()) {
            prop_assert_eq!(a.lookup(k.as_str()), b.lookup(k.as_str()));
        }
        prop_assert_eq!(a.stats(), b.stats());
    }

    #[test]
    fn prop_switch_matches_linear(keys in key_set_strategy(), probes in prop::collection::vec("[a-z0-9]{0,4}", 0..=50)) {
        let sw = Switch::new(keys.iter().cloned().enumerate().map(|(i, k)| (k, i))).unwrap();
        let reference = linear::<str, _>(&keys);
        for k in keys.iter().chain(probes.iter()) {
            let expected = usize::try_from(reference.index_of(k.as_str())).ok();
            prop_assert_eq!(sw.get(k.as_str()).copied(), expected);
        }
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_input_order_small_set() {
    let keys = ["a", "b", "c", "aa", "ab", "ba"];
    let baseline = Dispatcher::new(keys).unwrap();
    assert_eq!(baseline.stats().scan_slots, 0);
    let expected: Vec<i32> = keys.iter().map(|k| baseline.lookup(*k)).collect();

    // Without scan slots, indices follow slot order and ignore input order.
    for_each_permutation(&keys, |perm| {
        let d = Dispatcher::new(perm).unwrap();
        validate_dispatcher(&d);
        let got: Vec<i32> = keys.iter().map(|k| d.lookup(*k)).collect();
        assert_eq!(got, expected);
    });
}

#[test]
fn exhaustive_scan_group_orders() {
    // "Aa", "BB" and "C#" share every polynomial hash of equal length.
    let keys = ["Aa", "BB", "C#", "zy"];
    for_each_permutation(&keys, |perm| {
        let d = Dispatcher::new(perm).unwrap();
        validate_dispatcher(&d);
        assert_eq!(d.stats().scan_keys, 3);
        for k in keys {
            assert!(d.contains(k));
        }
        assert_eq!(d.lookup("Ab"), MISS);
    });
}
