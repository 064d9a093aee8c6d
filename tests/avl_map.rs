use std::collections::BTreeMap;

use avlmap::{AvlMap, MapError};
use proptest::prelude::*;

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

/// Keys drawn from a range smaller than TEST_SIZE to force collisions.
fn key_strategy() -> impl Strategy<Value = i64> {
    -500i64..500i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    Remove(i64),
    Get(i64),
    ContainsKey(i64),
    EntryOrInsert(i64, i64),
    FirstKeyValue,
    LastKeyValue,
    PopFirst,
    PopLast,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        5 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        3 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::ContainsKey),
        2 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::EntryOrInsert(k, v)),
        1 => Just(MapOp::FirstKeyValue),
        1 => Just(MapOp::LastKeyValue),
        1 => Just(MapOp::PopFirst),
        1 => Just(MapOp::PopLast),
    ]
}

// ─── Randomized equivalence with BTreeMap ────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both AvlMap and BTreeMap
    /// and asserts identical results at every step.
    #[test]
    fn map_ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE)) {
        let mut avl_map: AvlMap<i64, i64> = AvlMap::new();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();

        for op in &ops {
            match op {
                MapOp::Insert(k, v) => {
                    prop_assert_eq!(avl_map.insert(*k, *v), bt_map.insert(*k, *v), "insert({}, {})", k, v);
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(avl_map.remove(k), bt_map.remove(k), "remove({})", k);
                }
                MapOp::Get(k) => {
                    prop_assert_eq!(avl_map.get(k), bt_map.get(k), "get({})", k);
                }
                MapOp::ContainsKey(k) => {
                    prop_assert_eq!(avl_map.contains_key(k), bt_map.contains_key(k), "contains_key({})", k);
                    prop_assert_eq!(avl_map.count(k), usize::from(bt_map.contains_key(k)), "count({})", k);
                }
                MapOp::EntryOrInsert(k, v) => {
                    let avl_result = *avl_map.entry(*k).or_insert(*v);
                    let bt_result = *bt_map.entry(*k).or_insert(*v);
                    prop_assert_eq!(avl_result, bt_result, "entry({}).or_insert({})", k, v);
                }
                MapOp::FirstKeyValue => {
                    prop_assert_eq!(avl_map.first_key_value(), bt_map.first_key_value(), "first_key_value");
                }
                MapOp::LastKeyValue => {
                    prop_assert_eq!(avl_map.last_key_value(), bt_map.last_key_value(), "last_key_value");
                }
                MapOp::PopFirst => {
                    prop_assert_eq!(avl_map.pop_first(), bt_map.pop_first(), "pop_first");
                }
                MapOp::PopLast => {
                    prop_assert_eq!(avl_map.pop_last(), bt_map.pop_last(), "pop_last");
                }
            }
            prop_assert_eq!(avl_map.len(), bt_map.len(), "len mismatch after {:?}", op);
            prop_assert_eq!(avl_map.is_empty(), bt_map.is_empty(), "is_empty mismatch after {:?}", op);
        }
    }

    /// Iteration order matches BTreeMap after random insertions and removals.
    #[test]
    fn iter_matches_btreemap(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE),
        removals in proptest::collection::vec(key_strategy(), TEST_SIZE / 4),
    ) {
        let mut avl_map: AvlMap<i64, i64> = AvlMap::new();
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();

        for (k, v) in &entries {
            avl_map.insert(*k, *v);
            bt_map.insert(*k, *v);
        }
        for k in &removals {
            avl_map.remove(k);
            bt_map.remove(k);
        }

        prop_assert!(avl_map.iter().eq(bt_map.iter()));
        prop_assert!(avl_map.keys().eq(bt_map.keys()));
        prop_assert!(avl_map.values().eq(bt_map.values()));
        prop_assert!(avl_map.into_iter().eq(bt_map.into_iter()));
    }

    /// Forward and backward iteration agree, and size hints stay exact.
    #[test]
    fn iter_double_ended(entries in proptest::collection::vec((key_strategy(), value_strategy()), 1..TEST_SIZE)) {
        let avl_map: AvlMap<i64, i64> = entries.iter().copied().collect();

        let forward: Vec<_> = avl_map.iter().collect();
        let mut backward: Vec<_> = avl_map.iter().rev().collect();
        backward.reverse();
        prop_assert_eq!(&forward, &backward);

        let mut iter = avl_map.iter();
        let mut remaining = avl_map.len();
        prop_assert_eq!(iter.len(), remaining);
        loop {
            let item = if remaining % 2 == 0 { iter.next() } else { iter.next_back() };
            if item.is_none() {
                break;
            }
            remaining -= 1;
            prop_assert_eq!(iter.len(), remaining);
        }
        prop_assert_eq!(remaining, 0);
    }

    /// Mutating through iter_mut is visible through the map afterwards.
    #[test]
    fn iter_mut_matches_btreemap(entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE)) {
        let mut avl_map: AvlMap<i64, i64> = entries.iter().copied().collect();
        let mut bt_map: BTreeMap<i64, i64> = entries.iter().copied().collect();

        for (k, v) in avl_map.iter_mut() {
            *v = v.wrapping_add(*k);
        }
        for (k, v) in bt_map.iter_mut() {
            *v = v.wrapping_add(*k);
        }

        prop_assert!(avl_map.iter().eq(bt_map.iter()));
    }

    /// A clone and its source evolve independently.
    #[test]
    fn clone_is_independent(
        entries in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE / 4),
        extra in proptest::collection::vec((key_strategy(), value_strategy()), TEST_SIZE / 4),
    ) {
        let original: AvlMap<i64, i64> = entries.iter().copied().collect();
        let snapshot: Vec<_> = original.iter().map(|(k, v)| (*k, *v)).collect();

        let mut copy = original.clone();
        for (k, v) in &extra {
            copy.insert(*k, *v);
        }
        for (k, _) in &entries {
            copy.remove(k);
        }

        let after: Vec<_> = original.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(snapshot, after);
    }
}

// ─── Deterministic scenarios ─────────────────────────────────────────────────

mod scenarios {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn in_order_iteration_after_scattered_inserts() {
        let mut map = AvlMap::new();
        for k in [5, 3, 8, 1, 4, 7, 9] {
            map.insert(k, k * 100);
        }

        assert_eq!(map.len(), 7);
        let keys: Vec<i32> = map.keys().copied().collect();
        assert_eq!(keys, vec![1, 3, 4, 5, 7, 8, 9]);
    }

    #[test]
    fn at_missing_vs_entry_or_default() {
        let mut map: AvlMap<&str, i32> = AvlMap::new();
        map.insert("present", 1);

        assert_eq!(map.at("missing"), Err(MapError::KeyNotFound));
        assert_eq!(map.count("missing"), 0);

        let value = map.entry("missing").or_default();
        assert_eq!(*value, 0);
        *value = 9;

        assert_eq!(map.count("missing"), 1);
        assert_eq!(map.at("missing"), Ok(&9));
    }

    #[test]
    fn replacing_insert_keeps_single_entry() {
        let mut map = AvlMap::new();
        assert_eq!(map.insert("k", 1), None);
        assert_eq!(map.insert("k", 2), Some(1));
        assert_eq!(map.len(), 1);
        assert_eq!(map["k"], 2);
    }

    #[test]
    #[should_panic(expected = "no entry found for key")]
    fn index_panics_on_missing_key() {
        let map: AvlMap<i32, i32> = AvlMap::new();
        let _ = map[&1];
    }

    #[test]
    fn ordering_and_equality_follow_entries() {
        let a = AvlMap::from([(1, "a"), (2, "b")]);
        let b = AvlMap::from([(2, "b"), (1, "a")]);
        let c = AvlMap::from([(1, "a"), (3, "c")]);

        assert_eq!(a, b);
        assert!(a < c);
        assert_ne!(a, c);
    }

    #[test]
    fn debug_renders_as_map() {
        let map = AvlMap::from([(2, "b"), (1, "a")]);
        assert_eq!(format!("{map:?}"), r#"{1: "a", 2: "b"}"#);
    }

    #[test]
    fn extend_and_from_iter_agree() {
        let pairs = [(3, 'c'), (1, 'a'), (2, 'b')];

        let collected: AvlMap<i32, char> = pairs.into_iter().collect();
        let mut extended = AvlMap::new();
        extended.extend(pairs);

        assert_eq!(collected, extended);
        assert_eq!(collected.first_key_value(), Some((&1, &'a')));
        assert_eq!(collected.last_key_value(), Some((&3, &'c')));
    }

    #[test]
    fn into_iter_drains_in_key_order() {
        let map = AvlMap::from([(5, "e"), (1, "a"), (3, "c")]);
        let drained: Vec<_> = map.into_iter().collect();
        assert_eq!(drained, vec![(1, "a"), (3, "c"), (5, "e")]);
    }

    #[test]
    fn clear_resets_everything() {
        let mut map = AvlMap::from([(1, "a"), (2, "b")]);
        map.clear();

        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.iter().next(), None);
        assert_eq!(map.cursor_front(), map.cursor_end());

        // The map is fully usable after a clear.
        map.insert(3, "c");
        assert_eq!(map.get(&3), Some(&"c"));
    }

    #[test]
    fn borrowed_key_lookups() {
        let mut map: AvlMap<String, i32> = AvlMap::new();
        map.insert("alpha".to_string(), 1);
        map.insert("beta".to_string(), 2);

        // &str lookups against String keys.
        assert_eq!(map.get("alpha"), Some(&1));
        assert_eq!(map.at("beta"), Ok(&2));
        assert!(map.contains_key("alpha"));
        assert_eq!(map.remove("alpha"), Some(1));
        assert_eq!(map.len(), 1);
    }
}
