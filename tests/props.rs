use proptest::prelude::*;
use serde_json::{Value, json};
use statelens::{Host, Key, Path, StateContainer};

fn arb_key() -> impl Strategy<Value = Key> {
    prop_oneof![
        Just(Key::from("a")),
        Just(Key::from("b")),
        Just(Key::from("c")),
        Just(Key::from("d")),
    ]
}

fn arb_path() -> impl Strategy<Value = Path> {
    proptest::collection::vec(arb_key(), 1..4).prop_map(Path::from)
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::from),
    ]
}

fn arb_writes() -> impl Strategy<Value = Vec<(Path, Value)>> {
    proptest::collection::vec((arb_path(), arb_leaf()), 0..20)
}

/// Apply writes, skipping the ones that would descend through a scalar.
fn apply_all<H: Host>(host: &H, writes: &[(Path, Value)]) {
    for (path, value) in writes {
        let _ = host.set(path, value);
    }
}

// Writing a path and reading it back returns the written value.
proptest! {
    #[test]
    fn prop_set_get_round_trip(writes in arb_writes(), path in arb_path(), leaf in arb_leaf()) {
        let container = StateContainer::default();
        apply_all(&container, &writes);

        if container.set(&path, &leaf).is_ok() {
            prop_assert_eq!(container.get(&path).unwrap(), Some(leaf));
        }
    }
}

// Writes staged in a recorder and then committed leave the parent exactly
// where writing directly would have.
proptest! {
    #[test]
    fn prop_commit_matches_direct_writes(
        initial in arb_writes(),
        staged in arb_writes(),
    ) {
        let direct = StateContainer::default();
        apply_all(&direct, &initial);
        apply_all(&direct, &staged);

        let container = StateContainer::default();
        apply_all(&container, &initial);
        let recorder = container.recorder();
        apply_all(&recorder, &staged);

        prop_assert_eq!(recorder.state().unwrap(), direct.state().unwrap());
        container.commit(&recorder).unwrap();
        prop_assert_eq!(container.state().unwrap(), direct.state().unwrap());
        prop_assert!(!recorder.is_dirty());
    }
}

// A recorder never changes its parent before commit.
proptest! {
    #[test]
    fn prop_recorder_isolation(initial in arb_writes(), staged in arb_writes()) {
        let container = StateContainer::default();
        apply_all(&container, &initial);
        let before = container.state().unwrap();

        let recorder = container.recorder();
        apply_all(&recorder, &staged);
        let sub = recorder.recorder();
        apply_all(&sub, &staged);
        recorder.commit(&sub).unwrap();

        prop_assert_eq!(container.state().unwrap(), before);
    }
}

// Writing one path leaves every other top-level key alone.
proptest! {
    #[test]
    fn prop_siblings_untouched(path in arb_path(), leaf in arb_leaf()) {
        let original = json!({"a": 1, "b": 2, "c": 3, "d": 4});
        let container = StateContainer::new(original.clone());
        let top = path.keys()[0].as_field();
        // Deeper writes would conflict with the scalars, so write at depth one.
        container.set(path.prefix(1), &leaf).unwrap();

        let state = container.state().unwrap();
        for key in ["a", "b", "c", "d"] {
            if key != top {
                prop_assert_eq!(&state[key], &original[key]);
            }
        }
    }
}
