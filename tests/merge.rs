use proptest::prelude::*;

use filemon::merge::{merge_sorted, Merged};

fn merge_names<'a>(left: Vec<&'a str>, right: Vec<&'a str>) -> Vec<Merged<&'a str, &'a str>> {
    merge_sorted(left, right, |l| l.to_string(), |r| r.to_string())
}

#[test]
fn disjoint_sides_interleave() {
    let out = merge_names(vec!["a", "c"], vec!["b", "d"]);
    assert_eq!(
        out,
        vec![
            Merged::OnlyLeft("a"),
            Merged::OnlyRight("b"),
            Merged::OnlyLeft("c"),
            Merged::OnlyRight("d"),
        ]
    );
}

#[test]
fn equal_sides_pair_up() {
    let out = merge_names(vec!["a", "b"], vec!["a", "b"]);
    assert_eq!(
        out,
        vec![Merged::Both("a", "a"), Merged::Both("b", "b")]
    );
}

#[test]
fn empty_sides() {
    assert_eq!(merge_names(vec![], vec![]), vec![]);
    assert_eq!(
        merge_names(vec!["x"], vec![]),
        vec![Merged::OnlyLeft("x")]
    );
    assert_eq!(
        merge_names(vec![], vec!["x"]),
        vec![Merged::OnlyRight("x")]
    );
}

#[test]
fn mixed_overlap() {
    let out = merge_names(vec!["a", "b", "d"], vec!["b", "c", "d", "e"]);
    assert_eq!(
        out,
        vec![
            Merged::OnlyLeft("a"),
            Merged::Both("b", "b"),
            Merged::OnlyRight("c"),
            Merged::Both("d", "d"),
            Merged::OnlyRight("e"),
        ]
    );
}

/// Strategy: a strictly sorted, duplicate-free vector of small keys, the
/// shape both merge inputs always have in practice.
fn sorted_keys() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::btree_set(any::<u8>(), 0..32)
        .prop_map(|set| set.into_iter().collect())
}

proptest! {
    #[test]
    fn merge_preserves_both_sides_in_order(left in sorted_keys(), right in sorted_keys()) {
        let out = merge_sorted(left.clone(), right.clone(), |l| *l, |r| *r);

        // Reconstruct each input from the merge and check the ordering of
        // the merged keys along the way.
        let mut rebuilt_left = Vec::new();
        let mut rebuilt_right = Vec::new();
        let mut keys = Vec::new();
        for item in &out {
            match item {
                Merged::OnlyLeft(l) => {
                    rebuilt_left.push(*l);
                    keys.push(*l);
                }
                Merged::OnlyRight(r) => {
                    rebuilt_right.push(*r);
                    keys.push(*r);
                }
                Merged::Both(l, r) => {
                    prop_assert_eq!(l, r);
                    rebuilt_left.push(*l);
                    rebuilt_right.push(*r);
                    keys.push(*l);
                }
            }
        }
        prop_assert_eq!(rebuilt_left, left);
        prop_assert_eq!(rebuilt_right, right);

        let mut sorted = keys.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(keys, sorted);
    }

    #[test]
    fn both_items_are_exactly_the_intersection(left in sorted_keys(), right in sorted_keys()) {
        let out = merge_sorted(left.clone(), right.clone(), |l| *l, |r| *r);
        let both: Vec<u8> = out
            .iter()
            .filter_map(|item| match item {
                Merged::Both(l, _) => Some(*l),
                _ => None,
            })
            .collect();
        let expected: Vec<u8> = left.iter().copied().filter(|k| right.contains(k)).collect();
        prop_assert_eq!(both, expected);
    }
}
