// src/merge.rs

//! Three-way sorted merge of two name-sorted sequences.
//!
//! This is the building block of glob reconciliation: the cached children
//! of a directory on one side, a fresh filtered listing on the other.

use std::cmp::Ordering;

/// One item of a [`merge_sorted`] result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Merged<L, R> {
    /// Key present on the left side only.
    OnlyLeft(L),
    /// Key present on the right side only.
    OnlyRight(R),
    /// Key present on both sides.
    Both(L, R),
}

/// Merge two sequences sorted strictly ascending by key into one ascending
/// sequence of [`Merged`] items.
///
/// Both inputs must be sorted and duplicate-free under their key; callers
/// sort and dedup their listings before merging.
pub fn merge_sorted<L, R, K, KL, KR>(
    left: Vec<L>,
    right: Vec<R>,
    key_left: KL,
    key_right: KR,
) -> Vec<Merged<L, R>>
where
    K: Ord,
    KL: Fn(&L) -> K,
    KR: Fn(&R) -> K,
{
    let mut out = Vec::with_capacity(left.len().max(right.len()));
    let mut li = left.into_iter().peekable();
    let mut ri = right.into_iter().peekable();
    loop {
        let ord = match (li.peek(), ri.peek()) {
            (None, None) => break,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(l), Some(r)) => key_left(l).cmp(&key_right(r)),
        };
        match ord {
            Ordering::Less => {
                if let Some(l) = li.next() {
                    out.push(Merged::OnlyLeft(l));
                }
            }
            Ordering::Greater => {
                if let Some(r) = ri.next() {
                    out.push(Merged::OnlyRight(r));
                }
            }
            Ordering::Equal => {
                if let (Some(l), Some(r)) = (li.next(), ri.next()) {
                    out.push(Merged::Both(l, r));
                }
            }
        }
    }
    out
}
