//! Row ordering.
//!
//! A comparison is composed of three stages, each consulted only when the
//! previous one ties: the selected order's primary value, the view's
//! fallback slots (normally names), then the identity key. The whole chain
//! is flipped by [`Direction::Reversed`].
//!
//! In the natural direction numeric values sort largest first and text
//! sorts alphabetically.

use std::cmp::Ordering;

use super::Cell;
use super::record::{Record, Value};
use super::render::{RenderContext, cell_number};

/// Sort key for one record under one order.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey<'a> {
    Integer(i64),
    Float(f64),
    Text(&'a str),
}

impl PartialOrd for SortKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (SortKey::Integer(a), SortKey::Integer(b)) => a.partial_cmp(b),
            (SortKey::Float(a), SortKey::Float(b)) => a.partial_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.partial_cmp(b),
            (SortKey::Integer(a), SortKey::Float(b)) => (*a as f64).partial_cmp(b),
            (SortKey::Float(a), SortKey::Integer(b)) => a.partial_cmp(&(*b as f64)),
            _ => None,
        }
    }
}

/// Global sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Natural,
    Reversed,
}

impl Direction {
    /// `1` for natural, `-1` for reversed.
    pub fn sign(self) -> i32 {
        match self {
            Direction::Natural => 1,
            Direction::Reversed => -1,
        }
    }

    pub fn flip(self) -> Self {
        match self {
            Direction::Natural => Direction::Reversed,
            Direction::Reversed => Direction::Natural,
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            Direction::Natural => ord,
            Direction::Reversed => ord.reverse(),
        }
    }
}

/// Sort key of `record` for a cell rule.
pub fn sort_key<'a>(record: &'a Record, cell: &Cell, ctx: &RenderContext) -> SortKey<'a> {
    match *cell {
        Cell::Text(slot) => match record.value(slot) {
            Some(Value::Text(s)) => SortKey::Text(s.as_str()),
            Some(Value::Float(v)) => SortKey::Float(*v),
            Some(v) => SortKey::Integer(v.as_i64()),
            None => SortKey::Text(""),
        },
        Cell::Value(slot) | Cell::Float(slot, _) => match record.value(slot) {
            Some(Value::Float(v)) => SortKey::Float(*v),
            Some(Value::Text(s)) => SortKey::Text(s.as_str()),
            Some(v) => SortKey::Integer(v.as_i64()),
            None => SortKey::Integer(0),
        },
        _ => SortKey::Integer(cell_number(record, cell, ctx)),
    }
}

/// Primary stage: numbers descend, text ascends.
fn compare_primary(a: &SortKey<'_>, b: &SortKey<'_>) -> Ordering {
    match (a, b) {
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        _ => b.partial_cmp(a).unwrap_or(Ordering::Equal),
    }
}

/// Fallback stage: plain ascending comparison of each slot.
fn compare_fallback(a: &Record, b: &Record, fallback: &[usize]) -> Ordering {
    for &slot in fallback {
        let ord = match (a.value(slot), b.value(slot)) {
            (Some(Value::Text(x)), Some(Value::Text(y))) => x.cmp(y),
            (Some(x), Some(y)) => x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Full comparison of two records.
pub fn compare(
    a: &Record,
    b: &Record,
    key: Option<&Cell>,
    fallback: &[usize],
    direction: Direction,
    ctx: &RenderContext,
) -> Ordering {
    let primary = key
        .map(|cell| compare_primary(&sort_key(a, cell, ctx), &sort_key(b, cell, ctx)))
        .unwrap_or(Ordering::Equal);
    let ord = primary
        .then_with(|| compare_fallback(a, b, fallback))
        .then_with(|| a.key.cmp(&b.key));
    direction.apply(ord)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::record::{Counter, KeyPart, RecordKey, RecordStore};
    use crate::view::Slot;

    const SLOTS: &[Slot] = &[Slot::Gauge, Slot::Text, Slot::Counter];
    const NAME: Cell = Cell::Text(1);
    const DELTA: Cell = Cell::Delta(2);

    fn ctx() -> RenderContext {
        RenderContext::default()
    }

    fn store(rows: &[(i64, &str, i64)]) -> RecordStore {
        let mut store = RecordStore::new();
        store.begin_sample();
        for &(id, name, delta) in rows {
            let r = store.upsert(RecordKey(vec![KeyPart::Int(id)]), SLOTS);
            r.values[1] = Value::Text(name.to_string());
            r.values[2] = Value::Counter(Counter {
                current: delta,
                previous: 0,
                delta,
            });
        }
        store
    }

    fn sorted(store: &mut RecordStore, key: Option<&Cell>, direction: Direction) -> Vec<i64> {
        let c = ctx();
        store.sort_by(|a, b| compare(a, b, key, &[1], direction, &c));
        store
            .rows()
            .map(|r| match r.key.0[0] {
                KeyPart::Int(id) => id,
                KeyPart::Text(_) => -1,
            })
            .collect()
    }

    #[test]
    fn numbers_descend_in_natural_direction() {
        let mut s = store(&[(1, "a", 5), (2, "b", 50), (3, "c", 10)]);
        assert_eq!(sorted(&mut s, Some(&DELTA), Direction::Natural), vec![2, 3, 1]);
        assert_eq!(sorted(&mut s, Some(&DELTA), Direction::Reversed), vec![1, 3, 2]);
    }

    #[test]
    fn names_ascend_in_natural_direction() {
        let mut s = store(&[(1, "b", 0), (2, "c", 0), (3, "a", 0)]);
        assert_eq!(sorted(&mut s, Some(&NAME), Direction::Natural), vec![3, 1, 2]);
    }

    #[test]
    fn ties_fall_back_to_name_regardless_of_input_order() {
        let mut s1 = store(&[(1, "zeta", 7), (2, "alpha", 7), (3, "mid", 9)]);
        let mut s2 = store(&[(2, "alpha", 7), (3, "mid", 9), (1, "zeta", 7)]);
        let a = sorted(&mut s1, Some(&DELTA), Direction::Natural);
        let b = sorted(&mut s2, Some(&DELTA), Direction::Natural);
        assert_eq!(a, vec![3, 2, 1]);
        assert_eq!(a, b);
    }

    #[test]
    fn identity_breaks_full_ties() {
        let mut s = store(&[(9, "same", 1), (4, "same", 1)]);
        assert_eq!(sorted(&mut s, Some(&DELTA), Direction::Natural), vec![4, 9]);
        assert_eq!(sorted(&mut s, Some(&DELTA), Direction::Reversed), vec![9, 4]);
    }

    #[test]
    fn reversing_inverts_and_keeps_rows() {
        let mut s = store(&[(1, "a", 3), (2, "b", 3), (3, "c", 8), (4, "d", -1)]);
        let natural = sorted(&mut s, Some(&DELTA), Direction::Natural);
        let mut reversed = sorted(&mut s, Some(&DELTA), Direction::Reversed);
        reversed.reverse();
        assert_eq!(natural, reversed);
    }

    #[test]
    fn direction_flip_and_sign() {
        assert_eq!(Direction::Natural.sign(), 1);
        assert_eq!(Direction::Natural.flip(), Direction::Reversed);
        assert_eq!(Direction::Reversed.flip().sign(), 1);
    }

    #[test]
    fn sort_key_partial_cmp() {
        assert!(SortKey::Integer(2) > SortKey::Integer(1));
        assert!(SortKey::Float(1.5) > SortKey::Integer(1));
        assert_eq!(SortKey::Text("a").partial_cmp(&SortKey::Integer(1)), None);
    }
}
