//! Merge of a query result into a record store.
//!
//! Cells are parsed leniently: NULL or anything that does not start with a
//! number reads as 0, and a trailing fraction or unit is ignored, the way
//! `atoll` treats its input.

use super::record::{KeyPart, RecordKey, RecordStore, Value};
use super::{Slot, ViewDef};
use crate::collector::QueryResult;

/// Merges `result` into `store` and returns the number of displayable rows.
///
/// With `evict` set, records missing from `result` are removed afterwards.
pub fn merge(store: &mut RecordStore, def: &ViewDef, result: &QueryResult, evict: bool) -> usize {
    store.begin_sample();
    for row in 0..result.len() {
        let key = row_key(def, result, row);
        let record = store.upsert(key, def.slots);
        for (slot, kind) in def.slots.iter().enumerate() {
            let cell = result.cell(row, slot);
            let Some(value) = record.value_mut(slot) else {
                continue;
            };
            match (kind, value) {
                (Slot::Text, Value::Text(s)) => {
                    s.clear();
                    s.push_str(cell.unwrap_or(""));
                }
                (Slot::Counter, Value::Counter(c)) => c.update(parse_int(cell)),
                (Slot::Gauge, Value::Gauge(v)) => *v = parse_int(cell),
                (Slot::Float, Value::Float(v)) => *v = parse_float(cell),
                _ => {}
            }
        }
    }
    if evict {
        store.sweep();
    }
    store.len()
}

/// Identity key of `row`: numeric slots become integer parts, the rest text.
pub fn row_key(def: &ViewDef, result: &QueryResult, row: usize) -> RecordKey {
    RecordKey(
        def.key
            .iter()
            .map(|&slot| {
                let cell = result.cell(row, slot);
                match def.slots.get(slot) {
                    Some(Slot::Counter | Slot::Gauge) => KeyPart::Int(parse_int(cell)),
                    _ => KeyPart::Text(cell.unwrap_or("").to_string()),
                }
            })
            .collect(),
    )
}

/// Leading integer of `cell`, 0 when there is none.
pub fn parse_int(cell: Option<&str>) -> i64 {
    let s = cell.unwrap_or("").trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut v: i64 = 0;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        v = v.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }
    if negative { -v } else { v }
}

/// Leading float of `cell`, 0.0 when there is none.
pub fn parse_float(cell: Option<&str>) -> f64 {
    let s = cell.unwrap_or("").trim();
    if let Ok(v) = s.parse::<f64>() {
        return v;
    }
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0)))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().unwrap_or(0.0)
}
