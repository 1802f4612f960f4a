//! Per-view record storage.
//!
//! Records live in an arena indexed by identity key, so a refresh finds the
//! record it updated last time and can diff counters against it. A second
//! buffer lists, in query order, the records the latest sample returned;
//! sorting and rendering only ever look at that buffer.

use std::collections::BTreeMap;

use super::Slot;

/// Cumulative counter with the value it had one sample ago.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counter {
    pub current: i64,
    pub previous: i64,
    pub delta: i64,
}

impl Counter {
    /// Shifts current into previous and recomputes the delta.
    ///
    /// A fresh counter has `previous == 0`, so the first delta equals the
    /// value itself. Resets produce negative deltas.
    pub fn update(&mut self, value: i64) {
        self.previous = self.current;
        self.current = value;
        self.delta = value.wrapping_sub(self.previous);
    }
}

/// Stored value of one slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Counter(Counter),
    Gauge(i64),
    Float(f64),
}

impl Value {
    fn empty(slot: Slot) -> Self {
        match slot {
            Slot::Text => Value::Text(String::new()),
            Slot::Counter => Value::Counter(Counter::default()),
            Slot::Gauge => Value::Gauge(0),
            Slot::Float => Value::Float(0.0),
        }
    }

    /// Current integer value; text reads as 0, floats are truncated.
    pub fn as_i64(&self) -> i64 {
        match self {
            Value::Text(_) => 0,
            Value::Counter(c) => c.current,
            Value::Gauge(v) => *v,
            Value::Float(v) => *v as i64,
        }
    }

    /// Delta for counters, 0 for everything else.
    pub fn delta(&self) -> i64 {
        match self {
            Value::Counter(c) => c.delta,
            _ => 0,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Value::Float(v) => *v,
            other => other.as_i64() as f64,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// One component of an identity key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyPart {
    Int(i64),
    Text(String),
}

/// Identity of a record, stable across refreshes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RecordKey(pub Vec<KeyPart>);

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub key: RecordKey,
    pub values: Vec<Value>,
    /// Generation of the last sample that returned this record.
    seen: u64,
}

impl Record {
    pub fn value(&self, slot: usize) -> Option<&Value> {
        self.values.get(slot)
    }

    pub fn value_mut(&mut self, slot: usize) -> Option<&mut Value> {
        self.values.get_mut(slot)
    }
}

#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    index: BTreeMap<RecordKey, usize>,
    /// Arena indices of the latest sample's rows. Cleared, never shrunk.
    display: Vec<usize>,
    generation: u64,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new sample: the display buffer is emptied, records stay.
    pub fn begin_sample(&mut self) {
        self.generation += 1;
        self.display.clear();
    }

    /// Returns the record for `key`, creating it when absent.
    ///
    /// The first upsert of a key in a sample appends it to the display
    /// buffer. Repeats within the same sample update the same row.
    pub fn upsert(&mut self, key: RecordKey, slots: &[Slot]) -> &mut Record {
        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = self.records.len();
                self.records.push(Record {
                    key: key.clone(),
                    values: slots.iter().map(|s| Value::empty(*s)).collect(),
                    seen: 0,
                });
                self.index.insert(key, idx);
                idx
            }
        };
        let generation = self.generation;
        let record = &mut self.records[idx];
        if record.seen != generation {
            record.seen = generation;
            self.display.push(idx);
        }
        &mut self.records[idx]
    }

    /// Drops records the current sample did not return.
    pub fn sweep(&mut self) -> usize {
        let generation = self.generation;
        let before = self.records.len();
        let mut remap = vec![usize::MAX; before];
        let mut kept = Vec::with_capacity(before);
        for (old, record) in std::mem::take(&mut self.records).into_iter().enumerate() {
            if record.seen == generation {
                remap[old] = kept.len();
                kept.push(record);
            }
        }
        self.records = kept;
        self.index = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.key.clone(), i))
            .collect();
        for idx in &mut self.display {
            *idx = remap[*idx];
        }
        before - self.records.len()
    }

    /// Rows of the latest sample.
    pub fn len(&self) -> usize {
        self.display.len()
    }

    pub fn is_empty(&self) -> bool {
        self.display.is_empty()
    }

    /// Every record ever seen, stale ones included.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Capacity of the display buffer.
    pub fn capacity(&self) -> usize {
        self.display.capacity()
    }

    pub fn get(&self, key: &RecordKey) -> Option<&Record> {
        self.index.get(key).map(|&idx| &self.records[idx])
    }

    /// Display-ordered row at `pos`.
    pub fn row(&self, pos: usize) -> Option<&Record> {
        self.display.get(pos).map(|&idx| &self.records[idx])
    }

    /// Display-ordered rows.
    pub fn rows(&self) -> impl Iterator<Item = &Record> {
        self.display.iter().map(|&idx| &self.records[idx])
    }

    /// Reorders the display buffer with `cmp`. The sort is stable.
    pub fn sort_by<F>(&mut self, mut cmp: F)
    where
        F: FnMut(&Record, &Record) -> std::cmp::Ordering,
    {
        let records = &self.records;
        self.display.sort_by(|&a, &b| cmp(&records[a], &records[b]));
    }
}
