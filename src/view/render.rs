//! Fixed-width text rendering of a view's rows.

use std::ops::Range;

use super::record::{Record, RecordStore, Value};
use super::{Align, Cell, Column};
use crate::fmt;

/// Everything the renderer needs from the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    /// Refresh interval in seconds, used by rate columns.
    pub interval_secs: f64,
    /// Group digits with `,`.
    pub thousands: bool,
    /// Output line width.
    pub width: usize,
    /// First visible row.
    pub dispstart: usize,
    /// Window height in rows.
    pub maxprint: usize,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            interval_secs: 5.0,
            thousands: false,
            width: 80,
            dispstart: 0,
            maxprint: 0,
        }
    }
}

/// Visible slice `[dispstart, dispstart + maxprint) ∩ [0, total)`.
pub fn window(total: usize, dispstart: usize, maxprint: usize) -> Range<usize> {
    let start = dispstart.min(total);
    let end = dispstart.saturating_add(maxprint).min(total);
    start..end
}

/// Column widths for a line of `width` characters.
///
/// Every column gets its minimum width. Whatever is left over is handed
/// out left to right, each column growing up to its maximum.
pub fn layout(columns: &[Column], width: usize) -> Vec<usize> {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.field.min_width).collect();
    let used: usize = widths.iter().sum::<usize>() + columns.len().saturating_sub(1);
    let mut spare = width.saturating_sub(used);
    for (w, column) in widths.iter_mut().zip(columns) {
        if spare == 0 {
            break;
        }
        let grow = column.field.max_width.saturating_sub(*w).min(spare);
        *w += grow;
        spare -= grow;
    }
    widths
}

fn pad(text: &str, width: usize, align: Align) -> String {
    match align {
        Align::Left => format!("{:<width$}", text, width = width),
        Align::Right => format!("{:>width$}", text, width = width),
    }
}

fn finish_line(cells: Vec<String>, width: usize) -> String {
    let line = fmt::truncate(&cells.join(" "), width);
    line.trim_end().to_string()
}

/// Column titles, laid out like the rows below them.
pub fn title_line(columns: &[Column], widths: &[usize], width: usize) -> String {
    let cells = columns
        .iter()
        .zip(widths)
        .map(|(c, &w)| pad(&fmt::truncate(c.field.title, w), w, c.field.align))
        .collect();
    finish_line(cells, width)
}

/// Numeric value of a derived cell.
pub fn cell_number(record: &Record, cell: &Cell, ctx: &RenderContext) -> i64 {
    let value = |slot: usize| record.value(slot).map(Value::as_i64).unwrap_or(0);
    let delta = |slot: usize| record.value(slot).map(Value::delta).unwrap_or(0);
    match *cell {
        Cell::Text(_) => 0,
        Cell::Value(slot) | Cell::Bytes(slot) | Cell::Float(slot, _) => value(slot),
        Cell::Delta(slot) => delta(slot),
        Cell::Rate(slots) => {
            if ctx.interval_secs <= 0.0 {
                return 0;
            }
            let sum: i64 = slots.iter().map(|&s| delta(s)).sum();
            (sum as f64 / ctx.interval_secs).trunc() as i64
        }
        Cell::Percent { hit, read } => {
            let hit = delta(hit);
            let total = hit + delta(read);
            if total > 0 { 100 * hit / total } else { 0 }
        }
    }
}

/// Text of one cell, at most `width` characters.
pub fn format_cell(record: &Record, cell: &Cell, width: usize, ctx: &RenderContext) -> String {
    match *cell {
        Cell::Text(slot) => match record.value(slot) {
            Some(Value::Text(s)) => fmt::truncate(&fmt::normalize_for_display(s), width),
            Some(v) => fmt::format_int(v.as_i64(), width, ctx.thousands),
            None => String::new(),
        },
        Cell::Value(slot) => match record.value(slot) {
            Some(Value::Float(v)) => fmt::format_float(*v, 2, width),
            _ => fmt::format_int(cell_number(record, cell, ctx), width, ctx.thousands),
        },
        Cell::Float(slot, precision) => {
            let v = record.value(slot).map(Value::as_f64).unwrap_or(0.0);
            fmt::format_float(v, precision, width)
        }
        Cell::Delta(_) => fmt::format_delta(cell_number(record, cell, ctx), width, ctx.thousands),
        Cell::Bytes(_) => fmt::format_bytes(cell_number(record, cell, ctx), width),
        Cell::Rate(_) | Cell::Percent { .. } => {
            fmt::format_int(cell_number(record, cell, ctx), width, ctx.thousands)
        }
    }
}

/// One row as a line.
pub fn format_row(
    record: &Record,
    columns: &[Column],
    widths: &[usize],
    ctx: &RenderContext,
) -> String {
    let cells = columns
        .iter()
        .zip(widths)
        .map(|(c, &w)| pad(&format_cell(record, &c.cell, w, ctx), w, c.field.align))
        .collect();
    finish_line(cells, ctx.width)
}

/// Lines for the visible window, followed by blank lines up to `maxprint`.
pub fn print_window(store: &RecordStore, columns: &[Column], ctx: &RenderContext) -> Vec<String> {
    let widths = layout(columns, ctx.width);
    let range = window(store.len(), ctx.dispstart, ctx.maxprint);
    let mut lines: Vec<String> = range
        .filter_map(|pos| store.row(pos))
        .map(|record| format_row(record, columns, &widths, ctx))
        .collect();
    lines.resize(ctx.maxprint.max(lines.len()), String::new());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::record::{Counter, KeyPart, RecordKey};
    use crate::view::{Field, Slot};

    const SLOTS: &[Slot] = &[Slot::Text, Slot::Counter, Slot::Counter, Slot::Gauge];
    const COLUMNS: &[Column] = &[
        Column::new(Field::text("NAME", 6, 20), Cell::Text(0)),
        Column::new(Field::num("HITS", 6, 10), Cell::Delta(1)),
        Column::new(Field::num("HIT%", 5, 5), Cell::Percent { hit: 1, read: 2 }),
        Column::new(Field::num("SIZE", 6, 8), Cell::Bytes(3)),
    ];

    fn record(name: &str, hit: i64, read: i64, size: i64) -> Record {
        let mut store = RecordStore::new();
        store.begin_sample();
        let r = store.upsert(RecordKey(vec![KeyPart::Text(name.to_string())]), SLOTS);
        r.values[0] = Value::Text(name.to_string());
        let mut c = Counter::default();
        c.update(hit);
        r.values[1] = Value::Counter(c);
        let mut c = Counter::default();
        c.update(read);
        r.values[2] = Value::Counter(c);
        r.values[3] = Value::Gauge(size);
        r.clone()
    }

    fn store(n: usize) -> RecordStore {
        let mut store = RecordStore::new();
        store.begin_sample();
        for i in 0..n {
            let r = store.upsert(RecordKey(vec![KeyPart::Int(i as i64)]), SLOTS);
            r.values[0] = Value::Text(format!("row{}", i));
        }
        store
    }

    #[test]
    fn window_clamps_to_rows() {
        assert_eq!(window(10, 0, 4), 0..4);
        assert_eq!(window(10, 8, 4), 8..10);
        assert_eq!(window(10, 12, 4), 10..10);
        assert_eq!(window(0, 0, 4), 0..0);
    }

    #[test]
    fn pagination_pads_to_window() {
        for (n, offset, w) in [(10, 0, 4), (10, 8, 4), (3, 0, 5), (0, 0, 3), (5, 7, 2)] {
            let ctx = RenderContext {
                dispstart: offset,
                maxprint: w,
                ..RenderContext::default()
            };
            let lines = print_window(&store(n), COLUMNS, &ctx);
            let data = lines.iter().filter(|l| !l.is_empty()).count();
            assert_eq!(lines.len(), w);
            assert_eq!(data, w.min(n.saturating_sub(offset)));
        }
    }

    #[test]
    fn layout_grows_left_to_right() {
        // minimum 6+6+5+6 plus 3 separators = 26
        assert_eq!(layout(COLUMNS, 26), vec![6, 6, 5, 6]);
        assert_eq!(layout(COLUMNS, 30), vec![10, 6, 5, 6]);
        assert_eq!(layout(COLUMNS, 100), vec![20, 10, 5, 8]);
        assert_eq!(layout(COLUMNS, 10), vec![6, 6, 5, 6]);
    }

    #[test]
    fn row_formatting() {
        let ctx = RenderContext::default();
        let widths = layout(COLUMNS, 26);
        let line = format_row(&record("app", 75, 25, 10240), COLUMNS, &widths, &ctx);
        assert_eq!(line, "app       +75    75    10K");
    }

    #[test]
    fn percent_without_activity_is_zero() {
        let r = record("idle", 0, 0, 0);
        let ctx = RenderContext::default();
        assert_eq!(cell_number(&r, &Cell::Percent { hit: 1, read: 2 }, &ctx), 0);
    }

    #[test]
    fn rate_truncates_toward_zero() {
        let r = record("x", 14, -9, 0);
        let ctx = RenderContext {
            interval_secs: 5.0,
            ..RenderContext::default()
        };
        assert_eq!(cell_number(&r, &Cell::Rate(&[1]), &ctx), 2);
        assert_eq!(cell_number(&r, &Cell::Rate(&[2]), &ctx), -1);
        assert_eq!(cell_number(&r, &Cell::Rate(&[1, 2]), &ctx), 1);
    }

    #[test]
    fn lines_are_cut_to_width() {
        let ctx = RenderContext {
            width: 8,
            ..RenderContext::default()
        };
        let widths = layout(COLUMNS, ctx.width);
        let line = format_row(&record("database", 1, 0, 0), COLUMNS, &widths, &ctx);
        assert_eq!(line, "databa");
        assert_eq!(title_line(COLUMNS, &widths, 8), "NAME");
    }

    #[test]
    fn thousands_toggle() {
        let ctx = RenderContext {
            thousands: true,
            ..RenderContext::default()
        };
        let r = record("x", 12345, 0, 0);
        assert_eq!(format_cell(&r, &Cell::Delta(1), 10, &ctx), "+12,345");
    }
}
