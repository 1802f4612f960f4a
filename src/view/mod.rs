//! Generic view engine.
//!
//! A view is one selectable screen of the dashboard. Every concrete view is
//! a [`ViewDef`]: a static table naming the query, how each result column is
//! stored (text, diffed counter, gauge or float), which columns identify a
//! row, what to display and which sort orders exist. [`TableView`] turns
//! such a definition into a live [`View`] with its own record store.
//!
//! Pipeline per refresh: `sample` -> `sort` -> `print`.

pub mod record;
pub mod registry;
pub mod render;
pub mod sampler;
pub mod sort;
pub mod table;

pub use record::{Counter, Record, RecordKey, RecordStore, Value};
pub use registry::{ViewError, ViewRegistry};
pub use render::RenderContext;
pub use sort::{Direction, SortKey};
pub use table::TableView;

use crate::collector::{DataSource, SourceError};

/// Horizontal alignment of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Field descriptor: static metadata for one output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub title: &'static str,
    /// Width the column always gets.
    pub min_width: usize,
    /// Width the column may grow to when the line has room.
    pub max_width: usize,
    pub align: Align,
}

impl Field {
    /// Left-aligned text column.
    pub const fn text(title: &'static str, min_width: usize, max_width: usize) -> Self {
        Self {
            title,
            min_width,
            max_width,
            align: Align::Left,
        }
    }

    /// Right-aligned numeric column.
    pub const fn num(title: &'static str, min_width: usize, max_width: usize) -> Self {
        Self {
            title,
            min_width,
            max_width,
            align: Align::Right,
        }
    }
}

/// Storage rule for one query result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Label, timestamp or flag, overwritten every sample.
    Text,
    /// Cumulative counter: current, previous and delta are kept.
    Counter,
    /// Point-in-time integer, never diffed.
    Gauge,
    /// Point-in-time float, never diffed.
    Float,
}

/// How a displayed cell is derived from a record's slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    /// Slot as text.
    Text(usize),
    /// Current value of a numeric slot.
    Value(usize),
    /// Counter delta with an explicit sign.
    Delta(usize),
    /// Sum of the listed counters' deltas per second of refresh interval,
    /// truncated toward zero.
    Rate(&'static [usize]),
    /// Current value through [`crate::fmt::format_b`].
    Bytes(usize),
    /// Float slot with a fixed number of decimals.
    Float(usize, usize),
    /// `100 * hit / (hit + read)` over deltas, 0 when nothing happened.
    Percent { hit: usize, read: usize },
}

/// One displayed column: descriptor plus value rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub field: Field,
    pub cell: Cell,
}

impl Column {
    pub const fn new(field: Field, cell: Cell) -> Self {
        Self { field, cell }
    }
}

/// A named, hotkey-bound sort order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderDef {
    pub name: &'static str,
    /// Alternate name accepted by the `order` command.
    pub label: &'static str,
    pub hotkey: char,
    /// Primary sort value. `None` keeps query order.
    pub key: Option<Cell>,
}

impl OrderDef {
    pub const fn new(name: &'static str, label: &'static str, hotkey: char, key: Cell) -> Self {
        Self {
            name,
            label,
            hotkey,
            key: Some(key),
        }
    }
}

/// What the server must provide for a view to be installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Requirement {
    /// Minimum `server_version_num`.
    pub min_version: Option<u32>,
    pub extension: Option<&'static str>,
}

impl Requirement {
    pub const NONE: Requirement = Requirement {
        min_version: None,
        extension: None,
    };

    pub fn is_none(&self) -> bool {
        self.min_version.is_none() && self.extension.is_none()
    }
}

/// Query text, possibly depending on the server version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    Fixed(&'static str),
    /// `(min_version, text)` pairs, newest first. The first pair the server
    /// reaches wins and the last one also serves anything older.
    Since(&'static [(u32, &'static str)]),
}

impl Query {
    /// Picks the text for a server. An unknown version gets the newest form.
    pub fn text(&self, server_version: Option<u32>) -> &'static str {
        match *self {
            Query::Fixed(sql) => sql,
            Query::Since(texts) => {
                let picked = match server_version {
                    Some(v) => texts.iter().find(|(min, _)| v >= *min).or(texts.last()),
                    None => texts.first(),
                };
                picked.map_or("", |&(_, sql)| sql)
            }
        }
    }
}

/// Declarative description of one view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewDef {
    pub name: &'static str,
    pub hotkey: char,
    pub query: Query,
    pub requires: Requirement,
    /// One storage rule per query result column, in column order.
    pub slots: &'static [Slot],
    /// Slots forming the identity key.
    pub key: &'static [usize],
    /// Slots compared after the primary order value, normally the names.
    pub fallback: &'static [usize],
    pub columns: &'static [Column],
    pub orders: &'static [OrderDef],
}

/// Capability interface the engine loop drives.
pub trait View {
    fn name(&self) -> &str;

    fn hotkey(&self) -> char;

    fn requires(&self) -> Requirement;

    fn orders(&self) -> &[OrderDef];

    /// Queries the source and merges the result into the record store.
    ///
    /// On error the store is left as it was. Returns the number of
    /// displayable rows.
    fn sample(&mut self, source: &mut dyn DataSource) -> Result<usize, SourceError>;

    /// Orders the display buffer by `orders()[order]`.
    fn sort(&mut self, order: usize, direction: Direction, ctx: &RenderContext);

    /// Number of rows the last successful sample produced.
    fn row_count(&self) -> usize;

    /// Column title line.
    fn title_line(&self, ctx: &RenderContext) -> String;

    /// Body lines for the window, blank-padded to the window height.
    fn print(&self, ctx: &RenderContext) -> Vec<String>;

    /// Records the server version used to choose the query text.
    fn set_server_version(&mut self, _version: Option<u32>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEW: &str = "SELECT new";
    const OLD: &str = "SELECT old";

    #[test]
    fn query_picks_text_by_version() {
        const MID: &str = "SELECT mid";
        let q = Query::Since(&[(140000, NEW), (130000, MID), (0, OLD)]);
        assert_eq!(q.text(Some(120005)), OLD);
        assert_eq!(q.text(Some(130000)), MID);
        assert_eq!(q.text(Some(130012)), MID);
        assert_eq!(q.text(Some(170000)), NEW);
        assert_eq!(q.text(None), NEW);
        assert_eq!(Query::Since(&[]).text(None), "");
        assert_eq!(Query::Fixed(OLD).text(Some(90600)), OLD);
    }

    #[test]
    fn requirement_none() {
        assert!(Requirement::NONE.is_none());
        let r = Requirement {
            min_version: Some(140000),
            extension: None,
        };
        assert!(!r.is_none());
    }
}
