//! Progress reporting views. Every number here is a point-in-time gauge.

use crate::view::{Cell, Column, Field, OrderDef, Query, Requirement, Slot, ViewDef};

use super::NAME_MAX;

/// Vacuum progress. From PostgreSQL 17 the dead tuple columns report the
/// memory budget in bytes and the count of dead item identifiers.
pub static VACUUM: ViewDef = ViewDef {
    name: "vacuum",
    hotkey: 'V',
    query: Query::Since(&[
        (
            170000,
            "SELECT pg_stat_progress_vacuum.pid, nspname, relname, phase,
       heap_blks_total, heap_blks_scanned, heap_blks_vacuumed,
       index_vacuum_count, max_dead_tuple_bytes, num_dead_item_ids
FROM pg_stat_progress_vacuum
JOIN pg_class
  ON pg_stat_progress_vacuum.relid = pg_class.oid
JOIN pg_namespace
ON pg_class.relnamespace = pg_namespace.oid;",
        ),
        (
            0,
            "SELECT pg_stat_progress_vacuum.pid, nspname, relname, phase,
       heap_blks_total, heap_blks_scanned, heap_blks_vacuumed,
       index_vacuum_count, max_dead_tuples, num_dead_tuples
FROM pg_stat_progress_vacuum
JOIN pg_class
  ON pg_stat_progress_vacuum.relid = pg_class.oid
JOIN pg_namespace
ON pg_class.relnamespace = pg_namespace.oid;",
        ),
    ]),
    requires: Requirement::NONE,
    slots: &[
        Slot::Gauge,
        Slot::Text,
        Slot::Text,
        Slot::Text,
        Slot::Gauge,
        Slot::Gauge,
        Slot::Gauge,
        Slot::Gauge,
        Slot::Gauge,
        Slot::Gauge,
    ],
    key: &[0],
    fallback: &[1, 2],
    columns: &[
        Column::new(Field::text("SCHEMA", 7, NAME_MAX), Cell::Text(1)),
        Column::new(Field::text("TABLENAME", 10, NAME_MAX), Cell::Text(2)),
        Column::new(Field::text("PHASE", 6, 25), Cell::Text(3)),
        Column::new(Field::num("HEAP_BLKS_TOTAL", 8, 19), Cell::Value(4)),
        Column::new(Field::num("HEAP_BLKS_SCANNED", 10, 19), Cell::Value(5)),
        Column::new(Field::num("HEAP_BLKS_VACUUMED", 11, 19), Cell::Value(6)),
        Column::new(Field::num("INDEX_VACUUM_COUNT", 11, 19), Cell::Value(7)),
        Column::new(Field::num("MAX_DEAD_TUPLES", 8, 19), Cell::Value(8)),
        Column::new(Field::num("NUM_DEAD_TUPLES", 8, 19), Cell::Value(9)),
    ],
    orders: &[
        OrderDef::new("nspname", "nspname", 'n', Cell::Text(1)),
        OrderDef::new("relname", "relname", 'b', Cell::Text(2)),
        OrderDef::new("phase", "phase", 'p', Cell::Text(3)),
        OrderDef::new("heap_blks_total", "heap_blks_total", 't', Cell::Value(4)),
        OrderDef::new("heap_blks_scanned", "heap_blks_scanned", 's', Cell::Value(5)),
        OrderDef::new("heap_blks_vacuumed", "heap_blks_vacuumed", 'v', Cell::Value(6)),
        OrderDef::new("index_vacuum_count", "index_vacuum_count", 'i', Cell::Value(7)),
        OrderDef::new("max_dead_tuples", "max_dead_tuples", 'm', Cell::Value(8)),
        OrderDef::new("num_dead_tuples", "num_dead_tuples", 'd', Cell::Value(9)),
    ],
};

/// `COPY` progress, available from PostgreSQL 14.
pub static COPYPROGRESS: ViewDef = ViewDef {
    name: "copyprogress",
    hotkey: 'w',
    query: Query::Fixed(
        "SELECT pid, relid, command, type, bytes_processed,
bytes_total, tuples_processed, tuples_excluded
FROM pg_stat_progress_copy;",
    ),
    requires: Requirement {
        min_version: Some(140000),
        extension: None,
    },
    slots: &[
        Slot::Gauge,
        Slot::Gauge,
        Slot::Text,
        Slot::Text,
        Slot::Gauge,
        Slot::Gauge,
        Slot::Gauge,
        Slot::Gauge,
    ],
    key: &[0],
    fallback: &[2],
    columns: &[
        Column::new(Field::text("PID", 4, NAME_MAX), Cell::Text(0)),
        Column::new(Field::num("RELID", 6, 19), Cell::Value(1)),
        Column::new(Field::num("COMMAND", 8, 19), Cell::Text(2)),
        Column::new(Field::num("TYPE", 5, 19), Cell::Text(3)),
        Column::new(Field::num("BYTES_PROCESSED", 16, 19), Cell::Bytes(4)),
        Column::new(Field::num("BYTES_TOTAL", 12, 19), Cell::Bytes(5)),
        Column::new(Field::num("TUPLES_PROCESSED", 17, 19), Cell::Value(6)),
        Column::new(Field::num("TUPLES_EXCLUDED", 16, 19), Cell::Value(7)),
    ],
    orders: &[
        OrderDef::new("pid", "pid", 'u', Cell::Value(0)),
        OrderDef::new("relid", "relid", 'e', Cell::Value(1)),
        OrderDef::new("command", "command", 'f', Cell::Text(2)),
        OrderDef::new("type", "type", 'v', Cell::Text(3)),
        OrderDef::new("bytes_processed", "bytes_processed", 'b', Cell::Value(4)),
        OrderDef::new("tuples_processed", "tuples_processed", 't', Cell::Value(6)),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::QueryResult;
    use crate::collector::mock::MockSource;
    use crate::view::{RenderContext, TableView, View};

    #[test]
    fn copy_bytes_are_scaled() {
        let sql = COPYPROGRESS.query.text(Some(160000));
        let mut source = MockSource::new();
        let mut view = TableView::new(&COPYPROGRESS);
        view.set_server_version(Some(160000));
        source.respond(
            sql,
            QueryResult::from_rows(
                &["pid", "relid", "command", "type", "bp", "bt", "tp", "te"],
                &[&[
                    Some("4242"),
                    Some("16384"),
                    Some("COPY FROM"),
                    Some("FILE"),
                    Some("10485760"),
                    Some("20480"),
                    Some("1000"),
                    Some("0"),
                ]],
            ),
        );
        view.sample(&mut source).unwrap();
        let ctx = RenderContext {
            maxprint: 1,
            width: 200,
            ..RenderContext::default()
        };
        let line = &view.print(&ctx)[0];
        assert!(line.starts_with("4242"));
        assert!(line.contains("10M"));
        assert!(line.contains("20K"));
    }

    #[test]
    fn vacuum_dead_tuple_columns_follow_the_server() {
        assert!(VACUUM.query.text(Some(160000)).contains("max_dead_tuples, num_dead_tuples"));
        let sql = VACUUM.query.text(Some(170000));
        assert!(sql.contains("max_dead_tuple_bytes, num_dead_item_ids"));
        assert!(!sql.contains("num_dead_tuples"));
    }

    #[test]
    fn vacuum_phase_is_text() {
        assert_eq!(VACUUM.slots[3], Slot::Text);
        assert!(VACUUM.requires.is_none());
        assert_eq!(COPYPROGRESS.requires.min_version, Some(140000));
    }
}
