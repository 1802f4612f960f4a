//! Per-index views.
//!
//! Both views show the cumulative counters and order by their deltas, so
//! the busiest indexes of the last interval come first.

use crate::view::{Cell, Column, Field, OrderDef, Query, Requirement, Slot, ViewDef};

use super::NAME_MAX;

const SCHEMA: Column = Column::new(Field::text("SCHEMA", 7, NAME_MAX), Cell::Text(1));
const INDEXNAME: Column = Column::new(Field::text("INDEXNAME", 10, NAME_MAX), Cell::Text(3));
const TABLENAME: Column = Column::new(Field::text("TABLENAME", 10, NAME_MAX), Cell::Text(2));

pub static INDEX: ViewDef = ViewDef {
    name: "index",
    hotkey: 'U',
    query: Query::Fixed(
        "SELECT indexrelid, schemaname, relname, indexrelname, idx_scan,
       idx_tup_read, idx_tup_fetch
FROM pg_stat_all_indexes;",
    ),
    requires: Requirement::NONE,
    slots: &[
        Slot::Gauge,
        Slot::Text,
        Slot::Text,
        Slot::Text,
        Slot::Counter,
        Slot::Counter,
        Slot::Counter,
    ],
    key: &[0],
    fallback: &[1, 3],
    columns: &[
        SCHEMA,
        INDEXNAME,
        TABLENAME,
        Column::new(Field::num("SCAN", 5, 19), Cell::Value(4)),
        Column::new(Field::num("TUP_READ", 9, 19), Cell::Value(5)),
        Column::new(Field::num("TUP_FETCH", 10, 19), Cell::Value(6)),
    ],
    orders: &[
        OrderDef::new("schema", "schema", 's', Cell::Text(1)),
        OrderDef::new("indexname", "indexname", 'i', Cell::Text(3)),
        OrderDef::new("tablename", "tablename", 't', Cell::Text(2)),
        OrderDef::new("idx_scan", "idx_scan", 'c', Cell::Delta(4)),
        OrderDef::new("idx_tup_read", "idx_tup_read", 'r', Cell::Delta(5)),
        OrderDef::new("idx_tup_fetch", "idx_tup_fetch", 'f', Cell::Delta(6)),
    ],
};

pub static INDEXIO: ViewDef = ViewDef {
    name: "indexio",
    hotkey: 'U',
    query: Query::Fixed(
        "SELECT indexrelid, schemaname, relname, indexrelname,
       idx_blks_read, idx_blks_hit
FROM pg_statio_all_indexes;",
    ),
    requires: Requirement::NONE,
    slots: &[
        Slot::Gauge,
        Slot::Text,
        Slot::Text,
        Slot::Text,
        Slot::Counter,
        Slot::Counter,
    ],
    key: &[0],
    fallback: &[1, 3],
    columns: &[
        SCHEMA,
        INDEXNAME,
        TABLENAME,
        Column::new(Field::num("BLKS_READ", 10, 19), Cell::Value(4)),
        Column::new(Field::num("BLKS_HIT", 9, 19), Cell::Value(5)),
    ],
    orders: &[
        OrderDef::new("schema", "schema", 's', Cell::Text(1)),
        OrderDef::new("indexname", "indexname", 'i', Cell::Text(3)),
        OrderDef::new("tablename", "tablename", 't', Cell::Text(2)),
        OrderDef::new("idx_blks_read", "idx_blks_read", 'r', Cell::Delta(4)),
        OrderDef::new("idx_blks_hit", "idx_blks_hit", 'h', Cell::Delta(5)),
    ],
};
