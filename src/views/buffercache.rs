//! Shared buffer contents via the `pg_buffercache` extension.

use crate::view::{Cell, Column, Field, OrderDef, Query, Requirement, Slot, ViewDef};

use super::NAME_MAX;

const BUFFERCACHE: Requirement = Requirement {
    min_version: None,
    extension: Some("pg_buffercache"),
};

const BUFFERID: Column = Column::new(Field::text("BUFFERID", 9, NAME_MAX), Cell::Text(0));

pub static BUFFERCACHESTAT: ViewDef = ViewDef {
    name: "buffercachestat",
    hotkey: 'P',
    query: Query::Fixed(
        "SELECT bufferid, isdirty, usagecount, pinning_backends
FROM pg_buffercache;",
    ),
    requires: BUFFERCACHE,
    // isdirty arrives as `t`/`f` and is shown as such.
    slots: &[Slot::Gauge, Slot::Text, Slot::Gauge, Slot::Gauge],
    key: &[0],
    fallback: &[0],
    columns: &[
        BUFFERID,
        Column::new(Field::num("ISDIRTY", 8, 19), Cell::Text(1)),
        Column::new(Field::num("USAGECOUNT", 11, 19), Cell::Value(2)),
        Column::new(Field::num("PINNING_BACKENDS", 17, 19), Cell::Value(3)),
    ],
    orders: &[
        OrderDef::new("bufferid", "bufferid", 'u', Cell::Value(0)),
        OrderDef::new("isdirty", "isdirty", 'i', Cell::Text(1)),
        OrderDef::new("usagecount", "usagecount", 'c', Cell::Value(2)),
        OrderDef::new("pinning_backends", "pinning_backends", 'n', Cell::Value(3)),
    ],
};

pub static BUFFERCACHEREL: ViewDef = ViewDef {
    name: "buffercacherel",
    hotkey: 'P',
    query: Query::Fixed(
        "SELECT bufferid, relfilenode, reltablespace, reldatabase, relforknumber,
       relblocknumber
FROM pg_buffercache;",
    ),
    requires: BUFFERCACHE,
    slots: &[
        Slot::Gauge,
        Slot::Gauge,
        Slot::Gauge,
        Slot::Gauge,
        Slot::Gauge,
        Slot::Gauge,
    ],
    key: &[0],
    fallback: &[0],
    columns: &[
        BUFFERID,
        Column::new(Field::num("RELFILENODE", 12, 19), Cell::Value(1)),
        Column::new(Field::num("RELTABLESPACE", 14, 19), Cell::Value(2)),
        Column::new(Field::num("RELDATABASE", 12, 19), Cell::Value(3)),
        Column::new(Field::num("RELFORKNUMBER", 14, 19), Cell::Value(4)),
        Column::new(Field::num("RELBLOCKNUMBER", 15, 19), Cell::Value(5)),
    ],
    orders: &[
        OrderDef::new("bufferid", "bufferid", 'u', Cell::Value(0)),
        OrderDef::new("relfilenode", "relfilenode", 'f', Cell::Value(1)),
        OrderDef::new("reltablespace", "reltablespace", 't', Cell::Value(2)),
        OrderDef::new("reldatabase", "reldatabase", 'a', Cell::Value(3)),
        OrderDef::new("relforknumber", "relforknumber", 'r', Cell::Value(4)),
        OrderDef::new("relblocknumber", "relblocknumber", 'b', Cell::Value(5)),
    ],
};
