//! `pg_stat_statements` views.
//!
//! The extension keeps one row per user, database, query and (from 14 on)
//! nesting level, so all four columns lead every query and form the key.
//! Older servers report a constant `toplevel`.

use crate::view::{Cell, Column, Field, OrderDef, Query, Requirement, Slot, ViewDef};

use super::NAME_MAX;

const EXTENSION: &str = "pg_stat_statements";

const STATEMENTS: Requirement = Requirement {
    min_version: None,
    extension: Some(EXTENSION),
};

const STATEMENTS_13: Requirement = Requirement {
    min_version: Some(130000),
    extension: Some(EXTENSION),
};

/// queryid, userid, dbid, toplevel.
const IDENTITY: &[usize] = &[0, 1, 2, 3];

const QUERYID: Column = Column::new(Field::text("QUERYID", 8, NAME_MAX), Cell::Text(0));
const BY_QUERYID: OrderDef = OrderDef::new("queryid", "queryid", 'u', Cell::Text(0));

/// Identity, a count, then five timings in milliseconds.
const TIMING_SLOTS: &[Slot] = &[
    Slot::Text,
    Slot::Gauge,
    Slot::Gauge,
    Slot::Text,
    Slot::Gauge,
    Slot::Float,
    Slot::Float,
    Slot::Float,
    Slot::Float,
    Slot::Float,
];

/// Identity, rows, then four block counts.
const BLOCK_SLOTS: &[Slot] = &[
    Slot::Text,
    Slot::Gauge,
    Slot::Gauge,
    Slot::Text,
    Slot::Gauge,
    Slot::Gauge,
    Slot::Gauge,
    Slot::Gauge,
    Slot::Gauge,
];

pub static STMTEXEC: ViewDef = ViewDef {
    name: "stmtexec",
    hotkey: 'P',
    query: Query::Since(&[
        (
            140000,
            "SELECT queryid, userid, dbid, toplevel, calls, total_exec_time,
       min_exec_time, max_exec_time, mean_exec_time, stddev_exec_time
FROM pg_stat_statements;",
        ),
        (
            130000,
            "SELECT queryid, userid, dbid, true AS toplevel, calls, total_exec_time,
       min_exec_time, max_exec_time, mean_exec_time, stddev_exec_time
FROM pg_stat_statements;",
        ),
        (
            0,
            "SELECT queryid, userid, dbid, true AS toplevel, calls, total_time,
       min_time, max_time, mean_time, stddev_time
FROM pg_stat_statements;",
        ),
    ]),
    requires: STATEMENTS,
    slots: TIMING_SLOTS,
    key: IDENTITY,
    fallback: &[0],
    columns: &[
        QUERYID,
        Column::new(Field::num("CALLS", 6, 19), Cell::Value(4)),
        Column::new(Field::num("TOTAL_EXEC_TIME", 16, 19), Cell::Float(5, 2)),
        Column::new(Field::num("MIN_EXEC_TIME", 14, 19), Cell::Float(6, 2)),
        Column::new(Field::num("MAX_EXEC_TIME", 14, 19), Cell::Float(7, 2)),
        Column::new(Field::num("MEAN_EXEC_TIME", 15, 19), Cell::Float(8, 2)),
        Column::new(Field::num("STDDEV_EXEC_TIME", 17, 19), Cell::Float(9, 2)),
    ],
    orders: &[
        BY_QUERYID,
        OrderDef::new("calls", "execs", 'c', Cell::Value(4)),
        OrderDef::new("total_exec_time", "total_exec_time", 't', Cell::Float(5, 2)),
        OrderDef::new("min_exec_time", "min_exec_time", 'n', Cell::Float(6, 2)),
        OrderDef::new("max_exec_time", "max_exec_time", 'm', Cell::Float(7, 2)),
        OrderDef::new("mean_exec_time", "mean_exec_time", 'e', Cell::Float(8, 2)),
        OrderDef::new("stddev_exec_time", "stddev_exec_time", 'd', Cell::Float(9, 2)),
    ],
};

pub static STMTPLAN: ViewDef = ViewDef {
    name: "stmtplan",
    hotkey: 'P',
    query: Query::Since(&[
        (
            140000,
            "SELECT queryid, userid, dbid, toplevel, plans, total_plan_time,
       min_plan_time, max_plan_time, mean_plan_time, stddev_plan_time
FROM pg_stat_statements;",
        ),
        (
            0,
            "SELECT queryid, userid, dbid, true AS toplevel, plans, total_plan_time,
       min_plan_time, max_plan_time, mean_plan_time, stddev_plan_time
FROM pg_stat_statements;",
        ),
    ]),
    requires: STATEMENTS_13,
    slots: TIMING_SLOTS,
    key: IDENTITY,
    fallback: &[0],
    columns: &[
        QUERYID,
        Column::new(Field::num("PLANS", 6, 19), Cell::Value(4)),
        Column::new(Field::num("TOTAL_PLAN_TIME", 16, 19), Cell::Float(5, 2)),
        Column::new(Field::num("MIN_PLAN_TIME", 14, 19), Cell::Float(6, 2)),
        Column::new(Field::num("MAX_PLAN_TIME", 14, 19), Cell::Float(7, 2)),
        Column::new(Field::num("MEAN_PLAN_TIME", 15, 19), Cell::Float(8, 2)),
        Column::new(Field::num("STDDEV_PLAN_TIME", 17, 19), Cell::Float(9, 2)),
    ],
    orders: &[
        BY_QUERYID,
        OrderDef::new("plans", "plans", 'l', Cell::Value(4)),
        OrderDef::new("total_plan_time", "total_plan_time", 't', Cell::Float(5, 2)),
        OrderDef::new("min_plan_time", "min_plan_time", 'n', Cell::Float(6, 2)),
        OrderDef::new("max_plan_time", "max_plan_time", 'm', Cell::Float(7, 2)),
        OrderDef::new("mean_plan_time", "mean_plan_time", 'e', Cell::Float(8, 2)),
        OrderDef::new("stddev_plan_time", "stddev_plan_time", 'd', Cell::Float(9, 2)),
    ],
};

pub static STMTSHAREDBLK: ViewDef = ViewDef {
    name: "stmtsharedblk",
    hotkey: 'P',
    query: Query::Since(&[
        (
            140000,
            "SELECT queryid, userid, dbid, toplevel, rows, shared_blks_hit,
       shared_blks_read, shared_blks_dirtied, shared_blks_written
FROM pg_stat_statements;",
        ),
        (
            0,
            "SELECT queryid, userid, dbid, true AS toplevel, rows, shared_blks_hit,
       shared_blks_read, shared_blks_dirtied, shared_blks_written
FROM pg_stat_statements;",
        ),
    ]),
    requires: STATEMENTS,
    slots: BLOCK_SLOTS,
    key: IDENTITY,
    fallback: &[0],
    columns: &[
        QUERYID,
        Column::new(Field::num("ROWS", 5, 19), Cell::Value(4)),
        Column::new(Field::num("SHARED_BLK_HIT", 15, 19), Cell::Value(5)),
        Column::new(Field::num("SHARED_BLK_READ", 16, 19), Cell::Value(6)),
        Column::new(Field::num("SHARED_BLK_DIRTIED", 19, 19), Cell::Value(7)),
        Column::new(Field::num("SHARED_BLK_WRITTEN", 19, 19), Cell::Value(8)),
    ],
    orders: &[
        BY_QUERYID,
        OrderDef::new("rows", "rows", 'r', Cell::Value(4)),
        OrderDef::new("shared_blk_hits", "shared_blk_hits", 'i', Cell::Value(5)),
        OrderDef::new("shared_blk_read", "shared_blk_read", 'e', Cell::Value(6)),
        OrderDef::new("shared_blk_dirtied", "shared_blk_dirtied", 'd', Cell::Value(7)),
        OrderDef::new("shared_blk_written", "shared_blk_written", 'w', Cell::Value(8)),
    ],
};

pub static STMTLOCALBLK: ViewDef = ViewDef {
    name: "stmtlocalblk",
    hotkey: 'P',
    query: Query::Since(&[
        (
            140000,
            "SELECT queryid, userid, dbid, toplevel, rows, local_blks_hit,
       local_blks_read, local_blks_dirtied, local_blks_written
FROM pg_stat_statements;",
        ),
        (
            0,
            "SELECT queryid, userid, dbid, true AS toplevel, rows, local_blks_hit,
       local_blks_read, local_blks_dirtied, local_blks_written
FROM pg_stat_statements;",
        ),
    ]),
    requires: STATEMENTS,
    slots: BLOCK_SLOTS,
    key: IDENTITY,
    fallback: &[0],
    columns: &[
        QUERYID,
        Column::new(Field::num("ROWS", 5, 19), Cell::Value(4)),
        Column::new(Field::num("LOCAL_BLK_HIT", 14, 19), Cell::Value(5)),
        Column::new(Field::num("LOCAL_BLK_READ", 15, 19), Cell::Value(6)),
        Column::new(Field::num("LOCAL_BLK_DIRTIED", 18, 19), Cell::Value(7)),
        Column::new(Field::num("LOCAL_BLK_WRITTEN", 18, 19), Cell::Value(8)),
    ],
    orders: &[
        BY_QUERYID,
        OrderDef::new("rows", "rows", 'r', Cell::Value(4)),
        OrderDef::new("local_blk_hits", "local_blk_hits", 'i', Cell::Value(5)),
        OrderDef::new("local_blk_read", "local_blk_read", 'e', Cell::Value(6)),
        OrderDef::new("local_blk_dirtied", "local_blk_dirtied", 'd', Cell::Value(7)),
        OrderDef::new("local_blk_written", "local_blk_written", 'w', Cell::Value(8)),
    ],
};

pub static STMTTEMPBLK: ViewDef = ViewDef {
    name: "stmttempblk",
    hotkey: 'P',
    query: Query::Since(&[
        (
            170000,
            "SELECT queryid, userid, dbid, toplevel, rows, temp_blks_read,
       temp_blks_written, shared_blk_read_time AS blk_read_time,
       shared_blk_write_time AS blk_write_time
FROM pg_stat_statements;",
        ),
        (
            140000,
            "SELECT queryid, userid, dbid, toplevel, rows, temp_blks_read,
       temp_blks_written, blk_read_time, blk_write_time
FROM pg_stat_statements;",
        ),
        (
            0,
            "SELECT queryid, userid, dbid, true AS toplevel, rows, temp_blks_read,
       temp_blks_written, blk_read_time, blk_write_time
FROM pg_stat_statements;",
        ),
    ]),
    requires: STATEMENTS,
    slots: &[
        Slot::Text,
        Slot::Gauge,
        Slot::Gauge,
        Slot::Text,
        Slot::Gauge,
        Slot::Gauge,
        Slot::Gauge,
        Slot::Float,
        Slot::Float,
    ],
    key: IDENTITY,
    fallback: &[0],
    columns: &[
        QUERYID,
        Column::new(Field::num("ROWS", 5, 19), Cell::Value(4)),
        Column::new(Field::num("TEMP_BLK_READ", 14, 19), Cell::Value(5)),
        Column::new(Field::num("TEMP_BLK_WRITTEN", 17, 19), Cell::Value(6)),
        Column::new(Field::num("BLK_READ_TIME", 14, 19), Cell::Float(7, 2)),
        Column::new(Field::num("BLK_WRITE_TIME", 15, 19), Cell::Float(8, 2)),
    ],
    orders: &[
        BY_QUERYID,
        OrderDef::new("rows", "rows", 'r', Cell::Value(4)),
        OrderDef::new("temp_blk_read", "temp_blk_read", 'e', Cell::Value(5)),
        OrderDef::new("temp_blk_written", "temp_blk_written", 'w', Cell::Value(6)),
        OrderDef::new("blk_read_time", "blk_read_time", 'a', Cell::Float(7, 2)),
        OrderDef::new("blk_write_time", "blk_write_time", 'i', Cell::Float(8, 2)),
    ],
};

pub static STMTWAL: ViewDef = ViewDef {
    name: "stmtwal",
    hotkey: 'w',
    query: Query::Since(&[
        (
            140000,
            "SELECT queryid, userid, dbid, toplevel, wal_records, wal_fpi, wal_bytes
FROM pg_stat_statements;",
        ),
        (
            0,
            "SELECT queryid, userid, dbid, true AS toplevel, wal_records, wal_fpi,
       wal_bytes
FROM pg_stat_statements;",
        ),
    ]),
    requires: STATEMENTS_13,
    slots: &[
        Slot::Text,
        Slot::Gauge,
        Slot::Gauge,
        Slot::Text,
        Slot::Gauge,
        Slot::Gauge,
        Slot::Gauge,
    ],
    key: IDENTITY,
    fallback: &[0],
    columns: &[
        QUERYID,
        Column::new(Field::num("WAL_RECORDS", 12, 19), Cell::Value(4)),
        Column::new(Field::num("WAL_FPI", 8, 19), Cell::Value(5)),
        Column::new(Field::num("WAL_BYTES", 10, 19), Cell::Bytes(6)),
    ],
    orders: &[
        BY_QUERYID,
        OrderDef::new("wal_records", "wal_records", 'e', Cell::Value(4)),
        OrderDef::new("wal_fpi", "wal_fpi", 'f', Cell::Value(5)),
        OrderDef::new("wal_bytes", "wal_bytes", 'v', Cell::Bytes(6)),
    ],
};
