//! Per-database views over `pg_stat_database`.

use crate::view::{Cell, Column, Field, OrderDef, Query, Requirement, Slot, ViewDef};

use super::NAME_MAX;

const DATNAME: Field = Field::text("DATABASE", 9, NAME_MAX);

/// Transactions, connections and deadlocks.
pub static DBXACT: ViewDef = ViewDef {
    name: "dbxact",
    hotkey: 'D',
    query: Query::Fixed(
        "SELECT datid, coalesce(datname, '<shared relation objects>'),
       numbackends, xact_commit, xact_rollback, deadlocks
FROM pg_stat_database;",
    ),
    requires: Requirement::NONE,
    slots: &[
        Slot::Gauge,
        Slot::Text,
        Slot::Gauge,
        Slot::Counter,
        Slot::Counter,
        Slot::Counter,
    ],
    key: &[0],
    fallback: &[1],
    columns: &[
        Column::new(DATNAME, Cell::Text(1)),
        Column::new(Field::num("CONNECTIONS", 12, 12), Cell::Value(2)),
        Column::new(Field::num("COMMITS", 8, 19), Cell::Delta(3)),
        Column::new(Field::num("COMMITS/s", 10, 19), Cell::Rate(&[3])),
        Column::new(Field::num("ROLLBACKS", 10, 19), Cell::Delta(4)),
        Column::new(Field::num("ROLLBACKS/s", 12, 19), Cell::Rate(&[4])),
        Column::new(Field::num("DEADLOCKS", 10, 19), Cell::Delta(5)),
    ],
    orders: &[
        OrderDef::new("datname", "datname", 'n', Cell::Text(1)),
        OrderDef::new("numbackends", "numbackends", 'b', Cell::Value(2)),
        OrderDef::new("xact_commit", "xact_commit", 'c', Cell::Delta(3)),
        OrderDef::new("xact_rollback", "xact_rollback", 'r', Cell::Delta(4)),
        OrderDef::new("deadlocks", "deadlocks", 'd', Cell::Delta(5)),
    ],
};

/// Block reads, cache hits, I/O timing and temporary files.
pub static DBBLK: ViewDef = ViewDef {
    name: "dbblk",
    hotkey: 'B',
    query: Query::Fixed(
        "SELECT datid, coalesce(datname, '<shared relation objects>'),
       blks_read, blks_hit, temp_files, temp_bytes,
       blk_read_time, blk_write_time
FROM pg_stat_database;",
    ),
    requires: Requirement::NONE,
    slots: &[
        Slot::Gauge,
        Slot::Text,
        Slot::Counter,
        Slot::Counter,
        Slot::Counter,
        Slot::Counter,
        Slot::Counter,
        Slot::Counter,
    ],
    key: &[0],
    fallback: &[1],
    columns: &[
        Column::new(DATNAME, Cell::Text(1)),
        Column::new(Field::num("READ", 5, 19), Cell::Delta(2)),
        Column::new(Field::num("READ/s", 7, 19), Cell::Rate(&[2])),
        Column::new(Field::num("HIT", 4, 19), Cell::Delta(3)),
        Column::new(Field::num("HIT%", 5, 5), Cell::Percent { hit: 3, read: 2 }),
        Column::new(Field::num("R_TIME", 7, 19), Cell::Delta(6)),
        Column::new(Field::num("W_TIME", 7, 19), Cell::Delta(7)),
        Column::new(Field::num("TMP_FILES", 10, 19), Cell::Delta(4)),
        Column::new(Field::num("TMP_BYTES", 10, 19), Cell::Delta(5)),
    ],
    orders: &[
        OrderDef::new("datname", "datname", 'n', Cell::Text(1)),
        OrderDef::new("blks_read", "blks_read", 'r', Cell::Delta(2)),
        OrderDef::new("blks_hit", "blks_hit", 'h', Cell::Delta(3)),
        OrderDef::new("temp_files", "temp_files", 'f', Cell::Delta(4)),
        OrderDef::new("temp_bytes", "temp_bytes", 'b', Cell::Delta(5)),
        OrderDef::new("blk_read_time", "blk_read_time", 'R', Cell::Delta(6)),
        OrderDef::new("blk_write_time", "blk_write_time", 'W', Cell::Delta(7)),
    ],
};

/// Recovery conflicts on standbys.
pub static DBCONFL: ViewDef = ViewDef {
    name: "dbconfl",
    hotkey: 'C',
    query: Query::Fixed(
        "SELECT a.datid, a.datname, conflicts, confl_tablespace,
       confl_lock, confl_snapshot, confl_bufferpin,
       confl_deadlock
FROM pg_stat_database a, pg_stat_database_conflicts b
WHERE a.datid = b.datid;",
    ),
    requires: Requirement::NONE,
    slots: &[
        Slot::Gauge,
        Slot::Text,
        Slot::Counter,
        Slot::Counter,
        Slot::Counter,
        Slot::Counter,
        Slot::Counter,
        Slot::Counter,
    ],
    key: &[0],
    fallback: &[1],
    columns: &[
        Column::new(DATNAME, Cell::Text(1)),
        Column::new(Field::num("CONFLICTS", 10, 19), Cell::Delta(2)),
        Column::new(Field::num("TABLESPACE", 11, 19), Cell::Delta(3)),
        Column::new(Field::num("LOCK", 5, 19), Cell::Delta(4)),
        Column::new(Field::num("SNAPSHOT", 9, 19), Cell::Delta(5)),
        Column::new(Field::num("BUFFERPIN", 10, 19), Cell::Delta(6)),
        Column::new(Field::num("DEADLOCK", 9, 19), Cell::Delta(7)),
    ],
    orders: &[
        OrderDef::new("datname", "datname", 'n', Cell::Text(1)),
        OrderDef::new("conflicts", "conflicts", 'c', Cell::Delta(2)),
        OrderDef::new("confl_tablespace", "confl_tablespace", 't', Cell::Delta(3)),
        OrderDef::new("confl_lock", "confl_lock", 'l', Cell::Delta(4)),
        OrderDef::new("confl_snapshot", "confl_snapshot", 's', Cell::Delta(5)),
        OrderDef::new("confl_bufferpin", "confl_bufferpin", 'b', Cell::Delta(6)),
        OrderDef::new("confl_deadlock", "confl_deadlock", 'd', Cell::Delta(7)),
    ],
};

/// Tuples returned, fetched and modified.
pub static DBTUP: ViewDef = ViewDef {
    name: "dbtup",
    hotkey: 'T',
    query: Query::Fixed(
        "SELECT datid, coalesce(datname, '<shared relation objects>'),
       tup_returned, tup_fetched, tup_inserted, tup_updated,
       tup_deleted
FROM pg_stat_database;",
    ),
    requires: Requirement::NONE,
    slots: &[
        Slot::Gauge,
        Slot::Text,
        Slot::Counter,
        Slot::Counter,
        Slot::Counter,
        Slot::Counter,
        Slot::Counter,
    ],
    key: &[0],
    fallback: &[1],
    columns: &[
        Column::new(DATNAME, Cell::Text(1)),
        Column::new(Field::num("R/s", 4, 19), Cell::Rate(&[2])),
        Column::new(Field::num("W/s", 4, 19), Cell::Rate(&[4, 5, 6])),
        Column::new(Field::num("RETURNED", 9, 19), Cell::Delta(2)),
        Column::new(Field::num("FETCHED", 8, 19), Cell::Delta(3)),
        Column::new(Field::num("INSERTED", 9, 19), Cell::Delta(4)),
        Column::new(Field::num("UPDATED", 8, 19), Cell::Delta(5)),
        Column::new(Field::num("DELETED", 8, 19), Cell::Delta(6)),
    ],
    orders: &[
        OrderDef::new("datname", "datname", 'n', Cell::Text(1)),
        OrderDef::new("tup_returned", "tup_returned", 'r', Cell::Delta(2)),
        OrderDef::new("tup_fetched", "tup_fetched", 'f', Cell::Delta(3)),
        OrderDef::new("tup_inserted", "tup_inserted", 'i', Cell::Delta(4)),
        OrderDef::new("tup_updated", "tup_updated", 'u', Cell::Delta(5)),
        OrderDef::new("tup_deleted", "tup_deleted", 'd', Cell::Delta(6)),
    ],
};
