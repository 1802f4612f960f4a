//! Per-table views over `pg_stat_all_tables` and `pg_statio_all_tables`.

use crate::view::{Cell, Column, Field, OrderDef, Query, Requirement, Slot, ViewDef};

use super::NAME_MAX;

const SCHEMA: Column = Column::new(Field::text("SCHEMA", 7, NAME_MAX), Cell::Text(1));
const NAME: Column = Column::new(Field::text("NAME", 5, NAME_MAX), Cell::Text(2));
const BY_SCHEMA: OrderDef = OrderDef::new("schema", "schema", 's', Cell::Text(1));
const BY_NAME: OrderDef = OrderDef::new("name", "name", 'n', Cell::Text(2));

/// relid, schemaname, relname followed by two block counters.
const IO_SLOTS: &[Slot] = &[Slot::Gauge, Slot::Text, Slot::Text, Slot::Counter, Slot::Counter];

pub static TABLEANALYZE: ViewDef = ViewDef {
    name: "tableanalyze",
    hotkey: 'T',
    query: Query::Fixed(
        "SELECT relid, schemaname, relname, n_mod_since_analyze,
       last_analyze, last_autoanalyze, analyze_count,
       autoanalyze_count
FROM pg_stat_all_tables;",
    ),
    requires: Requirement::NONE,
    slots: &[
        Slot::Gauge,
        Slot::Text,
        Slot::Text,
        Slot::Gauge,
        Slot::Text,
        Slot::Text,
        Slot::Gauge,
        Slot::Gauge,
    ],
    key: &[0],
    fallback: &[1, 2],
    columns: &[
        SCHEMA,
        NAME,
        Column::new(Field::num("N_MOD", 6, 19), Cell::Value(3)),
        Column::new(Field::text("LAST_ANALYZE", 13, 29), Cell::Text(4)),
        Column::new(Field::text("LAST_AUTOANALYZE", 17, 29), Cell::Text(5)),
        Column::new(Field::text("ANALYZE_COUNT", 14, 19), Cell::Value(6)),
        Column::new(Field::text("AUTOANALYZE_COUNT", 18, 19), Cell::Value(7)),
    ],
    orders: &[
        BY_SCHEMA,
        BY_NAME,
        OrderDef::new("n_mod_since_analyze", "n_mod_since_analyze", 'm', Cell::Value(3)),
        OrderDef::new("analyze_count", "analyze_count", 'v', Cell::Value(6)),
        OrderDef::new("autoanalyze_count", "autoanalyze_count", 'V', Cell::Value(7)),
    ],
};

pub static TABLEIOHEAP: ViewDef = ViewDef {
    name: "tableioheap",
    hotkey: 'U',
    query: Query::Fixed(
        "SELECT relid, schemaname, relname, heap_blks_read, heap_blks_hit
FROM pg_statio_all_tables;",
    ),
    requires: Requirement::NONE,
    slots: IO_SLOTS,
    key: &[0],
    fallback: &[1, 2],
    columns: &[
        SCHEMA,
        NAME,
        Column::new(Field::num("HEAP_BLKS_READ", 15, 19), Cell::Delta(3)),
        Column::new(Field::num("HEAP_BLKS_HIT", 14, 19), Cell::Delta(4)),
    ],
    orders: &[
        BY_SCHEMA,
        BY_NAME,
        OrderDef::new("heap_blks_read", "heap_blks_read", 'i', Cell::Delta(3)),
        OrderDef::new("heap_blks_hit", "heap_blks_hit", 'u', Cell::Delta(4)),
    ],
};

pub static TABLEIOIDX: ViewDef = ViewDef {
    name: "tableioidx",
    hotkey: 'U',
    query: Query::Fixed(
        "SELECT relid, schemaname, relname, idx_blks_read, idx_blks_hit
FROM pg_statio_all_tables;",
    ),
    requires: Requirement::NONE,
    slots: IO_SLOTS,
    key: &[0],
    fallback: &[1, 2],
    columns: &[
        SCHEMA,
        NAME,
        Column::new(Field::num("IDX_BLKS_READ", 14, 19), Cell::Delta(3)),
        Column::new(Field::num("IDX_BLKS_HIT", 13, 19), Cell::Delta(4)),
    ],
    orders: &[
        BY_SCHEMA,
        BY_NAME,
        OrderDef::new("idx_blks_read", "idx_blks_read", 'd', Cell::Delta(3)),
        OrderDef::new("idx_blks_hit", "idx_blks_hit", 'h', Cell::Delta(4)),
    ],
};

pub static TABLEIOTIDX: ViewDef = ViewDef {
    name: "tableiotidx",
    hotkey: 'U',
    query: Query::Fixed(
        "SELECT relid, schemaname, relname, tidx_blks_read, tidx_blks_hit
FROM pg_statio_all_tables;",
    ),
    requires: Requirement::NONE,
    slots: IO_SLOTS,
    key: &[0],
    fallback: &[1, 2],
    columns: &[
        SCHEMA,
        NAME,
        Column::new(Field::num("TIDX_BLKS_READ", 14, 19), Cell::Delta(3)),
        Column::new(Field::num("TIDX_BLKS_HIT", 13, 19), Cell::Delta(4)),
    ],
    orders: &[
        BY_SCHEMA,
        BY_NAME,
        OrderDef::new("tidx_blks_read", "tidx_blks_read", 'd', Cell::Delta(3)),
        OrderDef::new("tidx_blks_hit", "tidx_blks_hit", 'h', Cell::Delta(4)),
    ],
};

pub static TABLEIOTOAST: ViewDef = ViewDef {
    name: "tableiotoast",
    hotkey: 'U',
    query: Query::Fixed(
        "SELECT relid, schemaname, relname, toast_blks_read,
       toast_blks_hit
FROM pg_statio_all_tables;",
    ),
    requires: Requirement::NONE,
    slots: IO_SLOTS,
    key: &[0],
    fallback: &[1, 2],
    columns: &[
        SCHEMA,
        NAME,
        Column::new(Field::num("TOAST_BLKS_READ", 16, 19), Cell::Delta(3)),
        Column::new(Field::num("TOAST_BLKS_HIT", 15, 19), Cell::Delta(4)),
    ],
    orders: &[
        BY_SCHEMA,
        BY_NAME,
        OrderDef::new("toast_blks_read", "toast_blks_read", 'o', Cell::Delta(3)),
        OrderDef::new("toast_blks_hit", "toast_blks_hit", 'v', Cell::Delta(4)),
    ],
};

pub static TABLESCAN: ViewDef = ViewDef {
    name: "tablescan",
    hotkey: 'T',
    query: Query::Fixed(
        "SELECT relid, schemaname, relname, seq_scan, seq_tup_read,
       idx_scan, idx_tup_fetch
FROM pg_stat_all_tables;",
    ),
    requires: Requirement::NONE,
    slots: &[
        Slot::Gauge,
        Slot::Text,
        Slot::Text,
        Slot::Counter,
        Slot::Counter,
        Slot::Counter,
        Slot::Counter,
    ],
    key: &[0],
    fallback: &[1, 2],
    columns: &[
        SCHEMA,
        NAME,
        Column::new(Field::num("SEQ_SCAN", 9, 19), Cell::Delta(3)),
        Column::new(Field::num("SEQ_TUP_READ", 13, 19), Cell::Delta(4)),
        Column::new(Field::num("IDX_SCAN", 9, 19), Cell::Delta(5)),
        Column::new(Field::num("IDX_TUP_FETCH", 14, 19), Cell::Delta(6)),
    ],
    orders: &[
        BY_SCHEMA,
        BY_NAME,
        OrderDef::new("seq_scan", "seq_scan", 'c', Cell::Delta(3)),
        OrderDef::new("seq_tup_read", "seq_tup_read", 't', Cell::Delta(4)),
        OrderDef::new("idx_scan", "idx_scan", 'i', Cell::Delta(5)),
        OrderDef::new("idx_tup_fetch", "idx_tup_fetch", 'f', Cell::Delta(6)),
    ],
};

/// Row modifications are diffed, live and dead tuple counts are gauges.
pub static TABLETUP: ViewDef = ViewDef {
    name: "tabletup",
    hotkey: 'U',
    query: Query::Fixed(
        "SELECT relid, schemaname, relname, n_tup_ins, n_tup_upd,
       n_tup_del, n_tup_hot_upd, n_live_tup, n_dead_tup
FROM pg_stat_all_tables;",
    ),
    requires: Requirement::NONE,
    slots: &[
        Slot::Gauge,
        Slot::Text,
        Slot::Text,
        Slot::Counter,
        Slot::Counter,
        Slot::Counter,
        Slot::Counter,
        Slot::Gauge,
        Slot::Gauge,
    ],
    key: &[0],
    fallback: &[1, 2],
    columns: &[
        SCHEMA,
        NAME,
        Column::new(Field::num("INS", 4, 19), Cell::Delta(3)),
        Column::new(Field::num("UPD", 4, 19), Cell::Delta(4)),
        Column::new(Field::num("DEL", 4, 19), Cell::Delta(5)),
        Column::new(Field::num("HOT_UPD", 8, 19), Cell::Delta(6)),
        Column::new(Field::num("LIVE", 5, 19), Cell::Value(7)),
        Column::new(Field::num("DEAD", 5, 19), Cell::Value(8)),
    ],
    orders: &[
        BY_SCHEMA,
        BY_NAME,
        OrderDef::new("n_tup_ins", "n_tup_ins", 'i', Cell::Delta(3)),
        OrderDef::new("n_tup_upd", "n_tup_upd", 'u', Cell::Delta(4)),
        OrderDef::new("n_tup_del", "n_tup_del", 'd', Cell::Delta(5)),
        OrderDef::new("n_tup_hot_upd", "n_tup_hot_upd", 'h', Cell::Delta(6)),
        OrderDef::new("n_live_tup", "n_live_tup", 'V', Cell::Value(7)),
        OrderDef::new("n_dead_tup", "n_dead_tup", 'e', Cell::Value(8)),
    ],
};

pub static TABLEVAC: ViewDef = ViewDef {
    name: "tablevac",
    hotkey: 'T',
    query: Query::Fixed(
        "SELECT relid, schemaname, relname, last_vacuum, last_autovacuum,
       vacuum_count, autovacuum_count
FROM pg_stat_all_tables;",
    ),
    requires: Requirement::NONE,
    slots: &[
        Slot::Gauge,
        Slot::Text,
        Slot::Text,
        Slot::Text,
        Slot::Text,
        Slot::Gauge,
        Slot::Gauge,
    ],
    key: &[0],
    fallback: &[1, 2],
    columns: &[
        SCHEMA,
        NAME,
        Column::new(Field::text("LAST_VACUUM", 12, 29), Cell::Text(3)),
        Column::new(Field::text("LAST_AUTOVACUUM", 16, 29), Cell::Text(4)),
        Column::new(Field::text("VACUUM_COUNT", 13, 19), Cell::Value(5)),
        Column::new(Field::text("AUTOVACUUM_COUNT", 17, 19), Cell::Value(6)),
    ],
    orders: &[
        BY_SCHEMA,
        BY_NAME,
        OrderDef::new("vacuum_count", "vacuum_count", 'v', Cell::Value(5)),
        OrderDef::new("autovacuum_count", "autovacuum_count", 'a', Cell::Value(6)),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::QueryResult;
    use crate::collector::mock::MockSource;
    use crate::view::{Direction, RenderContext, TableView, View};

    fn tabletup(rows: &[(&str, &str, &str, &str, &str)]) -> QueryResult {
        let rows: Vec<Vec<Option<&str>>> = rows
            .iter()
            .map(|&(relid, schema, name, ins, dead)| {
                vec![
                    Some(relid),
                    Some(schema),
                    Some(name),
                    Some(ins),
                    Some("0"),
                    Some("0"),
                    Some("0"),
                    Some("0"),
                    Some(dead),
                ]
            })
            .collect();
        let refs: Vec<&[Option<&str>]> = rows.iter().map(|r| r.as_slice()).collect();
        QueryResult::from_rows(
            &["relid", "schemaname", "relname", "ins", "upd", "del", "hot", "live", "dead"],
            &refs,
        )
    }

    fn names(view: &TableView) -> Vec<String> {
        view.store()
            .rows()
            .map(|r| r.values[2].as_str().unwrap_or("").to_string())
            .collect()
    }

    #[test]
    fn dead_tuples_are_not_diffed() {
        let sql = TABLETUP.query.text(None);
        let mut source = MockSource::new();
        let mut view = TableView::new(&TABLETUP);
        source.respond(sql, tabletup(&[("1", "public", "t", "10", "7")]));
        view.sample(&mut source).unwrap();
        source.respond(sql, tabletup(&[("1", "public", "t", "15", "7")]));
        view.sample(&mut source).unwrap();

        let ctx = RenderContext {
            maxprint: 1,
            width: 200,
            ..RenderContext::default()
        };
        let line = &view.print(&ctx)[0];
        let cells: Vec<&str> = line.split_whitespace().collect();
        assert_eq!(cells, vec!["public", "t", "+5", "0", "0", "0", "0", "7"]);
    }

    #[test]
    fn equal_keys_fall_back_to_schema_then_name() {
        let sql = TABLETUP.query.text(None);
        let mut source = MockSource::new();
        let mut view = TableView::new(&TABLETUP);
        source.respond(
            sql,
            tabletup(&[
                ("3", "public", "b", "5", "0"),
                ("1", "public", "a", "5", "0"),
                ("2", "audit", "z", "5", "0"),
                ("4", "public", "c", "9", "0"),
            ]),
        );
        view.sample(&mut source).unwrap();
        let by_ins = view.orders().iter().position(|o| o.hotkey == 'i').unwrap();
        view.sort(by_ins, Direction::Natural, &RenderContext::default());
        assert_eq!(names(&view), vec!["c", "z", "a", "b"]);
    }
}
