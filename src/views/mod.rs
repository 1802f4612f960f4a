//! Built-in view catalog.
//!
//! Every view is a static [`ViewDef`]; the engine in [`crate::view`] does the
//! rest. Order here is the order of the `help` listing and hotkey cycling.

pub mod buffercache;
pub mod database;
pub mod index;
pub mod progress;
pub mod statement;
pub mod table;

use crate::view::ViewDef;

/// Widest a PostgreSQL identifier can be.
pub const NAME_MAX: usize = 64;

pub static CATALOG: &[&ViewDef] = &[
    &database::DBXACT,
    &database::DBBLK,
    &database::DBCONFL,
    &database::DBTUP,
    &index::INDEX,
    &index::INDEXIO,
    &table::TABLEANALYZE,
    &table::TABLEIOHEAP,
    &table::TABLEIOIDX,
    &table::TABLEIOTIDX,
    &table::TABLEIOTOAST,
    &table::TABLESCAN,
    &table::TABLETUP,
    &table::TABLEVAC,
    &progress::VACUUM,
    &progress::COPYPROGRESS,
    &statement::STMTEXEC,
    &statement::STMTPLAN,
    &statement::STMTSHAREDBLK,
    &statement::STMTLOCALBLK,
    &statement::STMTTEMPBLK,
    &statement::STMTWAL,
    &buffercache::BUFFERCACHESTAT,
    &buffercache::BUFFERCACHEREL,
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::view::Cell;

    fn slots_of(cell: &Cell) -> Vec<usize> {
        match *cell {
            Cell::Text(i)
            | Cell::Value(i)
            | Cell::Delta(i)
            | Cell::Bytes(i)
            | Cell::Float(i, _) => vec![i],
            Cell::Rate(slots) => slots.to_vec(),
            Cell::Percent { hit, read } => vec![hit, read],
        }
    }

    #[test]
    fn names_are_unique() {
        let names: HashSet<_> = CATALOG.iter().map(|d| d.name).collect();
        assert_eq!(names.len(), CATALOG.len());
    }

    #[test]
    fn order_hotkeys_are_unique_per_view() {
        for def in CATALOG {
            let keys: HashSet<_> = def.orders.iter().map(|o| o.hotkey).collect();
            assert_eq!(keys.len(), def.orders.len(), "{}", def.name);
        }
    }

    #[test]
    fn every_cell_points_at_a_slot() {
        for def in CATALOG {
            let cells = def
                .columns
                .iter()
                .map(|c| &c.cell)
                .chain(def.orders.iter().filter_map(|o| o.key.as_ref()));
            for cell in cells {
                for slot in slots_of(cell) {
                    assert!(slot < def.slots.len(), "{}: slot {slot}", def.name);
                }
            }
            for &slot in def.key.iter().chain(def.fallback) {
                assert!(slot < def.slots.len(), "{}: slot {slot}", def.name);
            }
        }
    }

    #[test]
    fn columns_fit_their_bounds() {
        for def in CATALOG {
            for column in def.columns {
                assert!(column.field.min_width <= column.field.max_width, "{}", def.name);
                assert!(!column.field.title.is_empty());
            }
        }
    }
}
