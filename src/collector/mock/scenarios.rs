//! Pre-built query results shared by engine and view tests.

use super::MockSource;
use crate::collector::QueryResult;

/// `pg_stat_database`-shaped result for the transaction view:
/// `(datid, datname, numbackends, xact_commit, xact_rollback, deadlocks)`.
pub fn database_rows(rows: &[(i64, &str, i64, i64, i64, i64)]) -> QueryResult {
    QueryResult {
        columns: [
            "datid",
            "datname",
            "numbackends",
            "xact_commit",
            "xact_rollback",
            "deadlocks",
        ]
        .iter()
        .map(|c| c.to_string())
        .collect(),
        rows: rows
            .iter()
            .map(|(id, name, backends, commit, rollback, deadlocks)| {
                vec![
                    Some(id.to_string()),
                    Some(name.to_string()),
                    Some(backends.to_string()),
                    Some(commit.to_string()),
                    Some(rollback.to_string()),
                    Some(deadlocks.to_string()),
                ]
            })
            .collect(),
    }
}

/// Scripts the extension lookup so that `extension` reports as installed.
pub fn statements_available(source: &mut MockSource, extension: &str) {
    source.respond(
        &format!("SELECT 1 FROM pg_extension WHERE extname = '{}'", extension),
        QueryResult::from_rows(&["?column?"], &[&[Some("1")]]),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_rows_keeps_column_order() {
        let r = database_rows(&[(5, "app", 3, 100, 2, 0)]);
        assert_eq!(r.columns[1], "datname");
        assert_eq!(r.cell(0, 0), Some("5"));
        assert_eq!(r.cell(0, 3), Some("100"));
    }
}
