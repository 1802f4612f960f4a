//! Header line shared by the interactive and batch displays.

use crate::collector::SourceInfo;

/// `(first, last, total)` of the visible rows, 1-based, or `None` when the
/// window covers every row.
pub fn row_range(dispstart: usize, maxprint: usize, total: usize) -> Option<(usize, usize, usize)> {
    if total == 0 {
        return None;
    }
    let start = dispstart + 1;
    let end = dispstart.saturating_add(maxprint).min(total);
    if start > 1 || end != total {
        Some((start, end, total))
    } else {
        None
    }
}

/// `HH:MM:SS [(a-b of n) ][PAUSED ]<server> user@host:port/db`
pub fn header_line(
    clock: &str,
    range: Option<(usize, usize, usize)>,
    paused: bool,
    info: &SourceInfo,
) -> String {
    let mut line = String::with_capacity(96);
    line.push_str(clock);
    line.push(' ');
    if let Some((start, end, total)) = range {
        line.push_str(&format!("({}-{} of {}) ", start, end, total));
    }
    if paused {
        line.push_str("PAUSED ");
    }
    line.push_str(&info.server);
    line.push_str(&format!(
        " {}@{}:{}/{}",
        info.user, info.host, info.port, info.database
    ));
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> SourceInfo {
        SourceInfo {
            server: "PostgreSQL 16.2".to_string(),
            user: "postgres".to_string(),
            host: "db1".to_string(),
            port: "5432".to_string(),
            database: "app".to_string(),
        }
    }

    #[test]
    fn range_only_when_window_is_partial() {
        assert_eq!(row_range(0, 20, 10), None);
        assert_eq!(row_range(0, 10, 10), None);
        assert_eq!(row_range(0, 5, 10), Some((1, 5, 10)));
        assert_eq!(row_range(8, 5, 10), Some((9, 10, 10)));
        assert_eq!(row_range(0, 5, 0), None);
    }

    #[test]
    fn full_header() {
        assert_eq!(
            header_line("12:00:01", Some((1, 5, 10)), true, &info()),
            "12:00:01 (1-5 of 10) PAUSED PostgreSQL 16.2 postgres@db1:5432/app"
        );
        assert_eq!(
            header_line("12:00:01", None, false, &info()),
            "12:00:01 PostgreSQL 16.2 postgres@db1:5432/app"
        );
    }

    #[test]
    fn unreachable_server_leaves_label_empty() {
        let info = SourceInfo {
            server: String::new(),
            ..info()
        };
        assert_eq!(
            header_line("09:30:00", None, false, &info),
            "09:30:00  postgres@db1:5432/app"
        );
    }
}
