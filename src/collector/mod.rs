//! Data-source abstraction for the statistics views.
//!
//! The view engine only needs three things from the monitored server:
//! connect, run a parameterless read-only query returning text cells,
//! and disconnect. `DataSource` captures exactly that so the engine can
//! run against PostgreSQL (`PostgresSource`) or a scripted `MockSource`.

pub mod mock;
pub mod pg_collector;

pub use pg_collector::{PostgresSource, SslMode};

/// Error type for data-source operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Server unreachable or rejected the credentials.
    Connection(String),
    /// Query returned a non-success status.
    Query {
        /// SQLSTATE code, when the server sent one.
        code: Option<String>,
        message: String,
    },
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Connection(msg) => write!(f, "Cannot connect to database: {}", msg),
            SourceError::Query {
                code: Some(code),
                message,
            } => write!(f, "Query failed ({}): {}", code, message),
            SourceError::Query { code: None, message } => write!(f, "Query failed: {}", message),
        }
    }
}

impl std::error::Error for SourceError {}

/// Tabular query result with every cell kept as text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryResult {
    /// Builds a result from string literals. Mostly useful in tests.
    pub fn from_rows(columns: &[&str], rows: &[&[Option<&str>]]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.map(str::to_string)).collect())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the cell text, `None` for NULL or out-of-range cells.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(|c| c.as_deref())
    }
}

/// Connection identity shown in the header line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceInfo {
    /// Product and version, e.g. `"PostgreSQL 16.2"`.
    pub server: String,
    pub user: String,
    pub host: String,
    pub port: String,
    pub database: String,
}

/// Read-only access to the monitored server.
pub trait DataSource {
    /// Establishes the connection if it is not already open.
    fn connect(&mut self) -> Result<(), SourceError>;

    /// Runs a parameterless read-only query.
    ///
    /// Implementations connect lazily, so callers may skip `connect`.
    fn query(&mut self, sql: &str) -> Result<QueryResult, SourceError>;

    /// Ends the cycle. Transient sources close the connection here,
    /// persistent ones keep it for the next cycle.
    fn disconnect(&mut self);

    /// Server version as `server_version_num` (e.g. `160002`).
    fn server_version_num(&mut self) -> Option<u32>;

    /// Connection identity for the header line.
    fn info(&self) -> SourceInfo;
}
