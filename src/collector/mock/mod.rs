//! Scripted in-memory data source for testing.
//!
//! `MockSource` answers queries from a table of canned results keyed by
//! the exact SQL text, and can be switched "down" to simulate an
//! unreachable server or told to fail particular queries.

mod scenarios;

pub use scenarios::{database_rows, statements_available};

use std::collections::{HashMap, HashSet};

use super::{DataSource, QueryResult, SourceError, SourceInfo};

#[derive(Debug, Clone, Default)]
pub struct MockSource {
    responses: HashMap<String, QueryResult>,
    failing: HashSet<String>,
    down: bool,
    connected: bool,
    persistent: bool,
    version: Option<u32>,
    /// Every query received, in order.
    pub queries: Vec<String>,
    /// Number of successful `connect` calls that opened a connection.
    pub connects: usize,
}

impl MockSource {
    pub fn new() -> Self {
        Self {
            version: Some(160000),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: Option<u32>) -> Self {
        self.version = version;
        self
    }

    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// Sets the result returned for `sql`.
    pub fn respond(&mut self, sql: &str, result: QueryResult) {
        self.failing.remove(sql);
        self.responses.insert(sql.to_string(), result);
    }

    /// Makes `sql` fail with a query error.
    pub fn fail(&mut self, sql: &str) {
        self.failing.insert(sql.to_string());
    }

    /// Simulates an unreachable server.
    pub fn set_down(&mut self, down: bool) {
        self.down = down;
        if down {
            self.connected = false;
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

impl DataSource for MockSource {
    fn connect(&mut self) -> Result<(), SourceError> {
        if self.down {
            return Err(SourceError::Connection("connection refused".to_string()));
        }
        if !self.connected {
            self.connected = true;
            self.connects += 1;
        }
        Ok(())
    }

    fn query(&mut self, sql: &str) -> Result<QueryResult, SourceError> {
        self.connect()?;
        self.queries.push(sql.to_string());
        if self.failing.contains(sql) {
            return Err(SourceError::Query {
                code: Some("42P01".to_string()),
                message: "ERROR: relation does not exist".to_string(),
            });
        }
        self.responses
            .get(sql)
            .cloned()
            .ok_or_else(|| SourceError::Query {
                code: None,
                message: format!("no scripted result for: {}", sql),
            })
    }

    fn disconnect(&mut self) {
        if !self.persistent {
            self.connected = false;
        }
    }

    fn server_version_num(&mut self) -> Option<u32> {
        if self.down { None } else { self.version }
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            server: "PostgreSQL 16.0".to_string(),
            user: "postgres".to_string(),
            host: "localhost".to_string(),
            port: "5432".to_string(),
            database: "postgres".to_string(),
        }
    }
}
