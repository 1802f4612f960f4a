//! PostgreSQL data source.
//!
//! Every statistics query goes through `simple_query`, so cells arrive as
//! text exactly as `psql` would print them and no per-view row decoding
//! is needed on this side.
//!
//! ## Connection lifetime
//!
//! - Transient (default): the connection is opened at the start of a
//!   refresh cycle and dropped by `disconnect()` at its end.
//! - Persistent: the connection survives across cycles. A closed client is
//!   detected on the next call and re-established.
//!
//! Each fresh connection switches the session to READ UNCOMMITTED and
//! records the server version for the header line and view probing.

use postgres::{Client, NoTls, SimpleQueryMessage};
use tracing::debug;

use super::{DataSource, QueryResult, SourceError, SourceInfo};

const READ_UNCOMMITTED: &str =
    "SET SESSION CHARACTERISTICS AS TRANSACTION ISOLATION LEVEL READ UNCOMMITTED";

/// TLS negotiation mode, the subset of libpq `sslmode` values we support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    #[default]
    Disable,
    /// Encrypt, without certificate verification (libpq `require`).
    Require,
}

impl std::str::FromStr for SslMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disable" | "allow" | "prefer" => Ok(SslMode::Disable),
            "require" => Ok(SslMode::Require),
            other => Err(format!("unsupported sslmode '{}'", other)),
        }
    }
}

/// Connection parameters, resolved from command line and `PG*` variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectParams {
    pub host: String,
    pub port: String,
    pub user: String,
    pub password: Option<String>,
    pub dbname: String,
    pub sslmode: SslMode,
}

/// PostgreSQL-backed `DataSource`.
pub struct PostgresSource {
    params: ConnectParams,
    connection_string: String,
    persistent: bool,
    client: Option<Client>,
    server_version_num: Option<u32>,
    server_label: String,
}

impl PostgresSource {
    pub fn new(params: ConnectParams, persistent: bool) -> Self {
        let connection_string = build_connection_string(&params);
        Self {
            params,
            connection_string,
            persistent,
            client: None,
            server_version_num: None,
            server_label: String::new(),
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    fn open_client(&self) -> Result<Client, SourceError> {
        let result = match self.params.sslmode {
            SslMode::Disable => Client::connect(&self.connection_string, NoTls),
            SslMode::Require => {
                let connector = native_tls::TlsConnector::builder()
                    .danger_accept_invalid_certs(true)
                    .danger_accept_invalid_hostnames(true)
                    .build()
                    .map_err(|e| SourceError::Connection(format!("TLS setup failed: {}", e)))?;
                Client::connect(
                    &self.connection_string,
                    postgres_native_tls::MakeTlsConnector::new(connector),
                )
            }
        };
        result.map_err(|e| SourceError::Connection(format_postgres_error(&e)))
    }

    /// Reads server version information on a freshly opened client.
    fn describe_server(&mut self, client: &mut Client) {
        if let Ok(result) = run_simple_query(client, "SHOW server_version_num") {
            self.server_version_num = result.cell(0, 0).and_then(|v| v.trim().parse().ok());
        }
        if let Ok(result) = run_simple_query(client, "SELECT version()") {
            self.server_label = result
                .cell(0, 0)
                .map(server_label_from_version)
                .unwrap_or_default();
        }
    }
}

impl DataSource for PostgresSource {
    fn connect(&mut self) -> Result<(), SourceError> {
        if let Some(client) = &self.client {
            if !client.is_closed() {
                return Ok(());
            }
            debug!("connection closed by server, reconnecting");
            self.client = None;
        }

        let mut client = self.open_client()?;
        if let Err(e) = client.simple_query(READ_UNCOMMITTED) {
            debug!(error = %format_postgres_error(&e), "isolation level not set");
        }
        self.describe_server(&mut client);
        debug!(
            host = %self.params.host,
            port = %self.params.port,
            version = ?self.server_version_num,
            "connected"
        );
        self.client = Some(client);
        Ok(())
    }

    fn query(&mut self, sql: &str) -> Result<QueryResult, SourceError> {
        self.connect()?;
        let client = self
            .client
            .as_mut()
            .ok_or_else(|| SourceError::Connection("not connected".to_string()))?;
        run_simple_query(client, sql).map_err(|e| SourceError::Query {
            code: e.code().map(|c| c.code().to_string()),
            message: format_postgres_error(&e),
        })
    }

    fn disconnect(&mut self) {
        if !self.persistent {
            self.client = None;
        }
    }

    fn server_version_num(&mut self) -> Option<u32> {
        if self.server_version_num.is_none() && self.connect().is_ok() {
            self.disconnect();
        }
        self.server_version_num
    }

    fn info(&self) -> SourceInfo {
        SourceInfo {
            server: self.server_label.clone(),
            user: self.params.user.clone(),
            host: self.params.host.clone(),
            port: self.params.port.clone(),
            database: self.params.dbname.clone(),
        }
    }
}

fn run_simple_query(client: &mut Client, sql: &str) -> Result<QueryResult, postgres::Error> {
    let messages = client.simple_query(sql)?;
    let mut result = QueryResult::default();
    for message in messages {
        match message {
            SimpleQueryMessage::RowDescription(columns) => {
                result.columns = columns.iter().map(|c| c.name().to_string()).collect();
            }
            SimpleQueryMessage::Row(row) => {
                if result.columns.is_empty() {
                    result.columns = row.columns().iter().map(|c| c.name().to_string()).collect();
                }
                let cells = (0..row.len())
                    .map(|i| row.get(i).map(str::to_string))
                    .collect();
                result.rows.push(cells);
            }
            _ => {}
        }
    }
    Ok(result)
}

/// Builds a libpq `key=value` connection string.
fn build_connection_string(params: &ConnectParams) -> String {
    let mut parts = vec![
        format!("host={}", quote_conninfo_value(&params.host)),
        format!("port={}", quote_conninfo_value(&params.port)),
        format!("user={}", quote_conninfo_value(&params.user)),
    ];
    if let Some(password) = params.password.as_deref().filter(|p| !p.is_empty()) {
        parts.push(format!("password={}", quote_conninfo_value(password)));
    }
    parts.push(format!("dbname={}", quote_conninfo_value(&params.dbname)));
    parts.push("application_name=pg_systat".to_string());
    parts.join(" ")
}

/// Quotes a conninfo value when it is empty or contains spaces, quotes or
/// backslashes.
fn quote_conninfo_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '\'' || c == '\\');
    if !needs_quotes {
        return value.to_string();
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        if c == '\'' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('\'');
    quoted
}

/// First two words of `version()`, e.g. `"PostgreSQL 16.2"`.
fn server_label_from_version(version: &str) -> String {
    version.split_whitespace().take(2).collect::<Vec<_>>().join(" ")
}

/// Formats PostgreSQL error message for display.
pub(crate) fn format_postgres_error(e: &postgres::Error) -> String {
    if let Some(db_error) = e.as_db_error() {
        format!("{}: {}", db_error.severity(), db_error.message())
    } else {
        let msg = e.to_string();
        if msg.contains("Connection refused") {
            "connection refused".to_string()
        } else if msg.contains("password authentication failed") {
            "password authentication failed".to_string()
        } else if msg.contains("does not exist") {
            msg.split("FATAL:")
                .last()
                .unwrap_or(&msg)
                .trim()
                .to_string()
        } else {
            msg
        }
    }
}
