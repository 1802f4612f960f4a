//! Ordered set of installed views.

use tracing::debug;

use super::table::TableView;
use super::{Requirement, View, ViewDef};
use crate::collector::{DataSource, SourceError};

/// View lookup failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// No installed view starts with the given name.
    Unknown(String),
    /// Several installed views start with the given name.
    Ambiguous(String),
}

impl std::fmt::Display for ViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewError::Unknown(name) => write!(f, "unknown view: {}", name),
            ViewError::Ambiguous(name) => write!(f, "ambiguous view: {}", name),
        }
    }
}

impl std::error::Error for ViewError {}

/// SQLSTATEs of a query naming a table, column or function the server
/// does not have.
const MISSING_OBJECT: &[&str] = &["42P01", "42703", "42883"];

#[derive(Default)]
pub struct ViewRegistry {
    views: Vec<Box<dyn View>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs every view of `catalog` the server can serve, in order.
    ///
    /// Requirements are checked once. A view is left out when its minimum
    /// version is not met, when its extension is missing, or when the
    /// server rejects its query for naming objects it does not have.
    /// Without a reachable server only requirement-free views are kept.
    pub fn install(
        catalog: &[&'static ViewDef],
        source: &mut dyn DataSource,
        evict_stale: bool,
    ) -> Self {
        let version = source.server_version_num();
        let mut registry = Self::new();
        for def in catalog {
            if !requirement_met(&def.requires, version, source) {
                debug!(view = def.name, "view unavailable on this server");
                continue;
            }
            if version.is_some() && !query_fits(def.query.text(version), source) {
                debug!(view = def.name, "view query does not match this server");
                continue;
            }
            let mut view = TableView::new(def).with_eviction(evict_stale);
            view.set_server_version(version);
            registry.push(Box::new(view));
        }
        source.disconnect();
        debug!(installed = registry.len(), version = ?version, "views installed");
        registry
    }

    pub fn push(&mut self, view: Box<dyn View>) {
        self.views.push(view);
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&dyn View> {
        self.views.get(idx).map(|v| v.as_ref())
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut (dyn View + 'static)> {
        self.views.get_mut(idx).map(|v| v.as_mut())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.views.iter().map(|v| v.name())
    }

    /// Finds a view by name prefix. An exact name always wins.
    pub fn find(&self, prefix: &str) -> Result<usize, ViewError> {
        if prefix.is_empty() {
            return Err(ViewError::Unknown(prefix.to_string()));
        }
        if let Some(idx) = self.views.iter().position(|v| v.name() == prefix) {
            return Ok(idx);
        }
        let mut matches = self
            .views
            .iter()
            .enumerate()
            .filter(|(_, v)| v.name().starts_with(prefix))
            .map(|(i, _)| i);
        match (matches.next(), matches.next()) {
            (Some(idx), None) => Ok(idx),
            (Some(_), Some(_)) => Err(ViewError::Ambiguous(prefix.to_string())),
            (None, _) => Err(ViewError::Unknown(prefix.to_string())),
        }
    }

    /// Next view after `current` bound to `hotkey`, wrapping around.
    pub fn next_with_hotkey(&self, current: usize, hotkey: char) -> Option<usize> {
        let n = self.views.len();
        (1..=n)
            .map(|step| (current + step) % n)
            .find(|&idx| self.views[idx].hotkey() == hotkey)
    }
}

/// The query wrapped so the server plans it without returning rows.
fn empty_result_query(sql: &str) -> String {
    format!(
        "SELECT * FROM ({}) AS v LIMIT 0",
        sql.trim_end().trim_end_matches(';')
    )
}

/// False only when the server reports a missing table, column or function.
fn query_fits(sql: &str, source: &mut dyn DataSource) -> bool {
    match source.query(&empty_result_query(sql)) {
        Err(SourceError::Query {
            code: Some(code), ..
        }) => !MISSING_OBJECT.contains(&code.as_str()),
        _ => true,
    }
}

fn requirement_met(req: &Requirement, version: Option<u32>, source: &mut dyn DataSource) -> bool {
    if req.is_none() {
        return true;
    }
    if let Some(min) = req.min_version {
        match version {
            Some(v) if v >= min => {}
            _ => return false,
        }
    }
    if let Some(extension) = req.extension {
        let sql = format!(
            "SELECT 1 FROM pg_extension WHERE extname = '{}'",
            extension.replace('\'', "''")
        );
        match source.query(&sql) {
            Ok(result) if !result.is_empty() => {}
            Ok(_) => return false,
            Err(e) => {
                debug!(extension, error = %e, "extension lookup failed");
                return false;
            }
        }
    }
    true
}
