//! The generic [`View`] implementation.

use tracing::debug;

use super::record::RecordStore;
use super::render::{self, RenderContext};
use super::sort::{self, Direction};
use super::{OrderDef, Requirement, View, ViewDef, sampler};
use crate::collector::{DataSource, SourceError};

/// A view driven entirely by its [`ViewDef`].
pub struct TableView {
    def: &'static ViewDef,
    store: RecordStore,
    server_version: Option<u32>,
    evict_stale: bool,
}

impl TableView {
    pub fn new(def: &'static ViewDef) -> Self {
        Self {
            def,
            store: RecordStore::new(),
            server_version: None,
            evict_stale: false,
        }
    }

    /// Drops records that vanish from the source instead of keeping them.
    pub fn with_eviction(mut self, evict_stale: bool) -> Self {
        self.evict_stale = evict_stale;
        self
    }

    pub fn def(&self) -> &'static ViewDef {
        self.def
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }
}

impl View for TableView {
    fn name(&self) -> &str {
        self.def.name
    }

    fn hotkey(&self) -> char {
        self.def.hotkey
    }

    fn requires(&self) -> Requirement {
        self.def.requires
    }

    fn orders(&self) -> &[OrderDef] {
        self.def.orders
    }

    fn sample(&mut self, source: &mut dyn DataSource) -> Result<usize, SourceError> {
        let sql = self.def.query.text(self.server_version);
        let result = source.query(sql)?;
        let rows = sampler::merge(&mut self.store, self.def, &result, self.evict_stale);
        debug!(view = self.def.name, rows, "sampled");
        Ok(rows)
    }

    fn sort(&mut self, order: usize, direction: Direction, ctx: &RenderContext) {
        let Some(key) = self.def.orders.get(order).and_then(|o| o.key.as_ref()) else {
            return;
        };
        if self.store.is_empty() {
            return;
        }
        let fallback = self.def.fallback;
        self.store.sort_by(|a, b| sort::compare(a, b, Some(key), fallback, direction, ctx));
    }

    fn row_count(&self) -> usize {
        self.store.len()
    }

    fn title_line(&self, ctx: &RenderContext) -> String {
        let widths = render::layout(self.def.columns, ctx.width);
        render::title_line(self.def.columns, &widths, ctx.width)
    }

    fn print(&self, ctx: &RenderContext) -> Vec<String> {
        render::print_window(&self.store, self.def.columns, ctx)
    }

    fn set_server_version(&mut self, version: Option<u32>) {
        self.server_version = version;
    }
}
