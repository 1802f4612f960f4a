//! Session state for the engine loop.
//!
//! Everything the loop mutates lives here: the installed views, the active
//! view and its order, the scroll window, the refresh interval, the pause
//! flag and the single-slot status message.

use chrono::Local;
use tracing::{info, warn};

use crate::collector::DataSource;
use crate::view::{Direction, RenderContext, View, ViewError, ViewRegistry};

/// Screen rows above the view body: header, message, blank, column titles.
pub const HEADER_ROWS: usize = 4;

/// Refresh interval used when none (or a non-positive one) is given.
pub const DEFAULT_DELAY: f64 = 5.0;

/// Kind of an open input prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Number of body rows.
    Count,
    /// Refresh interval in seconds.
    Delay,
    /// Free-form command line.
    Command,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::Count => "Number of lines to display",
            PromptKind::Delay => "Seconds to delay",
            PromptKind::Command => "Command",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

impl Prompt {
    pub fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            input: String::new(),
        }
    }

    /// Prompt line as shown on screen.
    pub fn line(&self) -> String {
        format!("{}: {}", self.kind.label(), self.input)
    }
}

pub struct Session {
    views: ViewRegistry,
    current: usize,
    /// Selected order per installed view.
    orders: Vec<usize>,
    pub direction: Direction,
    pub dispstart: usize,
    /// Body rows; `None` shows every row.
    pub maxprint: Option<usize>,
    /// Terminal height in rows.
    pub lines: usize,
    pub width: usize,
    /// Refresh interval in seconds, always positive.
    pub interval: f64,
    pub paused: bool,
    pub thousands: bool,
    /// Latest status message; a new one replaces the old.
    pub message: Option<String>,
    pub prompt: Option<Prompt>,
    /// Header clock, frozen while paused.
    pub clock: String,
    /// Completed sample cycles.
    pub cycles: usize,
}

impl Session {
    pub fn new(views: ViewRegistry, interval: f64) -> Self {
        let orders = vec![0; views.len()];
        Self {
            views,
            current: 0,
            orders,
            direction: Direction::Natural,
            dispstart: 0,
            maxprint: None,
            lines: 24,
            width: 80,
            interval: if interval > 0.0 { interval } else { DEFAULT_DELAY },
            paused: false,
            thousands: false,
            message: None,
            prompt: None,
            clock: String::new(),
            cycles: 0,
        }
    }

    pub fn views(&self) -> &ViewRegistry {
        &self.views
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn view(&self) -> Option<&dyn View> {
        self.views.get(self.current)
    }

    /// Index of the selected order of the active view.
    pub fn order(&self) -> usize {
        self.orders.get(self.current).copied().unwrap_or(0)
    }

    /// Rows the active view produced on its last sample.
    pub fn row_count(&self) -> usize {
        self.view().map(|v| v.row_count()).unwrap_or(0)
    }

    /// Largest body the terminal can hold.
    pub fn screen_rows(&self) -> usize {
        self.lines.saturating_sub(HEADER_ROWS).max(1)
    }

    /// Effective body height.
    pub fn page(&self) -> usize {
        match self.maxprint {
            Some(n) => n,
            None => self.row_count(),
        }
    }

    pub fn render_context(&self) -> RenderContext {
        RenderContext {
            interval_secs: self.interval,
            thousands: self.thousands,
            width: self.width,
            dispstart: self.dispstart,
            maxprint: self.page(),
        }
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Applies a new terminal size, shrinking the body to fit.
    pub fn resize(&mut self, width: usize, lines: usize) {
        self.width = width;
        self.lines = lines;
        let max = self.screen_rows();
        self.maxprint = Some(self.maxprint.map_or(max, |n| n.min(max)));
        self.clamp_scroll();
    }

    /// Sets the body height from prompt input. Anything outside
    /// `1..=screen_rows` selects the whole screen.
    pub fn set_count(&mut self, requested: Option<usize>) {
        let max = self.screen_rows();
        self.maxprint = Some(match requested {
            Some(n) if (1..=max).contains(&n) => n,
            _ => max,
        });
        self.clamp_scroll();
    }

    /// Accepts only positive delays. Returns whether it was applied.
    pub fn set_delay(&mut self, seconds: f64) -> bool {
        if seconds > 0.0 && seconds.is_finite() {
            self.interval = seconds;
            true
        } else {
            false
        }
    }

    pub fn set_view(&mut self, idx: usize) {
        if idx >= self.views.len() {
            return;
        }
        if idx != self.current {
            if let Some(view) = self.views.get(idx) {
                info!(view = view.name(), "switched view");
            }
        }
        self.current = idx;
        self.dispstart = 0;
    }

    /// Switches by name prefix; the active view is kept on error.
    pub fn switch_view(&mut self, prefix: &str) -> Result<(), ViewError> {
        let idx = self.views.find(prefix)?;
        self.set_view(idx);
        Ok(())
    }

    pub fn next_view(&mut self) {
        let n = self.views.len();
        if n > 0 {
            self.set_view((self.current + 1) % n);
        }
    }

    pub fn prev_view(&mut self) {
        let n = self.views.len();
        if n > 0 {
            self.set_view((self.current + n - 1) % n);
        }
    }

    /// Cycles through the views bound to `hotkey`. Returns false when none is.
    pub fn view_hotkey(&mut self, hotkey: char) -> bool {
        match self.views.next_with_hotkey(self.current, hotkey) {
            Some(idx) => {
                self.set_view(idx);
                true
            }
            None => false,
        }
    }

    /// Selects an order of the active view. Selecting the current one again
    /// flips the direction, a new one starts in its natural direction.
    pub fn select_order(&mut self, idx: usize) {
        let Some(slot) = self.orders.get_mut(self.current) else {
            return;
        };
        if *slot == idx {
            self.direction = self.direction.flip();
        } else {
            *slot = idx;
            self.direction = Direction::Natural;
        }
        self.resort();
    }

    /// Selects the order bound to `hotkey`. Returns false when none is.
    pub fn order_hotkey(&mut self, hotkey: char) -> bool {
        let found = self
            .view()
            .and_then(|v| v.orders().iter().position(|o| o.hotkey == hotkey));
        match found {
            Some(idx) => {
                self.select_order(idx);
                true
            }
            None => false,
        }
    }

    /// Selects an order by name or label, case-insensitively.
    pub fn order_by_name(&mut self, name: &str) -> bool {
        let found = self.view().and_then(|v| {
            v.orders().iter().position(|o| {
                o.name.eq_ignore_ascii_case(name) || o.label.eq_ignore_ascii_case(name)
            })
        });
        match found {
            Some(idx) => {
                self.select_order(idx);
                true
            }
            None => false,
        }
    }

    pub fn next_order(&mut self) {
        let n = self.view().map(|v| v.orders().len()).unwrap_or(0);
        if n > 0 {
            self.select_order((self.order() + 1) % n);
        }
    }

    pub fn reverse(&mut self) {
        self.direction = self.direction.flip();
        self.resort();
    }

    /// Re-sorts the active view without sampling.
    pub fn resort(&mut self) {
        let order = self.order();
        let direction = self.direction;
        let ctx = self.render_context();
        if let Some(view) = self.views.get_mut(self.current) {
            if !view.orders().is_empty() {
                view.sort(order, direction, &ctx);
            }
        }
    }

    /// Runs one sample, sort cycle on the active view.
    ///
    /// A failed sample keeps the previous rows and sets the status message.
    pub fn refresh(&mut self, source: &mut dyn DataSource) {
        if !self.paused {
            self.clock = Local::now().format("%H:%M:%S").to_string();
        }
        let Some(view) = self.views.get_mut(self.current) else {
            return;
        };
        if let Err(e) = view.sample(source) {
            warn!(view = view.name(), error = %e, "sample failed");
            self.message = Some(e.to_string());
        }
        source.disconnect();
        self.cycles += 1;
        self.clamp_scroll();
        self.resort();
    }

    // ------------------------------------------------------------------
    // Scrolling
    // ------------------------------------------------------------------

    fn max_start(&self) -> usize {
        self.row_count().saturating_sub(self.page())
    }

    fn clamp_scroll(&mut self) {
        self.dispstart = self.dispstart.min(self.max_start());
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.dispstart = self.dispstart.saturating_add(rows).min(self.max_start());
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.dispstart = self.dispstart.saturating_sub(rows);
    }

    pub fn scroll_home(&mut self) {
        self.dispstart = 0;
    }

    pub fn scroll_end(&mut self) {
        self.dispstart = self.max_start();
    }

    // ------------------------------------------------------------------
    // Status line texts
    // ------------------------------------------------------------------

    /// Installed views with the active one in brackets.
    pub fn help_text(&self) -> String {
        let current = self.view().map(|v| v.name().to_string());
        self.views
            .names()
            .map(|name| {
                if Some(name) == current.as_deref() {
                    format!("[{}]", name)
                } else {
                    name.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Orders of the active view with hotkeys; `^` marks a reversed order.
    pub fn order_text(&self) -> String {
        let Some(view) = self.view() else {
            return "No orders available".to_string();
        };
        if view.orders().is_empty() {
            return "No orders available".to_string();
        }
        let current = self.order();
        view.orders()
            .iter()
            .enumerate()
            .map(|(i, o)| {
                if i == current {
                    let reversed = o.key.is_some() && self.direction == Direction::Reversed;
                    format!("[{}{}({})]", o.name, if reversed { "^" } else { "" }, o.hotkey)
                } else {
                    format!("{}({})", o.name, o.hotkey)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Active view name and refresh interval.
    pub fn view_text(&self) -> String {
        let name = self.view().map(|v| v.name()).unwrap_or("");
        format!("{} {}", name, self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockSource, database_rows};
    use crate::view::TableView;
    use crate::views::database::{DBBLK, DBXACT};
    use crate::views::index::INDEX;

    fn session() -> Session {
        let mut views = ViewRegistry::new();
        views.push(Box::new(TableView::new(&DBXACT)));
        views.push(Box::new(TableView::new(&DBBLK)));
        views.push(Box::new(TableView::new(&INDEX)));
        let mut s = Session::new(views, 5.0);
        s.resize(80, 24);
        s
    }

    fn sampled(rows: usize) -> (Session, MockSource) {
        let data: Vec<(i64, String)> = (0..rows as i64)
            .map(|i| (i, format!("db{:02}", i)))
            .collect();
        let rows: Vec<_> = data
            .iter()
            .map(|(i, n)| (*i, n.as_str(), 1, *i * 10, 0, 0))
            .collect();
        let mut source = MockSource::new();
        source.respond(DBXACT.query.text(None), database_rows(&rows));
        let mut s = session();
        s.refresh(&mut source);
        (s, source)
    }

    #[test]
    fn initial_state() {
        let s = session();
        assert_eq!(s.current(), 0);
        assert_eq!(s.order(), 0);
        assert_eq!(s.direction, Direction::Natural);
        assert_eq!(s.maxprint, Some(20));
        assert!(!s.paused);
    }

    #[test]
    fn non_positive_interval_falls_back() {
        let s = Session::new(ViewRegistry::new(), 0.0);
        assert_eq!(s.interval, DEFAULT_DELAY);
        let s = Session::new(ViewRegistry::new(), -2.0);
        assert_eq!(s.interval, DEFAULT_DELAY);
    }

    #[test]
    fn delay_rejects_non_positive() {
        let mut s = session();
        assert!(s.set_delay(2.5));
        assert!(!s.set_delay(0.0));
        assert!(!s.set_delay(-1.0));
        assert_eq!(s.interval, 2.5);
    }

    #[test]
    fn count_is_clamped_to_screen() {
        let mut s = session();
        s.set_count(Some(5));
        assert_eq!(s.maxprint, Some(5));
        s.set_count(Some(0));
        assert_eq!(s.maxprint, Some(20));
        s.set_count(Some(500));
        assert_eq!(s.maxprint, Some(20));
        s.set_count(None);
        assert_eq!(s.maxprint, Some(20));
    }

    #[test]
    fn same_order_twice_flips_direction() {
        let mut s = session();
        s.select_order(1);
        assert_eq!(s.direction, Direction::Natural);
        s.select_order(1);
        assert_eq!(s.direction, Direction::Reversed);
        s.select_order(2);
        assert_eq!(s.order(), 2);
        assert_eq!(s.direction, Direction::Natural);
    }

    #[test]
    fn orders_are_kept_per_view() {
        let mut s = session();
        s.select_order(2);
        s.next_view();
        assert_eq!(s.order(), 0);
        s.prev_view();
        assert_eq!(s.order(), 2);
    }

    #[test]
    fn prefix_switch_resets_scroll() {
        let (mut s, _) = sampled(40);
        s.scroll_down(5);
        assert_eq!(s.dispstart, 5);
        s.switch_view("dbb").unwrap();
        assert_eq!(s.current(), 1);
        assert_eq!(s.dispstart, 0);
    }

    #[test]
    fn bad_prefix_keeps_view() {
        let mut s = session();
        s.set_view(2);
        assert_eq!(s.switch_view("db"), Err(ViewError::Ambiguous("db".to_string())));
        assert_eq!(s.switch_view("zzz"), Err(ViewError::Unknown("zzz".to_string())));
        assert_eq!(s.current(), 2);
    }

    #[test]
    fn scrolling_stays_in_range() {
        let (mut s, _) = sampled(30);
        s.scroll_down(100);
        assert_eq!(s.dispstart, 10);
        s.scroll_up(3);
        assert_eq!(s.dispstart, 7);
        s.scroll_home();
        assert_eq!(s.dispstart, 0);
        s.scroll_end();
        assert_eq!(s.dispstart, 10);
    }

    #[test]
    fn failed_sample_sets_message_keeps_rows() {
        let (mut s, mut source) = sampled(3);
        let ctx = s.render_context();
        let before = s.view().map(|v| v.print(&ctx));
        source.set_down(true);
        s.refresh(&mut source);
        assert_eq!(s.message.as_deref(), Some("Cannot connect to database: connection refused"));
        assert_eq!(s.view().map(|v| v.print(&ctx)), before);
        assert_eq!(s.cycles, 2);
    }

    #[test]
    fn transient_source_is_released_after_refresh() {
        let (_, source) = sampled(2);
        assert!(!source.is_connected());
    }

    #[test]
    fn status_texts() {
        let mut s = session();
        assert_eq!(s.help_text(), "[dbxact] dbblk index");
        assert!(s.order_text().starts_with("[datname(n)] "));
        s.select_order(0);
        assert!(s.order_text().starts_with("[datname^(n)] "));
        assert_eq!(s.view_text(), "dbxact 5");
    }

    #[test]
    fn hotkeys() {
        let mut s = session();
        assert!(s.view_hotkey('U'));
        assert_eq!(s.current(), 2);
        assert!(!s.view_hotkey('Z'));
        assert!(s.order_by_name("IDX_SCAN"));
        assert!(!s.order_hotkey('#'));
    }
}
