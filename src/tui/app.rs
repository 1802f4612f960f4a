//! Engine loop: interactive full-screen display and batch text output.

use std::io::{self, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use super::event::{Event, EventHandler, TICK_RATE};
use super::header::{header_line, row_range};
use super::input::{KeyAction, handle_key};
use super::session::{HEADER_ROWS, Session};
use crate::collector::DataSource;
use crate::fmt;

/// Line of the column titles on screen.
const TITLE_ROW: usize = HEADER_ROWS - 1;

pub struct App {
    source: Box<dyn DataSource>,
    session: Session,
    /// Cycles to run before exiting, 0 for no limit.
    count: usize,
    /// Batch mode: leave out the first snapshot.
    skip_first: bool,
}

impl App {
    pub fn new(source: Box<dyn DataSource>, session: Session, count: usize) -> Self {
        Self {
            source,
            session,
            count,
            skip_first: false,
        }
    }

    /// Prints only the snapshots after the first, whose deltas span a full
    /// interval.
    pub fn skip_first(mut self, skip: bool) -> Self {
        self.skip_first = skip;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    fn cycle(&mut self) {
        self.session.refresh(self.source.as_mut());
    }

    fn done(&self) -> bool {
        self.count > 0 && self.session.cycles >= self.count
    }

    fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.session.interval).unwrap_or(Duration::MAX)
    }

    fn next_deadline(&self) -> Option<Instant> {
        Instant::now().checked_add(self.interval())
    }

    pub fn header(&self) -> String {
        let s = &self.session;
        let range = row_range(s.dispstart, s.page(), s.row_count());
        let line = header_line(&s.clock, range, s.paused, &self.source.info());
        fmt::truncate(&line, s.width)
    }

    /// Full interactive screen: header, status line, blank, titles, body.
    pub fn screen(&self) -> Vec<String> {
        let s = &self.session;
        let ctx = s.render_context();
        let mut lines = Vec::with_capacity(HEADER_ROWS + ctx.maxprint);
        lines.push(self.header());
        let status = match (&s.prompt, &s.message) {
            (Some(prompt), _) => prompt.line(),
            (None, Some(message)) => message.clone(),
            (None, None) => String::new(),
        };
        lines.push(fmt::truncate(&status, s.width));
        lines.push(String::new());
        match s.view() {
            Some(view) => {
                lines.push(view.title_line(&ctx));
                lines.extend(view.print(&ctx));
            }
            None => lines.push("No views available".to_string()),
        }
        lines
    }

    /// One batch snapshot: a blank-line separated header, titles and the
    /// rows of the window, without padding.
    pub fn snapshot(&self) -> String {
        let s = &self.session;
        let mut ctx = s.render_context();
        let mut out = format!("\n\n{}\n", self.header());
        if let Some(view) = s.view() {
            ctx.maxprint = ctx.maxprint.min(view.row_count());
            out.push_str(&view.title_line(&ctx));
            out.push('\n');
            for line in view.print(&ctx) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }

    /// Batch mode. Runs until the cycle count is reached or `stop` is set.
    pub fn run_batch<W: Write>(mut self, out: &mut W, stop: &AtomicBool) -> io::Result<()> {
        self.session.dispstart = 0;
        loop {
            if stop.load(Ordering::SeqCst) {
                break;
            }
            self.cycle();
            if !(self.skip_first && self.session.cycles == 1) {
                out.write_all(self.snapshot().as_bytes())?;
                out.flush()?;
            }
            if self.done() || !self.sleep(stop) {
                break;
            }
        }
        Ok(())
    }

    /// Sleeps one interval in tick-sized slices. Returns false when stopped.
    fn sleep(&self, stop: &AtomicBool) -> bool {
        let deadline = self.next_deadline();
        loop {
            if stop.load(Ordering::SeqCst) {
                return false;
            }
            let left = match deadline {
                Some(t) => t.saturating_duration_since(Instant::now()),
                None => TICK_RATE,
            };
            if left.is_zero() {
                return true;
            }
            thread::sleep(left.min(TICK_RATE));
        }
    }

    /// Timer step. Once `next` has passed, samples unless paused and sets
    /// the following deadline.
    fn on_tick(&mut self, now: Instant, next: &mut Option<Instant>) {
        if !next.is_some_and(|t| now >= t) {
            return;
        }
        if !self.session.paused {
            self.cycle();
        }
        *next = self.next_deadline();
    }

    /// Runs the interactive display.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
        let events = EventHandler::new(TICK_RATE);

        let size = terminal.size()?;
        self.session.resize(size.width as usize, size.height as usize);

        self.cycle();
        let mut next_refresh = self.next_deadline();

        loop {
            let lines = self.screen();
            terminal.draw(|frame| draw(frame, &lines))?;

            if self.done() {
                break;
            }

            match events.next() {
                Ok(Event::Tick) => self.on_tick(Instant::now(), &mut next_refresh),
                Ok(Event::Key(key)) => match handle_key(&mut self.session, key) {
                    KeyAction::Quit => break,
                    KeyAction::Refresh => {
                        self.cycle();
                        next_refresh = self.next_deadline();
                    }
                    KeyAction::Redraw => terminal.clear()?,
                    KeyAction::None => {}
                },
                Ok(Event::Resize(width, height)) => {
                    self.session.resize(width as usize, height as usize);
                }
                Err(_) => break,
            }
        }
        Ok(())
    }
}

fn draw(frame: &mut Frame, lines: &[String]) {
    let text: Vec<Line> = lines
        .iter()
        .enumerate()
        .map(|(i, l)| {
            if i == TITLE_ROW {
                Line::styled(l.as_str(), Style::default().add_modifier(Modifier::BOLD))
            } else {
                Line::raw(l.as_str())
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(text), frame.area());
}
