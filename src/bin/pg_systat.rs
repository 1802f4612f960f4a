//! pg_systat - PostgreSQL statistics in a top-like display.
//!
//! Usage:
//!   pg_systat                 # dbxact, refreshed every 5 seconds
//!   pg_systat tablescan 2     # table scans every 2 seconds
//!   pg_systat -b -C 3 dbblk   # three text snapshots on stdout
//!   pg_systat -B index        # one snapshot with real deltas

use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use tikv_jemallocator::Jemalloc;
use tracing::{debug, warn};

use pgsystat::collector::{DataSource, PostgresSource};
use pgsystat::config::{self, Args, Config, DEFAULT_WIDTH};
use pgsystat::logging;
use pgsystat::tui::{App, Session};
use pgsystat::view::ViewRegistry;
use pgsystat::views::CATALOG;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn main() {
    let args = Args::parse();
    let tty = io::stdout().is_terminal();
    let os_user = std::env::var("USER").ok();

    let mut config = match Config::resolve(args, os_user, tty) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init(config.log_file.as_deref(), config.raw) {
        eprintln!("Error: cannot open log file: {}", e);
        std::process::exit(1);
    }

    if config.password_prompt {
        match config::prompt_password("Password: ") {
            Ok(password) => config.connect.password = Some(password),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    if let Err(e) = run(config, tty) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: Config, tty: bool) -> io::Result<()> {
    let mut source = PostgresSource::new(config.connect.clone(), config.persistent);
    if let Err(e) = source.connect() {
        warn!(error = %e, "server unreachable at startup");
    }
    let views = ViewRegistry::install(CATALOG, &mut source, config.evict_stale);
    debug!(views = views.len(), "starting");

    let mut session = Session::new(views, config.delay);
    if let Some(name) = config.view.as_deref() {
        if session.switch_view(name).is_err() {
            eprintln!("Unknown/ambiguous view name: {}", name);
            std::process::exit(1);
        }
    }

    if config.raw {
        let term = if tty { crossterm::terminal::size().ok() } else { None };
        match term {
            // one screenful on a terminal unless every row was asked for
            Some((w, h)) if !config.all_lines => session.resize(w as usize, h as usize),
            _ => session.maxprint = None,
        }
        session.width = config
            .width
            .or(term.map(|(w, _)| w as usize))
            .unwrap_or(DEFAULT_WIDTH);

        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
            warn!("Failed to set Ctrl-C handler: {}", e);
        }

        let app = App::new(Box::new(source), session, config.count).skip_first(config.skip_first);
        let stdout = io::stdout();
        let mut out = stdout.lock();
        return app.run_batch(&mut out, &stop);
    }

    App::new(Box::new(source), session, config.count).run()
}
