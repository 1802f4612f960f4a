//! Command line and environment configuration.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use crate::collector::SslMode;
use crate::collector::pg_collector::ConnectParams;
use crate::tui::DEFAULT_DELAY;
use crate::view::sampler::parse_float;

/// Width of batch output when stdout is not a terminal.
pub const DEFAULT_WIDTH: usize = 80;

/// PostgreSQL statistics viewer.
#[derive(Parser, Debug)]
#[command(
    name = "pg_systat",
    version,
    about = "PostgreSQL statistics viewer",
    disable_help_flag = true
)]
pub struct Args {
    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Exit after COUNT refresh cycles.
    #[arg(short = 'C', value_name = "COUNT", value_parser = clap::value_parser!(u32).range(1..))]
    pub count: Option<u32>,

    /// Database server host or socket directory.
    #[arg(short = 'h', long, env = "PGHOST", default_value = "localhost")]
    pub host: String,

    /// Database server port.
    #[arg(short = 'p', long, env = "PGPORT", default_value = "5432")]
    pub port: String,

    /// Database user name.
    #[arg(short = 'U', long, env = "PGUSER")]
    pub username: Option<String>,

    /// Database name.
    #[arg(short = 'd', long, env = "PGDATABASE")]
    pub dbname: Option<String>,

    /// Prompt for a password. Implies --persistent.
    #[arg(short = 'W', long = "password")]
    pub password_prompt: bool,

    /// Keep one connection open across refresh cycles.
    #[arg(long)]
    pub persistent: bool,

    /// TLS mode: disable or require.
    #[arg(long, env = "PGSSLMODE", default_value = "disable")]
    pub sslmode: SslMode,

    /// Seconds between refreshes.
    #[arg(short = 's', long, value_name = "SECONDS", allow_negative_numbers = true)]
    pub delay: Option<String>,

    /// Batch output on a terminal: every row instead of one screenful.
    #[arg(short = 'a')]
    pub all_lines: bool,

    /// Batch output of the second and later snapshots only.
    #[arg(short = 'B')]
    pub batch_skip_first: bool,

    /// Batch output: plain text snapshots instead of the full-screen display.
    #[arg(short = 'b')]
    pub batch: bool,

    /// Keep the full-screen display when stdout does not look like a terminal.
    #[arg(short = 'i')]
    pub interactive: bool,

    /// Output width of batch mode.
    #[arg(short = 'w', value_name = "WIDTH", value_parser = clap::value_parser!(u16).range(1..))]
    pub width: Option<u16>,

    /// Drop rows that disappear from the server instead of keeping them.
    #[arg(long)]
    pub evict_stale: bool,

    /// Write diagnostics to this file.
    #[arg(long, env = "PGSYSTAT_LOG", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Initial view and/or refresh delay.
    #[arg(value_name = "VIEW_OR_DELAY", num_args = 0..=2)]
    pub positional: Vec<String>,
}

/// Configuration error.
#[derive(Debug)]
pub enum ConfigError {
    /// Arguments that cannot be interpreted.
    Usage(String),
    /// Reading the password failed.
    Password(io::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Usage(msg) => write!(f, "{}", msg),
            ConfigError::Password(e) => write!(f, "cannot read password: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Resolved run configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub connect: ConnectParams,
    pub persistent: bool,
    pub password_prompt: bool,
    /// Initial view name prefix.
    pub view: Option<String>,
    /// Refresh interval in seconds.
    pub delay: f64,
    /// Cycles to run, 0 for no limit.
    pub count: usize,
    pub raw: bool,
    pub skip_first: bool,
    pub all_lines: bool,
    pub width: Option<usize>,
    pub evict_stale: bool,
    pub log_file: Option<PathBuf>,
}

/// Delay argument; anything not positive means the default.
fn delay_arg(s: &str) -> f64 {
    let v = parse_float(Some(s));
    if v > 0.0 { v } else { DEFAULT_DELAY }
}

impl Config {
    /// Resolves parsed arguments.
    ///
    /// `os_user` is the login name used when no user is given, `tty` tells
    /// whether stdout is a terminal.
    pub fn resolve(args: Args, os_user: Option<String>, tty: bool) -> Result<Self, ConfigError> {
        let mut delay = args.delay.as_deref().map(delay_arg).unwrap_or(DEFAULT_DELAY);
        let view = match args.positional.as_slice() {
            [] => None,
            [one] => {
                let v = parse_float(Some(one));
                if v == 0.0 {
                    Some(one.clone())
                } else {
                    delay = if v > 0.0 { v } else { DEFAULT_DELAY };
                    None
                }
            }
            [name, secs] => {
                delay = delay_arg(secs);
                Some(name.clone())
            }
            more => {
                return Err(ConfigError::Usage(format!(
                    "too many arguments: {}",
                    more.join(" ")
                )));
            }
        };

        let user = args
            .username
            .or(os_user)
            .unwrap_or_else(|| "postgres".to_string());
        let dbname = args.dbname.unwrap_or_else(|| user.clone());

        let mut raw = args.batch || args.batch_skip_first || (!tty && !args.interactive);
        let mut count = args.count.map(|c| c as usize).unwrap_or(0);
        if args.batch_skip_first {
            count = count.max(2);
            raw = true;
        }
        if raw && count == 0 {
            count = 1;
        }

        Ok(Config {
            connect: ConnectParams {
                host: args.host,
                port: args.port,
                user,
                password: std::env::var("PGPASSWORD").ok(),
                dbname,
                sslmode: args.sslmode,
            },
            persistent: args.persistent || args.password_prompt,
            password_prompt: args.password_prompt,
            view,
            delay,
            count,
            raw,
            skip_first: args.batch_skip_first,
            all_lines: args.all_lines,
            width: args.width.map(usize::from),
            evict_stale: args.evict_stale,
            log_file: args.log_file,
        })
    }
}

/// Reads a password from the terminal without echo.
pub fn prompt_password(prompt: &str) -> Result<String, ConfigError> {
    let mut stderr = io::stderr();
    write!(stderr, "{}", prompt).map_err(ConfigError::Password)?;
    stderr.flush().map_err(ConfigError::Password)?;

    terminal::enable_raw_mode().map_err(ConfigError::Password)?;
    let result = read_hidden_line();
    terminal::disable_raw_mode().map_err(ConfigError::Password)?;
    let _ = writeln!(stderr);

    result.map_err(ConfigError::Password)
}

fn read_hidden_line() -> io::Result<String> {
    let mut line = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => return Ok(line),
            KeyCode::Backspace => {
                line.pop();
            }
            KeyCode::Esc => {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled"));
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "cancelled"));
            }
            KeyCode::Char(c) => line.push(c),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(argv: &[&str], tty: bool) -> Config {
        let mut full = vec!["pg_systat"];
        full.extend_from_slice(argv);
        let args = Args::try_parse_from(full).unwrap();
        Config::resolve(args, Some("alice".to_string()), tty).unwrap()
    }

    #[test]
    fn defaults_on_a_terminal() {
        let c = resolve(&["-h", "db1", "-U", "bob"], true);
        assert_eq!(c.connect.host, "db1");
        assert_eq!(c.connect.user, "bob");
        assert_eq!(c.connect.dbname, "bob");
        assert_eq!(c.delay, 5.0);
        assert_eq!(c.count, 0);
        assert!(!c.raw);
        assert!(!c.persistent);
        assert_eq!(c.view, None);
    }

    #[test]
    fn single_positional_is_view_or_delay() {
        assert_eq!(resolve(&["dbblk"], true).view.as_deref(), Some("dbblk"));
        let c = resolve(&["2.5"], true);
        assert_eq!(c.view, None);
        assert_eq!(c.delay, 2.5);
        assert_eq!(resolve(&["0"], true).view.as_deref(), Some("0"));
    }

    #[test]
    fn view_then_delay() {
        let c = resolve(&["tablescan", "10"], true);
        assert_eq!(c.view.as_deref(), Some("tablescan"));
        assert_eq!(c.delay, 10.0);
        assert_eq!(resolve(&["tablescan", "0"], true).delay, 5.0);
    }

    #[test]
    fn non_positive_delay_option_falls_back() {
        assert_eq!(resolve(&["-s", "0"], true).delay, 5.0);
        assert_eq!(resolve(&["-s", "-1"], true).delay, 5.0);
        assert_eq!(resolve(&["-s", "0.5"], true).delay, 0.5);
    }

    #[test]
    fn batch_modes() {
        let c = resolve(&["-b"], true);
        assert!(c.raw);
        assert_eq!(c.count, 1);
        let c = resolve(&["-B"], true);
        assert!(c.raw && c.skip_first);
        assert_eq!(c.count, 2);
        let c = resolve(&["-B", "-C", "5"], true);
        assert_eq!(c.count, 5);
        let c = resolve(&["-C", "3"], true);
        assert!(!c.raw);
        assert_eq!(c.count, 3);
    }

    #[test]
    fn no_terminal_forces_batch() {
        assert!(resolve(&[], false).raw);
        assert!(!resolve(&["-i"], false).raw);
        assert!(resolve(&["-i", "-b"], false).raw);
    }

    #[test]
    fn password_prompt_implies_persistent() {
        let c = resolve(&["-W"], true);
        assert!(c.password_prompt && c.persistent);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Args::try_parse_from(["pg_systat", "-C", "0"]).is_err());
        assert!(Args::try_parse_from(["pg_systat", "-w", "0"]).is_err());
        assert!(Args::try_parse_from(["pg_systat", "--sslmode", "verify-full"]).is_err());
        assert!(Args::try_parse_from(["pg_systat", "a", "1", "b"]).is_err());
    }

    #[test]
    fn sslmode_and_width() {
        let c = resolve(&["--sslmode", "require", "-w", "132"], true);
        assert_eq!(c.connect.sslmode, SslMode::Require);
        assert_eq!(c.width, Some(132));
    }

    #[test]
    fn user_falls_back_to_os_user() {
        if std::env::var("PGUSER").is_ok() || std::env::var("PGDATABASE").is_ok() {
            return;
        }
        let c = resolve(&[], true);
        assert_eq!(c.connect.user, "alice");
        assert_eq!(c.connect.dbname, "alice");
        let args = Args::try_parse_from(["pg_systat"]).unwrap();
        let c = Config::resolve(args, None, true).unwrap();
        assert_eq!(c.connect.user, "postgres");
    }
}
