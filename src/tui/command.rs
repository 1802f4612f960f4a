//! Prompt input parsing and execution.

use super::input::KeyAction;
use super::session::{Prompt, PromptKind, Session};
use crate::view::sampler::parse_float;

/// A parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Quit,
    /// Pause refreshing.
    Stop,
    /// Resume refreshing, with a new delay when the argument is positive.
    Start(f64),
    /// Show the order list, or select an order by name or label.
    Order(Option<String>),
    Delay(f64),
    /// Switch to the view matching this name prefix.
    View(String),
}

const NUMERIC: &str = "0123456789+-.eE";

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    if input.eq_ignore_ascii_case("help") {
        return Command::Help;
    }
    if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("q") {
        return Command::Quit;
    }
    if input.eq_ignore_ascii_case("stop") {
        return Command::Stop;
    }
    if let Some(rest) = strip_prefix_ignore_case(input, "start") {
        return Command::Start(parse_float(Some(rest)));
    }
    if let Some(rest) = strip_prefix_ignore_case(input, "order") {
        let rest = rest.trim();
        return Command::Order((!rest.is_empty()).then(|| rest.to_string()));
    }
    if input.chars().all(|c| NUMERIC.contains(c)) {
        Command::Delay(parse_float(Some(input)))
    } else {
        Command::View(input.to_string())
    }
}

/// Requested row count, `None` when the input is not a number.
pub fn parse_count(input: &str) -> Option<usize> {
    input.trim().parse().ok()
}

/// Applies a submitted prompt to the session.
pub fn submit(session: &mut Session, prompt: Prompt) -> KeyAction {
    match prompt.kind {
        PromptKind::Count => {
            session.set_count(parse_count(&prompt.input));
            KeyAction::None
        }
        PromptKind::Delay => delay(session, parse_float(Some(&prompt.input))),
        PromptKind::Command => execute(session, parse_command(&prompt.input)),
    }
}

fn delay(session: &mut Session, seconds: f64) -> KeyAction {
    if session.set_delay(seconds) {
        KeyAction::Refresh
    } else {
        KeyAction::None
    }
}

pub fn execute(session: &mut Session, command: Command) -> KeyAction {
    match command {
        Command::Help => {
            session.message = Some(session.help_text());
            KeyAction::None
        }
        Command::Quit => KeyAction::Quit,
        Command::Stop => {
            session.paused = true;
            KeyAction::None
        }
        Command::Start(seconds) => {
            session.paused = false;
            session.set_delay(seconds);
            KeyAction::Refresh
        }
        Command::Order(None) => {
            session.message = Some(session.order_text());
            KeyAction::None
        }
        Command::Order(Some(name)) => {
            if !session.order_by_name(&name) {
                session.set_message(format!("Invalid order: {}", name));
            }
            KeyAction::None
        }
        Command::Delay(seconds) => delay(session, seconds),
        Command::View(name) => match session.switch_view(&name) {
            Ok(()) => KeyAction::Refresh,
            Err(_) => {
                session.set_message(format!("Invalid/ambiguous view: {}", name));
                KeyAction::None
            }
        },
    }
}
