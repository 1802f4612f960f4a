//! Terminal front end for the view engine.
//!
//! Interactive mode redraws a full screen with ratatui and takes keyboard
//! commands; batch mode appends plain text snapshots to stdout.

mod app;
mod command;
mod event;
mod header;
mod input;
mod session;

pub use app::App;
pub use command::{Command, parse_command};
pub use header::header_line;
pub use input::KeyAction;
pub use session::{DEFAULT_DELAY, HEADER_ROWS, Prompt, PromptKind, Session};
