//! Input handling and keybindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::command;
use super::session::{Prompt, PromptKind, Session};

/// Result of handling a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Nothing beyond a redraw.
    None,
    /// Quit the application.
    Quit,
    /// Sample the active view now.
    Refresh,
    /// Clear and repaint the whole screen.
    Redraw,
}

/// Handles key input and updates the session.
pub fn handle_key(session: &mut Session, key: KeyEvent) -> KeyAction {
    session.message = None;
    if session.prompt.is_some() {
        return handle_prompt(session, key);
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('h') | KeyCode::Char('?') => {
            session.message = Some(session.help_text());
            return KeyAction::None;
        }
        KeyCode::Char('g') if ctrl => {
            session.message = Some(session.view_text());
            return KeyAction::None;
        }
        KeyCode::Char('l') if !ctrl => {
            session.prompt = Some(Prompt::new(PromptKind::Count));
            return KeyAction::None;
        }
        KeyCode::Char('s') => {
            session.prompt = Some(Prompt::new(PromptKind::Delay));
            return KeyAction::None;
        }
        KeyCode::Char(',') => {
            session.thousands = !session.thousands;
            return KeyAction::None;
        }
        KeyCode::Char(':') => {
            session.prompt = Some(Prompt::new(PromptKind::Command));
            return KeyAction::None;
        }
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Char('c') if ctrl => return KeyAction::Quit,
        _ => {}
    }

    if handle_navigation(session, key.code) {
        return KeyAction::None;
    }

    if let KeyCode::Char(c) = key.code {
        if ctrl {
            if c == 'l' {
                return KeyAction::Redraw;
            }
            return KeyAction::None;
        }
        if session.order_hotkey(c) {
            return KeyAction::None;
        }
        if session.view_hotkey(c) {
            return KeyAction::Refresh;
        }
        match c {
            'p' => session.paused = !session.paused,
            'o' => session.next_order(),
            'r' => session.reverse(),
            _ => {}
        }
    }
    KeyAction::None
}

/// Scrolling and view stepping. Returns true when the key was consumed.
fn handle_navigation(session: &mut Session, code: KeyCode) -> bool {
    let page = session.page().max(1);
    match code {
        KeyCode::Up => session.scroll_up(1),
        KeyCode::Down => session.scroll_down(1),
        KeyCode::PageUp => session.scroll_up(page),
        KeyCode::PageDown | KeyCode::Char(' ') => session.scroll_down(page),
        KeyCode::Home => session.scroll_home(),
        KeyCode::End => session.scroll_end(),
        KeyCode::Left | KeyCode::BackTab => session.prev_view(),
        KeyCode::Right | KeyCode::Tab => session.next_view(),
        _ => return false,
    }
    true
}

fn handle_prompt(session: &mut Session, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Enter => {
            if let Some(prompt) = session.prompt.take() {
                return command::submit(session, prompt);
            }
        }
        KeyCode::Esc => session.prompt = None,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            session.prompt = None;
        }
        KeyCode::Backspace => {
            if let Some(prompt) = session.prompt.as_mut() {
                prompt.input.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(prompt) = session.prompt.as_mut() {
                prompt.input.push(c);
            }
        }
        _ => {}
    }
    KeyAction::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockSource, database_rows};
    use crate::view::{Direction, TableView, ViewRegistry};
    use crate::views::database::{DBBLK, DBXACT};
    use crate::views::index::{INDEX, INDEXIO};
    use crate::views::progress::VACUUM;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char(c))
        }
    }

    fn typed(session: &mut Session, text: &str) {
        for c in text.chars() {
            handle_key(session, key(KeyCode::Char(c)));
        }
    }

    fn session() -> Session {
        let mut views = ViewRegistry::new();
        views.push(Box::new(TableView::new(&DBXACT)));
        views.push(Box::new(TableView::new(&DBBLK)));
        views.push(Box::new(TableView::new(&INDEX)));
        views.push(Box::new(TableView::new(&INDEXIO)));
        let mut s = Session::new(views, 5.0);
        s.resize(120, 14);
        s
    }

    #[test]
    fn any_key_clears_message() {
        let mut s = session();
        s.set_message("boom");
        handle_key(&mut s, key(KeyCode::Char('x')));
        assert_eq!(s.message, None);
    }

    #[test]
    fn help_and_view_info() {
        let mut s = session();
        handle_key(&mut s, key(KeyCode::Char('?')));
        assert_eq!(s.message.as_deref(), Some("[dbxact] dbblk index indexio"));
        handle_key(&mut s, ctrl('g'));
        assert_eq!(s.message.as_deref(), Some("dbxact 5"));
    }

    #[test]
    fn quit_keys() {
        let mut s = session();
        assert_eq!(handle_key(&mut s, key(KeyCode::Char('q'))), KeyAction::Quit);
        assert_eq!(handle_key(&mut s, ctrl('c')), KeyAction::Quit);
    }

    #[test]
    fn command_prompt_switches_view() {
        let mut s = session();
        handle_key(&mut s, key(KeyCode::Char(':')));
        assert_eq!(s.prompt.as_ref().map(|p| p.kind), Some(PromptKind::Command));
        typed(&mut s, "indexiq");
        handle_key(&mut s, key(KeyCode::Backspace));
        typed(&mut s, "o");
        assert_eq!(s.prompt.as_ref().map(Prompt::line).as_deref(), Some("Command: indexio"));
        assert_eq!(handle_key(&mut s, key(KeyCode::Enter)), KeyAction::Refresh);
        assert_eq!(s.current(), 3);
        assert!(s.prompt.is_none());
    }

    #[test]
    fn prompt_swallows_hotkeys_and_escape_cancels() {
        let mut s = session();
        handle_key(&mut s, key(KeyCode::Char('s')));
        assert_eq!(handle_key(&mut s, key(KeyCode::Char('q'))), KeyAction::None);
        handle_key(&mut s, key(KeyCode::Esc));
        assert!(s.prompt.is_none());
        assert_eq!(s.interval, 5.0);
    }

    #[test]
    fn delay_prompt() {
        let mut s = session();
        handle_key(&mut s, key(KeyCode::Char('s')));
        typed(&mut s, "0.5");
        assert_eq!(handle_key(&mut s, key(KeyCode::Enter)), KeyAction::Refresh);
        assert_eq!(s.interval, 0.5);
    }

    #[test]
    fn count_prompt() {
        let mut s = session();
        handle_key(&mut s, key(KeyCode::Char('l')));
        typed(&mut s, "3");
        handle_key(&mut s, key(KeyCode::Enter));
        assert_eq!(s.maxprint, Some(3));
    }

    #[test]
    fn order_hotkey_flips_on_repeat() {
        let mut s = session();
        handle_key(&mut s, key(KeyCode::Char('c')));
        assert_eq!(s.order(), 2);
        assert_eq!(s.direction, Direction::Natural);
        handle_key(&mut s, key(KeyCode::Char('c')));
        assert_eq!(s.direction, Direction::Reversed);
        handle_key(&mut s, key(KeyCode::Char('o')));
        assert_eq!(s.order(), 3);
        assert_eq!(s.direction, Direction::Natural);
    }

    #[test]
    fn order_hotkeys_shadow_engine_keys() {
        let mut views = ViewRegistry::new();
        views.push(Box::new(TableView::new(&VACUUM)));
        let mut s = Session::new(views, 5.0);
        handle_key(&mut s, key(KeyCode::Char('p')));
        assert!(!s.paused);
        assert_eq!(s.order(), 2);
        handle_key(&mut s, key(KeyCode::Char('r')));
        assert_eq!(s.direction, Direction::Reversed);
    }

    #[test]
    fn view_hotkeys_cycle() {
        let mut s = session();
        assert_eq!(handle_key(&mut s, key(KeyCode::Char('U'))), KeyAction::Refresh);
        assert_eq!(s.current(), 2);
        handle_key(&mut s, key(KeyCode::Char('U')));
        assert_eq!(s.current(), 3);
        handle_key(&mut s, key(KeyCode::Char('U')));
        assert_eq!(s.current(), 2);
        handle_key(&mut s, key(KeyCode::Char('D')));
        assert_eq!(s.current(), 0);
    }

    #[test]
    fn pause_thousands_redraw() {
        let mut s = session();
        handle_key(&mut s, key(KeyCode::Char('p')));
        assert!(s.paused);
        handle_key(&mut s, key(KeyCode::Char(',')));
        assert!(s.thousands);
        assert_eq!(handle_key(&mut s, ctrl('l')), KeyAction::Redraw);
    }

    #[test]
    fn tab_steps_views() {
        let mut s = session();
        handle_key(&mut s, key(KeyCode::BackTab));
        assert_eq!(s.current(), 3);
        handle_key(&mut s, key(KeyCode::Tab));
        assert_eq!(s.current(), 0);
    }

    #[test]
    fn paging() {
        let rows: Vec<(i64, String)> = (0..25).map(|i| (i, format!("db{:02}", i))).collect();
        let rows: Vec<_> = rows.iter().map(|(i, n)| (*i, n.as_str(), 0, 0, 0, 0)).collect();
        let mut source = MockSource::new();
        source.respond(DBXACT.query.text(None), database_rows(&rows));
        let mut s = session();
        s.refresh(&mut source);
        assert_eq!(s.page(), 10);
        handle_key(&mut s, key(KeyCode::PageDown));
        assert_eq!(s.dispstart, 10);
        handle_key(&mut s, key(KeyCode::Char(' ')));
        assert_eq!(s.dispstart, 15);
        handle_key(&mut s, key(KeyCode::Up));
        assert_eq!(s.dispstart, 14);
        handle_key(&mut s, key(KeyCode::Home));
        assert_eq!(s.dispstart, 0);
        handle_key(&mut s, key(KeyCode::End));
        assert_eq!(s.dispstart, 15);
    }
}
