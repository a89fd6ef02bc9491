//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  Three layers, checked in
//! order:
//!
//! 1. an open notice swallows everything except its dismiss keys,
//! 2. a text prompt (channel / page number) takes characters,
//! 3. otherwise the normal key map applies.
//!
//! ## For contributors
//!
//! To add a new keybinding, add a method on [`App`] for the action and a
//! `KeyCode` arm in [`handle_normal`], then update the hints in
//! [`crate::ui`].

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Mode};

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit = true;
        return;
    }

    if app.notice.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_notice();
        }
        return;
    }

    match app.mode {
        Mode::Normal => handle_normal(app, key.code),
        Mode::Channel(_) | Mode::JumpToPage(_) => handle_prompt(app, key.code),
    }
}

fn handle_prompt(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Enter => app.confirm_entry(),
        KeyCode::Esc => app.cancel_entry(),
        KeyCode::Backspace => app.pop_char(),
        KeyCode::Char(c) => app.push_char(c),
        _ => {}
    }
}

fn handle_normal(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('s') | KeyCode::Char('/') if !app.is_busy() => app.begin_channel_entry(),
        KeyCode::Char('x') => app.stop(),
        KeyCode::Char('e') => app.export(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::PageDown => app.next_page(),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::PageUp => app.previous_page(),
        KeyCode::Home | KeyCode::Char('g') => app.first_page(),
        KeyCode::End | KeyCode::Char('G') => app.last_page(),
        KeyCode::Char(':') => app.begin_page_jump(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.cycle_page_size(true),
        KeyCode::Char('-') => app.cycle_page_size(false),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{app_with, single_page};
    use crate::poll::tests::page;
    use crossterm::event::KeyEventState;
    use std::path::PathBuf;
    use std::time::Duration;

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn q_quits() {
        let mut app = app_with(vec![], PathBuf::from("."));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.quit);
    }

    #[tokio::test(start_paused = true)]
    async fn release_events_are_ignored() {
        let mut app = app_with(vec![], PathBuf::from("."));
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        handle_key_event(&mut app, release);
        assert!(!app.quit);
    }

    #[tokio::test(start_paused = true)]
    async fn typing_q_in_prompt_does_not_quit() {
        let mut app = app_with(single_page(1), PathBuf::from("."));
        press(&mut app, KeyCode::Char('s'));
        type_str(&mut app, "aquarium");
        assert!(!app.quit);
        assert_eq!(app.mode, Mode::Channel("aquarium".into()));

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.sessions.channel(), Some("aquarium"));
        assert!(app.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn start_key_is_disabled_while_polling() {
        let mut app = app_with(vec![Ok(page(&["a"], Some("t3_a")))], PathBuf::from("."));
        app.submit_channel("rust");
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.mode, Mode::Normal);

        press(&mut app, KeyCode::Char('x'));
        assert!(!app.is_busy());
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.mode, Mode::Channel(String::new()));
    }

    #[tokio::test(start_paused = true)]
    async fn escape_cancels_prompt() {
        let mut app = app_with(vec![], PathBuf::from("."));
        press(&mut app, KeyCode::Char(':'));
        type_str(&mut app, "3");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Normal);
        assert!(!app.quit);
    }

    #[tokio::test(start_paused = true)]
    async fn notice_blocks_other_keys_until_dismissed() {
        let mut app = app_with(vec![], PathBuf::from("."));
        app.submit_channel("bad name");
        assert!(app.notice.is_some());

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.quit);
        assert!(app.notice.is_some());

        press(&mut app, KeyCode::Enter);
        assert!(app.notice.is_none());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.quit);
    }

    #[tokio::test(start_paused = true)]
    async fn paging_keys() {
        let mut app = app_with(single_page(35), PathBuf::from("."));
        app.submit_channel("rust");
        tokio::time::sleep(Duration::from_millis(100)).await;
        app.tick();

        press(&mut app, KeyCode::Right);
        assert_eq!(app.pager.index(), 1);
        press(&mut app, KeyCode::End);
        assert_eq!(app.pager.index(), 3);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.pager.index(), 2);
        press(&mut app, KeyCode::Home);
        assert_eq!(app.pager.index(), 0);

        press(&mut app, KeyCode::Char(':'));
        type_str(&mut app, "2");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.pager.index(), 1);

        press(&mut app, KeyCode::Char('+'));
        assert_eq!(app.pager.size(), 20);
        press(&mut app, KeyCode::Char('-'));
        assert_eq!(app.pager.size(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn ctrl_c_always_quits() {
        let mut app = app_with(vec![], PathBuf::from("."));
        app.begin_channel_entry();
        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.quit);
    }
}
