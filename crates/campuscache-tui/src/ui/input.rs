//! Keyboard input handling for the TUI.
//!
//! Translates key events into application state changes. Modal states
//! (help, quit confirmation, search) are handled before normal navigation.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, Tab};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle search mode
    if matches!(app.state, AppState::Searching) {
        return handle_search_input(app, key);
    }

    // Normal mode
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Tab => app.switch_tab(app.current_tab.next()),
        KeyCode::BackTab => app.switch_tab(app.current_tab.prev()),
        KeyCode::Char('/') => {
            app.enter_search();
        }
        KeyCode::Left | KeyCode::Char('h') => app.move_focus(-1),
        KeyCode::Right | KeyCode::Char('l') => app.move_focus(1),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::Enter => app.pick_focused(),
        KeyCode::Char('p') => app.prefetch_all_roles(),
        KeyCode::Char(c @ '1'..='4') if app.current_tab == Tab::Staff => {
            app.quick_role(c as usize - '1' as usize);
        }
        _ => {}
    }

    Ok(false)
}

fn handle_search_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => app.cancel_search(),
        KeyCode::Enter => {
            app.commit_suggestion();
        }
        KeyCode::Up => app.move_suggestion(-1),
        KeyCode::Down => app.move_suggestion(1),
        KeyCode::Backspace => app.search_pop(),
        KeyCode::Char(c) => app.search_push(c),
        _ => {}
    }
    Ok(false)
}
