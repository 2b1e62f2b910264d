//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppState, CredentialFocus};
use crate::roster::SortColumn;

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Ctrl-C quits from anywhere
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.state = AppState::Quitting;
        return Ok(true);
    }

    // Handle credentials overlay
    if matches!(app.state, AppState::EditingCredentials) {
        return handle_credentials_input(app, key);
    }

    // Handle filter overlay
    if matches!(app.state, AppState::Filtering) {
        return handle_filter_input(app, key);
    }

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

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('k') => {
            app.start_editing_credentials();
        }
        KeyCode::Char('f') => {
            app.state = AppState::Filtering;
            app.filter_selection = 0;
        }
        KeyCode::Char('u') => {
            app.request_refresh();
            app.status_message = Some("Refreshing...".to_string());
        }
        KeyCode::Char('p') => {
            app.toggle_pin();
        }
        KeyCode::Char('c') => {
            app.toggle_collapsed_cards();
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.adjust_interval(5);
        }
        KeyCode::Char('-') => {
            app.adjust_interval(-5);
        }

        // Sorting
        KeyCode::Char('0') => app.toggle_sort(SortColumn::Priority),
        KeyCode::Char('o') => app.toggle_sort(SortColumn::Online),
        KeyCode::Char('n') => app.toggle_sort(SortColumn::Name),
        KeyCode::Char('l') => app.toggle_sort(SortColumn::Level),
        KeyCode::Char('s') => app.toggle_sort(SortColumn::Status),
        KeyCode::Char('F') => app.toggle_sort(SortColumn::FairFight),
        KeyCode::Char('b') => app.toggle_sort(SortColumn::BattleStats),
        KeyCode::Char('a') => app.toggle_sort(SortColumn::LastAction),

        // Selection movement
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up => app.select_prev(),
        KeyCode::PageDown => app.select_page_down(),
        KeyCode::PageUp => app.select_page_up(),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        _ => {}
    }

    Ok(false)
}

fn handle_credentials_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Only allow closing if a key already exists, otherwise the
            // dashboard has nothing to show
            if app.credentials.has_torn_key() {
                app.state = AppState::Normal;
            }
        }
        KeyCode::Tab | KeyCode::Down => {
            app.credential_focus = match app.credential_focus {
                CredentialFocus::TornKey => CredentialFocus::FfScouterKey,
                CredentialFocus::FfScouterKey => CredentialFocus::Button,
                CredentialFocus::Button => CredentialFocus::TornKey,
            };
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.credential_focus = match app.credential_focus {
                CredentialFocus::TornKey => CredentialFocus::Button,
                CredentialFocus::FfScouterKey => CredentialFocus::TornKey,
                CredentialFocus::Button => CredentialFocus::FfScouterKey,
            };
        }
        KeyCode::Enter => match app.credential_focus {
            CredentialFocus::TornKey => {
                app.credential_focus = CredentialFocus::FfScouterKey;
            }
            CredentialFocus::FfScouterKey | CredentialFocus::Button => {
                app.submit_credentials();
            }
        },
        KeyCode::Backspace => match app.credential_focus {
            CredentialFocus::TornKey => {
                app.torn_key_input.pop();
            }
            CredentialFocus::FfScouterKey => {
                app.ffscouter_key_input.pop();
            }
            CredentialFocus::Button => {}
        },
        KeyCode::Char(c) => match app.credential_focus {
            CredentialFocus::TornKey => {
                if App::can_add_key_char(app.torn_key_input.len(), c) {
                    app.torn_key_input.push(c);
                }
            }
            CredentialFocus::FfScouterKey => {
                if App::can_add_key_char(app.ffscouter_key_input.len(), c) {
                    app.ffscouter_key_input.push(c);
                }
            }
            CredentialFocus::Button => {}
        },
        _ => {}
    }

    Ok(false)
}

fn handle_filter_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc | KeyCode::Char('f') | KeyCode::Char('q') => {
            app.state = AppState::Normal;
        }
        KeyCode::Down | KeyCode::Char('j') => app.filter_select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.filter_select_prev(),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_filter_option(),
        KeyCode::Char('c') => app.clear_filters(),
        _ => {}
    }

    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    #[test]
    fn test_quit_requires_confirmation() {
        let mut app = App::test_instance();
        let quit = handle_input(&mut app, key(KeyCode::Char('q'))).unwrap();
        assert!(!quit);
        assert_eq!(app.state, AppState::ConfirmingQuit);

        let quit = handle_input(&mut app, key(KeyCode::Char('n'))).unwrap();
        assert!(!quit);
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, key(KeyCode::Char('q'))).unwrap();
        let quit = handle_input(&mut app, key(KeyCode::Char('y'))).unwrap();
        assert!(quit);
        assert_eq!(app.state, AppState::Quitting);
    }

    #[test]
    fn test_help_overlay_toggles() {
        let mut app = App::test_instance();
        handle_input(&mut app, key(KeyCode::Char('?'))).unwrap();
        assert_eq!(app.state, AppState::ShowingHelp);

        handle_input(&mut app, key(KeyCode::Esc)).unwrap();
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_filter_overlay_keys() {
        let mut app = App::test_instance();
        handle_input(&mut app, key(KeyCode::Char('f'))).unwrap();
        assert_eq!(app.state, AppState::Filtering);

        handle_input(&mut app, key(KeyCode::Down)).unwrap();
        assert_eq!(app.filter_selection, 1);

        handle_input(&mut app, key(KeyCode::Char(' '))).unwrap();
        assert_eq!(app.config.filters.active_count(), 1);

        handle_input(&mut app, key(KeyCode::Esc)).unwrap();
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_credentials_input_editing() {
        let mut app = App::test_instance();
        app.start_editing_credentials();
        app.torn_key_input.clear();

        for c in "abc123".chars() {
            handle_input(&mut app, key(KeyCode::Char(c))).unwrap();
        }
        assert_eq!(app.torn_key_input, "abc123");

        handle_input(&mut app, key(KeyCode::Backspace)).unwrap();
        assert_eq!(app.torn_key_input, "abc12");

        // Rejected characters are ignored
        handle_input(&mut app, key(KeyCode::Char('!'))).unwrap();
        assert_eq!(app.torn_key_input, "abc12");
    }
}
