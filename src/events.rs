use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{Action, App, View};

/// Rows moved by PgUp/PgDn.
const PAGE: usize = 10;

/// Handle a key event.
///
/// Navigation is applied directly; anything that needs the poller or the
/// service comes back as an [`Action`] for the UI loop to perform.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return None;
    }

    if app.upload_input.is_some() {
        return handle_upload_input(app, key);
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),
        KeyCode::Char('1') => app.set_view(View::Chart),
        KeyCode::Char('2') => app.set_view(View::Readings),
        KeyCode::Char('3') => app.set_view(View::Anomalies),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),

        // Scrolling
        KeyCode::Up | KeyCode::Char('k') => app.scroll_up(1),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(PAGE),
        KeyCode::PageDown => app.scroll_down(PAGE),
        KeyCode::Home => app.scroll_top(),
        KeyCode::End => app.scroll_bottom(),

        // Time window
        KeyCode::Char('w') => return Some(Action::NextWindow),
        KeyCode::Char('W') => return Some(Action::PrevWindow),

        KeyCode::Char('r') => return Some(Action::Refresh),
        KeyCode::Char('u') => app.start_upload_prompt(),
        KeyCode::Char('e') => return Some(Action::Export),
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
    None
}

/// Handle key input while the upload prompt is open
fn handle_upload_input(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Enter => return Some(Action::Upload(app.take_upload_path())),
        KeyCode::Esc => app.cancel_upload_prompt(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.cancel_upload_prompt();
        }
        KeyCode::Backspace => app.input_pop(),
        KeyCode::Char(c) => app.input_push(c),
        _ => {}
    }
    None
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(1),
        MouseEventKind::ScrollDown => app.scroll_down(1),
        _ => {}
    }
}
