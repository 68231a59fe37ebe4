use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Chat(ticket, result) => {
            // Stale settlements are already logged by the session
            let _ = app.session.settle_chat(ticket, result);
        }
        AppEvent::Image(ticket, result) => {
            let _ = app.session.settle_image(ticket, result);
        }
        AppEvent::Saved(result) => app.on_saved(result),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') | KeyCode::Char('/') => app.input_mode = InputMode::Editing,

        // Requests
        KeyCode::Char('c') | KeyCode::Enter => app.issue_chat(),
        KeyCode::Char('m') => app.issue_image(),
        KeyCode::Char('v') => app.speak_cue(),
        KeyCode::Char('s') => app.save_image(),

        // Transcript
        KeyCode::Char('k') | KeyCode::Up => app.scroll_transcript_up(),
        KeyCode::Char('j') | KeyCode::Down => app.scroll_transcript_down(),
        KeyCode::Char('G') | KeyCode::End => app.follow_transcript = true,

        KeyCode::Esc => app.notice = None,
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.issue_chat(),
        KeyCode::Backspace => {
            if app.prompt_cursor > 0 {
                app.prompt_cursor -= 1;
                let prompt = app.session.prompt_mut();
                let byte_pos = char_to_byte_index(prompt, app.prompt_cursor);
                prompt.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let prompt = app.session.prompt_mut();
            if app.prompt_cursor < prompt.chars().count() {
                let byte_pos = char_to_byte_index(prompt, app.prompt_cursor);
                prompt.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.prompt_cursor = app.prompt_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.session.prompt().chars().count();
            app.prompt_cursor = (app.prompt_cursor + 1).min(char_count);
        }
        KeyCode::Home => app.prompt_cursor = 0,
        KeyCode::End => app.prompt_cursor = app.session.prompt().chars().count(),
        KeyCode::Char(c) => {
            let prompt = app.session.prompt_mut();
            let byte_pos = char_to_byte_index(prompt, app.prompt_cursor);
            prompt.insert(byte_pos, c);
            app.prompt_cursor += 1;
        }
        _ => {}
    }
}
