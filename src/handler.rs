use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, Button, Dialog, FocusPane};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => {
            if app.dialog.is_none() && app.focus == FocusPane::Input {
                app.input.insert_str(&text);
                app.on_input_changed();
            }
        }
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Popups capture all keys
    if let Some(dialog) = app.dialog.clone() {
        match dialog {
            Dialog::Warning { .. } => handle_warning_key(app, key),
            Dialog::ConfirmQuit => handle_quit_key(app, key),
        }
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => app.request_quit(),
            KeyCode::Char('e') => app.press(Button::FindErrors),
            KeyCode::Char('f') => app.press(Button::FixCode),
            KeyCode::Char('l') => app.press(Button::Clear),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.request_quit(),
        KeyCode::BackTab => app.toggle_focus(),
        _ => match app.focus {
            FocusPane::Input => handle_input_key(app, key),
            FocusPane::Output => handle_output_key(app, key),
        },
    }
}

fn handle_warning_key(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
        app.dismiss_dialog();
    }
}

fn handle_quit_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_quit(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.dismiss_dialog(),
        _ => {}
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    let edited = match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::ALT) => {
            app.input.insert_char(c);
            true
        }
        KeyCode::Enter => {
            app.input.insert_newline();
            true
        }
        KeyCode::Tab => {
            app.input.insert_tab();
            true
        }
        KeyCode::Backspace => {
            app.input.backspace();
            true
        }
        KeyCode::Delete => {
            app.input.delete();
            true
        }
        KeyCode::Left => {
            app.input.move_left();
            false
        }
        KeyCode::Right => {
            app.input.move_right();
            false
        }
        KeyCode::Up => {
            app.input.move_up();
            false
        }
        KeyCode::Down => {
            app.input.move_down();
            false
        }
        KeyCode::Home => {
            app.input.move_home();
            false
        }
        KeyCode::End => {
            app.input.move_end();
            false
        }
        _ => return,
    };

    if edited {
        app.on_input_changed();
    } else {
        app.scroll_input_to_cursor();
    }
}

fn handle_output_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_output_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_output_up(),
        KeyCode::PageDown => app.scroll_output_page_down(),
        KeyCode::PageUp => app.scroll_output_page_up(),
        KeyCode::Home | KeyCode::Char('g') => app.output_scroll = 0,
        KeyCode::End | KeyCode::Char('G') => app.scroll_output_to_end(),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.dialog.is_some() {
        return;
    }

    let x = mouse.column;
    let y = mouse.row;

    let in_input = app.input_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_output = app.output_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let clicked = app
                .button_areas
                .iter()
                .find(|(_, rect)| point_in_rect(x, y, *rect))
                .map(|(button, _)| *button);

            if let Some(button) = clicked {
                app.press(button);
            } else if in_input {
                app.focus = FocusPane::Input;
            } else if in_output {
                app.focus = FocusPane::Output;
            }
        }
        MouseEventKind::ScrollDown if in_output => {
            app.scroll_output_down();
            app.scroll_output_down();
            app.scroll_output_down();
        }
        MouseEventKind::ScrollUp if in_output => {
            app.scroll_output_up();
            app.scroll_output_up();
            app.scroll_output_up();
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::prompt::Action;
    use crate::status::Status;

    fn app() -> App {
        let config = Config {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        };
        App::new(&config)
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn click(x: u16, y: u16) -> AppEvent {
        AppEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            let code = if c == '\n' { KeyCode::Enter } else { KeyCode::Char(c) };
            handle_event(app, key(code));
        }
    }

    #[test]
    fn test_typing_updates_buffer_and_highlights() {
        let mut app = app();
        type_text(&mut app, "def f(): # comment");

        assert_eq!(app.input.text(), "def f(): # comment");
        assert_eq!(app.highlights.len(), 2);

        handle_event(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.input.text(), "def f(): # commen");
    }

    #[test]
    fn test_ctrl_e_on_empty_input_opens_warning() {
        let mut app = app();
        handle_event(&mut app, ctrl('e'));

        assert!(matches!(app.dialog, Some(Dialog::Warning { .. })));
        assert!(app.request_task.is_none());

        // Keys go to the dialog, not the buffer
        handle_event(&mut app, key(KeyCode::Char('x')));
        assert_eq!(app.input.text(), "");
        handle_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.dialog, None);
    }

    #[test]
    fn test_ctrl_f_on_empty_input_opens_fix_warning() {
        let mut app = app();
        handle_event(&mut app, ctrl('f'));
        assert_eq!(
            app.dialog,
            Some(Dialog::Warning {
                title: "Warning".to_string(),
                message: Action::FixCode.empty_warning().to_string(),
            })
        );
    }

    #[test]
    fn test_quit_dialog_flow() {
        let mut app = app();

        handle_event(&mut app, key(KeyCode::Esc));
        assert_eq!(app.dialog, Some(Dialog::ConfirmQuit));
        handle_event(&mut app, key(KeyCode::Char('n')));
        assert_eq!(app.dialog, None);
        assert!(!app.should_quit);

        handle_event(&mut app, ctrl('c'));
        assert_eq!(app.dialog, Some(Dialog::ConfirmQuit));
        handle_event(&mut app, key(KeyCode::Char('y')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_l_clears() {
        let mut app = app();
        type_text(&mut app, "x = 1");
        app.output = "old".to_string();

        handle_event(&mut app, ctrl('l'));

        assert_eq!(app.input.text(), "");
        assert_eq!(app.output, "");
        assert_eq!(app.status, Status::Ready);
    }

    #[test]
    fn test_tab_indents_input_and_backtab_switches_focus() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.input.text(), "    ");

        handle_event(&mut app, key(KeyCode::BackTab));
        assert_eq!(app.focus, FocusPane::Output);
        handle_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus, FocusPane::Input);
    }

    #[test]
    fn test_output_scrolling_is_bounded() {
        let mut app = app();
        app.focus = FocusPane::Output;
        app.total_output_lines = 10;
        app.output_height = 4;

        for _ in 0..20 {
            handle_event(&mut app, key(KeyCode::Char('j')));
        }
        assert_eq!(app.output_scroll, 6);

        handle_event(&mut app, key(KeyCode::PageUp));
        assert_eq!(app.output_scroll, 2);
        handle_event(&mut app, key(KeyCode::Home));
        assert_eq!(app.output_scroll, 0);
    }

    #[test]
    fn test_clicking_clear_button() {
        let mut app = app();
        type_text(&mut app, "x");
        app.button_areas = vec![(Button::Clear, Rect::new(10, 5, 9, 1))];

        handle_event(&mut app, click(12, 5));
        assert_eq!(app.input.text(), "");
    }

    #[test]
    fn test_click_focuses_pane() {
        let mut app = app();
        app.output_area = Some(Rect::new(0, 10, 40, 10));

        handle_event(&mut app, click(3, 12));
        assert_eq!(app.focus, FocusPane::Output);
    }

    #[test]
    fn test_paste_inserts_into_input() {
        let mut app = app();
        handle_event(&mut app, AppEvent::Paste("import os\r\nx = 'a'".to_string()));
        assert_eq!(app.input.text(), "import os\nx = 'a'");
        assert_eq!(app.highlights.len(), 2);
    }

    #[test]
    fn test_tick_advances_only_while_busy() {
        let mut app = app();
        handle_event(&mut app, AppEvent::Tick);
        assert_eq!(app.status_line(), "Status: Ready");

        app.status = Status::Busy(Action::FindErrors);
        app.animator.start();
        handle_event(&mut app, AppEvent::Tick);
        assert_eq!(app.status_line(), "Status: Finding Errors... [/]");
    }

    #[test]
    fn test_resize_leaves_state_alone() {
        let mut app = app();
        type_text(&mut app, "x = 1");
        handle_event(&mut app, AppEvent::Resize);
        assert_eq!(app.input.text(), "x = 1");
        assert_eq!(app.focus, FocusPane::Input);
        assert!(app.dialog.is_none());
    }
}
