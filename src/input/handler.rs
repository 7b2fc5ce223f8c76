use crate::app::AppState;
use crate::domain::UiMode;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle keyboard input events; returns true when the app should quit
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    // Any key press clears the previous status message
    if app.ui_mode == UiMode::Normal {
        app.message = None;
    }

    match app.ui_mode {
        UiMode::Normal => handle_normal_mode(app, key),
        UiMode::AddingTask | UiMode::AddingComment => handle_input_form_mode(app, key),
        UiMode::EditingTask => handle_edit_form_mode(app, key),
        UiMode::EditingFilter => handle_filter_form_mode(app, key),
    }
}

/// Handle keys in normal mode
fn handle_normal_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        // Navigation
        KeyCode::Up => app.move_selection_up(),
        KeyCode::Down => app.move_selection_down(),

        // Start/stop the stopwatch
        KeyCode::Enter => app.toggle_timer_selected(),

        // Toggle completion
        KeyCode::Char('c') | KeyCode::Char('C') => app.toggle_complete_selected(),

        // Delete task
        KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Delete => app.delete_selected(),

        // Edit task (open form with existing data)
        KeyCode::Char('e') | KeyCode::Char('E') => app.start_edit_task(),

        // Add task
        KeyCode::Char('a') | KeyCode::Char('A') => app.start_add_task(),

        // Add comment
        KeyCode::Char('m') | KeyCode::Char('M') => app.start_add_comment(),

        // Filters
        KeyCode::Char('f') => app.start_filter_edit(),
        KeyCode::Char('F') => app.clear_filters(),

        // Toggle details pane
        KeyCode::Char('v') | KeyCode::Char('V') => app.toggle_details(),

        // Quit
        KeyCode::Char('q') | KeyCode::Char('Q') => return Ok(true),

        _ => {}
    }
    Ok(false)
}

/// Handle keys in single-line input forms (new task, comment)
fn handle_input_form_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Enter => app.submit_input_form(),
        KeyCode::Esc => app.cancel_input_form(),
        KeyCode::Backspace => app.input_form_backspace(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.input_form_add_char(c)
        }
        _ => {}
    }
    Ok(false)
}

/// Handle keys in the edit form
fn handle_edit_form_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        // Ctrl+T starts/stops the timer of the task being edited
        KeyCode::Char('t') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.edit_form_toggle_timer()
        }
        KeyCode::Enter => app.submit_edit_form(),
        KeyCode::Esc => app.cancel_edit_form(),
        KeyCode::Tab | KeyCode::Down => app.edit_form_next_field(),
        KeyCode::Left => app.edit_form_cycle_status(false),
        KeyCode::Right => app.edit_form_cycle_status(true),
        KeyCode::Backspace => app.edit_form_backspace(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.edit_form_add_char(c)
        }
        _ => {}
    }
    Ok(false)
}

/// Handle keys in the filter form: Tab cycles status, typing edits tags
fn handle_filter_form_mode(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Enter => app.submit_filter_form(),
        KeyCode::Esc => app.cancel_filter_form(),
        KeyCode::Tab => app.filter_form_cycle_status(),
        KeyCode::Backspace => app.filter_form_backspace(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.filter_form_add_char(c)
        }
        _ => {}
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;
    use crate::persistence::kv::MemoryKv;
    use crate::tracker::clock::manual::{ManualClock, ManualScheduler};
    use crate::tracker::Tracker;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn create_test_app() -> (AppState, ManualClock) {
        let clock = ManualClock::new();
        let tracker = Tracker::new(
            Box::new(MemoryKv::new()),
            Box::new(clock.clone()),
            Box::new(ManualScheduler::default()),
        );
        let mut app = AppState::new(tracker, Box::new(MemoryKv::new()));
        app.tracker.create_task("Test task").unwrap();
        (app, clock)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn type_keys(app: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_key(app, key(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn test_handle_navigation() {
        let (mut app, _) = create_test_app();
        app.tracker.create_task("Task 2").unwrap();

        assert_eq!(app.selected_index, 0);

        handle_key(&mut app, key(KeyCode::Down)).unwrap();
        assert_eq!(app.selected_index, 1);

        handle_key(&mut app, key(KeyCode::Up)).unwrap();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_handle_quit() {
        let (mut app, _) = create_test_app();
        let should_quit = handle_key(&mut app, key(KeyCode::Char('q'))).unwrap();
        assert!(should_quit);
    }

    #[test]
    fn test_handle_add_task() {
        let (mut app, _) = create_test_app();
        let initial_count = app.tracker.all().len();

        // Press 'a' to open form
        handle_key(&mut app, key(KeyCode::Char('a'))).unwrap();
        assert_eq!(app.ui_mode, UiMode::AddingTask);
        assert!(app.input_form.is_some());

        // 'q' is text inside a form, not quit
        type_keys(&mut app, "quiz");

        handle_key(&mut app, key(KeyCode::Enter)).unwrap();
        assert_eq!(app.tracker.all().len(), initial_count + 1);
        assert_eq!(app.ui_mode, UiMode::Normal);
        assert!(app.input_form.is_none());
    }

    #[test]
    fn test_handle_delete_task() {
        let (mut app, _) = create_test_app();
        handle_key(&mut app, key(KeyCode::Char('x'))).unwrap();
        assert!(app.tracker.all().is_empty());
    }

    #[test]
    fn test_handle_delete_with_delete_key() {
        let (mut app, _) = create_test_app();
        handle_key(&mut app, key(KeyCode::Delete)).unwrap();
        assert!(app.tracker.all().is_empty());
    }

    #[test]
    fn test_handle_timer_and_complete() {
        let (mut app, clock) = create_test_app();
        handle_key(&mut app, key(KeyCode::Enter)).unwrap();
        clock.advance(42);
        handle_key(&mut app, key(KeyCode::Enter)).unwrap();

        handle_key(&mut app, key(KeyCode::Char('c'))).unwrap();
        let task = &app.tracker.all()[0];
        assert_eq!(task.duration, 42);
        assert!(task.completed);
    }

    #[test]
    fn test_handle_edit_form() {
        let (mut app, clock) = create_test_app();
        handle_key(&mut app, key(KeyCode::Char('e'))).unwrap();
        assert_eq!(app.ui_mode, UiMode::EditingTask);

        type_keys(&mut app, "!");
        handle_key(&mut app, key(KeyCode::Tab)).unwrap();
        handle_key(&mut app, key(KeyCode::Right)).unwrap();
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL),
        )
        .unwrap();
        clock.advance(5);
        handle_key(&mut app, key(KeyCode::Enter)).unwrap();

        assert_eq!(app.ui_mode, UiMode::Normal);
        let task = &app.tracker.all()[0];
        assert_eq!(task.text, "Test task!");
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.duration, 5);
    }

    #[test]
    fn test_handle_filter_form() {
        let (mut app, _) = create_test_app();
        handle_key(&mut app, key(KeyCode::Char('f'))).unwrap();
        assert_eq!(app.ui_mode, UiMode::EditingFilter);

        type_keys(&mut app, "work");
        handle_key(&mut app, key(KeyCode::Enter)).unwrap();
        assert_eq!(app.tag_filter, "work");
        assert!(app.visible_tasks().is_empty());

        handle_key(&mut app, key(KeyCode::Char('F'))).unwrap();
        assert_eq!(app.visible_tasks().len(), 1);
    }
}
