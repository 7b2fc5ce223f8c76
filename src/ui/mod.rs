pub mod comments_pane;
pub mod details_pane;
pub mod edit_form;
pub mod input_form;
pub mod keybindings;
pub mod layout;
pub mod list_pane;
pub mod styles;

use crate::app::AppState;
use crate::domain::UiMode;
use comments_pane::render_comments_pane;
use details_pane::render_details_pane;
use edit_form::render_edit_form;
use input_form::{render_filter_form, render_input_form};
use keybindings::{render_filter_bar, render_keybindings, render_status_line};
use layout::create_layout;
use list_pane::render_list_pane;
use ratatui::Frame;

/// Main render function - draws the entire UI
pub fn render(f: &mut Frame, app: &AppState) {
    let size = f.size();
    let layout = create_layout(size, app.show_details);

    render_keybindings(f, app, layout.keybindings_area);
    render_filter_bar(f, app, layout.filter_area);

    render_list_pane(f, app, layout.list_area);
    if let Some(details_area) = layout.details_area {
        render_details_pane(f, app, details_area);
    }
    if let Some(comments_area) = layout.comments_area {
        render_comments_pane(f, app, comments_area);
    }

    // Forms show their own errors
    if app.ui_mode == UiMode::Normal {
        render_status_line(f, app, layout.status_area);
    }

    match app.ui_mode {
        UiMode::AddingTask | UiMode::AddingComment => render_input_form(f, app, size),
        UiMode::EditingTask => render_edit_form(f, app, size),
        UiMode::EditingFilter => render_filter_form(f, app, size),
        UiMode::Normal => {}
    }
}
