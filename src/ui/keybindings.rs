use crate::app::AppState;
use crate::domain::UiMode;
use crate::ui::styles::{error_style, hint_style, tag_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Render the keybindings hint bar
pub fn render_keybindings(f: &mut Frame, app: &AppState, area: Rect) {
    let hints: &[&str] = match app.ui_mode {
        UiMode::Normal => &[
            " ↑/↓ select   ",
            "Enter start/stop   ",
            "a add   ",
            "e edit   ",
            "c complete   ",
            "x delete   ",
            "m comment   ",
            "f filter   ",
            "F clear   ",
            "v details   ",
            "q quit",
        ],
        UiMode::EditingTask => &[
            " Tab next field   ",
            "←/→ status   ",
            "Ctrl+T start/stop   ",
            "Enter save   ",
            "Esc cancel",
        ],
        UiMode::EditingFilter => &[" Tab status   ", "type tags   ", "Enter apply   ", "Esc cancel"],
        UiMode::AddingTask | UiMode::AddingComment => &[" Enter submit   ", "Esc cancel"],
    };

    let line = Line::from(hints.iter().map(|h| Span::raw(*h)).collect::<Vec<_>>());
    f.render_widget(Paragraph::new(line).style(hint_style()), area);
}

/// Render the active filters
pub fn render_filter_bar(f: &mut Frame, app: &AppState, area: Rect) {
    let tags = if app.tag_filter.trim().is_empty() {
        "any".to_string()
    } else {
        app.tag_filter.clone()
    };
    let line = Line::from(vec![
        Span::styled(" Status: ", hint_style()),
        Span::raw(app.status_filter.label().to_string()),
        Span::styled("   Tags: ", hint_style()),
        Span::styled(tags, tag_style()),
        Span::styled(
            format!("   {} shown", app.visible_tasks().len()),
            hint_style(),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

/// Render the status message line
pub fn render_status_line(f: &mut Frame, app: &AppState, area: Rect) {
    if let Some(message) = &app.message {
        let paragraph = Paragraph::new(format!(" {}", message)).style(error_style());
        f.render_widget(paragraph, area);
    }
}
