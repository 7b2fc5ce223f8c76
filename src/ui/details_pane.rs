use crate::app::AppState;
use crate::ui::styles::{border_style, default_style, running_style, status_style, title_style};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the details pane for the selected task
pub fn render_details_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(" Details ", title_style()));

    let Some(task) = app.selected_task() else {
        f.render_widget(Paragraph::new("No task selected").block(block), area);
        return;
    };

    let running = app.tracker.is_timer_active(&task.id);
    let mut lines = Vec::new();

    lines.push(Line::from(vec![
        Span::styled("Task: ", title_style()),
        Span::raw(task.text.clone()),
    ]));
    lines.push(Line::raw(""));

    lines.push(Line::from(vec![
        Span::styled("Status:     ", title_style()),
        Span::styled(task.status.label(), status_style(task.status)),
    ]));

    lines.push(Line::from(vec![
        Span::styled("Completed:  ", title_style()),
        Span::raw(if task.completed { "yes" } else { "no" }),
    ]));

    let duration_style = if running {
        running_style()
    } else {
        default_style()
    };
    lines.push(Line::from(vec![
        Span::styled("Duration:   ", title_style()),
        Span::styled(app.duration_text(task), duration_style),
        Span::raw(if running { "  (running)" } else { "" }),
    ]));

    let tags = if task.tags.is_empty() {
        "None".to_string()
    } else {
        task.tags_joined()
    };
    lines.push(Line::from(vec![
        Span::styled("Tags:       ", title_style()),
        Span::raw(tags),
    ]));

    let attachment = if task.has_attachment() {
        task.attachment.clone()
    } else {
        "None".to_string()
    };
    lines.push(Line::from(vec![
        Span::styled("Attachment: ", title_style()),
        Span::raw(attachment),
    ]));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}
