use crate::app::AppState;
use crate::domain::Comment;
use crate::ui::styles::{border_style, default_style, timestamp_style, title_style};
use chrono::Local;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the comment log of the selected task, oldest first
pub fn render_comments_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let comments = app
        .selected_task()
        .map(|t| t.comments.as_slice())
        .unwrap_or_default();

    let lines: Vec<Line> = if comments.is_empty() {
        vec![Line::from(Span::styled("No comments yet", default_style()))]
    } else {
        comments.iter().map(comment_line).collect()
    };

    // Keep the newest entries in view
    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(inner_height) as u16;

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(Span::styled(
                    format!(" Comments ({}) ", comments.len()),
                    title_style(),
                )),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    f.render_widget(paragraph, area);
}

fn comment_line(comment: &Comment) -> Line<'static> {
    let stamp = comment
        .timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M");
    Line::from(vec![
        Span::styled(format!("{} ", stamp), timestamp_style()),
        Span::raw(comment.text.clone()),
    ])
}
