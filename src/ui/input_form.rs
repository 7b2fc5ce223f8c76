use crate::app::{AppState, FormKind};
use crate::ui::{
    layout::create_modal_area,
    styles::{modal_bg_style, modal_title_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn field_line(value: &str, editing: bool) -> Line<'static> {
    Line::from(vec![
        Span::raw("> "),
        Span::styled(value.to_string(), modal_title_style()),
        if editing {
            Span::styled("█", modal_title_style()) // Cursor
        } else {
            Span::raw("")
        },
    ])
}

fn render_form(f: &mut Frame, area: Rect, title: &str, lines: Vec<Line>) {
    let modal_area = create_modal_area(area, lines.len() as u16 + 2);

    // Clear the area behind the form
    f.render_widget(Clear, modal_area);

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title.to_string(), modal_title_style()))
                .style(modal_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}

/// Render the single-line form for adding tasks and comments
pub fn render_input_form(f: &mut Frame, app: &AppState, area: Rect) {
    if let Some(form) = &app.input_form {
        let (title, label) = match form.kind {
            FormKind::NewTask => (" Add Task ", "Task:"),
            FormKind::Comment => (" Add Comment ", "Comment:"),
        };

        let mut lines = vec![Line::raw(""), Line::raw(label), field_line(&form.value, true)];
        lines.push(Line::raw(""));
        if let Some(message) = &app.message {
            lines.push(Line::raw(format!("! {}", message)));
        }
        lines.push(Line::raw("Enter to submit  ·  Esc to cancel"));

        render_form(f, area, title, lines);
    }
}

/// Render the filter form
pub fn render_filter_form(f: &mut Frame, app: &AppState, area: Rect) {
    if let Some(form) = &app.filter_form {
        let lines = vec![
            Line::raw(""),
            Line::from(vec![
                Span::raw("Status: "),
                Span::styled(form.status.label(), modal_title_style()),
                Span::raw("  (Tab to cycle)"),
            ]),
            Line::raw(""),
            Line::raw("Tags (comma-separated, any match):"),
            field_line(&form.tags, true),
            Line::raw(""),
            Line::raw("Enter to apply  ·  Esc to cancel"),
        ];

        render_form(f, area, " Filter ", lines);
    }
}
