use crate::app::{AppState, EditField};
use crate::tracker::Draft;
use crate::ui::{
    layout::create_modal_area,
    styles::{modal_bg_style, modal_title_style, running_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn field_value(draft: &Draft, field: EditField) -> String {
    match field {
        EditField::Text => draft.text.clone(),
        EditField::Status => format!("< {} >", draft.status.label()),
        EditField::Tags => draft.tags.clone(),
        EditField::Duration => draft.duration.clone(),
        EditField::Attachment => draft.attachment.clone(),
    }
}

/// Render the edit form over the draft of the task being edited
pub fn render_edit_form(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(form) = &app.edit_form else {
        return;
    };
    let Some(draft) = app.tracker.draft(&form.task_id) else {
        return;
    };
    let running = app.tracker.is_timer_active(&form.task_id);

    let mut lines = vec![Line::raw("")];
    for field in EditField::ALL {
        let editing = field == form.field;
        let label = if editing {
            format!("{}: (editing)", field.label())
        } else {
            format!("{}:", field.label())
        };
        lines.push(Line::raw(label));

        // The running stopwatch owns the duration; show its live value
        let value_line = if field == EditField::Duration && running {
            let live = app.edit_live_text().unwrap_or_default();
            Line::from(vec![
                Span::raw("> "),
                Span::styled(format!("{} ▶ (timer running)", live), running_style()),
            ])
        } else {
            Line::from(vec![
                Span::raw("> "),
                Span::styled(field_value(draft, field), modal_title_style()),
                if editing && field != EditField::Status {
                    Span::styled("█", modal_title_style()) // Cursor
                } else {
                    Span::raw("")
                },
            ])
        };
        lines.push(value_line);
    }

    lines.push(Line::raw(""));
    if let Some(message) = &app.message {
        lines.push(Line::raw(format!("! {}", message)));
    }
    let timer_hint = if running {
        "Ctrl+T stop timer"
    } else {
        "Ctrl+T start timer"
    };
    lines.push(Line::raw(format!(
        "Tab next field  ·  ←/→ status  ·  {}  ·  Enter save  ·  Esc cancel",
        timer_hint
    )));

    let modal_area = create_modal_area(area, lines.len() as u16 + 2);
    f.render_widget(Clear, modal_area);

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" Edit Task ", modal_title_style()))
                .style(modal_bg_style()),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, modal_area);
}
