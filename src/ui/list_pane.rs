use crate::app::AppState;
use crate::domain::Task;
use crate::ui::styles::{
    border_style, default_style, done_style, running_style, selected_style, status_style,
    tag_style, title_style,
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Render the task list pane
pub fn render_list_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let tasks = app.visible_tasks();

    let items: Vec<ListItem> = tasks
        .iter()
        .enumerate()
        .map(|(idx, task)| {
            let running = app.tracker.is_timer_active(&task.id);
            let line = create_task_line(task, &app.duration_text(task), running);
            let style = if idx == app.selected_index {
                selected_style()
            } else {
                default_style()
            };

            ListItem::new(line).style(style)
        })
        .collect();

    let title = format!(" Tasks ({}/{}) ", tasks.len(), app.tracker.all().len());

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(title, title_style())),
    );

    f.render_widget(list, area);
}

/// Create a single line for a task
/// Format: [✓] Write proposal  [In Progress]  ⏱ 00:12:05 ▶  [work] [docs]
fn create_task_line(task: &Task, duration_text: &str, running: bool) -> Line<'static> {
    let mut spans = Vec::new();

    let mark = if task.completed { "[✓] " } else { "[ ] " };
    spans.push(Span::raw(mark.to_string()));

    let text_style = if task.completed {
        done_style()
    } else {
        default_style()
    };
    spans.push(Span::styled(task.text.clone(), text_style));
    spans.push(Span::raw("  ".to_string()));

    spans.push(Span::styled(
        format!("[{}]", task.status.label()),
        status_style(task.status),
    ));
    spans.push(Span::raw("  ".to_string()));

    if running {
        spans.push(Span::styled(format!("⏱ {} ▶", duration_text), running_style()));
    } else {
        spans.push(Span::raw(format!("⏱ {}", duration_text)));
    }

    if !task.tags.is_empty() {
        spans.push(Span::raw(" ".to_string()));
        for tag in &task.tags {
            spans.push(Span::raw(" ".to_string()));
            spans.push(Span::styled(format!("[{}]", tag), tag_style()));
        }
    }

    Line::from(spans)
}
