use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Main layout structure
pub struct MainLayout {
    pub keybindings_area: Rect,
    pub filter_area: Rect,
    pub list_area: Rect,
    pub details_area: Option<Rect>,
    pub comments_area: Option<Rect>,
    pub status_area: Rect,
}

/// Create the main layout
/// - Top bars: keybindings (1 row), filter (1 row)
/// - Main area: List (60%) | Details above Comments (40%), or List alone
/// - Bottom bar: status message (1 row)
pub fn create_layout(area: Rect, show_details: bool) -> MainLayout {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Keybindings bar
            Constraint::Length(1), // Filter bar
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status line
        ])
        .split(area);

    let content_area = main_chunks[2];

    let (list_area, details_area, comments_area) = if show_details {
        let horizontal_split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(60), // List pane
                Constraint::Percentage(40), // Details + comments
            ])
            .split(content_area);

        let side_split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(horizontal_split[1]);

        (
            horizontal_split[0],
            Some(side_split[0]),
            Some(side_split[1]),
        )
    } else {
        (content_area, None, None)
    };

    MainLayout {
        keybindings_area: main_chunks[0],
        filter_area: main_chunks[1],
        list_area,
        details_area,
        comments_area,
        status_area: main_chunks[3],
    }
}

/// Create centered modal area with the given height
pub fn create_modal_area(area: Rect, height: u16) -> Rect {
    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Length(height),
            Constraint::Percentage(25),
        ])
        .split(area);

    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(vertical_chunks[1]);

    horizontal_chunks[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_layout() {
        let area = Rect::new(0, 0, 100, 50);
        let layout = create_layout(area, true);

        assert_eq!(layout.keybindings_area.height, 1);
        assert_eq!(layout.filter_area.height, 1);
        assert_eq!(layout.status_area.height, 1);
        assert!(layout.list_area.height > 0);
        assert!(layout.details_area.is_some());
        assert!(layout.comments_area.is_some());

        let without_details = create_layout(area, false);
        assert!(without_details.details_area.is_none());
        assert_eq!(without_details.list_area.width, 100);
    }

    #[test]
    fn test_create_modal_area() {
        let area = Rect::new(0, 0, 100, 50);
        let modal = create_modal_area(area, 12);

        assert!(modal.width < area.width);
        assert_eq!(modal.height, 12);
    }
}
