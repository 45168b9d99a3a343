use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line as TextLine, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

/// A rectangle of the given percentages, centered in `area`
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [rect] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    rect
}

/// Place a `width` x `height` box next to (column, row), kept inside `bounds`.
pub fn tooltip_rect(column: u16, row: u16, width: u16, height: u16, bounds: Rect) -> Rect {
    let width = width.min(bounds.width);
    let height = height.min(bounds.height);

    let right_edge = bounds.x + bounds.width;
    let bottom_edge = bounds.y + bounds.height;

    let x = if column.saturating_add(2).saturating_add(width) <= right_edge {
        column.saturating_add(2)
    } else {
        right_edge.saturating_sub(width).max(bounds.x)
    };
    let y = if row.saturating_add(1).saturating_add(height) <= bottom_edge {
        row.saturating_add(1)
    } else {
        bottom_edge.saturating_sub(height).max(bounds.y)
    };

    Rect::new(x, y, width, height)
}

#[allow(clippy::cast_possible_truncation)]
pub fn render_tooltip(f: &mut Frame<'_>, column: u16, row: u16, text: &str) {
    let lines: Vec<TextLine<'_>> = text.lines().map(TextLine::from).collect();
    let width = lines.iter().map(TextLine::width).max().unwrap_or(0) as u16 + 2;
    let height = lines.len() as u16 + 2;
    let area = tooltip_rect(column, row, width, height, f.area());

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(Text::from(lines)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        ),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_centered() {
        let area = Rect::new(0, 0, 100, 50);
        let rect = centered_rect(60, 60, area);
        assert_eq!(rect.width, 60);
        assert_eq!(rect.height, 30);
        assert_eq!(rect.x, 20);
        assert_eq!(rect.y, 10);
    }

    #[test]
    fn tooltip_flips_at_the_edges() {
        let bounds = Rect::new(0, 0, 80, 24);
        assert_eq!(tooltip_rect(10, 5, 20, 4, bounds), Rect::new(12, 6, 20, 4));
        assert_eq!(tooltip_rect(75, 22, 20, 4, bounds), Rect::new(60, 20, 20, 4));
    }
}
