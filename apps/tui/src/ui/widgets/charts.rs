use crop_forecast_viewer::render::LineChart;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap};
use ratatui::Frame;

/// Bordered placeholder shown where a chart would be
pub fn render_placeholder(f: &mut Frame<'_>, area: Rect, title: &str, message: &str, color: Color) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    let paragraph = Paragraph::new(message.to_string())
        .block(block)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

/// Draw a line series with markers at each point
pub fn render_line_chart(f: &mut Frame<'_>, area: Rect, chart: &LineChart, color: Color) {
    if chart.is_empty() {
        render_placeholder(f, area, &chart.title, "No values to plot", Color::Yellow);
        return;
    }

    let datasets = vec![
        Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(color))
            .data(&chart.points),
        Dataset::default()
            .marker(Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::White))
            .data(&chart.points),
    ];

    let x_labels: Vec<Span<'_>> = chart.x_ticks.iter().map(|t| Span::raw(t.as_str())).collect();
    let y_labels: Vec<Span<'_>> = chart.y_ticks.iter().map(|t| Span::raw(t.as_str())).collect();

    let widget = Chart::new(datasets)
        .block(
            Block::default()
                .title(chart.title.clone())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .x_axis(
            Axis::default()
                .title(chart.x_label.clone())
                .style(Style::default().fg(Color::Gray))
                .bounds(chart.x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(chart.y_label.clone())
                .style(Style::default().fg(Color::Gray))
                .bounds(chart.y_bounds)
                .labels(y_labels),
        );

    f.render_widget(widget, area);
}
