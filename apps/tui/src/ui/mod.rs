// UI module for the crop forecast viewer
// Handles all UI rendering functions

pub mod screens;
pub mod widgets;

use crate::app::App;
use crop_forecast_viewer::Page;
use ratatui::layout::{Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use ratatui::Frame;

pub fn ui(app: &App, f: &mut Frame<'_>) {
    let (header, body, footer) = frame_layout(f.area());

    render_page_tabs(app, f, header);
    match app.page {
        Page::YieldClimate => screens::regions::render_regions(app, f, body),
        Page::HistoricalForecasts => screens::forecasts::render_forecasts(app, f, body),
    }
    render_status_bar(app, f, footer);

    if let Some(hover) = &app.hover {
        widgets::popup::render_tooltip(f, hover.column, hover.row, &hover.text);
    }
    if app.show_help {
        screens::help::render_help_popup(app, f);
    }
}

/// The area inside the current page's map border, where mouse input maps to lon/lat
pub fn map_canvas(app: &App, area: Rect) -> Rect {
    let (_, body, _) = frame_layout(area);
    let map = match app.page {
        Page::YieldClimate => screens::regions::layout(app, body).map,
        Page::HistoricalForecasts => screens::forecasts::layout(body).map,
    };
    map.inner(Margin::new(1, 1))
}

fn frame_layout(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Page tabs
            Constraint::Min(10),   // Page body
            Constraint::Length(3), // Status and shortcuts
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

fn render_page_tabs(app: &App, f: &mut Frame<'_>, area: Rect) {
    let titles = [Page::YieldClimate, Page::HistoricalForecasts]
        .iter()
        .map(|page| TextLine::from(page.label()))
        .collect::<Vec<_>>();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title("== Sub-Saharan Africa Crop Forecast Viewer ==")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .select(app.page.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw("|"));

    f.render_widget(tabs, area);
}

fn key_hint(key: &str, action: &str) -> [Span<'static>; 2] {
    [
        Span::styled(
            key.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(": {action}   ")),
    ]
}

fn render_status_bar(app: &App, f: &mut Frame<'_>, area: Rect) {
    let hints: &[(&str, &str)] = match app.page {
        Page::YieldClimate if app.search.active => {
            &[("Enter", "Select"), ("↑/↓", "Navigate"), ("Esc", "Cancel")]
        }
        Page::YieldClimate => &[
            ("Click", "Select region"),
            ("/", "Search"),
            ("←/→", "EO variable"),
            ("Tab", "Page"),
            ("R", "Reload"),
            ("F1", "Help"),
            ("q", "Quit"),
        ],
        Page::HistoricalForecasts => &[
            ("↑/↓", "Selector"),
            ("←/→", "Value"),
            ("Enter", "Update Map"),
            ("Tab", "Page"),
            ("R", "Reload"),
            ("F1", "Help"),
            ("q", "Quit"),
        ],
    };
    let shortcuts: Vec<Span<'_>> = hints
        .iter()
        .flat_map(|(key, action)| key_hint(key, action))
        .collect();

    let lines = vec![
        TextLine::from(Span::styled(
            app.status_message.clone(),
            Style::default().fg(Color::Cyan),
        )),
        TextLine::from(shortcuts),
    ];

    let status = Paragraph::new(lines)
        .block(Block::default().borders(Borders::TOP))
        .alignment(ratatui::layout::Alignment::Center);
    f.render_widget(status, area);
}
