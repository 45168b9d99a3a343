use crate::app::App;
use crate::ui::widgets::charts::{render_line_chart, render_placeholder};
use crate::ui::widgets::map::render_map;
use crate::ui::widgets::tables::visible_window;
use crop_forecast_viewer::session::{Notice, RegionExplorer, SelectedRegion};
use crop_forecast_viewer::EoVariable;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Tabs};
use ratatui::Frame;

pub struct RegionsLayout {
    pub map: Rect,
    pub search: Option<Rect>,
    pub side: Rect,
}

pub fn layout(app: &App, area: Rect) -> RegionsLayout {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    if !app.search.active {
        return RegionsLayout {
            map: columns[0],
            search: None,
            side: columns[1],
        };
    }

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(10)])
        .split(columns[0]);
    RegionsLayout {
        map: left[0],
        search: Some(left[1]),
        side: columns[1],
    }
}

pub fn render_regions(app: &App, f: &mut Frame<'_>, area: Rect) {
    let areas = layout(app, area);

    let selected_fnid = app.regions.selected().map(|s| s.region.fnid.as_str());
    render_map(
        f,
        areas.map,
        "Click a region to view EO and crop data",
        app.viewport(),
        app.dataset.boundaries(),
        Color::Gray,
        |feature| {
            Some(if Some(feature.fnid.as_str()) == selected_fnid {
                Color::Yellow
            } else {
                Color::Gray
            })
        },
    );

    if let Some(search_area) = areas.search {
        render_search(app, f, search_area);
    }

    match &app.regions {
        RegionExplorer::NoSelection { notice } => render_notice(f, areas.side, notice),
        RegionExplorer::Selected(selected) => render_selected(f, areas.side, selected),
    }
}

fn render_notice(f: &mut Frame<'_>, area: Rect, notice: &Notice) {
    let color = if notice.is_warning() {
        Color::Yellow
    } else {
        Color::Cyan
    };
    render_placeholder(f, area, "Region", &notice.to_string(), color);
}

fn render_selected(f: &mut Frame<'_>, area: Rect, selected: &SelectedRegion) {
    let picker_height = if selected.data.has_eo() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Banner
            Constraint::Length(picker_height), // EO variable picker
            Constraint::Min(6),                // Yield chart
            Constraint::Min(6),                // EO chart
        ])
        .split(area);

    let banner = Paragraph::new(Span::styled(
        selected.banner(),
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)),
    );
    f.render_widget(banner, chunks[0]);

    if selected.data.has_eo() {
        render_variable_picker(f, chunks[1], selected.variable);
    }

    match &selected.yield_chart {
        Some(chart) => render_line_chart(f, chunks[2], chart, Color::Green),
        None => render_placeholder(
            f,
            chunks[2],
            "Maize Yield Over Time",
            &Notice::NoYieldData.to_string(),
            Color::Yellow,
        ),
    }

    match &selected.eo_chart {
        Some(chart) => render_line_chart(f, chunks[3], chart, Color::Rgb(0, 0, 238)),
        None => render_placeholder(
            f,
            chunks[3],
            "EO Predictor",
            &Notice::NoEoData.to_string(),
            Color::Yellow,
        ),
    }
}

fn render_variable_picker(f: &mut Frame<'_>, area: Rect, variable: EoVariable) {
    let titles = EoVariable::ALL
        .iter()
        .map(|var| TextLine::from(var.as_str()))
        .collect::<Vec<_>>();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title("Select EO variables to plot (←/→)")
                .borders(Borders::ALL),
        )
        .select(variable.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Rgb(0, 0, 238))
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw("|"));

    f.render_widget(tabs, area);
}

fn render_search(app: &App, f: &mut Frame<'_>, area: Rect) {
    let regions = app.dataset.regions();
    let visible_rows = area.height.saturating_sub(2) as usize;
    let window = visible_window(app.search.results.len(), visible_rows, app.search.selected);

    let items: Vec<ListItem<'_>> = app.search.results[window.clone()]
        .iter()
        .zip(window)
        .filter_map(|(&index, row)| {
            let region = regions.get(index)?;
            let style = if row == app.search.selected {
                Style::default()
                    .bg(Color::Rgb(0, 0, 238))
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Some(ListItem::new(region.search_label()).style(style))
        })
        .collect();

    let title = format!(
        "Search: {}_ ({} matches)",
        app.search.query,
        app.search.results.len()
    );
    let list = List::new(items).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(list, area);
}
