use crate::app::App;
use crate::ui::widgets::charts::render_placeholder;
use crate::ui::widgets::map::render_map;
use crate::ui::widgets::tables::visible_window;
use crop_forecast_viewer::render::{Choropleth, Rgb};
use crop_forecast_viewer::session::{ForecastExplorer, SelectorField};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

pub struct ForecastsLayout {
    pub selectors: Rect,
    pub map: Rect,
    pub legend: Rect,
    pub table: Rect,
}

pub fn layout(area: Rect) -> ForecastsLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(8)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(rows[1]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(5)])
        .split(columns[1]);

    ForecastsLayout {
        selectors: rows[0],
        map: columns[0],
        legend: side[0],
        table: side[1],
    }
}

const fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

pub fn render_forecasts(app: &App, f: &mut Frame<'_>, area: Rect) {
    let areas = layout(area);
    let explorer = &app.forecasts;

    render_selectors(app, f, areas.selectors);

    let artifact = explorer.artifact.as_deref();
    let title = artifact.map_or_else(
        || "Historical Forecasts".to_string(),
        |artifact| {
            format!(
                "{} - {} {} {} ({}, lead {})",
                artifact.metric.label(),
                artifact.selection.country,
                artifact.selection.season,
                artifact.selection.year,
                artifact.selection.model,
                artifact.selection.lead
            )
        },
    );
    render_map(
        f,
        areas.map,
        &title,
        app.viewport(),
        app.dataset.boundaries(),
        Color::DarkGray,
        |feature| {
            let cell = artifact.and_then(|artifact| artifact.cell(&feature.fnid));
            Some(cell.map_or(Color::DarkGray, |cell| to_color(cell.color)))
        },
    );

    if let Some(notice) = explorer.notice() {
        render_placeholder(f, areas.legend, "Legend", &notice.to_string(), Color::Yellow);
    } else if let Some(artifact) = artifact {
        render_legend(f, areas.legend, artifact, is_stale(explorer));
    } else {
        render_placeholder(
            f,
            areas.legend,
            "Legend",
            "Press Enter to Update Map",
            Color::Cyan,
        );
    }

    match artifact {
        Some(artifact) if !artifact.is_empty() => render_cells(f, areas.table, artifact),
        _ => f.render_widget(
            Block::default().title("Regions").borders(Borders::ALL),
            areas.table,
        ),
    }
}

/// The selectors moved since the map was last drawn
fn is_stale(explorer: &ForecastExplorer) -> bool {
    explorer.artifact.as_ref().is_some_and(|artifact| {
        artifact.metric != explorer.metric
            || explorer.selection().as_ref() != Some(&artifact.selection)
    })
}

fn selector_value(explorer: &ForecastExplorer, field: SelectorField) -> String {
    let value = match field {
        SelectorField::Metric => Some(explorer.metric.label().to_string()),
        SelectorField::Country => explorer.options.country.clone(),
        SelectorField::Season => explorer.options.season.clone(),
        SelectorField::Year => explorer.year.map(|year| year.to_string()),
        SelectorField::Model => explorer.model.clone(),
        SelectorField::Lead => explorer.lead.map(|lead| lead.to_string()),
    };
    value.unwrap_or_else(|| "-".to_string())
}

fn render_selectors(app: &App, f: &mut Frame<'_>, area: Rect) {
    let boxes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 6); 6])
        .split(area);

    for (field, rect) in SelectorField::ALL.iter().zip(boxes.iter()) {
        let focused = *field == app.selector_field;
        let border = if focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let text = if focused {
            format!("◀ {} ▶", selector_value(&app.forecasts, *field))
        } else {
            selector_value(&app.forecasts, *field)
        };

        let widget = Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title(field.label())
                    .borders(Borders::ALL)
                    .border_style(border),
            );
        f.render_widget(widget, *rect);
    }
}

fn render_legend(f: &mut Frame<'_>, area: Rect, artifact: &Choropleth, stale: bool) {
    let mut lines = Vec::new();
    if let Some(scale) = &artifact.scale {
        for (value, color) in scale.legend(5).into_iter().rev() {
            lines.push(TextLine::from(vec![
                Span::styled("████ ", Style::default().fg(to_color(color))),
                Span::raw(format!("{value:.2} {}", scale.unit)),
            ]));
        }
    }
    if stale {
        lines.push(TextLine::from(Span::styled(
            "Press Enter to Update Map",
            Style::default().fg(Color::Cyan),
        )));
    }

    let title = artifact
        .scale
        .as_ref()
        .map_or_else(|| artifact.metric.label().to_string(), |scale| scale.title.clone());
    let legend = Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(legend, area);
}

fn render_cells(f: &mut Frame<'_>, area: Rect, artifact: &Choropleth) {
    let unit = artifact.metric.unit();
    let visible_rows = area.height.saturating_sub(3) as usize;
    let window = visible_window(artifact.cells.len(), visible_rows, 0);

    let rows: Vec<Row<'_>> = artifact.cells[window]
        .iter()
        .map(|cell| {
            Row::new(vec![
                Cell::from(Span::styled("■", Style::default().fg(to_color(cell.color)))),
                Cell::from(cell.admin1.clone()),
                Cell::from(format!("{:.2} {unit}", cell.value)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Min(10),
            Constraint::Length(14),
        ],
    )
    .header(
        Row::new(vec!["", "Region", "Value"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    )
    .block(
        Block::default()
            .title(format!("Regions ({})", artifact.cells.len()))
            .borders(Borders::ALL),
    );
    f.render_widget(table, area);
}
