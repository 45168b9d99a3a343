use crop_forecast_viewer::data::MapFeature;
use crop_forecast_viewer::selector::Viewport;
use geo::{BoundingRect, LineString};
use ratatui::layout::{Margin, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Context, Line as CanvasLine};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

/// Draw boundary outlines inside a bordered block.
///
/// `color_of` returns `None` for features that should not be drawn. Features
/// colored anything but `base` are drawn last so they sit on top.
pub fn render_map(
    f: &mut Frame<'_>,
    area: Rect,
    title: &str,
    viewport: Viewport,
    features: &[MapFeature],
    base: Color,
    color_of: impl Fn(&MapFeature) -> Option<Color>,
) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(block, area);

    let canvas_area = area.inner(Margin::new(1, 1));
    if canvas_area.width == 0 || canvas_area.height == 0 {
        return;
    }

    let visible: Vec<(&MapFeature, Color)> = features
        .iter()
        .filter(|feature| in_view(feature, viewport))
        .filter_map(|feature| color_of(feature).map(|color| (feature, color)))
        .collect();

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds(viewport.lon)
        .y_bounds(viewport.lat)
        .paint(|ctx| {
            for (feature, color) in visible.iter().filter(|(_, color)| *color == base) {
                draw_feature(ctx, feature, *color);
            }
            ctx.layer();
            for (feature, color) in visible.iter().filter(|(_, color)| *color != base) {
                draw_feature(ctx, feature, *color);
            }
        });

    f.render_widget(canvas, canvas_area);
}

fn in_view(feature: &MapFeature, viewport: Viewport) -> bool {
    feature.geometry.bounding_rect().is_some_and(|rect| {
        rect.max().x >= viewport.lon[0]
            && rect.min().x <= viewport.lon[1]
            && rect.max().y >= viewport.lat[0]
            && rect.min().y <= viewport.lat[1]
    })
}

fn draw_feature(ctx: &mut Context<'_>, feature: &MapFeature, color: Color) {
    for polygon in &feature.geometry {
        draw_ring(ctx, polygon.exterior(), color);
        for interior in polygon.interiors() {
            draw_ring(ctx, interior, color);
        }
    }
}

fn draw_ring(ctx: &mut Context<'_>, ring: &LineString<f64>, color: Color) {
    for line in ring.lines() {
        ctx.draw(&CanvasLine {
            x1: line.start.x,
            y1: line.start.y,
            x2: line.end.x,
            y2: line.end.y,
            color,
        });
    }
}
