use crate::app::App;
use crate::ui::widgets::popup::centered_rect;
use crop_forecast_viewer::config::DataPaths;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

pub fn render_help_popup(app: &App, f: &mut Frame<'_>) {
    let popup_area = centered_rect(70, 80, f.area());
    f.render_widget(Clear, popup_area);

    let help_block = Block::default()
        .title("== Help & Keyboard Shortcuts ==")
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let help_paragraph = Paragraph::new(Text::from(build_help_lines(&app.paths)))
        .block(help_block)
        .wrap(Wrap { trim: true });
    f.render_widget(help_paragraph, popup_area);

    let hint = Paragraph::new(TextLine::from(Span::styled(
        "Press ? or Esc to close",
        Style::default().fg(Color::Gray),
    )))
    .alignment(Alignment::Center);
    let hint_area = Rect {
        x: popup_area.x,
        y: popup_area.y + popup_area.height.saturating_sub(2),
        width: popup_area.width,
        height: 1,
    };
    f.render_widget(hint, hint_area);
}

fn heading(text: &str) -> TextLine<'static> {
    TextLine::from(Span::styled(
        text.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

fn shortcut(key: &str, description: &str) -> TextLine<'static> {
    TextLine::from(vec![
        Span::styled(
            format!("  {key}"),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" - {description}")),
    ])
}

fn build_help_lines(paths: &DataPaths) -> Vec<TextLine<'static>> {
    vec![
        TextLine::from(Span::styled(
            "Sub-Saharan Africa Crop Forecast Viewer",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
        TextLine::from(
            "Explore observed maize yield and EO predictors by region, \
             and browse historical forecast error as a map.",
        ),
        TextLine::from(""),
        heading("Everywhere:"),
        shortcut("Tab", "Switch page"),
        shortcut("F1 / ?", "Toggle this help"),
        shortcut("R", "Reload the input files"),
        shortcut("q", "Quit"),
        TextLine::from(""),
        heading("Yield & Climate:"),
        shortcut("Mouse click", "Select the region under the cursor"),
        shortcut("Mouse move", "Show Country / admin1 / admin2"),
        shortcut("/", "Search regions by name or fnid"),
        shortcut("←/→", "Change the EO variable"),
        shortcut("Esc", "Clear the selection"),
        TextLine::from(""),
        heading("Historical Forecasts:"),
        shortcut("↑/↓", "Move between selectors"),
        shortcut("←/→", "Change the focused selector"),
        shortcut("Enter / u", "Update Map"),
        shortcut("Mouse move", "Show the value of a colored region"),
        TextLine::from(""),
        heading("Data files:"),
        TextLine::from(format!("  {}", paths.eo.display())),
        TextLine::from(format!("  {}", paths.yields.display())),
        TextLine::from(format!("  {}", paths.forecasts.display())),
        TextLine::from(format!("  {}", paths.regions.display())),
        TextLine::from(format!("  {}", paths.boundaries.display())),
    ]
}
