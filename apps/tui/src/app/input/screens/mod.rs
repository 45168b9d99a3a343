use crate::app::state::App;
use crop_forecast_viewer::Page;
use crossterm::event::KeyCode;

mod forecasts;
mod help;
mod regions;

pub fn dispatch_input(app: &mut App, key: KeyCode) {
    if help::handle_help_toggle(app, key) {
        return;
    }

    // Typing into the search box takes every key
    if app.page == Page::YieldClimate && app.search.active {
        regions::handle_search_input(app, key);
        return;
    }

    if handle_global_input(app, key) {
        return;
    }

    match app.page {
        Page::YieldClimate => regions::handle_regions_input(app, key),
        Page::HistoricalForecasts => forecasts::handle_forecasts_input(app, key),
    }
}

fn handle_global_input(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Tab | KeyCode::BackTab => app.switch_page(),
        KeyCode::Char('R') => {
            app.request_reload();
        }
        _ => return false,
    }
    true
}
