use crate::app::state::App;
use crop_forecast_viewer::session::Notice;
use crossterm::event::KeyCode;

pub fn handle_forecasts_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.focus_selector(false),
        KeyCode::Down | KeyCode::Char('j') => app.focus_selector(true),
        KeyCode::Left | KeyCode::Char('h') => app.step_selector(false),
        KeyCode::Right | KeyCode::Char('l') => app.step_selector(true),
        KeyCode::Enter | KeyCode::Char('u') => {
            if app.forecasts.is_halted() {
                app.status_message = Notice::NoForecastYears.to_string();
            } else {
                app.update_forecast_map();
            }
        }
        _ => {}
    }
}
