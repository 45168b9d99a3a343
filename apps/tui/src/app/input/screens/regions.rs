use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_regions_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char('/' | 's') => app.start_search(),
        KeyCode::Left | KeyCode::Char('[') => app.select_variable(false),
        KeyCode::Right | KeyCode::Char(']') => app.select_variable(true),
        KeyCode::Esc => {
            app.click_region(None);
            app.hover = None;
        }
        _ => {}
    }
}

pub fn handle_search_input(app: &mut App, key: KeyCode) {
    let total = app.search.results.len();
    match key {
        KeyCode::Esc => app.search.close(),
        KeyCode::Enter => app.pick_search_result(),
        KeyCode::Up => {
            app.search.selected = app.search.selected.saturating_sub(1);
        }
        KeyCode::Down => {
            if app.search.selected + 1 < total {
                app.search.selected += 1;
            }
        }
        KeyCode::PageUp => {
            app.search.selected = app.search.selected.saturating_sub(5);
        }
        KeyCode::PageDown => {
            if total > 0 {
                app.search.selected = (app.search.selected + 5).min(total - 1);
            }
        }
        KeyCode::Backspace => {
            app.search.query.pop();
            app.search.selected = 0;
            app.refresh_search();
        }
        KeyCode::Char(ch) => {
            app.search.query.push(ch);
            app.search.selected = 0;
            app.refresh_search();
        }
        _ => {}
    }
}
