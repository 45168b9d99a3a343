use crate::app::state::App;
use crossterm::event::KeyCode;

pub fn handle_help_toggle(app: &mut App, key: KeyCode) -> bool {
    let search_typing = app.search.active && matches!(key, KeyCode::Char('?'));
    if key == KeyCode::F(1) || (key == KeyCode::Char('?') && !search_typing) {
        app.show_help = !app.show_help;
        return true;
    }

    if app.show_help {
        if matches!(key, KeyCode::Esc | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return true;
    }

    false
}
