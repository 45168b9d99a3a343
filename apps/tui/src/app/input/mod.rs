pub mod helpers;
pub mod screens;

use crate::app::state::App;
use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

pub fn handle_input(app: &mut App, key: KeyCode) {
    screens::dispatch_input(app, key);
}

/// Route a mouse event; `canvas` is where the current page draws its map.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent, canvas: Rect) {
    if app.show_help {
        return;
    }
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.map_click(canvas, mouse.column, mouse.row);
        }
        MouseEventKind::Moved => {
            app.map_hover(canvas, mouse.column, mouse.row);
        }
        _ => {}
    }
}
