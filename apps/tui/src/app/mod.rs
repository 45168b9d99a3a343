// App module for the crop forecast viewer
// Holds session state and turns key/mouse input into view transitions

pub mod input;
pub mod state;

pub use input::{handle_input, handle_mouse};
pub use state::App;
