//! Plain-text rendering with ASCII-art tables.

mod config;
mod table;
mod text;

pub use config::TextOptions;
pub use table::{LayoutCell, TableLayout, display_width};
pub use text::{TextRenderer, render_to_string};
