//! Terminal front-end for the RFID inventory client.

pub mod config;
pub mod input;
pub mod render;

pub use config::{ConsoleConfig, ConsoleConfigError};
pub use input::{ConsoleInput, parse_input};
pub use render::render_view;
