//! Character display abstraction.
//!
//! The renderer only talks to a [`DisplaySink`]; it is responsible for keeping
//! every write within the geometry reported by [`DisplaySink::dimensions`].

mod console;
mod screen;

use std::io;

use thiserror::Error;

pub use console::ConsoleDisplay;
pub use screen::Screen;

#[derive(Debug, Error)]
pub enum DisplayError {
    /// Communication error with the display
    #[error("failed to talk to the display: {0}")]
    Communication(#[from] io::Error),
    /// Row or column outside the display
    #[error("position ({row}, {col}) is outside the display")]
    InvalidCoordinates { row: u8, col: u8 },
    /// Text runs past the last column
    #[error("{len} characters at column {col} overflow a {width} column display")]
    Overflow { col: u8, len: usize, width: u8 },
}

/// A cursor-addressed character display.
pub trait DisplaySink {
    /// Blank the entire display
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Draw `text` starting at `row` and `col` (both 0-based)
    fn write(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError>;

    /// Returns (columns, rows) in character units
    fn dimensions(&self) -> (u8, u8);
}
