use std::io::{self, Write};

use super::{DisplayError, DisplaySink, Screen};

/// Mirrors a character display on the terminal, printing one line per change
/// so log output on the same terminal does not tear it apart.
pub struct ConsoleDisplay<W = io::Stdout> {
    screen: Screen,
    shown: Option<Screen>,
    out: W,
}

impl ConsoleDisplay {
    pub fn new(cols: u8, rows: u8) -> Self {
        Self::with_writer(cols, rows, io::stdout())
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn with_writer(cols: u8, rows: u8, out: W) -> Self {
        Self {
            screen: Screen::new(cols, rows),
            shown: None,
            out,
        }
    }

    fn redraw(&mut self) -> Result<(), DisplayError> {
        if self.shown.as_ref() == Some(&self.screen) {
            return Ok(());
        }

        let rows = self
            .screen
            .lines()
            .map(|line| format!("[{line}]"))
            .collect::<Vec<_>>()
            .join(" ");

        writeln!(self.out, "{rows}")?;
        self.out.flush()?;

        self.shown = Some(self.screen.clone());
        Ok(())
    }
}

impl<W: Write> DisplaySink for ConsoleDisplay<W> {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.screen.clear()?;
        self.redraw()
    }

    fn write(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        self.screen.write(row, col, text)?;
        self.redraw()
    }

    fn dimensions(&self) -> (u8, u8) {
        self.screen.dimensions()
    }
}
