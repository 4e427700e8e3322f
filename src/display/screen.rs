use super::{DisplayError, DisplaySink};

/// In-memory character buffer with the geometry of a real display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    cols: u8,
    lines: Vec<Vec<char>>,
}

impl Screen {
    pub fn new(cols: u8, rows: u8) -> Self {
        Self {
            cols,
            lines: vec![vec![' '; cols.into()]; rows.into()],
        }
    }

    /// Content of `row`, always exactly as wide as the screen.
    pub fn line(&self, row: usize) -> Option<String> {
        self.lines.get(row).map(|line| line.iter().collect())
    }

    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.lines.iter().map(|line| line.iter().collect())
    }
}

impl DisplaySink for Screen {
    fn clear(&mut self) -> Result<(), DisplayError> {
        for line in &mut self.lines {
            line.fill(' ');
        }
        Ok(())
    }

    fn write(&mut self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        let cols = self.cols;
        let line = self
            .lines
            .get_mut(usize::from(row))
            .filter(|_| col < cols)
            .ok_or(DisplayError::InvalidCoordinates { row, col })?;

        let len = text.chars().count();
        if usize::from(col) + len > usize::from(cols) {
            return Err(DisplayError::Overflow {
                col,
                len,
                width: cols,
            });
        }

        for (cell, ch) in line[usize::from(col)..].iter_mut().zip(text.chars()) {
            *cell = ch;
        }
        Ok(())
    }

    fn dimensions(&self) -> (u8, u8) {
        (self.cols, self.lines.len() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_blank() {
        let screen = Screen::new(4, 2);
        assert_eq!(screen.lines().collect::<Vec<_>>(), ["    ", "    "]);
        assert_eq!(screen.dimensions(), (4, 2));
    }

    #[test]
    fn writes_at_the_cursor() {
        let mut screen = Screen::new(6, 2);
        screen.write(1, 2, "Hi").unwrap();
        assert_eq!(screen.line(1).unwrap(), "  Hi  ");

        screen.write(1, 0, "Yo").unwrap();
        assert_eq!(screen.line(1).unwrap(), "YoHi  ");

        screen.clear().unwrap();
        assert_eq!(screen.line(1).unwrap(), "      ");
    }

    #[test]
    fn rejects_writes_outside_the_display() {
        let mut screen = Screen::new(4, 2);

        assert!(matches!(
            screen.write(2, 0, "x"),
            Err(DisplayError::InvalidCoordinates { row: 2, col: 0 })
        ));
        assert!(matches!(
            screen.write(0, 4, "x"),
            Err(DisplayError::InvalidCoordinates { row: 0, col: 4 })
        ));
        assert!(matches!(
            screen.write(0, 1, "four"),
            Err(DisplayError::Overflow { col: 1, len: 4, width: 4 })
        ));
        assert_eq!(screen.line(0).unwrap(), "    ");
    }
}
