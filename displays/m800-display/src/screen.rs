//! Screen buffer
//!
//! A character buffer the size of the display. Writers fill lines; the
//! buffer is pushed to a [`DisplayBackend`] only when something changed.

use heapless::String;

use crate::backend::{DisplayBackend, DisplayError};

/// Number of character rows
pub const SCREEN_ROWS: usize = 4;

/// Number of character columns
pub const SCREEN_COLS: usize = 20;

/// Text-mode screen buffer
#[derive(Clone)]
pub struct Screen {
    lines: [String<SCREEN_COLS>; SCREEN_ROWS],
    dirty: bool,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    /// Create a new empty screen
    pub fn new() -> Self {
        Self {
            lines: core::array::from_fn(|_| String::new()),
            dirty: true,
        }
    }

    /// Clear the entire screen
    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
        self.dirty = true;
    }

    /// Set the content of a row, truncated to the screen width
    ///
    /// Out-of-range rows are ignored. Writing the text a row already shows
    /// does not dirty the screen.
    pub fn set_line(&mut self, row: usize, text: &str) {
        let Some(line) = self.lines.get_mut(row) else {
            return;
        };
        let end = text
            .char_indices()
            .nth(SCREEN_COLS)
            .map_or(text.len(), |(i, _)| i);
        let text = &text[..end];
        if line.as_str() == text {
            return;
        }
        line.clear();
        // fits: at most SCREEN_COLS chars, all ASCII in practice
        let _ = line.push_str(text);
        self.dirty = true;
    }

    /// Get the content of a specific row
    pub fn get_line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(|s| s.as_str())
    }

    /// Get all lines as an iterator
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|s| s.as_str())
    }

    /// Check if screen needs redrawing
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Force the next [`Screen::render_to`] to redraw
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Draw the buffer if it changed since the last render
    ///
    /// Returns whether anything was drawn. On error the screen stays dirty
    /// so the next call retries.
    pub fn render_to<B: DisplayBackend>(&mut self, backend: &mut B) -> Result<bool, DisplayError> {
        if !self.dirty {
            return Ok(false);
        }
        if !backend.is_ready() {
            return Err(DisplayError::NotInitialized);
        }

        let (cols, rows) = backend.dimensions();
        if usize::from(cols) < SCREEN_COLS || usize::from(rows) < SCREEN_ROWS {
            return Err(DisplayError::InvalidCoordinates);
        }

        backend.clear()?;
        for (row, line) in (0u8..).zip(self.lines.iter()) {
            if !line.is_empty() {
                backend.draw_text(row, 0, line)?;
            }
        }
        backend.flush()?;
        self.dirty = false;
        Ok(true)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Screen {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Screen[");
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                defmt::write!(f, ", ");
            }
            defmt::write!(f, "{}", line.as_str());
        }
        defmt::write!(f, "]");
    }
}
