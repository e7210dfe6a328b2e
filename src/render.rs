//! Differential terminal renderer.
//!
//! Tracks the bar height last drawn per column and emits only the cells that
//! changed, via cursor-positioned writes. The previous-heights array must
//! mirror the on-screen state exactly; that invariant is the whole
//! correctness contract. No full-frame clears, no cursor save/restore.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Print;

use crate::constants::BAR_GLYPH;

pub struct DiffRenderer<W: Write> {
    out: W,
    prev_heights: Vec<u16>,
    prev_display_height: u16,
}

impl<W: Write> DiffRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            prev_heights: Vec::new(),
            prev_display_height: 0,
        }
    }

    /// Draw one frame of bar heights. `height` is the number of rows the
    /// bars may occupy; column `x`'s bar grows upward from row `height`.
    ///
    /// A geometry change (width or height) resets the previous heights to
    /// zero, so the next frame repaints every live column from the bottom
    /// up. Cells beyond a shrunken display are left untouched on screen;
    /// diffing stale heights against new rows would address cells that no
    /// longer exist.
    pub fn draw(&mut self, heights: &[u16], height: u16) -> io::Result<()> {
        if self.prev_heights.len() != heights.len() || self.prev_display_height != height {
            self.prev_heights.clear();
            self.prev_heights.resize(heights.len(), 0);
            self.prev_display_height = height;
        }

        for (x, (&h, prev)) in heights.iter().zip(self.prev_heights.iter_mut()).enumerate() {
            if h > *prev {
                for y in *prev..h {
                    queue!(self.out, MoveTo(x as u16, height - y), Print(BAR_GLYPH))?;
                }
            } else {
                for y in h..*prev {
                    queue!(self.out, MoveTo(x as u16, height - y), Print(' '))?;
                }
            }
            *prev = h;
        }
        self.out.flush()
    }

    /// Park the cursor below the display area so shutdown output does not
    /// land inside the bars.
    pub fn park_cursor(&mut self, rows: u16) -> io::Result<()> {
        queue!(self.out, MoveTo(0, rows.saturating_sub(1)))?;
        self.out.flush()
    }

    #[cfg(test)]
    pub fn prev_heights(&self) -> &[u16] {
        &self.prev_heights
    }

    #[cfg(test)]
    pub fn sink(&self) -> &W {
        &self.out
    }

    #[cfg(test)]
    pub fn sink_mut(&mut self) -> &mut W {
        &mut self.out
    }
}
