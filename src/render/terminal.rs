//! Terminal backend trait.
//!
//! The toolkit only ever talks to the screen through this trait: cells go
//! in with a character and an attribute byte, key codes come out. Drawing
//! calls may buffer; nothing has to reach the real terminal before
//! [`Terminal::flush`].

use std::io;
use std::time::Duration;

use unicode_width::UnicodeWidthChar;

use crate::event::{Modifiers, MouseButton};
use crate::types::{Point, Rect, Size};

/// One unit of backend input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// A curses-compatible key code (see [`crate::event::codes`]).
    Key(i32),
    /// Mouse press at screen coordinates.
    Mouse {
        button: MouseButton,
        clicks: u8,
        position: Point,
        modifiers: Modifiers,
    },
    /// The screen changed size.
    Resize(Size),
}

pub trait Terminal {
    /// Write one cell. Cells outside the screen are ignored.
    fn draw_char(&mut self, x: i32, y: i32, ch: char, attr: u8);

    /// Write a string starting at (x, y). Wide characters advance two
    /// columns; zero-width characters are dropped.
    fn draw_string(&mut self, x: i32, y: i32, text: &str, attr: u8) {
        let mut column = x;
        for ch in text.chars() {
            let width = ch.width().unwrap_or(0) as i32;
            if width == 0 {
                continue;
            }
            self.draw_char(column, y, ch, attr);
            column += width;
        }
    }

    /// Repeat `ch` over `length` cells, rightwards or downwards.
    fn draw_line(&mut self, x: i32, y: i32, length: i32, horizontal: bool, ch: char, attr: u8) {
        for i in 0..length.max(0) {
            if horizontal {
                self.draw_char(x + i, y, ch, attr);
            } else {
                self.draw_char(x, y + i, ch, attr);
            }
        }
    }

    fn fill_box(&mut self, area: Rect, ch: char, attr: u8) {
        for row in area.y..area.bottom() {
            self.draw_line(area.x, row, area.width, true, ch, attr);
        }
    }

    fn set_cursor(&mut self, x: i32, y: i32);

    fn set_cursor_visible(&mut self, visible: bool);

    fn screen_size(&self) -> Size;

    /// Push everything drawn since the last flush to the screen.
    fn flush(&mut self) -> io::Result<()>;

    /// Wait up to `timeout` (forever with `None`) for a key.
    fn poll_key(&mut self, timeout: Option<Duration>) -> io::Result<Option<i32>>;

    /// Wait for any input. Backends without mouse or resize reporting only
    /// deliver keys.
    fn poll_input(&mut self, timeout: Option<Duration>) -> io::Result<Option<Input>> {
        Ok(self.poll_key(timeout)?.map(Input::Key))
    }
}
