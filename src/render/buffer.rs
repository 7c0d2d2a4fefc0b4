//! In-memory terminal backend.
//!
//! A 2D grid of cells behind a shared handle. Clones see the same screen,
//! so a test can hand one clone to the toolkit and inspect (or feed keys
//! through) another.
//!
//! # Design Decisions
//!
//! - **Flat storage**: `Vec<Cell>` with row-major indexing (`y * width + x`).
//! - **Scripted input**: keys and mouse presses are queued with
//!   [`MemoryTerminal::push_key`] and friends and handed out by
//!   `poll_input` in order.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use super::terminal::{Input, Terminal};
use crate::event::{Modifiers, MouseButton};
use crate::types::{ColorPair, Point, Size};

/// One screen cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub attr: u8,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            attr: ColorPair::default().attribute(),
        }
    }
}

struct Screen {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    cursor: Point,
    cursor_visible: bool,
    input: VecDeque<Input>,
    flushes: usize,
}

impl Screen {
    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        (x >= 0 && y >= 0 && x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }
}

#[derive(Clone)]
pub struct MemoryTerminal {
    screen: Arc<Mutex<Screen>>,
}

impl MemoryTerminal {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            screen: Arc::new(Mutex::new(Screen {
                width,
                height,
                cells: vec![Cell::default(); (width * height) as usize],
                cursor: Point::ORIGIN,
                cursor_visible: false,
                input: VecDeque::new(),
                flushes: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Screen> {
        self.screen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        let screen = self.lock();
        screen.index(x, y).map(|i| screen.cells[i])
    }

    /// Characters of row `y`.
    pub fn row(&self, y: i32) -> String {
        let screen = self.lock();
        (0..screen.width)
            .filter_map(|x| screen.index(x, y).map(|i| screen.cells[i].ch))
            .collect()
    }

    /// `length` characters starting at (x, y).
    pub fn text_at(&self, x: i32, y: i32, length: usize) -> String {
        let screen = self.lock();
        (x..x + length as i32)
            .filter_map(|cx| screen.index(cx, y).map(|i| screen.cells[i].ch))
            .collect()
    }

    /// Whole screen, one line per row.
    pub fn contents(&self) -> String {
        let height = self.lock().height;
        (0..height).map(|y| self.row(y)).collect::<Vec<_>>().join("\n")
    }

    /// Cursor position, or `None` while hidden.
    pub fn cursor(&self) -> Option<Point> {
        let screen = self.lock();
        screen.cursor_visible.then_some(screen.cursor)
    }

    pub fn flush_count(&self) -> usize {
        self.lock().flushes
    }

    pub fn push_key(&self, code: i32) {
        self.lock().input.push_back(Input::Key(code));
    }

    /// Queue every character of `text` as a key.
    pub fn push_keys(&self, text: &str) {
        let mut screen = self.lock();
        screen
            .input
            .extend(text.chars().map(|ch| Input::Key(ch as i32)));
    }

    pub fn push_click(&self, x: i32, y: i32) {
        self.lock().input.push_back(Input::Mouse {
            button: MouseButton::Left,
            clicks: 1,
            position: Point::new(x, y),
            modifiers: Modifiers::empty(),
        });
    }

    /// Change the screen size (contents are cleared) and report it as
    /// input.
    pub fn resize(&self, width: i32, height: i32) {
        let mut screen = self.lock();
        screen.width = width.max(0);
        screen.height = height.max(0);
        let count = (screen.width * screen.height) as usize;
        screen.cells = vec![Cell::default(); count];
        let size = Size::new(screen.width, screen.height);
        screen.input.push_back(Input::Resize(size));
    }

    pub fn pending_input(&self) -> usize {
        self.lock().input.len()
    }
}

impl Terminal for MemoryTerminal {
    fn draw_char(&mut self, x: i32, y: i32, ch: char, attr: u8) {
        let mut screen = self.lock();
        if let Some(i) = screen.index(x, y) {
            screen.cells[i] = Cell { ch, attr };
        }
    }

    fn set_cursor(&mut self, x: i32, y: i32) {
        self.lock().cursor = Point::new(x, y);
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.lock().cursor_visible = visible;
    }

    fn screen_size(&self) -> Size {
        let screen = self.lock();
        Size::new(screen.width, screen.height)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().flushes += 1;
        Ok(())
    }

    fn poll_key(&mut self, timeout: Option<Duration>) -> io::Result<Option<i32>> {
        loop {
            match self.poll_input(timeout)? {
                Some(Input::Key(code)) => return Ok(Some(code)),
                Some(_) => continue,
                None => return Ok(None),
            }
        }
    }

    /// Scripted input never blocks for long: with nothing queued it sleeps
    /// for the timeout (capped) and reports nothing.
    fn poll_input(&mut self, timeout: Option<Duration>) -> io::Result<Option<Input>> {
        if let Some(input) = self.lock().input.pop_front() {
            return Ok(Some(input));
        }
        let nap = timeout.unwrap_or(Duration::from_millis(5)).min(Duration::from_millis(5));
        thread::sleep(nap);
        Ok(self.lock().input.pop_front())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Color, Rect};

    fn setup() -> MemoryTerminal {
        MemoryTerminal::new(10, 3)
    }

    #[test]
    fn test_draw_and_read_back() {
        let mut term = setup();
        term.draw_string(2, 1, "hey", 0x17);
        assert_eq!(term.text_at(2, 1, 3), "hey");
        assert_eq!(term.cell(2, 1), Some(Cell { ch: 'h', attr: 0x17 }));
        assert_eq!(term.row(1), "  hey     ");
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut term = setup();
        term.draw_char(-1, 0, 'x', 0);
        term.draw_char(10, 0, 'x', 0);
        term.draw_char(0, 3, 'x', 0);
        assert_eq!(term.contents(), "          \n          \n          ");
    }

    #[test]
    fn test_wide_chars_advance_two_columns() {
        let mut term = setup();
        term.draw_string(0, 0, "日a", 0);
        assert_eq!(term.cell(0, 0).unwrap().ch, '日');
        assert_eq!(term.cell(2, 0).unwrap().ch, 'a');
    }

    #[test]
    fn test_fill_box() {
        let mut term = setup();
        let attr = ColorPair::new(Color::Black, Color::Cyan).attribute();
        term.fill_box(Rect::new(1, 1, 3, 2), '#', attr);
        assert_eq!(term.row(1), " ###      ");
        assert_eq!(term.row(2), " ###      ");
        assert_eq!(term.cell(1, 1).unwrap().attr, attr);
    }

    #[test]
    fn test_scripted_keys_in_order() {
        let mut term = setup();
        term.push_keys("ab");
        term.push_click(1, 1);
        term.push_key(27);
        let other = term.clone();
        assert_eq!(other.pending_input(), 4);

        assert_eq!(term.poll_key(None).unwrap(), Some('a' as i32));
        assert_eq!(term.poll_key(None).unwrap(), Some('b' as i32));
        // The click is skipped by poll_key
        assert_eq!(term.poll_key(None).unwrap(), Some(27));
        assert_eq!(term.poll_key(Some(Duration::ZERO)).unwrap(), None);
    }

    #[test]
    fn test_resize_clears_and_reports_size() {
        let mut term = setup();
        term.draw_string(0, 0, "hey", 0);
        term.resize(4, 2);

        assert_eq!(term.screen_size(), Size::new(4, 2));
        assert_eq!(term.contents(), "    \n    ");
        assert!(matches!(
            term.poll_input(None).unwrap(),
            Some(Input::Resize(size)) if size == Size::new(4, 2)
        ));
    }

    #[test]
    fn test_cursor_hidden_by_default() {
        let mut term = setup();
        assert_eq!(term.cursor(), None);
        term.set_cursor(3, 2);
        term.set_cursor_visible(true);
        assert_eq!(term.cursor(), Some(Point::new(3, 2)));
    }
}
