//! Crossterm terminal backend.
//!
//! Draws into a back buffer and, on flush, writes only the cells that
//! differ from the previous frame. After a resize (or on the first flush)
//! the whole screen is written.
//!
//! Entering puts the terminal in raw mode on the alternate screen with
//! mouse capture; dropping the backend restores it.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode,
    KeyEvent as CrosstermKeyEvent, KeyEventKind, KeyModifiers,
    MouseButton as CrosstermMouseButton, MouseEventKind,
};
use crossterm::style::{
    Color as CrosstermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use tracing::{debug, trace};

use super::buffer::Cell;
use super::terminal::{Input, Terminal};
use crate::event::{codes, Modifiers, MouseButton};
use crate::types::{Point, Size, INTENSITY};

pub struct CrosstermTerminal {
    out: Stdout,
    width: i32,
    height: i32,
    back: Vec<Cell>,
    /// Last flushed frame; `None` forces a full redraw.
    front: Option<Vec<Cell>>,
    cursor: Point,
    cursor_visible: bool,
}

impl CrosstermTerminal {
    /// Enter raw mode and the alternate screen.
    pub fn new() -> io::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, Hide, EnableMouseCapture, Clear(ClearType::All))?;
        let (width, height) = terminal::size()?;
        debug!(width, height, "crossterm backend started");
        Ok(Self {
            out,
            width: width as i32,
            height: height as i32,
            back: vec![Cell::default(); width as usize * height as usize],
            front: None,
            cursor: Point::ORIGIN,
            cursor_visible: false,
        })
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.width = width as i32;
        self.height = height as i32;
        self.back = vec![Cell::default(); width as usize * height as usize];
        self.front = None;
        debug!(width, height, "terminal resized");
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        (x >= 0 && y >= 0 && x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    fn restore(&mut self) -> io::Result<()> {
        execute!(self.out, ResetColor, Show, DisableMouseCapture, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }
}

impl Terminal for CrosstermTerminal {
    fn draw_char(&mut self, x: i32, y: i32, ch: char, attr: u8) {
        if let Some(i) = self.index(x, y) {
            self.back[i] = Cell { ch, attr };
        }
    }

    fn set_cursor(&mut self, x: i32, y: i32) {
        self.cursor = Point::new(x, y);
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    fn screen_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut last_attr = None;
        let mut written = 0usize;

        for y in 0..self.height {
            for x in 0..self.width {
                let Some(i) = self.index(x, y) else {
                    continue;
                };
                let cell = self.back[i];
                let changed = match &self.front {
                    Some(front) => front.get(i) != Some(&cell),
                    None => true,
                };
                if !changed {
                    continue;
                }
                if last_attr != Some(cell.attr) {
                    queue!(
                        self.out,
                        SetForegroundColor(color(cell.attr & 0x0F)),
                        SetBackgroundColor(color(cell.attr >> 4))
                    )?;
                    last_attr = Some(cell.attr);
                }
                queue!(self.out, MoveTo(x as u16, y as u16), Print(cell.ch))?;
                written += 1;
            }
        }

        if self.cursor_visible && self.index(self.cursor.x, self.cursor.y).is_some() {
            queue!(self.out, MoveTo(self.cursor.x as u16, self.cursor.y as u16), Show)?;
        } else {
            queue!(self.out, Hide)?;
        }
        self.out.flush()?;

        trace!(cells = written, "flushed frame");
        self.front = Some(self.back.clone());
        Ok(())
    }

    fn poll_key(&mut self, timeout: Option<Duration>) -> io::Result<Option<i32>> {
        match self.poll_input(timeout)? {
            Some(Input::Key(code)) => Ok(Some(code)),
            _ => Ok(None),
        }
    }

    fn poll_input(&mut self, timeout: Option<Duration>) -> io::Result<Option<Input>> {
        if let Some(timeout) = timeout
            && !event::poll(timeout)?
        {
            return Ok(None);
        }
        let input = match event::read()? {
            CrosstermEvent::Key(key) => key_code(key).map(Input::Key),
            CrosstermEvent::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(button) => Some(Input::Mouse {
                    button: mouse_button(button),
                    clicks: 1,
                    position: Point::new(mouse.column as i32, mouse.row as i32),
                    modifiers: modifiers(mouse.modifiers),
                }),
                _ => None,
            },
            CrosstermEvent::Resize(width, height) => {
                self.resize(width, height);
                Some(Input::Resize(Size::new(width as i32, height as i32)))
            }
            _ => None,
        };
        Ok(input)
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            tracing::error!(%err, "failed to restore terminal");
        }
    }
}

// =============================================================================
// CONVERSION
// =============================================================================

/// Attribute nibble to a crossterm colour.
fn color(nibble: u8) -> CrosstermColor {
    let bright = nibble & INTENSITY != 0;
    match (nibble & 0x07, bright) {
        (0, false) => CrosstermColor::Black,
        (1, false) => CrosstermColor::DarkRed,
        (2, false) => CrosstermColor::DarkGreen,
        (3, false) => CrosstermColor::DarkYellow,
        (4, false) => CrosstermColor::DarkBlue,
        (5, false) => CrosstermColor::DarkMagenta,
        (6, false) => CrosstermColor::DarkCyan,
        (_, false) => CrosstermColor::Grey,
        (0, true) => CrosstermColor::DarkGrey,
        (1, true) => CrosstermColor::Red,
        (2, true) => CrosstermColor::Green,
        (3, true) => CrosstermColor::Yellow,
        (4, true) => CrosstermColor::Blue,
        (5, true) => CrosstermColor::Magenta,
        (6, true) => CrosstermColor::Cyan,
        (_, true) => CrosstermColor::White,
    }
}

/// Crossterm key event to a curses-compatible key code. Releases and keys
/// with no code are dropped.
fn key_code(event: CrosstermKeyEvent) -> Option<i32> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    let code = match event.code {
        KeyCode::Char(c)
            if event.modifiers.contains(KeyModifiers::CONTROL) && c.is_ascii_alphabetic() =>
        {
            (c.to_ascii_lowercase() as u8 - b'a' + 1) as i32
        }
        KeyCode::Char(c) => c as i32,
        KeyCode::Enter => codes::LINE_FEED,
        KeyCode::Tab => codes::TAB,
        KeyCode::BackTab => codes::KEY_BACK_TAB,
        KeyCode::Backspace => codes::KEY_BACKSPACE,
        KeyCode::Delete => codes::KEY_DELETE,
        KeyCode::Insert => codes::KEY_INSERT,
        KeyCode::Esc => codes::ESCAPE,
        KeyCode::Up => codes::KEY_UP,
        KeyCode::Down => codes::KEY_DOWN,
        KeyCode::Left => codes::KEY_LEFT,
        KeyCode::Right => codes::KEY_RIGHT,
        KeyCode::Home => codes::KEY_HOME,
        KeyCode::End => codes::KEY_END,
        KeyCode::PageUp => codes::KEY_PAGE_UP,
        KeyCode::PageDown => codes::KEY_PAGE_DOWN,
        KeyCode::F(n) => codes::KEY_F0 + n as i32,
        _ => return None,
    };
    Some(code)
}

fn mouse_button(button: CrosstermMouseButton) -> MouseButton {
    match button {
        CrosstermMouseButton::Left => MouseButton::Left,
        CrosstermMouseButton::Right => MouseButton::Right,
        CrosstermMouseButton::Middle => MouseButton::Middle,
    }
}

fn modifiers(mods: KeyModifiers) -> Modifiers {
    let mut out = Modifiers::empty();
    out.set(Modifiers::SHIFT, mods.contains(KeyModifiers::SHIFT));
    out.set(Modifiers::CTRL, mods.contains(KeyModifiers::CONTROL));
    out.set(Modifiers::ALT, mods.contains(KeyModifiers::ALT));
    out
}

// =============================================================================
// TESTS
// =============================================================================
