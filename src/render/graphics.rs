//! Graphics - Clipped, translated drawing onto a terminal.
//!
//! A `Graphics` has an origin (where its (0, 0) lands on the screen) and a
//! clip rectangle. Nothing drawn through it reaches cells outside the clip.
//! [`Graphics::create`] derives a child context for a sub-area; the child's
//! clip is the intersection of the parent's clip and the sub-area, so
//! painting can only ever shrink.
//!
//! # API
//!
//! - `create(x, y, w, h)` - Child context translated to (x, y)
//! - `draw_char` / `draw_string` / `draw_substring` - Text
//! - `draw_hline` / `draw_vline` / `draw_line` - Rules
//! - `fill_rect` / `draw_rect` - Boxes
//!
//! # Example
//!
//! ```ignore
//! let mut g = Graphics::new(&mut term, Rect::new(0, 0, 80, 24), colors);
//! let mut inner = g.create(2, 1, 10, 3);
//! inner.draw_string(0, 0, "clipped at ten columns");
//! ```

use unicode_width::UnicodeWidthChar;

use super::terminal::Terminal;
use crate::types::{BorderStyle, ColorPair, Point, Rect};

pub struct Graphics<'a> {
    surface: &'a mut (dyn Terminal + 'static),
    /// Screen position of this context's (0, 0).
    origin: Point,
    /// Drawable area in screen coordinates.
    clip: Rect,
    colors: ColorPair,
}

impl<'a> Graphics<'a> {
    /// Root context: origin at the screen origin, clipped to `clip`.
    pub fn new(surface: &'a mut (dyn Terminal + 'static), clip: Rect, colors: ColorPair) -> Self {
        Self {
            surface,
            origin: Point::ORIGIN,
            clip,
            colors,
        }
    }

    /// Child context for the area (x, y, width, height) of this one.
    pub fn create(&mut self, x: i32, y: i32, width: i32, height: i32) -> Graphics<'_> {
        let origin = self.origin.translate(x, y);
        let area = Rect::new(origin.x, origin.y, width.max(0), height.max(0));
        Graphics {
            surface: &mut *self.surface,
            origin,
            clip: self.clip.intersection(&area),
            colors: self.colors,
        }
    }

    /// Clip rectangle relative to this context's origin.
    pub fn clip_bounds(&self) -> Rect {
        self.clip.translate(-self.origin.x, -self.origin.y)
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn color_pair(&self) -> ColorPair {
        self.colors
    }

    pub fn set_color_pair(&mut self, colors: ColorPair) {
        self.colors = colors;
    }

    #[inline]
    fn attr(&self) -> u8 {
        self.colors.attribute()
    }

    pub fn draw_char(&mut self, x: i32, y: i32, ch: char) {
        let (sx, sy) = (self.origin.x + x, self.origin.y + y);
        if self.clip.contains(sx, sy) {
            let attr = self.attr();
            self.surface.draw_char(sx, sy, ch, attr);
        }
    }

    /// Draw `text` at (x, y), clipped by display column.
    pub fn draw_string(&mut self, x: i32, y: i32, text: &str) {
        let sy = self.origin.y + y;
        if sy < self.clip.y || sy >= self.clip.bottom() {
            return;
        }
        let mut column = self.origin.x + x;
        let mut start = None;
        let mut first_column = column;
        let mut end = text.len();

        for (i, ch) in text.char_indices() {
            let width = ch.width().unwrap_or(0) as i32;
            if width == 0 {
                continue;
            }
            if column + width > self.clip.right() {
                end = i;
                break;
            }
            if start.is_none() && column >= self.clip.x {
                start = Some(i);
                first_column = column;
            }
            column += width;
        }

        if let Some(start) = start
            && start < end
        {
            let attr = self.attr();
            self.surface.draw_string(first_column, sy, &text[start..end], attr);
        }
    }

    /// Draw `length` characters of `text` starting at character `offset`.
    pub fn draw_substring(&mut self, x: i32, y: i32, text: &str, offset: usize, length: usize) {
        let begin = text.char_indices().nth(offset).map_or(text.len(), |(i, _)| i);
        let rest = &text[begin..];
        let end = rest.char_indices().nth(length).map_or(rest.len(), |(i, _)| i);
        self.draw_string(x, y, &rest[..end]);
    }

    /// Horizontal rule of `length` cells.
    pub fn draw_hline(&mut self, x: i32, y: i32, length: i32, ch: char) {
        let sy = self.origin.y + y;
        if sy < self.clip.y || sy >= self.clip.bottom() {
            return;
        }
        let from = (self.origin.x + x).max(self.clip.x);
        let to = (self.origin.x + x + length).min(self.clip.right());
        if to > from {
            let attr = self.attr();
            self.surface.draw_line(from, sy, to - from, true, ch, attr);
        }
    }

    /// Vertical rule of `length` cells.
    pub fn draw_vline(&mut self, x: i32, y: i32, length: i32, ch: char) {
        let sx = self.origin.x + x;
        if sx < self.clip.x || sx >= self.clip.right() {
            return;
        }
        let from = (self.origin.y + y).max(self.clip.y);
        let to = (self.origin.y + y + length).min(self.clip.bottom());
        if to > from {
            let attr = self.attr();
            self.surface.draw_line(sx, from, to - from, false, ch, attr);
        }
    }

    /// Arbitrary line between two points (Bresenham), both ends inclusive.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, ch: char) {
        if y0 == y1 {
            let (a, b) = (x0.min(x1), x0.max(x1));
            return self.draw_hline(a, y0, b - a + 1, ch);
        }
        if x0 == x1 {
            let (a, b) = (y0.min(y1), y0.max(y1));
            return self.draw_vline(x0, a, b - a + 1, ch);
        }

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y) = (x0, y0);
        let mut err = dx + dy;
        loop {
            self.draw_char(x, y, ch);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Fill the area with blanks in the current colours.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32) {
        let area = Rect::new(self.origin.x + x, self.origin.y + y, width.max(0), height.max(0));
        let visible = self.clip.intersection(&area);
        if !visible.is_empty() {
            let attr = self.attr();
            self.surface.fill_box(visible, ' ', attr);
        }
    }

    /// Outline a box. Boxes narrower or shorter than two cells draw nothing.
    pub fn draw_rect(&mut self, x: i32, y: i32, width: i32, height: i32, style: BorderStyle) {
        if width < 2 || height < 2 {
            return;
        }
        let (h, v, tl, tr, br, bl) = style.chars();
        let (right, bottom) = (x + width - 1, y + height - 1);
        self.draw_hline(x + 1, y, width - 2, h);
        self.draw_hline(x + 1, bottom, width - 2, h);
        self.draw_vline(x, y + 1, height - 2, v);
        self.draw_vline(right, y + 1, height - 2, v);
        self.draw_char(x, y, tl);
        self.draw_char(right, y, tr);
        self.draw_char(right, bottom, br);
        self.draw_char(x, bottom, bl);
    }

    /// Move the hardware cursor to (x, y) in this context.
    pub fn set_cursor(&mut self, x: i32, y: i32) {
        self.surface.set_cursor(self.origin.x + x, self.origin.y + y);
    }
}

// =============================================================================
// TESTS
// =============================================================================
