//! Core types for cellwin.
//!
//! Geometry primitives (points, sizes, rectangles, insets) and the colour
//! attribute encoding every paint call ends up in. These are plain `Copy`
//! values; nothing in here knows about the component tree.

use std::ops::{Add, Sub};

// =============================================================================
// Point
// =============================================================================

/// A cell position. Signed so translated origins may sit left of or above
/// the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by (dx, dy).
    #[inline]
    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

// =============================================================================
// Size
// =============================================================================

/// Width and height in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// True if either dimension is zero or negative.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Component-wise maximum.
    pub fn max(self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// Component-wise minimum.
    pub fn min(self, other: Size) -> Size {
        Size::new(self.width.min(other.width), self.height.min(other.height))
    }

    /// Grow by the given insets.
    pub fn grow(self, insets: Insets) -> Size {
        Size::new(
            self.width + insets.horizontal(),
            self.height + insets.vertical(),
        )
    }
}

// =============================================================================
// Insets
// =============================================================================

/// Space reserved on each side of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Insets {
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
}

impl Insets {
    pub const ZERO: Self = Self::uniform(0);

    pub const fn new(top: i32, left: i32, bottom: i32, right: i32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// The same inset on all four sides.
    pub const fn uniform(n: i32) -> Self {
        Self::new(n, n, n, n)
    }

    #[inline]
    pub const fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    #[inline]
    pub const fn vertical(&self) -> i32 {
        self.top + self.bottom
    }
}

// =============================================================================
// Rect
// =============================================================================

/// An axis-aligned rectangle of cells. `x`/`y` are inclusive, the right and
/// bottom edges are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const EMPTY: Self = Self::new(0, 0, 0, 0);

    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn from_parts(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    #[inline]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Exclusive right edge.
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check if a cell is inside this rect.
    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    #[inline]
    pub const fn contains_point(&self, p: Point) -> bool {
        self.contains(p.x, p.y)
    }

    /// Intersection of two rects. Disjoint rects give an empty rect anchored
    /// at the clamped corner, so callers can keep translating it.
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        Rect::new(x1, y1, (x2 - x1).max(0), (y2 - y1).max(0))
    }

    /// Intersection, or `None` when the rects do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let r = self.intersection(other);
        if r.is_empty() { None } else { Some(r) }
    }

    pub const fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Shrink by insets (never below zero size).
    pub fn inset(&self, insets: Insets) -> Rect {
        Rect::new(
            self.x + insets.left,
            self.y + insets.top,
            (self.width - insets.horizontal()).max(0),
            (self.height - insets.vertical()).max(0),
        )
    }

    /// True if every cell of `self` lies inside the union of `cover`.
    ///
    /// Sweeps row by row, merging the covering spans on each row.
    pub fn is_covered_by(&self, cover: &[Rect]) -> bool {
        if self.is_empty() {
            return true;
        }
        let mut spans: Vec<(i32, i32)> = Vec::with_capacity(cover.len());
        for row in self.y..self.bottom() {
            spans.clear();
            spans.extend(
                cover
                    .iter()
                    .filter(|r| !r.is_empty() && row >= r.y && row < r.bottom())
                    .map(|r| (r.x, r.right())),
            );
            spans.sort_unstable();

            let mut reach = self.x;
            for &(start, end) in &spans {
                if start > reach {
                    break;
                }
                reach = reach.max(end);
                if reach >= self.right() {
                    break;
                }
            }
            if reach < self.right() {
                return false;
            }
        }
        true
    }

    /// Center a size inside this rect (size is clamped to the rect).
    pub fn center(&self, size: Size) -> Rect {
        let size = size.min(self.size());
        Rect::new(
            self.x + (self.width - size.width) / 2,
            self.y + (self.height - size.height) / 2,
            size.width.max(0),
            size.height.max(0),
        )
    }
}

// =============================================================================
// Color
// =============================================================================

/// The eight base terminal hues. The discriminant is the 3-bit hue code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Color {
    #[default]
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
}

impl Color {
    /// Decode the low three bits of a nibble.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Color::Black,
            1 => Color::Red,
            2 => Color::Green,
            3 => Color::Yellow,
            4 => Color::Blue,
            5 => Color::Magenta,
            6 => Color::Cyan,
            _ => Color::White,
        }
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Intensity flag within a colour nibble.
pub const INTENSITY: u8 = 0x08;

/// Foreground/background pair, encoded for the backend as one attribute
/// byte: `(background_nibble << 4) | foreground_nibble`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorPair {
    pub foreground: Color,
    pub background: Color,
    pub bright_foreground: bool,
    pub bright_background: bool,
}

impl ColorPair {
    pub const fn new(foreground: Color, background: Color) -> Self {
        Self {
            foreground,
            background,
            bright_foreground: false,
            bright_background: false,
        }
    }

    /// Same pair with the foreground intensity bit set.
    pub const fn bright(mut self) -> Self {
        self.bright_foreground = true;
        self
    }

    /// Swap foreground and background (used for highlighting).
    pub const fn reversed(self) -> Self {
        Self {
            foreground: self.background,
            background: self.foreground,
            bright_foreground: self.bright_background,
            bright_background: self.bright_foreground,
        }
    }

    /// Encode to the backend attribute byte.
    pub const fn attribute(&self) -> u8 {
        let fg = self.foreground.bits() | if self.bright_foreground { INTENSITY } else { 0 };
        let bg = self.background.bits() | if self.bright_background { INTENSITY } else { 0 };
        (bg << 4) | fg
    }

    /// Decode an attribute byte.
    pub const fn from_attribute(attr: u8) -> Self {
        let fg = attr & 0x0F;
        let bg = attr >> 4;
        Self {
            foreground: Color::from_bits(fg),
            background: Color::from_bits(bg),
            bright_foreground: fg & INTENSITY != 0,
            bright_background: bg & INTENSITY != 0,
        }
    }
}

impl Default for ColorPair {
    fn default() -> Self {
        Self::new(Color::White, Color::Black)
    }
}

// =============================================================================
// Border Styles
// =============================================================================

/// Ruling used by boxes and window borders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderStyle {
    #[default]
    Single,
    Double,
}

impl BorderStyle {
    /// (horizontal, vertical, top-left, top-right, bottom-right, bottom-left)
    pub const fn chars(self) -> (char, char, char, char, char, char) {
        match self {
            BorderStyle::Single => ('─', '│', '┌', '┐', '┘', '└'),
            BorderStyle::Double => ('═', '║', '╔', '╗', '╝', '╚'),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
