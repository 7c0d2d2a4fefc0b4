//! Render Module - Terminal backends and clipped drawing.
//!
//! # Structure
//!
//! - `terminal` - The [`Terminal`] backend trait and [`Input`]
//! - `buffer` - [`MemoryTerminal`], an in-memory grid for tests and headless use
//! - `crossterm` - [`CrosstermTerminal`], the real-terminal backend
//! - `graphics` - [`Graphics`], translated and clipped drawing contexts
//! - `paint` - The per-window paint pass

mod buffer;
mod crossterm;
mod graphics;
pub(crate) mod paint;
mod terminal;

pub use buffer::{Cell, MemoryTerminal};
pub use self::crossterm::CrosstermTerminal;
pub use graphics::Graphics;
pub use terminal::{Input, Terminal};
