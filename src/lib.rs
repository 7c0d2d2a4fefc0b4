//! # cellwin
//!
//! Retained-mode windowing toolkit for text terminals.
//!
//! ## Architecture
//!
//! Components live in a generational arena and are addressed by
//! [`ComponentId`]. Windows and panels are containers with a pluggable
//! [`LayoutManager`]; widgets are leaves backed by a [`Widget`] delegate.
//! Everything that happens (input, focus changes, repaints, work from other
//! threads) goes through one [`EventQueue`] drained on the dispatch thread:
//!
//! ```text
//! Terminal input → Toolkit → EventQueue → dispatch → listeners / widgets
//!                                              ↓
//!                         validate → paint (Graphics, clipped) → flush
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Geometry, colours, border styles
//! - [`engine`] - Component arena, tree operations, focus traversal
//! - [`layout`] - Dock, flow, grid and card layouts
//! - [`event`] - Event records, key codes, listeners, the event queue
//! - [`render`] - Terminal backends and clipped drawing
//! - [`widgets`] - Widget trait and the built-in leaf widgets
//! - [`toolkit`] - The context object, window lifecycle and event loop

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod layout;
pub mod render;
pub mod toolkit;
pub mod types;
pub mod widgets;

// Re-export commonly used items
pub use types::*;

pub use config::ToolkitConfig;
pub use error::{Result, ToolkitError};

pub use engine::{ComponentId, ComponentKind, Peer, Tree};

pub use event::{
    codes, ActionEvent, Event, EventQueue, FocusEvent, FocusEventKind, ItemEvent, ItemState, Key,
    KeyEvent, KeyEventKind, ListenerId, Modifiers, MouseButton, MouseEvent, WindowEvent,
    WindowEventKind,
};

pub use layout::{
    Anchor, CardLayout, Constraint, DockLayout, Edge, Fill, FlowAlignment, FlowLayout, GridCell,
    GridLayout, LayoutManager,
};

pub use render::{CrosstermTerminal, Graphics, MemoryTerminal, Terminal};

pub use toolkit::{Toolkit, WindowStack};

pub use widgets::{Button, CheckBox, Filler, Label, Widget, WidgetContext, WidgetState};
