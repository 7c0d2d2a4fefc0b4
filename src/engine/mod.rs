//! Engine - The component arena and everything that mutates the tree.
//!
//! The engine manages the core data structures:
//! - Registry: generational slot allocation ([`ComponentId`])
//! - Node: the per-component record (kind, bounds, flags, listeners,
//!   layout, widget delegate, focus cache)
//! - Tree: hierarchy operations, validation, geometry, colours
//! - Focus: traversal order, per-container focus cache, `request_focus`
//!
//! # Architecture
//!
//! Components are NOT objects with back pointers. They are ids into one
//! arena; the parent's child list owns, the child's `parent` is a plain id:
//!
//! ```text
//! #0v0 Window (parent=None, children=[#1v0, #2v0], layout=Dock)
//! #1v0 Widget (parent=#0v0, Label "Name")
//! #2v0 Panel  (parent=#0v0, children=[#3v0], layout=Flow)
//! #3v0 Widget (parent=#2v0, Button "OK")
//! ```
//!
//! A destroyed component's slot is reused with a bumped generation, so a
//! stale id simply stops resolving.

mod focus;
mod node;
mod registry;
mod tree;

pub use node::{ComponentKind, Peer};
pub use registry::ComponentId;
pub use tree::Tree;
