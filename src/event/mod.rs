//! Event Module - Event records, key codes, listeners and the event queue.
//!
//! All events flow through one FIFO ([`EventQueue`]) and are dispatched by
//! the toolkit on the dispatch thread:
//!
//! ```text
//! backend key/mouse → Toolkit → EventQueue → dispatch → component listeners
//! ```
//!
//! - **Key / Mouse** - input, routed to the focus owner / hit component;
//!   carry a mutable `consumed` flag
//! - **Focus** - FOCUS_LOST then FOCUS_GAINED, posted by `request_focus`
//! - **Paint** - repaint a window and everything stacked above it
//! - **Window** - lifecycle notifications for window listeners
//! - **PeerAction** - backend-level requests (close)
//! - **Invocation** - work submitted from any thread
//! - **Action / Item** - semantic events posted by widgets

mod key;
mod listener;
mod queue;

use std::fmt;

use crate::engine::ComponentId;
use crate::types::Point;

pub use key::{codes, Key, Modifiers};
pub use listener::{
    ActionListener, FocusListener, ItemListener, KeyListener, ListenerId, MouseListener,
    WindowListener,
};
pub(crate) use listener::{ListenerList, Listeners};
pub use queue::{EventQueue, InvocationEvent, QueueObserver};

// =============================================================================
// EVENT ENUM
// =============================================================================

/// Every event the queue can carry.
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Focus(FocusEvent),
    Paint(PaintEvent),
    Window(WindowEvent),
    PeerAction(PeerActionEvent),
    Invocation(InvocationEvent),
    Action(ActionEvent),
    Item(ItemEvent),
}

impl Event {
    /// Component (or window) the event originates from. Invocations have
    /// none.
    pub fn source(&self) -> Option<ComponentId> {
        match self {
            Event::Key(e) => Some(e.source),
            Event::Mouse(e) => Some(e.source),
            Event::Focus(e) => Some(e.source),
            Event::Paint(e) => Some(e.window),
            Event::Window(e) => Some(e.window),
            Event::PeerAction(e) => Some(e.window),
            Event::Invocation(_) => None,
            Event::Action(e) => Some(e.source),
            Event::Item(e) => Some(e.source),
        }
    }

    /// Short name for logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Event::Key(_) => "key",
            Event::Mouse(_) => "mouse",
            Event::Focus(_) => "focus",
            Event::Paint(_) => "paint",
            Event::Window(_) => "window",
            Event::PeerAction(_) => "peer-action",
            Event::Invocation(_) => "invocation",
            Event::Action(_) => "action",
            Event::Item(_) => "item",
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Key(e) => fmt::Debug::fmt(e, f),
            Event::Mouse(e) => fmt::Debug::fmt(e, f),
            Event::Focus(e) => fmt::Debug::fmt(e, f),
            Event::Paint(e) => fmt::Debug::fmt(e, f),
            Event::Window(e) => fmt::Debug::fmt(e, f),
            Event::PeerAction(e) => fmt::Debug::fmt(e, f),
            Event::Invocation(e) => fmt::Debug::fmt(e, f),
            Event::Action(e) => fmt::Debug::fmt(e, f),
            Event::Item(e) => fmt::Debug::fmt(e, f),
        }
    }
}

// =============================================================================
// KEY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Pressed,
    /// Follows `Pressed` for keys that produce a character.
    Typed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub source: ComponentId,
    pub kind: KeyEventKind,
    pub key: Key,
    pub modifiers: Modifiers,
    consumed: bool,
}

impl KeyEvent {
    pub fn new(source: ComponentId, kind: KeyEventKind, key: Key, modifiers: Modifiers) -> Self {
        Self {
            source,
            kind,
            key,
            modifiers,
            consumed: false,
        }
    }

    /// Stop further processing of this event.
    pub fn consume(&mut self) {
        self.consumed = true;
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

// =============================================================================
// MOUSE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    /// Deepest visible component under the pointer.
    pub source: ComponentId,
    pub button: MouseButton,
    pub clicks: u8,
    /// Screen coordinates.
    pub position: Point,
    /// Coordinates relative to `source`.
    pub local: Point,
    pub modifiers: Modifiers,
    consumed: bool,
}

impl MouseEvent {
    pub fn new(
        source: ComponentId,
        button: MouseButton,
        clicks: u8,
        position: Point,
        local: Point,
        modifiers: Modifiers,
    ) -> Self {
        Self {
            source,
            button,
            clicks,
            position,
            local,
            modifiers,
            consumed: false,
        }
    }

    pub fn consume(&mut self) {
        self.consumed = true;
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed
    }
}

// =============================================================================
// FOCUS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusEventKind {
    Gained,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusEvent {
    pub source: ComponentId,
    pub kind: FocusEventKind,
    /// The transfer crossed windows (a window opened over another, or a
    /// closing window revealed another).
    pub temporary: bool,
    /// The other party of the transfer, if any.
    pub opposite: Option<ComponentId>,
}

// =============================================================================
// PAINT / WINDOW / PEER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintEvent {
    pub window: ComponentId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEventKind {
    Opened,
    Closing,
    Closed,
    Activated,
    Deactivated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowEvent {
    pub window: ComponentId,
    pub kind: WindowEventKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerAction {
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerActionEvent {
    pub window: ComponentId,
    pub action: PeerAction,
}

// =============================================================================
// SEMANTIC
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEvent {
    pub source: ComponentId,
    pub command: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Selected,
    Deselected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemEvent {
    pub source: ComponentId,
    pub item: String,
    pub state: ItemState,
}
