//! Component node - The per-component record stored in the arena.
//!
//! Every component (window, panel or widget) is one `Node`. The parent's
//! `children` list is the owning relation; `parent` is a plain id back
//! link.

use crate::event::Listeners;
use crate::layout::LayoutManager;
use crate::types::{BorderStyle, ColorPair, Insets, Rect, Size};
use crate::widgets::Widget;

use super::ComponentId;

// =============================================================================
// TYPES
// =============================================================================

/// What a component is. Windows and panels are containers; widgets are
/// leaves that delegate size, paint and input to a [`Widget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Window,
    Panel,
    Widget,
}

impl ComponentKind {
    #[inline]
    pub fn is_container(self) -> bool {
        matches!(self, ComponentKind::Window | ComponentKind::Panel)
    }
}

/// Backend handle of a shown window. Present exactly while the window is
/// displayable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Peer {
    serial: u64,
}

impl Peer {
    pub(crate) fn new(serial: u64) -> Self {
        Self { serial }
    }

    /// Monotonic per-toolkit number; a re-shown window gets a new one.
    pub fn serial(&self) -> u64 {
        self.serial
    }
}

/// Lazily resolved focus of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FocusCache {
    Unresolved,
    Resolved(Option<ComponentId>),
}

pub(crate) struct WindowData {
    pub(crate) owner: Option<ComponentId>,
    pub(crate) title: Option<String>,
    pub(crate) border: Option<BorderStyle>,
    pub(crate) peer: Option<Peer>,
}

// =============================================================================
// NODE
// =============================================================================

pub(crate) struct Node {
    pub(crate) kind: ComponentKind,
    pub(crate) parent: Option<ComponentId>,
    pub(crate) children: Vec<ComponentId>,
    /// Relative to the parent; screen coordinates for windows.
    pub(crate) bounds: Rect,
    pub(crate) visible: bool,
    pub(crate) enabled: bool,
    /// Set while the owning window is shown.
    pub(crate) displayable: bool,
    pub(crate) valid: bool,
    pub(crate) colors: Option<ColorPair>,
    pub(crate) minimum_size: Option<Size>,
    pub(crate) insets: Insets,
    pub(crate) name: Option<String>,
    /// Taken out while the layout runs.
    pub(crate) layout: Option<Box<dyn LayoutManager>>,
    pub(crate) focus: FocusCache,
    /// Taken out while the widget paints or handles input.
    pub(crate) widget: Option<Box<dyn Widget>>,
    pub(crate) listeners: Listeners,
    pub(crate) window: Option<WindowData>,
}

impl Node {
    fn base(kind: ComponentKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            bounds: Rect::EMPTY,
            visible: true,
            enabled: true,
            displayable: false,
            valid: false,
            colors: None,
            minimum_size: None,
            insets: Insets::ZERO,
            name: None,
            layout: None,
            focus: FocusCache::Unresolved,
            widget: None,
            listeners: Listeners::default(),
            window: None,
        }
    }

    pub(crate) fn panel(layout: Box<dyn LayoutManager>) -> Self {
        Self {
            layout: Some(layout),
            ..Self::base(ComponentKind::Panel)
        }
    }

    pub(crate) fn widget(widget: Box<dyn Widget>) -> Self {
        Self {
            widget: Some(widget),
            ..Self::base(ComponentKind::Widget)
        }
    }

    /// Windows start hidden; `show` makes them visible.
    pub(crate) fn window(layout: Box<dyn LayoutManager>, owner: Option<ComponentId>) -> Self {
        Self {
            layout: Some(layout),
            visible: false,
            window: Some(WindowData {
                owner,
                title: None,
                border: None,
                peer: None,
            }),
            ..Self::base(ComponentKind::Window)
        }
    }

    #[inline]
    pub(crate) fn is_container(&self) -> bool {
        self.kind.is_container()
    }
}
