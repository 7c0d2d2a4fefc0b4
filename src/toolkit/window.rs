//! Windows - The stacking order and the show/hide lifecycle.
//!
//! Shown windows live on a [`WindowStack`], bottom first. The top window is
//! the active one: it receives keys and its focus is the real focus.
//!
//! Showing is immediate (the window is pushed, laid out, activated and
//! focused). Hiding goes through the queue: `hide` posts `Closing` and a
//! close request that the dispatch loop carries out, so listeners of
//! events already queued still see the window.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::Toolkit;
use crate::engine::{ComponentId, Peer};
use crate::error::{Result, ToolkitError};
use crate::event::{Event, PeerAction, PeerActionEvent, WindowEvent, WindowEventKind};
use crate::types::{Point, Rect};

// =============================================================================
// WINDOW STACK
// =============================================================================

/// Shown windows, bottom first. Clones share the same stack.
#[derive(Debug, Clone, Default)]
pub struct WindowStack {
    windows: Arc<Mutex<Vec<ComponentId>>>,
}

impl WindowStack {
    fn lock(&self) -> MutexGuard<'_, Vec<ComponentId>> {
        self.windows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn push(&self, window: ComponentId) {
        let mut windows = self.lock();
        windows.retain(|&w| w != window);
        windows.push(window);
    }

    pub(crate) fn remove(&self, window: ComponentId) -> bool {
        let mut windows = self.lock();
        let before = windows.len();
        windows.retain(|&w| w != window);
        windows.len() != before
    }

    /// The active window.
    pub fn top(&self) -> Option<ComponentId> {
        self.lock().last().copied()
    }

    pub fn bottom(&self) -> Option<ComponentId> {
        self.lock().first().copied()
    }

    /// Copy of the stack, bottom first.
    pub fn snapshot(&self) -> Vec<ComponentId> {
        self.lock().clone()
    }

    pub fn contains(&self, window: ComponentId) -> bool {
        self.lock().contains(&window)
    }

    /// Index from the bottom.
    pub fn position(&self, window: ComponentId) -> Option<usize> {
        self.lock().iter().position(|&w| w == window)
    }

    /// Windows stacked above `window`, nearest first.
    pub fn above(&self, window: ComponentId) -> Vec<ComponentId> {
        let windows = self.lock();
        match windows.iter().position(|&w| w == window) {
            Some(pos) => windows[pos + 1..].to_vec(),
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

// =============================================================================
// LIFECYCLE
// =============================================================================

impl Toolkit {
    pub fn windows(&self) -> &WindowStack {
        &self.windows
    }

    /// See [`crate::engine::Tree::create_window`].
    pub fn create_window(&mut self, owner: Option<ComponentId>) -> Result<ComponentId> {
        self.tree.create_window(owner)
    }

    /// See [`crate::engine::Tree::create_frame`].
    pub fn create_frame(&mut self, title: &str, owner: Option<ComponentId>) -> Result<ComponentId> {
        self.tree.create_frame(title, owner)
    }

    fn check_window(&self, window: ComponentId) -> Result<()> {
        self.tree.node(window)?;
        if !self.tree.is_window(window) {
            return Err(ToolkitError::NotAWindow(window));
        }
        Ok(())
    }

    /// Show `window` on top of the stack and give it the focus.
    ///
    /// A window that was never sized is packed first. Showing a window that
    /// is already shown only repaints it.
    pub fn show(&mut self, window: ComponentId) -> Result<()> {
        self.check_window(window)?;
        if self.tree.peer(window).is_some() {
            self.tree.repaint(window);
            return Ok(());
        }
        if self.tree.size(window).is_empty() {
            self.pack(window)?;
        }

        let previous = self.windows.top();
        self.tree.add_notify(window);
        self.next_peer += 1;
        self.tree.set_peer(window, Some(Peer::new(self.next_peer)))?;
        self.tree.node_mut(window)?.visible = true;
        self.windows.push(window);
        self.tree.validate(window);

        self.post_window_event(window, WindowEventKind::Opened);
        if let Some(previous) = previous {
            self.post_window_event(previous, WindowEventKind::Deactivated);
        }
        self.post_window_event(window, WindowEventKind::Activated);

        if let Some(focus) = self.tree.current_focus(window) {
            self.tree.request_focus(focus)?;
        }
        self.tree.repaint(window);
        debug!(window = %window, depth = self.windows.len(), "window shown");
        Ok(())
    }

    /// Ask for `window` to be closed. The close is carried out when the
    /// request is dispatched; hiding a window that is not shown does
    /// nothing.
    pub fn hide(&mut self, window: ComponentId) -> Result<()> {
        self.check_window(window)?;
        if self.tree.peer(window).is_none() {
            return Ok(());
        }
        self.post_window_event(window, WindowEventKind::Closing);
        self.queue.post_event(Event::PeerAction(PeerActionEvent {
            window,
            action: PeerAction::Close,
        }));
        Ok(())
    }

    /// Grow `window` to at least its preferred size, clamped to the screen,
    /// and lay it out. A window already larger than that keeps its size.
    pub fn pack(&mut self, window: ComponentId) -> Result<()> {
        self.check_window(window)?;
        let size = self
            .tree
            .preferred_size(window)
            .max(self.tree.size(window))
            .min(self.terminal.screen_size());
        self.tree.set_size(window, size.width, size.height)?;
        self.tree.validate(window);
        Ok(())
    }

    /// Centre `window` over its owner, or over the screen if it has none.
    pub fn center_over_owner(&mut self, window: ComponentId) -> Result<()> {
        let owner = self.tree.owner(window);
        self.set_location_relative_to(window, owner)
    }

    /// Centre `window` over `anchor` (screen coordinates of any
    /// component), or over the screen. The result is kept on screen.
    pub fn set_location_relative_to(
        &mut self,
        window: ComponentId,
        anchor: Option<ComponentId>,
    ) -> Result<()> {
        self.check_window(window)?;
        let screen = Rect::from_parts(Point::ORIGIN, self.terminal.screen_size());
        let area = match anchor {
            Some(anchor) => {
                Rect::from_parts(self.tree.location_on_screen(anchor), self.tree.size(anchor))
            }
            None => screen,
        };
        let size = self.tree.size(window);
        let x = area.x + (area.width - size.width) / 2;
        let y = area.y + (area.height - size.height) / 2;
        let x = x.min(screen.right() - size.width).max(0);
        let y = y.min(screen.bottom() - size.height).max(0);
        self.tree.set_location(window, x, y)
    }

    /// True when every cell of `window` is covered by visible windows above
    /// it.
    pub fn is_totally_obscured(&self, window: ComponentId) -> bool {
        let cover: Vec<Rect> = self
            .windows
            .above(window)
            .into_iter()
            .filter(|&w| self.tree.is_visible(w))
            .map(|w| self.tree.bounds(w))
            .collect();
        !cover.is_empty() && self.tree.bounds(window).is_covered_by(&cover)
    }

    pub(super) fn post_window_event(&self, window: ComponentId, kind: WindowEventKind) {
        self.queue
            .post_event(Event::Window(WindowEvent { window, kind }));
    }

    /// Make `window` cover the whole screen.
    pub fn fill_screen(&mut self, window: ComponentId) -> Result<()> {
        self.check_window(window)?;
        let screen = self.terminal.screen_size();
        self.tree
            .set_bounds(window, Rect::from_parts(Point::ORIGIN, screen))
    }
}

// =============================================================================
// TESTS
// =============================================================================
