//! Input - Backend input to queued key and mouse events.
//!
//! Keys go to the focus owner of the active window (or to the window itself
//! when nothing in it is focused). Mouse presses go to the deepest visible
//! component under the pointer in the active window; presses outside it
//! are dropped.

use tracing::{debug, warn};

use super::Toolkit;
use crate::engine::ComponentId;
use crate::error::{Result, ToolkitError};
use crate::event::{Event, Key, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent};
use crate::render::Input;
use crate::types::Point;

impl Toolkit {
    /// Post a key press for `code`, followed by a key-typed event if the
    /// key produces a character.
    pub fn fire_keystroke(&mut self, code: i32) {
        let Some(window) = self.windows.top() else {
            warn!(code, "keystroke with no window shown, dropped");
            return;
        };
        let source = self
            .tree
            .focus_owner()
            .filter(|&owner| self.tree.window_of(owner) == Some(window))
            .unwrap_or(window);

        let (key, modifiers) = Key::decode(code);
        self.queue.post_event(Event::Key(KeyEvent::new(
            source,
            KeyEventKind::Pressed,
            key,
            modifiers,
        )));
        if key.is_printable() {
            self.queue.post_event(Event::Key(KeyEvent::new(
                source,
                KeyEventKind::Typed,
                key,
                modifiers,
            )));
        }
    }

    /// Post a mouse press at screen position (x, y) in `window`.
    ///
    /// Returns the component that will receive it, or `None` if the point is
    /// outside the window.
    pub fn process_mouse_event(
        &mut self,
        window: ComponentId,
        button: MouseButton,
        clicks: u8,
        x: i32,
        y: i32,
        modifiers: Modifiers,
    ) -> Result<Option<ComponentId>> {
        self.tree.node(window)?;
        if !self.tree.is_window(window) {
            return Err(ToolkitError::NotAWindow(window));
        }

        let position = Point::new(x, y);
        let Some(source) = self.tree.component_at(window, position) else {
            return Ok(None);
        };
        let local = position - self.tree.location_on_screen(source);
        self.queue.post_event(Event::Mouse(MouseEvent::new(
            source, button, clicks, position, local, modifiers,
        )));
        Ok(Some(source))
    }

    /// Feed one unit of backend input into the queue.
    pub(crate) fn handle_input(&mut self, input: Input) -> Result<()> {
        match input {
            Input::Key(code) => self.fire_keystroke(code),
            Input::Mouse {
                button,
                clicks,
                position,
                modifiers,
            } => {
                let Some(window) = self.windows.top() else {
                    warn!(x = position.x, y = position.y, "mouse press with no window shown, dropped");
                    return Ok(());
                };
                let target = self.process_mouse_event(
                    window, button, clicks, position.x, position.y, modifiers,
                )?;
                if target.is_none() {
                    debug!(x = position.x, y = position.y, "mouse press outside the active window");
                }
            }
            Input::Resize(size) => {
                debug!(width = size.width, height = size.height, "screen resized");
                if let Some(bottom) = self.windows.bottom() {
                    self.tree.repaint(bottom);
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
