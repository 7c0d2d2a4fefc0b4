//! Dispatch - Takes events off the queue and routes them.
//!
//! # Routing
//!
//! | Event | Goes to |
//! |-------|---------|
//! | paint | the window and every window above it, then cursor and flush |
//! | peer action (close) | the window stack; fires `Closed` |
//! | window | window listeners |
//! | invocation | runs the task |
//! | key | source listeners, widget, ancestor listeners, Tab traversal |
//! | mouse | focus on press, source listeners, widget |
//! | focus / action / item | source listeners |
//!
//! Every listener, widget callback and task runs under `catch_unwind`: a
//! panic is logged and the loop carries on with the next callback.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, trace};

use super::Toolkit;
use crate::engine::ComponentId;
use crate::error::{panic_message, Result, ToolkitError};
use crate::event::{
    Event, FocusEvent, InvocationEvent, Key, KeyEvent, KeyEventKind, ListenerList, Listeners,
    MouseEvent, PeerAction, WindowEvent, WindowEventKind,
};
use crate::render::paint::{paint_window, place_cursor};
use crate::widgets::{Widget, WidgetContext};

impl Toolkit {
    // =========================================================================
    // LOOPS
    // =========================================================================

    /// Dispatch everything currently queued (and whatever that posts).
    /// Returns how many events were dispatched.
    pub fn dispatch_pending(&mut self) -> Result<usize> {
        let mut count = 0;
        while let Some(event) = self.queue.try_next_event() {
            self.dispatch_event(event)?;
            count += 1;
        }
        Ok(count)
    }

    /// Run until no window is shown.
    pub fn run(&mut self) -> Result<()> {
        self.run_until(|toolkit| toolkit.windows.is_empty())
    }

    /// Dispatch events, polling the backend for input whenever the queue is
    /// empty, until `done` returns true.
    pub fn run_until(&mut self, mut done: impl FnMut(&mut Toolkit) -> bool) -> Result<()> {
        loop {
            self.dispatch_pending()?;
            if done(self) {
                return Ok(());
            }
            if let Some(input) = self.terminal.poll_input(Some(self.config.poll_interval))? {
                self.handle_input(input)?;
            }
        }
    }

    /// Show `window` and run a nested loop until it is closed.
    pub fn show_modal(&mut self, window: ComponentId) -> Result<()> {
        self.show(window)?;
        debug!(window = %window, "entering modal loop");
        self.run_until(|toolkit| toolkit.tree.peer(window).is_none())?;
        debug!(window = %window, "modal loop finished");
        Ok(())
    }

    // =========================================================================
    // ROUTING
    // =========================================================================

    pub fn dispatch_event(&mut self, event: Event) -> Result<()> {
        trace!(event = event.kind_name(), source = ?event.source(), "dispatch");
        match event {
            Event::Paint(paint) => self.paint(paint.window)?,
            Event::PeerAction(peer) => match peer.action {
                PeerAction::Close => self.close_window(peer.window)?,
            },
            Event::Window(window) => self.dispatch_window_event(&window),
            Event::Invocation(invocation) => self.run_invocation(invocation),
            Event::Key(key) => self.dispatch_key(key)?,
            Event::Mouse(mouse) => self.dispatch_mouse(mouse)?,
            Event::Focus(focus) => self.dispatch_focus(&focus),
            Event::Action(action) => {
                let source = action.source;
                self.fire(source, |l| &mut l.action, |listener, toolkit| {
                    listener(toolkit, &action)
                });
            }
            Event::Item(item) => {
                let source = item.source;
                self.fire(source, |l| &mut l.item, |listener, toolkit| {
                    listener(toolkit, &item)
                });
            }
        }
        Ok(())
    }

    fn paint(&mut self, window: ComponentId) -> Result<()> {
        self.tree.paint_started(window);
        let Some(position) = self.windows.position(window) else {
            trace!(window = %window, "paint for closed window dropped");
            return Ok(());
        };

        let stack = self.windows.snapshot();
        for &current in &stack[position..] {
            self.tree.validate(current);
            if self.config.skip_obscured_windows && self.is_totally_obscured(current) {
                trace!(window = %current, "skipping obscured window");
                continue;
            }
            paint_window(
                &self.tree,
                self.terminal.as_mut(),
                current,
                self.config.default_colors,
            );
        }
        place_cursor(
            &self.tree,
            self.terminal.as_mut(),
            self.config.hide_idle_cursor,
        );
        self.terminal.flush()?;
        Ok(())
    }

    fn close_window(&mut self, window: ComponentId) -> Result<()> {
        if !self.windows.contains(window) {
            debug!(window = %window, "close request for a window that is not shown");
            return Ok(());
        }
        if self.windows.top() != Some(window) {
            return Err(ToolkitError::NotTopmost(window));
        }

        let owner = self.tree.focus_owner();
        self.windows.remove(window);
        self.tree.remove_notify(window);
        self.tree.set_peer(window, None)?;
        self.tree.node_mut(window)?.visible = false;
        debug!(window = %window, remaining = self.windows.len(), "window closed");

        let closed = WindowEvent {
            window,
            kind: WindowEventKind::Closed,
        };
        self.dispatch_window_event(&closed);

        let Some(top) = self.windows.top() else {
            if let Some(owner) = owner {
                self.tree.clear_focus(owner);
            }
            let discarded = self.queue.drain();
            self.tree.clear_pending_paints();
            debug!(discarded, "last window closed, queue drained");
            return Ok(());
        };

        match self.tree.current_focus(top) {
            Some(focus) => {
                self.tree.request_focus(focus)?;
            }
            None => {
                if let Some(owner) = owner {
                    self.tree.clear_focus(owner);
                }
            }
        }
        self.post_window_event(top, WindowEventKind::Activated);
        if let Some(bottom) = self.windows.bottom() {
            self.tree.repaint(bottom);
        }
        Ok(())
    }

    fn dispatch_window_event(&mut self, event: &WindowEvent) {
        self.fire(event.window, |l| &mut l.window, |listener, toolkit| {
            listener(toolkit, event)
        });
    }

    fn dispatch_focus(&mut self, event: &FocusEvent) {
        self.fire(event.source, |l| &mut l.focus, |listener, toolkit| {
            listener(toolkit, event)
        });
    }

    fn run_invocation(&mut self, invocation: InvocationEvent) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| invocation.run(self))) {
            error!(panic = %panic_message(payload.as_ref()), "invoked task panicked");
        }
    }

    fn dispatch_key(&mut self, mut event: KeyEvent) -> Result<()> {
        let source = event.source;
        if !self.tree.contains(source) {
            return Ok(());
        }

        self.fire(source, |l| &mut l.key, |listener, toolkit| {
            listener(toolkit, &mut event)
        });
        if !event.is_consumed() {
            self.with_widget(source, |widget, ctx| widget.process_key(ctx, &mut event));
        }

        let ancestors: Vec<_> = self.tree.ancestors(source).collect();
        for ancestor in ancestors {
            if event.is_consumed() {
                break;
            }
            self.fire(ancestor, |l| &mut l.key, |listener, toolkit| {
                listener(toolkit, &mut event)
            });
        }

        if !event.is_consumed()
            && self.config.tab_traversal
            && event.kind == KeyEventKind::Pressed
        {
            match event.key {
                Key::Tab => {
                    self.tree.transfer_focus(source)?;
                }
                Key::BackTab => {
                    self.tree.transfer_focus_backward(source)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn dispatch_mouse(&mut self, mut event: MouseEvent) -> Result<()> {
        let source = event.source;
        if !self.tree.contains(source) {
            return Ok(());
        }
        if self.tree.is_focus_traversable(source) {
            self.tree.request_focus(source)?;
        }

        self.fire(source, |l| &mut l.mouse, |listener, toolkit| {
            listener(toolkit, &mut event)
        });
        if !event.is_consumed() {
            self.with_widget(source, |widget, ctx| widget.process_mouse(ctx, &mut event));
        }
        Ok(())
    }

    // =========================================================================
    // CALLBACKS
    // =========================================================================

    /// Call every listener in one of `id`'s lists. The list is moved out of
    /// the node while it runs so listeners get `&mut Toolkit`.
    fn fire<L>(
        &mut self,
        id: ComponentId,
        select: fn(&mut Listeners) -> &mut ListenerList<L>,
        mut call: impl FnMut(&mut L, &mut Toolkit),
    ) {
        let Ok(node) = self.tree.node_mut(id) else {
            return;
        };
        let mut list = node.listeners.check_out(select);
        if list.is_empty() {
            return;
        }

        for (listener_id, listener) in list.iter_mut() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| call(listener, self)));
            if let Err(payload) = outcome {
                error!(
                    component = %id,
                    listener = ?listener_id,
                    panic = %panic_message(payload.as_ref()),
                    "listener panicked"
                );
            }
        }

        match self.tree.node_mut(id) {
            Ok(node) => node.listeners.restore(select, list),
            Err(_) => trace!(component = %id, "component destroyed by its own listener"),
        }
    }

    /// Let the widget delegate of `id` handle input, then apply the repaint
    /// or relayout it asked for.
    fn with_widget(
        &mut self,
        id: ComponentId,
        f: impl FnOnce(&mut dyn Widget, &mut WidgetContext<'_>),
    ) {
        let Some(mut widget) = self.tree.take_widget(id) else {
            return;
        };
        let mut ctx = WidgetContext::new(id, &self.queue);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(widget.as_mut(), &mut ctx)));
        let (repaint, relayout) = (ctx.repaint, ctx.relayout);
        self.tree.restore_widget(id, widget);

        if let Err(payload) = outcome {
            error!(component = %id, panic = %panic_message(payload.as_ref()), "widget panicked");
            return;
        }
        if relayout {
            self.tree.invalidate(id);
        }
        if repaint {
            self.tree.repaint(id);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::config::ToolkitConfig;
    use crate::event::{codes, FocusEventKind};
    use crate::layout::Edge;
    use crate::render::MemoryTerminal;
    use crate::widgets::{Button, Filler, Label};

    fn setup() -> (Toolkit, MemoryTerminal) {
        let term = MemoryTerminal::new(30, 8);
        let toolkit = Toolkit::new(term.clone(), ToolkitConfig::default()).unwrap();
        (toolkit, term)
    }

    #[test]
    fn test_paint_reaches_terminal() {
        let (mut toolkit, term) = setup();
        let frame = toolkit.create_frame("Demo", None).unwrap();
        let label = toolkit.tree_mut().create_widget(Label::new("hello"));
        toolkit.tree_mut().add(frame, label, Edge::Center).unwrap();
        toolkit.fill_screen(frame).unwrap();
        toolkit.show(frame).unwrap();
        toolkit.dispatch_pending().unwrap();

        assert!(term.row(0).contains(" Demo "));
        assert!(term.contents().contains("hello"));
        assert_eq!(term.flush_count(), 1);
        // Nothing focusable: cursor hidden
        assert_eq!(term.cursor(), None);
    }

    #[test]
    fn test_paint_requests_coalesce() {
        let (mut toolkit, term) = setup();
        let window = toolkit.create_window(None).unwrap();
        toolkit.fill_screen(window).unwrap();
        toolkit.show(window).unwrap();
        toolkit.tree_mut().repaint(window);
        toolkit.tree_mut().repaint(window);
        toolkit.dispatch_pending().unwrap();
        assert_eq!(term.flush_count(), 1);
    }

    #[test]
    fn test_reshown_window_paints_after_drain() {
        let (mut toolkit, term) = setup();
        let window = toolkit.create_window(None).unwrap();
        toolkit.fill_screen(window).unwrap();
        toolkit.show(window).unwrap();
        toolkit.dispatch_pending().unwrap();
        assert_eq!(term.flush_count(), 1);

        // The paint queued behind the close is drained with the queue.
        toolkit.hide(window).unwrap();
        toolkit.tree_mut().repaint(window);
        toolkit.dispatch_pending().unwrap();
        assert!(toolkit.windows().is_empty());
        assert_eq!(term.flush_count(), 1);

        toolkit.show(window).unwrap();
        toolkit.dispatch_pending().unwrap();
        assert_eq!(term.flush_count(), 2);
    }

    #[test]
    fn test_button_action_reaches_listener() {
        let (mut toolkit, term) = setup();
        let window = toolkit.create_window(None).unwrap();
        let button = toolkit.tree_mut().create_widget(Button::new("Go"));
        toolkit.tree_mut().add_child(window, button).unwrap();
        let fired = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&fired);
        toolkit
            .tree_mut()
            .add_action_listener(button, move |_, ev| log.borrow_mut().push(ev.command.clone()))
            .unwrap();
        toolkit.fill_screen(window).unwrap();
        toolkit.show(window).unwrap();
        toolkit.dispatch_pending().unwrap();

        // Cursor sits inside the focused button.
        let at = toolkit.tree().location_on_screen(button);
        assert_eq!(term.cursor(), Some(at + crate::types::Point::new(2, 0)));

        toolkit.fire_keystroke(codes::LINE_FEED);
        toolkit.dispatch_pending().unwrap();
        assert_eq!(*fired.borrow(), vec!["Go".to_string()]);
    }

    #[test]
    fn test_key_bubbles_to_ancestor_listener() {
        let (mut toolkit, _term) = setup();
        let window = toolkit.create_window(None).unwrap();
        let panel = toolkit.tree_mut().create_panel();
        let field = toolkit.tree_mut().create_widget(Filler::focusable(3, 1));
        toolkit.tree_mut().add_child(panel, field).unwrap();
        toolkit.tree_mut().add_child(window, panel).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        toolkit
            .tree_mut()
            .add_key_listener(panel, move |_, ev| {
                log.borrow_mut().push((ev.kind, ev.key));
                ev.consume();
            })
            .unwrap();
        let window_log = Rc::clone(&seen);
        toolkit
            .tree_mut()
            .add_key_listener(window, move |_, ev| window_log.borrow_mut().push((ev.kind, ev.key)))
            .unwrap();
        toolkit.fill_screen(window).unwrap();
        toolkit.show(window).unwrap();

        toolkit.fire_keystroke('a' as i32);
        toolkit.dispatch_pending().unwrap();
        assert_eq!(
            *seen.borrow(),
            vec![
                (KeyEventKind::Pressed, Key::Char('a')),
                (KeyEventKind::Typed, Key::Char('a')),
            ]
        );
    }

    #[test]
    fn test_tab_moves_focus() {
        let (mut toolkit, _term) = setup();
        let window = toolkit.create_window(None).unwrap();
        let panel = toolkit.tree_mut().create_panel();
        let a = toolkit.tree_mut().create_widget(Filler::focusable(2, 1));
        let b = toolkit.tree_mut().create_widget(Filler::focusable(2, 1));
        toolkit.tree_mut().add_child(panel, a).unwrap();
        toolkit.tree_mut().add_child(panel, b).unwrap();
        toolkit.tree_mut().add_child(window, panel).unwrap();
        toolkit.fill_screen(window).unwrap();
        toolkit.show(window).unwrap();
        assert_eq!(toolkit.tree().focus_owner(), Some(a));

        toolkit.fire_keystroke(codes::TAB);
        toolkit.dispatch_pending().unwrap();
        assert_eq!(toolkit.tree().focus_owner(), Some(b));

        toolkit.fire_keystroke(codes::KEY_BACK_TAB);
        toolkit.dispatch_pending().unwrap();
        assert_eq!(toolkit.tree().focus_owner(), Some(a));
    }

    #[test]
    fn test_panicking_listener_does_not_stop_dispatch() {
        let (mut toolkit, _term) = setup();
        let window = toolkit.create_window(None).unwrap();
        let button = toolkit.tree_mut().create_widget(Button::new("Boom"));
        toolkit.tree_mut().add_child(window, button).unwrap();
        toolkit
            .tree_mut()
            .add_action_listener(button, |_, _| panic!("listener failure"))
            .unwrap();
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        toolkit
            .tree_mut()
            .add_action_listener(button, move |_, _| *counter.borrow_mut() += 1)
            .unwrap();
        toolkit.fill_screen(window).unwrap();
        toolkit.show(window).unwrap();

        toolkit.fire_keystroke(' ' as i32);
        toolkit.dispatch_pending().unwrap();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_close_reveals_previous_window() {
        let (mut toolkit, _term) = setup();
        let main = toolkit.create_window(None).unwrap();
        let field = toolkit.tree_mut().create_widget(Filler::focusable(2, 1));
        toolkit.tree_mut().add_child(main, field).unwrap();
        toolkit.fill_screen(main).unwrap();
        toolkit.show(main).unwrap();

        let dialog = toolkit.create_window(Some(main)).unwrap();
        let ok = toolkit.tree_mut().create_widget(Button::new("OK"));
        toolkit.tree_mut().add_child(dialog, ok).unwrap();
        toolkit.show(dialog).unwrap();
        toolkit.dispatch_pending().unwrap();
        assert_eq!(toolkit.tree().focus_owner(), Some(ok));

        let gained = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&gained);
        toolkit
            .tree_mut()
            .add_focus_listener(field, move |_, ev| log.borrow_mut().push((ev.kind, ev.temporary)))
            .unwrap();
        toolkit.hide(dialog).unwrap();
        toolkit.dispatch_pending().unwrap();

        assert_eq!(toolkit.windows().snapshot(), vec![main]);
        assert_eq!(toolkit.tree().focus_owner(), Some(field));
        assert_eq!(*gained.borrow(), vec![(FocusEventKind::Gained, true)]);
        assert!(toolkit.tree().peer(dialog).is_none());
    }

    #[test]
    fn test_closing_lower_window_is_fatal() {
        let (mut toolkit, _term) = setup();
        let a = toolkit.create_window(None).unwrap();
        let b = toolkit.create_window(None).unwrap();
        toolkit.show(a).unwrap();
        toolkit.show(b).unwrap();
        toolkit.dispatch_pending().unwrap();
        toolkit.hide(a).unwrap();
        assert!(matches!(
            toolkit.dispatch_pending(),
            Err(ToolkitError::NotTopmost(w)) if w == a
        ));
    }

    #[test]
    fn test_closed_listener_fires() {
        let (mut toolkit, _term) = setup();
        let window = toolkit.create_window(None).unwrap();
        let kinds = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&kinds);
        toolkit
            .tree_mut()
            .add_window_listener(window, move |_, ev| log.borrow_mut().push(ev.kind))
            .unwrap();
        toolkit.show(window).unwrap();
        toolkit.dispatch_pending().unwrap();
        toolkit.hide(window).unwrap();
        toolkit.dispatch_pending().unwrap();
        assert_eq!(
            *kinds.borrow(),
            vec![
                WindowEventKind::Opened,
                WindowEventKind::Activated,
                WindowEventKind::Closing,
                WindowEventKind::Closed,
            ]
        );
    }
}
