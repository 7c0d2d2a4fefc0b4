//! Widgets - Leaf component delegates.
//!
//! A widget component owns a boxed [`Widget`] that decides its size, how it
//! paints and what it does with keys and clicks. The tree handles
//! everything else (placement, focus, colours).
//!
//! # Provided widgets
//!
//! - [`Label`] - one line of text, never focusable
//! - [`Button`] - `[ text ]`, fires an action on Enter, Space or a click
//! - [`CheckBox`] - `[x] text`, fires an item event when toggled
//! - [`Filler`] - fixed-size blank area, optionally focusable
//!
//! # Example
//!
//! ```ignore
//! let ok = tree.create_widget(Button::new("OK"));
//! tree.add_action_listener(ok, |toolkit, ev| {
//!     tracing::info!(command = %ev.command, "pressed");
//! })?;
//! ```

use std::any::Any;

use unicode_width::UnicodeWidthStr;

use crate::engine::ComponentId;
use crate::event::{
    ActionEvent, Event, EventQueue, ItemEvent, ItemState, Key, KeyEvent, KeyEventKind, MouseEvent,
};
use crate::render::Graphics;
use crate::types::{Point, Size};

// =============================================================================
// TRAIT
// =============================================================================

/// Downcasting support for widget delegates.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub trait Widget: AsAny {
    fn minimum_size(&self) -> Size;

    fn preferred_size(&self) -> Size {
        self.minimum_size()
    }

    /// Whether the widget takes part in focus traversal.
    fn is_focus_traversable(&self) -> bool {
        false
    }

    /// Draw into `g`, whose origin is the widget's top-left corner and whose
    /// colours are already set to the widget's effective colours.
    fn paint(&self, g: &mut Graphics<'_>, state: &WidgetState);

    /// Handle a key the listeners left unconsumed.
    fn process_key(&mut self, _ctx: &mut WidgetContext<'_>, _event: &mut KeyEvent) {}

    /// Handle a mouse press the listeners left unconsumed.
    fn process_mouse(&mut self, _ctx: &mut WidgetContext<'_>, _event: &mut MouseEvent) {}

    /// Where the cursor goes while the widget has the focus.
    fn cursor_position(&self, _state: &WidgetState) -> Option<Point> {
        None
    }
}

/// What a widget needs to know to paint itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetState {
    pub focused: bool,
    pub enabled: bool,
    pub size: Size,
}

/// Handed to a widget while it processes input.
pub struct WidgetContext<'a> {
    id: ComponentId,
    queue: &'a EventQueue,
    pub(crate) repaint: bool,
    pub(crate) relayout: bool,
}

impl<'a> WidgetContext<'a> {
    pub(crate) fn new(id: ComponentId, queue: &'a EventQueue) -> Self {
        Self {
            id,
            queue,
            repaint: false,
            relayout: false,
        }
    }

    /// The component the widget belongs to.
    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn post_event(&self, event: Event) {
        self.queue.post_event(event);
    }

    pub fn fire_action(&self, command: impl Into<String>) {
        self.post_event(Event::Action(ActionEvent {
            source: self.id,
            command: command.into(),
        }));
    }

    pub fn fire_item(&self, item: impl Into<String>, state: ItemState) {
        self.post_event(Event::Item(ItemEvent {
            source: self.id,
            item: item.into(),
            state,
        }));
    }

    /// Paint the widget again after the event.
    pub fn repaint(&mut self) {
        self.repaint = true;
    }

    /// The widget's size may have changed; lay its window out again.
    pub fn relayout(&mut self) {
        self.relayout = true;
        self.repaint = true;
    }
}

fn text_width(text: &str) -> i32 {
    UnicodeWidthStr::width(text) as i32
}

// =============================================================================
// LABEL
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    text: String,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Use through [`crate::engine::Tree::update_widget`] so the label is
    /// laid out again.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl Widget for Label {
    fn minimum_size(&self) -> Size {
        Size::new(text_width(&self.text), 1)
    }

    fn paint(&self, g: &mut Graphics<'_>, _state: &WidgetState) {
        g.draw_string(0, 0, &self.text);
    }
}

// =============================================================================
// BUTTON
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    label: String,
    command: Option<String>,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: None,
        }
    }

    /// Action command to fire instead of the label.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn command(&self) -> &str {
        self.command.as_deref().unwrap_or(&self.label)
    }

    fn press(&self, ctx: &mut WidgetContext<'_>) {
        ctx.fire_action(self.command());
        ctx.repaint();
    }
}

impl Widget for Button {
    fn minimum_size(&self) -> Size {
        Size::new(text_width(&self.label) + 4, 1)
    }

    fn is_focus_traversable(&self) -> bool {
        true
    }

    fn paint(&self, g: &mut Graphics<'_>, state: &WidgetState) {
        if state.focused {
            g.set_color_pair(g.color_pair().reversed());
        }
        g.draw_string(0, 0, &format!("[ {} ]", self.label));
    }

    fn process_key(&mut self, ctx: &mut WidgetContext<'_>, event: &mut KeyEvent) {
        if event.kind == KeyEventKind::Pressed
            && event.modifiers.is_empty()
            && matches!(event.key, Key::Enter | Key::Char(' '))
        {
            self.press(ctx);
            event.consume();
        }
    }

    fn process_mouse(&mut self, ctx: &mut WidgetContext<'_>, event: &mut MouseEvent) {
        self.press(ctx);
        event.consume();
    }

    fn cursor_position(&self, _state: &WidgetState) -> Option<Point> {
        Some(Point::new(2, 0))
    }
}

// =============================================================================
// CHECKBOX
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckBox {
    label: String,
    checked: bool,
}

impl CheckBox {
    pub fn new(label: impl Into<String>, checked: bool) -> Self {
        Self {
            label: label.into(),
            checked,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Set the state without firing an item event.
    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    fn toggle(&mut self, ctx: &mut WidgetContext<'_>) {
        self.checked = !self.checked;
        let state = if self.checked {
            ItemState::Selected
        } else {
            ItemState::Deselected
        };
        ctx.fire_item(self.label.clone(), state);
        ctx.repaint();
    }
}

impl Widget for CheckBox {
    fn minimum_size(&self) -> Size {
        Size::new(text_width(&self.label) + 4, 1)
    }

    fn is_focus_traversable(&self) -> bool {
        true
    }

    fn paint(&self, g: &mut Graphics<'_>, state: &WidgetState) {
        let mark = if self.checked { 'x' } else { ' ' };
        if state.focused {
            g.set_color_pair(g.color_pair().reversed());
        }
        g.draw_string(0, 0, &format!("[{mark}] {}", self.label));
    }

    fn process_key(&mut self, ctx: &mut WidgetContext<'_>, event: &mut KeyEvent) {
        if event.kind == KeyEventKind::Pressed && event.key == Key::Char(' ') {
            self.toggle(ctx);
            event.consume();
        }
    }

    fn process_mouse(&mut self, ctx: &mut WidgetContext<'_>, event: &mut MouseEvent) {
        self.toggle(ctx);
        event.consume();
    }

    fn cursor_position(&self, _state: &WidgetState) -> Option<Point> {
        Some(Point::new(1, 0))
    }
}

// =============================================================================
// FILLER
// =============================================================================

/// Blank area of a fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filler {
    size: Size,
    focusable: bool,
}

impl Filler {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            size: Size::new(width, height),
            focusable: false,
        }
    }

    /// A filler that takes part in focus traversal.
    pub fn focusable(width: i32, height: i32) -> Self {
        Self {
            focusable: true,
            ..Self::new(width, height)
        }
    }
}

impl Widget for Filler {
    fn minimum_size(&self) -> Size {
        self.size
    }

    fn is_focus_traversable(&self) -> bool {
        self.focusable
    }

    fn paint(&self, g: &mut Graphics<'_>, state: &WidgetState) {
        g.fill_rect(0, 0, state.size.width, state.size.height);
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Tree;
    use crate::event::{Modifiers, MouseButton};
    use crate::render::{MemoryTerminal, Terminal};
    use crate::toolkit::WindowStack;
    use crate::types::{ColorPair, Rect};

    fn setup() -> (EventQueue, ComponentId) {
        let queue = EventQueue::new();
        let mut tree = Tree::new(queue.clone(), WindowStack::default());
        let id = tree.create_widget(Filler::new(1, 1));
        (queue, id)
    }

    fn key(id: ComponentId, key: Key) -> KeyEvent {
        KeyEvent::new(id, KeyEventKind::Pressed, key, Modifiers::empty())
    }

    #[test]
    fn test_label_size_counts_display_columns() {
        assert_eq!(Label::new("abc").minimum_size(), Size::new(3, 1));
        assert_eq!(Label::new("日本").minimum_size(), Size::new(4, 1));
        assert!(!Label::new("x").is_focus_traversable());
    }

    #[test]
    fn test_button_fires_action_on_enter() {
        let (queue, id) = setup();
        let mut button = Button::new("OK");
        let mut ctx = WidgetContext::new(id, &queue);
        let mut event = key(id, Key::Enter);
        button.process_key(&mut ctx, &mut event);

        assert!(event.is_consumed());
        assert!(ctx.repaint);
        match queue.try_next_event() {
            Some(Event::Action(action)) => {
                assert_eq!(action.source, id);
                assert_eq!(action.command, "OK");
            }
            other => panic!("expected action, got {other:?}"),
        }
    }

    #[test]
    fn test_button_ignores_other_keys() {
        let (queue, id) = setup();
        let mut button = Button::new("OK").with_command("confirm");
        let mut ctx = WidgetContext::new(id, &queue);
        let mut event = key(id, Key::Char('q'));
        button.process_key(&mut ctx, &mut event);
        assert!(!event.is_consumed());
        assert!(queue.is_empty());
        assert_eq!(button.command(), "confirm");
    }

    #[test]
    fn test_checkbox_toggles_and_fires_item() {
        let (queue, id) = setup();
        let mut check = CheckBox::new("wrap", false);
        let mut ctx = WidgetContext::new(id, &queue);
        let mut click = MouseEvent::new(
            id,
            MouseButton::Left,
            1,
            Point::ORIGIN,
            Point::ORIGIN,
            Modifiers::empty(),
        );
        check.process_mouse(&mut ctx, &mut click);

        assert!(check.is_checked());
        match queue.try_next_event() {
            Some(Event::Item(item)) => {
                assert_eq!(item.item, "wrap");
                assert_eq!(item.state, ItemState::Selected);
            }
            other => panic!("expected item, got {other:?}"),
        }
    }

    #[test]
    fn test_focused_button_paints_reversed() {
        let term = MemoryTerminal::new(10, 1);
        let mut surface: Box<dyn Terminal> = Box::new(term.clone());
        let colors = ColorPair::default();
        let mut g = Graphics::new(surface.as_mut(), Rect::new(0, 0, 10, 1), colors);
        let state = WidgetState {
            focused: true,
            enabled: true,
            size: Size::new(6, 1),
        };
        Button::new("OK").paint(&mut g, &state);

        assert_eq!(term.text_at(0, 0, 6), "[ OK ]");
        assert_eq!(term.cell(0, 0).unwrap().attr, colors.reversed().attribute());
    }
}
