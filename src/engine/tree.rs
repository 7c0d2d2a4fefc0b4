//! Component tree - Hierarchy, validation, geometry and colours.
//!
//! # API
//!
//! - `create_panel()`, `create_widget(w)`, `create_window(owner)`,
//!   `create_frame(title, owner)` - allocate components
//! - `add(parent, child, constraint)` / `remove(parent, child)` /
//!   `destroy(id)` - reshape the tree
//! - `set_visible()` / `set_enabled()` - flags, moving the focus off
//!   components that lose it
//! - `invalidate()` / `validate()` - lazy layout
//! - `repaint()` - ask for the owning window to be painted
//!
//! Getters take an id and fall back to a neutral value (empty rect, zero
//! size, no children) for ids that no longer resolve. Mutators return
//! [`ToolkitError::UnknownComponent`] instead.
//!
//! Every precondition is checked before the tree is touched, so a failed
//! call leaves it exactly as it was.

use tracing::{debug, warn};

use super::node::{FocusCache, Node, WindowData};
use super::registry::Registry;
use super::{ComponentId, ComponentKind, Peer};
use crate::error::{Result, ToolkitError};
use crate::event::{
    ActionEvent, ActionListener, Event, EventQueue, FocusEvent, FocusListener, ItemEvent,
    ItemListener, KeyEvent, KeyListener, ListenerId, ListenerList, Listeners, MouseEvent,
    MouseListener, PaintEvent, WindowEvent, WindowListener,
};
use crate::layout::{Constraint, DockLayout, FlowLayout, LayoutManager};
use crate::toolkit::{Toolkit, WindowStack};
use crate::types::{BorderStyle, ColorPair, Insets, Point, Rect, Size};
use crate::widgets::Widget;

// =============================================================================
// TREE
// =============================================================================

/// The component arena plus the state every tree operation needs: the
/// queue to post focus and paint events on and the window stack to tell
/// which window is active.
pub struct Tree {
    pub(super) nodes: Registry<Node>,
    pub(super) queue: EventQueue,
    pub(super) windows: WindowStack,
    /// Last component sent FOCUS_GAINED.
    pub(super) last_focus: Option<ComponentId>,
    /// Windows with a paint event already queued.
    pending_paint: Vec<ComponentId>,
}

impl Tree {
    pub(crate) fn new(queue: EventQueue, windows: WindowStack) -> Self {
        Self {
            nodes: Registry::new(),
            queue,
            windows,
            last_focus: None,
            pending_paint: Vec::new(),
        }
    }

    pub(crate) fn node(&self, id: ComponentId) -> Result<&Node> {
        self.nodes.get(id).ok_or(ToolkitError::UnknownComponent(id))
    }

    pub(crate) fn node_mut(&mut self, id: ComponentId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id)
            .ok_or(ToolkitError::UnknownComponent(id))
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub fn windows(&self) -> &WindowStack {
        &self.windows
    }

    // =========================================================================
    // CREATION
    // =========================================================================

    /// A panel with a centred [`FlowLayout`].
    pub fn create_panel(&mut self) -> ComponentId {
        self.create_panel_with(FlowLayout::default())
    }

    pub fn create_panel_with(&mut self, layout: impl LayoutManager + 'static) -> ComponentId {
        self.nodes.insert(Node::panel(Box::new(layout)))
    }

    pub fn create_widget(&mut self, widget: impl Widget + 'static) -> ComponentId {
        self.nodes.insert(Node::widget(Box::new(widget)))
    }

    /// A bare window with a [`DockLayout`]. Hidden until shown.
    pub fn create_window(&mut self, owner: Option<ComponentId>) -> Result<ComponentId> {
        if let Some(owner) = owner
            && !self.is_window(owner)
        {
            return Err(ToolkitError::NotAWindow(owner));
        }
        let id = self
            .nodes
            .insert(Node::window(Box::new(DockLayout::new()), owner));
        debug!(window = %id, "created window");
        Ok(id)
    }

    /// A window with a single border, the title drawn into the top edge and
    /// insets of one cell.
    pub fn create_frame(&mut self, title: &str, owner: Option<ComponentId>) -> Result<ComponentId> {
        let id = self.create_window(owner)?;
        let node = self.node_mut(id)?;
        node.insets = Insets::uniform(1);
        if let Some(data) = node.window.as_mut() {
            data.title = Some(title.to_string());
            data.border = Some(BorderStyle::Single);
        }
        Ok(id)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn contains(&self, id: ComponentId) -> bool {
        self.nodes.contains(id)
    }

    /// Number of live components.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    pub fn kind(&self, id: ComponentId) -> Option<ComponentKind> {
        self.nodes.get(id).map(|n| n.kind)
    }

    pub fn is_container(&self, id: ComponentId) -> bool {
        self.nodes.get(id).is_some_and(Node::is_container)
    }

    pub fn is_window(&self, id: ComponentId) -> bool {
        self.kind(id) == Some(ComponentKind::Window)
    }

    pub fn parent(&self, id: ComponentId) -> Option<ComponentId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Children in paint order (first is painted first).
    pub fn children(&self, id: ComponentId) -> &[ComponentId] {
        self.nodes.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Parent chain, nearest first, excluding `id`.
    pub fn ancestors(&self, id: ComponentId) -> impl Iterator<Item = ComponentId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Topmost ancestor (`id` itself for roots).
    pub fn root(&self, id: ComponentId) -> ComponentId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// The window `id` lives in, if it is attached to one.
    pub fn window_of(&self, id: ComponentId) -> Option<ComponentId> {
        let root = self.root(id);
        self.is_window(root).then_some(root)
    }

    pub fn is_ancestor_or_self(&self, ancestor: ComponentId, id: ComponentId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }

    pub fn name(&self, id: ComponentId) -> Option<&str> {
        self.nodes.get(id).and_then(|n| n.name.as_deref())
    }

    pub fn set_name(&mut self, id: ComponentId, name: &str) -> Result<()> {
        self.node_mut(id)?.name = Some(name.to_string());
        Ok(())
    }

    /// Depth-first search of `root`'s subtree for a component named `name`.
    pub fn find_by_name(&self, root: ComponentId, name: &str) -> Option<ComponentId> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if self.name(id) == Some(name) {
                return Some(id);
            }
            stack.extend(self.children(id).iter().rev());
        }
        None
    }

    // =========================================================================
    // HIERARCHY
    // =========================================================================

    /// Append `child` to `parent` under `constraint`, detaching it from its
    /// current parent first.
    pub fn add(
        &mut self,
        parent: ComponentId,
        child: ComponentId,
        constraint: impl Into<Constraint>,
    ) -> Result<()> {
        let constraint = constraint.into();
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;

        if !parent_node.is_container() {
            return Err(ToolkitError::NotAContainer(parent));
        }
        if child_node.kind == ComponentKind::Window {
            return Err(ToolkitError::WindowNesting(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(ToolkitError::Cycle { parent, child });
        }
        if let Some(layout) = parent_node.layout.as_ref() {
            layout.check_constraint(&constraint)?;
        }

        if let Some(old) = child_node.parent {
            self.remove(old, child)?;
        }

        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        self.with_layout(parent, |layout, tree| {
            layout.add_layout_component(tree, child, constraint)
        });

        if self.is_displayable(parent) {
            self.add_notify(child);
        }
        self.invalidate(parent);
        self.unresolve_empty_caches(parent);
        self.repaint(parent);
        Ok(())
    }

    /// [`Tree::add`] with no constraint.
    pub fn add_child(&mut self, parent: ComponentId, child: ComponentId) -> Result<()> {
        self.add(parent, child, Constraint::None)
    }

    /// Detach `child` from `parent`. If the subtree held the focus it is
    /// re-resolved for `parent`'s window.
    pub fn remove(&mut self, parent: ComponentId, child: ComponentId) -> Result<()> {
        if !self.node(parent)?.is_container() {
            return Err(ToolkitError::NotAContainer(parent));
        }
        if self.node(child)?.parent != Some(parent) {
            return Err(ToolkitError::NotAChild { parent, child });
        }

        let holder = self.focus_holder_in(child);
        let shown_card = self
            .visible_card_position(parent)
            .and_then(|(index, card)| (card == child).then_some(index));

        let node = self.node_mut(parent)?;
        node.children.retain(|&c| c != child);
        if let Some(layout) = node.layout.as_mut() {
            layout.remove_layout_component(child);
        }
        self.node_mut(child)?.parent = None;

        if self.is_displayable(child) {
            self.remove_notify(child);
        }
        if let Some(index) = shown_card {
            self.reveal_card_after_removal(parent, index)?;
        }
        self.invalidate(parent);
        if let Some(owner) = holder {
            self.refocus_after_loss(parent, owner)?;
        }
        self.repaint(parent);
        debug!(parent = %parent, child = %child, "removed component");
        Ok(())
    }

    pub fn remove_all(&mut self, parent: ComponentId) -> Result<()> {
        if !self.node(parent)?.is_container() {
            return Err(ToolkitError::NotAContainer(parent));
        }
        for child in self.children(parent).to_vec() {
            self.remove(parent, child)?;
        }
        Ok(())
    }

    /// Free `id` and its whole subtree. Ids into it stop resolving. A
    /// shown window must be closed first.
    pub fn destroy(&mut self, id: ComponentId) -> Result<()> {
        let node = self.node(id)?;
        if node.window.as_ref().is_some_and(|w| w.peer.is_some()) {
            return Err(ToolkitError::WindowShowing(id));
        }
        if let Some(parent) = node.parent {
            self.remove(parent, id)?;
        }

        let mut stack = vec![id];
        let mut freed = 0usize;
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children);
                freed += 1;
            }
        }
        if self.last_focus.is_some_and(|f| !self.contains(f)) {
            self.last_focus = None;
        }
        debug!(component = %id, freed, "destroyed subtree");
        Ok(())
    }

    /// Replace the layout of `container`. Existing children are re-added
    /// to the new layout with no constraint.
    pub fn set_layout(
        &mut self,
        container: ComponentId,
        layout: impl LayoutManager + 'static,
    ) -> Result<()> {
        let node = self.node(container)?;
        if !node.is_container() {
            return Err(ToolkitError::NotAContainer(container));
        }
        if !node.children.is_empty() {
            layout.check_constraint(&Constraint::None)?;
        }

        self.node_mut(container)?.layout = Some(Box::new(layout));
        for child in self.children(container).to_vec() {
            self.with_layout(container, |layout, tree| {
                layout.add_layout_component(tree, child, Constraint::None)
            });
        }
        self.invalidate(container);
        self.repaint(container);
        Ok(())
    }

    /// Run `f` with the layout of `id` taken out of the node, so the layout
    /// can borrow the tree mutably.
    pub(crate) fn with_layout<R>(
        &mut self,
        id: ComponentId,
        f: impl FnOnce(&mut dyn LayoutManager, &mut Tree) -> R,
    ) -> Option<R> {
        let mut layout = self.nodes.get_mut(id)?.layout.take()?;
        let result = f(layout.as_mut(), self);
        if let Some(node) = self.nodes.get_mut(id) {
            node.layout = Some(layout);
        }
        Some(result)
    }

    // =========================================================================
    // VISIBILITY / ENABLED
    // =========================================================================

    /// Own visibility flag (ancestors not considered).
    pub fn is_visible(&self, id: ComponentId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.visible)
    }

    pub fn is_enabled(&self, id: ComponentId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.enabled)
    }

    /// Visible itself, every ancestor visible, and the window shown.
    pub fn is_showing(&self, id: ComponentId) -> bool {
        self.is_displayable(id)
            && std::iter::once(id)
                .chain(self.ancestors(id))
                .all(|a| self.is_visible(a))
    }

    /// Show or hide a component.
    ///
    /// Hiding the focus owner first moves the focus to the next
    /// traversable component outside it; if there is none the call fails
    /// with [`ToolkitError::NoFocusSuccessor`] and nothing changes. Hiding a
    /// container that holds the focus moves it out if possible and clears
    /// it otherwise. Windows are shown and hidden through the toolkit.
    pub fn set_visible(&mut self, id: ComponentId, visible: bool) -> Result<()> {
        let node = self.node(id)?;
        if node.kind == ComponentKind::Window {
            return Err(ToolkitError::WindowVisibility(id));
        }
        if node.visible == visible {
            return Ok(());
        }
        if visible {
            self.node_mut(id)?.visible = true;
            self.unresolve_empty_caches(id);
            self.invalidate(id);
            self.repaint(id);
            Ok(())
        } else {
            self.hide(id, true)
        }
    }

    /// Clear the visible flag, moving the focus out of the subtree. With
    /// `strict` unset a leaf focus owner with no successor loses the focus
    /// instead of failing.
    pub(crate) fn hide(&mut self, id: ComponentId, strict: bool) -> Result<()> {
        let kind = self.node(id)?.kind;
        let holder = self.focus_holder_in(id);
        let successor = holder.and_then(|h| self.successor_excluding(h, id));

        if strict && kind == ComponentKind::Widget && holder.is_some() && successor.is_none() {
            return Err(ToolkitError::NoFocusSuccessor(id));
        }

        if let Some(next) = successor {
            self.request_focus(next)?;
        }
        self.node_mut(id)?.visible = false;
        if let Some(owner) = holder {
            self.forget_focus_in(id);
            if successor.is_none() {
                self.clear_focus(owner);
            }
        }
        self.invalidate(id);
        self.repaint(id);
        Ok(())
    }

    /// Enable or disable a component. Disabling the focus holder moves the
    /// focus on, or clears it when nothing else can take it.
    pub fn set_enabled(&mut self, id: ComponentId, enabled: bool) -> Result<()> {
        if self.node(id)?.enabled == enabled {
            return Ok(());
        }
        if enabled {
            self.node_mut(id)?.enabled = true;
            self.unresolve_empty_caches(id);
        } else {
            let holder = self.focus_holder_in(id);
            let successor = holder.and_then(|h| self.successor_excluding(h, id));
            if let Some(next) = successor {
                self.request_focus(next)?;
            }
            self.node_mut(id)?.enabled = false;
            if let Some(owner) = holder {
                self.forget_focus_in(id);
                if successor.is_none() {
                    self.clear_focus(owner);
                }
            }
        }
        self.repaint(id);
        Ok(())
    }

    // =========================================================================
    // VALIDATION
    // =========================================================================

    /// Mark `id` and every ancestor as needing layout.
    pub fn invalidate(&mut self, id: ComponentId) {
        let mut current = Some(id);
        while let Some(c) = current {
            let Some(node) = self.nodes.get_mut(c) else {
                break;
            };
            node.valid = false;
            current = node.parent;
        }
    }

    pub fn is_valid(&self, id: ComponentId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.valid)
    }

    /// Lay out every invalid container in `id`'s subtree, top-down. A
    /// second call with nothing invalidated in between does nothing.
    pub fn validate(&mut self, id: ComponentId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        if node.valid {
            return;
        }

        if node.is_container() {
            let overflow = self
                .with_layout(id, |layout, tree| layout.layout_container(tree, id))
                .unwrap_or_default();
            if !overflow.is_empty() {
                // Removal invalidates up to the root; the path keeps the
                // state it had before this pass.
                let path: Vec<_> = self
                    .ancestors(id)
                    .map(|a| (a, self.is_valid(a)))
                    .collect();
                for child in overflow {
                    debug!(container = %id, child = %child, "layout overflow, removing child");
                    if let Err(err) = self.remove(id, child) {
                        warn!(container = %id, child = %child, %err, "could not remove overflowing child");
                    }
                }
                for (ancestor, valid) in path {
                    if let Some(node) = self.nodes.get_mut(ancestor) {
                        node.valid = valid;
                    }
                }
            }
            for child in self.children(id).to_vec() {
                self.validate(child);
            }
        }

        if let Some(node) = self.nodes.get_mut(id) {
            node.valid = true;
        }
    }

    /// Set bounds on behalf of a layout manager. A child whose size changes
    /// is marked invalid so its own layout reruns.
    pub fn place(&mut self, id: ComponentId, bounds: Rect) {
        if let Some(node) = self.nodes.get_mut(id) {
            if node.bounds.size() != bounds.size() {
                node.valid = false;
            }
            node.bounds = bounds;
        }
    }

    // =========================================================================
    // GEOMETRY
    // =========================================================================

    /// Parent-relative bounds (screen bounds for windows).
    pub fn bounds(&self, id: ComponentId) -> Rect {
        self.nodes.get(id).map_or(Rect::EMPTY, |n| n.bounds)
    }

    pub fn size(&self, id: ComponentId) -> Size {
        self.bounds(id).size()
    }

    pub fn set_bounds(&mut self, id: ComponentId, bounds: Rect) -> Result<()> {
        let node = self.node_mut(id)?;
        let moved_window = node.kind == ComponentKind::Window && node.bounds != bounds;
        node.bounds = bounds;
        self.invalidate(id);
        if moved_window {
            // Cells the window uncovered belong to the windows below it.
            if let Some(bottom) = self.windows.bottom() {
                self.repaint(bottom);
            }
        }
        self.repaint(id);
        Ok(())
    }

    pub fn set_location(&mut self, id: ComponentId, x: i32, y: i32) -> Result<()> {
        let size = self.node(id)?.bounds.size();
        self.set_bounds(id, Rect::from_parts(Point::new(x, y), size))
    }

    pub fn set_size(&mut self, id: ComponentId, width: i32, height: i32) -> Result<()> {
        let origin = self.node(id)?.bounds.origin();
        self.set_bounds(id, Rect::from_parts(origin, Size::new(width, height)))
    }

    /// Top-left corner in screen coordinates.
    pub fn location_on_screen(&self, id: ComponentId) -> Point {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .fold(Point::ORIGIN, |acc, c| acc + self.bounds(c).origin())
    }

    /// Deepest visible component of `window` containing the screen point.
    pub fn component_at(&self, window: ComponentId, point: Point) -> Option<ComponentId> {
        let node = self.nodes.get(window)?;
        if !node.visible || !node.bounds.contains_point(point) {
            return None;
        }
        Some(self.deepest_at(window, point - node.bounds.origin()))
    }

    fn deepest_at(&self, id: ComponentId, local: Point) -> ComponentId {
        // Later children paint over earlier ones.
        for &child in self.children(id).iter().rev() {
            if let Some(node) = self.nodes.get(child)
                && node.visible
                && node.bounds.contains_point(local)
            {
                return self.deepest_at(child, local - node.bounds.origin());
            }
        }
        id
    }

    // =========================================================================
    // SIZES
    // =========================================================================

    /// Override, else the widget's own minimum, else the layout's minimum
    /// (which includes insets).
    pub fn minimum_size(&self, id: ComponentId) -> Size {
        let Some(node) = self.nodes.get(id) else {
            return Size::ZERO;
        };
        if let Some(size) = node.minimum_size {
            return size;
        }
        if let Some(widget) = node.widget.as_ref() {
            return widget.minimum_size();
        }
        match node.layout.as_ref() {
            Some(layout) => layout.minimum_size(self, id),
            None => Size::ZERO.grow(node.insets),
        }
    }

    /// Never smaller than the minimum size.
    pub fn preferred_size(&self, id: ComponentId) -> Size {
        let Some(node) = self.nodes.get(id) else {
            return Size::ZERO;
        };
        let preferred = if let Some(widget) = node.widget.as_ref() {
            widget.preferred_size()
        } else if let Some(layout) = node.layout.as_ref() {
            layout.preferred_size(self, id)
        } else {
            Size::ZERO.grow(node.insets)
        };
        match node.minimum_size {
            Some(min) => preferred.max(min),
            None => preferred,
        }
    }

    pub fn set_minimum_size(&mut self, id: ComponentId, size: Option<Size>) -> Result<()> {
        self.node_mut(id)?.minimum_size = size;
        self.invalidate(id);
        Ok(())
    }

    pub fn insets(&self, id: ComponentId) -> Insets {
        self.nodes.get(id).map_or(Insets::ZERO, |n| n.insets)
    }

    pub fn set_insets(&mut self, id: ComponentId, insets: Insets) -> Result<()> {
        self.node_mut(id)?.insets = insets;
        self.invalidate(id);
        self.repaint(id);
        Ok(())
    }

    // =========================================================================
    // COLOURS
    // =========================================================================

    /// Explicitly set colours, if any.
    pub fn colors(&self, id: ComponentId) -> Option<ColorPair> {
        self.nodes.get(id).and_then(|n| n.colors)
    }

    pub fn set_colors(&mut self, id: ComponentId, colors: Option<ColorPair>) -> Result<()> {
        self.node_mut(id)?.colors = colors;
        self.repaint(id);
        Ok(())
    }

    /// Own colours, else the nearest ancestor's, else `default`.
    pub fn effective_colors(&self, id: ComponentId, default: ColorPair) -> ColorPair {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find_map(|c| self.colors(c))
            .unwrap_or(default)
    }

    // =========================================================================
    // WIDGETS
    // =========================================================================

    /// Borrow the widget delegate of `id` as its concrete type.
    pub fn widget<W: Widget>(&self, id: ComponentId) -> Option<&W> {
        self.nodes
            .get(id)?
            .widget
            .as_deref()?
            .as_any()
            .downcast_ref::<W>()
    }

    /// Mutate a widget delegate, then re-layout and repaint it.
    pub fn update_widget<W: Widget, R>(
        &mut self,
        id: ComponentId,
        f: impl FnOnce(&mut W) -> R,
    ) -> Option<R> {
        let widget = self
            .nodes
            .get_mut(id)?
            .widget
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<W>()?;
        let result = f(widget);
        self.invalidate(id);
        self.repaint(id);
        Some(result)
    }

    pub(crate) fn take_widget(&mut self, id: ComponentId) -> Option<Box<dyn Widget>> {
        self.nodes.get_mut(id)?.widget.take()
    }

    pub(crate) fn restore_widget(&mut self, id: ComponentId, widget: Box<dyn Widget>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.widget = Some(widget);
        }
    }

    // =========================================================================
    // LISTENERS
    // =========================================================================

    fn push_listener<L>(
        &mut self,
        id: ComponentId,
        select: fn(&mut Listeners) -> &mut ListenerList<L>,
        listener: L,
    ) -> Result<ListenerId> {
        let listener_id = ListenerId::next();
        select(&mut self.node_mut(id)?.listeners).push((listener_id, listener));
        Ok(listener_id)
    }

    pub fn add_key_listener(
        &mut self,
        id: ComponentId,
        listener: impl FnMut(&mut Toolkit, &mut KeyEvent) + 'static,
    ) -> Result<ListenerId> {
        self.push_listener(id, |l| &mut l.key, Box::new(listener) as KeyListener)
    }

    pub fn add_mouse_listener(
        &mut self,
        id: ComponentId,
        listener: impl FnMut(&mut Toolkit, &mut MouseEvent) + 'static,
    ) -> Result<ListenerId> {
        self.push_listener(id, |l| &mut l.mouse, Box::new(listener) as MouseListener)
    }

    pub fn add_focus_listener(
        &mut self,
        id: ComponentId,
        listener: impl FnMut(&mut Toolkit, &FocusEvent) + 'static,
    ) -> Result<ListenerId> {
        self.push_listener(id, |l| &mut l.focus, Box::new(listener) as FocusListener)
    }

    pub fn add_action_listener(
        &mut self,
        id: ComponentId,
        listener: impl FnMut(&mut Toolkit, &ActionEvent) + 'static,
    ) -> Result<ListenerId> {
        self.push_listener(id, |l| &mut l.action, Box::new(listener) as ActionListener)
    }

    pub fn add_item_listener(
        &mut self,
        id: ComponentId,
        listener: impl FnMut(&mut Toolkit, &ItemEvent) + 'static,
    ) -> Result<ListenerId> {
        self.push_listener(id, |l| &mut l.item, Box::new(listener) as ItemListener)
    }

    pub fn add_window_listener(
        &mut self,
        window: ComponentId,
        listener: impl FnMut(&mut Toolkit, &WindowEvent) + 'static,
    ) -> Result<ListenerId> {
        if !self.is_window(window) {
            self.node(window)?;
            return Err(ToolkitError::NotAWindow(window));
        }
        self.push_listener(window, |l| &mut l.window, Box::new(listener) as WindowListener)
    }

    /// Remove a listener registered on `id`. Safe to call from inside the
    /// listener itself.
    pub fn remove_listener(&mut self, id: ComponentId, listener: ListenerId) -> bool {
        self.nodes
            .get_mut(id)
            .is_some_and(|n| n.listeners.remove(listener))
    }

    // =========================================================================
    // PAINT REQUESTS
    // =========================================================================

    /// Queue a paint of `id`'s window. No-op unless the window is shown; at
    /// most one paint per window is queued at a time.
    pub fn repaint(&mut self, id: ComponentId) {
        let window = self.root(id);
        if !self.is_window(window) || !self.is_displayable(window) {
            return;
        }
        if self.pending_paint.contains(&window) {
            return;
        }
        self.pending_paint.push(window);
        self.queue.post_event(Event::Paint(PaintEvent { window }));
    }

    /// Called by dispatch when a paint event is taken off the queue.
    pub(crate) fn paint_started(&mut self, window: ComponentId) {
        self.pending_paint.retain(|&w| w != window);
    }

    /// Forget every queued paint. Called after the queue is drained.
    pub(crate) fn clear_pending_paints(&mut self) {
        self.pending_paint.clear();
    }

    // =========================================================================
    // WINDOWS
    // =========================================================================

    fn window_data(&self, id: ComponentId) -> Option<&WindowData> {
        self.nodes.get(id)?.window.as_ref()
    }

    fn window_data_mut(&mut self, id: ComponentId) -> Result<&mut WindowData> {
        self.node_mut(id)?
            .window
            .as_mut()
            .ok_or(ToolkitError::NotAWindow(id))
    }

    pub fn title(&self, window: ComponentId) -> Option<&str> {
        self.window_data(window)?.title.as_deref()
    }

    pub fn set_title(&mut self, window: ComponentId, title: Option<&str>) -> Result<()> {
        self.window_data_mut(window)?.title = title.map(str::to_string);
        self.repaint(window);
        Ok(())
    }

    pub fn border(&self, window: ComponentId) -> Option<BorderStyle> {
        self.window_data(window)?.border
    }

    pub fn set_border(&mut self, window: ComponentId, border: Option<BorderStyle>) -> Result<()> {
        self.window_data_mut(window)?.border = border;
        self.repaint(window);
        Ok(())
    }

    pub fn owner(&self, window: ComponentId) -> Option<ComponentId> {
        self.window_data(window)?.owner
    }

    pub fn peer(&self, window: ComponentId) -> Option<Peer> {
        self.window_data(window)?.peer
    }

    pub(crate) fn set_peer(&mut self, window: ComponentId, peer: Option<Peer>) -> Result<()> {
        self.window_data_mut(window)?.peer = peer;
        Ok(())
    }

    /// True while the component's window is shown.
    pub fn is_displayable(&self, id: ComponentId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.displayable)
    }

    /// Mark a subtree displayable (its window was shown or it joined a
    /// shown window).
    pub(crate) fn add_notify(&mut self, id: ComponentId) {
        self.set_displayable(id, true);
    }

    /// Mark a subtree undisplayable. A window taken down this way no longer
    /// has a paint pending; its queued paint is dropped on dispatch.
    pub(crate) fn remove_notify(&mut self, id: ComponentId) {
        self.set_displayable(id, false);
        self.pending_paint.retain(|&w| w != id);
    }

    fn set_displayable(&mut self, id: ComponentId, displayable: bool) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current) {
                node.displayable = displayable;
                node.valid &= displayable;
                stack.extend(node.children.iter().copied());
            }
        }
    }

    pub(crate) fn set_focus_cache(&mut self, id: ComponentId, cache: FocusCache) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.focus = cache;
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
