//! Dock layout - Five slots around a central area.
//!
//! ```text
//! ┌──────────────────────┐
//! │         Top          │
//! ├──────┬────────┬──────┤
//! │ Left │ Center │ Right│
//! ├──────┴────────┴──────┤
//! │        Bottom        │
//! └──────────────────────┘
//! ```
//!
//! Top and bottom take their preferred height across the full width; left
//! and right take their preferred width across the middle height; the
//! center gets whatever is left. Adding to an occupied slot replaces the
//! previous occupant in the layout (it stays a child of the container).

use super::{fit, interior, unsupported, Constraint, LayoutManager};
use crate::engine::{ComponentId, Tree};
use crate::error::Result;
use crate::types::{Rect, Size};

/// Slot of a [`DockLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Default)]
pub struct DockLayout {
    hgap: i32,
    vgap: i32,
    top: Option<ComponentId>,
    bottom: Option<ComponentId>,
    left: Option<ComponentId>,
    right: Option<ComponentId>,
    center: Option<ComponentId>,
}

impl DockLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gaps between the middle-row slots (`hgap`) and between rows
    /// (`vgap`).
    pub fn with_gaps(hgap: i32, vgap: i32) -> Self {
        Self {
            hgap: hgap.max(0),
            vgap: vgap.max(0),
            ..Self::default()
        }
    }

    /// Component registered at `edge`.
    pub fn get(&self, edge: Edge) -> Option<ComponentId> {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
            Edge::Right => self.right,
            Edge::Center => self.center,
        }
    }

    /// Edge `child` is registered at.
    pub fn edge_of(&self, child: ComponentId) -> Option<Edge> {
        [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right, Edge::Center]
            .into_iter()
            .find(|&edge| self.get(edge) == Some(child))
    }

    fn slot_mut(&mut self, edge: Edge) -> &mut Option<ComponentId> {
        match edge {
            Edge::Top => &mut self.top,
            Edge::Bottom => &mut self.bottom,
            Edge::Left => &mut self.left,
            Edge::Right => &mut self.right,
            Edge::Center => &mut self.center,
        }
    }

    fn visible(&self, tree: &Tree, edge: Edge) -> Option<ComponentId> {
        self.get(edge).filter(|&c| tree.is_visible(c))
    }
}

impl LayoutManager for DockLayout {
    fn name(&self) -> &'static str {
        "DockLayout"
    }

    fn check_constraint(&self, constraint: &Constraint) -> Result<()> {
        match constraint {
            Constraint::None | Constraint::Edge(_) => Ok(()),
            other => Err(unsupported(self.name(), other)),
        }
    }

    /// No constraint means [`Edge::Center`].
    fn add_layout_component(&mut self, _tree: &mut Tree, child: ComponentId, constraint: Constraint) {
        let edge = match constraint {
            Constraint::Edge(edge) => edge,
            _ => Edge::Center,
        };
        self.remove_layout_component(child);
        *self.slot_mut(edge) = Some(child);
    }

    fn remove_layout_component(&mut self, child: ComponentId) {
        for edge in [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right, Edge::Center] {
            let slot = self.slot_mut(edge);
            if *slot == Some(child) {
                *slot = None;
            }
        }
    }

    fn minimum_size(&self, tree: &Tree, container: ComponentId) -> Size {
        self.measure(tree, container, Tree::minimum_size)
    }

    fn preferred_size(&self, tree: &Tree, container: ComponentId) -> Size {
        self.measure(tree, container, Tree::preferred_size)
    }

    fn layout_container(&mut self, tree: &mut Tree, container: ComponentId) -> Vec<ComponentId> {
        let area = interior(tree, container);
        let mut top = area.y;
        let mut bottom = area.bottom();
        let mut left = area.x;
        let mut right = area.right();

        if let Some(child) = self.visible(tree, Edge::Top) {
            let height = tree.preferred_size(child).height.min(bottom - top).max(0);
            let slot = Rect::new(left, top, right - left, height);
            tree.place(child, fit(tree, child, slot));
            top += height + self.vgap;
        }
        if let Some(child) = self.visible(tree, Edge::Bottom) {
            let height = tree.preferred_size(child).height.min(bottom - top).max(0);
            let slot = Rect::new(left, bottom - height, right - left, height);
            tree.place(child, fit(tree, child, slot));
            bottom -= height + self.vgap;
        }

        let middle = (bottom - top).max(0);
        if let Some(child) = self.visible(tree, Edge::Right) {
            let width = tree.preferred_size(child).width.min(right - left).max(0);
            let slot = Rect::new(right - width, top, width, middle);
            tree.place(child, fit(tree, child, slot));
            right -= width + self.hgap;
        }
        if let Some(child) = self.visible(tree, Edge::Left) {
            let width = tree.preferred_size(child).width.min(right - left).max(0);
            let slot = Rect::new(left, top, width, middle);
            tree.place(child, fit(tree, child, slot));
            left += width + self.hgap;
        }
        if let Some(child) = self.visible(tree, Edge::Center) {
            let slot = Rect::new(left, top, (right - left).max(0), middle);
            tree.place(child, fit(tree, child, slot));
        }
        Vec::new()
    }
}

impl DockLayout {
    fn measure(
        &self,
        tree: &Tree,
        container: ComponentId,
        size_of: fn(&Tree, ComponentId) -> Size,
    ) -> Size {
        let mut width = 0;
        let mut height = 0;

        for edge in [Edge::Right, Edge::Left] {
            if let Some(child) = self.visible(tree, edge) {
                let size = size_of(tree, child);
                width += size.width + self.hgap;
                height = height.max(size.height);
            }
        }
        if let Some(child) = self.visible(tree, Edge::Center) {
            let size = size_of(tree, child);
            width += size.width;
            height = height.max(size.height);
        }
        for edge in [Edge::Top, Edge::Bottom] {
            if let Some(child) = self.visible(tree, edge) {
                let size = size_of(tree, child);
                width = width.max(size.width);
                height += size.height + self.vgap;
            }
        }

        Size::new(width, height).grow(tree.insets(container))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventQueue;
    use crate::toolkit::WindowStack;
    use crate::types::Insets;
    use crate::widgets::{Filler, Label};

    fn setup() -> (Tree, ComponentId) {
        let mut tree = Tree::new(EventQueue::new(), WindowStack::default());
        let dock = tree.create_panel_with(DockLayout::new());
        (tree, dock)
    }

    #[test]
    fn test_center_gets_remaining_width() {
        let (mut tree, dock) = setup();
        let left = tree.create_widget(Filler::new(10, 1));
        let right = tree.create_widget(Filler::new(5, 1));
        let center = tree.create_panel();
        tree.add(dock, left, Edge::Left).unwrap();
        tree.add(dock, right, Edge::Right).unwrap();
        tree.add(dock, center, Edge::Center).unwrap();

        tree.set_bounds(dock, Rect::new(0, 0, 40, 10)).unwrap();
        tree.validate(dock);

        assert_eq!(tree.bounds(center), Rect::new(10, 0, 25, 10));
        assert_eq!(tree.bounds(right).x, 35);
    }

    #[test]
    fn test_center_width_never_negative() {
        let (mut tree, dock) = setup();
        let left = tree.create_widget(Filler::new(10, 1));
        let right = tree.create_widget(Filler::new(10, 1));
        let center = tree.create_panel();
        tree.add(dock, left, Edge::Left).unwrap();
        tree.add(dock, right, Edge::Right).unwrap();
        tree.add(dock, center, Edge::Center).unwrap();

        tree.set_bounds(dock, Rect::new(0, 0, 15, 4)).unwrap();
        tree.validate(dock);
        assert_eq!(tree.bounds(center).width, 0);
    }

    #[test]
    fn test_top_label_and_center_panel() {
        let (mut tree, dock) = setup();
        let label = tree.create_widget(Label::new("Title"));
        let panel = tree.create_panel();
        tree.add(dock, label, Edge::Top).unwrap();
        tree.add(dock, panel, Edge::Center).unwrap();

        tree.set_bounds(dock, Rect::new(0, 0, 80, 24)).unwrap();
        tree.validate(dock);

        let label_height = tree.minimum_size(label).height;
        assert_eq!(tree.bounds(panel), Rect::new(0, label_height, 80, 24 - label_height));
        // Widget keeps its size, centred horizontally
        assert_eq!(tree.bounds(label), Rect::new(37, 0, 5, 1));
    }

    #[test]
    fn test_minimum_size_sums_rows_and_middle() {
        let (mut tree, dock) = setup();
        let top = tree.create_widget(Filler::new(30, 2));
        let left = tree.create_widget(Filler::new(4, 3));
        let center = tree.create_widget(Filler::new(6, 5));
        let bottom = tree.create_widget(Filler::new(8, 1));
        tree.add(dock, top, Edge::Top).unwrap();
        tree.add(dock, left, Edge::Left).unwrap();
        tree.add(dock, center, Edge::Center).unwrap();
        tree.add(dock, bottom, Edge::Bottom).unwrap();
        tree.set_insets(dock, Insets::uniform(1)).unwrap();

        assert_eq!(tree.minimum_size(dock), Size::new(32, 10));
    }

    #[test]
    fn test_readding_moves_slot() {
        let (mut tree, dock) = setup();
        let label = tree.create_widget(Label::new("x"));
        tree.add(dock, label, Edge::Top).unwrap();
        tree.add(dock, label, Edge::Bottom).unwrap();
        assert_eq!(tree.children(dock), &[label]);
        assert_eq!(tree.minimum_size(dock), Size::new(1, 1));
    }
}
