//! Flow layout - Rows of children left to right, wrapping when a row is
//! full.
//!
//! Children keep their preferred size (width clamped to the container).
//! Within a row they are vertically centred; rows are aligned left, centre
//! or right. A child whose height does not fit in the vertical space left
//! below the rows already placed is reported as overflow and removed from
//! the container.

use super::{interior, visible_children, LayoutManager};
use crate::engine::{ComponentId, Tree};
use crate::types::{Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlowAlignment {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowLayout {
    alignment: FlowAlignment,
    hgap: i32,
    vgap: i32,
}

impl Default for FlowLayout {
    /// Centred, one cell between children, no gap between rows.
    fn default() -> Self {
        Self {
            alignment: FlowAlignment::Center,
            hgap: 1,
            vgap: 0,
        }
    }
}

impl FlowLayout {
    pub fn new(alignment: FlowAlignment) -> Self {
        Self {
            alignment,
            ..Self::default()
        }
    }

    pub fn with_gaps(alignment: FlowAlignment, hgap: i32, vgap: i32) -> Self {
        Self {
            alignment,
            hgap: hgap.max(0),
            vgap: vgap.max(0),
        }
    }

    pub fn alignment(&self) -> FlowAlignment {
        self.alignment
    }

    /// All visible children on a single row.
    fn measure(
        &self,
        tree: &Tree,
        container: ComponentId,
        size_of: fn(&Tree, ComponentId) -> Size,
    ) -> Size {
        let mut width = 0;
        let mut height = 0;
        for (i, child) in visible_children(tree, container).into_iter().enumerate() {
            let size = size_of(tree, child);
            if i > 0 {
                width += self.hgap;
            }
            width += size.width;
            height = height.max(size.height);
        }
        Size::new(width, height).grow(tree.insets(container))
    }

    fn place_row(&self, tree: &mut Tree, area: Rect, y: i32, row: &[(ComponentId, Size)], height: i32) {
        let used: i32 = row.iter().map(|(_, s)| s.width).sum::<i32>()
            + self.hgap * (row.len() as i32 - 1).max(0);
        let free = (area.width - used).max(0);
        let mut x = match self.alignment {
            FlowAlignment::Left => area.x,
            FlowAlignment::Center => area.x + free / 2,
            FlowAlignment::Right => area.x + free,
        };
        for &(child, size) in row {
            let top = y + (height - size.height) / 2;
            tree.place(child, Rect::new(x, top, size.width, size.height));
            x += size.width + self.hgap;
        }
    }
}

impl LayoutManager for FlowLayout {
    fn name(&self) -> &'static str {
        "FlowLayout"
    }

    fn minimum_size(&self, tree: &Tree, container: ComponentId) -> Size {
        self.measure(tree, container, Tree::minimum_size)
    }

    fn preferred_size(&self, tree: &Tree, container: ComponentId) -> Size {
        self.measure(tree, container, Tree::preferred_size)
    }

    fn layout_container(&mut self, tree: &mut Tree, container: ComponentId) -> Vec<ComponentId> {
        let area = interior(tree, container);
        let mut overflow = Vec::new();
        let mut row: Vec<(ComponentId, Size)> = Vec::new();
        let mut row_width = 0;
        let mut row_height = 0;
        let mut y = area.y;

        for child in visible_children(tree, container) {
            let preferred = tree.preferred_size(child);
            let size = Size::new(preferred.width.min(area.width).max(0), preferred.height);

            if !row.is_empty() && row_width + self.hgap + size.width > area.width {
                self.place_row(tree, area, y, &row, row_height);
                y += row_height + self.vgap;
                row.clear();
                row_width = 0;
                row_height = 0;
            }

            if y + size.height > area.bottom() {
                overflow.push(child);
                continue;
            }

            if !row.is_empty() {
                row_width += self.hgap;
            }
            row_width += size.width;
            row_height = row_height.max(size.height);
            row.push((child, size));
        }
        if !row.is_empty() {
            self.place_row(tree, area, y, &row, row_height);
        }
        overflow
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
    use crate::widgets::Filler;

    fn setup(layout: FlowLayout) -> (Tree, ComponentId) {
        let mut tree = Tree::new(EventQueue::new(), WindowStack::default());
        let panel = tree.create_panel_with(layout);
        (tree, panel)
    }

    #[test]
    fn test_row_is_centred() {
        let (mut tree, panel) = setup(FlowLayout::default());
        let a = tree.create_widget(Filler::new(4, 1));
        let b = tree.create_widget(Filler::new(4, 1));
        tree.add_child(panel, a).unwrap();
        tree.add_child(panel, b).unwrap();
        tree.set_bounds(panel, Rect::new(0, 0, 19, 3)).unwrap();
        tree.validate(panel);

        // 4 + 1 + 4 = 9 wide, 10 free, 5 on the left
        assert_eq!(tree.bounds(a), Rect::new(5, 0, 4, 1));
        assert_eq!(tree.bounds(b), Rect::new(10, 0, 4, 1));
    }

    #[test]
    fn test_wraps_to_next_row() {
        let (mut tree, panel) = setup(FlowLayout::with_gaps(FlowAlignment::Left, 1, 1));
        let a = tree.create_widget(Filler::new(6, 1));
        let b = tree.create_widget(Filler::new(6, 2));
        tree.add_child(panel, a).unwrap();
        tree.add_child(panel, b).unwrap();
        tree.set_bounds(panel, Rect::new(0, 0, 10, 5)).unwrap();
        tree.validate(panel);

        assert_eq!(tree.bounds(a), Rect::new(0, 0, 6, 1));
        assert_eq!(tree.bounds(b), Rect::new(0, 2, 6, 2));
    }

    #[test]
    fn test_row_children_vertically_centred() {
        let (mut tree, panel) = setup(FlowLayout::new(FlowAlignment::Left));
        let short = tree.create_widget(Filler::new(2, 1));
        let tall = tree.create_widget(Filler::new(2, 3));
        tree.add_child(panel, short).unwrap();
        tree.add_child(panel, tall).unwrap();
        tree.set_bounds(panel, Rect::new(0, 0, 10, 3)).unwrap();
        tree.validate(panel);

        assert_eq!(tree.bounds(short).y, 1);
        assert_eq!(tree.bounds(tall).y, 0);
    }

    #[test]
    fn test_too_tall_child_is_removed() {
        let (mut tree, panel) = setup(FlowLayout::default());
        let fits = tree.create_widget(Filler::new(3, 1));
        let tall = tree.create_widget(Filler::new(3, 9));
        let also_fits = tree.create_widget(Filler::new(3, 2));
        tree.add_child(panel, fits).unwrap();
        tree.add_child(panel, tall).unwrap();
        tree.add_child(panel, also_fits).unwrap();
        tree.set_bounds(panel, Rect::new(0, 0, 20, 4)).unwrap();

        tree.validate(panel);

        assert_eq!(tree.children(panel), &[fits, also_fits]);
        assert_eq!(tree.parent(tall), None);
        assert!(tree.contains(tall));
    }

    #[test]
    fn test_minimum_is_single_row() {
        let (mut tree, panel) = setup(FlowLayout::default());
        for width in [3, 4, 5] {
            let child = tree.create_widget(Filler::new(width, 2));
            tree.add_child(panel, child).unwrap();
        }
        assert_eq!(tree.minimum_size(panel), Size::new(14, 2));
    }
}
