//! Grid layout - Children in cells of a grid, with spans and weights.
//!
//! Each child carries a [`GridCell`]: its column and row, how many tracks
//! it spans, how much of the spare space its tracks absorb (weights), how
//! it fills the cell and where it sits when it does not fill it.
//!
//! # Track sizing
//!
//! Column widths are computed by visiting constraints in order of the
//! column their span ends in. Each constraint needs its child's minimum
//! width plus cell insets; whatever the earlier columns of its span do not
//! already provide is added to the span's last column. Rows work the same
//! way. The container's minimum size is the sum of the tracks plus its
//! insets.
//!
//! # Slack
//!
//! Extra space is shared out in proportion to each track's weight (the
//! largest weight among constraints ending in it). Rounding leftovers go
//! to the last weighted track. With no weights the grid keeps its minimum
//! size and sits at the top-left of the container.

use super::{interior, unsupported, Constraint, LayoutManager};
use crate::engine::{ComponentId, Tree};
use crate::error::Result;
use crate::types::{Insets, Rect, Size};

// =============================================================================
// TYPES
// =============================================================================

/// Where a child sits inside a cell larger than itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Anchor {
    #[default]
    Center,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

/// Which dimensions a child stretches to its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Fill {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub column: usize,
    pub row: usize,
    pub column_span: usize,
    pub row_span: usize,
    pub weight_x: f32,
    pub weight_y: f32,
    pub anchor: Anchor,
    pub fill: Fill,
    /// Space kept free around the child inside its cell.
    pub insets: Insets,
}

impl Default for GridCell {
    fn default() -> Self {
        Self {
            column: 0,
            row: 0,
            column_span: 1,
            row_span: 1,
            weight_x: 0.0,
            weight_y: 0.0,
            anchor: Anchor::Center,
            fill: Fill::None,
            insets: Insets::ZERO,
        }
    }
}

impl GridCell {
    pub fn at(column: usize, row: usize) -> Self {
        Self {
            column,
            row,
            ..Self::default()
        }
    }

    pub fn span(mut self, columns: usize, rows: usize) -> Self {
        self.column_span = columns.max(1);
        self.row_span = rows.max(1);
        self
    }

    pub fn weight(mut self, x: f32, y: f32) -> Self {
        self.weight_x = x.max(0.0);
        self.weight_y = y.max(0.0);
        self
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn fill(mut self, fill: Fill) -> Self {
        self.fill = fill;
        self
    }

    pub fn insets(mut self, insets: Insets) -> Self {
        self.insets = insets;
        self
    }

    fn column_end(&self) -> usize {
        self.column + self.column_span.max(1)
    }

    fn row_end(&self) -> usize {
        self.row + self.row_span.max(1)
    }
}

/// Per-axis view of a cell, so both axes share one sizing routine.
struct Span {
    start: usize,
    end: usize,
    need: i32,
    weight: f32,
}

// =============================================================================
// LAYOUT
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct GridLayout {
    cells: Vec<(ComponentId, GridCell)>,
}

impl GridLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, child: ComponentId) -> Option<&GridCell> {
        self.cells.iter().find(|(c, _)| *c == child).map(|(_, cell)| cell)
    }

    /// Minimum column widths for the container's current children.
    pub fn column_widths(&self, tree: &Tree) -> Vec<i32> {
        let (spans, _) = self.spans(tree);
        track_sizes(&spans).0
    }

    /// Minimum row heights for the container's current children.
    pub fn row_heights(&self, tree: &Tree) -> Vec<i32> {
        let (_, spans) = self.spans(tree);
        track_sizes(&spans).0
    }

    fn visible_cells<'a>(&'a self, tree: &'a Tree) -> impl Iterator<Item = &'a (ComponentId, GridCell)> {
        self.cells.iter().filter(|(c, _)| tree.is_visible(*c))
    }

    fn spans(&self, tree: &Tree) -> (Vec<Span>, Vec<Span>) {
        let mut columns = Vec::new();
        let mut rows = Vec::new();
        for (child, cell) in self.visible_cells(tree) {
            let need = tree.minimum_size(*child).grow(cell.insets);
            columns.push(Span {
                start: cell.column,
                end: cell.column_end(),
                need: need.width,
                weight: cell.weight_x,
            });
            rows.push(Span {
                start: cell.row,
                end: cell.row_end(),
                need: need.height,
                weight: cell.weight_y,
            });
        }
        (columns, rows)
    }

    /// Cell after the last one added, on the same row.
    fn next_cell(&self) -> GridCell {
        match self.cells.last() {
            Some((_, last)) => GridCell::at(last.column_end(), last.row),
            None => GridCell::default(),
        }
    }
}

/// Track sizes and weights along one axis.
fn track_sizes(spans: &[Span]) -> (Vec<i32>, Vec<f32>) {
    let count = spans.iter().map(|s| s.end).max().unwrap_or(0);
    let mut sizes = vec![0; count];
    let mut weights = vec![0.0f32; count];

    let mut order: Vec<&Span> = spans.iter().collect();
    order.sort_by_key(|s| s.end);

    for span in order {
        let last = span.end - 1;
        let provided: i32 = sizes[span.start..last].iter().sum();
        sizes[last] = sizes[last].max(span.need - provided);
        weights[last] = weights[last].max(span.weight);
    }
    (sizes, weights)
}

/// Share `extra` between tracks by weight; leftovers go to the last
/// weighted track.
fn distribute(sizes: &mut [i32], weights: &[f32], extra: i32) {
    let total: f32 = weights.iter().sum();
    if extra <= 0 || total <= 0.0 {
        return;
    }
    let mut given = 0;
    let mut last_weighted = None;
    for (i, &weight) in weights.iter().enumerate() {
        if weight > 0.0 {
            let share = (extra as f32 * weight / total).floor() as i32;
            sizes[i] += share;
            given += share;
            last_weighted = Some(i);
        }
    }
    if let Some(i) = last_weighted {
        sizes[i] += extra - given;
    }
}

fn offsets(start: i32, sizes: &[i32]) -> Vec<i32> {
    let mut acc = start;
    let mut out = Vec::with_capacity(sizes.len() + 1);
    out.push(acc);
    for size in sizes {
        acc += size;
        out.push(acc);
    }
    out
}

/// Apply fill, then anchor the child inside `area`.
fn anchor_in(area: Rect, preferred: Size, cell: &GridCell) -> Rect {
    let mut size = preferred.min(area.size());
    if matches!(cell.fill, Fill::Horizontal | Fill::Both) {
        size.width = area.width;
    }
    if matches!(cell.fill, Fill::Vertical | Fill::Both) {
        size.height = area.height;
    }
    let size = Size::new(size.width.max(0), size.height.max(0));

    let x = match cell.anchor {
        Anchor::West | Anchor::NorthWest | Anchor::SouthWest => area.x,
        Anchor::East | Anchor::NorthEast | Anchor::SouthEast => area.right() - size.width,
        Anchor::Center | Anchor::North | Anchor::South => area.x + (area.width - size.width) / 2,
    };
    let y = match cell.anchor {
        Anchor::North | Anchor::NorthWest | Anchor::NorthEast => area.y,
        Anchor::South | Anchor::SouthWest | Anchor::SouthEast => area.bottom() - size.height,
        Anchor::Center | Anchor::West | Anchor::East => area.y + (area.height - size.height) / 2,
    };
    Rect::new(x, y, size.width, size.height)
}

impl LayoutManager for GridLayout {
    fn name(&self) -> &'static str {
        "GridLayout"
    }

    fn check_constraint(&self, constraint: &Constraint) -> Result<()> {
        match constraint {
            Constraint::None | Constraint::Grid(_) => Ok(()),
            other => Err(unsupported(self.name(), other)),
        }
    }

    /// No constraint places the child right of the last cell added.
    fn add_layout_component(&mut self, _tree: &mut Tree, child: ComponentId, constraint: Constraint) {
        self.remove_layout_component(child);
        let cell = match constraint {
            Constraint::Grid(cell) => cell,
            _ => self.next_cell(),
        };
        self.cells.push((child, cell));
    }

    fn remove_layout_component(&mut self, child: ComponentId) {
        self.cells.retain(|(c, _)| *c != child);
    }

    fn minimum_size(&self, tree: &Tree, container: ComponentId) -> Size {
        let (columns, rows) = self.spans(tree);
        let width: i32 = track_sizes(&columns).0.iter().sum();
        let height: i32 = track_sizes(&rows).0.iter().sum();
        Size::new(width, height).grow(tree.insets(container))
    }

    fn layout_container(&mut self, tree: &mut Tree, container: ComponentId) -> Vec<ComponentId> {
        let area = interior(tree, container);
        let (columns, rows) = self.spans(tree);
        let (mut widths, weights_x) = track_sizes(&columns);
        let (mut heights, weights_y) = track_sizes(&rows);

        let slack_x = area.width - widths.iter().sum::<i32>();
        let slack_y = area.height - heights.iter().sum::<i32>();
        distribute(&mut widths, &weights_x, slack_x);
        distribute(&mut heights, &weights_y, slack_y);

        let xs = offsets(area.x, &widths);
        let ys = offsets(area.y, &heights);

        let placements: Vec<(ComponentId, Rect)> = self
            .visible_cells(tree)
            .map(|(child, cell)| {
                let x = xs[cell.column];
                let y = ys[cell.row];
                let slot = Rect::new(x, y, xs[cell.column_end()] - x, ys[cell.row_end()] - y);
                let inner = slot.inset(cell.insets);
                (*child, anchor_in(inner, tree.preferred_size(*child), cell))
            })
            .collect();

        for (child, bounds) in placements {
            tree.place(child, bounds);
        }
        Vec::new()
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

    fn setup() -> (Tree, ComponentId) {
        let mut tree = Tree::new(EventQueue::new(), WindowStack::default());
        let grid = tree.create_panel_with(GridLayout::new());
        (tree, grid)
    }

    #[test]
    fn test_spanning_child_grows_last_column() {
        let (mut tree, grid) = setup();
        let a = tree.create_widget(Filler::new(3, 1));
        let b = tree.create_widget(Filler::new(4, 1));
        let wide = tree.create_widget(Filler::new(10, 1));
        tree.add(grid, a, GridCell::at(0, 0)).unwrap();
        tree.add(grid, b, GridCell::at(1, 0)).unwrap();
        tree.add(grid, wide, GridCell::at(0, 1).span(2, 1)).unwrap();

        let layout = GridLayout {
            cells: vec![
                (a, GridCell::at(0, 0)),
                (b, GridCell::at(1, 0)),
                (wide, GridCell::at(0, 1).span(2, 1)),
            ],
        };
        assert_eq!(layout.column_widths(&tree), vec![3, 7]);
        assert_eq!(layout.row_heights(&tree), vec![1, 1]);

        let min = tree.minimum_size(grid);
        assert_eq!(min, Size::new(10, 2));
        tree.set_bounds(grid, Rect::from_parts(Default::default(), min)).unwrap();
        tree.validate(grid);
        // b is centred in the 7-wide second column
        assert_eq!(tree.bounds(b).x, 4);
        assert_eq!(tree.bounds(wide), Rect::new(0, 1, 10, 1));
    }

    #[test]
    fn test_minimum_width_is_tracks_plus_insets() {
        let (mut tree, grid) = setup();
        let a = tree.create_widget(Filler::new(5, 2));
        let b = tree.create_widget(Filler::new(2, 1));
        let c = tree.create_widget(Filler::new(7, 1));
        tree.add(grid, a, GridCell::at(0, 0)).unwrap();
        tree.add(grid, b, GridCell::at(1, 0).insets(Insets::new(0, 1, 0, 1))).unwrap();
        tree.add(grid, c, GridCell::at(2, 1)).unwrap();
        tree.set_insets(grid, Insets::uniform(1)).unwrap();

        let min = tree.minimum_size(grid);
        // columns 5, 4, 7 plus 2 for the container insets
        assert_eq!(min, Size::new(18, 5));

        tree.set_bounds(grid, Rect::from_parts(Default::default(), min)).unwrap();
        tree.validate(grid);
        assert_eq!(tree.bounds(a), Rect::new(1, 1, 5, 2));
        // b is centred in its inner cell (x 7..9, 2 wide)
        assert_eq!(tree.bounds(b).x, 7);
        assert_eq!(tree.bounds(c), Rect::new(10, 3, 7, 1));
    }

    #[test]
    fn test_slack_follows_weights() {
        let (mut tree, grid) = setup();
        let a = tree.create_widget(Filler::new(2, 1));
        let b = tree.create_widget(Filler::new(2, 1));
        tree.add(grid, a, GridCell::at(0, 0).weight(1.0, 0.0).fill(Fill::Horizontal)).unwrap();
        tree.add(grid, b, GridCell::at(1, 0).weight(2.0, 0.0).fill(Fill::Horizontal)).unwrap();

        tree.set_bounds(grid, Rect::new(0, 0, 14, 1)).unwrap();
        tree.validate(grid);

        // 10 spare: 3 to the first column, 6 + leftover 1 to the second
        assert_eq!(tree.bounds(a), Rect::new(0, 0, 5, 1));
        assert_eq!(tree.bounds(b), Rect::new(5, 0, 9, 1));
    }

    #[test]
    fn test_anchor_places_child() {
        let (mut tree, grid) = setup();
        let a = tree.create_widget(Filler::new(2, 1));
        tree.add(grid, a, GridCell::at(0, 0).weight(1.0, 1.0).anchor(Anchor::SouthEast)).unwrap();
        tree.set_bounds(grid, Rect::new(0, 0, 10, 5)).unwrap();
        tree.validate(grid);
        assert_eq!(tree.bounds(a), Rect::new(8, 4, 2, 1));
    }

    #[test]
    fn test_unconstrained_children_flow_right() {
        let (mut tree, grid) = setup();
        let a = tree.create_widget(Filler::new(2, 1));
        let b = tree.create_widget(Filler::new(3, 1));
        tree.add_child(grid, a).unwrap();
        tree.add_child(grid, b).unwrap();
        assert_eq!(tree.minimum_size(grid), Size::new(5, 1));
    }
}
