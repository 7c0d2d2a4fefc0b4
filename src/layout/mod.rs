//! Layout Module - Layout managers for containers.
//!
//! A container owns one [`LayoutManager`]. The tree calls it to register
//! children (with a [`Constraint`]), to compute the container's minimum
//! size, and to place children when the container is validated.
//!
//! # Managers
//!
//! - [`DockLayout`] - five slots: top, bottom, left, right, center
//! - [`FlowLayout`] - rows left to right, wrapping, with alignment
//! - [`GridLayout`] - cells with spans, weights, anchors and fill
//! - [`CardLayout`] - named stack of children, one visible at a time
//!
//! # Fit policy
//!
//! Layouts compute a slot for every child. Containers are stretched to
//! their slot; leaf widgets keep their preferred size (clamped to the
//! slot) and are centred in it. See [`fit`].
//!
//! # Example
//!
//! ```ignore
//! let form = tree.create_panel_with(GridLayout::new());
//! tree.add(form, name_label, GridCell::at(0, 0))?;
//! tree.add(form, name_field, GridCell::at(1, 0).weight(1.0, 0.0).fill(Fill::Horizontal))?;
//! ```

mod card;
mod dock;
mod flow;
mod grid;

use crate::engine::{ComponentId, Tree};
use crate::error::{Result, ToolkitError};
use crate::types::{Rect, Size};

pub use card::CardLayout;
pub use dock::{DockLayout, Edge};
pub use flow::{FlowAlignment, FlowLayout};
pub use grid::{Anchor, Fill, GridCell, GridLayout};

// =============================================================================
// CONSTRAINTS
// =============================================================================

/// Per-child placement hint handed to a layout manager on `add`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Constraint {
    #[default]
    None,
    Edge(Edge),
    Grid(GridCell),
    Card(String),
}

impl From<Edge> for Constraint {
    fn from(edge: Edge) -> Self {
        Constraint::Edge(edge)
    }
}

impl From<GridCell> for Constraint {
    fn from(cell: GridCell) -> Self {
        Constraint::Grid(cell)
    }
}

impl From<&str> for Constraint {
    fn from(name: &str) -> Self {
        Constraint::Card(name.to_string())
    }
}

impl From<String> for Constraint {
    fn from(name: String) -> Self {
        Constraint::Card(name)
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Sizes and places the children of one container.
///
/// `layout_container` must be a pure function of the children, their
/// constraints and the container's size; it is called again whenever the
/// container has been invalidated.
pub trait LayoutManager {
    /// Short name used in error messages.
    fn name(&self) -> &'static str;

    /// Reject constraints this layout cannot honour. Called before the tree
    /// is modified. The default accepts only [`Constraint::None`].
    fn check_constraint(&self, constraint: &Constraint) -> Result<()> {
        match constraint {
            Constraint::None => Ok(()),
            other => Err(unsupported(self.name(), other)),
        }
    }

    /// A child was added under an accepted constraint.
    fn add_layout_component(
        &mut self,
        _tree: &mut Tree,
        _child: ComponentId,
        _constraint: Constraint,
    ) {
    }

    fn remove_layout_component(&mut self, _child: ComponentId) {}

    /// Smallest size (including the container's insets) at which every
    /// child gets its minimum size.
    fn minimum_size(&self, tree: &Tree, container: ComponentId) -> Size;

    fn preferred_size(&self, tree: &Tree, container: ComponentId) -> Size {
        self.minimum_size(tree, container)
    }

    /// Place the children inside the container's current bounds.
    ///
    /// Returns the children that do not fit at all; the tree removes them
    /// from the container.
    fn layout_container(&mut self, tree: &mut Tree, container: ComponentId) -> Vec<ComponentId>;

    fn as_card_layout(&self) -> Option<&CardLayout> {
        None
    }

    fn as_card_layout_mut(&mut self) -> Option<&mut CardLayout> {
        None
    }
}

pub(crate) fn unsupported(layout: &str, constraint: &Constraint) -> ToolkitError {
    ToolkitError::Constraint(format!("{layout} does not accept {constraint:?}"))
}

// =============================================================================
// HELPERS
// =============================================================================

/// Bounds for `child` inside `slot`: containers fill the slot, widgets keep
/// their preferred size and are centred.
pub fn fit(tree: &Tree, child: ComponentId, slot: Rect) -> Rect {
    if tree.is_container(child) {
        slot
    } else {
        slot.center(tree.preferred_size(child))
    }
}

/// Visible children of `container` in order.
pub(crate) fn visible_children(tree: &Tree, container: ComponentId) -> Vec<ComponentId> {
    tree.children(container)
        .iter()
        .copied()
        .filter(|&c| tree.is_visible(c))
        .collect()
}

/// The container's interior: its size minus insets, at the inset origin.
pub(crate) fn interior(tree: &Tree, container: ComponentId) -> Rect {
    Rect::from_parts(Default::default(), tree.size(container)).inset(tree.insets(container))
}
