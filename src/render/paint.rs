//! Paint pass - Walks a window's tree and draws it through [`Graphics`].
//!
//! Every component gets a child context created from its parent's at its
//! bounds, so nothing can draw outside its ancestors. Invisible components
//! and components whose clip is empty are skipped with their subtrees.

use super::graphics::Graphics;
use super::terminal::Terminal;
use crate::engine::{ComponentId, ComponentKind, Tree};
use crate::types::{ColorPair, Point, Rect};
use crate::widgets::WidgetState;

/// Paint one window: background, border, title, then its children.
pub(crate) fn paint_window(
    tree: &Tree,
    surface: &mut (dyn Terminal + 'static),
    window: ComponentId,
    default: ColorPair,
) {
    if !tree.is_visible(window) {
        return;
    }
    let bounds = tree.bounds(window);
    let screen = Rect::from_parts(Point::ORIGIN, surface.screen_size());
    let mut root = Graphics::new(surface, screen, tree.effective_colors(window, default));
    let mut g = root.create(bounds.x, bounds.y, bounds.width, bounds.height);
    if g.clip_bounds().is_empty() {
        return;
    }

    g.fill_rect(0, 0, bounds.width, bounds.height);
    if let Some(style) = tree.border(window) {
        g.draw_rect(0, 0, bounds.width, bounds.height, style);
    }
    if let Some(title) = tree.title(window) {
        // Keep the top-right corner.
        let mut top = g.create(0, 0, bounds.width - 1, 1);
        top.draw_string(2, 0, &format!(" {title} "));
    }

    for &child in tree.children(window) {
        paint_component(tree, &mut g, child, default);
    }
}

/// Paint `id` and its subtree into `parent`, the context of its parent.
pub(crate) fn paint_component(
    tree: &Tree,
    parent: &mut Graphics<'_>,
    id: ComponentId,
    default: ColorPair,
) {
    let Ok(node) = tree.node(id) else {
        return;
    };
    if !node.visible || node.bounds.is_empty() {
        return;
    }
    let bounds = node.bounds;
    let mut g = parent.create(bounds.x, bounds.y, bounds.width, bounds.height);
    if g.clip_bounds().is_empty() {
        return;
    }
    g.set_color_pair(tree.effective_colors(id, default));

    match node.kind {
        ComponentKind::Panel => {
            if node.colors.is_some() {
                g.fill_rect(0, 0, bounds.width, bounds.height);
            }
            for &child in &node.children {
                paint_component(tree, &mut g, child, default);
            }
        }
        ComponentKind::Widget => {
            if let Some(widget) = node.widget.as_deref() {
                widget.paint(&mut g, &widget_state(tree, id));
            }
        }
        // Windows are never children.
        ComponentKind::Window => {}
    }
}

pub(crate) fn widget_state(tree: &Tree, id: ComponentId) -> WidgetState {
    WidgetState {
        focused: tree.has_focus(id),
        enabled: std::iter::once(id)
            .chain(tree.ancestors(id))
            .all(|c| tree.is_enabled(c)),
        size: tree.size(id),
    }
}

/// Put the cursor where the focus owner wants it, or hide it.
pub(crate) fn place_cursor(tree: &Tree, surface: &mut (dyn Terminal + 'static), hide_idle: bool) {
    let target = tree
        .focus_owner()
        .filter(|&owner| tree.is_showing(owner))
        .and_then(|owner| {
            let widget = tree.node(owner).ok()?.widget.as_deref()?;
            let offset = widget.cursor_position(&widget_state(tree, owner))?;
            Some(tree.location_on_screen(owner) + offset)
        });

    match target {
        Some(at) => {
            surface.set_cursor(at.x, at.y);
            surface.set_cursor_visible(true);
        }
        None if hide_idle => surface.set_cursor_visible(false),
        None => {}
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventQueue;
    use crate::layout::Edge;
    use crate::render::MemoryTerminal;
    use crate::toolkit::WindowStack;
    use crate::types::{BorderStyle, Color};
    use crate::widgets::Label;

    fn setup() -> (Tree, MemoryTerminal, Box<dyn Terminal>) {
        let tree = Tree::new(EventQueue::new(), WindowStack::default());
        let term = MemoryTerminal::new(20, 6);
        (tree, term.clone(), Box::new(term))
    }

    /// Windows start hidden; painting needs them visible.
    fn visible(tree: &mut Tree, window: ComponentId) {
        tree.node_mut(window).unwrap().visible = true;
    }

    #[test]
    fn test_hidden_window_not_painted() {
        let (mut tree, term, mut surface) = setup();
        let frame = tree.create_frame("Hi", None).unwrap();
        tree.set_bounds(frame, Rect::new(0, 0, 12, 4)).unwrap();
        paint_window(&tree, surface.as_mut(), frame, ColorPair::default());
        assert_eq!(term.text_at(0, 0, 6), "      ");
    }

    #[test]
    fn test_frame_border_and_title() {
        let (mut tree, term, mut surface) = setup();
        let frame = tree.create_frame("Hi", None).unwrap();
        visible(&mut tree, frame);
        tree.set_bounds(frame, Rect::new(1, 1, 12, 4)).unwrap();
        paint_window(&tree, surface.as_mut(), frame, ColorPair::default());

        assert_eq!(term.text_at(1, 1, 12), "┌─ Hi ─────┐");
        assert_eq!(term.text_at(1, 2, 12), "│          │");
        assert_eq!(term.text_at(1, 4, 12), "└──────────┘");
        assert_eq!(term.cell(0, 0).unwrap().ch, ' ');
    }

    #[test]
    fn test_long_title_keeps_corner() {
        let (mut tree, term, mut surface) = setup();
        let frame = tree.create_frame("A very long title", None).unwrap();
        visible(&mut tree, frame);
        tree.set_bounds(frame, Rect::new(0, 0, 8, 3)).unwrap();
        paint_window(&tree, surface.as_mut(), frame, ColorPair::default());
        assert_eq!(term.text_at(0, 0, 8), "┌─ A ve┐");
    }

    #[test]
    fn test_children_painted_with_inherited_colors() {
        let (mut tree, term, mut surface) = setup();
        let window = tree.create_window(None).unwrap();
        visible(&mut tree, window);
        let colors = ColorPair::new(Color::Yellow, Color::Blue);
        tree.set_colors(window, Some(colors)).unwrap();
        let label = tree.create_widget(Label::new("hello"));
        tree.add(window, label, Edge::Top).unwrap();
        tree.set_bounds(window, Rect::new(0, 0, 20, 6)).unwrap();
        tree.validate(window);
        paint_window(&tree, surface.as_mut(), window, ColorPair::default());

        let at = tree.bounds(label);
        assert_eq!(term.text_at(at.x, at.y, 5), "hello");
        assert_eq!(term.cell(at.x, at.y).unwrap().attr, colors.attribute());
    }

    #[test]
    fn test_hidden_children_not_painted() {
        let (mut tree, term, mut surface) = setup();
        let window = tree.create_window(None).unwrap();
        visible(&mut tree, window);
        let panel = tree.create_panel();
        let label = tree.create_widget(Label::new("secret"));
        tree.add_child(panel, label).unwrap();
        tree.add_child(window, panel).unwrap();
        tree.set_bounds(window, Rect::new(0, 0, 20, 6)).unwrap();
        tree.validate(window);
        tree.set_visible(panel, false).unwrap();
        paint_window(&tree, surface.as_mut(), window, ColorPair::default());
        assert!(!term.contents().contains("secret"));
    }

    #[test]
    fn test_child_clipped_to_parent() {
        let (mut tree, term, mut surface) = setup();
        let window = tree.create_window(None).unwrap();
        visible(&mut tree, window);
        tree.set_border(window, Some(BorderStyle::Double)).unwrap();
        let label = tree.create_widget(Label::new("overflowing text"));
        tree.add(window, label, Edge::Top).unwrap();
        tree.set_bounds(window, Rect::new(0, 0, 6, 3)).unwrap();
        tree.validate(window);
        // Bypass the layout to push the label past the right edge.
        tree.place(label, Rect::new(2, 1, 16, 1));
        paint_window(&tree, surface.as_mut(), window, ColorPair::default());
        assert_eq!(term.text_at(0, 1, 8), "║ over  ");
    }
}
