//! Focus - Traversal order and focus ownership.
//!
//! Traversal is a pre-order walk of the window's tree. Containers that are
//! hidden or disabled are stepped over as a whole; the walk wraps from the
//! last component back to the root. It is iterative with a step guard, so
//! a malformed tree can never recurse or spin forever.
//!
//! Every container caches its current focus (a traversable descendant,
//! possibly several levels down). The cache is resolved lazily to the first
//! traversable leaf and re-resolved when the component it names can no
//! longer take the focus.
//!
//! ```text
//! Window ── Panel ── A        next_focus(A) = B
//!    │         └──── B        next_focus(C) = A   (wraps)
//!    └──── C                  previous_focus(A) = C
//! ```
//!
//! Focus changes in the active window post FOCUS_LOST for the previous
//! owner, then FOCUS_GAINED for the new one. A request in a window that is
//! not the active one only updates the caches; the events follow when the
//! window becomes active.

use tracing::{debug, trace};

use super::node::FocusCache;
use super::{ComponentId, ComponentKind, Tree};
use crate::error::Result;
use crate::event::{Event, FocusEvent, FocusEventKind};

impl Tree {
    // =========================================================================
    // ELIGIBILITY
    // =========================================================================

    /// A visible, enabled widget that accepts the focus, inside visible and
    /// enabled ancestors.
    pub fn is_focus_traversable(&self, id: ComponentId) -> bool {
        let Some(node) = self.nodes.get(id) else {
            return false;
        };
        node.kind == ComponentKind::Widget
            && node
                .widget
                .as_ref()
                .is_some_and(|w| w.is_focus_traversable())
            && std::iter::once(id)
                .chain(self.ancestors(id))
                .all(|a| self.is_visible(a) && self.is_enabled(a))
    }

    /// Containers the walk may descend into.
    fn is_open_container(&self, id: ComponentId) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|n| n.is_container() && n.visible && n.enabled)
    }

    // =========================================================================
    // WALK
    // =========================================================================

    fn step_forward(&self, current: ComponentId, root: ComponentId) -> ComponentId {
        if self.is_open_container(current)
            && let Some(&first) = self.children(current).first()
        {
            return first;
        }
        let mut node = current;
        while node != root {
            let Some(parent) = self.parent(node) else {
                return root;
            };
            let siblings = self.children(parent);
            if let Some(pos) = siblings.iter().position(|&c| c == node)
                && let Some(&next) = siblings.get(pos + 1)
            {
                return next;
            }
            node = parent;
        }
        root
    }

    fn step_backward(&self, current: ComponentId, root: ComponentId) -> ComponentId {
        if current == root {
            return self.last_descendant(root);
        }
        let Some(parent) = self.parent(current) else {
            return root;
        };
        let siblings = self.children(parent);
        match siblings.iter().position(|&c| c == current) {
            Some(pos) if pos > 0 => self.last_descendant(siblings[pos - 1]),
            _ => parent,
        }
    }

    fn last_descendant(&self, id: ComponentId) -> ComponentId {
        let mut node = id;
        while self.is_open_container(node) {
            match self.children(node).last() {
                Some(&last) => node = last,
                None => break,
            }
        }
        node
    }

    /// Step from `from` until `accept` holds or the walk comes back to
    /// `from` (which is then returned only if it is itself acceptable).
    fn walk(
        &self,
        from: ComponentId,
        forward: bool,
        accept: impl Fn(ComponentId) -> bool,
    ) -> Option<ComponentId> {
        if !self.contains(from) {
            return None;
        }
        let root = self.root(from);
        let guard = 2 * self.len() + 2;
        let mut current = from;
        for _ in 0..guard {
            current = if forward {
                self.step_forward(current, root)
            } else {
                self.step_backward(current, root)
            };
            if current == from {
                return accept(from).then_some(from);
            }
            if accept(current) {
                return Some(current);
            }
        }
        None
    }

    /// Next traversable component after `from` in its window, wrapping.
    pub fn next_focus(&self, from: ComponentId) -> Option<ComponentId> {
        self.walk(from, true, |c| self.is_focus_traversable(c))
    }

    /// Previous traversable component before `from` in its window, wrapping.
    pub fn previous_focus(&self, from: ComponentId) -> Option<ComponentId> {
        self.walk(from, false, |c| self.is_focus_traversable(c))
    }

    /// Next traversable component after `from` that is not inside
    /// `excluded`.
    pub(crate) fn successor_excluding(
        &self,
        from: ComponentId,
        excluded: ComponentId,
    ) -> Option<ComponentId> {
        self.walk(from, true, |c| {
            !self.is_ancestor_or_self(excluded, c) && self.is_focus_traversable(c)
        })
    }

    /// First traversable component of `container`'s subtree.
    pub(crate) fn first_traversable(&self, container: ComponentId) -> Option<ComponentId> {
        if self.is_focus_traversable(container) {
            return Some(container);
        }
        if !self.is_open_container(container) {
            return None;
        }
        let guard = 2 * self.len() + 2;
        let mut current = container;
        for _ in 0..guard {
            current = self.step_forward(current, container);
            if current == container {
                return None;
            }
            if self.is_focus_traversable(current) {
                return Some(current);
            }
        }
        None
    }

    // =========================================================================
    // CURRENT FOCUS
    // =========================================================================

    /// The component that has (or would have, once its window is active)
    /// the focus inside `container`. Resolved lazily and cached.
    pub fn current_focus(&mut self, container: ComponentId) -> Option<ComponentId> {
        let cache = self.nodes.get(container)?.focus;
        if let FocusCache::Resolved(found) = cache {
            match found {
                None => return None,
                Some(c) if self.is_ancestor_or_self(container, c) && self.is_focus_traversable(c) => {
                    return Some(c);
                }
                Some(_) => {}
            }
        }
        let resolved = self.first_traversable(container);
        self.set_focus_cache(container, FocusCache::Resolved(resolved));
        resolved
    }

    /// The component that was last sent FOCUS_GAINED and still has it.
    pub fn focus_owner(&self) -> Option<ComponentId> {
        self.last_focus.filter(|&id| self.contains(id))
    }

    pub fn has_focus(&self, id: ComponentId) -> bool {
        self.focus_owner() == Some(id)
    }

    /// Topmost on the window stack and shown.
    pub fn is_active_window(&self, window: ComponentId) -> bool {
        self.windows.top() == Some(window) && self.is_displayable(window)
    }

    // =========================================================================
    // REQUEST / TRANSFER
    // =========================================================================

    /// Give `id` the focus.
    ///
    /// Returns `Ok(false)` if `id` cannot take the focus or already has it.
    /// In an inactive window the request is recorded in the caches without
    /// posting events.
    pub fn request_focus(&mut self, id: ComponentId) -> Result<bool> {
        self.node(id)?;
        if !self.is_focus_traversable(id) {
            return Ok(false);
        }

        let window = self.root(id);
        let before = self.nodes.get(window).map(|n| n.focus);
        let chain: Vec<_> = self.ancestors(id).collect();
        for ancestor in chain {
            self.set_focus_cache(ancestor, FocusCache::Resolved(Some(id)));
        }

        if !self.is_active_window(window) {
            trace!(component = %id, window = %window, "focus recorded for inactive window");
            return Ok(before != Some(FocusCache::Resolved(Some(id))));
        }

        let previous = self.focus_owner();
        if previous == Some(id) {
            return Ok(false);
        }

        let temporary = previous.is_some_and(|p| {
            let root = self.root(p);
            root != window && self.is_window(root)
        });

        if let Some(prev) = previous {
            self.queue.post_event(Event::Focus(FocusEvent {
                source: prev,
                kind: FocusEventKind::Lost,
                temporary,
                opposite: Some(id),
            }));
            self.repaint(prev);
        }
        self.queue.post_event(Event::Focus(FocusEvent {
            source: id,
            kind: FocusEventKind::Gained,
            temporary,
            opposite: previous,
        }));
        self.last_focus = Some(id);
        self.repaint(id);

        debug!(component = %id, temporary, "focus transferred");
        Ok(true)
    }

    /// Move the focus to the component after `from`.
    pub fn transfer_focus(&mut self, from: ComponentId) -> Result<bool> {
        match self.next_focus(from) {
            Some(next) if next != from => self.request_focus(next),
            _ => Ok(false),
        }
    }

    /// Move the focus to the component before `from`.
    pub fn transfer_focus_backward(&mut self, from: ComponentId) -> Result<bool> {
        match self.previous_focus(from) {
            Some(prev) if prev != from => self.request_focus(prev),
            _ => Ok(false),
        }
    }

    // =========================================================================
    // CACHE MAINTENANCE
    // =========================================================================

    /// The focus owner, or the cached focus of an inactive window, if it
    /// lies inside `subtree`.
    pub(crate) fn focus_holder_in(&self, subtree: ComponentId) -> Option<ComponentId> {
        if let Some(owner) = self.focus_owner()
            && self.is_ancestor_or_self(subtree, owner)
        {
            return Some(owner);
        }
        let root = self.root(subtree);
        match self.nodes.get(root)?.focus {
            FocusCache::Resolved(Some(c)) if self.is_ancestor_or_self(subtree, c) => Some(c),
            _ => None,
        }
    }

    /// Drop every ancestor cache that points into `subtree`.
    pub(crate) fn forget_focus_in(&mut self, subtree: ComponentId) {
        let chain: Vec<_> = self.ancestors(subtree).collect();
        for ancestor in chain {
            let stale = matches!(
                self.nodes.get(ancestor).map(|n| n.focus),
                Some(FocusCache::Resolved(Some(c))) if self.is_ancestor_or_self(subtree, c)
            );
            if stale {
                self.set_focus_cache(ancestor, FocusCache::Unresolved);
            }
        }
    }

    /// Containers that resolved to "nothing focusable" must look again
    /// once something in them may have become focusable.
    pub(crate) fn unresolve_empty_caches(&mut self, from: ComponentId) {
        let chain: Vec<_> = std::iter::once(from).chain(self.ancestors(from)).collect();
        for id in chain {
            if self.nodes.get(id).map(|n| n.focus) == Some(FocusCache::Resolved(None)) {
                self.set_focus_cache(id, FocusCache::Unresolved);
            }
        }
    }

    /// `owner` loses the focus and nothing takes it.
    pub(crate) fn clear_focus(&mut self, owner: ComponentId) {
        if self.last_focus == Some(owner) {
            self.last_focus = None;
            self.queue.post_event(Event::Focus(FocusEvent {
                source: owner,
                kind: FocusEventKind::Lost,
                temporary: false,
                opposite: None,
            }));
            debug!(component = %owner, "focus cleared");
        }
        let chain: Vec<_> = self.ancestors(owner).collect();
        for ancestor in chain {
            if self.nodes.get(ancestor).map(|n| n.focus)
                == Some(FocusCache::Resolved(Some(owner)))
            {
                self.set_focus_cache(ancestor, FocusCache::Unresolved);
            }
        }
    }

    /// `owner` was detached from `container`'s tree while holding the
    /// focus. Resolve a new owner for the window.
    pub(crate) fn refocus_after_loss(
        &mut self,
        container: ComponentId,
        owner: ComponentId,
    ) -> Result<()> {
        let chain: Vec<_> = std::iter::once(container)
            .chain(self.ancestors(container))
            .collect();
        for id in chain {
            if self.nodes.get(id).map(|n| n.focus) == Some(FocusCache::Resolved(Some(owner))) {
                self.set_focus_cache(id, FocusCache::Unresolved);
            }
        }

        if self.last_focus != Some(owner) {
            return Ok(());
        }
        let window = self.root(container);
        if !self.is_active_window(window) {
            self.last_focus = None;
            return Ok(());
        }
        match self.current_focus(window) {
            Some(next) => {
                self.request_focus(next)?;
            }
            None => self.clear_focus(owner),
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::engine::{ComponentId, Tree};
    use crate::event::EventQueue;
    use crate::toolkit::WindowStack;
    use crate::widgets::{Filler, Label};

    /// window ─┬─ panel ─┬─ a
    ///         │         ├─ label
    ///         │         └─ b
    ///         └─ c
    fn setup() -> (Tree, ComponentId, ComponentId, [ComponentId; 3]) {
        let mut tree = Tree::new(EventQueue::new(), WindowStack::default());
        let window = tree.create_window(None).unwrap();
        tree.node_mut(window).unwrap().visible = true;
        let panel = tree.create_panel();
        let a = tree.create_widget(Filler::focusable(1, 1));
        let label = tree.create_widget(Label::new("skip"));
        let b = tree.create_widget(Filler::focusable(1, 1));
        let c = tree.create_widget(Filler::focusable(1, 1));
        tree.add_child(window, panel).unwrap();
        tree.add_child(panel, a).unwrap();
        tree.add_child(panel, label).unwrap();
        tree.add_child(panel, b).unwrap();
        tree.add_child(window, c).unwrap();
        (tree, window, panel, [a, b, c])
    }

    #[test]
    fn test_next_focus_order_and_wrap() {
        let (tree, _, _, [a, b, c]) = setup();
        assert_eq!(tree.next_focus(a), Some(b));
        assert_eq!(tree.next_focus(b), Some(c));
        assert_eq!(tree.next_focus(c), Some(a));
    }

    #[test]
    fn test_previous_focus_order_and_wrap() {
        let (tree, _, _, [a, b, c]) = setup();
        assert_eq!(tree.previous_focus(a), Some(c));
        assert_eq!(tree.previous_focus(c), Some(b));
        assert_eq!(tree.previous_focus(b), Some(a));
    }

    #[test]
    fn test_n_steps_return_to_start() {
        let (tree, _, _, [a, ..]) = setup();
        let mut current = a;
        for _ in 0..3 {
            current = tree.next_focus(current).unwrap();
        }
        assert_eq!(current, a);
    }

    #[test]
    fn test_hidden_container_is_skipped() {
        let (mut tree, _, panel, [a, _, c]) = setup();
        tree.node_mut(panel).unwrap().visible = false;
        assert!(!tree.is_focus_traversable(a));
        assert_eq!(tree.next_focus(c), Some(c));
    }

    #[test]
    fn test_current_focus_resolves_first_leaf() {
        let (mut tree, window, panel, [a, _, c]) = setup();
        assert_eq!(tree.current_focus(window), Some(a));
        tree.set_enabled(panel, false).unwrap();
        assert_eq!(tree.current_focus(window), Some(c));
    }

    #[test]
    fn test_request_focus_in_inactive_window_is_shadowed() {
        let (mut tree, window, panel, [_, b, _]) = setup();
        assert!(tree.request_focus(b).unwrap());
        assert!(tree.queue().is_empty());
        assert_eq!(tree.focus_owner(), None);
        assert_eq!(tree.current_focus(window), Some(b));
        assert_eq!(tree.current_focus(panel), Some(b));
        assert!(!tree.request_focus(b).unwrap());
    }

    #[test]
    fn test_request_focus_rejects_label() {
        let (mut tree, window, panel, _) = setup();
        let label = tree.children(panel)[1];
        assert!(!tree.request_focus(label).unwrap());
        assert!(!tree.request_focus(window).unwrap());
    }

    #[test]
    fn test_hiding_only_focusable_fails_without_change() {
        let mut tree = Tree::new(EventQueue::new(), WindowStack::default());
        let panel = tree.create_panel();
        let only = tree.create_widget(Filler::focusable(1, 1));
        tree.add_child(panel, only).unwrap();
        tree.request_focus(only).unwrap();

        let result = tree.set_visible(only, false);
        assert!(matches!(
            result,
            Err(crate::error::ToolkitError::NoFocusSuccessor(_))
        ));
        assert!(tree.is_visible(only));
        assert_eq!(tree.current_focus(panel), Some(only));
    }

    #[test]
    fn test_hiding_focused_leaf_moves_focus() {
        let (mut tree, window, _, [a, b, _]) = setup();
        tree.request_focus(a).unwrap();
        tree.set_visible(a, false).unwrap();
        assert_eq!(tree.current_focus(window), Some(b));
    }
}
