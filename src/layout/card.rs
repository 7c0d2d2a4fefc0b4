//! Card layout - A stack of named children, exactly one visible.
//!
//! Every card is given the whole interior of the container; visibility
//! decides which one is seen. The first card added is shown, later ones
//! start hidden. Switching goes through the tree so the focus can move
//! into the new card:
//!
//! ```ignore
//! tree.add(deck, general, "general")?;
//! tree.add(deck, advanced, "advanced")?;
//! tree.show_card(deck, "advanced")?;
//! tree.next_card(deck)?; // wraps back to "general"
//! ```

use super::{fit, interior, unsupported, Constraint, LayoutManager};
use crate::engine::{ComponentId, Tree};
use crate::error::{Result, ToolkitError};
use crate::types::Size;

#[derive(Debug, Clone, Default)]
pub struct CardLayout {
    cards: Vec<(String, ComponentId)>,
}

/// Which card to switch to.
#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    Name(&'a str),
    Index(usize),
    First,
    Last,
    Next,
    Previous,
}

impl CardLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Card names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cards.iter().map(|(name, _)| name.as_str())
    }

    pub fn card(&self, name: &str) -> Option<ComponentId> {
        self.cards.iter().find(|(n, _)| n == name).map(|(_, c)| *c)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    fn visible_index(&self, tree: &Tree) -> Option<usize> {
        self.cards.iter().position(|(_, c)| tree.is_visible(*c))
    }

    fn resolve(&self, target: Target<'_>, current: Option<usize>) -> Result<Option<ComponentId>> {
        let len = self.cards.len();
        let index = match target {
            Target::Name(name) => {
                return self
                    .card(name)
                    .map(Some)
                    .ok_or_else(|| ToolkitError::UnknownCard(name.to_string()));
            }
            Target::Index(i) if i < len => i,
            Target::Index(i) => return Err(ToolkitError::UnknownCard(format!("#{i}"))),
            _ if len == 0 => return Ok(None),
            Target::First => 0,
            Target::Last => len - 1,
            Target::Next => current.map_or(0, |i| (i + 1) % len),
            Target::Previous => current.map_or(len - 1, |i| (i + len - 1) % len),
        };
        Ok(Some(self.cards[index].1))
    }
}

impl LayoutManager for CardLayout {
    fn name(&self) -> &'static str {
        "CardLayout"
    }

    fn check_constraint(&self, constraint: &Constraint) -> Result<()> {
        match constraint {
            Constraint::Card(_) => Ok(()),
            other => Err(unsupported(self.name(), other)),
        }
    }

    fn add_layout_component(&mut self, tree: &mut Tree, child: ComponentId, constraint: Constraint) {
        let Constraint::Card(name) = constraint else {
            return;
        };
        self.remove_layout_component(child);
        let first = !self.cards.iter().any(|(_, c)| tree.is_visible(*c));
        self.cards.push((name, child));
        if let Ok(node) = tree.node_mut(child) {
            node.visible = first;
        }
    }

    fn remove_layout_component(&mut self, child: ComponentId) {
        self.cards.retain(|(_, c)| *c != child);
    }

    fn minimum_size(&self, tree: &Tree, container: ComponentId) -> Size {
        self.cards
            .iter()
            .fold(Size::ZERO, |acc, (_, c)| acc.max(tree.minimum_size(*c)))
            .grow(tree.insets(container))
    }

    fn preferred_size(&self, tree: &Tree, container: ComponentId) -> Size {
        self.cards
            .iter()
            .fold(Size::ZERO, |acc, (_, c)| acc.max(tree.preferred_size(*c)))
            .grow(tree.insets(container))
    }

    fn layout_container(&mut self, tree: &mut Tree, container: ComponentId) -> Vec<ComponentId> {
        let area = interior(tree, container);
        for &(_, card) in &self.cards {
            let bounds = fit(tree, card, area);
            tree.place(card, bounds);
        }
        Vec::new()
    }

    fn as_card_layout(&self) -> Option<&CardLayout> {
        Some(self)
    }

    fn as_card_layout_mut(&mut self) -> Option<&mut CardLayout> {
        Some(self)
    }
}

// =============================================================================
// CARD NAVIGATION
// =============================================================================

impl Tree {
    pub fn show_card(&mut self, container: ComponentId, name: &str) -> Result<()> {
        self.switch_card(container, Target::Name(name))
    }

    pub fn show_card_at(&mut self, container: ComponentId, index: usize) -> Result<()> {
        self.switch_card(container, Target::Index(index))
    }

    pub fn first_card(&mut self, container: ComponentId) -> Result<()> {
        self.switch_card(container, Target::First)
    }

    pub fn last_card(&mut self, container: ComponentId) -> Result<()> {
        self.switch_card(container, Target::Last)
    }

    /// Wraps from the last card to the first.
    pub fn next_card(&mut self, container: ComponentId) -> Result<()> {
        self.switch_card(container, Target::Next)
    }

    /// Wraps from the first card to the last.
    pub fn previous_card(&mut self, container: ComponentId) -> Result<()> {
        self.switch_card(container, Target::Previous)
    }

    /// The card currently shown by `container`'s card layout.
    pub fn visible_card(&self, container: ComponentId) -> Option<ComponentId> {
        self.visible_card_position(container).map(|(_, card)| card)
    }

    pub(crate) fn visible_card_position(
        &self,
        container: ComponentId,
    ) -> Option<(usize, ComponentId)> {
        let layout = self.node(container).ok()?.layout.as_deref()?.as_card_layout()?;
        layout.visible_index(self).map(|i| (i, layout.cards[i].1))
    }

    /// The shown card at `index` was removed: show the card that took its
    /// place, or the first one when it was the last.
    pub(crate) fn reveal_card_after_removal(
        &mut self,
        container: ComponentId,
        index: usize,
    ) -> Result<()> {
        let len = self
            .node(container)?
            .layout
            .as_deref()
            .and_then(|l| l.as_card_layout())
            .map_or(0, CardLayout::len);
        if len == 0 {
            return Ok(());
        }
        let index = if index < len { index } else { 0 };
        self.switch_card(container, Target::Index(index))
    }

    fn switch_card(&mut self, container: ComponentId, target: Target<'_>) -> Result<()> {
        let layout = self
            .node(container)?
            .layout
            .as_deref()
            .and_then(|l| l.as_card_layout())
            .ok_or(ToolkitError::NotACardLayout(container))?;
        let current_index = layout.visible_index(self);
        let current = current_index.map(|i| layout.cards[i].1);
        let Some(next) = layout.resolve(target, current_index)? else {
            return Ok(());
        };
        if current == Some(next) {
            return Ok(());
        }

        self.node_mut(next)?.visible = true;
        self.unresolve_empty_caches(next);
        if let Some(focus) = self.first_traversable(next) {
            self.request_focus(focus)?;
        }
        if let Some(old) = current {
            self.hide(old, false)?;
        }

        self.invalidate(container);
        self.validate(container);
        self.repaint(container);
        Ok(())
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
    use crate::types::Rect;
    use crate::widgets::Filler;

    fn setup() -> (Tree, ComponentId, [ComponentId; 3]) {
        let mut tree = Tree::new(EventQueue::new(), WindowStack::default());
        let deck = tree.create_panel_with(CardLayout::new());
        let one = tree.create_panel();
        let two = tree.create_panel();
        let three = tree.create_widget(Filler::new(6, 4));
        tree.add(deck, one, "one").unwrap();
        tree.add(deck, two, "two").unwrap();
        tree.add(deck, three, "three").unwrap();
        tree.set_bounds(deck, Rect::new(0, 0, 10, 6)).unwrap();
        (tree, deck, [one, two, three])
    }

    #[test]
    fn test_first_card_visible() {
        let (tree, deck, [one, two, three]) = setup();
        assert!(tree.is_visible(one));
        assert!(!tree.is_visible(two));
        assert!(!tree.is_visible(three));
        assert_eq!(tree.visible_card(deck), Some(one));
    }

    #[test]
    fn test_show_by_name_and_index() {
        let (mut tree, deck, [one, two, three]) = setup();
        tree.show_card(deck, "three").unwrap();
        assert_eq!(tree.visible_card(deck), Some(three));
        assert!(!tree.is_visible(one));

        tree.show_card_at(deck, 1).unwrap();
        assert_eq!(tree.visible_card(deck), Some(two));
        assert!(!tree.is_visible(three));
    }

    #[test]
    fn test_next_and_previous_wrap() {
        let (mut tree, deck, [one, _, three]) = setup();
        tree.previous_card(deck).unwrap();
        assert_eq!(tree.visible_card(deck), Some(three));
        tree.next_card(deck).unwrap();
        assert_eq!(tree.visible_card(deck), Some(one));
        tree.last_card(deck).unwrap();
        tree.first_card(deck).unwrap();
        assert_eq!(tree.visible_card(deck), Some(one));
    }

    #[test]
    fn test_unknown_card_and_wrong_layout() {
        let (mut tree, deck, [one, ..]) = setup();
        assert!(matches!(
            tree.show_card(deck, "nope"),
            Err(ToolkitError::UnknownCard(_))
        ));
        assert!(matches!(
            tree.next_card(one),
            Err(ToolkitError::NotACardLayout(_))
        ));
        assert!(matches!(
            tree.add_child(deck, one),
            Err(ToolkitError::Constraint(_))
        ));
        assert_eq!(tree.parent(one), Some(deck));
    }

    #[test]
    fn test_removing_shown_card_reveals_next() {
        let (mut tree, deck, [one, two, three]) = setup();
        tree.remove(deck, one).unwrap();
        assert_eq!(tree.visible_card(deck), Some(two));
        assert!(tree.is_visible(two));
        assert!(!tree.is_visible(three));

        // The last card wraps round to the first.
        tree.show_card(deck, "three").unwrap();
        tree.remove(deck, three).unwrap();
        assert_eq!(tree.visible_card(deck), Some(two));

        tree.remove(deck, two).unwrap();
        assert_eq!(tree.visible_card(deck), None);
    }

    #[test]
    fn test_readding_shown_card_keeps_one_visible() {
        let (mut tree, deck, [one, two, three]) = setup();
        tree.add(deck, one, "one").unwrap();

        let shown: Vec<_> = [one, two, three]
            .into_iter()
            .filter(|&c| tree.is_visible(c))
            .collect();
        assert_eq!(shown, vec![two]);
        assert_eq!(tree.visible_card(deck), Some(two));
        assert_eq!(tree.children(deck), &[two, three, one]);
    }

    #[test]
    fn test_cards_fill_container() {
        let (mut tree, deck, [one, _, three]) = setup();
        tree.validate(deck);
        assert_eq!(tree.bounds(one), Rect::new(0, 0, 10, 6));
        // Leaf cards keep their size, centred
        assert_eq!(tree.bounds(three), Rect::new(2, 1, 6, 4));
        assert_eq!(tree.minimum_size(deck), Size::new(6, 4));
    }
}
