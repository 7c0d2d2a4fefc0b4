//! Listener registry - Per-component callback lists.
//!
//! Every listener gets the [`Toolkit`] so it can mutate the tree, post
//! events or open windows. While a list is being fired it is moved out of
//! its node; listeners added meanwhile are appended afterwards and listeners
//! removed meanwhile are tombstoned and dropped on restore.

use std::sync::atomic::{AtomicU64, Ordering};

use super::{ActionEvent, FocusEvent, ItemEvent, KeyEvent, MouseEvent, WindowEvent};
use crate::toolkit::Toolkit;

// =============================================================================
// TYPES
// =============================================================================

/// Identifies a registered listener for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

pub type KeyListener = Box<dyn FnMut(&mut Toolkit, &mut KeyEvent)>;
pub type MouseListener = Box<dyn FnMut(&mut Toolkit, &mut MouseEvent)>;
pub type FocusListener = Box<dyn FnMut(&mut Toolkit, &FocusEvent)>;
pub type ActionListener = Box<dyn FnMut(&mut Toolkit, &ActionEvent)>;
pub type ItemListener = Box<dyn FnMut(&mut Toolkit, &ItemEvent)>;
pub type WindowListener = Box<dyn FnMut(&mut Toolkit, &WindowEvent)>;

pub(crate) type ListenerList<L> = Vec<(ListenerId, L)>;

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

#[derive(Default)]
pub(crate) struct Listeners {
    pub(crate) key: ListenerList<KeyListener>,
    pub(crate) mouse: ListenerList<MouseListener>,
    pub(crate) focus: ListenerList<FocusListener>,
    pub(crate) action: ListenerList<ActionListener>,
    pub(crate) item: ListenerList<ItemListener>,
    pub(crate) window: ListenerList<WindowListener>,
    /// Ids of listeners in lists checked out for firing.
    pub(crate) in_flight: Vec<ListenerId>,
    /// Ids removed while their list was checked out for firing.
    pub(crate) tombstones: Vec<ListenerId>,
}

impl Listeners {
    /// Remove a listener from whichever list holds it.
    ///
    /// Returns false if it is not present. A listener whose list is being
    /// fired is tombstoned and dropped when the list is restored; unknown
    /// ids are ignored.
    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let found = remove_from(&mut self.key, id)
            || remove_from(&mut self.mouse, id)
            || remove_from(&mut self.focus, id)
            || remove_from(&mut self.action, id)
            || remove_from(&mut self.item, id)
            || remove_from(&mut self.window, id);
        if !found && self.in_flight.contains(&id) && !self.tombstones.contains(&id) {
            self.tombstones.push(id);
        }
        found
    }

    /// Move a list out for firing.
    pub(crate) fn check_out<L>(
        &mut self,
        select: fn(&mut Listeners) -> &mut ListenerList<L>,
    ) -> ListenerList<L> {
        let list = std::mem::take(select(self));
        self.in_flight.extend(list.iter().map(|(id, _)| *id));
        list
    }

    /// Put a fired list back, keeping listeners registered during firing and
    /// dropping those removed during firing.
    pub(crate) fn restore<L>(
        &mut self,
        select: fn(&mut Listeners) -> &mut ListenerList<L>,
        mut fired: ListenerList<L>,
    ) {
        for (id, _) in &fired {
            if let Some(at) = self.in_flight.iter().position(|i| i == id) {
                self.in_flight.swap_remove(at);
            }
        }
        if !self.tombstones.is_empty() {
            let tombstones = &self.tombstones;
            fired.retain(|(id, _)| !tombstones.contains(id));
            let in_flight = &self.in_flight;
            self.tombstones.retain(|id| in_flight.contains(id));
        }
        let slot = select(self);
        let added = std::mem::replace(slot, fired);
        slot.extend(added);
    }
}

fn remove_from<L>(list: &mut ListenerList<L>, id: ListenerId) -> bool {
    let before = list.len();
    list.retain(|(i, _)| *i != id);
    list.len() != before
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_action() -> ActionListener {
        Box::new(|_, _| {})
    }

    fn noop_item() -> ItemListener {
        Box::new(|_, _| {})
    }

    #[test]
    fn test_remove_present_listener() {
        let mut listeners = Listeners::default();
        let id = ListenerId::next();
        listeners.action.push((id, noop_action()));
        assert!(listeners.remove(id));
        assert!(listeners.action.is_empty());
        assert!(listeners.tombstones.is_empty());
    }

    #[test]
    fn test_restore_keeps_added_and_drops_tombstoned() {
        let mut listeners = Listeners::default();
        let first = ListenerId::next();
        let second = ListenerId::next();
        listeners.action.push((first, noop_action()));
        listeners.action.push((second, noop_action()));

        // Check out for firing
        let fired = listeners.check_out(|l| &mut l.action);

        // During firing: one added, one removed
        let added = ListenerId::next();
        listeners.action.push((added, noop_action()));
        assert!(!listeners.remove(first));

        listeners.restore(|l| &mut l.action, fired);

        let ids: Vec<_> = listeners.action.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![second, added]);
        assert!(listeners.tombstones.is_empty());
        assert!(listeners.in_flight.is_empty());
    }

    #[test]
    fn test_removing_unknown_id_leaves_no_tombstone() {
        let mut listeners = Listeners::default();
        let id = ListenerId::next();
        listeners.action.push((id, noop_action()));
        assert!(listeners.remove(id));

        // Already removed, and not mid-fire.
        assert!(!listeners.remove(id));
        assert!(!listeners.remove(ListenerId::next()));
        assert!(listeners.tombstones.is_empty());
    }

    #[test]
    fn test_tombstone_waits_for_its_own_list() {
        let mut listeners = Listeners::default();
        let action = ListenerId::next();
        let item = ListenerId::next();
        listeners.action.push((action, noop_action()));
        listeners.item.push((item, noop_item()));

        let fired_actions = listeners.check_out(|l| &mut l.action);
        let fired_items = listeners.check_out(|l| &mut l.item);
        assert!(!listeners.remove(item));

        listeners.restore(|l| &mut l.action, fired_actions);
        assert_eq!(listeners.tombstones, vec![item]);

        listeners.restore(|l| &mut l.item, fired_items);
        assert!(listeners.item.is_empty());
        assert_eq!(listeners.action.len(), 1);
        assert!(listeners.tombstones.is_empty());
    }
}
