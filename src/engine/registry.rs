//! Component Registry - Generational slot allocation for the component arena.
//!
//! Manages the lifecycle of component slots:
//! - Free slot pool for O(1) reuse
//! - Generation counter per slot so a stale id never resolves to the
//!   component that later reused its slot
//!
//! Parents refer to children (and children to parents) only through
//! [`ComponentId`]s; the arena owns every node.

use std::fmt;

// =============================================================================
// ComponentId
// =============================================================================

/// Handle to a component in the tree.
///
/// Cheap to copy and `Send`, so it can travel inside events posted from
/// other threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId {
    index: u32,
    generation: u32,
}

impl ComponentId {
    /// Slot index (stable while the component is alive).
    #[inline]
    pub fn index(&self) -> usize {
        self.index as usize
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

// =============================================================================
// Registry State
// =============================================================================

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

pub(crate) struct Registry<T> {
    slots: Vec<Slot<T>>,
    /// Pool of freed slot indices for reuse.
    free: Vec<u32>,
    live: usize,
}

impl<T> Registry<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Store a value, reusing a freed slot if one is available.
    pub(crate) fn insert(&mut self, value: T) -> ComponentId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return ComponentId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        ComponentId {
            index,
            generation: 0,
        }
    }

    /// Release a slot back to the pool.
    pub(crate) fn remove(&mut self, id: ComponentId) -> Option<T> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(value)
    }

    pub(crate) fn get(&self, id: ComponentId) -> Option<&T> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: ComponentId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    pub(crate) fn contains(&self, id: ComponentId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live components.
    pub(crate) fn len(&self) -> usize {
        self.live
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut reg = Registry::new();
        let a = reg.insert("a");
        let b = reg.insert("b");
        assert_eq!(reg.get(a), Some(&"a"));
        assert_eq!(reg.get(b), Some(&"b"));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_stale_id_does_not_resolve_after_reuse() {
        let mut reg = Registry::new();
        let a = reg.insert(1);
        assert_eq!(reg.remove(a), Some(1));
        let b = reg.insert(2);

        // Same slot, new generation
        assert_eq!(a.index(), b.index());
        assert_ne!(a, b);
        assert_eq!(reg.get(a), None);
        assert_eq!(reg.get(b), Some(&2));
        assert_eq!(reg.remove(a), None);
    }
}
