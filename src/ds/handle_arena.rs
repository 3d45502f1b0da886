//! Slot storage with generation-checked handles.
//!
//! Freed slots are recycled through a free list, so a bare index is not a
//! safe reference: a handle that outlives its node could alias whatever got
//! allocated into the same slot later. Every slot carries a generation that
//! is bumped on removal, and a `NodeHandle` only resolves while its
//! generation matches. Revalidating a possibly-stale handle is therefore a
//! single comparison.

/// Stable, revalidatable reference to a slot in a [`HandleArena`].
///
/// A handle taken before its node was removed (or the arena cleared) fails
/// the generation check and resolves to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    index: usize,
    generation: u64,
}

impl NodeHandle {
    /// Returns the slot index this handle refers to.
    pub fn index(self) -> usize {
        self.index
    }

    /// Returns the generation this handle was issued under.
    pub fn generation(self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u64,
    value: Option<T>,
}

/// Growable slot store that issues [`NodeHandle`]s and recycles freed slots.
#[derive(Debug)]
pub struct HandleArena<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<T> HandleArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Stores `value` and returns a handle valid until the slot is freed.
    pub fn insert(&mut self, value: T) -> NodeHandle {
        let handle = if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index];
            slot.value = Some(value);
            NodeHandle {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                value: Some(value),
            });
            NodeHandle {
                index: self.slots.len() - 1,
                generation: 0,
            }
        };
        self.len += 1;
        handle
    }

    /// Frees the slot behind `handle` and returns its value.
    ///
    /// Invalidates every outstanding handle to that slot; returns `None` if
    /// `handle` is already stale.
    pub fn remove(&mut self, handle: NodeHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation += 1;
        self.free_list.push(handle.index);
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        let slot = self.slots.get(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Returns `true` if `handle` still refers to a live slot.
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Frees every slot. All outstanding handles become stale.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            if slot.value.take().is_some() {
                slot.generation += 1;
            }
        }
        self.free_list.clear();
        self.free_list.extend(0..self.slots.len());
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    NodeHandle {
                        index,
                        generation: slot.generation,
                    },
                    value,
                )
            })
        })
    }
}

impl<T> Default for HandleArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arena_insert_remove_reuse() {
        let mut arena = HandleArena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.get(b), Some(&"b"));

        assert_eq!(arena.remove(a), Some("a"));
        assert_eq!(arena.len(), 1);

        let c = arena.insert("c");
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(c), Some(&"c"));
        assert_eq!(a.index(), c.index());
    }

    #[test]
    fn stale_handle_fails_generation_check() {
        let mut arena = HandleArena::new();
        let a = arena.insert(1);
        assert_eq!(arena.remove(a), Some(1));

        // Slot is recycled under a new generation.
        let b = arena.insert(2);
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());

        assert!(!arena.contains(a));
        assert_eq!(arena.get(a), None);
        assert_eq!(arena.remove(a), None);
        assert_eq!(arena.get(b), Some(&2));
    }

    #[test]
    fn clear_invalidates_all_handles() {
        let mut arena = HandleArena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);
        arena.clear();
        assert!(arena.is_empty());
        assert!(!arena.contains(a));
        assert!(!arena.contains(b));

        let c = arena.insert(3);
        assert_eq!(arena.get(c), Some(&3));
        assert_eq!(arena.get(a), None);
        assert_eq!(arena.get(b), None);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut arena = HandleArena::new();
        let a = arena.insert(10);
        if let Some(value) = arena.get_mut(a) {
            *value = 20;
        }
        assert_eq!(arena.get(a), Some(&20));
    }

    #[test]
    fn iter_yields_live_entries_only() {
        let mut arena = HandleArena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        let c = arena.insert("c");
        arena.remove(b);

        let mut entries: Vec<_> = arena.iter().collect();
        entries.sort_by_key(|(handle, _)| handle.index());
        assert_eq!(entries, vec![(a, &"a"), (c, &"c")]);
    }
}
