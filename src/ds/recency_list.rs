//! Intrusive doubly linked list backed by [`HandleArena`].
//!
//! Stores list nodes in the arena and links them by `NodeHandle`, so callers
//! get stable, revalidatable handles and O(1) reordering without pointer
//! chasing.
//!
//! ```text
//!   arena (HandleArena<Node<T>>)
//!   ┌────────┬─────────────────────────────────────────────┐
//!   │ handle │ Node { value, prev, next }                  │
//!   ├────────┼─────────────────────────────────────────────┤
//!   │ h_1    │ { value: A, prev: None, next: Some(h_2) }   │
//!   │ h_2    │ { value: B, prev: Some(h_1), next: h_3 }    │
//!   │ h_3    │ { value: C, prev: Some(h_2), next: None }   │
//!   └────────┴─────────────────────────────────────────────┘
//!
//!   head ─► [h_1] ◄──► [h_2] ◄──► [h_3] ◄── tail
//!   (MRU)                                   (LRU)
//! ```
//!
//! `push_front`, `pop_back`, `move_to_front`, and `remove` are O(1).
//! `debug_validate_invariants()` is available in debug/test builds.

use crate::ds::handle_arena::{HandleArena, NodeHandle};

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<NodeHandle>,
    next: Option<NodeHandle>,
}

/// Recency-ordered list: front = most recently used, back = least.
#[derive(Debug)]
pub struct RecencyList<T> {
    arena: HandleArena<Node<T>>,
    head: Option<NodeHandle>,
    tail: Option<NodeHandle>,
}

impl<T> RecencyList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            arena: HandleArena::new(),
            head: None,
            tail: None,
        }
    }

    /// Creates an empty list with reserved node capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: HandleArena::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    /// Returns the number of nodes in the list.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Returns `true` if `handle` is currently a live node of this list.
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.arena.contains(handle)
    }

    /// Returns the value for a node handle, if still live.
    pub fn get(&self, handle: NodeHandle) -> Option<&T> {
        self.arena.get(handle).map(|node| &node.value)
    }

    /// Returns a mutable reference to a node value, if still live.
    pub fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut T> {
        self.arena.get_mut(handle).map(|node| &mut node.value)
    }

    /// Returns the value at the front (MRU), if any.
    pub fn front(&self) -> Option<&T> {
        self.head.and_then(|handle| self.get(handle))
    }

    /// Returns the value at the back (LRU), if any.
    pub fn back(&self) -> Option<&T> {
        self.tail.and_then(|handle| self.get(handle))
    }

    /// Returns the handle at the front (MRU), if any.
    pub fn front_handle(&self) -> Option<NodeHandle> {
        self.head
    }

    /// Returns the handle at the back (LRU), if any.
    pub fn back_handle(&self) -> Option<NodeHandle> {
        self.tail
    }

    /// Inserts a new node at the front and returns its handle.
    pub fn push_front(&mut self, value: T) -> NodeHandle {
        let handle = self.arena.insert(Node {
            value,
            prev: None,
            next: self.head,
        });
        match self.head {
            Some(old_head) => {
                if let Some(node) = self.arena.get_mut(old_head) {
                    node.prev = Some(handle);
                }
            },
            None => self.tail = Some(handle),
        }
        self.head = Some(handle);
        handle
    }

    /// Removes and returns the back (LRU) value.
    pub fn pop_back(&mut self) -> Option<T> {
        let handle = self.tail?;
        self.detach(handle)?;
        self.arena.remove(handle).map(|node| node.value)
    }

    /// Removes the node `handle` from the list and returns its value.
    pub fn remove(&mut self, handle: NodeHandle) -> Option<T> {
        self.detach(handle)?;
        self.arena.remove(handle).map(|node| node.value)
    }

    /// Moves an existing node to the front; returns `false` if `handle` is
    /// stale or was never part of this list.
    pub fn move_to_front(&mut self, handle: NodeHandle) -> bool {
        if !self.arena.contains(handle) {
            return false;
        }
        if Some(handle) == self.head {
            return true;
        }
        self.detach(handle);
        self.attach_front(handle);
        true
    }

    /// Clears the list and invalidates every outstanding handle.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = None;
        self.tail = None;
    }

    /// Returns an iterator from front (MRU) to back (LRU).
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            current: self.head,
        }
    }

    /// Returns an iterator from back (LRU) to front (MRU).
    pub fn iter_rev(&self) -> IterRev<'_, T> {
        IterRev {
            list: self,
            current: self.tail,
        }
    }

    fn detach(&mut self, handle: NodeHandle) -> Option<()> {
        let (prev, next) = {
            let node = self.arena.get(handle)?;
            (node.prev, node.next)
        };

        match prev {
            Some(prev_handle) => {
                if let Some(prev_node) = self.arena.get_mut(prev_handle) {
                    prev_node.next = next;
                }
            },
            None => self.head = next,
        }

        match next {
            Some(next_handle) => {
                if let Some(next_node) = self.arena.get_mut(next_handle) {
                    next_node.prev = prev;
                }
            },
            None => self.tail = prev,
        }

        if let Some(node) = self.arena.get_mut(handle) {
            node.prev = None;
            node.next = None;
        }

        Some(())
    }

    fn attach_front(&mut self, handle: NodeHandle) {
        let old_head = self.head;
        if let Some(node) = self.arena.get_mut(handle) {
            node.prev = None;
            node.next = old_head;
        } else {
            return;
        }
        match old_head {
            Some(old_head) => {
                if let Some(head_node) = self.arena.get_mut(old_head) {
                    head_node.prev = Some(handle);
                }
            },
            None => self.tail = Some(handle),
        }
        self.head = Some(handle);
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if self.head.is_none() || self.tail.is_none() {
            assert!(self.head.is_none());
            assert!(self.tail.is_none());
            assert_eq!(self.len(), 0);
            return;
        }

        let mut seen = std::collections::HashSet::new();
        let mut count = 0usize;
        let mut current = self.head;
        let mut prev = None;

        while let Some(handle) = current {
            assert!(seen.insert(handle));
            let node = self.arena.get(handle).expect("node missing");
            assert_eq!(node.prev, prev);
            if node.next.is_none() {
                assert_eq!(self.tail, Some(handle));
            }

            prev = Some(handle);
            current = node.next;
            count += 1;
            assert!(count <= self.len());
        }

        assert_eq!(count, self.len());
    }
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over values from front (MRU) to back (LRU).
pub struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    current: Option<NodeHandle>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.current?;
        let node = self.list.arena.get(handle)?;
        self.current = node.next;
        Some(&node.value)
    }
}

/// Iterator over values from back (LRU) to front (MRU).
pub struct IterRev<'a, T> {
    list: &'a RecencyList<T>,
    current: Option<NodeHandle>,
}

impl<'a, T> Iterator for IterRev<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.current?;
        let node = self.list.arena.get(handle)?;
        self.current = node.prev;
        Some(&node.value)
    }
}
