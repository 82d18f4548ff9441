//! LRU List Module
//!
//! Recency ordering for cache eviction, stored as a doubly-linked list inside a
//! slot arena.
//!
//! Items are addressed by stable `usize` slot handles. Links are kept as slot
//! indices on each node, so there are no pointers between nodes and every
//! operation is O(1):
//! - Front = Most recently used
//! - Back = Least recently used
//!
//! Vacated slots are chained into a free list and reused by later inserts.

use std::mem;

// == Node ==
#[derive(Debug)]
struct Node<T> {
    item: T,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug)]
enum Slot<T> {
    Occupied(Node<T>),
    Vacant { next_free: Option<usize> },
}

// == LRU List ==
/// Recency-ordered list of items addressed by slot handles.
///
/// A handle returned by [`LruList::push_front`] stays valid until that item is
/// removed. Passing a handle for a removed item is a logic error and panics.
#[derive(Debug)]
pub struct LruList<T> {
    slots: Vec<Slot<T>>,
    /// Most recently used
    head: Option<usize>,
    /// Least recently used
    tail: Option<usize>,
    /// First vacant slot available for reuse
    free: Option<usize>,
    len: usize,
}

impl<T> Default for LruList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LruList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            head: None,
            tail: None,
            free: None,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts an item as the most recently used and returns its handle.
    pub fn push_front(&mut self, item: T) -> usize {
        let node = Node {
            item,
            prev: None,
            next: None,
        };

        let slot = match self.free {
            Some(slot) => {
                self.free = match self.slots[slot] {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => unreachable!("free list points at occupied slot {slot}"),
                };
                self.slots[slot] = Slot::Occupied(node);
                slot
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                self.slots.len() - 1
            }
        };

        self.link_front(slot);
        self.len += 1;
        slot
    }

    // == Move To Front ==
    /// Marks an item as most recently used.
    pub fn move_to_front(&mut self, slot: usize) {
        if self.head == Some(slot) {
            return;
        }
        self.unlink(slot);
        self.link_front(slot);
    }

    // == Remove ==
    /// Removes an item and returns it. The handle becomes invalid.
    pub fn remove(&mut self, slot: usize) -> T {
        self.unlink(slot);

        let vacated = mem::replace(
            &mut self.slots[slot],
            Slot::Vacant {
                next_free: self.free,
            },
        );
        self.free = Some(slot);
        self.len -= 1;

        match vacated {
            Slot::Occupied(node) => node.item,
            Slot::Vacant { .. } => unreachable!("unlink accepted vacant slot {slot}"),
        }
    }

    // == Pop Back ==
    /// Removes and returns the least recently used item.
    ///
    /// Returns None if the list is empty.
    #[cfg(test)]
    pub fn pop_back(&mut self) -> Option<T> {
        let slot = self.tail?;
        Some(self.remove(slot))
    }

    // == Peek ==
    /// Handle of the least recently used item.
    pub fn back(&self) -> Option<usize> {
        self.tail
    }

    /// Handle of the most recently used item.
    #[cfg(test)]
    pub fn front(&self) -> Option<usize> {
        self.head
    }

    pub fn get(&self, slot: usize) -> &T {
        &self.node(slot).item
    }

    pub fn get_mut(&mut self, slot: usize) -> &mut T {
        &mut self.node_mut(slot).item
    }

    // == Length ==
    /// Returns the number of live items.
    pub fn len(&self) -> usize {
        self.len
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Iteration ==
    /// Iterates items from most to least recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    // == Linking ==
    fn link_front(&mut self, slot: usize) {
        let old_head = self.head;
        {
            let node = self.node_mut(slot);
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head) => self.node_mut(head).prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = {
            let node = self.node(slot);
            (node.prev, node.next)
        };
        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }
        let node = self.node_mut(slot);
        node.prev = None;
        node.next = None;
    }

    fn node(&self, slot: usize) -> &Node<T> {
        match &self.slots[slot] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("slot {slot} is vacant"),
        }
    }

    fn node_mut(&mut self, slot: usize) -> &mut Node<T> {
        match &mut self.slots[slot] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("slot {slot} is vacant"),
        }
    }
}

// == Iterator ==
/// Front-to-back iterator over an [`LruList`].
pub struct Iter<'a, T> {
    list: &'a LruList<T>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let node = self.list.node(slot);
        self.cursor = node.next;
        self.remaining -= 1;
        Some(&node.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
