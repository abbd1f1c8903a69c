//! Sentinel-rooted doubly linked entity lists
//!
//! Nodes live in a fixed slot array and link to each other by index. Slot 0
//! is the sentinel: it never holds a value and closes the ring, so the list
//! is empty exactly when the sentinel links to itself. Removed slots go onto
//! a free-index stack and are reused by later inserts.

use crate::arena::Arena;
use crate::error::GameResult;

const SENTINEL: u32 = 0;

/// Stable reference to a live list node.
///
/// The generation guards against a handle outliving its node: once the slot
/// is reused, old handles stop resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    index: u32,
    generation: u32,
}

impl EntityHandle {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

#[derive(Debug, Clone)]
struct Node<T> {
    prev: u32,
    next: u32,
    generation: u32,
    value: Option<T>,
}

impl<T> Node<T> {
    fn unlinked(index: u32) -> Self {
        Self {
            prev: index,
            next: index,
            generation: 0,
            value: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EntityList<T> {
    nodes: Vec<Node<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> EntityList<T> {
    /// Create a list able to hold `capacity` live nodes
    pub fn with_capacity(capacity: usize) -> Self {
        let nodes = (0..=capacity as u32).map(Node::unlinked).collect();
        // Lowest indices are handed out first
        let free = (1..=capacity as u32).rev().collect();
        Self {
            nodes,
            free,
            len: 0,
        }
    }

    /// Create a list with its node storage charged to `arena`
    pub fn with_arena(arena: &mut Arena, capacity: usize) -> GameResult<Self> {
        arena.try_alloc_array::<Node<T>>(capacity + 1)?;
        arena.try_alloc_array::<u32>(capacity)?;
        Ok(Self::with_capacity(capacity))
    }

    pub fn capacity(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[SENTINEL as usize].next == SENTINEL
    }

    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    /// Splice `value` in right after the sentinel.
    ///
    /// Returns `None` when every slot is taken.
    pub fn insert(&mut self, value: T) -> Option<EntityHandle> {
        let index = self.free.pop()?;
        let head = self.nodes[SENTINEL as usize].next;

        let node = &mut self.nodes[index as usize];
        node.prev = SENTINEL;
        node.next = head;
        node.generation = node.generation.wrapping_add(1);
        node.value = Some(value);
        let generation = node.generation;

        self.nodes[head as usize].prev = index;
        self.nodes[SENTINEL as usize].next = index;
        self.len += 1;

        Some(EntityHandle { index, generation })
    }

    fn resolve(&self, handle: EntityHandle) -> Option<usize> {
        let idx = handle.index as usize;
        if handle.index == SENTINEL || idx >= self.nodes.len() {
            return None;
        }
        let node = &self.nodes[idx];
        (node.generation == handle.generation && node.value.is_some()).then_some(idx)
    }

    /// Unlink a node and return its value. Stale handles yield `None`.
    pub fn remove(&mut self, handle: EntityHandle) -> Option<T> {
        let idx = self.resolve(handle)?;
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);
        self.nodes[prev as usize].next = next;
        self.nodes[next as usize].prev = prev;

        let node = &mut self.nodes[idx];
        node.prev = handle.index;
        node.next = handle.index;
        let value = node.value.take();

        self.free.push(handle.index);
        self.len -= 1;
        value
    }

    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.resolve(handle).is_some()
    }

    pub fn get(&self, handle: EntityHandle) -> Option<&T> {
        let idx = self.resolve(handle)?;
        self.nodes[idx].value.as_ref()
    }

    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut T> {
        let idx = self.resolve(handle)?;
        self.nodes[idx].value.as_mut()
    }

    fn handle_at(&self, index: u32) -> Option<EntityHandle> {
        (index != SENTINEL).then(|| EntityHandle {
            index,
            generation: self.nodes[index as usize].generation,
        })
    }

    /// First node after the sentinel
    pub fn first(&self) -> Option<EntityHandle> {
        self.handle_at(self.nodes[SENTINEL as usize].next)
    }

    /// Node following `handle`.
    ///
    /// Fetch the successor before removing the current node to walk the
    /// list while deleting from it.
    pub fn next(&self, handle: EntityHandle) -> Option<EntityHandle> {
        let idx = self.resolve(handle)?;
        self.handle_at(self.nodes[idx].next)
    }

    /// Snapshot of live handles in list order
    pub fn handles(&self) -> Vec<EntityHandle> {
        let mut out = Vec::with_capacity(self.len);
        let mut cursor = self.first();
        while let Some(handle) = cursor {
            out.push(handle);
            cursor = self.next(handle);
        }
        out
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.nodes[SENTINEL as usize].next,
        }
    }

    /// Unlink every node
    pub fn clear(&mut self) {
        while let Some(handle) = self.first() {
            self.remove(handle);
        }
    }
}

/// Forward iterator from `sentinel.next` back around to the sentinel
pub struct Iter<'a, T> {
    list: &'a EntityList<T>,
    cursor: u32,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (EntityHandle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == SENTINEL {
            return None;
        }
        let index = self.cursor;
        let node = &self.list.nodes[index as usize];
        self.cursor = node.next;
        let value = node.value.as_ref()?;
        Some((
            EntityHandle {
                index,
                generation: node.generation,
            },
            value,
        ))
    }
}
