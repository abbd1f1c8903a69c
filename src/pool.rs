//! Fixed-capacity slot pools
//!
//! Slots are claimed by a linear scan for the first free one. A full pool
//! simply refuses the request and leaves every other slot alone.

use crate::arena::Arena;
use crate::error::GameResult;

/// Reference to an occupied pool slot.
///
/// Each acquire bumps the slot's generation, so an id kept after its slot
/// was released and reused no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    index: u32,
    generation: u32,
}

impl SlotId {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Debug, Clone)]
pub struct SlotPool<T> {
    slots: Vec<Slot<T>>,
}

impl<T> SlotPool<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity)
                .map(|_| Slot {
                    generation: 0,
                    value: None,
                })
                .collect(),
        }
    }

    /// Create a pool with its slot storage charged to `arena`
    pub fn with_arena(arena: &mut Arena, capacity: usize) -> GameResult<Self> {
        arena.try_alloc_array::<Slot<T>>(capacity)?;
        Ok(Self::new(capacity))
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|s| s.value.is_some()).count()
    }

    /// Place `value` in the first free slot, or `None` if saturated
    pub fn acquire(&mut self, value: T) -> Option<SlotId> {
        let Some(idx) = self.slots.iter().position(|s| s.value.is_none()) else {
            log::trace!("Pool saturated ({} slots), request skipped", self.capacity());
            return None;
        };
        let slot = &mut self.slots[idx];
        slot.generation = slot.generation.wrapping_add(1);
        slot.value = Some(value);
        Some(SlotId {
            index: idx as u32,
            generation: slot.generation,
        })
    }

    fn slot(&self, id: SlotId) -> Option<&Slot<T>> {
        self.slots
            .get(id.index())
            .filter(|s| s.generation == id.generation)
    }

    fn slot_mut(&mut self, id: SlotId) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(id.index())
            .filter(|s| s.generation == id.generation)
    }

    /// Free a slot. Stale ids leave the pool untouched.
    pub fn release(&mut self, id: SlotId) -> Option<T> {
        self.slot_mut(id).and_then(|s| s.value.take())
    }

    pub fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.slot(id).and_then(|s| s.value.as_ref())
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.slot_mut(id).and_then(|s| s.value.as_mut())
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            let id = SlotId {
                index: i as u32,
                generation: s.generation,
            };
            s.value.as_ref().map(|v| (id, v))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotId, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, s)| {
            let id = SlotId {
                index: i as u32,
                generation: s.generation,
            };
            s.value.as_mut().map(|v| (id, v))
        })
    }

    /// Deactivate every slot whose value fails `keep`
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        for slot in &mut self.slots {
            if slot.value.as_ref().is_some_and(|v| !keep(v)) {
                slot.value = None;
            }
        }
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.value = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_uses_first_free_slot() {
        let mut pool = SlotPool::new(3);
        let a = pool.acquire("a").unwrap();
        let b = pool.acquire("b").unwrap();
        pool.release(a);
        let c = pool.acquire("c").unwrap();
        assert_eq!(c.index(), 0);
        assert_eq!(pool.get(b), Some(&"b"));
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn test_saturated_pool_leaves_others_intact() {
        let mut pool = SlotPool::new(32);
        for i in 0..32 {
            assert!(pool.acquire(i).is_some());
        }
        assert!(pool.acquire(99).is_none());
        let values: Vec<_> = pool.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn test_retain_frees_slots() {
        let mut pool = SlotPool::new(4);
        for i in 0..4 {
            pool.acquire(i);
        }
        pool.retain(|v| v % 2 == 1);
        assert_eq!(pool.active_count(), 2);
        assert!(pool.acquire(10).is_some());
    }

    #[test]
    fn test_release_twice_is_harmless() {
        let mut pool = SlotPool::new(1);
        let id = pool.acquire(5).unwrap();
        assert_eq!(pool.release(id), Some(5));
        assert_eq!(pool.release(id), None);
    }

    #[test]
    fn test_stale_id_does_not_see_reused_slot() {
        let mut pool = SlotPool::new(1);
        let old = pool.acquire("old").unwrap();
        pool.release(old);
        let new = pool.acquire("new").unwrap();
        assert_eq!(old.index(), new.index());
        assert_eq!(pool.get(old), None);
        assert!(!pool.contains(old));
        assert_eq!(pool.release(old), None);
        assert_eq!(pool.get(new), Some(&"new"));
    }
}
