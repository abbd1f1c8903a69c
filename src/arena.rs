//! Fixed-capacity bump arena
//!
//! The arena is a byte budget. Every long-lived game structure charges the
//! size of its backing storage here when the game is built, then owns that
//! storage itself. Charges only grow and are reset as a whole; nothing is
//! ever returned piecemeal. Running over the budget is a sizing mistake and
//! surfaces before the first frame.

use crate::error::{GameError, GameResult};

/// A contiguous range of the budget handed out by [`Arena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaBlock {
    pub offset: usize,
    pub len: usize,
}

impl ArenaBlock {
    /// One past the last byte of the block
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Bump allocator over a fixed byte budget
#[derive(Debug)]
pub struct Arena {
    capacity: usize,
    used: usize,
}

impl Arena {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, used: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn remaining(&self) -> usize {
        self.capacity() - self.used
    }

    /// Allocate `size` contiguous bytes, or report exhaustion.
    ///
    /// Only meant for construction time, where an undersized arena is a
    /// sizing mistake that should stop the game from starting.
    pub fn try_alloc(&mut self, size: usize) -> GameResult<ArenaBlock> {
        let remaining = self.remaining();
        if size > remaining {
            return Err(GameError::ArenaExhausted {
                requested: size,
                remaining,
                capacity: self.capacity(),
            });
        }
        let block = ArenaBlock {
            offset: self.used,
            len: size,
        };
        self.used += size;
        Ok(block)
    }

    /// Allocate `size` contiguous bytes.
    ///
    /// # Panics
    ///
    /// Panics when the arena is exhausted. Capacities are compile-time
    /// constants, so running out is a programming error.
    pub fn alloc(&mut self, size: usize) -> ArenaBlock {
        match self.try_alloc(size) {
            Ok(block) => block,
            Err(err) => panic!("{err}"),
        }
    }

    /// Charge storage for `count` values of `T`
    pub fn try_alloc_array<T>(&mut self, count: usize) -> GameResult<ArenaBlock> {
        self.try_alloc(std::mem::size_of::<T>() * count)
    }

    /// Reset the bump offset. Blocks handed out earlier become invalid.
    pub fn clear(&mut self) {
        self.used = 0;
    }

    /// Retire the arena, logging how much of the budget was charged
    pub fn free(self) {
        log::debug!(
            "Arena released ({} of {} bytes used)",
            self.used,
            self.capacity()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_is_contiguous() {
        let mut arena = Arena::new(64);
        let a = arena.alloc(10);
        let b = arena.alloc(20);
        assert_eq!(a, ArenaBlock { offset: 0, len: 10 });
        assert_eq!(b.offset, 10);
        assert_eq!(arena.used(), 30);
        assert_eq!(arena.remaining(), 34);
    }

    #[test]
    fn test_try_alloc_reports_exhaustion() {
        let mut arena = Arena::new(16);
        arena.alloc(12);
        let err = arena.try_alloc(8).unwrap_err();
        assert!(matches!(
            err,
            GameError::ArenaExhausted {
                requested: 8,
                remaining: 4,
                capacity: 16
            }
        ));
        // Failed request does not move the offset
        assert_eq!(arena.used(), 12);
    }

    #[test]
    #[should_panic(expected = "arena exhausted")]
    fn test_alloc_panics_when_full() {
        let mut arena = Arena::new(4);
        arena.alloc(5);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut arena = Arena::new(32);
        arena.alloc(8);
        arena.clear();
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.capacity(), 32);
        let again = arena.alloc(32);
        assert_eq!(again, ArenaBlock { offset: 0, len: 32 });
        assert_eq!(arena.remaining(), 0);
    }

    #[test]
    fn test_alloc_array_sizes_by_type() {
        let mut arena = Arena::new(64);
        let block = arena.try_alloc_array::<u32>(4).unwrap();
        assert_eq!(block.len, 16);
        arena.free();
    }
}
