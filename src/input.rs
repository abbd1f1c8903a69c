//! Directional input and the pending-input ring
//!
//! Raw polling happens outside the core. The ring keeps quick taps alive
//! while the player is still in the middle of a tile move.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::consts::INPUT_CAPACITY;
use crate::error::GameResult;

/// One of the four grid directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Tile step for this direction (y grows downward)
    pub fn offset(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Ring of the most recent directional inputs.
///
/// When full, a push overwrites the oldest entry, so the last
/// [`INPUT_CAPACITY`] inputs are always retained.
#[derive(Debug, Clone)]
pub struct InputBuffer {
    slots: [Option<Direction>; INPUT_CAPACITY],
    start: usize,
    end: usize,
    len: usize,
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBuffer {
    pub fn new() -> Self {
        Self {
            slots: [None; INPUT_CAPACITY],
            start: 0,
            end: 0,
            len: 0,
        }
    }

    /// Build the ring with its storage charged to `arena`
    pub fn with_arena(arena: &mut Arena) -> GameResult<Self> {
        arena.try_alloc_array::<Option<Direction>>(INPUT_CAPACITY)?;
        Ok(Self::new())
    }

    pub fn push(&mut self, dir: Direction) {
        self.slots[self.end] = Some(dir);
        self.end = (self.end + 1) % INPUT_CAPACITY;
        if self.len == INPUT_CAPACITY {
            // Overwrote the oldest entry
            self.start = self.end;
            log::trace!("Input ring full, dropped oldest input");
        } else {
            self.len += 1;
        }
    }

    /// Oldest pending input, if any
    pub fn pop(&mut self) -> Option<Direction> {
        if self.len == 0 {
            return None;
        }
        let dir = self.slots[self.start].take();
        self.start = (self.start + 1) % INPUT_CAPACITY;
        self.len -= 1;
        dir
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pop_empty() {
        let mut buf = InputBuffer::new();
        assert_eq!(buf.pop(), None);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_fifo_order() {
        let mut buf = InputBuffer::new();
        buf.push(Direction::Up);
        buf.push(Direction::Left);
        assert_eq!(buf.pop(), Some(Direction::Up));
        assert_eq!(buf.pop(), Some(Direction::Left));
        assert_eq!(buf.pop(), None);
    }

    #[test]
    fn test_overflow_keeps_last_five() {
        let mut buf = InputBuffer::new();
        let pushed = [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
            Direction::Up,
            Direction::Left,
        ];
        for dir in pushed {
            buf.push(dir);
        }
        assert_eq!(buf.len(), INPUT_CAPACITY);
        let popped: Vec<_> = std::iter::from_fn(|| buf.pop()).collect();
        assert_eq!(popped, pushed[1..].to_vec());
    }

    #[test]
    fn test_opposite_roundtrip() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.offset() + dir.opposite().offset(), IVec2::ZERO);
        }
    }

    fn direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    proptest! {
        #[test]
        fn prop_retains_most_recent(inputs in proptest::collection::vec(direction(), 0..20)) {
            let mut buf = InputBuffer::new();
            for dir in &inputs {
                buf.push(*dir);
            }
            let keep = inputs.len().min(INPUT_CAPACITY);
            let expected = &inputs[inputs.len() - keep..];
            let popped: Vec<_> = std::iter::from_fn(|| buf.pop()).collect();
            prop_assert_eq!(popped.as_slice(), expected);
        }
    }
}
