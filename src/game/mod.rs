//! Game orchestration
//!
//! Everything gameplay-related lives here. Like the rest of the core it is
//! deterministic: caller-supplied timestep, seeded RNG, stable list order.

pub mod entities;
pub mod manager;

pub use entities::{Enemy, Player, Powerup, PowerupKind, chase_step};
pub use manager::{FrameOutput, FrameSnapshot, GameManager};
