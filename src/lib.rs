//! Garden Rush - A tile-based garden arcade game
//!
//! Core modules:
//! - `game`: Per-frame orchestration (player, enemies, powerups, scoring)
//! - `events`: Scripted sequences that drive fades and mode changes
//! - `state`: Game modes and their properties
//! - `tilemap`: The 16x16 garden grid with per-tile flags and fire
//! - `arena`, `pool`, `list`: Fixed-capacity storage
//! - `effects`: Fades, screen shake, text bursts, parallax background
//! - `audio`: Sound intents for the host to play
//! - `settings`: Data-driven tuning and player preferences
//!
//! Rendering, windowing and audio playback belong to the host. Everything
//! here is deterministic given a seed and the sequence of `(dt, input)`.

pub mod arena;
pub mod audio;
pub mod effects;
pub mod error;
pub mod events;
pub mod game;
pub mod input;
pub mod list;
pub mod pool;
pub mod settings;
pub mod state;
pub mod tilemap;

pub use error::{GameError, GameResult};
pub use game::{FrameOutput, FrameSnapshot, GameManager};
pub use input::Direction;
pub use settings::{Settings, Tuning};
pub use state::GameMode;

/// Game configuration constants
pub mod consts {
    /// Garden dimensions in tiles
    pub const MAP_WIDTH: usize = 16;
    pub const MAP_HEIGHT: usize = 16;

    /// Buffered direction taps; older taps are dropped on overflow
    pub const INPUT_CAPACITY: usize = 5;

    /// Pool sizes for short-lived effects
    pub const MAX_TEXT_BURSTS: usize = 32;
    pub const MAX_FADEABLES: usize = 32;

    /// Longest scripted sequence
    pub const MAX_EVENTS: usize = 16;

    /// Backing store for every fixed-capacity container
    pub const ARENA_BYTES: usize = 64 * 1024;

    /// Nominal frame step used by the headless runner (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
}
