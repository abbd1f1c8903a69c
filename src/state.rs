//! Top-level game modes

use serde::{Deserialize, Serialize};

use crate::audio::MusicSlot;

/// Which screen the game is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Active gameplay
    Play,
    /// Caught by an enemy; any input restarts
    Lose,
    /// Garden cleared, win sequence running
    Win,
    /// Waiting for the first input
    Title,
    /// Victory message; any input starts the epilogue
    WinText,
    Epilogue,
    /// Instructions shown before play
    Tutorial,
}

impl GameMode {
    /// Whether buffered input drives the player
    pub fn accepts_movement(self) -> bool {
        matches!(self, GameMode::Play)
    }

    /// Whether the world simulation (enemies, spawns, fire) advances
    pub fn simulates(self) -> bool {
        matches!(self, GameMode::Play)
    }

    /// Whether any input in this mode counts as "continue"
    pub fn waits_for_input(self) -> bool {
        matches!(self, GameMode::Title | GameMode::WinText | GameMode::Lose)
    }

    /// Music that should loop in this mode, if any
    pub fn music(self) -> Option<MusicSlot> {
        match self {
            GameMode::Title | GameMode::Tutorial => Some(MusicSlot::Title),
            GameMode::Play => Some(MusicSlot::Game),
            GameMode::WinText | GameMode::Epilogue => Some(MusicSlot::Ending),
            GameMode::Win | GameMode::Lose => None,
        }
    }
}
