//! Game tuning and player preferences
//!
//! Both are plain serde structs so a host can ship them as JSON. Missing
//! fields fall back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::error::GameResult;

/// Gameplay balance values (seconds unless noted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Time for the player to cross one tile
    pub player_move_duration: f32,
    /// Time between enemy steps
    pub enemy_move_duration: f32,
    pub enemy_spawn_interval: f32,
    pub powerup_spawn_interval: f32,
    /// Uncollected powerups vanish after this long
    pub powerup_lifetime: f32,
    /// How long a fire powerup leaves a burning trail
    pub fire_power_duration: f32,
    /// Burn time of a trail tile
    pub fire_burn_duration: f32,
    /// Burn time of a tile fire spread onto
    pub fire_spread_duration: f32,
    /// Live enemy cap (list capacity)
    pub max_enemies: usize,
    /// Live powerup cap (list capacity)
    pub max_powerups: usize,
    pub max_multiplier: u32,
    /// Random tile picks before a spawn is abandoned
    pub spawn_retries: u32,
    /// Seconds between announcer quotes during play
    pub hype_interval: f32,
    /// Shake strength in tiles
    pub shake_intensity: f32,
    pub shake_duration: f32,
    pub burst_lifetime: f32,
    pub burst_scale: f32,
    /// Fade-in time for newly spawned entities
    pub spawn_fade_duration: f32,
    /// White flash fade-out when the garden is cleared
    pub win_flash_duration: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_move_duration: 0.15,
            enemy_move_duration: 0.6,
            enemy_spawn_interval: 4.0,
            powerup_spawn_interval: 7.0,
            powerup_lifetime: 10.0,
            fire_power_duration: 5.0,
            fire_burn_duration: 3.0,
            fire_spread_duration: 1.5,
            max_enemies: 12,
            max_powerups: 4,
            max_multiplier: 8,
            spawn_retries: 32,
            hype_interval: 12.0,
            shake_intensity: 0.3,
            shake_duration: 0.35,
            burst_lifetime: 0.8,
            burst_scale: 1.5,
            spawn_fade_duration: 0.4,
            win_flash_duration: 1.0,
        }
    }
}

impl Tuning {
    pub fn from_json(json: &str) -> GameResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    // === Visual Effects ===
    /// Screen shake on kills and losses
    pub screen_shake: bool,
    /// Floating score text
    pub text_bursts: bool,

    // === Accessibility ===
    /// Reduced motion (no shake)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
            screen_shake: true,
            text_bursts: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> GameResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_tuning_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "enemy_move_duration": 0.25 }"#).unwrap();
        assert_eq!(tuning.enemy_move_duration, 0.25);
        assert_eq!(tuning.max_enemies, Tuning::default().max_enemies);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, crate::error::GameError::Config(_)));
    }

    #[test]
    fn test_reduced_motion_disables_shake() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert!(!settings.effective_screen_shake());
        assert!(Settings::default().effective_screen_shake());
    }

    #[test]
    fn test_settings_roundtrip_json() {
        let settings = Settings {
            music_volume: 0.2,
            ..Default::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }
}
