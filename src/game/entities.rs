//! Player, enemies and powerups

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::input::Direction;
use crate::pool::SlotId;
use crate::tilemap::{TileFlags, Tilemap};

/// The gardener
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Tile the player occupies (destination while a move is in flight)
    pub tile: IVec2,
    /// Tile the current move started from
    pub from: IVec2,
    pub facing: Direction,
    pub moving: bool,
    pub move_timer: f32,
    /// Seconds of fire trail left
    pub fire_timer: f32,
}

impl Player {
    pub fn new(tile: IVec2) -> Self {
        Self {
            tile,
            from: tile,
            facing: Direction::Down,
            moving: false,
            move_timer: 0.0,
            fire_timer: 0.0,
        }
    }

    pub fn has_fire(&self) -> bool {
        self.fire_timer > 0.0
    }

    /// Interpolation factor between `from` and `tile` for drawing
    pub fn progress(&self, move_duration: f32) -> f32 {
        if !self.moving || move_duration <= 0.0 {
            1.0
        } else {
            (self.move_timer / move_duration).clamp(0.0, 1.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub tile: IVec2,
    pub from: IVec2,
    pub move_timer: f32,
    /// Spawn fade tracked by the manager
    #[serde(skip)]
    pub fade: Option<SlotId>,
}

impl Enemy {
    pub fn new(tile: IVec2, fade: Option<SlotId>) -> Self {
        Self {
            tile,
            from: tile,
            move_timer: 0.0,
            fade,
        }
    }
}

/// Powerup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerupKind {
    /// Leave a burning trail for a while
    Fire,
    /// Raise the score multiplier
    Bonus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Powerup {
    pub tile: IVec2,
    pub kind: PowerupKind,
    pub age: f32,
    #[serde(skip)]
    pub fade: Option<SlotId>,
}

/// Tiles an enemy may not step onto
const ENEMY_BLOCKERS: TileFlags = TileFlags::ENEMY
    .union(TileFlags::MOVED)
    .union(TileFlags::POWERUP);

/// Pick the next tile for an enemy chasing `target`.
///
/// Steps along the axis with the larger distance first (x on ties), then the
/// other axis. A tile is open if it is floor and not occupied, claimed this
/// tick, or holding a powerup. Returns `None` when the enemy should stay put.
pub fn chase_step(from: IVec2, target: IVec2, map: &Tilemap) -> Option<IVec2> {
    let delta = target - from;
    if delta == IVec2::ZERO {
        return None;
    }
    let step_x = IVec2::new(delta.x.signum(), 0);
    let step_y = IVec2::new(0, delta.y.signum());
    let (primary, secondary) = if delta.x.abs() >= delta.y.abs() {
        (step_x, step_y)
    } else {
        (step_y, step_x)
    };

    [primary, secondary]
        .into_iter()
        .filter(|step| *step != IVec2::ZERO)
        .map(|step| from + step)
        .find(|pos| {
            map.get(*pos)
                .is_some_and(|t| t.is_floor() && !t.flags.intersects(ENEMY_BLOCKERS))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blockers_cover_occupancy_flags() {
        assert!(ENEMY_BLOCKERS.contains(TileFlags::ENEMY));
        assert!(ENEMY_BLOCKERS.contains(TileFlags::MOVED));
        assert!(ENEMY_BLOCKERS.contains(TileFlags::POWERUP));
        assert!(!ENEMY_BLOCKERS.intersects(TileFlags::FIRE | TileFlags::VISITED));
    }

    #[test]
    fn test_chase_prefers_longer_axis() {
        let map = Tilemap::default_garden().unwrap();
        let step = chase_step(IVec2::new(1, 5), IVec2::new(10, 6), &map);
        assert_eq!(step, Some(IVec2::new(2, 5)));
        let step = chase_step(IVec2::new(1, 1), IVec2::new(2, 10), &map);
        assert_eq!(step, Some(IVec2::new(1, 2)));
    }

    #[test]
    fn test_chase_falls_back_to_other_axis() {
        let mut map = Tilemap::default_garden().unwrap();
        map.tile_at_mut(IVec2::new(6, 5)).flags.insert(TileFlags::ENEMY);
        let step = chase_step(IVec2::new(5, 5), IVec2::new(10, 6), &map);
        assert_eq!(step, Some(IVec2::new(5, 6)));
    }

    #[test]
    fn test_chase_blocked_by_walls_stays() {
        let map = Tilemap::default_garden().unwrap();
        // (1, 1) hemmed in by the outer wall toward the upper left
        assert_eq!(chase_step(IVec2::new(1, 1), IVec2::new(0, 0), &map), None);
        assert_eq!(chase_step(IVec2::new(4, 4), IVec2::new(4, 4), &map), None);
    }

    #[test]
    fn test_player_progress() {
        let mut player = Player::new(IVec2::new(1, 1));
        assert_eq!(player.progress(0.2), 1.0);
        player.moving = true;
        player.move_timer = 0.1;
        assert!((player.progress(0.2) - 0.5).abs() < 1e-6);
    }
}
