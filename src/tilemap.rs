//! Fixed 16×16 garden grid
//!
//! The live grid is mutated by spawning, movement and fire; an immutable
//! copy of the loaded layout restores it on level restart.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::{MAP_HEIGHT, MAP_WIDTH};
use crate::error::{GameError, GameResult};

/// What a tile is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileKind {
    /// Empty space (pond, outside the garden)
    #[default]
    None,
    Wall,
    Floor,
}

/// Per-tile state bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct TileFlags(u8);

impl TileFlags {
    pub const EMPTY: TileFlags = TileFlags(0);
    pub const FIRE: TileFlags = TileFlags(1 << 0);
    pub const VISITED: TileFlags = TileFlags(1 << 1);
    pub const POWERUP: TileFlags = TileFlags(1 << 2);
    pub const ENEMY: TileFlags = TileFlags(1 << 3);
    pub const MOVED: TileFlags = TileFlags(1 << 4);

    pub const fn union(self, other: TileFlags) -> TileFlags {
        TileFlags(self.0 | other.0)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: TileFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: TileFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: TileFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: TileFlags) {
        self.0 &= !other.0;
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for TileFlags {
    type Output = TileFlags;

    fn bitor(self, rhs: TileFlags) -> TileFlags {
        TileFlags(self.0 | rhs.0)
    }
}

/// A single grid cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub flags: TileFlags,
    /// Stable per-tile random value (sprite variant selection)
    pub seed: u32,
    pub pos: IVec2,
    /// Animation timer; seconds of burn left while `FIRE` is set
    pub anim: f32,
}

impl Tile {
    pub fn is_floor(&self) -> bool {
        self.kind == TileKind::Floor
    }

    pub fn is_burning(&self) -> bool {
        self.flags.contains(TileFlags::FIRE)
    }
}

/// The built-in garden layout
pub const DEFAULT_GARDEN: &str = "\
################
#P.............#
#..##......##..#
#..#........#..#
#......##......#
#..............#
#.##........##.#
#.#....  ....#.#
#.#....  ....#.#
#.##........##.#
#..............#
#......##......#
#..#........#..#
#..##......##..#
#..............#
################";

fn tile_seed(x: i32, y: i32) -> u32 {
    (x as u32).wrapping_mul(73_856_093) ^ (y as u32).wrapping_mul(19_349_663)
}

/// Live grid plus the layout it was loaded from
#[derive(Debug, Clone)]
pub struct Tilemap {
    tiles: Vec<Tile>,
    original: Vec<Tile>,
    player_start: IVec2,
}

impl Tilemap {
    /// Parse a layout of `MAP_HEIGHT` lines of `MAP_WIDTH` characters.
    ///
    /// `#` wall, `.` floor, ` ` nothing, `P` floor where the player starts.
    pub fn parse(layout: &str) -> GameResult<Self> {
        let rows: Vec<&str> = layout.lines().collect();
        if rows.len() != MAP_HEIGHT {
            return Err(GameError::InvalidMap(format!(
                "expected {MAP_HEIGHT} rows, found {}",
                rows.len()
            )));
        }

        let mut tiles = Vec::with_capacity(MAP_WIDTH * MAP_HEIGHT);
        let mut player_start = None;
        for (y, row) in rows.iter().enumerate() {
            let chars: Vec<char> = row.chars().collect();
            if chars.len() != MAP_WIDTH {
                return Err(GameError::InvalidMap(format!(
                    "row {y} has {} columns, expected {MAP_WIDTH}",
                    chars.len()
                )));
            }
            for (x, ch) in chars.into_iter().enumerate() {
                let kind = match ch {
                    '#' => TileKind::Wall,
                    '.' => TileKind::Floor,
                    ' ' => TileKind::None,
                    'P' => {
                        if player_start.is_some() {
                            return Err(GameError::InvalidMap(
                                "more than one player start".to_string(),
                            ));
                        }
                        player_start = Some(IVec2::new(x as i32, y as i32));
                        TileKind::Floor
                    }
                    other => {
                        return Err(GameError::InvalidMap(format!(
                            "unknown tile '{other}' at ({x}, {y})"
                        )));
                    }
                };
                tiles.push(Tile {
                    kind,
                    flags: TileFlags::EMPTY,
                    seed: tile_seed(x as i32, y as i32),
                    pos: IVec2::new(x as i32, y as i32),
                    anim: 0.0,
                });
            }
        }

        let player_start = player_start
            .ok_or_else(|| GameError::InvalidMap("missing player start 'P'".to_string()))?;

        Ok(Self {
            original: tiles.clone(),
            tiles,
            player_start,
        })
    }

    pub fn default_garden() -> GameResult<Self> {
        Self::parse(DEFAULT_GARDEN)
    }

    /// Restore every tile to the loaded layout
    pub fn reset(&mut self) {
        self.tiles.clone_from(&self.original);
    }

    pub fn width(&self) -> usize {
        MAP_WIDTH
    }

    pub fn height(&self) -> usize {
        MAP_HEIGHT
    }

    pub fn player_start(&self) -> IVec2 {
        self.player_start
    }

    pub fn in_bounds(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < MAP_WIDTH && (pos.y as usize) < MAP_HEIGHT
    }

    fn index(&self, pos: IVec2) -> usize {
        assert!(self.in_bounds(pos), "tile ({}, {}) out of range", pos.x, pos.y);
        pos.y as usize * MAP_WIDTH + pos.x as usize
    }

    /// # Panics
    ///
    /// Panics if `pos` lies outside the grid.
    pub fn tile_at(&self, pos: IVec2) -> &Tile {
        &self.tiles[self.index(pos)]
    }

    /// # Panics
    ///
    /// Panics if `pos` lies outside the grid.
    pub fn tile_at_mut(&mut self, pos: IVec2) -> &mut Tile {
        let idx = self.index(pos);
        &mut self.tiles[idx]
    }

    /// Non-panicking lookup for neighbour probing
    pub fn get(&self, pos: IVec2) -> Option<&Tile> {
        if self.in_bounds(pos) {
            Some(&self.tiles[pos.y as usize * MAP_WIDTH + pos.x as usize])
        } else {
            None
        }
    }

    pub fn is_walkable(&self, pos: IVec2) -> bool {
        self.get(pos).is_some_and(Tile::is_floor)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn floor_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_floor()).count()
    }

    pub fn visited_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|t| t.is_floor() && t.flags.contains(TileFlags::VISITED))
            .count()
    }

    pub fn all_visited(&self) -> bool {
        self.tiles
            .iter()
            .filter(|t| t.is_floor())
            .all(|t| t.flags.contains(TileFlags::VISITED))
    }

    pub fn clear_flag_all(&mut self, flag: TileFlags) {
        for tile in &mut self.tiles {
            tile.flags.remove(flag);
        }
    }

    /// Set a floor tile alight for `burn` seconds
    pub fn ignite(&mut self, pos: IVec2, burn: f32) {
        let tile = self.tile_at_mut(pos);
        if tile.is_floor() {
            tile.flags.insert(TileFlags::FIRE);
            tile.anim = tile.anim.max(burn);
        }
    }

    /// Burn down fires and spread them onto adjacent enemy tiles.
    ///
    /// Spread targets are chosen from the state before this tick, so fire
    /// travels at most one tile per call. Returns the newly ignited tiles.
    pub fn tick_fire(&mut self, dt: f32, spread_burn: f32) -> Vec<IVec2> {
        let mut spread = Vec::new();
        for tile in self.tiles.iter().filter(|t| t.is_burning()) {
            for dir in crate::input::Direction::ALL {
                let next = tile.pos + dir.offset();
                let catches = self.get(next).is_some_and(|n| {
                    n.is_floor() && !n.is_burning() && n.flags.contains(TileFlags::ENEMY)
                });
                if catches && !spread.contains(&next) {
                    spread.push(next);
                }
            }
        }

        for tile in self.tiles.iter_mut().filter(|t| t.is_burning()) {
            tile.anim -= dt;
            if tile.anim <= 0.0 {
                tile.anim = 0.0;
                tile.flags.remove(TileFlags::FIRE);
            }
        }

        for &pos in &spread {
            self.ignite(pos, spread_burn);
        }
        spread
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_garden_parses() {
        let map = Tilemap::default_garden().unwrap();
        assert_eq!(map.player_start(), IVec2::new(1, 1));
        assert_eq!(map.tile_at(IVec2::new(0, 0)).kind, TileKind::Wall);
        assert_eq!(map.tile_at(IVec2::new(7, 7)).kind, TileKind::None);
        assert!(map.floor_count() > 100);
    }

    #[test]
    fn test_parse_rejects_bad_rows() {
        let err = Tilemap::parse("#P#").unwrap_err();
        assert!(matches!(err, GameError::InvalidMap(_)));
    }

    #[test]
    fn test_parse_requires_player_start() {
        let layout = DEFAULT_GARDEN.replace('P', ".");
        assert!(Tilemap::parse(&layout).is_err());
    }

    #[test]
    fn test_reset_restores_layout() {
        let mut map = Tilemap::default_garden().unwrap();
        let pristine: Vec<Tile> = map.iter().cloned().collect();

        map.tile_at_mut(IVec2::new(2, 1)).flags.insert(TileFlags::VISITED | TileFlags::MOVED);
        map.ignite(IVec2::new(3, 1), 2.0);
        map.tile_at_mut(IVec2::new(5, 5)).flags.insert(TileFlags::ENEMY);
        map.tile_at_mut(IVec2::new(4, 4)).kind = TileKind::Wall;

        map.reset();
        for (tile, original) in map.iter().zip(pristine.iter()) {
            assert_eq!(tile.kind, original.kind);
            assert_eq!(tile.flags, original.flags);
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_tile_at_out_of_range_panics() {
        let map = Tilemap::default_garden().unwrap();
        map.tile_at(IVec2::new(16, 0));
    }

    #[test]
    fn test_get_out_of_range_is_none() {
        let map = Tilemap::default_garden().unwrap();
        assert!(map.get(IVec2::new(-1, 3)).is_none());
        assert!(!map.is_walkable(IVec2::new(0, 0)));
        assert!(map.is_walkable(IVec2::new(1, 1)));
    }

    #[test]
    fn test_fire_burns_out() {
        let mut map = Tilemap::default_garden().unwrap();
        let pos = IVec2::new(2, 1);
        map.ignite(pos, 1.0);
        assert!(map.tile_at(pos).is_burning());
        map.tick_fire(0.6, 1.0);
        assert!(map.tile_at(pos).is_burning());
        map.tick_fire(0.6, 1.0);
        assert!(!map.tile_at(pos).is_burning());
    }

    #[test]
    fn test_fire_does_not_ignite_walls() {
        let mut map = Tilemap::default_garden().unwrap();
        map.ignite(IVec2::new(0, 0), 1.0);
        assert!(!map.tile_at(IVec2::new(0, 0)).is_burning());
    }

    #[test]
    fn test_fire_spreads_one_tile_onto_enemies() {
        let mut map = Tilemap::default_garden().unwrap();
        map.ignite(IVec2::new(1, 5), 3.0);
        map.tile_at_mut(IVec2::new(2, 5)).flags.insert(TileFlags::ENEMY);
        map.tile_at_mut(IVec2::new(3, 5)).flags.insert(TileFlags::ENEMY);

        let spread = map.tick_fire(0.1, 1.0);
        assert_eq!(spread, vec![IVec2::new(2, 5)]);
        assert!(map.tile_at(IVec2::new(2, 5)).is_burning());
        assert!(!map.tile_at(IVec2::new(3, 5)).is_burning());

        let spread = map.tick_fire(0.1, 1.0);
        assert_eq!(spread, vec![IVec2::new(3, 5)]);
    }

    #[test]
    fn test_flags_ops() {
        let mut flags = TileFlags::EMPTY;
        flags.insert(TileFlags::ENEMY | TileFlags::MOVED);
        assert!(flags.contains(TileFlags::ENEMY));
        assert!(flags.intersects(TileFlags::MOVED | TileFlags::FIRE));
        flags.remove(TileFlags::MOVED);
        assert!(!flags.contains(TileFlags::MOVED));
        assert_eq!(flags.bits(), TileFlags::ENEMY.bits());
    }
}
