//! Per-frame game update
//!
//! `GameManager` owns every subsystem. The host calls [`GameManager::update`]
//! once per frame, then draws from [`GameManager::snapshot`] and plays the
//! intents returned by [`GameManager::drain_audio`].

use glam::{IVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entities::{Enemy, Player, Powerup, PowerupKind, chase_step};
use crate::arena::Arena;
use crate::audio::{AudioIntent, AudioQueue, HYPE_QUOTE_COUNT, SoundEffect};
use crate::consts::*;
use crate::effects::{Background, Fade, FadeKind, ScreenShake, TextBurst};
use crate::error::GameResult;
use crate::events::{EventManager, Overlays, Sequence};
use crate::input::{Direction, InputBuffer};
use crate::list::{EntityHandle, EntityList};
use crate::pool::{SlotId, SlotPool};
use crate::settings::{Settings, Tuning};
use crate::state::GameMode;
use crate::tilemap::{TileFlags, Tilemap};

/// Score for stepping on a fresh tile
pub const VISIT_SCORE: u64 = 10;
/// Score for burning an enemy
pub const BURN_SCORE: u64 = 100;
/// Score for collecting a powerup
pub const PICKUP_SCORE: u64 = 50;

/// Per-frame values that are consumed immediately rather than stored
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameOutput {
    /// Screen shake offset for the camera, in tiles
    pub camera_offset: Vec2,
}

/// Read-only view of everything a renderer draws
#[derive(Debug, Clone, Copy)]
pub struct FrameSnapshot<'a> {
    pub mode: GameMode,
    pub score: u64,
    pub multiplier: u32,
    pub tilemap: &'a Tilemap,
    pub player: &'a Player,
    pub enemies: &'a EntityList<Enemy>,
    pub powerups: &'a EntityList<Powerup>,
    pub bursts: &'a SlotPool<TextBurst>,
    pub fadeables: &'a SlotPool<Fade>,
    pub overlays: Overlays,
    /// White flash over the win screen
    pub win_flash: f32,
    pub background: &'a Background,
}

pub struct GameManager {
    tuning: Tuning,
    settings: Settings,
    arena: Arena,
    rng: Pcg32,
    mode: GameMode,
    tilemap: Tilemap,
    input: InputBuffer,
    player: Player,
    enemies: EntityList<Enemy>,
    powerups: EntityList<Powerup>,
    bursts: SlotPool<TextBurst>,
    fadeables: SlotPool<Fade>,
    events: EventManager,
    overlays: Overlays,
    win_flash: Fade,
    shake: ScreenShake,
    background: Background,
    audio: AudioQueue,
    score: u64,
    multiplier: u32,
    enemy_spawn_timer: f32,
    powerup_spawn_timer: f32,
    hype_timer: f32,
    hype_prev_index: Option<u8>,
}

impl GameManager {
    /// Build a game on the built-in garden
    pub fn new(tuning: Tuning, settings: Settings, seed: u64) -> GameResult<Self> {
        Self::with_map(Tilemap::default_garden()?, tuning, settings, seed)
    }

    /// Build a game on a custom map. Fails if the arena is too small for the
    /// configured capacities.
    pub fn with_map(
        tilemap: Tilemap,
        tuning: Tuning,
        settings: Settings,
        seed: u64,
    ) -> GameResult<Self> {
        let mut arena = Arena::new(ARENA_BYTES);
        let input = InputBuffer::with_arena(&mut arena)?;
        let enemies = EntityList::with_arena(&mut arena, tuning.max_enemies)?;
        let powerups = EntityList::with_arena(&mut arena, tuning.max_powerups)?;
        let bursts = SlotPool::with_arena(&mut arena, MAX_TEXT_BURSTS)?;
        let fadeables = SlotPool::with_arena(&mut arena, MAX_FADEABLES)?;
        let events = EventManager::with_arena(&mut arena)?;
        log::debug!(
            "Arena: {} of {} bytes reserved",
            arena.used(),
            arena.capacity()
        );

        let player = Player::new(tilemap.player_start());
        let mut game = Self {
            tuning,
            settings: settings.clone(),
            arena,
            rng: Pcg32::seed_from_u64(seed),
            mode: GameMode::Title,
            tilemap,
            input,
            player,
            enemies,
            powerups,
            bursts,
            fadeables,
            events,
            overlays: Overlays::default(),
            win_flash: Fade::default(),
            shake: ScreenShake::default(),
            background: Background::default(),
            audio: AudioQueue::new(),
            score: 0,
            multiplier: 1,
            enemy_spawn_timer: 0.0,
            powerup_spawn_timer: 0.0,
            hype_timer: 0.0,
            hype_prev_index: None,
        };
        game.apply_settings(settings);
        game.enter_mode(GameMode::Title);
        log::info!("Game created with seed {}", seed);
        Ok(game)
    }

    // === Accessors ===

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn tilemap(&self) -> &Tilemap {
        &self.tilemap
    }

    pub fn enemies(&self) -> &EntityList<Enemy> {
        &self.enemies
    }

    pub fn powerups(&self) -> &EntityList<Powerup> {
        &self.powerups
    }

    pub fn bursts(&self) -> &SlotPool<TextBurst> {
        &self.bursts
    }

    pub fn overlays(&self) -> Overlays {
        self.overlays
    }

    pub fn win_flash(&self) -> &Fade {
        &self.win_flash
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn events(&self) -> &EventManager {
        &self.events
    }

    pub fn pending_input(&self) -> usize {
        self.input.len()
    }

    /// Alpha of a tracked fadeable; fully opaque once finished or released
    pub fn fade_alpha(&self, id: SlotId) -> f32 {
        self.fadeables.get(id).map_or(1.0, |f| f.alpha)
    }

    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        FrameSnapshot {
            mode: self.mode,
            score: self.score,
            multiplier: self.multiplier,
            tilemap: &self.tilemap,
            player: &self.player,
            enemies: &self.enemies,
            powerups: &self.powerups,
            bursts: &self.bursts,
            fadeables: &self.fadeables,
            overlays: self.overlays,
            win_flash: self.win_flash.alpha,
            background: &self.background,
        }
    }

    /// Take every audio intent queued since the last drain
    pub fn drain_audio(&mut self) -> Vec<AudioIntent> {
        self.audio.drain()
    }

    /// Adopt new preferences and push the matching volume levels
    pub fn apply_settings(&mut self, settings: Settings) {
        self.audio.set_master_volume(settings.master_volume);
        self.audio.set_sfx_volume(settings.sfx_volume);
        self.audio.set_music_volume(settings.music_volume);
        self.audio.set_muted(settings.muted);
        if !settings.effective_screen_shake() {
            self.shake.stop();
        }
        self.settings = settings;
    }

    // === Frame update ===

    /// Advance the game by `dt` seconds with this frame's input sample
    pub fn update(&mut self, dt: f32, input: Option<Direction>) -> FrameOutput {
        if let Some(dir) = input {
            self.input.push(dir);
        }

        if self.mode.accepts_movement() {
            self.update_play(dt);
        } else if self.mode.waits_for_input() {
            self.update_waiting();
        } else {
            self.input.clear();
        }

        if let Some(mode) = self.events.tick(dt, &mut self.overlays) {
            self.set_mode(mode);
        }

        if self.mode.simulates() {
            self.tick_spawners(dt);
        }

        for (_, burst) in self.bursts.iter_mut() {
            burst.tick(dt);
        }
        self.bursts.retain(|b| !b.is_expired());

        for (_, fade) in self.fadeables.iter_mut() {
            fade.tick(dt);
        }
        self.fadeables.retain(|f| !f.is_done());
        self.win_flash.tick(dt);

        let camera_offset = self.shake.tick(dt, &mut self.rng);
        self.background.tick(dt);

        if self.mode == GameMode::Play {
            self.tick_hype(dt);
        }

        FrameOutput { camera_offset }
    }

    /// Modes that only wait for a key press
    fn update_waiting(&mut self) {
        let pressed = self.input.pop().is_some();
        self.input.clear();
        if !pressed || self.events.active().is_some() {
            return;
        }
        match self.mode {
            GameMode::Title => {
                self.audio.play(SoundEffect::Begin);
                self.events.start(Sequence::Begin);
            }
            GameMode::WinText => self.events.start(Sequence::Epilogue),
            GameMode::Lose => self.restart(),
            _ => {}
        }
    }

    fn update_play(&mut self, dt: f32) {
        self.player.fire_timer = (self.player.fire_timer - dt).max(0.0);

        if self.player.moving {
            self.player.move_timer += dt;
            if self.player.move_timer >= self.tuning.player_move_duration {
                self.player.moving = false;
                self.player.move_timer = 0.0;
            }
        }
        if !self.player.moving {
            if let Some(dir) = self.input.pop() {
                self.try_move_player(dir);
            }
        }
        if self.mode != GameMode::Play {
            return;
        }

        self.move_enemies(dt);

        let spread = self
            .tilemap
            .tick_fire(dt, self.tuning.fire_spread_duration);
        if !spread.is_empty() {
            log::trace!("Fire spread to {} tiles", spread.len());
        }
        self.burn_enemies();
        self.age_powerups(dt);

        if self.enemies.iter().any(|(_, e)| e.tile == self.player.tile) {
            self.set_mode(GameMode::Lose);
        }
    }

    fn try_move_player(&mut self, dir: Direction) {
        self.player.facing = dir;
        let target = self.player.tile + dir.offset();
        if !self.tilemap.is_walkable(target) {
            return;
        }

        let leaving = self.player.tile;
        if self.player.has_fire() {
            self.tilemap.ignite(leaving, self.tuning.fire_burn_duration);
        }
        self.player.from = leaving;
        self.player.tile = target;
        self.player.moving = true;
        self.player.move_timer = 0.0;
        self.enter_tile(target);
    }

    fn enter_tile(&mut self, pos: IVec2) {
        let flags = self.tilemap.tile_at(pos).flags;
        if flags.contains(TileFlags::ENEMY) {
            self.set_mode(GameMode::Lose);
            return;
        }

        if !flags.contains(TileFlags::VISITED) {
            self.tilemap.tile_at_mut(pos).flags.insert(TileFlags::VISITED);
            let points = VISIT_SCORE * u64::from(self.multiplier);
            self.score += points;
            self.spawn_burst(format!("+{points}"), pos);
            self.audio.play(SoundEffect::Step);
        }

        if flags.contains(TileFlags::POWERUP) {
            self.collect_powerup(pos);
        }

        if self.tilemap.all_visited() {
            log::info!("Garden cleared with score {}", self.score);
            self.set_mode(GameMode::Win);
        }
    }

    /// Step every enemy whose timer has elapsed, in list order.
    ///
    /// Destinations are marked `MOVED` as they are claimed, so when two
    /// enemies want the same tile the one earlier in the list (the newer
    /// spawn) gets it.
    fn move_enemies(&mut self, dt: f32) {
        self.tilemap.clear_flag_all(TileFlags::MOVED);
        let target = self.player.tile;
        let step_time = self.tuning.enemy_move_duration;

        let mut cursor = self.enemies.first();
        while let Some(handle) = cursor {
            cursor = self.enemies.next(handle);
            let Some(enemy) = self.enemies.get_mut(handle) else {
                continue;
            };
            enemy.move_timer += dt;
            if enemy.move_timer < step_time {
                continue;
            }
            enemy.move_timer -= step_time;

            let from = enemy.tile;
            let Some(to) = chase_step(from, target, &self.tilemap) else {
                continue;
            };
            enemy.from = from;
            enemy.tile = to;
            self.tilemap.tile_at_mut(from).flags.remove(TileFlags::ENEMY);
            self.tilemap
                .tile_at_mut(to)
                .flags
                .insert(TileFlags::ENEMY | TileFlags::MOVED);
        }
    }

    fn burn_enemies(&mut self) {
        let mut cursor = self.enemies.first();
        while let Some(handle) = cursor {
            cursor = self.enemies.next(handle);
            let burning = self
                .enemies
                .get(handle)
                .is_some_and(|e| self.tilemap.tile_at(e.tile).is_burning());
            if burning {
                self.kill_enemy(handle);
            }
        }
    }

    fn kill_enemy(&mut self, handle: EntityHandle) {
        let Some(enemy) = self.enemies.remove(handle) else {
            return;
        };
        self.tilemap
            .tile_at_mut(enemy.tile)
            .flags
            .remove(TileFlags::ENEMY);
        if let Some(fade) = enemy.fade {
            self.fadeables.release(fade);
        }

        let points = BURN_SCORE * u64::from(self.multiplier);
        self.score += points;
        self.spawn_burst(format!("+{points}"), enemy.tile);
        self.trigger_shake();
        self.audio.play(SoundEffect::EnemyBurn);
        log::debug!("Enemy burned at ({}, {})", enemy.tile.x, enemy.tile.y);
    }

    fn age_powerups(&mut self, dt: f32) {
        let lifetime = self.tuning.powerup_lifetime;
        let mut cursor = self.powerups.first();
        while let Some(handle) = cursor {
            cursor = self.powerups.next(handle);
            let expired = self.powerups.get_mut(handle).is_some_and(|p| {
                p.age += dt;
                p.age >= lifetime
            });
            if expired {
                self.remove_powerup(handle);
            }
        }
    }

    fn remove_powerup(&mut self, handle: EntityHandle) -> Option<Powerup> {
        let powerup = self.powerups.remove(handle)?;
        self.tilemap
            .tile_at_mut(powerup.tile)
            .flags
            .remove(TileFlags::POWERUP);
        if let Some(fade) = powerup.fade {
            self.fadeables.release(fade);
        }
        Some(powerup)
    }

    fn collect_powerup(&mut self, pos: IVec2) {
        let Some(handle) = self
            .powerups
            .iter()
            .find(|(_, p)| p.tile == pos)
            .map(|(h, _)| h)
        else {
            return;
        };
        let Some(powerup) = self.remove_powerup(handle) else {
            return;
        };

        self.score += PICKUP_SCORE * u64::from(self.multiplier);
        self.audio.play(SoundEffect::Pickup);
        match powerup.kind {
            PowerupKind::Fire => {
                self.player.fire_timer = self.tuning.fire_power_duration;
                self.audio.play(SoundEffect::Ignite);
                self.spawn_burst("FIRE!", pos);
            }
            PowerupKind::Bonus => {
                self.multiplier = (self.multiplier + 1).min(self.tuning.max_multiplier);
                self.spawn_burst(format!("x{}", self.multiplier), pos);
            }
        }
        log::debug!("Collected {:?} powerup", powerup.kind);
    }

    // === Spawning ===

    fn tick_spawners(&mut self, dt: f32) {
        self.enemy_spawn_timer += dt;
        if self.enemy_spawn_timer >= self.tuning.enemy_spawn_interval {
            self.enemy_spawn_timer -= self.tuning.enemy_spawn_interval;
            if let Some(pos) = self.pick_spawn_tile() {
                self.spawn_enemy_at(pos);
            }
        }

        self.powerup_spawn_timer += dt;
        if self.powerup_spawn_timer >= self.tuning.powerup_spawn_interval {
            self.powerup_spawn_timer -= self.tuning.powerup_spawn_interval;
            if let Some(pos) = self.pick_spawn_tile() {
                let kind = if self.rng.random_bool(0.5) {
                    PowerupKind::Fire
                } else {
                    PowerupKind::Bonus
                };
                self.spawn_powerup_at(pos, kind);
            }
        }
    }

    /// Uniformly random free floor tile away from the player
    fn pick_spawn_tile(&mut self) -> Option<IVec2> {
        let occupied = TileFlags::ENEMY | TileFlags::POWERUP | TileFlags::FIRE;
        for _ in 0..self.tuning.spawn_retries {
            let pos = IVec2::new(
                self.rng.random_range(0..MAP_WIDTH as i32),
                self.rng.random_range(0..MAP_HEIGHT as i32),
            );
            let tile = self.tilemap.tile_at(pos);
            let near_player = (pos - self.player.tile).abs().element_sum() <= 1;
            if tile.is_floor() && !tile.flags.intersects(occupied) && !near_player {
                return Some(pos);
            }
        }
        log::trace!(
            "No spawn tile found after {} tries",
            self.tuning.spawn_retries
        );
        None
    }

    fn is_free_floor(&self, pos: IVec2) -> bool {
        let occupied = TileFlags::ENEMY | TileFlags::POWERUP;
        self.tilemap
            .get(pos)
            .is_some_and(|t| t.is_floor() && !t.flags.intersects(occupied))
    }

    /// Place an enemy on a free floor tile. `None` if the tile is taken or
    /// the enemy list is full.
    pub fn spawn_enemy_at(&mut self, pos: IVec2) -> Option<EntityHandle> {
        if !self.is_free_floor(pos) || self.enemies.is_full() {
            return None;
        }
        let fade = self.fadeables.acquire(Fade::started(
            FadeKind::In,
            self.tuning.spawn_fade_duration,
        ));
        let handle = self.enemies.insert(Enemy::new(pos, fade))?;
        self.tilemap.tile_at_mut(pos).flags.insert(TileFlags::ENEMY);
        log::debug!("Enemy spawned at ({}, {})", pos.x, pos.y);
        Some(handle)
    }

    /// Place a powerup on a free floor tile
    pub fn spawn_powerup_at(&mut self, pos: IVec2, kind: PowerupKind) -> Option<EntityHandle> {
        if !self.is_free_floor(pos) || self.powerups.is_full() {
            return None;
        }
        let fade = self.fadeables.acquire(Fade::started(
            FadeKind::In,
            self.tuning.spawn_fade_duration,
        ));
        let handle = self.powerups.insert(Powerup {
            tile: pos,
            kind,
            age: 0.0,
            fade,
        })?;
        self.tilemap.tile_at_mut(pos).flags.insert(TileFlags::POWERUP);
        log::debug!("{:?} powerup spawned at ({}, {})", kind, pos.x, pos.y);
        Some(handle)
    }

    // === Effects ===

    fn spawn_burst(&mut self, text: impl Into<String>, tile: IVec2) {
        if !self.settings.text_bursts {
            return;
        }
        let pos = tile.as_vec2() + Vec2::splat(0.5);
        self.bursts.acquire(TextBurst::new(
            text,
            pos,
            self.tuning.burst_lifetime,
            self.tuning.burst_scale,
        ));
    }

    fn trigger_shake(&mut self) {
        if self.settings.effective_screen_shake() {
            self.shake
                .trigger(self.tuning.shake_intensity, self.tuning.shake_duration);
        }
    }

    fn tick_hype(&mut self, dt: f32) {
        self.hype_timer += dt;
        if self.hype_timer < self.tuning.hype_interval {
            return;
        }
        self.hype_timer -= self.tuning.hype_interval;
        let index = self.next_hype_index();
        self.hype_prev_index = Some(index);
        self.audio.play(SoundEffect::Hype(index));
    }

    /// Random quote index that never repeats the previous one
    fn next_hype_index(&mut self) -> u8 {
        match self.hype_prev_index {
            Some(prev) if HYPE_QUOTE_COUNT > 1 => {
                let pick = self.rng.random_range(0..HYPE_QUOTE_COUNT - 1);
                if pick >= prev { pick + 1 } else { pick }
            }
            _ => self.rng.random_range(0..HYPE_QUOTE_COUNT),
        }
    }

    // === Mode transitions ===

    /// Switch modes, running the exit hook of the old mode and the enter
    /// hook of the new one. Re-entering the current mode is a no-op.
    pub fn set_mode(&mut self, mode: GameMode) {
        if mode == self.mode {
            return;
        }
        let prev = self.mode;
        self.exit_mode(prev);
        self.mode = mode;
        log::info!("Mode {:?} -> {:?}", prev, mode);
        self.enter_mode(mode);
        self.events.on_enter(mode);
    }

    fn exit_mode(&mut self, mode: GameMode) {
        if mode == GameMode::Play {
            self.input.clear();
            self.player.moving = false;
            self.player.move_timer = 0.0;
            self.player.fire_timer = 0.0;
        }
    }

    fn enter_mode(&mut self, mode: GameMode) {
        match mode {
            GameMode::Title => {
                self.score = 0;
                self.multiplier = 1;
                self.reset_level();
                self.background.reposition();
            }
            GameMode::Tutorial => self.reset_level(),
            GameMode::Play => {
                self.input.clear();
                self.enemy_spawn_timer = 0.0;
                self.powerup_spawn_timer = 0.0;
                self.hype_timer = 0.0;
            }
            GameMode::Lose => {
                self.audio.play(SoundEffect::Lose);
                self.trigger_shake();
            }
            GameMode::Win => {
                self.audio.play(SoundEffect::Win);
                self.win_flash.start(FadeKind::Out, self.tuning.win_flash_duration);
            }
            GameMode::WinText | GameMode::Epilogue => {}
        }

        match mode.music() {
            Some(slot) => self.audio.play_music(slot),
            None => self.audio.stop_music(),
        }
    }

    /// Put the level back to its starting layout without touching the score
    fn reset_level(&mut self) {
        self.tilemap.reset();
        self.enemies.clear();
        self.powerups.clear();
        self.fadeables.clear();
        self.bursts.clear();
        self.input.clear();
        self.player = Player::new(self.tilemap.player_start());
        let start = self.player.tile;
        self.tilemap
            .tile_at_mut(start)
            .flags
            .insert(TileFlags::VISITED);
        self.enemy_spawn_timer = 0.0;
        self.powerup_spawn_timer = 0.0;
        self.hype_timer = 0.0;
        self.hype_prev_index = None;
    }

    /// Start a fresh attempt straight into play
    pub fn restart(&mut self) {
        // An interrupted sequence leaves its overlays wherever its fade stopped
        self.events.stop_all();
        self.overlays = Overlays::default();
        self.score = 0;
        self.multiplier = 1;
        self.reset_level();
        if self.mode == GameMode::Play {
            self.enter_mode(GameMode::Play);
        } else {
            self.set_mode(GameMode::Play);
        }
    }
}
