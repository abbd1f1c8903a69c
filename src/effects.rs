//! Visual effect state: fades, screen shake, text bursts, parallax layers
//!
//! Nothing here draws. Each effect advances on the caller's `dt` and exposes
//! the numbers a renderer needs.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Direction of a fade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FadeKind {
    /// Idle; alpha stays where the last fade left it
    #[default]
    None,
    In,
    Out,
}

/// Alpha interpolated over time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fade {
    pub alpha: f32,
    pub duration: f32,
    pub timer: f32,
    pub kind: FadeKind,
}

impl Default for Fade {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            duration: 0.0,
            timer: 0.0,
            kind: FadeKind::None,
        }
    }
}

impl Fade {
    /// A fade already running
    pub fn started(kind: FadeKind, duration: f32) -> Self {
        let mut fade = Self::default();
        fade.start(kind, duration);
        fade
    }

    pub fn start(&mut self, kind: FadeKind, duration: f32) {
        self.kind = kind;
        self.duration = duration.max(0.0);
        self.timer = 0.0;
        self.alpha = match kind {
            FadeKind::In => 0.0,
            FadeKind::Out => 1.0,
            FadeKind::None => self.alpha,
        };
    }

    pub fn tick(&mut self, dt: f32) {
        if self.kind == FadeKind::None {
            return;
        }
        self.timer += dt;
        let t = if self.duration > 0.0 {
            (self.timer / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.alpha = match self.kind {
            FadeKind::In => t,
            FadeKind::Out => 1.0 - t,
            FadeKind::None => self.alpha,
        };
        if self.timer >= self.duration {
            self.kind = FadeKind::None;
        }
    }

    pub fn is_done(&self) -> bool {
        self.kind == FadeKind::None
    }
}

/// Camera jitter that decays linearly to nothing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenShake {
    pub intensity: f32,
    start_intensity: f32,
    duration: f32,
    elapsed: f32,
}

impl ScreenShake {
    /// Start a shake; a weaker shake never cuts a stronger one short
    pub fn trigger(&mut self, intensity: f32, duration: f32) {
        if intensity < self.intensity {
            return;
        }
        self.intensity = intensity;
        self.start_intensity = intensity;
        self.duration = duration.max(f32::EPSILON);
        self.elapsed = 0.0;
    }

    pub fn is_active(&self) -> bool {
        self.intensity > 0.0
    }

    pub fn stop(&mut self) {
        *self = Self::default();
    }

    /// Advance the decay and return this frame's camera offset
    pub fn tick(&mut self, dt: f32, rng: &mut impl Rng) -> Vec2 {
        if !self.is_active() {
            return Vec2::ZERO;
        }
        self.elapsed += dt;
        let remaining = (1.0 - self.elapsed / self.duration).max(0.0);
        self.intensity = self.start_intensity * remaining;
        if self.intensity <= 0.0 {
            self.stop();
            return Vec2::ZERO;
        }
        let i = self.intensity;
        Vec2::new(rng.random_range(-i..=i), rng.random_range(-i..=i))
    }
}

/// Floating score text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBurst {
    pub text: String,
    pub pos: Vec2,
    pub alpha: f32,
    pub scale: f32,
    pub max_scale: f32,
    pub lifetime: f32,
    pub age: f32,
    /// Velocity in tiles per second
    pub drift: Vec2,
}

impl TextBurst {
    pub fn new(text: impl Into<String>, pos: Vec2, lifetime: f32, max_scale: f32) -> Self {
        Self {
            text: text.into(),
            pos,
            alpha: 1.0,
            scale: 0.0,
            max_scale,
            lifetime,
            age: 0.0,
            drift: Vec2::new(0.0, -1.0),
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.age += dt;
        self.pos += self.drift * dt;
        let t = if self.lifetime > 0.0 {
            (self.age / self.lifetime).clamp(0.0, 1.0)
        } else {
            1.0
        };
        // Pop to full size over the first quarter, fade over the second half
        self.scale = self.max_scale * (t * 4.0).min(1.0);
        self.alpha = if t < 0.5 { 1.0 } else { (1.0 - t) * 2.0 };
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.lifetime
    }
}

/// Number of parallax background layers
pub const BACKGROUND_LAYERS: usize = 3;

/// Horizontally scrolling background layers, far to near
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub offsets: [Vec2; BACKGROUND_LAYERS],
    pub speeds: [f32; BACKGROUND_LAYERS],
    /// Scroll period in tiles; offsets wrap back into `[0, wrap)`
    pub wrap: f32,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            offsets: [Vec2::ZERO; BACKGROUND_LAYERS],
            speeds: [0.25, 0.5, 1.0],
            wrap: crate::consts::MAP_WIDTH as f32,
        }
    }
}

impl Background {
    pub fn tick(&mut self, dt: f32) {
        for (offset, speed) in self.offsets.iter_mut().zip(self.speeds) {
            offset.x = (offset.x + speed * dt).rem_euclid(self.wrap);
        }
    }

    /// Put every layer back at its starting position
    pub fn reposition(&mut self) {
        self.offsets = [Vec2::ZERO; BACKGROUND_LAYERS];
    }
}
