//! Scripted event sequences
//!
//! A sequence is a short script of waits, overlay fades and mode changes.
//! Each named sequence owns a queue that steps through its events once per
//! frame; only one queue runs at a time.

use serde::{Deserialize, Serialize};

use crate::arena::Arena;
use crate::consts::MAX_EVENTS;
use crate::effects::{Fade, FadeKind};
use crate::error::{GameError, GameResult};
use crate::state::GameMode;

/// Overlay an event fade drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadeTarget {
    /// Whole-scene visibility (0 = black)
    Screen,
    /// Story / instruction text layer
    Caption,
}

/// Alpha of each fadeable overlay, read by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Overlays {
    pub screen: f32,
    pub caption: f32,
}

impl Default for Overlays {
    fn default() -> Self {
        Self {
            screen: 1.0,
            caption: 0.0,
        }
    }
}

impl Overlays {
    pub fn get(&self, target: FadeTarget) -> f32 {
        match target {
            FadeTarget::Screen => self.screen,
            FadeTarget::Caption => self.caption,
        }
    }

    pub fn set(&mut self, target: FadeTarget, alpha: f32) {
        match target {
            FadeTarget::Screen => self.screen = alpha,
            FadeTarget::Caption => self.caption = alpha,
        }
    }
}

/// One scripted step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Wait { duration: f32 },
    FadeOut { target: FadeTarget, duration: f32 },
    FadeIn { target: FadeTarget, duration: f32 },
    /// Zero-duration switch of the game mode
    StateChange(GameMode),
}

/// Named scripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sequence {
    Win,
    Tutorial,
    Begin,
    Epilogue,
}

impl Sequence {
    pub const ALL: [Sequence; 4] = [
        Sequence::Win,
        Sequence::Tutorial,
        Sequence::Begin,
        Sequence::Epilogue,
    ];

    fn slot(self) -> usize {
        match self {
            Sequence::Win => 0,
            Sequence::Tutorial => 1,
            Sequence::Begin => 2,
            Sequence::Epilogue => 3,
        }
    }

    /// Sequence that plays when `mode` is entered
    pub fn for_mode(mode: GameMode) -> Option<Sequence> {
        match mode {
            GameMode::Win => Some(Sequence::Win),
            GameMode::Tutorial => Some(Sequence::Tutorial),
            _ => None,
        }
    }

    /// Built-in script for this sequence
    pub fn script(self) -> Vec<Event> {
        use Event::*;
        use FadeTarget::*;
        match self {
            Sequence::Begin => vec![
                FadeOut {
                    target: Screen,
                    duration: 0.5,
                },
                StateChange(GameMode::Tutorial),
                FadeIn {
                    target: Screen,
                    duration: 0.5,
                },
            ],
            Sequence::Tutorial => vec![
                FadeIn {
                    target: Caption,
                    duration: 0.5,
                },
                Wait { duration: 2.5 },
                FadeOut {
                    target: Caption,
                    duration: 0.5,
                },
                StateChange(GameMode::Play),
            ],
            Sequence::Win => vec![
                Wait { duration: 1.5 },
                FadeOut {
                    target: Screen,
                    duration: 1.0,
                },
                StateChange(GameMode::WinText),
                FadeIn {
                    target: Screen,
                    duration: 1.0,
                },
            ],
            Sequence::Epilogue => vec![
                FadeOut {
                    target: Screen,
                    duration: 1.0,
                },
                StateChange(GameMode::Epilogue),
                FadeIn {
                    target: Screen,
                    duration: 1.0,
                },
                FadeIn {
                    target: Caption,
                    duration: 0.5,
                },
                Wait { duration: 4.0 },
                FadeOut {
                    target: Screen,
                    duration: 1.0,
                },
                FadeOut {
                    target: Caption,
                    duration: 0.0,
                },
                StateChange(GameMode::Title),
                FadeIn {
                    target: Screen,
                    duration: 1.0,
                },
            ],
        }
    }
}

/// Player for a single script
#[derive(Debug, Clone)]
pub struct EventQueue {
    events: Vec<Event>,
    original: Vec<Event>,
    index: usize,
    timer: f32,
    active: bool,
    fade: Fade,
    fade_started: bool,
}

impl EventQueue {
    pub fn new(events: &[Event]) -> GameResult<Self> {
        if events.len() > MAX_EVENTS {
            return Err(GameError::SequenceTooLong {
                len: events.len(),
                capacity: MAX_EVENTS,
            });
        }
        Ok(Self {
            events: events.to_vec(),
            original: events.to_vec(),
            index: 0,
            timer: 0.0,
            active: false,
            fade: Fade::default(),
            fade_started: false,
        })
    }

    pub fn start(&mut self) {
        self.index = 0;
        self.timer = 0.0;
        self.fade_started = false;
        self.active = !self.events.is_empty();
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Stop and restore the script as originally authored
    pub fn reset(&mut self) {
        self.events.clone_from(&self.original);
        self.index = 0;
        self.timer = 0.0;
        self.fade = Fade::default();
        self.fade_started = false;
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn count(&self) -> usize {
        self.events.len()
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    pub fn current(&self) -> Option<&Event> {
        self.active.then(|| self.events.get(self.index)).flatten()
    }

    /// Live script; edits last until [`EventQueue::reset`]
    pub fn events_mut(&mut self) -> &mut [Event] {
        &mut self.events
    }

    fn advance(&mut self) {
        self.timer = 0.0;
        self.fade_started = false;
        self.index += 1;
        if self.index >= self.events.len() {
            self.active = false;
        }
    }

    /// Run the script forward by `dt`.
    ///
    /// Finished steps roll straight into the next one within the same call.
    /// Returns the mode requested by a `StateChange`; at most one per call.
    pub fn tick(&mut self, dt: f32, overlays: &mut Overlays) -> Option<GameMode> {
        let mut dt = dt;
        while self.active {
            let Some(event) = self.events.get(self.index).copied() else {
                self.active = false;
                break;
            };
            let done = match event {
                Event::Wait { duration } => {
                    self.timer += dt;
                    self.timer >= duration
                }
                Event::FadeOut { target, duration } => {
                    self.step_fade(FadeKind::Out, target, duration, dt, overlays)
                }
                Event::FadeIn { target, duration } => {
                    self.step_fade(FadeKind::In, target, duration, dt, overlays)
                }
                Event::StateChange(mode) => {
                    self.advance();
                    return Some(mode);
                }
            };
            if !done {
                break;
            }
            self.advance();
            dt = 0.0;
        }
        None
    }

    fn step_fade(
        &mut self,
        kind: FadeKind,
        target: FadeTarget,
        duration: f32,
        dt: f32,
        overlays: &mut Overlays,
    ) -> bool {
        if !self.fade_started {
            self.fade.start(kind, duration);
            self.fade_started = true;
        }
        self.timer += dt;
        self.fade.tick(dt);
        overlays.set(target, self.fade.alpha);
        self.fade.is_done()
    }
}

/// All named queues; at most one is active
#[derive(Debug, Clone)]
pub struct EventManager {
    queues: Vec<EventQueue>,
    active: Option<Sequence>,
    queued: Option<Sequence>,
}

impl EventManager {
    /// Build the manager with the built-in scripts
    pub fn new() -> GameResult<Self> {
        let queues = Sequence::ALL
            .iter()
            .map(|seq| EventQueue::new(&seq.script()))
            .collect::<GameResult<Vec<_>>>()?;
        Ok(Self {
            queues,
            active: None,
            queued: None,
        })
    }

    /// Build the manager with event storage charged to `arena`
    pub fn with_arena(arena: &mut Arena) -> GameResult<Self> {
        // Live and original copy per sequence
        arena.try_alloc_array::<Event>(MAX_EVENTS * Sequence::ALL.len() * 2)?;
        Self::new()
    }

    pub fn queue(&self, seq: Sequence) -> &EventQueue {
        &self.queues[seq.slot()]
    }

    pub fn queue_mut(&mut self, seq: Sequence) -> &mut EventQueue {
        &mut self.queues[seq.slot()]
    }

    pub fn active(&self) -> Option<Sequence> {
        self.active
    }

    pub fn is_running(&self, seq: Sequence) -> bool {
        self.active == Some(seq)
    }

    /// Start `seq`, stopping whichever sequence was running
    pub fn start(&mut self, seq: Sequence) {
        if let Some(current) = self.active.take() {
            if current != seq {
                log::debug!("Sequence {:?} interrupted by {:?}", current, seq);
            }
            self.queue_mut(current).stop();
        }
        self.queued = None;
        self.queue_mut(seq).start();
        if self.queue(seq).is_active() {
            log::info!("Sequence {:?} started", seq);
            self.active = Some(seq);
        }
    }

    /// Start the sequence tied to `mode`, once the running one has finished
    pub fn on_enter(&mut self, mode: GameMode) {
        let Some(seq) = Sequence::for_mode(mode) else {
            return;
        };
        if self.active.is_some() {
            self.queued = Some(seq);
        } else {
            self.start(seq);
        }
    }

    pub fn stop(&mut self, seq: Sequence) {
        self.queue_mut(seq).stop();
        if self.active == Some(seq) {
            self.active = None;
        }
        if self.queued == Some(seq) {
            self.queued = None;
        }
    }

    pub fn stop_all(&mut self) {
        for queue in &mut self.queues {
            queue.stop();
        }
        self.active = None;
        self.queued = None;
    }

    /// Restore `seq` from its original script, stopping it if running
    pub fn reset(&mut self, seq: Sequence) {
        self.stop(seq);
        self.queue_mut(seq).reset();
    }

    pub fn reset_all(&mut self) {
        for seq in Sequence::ALL {
            self.reset(seq);
        }
    }

    /// Tick the active sequence; returns a requested mode change
    pub fn tick(&mut self, dt: f32, overlays: &mut Overlays) -> Option<GameMode> {
        let seq = self.active?;
        let change = self.queue_mut(seq).tick(dt, overlays);
        if !self.queue(seq).is_active() {
            log::info!("Sequence {:?} finished", seq);
            self.active = None;
            if let Some(next) = self.queued.take() {
                self.start(next);
            }
        }
        change
    }
}
