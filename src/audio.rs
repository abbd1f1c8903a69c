//! Audio intents
//!
//! The game never touches an audio API. It queues fire-and-forget intents
//! that the host drains after each frame and hands to its audio backend.

use serde::{Deserialize, Serialize};

/// Number of recorded hype quotes
pub const HYPE_QUOTE_COUNT: u8 = 6;

/// Maximum intents held between drains
pub const MAX_PENDING_INTENTS: usize = 64;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Player steps onto a fresh tile
    Step,
    /// Powerup collected
    Pickup,
    /// Enemy burned up
    EnemyBurn,
    /// Player starts leaving a fire trail
    Ignite,
    /// Player caught by an enemy
    Lose,
    /// Garden cleared
    Win,
    /// Title screen confirmed
    Begin,
    /// Announcer quote, by index
    Hype(u8),
}

/// Looping music channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MusicSlot {
    Title,
    Game,
    Ending,
}

impl MusicSlot {
    pub const ALL: [MusicSlot; 3] = [MusicSlot::Title, MusicSlot::Game, MusicSlot::Ending];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeChannel {
    Master,
    Sfx,
    Music,
}

/// One request for the audio backend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AudioIntent {
    PlaySfx(SoundEffect),
    PlayMusic { slot: MusicSlot, looped: bool },
    StopMusic(MusicSlot),
    SetVolume { channel: VolumeChannel, volume: f32 },
}

/// Pending intents plus the mixer levels they were issued under
#[derive(Debug, Clone)]
pub struct AudioQueue {
    pending: Vec<AudioIntent>,
    playing: Option<MusicSlot>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
}

impl Default for AudioQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioQueue {
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(MAX_PENDING_INTENTS),
            playing: None,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
        }
    }

    fn push(&mut self, intent: AudioIntent) {
        if self.pending.len() >= MAX_PENDING_INTENTS {
            log::trace!("Audio queue full, dropped {:?}", intent);
            return;
        }
        self.pending.push(intent);
    }

    /// Queue a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        if self.muted {
            return;
        }
        self.push(AudioIntent::PlaySfx(effect));
    }

    /// Switch the looping music track, stopping whatever was playing
    pub fn play_music(&mut self, slot: MusicSlot) {
        if self.playing == Some(slot) {
            return;
        }
        if let Some(current) = self.playing.take() {
            self.push(AudioIntent::StopMusic(current));
        }
        self.push(AudioIntent::PlayMusic { slot, looped: true });
        self.playing = Some(slot);
    }

    pub fn stop_music(&mut self) {
        if let Some(current) = self.playing.take() {
            self.push(AudioIntent::StopMusic(current));
        }
    }

    pub fn playing(&self) -> Option<MusicSlot> {
        self.playing
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
        self.push_volume(VolumeChannel::Master);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
        self.push_volume(VolumeChannel::Sfx);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
        self.push_volume(VolumeChannel::Music);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.push_volume(VolumeChannel::Master);
    }

    fn push_volume(&mut self, channel: VolumeChannel) {
        let volume = self.effective_volume(channel);
        self.push(AudioIntent::SetVolume { channel, volume });
    }

    /// Level the backend should apply to `channel`
    pub fn effective_volume(&self, channel: VolumeChannel) -> f32 {
        if self.muted {
            return 0.0;
        }
        match channel {
            VolumeChannel::Master => self.master_volume,
            VolumeChannel::Sfx => self.sfx_volume,
            VolumeChannel::Music => self.music_volume,
        }
    }

    pub fn pending(&self) -> &[AudioIntent] {
        &self.pending
    }

    /// Hand every queued intent to the caller
    pub fn drain(&mut self) -> Vec<AudioIntent> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_music_switch_stops_previous() {
        let mut audio = AudioQueue::new();
        audio.play_music(MusicSlot::Title);
        audio.play_music(MusicSlot::Game);
        assert_eq!(
            audio.drain(),
            vec![
                AudioIntent::PlayMusic {
                    slot: MusicSlot::Title,
                    looped: true
                },
                AudioIntent::StopMusic(MusicSlot::Title),
                AudioIntent::PlayMusic {
                    slot: MusicSlot::Game,
                    looped: true
                },
            ]
        );
        assert!(audio.pending().is_empty());
    }

    #[test]
    fn test_same_track_is_not_restarted() {
        let mut audio = AudioQueue::new();
        audio.play_music(MusicSlot::Game);
        audio.drain();
        audio.play_music(MusicSlot::Game);
        assert!(audio.pending().is_empty());
    }

    #[test]
    fn test_muted_suppresses_sfx() {
        let mut audio = AudioQueue::new();
        audio.set_muted(true);
        audio.play(SoundEffect::Step);
        assert_eq!(
            audio.drain(),
            vec![AudioIntent::SetVolume {
                channel: VolumeChannel::Master,
                volume: 0.0
            }]
        );
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut audio = AudioQueue::new();
        audio.set_sfx_volume(3.0);
        assert_eq!(audio.effective_volume(VolumeChannel::Sfx), 1.0);
    }

    #[test]
    fn test_queue_saturates() {
        let mut audio = AudioQueue::new();
        for _ in 0..MAX_PENDING_INTENTS + 10 {
            audio.play(SoundEffect::Step);
        }
        assert_eq!(audio.drain().len(), MAX_PENDING_INTENTS);
    }
}
