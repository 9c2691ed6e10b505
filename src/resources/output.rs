//! Platform audio output collaborator.
//!
//! [`AudioOutput`] is the device side of playback: it renders clips on
//! numbered channels and reports whether a channel is still sounding. The
//! channel pool decides *which* channel plays *what*; the output only does
//! what it is told.
//!
//! [`SimulatedOutput`] is a silent mixer for headless runs. It tracks each
//! channel's play position against the clip length and stops non-looping
//! channels when their clip runs out.

use rustc_hash::FxHashMap;

use crate::resources::cliploader::ClipHandle;

/// Address of a playback channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    /// The single looping background music channel.
    Music,
    /// An effect channel, by position in the pool.
    Effect(usize),
}

/// Renders clips on channels.
pub trait AudioOutput {
    /// Start `clip` from the beginning on `channel`, replacing what it played.
    fn play(&mut self, channel: ChannelId, clip: &ClipHandle, looped: bool);
    fn stop(&mut self, channel: ChannelId);
    fn pause(&mut self, channel: ChannelId);
    fn resume(&mut self, channel: ChannelId);
    fn is_playing(&self, channel: ChannelId) -> bool;
    fn set_volume(&mut self, channel: ChannelId, volume: f32);
    /// Advance device time by `dt` seconds.
    fn update(&mut self, _dt: f32) {}
}

#[derive(Debug, Clone)]
struct Voice {
    length: f32,
    position: f32,
    looped: bool,
    playing: bool,
    paused: bool,
}

/// Silent mixer that only keeps time.
#[derive(Debug, Default)]
pub struct SimulatedOutput {
    voices: FxHashMap<ChannelId, Voice>,
    volumes: FxHashMap<ChannelId, f32>,
}

impl SimulatedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn volume(&self, channel: ChannelId) -> Option<f32> {
        self.volumes.get(&channel).copied()
    }
}

impl AudioOutput for SimulatedOutput {
    fn play(&mut self, channel: ChannelId, clip: &ClipHandle, looped: bool) {
        log::trace!("[output] {:?} play '{}' looped={}", channel, clip.path, looped);
        self.voices.insert(
            channel,
            Voice {
                length: clip.length,
                position: 0.0,
                looped,
                playing: true,
                paused: false,
            },
        );
    }

    fn stop(&mut self, channel: ChannelId) {
        if let Some(voice) = self.voices.get_mut(&channel) {
            voice.playing = false;
            voice.paused = false;
            voice.position = 0.0;
        }
    }

    fn pause(&mut self, channel: ChannelId) {
        if let Some(voice) = self.voices.get_mut(&channel) {
            if voice.playing {
                voice.playing = false;
                voice.paused = true;
            }
        }
    }

    fn resume(&mut self, channel: ChannelId) {
        if let Some(voice) = self.voices.get_mut(&channel) {
            if voice.paused {
                voice.playing = true;
                voice.paused = false;
            }
        }
    }

    fn is_playing(&self, channel: ChannelId) -> bool {
        self.voices.get(&channel).is_some_and(|voice| voice.playing)
    }

    fn set_volume(&mut self, channel: ChannelId, volume: f32) {
        self.volumes.insert(channel, volume);
    }

    fn update(&mut self, dt: f32) {
        for voice in self.voices.values_mut().filter(|voice| voice.playing) {
            voice.position += dt;
            if voice.position < voice.length {
                continue;
            }
            if voice.looped && voice.length > 0.0 {
                voice.position %= voice.length;
            } else {
                voice.playing = false;
                voice.position = 0.0;
            }
        }
    }
}
