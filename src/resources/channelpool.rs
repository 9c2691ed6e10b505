//! Playback channel allocation.
//!
//! [`AudioChannelPool`] owns one looping music channel and an append-only
//! list of effect channels. Effects are routed with a fixed preference:
//!
//! 1. a channel already bound to the same key is re-triggered from the start,
//!    busy or not;
//! 2. otherwise the first idle channel takes the clip;
//! 3. otherwise a new channel is appended.
//!
//! The pool never fails for lack of channels and never shrinks. Volumes are
//! applied per category to every existing channel, and new effect channels
//! start at the last effects volume.

use crate::resources::audiocache::AudioResourceEntry;
use crate::resources::cliploader::ClipHandle;
use crate::resources::output::{AudioOutput, ChannelId};
use crate::resources::volume::{SoundCategory, VolumeSettings};

/// What a channel is currently bound to.
#[derive(Debug, Clone, Default)]
struct Channel {
    key: Option<String>,
    clip: Option<ClipHandle>,
    volume: f32,
}

impl Channel {
    fn bind(&mut self, entry: &AudioResourceEntry) {
        self.key = Some(entry.key.clone());
        self.clip = Some(entry.clip.clone());
    }
}

/// How an effect request was routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectRoute {
    /// Same key already bound to this channel.
    Retriggered(ChannelId),
    /// An idle channel was reused.
    Reused(ChannelId),
    /// A new channel was appended.
    Created(ChannelId),
}

impl EffectRoute {
    pub fn channel(self) -> ChannelId {
        match self {
            EffectRoute::Retriggered(id) | EffectRoute::Reused(id) | EffectRoute::Created(id) => id,
        }
    }
}

/// Music channel plus growable effect channels over an [`AudioOutput`].
pub struct AudioChannelPool {
    output: Box<dyn AudioOutput>,
    music: Channel,
    effects: Vec<Channel>,
    volumes: VolumeSettings,
}

impl AudioChannelPool {
    pub fn new(output: Box<dyn AudioOutput>, volumes: VolumeSettings) -> Self {
        let mut pool = AudioChannelPool {
            output,
            music: Channel::default(),
            effects: Vec::new(),
            volumes,
        };
        pool.music.volume = volumes.music;
        pool.output.set_volume(ChannelId::Music, volumes.music);
        pool
    }

    /// Play `entry` on the looping music channel.
    ///
    /// Returns `false` without touching the device when a clip from the same
    /// resource is already playing, including one the cache has since
    /// evicted and reloaded.
    pub fn play_music(&mut self, entry: &AudioResourceEntry) -> bool {
        let same_clip = self
            .music
            .clip
            .as_ref()
            .is_some_and(|clip| clip.same_resource(&entry.clip));
        if same_clip && self.output.is_playing(ChannelId::Music) {
            return false;
        }
        self.music.bind(entry);
        self.output.play(ChannelId::Music, &entry.clip, true);
        true
    }

    pub fn stop_music(&mut self) {
        self.output.stop(ChannelId::Music);
    }

    pub fn pause_music(&mut self) {
        self.output.pause(ChannelId::Music);
    }

    pub fn resume_music(&mut self) {
        self.output.resume(ChannelId::Music);
    }

    pub fn is_music_playing(&self) -> bool {
        self.output.is_playing(ChannelId::Music)
    }

    /// Key of the clip bound to the music channel, playing or not.
    pub fn music_key(&self) -> Option<&str> {
        self.music.key.as_deref()
    }

    /// Route `entry` to an effect channel and start it.
    pub fn play_effect(&mut self, entry: &AudioResourceEntry) -> EffectRoute {
        let (index, route): (usize, fn(ChannelId) -> EffectRoute) = if let Some(index) = self
            .effects
            .iter()
            .position(|ch| ch.key.as_deref() == Some(entry.key.as_str()))
        {
            (index, EffectRoute::Retriggered)
        } else if let Some(index) =
            (0..self.effects.len()).find(|&i| !self.output.is_playing(ChannelId::Effect(i)))
        {
            (index, EffectRoute::Reused)
        } else {
            let index = self.effects.len();
            let volume = self.volumes.effects;
            self.effects.push(Channel {
                volume,
                ..Channel::default()
            });
            self.output.set_volume(ChannelId::Effect(index), volume);
            log::debug!("[audio] effect channel {} created", index);
            (index, EffectRoute::Created)
        };

        let channel = ChannelId::Effect(index);
        self.effects[index].bind(entry);
        self.output.play(channel, &entry.clip, false);
        route(channel)
    }

    pub fn effect_channel_count(&self) -> usize {
        self.effects.len()
    }

    /// Key bound to an effect channel.
    pub fn effect_key(&self, index: usize) -> Option<&str> {
        self.effects.get(index).and_then(|ch| ch.key.as_deref())
    }

    pub fn volumes(&self) -> VolumeSettings {
        self.volumes
    }

    /// Set a category's volume on every channel of that category now and for
    /// channels created later. Returns the clamped value applied.
    pub fn set_volume(&mut self, category: SoundCategory, value: f32) -> f32 {
        let value = self.volumes.set(category, value);
        match category {
            SoundCategory::Music => {
                self.music.volume = value;
                self.output.set_volume(ChannelId::Music, value);
            }
            SoundCategory::Effects => {
                for (index, channel) in self.effects.iter_mut().enumerate() {
                    channel.volume = value;
                    self.output.set_volume(ChannelId::Effect(index), value);
                }
            }
        }
        value
    }

    /// Volume the pool last applied to `channel`.
    pub fn channel_volume(&self, channel: ChannelId) -> Option<f32> {
        match channel {
            ChannelId::Music => Some(self.music.volume),
            ChannelId::Effect(index) => self.effects.get(index).map(|ch| ch.volume),
        }
    }

    /// Stop every channel. Bindings are kept so a replayed key still reuses
    /// its channel.
    pub fn stop_all(&mut self) {
        self.output.stop(ChannelId::Music);
        for index in 0..self.effects.len() {
            self.output.stop(ChannelId::Effect(index));
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.output.update(dt);
    }
}
