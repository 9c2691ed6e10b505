//! Audio playback surface.
//!
//! [`SoundManager`] ties together the music and effect caches, the channel
//! pool and the resource loader. Every `play_*` call first makes sure the
//! key is cached, then refreshes its recency, then hands the entry to the
//! pool. Music resources live under `"Bgm/"` and effects under `"Se/"`.
//!
//! The manager is not thread-safe by itself; it is owned by exactly one
//! thread (see [`crate::systems::audio::audio_thread`]).

use std::num::NonZeroUsize;

use crate::error::{ConfigError, LoadError};
use crate::resources::audiocache::{AudioResourceCache, AudioResourceEntry};
use crate::resources::channelpool::{AudioChannelPool, EffectRoute};
use crate::resources::cliploader::ResourceLoader;
use crate::resources::output::AudioOutput;
use crate::resources::volume::{SoundCategory, VolumeSettings};

/// Namespace of background music resources.
pub const MUSIC_NAMESPACE: &str = "Bgm";
/// Namespace of sound effect resources.
pub const EFFECT_NAMESPACE: &str = "Se";
/// Effect played when no key is given.
pub const DEFAULT_EFFECT: &str = "Enter";
pub const DEFAULT_MUSIC_SLOTS: usize = 1;
pub const DEFAULT_EFFECT_SLOTS: usize = 5;

const MUSIC_SLOTS: NonZeroUsize = NonZeroUsize::new(DEFAULT_MUSIC_SLOTS).unwrap();
const EFFECT_SLOTS: NonZeroUsize = NonZeroUsize::new(DEFAULT_EFFECT_SLOTS).unwrap();

/// Result of a play request that succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct Played<T> {
    /// What the channel pool did.
    pub outcome: T,
    /// Entry dropped from the cache to make room, if any.
    pub evicted: Option<AudioResourceEntry>,
}

pub struct SoundManager {
    music: AudioResourceCache,
    effects: AudioResourceCache,
    pool: AudioChannelPool,
    loader: Box<dyn ResourceLoader>,
}

impl SoundManager {
    /// Build a manager with the default cache sizes.
    pub fn new(loader: Box<dyn ResourceLoader>, output: Box<dyn AudioOutput>) -> Self {
        SoundManager {
            music: AudioResourceCache::bounded(MUSIC_NAMESPACE, MUSIC_SLOTS),
            effects: AudioResourceCache::bounded(EFFECT_NAMESPACE, EFFECT_SLOTS),
            pool: AudioChannelPool::new(output, VolumeSettings::default()),
            loader,
        }
    }

    /// Build a manager with explicit cache sizes. Zero sizes are rejected.
    pub fn with_capacity(
        loader: Box<dyn ResourceLoader>,
        output: Box<dyn AudioOutput>,
        music_slots: usize,
        effect_slots: usize,
    ) -> Result<Self, ConfigError> {
        Ok(SoundManager {
            music: AudioResourceCache::new(MUSIC_NAMESPACE, music_slots)?,
            effects: AudioResourceCache::new(EFFECT_NAMESPACE, effect_slots)?,
            pool: AudioChannelPool::new(output, VolumeSettings::default()),
            loader,
        })
    }

    pub fn music_cache(&self) -> &AudioResourceCache {
        &self.music
    }

    pub fn effect_cache(&self) -> &AudioResourceCache {
        &self.effects
    }

    pub fn pool(&self) -> &AudioChannelPool {
        &self.pool
    }

    /// Cache a music track without playing it.
    pub fn load_music(&mut self, key: &str) -> Result<Option<AudioResourceEntry>, LoadError> {
        self.music.ensure_loaded(key, self.loader.as_mut())
    }

    /// Play a music track, loading it if needed.
    ///
    /// `outcome` is `false` when the same track was already playing.
    pub fn play_music(&mut self, key: &str) -> Result<Played<bool>, LoadError> {
        let evicted = self.load_music(key)?;
        self.music.touch(key);
        let entry = self
            .music
            .get(key)
            .ok_or_else(|| LoadError::NotFound {
                path: self.music.resource_name(key),
            })?;
        let started = self.pool.play_music(entry);
        if started {
            log::info!("[audio] music '{}' started", key);
        }
        Ok(Played {
            outcome: started,
            evicted,
        })
    }

    pub fn stop_music(&mut self) {
        self.pool.stop_music();
    }

    pub fn pause_music(&mut self) {
        self.pool.pause_music();
    }

    pub fn resume_music(&mut self) {
        self.pool.resume_music();
    }

    pub fn is_music_playing(&self) -> bool {
        self.pool.is_music_playing()
    }

    /// Cache a sound effect without playing it.
    pub fn load_effect(&mut self, key: &str) -> Result<Option<AudioResourceEntry>, LoadError> {
        self.effects.ensure_loaded(key, self.loader.as_mut())
    }

    /// Play a sound effect, loading it if needed.
    pub fn play_effect(&mut self, key: &str) -> Result<Played<EffectRoute>, LoadError> {
        let evicted = self.load_effect(key)?;
        self.effects.touch(key);
        let entry = self
            .effects
            .get(key)
            .ok_or_else(|| LoadError::NotFound {
                path: self.effects.resource_name(key),
            })?;
        let route = self.pool.play_effect(entry);
        log::debug!("[audio] effect '{}' -> {:?}", key, route);
        Ok(Played {
            outcome: route,
            evicted,
        })
    }

    /// Play [`DEFAULT_EFFECT`].
    pub fn play_default_effect(&mut self) -> Result<Played<EffectRoute>, LoadError> {
        self.play_effect(DEFAULT_EFFECT)
    }

    pub fn set_volume(&mut self, category: SoundCategory, value: f32) -> f32 {
        self.pool.set_volume(category, value)
    }

    /// Apply both categories at once.
    pub fn apply_volumes(&mut self, volumes: VolumeSettings) {
        self.pool.set_volume(SoundCategory::Music, volumes.music);
        self.pool.set_volume(SoundCategory::Effects, volumes.effects);
    }

    pub fn volumes(&self) -> VolumeSettings {
        self.pool.volumes()
    }

    /// Stop the music and forget every cached track.
    pub fn unload_all_music(&mut self) {
        self.pool.stop_music();
        self.music.clear();
    }

    /// Forget every cached effect. Channels finish what they are playing.
    pub fn unload_all_effects(&mut self) {
        self.effects.clear();
    }

    pub fn stop_all(&mut self) {
        self.pool.stop_all();
    }

    /// Advance the output device clock.
    pub fn update(&mut self, dt: f32) {
        self.pool.update(dt);
    }
}
