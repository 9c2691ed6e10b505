//! Stage configuration resource.
//!
//! Manages transition and audio settings loaded from an INI configuration
//! file. Provides defaults for a safe startup and methods to load, validate
//! and save the configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [transition]
//! duration = 0.5
//! load_timeout = 5.0
//!
//! [audio]
//! music_slots = 1
//! effect_slots = 5
//! sound_root = Sounds
//! manifest = assets/sounds.json
//! ```
//!
//! A `load_timeout` of `0` waits for the scene loader forever.

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::resources::soundmanager::{
    DEFAULT_EFFECT_SLOTS, DEFAULT_MUSIC_SLOTS, EFFECT_NAMESPACE, MUSIC_NAMESPACE,
};
use crate::resources::transition::DEFAULT_TRANSITION_SECONDS;

const DEFAULT_LOAD_TIMEOUT: f32 = 5.0;
const DEFAULT_SOUND_ROOT: &str = "Sounds";
const DEFAULT_MANIFEST: &str = "assets/sounds.json";
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Transition and audio settings.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct StageConfig {
    /// Full fade-out plus fade-in time in seconds.
    pub transition_duration: f32,
    /// Seconds to wait for a scene load; `0` disables the limit.
    pub load_timeout: f32,
    pub music_slots: usize,
    pub effect_slots: usize,
    /// Root prepended to every resource path by the manifest loader.
    pub sound_root: String,
    /// JSON sound manifest.
    pub manifest: PathBuf,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn read_float(config: &Ini, section: &str, key: &str) -> Result<Option<f32>, ConfigError> {
    config
        .getfloat(section, key)
        .map(|value| value.map(|v| v as f32))
        .map_err(|reason| ConfigError::InvalidValue {
            key: format!("{}.{}", section, key),
            reason,
        })
}

fn read_uint(config: &Ini, section: &str, key: &str) -> Result<Option<usize>, ConfigError> {
    config
        .getuint(section, key)
        .map(|value| value.map(|v| v as usize))
        .map_err(|reason| ConfigError::InvalidValue {
            key: format!("{}.{}", section, key),
            reason,
        })
}

impl StageConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            transition_duration: DEFAULT_TRANSITION_SECONDS,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            music_slots: DEFAULT_MUSIC_SLOTS,
            effect_slots: DEFAULT_EFFECT_SLOTS,
            sound_root: DEFAULT_SOUND_ROOT.to_string(),
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Scene load limit, `None` when disabled.
    pub fn load_timeout(&self) -> Option<f32> {
        (self.load_timeout > 0.0).then_some(self.load_timeout)
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values. Values that do
    /// not parse are reported as [`ConfigError::InvalidValue`]; nothing is
    /// changed in that case.
    pub fn load_from_file(&mut self) -> Result<(), ConfigError> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|reason| ConfigError::Read {
                path: self.config_path.display().to_string(),
                reason,
            })?;

        let mut loaded = self.clone();

        // [transition] section
        if let Some(duration) = read_float(&config, "transition", "duration")? {
            loaded.transition_duration = duration;
        }
        if let Some(timeout) = read_float(&config, "transition", "load_timeout")? {
            loaded.load_timeout = timeout;
        }

        // [audio] section
        if let Some(slots) = read_uint(&config, "audio", "music_slots")? {
            loaded.music_slots = slots;
        }
        if let Some(slots) = read_uint(&config, "audio", "effect_slots")? {
            loaded.effect_slots = slots;
        }
        if let Some(root) = config.get("audio", "sound_root") {
            loaded.sound_root = root;
        }
        if let Some(manifest) = config.get("audio", "manifest") {
            loaded.manifest = PathBuf::from(manifest);
        }

        *self = loaded;
        info!(
            "Loaded config: transition={}s timeout={}s music_slots={} effect_slots={} root='{}'",
            self.transition_duration,
            self.load_timeout,
            self.music_slots,
            self.effect_slots,
            self.sound_root
        );

        Ok(())
    }

    /// Check the values before they reach the controller and the caches.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.transition_duration.is_finite() && self.transition_duration > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "transition.duration".to_string(),
                reason: format!("must be a positive number, got {}", self.transition_duration),
            });
        }
        if !(self.load_timeout.is_finite() && self.load_timeout >= 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "transition.load_timeout".to_string(),
                reason: format!("must be zero or positive, got {}", self.load_timeout),
            });
        }
        if self.music_slots == 0 {
            return Err(ConfigError::ZeroCapacity {
                pool: MUSIC_NAMESPACE.to_string(),
            });
        }
        if self.effect_slots == 0 {
            return Err(ConfigError::ZeroCapacity {
                pool: EFFECT_NAMESPACE.to_string(),
            });
        }
        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), ConfigError> {
        let mut config = Ini::new();

        // [transition] section
        config.set(
            "transition",
            "duration",
            Some(self.transition_duration.to_string()),
        );
        config.set(
            "transition",
            "load_timeout",
            Some(self.load_timeout.to_string()),
        );

        // [audio] section
        config.set("audio", "music_slots", Some(self.music_slots.to_string()));
        config.set("audio", "effect_slots", Some(self.effect_slots.to_string()));
        config.set("audio", "sound_root", Some(self.sound_root.clone()));
        config.set(
            "audio",
            "manifest",
            Some(self.manifest.display().to_string()),
        );

        config
            .write(&self.config_path)
            .map_err(|e| ConfigError::Write {
                path: self.config_path.display().to_string(),
                reason: e.to_string(),
            })?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_are_valid() {
        let config = StageConfig::new();
        assert_eq!(config.transition_duration, 0.5);
        assert_eq!(config.music_slots, 1);
        assert_eq!(config.effect_slots, 5);
        assert_eq!(config.sound_root, "Sounds");
        assert_eq!(config.load_timeout(), Some(5.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_overrides_present_values_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(
            &path,
            "[transition]\nduration = 1.5\nload_timeout = 0\n\n[audio]\neffect_slots = 8\n",
        )
        .unwrap();

        let mut config = StageConfig::with_path(&path);
        config.load_from_file().unwrap();

        assert_eq!(config.transition_duration, 1.5);
        assert_eq!(config.load_timeout(), None);
        assert_eq!(config.effect_slots, 8);
        assert_eq!(config.music_slots, 1);
        assert_eq!(config.manifest, PathBuf::from("assets/sounds.json"));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StageConfig::with_path(dir.path().join("absent.ini"));
        assert!(matches!(
            config.load_from_file(),
            Err(ConfigError::Read { .. })
        ));
        assert_eq!(config.transition_duration, 0.5);
    }

    #[test]
    fn test_unparsable_value_leaves_config_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "[transition]\nduration = 2\n[audio]\nmusic_slots = many\n").unwrap();

        let mut config = StageConfig::with_path(&path);
        let err = config.load_from_file().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "audio.music_slots"));
        assert_eq!(config.transition_duration, 0.5);
    }

    #[test]
    fn test_validate_rejects_zero_slots_and_bad_duration() {
        let mut config = StageConfig::new();
        config.effect_slots = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroCapacity {
                pool: "Se".to_string()
            })
        );

        let mut config = StageConfig::new();
        config.transition_duration = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");

        let mut written = StageConfig::with_path(&path);
        written.transition_duration = 0.8;
        written.sound_root = "Audio".to_string();
        written.save_to_file().unwrap();

        let mut read = StageConfig::with_path(&path);
        read.load_from_file().unwrap();
        assert_eq!(read, written);
    }
}
