//! Volume settings per sound category.

use serde::{Deserialize, Serialize};

/// The two independently mixed kinds of sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCategory {
    /// Background music on the looping music channel.
    Music,
    /// Short sound effects on the effect channels.
    Effects,
}

/// Gain applied to each category, in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeSettings {
    pub music: f32,
    pub effects: f32,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        // Perceptual defaults: squares of 0.5 and 0.7.
        VolumeSettings {
            music: 0.5_f32.powi(2),
            effects: 0.7_f32.powi(2),
        }
    }
}

impl VolumeSettings {
    pub fn get(&self, category: SoundCategory) -> f32 {
        match category {
            SoundCategory::Music => self.music,
            SoundCategory::Effects => self.effects,
        }
    }

    /// Store a clamped value and return what was stored.
    pub fn set(&mut self, category: SoundCategory, value: f32) -> f32 {
        let value = clamp_volume(value);
        match category {
            SoundCategory::Music => self.music = value,
            SoundCategory::Effects => self.effects = value,
        }
        value
    }
}

/// Clamp to `[0, 1]`, mapping NaN to silence.
pub fn clamp_volume(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let v = VolumeSettings::default();
        assert!((v.music - 0.25).abs() < 1e-6);
        assert!((v.effects - 0.49).abs() < 1e-6);
    }

    #[test]
    fn test_set_clamps() {
        let mut v = VolumeSettings::default();
        assert_eq!(v.set(SoundCategory::Music, 1.5), 1.0);
        assert_eq!(v.set(SoundCategory::Effects, -0.2), 0.0);
        assert_eq!(v.set(SoundCategory::Effects, f32::NAN), 0.0);
        assert_eq!(v.get(SoundCategory::Music), 1.0);
    }
}
