//! Audio clip handles and the resource loader collaborator.
//!
//! A [`ResourceLoader`] turns a resource path such as `"Se/Enter"` into a
//! [`ClipHandle`]. Any `FnMut(&str) -> Result<ClipHandle, LoadError>` is a
//! loader, which keeps tests and embedders free from file formats.
//!
//! [`ManifestLoader`] is the headless loader used by the demo binary: it reads
//! a JSON manifest describing the available clips.
//!
//! # Manifest format
//!
//! ```json
//! {
//!   "root": "Sounds",
//!   "clips": {
//!     "Bgm/Title": { "length": 92.0 },
//!     "Se/Enter":  { "length": 0.35 }
//!   }
//! }
//! ```

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::{LoadError, ManifestError};

static NEXT_CLIP_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of one load of a clip. Reloading the same resource mints a new
/// id; use [`AudioClip::same_resource`] to compare what is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId(pub u32);

impl ClipId {
    /// A process-unique id.
    pub fn next() -> Self {
        ClipId(NEXT_CLIP_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Loaded audio data as far as the core is concerned.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub id: ClipId,
    /// Full path the clip was loaded from.
    pub path: String,
    /// Length in seconds.
    pub length: f32,
}

impl AudioClip {
    pub fn new(path: impl Into<String>, length: f32) -> Self {
        AudioClip {
            id: ClipId::next(),
            path: path.into(),
            length,
        }
    }

    /// Both handles were loaded from the same resource path, even if the
    /// cache dropped and reloaded it in between.
    pub fn same_resource(&self, other: &AudioClip) -> bool {
        self.id == other.id || self.path == other.path
    }
}

/// Shared, opaque handle to a loaded clip.
pub type ClipHandle = Arc<AudioClip>;

/// Loads audio clips by resource path.
pub trait ResourceLoader {
    fn load(&mut self, path: &str) -> Result<ClipHandle, LoadError>;
}

impl<F> ResourceLoader for F
where
    F: FnMut(&str) -> Result<ClipHandle, LoadError>,
{
    fn load(&mut self, path: &str) -> Result<ClipHandle, LoadError> {
        self(path)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ClipSpec {
    length: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct Manifest {
    #[serde(default)]
    root: Option<String>,
    #[serde(default)]
    clips: FxHashMap<String, ClipSpec>,
}

/// Loader backed by a JSON manifest of available clips.
#[derive(Debug, Clone, Default)]
pub struct ManifestLoader {
    root: String,
    clips: FxHashMap<String, f32>,
}

impl ManifestLoader {
    /// An empty manifest rooted at `root`; every load fails until clips are added.
    pub fn new(root: impl Into<String>) -> Self {
        ManifestLoader {
            root: root.into(),
            clips: FxHashMap::default(),
        }
    }

    /// Register a clip by resource path (e.g. `"Se/Enter"`).
    pub fn with_clip(mut self, path: impl Into<String>, length: f32) -> Self {
        self.clips.insert(path.into(), length);
        self
    }

    /// Parse a manifest from JSON text. A `root` in the document overrides
    /// `default_root`.
    pub fn from_json(json: &str, default_root: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = serde_json::from_str(json)?;
        Ok(ManifestLoader {
            root: manifest.root.unwrap_or_else(|| default_root.to_string()),
            clips: manifest
                .clips
                .into_iter()
                .map(|(path, spec)| (path, spec.length))
                .collect(),
        })
    }

    pub fn from_file(path: impl AsRef<Path>, default_root: &str) -> Result<Self, ManifestError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, default_root)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    fn full_path(&self, path: &str) -> String {
        if self.root.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", self.root.trim_end_matches('/'), path)
        }
    }
}

impl ResourceLoader for ManifestLoader {
    fn load(&mut self, path: &str) -> Result<ClipHandle, LoadError> {
        let full_path = self.full_path(path);
        let Some(&length) = self.clips.get(path) else {
            return Err(LoadError::NotFound { path: full_path });
        };
        if !length.is_finite() || length < 0.0 {
            return Err(LoadError::Invalid {
                path: full_path,
                reason: format!("bad clip length {}", length),
            });
        }
        Ok(Arc::new(AudioClip::new(full_path, length)))
    }
}
