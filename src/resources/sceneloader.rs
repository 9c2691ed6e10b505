//! Scene loader collaborator.
//!
//! The transition controller swaps screen content through a [`SceneLoader`].
//! Loading may be asynchronous: [`SceneLoader::request_load`] starts it and
//! [`SceneLoader::poll_load`] is called once per frame until it reports
//! [`LoadProgress::Ready`] or [`LoadProgress::Failed`]. Synchronous loaders
//! only implement `request_load` and keep the default `poll_load`.
//!
//! [`SceneCatalog`] is a headless implementation that knows a fixed set of
//! scene names and can simulate load latency.

use crate::error::LoadError;
use rustc_hash::{FxHashMap, FxHashSet};

/// Result of polling an in-flight scene load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadProgress {
    Pending,
    Ready,
    Failed(LoadError),
}

/// Loads and unloads the content of whole screens.
pub trait SceneLoader: Send + Sync {
    /// Hint to free assets nothing references anymore. Need not be synchronous.
    fn release_unused_assets(&mut self) {}
    /// Drop the content of `scene`.
    fn unload(&mut self, scene: &str);
    /// Start loading `scene`. An immediate error ends the load.
    fn request_load(&mut self, scene: &str) -> Result<(), LoadError>;
    /// Poll the load started by the last [`SceneLoader::request_load`].
    fn poll_load(&mut self, _scene: &str) -> LoadProgress {
        LoadProgress::Ready
    }
}

/// A registry of known scenes.
///
/// Requests for unknown names fail with [`LoadError::NotFound`]. Scenes
/// registered with a latency report [`LoadProgress::Pending`] for that many
/// polls before becoming ready.
#[derive(Debug, Default)]
pub struct SceneCatalog {
    scenes: FxHashSet<String>,
    latency: FxHashMap<String, u32>,
    loaded: FxHashSet<String>,
    pending: Option<(String, u32)>,
    releases: u32,
}

impl SceneCatalog {
    pub fn new<I, S>(scenes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SceneCatalog {
            scenes: scenes.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Make `scene` take `polls` extra polls before it is ready.
    pub fn with_latency(mut self, scene: impl Into<String>, polls: u32) -> Self {
        self.latency.insert(scene.into(), polls);
        self
    }

    pub fn is_loaded(&self, scene: &str) -> bool {
        self.loaded.contains(scene)
    }

    /// Number of `release_unused_assets` hints received.
    pub fn releases(&self) -> u32 {
        self.releases
    }
}

impl SceneLoader for SceneCatalog {
    fn release_unused_assets(&mut self) {
        self.releases += 1;
        log::debug!("releasing unused scene assets");
    }

    fn unload(&mut self, scene: &str) {
        if self.loaded.remove(scene) {
            log::info!("scene '{}' unloaded", scene);
        }
    }

    fn request_load(&mut self, scene: &str) -> Result<(), LoadError> {
        if !self.scenes.contains(scene) {
            return Err(LoadError::NotFound {
                path: scene.to_string(),
            });
        }
        let polls = self.latency.get(scene).copied().unwrap_or(0);
        self.pending = Some((scene.to_string(), polls));
        Ok(())
    }

    fn poll_load(&mut self, scene: &str) -> LoadProgress {
        match self.pending.as_mut() {
            Some((name, remaining)) if name == scene => {
                if *remaining > 0 {
                    *remaining -= 1;
                    return LoadProgress::Pending;
                }
                self.pending = None;
                self.loaded.insert(scene.to_string());
                log::info!("scene '{}' loaded", scene);
                LoadProgress::Ready
            }
            _ => LoadProgress::Failed(LoadError::Invalid {
                path: scene.to_string(),
                reason: "no load in progress".to_string(),
            }),
        }
    }
}
