//! Error types shared by the transition controller and the audio services.
//!
//! Load failures are `Clone` so they can travel inside ECS messages and
//! across the audio thread channel.

use thiserror::Error;

use crate::resources::screenstate::ScreenStates;

/// A collaborator could not produce a resource or a scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// Nothing is registered under the requested path.
    #[error("resource not found: {path}")]
    NotFound { path: String },
    /// The resource exists but could not be turned into a usable handle.
    #[error("invalid resource '{path}': {reason}")]
    Invalid { path: String, reason: String },
    /// An asynchronous scene load did not report completion in time.
    #[error("scene '{scene}' did not finish loading within {seconds}s")]
    TimedOut { scene: String, seconds: f32 },
}

/// A transition request that could not be started.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// Another transition is still in flight; the request is dropped.
    #[error("transition to {target:?} rejected: transition to {in_flight:?} in progress")]
    Busy {
        target: ScreenStates,
        in_flight: ScreenStates,
    },
}

/// Invalid or unreadable configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("failed to load config file '{path}': {reason}")]
    Read { path: String, reason: String },
    #[error("failed to save config file '{path}': {reason}")]
    Write { path: String, reason: String },
    /// A cache pool was configured to hold no entries.
    #[error("{pool} cache capacity must be at least 1")]
    ZeroCapacity { pool: String },
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// The sound manifest could not be read.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),
}
