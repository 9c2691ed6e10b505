//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! the collaborators those resources are built from. Each submodule
//! documents the semantics and intended usage of its resource(s).
//!
//! Overview
//! - `audio` – bridge and channels for the background audio thread
//! - `audiocache` – bounded per-category clip cache with LRU eviction
//! - `channelpool` – music channel and growable effect channels
//! - `cliploader` – clip handles and the manifest resource loader
//! - `fade` – fade collaborator and the eased screen fade
//! - `observable` – value holder that broadcasts changes to subscribers
//! - `output` – audio device collaborator and the silent simulated mixer
//! - `sceneloader` – scene loader collaborator and the scene catalog
//! - `screenstate` – the discrete application screens
//! - `soundmanager` – audio playback surface owned by the audio thread
//! - `stageconfig` – INI configuration
//! - `transition` – the scene transition state machine
//! - `volume` – per-category volume settings
//! - `worldtime` – simulation time and delta
pub mod audio;
pub mod audiocache;
pub mod channelpool;
pub mod cliploader;
pub mod fade;
pub mod observable;
pub mod output;
pub mod sceneloader;
pub mod screenstate;
pub mod soundmanager;
pub mod stageconfig;
pub mod transition;
pub mod volume;
pub mod worldtime;
