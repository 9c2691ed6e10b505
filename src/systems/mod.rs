//! Stage systems.
//!
//! Submodules overview
//! - [`audio`] – the audio thread and its bridge systems (forward/poll/track)
//! - [`time`] – update simulation time and delta
//! - [`transition`] – start and advance scene transitions, run conditions

pub mod audio;
pub mod time;
pub mod transition;
