//! Stagehand library.
//!
//! Scene transitions with a synchronized fade and asset swap, plus a bounded
//! audio resource cache with music and effect channels, wired into a
//! `bevy_ecs` world. Exposed as a library for the demo binary and the
//! integration tests.

pub mod error;
pub mod events;
pub mod game;
pub mod resources;
pub mod systems;
