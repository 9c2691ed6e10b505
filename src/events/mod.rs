//! Message and event types exchanged between systems.
//!
//! Messages are buffered and read by systems each frame; events are
//! triggered for observers. Both keep the transition controller and the
//! audio thread decoupled from the code that drives them.
//!
//! Submodules:
//! - [`audio`] – commands and messages for the background audio thread
//! - [`transition`] – transition requests, progress reports and screen changes
pub mod audio;
pub mod transition;
