//! Screen transition messages and events.
//!
//! Application code asks for a screen change by writing a
//! [`TransitionRequest`] message. The transition systems answer with
//! [`TransitionMessage`]s and, for every change of the current screen,
//! trigger a [`ScreenStateChanged`] event so ECS observers can react (start
//! music, spawn UI, etc.).

use bevy_ecs::prelude::*;

use crate::error::LoadError;
use crate::resources::screenstate::ScreenStates;

/// Request a transition to `target`.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRequest {
    pub target: ScreenStates,
}

/// Progress reports from the transition controller.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum TransitionMessage {
    /// A request was accepted and the fade-out began.
    Started {
        from: ScreenStates,
        to: ScreenStates,
    },
    /// The current screen changed.
    StateChanged {
        previous: ScreenStates,
        current: ScreenStates,
    },
    /// The target screen is loaded and fully visible.
    Completed { state: ScreenStates },
    /// The target screen could not be loaded; the screen stays Blank.
    Failed {
        target: ScreenStates,
        error: LoadError,
    },
    /// A request arrived while another transition was running.
    Rejected {
        target: ScreenStates,
        in_flight: ScreenStates,
    },
}

/// Triggered once per distinct change of the current screen.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenStateChanged {
    pub previous: ScreenStates,
    pub current: ScreenStates,
}
