//! Scene transition state machine.
//!
//! [`SceneTransitionController`] owns the current [`ScreenStates`] value and
//! moves between screens in strictly ordered steps:
//!
//! 1. hint the scene loader to release unused assets,
//! 2. fade out over half the transition duration,
//! 3. switch to [`ScreenStates::Blank`] and unload the previous scene,
//! 4. load the target scene and switch to it once the loader is ready,
//! 5. fade in over the other half.
//!
//! Each step starts only after the previous one completed. The controller
//! never suspends on its own; [`SceneTransitionController::update`] is called
//! once per frame and advances whatever step is in flight. Only one transition
//! runs at a time: requests made while busy are rejected.
//!
//! If the target scene fails to load (or exceeds the load timeout) the screen
//! stays Blank, the error is kept in [`SceneTransitionController::last_error`]
//! and the fade-in still runs so the user is left on a neutral screen.

use bevy_ecs::prelude::Resource;
use crossbeam_channel::Receiver;
use log::{info, warn};

use crate::error::{LoadError, TransitionError};
use crate::events::transition::TransitionMessage;
use crate::resources::fade::{FadeCollaborator, FadeDirection};
use crate::resources::observable::Observable;
use crate::resources::sceneloader::{LoadProgress, SceneLoader};
use crate::resources::screenstate::ScreenStates;

/// Total fade-out plus fade-in time in seconds.
pub const DEFAULT_TRANSITION_SECONDS: f32 = 0.5;

/// Step of the transition in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionPhase {
    Idle,
    FadingOut {
        target: ScreenStates,
    },
    Loading {
        target: ScreenStates,
        /// Seconds spent waiting on the scene loader so far.
        waited: f32,
    },
    FadingIn {
        target: ScreenStates,
        failed: bool,
    },
}

/// The last transition that ended without reaching its target.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionFailure {
    pub target: ScreenStates,
    pub error: LoadError,
}

/// Drives screen changes through fade and scene loader collaborators.
#[derive(Resource)]
pub struct SceneTransitionController {
    state: Observable<ScreenStates>,
    phase: TransitionPhase,
    duration: f32,
    load_timeout: Option<f32>,
    fader: Box<dyn FadeCollaborator>,
    scenes: Box<dyn SceneLoader>,
    last_error: Option<TransitionFailure>,
}

impl SceneTransitionController {
    /// Create a controller on the Title screen with the default duration and
    /// no load timeout.
    pub fn new(fader: Box<dyn FadeCollaborator>, scenes: Box<dyn SceneLoader>) -> Self {
        SceneTransitionController {
            state: Observable::new(ScreenStates::Title),
            phase: TransitionPhase::Idle,
            duration: DEFAULT_TRANSITION_SECONDS,
            load_timeout: None,
            fader,
            scenes,
            last_error: None,
        }
    }

    /// Total transition time; each fade takes half of it.
    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.duration = seconds.max(0.0);
        self
    }

    /// Give up on a scene load after `seconds` of pending polls.
    pub fn with_load_timeout(mut self, seconds: Option<f32>) -> Self {
        self.load_timeout = seconds;
        self
    }

    pub fn current(&self) -> ScreenStates {
        *self.state.get()
    }

    pub fn phase(&self) -> &TransitionPhase {
        &self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        self.phase != TransitionPhase::Idle
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn last_error(&self) -> Option<&TransitionFailure> {
        self.last_error.as_ref()
    }

    /// Opacity of the fade overlay, for whatever renders it.
    pub fn fade_opacity(&self) -> f32 {
        self.fader.opacity()
    }

    /// Receive every distinct change of the current screen.
    pub fn subscribe(&mut self) -> Receiver<ScreenStates> {
        self.state.subscribe()
    }

    fn in_flight_target(&self) -> Option<ScreenStates> {
        match &self.phase {
            TransitionPhase::Idle => None,
            TransitionPhase::FadingOut { target }
            | TransitionPhase::Loading { target, .. }
            | TransitionPhase::FadingIn { target, .. } => Some(*target),
        }
    }

    /// Start a transition to `target`.
    ///
    /// Fails with [`TransitionError::Busy`] while another transition runs;
    /// the rejected request is not queued.
    pub fn request_transition(&mut self, target: ScreenStates) -> Result<(), TransitionError> {
        if let Some(in_flight) = self.in_flight_target() {
            warn!(
                "Transition to {:?} rejected, already moving to {:?}",
                target, in_flight
            );
            return Err(TransitionError::Busy { target, in_flight });
        }

        info!("Transitioning from {:?} to {:?}", self.current(), target);
        self.last_error = None;
        self.scenes.release_unused_assets();
        self.fader.begin(FadeDirection::Out, self.duration / 2.0);
        self.phase = TransitionPhase::FadingOut { target };
        Ok(())
    }

    /// Advance the transition in flight by `dt` seconds.
    ///
    /// Returns the progress messages produced during this step, in order.
    pub fn update(&mut self, dt: f32) -> Vec<TransitionMessage> {
        let mut out = Vec::new();
        match self.phase.clone() {
            TransitionPhase::Idle => {}
            TransitionPhase::FadingOut { target } => {
                if self.fader.advance(dt) {
                    self.swap_content(target, &mut out);
                }
            }
            TransitionPhase::Loading { target, waited } => {
                self.poll_loading(target, waited + dt, &mut out);
            }
            TransitionPhase::FadingIn { target, failed } => {
                if self.fader.advance(dt) {
                    self.phase = TransitionPhase::Idle;
                    if !failed {
                        info!("Transition to {:?} complete", target);
                        out.push(TransitionMessage::Completed { state: target });
                    }
                }
            }
        }
        out
    }

    fn set_state(&mut self, next: ScreenStates, out: &mut Vec<TransitionMessage>) {
        let previous = self.current();
        if self.state.set(next) {
            log::debug!("Screen state {:?} -> {:?}", previous, next);
            out.push(TransitionMessage::StateChanged {
                previous,
                current: next,
            });
        }
    }

    fn swap_content(&mut self, target: ScreenStates, out: &mut Vec<TransitionMessage>) {
        let previous = self.current();
        self.set_state(ScreenStates::Blank, out);
        self.scenes.unload(previous.scene_name());

        match self.scenes.request_load(target.scene_name()) {
            Ok(()) => {
                self.phase = TransitionPhase::Loading {
                    target,
                    waited: 0.0,
                };
                self.poll_loading(target, 0.0, out);
            }
            Err(error) => self.fail(target, error, out),
        }
    }

    fn poll_loading(&mut self, target: ScreenStates, waited: f32, out: &mut Vec<TransitionMessage>) {
        match self.scenes.poll_load(target.scene_name()) {
            LoadProgress::Ready => {
                self.set_state(target, out);
                self.fader.begin(FadeDirection::In, self.duration / 2.0);
                self.phase = TransitionPhase::FadingIn {
                    target,
                    failed: false,
                };
            }
            LoadProgress::Failed(error) => self.fail(target, error, out),
            LoadProgress::Pending => match self.load_timeout {
                Some(limit) if waited >= limit => {
                    let error = LoadError::TimedOut {
                        scene: target.scene_name().to_string(),
                        seconds: limit,
                    };
                    self.fail(target, error, out);
                }
                _ => self.phase = TransitionPhase::Loading { target, waited },
            },
        }
    }

    fn fail(&mut self, target: ScreenStates, error: LoadError, out: &mut Vec<TransitionMessage>) {
        warn!(
            "Failed to load {:?}, staying on {:?}: {}",
            target,
            self.current(),
            error
        );
        self.last_error = Some(TransitionFailure {
            target,
            error: error.clone(),
        });
        out.push(TransitionMessage::Failed { target, error });
        self.fader.begin(FadeDirection::In, self.duration / 2.0);
        self.phase = TransitionPhase::FadingIn {
            target,
            failed: true,
        };
    }
}
