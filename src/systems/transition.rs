//! Scene transition systems.
//!
//! - [`handle_transition_requests`] hands queued [`TransitionRequest`]s to
//!   the [`SceneTransitionController`] and reports whether each one started.
//! - [`advance_transition`] steps the controller by the frame delta, writes
//!   its progress as [`TransitionMessage`]s and triggers a
//!   [`ScreenStateChanged`] event for every screen change.
//! - [`update_bevy_transition_requests`] and
//!   [`update_bevy_transition_messages`] advance the message queues.
//!
//! Run conditions [`transition_idle`] and [`screen_is_game`] gate gameplay
//! systems that must not run mid-transition.

use bevy_ecs::prelude::*;
use log::debug;

use crate::error::TransitionError;
use crate::events::transition::{ScreenStateChanged, TransitionMessage, TransitionRequest};
use crate::resources::screenstate::ScreenStates;
use crate::resources::transition::SceneTransitionController;
use crate::resources::worldtime::WorldTime;

/// Start transitions for the requests written since the last run.
///
/// Only the first request can start while idle; the rest are rejected
/// because a transition is then in flight.
pub fn handle_transition_requests(
    mut requests: MessageReader<TransitionRequest>,
    mut controller: ResMut<SceneTransitionController>,
    mut out: MessageWriter<TransitionMessage>,
) {
    for request in requests.read() {
        let from = controller.current();
        match controller.request_transition(request.target) {
            Ok(()) => {
                out.write(TransitionMessage::Started {
                    from,
                    to: request.target,
                });
            }
            Err(TransitionError::Busy { target, in_flight }) => {
                out.write(TransitionMessage::Rejected { target, in_flight });
            }
        }
    }
}

/// Step the transition in flight by the scaled frame delta.
pub fn advance_transition(
    time: Res<WorldTime>,
    mut controller: ResMut<SceneTransitionController>,
    mut out: MessageWriter<TransitionMessage>,
    mut commands: Commands,
) {
    if !controller.is_transitioning() {
        return;
    }
    for msg in controller.update(time.delta) {
        if let TransitionMessage::StateChanged { previous, current } = msg {
            debug!("Triggering ScreenStateChanged {:?} -> {:?}", previous, current);
            commands.trigger(ScreenStateChanged { previous, current });
        }
        out.write(msg);
    }
}

/// Advance the ECS message queue for [`TransitionRequest`].
pub fn update_bevy_transition_requests(mut msgs: ResMut<Messages<TransitionRequest>>) {
    msgs.update();
}

/// Advance the ECS message queue for [`TransitionMessage`].
pub fn update_bevy_transition_messages(mut msgs: ResMut<Messages<TransitionMessage>>) {
    msgs.update();
}

pub fn transition_idle(controller: Res<SceneTransitionController>) -> bool {
    !controller.is_transitioning()
}

pub fn screen_is_game(controller: Res<SceneTransitionController>) -> bool {
    matches!(controller.current(), ScreenStates::Game)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::fade::ScreenFade;
    use crate::resources::sceneloader::SceneCatalog;
    use bevy_ecs::system::SystemState;

    fn world() -> World {
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        world.insert_resource(Messages::<TransitionRequest>::default());
        world.insert_resource(Messages::<TransitionMessage>::default());
        world.insert_resource(SceneTransitionController::new(
            Box::new(ScreenFade::new()),
            Box::new(SceneCatalog::new(["Blank", "Title", "Game"])),
        ));
        world
    }

    fn drain(world: &mut World) -> Vec<TransitionMessage> {
        let mut state: SystemState<MessageReader<TransitionMessage>> = SystemState::new(world);
        let mut reader = state.get_mut(world);
        reader.read().cloned().collect()
    }

    #[test]
    fn test_second_request_in_same_frame_is_rejected() {
        let mut world = world();
        world.write_message(TransitionRequest {
            target: ScreenStates::Game,
        });
        world.write_message(TransitionRequest {
            target: ScreenStates::Title,
        });

        let mut schedule = Schedule::default();
        schedule.add_systems(handle_transition_requests);
        schedule.run(&mut world);

        assert_eq!(
            drain(&mut world),
            vec![
                TransitionMessage::Started {
                    from: ScreenStates::Title,
                    to: ScreenStates::Game,
                },
                TransitionMessage::Rejected {
                    target: ScreenStates::Title,
                    in_flight: ScreenStates::Game,
                },
            ]
        );
        assert!(world.resource::<SceneTransitionController>().is_transitioning());
    }

    #[test]
    fn test_transition_idle_gates_systems() {
        let mut world = world();
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (|mut time: ResMut<WorldTime>| time.elapsed += 1.0).run_if(transition_idle),
        );

        schedule.run(&mut world);
        assert_eq!(world.resource::<WorldTime>().elapsed, 1.0);

        world
            .resource_mut::<SceneTransitionController>()
            .request_transition(ScreenStates::Game)
            .unwrap();
        schedule.run(&mut world);
        assert_eq!(world.resource::<WorldTime>().elapsed, 1.0);
    }
}
