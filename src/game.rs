//! Stage assembly.
//!
//! Builds the ECS world (transition controller, frame clock, message queues,
//! audio thread) from a [`StageConfig`] and the per-frame [`Schedule`] that
//! drives it. The binary and the integration tests share these helpers.

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::{error, info, warn};

use crate::events::audio::AudioCmd;
use crate::events::transition::{ScreenStateChanged, TransitionMessage, TransitionRequest};
use crate::resources::audio::setup_audio;
use crate::resources::cliploader::ManifestLoader;
use crate::resources::fade::FadeCollaborator;
use crate::resources::output::SimulatedOutput;
use crate::resources::sceneloader::SceneLoader;
use crate::resources::screenstate::ScreenStates;
use crate::resources::soundmanager::SoundManager;
use crate::resources::stageconfig::StageConfig;
use crate::resources::transition::SceneTransitionController;
use crate::resources::worldtime::WorldTime;
use crate::systems::audio::{
    forward_audio_cmds, poll_audio_messages, track_audio_status, update_bevy_audio_cmds,
    update_bevy_audio_messages,
};
use crate::systems::transition::{
    advance_transition, handle_transition_requests, update_bevy_transition_messages,
    update_bevy_transition_requests,
};

/// Build the controller described by `config` around the given collaborators.
pub fn transition_controller(
    config: &StageConfig,
    fader: Box<dyn FadeCollaborator>,
    scenes: Box<dyn SceneLoader>,
) -> SceneTransitionController {
    SceneTransitionController::new(fader, scenes)
        .with_duration(config.transition_duration)
        .with_load_timeout(config.load_timeout())
}

/// Insert the frame clock, the controller and the transition message queues.
pub fn insert_transition_resources(
    world: &mut World,
    config: &StageConfig,
    fader: Box<dyn FadeCollaborator>,
    scenes: Box<dyn SceneLoader>,
) {
    world.insert_resource(WorldTime::default());
    world.insert_resource(transition_controller(config, fader, scenes));
    world.insert_resource(Messages::<TransitionRequest>::default());
    world.insert_resource(Messages::<TransitionMessage>::default());
}

/// Returns the closure the audio thread runs to build its [`SoundManager`].
///
/// The manifest is read on the audio thread. A missing or malformed manifest
/// leaves an empty loader, so every play request reports a load failure
/// instead of stopping the stage.
pub fn sound_manager_factory(config: &StageConfig) -> impl FnOnce() -> SoundManager + Send + 'static {
    let manifest = config.manifest.clone();
    let root = config.sound_root.clone();
    let music_slots = config.music_slots;
    let effect_slots = config.effect_slots;
    move || {
        let loader = match ManifestLoader::from_file(&manifest, &root) {
            Ok(loader) => {
                info!("[audio] manifest {:?}: {} clips", manifest, loader.len());
                loader
            }
            Err(e) => {
                warn!("[audio] manifest {:?} unavailable: {}", manifest, e);
                ManifestLoader::new(root)
            }
        };
        SoundManager::with_capacity(
            Box::new(loader.clone()),
            Box::new(SimulatedOutput::new()),
            music_slots,
            effect_slots,
        )
        .unwrap_or_else(|e| {
            error!("[audio] {}; using default cache sizes", e);
            SoundManager::new(Box::new(loader), Box::new(SimulatedOutput::new()))
        })
    }
}

/// Observer: start the screen's music once it is shown and click when the
/// screen blanks.
pub fn play_screen_audio(trigger: On<ScreenStateChanged>, mut audio: MessageWriter<AudioCmd>) {
    let change = trigger.event();
    match change.current {
        ScreenStates::Blank => {
            audio.write(AudioCmd::PlayFx { key: None });
        }
        screen => {
            audio.write(AudioCmd::PlayMusic {
                key: screen.scene_name().to_string(),
            });
        }
    }
}

/// Log transition progress.
pub fn log_transition_messages(mut reader: MessageReader<TransitionMessage>) {
    for msg in reader.read() {
        match msg {
            TransitionMessage::Failed { target, error } => {
                warn!("Transition to {} failed: {}", target, error)
            }
            TransitionMessage::Rejected { target, in_flight } => {
                warn!("Transition to {} rejected ({} in flight)", target, in_flight)
            }
            other => info!("{:?}", other),
        }
    }
}

/// Build a complete world: transition resources, audio thread and observers.
pub fn build_world(
    config: &StageConfig,
    fader: Box<dyn FadeCollaborator>,
    scenes: Box<dyn SceneLoader>,
) -> World {
    let mut world = World::new();
    insert_transition_resources(&mut world, config, fader, scenes);
    world.insert_resource(config.clone());

    // Init audio
    setup_audio(&mut world, sound_manager_factory(config));

    world.add_observer(play_screen_audio);
    // Ensure the observer is registered before we run any systems that may trigger events.
    world.flush();
    world
}

/// Systems that move a transition forward, in order.
pub fn add_transition_systems(schedule: &mut Schedule) {
    schedule.add_systems(
        (
            handle_transition_requests,
            advance_transition,
            log_transition_messages,
            update_bevy_transition_requests,
            update_bevy_transition_messages,
        )
            .chain(),
    );
}

/// Per-frame schedule for a world made by [`build_world`].
pub fn build_schedule() -> Schedule {
    let mut update = Schedule::default();
    add_transition_systems(&mut update);
    update.add_systems(
        // audio systems must be together
        (
            // First, advance AudioCmd messages and forward them to the audio thread
            update_bevy_audio_cmds,
            forward_audio_cmds,
            // Then, pull audio thread messages and advance them
            poll_audio_messages,
            update_bevy_audio_messages,
            track_audio_status,
        )
            .chain()
            .after(advance_transition),
    );
    update
}
