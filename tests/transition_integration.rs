//! Scene transition integration tests driving a real World + Schedule.

use std::sync::{Arc, Mutex};

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;

use stagehand::error::LoadError;
use stagehand::events::transition::{ScreenStateChanged, TransitionMessage, TransitionRequest};
use stagehand::game::{add_transition_systems, insert_transition_resources};
use stagehand::resources::fade::ScreenFade;
use stagehand::resources::sceneloader::SceneCatalog;
use stagehand::resources::screenstate::ScreenStates;
use stagehand::resources::stageconfig::StageConfig;
use stagehand::resources::transition::SceneTransitionController;
use stagehand::systems::time::update_world_time;
use stagehand::systems::transition::{advance_transition, screen_is_game};

const DT: f32 = 0.05;
const MAX_FRAMES: usize = 200;

#[derive(Resource, Default)]
struct Collected(Vec<TransitionMessage>);

#[derive(Resource, Default)]
struct GameFrames(u32);

fn collect_messages(mut reader: MessageReader<TransitionMessage>, mut collected: ResMut<Collected>) {
    collected.0.extend(reader.read().cloned());
}

fn count_game_frames(mut frames: ResMut<GameFrames>) {
    frames.0 += 1;
}

struct Stage {
    world: World,
    schedule: Schedule,
    changes: Arc<Mutex<Vec<(ScreenStates, ScreenStates)>>>,
}

impl Stage {
    fn new(config: &StageConfig, scenes: SceneCatalog) -> Self {
        let mut world = World::new();
        insert_transition_resources(&mut world, config, Box::new(ScreenFade::new()), Box::new(scenes));
        world.init_resource::<Collected>();
        world.init_resource::<GameFrames>();

        let changes = Arc::new(Mutex::new(Vec::new()));
        let sink = changes.clone();
        world.add_observer(move |trigger: On<ScreenStateChanged>| {
            let ev = trigger.event();
            sink.lock().unwrap().push((ev.previous, ev.current));
        });
        world.flush();

        let mut schedule = Schedule::default();
        add_transition_systems(&mut schedule);
        schedule.add_systems(collect_messages.after(advance_transition));
        schedule.add_systems(count_game_frames.run_if(screen_is_game));

        Stage {
            world,
            schedule,
            changes,
        }
    }

    fn frame(&mut self) {
        update_world_time(&mut self.world, DT);
        self.schedule.run(&mut self.world);
    }

    fn request(&mut self, target: ScreenStates) {
        self.world.write_message(TransitionRequest { target });
    }

    fn run_until_idle(&mut self) {
        for _ in 0..MAX_FRAMES {
            self.frame();
            if !self.controller().is_transitioning() {
                return;
            }
        }
        panic!("transition did not finish in {} frames", MAX_FRAMES);
    }

    fn controller(&self) -> &SceneTransitionController {
        self.world.resource::<SceneTransitionController>()
    }

    fn messages(&self) -> Vec<TransitionMessage> {
        self.world.resource::<Collected>().0.clone()
    }

    fn changes(&self) -> Vec<(ScreenStates, ScreenStates)> {
        self.changes.lock().unwrap().clone()
    }
}

fn all_scenes() -> SceneCatalog {
    SceneCatalog::new(["Blank", "Title", "Game"])
}

#[test]
fn transition_publishes_blank_then_target() {
    let mut stage = Stage::new(&StageConfig::new(), all_scenes());
    let rx = stage
        .world
        .resource_mut::<SceneTransitionController>()
        .subscribe();

    stage.request(ScreenStates::Game);
    stage.run_until_idle();

    assert_eq!(stage.controller().current(), ScreenStates::Game);
    assert_eq!(
        stage.changes(),
        vec![
            (ScreenStates::Title, ScreenStates::Blank),
            (ScreenStates::Blank, ScreenStates::Game),
        ]
    );
    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        vec![ScreenStates::Blank, ScreenStates::Game]
    );
    assert_eq!(
        stage.messages(),
        vec![
            TransitionMessage::Started {
                from: ScreenStates::Title,
                to: ScreenStates::Game,
            },
            TransitionMessage::StateChanged {
                previous: ScreenStates::Title,
                current: ScreenStates::Blank,
            },
            TransitionMessage::StateChanged {
                previous: ScreenStates::Blank,
                current: ScreenStates::Game,
            },
            TransitionMessage::Completed {
                state: ScreenStates::Game,
            },
        ]
    );
}

#[test]
fn transition_takes_about_the_configured_duration() {
    let mut stage = Stage::new(&StageConfig::new(), all_scenes());
    stage.request(ScreenStates::Game);

    let mut frames = 0;
    loop {
        stage.frame();
        frames += 1;
        if !stage.controller().is_transitioning() {
            break;
        }
        assert!(frames < MAX_FRAMES);
    }
    // 0.5s at 0.05s per frame, give or take float rounding on each half.
    assert!((10..=12).contains(&frames), "took {} frames", frames);
}

#[test]
fn request_during_transition_is_rejected() {
    let mut stage = Stage::new(&StageConfig::new(), all_scenes());
    stage.request(ScreenStates::Game);
    stage.frame();
    stage.request(ScreenStates::Title);
    stage.run_until_idle();

    assert_eq!(stage.controller().current(), ScreenStates::Game);
    assert!(stage.messages().contains(&TransitionMessage::Rejected {
        target: ScreenStates::Title,
        in_flight: ScreenStates::Game,
    }));

    // Once idle, the same request goes through.
    stage.request(ScreenStates::Title);
    stage.run_until_idle();
    assert_eq!(stage.controller().current(), ScreenStates::Title);
}

#[test]
fn missing_scene_leaves_blank_screen() {
    let mut stage = Stage::new(&StageConfig::new(), SceneCatalog::new(["Blank", "Title"]));
    stage.request(ScreenStates::Game);
    stage.run_until_idle();

    let controller = stage.controller();
    assert_eq!(controller.current(), ScreenStates::Blank);
    assert_eq!(controller.fade_opacity(), 0.0);
    let failure = controller.last_error().unwrap();
    assert_eq!(failure.target, ScreenStates::Game);
    assert_eq!(
        failure.error,
        LoadError::NotFound {
            path: "Game".to_string()
        }
    );

    assert_eq!(
        stage.changes(),
        vec![(ScreenStates::Title, ScreenStates::Blank)]
    );
    let messages = stage.messages();
    assert!(
        messages
            .iter()
            .any(|m| matches!(m, TransitionMessage::Failed { target: ScreenStates::Game, .. }))
    );
    assert!(
        !messages
            .iter()
            .any(|m| matches!(m, TransitionMessage::Completed { .. }))
    );
}

#[test]
fn slow_scene_times_out() {
    let mut config = StageConfig::new();
    config.load_timeout = 0.2;
    let mut stage = Stage::new(&config, all_scenes().with_latency("Game", 1_000));
    stage.request(ScreenStates::Game);
    stage.run_until_idle();

    assert_eq!(stage.controller().current(), ScreenStates::Blank);
    let failure = stage.controller().last_error().unwrap();
    assert!(matches!(failure.error, LoadError::TimedOut { ref scene, .. } if scene == "Game"));
}

#[test]
fn slow_scene_within_timeout_succeeds() {
    let mut config = StageConfig::new();
    config.load_timeout = 0.0;
    let mut stage = Stage::new(&config, all_scenes().with_latency("Game", 30));
    stage.request(ScreenStates::Game);
    stage.run_until_idle();

    assert_eq!(stage.controller().current(), ScreenStates::Game);
    assert!(stage.controller().last_error().is_none());
}

#[test]
fn game_systems_run_only_on_game_screen() {
    let mut stage = Stage::new(&StageConfig::new(), all_scenes());
    stage.frame();
    assert_eq!(stage.world.resource::<GameFrames>().0, 0);

    stage.request(ScreenStates::Game);
    stage.run_until_idle();
    let before = stage.world.resource::<GameFrames>().0;
    stage.frame();
    assert_eq!(stage.world.resource::<GameFrames>().0, before + 1);
}
