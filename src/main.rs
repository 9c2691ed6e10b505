//! Stagehand demo entry point.
//!
//! Runs the scene transition controller and the audio thread headless:
//! - **bevy_ecs** world, schedule, messages and observers
//! - **configparser** INI settings (`config.ini`)
//! - a JSON sound manifest feeding the simulated audio device
//!
//! # Main Loop
//!
//! 1. Load and validate the configuration
//! 2. Build the world (controller, audio thread, observers) and schedule
//! 3. Each frame: advance the clock, request the next scripted screen when
//!    the controller is idle, run the schedule
//! 4. Clean up audio thread on exit
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --script game,title,game --realtime
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use stagehand::events::audio::AudioCmd;
use stagehand::events::transition::TransitionRequest;
use stagehand::game;
use stagehand::resources::audio::{AudioStatus, shutdown_audio};
use stagehand::resources::fade::{Easing, ScreenFade};
use stagehand::resources::sceneloader::SceneCatalog;
use stagehand::resources::screenstate::ScreenStates;
use stagehand::resources::stageconfig::StageConfig;
use stagehand::resources::transition::SceneTransitionController;
use stagehand::systems::time::update_world_time;

/// Headless scene transition and audio cache demo.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Maximum number of frames to simulate.
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Seconds per simulated frame.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Comma-separated screens to visit in order (blank, title, game).
    #[arg(long, value_delimiter = ',', default_values_t = [ScreenStates::Game, ScreenStates::Title])]
    script: Vec<ScreenStates>,

    /// Sleep `dt` between frames.
    #[arg(long)]
    realtime: bool,

    /// Write the effective configuration to `--config` and exit.
    #[arg(long)]
    write_config: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = StageConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        log::warn!("{}; using defaults", e);
    }

    // Early-exit: write config and quit (no world/audio needed)
    if cli.write_config {
        if let Err(e) = config.save_to_file() {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        println!("Config written to {}", config.config_path.display());
        return;
    }

    if let Err(e) = config.validate() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    // --------------- ECS world + resources ---------------
    let fader = ScreenFade::new().with_easing(Easing::QuadInOut);
    let scenes = SceneCatalog::new(ScreenStates::ALL.map(ScreenStates::scene_name));
    let mut world = game::build_world(&config, Box::new(fader), Box::new(scenes));

    let mut update = game::build_schedule();
    if let Err(e) = update.initialize(&mut world) {
        log::error!("Failed to initialize schedule: {}", e);
        shutdown_audio(&mut world);
        std::process::exit(1);
    }

    // The first screen is already showing.
    let first = world.resource::<SceneTransitionController>().current();
    world.write_message(AudioCmd::PlayMusic {
        key: first.scene_name().to_string(),
    });

    // --------------- Main loop ---------------
    let mut script = cli.script.into_iter();
    let mut next = script.next();
    for _ in 0..cli.frames {
        update_world_time(&mut world, cli.dt);

        if world.resource::<SceneTransitionController>().is_transitioning() {
            // wait for the current transition
        } else if let Some(target) = next.take() {
            world.write_message(TransitionRequest { target });
            next = script.next();
        } else {
            break;
        }

        update.run(&mut world);
        world.clear_trackers();

        if cli.realtime {
            std::thread::sleep(Duration::from_secs_f32(cli.dt.max(0.0)));
        }
    }

    // Give the audio thread a moment to report the last commands.
    std::thread::sleep(Duration::from_millis(50));
    update_world_time(&mut world, 0.0);
    update.run(&mut world);

    {
        let controller = world.resource::<SceneTransitionController>();
        log::info!("Final screen: {}", controller.current());
        if let Some(failure) = controller.last_error() {
            log::warn!("Last transition error: {:?}", failure);
        }
        log::info!("Audio: {:?}", world.resource::<AudioStatus>());
    }
    shutdown_audio(&mut world);
}
