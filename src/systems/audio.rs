//! Audio system implementation backed by a dedicated thread.
//!
//! This module hosts the background audio thread and the systems that bridge
//! it with the ECS world:
//! - [`audio_thread`] runs on its own OS thread, exclusively owns the
//!   [`SoundManager`] (caches, channel pool, loader and output device), and
//!   processes [`AudioCmd`] messages, emitting [`AudioMessage`] responses.
//! - [`forward_audio_cmds`] sends ECS-written commands over the channel.
//! - [`poll_audio_messages`] non-blockingly drains the audio thread's event
//!   receiver into Bevy ECS' message queue each frame.
//! - [`track_audio_status`] folds those messages into [`AudioStatus`].
//!
//! Every cache and channel mutation happens on the audio thread, one command
//! at a time, so none of those structures needs a lock.
//!
//! See also: [`crate::events::audio`] and [`crate::resources::audio`].

use std::time::{Duration, Instant};

use crate::events::audio::{AudioCmd, AudioMessage};
use crate::resources::audio::{AudioBridge, AudioStatus};
use crate::resources::audiocache::AudioResourceEntry;
use crate::resources::output::ChannelId;
use crate::resources::soundmanager::{DEFAULT_EFFECT, SoundManager};
use crate::resources::volume::SoundCategory;
use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

/// How long the thread waits for a command before pumping the device clock.
const IDLE_WAIT: Duration = Duration::from_millis(10);

/// Drain any pending events from the audio thread and enqueue them into the
/// ECS [`Messages<AudioMessage>`] mailbox.
pub fn poll_audio_messages(bridge: Res<AudioBridge>, mut writer: MessageWriter<AudioMessage>) {
    writer.write_batch(bridge.rx_msg.try_iter());
}

/// Advance the ECS message queue for [`AudioMessage`].
///
/// Run this after [`poll_audio_messages`] in your schedule.
pub fn update_bevy_audio_messages(mut events: ResMut<Messages<AudioMessage>>) {
    events.update();
}

/// Forward ECS AudioCmd messages to the audio thread via the AudioBridge sender.
pub fn forward_audio_cmds(bridge: Res<AudioBridge>, mut reader: MessageReader<AudioCmd>) {
    for cmd in reader.read() {
        // ignore send error on shutdown
        let _ = bridge.tx_cmd.send(cmd.clone());
    }
}

/// Advance the ECS message queue for AudioCmd so same-frame readers can observe writes.
pub fn update_bevy_audio_cmds(mut msgs: ResMut<Messages<AudioCmd>>) {
    msgs.update();
}

/// Keep [`AudioStatus`] in sync with what the audio thread reports.
pub fn track_audio_status(mut reader: MessageReader<AudioMessage>, mut status: ResMut<AudioStatus>) {
    for msg in reader.read() {
        apply_audio_message(&mut status, msg);
    }
}

/// Fold one message into the status snapshot.
pub fn apply_audio_message(status: &mut AudioStatus, msg: &AudioMessage) {
    match msg {
        AudioMessage::MusicPlayStarted { key } => {
            status.music_playing = true;
            status.current_music = Some(key.clone());
        }
        AudioMessage::MusicResumed => status.music_playing = true,
        AudioMessage::MusicStopped | AudioMessage::MusicPaused => status.music_playing = false,
        AudioMessage::MusicUnloadedAll => {
            status.music_playing = false;
            status.current_music = None;
        }
        AudioMessage::MusicLoadFailed { key, error } | AudioMessage::FxLoadFailed { key, error } => {
            status.last_error = Some(format!("{}: {}", key, error));
        }
        AudioMessage::VolumeChanged { category, value } => {
            status.volumes.set(*category, *value);
        }
        AudioMessage::MusicLoaded { .. }
        | AudioMessage::FxLoaded { .. }
        | AudioMessage::FxPlayStarted { .. }
        | AudioMessage::FxUnloadedAll
        | AudioMessage::Evicted { .. } => {}
    }
}

fn report_eviction(
    tx_evt: &Sender<AudioMessage>,
    category: SoundCategory,
    evicted: Option<AudioResourceEntry>,
) {
    if let Some(entry) = evicted {
        let _ = tx_evt.send(AudioMessage::Evicted {
            category,
            key: entry.key,
        });
    }
}

/// Apply one command to the manager, reporting results on `tx_evt`.
///
/// Returns `false` for [`AudioCmd::Shutdown`].
pub fn handle_audio_cmd(
    manager: &mut SoundManager,
    cmd: AudioCmd,
    tx_evt: &Sender<AudioMessage>,
) -> bool {
    match cmd {
        AudioCmd::LoadMusic { key } => match manager.load_music(&key) {
            Ok(evicted) => {
                log::info!("[audio] loaded music '{}'", key);
                report_eviction(tx_evt, SoundCategory::Music, evicted);
                let _ = tx_evt.send(AudioMessage::MusicLoaded { key });
            }
            Err(error) => {
                log::warn!("[audio] music load failed key='{}' error='{}'", key, error);
                let _ = tx_evt.send(AudioMessage::MusicLoadFailed { key, error });
            }
        },
        AudioCmd::PlayMusic { key } => match manager.play_music(&key) {
            Ok(played) => {
                report_eviction(tx_evt, SoundCategory::Music, played.evicted);
                if played.outcome {
                    let _ = tx_evt.send(AudioMessage::MusicPlayStarted { key });
                }
            }
            Err(error) => {
                log::warn!("[audio] music play failed key='{}' error='{}'", key, error);
                let _ = tx_evt.send(AudioMessage::MusicLoadFailed { key, error });
            }
        },
        AudioCmd::StopMusic => {
            manager.stop_music();
            let _ = tx_evt.send(AudioMessage::MusicStopped);
        }
        AudioCmd::PauseMusic => {
            manager.pause_music();
            let _ = tx_evt.send(AudioMessage::MusicPaused);
        }
        AudioCmd::ResumeMusic => {
            manager.resume_music();
            if manager.is_music_playing() {
                let _ = tx_evt.send(AudioMessage::MusicResumed);
            }
        }
        AudioCmd::UnloadAllMusic => {
            log::info!("[audio] unload all music");
            manager.unload_all_music();
            let _ = tx_evt.send(AudioMessage::MusicUnloadedAll);
        }
        AudioCmd::LoadFx { key } => match manager.load_effect(&key) {
            Ok(evicted) => {
                log::debug!("[audio] fx loaded '{}'", key);
                report_eviction(tx_evt, SoundCategory::Effects, evicted);
                let _ = tx_evt.send(AudioMessage::FxLoaded { key });
            }
            Err(error) => {
                log::warn!("[audio] fx load failed key='{}' error='{}'", key, error);
                let _ = tx_evt.send(AudioMessage::FxLoadFailed { key, error });
            }
        },
        AudioCmd::PlayFx { key } => {
            let key = key.unwrap_or_else(|| DEFAULT_EFFECT.to_string());
            match manager.play_effect(&key) {
                Ok(played) => {
                    report_eviction(tx_evt, SoundCategory::Effects, played.evicted);
                    if let ChannelId::Effect(channel) = played.outcome.channel() {
                        let _ = tx_evt.send(AudioMessage::FxPlayStarted { key, channel });
                    }
                }
                Err(error) => {
                    log::warn!("[audio] fx play failed key='{}' error='{}'", key, error);
                    let _ = tx_evt.send(AudioMessage::FxLoadFailed { key, error });
                }
            }
        }
        AudioCmd::UnloadAllFx => {
            log::info!("[audio] fx unload all");
            manager.unload_all_effects();
            let _ = tx_evt.send(AudioMessage::FxUnloadedAll);
        }
        AudioCmd::SetVolume { category, value } => {
            let value = manager.set_volume(category, value);
            log::debug!("[audio] volume {:?} = {}", category, value);
            let _ = tx_evt.send(AudioMessage::VolumeChanged { category, value });
        }
        AudioCmd::Shutdown => {
            log::info!("[audio] shutdown requested");
            return false;
        }
    }
    true
}

/// Entry point of the dedicated audio thread.
///
/// Responsibilities:
/// - Own the [`SoundManager`] for the life of the thread.
/// - React to [`AudioCmd`] inputs in arrival order.
/// - Emit [`AudioMessage`] outputs for state changes.
/// - Advance the output device clock between commands so one-shot effects
///   finish and their channels become idle.
///
/// This function blocks until it receives [`AudioCmd::Shutdown`] or every
/// command sender is dropped, then stops all channels and exits.
pub fn audio_thread(mut manager: SoundManager, rx_cmd: Receiver<AudioCmd>, tx_evt: Sender<AudioMessage>) {
    log::info!(
        "[audio] thread starting (id={:?})",
        std::thread::current().id()
    );

    let mut last_tick = Instant::now();
    'run: loop {
        // 1) Wait briefly for the next command, then drain the rest.
        match rx_cmd.recv_timeout(IDLE_WAIT) {
            Ok(cmd) => {
                if !handle_audio_cmd(&mut manager, cmd, &tx_evt) {
                    break 'run;
                }
                for cmd in rx_cmd.try_iter() {
                    if !handle_audio_cmd(&mut manager, cmd, &tx_evt) {
                        break 'run;
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                log::warn!("[audio] command channel closed");
                break 'run;
            }
        }

        // 2) Pump the device clock.
        let now = Instant::now();
        manager.update(now.duration_since(last_tick).as_secs_f32());
        last_tick = now;
    } // 'run

    manager.stop_all();
    manager.unload_all_music();
    manager.unload_all_effects();
    let _ = tx_evt.send(AudioMessage::MusicUnloadedAll);
    let _ = tx_evt.send(AudioMessage::FxUnloadedAll);

    log::info!(
        "[audio] thread exiting (id={:?})",
        std::thread::current().id()
    );
}
