use bevy_ecs::message::Message;

use crate::error::LoadError;
use crate::resources::volume::SoundCategory;

/// Commands sent *to* the audio thread
#[derive(Message, Debug, Clone, PartialEq)]
pub enum AudioCmd {
    LoadMusic { key: String },
    PlayMusic { key: String },
    StopMusic,
    PauseMusic,
    ResumeMusic,
    UnloadAllMusic,
    LoadFx { key: String },
    /// `None` plays the default effect.
    PlayFx { key: Option<String> },
    UnloadAllFx,
    SetVolume { category: SoundCategory, value: f32 },
    Shutdown,
}

/// Events sent *back* from the audio thread
#[derive(Message, Debug, Clone, PartialEq)]
pub enum AudioMessage {
    MusicLoaded { key: String },
    MusicLoadFailed { key: String, error: LoadError },
    MusicPlayStarted { key: String },
    MusicStopped,
    MusicPaused,
    MusicResumed,
    MusicUnloadedAll,
    FxLoaded { key: String },
    FxLoadFailed { key: String, error: LoadError },
    FxPlayStarted { key: String, channel: usize },
    FxUnloadedAll,
    /// A cache entry was dropped to stay within capacity.
    Evicted { category: SoundCategory, key: String },
    VolumeChanged { category: SoundCategory, value: f32 },
}
