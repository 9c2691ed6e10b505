//! Discrete application screens.
//!
//! Exactly one [`ScreenStates`] value is current at any time. Transitions
//! always pass through [`ScreenStates::Blank`] while the previous screen is
//! unloaded; see [`crate::resources::transition`].

use std::fmt;
use std::str::FromStr;

/// Top-level screens the application can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenStates {
    /// Intermediate, empty screen shown while content is swapped.
    Blank,
    #[default]
    Title,
    Game,
}

impl ScreenStates {
    pub const ALL: [ScreenStates; 3] = [ScreenStates::Blank, ScreenStates::Title, ScreenStates::Game];

    /// Name of the scene handed to the scene loader for this screen.
    pub fn scene_name(self) -> &'static str {
        match self {
            ScreenStates::Blank => "Blank",
            ScreenStates::Title => "Title",
            ScreenStates::Game => "Game",
        }
    }
}

impl fmt::Display for ScreenStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scene_name())
    }
}

impl FromStr for ScreenStates {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ScreenStates::ALL
            .into_iter()
            .find(|state| state.scene_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown screen '{}'", s))
    }
}
