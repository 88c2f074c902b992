//! Sound, music and theme preferences.
//!
//! Preferences live outside any one save so they survive new games. A save
//! also records the music state and theme that were active when it was
//! written; loading it applies those.

use serde::{Deserialize, Serialize};

use crate::constants::themes::{THEME_SONG_1, THEME_SONG_2};

/// Background music track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    First,
    Second,
}

impl Theme {
    /// Track path, also the persisted identifier.
    pub fn path(self) -> &'static str {
        match self {
            Theme::First => THEME_SONG_1,
            Theme::Second => THEME_SONG_2,
        }
    }

    /// Parse a stored track path. Unknown paths fall back to the first theme.
    pub fn from_path(path: &str) -> Self {
        match path {
            THEME_SONG_2 => Theme::Second,
            THEME_SONG_1 => Theme::First,
            other => {
                log::warn!("Unknown theme {:?}, using {}", other, THEME_SONG_1);
                Theme::First
            }
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::First => Theme::Second,
            Theme::Second => Theme::First,
        }
    }
}

impl Serialize for Theme {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.path())
    }
}

impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let path = String::deserialize(deserializer)?;
        Ok(Theme::from_path(&path))
    }
}

/// Contents of `sound_preference.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundPreference {
    #[serde(default = "enabled")]
    pub sound_on: bool,
}

impl Default for SoundPreference {
    fn default() -> Self {
        Self { sound_on: true }
    }
}

/// Contents of `music_preference.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicPreference {
    #[serde(default = "enabled")]
    pub music_on: bool,
    #[serde(default)]
    pub current_theme: Theme,
}

fn enabled() -> bool {
    true
}

impl Default for MusicPreference {
    fn default() -> Self {
        Self {
            music_on: true,
            current_theme: Theme::First,
        }
    }
}

/// Both preference files together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    pub sound: SoundPreference,
    pub music: MusicPreference,
}

impl Preferences {
    pub fn sound_on(&self) -> bool {
        self.sound.sound_on
    }

    pub fn music_on(&self) -> bool {
        self.music.music_on
    }

    pub fn theme(&self) -> Theme {
        self.music.current_theme
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.sound.sound_on = !self.sound.sound_on;
        self.sound.sound_on
    }

    pub fn toggle_music(&mut self) -> bool {
        self.music.music_on = !self.music.music_on;
        self.music.music_on
    }

    pub fn switch_theme(&mut self) -> Theme {
        self.music.current_theme = self.music.current_theme.toggled();
        self.music.current_theme
    }
}
