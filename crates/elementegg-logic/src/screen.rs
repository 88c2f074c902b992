//! Screens, input events and the commands the session hands back.
//!
//! The presentation layer resolves pointer and keyboard input into
//! [`InputEvent`]s. The session answers with [`Command`]s: persistence
//! requests for the engine and cues (sounds, music, banners) for whatever
//! draws and plays the game.

use serde::{Deserialize, Serialize};

use crate::prefs::Theme;

/// The active screen. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    Title,
    SavedGames,
    ElementSelection,
    MainGame,
    ElementPurchase,
    Feeding,
    Lab,
    SlotMachine,
}

impl Screen {
    /// Whether a game is in progress on this screen.
    pub fn in_game(self) -> bool {
        !matches!(self, Screen::Title | Screen::SavedGames)
    }

    pub fn label(self) -> &'static str {
        match self {
            Screen::Title => "title",
            Screen::SavedGames => "saved games",
            Screen::ElementSelection => "element selection",
            Screen::MainGame => "main game",
            Screen::ElementPurchase => "element purchase",
            Screen::Feeding => "feeding",
            Screen::Lab => "lab",
            Screen::SlotMachine => "slot machine",
        }
    }
}

/// Main-game menu buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MenuButton {
    Pick,
    Feed,
    Lab,
    Slots,
}

/// Resolved player input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    // Title / saved games
    Start,
    OpenSave(String),
    NewGame,
    RequestDelete(String),
    ConfirmDelete,
    CancelDelete,

    // Element selection, purchase and feeding
    ToggleElement(String),
    AdjustPurchase { symbol: String, delta: i32 },
    SetPurchase { symbol: String, fraction: f32 },
    AdjustFeed { symbol: String, delta: i32 },
    SetFeed { symbol: String, fraction: f32 },

    // Main game
    Menu(MenuButton),
    RedeemOre,

    // Lab
    LabAdd(String),
    LabRemove(usize),
    /// Remove the first bench slot holding this element.
    LabRemoveElement(String),
    Combine,

    // Slot machine
    Spin,

    Confirm,
    Back,

    // Global keys
    ToggleMusic,
    SwitchTheme,
    ToggleSound,
}

/// Sound effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sound {
    Pick,
    Feed,
    Evolve,
    Spin,
    Win,
}

impl Sound {
    pub fn path(self) -> &'static str {
        match self {
            Sound::Pick => "./SOUNDS/play.mp3",
            Sound::Feed => "./SOUNDS/feed.mp3",
            Sound::Evolve => "./SOUNDS/evolve.mp3",
            Sound::Spin => "./SOUNDS/spin.mp3",
            Sound::Win => "./SOUNDS/win.mp3",
        }
    }
}

/// Background music control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MusicCommand {
    Pause,
    Resume,
    /// Load and loop a theme, starting paused when music is off.
    Play { theme: Theme, paused: bool },
}

/// Output of the session for the engine or presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    PlaySound(Sound),
    Music(MusicCommand),
    ShowWinBanner { payout: u32, millis: u64 },
    /// Save under the given name, or the session name when `None`.
    SaveGame(Option<String>),
    LoadGame(String),
    DeleteGame(String),
    /// Write both preference files.
    SavePreferences,
}

impl Command {
    /// Commands the engine executes itself rather than forwarding.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            Command::SaveGame(_)
                | Command::LoadGame(_)
                | Command::DeleteGame(_)
                | Command::SavePreferences
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_screen_is_title() {
        assert_eq!(Screen::default(), Screen::Title);
    }

    #[test]
    fn test_in_game_screens() {
        assert!(!Screen::Title.in_game());
        assert!(!Screen::SavedGames.in_game());
        assert!(Screen::ElementSelection.in_game());
        assert!(Screen::SlotMachine.in_game());
    }

    #[test]
    fn test_persistence_commands() {
        assert!(Command::SaveGame(None).is_persistence());
        assert!(Command::DeleteGame("a".into()).is_persistence());
        assert!(Command::SavePreferences.is_persistence());
        assert!(!Command::PlaySound(Sound::Win).is_persistence());
        assert!(!Command::ShowWinBanner {
            payout: 100,
            millis: 2000
        }
        .is_persistence());
    }
}
