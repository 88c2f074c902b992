//! Preference files.
//!
//! Reading never fails: a missing or unreadable file yields the default
//! (sound on, music on, first theme). Writing reports errors to the caller.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use elementegg_logic::prefs::{MusicPreference, Preferences, SoundPreference};

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("failed to write {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Locations of the two preference files.
#[derive(Debug, Clone)]
pub struct PrefsStore {
    sound_path: PathBuf,
    music_path: PathBuf,
}

fn read_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return T::default(),
        Err(e) => {
            log::warn!("Could not read {}: {}, using defaults", path.display(), e);
            return T::default();
        }
    };
    serde_json::from_str(&json).unwrap_or_else(|e| {
        log::warn!("Corrupt preference file {}: {}, using defaults", path.display(), e);
        T::default()
    })
}

fn write<T: Serialize>(path: &Path, value: &T) -> Result<(), PrefsError> {
    let json = serde_json::to_string(value)?;
    fs::write(path, json).map_err(|source| PrefsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl PrefsStore {
    pub fn new(sound_path: impl Into<PathBuf>, music_path: impl Into<PathBuf>) -> Self {
        Self {
            sound_path: sound_path.into(),
            music_path: music_path.into(),
        }
    }

    pub fn load(&self) -> Preferences {
        let prefs = Preferences {
            sound: read_or_default::<SoundPreference>(&self.sound_path),
            music: read_or_default::<MusicPreference>(&self.music_path),
        };
        log::debug!("Preferences: {:?}", prefs);
        prefs
    }

    pub fn save(&self, prefs: &Preferences) -> Result<(), PrefsError> {
        write(&self.sound_path, &prefs.sound)?;
        write(&self.music_path, &prefs.music)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elementegg_logic::prefs::Theme;

    fn store(dir: &Path) -> PrefsStore {
        PrefsStore::new(
            dir.join("sound_preference.json"),
            dir.join("music_preference.json"),
        )
    }

    #[test]
    fn test_missing_files_give_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store(dir.path()).load(), Preferences::default());
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let mut prefs = Preferences::default();
        prefs.toggle_sound();
        prefs.switch_theme();
        store.save(&prefs).unwrap();

        let loaded = store.load();
        assert_eq!(loaded, prefs);
        assert!(!loaded.sound_on());
        assert_eq!(loaded.theme(), Theme::Second);

        let raw = fs::read_to_string(dir.path().join("sound_preference.json")).unwrap();
        assert_eq!(raw, r#"{"sound_on":false}"#);
    }

    #[test]
    fn test_corrupt_files_give_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("sound_preference.json"), "oops").unwrap();
        fs::write(dir.path().join("music_preference.json"), r#"{"music_on": 3}"#).unwrap();
        assert_eq!(store(dir.path()).load(), Preferences::default());
    }

    #[test]
    fn test_music_off_survives_missing_theme() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("music_preference.json"), r#"{"music_on": false}"#).unwrap();
        let prefs = store(dir.path()).load();
        assert!(!prefs.music_on());
        assert_eq!(prefs.theme(), Theme::First);
        assert!(prefs.sound_on());
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = PrefsStore::new(
            dir.path().join("missing_dir").join("sound.json"),
            dir.path().join("music.json"),
        );
        assert!(matches!(
            store.save(&Preferences::default()),
            Err(PrefsError::Io { .. })
        ));
    }
}
