//! Save registry: every saved game in one JSON file.
//!
//! The file is a JSON object mapping save name to [`SaveRecord`]. Each write
//! rewrites the whole registry through a temp file and a rename. A missing
//! file reads as an empty registry; a corrupt one is an error and is never
//! overwritten.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use elementegg_logic::collection::Quantities;
use elementegg_logic::prefs::{MusicPreference, Theme};
use elementegg_logic::progression::Progression;
use elementegg_logic::session::GameSnapshot;

/// One saved game as stored on disk.
///
/// The optional fields were added after the first release; older saves
/// load with tokens at zero, no feeding history and the current music
/// preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub ore_chunks: u32,
    pub selected_elements: Vec<String>,
    pub element_quantities: Quantities,
    pub egg_level: u32,
    pub growth_level: u32,
    #[serde(default)]
    pub tokens: u32,
    #[serde(default)]
    pub lifetime_fed: Option<BTreeMap<String, u64>>,
    #[serde(default)]
    pub music_on: Option<bool>,
    #[serde(default)]
    pub current_theme: Option<Theme>,
}

impl SaveRecord {
    pub fn from_snapshot(snapshot: &GameSnapshot) -> Self {
        Self {
            ore_chunks: snapshot.progression.ore_chunks,
            selected_elements: snapshot.selected.clone(),
            element_quantities: snapshot.inventory.clone(),
            egg_level: snapshot.progression.egg_level,
            growth_level: snapshot.progression.growth_level,
            tokens: snapshot.progression.tokens,
            lifetime_fed: Some(snapshot.lifetime_fed.clone()),
            music_on: Some(snapshot.music.music_on),
            current_theme: Some(snapshot.music.current_theme),
        }
    }

    /// Convert back to session state, filling absent fields from `music`.
    pub fn into_snapshot(self, music: MusicPreference) -> GameSnapshot {
        GameSnapshot {
            progression: Progression {
                egg_level: self.egg_level.max(1),
                growth_level: self.growth_level,
                ore_chunks: self.ore_chunks,
                tokens: self.tokens,
            },
            selected: self.selected_elements,
            inventory: self.element_quantities,
            lifetime_fed: self.lifetime_fed.unwrap_or_default(),
            music: MusicPreference {
                music_on: self.music_on.unwrap_or(music.music_on),
                current_theme: self.current_theme.unwrap_or(music.current_theme),
            },
        }
    }
}

/// All saves by name.
pub type SaveRegistry = BTreeMap<String, SaveRecord>;

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No saved game named {0:?}")]
    NotFound(String),
}

/// Name for a save created at `at`: `game_YYYYMMDD_HHMMSS`.
pub fn save_name_at(at: DateTime<Local>) -> String {
    at.format("game_%Y%m%d_%H%M%S").to_string()
}

/// Name for a save created now.
pub fn new_save_name() -> String {
    save_name_at(Local::now())
}

/// File-backed save registry.
#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole registry. A missing file is an empty registry.
    pub fn load_all(&self) -> Result<SaveRegistry, SaveError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(SaveRegistry::new()),
            Err(e) => return Err(e.into()),
        };
        if json.trim().is_empty() {
            return Ok(SaveRegistry::new());
        }
        Ok(serde_json::from_str(&json)?)
    }

    fn write_all(&self, registry: &SaveRegistry) -> Result<(), SaveError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(registry)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Insert or overwrite `name`.
    pub fn save(&self, name: &str, record: SaveRecord) -> Result<(), SaveError> {
        let mut registry = self.load_all()?;
        registry.insert(name.to_string(), record);
        self.write_all(&registry)?;
        log::info!("Saved game {} to {}", name, self.path.display());
        Ok(())
    }

    pub fn load(&self, name: &str) -> Result<SaveRecord, SaveError> {
        let mut registry = self.load_all()?;
        let record = registry
            .remove(name)
            .ok_or_else(|| SaveError::NotFound(name.to_string()))?;
        log::info!("Loaded game {}", name);
        Ok(record)
    }

    pub fn delete(&self, name: &str) -> Result<(), SaveError> {
        let mut registry = self.load_all()?;
        if registry.remove(name).is_none() {
            return Err(SaveError::NotFound(name.to_string()));
        }
        self.write_all(&registry)?;
        log::info!("Deleted game {}", name);
        Ok(())
    }

    pub fn exists(&self, name: &str) -> Result<bool, SaveError> {
        Ok(self.load_all()?.contains_key(name))
    }

    /// Save names, newest timestamp first (reverse lexicographic).
    pub fn list(&self) -> Result<Vec<String>, SaveError> {
        Ok(self.load_all()?.into_keys().rev().collect())
    }
}
