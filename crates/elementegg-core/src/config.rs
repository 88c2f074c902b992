//! Engine configuration.

use std::path::{Path, PathBuf};

use elementegg_logic::constants::files::{
    COMPOUNDS_FILE, ELEMENTS_FILE, MUSIC_PREFERENCE_FILE, SAVES_FILE, SOUND_PREFERENCE_FILE,
};
use elementegg_logic::constants::timing::AUTOSAVE_INTERVAL_SECS;
use elementegg_logic::slots::SlotConfig;

/// Where the engine reads and writes, and how it runs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub elements_path: PathBuf,
    pub compounds_path: PathBuf,
    pub saves_path: PathBuf,
    pub sound_pref_path: PathBuf,
    pub music_pref_path: PathBuf,
    /// Seconds of engine time between autosaves.
    pub autosave_interval_secs: f32,
    /// Fixed RNG seed for reproducible runs; entropy when `None`.
    pub seed: Option<u64>,
    pub slots: SlotConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            elements_path: PathBuf::from(ELEMENTS_FILE),
            compounds_path: PathBuf::from(COMPOUNDS_FILE),
            saves_path: PathBuf::from(SAVES_FILE),
            sound_pref_path: PathBuf::from(SOUND_PREFERENCE_FILE),
            music_pref_path: PathBuf::from(MUSIC_PREFERENCE_FILE),
            autosave_interval_secs: AUTOSAVE_INTERVAL_SECS,
            seed: None,
            slots: SlotConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Default configuration with every writable file placed in `dir`.
    /// Catalog paths are left alone.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            saves_path: dir.join(SAVES_FILE),
            sound_pref_path: dir.join(SOUND_PREFERENCE_FILE),
            music_pref_path: dir.join(MUSIC_PREFERENCE_FILE),
            ..Default::default()
        }
    }

    pub fn with_assets(mut self, data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        self.elements_path = data_dir.join("elements.json");
        self.compounds_path = data_dir.join("compounds.json");
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
