//! Game engine - main entry point for running the game

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use elementegg_logic::catalog::Catalog;
use elementegg_logic::screen::{Command, InputEvent};
use elementegg_logic::session::{handle_event, GameSession};

use crate::assets::{load_catalog, AssetError};
use crate::config::EngineConfig;
use crate::persistence::{new_save_name, SaveError, SaveRecord, SaveStore};
use crate::prefs::{PrefsError, PrefsStore};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error(transparent)]
    Prefs(#[from] PrefsError),
}

/// Main game engine
pub struct GameEngine {
    config: EngineConfig,
    catalog: Catalog,
    /// All mutable game state
    pub session: GameSession,
    store: SaveStore,
    prefs_store: PrefsStore,
    rng: StdRng,
    /// Seconds of in-game time since the last autosave
    autosave_timer: f32,
    frame: u64,
    /// Presentation commands waiting for the front end
    outbox: Vec<Command>,
}

impl GameEngine {
    /// Load the catalogs and preferences named by `config`.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let catalog = load_catalog(&config.elements_path, &config.compounds_path, &mut rng)?;
        Ok(Self::with_catalog(config, catalog, rng))
    }

    /// Build around an already-loaded catalog.
    pub fn with_catalog(config: EngineConfig, catalog: Catalog, rng: StdRng) -> Self {
        let prefs_store = PrefsStore::new(&config.sound_pref_path, &config.music_pref_path);
        let prefs = prefs_store.load();
        let session = GameSession::new(prefs, config.slots.clone());
        let outbox = vec![session.start_music()];
        Self {
            store: SaveStore::new(&config.saves_path),
            prefs_store,
            catalog,
            session,
            rng,
            autosave_timer: 0.0,
            frame: 0,
            outbox,
            config,
        }
    }

    /// Route one input event and carry out the commands it produces.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<(), EngineError> {
        let commands = handle_event(&mut self.session, &self.catalog, event, &mut self.rng);
        self.execute(commands)
    }

    fn execute(&mut self, commands: Vec<Command>) -> Result<(), EngineError> {
        for command in commands {
            match command {
                Command::SaveGame(name) => {
                    self.save_game(name)?;
                }
                Command::LoadGame(name) => {
                    self.load_game(&name)?;
                }
                Command::DeleteGame(name) => {
                    self.delete_game(&name)?;
                }
                Command::SavePreferences => self.prefs_store.save(&self.session.prefs)?,
                other => self.outbox.push(other),
            }
        }
        Ok(())
    }

    /// Advance one frame by `delta_seconds`: tick the slot machine and the
    /// autosave timer.
    pub fn update(&mut self, delta_seconds: f32) -> Result<(), EngineError> {
        self.frame += 1;
        let commands = self.session.tick();
        self.execute(commands)?;

        if !self.session.screen.in_game() {
            return Ok(());
        }
        self.autosave_timer += delta_seconds;
        if self.autosave_timer >= self.config.autosave_interval_secs {
            self.autosave_timer -= self.config.autosave_interval_secs;
            let name = self.save_game(None)?;
            log::info!("Autosaved {} at frame {}", name, self.frame);
        }
        Ok(())
    }

    /// Save under `name`, or the session name, or a fresh timestamped name
    /// that becomes the session name. Returns the name used.
    pub fn save_game(&mut self, name: Option<String>) -> Result<String, EngineError> {
        let name = match name.or_else(|| self.session.session_name.clone()) {
            Some(name) => name,
            None => {
                let name = new_save_name();
                self.session.session_name = Some(name.clone());
                name
            }
        };
        let record = SaveRecord::from_snapshot(&self.session.snapshot());
        self.store.save(&name, record)?;
        Ok(name)
    }

    /// Load a save into the session and enter the main game. Returns
    /// `false` when no save has that name.
    pub fn load_game(&mut self, name: &str) -> Result<bool, EngineError> {
        let record = match self.store.load(name) {
            Ok(record) => record,
            Err(SaveError::NotFound(_)) => {
                log::warn!("Cannot load {}: no such save", name);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };
        let snapshot = record.into_snapshot(self.session.prefs.music);
        let commands = self.session.restore(name, snapshot, &self.catalog);
        self.autosave_timer = 0.0;
        self.execute(commands)?;
        Ok(true)
    }

    /// Delete a save. Returns `false` when no save has that name.
    pub fn delete_game(&mut self, name: &str) -> Result<bool, EngineError> {
        match self.store.delete(name) {
            Ok(()) => Ok(true),
            Err(SaveError::NotFound(_)) => {
                log::warn!("Cannot delete {}: no such save", name);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Save names, newest first.
    pub fn saved_games(&self) -> Result<Vec<String>, SaveError> {
        self.store.list()
    }

    /// Take the sounds, music changes and banners issued since the last call.
    pub fn drain_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.outbox)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &SaveStore {
        &self.store
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use elementegg_logic::constants::slots::MAX_SPIN_FRAMES;
    use elementegg_logic::prefs::Theme;
    use elementegg_logic::screen::{MenuButton, MusicCommand, Screen};
    use std::path::Path;

    fn setup(dir: &Path) -> GameEngine {
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
        let config = EngineConfig::in_dir(dir).with_assets(data).with_seed(42);
        GameEngine::new(config).unwrap()
    }

    fn start(engine: &mut GameEngine) {
        for event in [InputEvent::Start, InputEvent::NewGame] {
            engine.handle_input(event).unwrap();
        }
        for symbol in ["H", "C", "O"] {
            engine
                .handle_input(InputEvent::ToggleElement(symbol.into()))
                .unwrap();
        }
        engine.handle_input(InputEvent::Confirm).unwrap();
    }

    #[test]
    fn test_engine_creation() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = setup(dir.path());
        assert_eq!(engine.session.screen, Screen::Title);
        assert_eq!(engine.frame(), 0);
        assert_eq!(
            engine.drain_commands(),
            vec![Command::Music(MusicCommand::Play {
                theme: Theme::First,
                paused: false
            })]
        );
        assert!(engine.drain_commands().is_empty());
    }

    #[test]
    fn test_new_game_is_saved_under_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = setup(dir.path());
        start(&mut engine);
        assert_eq!(engine.session.screen, Screen::MainGame);

        let name = engine.session.session_name.clone().unwrap();
        assert!(name.starts_with("game_"));
        assert_eq!(name.len(), "game_YYYYMMDD_HHMMSS".len());
        assert_eq!(engine.saved_games().unwrap(), vec![name]);
    }

    #[test]
    fn test_save_mutate_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = setup(dir.path());
        start(&mut engine);
        engine.session.progression.ore_chunks = 30;
        engine.session.purchase("O", 12);
        engine.session.confirm_purchase();
        engine.save_game(Some("s1".into())).unwrap();
        let saved = engine.session.snapshot();

        engine.session.progression.ore_chunks = 0;
        engine.session.progression.tokens = 50;
        engine.session.collection.toggle("O");
        engine.session.screen = Screen::SavedGames;

        assert!(engine.load_game("s1").unwrap());
        assert_eq!(engine.session.snapshot(), saved);
        assert_eq!(engine.session.session_name.as_deref(), Some("s1"));
        assert_eq!(engine.session.screen, Screen::MainGame);
    }

    #[test]
    fn test_open_unknown_save_stays_put() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = setup(dir.path());
        engine.handle_input(InputEvent::Start).unwrap();
        engine
            .handle_input(InputEvent::OpenSave("missing".into()))
            .unwrap();
        assert_eq!(engine.session.screen, Screen::SavedGames);
        assert!(!engine.delete_game("missing").unwrap());
    }

    #[test]
    fn test_delete_through_dialog() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = setup(dir.path());
        engine.save_game(Some("keep".into())).unwrap();
        engine.save_game(Some("drop".into())).unwrap();
        engine.handle_input(InputEvent::Start).unwrap();
        engine
            .handle_input(InputEvent::RequestDelete("drop".into()))
            .unwrap();
        engine.handle_input(InputEvent::ConfirmDelete).unwrap();
        assert_eq!(engine.saved_games().unwrap(), vec!["keep".to_string()]);
    }

    #[test]
    fn test_autosave_only_in_game() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = setup(dir.path());
        for _ in 0..3 {
            engine.update(30.0).unwrap();
        }
        assert!(engine.saved_games().unwrap().is_empty());

        start(&mut engine);
        engine.session.progression.ore_chunks = 77;
        engine.update(59.0).unwrap();
        let name = engine.session.session_name.clone().unwrap();
        assert_eq!(engine.store().load(&name).unwrap().ore_chunks, 0);
        engine.update(1.0).unwrap();
        assert_eq!(engine.store().load(&name).unwrap().ore_chunks, 77);
    }

    #[test]
    fn test_slot_win_reaches_outbox() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = setup(dir.path());
        start(&mut engine);
        engine.drain_commands();

        engine.session.progression.tokens = 100;
        engine
            .handle_input(InputEvent::Menu(MenuButton::Slots))
            .unwrap();
        let mut wins = 0;
        while engine.session.progression.tokens > 0 {
            engine.handle_input(InputEvent::Spin).unwrap();
            for _ in 0..MAX_SPIN_FRAMES {
                engine.update(1.0 / 30.0).unwrap();
            }
            wins += engine
                .drain_commands()
                .iter()
                .filter(|c| matches!(c, Command::ShowWinBanner { .. }))
                .count();
        }
        assert_eq!(engine.session.slots.spins(), 100);
        // Default strips line up on about one spin in nine.
        assert!(wins > 0);
    }

    #[test]
    fn test_preferences_written_on_toggle() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = setup(dir.path());
        engine.handle_input(InputEvent::ToggleSound).unwrap();
        engine.handle_input(InputEvent::SwitchTheme).unwrap();

        let reloaded = setup(dir.path());
        assert!(!reloaded.session.prefs.sound_on());
        assert_eq!(reloaded.session.prefs.theme(), Theme::Second);
    }
}
