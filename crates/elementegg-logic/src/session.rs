//! One play-through: every piece of mutable game state plus the event router.
//!
//! [`handle_event`] dispatches an [`InputEvent`] on the active [`Screen`],
//! mutates the session synchronously and returns the [`Command`]s that
//! follow from it. Screen changes take effect before the call returns.
//!
//! Persistence never happens here. Saving, loading and deleting are
//! requested through commands; the engine performs them and calls back
//! into [`GameSession::restore`] after a successful load.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::collection::{Collection, FeedReport, Quantities, SelectionChange};
use crate::constants::currency::SPIN_COST;
use crate::constants::timing::WIN_BANNER_MILLIS;
use crate::constants::ui::SAVED_GAMES_VISIBLE;
use crate::creature::CreatureTraits;
use crate::lab::{self, CombinationOutcome, LabBench};
use crate::prefs::{MusicPreference, Preferences};
use crate::progression::Progression;
use crate::screen::{Command, InputEvent, MenuButton, MusicCommand, Screen, Sound};
use crate::slots::{SlotConfig, SlotMachine, SpinOutcome};

/// The persisted part of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub progression: Progression,
    pub selected: Vec<String>,
    pub inventory: Quantities,
    pub lifetime_fed: BTreeMap<String, u64>,
    pub music: MusicPreference,
}

/// All state of the game in progress.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub screen: Screen,
    pub progression: Progression,
    pub collection: Collection,
    /// Set once, when the egg first reaches the hatch level.
    pub creature: Option<CreatureTraits>,
    pub bench: LabBench,
    pub last_result: Option<CombinationOutcome>,
    pub slots: SlotMachine,
    pub last_spin: Option<SpinOutcome>,
    /// Save name this session writes to; `None` until first saved or loaded.
    pub session_name: Option<String>,
    pub prefs: Preferences,
    /// Save awaiting delete confirmation on the saved-games screen.
    pub pending_delete: Option<String>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(Preferences::default(), SlotConfig::default())
    }
}

impl GameSession {
    pub fn new(prefs: Preferences, slot_config: SlotConfig) -> Self {
        Self {
            screen: Screen::Title,
            progression: Progression::default(),
            collection: Collection::default(),
            creature: None,
            bench: LabBench::default(),
            last_result: None,
            slots: SlotMachine::new(slot_config),
            last_spin: None,
            session_name: None,
            prefs,
            pending_delete: None,
        }
    }

    /// Music command to issue at startup or after a theme change.
    pub fn start_music(&self) -> Command {
        Command::Music(MusicCommand::Play {
            theme: self.prefs.theme(),
            paused: !self.prefs.music_on(),
        })
    }

    fn cue(&self, sound: Sound) -> Option<Command> {
        self.prefs.sound_on().then_some(Command::PlaySound(sound))
    }

    /// The saves shown on the saved-games screen, newest first.
    pub fn visible_saves(names: &[String]) -> &[String] {
        &names[..names.len().min(SAVED_GAMES_VISIBLE)]
    }

    // ── Lifecycle ──────────────────────────────────────────────────────

    /// Reset to a fresh game. Preferences are kept.
    pub fn new_game(&mut self) {
        let slot_config = self.slots.config().clone();
        *self = Self::new(self.prefs, slot_config);
        self.screen = Screen::ElementSelection;
        log::info!("Started a new game");
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            progression: self.progression.clone(),
            selected: self.collection.selected().map(str::to_string).collect(),
            inventory: self.collection.inventory().clone(),
            lifetime_fed: self.collection.lifetime_fed().clone(),
            music: self.prefs.music,
        }
    }

    /// Replace the game state with a loaded save and enter the main game.
    /// Selected symbols missing from the catalog are dropped.
    pub fn restore(&mut self, name: &str, snapshot: GameSnapshot, catalog: &Catalog) -> Vec<Command> {
        let selected: Vec<String> = snapshot
            .selected
            .into_iter()
            .filter(|symbol| {
                let known = catalog.contains(symbol);
                if !known {
                    log::warn!("Save {} selects unknown element {}, dropping it", name, symbol);
                }
                known
            })
            .collect();

        let slot_config = self.slots.config().clone();
        let mut prefs = self.prefs;
        prefs.music = snapshot.music;
        *self = Self::new(prefs, slot_config);

        self.progression = snapshot.progression;
        self.progression.normalize_growth();
        self.collection = Collection::restore(selected, snapshot.inventory, snapshot.lifetime_fed);
        self.session_name = Some(name.to_string());
        self.maybe_hatch();
        self.screen = Screen::MainGame;

        vec![self.start_music()]
    }

    /// Derive the creature the first time the egg reaches the hatch level.
    /// Returns `true` only on the call that hatches it.
    pub fn maybe_hatch(&mut self) -> bool {
        if self.creature.is_some() || !self.progression.ready_to_hatch() {
            return false;
        }
        let traits = CreatureTraits::derive(&self.collection);
        log::info!(
            "Egg hatched at level {}: size {}, parts {:?}",
            self.progression.egg_level,
            traits.size,
            traits.body_parts
        );
        self.creature = Some(traits);
        true
    }

    // ── Actions ────────────────────────────────────────────────────────

    pub fn purchase(&mut self, symbol: &str, qty: u32) -> bool {
        self.collection.purchase(&mut self.progression, symbol, qty)
    }

    pub fn confirm_purchase(&mut self) -> u32 {
        self.collection.confirm_purchase()
    }

    /// Feed explicit amounts, then run the hatch check.
    pub fn feed(&mut self, amounts: &Quantities) -> Option<FeedReport> {
        let report = self.collection.feed(&mut self.progression, amounts)?;
        self.maybe_hatch();
        Some(report)
    }

    pub fn redeem_ore_for_elements(&mut self) -> u32 {
        self.collection.redeem_ore(&mut self.progression)
    }

    /// Combine the bench, pay the session reward and clear the bench.
    pub fn combine<R: Rng + ?Sized>(&mut self, catalog: &Catalog, rng: &mut R) -> &CombinationOutcome {
        let outcome = lab::combine(catalog, self.bench.symbols(), rng);
        if let CombinationOutcome::Discovered(discovery) = &outcome {
            let (tokens, ore) = lab::session_reward(discovery.known);
            self.progression.earn(tokens, ore);
            log::info!(
                "Combined {:?} into {} ({} discovery tokens)",
                self.bench.symbols(),
                discovery.name,
                discovery.tokens
            );
            self.bench.clear();
        }
        self.last_result.insert(outcome)
    }

    /// Pay for and start a spin. Refused while spinning or without tokens.
    pub fn spin<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.slots.is_spinning() {
            log::debug!("Spin ignored: reels still moving");
            return false;
        }
        if !self.progression.try_spend_tokens(SPIN_COST) {
            log::debug!("Spin rejected: no tokens");
            return false;
        }
        self.slots.spin(rng)
    }

    /// Advance one frame. A settling spin pays out here, whatever screen is
    /// showing.
    pub fn tick(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        if let Some(outcome) = self.slots.tick() {
            if outcome.payout > 0 {
                self.progression.earn(0, outcome.payout);
                log::info!("Slot machine paid {} ore", outcome.payout);
                commands.extend(self.cue(Sound::Win));
                commands.push(Command::ShowWinBanner {
                    payout: outcome.payout,
                    millis: WIN_BANNER_MILLIS,
                });
            }
            self.last_spin = Some(outcome);
        }
        commands
    }
}

/// Route one input event. See the module docs.
pub fn handle_event<R: Rng + ?Sized>(
    session: &mut GameSession,
    catalog: &Catalog,
    event: InputEvent,
    rng: &mut R,
) -> Vec<Command> {
    let mut commands = Vec::new();

    match event {
        InputEvent::ToggleMusic => {
            let on = session.prefs.toggle_music();
            let music = if on {
                MusicCommand::Resume
            } else {
                MusicCommand::Pause
            };
            commands.push(Command::Music(music));
            commands.push(Command::SavePreferences);
            return commands;
        }
        InputEvent::SwitchTheme => {
            session.prefs.switch_theme();
            commands.push(session.start_music());
            commands.push(Command::SavePreferences);
            return commands;
        }
        InputEvent::ToggleSound => {
            session.prefs.toggle_sound();
            commands.push(Command::SavePreferences);
            return commands;
        }
        _ => {}
    }

    let screen = session.screen;
    match screen {
        Screen::Title => on_title(session, event),
        Screen::SavedGames => on_saved_games(session, event, &mut commands),
        Screen::ElementSelection => on_element_selection(session, catalog, event, &mut commands),
        Screen::MainGame => on_main_game(session, event),
        Screen::ElementPurchase => on_element_purchase(session, event, &mut commands),
        Screen::Feeding => on_feeding(session, event, &mut commands),
        Screen::Lab => on_lab(session, catalog, event, rng),
        Screen::SlotMachine => on_slot_machine(session, event, rng, &mut commands),
    }

    if session.screen != screen {
        log::debug!("Screen {} -> {}", screen.label(), session.screen.label());
    }
    commands
}

impl GameSession {
    /// Method form of [`handle_event`].
    pub fn handle_event<R: Rng + ?Sized>(
        &mut self,
        catalog: &Catalog,
        event: InputEvent,
        rng: &mut R,
    ) -> Vec<Command> {
        handle_event(self, catalog, event, rng)
    }
}

fn ignored(screen: Screen, event: &InputEvent) {
    log::debug!("Ignoring {:?} on {} screen", event, screen.label());
}

fn on_title(session: &mut GameSession, event: InputEvent) {
    match event {
        InputEvent::Start => session.screen = Screen::SavedGames,
        other => ignored(Screen::Title, &other),
    }
}

fn on_saved_games(session: &mut GameSession, event: InputEvent, commands: &mut Vec<Command>) {
    if session.pending_delete.is_some() {
        match event {
            InputEvent::ConfirmDelete => {
                if let Some(name) = session.pending_delete.take() {
                    commands.push(Command::DeleteGame(name));
                }
            }
            InputEvent::CancelDelete | InputEvent::Back => session.pending_delete = None,
            other => ignored(Screen::SavedGames, &other),
        }
        return;
    }

    match event {
        InputEvent::OpenSave(name) => commands.push(Command::LoadGame(name)),
        InputEvent::NewGame => {
            session.new_game();
            commands.push(Command::SaveGame(None));
        }
        InputEvent::RequestDelete(name) => session.pending_delete = Some(name),
        InputEvent::Back => session.screen = Screen::Title,
        other => ignored(Screen::SavedGames, &other),
    }
}

fn on_element_selection(
    session: &mut GameSession,
    catalog: &Catalog,
    event: InputEvent,
    commands: &mut Vec<Command>,
) {
    match event {
        InputEvent::ToggleElement(symbol) => {
            if !catalog.contains(&symbol) {
                log::debug!("Unknown element {} ignored", symbol);
                return;
            }
            if let SelectionChange::Replaced { evicted } = session.collection.toggle(&symbol) {
                log::debug!("Selecting {} evicted {}", symbol, evicted);
            }
            commands.extend(session.cue(Sound::Pick));
        }
        InputEvent::Confirm => {
            if !session.collection.selection_complete() {
                log::debug!(
                    "Selection needs {} more element(s)",
                    crate::constants::selection::MAX_SELECTED_ELEMENTS
                        - session.collection.selected_count()
                );
                return;
            }
            session.screen = Screen::MainGame;
            commands.push(Command::SaveGame(None));
        }
        other => ignored(Screen::ElementSelection, &other),
    }
}

fn on_main_game(session: &mut GameSession, event: InputEvent) {
    match event {
        InputEvent::Menu(MenuButton::Pick) => session.screen = Screen::ElementPurchase,
        InputEvent::Menu(MenuButton::Feed) => session.screen = Screen::Feeding,
        InputEvent::Menu(MenuButton::Lab) => session.screen = Screen::Lab,
        InputEvent::Menu(MenuButton::Slots) => {
            if session.progression.tokens > 0 {
                session.screen = Screen::SlotMachine;
            } else {
                log::debug!("Not enough tokens to play slots");
            }
        }
        InputEvent::RedeemOre => {
            session.redeem_ore_for_elements();
        }
        other => ignored(Screen::MainGame, &other),
    }
}

fn on_element_purchase(session: &mut GameSession, event: InputEvent, commands: &mut Vec<Command>) {
    match event {
        InputEvent::AdjustPurchase { symbol, delta } => {
            if delta >= 0 {
                session.purchase(&symbol, delta.unsigned_abs());
            } else {
                session
                    .collection
                    .refund_purchase(&mut session.progression, &symbol, delta.unsigned_abs());
            }
        }
        InputEvent::SetPurchase { symbol, fraction } => {
            session
                .collection
                .set_purchase(&mut session.progression, &symbol, fraction);
        }
        InputEvent::Confirm => {
            let committed = session.confirm_purchase();
            log::info!("Purchased {} element units", committed);
            session.screen = Screen::MainGame;
            commands.push(Command::SaveGame(None));
        }
        InputEvent::Back => {
            session.collection.cancel_purchase(&mut session.progression);
            session.screen = Screen::MainGame;
        }
        other => ignored(Screen::ElementPurchase, &other),
    }
}

fn on_feeding(session: &mut GameSession, event: InputEvent, commands: &mut Vec<Command>) {
    match event {
        InputEvent::AdjustFeed { symbol, delta } => {
            session.collection.adjust_feed(&symbol, delta);
        }
        InputEvent::SetFeed { symbol, fraction } => {
            session.collection.set_feed(&symbol, fraction);
        }
        InputEvent::Confirm => {
            let Some(report) = session.collection.feed_staged(&mut session.progression) else {
                return;
            };
            if report.total_fed > 0 {
                commands.extend(session.cue(Sound::Feed));
            }
            if session.maybe_hatch() {
                commands.extend(session.cue(Sound::Evolve));
            }
            session.screen = Screen::MainGame;
            commands.push(Command::SaveGame(None));
        }
        InputEvent::Back => {
            session.collection.clear_staged_feed();
            session.screen = Screen::MainGame;
        }
        other => ignored(Screen::Feeding, &other),
    }
}

fn on_lab<R: Rng + ?Sized>(
    session: &mut GameSession,
    catalog: &Catalog,
    event: InputEvent,
    rng: &mut R,
) {
    match event {
        InputEvent::LabAdd(symbol) => {
            if !catalog.contains(&symbol) {
                log::debug!("Unknown element {} ignored", symbol);
            } else if !session.bench.add(&symbol) {
                log::debug!("Lab bench is full");
            }
        }
        InputEvent::LabRemove(index) => {
            session.bench.remove_at(index);
        }
        InputEvent::LabRemoveElement(symbol) => {
            if !session.bench.remove(&symbol) {
                log::debug!("{} is not on the bench", symbol);
            }
        }
        InputEvent::Combine => {
            session.combine(catalog, rng);
        }
        InputEvent::Back => {
            session.bench.clear();
            session.last_result = None;
            session.screen = Screen::MainGame;
        }
        other => ignored(Screen::Lab, &other),
    }
}

fn on_slot_machine<R: Rng + ?Sized>(
    session: &mut GameSession,
    event: InputEvent,
    rng: &mut R,
    commands: &mut Vec<Command>,
) {
    match event {
        InputEvent::Spin => {
            if session.spin(rng) {
                commands.extend(session.cue(Sound::Spin));
            }
        }
        InputEvent::Back => session.screen = Screen::MainGame,
        other => ignored(Screen::SlotMachine, &other),
    }
}
