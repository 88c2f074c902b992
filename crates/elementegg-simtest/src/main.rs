//! ElementEgg Headless Harness
//!
//! Validates the shipped reference data and the game rules, then plays
//! scripted sessions through the real engine. Runs entirely in-process:
//! no window, no audio.
//!
//! Usage:
//!   cargo run -p elementegg-simtest
//!   cargo run -p elementegg-simtest -- --verbose --seed 7
//!   cargo run -p elementegg-simtest -- --realtime   (honor win-banner pauses)
//!   RUST_LOG=info cargo run -p elementegg-simtest

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use elementegg_core::prelude::*;
use elementegg_logic::catalog::Catalog;
use elementegg_logic::constants::growth::{HATCH_LEVEL, MAX_GROWTH_PER_LEVEL};
use elementegg_logic::constants::selection::MAX_LAB_ELEMENTS;
use elementegg_logic::constants::slots::{
    BANKNOTE_PAYOUT, DIAMOND_PAYOUT, MAX_SPIN_FRAMES, MONEY_BAG_PAYOUT,
};
use elementegg_logic::constants::timing::TARGET_FPS;
use elementegg_logic::lab::{self, CombinationOutcome};
use elementegg_logic::progression::Progression;
use elementegg_logic::slots::SlotMachine;
use rand::rngs::StdRng;
use rand::SeedableRng;

// ── Reference data (same JSON the engine loads) ─────────────────────────
const ELEMENTS_JSON: &str = include_str!("../../../data/elements.json");
const COMPOUNDS_JSON: &str = include_str!("../../../data/compounds.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Options {
    verbose: bool,
    realtime: bool,
    seed: u64,
}

const DEFAULT_SEED: u64 = 42;

/// Seed given by `--seed <n>`, or the default when the flag is absent.
fn parse_seed(args: &[String]) -> Result<u64, String> {
    let Some(i) = args.iter().position(|a| a == "--seed") else {
        return Ok(DEFAULT_SEED);
    };
    match args.get(i + 1) {
        Some(value) => value
            .parse()
            .map_err(|_| format!("--seed expects an unsigned integer, got {:?}", value)),
        None => Err("--seed expects a value".to_string()),
    }
}

fn parse_args() -> Options {
    let args: Vec<String> = std::env::args().collect();
    let seed = match parse_seed(&args) {
        Ok(seed) => seed,
        Err(message) => {
            eprintln!("error: {}", message);
            std::process::exit(2);
        }
    };
    Options {
        verbose: args.iter().any(|a| a == "--verbose"),
        realtime: args.iter().any(|a| a == "--realtime"),
        seed,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let opts = parse_args();
    println!("=== ElementEgg Harness (seed {}) ===\n", opts.seed);

    let mut results = Vec::new();

    // 1. Element catalog validation
    let catalog = match validate_elements(opts.seed, &mut results) {
        Some(catalog) => catalog,
        None => {
            report(&results, opts.verbose);
            std::process::exit(1);
        }
    };

    // 2. Compound catalog validation
    results.extend(validate_compounds(&catalog, opts.verbose));

    // 3. Growth & leveling sweep
    results.extend(validate_progression(opts.verbose));

    // 4. Combination resolver
    results.extend(validate_lab(&catalog, opts.seed, opts.verbose));

    // 5. Slot machine statistics
    results.extend(validate_slots(opts.seed, opts.verbose));

    // 6. Scripted play-through on the real engine
    results.extend(validate_playthrough(&opts));

    report(&results, opts.verbose);
}

fn report(results: &[TestResult], verbose: bool) {
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Elements ─────────────────────────────────────────────────────────

fn validate_elements(seed: u64, results: &mut Vec<TestResult>) -> Option<Catalog> {
    println!("--- Element Catalog ---");
    let mut rng = StdRng::seed_from_u64(seed);

    let catalog = match Catalog::from_json(ELEMENTS_JSON, COMPOUNDS_JSON, &mut rng) {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "catalog_parse".into(),
                passed: false,
                detail: format!("catalog error: {}", e),
            });
            return None;
        }
    };

    results.push(TestResult {
        name: "elements_not_empty".into(),
        passed: catalog.elements().len() >= 50,
        detail: format!("{} elements loaded", catalog.elements().len()),
    });

    let out_of_order: Vec<_> = catalog
        .elements()
        .iter()
        .enumerate()
        .filter(|(i, e)| e.atomic_number as usize != i + 1)
        .collect();
    results.push(TestResult {
        name: "elements_numbered_in_order".into(),
        passed: out_of_order.is_empty(),
        detail: format!("{} elements out of order", out_of_order.len()),
    });

    let bad_weight: Vec<&str> = catalog
        .elements()
        .iter()
        .filter(|e| e.atomic_weight <= 0.0)
        .map(|e| e.symbol.as_str())
        .collect();
    results.push(TestResult {
        name: "elements_positive_weights".into(),
        passed: bad_weight.is_empty(),
        detail: if bad_weight.is_empty() {
            "all atomic weights positive".into()
        } else {
            format!("non-positive weights: {:?}", bad_weight)
        },
    });

    for symbol in ["H", "C", "N", "O", "P", "S"] {
        results.push(TestResult {
            name: format!("element_{}_present", symbol),
            passed: catalog.contains(symbol),
            detail: format!("{} is needed for creature colors", symbol),
        });
    }

    Some(catalog)
}

// ── 2. Compounds ────────────────────────────────────────────────────────

fn validate_compounds(catalog: &Catalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Compound Catalog ---");
    let mut results = Vec::new();

    results.push(TestResult {
        name: "compounds_not_empty".into(),
        passed: catalog.compounds().len() >= 20,
        detail: format!("{} compounds loaded", catalog.compounds().len()),
    });

    let missing_text: Vec<&str> = catalog
        .compounds()
        .iter()
        .filter(|c| c.description.is_empty() || c.trivia.is_empty())
        .map(|c| c.name.as_str())
        .collect();
    results.push(TestResult {
        name: "compounds_have_flavor_text".into(),
        passed: missing_text.is_empty(),
        detail: format!("missing description/trivia: {:?}", missing_text),
    });

    let mut unreachable = Vec::new();
    for compound in catalog.compounds() {
        let mut bench: Vec<String> = compound
            .elements
            .iter()
            .flat_map(|s| {
                let n = compound.composition.mentions(s).max(1) as usize;
                std::iter::repeat(s.clone()).take(n)
            })
            .collect();
        if bench.len() == 1 {
            bench.push(bench[0].clone());
        }
        let reachable = bench.len() <= MAX_LAB_ELEMENTS
            && lab::candidates(catalog, &bench)
                .iter()
                .any(|(c, _)| c.name == compound.name);
        if verbose {
            println!(
                "  {:<20} {:<10} bench {:?}",
                compound.name, compound.formula, bench
            );
        }
        if !reachable {
            unreachable.push(compound.name.clone());
        }
    }
    results.push(TestResult {
        name: "compounds_discoverable".into(),
        passed: unreachable.is_empty(),
        detail: if unreachable.is_empty() {
            "every compound can be made on the bench".into()
        } else {
            format!("unreachable: {:?}", unreachable)
        },
    });

    results
}

// ── 3. Progression ──────────────────────────────────────────────────────

fn validate_progression(verbose: bool) -> Vec<TestResult> {
    println!("--- Growth & Leveling ---");
    let mut results = Vec::new();

    let mut violations = 0;
    let mut cases = 0;
    for start in 0..MAX_GROWTH_PER_LEVEL {
        for fed in (0..=500).step_by(7) {
            let mut p = Progression {
                growth_level: start,
                ..Default::default()
            };
            let gained = p.add_growth(fed);
            cases += 1;
            if p.growth_level >= MAX_GROWTH_PER_LEVEL
                || gained != (start + fed) / MAX_GROWTH_PER_LEVEL
                || p.egg_level != 1 + gained
            {
                violations += 1;
            }
        }
    }
    results.push(TestResult {
        name: "growth_normalization".into(),
        passed: violations == 0,
        detail: format!("{} violations in {} cases", violations, cases),
    });

    let to_hatch = (HATCH_LEVEL - 1) * MAX_GROWTH_PER_LEVEL;
    let mut p = Progression::default();
    p.add_growth(to_hatch - 1);
    let before = p.ready_to_hatch();
    p.add_growth(1);
    if verbose {
        println!("  hatch after {} elements fed", to_hatch);
    }
    results.push(TestResult {
        name: "hatch_threshold".into(),
        passed: !before && p.ready_to_hatch(),
        detail: format!("level {} after feeding {}", p.egg_level, to_hatch),
    });

    results
}

// ── 4. Lab ──────────────────────────────────────────────────────────────

fn bench(symbols: &[&str]) -> Vec<String> {
    symbols.iter().map(|s| s.to_string()).collect()
}

fn validate_lab(catalog: &Catalog, seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Combination Resolver ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut tally: BTreeMap<String, u32> = BTreeMap::new();
    for _ in 0..200 {
        if let CombinationOutcome::Discovered(d) = lab::combine(catalog, &bench(&["H", "H", "O"]), &mut rng)
        {
            *tally.entry(d.name).or_insert(0) += 1;
        }
    }
    if verbose {
        println!("  H H O over 200 draws: {:?}", tally);
    }
    results.push(TestResult {
        name: "lab_water_drawn".into(),
        passed: tally.get("Water").copied().unwrap_or(0) > 0
            && !tally.contains_key("UNKNOWN ORE"),
        detail: format!("{:?}", tally),
    });

    let outcome = lab::combine(catalog, &bench(&["He", "Ne", "Ar"]), &mut rng);
    let expected = "ATOMIC NUMBER: 30";
    results.push(TestResult {
        name: "lab_unknown_ore".into(),
        passed: matches!(&outcome, CombinationOutcome::Discovered(d) if !d.known && d.formula == expected && d.tokens == 1),
        detail: format!("{:?}", outcome),
    });

    let outcome = lab::combine(catalog, &bench(&["O"]), &mut rng);
    results.push(TestResult {
        name: "lab_needs_two_elements".into(),
        passed: matches!(outcome, CombinationOutcome::TooFewElements(_)),
        detail: format!("{:?}", outcome),
    });

    let salt = lab::candidates(catalog, &bench(&["Na", "Cl"]));
    results.push(TestResult {
        name: "lab_chlorine_is_not_carbon".into(),
        passed: salt.len() == 1 && salt[0].0.name == "Table Salt",
        detail: format!(
            "candidates: {:?}",
            salt.iter().map(|(c, w)| (&c.name, *w)).collect::<Vec<_>>()
        ),
    });

    results
}

// ── 5. Slots ────────────────────────────────────────────────────────────

fn validate_slots(seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Slot Machine ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut machine = SlotMachine::default();

    let spins = 900;
    let mut bad_duration = 0;
    let mut bad_reports = 0;
    let mut bad_payouts = 0;
    let mut total_paid = 0u64;
    let mut wins = 0;
    let valid_line = [DIAMOND_PAYOUT, MONEY_BAG_PAYOUT, BANKNOTE_PAYOUT];

    for _ in 0..spins {
        machine.spin(&mut rng);
        let mut ticks = 0;
        let mut reports = 0;
        while machine.is_spinning() && ticks < 10 * MAX_SPIN_FRAMES {
            ticks += 1;
            if let Some(outcome) = machine.tick() {
                reports += 1;
                total_paid += outcome.payout as u64;
                if outcome.payout > 0 {
                    wins += 1;
                }
                let consistent = outcome.line_wins.iter().all(|w| {
                    let base = if w.row == 1 { w.amount / 2 } else { w.amount };
                    valid_line.contains(&base)
                });
                if !consistent {
                    bad_payouts += 1;
                }
            }
        }
        if ticks != MAX_SPIN_FRAMES {
            bad_duration += 1;
        }
        if reports != 1 {
            bad_reports += 1;
        }
    }

    results.push(TestResult {
        name: "slots_settle_on_budget".into(),
        passed: bad_duration == 0,
        detail: format!("{} of {} spins off the {}-frame budget", bad_duration, spins, MAX_SPIN_FRAMES),
    });
    results.push(TestResult {
        name: "slots_report_once".into(),
        passed: bad_reports == 0,
        detail: format!("{} spins reported != 1 outcome", bad_reports),
    });
    results.push(TestResult {
        name: "slots_payout_table".into(),
        passed: bad_payouts == 0,
        detail: format!("{} outcomes off the payout table", bad_payouts),
    });

    let hit_rate = wins as f64 / spins as f64;
    if verbose {
        println!(
            "  {} spins: {} wins ({:.1}%), {} ore paid, {:.1} ore/spin",
            spins,
            wins,
            hit_rate * 100.0,
            total_paid,
            total_paid as f64 / spins as f64
        );
    }
    results.push(TestResult {
        name: "slots_hit_rate".into(),
        passed: (0.05..0.20).contains(&hit_rate),
        detail: format!("{:.1}% of spins win", hit_rate * 100.0),
    });

    results
}

// ── 6. Play-through ─────────────────────────────────────────────────────

struct ScratchDir(PathBuf);

impl ScratchDir {
    fn new(seed: u64) -> std::io::Result<Self> {
        let path = std::env::temp_dir().join(format!(
            "elementegg-simtest-{}-{}",
            std::process::id(),
            seed
        ));
        std::fs::create_dir_all(&path)?;
        Ok(Self(path))
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn run_frames(engine: &mut GameEngine, frames: u32, opts: &Options) -> Result<u32, EngineError> {
    let dt = 1.0 / TARGET_FPS as f32;
    let mut paid = 0;
    for _ in 0..frames {
        engine.update(dt)?;
        for command in engine.drain_commands() {
            if let Command::ShowWinBanner { payout, millis } = command {
                paid += payout;
                if opts.verbose {
                    println!("  WIN! {} ore", payout);
                }
                if opts.realtime {
                    std::thread::sleep(std::time::Duration::from_millis(millis));
                }
            }
        }
    }
    Ok(paid)
}

fn validate_playthrough(opts: &Options) -> Vec<TestResult> {
    println!("--- Play-through ---");
    let mut results = Vec::new();

    let scratch = match ScratchDir::new(opts.seed) {
        Ok(dir) => dir,
        Err(e) => {
            results.push(TestResult {
                name: "playthrough_scratch_dir".into(),
                passed: false,
                detail: format!("cannot create scratch dir: {}", e),
            });
            return results;
        }
    };
    let config = EngineConfig::in_dir(scratch.path())
        .with_assets(data_dir())
        .with_seed(opts.seed);

    if let Err(e) = play_session(config.clone(), opts, &mut results) {
        results.push(TestResult {
            name: "playthrough_engine".into(),
            passed: false,
            detail: format!("engine error: {}", e),
        });
    }
    if let Err(e) = reload_session(config, &mut results) {
        results.push(TestResult {
            name: "reload_engine".into(),
            passed: false,
            detail: format!("engine error: {}", e),
        });
    }
    results
}

fn play_session(
    config: EngineConfig,
    opts: &Options,
    results: &mut Vec<TestResult>,
) -> Result<(), EngineError> {
    let mut engine = GameEngine::new(config)?;

    for event in [InputEvent::Start, InputEvent::NewGame] {
        engine.handle_input(event)?;
    }
    for symbol in ["O", "S", "Fe"] {
        engine.handle_input(InputEvent::ToggleElement(symbol.into()))?;
    }
    engine.handle_input(InputEvent::Confirm)?;
    results.push(TestResult {
        name: "playthrough_enters_main_game".into(),
        passed: engine.session.screen == Screen::MainGame,
        detail: format!("screen {:?}", engine.session.screen),
    });

    // Earn ore in the lab: each known compound pays 10 ore and 5 tokens.
    let mut discoveries = 0;
    engine.handle_input(InputEvent::Menu(MenuButton::Lab))?;
    for _ in 0..45 {
        for symbol in ["S", "O", "O"] {
            engine.handle_input(InputEvent::LabAdd(symbol.into()))?;
        }
        engine.handle_input(InputEvent::Combine)?;
        if let Some(CombinationOutcome::Discovered(d)) = &engine.session.last_result {
            if d.known {
                discoveries += 1;
            }
        }
    }
    engine.handle_input(InputEvent::Back)?;
    results.push(TestResult {
        name: "playthrough_lab_rewards".into(),
        passed: discoveries == 45 && engine.session.progression.ore_chunks == 450,
        detail: format!(
            "{} discoveries, {} ore, {} tokens",
            discoveries, engine.session.progression.ore_chunks, engine.session.progression.tokens
        ),
    });

    // Spend it: buy and feed enough to hatch.
    engine.handle_input(InputEvent::Menu(MenuButton::Pick))?;
    for (symbol, qty) in [("O", 200), ("S", 150), ("Fe", 100)] {
        engine.handle_input(InputEvent::AdjustPurchase {
            symbol: symbol.into(),
            delta: qty,
        })?;
    }
    engine.handle_input(InputEvent::Confirm)?;
    engine.handle_input(InputEvent::Menu(MenuButton::Feed))?;
    for symbol in ["O", "S", "Fe"] {
        engine.handle_input(InputEvent::SetFeed {
            symbol: symbol.into(),
            fraction: 1.0,
        })?;
    }
    engine.handle_input(InputEvent::Confirm)?;
    let creature = engine.session.creature.clone();
    results.push(TestResult {
        name: "playthrough_hatches".into(),
        passed: engine.session.progression.egg_level == HATCH_LEVEL && creature.is_some(),
        detail: format!(
            "level {}, growth {}, creature {:?}",
            engine.session.progression.egg_level, engine.session.progression.growth_level, creature
        ),
    });

    // Gamble the lab tokens.
    let tokens_before = engine.session.progression.tokens;
    let ore_before = engine.session.progression.ore_chunks;
    engine.handle_input(InputEvent::Menu(MenuButton::Slots))?;
    let mut paid = 0;
    let mut spins = 0;
    while engine.session.progression.tokens > 0 {
        engine.handle_input(InputEvent::Spin)?;
        spins += 1;
        paid += run_frames(&mut engine, MAX_SPIN_FRAMES, opts)?;
    }
    engine.handle_input(InputEvent::Back)?;
    results.push(TestResult {
        name: "playthrough_slots_balance".into(),
        passed: spins == tokens_before
            && engine.session.progression.ore_chunks == ore_before + paid,
        detail: format!("{} spins, {} ore won", spins, paid),
    });

    engine.save_game(Some("simtest".into()))?;
    results.push(TestResult {
        name: "playthrough_saved".into(),
        passed: engine.saved_games()?.contains(&"simtest".to_string()),
        detail: format!("saves: {:?}", engine.saved_games()?),
    });
    Ok(())
}

fn reload_session(config: EngineConfig, results: &mut Vec<TestResult>) -> Result<(), EngineError> {
    let mut engine = GameEngine::new(config)?;
    engine.handle_input(InputEvent::Start)?;

    engine.handle_input(InputEvent::OpenSave("nope".into()))?;
    results.push(TestResult {
        name: "reload_unknown_save_is_harmless".into(),
        passed: engine.session.screen == Screen::SavedGames
            && engine.session.session_name.is_none(),
        detail: format!("screen {:?} after opening a missing save", engine.session.screen),
    });

    engine.handle_input(InputEvent::OpenSave("simtest".into()))?;
    let session = &engine.session;
    results.push(TestResult {
        name: "reload_restores_game".into(),
        passed: session.screen == Screen::MainGame
            && session.progression.egg_level == HATCH_LEVEL
            && session.creature.is_some()
            && session.collection.fed_total("O") == 200,
        detail: format!(
            "screen {:?}, level {}, fed O {}",
            session.screen,
            session.progression.egg_level,
            session.collection.fed_total("O")
        ),
    });

    let before = engine.saved_games()?.len();
    engine.delete_game("simtest")?;
    results.push(TestResult {
        name: "reload_delete".into(),
        passed: engine.saved_games()?.len() + 1 == before,
        detail: format!("{} -> {} saves", before, engine.saved_games()?.len()),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_seed_defaults_when_absent() {
        assert_eq!(parse_seed(&args(&["simtest", "--verbose"])), Ok(DEFAULT_SEED));
    }

    #[test]
    fn test_seed_parsed() {
        assert_eq!(parse_seed(&args(&["simtest", "--seed", "7"])), Ok(7));
    }

    #[test]
    fn test_bad_seed_rejected() {
        assert!(parse_seed(&args(&["simtest", "--seed", "abc"])).is_err());
        assert!(parse_seed(&args(&["simtest", "--seed"])).is_err());
    }
}
