//! Pure game logic for ElementEgg.
//!
//! This crate contains all game rules that are independent of files,
//! rendering or audio. Functions take plain data (and an RNG where chance
//! is involved) and return results, so every rule is unit-testable and the
//! same code drives the engine, the headless harness and any front end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`catalog`] | Element and compound reference data loaded from JSON |
//! | [`collection`] | Selected elements (FIFO, max 3), inventory, purchasing, feeding |
//! | [`constants`] | Tuning constants grouped by concern |
//! | [`creature`] | Creature traits derived once at hatch time |
//! | [`formula`] | Chemical formula parser (atom and mention counts) |
//! | [`lab`] | Combination resolver and the lab bench |
//! | [`prefs`] | Sound, music and theme preferences |
//! | [`progression`] | Egg level, growth meter, ore and tokens |
//! | [`screen`] | Screens, input events and output commands |
//! | [`session`] | `GameSession` aggregate and the event router |
//! | [`slots`] | Three-reel slot machine |

pub mod catalog;
pub mod collection;
pub mod constants;
pub mod creature;
pub mod formula;
pub mod lab;
pub mod prefs;
pub mod progression;
pub mod screen;
pub mod session;
pub mod slots;
