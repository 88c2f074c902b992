//! ElementEgg Core - game engine around the pure logic crate
//!
//! Owns everything that touches the outside world: the save registry, the
//! preference files and the reference data on disk. The [`GameEngine`]
//! routes input events into the session, executes the persistence
//! commands they produce, ticks the slot machine and autosaves.
//!
//! # Example
//!
//! ```rust,no_run
//! use elementegg_core::prelude::*;
//!
//! let mut engine = GameEngine::new(EngineConfig::default()).unwrap();
//!
//! engine.handle_input(InputEvent::Start).unwrap();
//! engine.handle_input(InputEvent::NewGame).unwrap();
//!
//! loop {
//!     engine.update(1.0 / 30.0).unwrap(); // 30 FPS
//!     for command in engine.drain_commands() {
//!         println!("{:?}", command);
//!     }
//! }
//! ```
//!
//! [`GameEngine`]: engine::GameEngine

pub mod assets;
pub mod config;
pub mod engine;
pub mod persistence;
pub mod prefs;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::{EngineError, GameEngine};
    pub use crate::persistence::{SaveError, SaveRecord, SaveStore};
    pub use elementegg_logic::screen::{Command, InputEvent, MenuButton, Screen};
}
