//! Egg growth, leveling and currencies.
//!
//! Growth accumulates from feeding. [`Progression::normalize_growth`] is the
//! only path that raises the egg level: every full
//! [`MAX_GROWTH_PER_LEVEL`] of growth becomes one level, the remainder
//! carries over.

use serde::{Deserialize, Serialize};

use crate::constants::currency::{STARTING_ORE, STARTING_TOKENS};
use crate::constants::growth::{HATCH_LEVEL, MAX_GROWTH_PER_LEVEL, STARTING_EGG_LEVEL};

/// Level, growth meter and both currencies of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub egg_level: u32,
    pub growth_level: u32,
    pub ore_chunks: u32,
    pub tokens: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            egg_level: STARTING_EGG_LEVEL,
            growth_level: 0,
            ore_chunks: STARTING_ORE,
            tokens: STARTING_TOKENS,
        }
    }
}

impl Progression {
    /// Add growth points and normalize. Returns levels gained.
    pub fn add_growth(&mut self, amount: u32) -> u32 {
        self.growth_level = self.growth_level.saturating_add(amount);
        self.normalize_growth()
    }

    /// Convert every full growth bar into an egg level. Returns levels gained.
    pub fn normalize_growth(&mut self) -> u32 {
        let mut gained = 0;
        while self.growth_level >= MAX_GROWTH_PER_LEVEL {
            self.egg_level += 1;
            self.growth_level -= MAX_GROWTH_PER_LEVEL;
            gained += 1;
        }
        if gained > 0 {
            log::info!("Egg leveled up to {}", self.egg_level);
        }
        gained
    }

    /// Growth meter as a 0.0–1.0 fraction.
    pub fn growth_fraction(&self) -> f32 {
        self.growth_level as f32 / MAX_GROWTH_PER_LEVEL as f32
    }

    pub fn ready_to_hatch(&self) -> bool {
        self.egg_level >= HATCH_LEVEL
    }

    /// Spend ore if the balance covers it.
    pub fn try_spend_ore(&mut self, amount: u32) -> bool {
        if self.ore_chunks < amount {
            return false;
        }
        self.ore_chunks -= amount;
        true
    }

    /// Spend tokens if the balance covers it.
    pub fn try_spend_tokens(&mut self, amount: u32) -> bool {
        if self.tokens < amount {
            return false;
        }
        self.tokens -= amount;
        true
    }

    pub fn earn(&mut self, tokens: u32, ore: u32) {
        self.tokens = self.tokens.saturating_add(tokens);
        self.ore_chunks = self.ore_chunks.saturating_add(ore);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_defaults() {
        let p = Progression::default();
        assert_eq!(p.egg_level, 1);
        assert_eq!(p.growth_level, 0);
        assert_eq!(p.ore_chunks, 0);
        assert_eq!(p.tokens, 1);
    }

    #[test]
    fn test_growth_below_threshold() {
        let mut p = Progression::default();
        assert_eq!(p.add_growth(49), 0);
        assert_eq!(p.egg_level, 1);
        assert_eq!(p.growth_level, 49);
    }

    #[test]
    fn test_growth_exact_threshold() {
        let mut p = Progression::default();
        assert_eq!(p.add_growth(50), 1);
        assert_eq!(p.egg_level, 2);
        assert_eq!(p.growth_level, 0);
    }

    #[test]
    fn test_growth_multiple_levels_with_carry() {
        let mut p = Progression {
            growth_level: 30,
            ..Default::default()
        };
        assert_eq!(p.add_growth(125), 3);
        assert_eq!(p.egg_level, 4);
        assert_eq!(p.growth_level, 5);
    }

    #[test]
    fn test_growth_invariant_sweep() {
        for start in 0..MAX_GROWTH_PER_LEVEL {
            for fed in [0u32, 1, 7, 49, 50, 51, 99, 100, 333] {
                let mut p = Progression {
                    growth_level: start,
                    ..Default::default()
                };
                let gained = p.add_growth(fed);
                assert!(p.growth_level < MAX_GROWTH_PER_LEVEL);
                assert_eq!(gained, (start + fed) / MAX_GROWTH_PER_LEVEL);
                assert_eq!(p.egg_level, 1 + gained);
            }
        }
    }

    #[test]
    fn test_normalize_repairs_overfull_meter() {
        let mut p = Progression {
            growth_level: 260,
            ..Default::default()
        };
        assert_eq!(p.normalize_growth(), 5);
        assert_eq!(p.growth_level, 10);
    }

    #[test]
    fn test_spend_ore() {
        let mut p = Progression {
            ore_chunks: 5,
            ..Default::default()
        };
        assert!(!p.try_spend_ore(6));
        assert_eq!(p.ore_chunks, 5);
        assert!(p.try_spend_ore(5));
        assert_eq!(p.ore_chunks, 0);
    }

    #[test]
    fn test_spend_tokens() {
        let mut p = Progression::default();
        assert!(p.try_spend_tokens(1));
        assert!(!p.try_spend_tokens(1));
        assert_eq!(p.tokens, 0);
    }

    #[test]
    fn test_ready_to_hatch() {
        let mut p = Progression::default();
        assert!(!p.ready_to_hatch());
        p.egg_level = HATCH_LEVEL;
        assert!(p.ready_to_hatch());
    }

    #[test]
    fn test_growth_fraction() {
        let p = Progression {
            growth_level: 25,
            ..Default::default()
        };
        assert!((p.growth_fraction() - 0.5).abs() < 0.001);
    }
}
