//! Laboratory: combine 2–6 elements into a compound.
//!
//! # Resolution
//!
//! A bench is a multiset of element symbols. A compound is a candidate when
//! its required element *set* equals the bench's distinct symbols and the
//! bench holds at least as many of each element as the compound's formula
//! mentions. Among candidates one is drawn at random, weighted by
//! `Σ min(bench_count, mentions)` so compounds that use more of the bench
//! are likelier. With no candidate the bench yields "UNKNOWN ORE", labelled
//! with the sum of the bench's atomic numbers.
//!
//! Every combination pays the session a fixed reward (see
//! [`session_reward`]) on top of the discovery tokens shown on the result.

use std::collections::BTreeMap;

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Compound};
use crate::constants::rewards::{
    DISCOVERY_TOKENS_PER_ELEMENT, KNOWN_COMPOUND_ORE, KNOWN_COMPOUND_TOKENS,
    UNKNOWN_DISCOVERY_TOKENS, UNKNOWN_ORE_ORE, UNKNOWN_ORE_TOKENS,
};
use crate::constants::selection::{MAX_LAB_ELEMENTS, MIN_LAB_ELEMENTS};
use crate::constants::ui::{
    TOO_FEW_ELEMENTS_MESSAGE, UNKNOWN_ORE_DESCRIPTION, UNKNOWN_ORE_NAME, UNKNOWN_ORE_TRIVIA,
};

/// A resolved combination, known compound or unknown ore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    pub name: String,
    pub formula: String,
    pub description: String,
    pub trivia: String,
    /// Displayed discovery tokens.
    pub tokens: u32,
    pub known: bool,
}

impl Discovery {
    fn from_compound(compound: &Compound, bench_size: usize) -> Self {
        Self {
            name: compound.name.clone(),
            formula: compound.formula.clone(),
            description: compound.description.clone(),
            trivia: compound.trivia.clone(),
            tokens: DISCOVERY_TOKENS_PER_ELEMENT * bench_size as u32,
            known: true,
        }
    }

    fn unknown_ore(atomic_number_sum: u32) -> Self {
        Self {
            name: UNKNOWN_ORE_NAME.to_string(),
            formula: format!("ATOMIC NUMBER: {}", atomic_number_sum),
            description: UNKNOWN_ORE_DESCRIPTION.to_string(),
            trivia: UNKNOWN_ORE_TRIVIA.to_string(),
            tokens: UNKNOWN_DISCOVERY_TOKENS,
            known: false,
        }
    }
}

/// Outcome of pressing "combine".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombinationOutcome {
    /// Soft rejection: the bench is too small. Carries a player-facing message.
    TooFewElements(String),
    Discovered(Discovery),
}

/// Session `(tokens, ore)` paid for a combination.
pub fn session_reward(known: bool) -> (u32, u32) {
    if known {
        (KNOWN_COMPOUND_TOKENS, KNOWN_COMPOUND_ORE)
    } else {
        (UNKNOWN_ORE_TOKENS, UNKNOWN_ORE_ORE)
    }
}

fn element_counts(symbols: &[String]) -> BTreeMap<&str, u32> {
    let mut counts = BTreeMap::new();
    for symbol in symbols {
        *counts.entry(symbol.as_str()).or_insert(0) += 1;
    }
    counts
}

/// Candidate compounds for a bench together with their draw weights.
pub fn candidates<'c>(catalog: &'c Catalog, symbols: &[String]) -> Vec<(&'c Compound, u32)> {
    let counts = element_counts(symbols);

    catalog
        .compounds()
        .iter()
        .filter(|compound| {
            compound.elements.len() == counts.len()
                && compound.elements.iter().all(|e| counts.contains_key(e.as_str()))
        })
        .filter(|compound| {
            compound
                .elements
                .iter()
                .all(|e| counts[e.as_str()] >= compound.composition.mentions(e))
        })
        .map(|compound| {
            let weight = counts
                .iter()
                .map(|(symbol, &have)| have.min(compound.composition.mentions(symbol)))
                .sum();
            (compound, weight)
        })
        .collect()
}

/// Resolve a bench into a discovery. Does not touch any currency.
pub fn combine<R: Rng + ?Sized>(
    catalog: &Catalog,
    symbols: &[String],
    rng: &mut R,
) -> CombinationOutcome {
    if symbols.len() < MIN_LAB_ELEMENTS {
        return CombinationOutcome::TooFewElements(TOO_FEW_ELEMENTS_MESSAGE.to_string());
    }

    let candidates = candidates(catalog, symbols);
    let picked = match WeightedIndex::new(candidates.iter().map(|(_, w)| *w)) {
        Ok(dist) => Some(candidates[dist.sample(rng)].0),
        // Empty list or all-zero weights.
        Err(_) => candidates.choose(rng).map(|(c, _)| *c),
    };

    let discovery = match picked {
        Some(compound) => Discovery::from_compound(compound, symbols.len()),
        None => {
            let sum = symbols
                .iter()
                .filter_map(|s| catalog.element(s))
                .map(|e| e.atomic_number)
                .sum();
            Discovery::unknown_ore(sum)
        }
    };
    CombinationOutcome::Discovered(discovery)
}

/// The lab's working multiset of elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabBench {
    symbols: Vec<String>,
}

impl LabBench {
    /// Add an element; repeats are allowed up to the bench capacity.
    pub fn add(&mut self, symbol: &str) -> bool {
        if self.symbols.len() >= MAX_LAB_ELEMENTS {
            return false;
        }
        self.symbols.push(symbol.to_string());
        true
    }

    /// Remove the slot at `index`.
    pub fn remove_at(&mut self, index: usize) -> Option<String> {
        (index < self.symbols.len()).then(|| self.symbols.remove(index))
    }

    /// Remove the first occurrence of `symbol`.
    pub fn remove(&mut self, symbol: &str) -> bool {
        match self.symbols.iter().position(|s| s == symbol) {
            Some(index) => {
                self.symbols.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
    }
}
