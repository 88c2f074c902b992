//! Element and compound reference data.
//!
//! Loaded once at startup from two JSON documents and never mutated
//! afterwards. Elements receive their atomic number from their position in
//! the list (index + 1); elements without a color get a random one.
//! Compounds get their formula parsed into a [`Formula`] at load time.

use std::collections::{BTreeSet, HashMap};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::formula::{Formula, FormulaError};

/// RGB display color.
pub type Rgb = [u8; 3];

/// Errors raised while building the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid {what} JSON: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("element catalog is empty")]
    NoElements,
    #[error("duplicate element symbol '{0}'")]
    DuplicateSymbol(String),
    #[error("compound '{name}' has an invalid formula: {source}")]
    BadFormula {
        name: String,
        #[source]
        source: FormulaError,
    },
}

/// Element entry as written in the element catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct ElementSpec {
    pub symbol: String,
    pub name: String,
    pub atomic_weight: f64,
    #[serde(default)]
    pub color: Option<Vec<f64>>,
}

/// Compound entry as written in the compound catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct CompoundSpec {
    pub name: String,
    pub formula: String,
    pub elements: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub trivia: String,
}

/// A periodic-table element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub symbol: String,
    pub name: String,
    pub atomic_number: u32,
    pub atomic_weight: f64,
    pub color: Rgb,
}

/// A discoverable compound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compound {
    pub name: String,
    pub formula: String,
    /// Required element set.
    pub elements: BTreeSet<String>,
    pub description: String,
    pub trivia: String,
    pub composition: Formula,
}

/// Read-only element and compound catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    elements: Vec<Element>,
    compounds: Vec<Compound>,
    by_symbol: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from already-deserialized specs.
    pub fn from_specs<R: Rng + ?Sized>(
        element_specs: Vec<ElementSpec>,
        compound_specs: Vec<CompoundSpec>,
        rng: &mut R,
    ) -> Result<Self, CatalogError> {
        if element_specs.is_empty() {
            return Err(CatalogError::NoElements);
        }

        let mut elements = Vec::with_capacity(element_specs.len());
        let mut by_symbol = HashMap::with_capacity(element_specs.len());
        for (index, spec) in element_specs.into_iter().enumerate() {
            if by_symbol.insert(spec.symbol.clone(), index).is_some() {
                return Err(CatalogError::DuplicateSymbol(spec.symbol));
            }
            let color = match spec.color.as_deref() {
                Some(channels) => ensure_valid_color(channels),
                None => [rng.gen(), rng.gen(), rng.gen()],
            };
            elements.push(Element {
                symbol: spec.symbol,
                name: spec.name,
                atomic_number: index as u32 + 1,
                atomic_weight: spec.atomic_weight,
                color,
            });
        }

        let mut compounds = Vec::with_capacity(compound_specs.len());
        for spec in compound_specs {
            let composition =
                Formula::parse(&spec.formula).map_err(|source| CatalogError::BadFormula {
                    name: spec.name.clone(),
                    source,
                })?;
            let required: BTreeSet<String> = spec.elements.into_iter().collect();

            for symbol in &required {
                if !by_symbol.contains_key(symbol) {
                    log::warn!(
                        "Compound {} requires {} which is not in the element catalog",
                        spec.name,
                        symbol
                    );
                }
                if composition.mentions(symbol) == 0 {
                    log::warn!(
                        "Compound {} lists {} but its formula {} never mentions it",
                        spec.name,
                        symbol,
                        spec.formula
                    );
                }
            }

            compounds.push(Compound {
                name: spec.name,
                formula: spec.formula,
                elements: required,
                description: spec.description,
                trivia: spec.trivia,
                composition,
            });
        }

        log::info!(
            "Catalog loaded: {} elements, {} compounds",
            elements.len(),
            compounds.len()
        );

        Ok(Self {
            elements,
            compounds,
            by_symbol,
        })
    }

    /// Build a catalog from the two JSON documents.
    pub fn from_json<R: Rng + ?Sized>(
        elements_json: &str,
        compounds_json: &str,
        rng: &mut R,
    ) -> Result<Self, CatalogError> {
        let element_specs: Vec<ElementSpec> =
            serde_json::from_str(elements_json).map_err(|source| CatalogError::Json {
                what: "element",
                source,
            })?;
        let compound_specs: Vec<CompoundSpec> =
            serde_json::from_str(compounds_json).map_err(|source| CatalogError::Json {
                what: "compound",
                source,
            })?;
        Self::from_specs(element_specs, compound_specs, rng)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn compounds(&self) -> &[Compound] {
        &self.compounds
    }

    /// Look up an element by symbol.
    pub fn element(&self, symbol: &str) -> Option<&Element> {
        self.by_symbol.get(symbol).map(|&i| &self.elements[i])
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.by_symbol.contains_key(symbol)
    }

    /// Look up a compound by name.
    pub fn compound(&self, name: &str) -> Option<&Compound> {
        self.compounds.iter().find(|c| c.name == name)
    }
}

/// Clamp each channel into 0..=255; missing channels become 0.
pub fn ensure_valid_color(channels: &[f64]) -> Rgb {
    let mut rgb = [0u8; 3];
    for (slot, value) in rgb.iter_mut().zip(channels) {
        *slot = value.trunc().clamp(0.0, 255.0) as u8;
    }
    rgb
}
