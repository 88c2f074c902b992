//! Creature traits derived when the egg hatches.
//!
//! Traits are a pure function of the selected elements and how much of each
//! has ever been fed. They are computed once, when the egg first reaches
//! the hatch level, and never recomputed for that game.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::Rgb;
use crate::collection::Collection;
use crate::constants::creature::{GREEN_ELEMENTS, RED_ELEMENTS, TAIL_THRESHOLD, WINGS_THRESHOLD};

/// Body parts a creature can grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BodyPart {
    Wings,
    Tail,
}

/// Tint contributed by one selected element.
pub fn element_tint(symbol: &str) -> Rgb {
    if RED_ELEMENTS.contains(&symbol) {
        [255, 0, 0]
    } else if GREEN_ELEMENTS.contains(&symbol) {
        [0, 255, 0]
    } else {
        [0, 0, 255]
    }
}

/// Write-once snapshot of the hatched creature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureTraits {
    /// One color per selected element, in selection order.
    pub colors: Vec<Rgb>,
    /// Total lifetime-fed quantity of the selected elements.
    pub size: u64,
    pub body_parts: BTreeSet<BodyPart>,
}

impl CreatureTraits {
    /// Derive traits from the current selection and feeding history.
    pub fn derive(collection: &Collection) -> Self {
        let mut colors = Vec::new();
        let mut size = 0;
        let mut body_parts = BTreeSet::new();

        for symbol in collection.selected() {
            let fed = collection.fed_total(symbol);
            colors.push(element_tint(symbol));
            size += fed;
            if fed > WINGS_THRESHOLD {
                body_parts.insert(BodyPart::Wings);
            }
            if fed > TAIL_THRESHOLD {
                body_parts.insert(BodyPart::Tail);
            }
        }

        Self {
            colors,
            size,
            body_parts,
        }
    }

    pub fn body_color(&self) -> Rgb {
        self.colors.first().copied().unwrap_or([255, 255, 255])
    }

    pub fn wing_color(&self) -> Rgb {
        self.colors.get(1).copied().unwrap_or([200, 200, 200])
    }

    pub fn tail_color(&self) -> Rgb {
        self.colors.get(2).copied().unwrap_or([100, 100, 100])
    }

    pub fn has(&self, part: BodyPart) -> bool {
        self.body_parts.contains(&part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Quantities;
    use crate::progression::Progression;

    fn fed(amounts: &[(&str, u32)]) -> Collection {
        let mut c = Collection::default();
        let mut p = Progression {
            ore_chunks: 1000,
            ..Default::default()
        };
        for (symbol, qty) in amounts {
            c.toggle(symbol);
            c.purchase(&mut p, symbol, *qty);
        }
        c.confirm_purchase();
        let feed: Quantities = amounts.iter().map(|(s, q)| (s.to_string(), *q)).collect();
        c.feed(&mut p, &feed).unwrap();
        c
    }

    #[test]
    fn test_tints() {
        assert_eq!(element_tint("O"), [255, 0, 0]);
        assert_eq!(element_tint("S"), [0, 255, 0]);
        assert_eq!(element_tint("Fe"), [0, 0, 255]);
    }

    #[test]
    fn test_traits_from_feeding() {
        let traits = CreatureTraits::derive(&fed(&[("H", 12), ("N", 6), ("Fe", 1)]));
        assert_eq!(traits.colors, vec![[255, 0, 0], [0, 255, 0], [0, 0, 255]]);
        assert_eq!(traits.size, 19);
        assert!(traits.has(BodyPart::Wings));
        assert!(traits.has(BodyPart::Tail));
        assert_eq!(traits.body_parts.len(), 2);
    }

    #[test]
    fn test_body_parts_are_a_set() {
        // Every element qualifies for both parts; each appears once.
        let traits = CreatureTraits::derive(&fed(&[("H", 20), ("O", 20), ("C", 20)]));
        assert_eq!(traits.body_parts.len(), 2);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let traits = CreatureTraits::derive(&fed(&[("H", 10), ("O", 5)]));
        assert!(!traits.has(BodyPart::Wings));
        assert!(traits.has(BodyPart::Tail));

        let traits = CreatureTraits::derive(&fed(&[("H", 5)]));
        assert!(traits.body_parts.is_empty());
    }

    #[test]
    fn test_derive_is_deterministic() {
        let c = fed(&[("H", 12), ("O", 3)]);
        assert_eq!(CreatureTraits::derive(&c), CreatureTraits::derive(&c));
    }

    #[test]
    fn test_fallback_colors() {
        let traits = CreatureTraits::derive(&Collection::default());
        assert_eq!(traits.body_color(), [255, 255, 255]);
        assert_eq!(traits.wing_color(), [200, 200, 200]);
        assert_eq!(traits.tail_color(), [100, 100, 100]);
        assert_eq!(traits.size, 0);
    }
}
