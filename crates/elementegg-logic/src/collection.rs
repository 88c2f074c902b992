//! Selected elements, inventory, purchasing and feeding.
//!
//! A player picks up to [`MAX_SELECTED_ELEMENTS`] elements per game. Only
//! selected elements can be bought with ore and fed to the egg. Purchases
//! and feedings are staged first (the +/- buttons and sliders) and applied
//! on confirm.
//!
//! # Invariants
//!
//! - the selection holds no duplicates and never exceeds the cap; adding to
//!   a full selection evicts the oldest pick (FIFO)
//! - every per-element quantity map is keyed by selected symbols only
//! - lifetime-fed counters never decrease

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::constants::selection::MAX_SELECTED_ELEMENTS;
use crate::progression::Progression;

/// Per-element quantities keyed by symbol.
pub type Quantities = BTreeMap<String, u32>;

/// What a selection toggle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Added,
    Removed,
    /// Added after evicting the oldest selection.
    Replaced { evicted: String },
}

/// Result of a confirmed feeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedReport {
    pub total_fed: u32,
    pub levels_gained: u32,
}

/// Everything the player owns or has staged, element by element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    selected: VecDeque<String>,
    inventory: Quantities,
    pending_purchase: Quantities,
    staged_feed: Quantities,
    lifetime_fed: BTreeMap<String, u64>,
}

impl Collection {
    /// Rebuild from saved parts. Duplicate symbols and symbols beyond the
    /// cap are dropped; inventory is restricted to the selection.
    pub fn restore(
        selected: impl IntoIterator<Item = String>,
        inventory: Quantities,
        lifetime_fed: BTreeMap<String, u64>,
    ) -> Self {
        let mut collection = Collection {
            lifetime_fed,
            ..Default::default()
        };
        for symbol in selected {
            if collection.selected.len() >= MAX_SELECTED_ELEMENTS
                || collection.selected.contains(&symbol)
            {
                log::warn!("Dropping extra selected element {}", symbol);
                continue;
            }
            collection.selected.push_back(symbol);
        }
        for symbol in collection.selected.iter() {
            let on_hand = inventory.get(symbol).copied().unwrap_or(0);
            collection.inventory.insert(symbol.clone(), on_hand);
        }
        collection
    }

    // ── Selection ──────────────────────────────────────────────────────

    /// Select `symbol`, or deselect it if already selected.
    pub fn toggle(&mut self, symbol: &str) -> SelectionChange {
        if self.is_selected(symbol) {
            self.selected.retain(|s| s != symbol);
            self.clear_quantities(symbol);
            return SelectionChange::Removed;
        }

        let evicted = if self.selected.len() >= MAX_SELECTED_ELEMENTS {
            self.selected.pop_front()
        } else {
            None
        };
        if let Some(old) = &evicted {
            self.clear_quantities(old);
        }

        self.selected.push_back(symbol.to_string());
        self.inventory.insert(symbol.to_string(), 0);
        match evicted {
            Some(evicted) => SelectionChange::Replaced { evicted },
            None => SelectionChange::Added,
        }
    }

    fn clear_quantities(&mut self, symbol: &str) {
        self.inventory.remove(symbol);
        self.pending_purchase.remove(symbol);
        self.staged_feed.remove(symbol);
    }

    pub fn is_selected(&self, symbol: &str) -> bool {
        self.selected.iter().any(|s| s == symbol)
    }

    /// Selected symbols, oldest first.
    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn selection_complete(&self) -> bool {
        self.selected.len() == MAX_SELECTED_ELEMENTS
    }

    // ── Inventory ──────────────────────────────────────────────────────

    pub fn on_hand(&self, symbol: &str) -> u32 {
        self.inventory.get(symbol).copied().unwrap_or(0)
    }

    pub fn inventory(&self) -> &Quantities {
        &self.inventory
    }

    pub fn lifetime_fed(&self) -> &BTreeMap<String, u64> {
        &self.lifetime_fed
    }

    pub fn fed_total(&self, symbol: &str) -> u64 {
        self.lifetime_fed.get(symbol).copied().unwrap_or(0)
    }

    // ── Purchasing ─────────────────────────────────────────────────────

    pub fn pending_purchase(&self, symbol: &str) -> u32 {
        self.pending_purchase.get(symbol).copied().unwrap_or(0)
    }

    pub fn pending_total(&self) -> u32 {
        self.pending_purchase.values().sum()
    }

    /// Move `qty` ore into the pending purchase for `symbol`.
    /// No-op returning `false` when unselected or short on ore.
    pub fn purchase(&mut self, progression: &mut Progression, symbol: &str, qty: u32) -> bool {
        if !self.is_selected(symbol) {
            log::debug!("Purchase of unselected element {} ignored", symbol);
            return false;
        }
        if !progression.try_spend_ore(qty) {
            log::debug!(
                "Purchase of {} {} rejected: only {} ore",
                qty,
                symbol,
                progression.ore_chunks
            );
            return false;
        }
        *self.pending_purchase.entry(symbol.to_string()).or_insert(0) += qty;
        true
    }

    /// Return up to `qty` pending units of `symbol` to ore. Returns the
    /// amount refunded.
    pub fn refund_purchase(&mut self, progression: &mut Progression, symbol: &str, qty: u32) -> u32 {
        let Some(pending) = self.pending_purchase.get_mut(symbol) else {
            return 0;
        };
        let refunded = qty.min(*pending);
        *pending -= refunded;
        progression.earn(0, refunded);
        refunded
    }

    /// Slider: set the pending quantity to a fraction of what could be
    /// afforded (ore on hand plus what is already pending for `symbol`).
    pub fn set_purchase(&mut self, progression: &mut Progression, symbol: &str, fraction: f32) -> bool {
        if !self.is_selected(symbol) {
            return false;
        }
        let current = self.pending_purchase(symbol);
        let available = progression.ore_chunks + current;
        let target = ((fraction.clamp(0.0, 1.0) * available as f32) as u32).min(available);
        if target >= current {
            self.purchase(progression, symbol, target - current)
        } else {
            self.refund_purchase(progression, symbol, current - target);
            true
        }
    }

    /// Commit every pending purchase into the inventory. Returns units committed.
    pub fn confirm_purchase(&mut self) -> u32 {
        let mut committed = 0;
        for (symbol, qty) in std::mem::take(&mut self.pending_purchase) {
            if qty == 0 {
                continue;
            }
            *self.inventory.entry(symbol).or_insert(0) += qty;
            committed += qty;
        }
        committed
    }

    /// Abandon every pending purchase, returning the ore.
    pub fn cancel_purchase(&mut self, progression: &mut Progression) -> u32 {
        let refunded = self.pending_total();
        self.pending_purchase.clear();
        progression.earn(0, refunded);
        refunded
    }

    // ── Feeding ────────────────────────────────────────────────────────

    pub fn staged_feed(&self, symbol: &str) -> u32 {
        self.staged_feed.get(symbol).copied().unwrap_or(0)
    }

    pub fn staged_feed_total(&self) -> u32 {
        self.staged_feed.values().sum()
    }

    /// +/- buttons: nudge the staged amount, clamped to `0..=on_hand`.
    pub fn adjust_feed(&mut self, symbol: &str, delta: i32) -> u32 {
        if !self.is_selected(symbol) {
            return 0;
        }
        let on_hand = self.on_hand(symbol) as i64;
        let staged = self.staged_feed(symbol) as i64;
        let next = (staged + delta as i64).clamp(0, on_hand) as u32;
        self.staged_feed.insert(symbol.to_string(), next);
        next
    }

    /// Slider: stage a fraction of what is on hand.
    pub fn set_feed(&mut self, symbol: &str, fraction: f32) -> u32 {
        if !self.is_selected(symbol) {
            return 0;
        }
        let on_hand = self.on_hand(symbol);
        let next = ((fraction.clamp(0.0, 1.0) * on_hand as f32) as u32).min(on_hand);
        self.staged_feed.insert(symbol.to_string(), next);
        next
    }

    pub fn clear_staged_feed(&mut self) {
        self.staged_feed.clear();
    }

    /// Feed the staged amounts and clear the staging area.
    pub fn feed_staged(&mut self, progression: &mut Progression) -> Option<FeedReport> {
        let amounts = std::mem::take(&mut self.staged_feed);
        self.feed(progression, &amounts)
    }

    /// Feed `amounts` to the egg. The whole request is rejected if any
    /// amount exceeds what is on hand.
    pub fn feed(&mut self, progression: &mut Progression, amounts: &Quantities) -> Option<FeedReport> {
        if let Some((symbol, qty)) = amounts
            .iter()
            .find(|(symbol, qty)| **qty > self.on_hand(symbol))
        {
            log::debug!(
                "Feeding {} {} rejected: only {} on hand",
                qty,
                symbol,
                self.on_hand(symbol)
            );
            return None;
        }

        let mut total_fed = 0;
        for (symbol, &qty) in amounts.iter() {
            if qty == 0 {
                continue;
            }
            if let Some(on_hand) = self.inventory.get_mut(symbol) {
                *on_hand -= qty;
            }
            *self.lifetime_fed.entry(symbol.clone()).or_insert(0) += qty as u64;
            total_fed += qty;
        }

        let levels_gained = progression.add_growth(total_fed);
        log::info!(
            "Fed {} elements, growth {}/{} at level {}",
            total_fed,
            progression.growth_level,
            crate::constants::growth::MAX_GROWTH_PER_LEVEL,
            progression.egg_level
        );
        Some(FeedReport {
            total_fed,
            levels_gained,
        })
    }

    /// Split all ore evenly across the selected elements; the remainder
    /// stays as ore. Returns units redeemed.
    pub fn redeem_ore(&mut self, progression: &mut Progression) -> u32 {
        if self.selected.is_empty() {
            log::debug!("No elements selected for redemption");
            return 0;
        }
        let per_element = progression.ore_chunks / self.selected.len() as u32;
        let redeemed = per_element * self.selected.len() as u32;
        if !progression.try_spend_ore(redeemed) {
            return 0;
        }
        for symbol in self.selected.iter() {
            *self.inventory.entry(symbol.clone()).or_insert(0) += per_element;
        }
        redeemed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(symbols: &[&str]) -> Collection {
        let mut c = Collection::default();
        for s in symbols {
            c.toggle(s);
        }
        c
    }

    fn rich(ore: u32) -> Progression {
        Progression {
            ore_chunks: ore,
            ..Default::default()
        }
    }

    #[test]
    fn test_toggle_adds_and_removes() {
        let mut c = Collection::default();
        assert_eq!(c.toggle("H"), SelectionChange::Added);
        assert!(c.is_selected("H"));
        assert_eq!(c.toggle("H"), SelectionChange::Removed);
        assert!(!c.is_selected("H"));
        assert!(c.inventory().is_empty());
    }

    #[test]
    fn test_fourth_pick_evicts_oldest() {
        let mut c = selected(&["H", "O", "C"]);
        let mut p = rich(10);
        assert!(c.purchase(&mut p, "H", 4));
        c.confirm_purchase();
        assert!(c.purchase(&mut p, "H", 2));

        assert_eq!(
            c.toggle("N"),
            SelectionChange::Replaced {
                evicted: "H".to_string()
            }
        );
        assert_eq!(c.selected().collect::<Vec<_>>(), vec!["O", "C", "N"]);
        assert_eq!(c.on_hand("H"), 0);
        assert_eq!(c.pending_purchase("H"), 0);
        assert!(!c.inventory().contains_key("H"));
        assert_eq!(c.selected_count(), MAX_SELECTED_ELEMENTS);
    }

    #[test]
    fn test_purchase_flow() {
        let mut c = selected(&["H", "O", "C"]);
        let mut p = rich(5);
        assert!(c.purchase(&mut p, "O", 3));
        assert_eq!(p.ore_chunks, 2);
        assert_eq!(c.pending_purchase("O"), 3);
        assert_eq!(c.confirm_purchase(), 3);
        assert_eq!(p.ore_chunks, 2);
        assert_eq!(c.on_hand("O"), 3);
        assert_eq!(c.pending_purchase("O"), 0);
    }

    #[test]
    fn test_purchase_rejected_silently() {
        let mut c = selected(&["H"]);
        let mut p = rich(2);
        assert!(!c.purchase(&mut p, "H", 3));
        assert!(!c.purchase(&mut p, "Fe", 1));
        assert_eq!(p.ore_chunks, 2);
        assert_eq!(c.pending_total(), 0);
    }

    #[test]
    fn test_refund_and_cancel() {
        let mut c = selected(&["H", "O"]);
        let mut p = rich(10);
        c.purchase(&mut p, "H", 4);
        c.purchase(&mut p, "O", 3);
        assert_eq!(c.refund_purchase(&mut p, "H", 10), 4);
        assert_eq!(p.ore_chunks, 6);
        assert_eq!(c.cancel_purchase(&mut p), 3);
        assert_eq!(p.ore_chunks, 10);
        assert_eq!(c.confirm_purchase(), 0);
    }

    #[test]
    fn test_purchase_slider() {
        let mut c = selected(&["H"]);
        let mut p = rich(10);
        assert!(c.set_purchase(&mut p, "H", 0.5));
        assert_eq!(c.pending_purchase("H"), 5);
        assert_eq!(p.ore_chunks, 5);
        assert!(c.set_purchase(&mut p, "H", 1.0));
        assert_eq!(c.pending_purchase("H"), 10);
        assert_eq!(p.ore_chunks, 0);
        assert!(c.set_purchase(&mut p, "H", 0.2));
        assert_eq!(c.pending_purchase("H"), 2);
        assert_eq!(p.ore_chunks, 8);
    }

    #[test]
    fn test_feed_moves_inventory_to_lifetime() {
        let mut c = selected(&["H", "O"]);
        let mut p = rich(60);
        c.purchase(&mut p, "H", 40);
        c.purchase(&mut p, "O", 20);
        c.confirm_purchase();

        let amounts: Quantities = [("H".to_string(), 40), ("O".to_string(), 15)].into();
        let report = c.feed(&mut p, &amounts).unwrap();
        assert_eq!(report.total_fed, 55);
        assert_eq!(report.levels_gained, 1);
        assert_eq!(p.egg_level, 2);
        assert_eq!(p.growth_level, 5);
        assert_eq!(c.on_hand("H"), 0);
        assert_eq!(c.on_hand("O"), 5);
        assert_eq!(c.fed_total("H"), 40);
        assert_eq!(c.fed_total("O"), 15);
    }

    #[test]
    fn test_feed_rejects_overdraw_atomically() {
        let mut c = selected(&["H", "O"]);
        let mut p = rich(3);
        c.purchase(&mut p, "H", 3);
        c.confirm_purchase();

        let amounts: Quantities = [("H".to_string(), 2), ("O".to_string(), 1)].into();
        assert!(c.feed(&mut p, &amounts).is_none());
        assert_eq!(c.on_hand("H"), 3);
        assert_eq!(c.fed_total("H"), 0);
        assert_eq!(p.growth_level, 0);
    }

    #[test]
    fn test_staged_feed_clamped() {
        let mut c = selected(&["H"]);
        let mut p = rich(4);
        c.purchase(&mut p, "H", 4);
        c.confirm_purchase();

        assert_eq!(c.adjust_feed("H", 10), 4);
        assert_eq!(c.adjust_feed("H", -1), 3);
        assert_eq!(c.adjust_feed("H", -10), 0);
        assert_eq!(c.set_feed("H", 0.5), 2);
        assert_eq!(c.adjust_feed("Xe", 1), 0);

        let report = c.feed_staged(&mut p).unwrap();
        assert_eq!(report.total_fed, 2);
        assert_eq!(c.staged_feed_total(), 0);
        assert_eq!(c.on_hand("H"), 2);
    }

    #[test]
    fn test_redeem_ore_splits_evenly() {
        let mut c = selected(&["H", "O", "C"]);
        let mut p = rich(10);
        assert_eq!(c.redeem_ore(&mut p), 9);
        assert_eq!(p.ore_chunks, 1);
        assert_eq!(c.on_hand("H"), 3);
        assert_eq!(c.on_hand("C"), 3);
    }

    #[test]
    fn test_redeem_without_selection() {
        let mut c = Collection::default();
        let mut p = rich(10);
        assert_eq!(c.redeem_ore(&mut p), 0);
        assert_eq!(p.ore_chunks, 10);
    }

    #[test]
    fn test_restore_drops_duplicates_and_foreign_inventory() {
        let inventory: Quantities = [("H".to_string(), 4), ("Zn".to_string(), 9)].into();
        let c = Collection::restore(
            ["H", "H", "O", "C", "N"].map(String::from),
            inventory,
            BTreeMap::new(),
        );
        assert_eq!(c.selected().collect::<Vec<_>>(), vec!["H", "O", "C"]);
        assert_eq!(c.on_hand("H"), 4);
        assert_eq!(c.on_hand("O"), 0);
        assert!(!c.inventory().contains_key("Zn"));
    }
}
