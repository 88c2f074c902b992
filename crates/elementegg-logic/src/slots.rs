//! Slot-machine mini-game.
//!
//! Three reels, three visible rows. A spin lasts a fixed frame budget;
//! reel `i` freezes `i * stop_stagger` frames before the end so the reels
//! settle right to left. On the final frame the machine returns to idle and
//! evaluates the window once: every row showing three identical symbols
//! pays that symbol's payout, doubled on the center row.
//!
//! The machine never touches currency. The session pays the spin cost
//! before calling [`SlotMachine::spin`] and credits the payout from the
//! [`SpinOutcome`] returned by [`SlotMachine::tick`].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::slots::{
    BANKNOTE_PAYOUT, CENTER_ROW, CENTER_ROW_MULTIPLIER, DIAMOND_PAYOUT, MAX_SPIN_FRAMES, MIN_STEP,
    MONEY_BAG_PAYOUT, REEL_COUNT, REEL_STOP_STAGGER, STEP_DECREMENT, VISIBLE_ROWS,
};

/// Reel symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotSymbol {
    Diamond,
    MoneyBag,
    Banknote,
}

impl SlotSymbol {
    pub const ALL: [SlotSymbol; 3] = [SlotSymbol::Diamond, SlotSymbol::MoneyBag, SlotSymbol::Banknote];

    pub fn glyph(self) -> &'static str {
        match self {
            SlotSymbol::Diamond => "💎",
            SlotSymbol::MoneyBag => "💰",
            SlotSymbol::Banknote => "💵",
        }
    }
}

/// Tuning for the slot machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotConfig {
    pub frame_budget: u32,
    pub stop_stagger: u32,
    pub initial_step: f32,
    pub step_decrement: f32,
    pub min_step: f32,
    pub diamond_payout: u32,
    pub money_bag_payout: u32,
    pub banknote_payout: u32,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            frame_budget: MAX_SPIN_FRAMES,
            stop_stagger: REEL_STOP_STAGGER,
            initial_step: MIN_STEP,
            step_decrement: STEP_DECREMENT,
            min_step: MIN_STEP,
            diamond_payout: DIAMOND_PAYOUT,
            money_bag_payout: MONEY_BAG_PAYOUT,
            banknote_payout: BANKNOTE_PAYOUT,
        }
    }
}

impl SlotConfig {
    pub fn payout(&self, symbol: SlotSymbol) -> u32 {
        match symbol {
            SlotSymbol::Diamond => self.diamond_payout,
            SlotSymbol::MoneyBag => self.money_bag_payout,
            SlotSymbol::Banknote => self.banknote_payout,
        }
    }
}

/// Machine lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SpinPhase {
    Idle,
    Spinning { frame: u32, step: f32 },
}

/// A winning row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineWin {
    pub row: usize,
    pub symbol: SlotSymbol,
    pub amount: u32,
}

/// Result of a settled spin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub window: [[SlotSymbol; REEL_COUNT]; VISIBLE_ROWS],
    pub line_wins: Vec<LineWin>,
    pub payout: u32,
}

/// Three-reel slot machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotMachine {
    config: SlotConfig,
    reels: [Vec<SlotSymbol>; REEL_COUNT],
    offsets: [usize; REEL_COUNT],
    /// `window[row][reel]`
    window: [[SlotSymbol; REEL_COUNT]; VISIBLE_ROWS],
    phase: SpinPhase,
    spins: u64,
}

impl Default for SlotMachine {
    fn default() -> Self {
        Self::new(SlotConfig::default())
    }
}

impl SlotMachine {
    /// Machine with the default strips (one of each symbol per reel).
    pub fn new(config: SlotConfig) -> Self {
        let strip = SlotSymbol::ALL.to_vec();
        Self::with_reels(config, [strip.clone(), strip.clone(), strip])
    }

    /// Machine with custom reel strips. Empty strips fall back to the default.
    pub fn with_reels(config: SlotConfig, reels: [Vec<SlotSymbol>; REEL_COUNT]) -> Self {
        let reels = reels.map(|strip| {
            if strip.is_empty() {
                SlotSymbol::ALL.to_vec()
            } else {
                strip
            }
        });
        let mut machine = Self {
            config,
            reels,
            offsets: [0; REEL_COUNT],
            window: [[SlotSymbol::Diamond; REEL_COUNT]; VISIBLE_ROWS],
            phase: SpinPhase::Idle,
            spins: 0,
        };
        for reel in 0..REEL_COUNT {
            machine.refresh_column(reel);
        }
        machine
    }

    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    pub fn phase(&self) -> SpinPhase {
        self.phase
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self.phase, SpinPhase::Spinning { .. })
    }

    /// Visible symbols, `window()[row][reel]`.
    pub fn window(&self) -> &[[SlotSymbol; REEL_COUNT]; VISIBLE_ROWS] {
        &self.window
    }

    pub fn offsets(&self) -> [usize; REEL_COUNT] {
        self.offsets
    }

    pub fn spins(&self) -> u64 {
        self.spins
    }

    fn refresh_column(&mut self, reel: usize) {
        let strip = &self.reels[reel];
        for row in 0..VISIBLE_ROWS {
            self.window[row][reel] = strip[(self.offsets[reel] + row) % strip.len()];
        }
    }

    /// Start a spin. Returns `false` if a spin is already running.
    pub fn spin<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.is_spinning() {
            return false;
        }
        for reel in 0..REEL_COUNT {
            self.offsets[reel] = rng.gen_range(0..self.reels[reel].len());
            self.refresh_column(reel);
        }
        self.phase = SpinPhase::Spinning {
            frame: 0,
            step: self.config.initial_step,
        };
        self.spins += 1;
        true
    }

    /// Advance one frame. Returns the outcome on the frame the spin settles.
    pub fn tick(&mut self) -> Option<SpinOutcome> {
        let SpinPhase::Spinning { frame, step } = self.phase else {
            return None;
        };
        let frame = frame + 1;
        let budget = self.config.frame_budget;

        if frame >= budget {
            self.phase = SpinPhase::Idle;
            return Some(self.evaluate());
        }

        let advance = step.floor().max(1.0) as usize;
        for reel in 0..REEL_COUNT {
            let stop_at = budget.saturating_sub(reel as u32 * self.config.stop_stagger);
            if frame < stop_at {
                self.offsets[reel] = (self.offsets[reel] + advance) % self.reels[reel].len();
                self.refresh_column(reel);
            }
        }

        let step = if frame > budget / 2 {
            (step - self.config.step_decrement).max(self.config.min_step)
        } else {
            step
        };
        self.phase = SpinPhase::Spinning { frame, step };
        None
    }

    /// Score the current window.
    pub fn evaluate(&self) -> SpinOutcome {
        let mut line_wins = Vec::new();
        for (row, symbols) in self.window.iter().enumerate() {
            let first = symbols[0];
            if symbols.iter().all(|&s| s == first) {
                let multiplier = if row == CENTER_ROW {
                    CENTER_ROW_MULTIPLIER
                } else {
                    1
                };
                line_wins.push(LineWin {
                    row,
                    symbol: first,
                    amount: self.config.payout(first) * multiplier,
                });
            }
        }
        let payout = line_wins.iter().map(|w| w.amount).sum();
        SpinOutcome {
            window: self.window,
            line_wins,
            payout,
        }
    }
}
