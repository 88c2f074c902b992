//! Game constants: growth thresholds, rewards, slot timing and file names.
//!
//! Plain numeric constants grouped by concern. Both the engine and the
//! simtest harness read these.

pub mod growth {
    /// Growth points needed to gain one egg level.
    pub const MAX_GROWTH_PER_LEVEL: u32 = 50;
    /// Egg level at which the creature hatches.
    pub const HATCH_LEVEL: u32 = 10;
    pub const STARTING_EGG_LEVEL: u32 = 1;
}

pub mod selection {
    /// Elements a player picks per game.
    pub const MAX_SELECTED_ELEMENTS: usize = 3;
    /// Lab bench bounds (inclusive).
    pub const MIN_LAB_ELEMENTS: usize = 2;
    pub const MAX_LAB_ELEMENTS: usize = 6;
}

pub mod currency {
    /// Tokens granted to a brand new game.
    pub const STARTING_TOKENS: u32 = 1;
    pub const STARTING_ORE: u32 = 0;
    /// Tokens consumed per slot spin.
    pub const SPIN_COST: u32 = 1;
    /// Ceiling used by the ore meter.
    pub const ORE_METER_CAP: u32 = 9999;
}

pub mod rewards {
    // Session rewards paid on every combination.
    pub const KNOWN_COMPOUND_TOKENS: u32 = 5;
    pub const KNOWN_COMPOUND_ORE: u32 = 10;
    pub const UNKNOWN_ORE_TOKENS: u32 = 1;
    pub const UNKNOWN_ORE_ORE: u32 = 2;

    // Displayed discovery tokens.
    pub const DISCOVERY_TOKENS_PER_ELEMENT: u32 = 2;
    pub const UNKNOWN_DISCOVERY_TOKENS: u32 = 1;
}

pub mod creature {
    /// Lifetime-fed quantity above which an element grows wings.
    pub const WINGS_THRESHOLD: u64 = 10;
    /// Lifetime-fed quantity above which an element grows a tail.
    pub const TAIL_THRESHOLD: u64 = 5;
    /// Elements tinting the creature red.
    pub const RED_ELEMENTS: [&str; 3] = ["O", "H", "C"];
    /// Elements tinting the creature green.
    pub const GREEN_ELEMENTS: [&str; 3] = ["N", "P", "S"];
}

pub mod slots {
    pub const REEL_COUNT: usize = 3;
    pub const VISIBLE_ROWS: usize = 3;
    /// Frames a spin lasts.
    pub const MAX_SPIN_FRAMES: u32 = 120;
    /// Reel `i` stops `i * REEL_STOP_STAGGER` frames before the budget ends.
    pub const REEL_STOP_STAGGER: u32 = 20;
    pub const STEP_DECREMENT: f32 = 0.05;
    pub const MIN_STEP: f32 = 1.0;
    /// Row index of the payline that pays double.
    pub const CENTER_ROW: usize = 1;
    pub const CENTER_ROW_MULTIPLIER: u32 = 2;
    pub const DIAMOND_PAYOUT: u32 = 100;
    pub const MONEY_BAG_PAYOUT: u32 = 75;
    pub const BANKNOTE_PAYOUT: u32 = 50;
}

pub mod timing {
    pub const TARGET_FPS: u32 = 30;
    /// Seconds between autosaves.
    pub const AUTOSAVE_INTERVAL_SECS: f32 = 60.0;
    /// How long the win banner stays up.
    pub const WIN_BANNER_MILLIS: u64 = 2000;
}

pub mod themes {
    pub const THEME_SONG_1: &str = "./SOUNDS/Element_Egg_001.mp3";
    pub const THEME_SONG_2: &str = "./SOUNDS/Element_Egg_002.mp3";
}

pub mod files {
    pub const ELEMENTS_FILE: &str = "data/elements.json";
    pub const COMPOUNDS_FILE: &str = "data/compounds.json";
    pub const SAVES_FILE: &str = "all_saves.json";
    pub const SOUND_PREFERENCE_FILE: &str = "sound_preference.json";
    pub const MUSIC_PREFERENCE_FILE: &str = "music_preference.json";
}

pub mod ui {
    /// Saved games listed on the load screen.
    pub const SAVED_GAMES_VISIBLE: usize = 5;
    pub const TOO_FEW_ELEMENTS_MESSAGE: &str = "Select at least 2 elements to combine.";
    pub const UNKNOWN_ORE_NAME: &str = "UNKNOWN ORE";
    pub const UNKNOWN_ORE_DESCRIPTION: &str =
        "You've discovered an UNKNOWN combination! Keep experimenting to earn more tokens.";
    pub const UNKNOWN_ORE_TRIVIA: &str = "Tip: Use TOKENS at the SLOT MACHINE to earn ORE!";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reel_stagger_fits_in_budget() {
        let last_reel = (slots::REEL_COUNT - 1) as u32;
        assert!(last_reel * slots::REEL_STOP_STAGGER < slots::MAX_SPIN_FRAMES / 2);
    }

    #[test]
    fn test_lab_bounds_ordered() {
        assert!(selection::MIN_LAB_ELEMENTS <= selection::MAX_LAB_ELEMENTS);
        assert!(selection::MAX_SELECTED_ELEMENTS <= selection::MAX_LAB_ELEMENTS);
    }

    #[test]
    fn test_creature_tints_disjoint() {
        for red in creature::RED_ELEMENTS {
            assert!(!creature::GREEN_ELEMENTS.contains(&red));
        }
    }
}
