//! Game Session: State Machine and Progression Ledger
//!
//! The single authoritative state of the active run. No ambient global:
//! the session is owned by the simulation root and passed explicitly to
//! every subsystem that needs it. All mutation happens on the one
//! simulation thread; external readers take snapshots between ticks.
//!
//! Invariant guards in this module are silent no-ops, not errors:
//! double-collecting a letter or reviving without keys just does nothing.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::persist::StatsLedger;
use crate::{LEVEL_SPEED_STEP, MAX_LEVEL, RUN_SPEED_BASE, VICTORY_BONUS};

/// The per-level words, cycled by `(level - 1) % LEVEL_WORDS.len()`.
pub const LEVEL_WORDS: [&str; 30] = [
    "SPACE", "STAR", "MOON", "MARS", "VOID",
    "ALIEN", "COMET", "ORBIT", "SOLAR", "ROBOT",
    "LASER", "EARTH", "VENUS", "PLUTO", "NEBULA",
    "COSMOS", "GALAXY", "PULSAR", "QUASAR", "ZODIAC",
    "ROCKET", "ASTRO", "LUNAR", "SATURN", "URANUS",
    "GRAVITY", "METEOR", "VORTEX", "INFINITY", "BEYOND",
];

/// Score bonus when a heart is collected at full health.
pub const HEART_OVERFLOW_BONUS: u32 = 500;

/// Lives at the start of a run.
pub const STARTING_LIVES: u32 = 3;

/// Session status. Serialized names are stable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    /// Initial state, no run active.
    #[default]
    Menu,
    /// Run in progress; the tick advances distance, spawning, collision.
    Playing,
    /// Run suspended entirely.
    Paused,
    /// Run suspended with the shop open; ledger effects of purchases apply.
    Shop,
    /// Terminal for the run; restart or a guarded revive may follow.
    GameOver,
    /// Terminal for the run; only restart may follow.
    Victory,
}

/// Result of applying damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Immortality absorbed the hit.
    Shrugged,
    /// One life lost, run continues.
    LostLife,
    /// Lives hit zero; the session moved to GAME_OVER in this step.
    Died,
}

/// Result of collecting a letter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LetterOutcome {
    /// Index already collected or out of range; nothing changed.
    Ignored,
    /// Letter recorded, word not yet complete.
    Collected,
    /// Word completed and the level advanced.
    LevelAdvanced,
    /// Word completed on the final level; the run is won.
    Victory,
}

/// Singleton state of the active run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameSession {
    /// Current status.
    pub status: GameStatus,
    /// Run score.
    pub score: u32,
    /// Current lives, always `<= max_lives`.
    pub lives: u32,
    /// Life cap, raised by shop purchases.
    pub max_lives: u32,
    /// Forward speed (units per second). Monotone within a run except for
    /// timed boost reverts, floored at [`RUN_SPEED_BASE`].
    pub speed: f32,
    /// Current level, 1-based.
    pub level: u32,
    /// Distance traveled this run.
    pub distance: f32,
    /// Gems picked up this run.
    pub gems_collected: u32,
    /// Indices of the current word already collected.
    pub collected_letters: BTreeSet<usize>,
    /// The word being collected this level.
    pub current_word: Vec<char>,
    /// Keys in inventory.
    pub keys: u32,
    /// Double jump unlocked (permanent for the run).
    pub has_double_jump: bool,
    /// On-demand immortality ability unlocked (permanent for the run).
    pub has_immortality: bool,
    /// Timed: hits are absorbed while set.
    pub is_immortality_active: bool,
    /// Timed: gem pickup extends across lanes while set.
    pub is_magnet_active: bool,
    /// Ad revive still available this run.
    pub can_use_ad_revive: bool,
    /// Ad key still available this run.
    pub can_use_ad_key: bool,
    /// Simulation clock in seconds. Advances only while PLAYING, so timed
    /// buffs freeze during PAUSED and SHOP.
    pub clock: f64,
    /// Whether the current level was entered at full lives (perfect-run
    /// accounting).
    level_entry_full_lives: bool,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// A fresh session sitting in the menu.
    pub fn new() -> Self {
        Self {
            status: GameStatus::Menu,
            score: 0,
            lives: STARTING_LIVES,
            max_lives: STARTING_LIVES,
            speed: 0.0,
            level: 1,
            distance: 0.0,
            gems_collected: 0,
            collected_letters: BTreeSet::new(),
            current_word: word_for_level(1),
            keys: 0,
            has_double_jump: false,
            has_immortality: false,
            is_immortality_active: false,
            is_magnet_active: false,
            can_use_ad_revive: true,
            can_use_ad_key: true,
            clock: 0.0,
            level_entry_full_lives: true,
        }
    }

    /// The current word as a string, for HUD snapshots and events.
    pub fn word(&self) -> String {
        self.current_word.iter().collect()
    }

    /// Whether every index of the current word has been collected.
    pub fn word_complete(&self) -> bool {
        self.collected_letters.len() == self.current_word.len()
    }

    fn reset_run(&mut self) {
        let keys = self.keys;
        *self = Self::new();
        // Keys are inventory, not run state
        self.keys = keys;
        self.status = GameStatus::Playing;
        self.speed = RUN_SPEED_BASE;
    }

    /// Start the first run from the menu.
    pub fn start_game(&mut self, ledger: &mut StatsLedger) {
        self.reset_run();
        ledger.record_run_started();
        info!(level = self.level, word = %self.word(), "run started");
    }

    /// Start a new run from a terminal state (or abandon the current one).
    /// Folds the abandoned score into the high score first.
    pub fn restart_game(&mut self, ledger: &mut StatsLedger) {
        ledger.record_score_checkpoint(self.score);
        self.reset_run();
        ledger.record_run_started();
        info!("run restarted");
    }

    /// Key revive from GAME_OVER: spends one key, refills lives, resets
    /// speed to base. Returns false (no state change) without a key or
    /// outside GAME_OVER. The caller grants the post-revive grace buff.
    pub fn revive_with_key(&mut self) -> bool {
        if self.status != GameStatus::GameOver || self.keys == 0 {
            return false;
        }
        self.keys -= 1;
        self.lives = self.max_lives;
        self.speed = RUN_SPEED_BASE;
        self.status = GameStatus::Playing;
        info!(keys_left = self.keys, "revived with key");
        true
    }

    /// Ad revive from GAME_OVER: single use per run, revives with one
    /// life. The caller grants the post-revive grace buff.
    pub fn revive_with_ad(&mut self) -> bool {
        if self.status != GameStatus::GameOver || !self.can_use_ad_revive {
            return false;
        }
        self.can_use_ad_revive = false;
        self.lives = 1;
        self.speed = RUN_SPEED_BASE;
        self.status = GameStatus::Playing;
        info!("revived via ad reward");
        true
    }

    /// Ad key grant: single use per run.
    pub fn grant_ad_key(&mut self, ledger: &mut StatsLedger) -> bool {
        if !self.can_use_ad_key {
            return false;
        }
        self.can_use_ad_key = false;
        self.keys += 1;
        ledger.record_ad_key();
        true
    }

    /// Apply one hit. Immortality absorbs it; at one life this kills the
    /// run and snapshots persistent stats in the same logical step.
    pub fn take_damage(&mut self, ledger: &mut StatsLedger) -> DamageOutcome {
        if self.is_immortality_active {
            return DamageOutcome::Shrugged;
        }
        if self.lives > 1 {
            self.lives -= 1;
            debug!(lives = self.lives, "damage taken");
            return DamageOutcome::LostLife;
        }

        self.lives = 0;
        self.speed = 0.0;
        self.status = GameStatus::GameOver;
        ledger.record_death(self.score, self.distance, self.level, self.level_entry_full_lives);
        info!(score = self.score, level = self.level, "run over");
        DamageOutcome::Died
    }

    /// Heart pickup: heal below max, otherwise convert to a score bonus.
    /// Returns true when it healed.
    pub fn collect_heart(&mut self) -> bool {
        if self.lives < self.max_lives {
            self.lives += 1;
            true
        } else {
            self.score += HEART_OVERFLOW_BONUS;
            false
        }
    }

    /// Key pickup from the corridor.
    pub fn collect_key(&mut self, ledger: &mut StatsLedger) {
        self.keys += 1;
        ledger.record_key_pickup();
    }

    /// Gem pickup.
    pub fn collect_gem(&mut self, points: u32, ledger: &mut StatsLedger) {
        self.score += points;
        self.gems_collected += 1;
        ledger.record_gem();
    }

    /// Letter pickup. Guarded against double collection (idempotent if
    /// fired twice in one tick) and against out-of-range indices. A
    /// completed word advances the level, or wins the run on the final
    /// level.
    pub fn collect_letter(&mut self, index: usize, ledger: &mut StatsLedger) -> LetterOutcome {
        if index >= self.current_word.len() || !self.collected_letters.insert(index) {
            return LetterOutcome::Ignored;
        }
        ledger.record_letter();

        if !self.word_complete() {
            return LetterOutcome::Collected;
        }

        if self.level < MAX_LEVEL {
            self.advance_level();
            LetterOutcome::LevelAdvanced
        } else {
            self.score += VICTORY_BONUS;
            self.status = GameStatus::Victory;
            ledger.record_victory(
                self.score,
                self.distance,
                self.level,
                self.level_entry_full_lives,
            );
            info!(score = self.score, "victory");
            LetterOutcome::Victory
        }
    }

    /// Move to the next level: reset collected letters, pick the next word
    /// cyclically, apply the fixed speed step. Lane count never changes.
    pub fn advance_level(&mut self) {
        self.level += 1;
        self.collected_letters.clear();
        self.current_word = word_for_level(self.level);
        self.speed += RUN_SPEED_BASE * LEVEL_SPEED_STEP;
        self.status = GameStatus::Playing;
        self.level_entry_full_lives = self.lives == self.max_lives;
        info!(level = self.level, word = %self.word(), speed = self.speed, "level advanced");
    }

    /// PLAYING → PAUSED. No-op in any other state.
    pub fn pause(&mut self) {
        if self.status == GameStatus::Playing {
            self.status = GameStatus::Paused;
        }
    }

    /// PAUSED → PLAYING. No-op in any other state.
    pub fn resume(&mut self) {
        if self.status == GameStatus::Paused {
            self.status = GameStatus::Playing;
        }
    }

    /// PLAYING → SHOP. No-op in any other state.
    pub fn open_shop(&mut self) {
        if self.status == GameStatus::Playing {
            self.status = GameStatus::Shop;
        }
    }

    /// SHOP → PLAYING, keeping ledger effects of purchases.
    pub fn close_shop(&mut self) {
        if self.status == GameStatus::Shop {
            self.status = GameStatus::Playing;
        }
    }
}

/// Word for a 1-based level, cycling through [`LEVEL_WORDS`].
pub fn word_for_level(level: u32) -> Vec<char> {
    let index = ((level - 1) as usize) % LEVEL_WORDS.len();
    LEVEL_WORDS[index].chars().collect()
}
