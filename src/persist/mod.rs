//! Stats Persistence
//!
//! The core never touches storage directly. An external collaborator
//! provides a [`StatsStore`] (a key-value blob store); the [`StatsLedger`]
//! wraps it with write-through semantics: every stats mutation is saved
//! immediately, and a missing or corrupt blob falls back to defaults with
//! a logged warning. Nothing here is ever fatal to the process.

pub mod stats;

use thiserror::Error;
use tracing::warn;

pub use stats::{Achievement, PersistentStats};

/// Errors a storage backend may report.
///
/// Both are recovered locally: the ledger logs and continues with
/// in-memory state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or refused the operation.
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    /// The stored blob is not valid JSON for the expected shape.
    #[error("malformed stats blob: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// External key-value blob store holding the persisted stats.
pub trait StatsStore {
    /// Load the stored blob, `None` if nothing was ever saved.
    fn load(&mut self) -> Result<Option<String>, StoreError>;
    /// Persist the blob.
    fn save(&mut self, blob: &str) -> Result<(), StoreError>;
}

/// In-memory store for tests and the demo binary.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blob: Option<String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a blob.
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self { blob: Some(blob.into()) }
    }

    /// The current blob, if any.
    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }
}

impl StatsStore for MemoryStore {
    fn load(&mut self) -> Result<Option<String>, StoreError> {
        Ok(self.blob.clone())
    }

    fn save(&mut self, blob: &str) -> Result<(), StoreError> {
        self.blob = Some(blob.to_string());
        Ok(())
    }
}

/// Write-through ledger over a [`StatsStore`].
///
/// Every checkpoint (death, victory, pickups, run start) mutates the
/// in-memory stats and saves immediately, so a crash never loses more
/// than the current frame.
pub struct StatsLedger {
    stats: PersistentStats,
    store: Box<dyn StatsStore>,
}

impl StatsLedger {
    /// Load stats from the store. Corrupt or missing data yields defaults.
    pub fn load(mut store: Box<dyn StatsStore>) -> Self {
        let stats = match store.load() {
            Ok(Some(blob)) => match serde_json::from_str(&blob) {
                Ok(stats) => stats,
                Err(err) => {
                    warn!(%err, "corrupt stats blob, starting from defaults");
                    PersistentStats::default()
                }
            },
            Ok(None) => PersistentStats::default(),
            Err(err) => {
                warn!(%err, "stats store unavailable, starting from defaults");
                PersistentStats::default()
            }
        };
        Self { stats, store }
    }

    /// Read-only view of the current stats.
    pub fn stats(&self) -> &PersistentStats {
        &self.stats
    }

    fn flush(&mut self) {
        match serde_json::to_string(&self.stats) {
            Ok(blob) => {
                if let Err(err) = self.store.save(&blob) {
                    warn!(%err, "failed to persist stats");
                }
            }
            Err(err) => warn!(%err, "failed to encode stats"),
        }
    }

    /// A run started (start or restart).
    pub fn record_run_started(&mut self) {
        self.stats.total_runs += 1;
        self.flush();
    }

    /// Fold the current run score into the high score, without ending
    /// the run. Used when restarting mid-run.
    pub fn record_score_checkpoint(&mut self, score: u32) {
        self.stats.high_score = self.stats.high_score.max(score);
        self.flush();
    }

    /// A gem was picked up.
    pub fn record_gem(&mut self) {
        self.stats.total_gems += 1;
        self.stats.items_collected += 1;
        self.flush();
    }

    /// A letter was picked up.
    pub fn record_letter(&mut self) {
        self.stats.items_collected += 1;
        self.flush();
    }

    /// A key was picked up in the corridor.
    pub fn record_key_pickup(&mut self) {
        self.stats.total_keys += 1;
        self.stats.items_collected += 1;
        self.flush();
    }

    /// A key was granted by the ad collaborator (not a corridor pickup).
    pub fn record_ad_key(&mut self) {
        self.stats.total_keys += 1;
        self.flush();
    }

    /// Snapshot run results on death.
    pub fn record_death(&mut self, score: u32, distance: f32, level: u32, perfect: bool) {
        self.stats.high_score = self.stats.high_score.max(score);
        self.stats.total_distance += distance as f64;
        self.stats.highest_level = self.stats.highest_level.max(level);
        if perfect {
            self.stats.perfect_runs += 1;
        }
        self.flush();
    }

    /// Snapshot run results on victory.
    pub fn record_victory(&mut self, score: u32, distance: f32, level: u32, perfect: bool) {
        self.stats.high_score = self.stats.high_score.max(score);
        self.stats.total_distance += distance as f64;
        self.stats.highest_level = self.stats.highest_level.max(level);
        if perfect {
            self.stats.perfect_runs += 1;
        }
        self.flush();
    }

    /// Set the display name (empty names fall back to the default).
    pub fn set_player_name(&mut self, name: &str) {
        self.stats.player_name = if name.is_empty() {
            PersistentStats::default().player_name
        } else {
            name.to_string()
        };
        self.flush();
    }

    /// Evaluate achievement thresholds; persists and returns new unlocks.
    pub fn check_achievements(&mut self, score: u32, level: u32) -> Vec<Achievement> {
        let unlocked = self.stats.evaluate_achievements(score, level);
        if !unlocked.is_empty() {
            self.flush();
        }
        unlocked
    }
}
