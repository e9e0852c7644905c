//! Persistent Player Stats and Achievements
//!
//! Cross-session statistics, serialized as a JSON blob with stable field
//! names. The in-memory representation uses Rust naming and tagged
//! variants; the wire names are pinned by serde attributes so renaming a
//! variant or field never breaks stored data.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One-time achievement unlocks.
///
/// The serialized ids are the stable persistence keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Achievement {
    /// Score 100,000+ in a single run.
    #[serde(rename = "CENTURY_HUNTER")]
    CenturyHunter,
    /// Reach level 10+.
    #[serde(rename = "SPEED_DEMON")]
    SpeedDemon,
    /// Collect 500+ gems total.
    #[serde(rename = "GEM_COLLECTOR")]
    GemCollector,
    /// Complete 50+ runs.
    #[serde(rename = "COMPLETIONIST")]
    Completionist,
    /// Finish a level without taking damage.
    #[serde(rename = "PERFECT_RUN")]
    PerfectRun,
    /// Collect 10+ keys total.
    #[serde(rename = "KEY_MASTER")]
    KeyMaster,
}

/// Score threshold for [`Achievement::CenturyHunter`].
pub const CENTURY_HUNTER_SCORE: u32 = 100_000;
/// Level threshold for [`Achievement::SpeedDemon`].
pub const SPEED_DEMON_LEVEL: u32 = 10;
/// Total-gems threshold for [`Achievement::GemCollector`].
pub const GEM_COLLECTOR_GEMS: u64 = 500;
/// Total-runs threshold for [`Achievement::Completionist`].
pub const COMPLETIONIST_RUNS: u64 = 50;
/// Total-keys threshold for [`Achievement::KeyMaster`].
pub const KEY_MASTER_KEYS: u64 = 10;

/// Statistics that survive across sessions.
///
/// Field names in the JSON blob are exactly the camelCase names below;
/// unknown fields in an old blob are ignored and missing fields default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistentStats {
    /// Runs started.
    pub total_runs: u64,
    /// Best single-run score.
    pub high_score: u32,
    /// Gems collected, all time.
    pub total_gems: u64,
    /// Distance traveled, all time.
    pub total_distance: f64,
    /// Pickups of any kind, all time.
    pub items_collected: u64,
    /// Display name.
    pub player_name: String,
    /// Unlocked achievements.
    pub achievements: BTreeSet<Achievement>,
    /// Highest level ever reached.
    pub highest_level: u32,
    /// Runs where the final level was entered at full lives.
    pub perfect_runs: u32,
    /// Keys collected, all time.
    pub total_keys: u64,
}

impl Default for PersistentStats {
    fn default() -> Self {
        Self {
            total_runs: 0,
            high_score: 0,
            total_gems: 0,
            total_distance: 0.0,
            items_collected: 0,
            player_name: "PILOT".to_string(),
            achievements: BTreeSet::new(),
            highest_level: 1,
            perfect_runs: 0,
            total_keys: 0,
        }
    }
}

impl PersistentStats {
    /// Evaluate achievement thresholds against these stats and the given
    /// run score/level, inserting any newly earned unlocks. Returns the
    /// achievements unlocked by this call.
    pub fn evaluate_achievements(&mut self, score: u32, level: u32) -> Vec<Achievement> {
        let mut unlocked = Vec::new();
        let mut earn = |set: &mut BTreeSet<Achievement>, a: Achievement, met: bool| {
            if met && set.insert(a) {
                unlocked.push(a);
            }
        };

        earn(&mut self.achievements, Achievement::CenturyHunter, score >= CENTURY_HUNTER_SCORE);
        earn(&mut self.achievements, Achievement::SpeedDemon, level >= SPEED_DEMON_LEVEL);
        earn(&mut self.achievements, Achievement::GemCollector, self.total_gems >= GEM_COLLECTOR_GEMS);
        earn(&mut self.achievements, Achievement::Completionist, self.total_runs >= COMPLETIONIST_RUNS);
        earn(&mut self.achievements, Achievement::PerfectRun, self.perfect_runs > 0);
        earn(&mut self.achievements, Achievement::KeyMaster, self.total_keys >= KEY_MASTER_KEYS);

        unlocked
    }
}
