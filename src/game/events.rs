//! Tick Event Stream
//!
//! Everything notable that happened during a tick, in order, tagged with
//! the player distance at which it happened. Consumers (the demo binary,
//! a future presentation layer) read these instead of diffing snapshots.

use serde::{Deserialize, Serialize};

use crate::game::effects::BuffKind;
use crate::persist::Achievement;

/// One notable occurrence during a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    /// Player distance when the event fired.
    pub distance: f32,
    /// What happened.
    pub data: RunEventData,
}

/// Event payloads. Serialized tags are stable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunEventData {
    /// A hazard connected and cost a life.
    Damaged {
        /// Lives remaining after the hit.
        lives_left: u32,
    },
    /// A gem was picked up.
    GemCollected {
        /// Points the gem was worth.
        points: u32,
        /// Run score after the pickup.
        new_score: u32,
    },
    /// A word letter was picked up.
    LetterCollected {
        /// Index into the current word.
        index: usize,
        /// The glyph.
        letter: char,
    },
    /// A heart was picked up.
    HeartCollected {
        /// True when it healed; false when full health converted it
        /// into a score bonus.
        healed: bool,
    },
    /// A key was picked up.
    KeyCollected {
        /// Keys in inventory after the pickup.
        keys: u32,
    },
    /// The player entered a shop portal.
    ShopEntered,
    /// The level word completed and the run moved on.
    LevelAdvanced {
        /// The new level.
        level: u32,
        /// The new level's word.
        word: String,
    },
    /// Lives hit zero.
    GameOver {
        /// Final run score.
        score: u32,
    },
    /// The final level's word completed.
    Victory {
        /// Final run score, victory bonus included.
        score: u32,
    },
    /// The run resumed after a revive.
    Revived {
        /// True for the ad-reward revive, false for a key revive.
        via_ad: bool,
    },
    /// A timed buff ran out.
    BuffExpired {
        /// Which buff.
        kind: BuffKind,
    },
    /// A persistent achievement unlocked.
    AchievementUnlocked {
        /// Which achievement.
        achievement: Achievement,
    },
}

impl RunEvent {
    /// Damage event.
    pub fn damaged(distance: f32, lives_left: u32) -> Self {
        Self { distance, data: RunEventData::Damaged { lives_left } }
    }

    /// Gem pickup event.
    pub fn gem_collected(distance: f32, points: u32, new_score: u32) -> Self {
        Self { distance, data: RunEventData::GemCollected { points, new_score } }
    }

    /// Letter pickup event.
    pub fn letter_collected(distance: f32, index: usize, letter: char) -> Self {
        Self { distance, data: RunEventData::LetterCollected { index, letter } }
    }

    /// Heart pickup event.
    pub fn heart_collected(distance: f32, healed: bool) -> Self {
        Self { distance, data: RunEventData::HeartCollected { healed } }
    }

    /// Key pickup event.
    pub fn key_collected(distance: f32, keys: u32) -> Self {
        Self { distance, data: RunEventData::KeyCollected { keys } }
    }

    /// Shop portal event.
    pub fn shop_entered(distance: f32) -> Self {
        Self { distance, data: RunEventData::ShopEntered }
    }

    /// Level advance event.
    pub fn level_advanced(distance: f32, level: u32, word: String) -> Self {
        Self { distance, data: RunEventData::LevelAdvanced { level, word } }
    }

    /// Run-over event.
    pub fn game_over(distance: f32, score: u32) -> Self {
        Self { distance, data: RunEventData::GameOver { score } }
    }

    /// Victory event.
    pub fn victory(distance: f32, score: u32) -> Self {
        Self { distance, data: RunEventData::Victory { score } }
    }

    /// Revive event.
    pub fn revived(distance: f32, via_ad: bool) -> Self {
        Self { distance, data: RunEventData::Revived { via_ad } }
    }

    /// Buff expiry event.
    pub fn buff_expired(distance: f32, kind: BuffKind) -> Self {
        Self { distance, data: RunEventData::BuffExpired { kind } }
    }

    /// Achievement unlock event.
    pub fn achievement_unlocked(distance: f32, achievement: Achievement) -> Self {
        Self { distance, data: RunEventData::AchievementUnlocked { achievement } }
    }
}
