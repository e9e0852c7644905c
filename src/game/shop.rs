//! Shop Catalog and Purchases
//!
//! Purchases are atomic: insufficient score (or an already-owned one-time
//! item) returns false with no state change; otherwise the cost is
//! deducted and exactly one effect applies. Timed effects go through the
//! [`EffectQueue`] so their reverts follow the scheduled-effect rules.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::game::effects::{BuffKind, EffectQueue};
use crate::game::session::GameSession;

/// Speed added by the shop speed boost.
pub const SPEED_BOOST_DELTA: f32 = 20.0;
/// Duration of the shop speed boost.
pub const SPEED_BOOST_SECS: f64 = 5.0;
/// Duration of the shop shield recharge.
pub const SHIELD_BOOST_SECS: f64 = 10.0;
/// Duration of the lane-assist magnet.
pub const LANE_ASSIST_SECS: f64 = 15.0;

/// Purchasable item kinds. Serialized ids are stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShopItemKind {
    /// Permanent unlock: mid-air second jump.
    #[serde(rename = "DOUBLE_JUMP")]
    DoubleJump,
    /// Permanent +1 max life, with an accompanying heal.
    #[serde(rename = "MAX_LIFE")]
    MaxLife,
    /// Instant heal, clamped at max lives.
    #[serde(rename = "HEAL")]
    Heal,
    /// Permanent unlock: on-demand immortality ability.
    #[serde(rename = "IMMORTAL")]
    Immortal,
    /// Timed: +20 speed for 5 s, with invincibility while it lasts.
    #[serde(rename = "SPEED_BOOST")]
    SpeedBoost,
    /// Timed: invincibility for 10 s.
    #[serde(rename = "SHIELD_BOOST")]
    ShieldBoost,
    /// Timed: cross-lane gem magnet for 15 s.
    #[serde(rename = "LANE_ASSIST")]
    LaneAssist,
    /// Inventory: one revive key.
    #[serde(rename = "KEY")]
    Key,
}

impl ShopItemKind {
    /// Every purchasable kind, in catalog order.
    pub const ALL: [ShopItemKind; 8] = [
        ShopItemKind::DoubleJump,
        ShopItemKind::MaxLife,
        ShopItemKind::Heal,
        ShopItemKind::Immortal,
        ShopItemKind::SpeedBoost,
        ShopItemKind::ShieldBoost,
        ShopItemKind::LaneAssist,
        ShopItemKind::Key,
    ];

    /// Catalog price.
    pub fn cost(self) -> u32 {
        match self {
            ShopItemKind::DoubleJump => 1000,
            ShopItemKind::MaxLife => 1500,
            ShopItemKind::Heal => 1000,
            ShopItemKind::Immortal => 3000,
            ShopItemKind::SpeedBoost => 800,
            ShopItemKind::ShieldBoost => 1200,
            ShopItemKind::LaneAssist => 1000,
            ShopItemKind::Key => 5000,
        }
    }

    /// One-time items leave the offer pool once owned.
    pub fn one_time(self) -> bool {
        matches!(self, ShopItemKind::DoubleJump | ShopItemKind::Immortal)
    }
}

/// A purchasable entry in the current catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopItem {
    /// What it is.
    pub kind: ShopItemKind,
    /// Price in score.
    pub cost: u32,
    /// Removed from the pool once owned.
    pub one_time: bool,
}

/// The offer pool for the given session: one-time items already owned
/// are absent.
pub fn catalog(session: &GameSession) -> Vec<ShopItem> {
    ShopItemKind::ALL
        .into_iter()
        .filter(|kind| match kind {
            ShopItemKind::DoubleJump => !session.has_double_jump,
            ShopItemKind::Immortal => !session.has_immortality,
            _ => true,
        })
        .map(|kind| ShopItem { kind, cost: kind.cost(), one_time: kind.one_time() })
        .collect()
}

/// Atomic purchase. Returns false with no state change when the score
/// cannot cover the cost or the one-time item is already owned.
pub fn buy_item(
    session: &mut GameSession,
    effects: &mut EffectQueue,
    kind: ShopItemKind,
    cost: u32,
) -> bool {
    if session.score < cost {
        return false;
    }
    let already_owned = match kind {
        ShopItemKind::DoubleJump => session.has_double_jump,
        ShopItemKind::Immortal => session.has_immortality,
        _ => false,
    };
    if already_owned {
        return false;
    }

    session.score -= cost;
    match kind {
        ShopItemKind::DoubleJump => session.has_double_jump = true,
        ShopItemKind::MaxLife => {
            session.max_lives += 1;
            session.lives += 1;
        }
        ShopItemKind::Heal => session.lives = (session.lives + 1).min(session.max_lives),
        ShopItemKind::Immortal => session.has_immortality = true,
        ShopItemKind::SpeedBoost => {
            effects.schedule(session, BuffKind::SpeedBoost, SPEED_BOOST_SECS, SPEED_BOOST_DELTA);
        }
        ShopItemKind::ShieldBoost => {
            effects.schedule(session, BuffKind::Shield, SHIELD_BOOST_SECS, 0.0);
        }
        ShopItemKind::LaneAssist => {
            effects.schedule(session, BuffKind::Magnet, LANE_ASSIST_SECS, 0.0);
        }
        ShopItemKind::Key => session.keys += 1,
    }
    info!(?kind, cost, score_left = session.score, "item purchased");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{MemoryStore, StatsLedger};

    fn playing_session() -> GameSession {
        let mut ledger = StatsLedger::load(Box::new(MemoryStore::new()));
        let mut session = GameSession::new();
        session.start_game(&mut ledger);
        session
    }

    /// Scenario C: buying DOUBLE_JUMP once succeeds and deducts; buying
    /// it again fails and it leaves the offer pool.
    #[test]
    fn test_one_time_item_bought_once() {
        let mut session = playing_session();
        let mut effects = EffectQueue::new();
        session.score = 2000;

        assert!(buy_item(&mut session, &mut effects, ShopItemKind::DoubleJump, 1000));
        assert_eq!(session.score, 1000);
        assert!(session.has_double_jump);

        assert!(!buy_item(&mut session, &mut effects, ShopItemKind::DoubleJump, 1000));
        assert_eq!(session.score, 1000);

        let pool = catalog(&session);
        assert!(pool.iter().all(|item| item.kind != ShopItemKind::DoubleJump));
        assert!(pool.iter().any(|item| item.kind == ShopItemKind::Immortal));
    }

    #[test]
    fn test_insufficient_funds_mutates_nothing() {
        let mut session = playing_session();
        let mut effects = EffectQueue::new();
        session.score = 500;

        let before = session.clone();
        assert!(!buy_item(&mut session, &mut effects, ShopItemKind::ShieldBoost, 1200));
        assert_eq!(session.score, before.score);
        assert_eq!(session.is_immortality_active, before.is_immortality_active);
    }

    /// Scenario D: speed boost applies +20 and invincibility immediately;
    /// after five simulated seconds both revert.
    #[test]
    fn test_speed_boost_lifecycle() {
        let mut session = playing_session();
        let mut effects = EffectQueue::new();
        session.score = 800;

        assert!(buy_item(&mut session, &mut effects, ShopItemKind::SpeedBoost, 800));
        assert!((session.speed - 42.5).abs() < 1e-4);
        assert!(session.is_immortality_active);

        session.clock += 5.0;
        effects.expire_due(&mut session);
        assert!((session.speed - 22.5).abs() < 1e-4);
        assert!(!session.is_immortality_active);
    }

    #[test]
    fn test_max_life_heals_too() {
        let mut session = playing_session();
        let mut effects = EffectQueue::new();
        session.score = 1500;
        session.lives = 2;

        assert!(buy_item(&mut session, &mut effects, ShopItemKind::MaxLife, 1500));
        assert_eq!(session.max_lives, 4);
        assert_eq!(session.lives, 3);
    }

    #[test]
    fn test_heal_clamps_at_max() {
        let mut session = playing_session();
        let mut effects = EffectQueue::new();
        session.score = 2000;

        assert!(buy_item(&mut session, &mut effects, ShopItemKind::Heal, 1000));
        assert_eq!(session.lives, 3, "already at max");

        session.lives = 1;
        assert!(buy_item(&mut session, &mut effects, ShopItemKind::Heal, 1000));
        assert_eq!(session.lives, 2);
    }

    #[test]
    fn test_key_purchase_increments_inventory() {
        let mut session = playing_session();
        let mut effects = EffectQueue::new();
        session.score = 5000;

        assert!(buy_item(&mut session, &mut effects, ShopItemKind::Key, 5000));
        assert_eq!(session.keys, 1);
        assert_eq!(session.score, 0);
    }

    #[test]
    fn test_lane_assist_activates_magnet() {
        let mut session = playing_session();
        let mut effects = EffectQueue::new();
        session.score = 1000;

        assert!(buy_item(&mut session, &mut effects, ShopItemKind::LaneAssist, 1000));
        assert!(session.is_magnet_active);
        assert!(!session.is_immortality_active);

        session.clock += LANE_ASSIST_SECS;
        effects.expire_due(&mut session);
        assert!(!session.is_magnet_active);
    }

    #[test]
    fn test_item_ids_are_stable() {
        let json = serde_json::to_string(&ShopItemKind::LaneAssist).unwrap();
        assert_eq!(json, "\"LANE_ASSIST\"");
        let back: ShopItemKind = serde_json::from_str("\"SPEED_BOOST\"").unwrap();
        assert_eq!(back, ShopItemKind::SpeedBoost);
    }
}
