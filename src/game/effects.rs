//! Timed Buffs
//!
//! Buffs are scheduled effects carrying only their identity, expiry time
//! and (for speed boosts) the applied delta — never a captured flag value.
//! Expiry re-derives each flag from the set of still-live effects, so a
//! buff started after another one's timer began is never cancelled early
//! by the earlier revert. Expiry times are simulation seconds on the
//! session clock, which only advances while PLAYING: countdowns freeze
//! during PAUSED and SHOP.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::session::GameSession;
use crate::RUN_SPEED_BASE;

/// Post-revive grace duration in seconds.
pub const REVIVE_GRACE_SECS: f64 = 3.0;

/// Duration of the owned on-demand immortality ability.
pub const ABILITY_SHIELD_SECS: f64 = 5.0;

/// A timed state modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuffKind {
    /// Shop speed boost: +speed and invincibility for its duration.
    SpeedBoost,
    /// Shop shield recharge: invincibility.
    Shield,
    /// Shop lane assist: cross-lane gem magnet.
    Magnet,
    /// Short invincibility after a revive.
    ReviveGrace,
    /// The owned on-demand immortality ability.
    AbilityShield,
}

impl BuffKind {
    /// Whether this buff raises the immortality-active flag.
    #[inline]
    pub fn grants_immortality(self) -> bool {
        !matches!(self, BuffKind::Magnet)
    }
}

/// A scheduled buff revert.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct TimedEffect {
    kind: BuffKind,
    /// Session-clock time at which the buff reverts.
    expires_at: f64,
    /// Speed added when the buff started, removed on expiry.
    speed_delta: f32,
}

/// All pending buff reverts for the run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EffectQueue {
    pending: Vec<TimedEffect>,
}

impl EffectQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every pending effect. Used on run start; session flags are
    /// reset separately by the run reset.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Whether any live effect of this kind is pending.
    pub fn has_pending(&self, kind: BuffKind) -> bool {
        self.pending.iter().any(|e| e.kind == kind)
    }

    /// Start a buff: apply its grant to the session now and schedule the
    /// revert. Concurrent buffs stack independently, each with its own
    /// timer.
    pub fn schedule(
        &mut self,
        session: &mut GameSession,
        kind: BuffKind,
        duration_secs: f64,
        speed_delta: f32,
    ) {
        session.speed += speed_delta;
        if kind.grants_immortality() {
            session.is_immortality_active = true;
        }
        if kind == BuffKind::Magnet {
            session.is_magnet_active = true;
        }

        self.pending.push(TimedEffect {
            kind,
            expires_at: session.clock + duration_secs,
            speed_delta,
        });
        debug!(?kind, duration_secs, "buff started");
    }

    /// Revert every effect whose time has come. Flags are recomputed from
    /// the effects still live — the current state, not a value captured at
    /// schedule time. Returns the kinds that expired, in expiry order.
    pub fn expire_due(&mut self, session: &mut GameSession) -> Vec<BuffKind> {
        if self.pending.is_empty() {
            return Vec::new();
        }

        let now = session.clock;
        let mut expired: Vec<TimedEffect> =
            self.pending.iter().copied().filter(|e| e.expires_at <= now).collect();
        if expired.is_empty() {
            return Vec::new();
        }
        expired.sort_by(|a, b| a.expires_at.total_cmp(&b.expires_at));
        self.pending.retain(|e| e.expires_at > now);

        for effect in &expired {
            if effect.speed_delta != 0.0 {
                session.speed = (session.speed - effect.speed_delta).max(RUN_SPEED_BASE);
            }
            debug!(kind = ?effect.kind, "buff expired");
        }

        // Read-modify-write against the live set, never a blind overwrite
        session.is_immortality_active =
            self.pending.iter().any(|e| e.kind.grants_immortality());
        session.is_magnet_active = self.pending.iter().any(|e| e.kind == BuffKind::Magnet);

        expired.into_iter().map(|e| e.kind).collect()
    }
}
