//! Entity Registry
//!
//! Owns every spawned object in the corridor: obstacles, gems, letters,
//! hearts, keys, shop portals, aliens and missiles. Entities are created
//! by the spawner, deactivated by the collision resolver or the expiry
//! sweep, and removed once deactivated. Uses BTreeMap for deterministic
//! iteration order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::LANE_COUNT;

/// Unique entity identifier (monotonic counter, never reused in a run).
pub type EntityId = u32;

/// Kind of spawned object.
///
/// The serialized names are a stable mapping for snapshots and events;
/// renaming a Rust variant must not change stored or emitted data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    /// Static hazard; low variants are clearable by jump, barriers are not.
    Obstacle,
    /// Score pickup with a per-tier point value.
    Gem,
    /// One letter of the current level word.
    Letter,
    /// Entering it suspends the run and opens the shop.
    ShopPortal,
    /// Ground hazard that fires a missile when the player closes in.
    Alien,
    /// Moving hazard closing on the player.
    Missile,
    /// Heals one life, or converts to score at full health.
    Heart,
    /// Inventory pickup spent on revives.
    Key,
}

impl EntityKind {
    /// Whether this kind blocks a lane for the spawn-fairness check.
    #[inline]
    pub fn is_hazard(self) -> bool {
        matches!(self, EntityKind::Obstacle | EntityKind::Alien | EntityKind::Missile)
    }
}

/// Kind-specific data attached to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// No extra data.
    None,
    /// Gem tier point value.
    Gem {
        /// Score awarded on pickup.
        points: u32,
    },
    /// Letter of the current word.
    Letter {
        /// The glyph, for display.
        letter: char,
        /// Index into the current word this letter fills.
        target_index: usize,
    },
    /// Obstacle geometry.
    Obstacle {
        /// Low obstacles are cleared by a jump; full barriers are not.
        clearable: bool,
    },
    /// Alien state.
    Alien {
        /// Set once the alien has fired its missile.
        fired: bool,
    },
}

/// A spawned object in the corridor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entity {
    /// Unique id (monotonic).
    pub id: EntityId,
    /// What this object is.
    pub kind: EntityKind,
    /// Lane index, always in `[0, LANE_COUNT)`.
    pub lane: u8,
    /// Forward world coordinate at which the entity sits.
    pub distance: f32,
    /// False once collected, hit, or expired. Deactivation is idempotent.
    pub active: bool,
    /// Kind-specific data.
    pub payload: Payload,
}

impl Entity {
    /// Distance of this entity ahead of (positive) or behind (negative)
    /// the given player distance.
    #[inline]
    pub fn distance_ahead(&self, player_distance: f32) -> f32 {
        self.distance - player_distance
    }
}

/// Exclusive owner of all active entities.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, Entity>,
    next_id: EntityId,
}

impl EntityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a new entity and return its id.
    ///
    /// Lane indices are clamped into `[0, LANE_COUNT)`; the spawner never
    /// produces an out-of-range lane, this keeps the invariant local.
    pub fn spawn(&mut self, kind: EntityKind, lane: u8, distance: f32, payload: Payload) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;

        let entity = Entity {
            id,
            kind,
            lane: lane.min(LANE_COUNT - 1),
            distance,
            active: true,
            payload,
        };
        self.entities.insert(id, entity);
        id
    }

    /// Deactivate an entity. Calling twice (or on a removed id) is a no-op.
    pub fn deactivate(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.active = false;
        }
    }

    /// Look up an entity by id.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutable lookup, for the tick driver (alien fire flags, missile motion).
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Visit every active entity in id order.
    pub fn for_each_active(&self, mut visitor: impl FnMut(&Entity)) {
        for entity in self.entities.values().filter(|e| e.active) {
            visitor(entity);
        }
    }

    /// Iterate active entities.
    pub fn iter_active(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(|e| e.active)
    }

    /// Number of active entities.
    pub fn active_count(&self) -> usize {
        self.entities.values().filter(|e| e.active).count()
    }

    /// Deactivate and drop everything that fell behind the threshold.
    /// Returns how many entities were freed.
    pub fn purge_behind(&mut self, threshold_distance: f32) -> usize {
        let before = self.entities.len();
        self.entities.retain(|_, e| e.distance >= threshold_distance);
        before - self.entities.len()
    }

    /// Remove entities deactivated earlier in the tick. Runs after all
    /// consumers of this tick's contacts have been applied, so no dangling
    /// reference survives into the next frame.
    pub fn sweep(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|_, e| e.active);
        before - self.entities.len()
    }

    /// Drop every entity. Used on run start/restart.
    pub fn clear(&mut self) {
        self.entities.clear();
    }
}
