//! Collision Resolution
//!
//! A pure pass over the registry: given the player's movement this tick,
//! report every contact as an outcome the driver applies afterwards. The
//! resolver never mutates anything and never consults immortality;
//! absorbing a hit is the session's call, not a geometric one.
//!
//! Contacts are resolved against the swept interval the player covered
//! this tick, not just the final pose: a fast run (or a long Δt) whose
//! step exceeds the proximity band cannot tunnel through an entity.

use crate::game::entity::{EntityId, EntityKind, EntityRegistry, Payload};
use crate::game::input::PlayerPose;

/// Forward gap within which an entity and the player touch.
pub const PROXIMITY_EPSILON: f32 = 0.9;

/// Jump height above which clearable obstacles pass underneath.
pub const CLEAR_HEIGHT: f32 = 1.2;

/// What a contact means for the session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ContactOutcome {
    /// A hazard connected.
    Damage,
    /// Gem pickup.
    CollectGem {
        /// Points the gem is worth.
        points: u32,
    },
    /// Letter pickup.
    CollectLetter {
        /// Index into the current word.
        index: usize,
        /// The glyph.
        letter: char,
    },
    /// Heart pickup.
    CollectHeart,
    /// Key pickup.
    CollectKey,
    /// Shop portal entry.
    EnterShop,
}

/// One contact between the player and an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// The entity touched.
    pub id: EntityId,
    /// What the driver should do about it.
    pub outcome: ContactOutcome,
    /// Forward coordinate of the entity, for ordering along the path.
    pub at: f32,
}

/// Find every contact for this tick, ordered along the direction of
/// travel (ties broken by id, which is spawn order). `prev_distance` is
/// where the player was before this tick's advance; entities anywhere in
/// `[prev_distance, pose.distance]` widened by the proximity band are
/// contacted, so no step size skips over an entity. The caller
/// deactivates contacted entities and applies outcomes in the returned
/// order.
pub fn resolve(
    registry: &EntityRegistry,
    pose: &PlayerPose,
    prev_distance: f32,
    magnet_active: bool,
) -> Vec<Contact> {
    let lo = prev_distance.min(pose.distance) - PROXIMITY_EPSILON;
    let hi = prev_distance.max(pose.distance) + PROXIMITY_EPSILON;

    let mut contacts = Vec::new();
    registry.for_each_active(|entity| {
        if entity.distance < lo || entity.distance > hi {
            return;
        }

        // The magnet pulls gems in from any lane; everything else
        // requires a lane match.
        let lane_match = entity.lane == pose.lane;
        if !lane_match && !(magnet_active && entity.kind == EntityKind::Gem) {
            return;
        }

        let outcome = match entity.kind {
            EntityKind::Obstacle => {
                let clearable = matches!(entity.payload, Payload::Obstacle { clearable: true });
                if clearable && pose.height >= CLEAR_HEIGHT {
                    return;
                }
                ContactOutcome::Damage
            }
            EntityKind::Alien | EntityKind::Missile => ContactOutcome::Damage,
            EntityKind::Gem => match entity.payload {
                Payload::Gem { points } => ContactOutcome::CollectGem { points },
                _ => return,
            },
            EntityKind::Letter => match entity.payload {
                Payload::Letter { letter, target_index } => {
                    ContactOutcome::CollectLetter { index: target_index, letter }
                }
                _ => return,
            },
            EntityKind::Heart => ContactOutcome::CollectHeart,
            EntityKind::Key => ContactOutcome::CollectKey,
            EntityKind::ShopPortal => ContactOutcome::EnterShop,
        };
        contacts.push(Contact { id: entity.id, outcome, at: entity.distance });
    });

    contacts.sort_by(|a, b| a.at.total_cmp(&b.at).then(a.id.cmp(&b.id)));
    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::input::PlayerPose;

    fn pose(lane: u8, height: f32, distance: f32) -> PlayerPose {
        PlayerPose { lane, height, distance }
    }

    /// Zero-length sweep: the player stood still at this distance.
    fn still(reg: &EntityRegistry, p: PlayerPose, magnet: bool) -> Vec<Contact> {
        resolve(reg, &p, p.distance, magnet)
    }

    #[test]
    fn test_lane_match_required() {
        let mut reg = EntityRegistry::new();
        reg.spawn(EntityKind::Gem, 0, 50.0, Payload::Gem { points: 100 });
        reg.spawn(EntityKind::Gem, 1, 50.0, Payload::Gem { points: 100 });

        let contacts = still(&reg, pose(1, 0.0, 50.0), false);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].outcome, ContactOutcome::CollectGem { points: 100 });
    }

    #[test]
    fn test_proximity_epsilon_bounds() {
        let mut reg = EntityRegistry::new();
        reg.spawn(EntityKind::Gem, 0, 50.0, Payload::Gem { points: 50 });

        // Strictly inside and strictly outside the band on both sides;
        // the exact boundary is not probed, f32 rounding makes it
        // land on either side of the comparison.
        assert_eq!(still(&reg, pose(0, 0.0, 50.0 + PROXIMITY_EPSILON - 0.01), false).len(), 1);
        assert!(still(&reg, pose(0, 0.0, 50.0 + PROXIMITY_EPSILON + 0.02), false).is_empty());
        assert_eq!(still(&reg, pose(0, 0.0, 50.0 - PROXIMITY_EPSILON + 0.01), false).len(), 1);
        assert!(still(&reg, pose(0, 0.0, 50.0 - PROXIMITY_EPSILON - 0.02), false).is_empty());
    }

    #[test]
    fn test_swept_step_contacts_everything_crossed() {
        let mut reg = EntityRegistry::new();
        reg.spawn(EntityKind::Gem, 0, 53.0, Payload::Gem { points: 50 });
        reg.spawn(EntityKind::Gem, 0, 48.0, Payload::Gem { points: 50 });

        // A 10-unit step crosses both gems even though neither sits
        // within the band of the final pose
        let contacts = resolve(&reg, &pose(0, 0.0, 56.0), 46.0, false);
        assert_eq!(contacts.len(), 2);

        // An equally fast step in another lane touches nothing
        assert!(resolve(&reg, &pose(1, 0.0, 56.0), 46.0, false).is_empty());
    }

    #[test]
    fn test_jump_clears_low_obstacles_only() {
        let mut reg = EntityRegistry::new();
        reg.spawn(EntityKind::Obstacle, 0, 50.0, Payload::Obstacle { clearable: true });
        reg.spawn(EntityKind::Obstacle, 1, 50.0, Payload::Obstacle { clearable: false });

        // Airborne over a low obstacle: no contact
        assert!(still(&reg, pose(0, CLEAR_HEIGHT, 50.0), false).is_empty());
        // Grounded: contact
        assert_eq!(still(&reg, pose(0, 0.0, 50.0), false)[0].outcome, ContactOutcome::Damage);
        // A barrier hits even at jump apex
        assert_eq!(still(&reg, pose(1, 2.5, 50.0), false)[0].outcome, ContactOutcome::Damage);
    }

    #[test]
    fn test_magnet_pulls_gems_across_lanes() {
        let mut reg = EntityRegistry::new();
        reg.spawn(EntityKind::Gem, 0, 50.0, Payload::Gem { points: 250 });
        reg.spawn(EntityKind::Key, 0, 50.0, Payload::None);

        let contacts = still(&reg, pose(2, 0.0, 50.0), true);
        // Gem crosses lanes, key does not
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].outcome, ContactOutcome::CollectGem { points: 250 });
    }

    #[test]
    fn test_contacts_sorted_along_travel() {
        let mut reg = EntityRegistry::new();
        let far = reg.spawn(EntityKind::Gem, 0, 50.8, Payload::Gem { points: 50 });
        let near = reg.spawn(EntityKind::Gem, 0, 50.2, Payload::Gem { points: 50 });

        let contacts = still(&reg, pose(0, 0.0, 50.0), false);
        assert_eq!(contacts[0].id, near);
        assert_eq!(contacts[1].id, far);
    }

    #[test]
    fn test_equidistant_ties_break_by_spawn_order() {
        let mut reg = EntityRegistry::new();
        let first = reg.spawn(EntityKind::Gem, 0, 50.0, Payload::Gem { points: 50 });
        let second = reg.spawn(EntityKind::Heart, 0, 50.0, Payload::None);

        let contacts = still(&reg, pose(0, 0.0, 50.0), false);
        assert_eq!(contacts[0].id, first);
        assert_eq!(contacts[1].id, second);
    }

    #[test]
    fn test_inactive_entities_ignored() {
        let mut reg = EntityRegistry::new();
        let id = reg.spawn(EntityKind::Missile, 0, 50.0, Payload::None);
        reg.deactivate(id);

        assert!(still(&reg, pose(0, 0.0, 50.0), false).is_empty());
    }

    #[test]
    fn test_portal_and_letter_outcomes() {
        let mut reg = EntityRegistry::new();
        reg.spawn(EntityKind::ShopPortal, 0, 50.0, Payload::None);
        reg.spawn(EntityKind::Letter, 1, 50.0, Payload::Letter { letter: 'P', target_index: 1 });

        assert_eq!(still(&reg, pose(0, 0.0, 50.0), false)[0].outcome, ContactOutcome::EnterShop);
        assert_eq!(
            still(&reg, pose(1, 0.0, 50.0), false)[0].outcome,
            ContactOutcome::CollectLetter { index: 1, letter: 'P' }
        );
    }
}
