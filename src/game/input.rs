//! Input Intents and Player Kinematics
//!
//! The core never parses raw input. An external layer resolves swipes or
//! key presses into the discrete intents below; this module applies them
//! to the player's lane and jump arc and exposes the explicit pose the
//! collision resolver consumes.

use serde::{Deserialize, Serialize};

use crate::{JUMP_DURATION, JUMP_HEIGHT, LANE_COUNT};

/// Discrete input intents for one frame, packed as bit flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputIntent {
    /// Action flags (packed bits):
    /// - Bit 0: move one lane left
    /// - Bit 1: move one lane right
    /// - Bit 2: jump
    /// - Bit 3: activate owned ability
    pub flags: u8,
}

impl InputIntent {
    /// Move-left flag bit.
    pub const FLAG_MOVE_LEFT: u8 = 0x01;
    /// Move-right flag bit.
    pub const FLAG_MOVE_RIGHT: u8 = 0x02;
    /// Jump flag bit.
    pub const FLAG_JUMP: u8 = 0x04;
    /// Ability flag bit.
    pub const FLAG_ABILITY: u8 = 0x08;

    /// Create an empty (idle) intent.
    pub const fn new() -> Self {
        Self { flags: 0 }
    }

    /// Intent with the given flags set.
    pub const fn with_flags(flags: u8) -> Self {
        Self { flags }
    }

    /// Check if a lane move left was requested.
    #[inline]
    pub fn move_left(&self) -> bool {
        self.flags & Self::FLAG_MOVE_LEFT != 0
    }

    /// Check if a lane move right was requested.
    #[inline]
    pub fn move_right(&self) -> bool {
        self.flags & Self::FLAG_MOVE_RIGHT != 0
    }

    /// Check if a jump was requested.
    #[inline]
    pub fn jump(&self) -> bool {
        self.flags & Self::FLAG_JUMP != 0
    }

    /// Check if the ability was activated.
    #[inline]
    pub fn ability(&self) -> bool {
        self.flags & Self::FLAG_ABILITY != 0
    }

    /// Check if this is an idle frame.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.flags == 0
    }

    /// Set the jump flag.
    #[inline]
    pub fn set_jump(&mut self) {
        self.flags |= Self::FLAG_JUMP;
    }
}

/// Vertical state of the runner.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum VerticalState {
    /// On the ground.
    Grounded,
    /// Mid-jump.
    Jumping {
        /// Seconds since the arc started.
        elapsed: f32,
        /// True once the mid-air second jump has been spent.
        doubled: bool,
    },
}

/// Lane and jump kinematics of the runner.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PlayerMotion {
    /// Current lane in `[0, LANE_COUNT)`.
    pub lane: u8,
    /// Current vertical state.
    pub vertical: VerticalState,
}

impl Default for PlayerMotion {
    fn default() -> Self {
        Self {
            lane: LANE_COUNT / 2,
            vertical: VerticalState::Grounded,
        }
    }
}

impl PlayerMotion {
    /// Reset to the center lane on the ground. Used on run start.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Apply one frame of intents. Lane moves clamp at the edges; a jump
    /// while grounded starts the arc, a jump mid-air restarts it once if
    /// double jump is owned.
    pub fn apply(&mut self, intent: InputIntent, has_double_jump: bool) {
        if intent.move_left() && self.lane > 0 {
            self.lane -= 1;
        }
        if intent.move_right() && self.lane < LANE_COUNT - 1 {
            self.lane += 1;
        }
        if intent.jump() {
            match self.vertical {
                VerticalState::Grounded => {
                    self.vertical = VerticalState::Jumping { elapsed: 0.0, doubled: false };
                }
                VerticalState::Jumping { doubled: false, .. } if has_double_jump => {
                    self.vertical = VerticalState::Jumping { elapsed: 0.0, doubled: true };
                }
                VerticalState::Jumping { .. } => {}
            }
        }
    }

    /// Advance the jump arc by `dt` seconds, landing when it completes.
    pub fn advance(&mut self, dt: f32) {
        if let VerticalState::Jumping { elapsed, doubled } = self.vertical {
            let elapsed = elapsed + dt;
            self.vertical = if elapsed >= JUMP_DURATION {
                VerticalState::Grounded
            } else {
                VerticalState::Jumping { elapsed, doubled }
            };
        }
    }

    /// Current height above the ground: a parabolic arc peaking at
    /// `JUMP_HEIGHT` halfway through `JUMP_DURATION`.
    pub fn height(&self) -> f32 {
        match self.vertical {
            VerticalState::Grounded => 0.0,
            VerticalState::Jumping { elapsed, .. } => {
                let t = elapsed / JUMP_DURATION;
                4.0 * JUMP_HEIGHT * t * (1.0 - t)
            }
        }
    }

    /// Whether the runner is airborne.
    #[inline]
    pub fn is_jumping(&self) -> bool {
        matches!(self.vertical, VerticalState::Jumping { .. })
    }

    /// The explicit pose handed to the collision resolver.
    pub fn pose(&self, distance: f32) -> PlayerPose {
        PlayerPose {
            lane: self.lane,
            height: self.height(),
            distance,
        }
    }
}

/// Snapshot of the player's position for collision resolution.
///
/// Passed by value so the resolver never reaches into a scene graph or
/// shared state to find the player.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerPose {
    /// Lane index.
    pub lane: u8,
    /// Height above the ground.
    pub height: f32,
    /// Forward world coordinate.
    pub distance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_moves_clamp_at_edges() {
        let mut motion = PlayerMotion::default();
        assert_eq!(motion.lane, 1);

        motion.apply(InputIntent::with_flags(InputIntent::FLAG_MOVE_LEFT), false);
        assert_eq!(motion.lane, 0);
        motion.apply(InputIntent::with_flags(InputIntent::FLAG_MOVE_LEFT), false);
        assert_eq!(motion.lane, 0);

        for _ in 0..5 {
            motion.apply(InputIntent::with_flags(InputIntent::FLAG_MOVE_RIGHT), false);
        }
        assert_eq!(motion.lane, LANE_COUNT - 1);
    }

    #[test]
    fn test_jump_arc_peaks_and_lands() {
        let mut motion = PlayerMotion::default();
        motion.apply(InputIntent::with_flags(InputIntent::FLAG_JUMP), false);
        assert!(motion.is_jumping());

        motion.advance(JUMP_DURATION / 2.0);
        assert!((motion.height() - JUMP_HEIGHT).abs() < 1e-4);

        motion.advance(JUMP_DURATION / 2.0);
        assert!(!motion.is_jumping());
        assert_eq!(motion.height(), 0.0);
    }

    #[test]
    fn test_double_jump_requires_unlock() {
        let jump = InputIntent::with_flags(InputIntent::FLAG_JUMP);

        let mut motion = PlayerMotion::default();
        motion.apply(jump, false);
        motion.advance(0.3);
        motion.apply(jump, false);
        // Without the unlock the arc keeps its elapsed time
        match motion.vertical {
            VerticalState::Jumping { elapsed, doubled } => {
                assert!(elapsed > 0.0);
                assert!(!doubled);
            }
            _ => panic!("should still be airborne"),
        }

        let mut motion = PlayerMotion::default();
        motion.apply(jump, true);
        motion.advance(0.3);
        motion.apply(jump, true);
        match motion.vertical {
            VerticalState::Jumping { elapsed, doubled } => {
                assert_eq!(elapsed, 0.0);
                assert!(doubled);
            }
            _ => panic!("double jump should restart the arc"),
        }

        // Third jump mid-air does nothing
        motion.advance(0.2);
        motion.apply(jump, true);
        match motion.vertical {
            VerticalState::Jumping { elapsed, .. } => assert!(elapsed > 0.0),
            _ => panic!("should still be airborne"),
        }
    }

    #[test]
    fn test_intent_flags() {
        let mut intent = InputIntent::new();
        assert!(intent.is_idle());
        intent.set_jump();
        assert!(intent.jump());
        assert!(!intent.move_left());
        assert!(!intent.ability());
    }
}
