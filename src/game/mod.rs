//! Game Logic Module
//!
//! All simulation code. 100% deterministic given a seed and input frames.
//!
//! ## Module Structure
//!
//! - `input`: discrete input intents, player lane/jump kinematics
//! - `entity`: entity kinds and the registry owning spawned objects
//! - `spawner`: procedural corridor generation ahead of the player
//! - `collision`: player-vs-entity overlap resolution
//! - `session`: game status machine and progression/economy ledger
//! - `shop`: shop catalog and atomic purchases
//! - `effects`: timed buff scheduling and reverts
//! - `events`: typed events emitted during simulation
//! - `tick`: the per-frame driver tying everything together

pub mod collision;
pub mod effects;
pub mod entity;
pub mod events;
pub mod input;
pub mod session;
pub mod shop;
pub mod spawner;
pub mod tick;

// Re-export key types
pub use entity::{Entity, EntityId, EntityKind, EntityRegistry};
pub use events::RunEvent;
pub use input::{InputIntent, PlayerMotion, PlayerPose};
pub use session::{GameSession, GameStatus};
pub use tick::{Game, GameConfig, TickResult};
