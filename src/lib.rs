//! # Space Runner Core
//!
//! Deterministic simulation core for an endless-runner arcade game:
//! a continuously advancing player on three fixed lanes, a procedurally
//! populated corridor ahead, lane/height collision resolution, and a
//! progression/economy ledger with persistent cross-session stats.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     SPACE RUNNER CORE                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Deterministic primitives                 │
//! │  └── rng.rs       - Seeded Xorshift128+ PRNG                 │
//! │                                                              │
//! │  game/            - Simulation (deterministic)               │
//! │  ├── input.rs     - Discrete intents, player kinematics      │
//! │  ├── entity.rs    - Entity registry (obstacles, pickups)     │
//! │  ├── spawner.rs   - Procedural corridor generator            │
//! │  ├── collision.rs - Player-vs-entity resolution              │
//! │  ├── session.rs   - State machine + progression ledger       │
//! │  ├── shop.rs      - Shop catalog and purchases               │
//! │  ├── effects.rs   - Timed buff scheduling and reverts        │
//! │  ├── events.rs    - Typed run events                         │
//! │  └── tick.rs      - Per-frame simulation driver              │
//! │                                                              │
//! │  persist/         - Stats persistence (blob store interface) │
//! │  ├── stats.rs     - PersistentStats, achievements            │
//! │  └── mod.rs       - StatsStore trait, write-through ledger   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Given the same RNG seed and the same sequence of `(dt, intent)` frames,
//! a run produces identical state on any platform:
//! - `BTreeMap`/`BTreeSet` everywhere iteration order matters
//! - all randomness from the seeded [`GameRng`]
//! - no system time; the host feeds elapsed time per frame
//!
//! Rendering, audio, raw input capture and ad verification are external
//! collaborators: they consume [`game::tick::Snapshot`] and call the few
//! mutation entry points on [`game::tick::Game`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod persist;

// Re-export commonly used types
pub use crate::core::rng::GameRng;
pub use game::entity::{Entity, EntityId, EntityKind, EntityRegistry};
pub use game::input::{InputIntent, PlayerMotion, PlayerPose};
pub use game::session::{GameSession, GameStatus};
pub use game::tick::{Game, GameConfig, Snapshot, TickResult};
pub use persist::{MemoryStore, StatsLedger, StatsStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of parallel lanes. Fixed for the whole session: levels never
/// change lane width, so the runner always stays in frame.
pub const LANE_COUNT: u8 = 3;

/// Base forward speed of a fresh run (units per second).
pub const RUN_SPEED_BASE: f32 = 22.5;

/// How far ahead of the player the corridor is populated.
pub const SPAWN_HORIZON: f32 = 120.0;

/// Entities this far behind the player fall out of the registry.
pub const REMOVE_BEHIND: f32 = 20.0;

/// Peak height of a jump arc.
pub const JUMP_HEIGHT: f32 = 2.5;

/// Duration of a full jump arc in seconds.
pub const JUMP_DURATION: f32 = 0.6;

/// Completing the word on this level wins the run.
pub const MAX_LEVEL: u32 = 30;

/// Score bonus awarded on victory.
pub const VICTORY_BONUS: u32 = 50_000;

/// Fraction of the base speed added on each level advance.
pub const LEVEL_SPEED_STEP: f32 = 0.30;
