//! Deterministic primitives shared by the simulation.
//!
//! Everything under `core/` is free of system calls and OS entropy so a
//! seeded run replays identically on any platform.

pub mod rng;

pub use rng::GameRng;
