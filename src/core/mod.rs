//! Deterministic primitives shared by the whole simulation.
//!
//! Everything here is tick-counted and seed-driven; no wall-clock time, no
//! global state.

pub mod cooldown;
pub mod rng;
pub mod vec2;

pub use cooldown::Cooldown;
pub use rng::DeterministicRng;
pub use vec2::Vec2;
