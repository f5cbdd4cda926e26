//! # Echoes of the Spire: Simulation Core
//!
//! Deterministic fixed-step simulation for a 2D side-scrolling action game.
//! Rendering, input-device polling, UI, level authoring and persistence all
//! live outside this crate; they talk to the core through [`game::input::InputFrame`],
//! [`game::stage::RoomSpec`] and the per-tick [`game::tick::TickResult`].
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       SPIRE SIM CORE                        │
//! ├────────────────────────────────────────────────────────────┤
//! │  core/              - Deterministic primitives              │
//! │  ├── vec2.rs        - 2D vector                             │
//! │  ├── rng.rs         - Seeded Xorshift128+ PRNG              │
//! │  └── cooldown.rs    - Tick-counted cooldown, clamped at 0   │
//! │                                                             │
//! │  game/              - Simulation logic                      │
//! │  ├── input.rs       - Per-tick input snapshot               │
//! │  ├── entity.rs      - Entity arena (tagged variants)        │
//! │  ├── state.rs       - SimulationState, session phases       │
//! │  ├── physics.rs     - Gravity + axis-separated collision    │
//! │  ├── combat.rs      - Hitboxes, projectiles, parry, damage  │
//! │  ├── ai.rs          - Per-archetype enemy behavior          │
//! │  ├── progression.rs - Kills, loot, pickups, talents, shop   │
//! │  ├── stage.rs       - Room data, validation, difficulty     │
//! │  └── tick.rs        - Fixed-order tick loop                 │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! One `tick()` call performs one full simulation pass; nothing blocks or
//! suspends mid-tick. All timers are tick-counted, never wall-clock, and all
//! randomness (slime hops, loot rolls) flows through one seeded generator, so
//! the same seed and input stream reproduce a session exactly.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

pub use crate::core::cooldown::Cooldown;
pub use crate::core::rng::DeterministicRng;
pub use crate::core::vec2::Vec2;
pub use game::input::InputFrame;
pub use game::stage::{RoomError, RoomSpec};
pub use game::state::{HudStats, OracleError, OraclePrompt, Phase, SimulationState};
pub use game::tick::{tick, RoomSignal, TickResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate the external clock is expected to drive (Hz).
pub const TICK_RATE: u32 = 60;

/// Stage width in world units; the right edge is the room exit.
pub const STAGE_WIDTH: f32 = 800.0;

/// Stage height in world units; falling past it costs hp.
pub const STAGE_HEIGHT: f32 = 600.0;

/// Downward acceleration added to vertical velocity every tick.
pub const GRAVITY: f32 = 0.5;

/// Horizontal velocity decay factor applied when no movement input is held.
pub const FRICTION: f32 = 0.8;

/// Horizontal speed set (not accumulated) while a movement input is held.
pub const MOVE_SPEED: f32 = 5.0;

/// Vertical impulse applied on jump (negative y is up).
pub const JUMP_IMPULSE: f32 = -12.0;

/// Player bounding-box size.
pub const PLAYER_SIZE: Vec2 = Vec2::new(32.0, 48.0);
