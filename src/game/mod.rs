//! Simulation logic: entities, physics, combat, AI, progression, rooms and
//! the fixed-order tick loop.

pub mod ai;
pub mod combat;
pub mod entity;
pub mod events;
pub mod input;
pub mod physics;
pub mod progression;
pub mod stage;
pub mod state;
pub mod tick;

pub use entity::{Entity, EntityId, EntityKind, EntityStore};
pub use events::{GameEvent, GameEventData};
pub use input::InputFrame;
pub use stage::{RoomError, RoomSpec};
pub use state::{Phase, SimulationState};
pub use tick::{tick, RoomSignal, TickResult};
