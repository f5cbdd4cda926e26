//! Stage Data
//!
//! Room definitions arrive from the level-authoring side as data
//! ([`RoomSpec`], serde-friendly), are validated fail-fast, and are
//! instantiated into the entity arena by the session layer. The stage
//! controller itself (current room index, exit gating) lives in
//! [`crate::game::state`] and [`crate::game::tick`]; this module owns the
//! data shapes and difficulty scaling.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::vec2::Vec2;
use crate::game::entity::Archetype;

/// Room index at and above which enemies commit to their attacks.
pub const AGGRESSIVE_FROM_ROOM: u32 = 4;

/// A static collision box in a room.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpec {
    /// Top-left corner.
    pub pos: Vec2,
    /// Box size.
    pub size: Vec2,
}

/// An enemy placement in a room.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemySpec {
    /// Behavior profile.
    pub archetype: Archetype,
    /// Spawn position (top-left corner).
    pub pos: Vec2,
    /// Bounding-box size.
    pub size: Vec2,
    /// Starting and maximum hp.
    pub hp: f32,
    /// Patrol x-bounds for patrolling archetypes.
    #[serde(default)]
    pub patrol: Option<(f32, f32)>,
    /// Contact damage override. When absent the room's difficulty
    /// formula applies.
    #[serde(default)]
    pub contact_damage: Option<f32>,
    /// Bosses gate the room exit while alive.
    #[serde(default)]
    pub boss: bool,
}

/// An NPC placement in a room.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NpcSpec {
    /// Spawn position (top-left corner).
    pub pos: Vec2,
    /// Bounding-box size.
    pub size: Vec2,
    /// Interaction radius for the shop prompt.
    pub interact_radius: f32,
}

/// A complete room definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomSpec {
    /// Display name, echoed in events and oracle prompts.
    pub name: String,
    /// Cosmetic theme tag; the core never interprets it.
    #[serde(default)]
    pub theme: String,
    /// Room width. The right edge is the exit.
    pub width: f32,
    /// Room height. Falling past it costs hp.
    pub height: f32,
    /// Collision geometry. At least one platform is required.
    pub platforms: Vec<PlatformSpec>,
    /// Enemy placements.
    #[serde(default)]
    pub enemies: Vec<EnemySpec>,
    /// NPC placements.
    #[serde(default)]
    pub npcs: Vec<NpcSpec>,
}

/// Errors in room data, reported before any entity is spawned.
#[derive(Debug, Error, PartialEq)]
pub enum RoomError {
    /// A room with no platforms would drop the player straight out.
    #[error("room '{name}' has no platforms")]
    NoPlatforms {
        /// Offending room.
        name: String,
    },

    /// Width and height must both be positive.
    #[error("room '{name}' has invalid dimensions {width}x{height}")]
    BadDimensions {
        /// Offending room.
        name: String,
        /// Declared width.
        width: f32,
        /// Declared height.
        height: f32,
    },
}

impl RoomSpec {
    /// Validate the room data. Called by the session before instantiation;
    /// a failing room is rejected whole.
    pub fn validate(&self) -> Result<(), RoomError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(RoomError::BadDimensions {
                name: self.name.clone(),
                width: self.width,
                height: self.height,
            });
        }
        if self.platforms.is_empty() {
            return Err(RoomError::NoPlatforms {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// Contact damage for an enemy placement, applying the per-room difficulty
/// ramp unless the room data overrides it.
pub fn contact_damage_for(spec: &EnemySpec, room_index: u32) -> f32 {
    spec.contact_damage
        .unwrap_or(10.0 + 2.0 * room_index as f32)
}

/// Whether enemies in the given room commit to their attacks.
pub fn aggressive(room_index: u32) -> bool {
    room_index >= AGGRESSIVE_FROM_ROOM
}

fn platform(x: f32, y: f32, w: f32, h: f32) -> PlatformSpec {
    PlatformSpec {
        pos: Vec2::new(x, y),
        size: Vec2::new(w, h),
    }
}

fn enemy(archetype: Archetype, x: f32, y: f32, w: f32, h: f32, hp: f32) -> EnemySpec {
    EnemySpec {
        archetype,
        pos: Vec2::new(x, y),
        size: Vec2::new(w, h),
        hp,
        patrol: None,
        contact_damage: None,
        boss: false,
    }
}

/// The built-in six-room tower, used by the demo binary and the scenario
/// tests. Production hosts supply their own room data.
pub fn demo_rooms() -> Vec<RoomSpec> {
    use Archetype::*;

    vec![
        RoomSpec {
            name: "Entrance Hall".into(),
            theme: "dungeon".into(),
            width: crate::STAGE_WIDTH,
            height: crate::STAGE_HEIGHT,
            platforms: vec![
                platform(0.0, 550.0, 800.0, 50.0),
                platform(300.0, 450.0, 200.0, 20.0),
                platform(600.0, 350.0, 150.0, 20.0),
            ],
            enemies: vec![EnemySpec {
                patrol: Some((600.0, 750.0)),
                ..enemy(Skeleton, 650.0, 310.0, 32.0, 48.0, 30.0)
            }],
            npcs: vec![NpcSpec {
                pos: Vec2::new(120.0, 502.0),
                size: Vec2::new(32.0, 48.0),
                interact_radius: 60.0,
            }],
        },
        RoomSpec {
            name: "Shadow Gallery".into(),
            theme: "tower".into(),
            width: crate::STAGE_WIDTH,
            height: crate::STAGE_HEIGHT,
            platforms: vec![
                platform(0.0, 550.0, 200.0, 50.0),
                platform(250.0, 450.0, 100.0, 20.0),
                platform(400.0, 350.0, 100.0, 20.0),
                platform(600.0, 550.0, 200.0, 50.0),
            ],
            enemies: vec![
                enemy(Bat, 400.0, 100.0, 24.0, 24.0, 20.0),
                enemy(Bat, 500.0, 150.0, 24.0, 24.0, 20.0),
            ],
            npcs: vec![],
        },
        RoomSpec {
            name: "Forgotten Cistern".into(),
            theme: "cistern".into(),
            width: crate::STAGE_WIDTH,
            height: crate::STAGE_HEIGHT,
            platforms: vec![
                platform(0.0, 550.0, 800.0, 50.0),
                platform(100.0, 400.0, 100.0, 20.0),
                platform(300.0, 300.0, 200.0, 20.0),
                platform(600.0, 200.0, 150.0, 20.0),
            ],
            enemies: vec![
                enemy(Slime, 350.0, 270.0, 32.0, 32.0, 40.0),
                enemy(Slime, 650.0, 170.0, 32.0, 32.0, 40.0),
                enemy(Slime, 150.0, 500.0, 32.0, 32.0, 40.0),
            ],
            npcs: vec![],
        },
        RoomSpec {
            name: "Summit of Whispers".into(),
            theme: "summit".into(),
            width: crate::STAGE_WIDTH,
            height: crate::STAGE_HEIGHT,
            platforms: vec![
                platform(0.0, 550.0, 150.0, 50.0),
                platform(200.0, 450.0, 80.0, 20.0),
                platform(350.0, 350.0, 80.0, 20.0),
                platform(500.0, 250.0, 80.0, 20.0),
                platform(650.0, 550.0, 150.0, 50.0),
            ],
            enemies: vec![
                enemy(Mage, 200.0, 200.0, 30.0, 40.0, 50.0),
                enemy(Mage, 500.0, 100.0, 30.0, 40.0, 50.0),
            ],
            npcs: vec![],
        },
        RoomSpec {
            name: "Obsidian Sanctum".into(),
            theme: "volcano".into(),
            width: crate::STAGE_WIDTH,
            height: crate::STAGE_HEIGHT,
            platforms: vec![
                platform(0.0, 550.0, 200.0, 50.0),
                platform(300.0, 450.0, 200.0, 20.0),
                platform(600.0, 350.0, 200.0, 20.0),
            ],
            enemies: vec![
                enemy(Mage, 350.0, 410.0, 32.0, 48.0, 60.0),
                enemy(Mage, 650.0, 310.0, 32.0, 48.0, 60.0),
                enemy(Mage, 100.0, 100.0, 30.0, 40.0, 50.0),
            ],
            npcs: vec![],
        },
        RoomSpec {
            name: "The Abyssal Peak".into(),
            theme: "void".into(),
            width: crate::STAGE_WIDTH,
            height: crate::STAGE_HEIGHT,
            platforms: vec![
                platform(0.0, 550.0, 100.0, 50.0),
                platform(150.0, 450.0, 50.0, 20.0),
                platform(250.0, 350.0, 50.0, 20.0),
                platform(350.0, 250.0, 100.0, 20.0),
                platform(550.0, 250.0, 100.0, 20.0),
                platform(700.0, 550.0, 100.0, 50.0),
            ],
            enemies: vec![
                EnemySpec {
                    patrol: Some((350.0, 450.0)),
                    boss: true,
                    ..enemy(Skeleton, 400.0, 200.0, 32.0, 48.0, 100.0)
                },
                enemy(Mage, 200.0, 100.0, 30.0, 40.0, 80.0),
                enemy(Mage, 600.0, 100.0, 30.0, 40.0, 80.0),
            ],
            npcs: vec![],
        },
    ]
}
