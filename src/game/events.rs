//! Game Events
//!
//! Events generated during simulation, returned from every tick so the host
//! can drive feedback (sound, screen shake, combat log) without re-deriving
//! what happened. Emission order within a tick is deterministic.

use serde::{Deserialize, Serialize};

use crate::core::vec2::Vec2;
use crate::game::entity::{EntityId, ItemKind};
use crate::game::progression::Talent;

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// Player took unblocked damage
    PlayerDamaged {
        /// Damage applied
        amount: f32,
        /// Hp after clamping
        hp_after: f32,
    },

    /// Player hp reached zero
    PlayerDied,

    /// Player fell below the stage and was respawned
    PlayerRespawned {
        /// Fall damage applied before the respawn
        fall_damage: f32,
    },

    /// An enemy took damage
    EnemyDamaged {
        /// Enemy hit
        enemy_id: EntityId,
        /// Damage applied
        amount: f32,
        /// Enemy hp after the hit
        hp_after: f32,
    },

    /// An enemy was killed
    EnemyKilled {
        /// Enemy killed
        enemy_id: EntityId,
        /// Whether it carried the boss flag
        boss: bool,
        /// Session kill count after this kill
        kills: u32,
    },

    /// Every-third-kill automatic level-up
    LevelUp {
        /// New maximum hp
        max_hp: f32,
        /// New flat damage bonus
        damage_bonus: f32,
    },

    /// A parry blocked an incoming threat
    ParryBlocked {
        /// True for an upward parry, false for forward
        upward: bool,
    },

    /// A parried projectile was reclassified as player-owned
    ProjectileReflected {
        /// Projectile reflected
        projectile_id: EntityId,
    },

    /// A pickup was collected
    ItemCollected {
        /// What kind of pickup
        kind: ItemKind,
        /// Its magnitude
        value: u32,
    },

    /// A new room was loaded
    RoomEntered {
        /// Room index within the run
        index: u32,
        /// Room display name
        name: String,
    },

    /// A talent was applied to the player
    TalentApplied {
        /// The talent
        talent: Talent,
    },

    /// A shop purchase effect was applied
    PurchaseApplied {
        /// The purchased effect
        kind: ItemKind,
    },

    /// A downward strike connected and bounced the player
    Pogo {
        /// Player position at the bounce
        position: Vec2,
    },
}

/// A game event with the tick it occurred on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u64,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u64, data: GameEventData) -> Self {
        Self { tick, data }
    }

    /// Create player damaged event.
    pub fn player_damaged(tick: u64, amount: f32, hp_after: f32) -> Self {
        Self::new(tick, GameEventData::PlayerDamaged { amount, hp_after })
    }

    /// Create player died event.
    pub fn player_died(tick: u64) -> Self {
        Self::new(tick, GameEventData::PlayerDied)
    }

    /// Create player respawned event.
    pub fn player_respawned(tick: u64, fall_damage: f32) -> Self {
        Self::new(tick, GameEventData::PlayerRespawned { fall_damage })
    }

    /// Create enemy damaged event.
    pub fn enemy_damaged(tick: u64, enemy_id: EntityId, amount: f32, hp_after: f32) -> Self {
        Self::new(
            tick,
            GameEventData::EnemyDamaged {
                enemy_id,
                amount,
                hp_after,
            },
        )
    }

    /// Create enemy killed event.
    pub fn enemy_killed(tick: u64, enemy_id: EntityId, boss: bool, kills: u32) -> Self {
        Self::new(
            tick,
            GameEventData::EnemyKilled {
                enemy_id,
                boss,
                kills,
            },
        )
    }

    /// Create level-up event.
    pub fn level_up(tick: u64, max_hp: f32, damage_bonus: f32) -> Self {
        Self::new(
            tick,
            GameEventData::LevelUp {
                max_hp,
                damage_bonus,
            },
        )
    }

    /// Create parry blocked event.
    pub fn parry_blocked(tick: u64, upward: bool) -> Self {
        Self::new(tick, GameEventData::ParryBlocked { upward })
    }

    /// Create projectile reflected event.
    pub fn projectile_reflected(tick: u64, projectile_id: EntityId) -> Self {
        Self::new(tick, GameEventData::ProjectileReflected { projectile_id })
    }

    /// Create item collected event.
    pub fn item_collected(tick: u64, kind: ItemKind, value: u32) -> Self {
        Self::new(tick, GameEventData::ItemCollected { kind, value })
    }

    /// Create room entered event.
    pub fn room_entered(tick: u64, index: u32, name: impl Into<String>) -> Self {
        Self::new(
            tick,
            GameEventData::RoomEntered {
                index,
                name: name.into(),
            },
        )
    }

    /// Create talent applied event.
    pub fn talent_applied(tick: u64, talent: Talent) -> Self {
        Self::new(tick, GameEventData::TalentApplied { talent })
    }

    /// Create purchase applied event.
    pub fn purchase_applied(tick: u64, kind: ItemKind) -> Self {
        Self::new(tick, GameEventData::PurchaseApplied { kind })
    }

    /// Create pogo event.
    pub fn pogo(tick: u64, position: Vec2) -> Self {
        Self::new(tick, GameEventData::Pogo { position })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_constructors_carry_tick() {
        let event = GameEvent::enemy_killed(42, EntityId(7), false, 3);
        assert_eq!(event.tick, 42);
        assert!(matches!(
            event.data,
            GameEventData::EnemyKilled {
                enemy_id: EntityId(7),
                boss: false,
                kills: 3,
            }
        ));
    }

    #[test]
    fn test_event_serde_round_trip() {
        let event = GameEvent::room_entered(10, 2, "Gloom Gallery");
        let json = serde_json::to_string(&event).unwrap();
        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
