//! Simulation State
//!
//! The whole session in one value: entity arena, RNG, phase, room progress
//! and the per-tick event buffer. No hidden statics; two states built from
//! the same seed and fed the same inputs stay bit-identical.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::core::cooldown::Cooldown;
use crate::core::rng::DeterministicRng;
use crate::core::vec2::Vec2;
use crate::game::entity::{
    EnemyData, Entity, EntityKind, EntityStore, NpcData, PlayerData, PLAYER_SPAWN,
};
use crate::game::events::GameEvent;
use crate::game::stage::{contact_damage_for, RoomError, RoomSpec};

/// Session phase. The simulation only advances while `Playing`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Normal simulation.
    #[default]
    Playing,
    /// Waiting for the host to resolve an oracle consultation.
    Oracle,
    /// Player hp reached zero; only `reset` leaves this phase.
    GameOver,
}

/// HUD snapshot returned with every tick result.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HudStats {
    /// Current player hp.
    pub hp: f32,
    /// Maximum player hp.
    pub max_hp: f32,
    /// Session kill count.
    pub kills: u32,
    /// Gold carried.
    pub gold: u32,
}

/// Context handed to the host when the player consults the oracle. The core
/// never calls a language service itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OraclePrompt {
    /// Current room display name.
    pub room_name: String,
    /// Current player hp.
    pub hp: f32,
    /// Maximum player hp.
    pub max_hp: f32,
    /// Session kill count.
    pub kills: u32,
}

/// Failure reported by the host's oracle integration.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The external service could not be reached or returned garbage.
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
}

/// Complete simulation state for one session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationState {
    /// Current tick number; advances only while `Playing`.
    pub tick: u64,

    /// Session phase.
    pub phase: Phase,

    /// Entity arena; the player is slot 0.
    pub store: EntityStore,

    /// The only source of randomness in the simulation.
    pub rng: DeterministicRng,

    /// Session kill count.
    pub kills: u32,

    /// Index of the current room within the run, starting at 0.
    pub room_index: u32,

    /// Display name of the current room.
    pub room_name: String,

    /// Width of the current room; the right edge is the exit.
    pub room_width: f32,

    /// Height of the current room; falling past it costs hp.
    pub room_height: f32,

    /// Events emitted during the current tick; drained into the tick result.
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl SimulationState {
    /// Create a fresh session from a seed. No room is loaded yet; call
    /// [`SimulationState::load_room`] before ticking.
    pub fn new(seed: u64) -> Self {
        Self {
            tick: 0,
            phase: Phase::Playing,
            store: EntityStore::new(),
            rng: DeterministicRng::new(seed),
            kills: 0,
            room_index: 0,
            room_name: String::new(),
            room_width: crate::STAGE_WIDTH,
            room_height: crate::STAGE_HEIGHT,
            events: Vec::new(),
        }
    }

    /// Instantiate a room into the arena.
    ///
    /// Validates the room data first and fails fast without touching state.
    /// All non-player entities are cleared; projectiles, hitboxes, particles
    /// and uncollected pickups never carry across rooms. The player entity
    /// and its accumulated stats persist untouched.
    pub fn load_room(&mut self, spec: &RoomSpec, index: u32) -> Result<(), RoomError> {
        spec.validate()?;

        self.store.clear_room();
        self.room_index = index;
        self.room_name = spec.name.clone();
        self.room_width = spec.width;
        self.room_height = spec.height;

        for p in &spec.platforms {
            self.store
                .spawn(p.pos, p.size, Vec2::ZERO, EntityKind::Platform);
        }
        for e in &spec.enemies {
            self.store.spawn(
                e.pos,
                e.size,
                Vec2::ZERO,
                EntityKind::Enemy(EnemyData {
                    hp: e.hp,
                    max_hp: e.hp,
                    archetype: e.archetype,
                    patrol: e.patrol,
                    attack_cooldown: Cooldown::READY,
                    contact_damage: contact_damage_for(e, index),
                    boss: e.boss,
                }),
            );
        }
        for n in &spec.npcs {
            self.store.spawn(
                n.pos,
                n.size,
                Vec2::ZERO,
                EntityKind::Npc(NpcData {
                    interact_radius: n.interact_radius,
                }),
            );
        }

        info!(
            room = %self.room_name,
            index,
            enemies = spec.enemies.len(),
            "room loaded"
        );
        let tick = self.tick;
        self.events
            .push(GameEvent::room_entered(tick, index, spec.name.clone()));
        Ok(())
    }

    /// Restart the session in place. Player stats, kills, gold and room
    /// progress return to new-game values; the RNG keeps its current state
    /// so restarts within a session stay on the seeded stream.
    pub fn reset(&mut self) {
        self.store.clear_room();
        let player = self.store.player_mut();
        player.pos = PLAYER_SPAWN;
        player.vel = Vec2::ZERO;
        player.alive = true;
        player.kind = EntityKind::Player(PlayerData::new());

        self.tick = 0;
        self.phase = Phase::Playing;
        self.kills = 0;
        self.room_index = 0;
        self.room_name.clear();
        self.room_width = crate::STAGE_WIDTH;
        self.room_height = crate::STAGE_HEIGHT;
        self.events.clear();

        info!("session reset");
    }

    /// HUD snapshot of the player-facing numbers.
    pub fn hud(&self) -> HudStats {
        let data = self.store.player_data();
        HudStats {
            hp: data.hp,
            max_hp: data.max_hp,
            kills: self.kills,
            gold: data.gold,
        }
    }

    /// Context for an oracle consultation at the current moment.
    pub fn oracle_prompt(&self) -> OraclePrompt {
        let data = self.store.player_data();
        OraclePrompt {
            room_name: self.room_name.clone(),
            hp: data.hp,
            max_hp: data.max_hp,
            kills: self.kills,
        }
    }

    /// Hand back the outcome of an oracle consultation and resume play.
    ///
    /// The text (or the fallback line on failure) is logged; simulation
    /// state is otherwise untouched. No-op outside the `Oracle` phase.
    pub fn resolve_oracle(&mut self, outcome: Result<String, OracleError>) {
        if self.phase != Phase::Oracle {
            return;
        }
        match outcome {
            Ok(text) => info!(room = %self.room_name, "the oracle speaks: {text}"),
            Err(e) => warn!(room = %self.room_name, error = %e, "the oracle is silent"),
        }
        self.phase = Phase::Playing;
    }

    /// Whether enemies in the current room commit to their attacks.
    pub fn aggressive(&self) -> bool {
        crate::game::stage::aggressive(self.room_index)
    }

    /// Everything the renderer needs to draw the current tick.
    pub fn render_list(&self) -> &[Entity] {
        &self.store.entities
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::stage::demo_rooms;

    #[test]
    fn test_load_room_replaces_entities() {
        let mut state = SimulationState::new(7);
        let rooms = demo_rooms();

        state.load_room(&rooms[0], 0).unwrap();
        let first_count = state.store.len();
        assert!(first_count > 1);

        state.load_room(&rooms[1], 1).unwrap();
        assert_eq!(state.room_index, 1);
        // Player survived the swap
        assert!(matches!(state.store.player().kind, EntityKind::Player(_)));
        // Old room geometry is gone
        assert_eq!(
            state.store.len(),
            1 + rooms[1].platforms.len() + rooms[1].enemies.len() + rooms[1].npcs.len()
        );
    }

    #[test]
    fn test_load_room_rejects_invalid_without_side_effects() {
        let mut state = SimulationState::new(7);
        let rooms = demo_rooms();
        state.load_room(&rooms[0], 0).unwrap();
        let count = state.store.len();

        let bad = RoomSpec {
            platforms: vec![],
            ..rooms[1].clone()
        };
        assert!(state.load_room(&bad, 1).is_err());
        assert_eq!(state.room_index, 0, "failed load must not advance the run");
        assert_eq!(state.store.len(), count);
    }

    #[test]
    fn test_reset_restores_new_game_values() {
        let mut state = SimulationState::new(7);
        let rooms = demo_rooms();
        state.load_room(&rooms[2], 2).unwrap();

        state.kills = 9;
        state.phase = Phase::GameOver;
        {
            let data = state.store.player_data_mut();
            data.hp = 0.0;
            data.gold = 55;
            data.damage_bonus = 15.0;
        }

        state.reset();
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.kills, 0);
        assert_eq!(state.room_index, 0);
        let data = state.store.player_data();
        assert_eq!(data.hp, PlayerData::BASE_HP);
        assert_eq!(data.gold, 0);
        assert_eq!(data.damage_bonus, 0.0);
        assert_eq!(state.store.player().pos, PLAYER_SPAWN);
    }

    #[test]
    fn test_resolve_oracle_only_from_oracle_phase() {
        let mut state = SimulationState::new(7);
        state.phase = Phase::GameOver;
        state.resolve_oracle(Ok("beware the peak".into()));
        assert_eq!(state.phase, Phase::GameOver);

        state.phase = Phase::Oracle;
        state.resolve_oracle(Err(OracleError::Unavailable("timeout".into())));
        assert_eq!(state.phase, Phase::Playing);
    }

    #[test]
    fn test_contact_damage_scales_with_room() {
        let mut state = SimulationState::new(7);
        let rooms = demo_rooms();
        state.load_room(&rooms[2], 2).unwrap();

        let slime = state.store.enemies().next().unwrap();
        assert_eq!(slime.as_enemy().unwrap().contact_damage, 14.0);
    }
}
