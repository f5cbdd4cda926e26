//! Tick Orchestration
//!
//! One call to [`tick`] advances the whole simulation exactly one step, in a
//! fixed order: phase gate, player timers, input intents, player and item
//! physics, enemy AI, combat resolution, pickup collection, pruning, output
//! assembly. The order never varies, which is what makes seeded runs
//! reproducible.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::cooldown::Cooldown;
use crate::core::vec2::Vec2;
use crate::game::entity::{EntityKind, ParryState, ParticleData};
use crate::game::events::GameEvent;
use crate::game::input::InputFrame;
use crate::game::state::{HudStats, OraclePrompt, Phase, SimulationState};
use crate::game::{ai, combat, physics, progression};
use crate::{FRICTION, JUMP_IMPULSE, MOVE_SPEED};

/// Outcome of the player touching the right room edge this tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomSignal {
    /// The exit is open; the host should load the next room. The player has
    /// already been placed at the entry of the new room.
    Advance,
    /// A living boss holds the exit shut; the player was clamped in place.
    BossBlocked,
}

/// Everything a host needs from one simulation step.
#[derive(Clone, Debug)]
pub struct TickResult {
    /// Events emitted this tick, in emission order.
    pub events: Vec<GameEvent>,
    /// HUD numbers after this tick.
    pub stats: HudStats,
    /// Room-boundary outcome, if the player reached the right edge.
    pub room_signal: Option<RoomSignal>,
    /// Oracle consultation request; the session is now in the Oracle phase.
    pub oracle_prompt: Option<OraclePrompt>,
    /// The player asked to open the shop next to an NPC.
    pub shop_requested: bool,
    /// The player died this tick (or the session was already over).
    pub game_over: bool,
}

/// Advance the simulation one tick.
///
/// No-op outside the `Playing` phase, or before a room has been loaded:
/// the result carries current stats and the game-over flag, but nothing
/// moves.
pub fn tick(state: &mut SimulationState, input: &InputFrame) -> TickResult {
    if state.phase != Phase::Playing {
        return TickResult {
            events: Vec::new(),
            stats: state.hud(),
            room_signal: None,
            oracle_prompt: None,
            shop_requested: false,
            game_over: state.phase == Phase::GameOver,
        };
    }
    // A loaded room always has geometry (validation requires it); without
    // it the player would drop straight out and die to fall damage.
    if !state.store.has_platforms() {
        warn!("no room loaded, refusing to step");
        return TickResult {
            events: Vec::new(),
            stats: state.hud(),
            room_signal: None,
            oracle_prompt: None,
            shop_requested: false,
            game_over: false,
        };
    }

    state.tick += 1;
    tick_player_timers(state);

    let mut oracle_prompt = None;
    let mut shop_requested = false;
    apply_input(state, input, &mut oracle_prompt, &mut shop_requested);

    let step = physics::step_player(&mut state.store, state.room_width, state.room_height);
    if let Some(damage) = step.fall_damage {
        let tick = state.tick;
        let hp = state.store.player_data().hp;
        state.push_event(GameEvent::player_damaged(tick, damage, hp));
        if step.respawned {
            state.push_event(GameEvent::player_respawned(tick, damage));
        }
    }

    let platforms = state.store.platform_boxes();
    physics::step_items(&mut state.store, &platforms);

    ai::update_enemies(state);
    combat::resolve(state);
    progression::collect_pickups(state);
    state.store.prune();

    let game_over = state.store.player_data().is_dead();
    if game_over {
        state.phase = Phase::GameOver;
        let tick = state.tick;
        state.push_event(GameEvent::player_died(tick));
        info!(tick, "player died");
    }

    TickResult {
        events: std::mem::take(&mut state.events),
        stats: state.hud(),
        room_signal: step.room_signal,
        oracle_prompt,
        shop_requested,
        game_over,
    }
}

/// Decrement the player's tick-counted timers. The parry guard drops the
/// moment its window runs out.
fn tick_player_timers(state: &mut SimulationState) {
    let data = state.store.player_data_mut();
    data.attack_cooldown.tick();
    data.invincibility.tick();
    data.parry_refractory.tick();
    if data.parry_window.active() {
        data.parry_window.tick();
        if data.parry_window.ready() {
            data.parry = ParryState::Inactive;
        }
    }
}

/// Turn this tick's input frame into player intents.
fn apply_input(
    state: &mut SimulationState,
    frame: &InputFrame,
    oracle_prompt: &mut Option<OraclePrompt>,
    shop_requested: &mut bool,
) {
    if frame.left() {
        state.store.player_mut().vel.x = -MOVE_SPEED;
        state.store.player_data_mut().facing = -1;
    } else if frame.right() {
        state.store.player_mut().vel.x = MOVE_SPEED;
        state.store.player_data_mut().facing = 1;
    } else {
        state.store.player_mut().vel.x *= FRICTION;
    }

    if frame.jump_pressed() {
        let data = state.store.player_data_mut();
        if data.air_jumps > 0 {
            data.air_jumps -= 1;
            let player = state.store.player_mut();
            player.vel.y = JUMP_IMPULSE;
            let feet = Vec2::new(player.pos.x, player.pos.y + player.size.y);
            let dust_size = Vec2::new(player.size.x, 10.0);
            state.store.spawn(
                feet,
                dust_size,
                Vec2::new(0.0, 1.0),
                EntityKind::Particle(ParticleData {
                    life: Cooldown::start(15),
                }),
            );
        }
    }

    if frame.attack_pressed() {
        combat::perform_melee(state, frame);
    }
    if frame.shoot_pressed() {
        combat::perform_shoot(state, frame);
    }
    if frame.parry_pressed() {
        combat::perform_parry(state, frame);
    }

    if frame.interact_pressed() && npc_in_reach(state) {
        *shop_requested = true;
    }

    if frame.consult_pressed() {
        *oracle_prompt = Some(state.oracle_prompt());
        state.phase = Phase::Oracle;
    }
}

/// Is the player close enough to any NPC to trade?
fn npc_in_reach(state: &SimulationState) -> bool {
    let player = state.store.player();
    state.store.entities.iter().any(|e| {
        if !e.alive {
            return false;
        }
        let EntityKind::Npc(npc) = &e.kind else {
            return false;
        };
        (player.pos.x - e.pos.x).abs() < npc.interact_radius
            && (player.pos.y - e.pos.y).abs() < 50.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::stage::demo_rooms;

    fn playing_state() -> SimulationState {
        let mut state = SimulationState::new(1);
        state.load_room(&demo_rooms()[0], 0).unwrap();
        // Drop the room-entered event so per-test assertions start clean
        state.events.clear();
        // Settle onto the ground
        for _ in 0..120 {
            tick(&mut state, &InputFrame::new());
        }
        state
    }

    #[test]
    fn test_refuses_to_step_before_a_room_loads() {
        use crate::game::entity::PlayerData;

        let mut state = SimulationState::new(1);
        for _ in 0..600 {
            let result = tick(&mut state, &InputFrame::new());
            assert!(result.events.is_empty());
            assert!(!result.game_over);
        }
        assert_eq!(state.tick, 0, "no advance without room geometry");
        assert_eq!(state.hud().hp, PlayerData::BASE_HP);
        assert_eq!(state.phase, Phase::Playing);

        // Loading a room unblocks the simulation
        state.load_room(&demo_rooms()[0], 0).unwrap();
        tick(&mut state, &InputFrame::new());
        assert_eq!(state.tick, 1);
    }

    #[test]
    fn test_tick_advances_counter_only_while_playing() {
        let mut state = playing_state();
        let before = state.tick;
        tick(&mut state, &InputFrame::new());
        assert_eq!(state.tick, before + 1);

        state.phase = Phase::GameOver;
        let result = tick(&mut state, &InputFrame::new());
        assert_eq!(state.tick, before + 1, "no advance outside Playing");
        assert!(result.game_over);
        assert!(result.events.is_empty());
    }

    #[test]
    fn test_movement_sets_velocity_and_facing() {
        let mut state = playing_state();
        let frame = InputFrame::new().with(InputFrame::FLAG_LEFT);
        tick(&mut state, &frame);
        assert_eq!(state.store.player_data().facing, -1);

        let frame = InputFrame::new().with(InputFrame::FLAG_RIGHT);
        tick(&mut state, &frame);
        assert_eq!(state.store.player_data().facing, 1);

        // Idle input decays velocity
        let moving = state.store.player().vel.x;
        tick(&mut state, &InputFrame::new());
        assert!(state.store.player().vel.x.abs() < moving.abs());
    }

    #[test]
    fn test_double_jump_budget() {
        let mut state = playing_state();
        assert_eq!(state.store.player_data().air_jumps, 2);

        let jump = InputFrame::new().with(InputFrame::FLAG_JUMP);
        tick(&mut state, &jump);
        assert_eq!(state.store.player().vel.y, JUMP_IMPULSE);
        tick(&mut state, &jump);
        assert_eq!(state.store.player_data().air_jumps, 0);

        // Third press in the air does nothing
        tick(&mut state, &jump);
        assert_eq!(state.store.player_data().air_jumps, 0);
        assert!(state.store.player().vel.y > JUMP_IMPULSE);
    }

    #[test]
    fn test_jump_spawns_dust() {
        let mut state = playing_state();
        let jump = InputFrame::new().with(InputFrame::FLAG_JUMP);
        tick(&mut state, &jump);
        assert!(state
            .store
            .entities
            .iter()
            .any(|e| matches!(e.kind, EntityKind::Particle(_))));
    }

    #[test]
    fn test_parry_window_expires() {
        let mut state = playing_state();
        let parry = InputFrame::new().with(InputFrame::FLAG_PARRY);
        tick(&mut state, &parry);
        assert_eq!(state.store.player_data().parry, ParryState::Forward);

        for _ in 0..combat::PARRY_WINDOW {
            tick(&mut state, &InputFrame::new());
        }
        assert_eq!(state.store.player_data().parry, ParryState::Inactive);

        // Refractory still running: a new parry attempt is ignored
        tick(&mut state, &parry);
        assert_eq!(state.store.player_data().parry, ParryState::Inactive);
    }

    #[test]
    fn test_consult_switches_to_oracle_phase() {
        let mut state = playing_state();
        let frame = InputFrame::new().with(InputFrame::FLAG_CONSULT);
        let result = tick(&mut state, &frame);

        let prompt = result.oracle_prompt.expect("consult produces a prompt");
        assert_eq!(prompt.room_name, "Entrance Hall");
        assert_eq!(state.phase, Phase::Oracle);

        // Simulation is frozen until the oracle resolves
        let before = state.tick;
        tick(&mut state, &InputFrame::new());
        assert_eq!(state.tick, before);

        state.resolve_oracle(Ok("the spire remembers".into()));
        assert_eq!(state.phase, Phase::Playing);
    }

    #[test]
    fn test_interact_near_npc_requests_shop() {
        let mut state = playing_state();
        // Walk to the merchant at x=120
        state.store.player_mut().pos.x = 110.0;
        let frame = InputFrame::new().with(InputFrame::FLAG_INTERACT);
        let result = tick(&mut state, &frame);
        assert!(result.shop_requested);

        // Far away: nothing happens
        state.store.player_mut().pos.x = 600.0;
        let result = tick(&mut state, &frame);
        assert!(!result.shop_requested);
    }
}
