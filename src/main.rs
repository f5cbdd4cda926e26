//! Echoes of the Spire demo session
//!
//! Drives the simulation core through the built-in six-room tower with a
//! scripted pilot and logs the run. Also replays the same seed and input
//! stream a second time to demonstrate determinism.

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use spire_sim::game::events::GameEventData;
use spire_sim::game::stage::{demo_rooms, RoomSpec};
use spire_sim::{tick, InputFrame, RoomSignal, SimulationState, TICK_RATE, VERSION};

/// Ticks the demo pilot is allowed before giving up on the tower.
const DEMO_TICK_BUDGET: u64 = 5 * 60 * TICK_RATE as u64;

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    info!("Echoes of the Spire simulation core v{}", VERSION);
    info!("Tick rate: {} Hz", TICK_RATE);

    let rooms = demo_rooms();
    let seed = 2024u64;

    let first = run_session(seed, &rooms);
    let second = run_session(seed, &rooms);

    info!("=== Verifying Determinism ===");
    let first_json = serde_json::to_string(&first).expect("state serializes");
    let second_json = serde_json::to_string(&second).expect("state serializes");
    if first_json == second_json {
        info!("DETERMINISM VERIFIED: final states are identical");
    } else {
        warn!("DETERMINISM FAILURE: final states differ");
    }
}

/// The demo pilot: run right, jump periodically, swing and shoot on a
/// fixed cadence, parry now and then.
fn scripted_frame(t: u64) -> InputFrame {
    let mut frame = InputFrame::new().with(InputFrame::FLAG_RIGHT);
    if t % 50 == 0 {
        frame = frame.with(InputFrame::FLAG_JUMP);
    }
    if t % 30 == 0 {
        frame = frame.with(InputFrame::FLAG_ATTACK);
    }
    if t % 100 == 7 {
        frame = frame.with(InputFrame::FLAG_SHOOT);
    }
    if t % 240 == 11 {
        frame = frame.with(InputFrame::FLAG_PARRY);
    }
    frame
}

fn run_session(seed: u64, rooms: &[RoomSpec]) -> SimulationState {
    info!("=== Starting Demo Session (seed {seed}) ===");
    let mut state = SimulationState::new(seed);
    let mut room_index: usize = 0;
    state
        .load_room(&rooms[room_index], room_index as u32)
        .expect("demo rooms validate");

    let mut total_events = 0usize;
    for t in 0..DEMO_TICK_BUDGET {
        let result = tick(&mut state, &scripted_frame(t));
        total_events += result.events.len();

        for event in &result.events {
            match &event.data {
                GameEventData::EnemyKilled { boss, kills, .. } => {
                    info!("Kill #{kills}{}", if *boss { " (boss!)" } else { "" });
                }
                GameEventData::LevelUp {
                    max_hp,
                    damage_bonus,
                } => {
                    info!("Level up: max hp {max_hp}, damage bonus {damage_bonus}");
                }
                GameEventData::PlayerRespawned { fall_damage } => {
                    info!("Fell out of the room ({fall_damage} damage)");
                }
                _ => {}
            }
        }

        match result.room_signal {
            Some(RoomSignal::Advance) => {
                room_index += 1;
                if room_index >= rooms.len() {
                    info!("Tower cleared at tick {}", state.tick);
                    break;
                }
                state
                    .load_room(&rooms[room_index], room_index as u32)
                    .expect("demo rooms validate");
            }
            Some(RoomSignal::BossBlocked) => {
                // The pilot keeps fighting; the exit opens when the boss dies.
            }
            None => {}
        }

        if result.game_over {
            info!("Game over at tick {}", state.tick);
            break;
        }
    }

    let hud = state.hud();
    info!("=== Session Results ===");
    info!(
        "Room {} ({}), hp {:.0}/{:.0}, kills {}, gold {}",
        state.room_index, state.room_name, hud.hp, hud.max_hp, hud.kills, hud.gold
    );
    info!("Total events: {total_events}");
    state
}
