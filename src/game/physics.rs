//! Physics
//!
//! Gravity, friction and axis-separated AABB collision resolution.
//! Integration order is fixed: X axis first (with room-bound handling),
//! then Y, then the fall check. Collision resolution pushes the mover out
//! along its travel direction and zeroes that axis of velocity.

use crate::core::vec2::Vec2;
use crate::game::entity::{aabb_overlap, EntityKind, EntityStore};
use crate::game::tick::RoomSignal;
use crate::GRAVITY;

/// Where the player appears after crossing into the next room.
pub const ROOM_ENTRY_X: f32 = 10.0;

/// Where the player reappears after falling out of the room.
pub const RESPAWN_POINT: Vec2 = Vec2::new(50.0, 0.0);

/// Hp cost of falling below the room.
pub const FALL_DAMAGE: f32 = 20.0;

/// Invincibility window granted after a fall respawn, in ticks.
pub const RESPAWN_INVINCIBILITY: u32 = 30;

/// Air jumps restored on landing.
pub const AIR_JUMPS: u8 = 2;

/// What the player physics step observed this tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlayerStep {
    /// Room-boundary outcome at the right edge, if the player reached it.
    pub room_signal: Option<RoomSignal>,
    /// Fall damage applied this tick, if the player dropped out of the room.
    pub fall_damage: Option<f32>,
    /// True when the fall left the player alive and respawned.
    pub respawned: bool,
}

/// Resolve a falling mover against platform tops. Returns true on landing.
///
/// Only downward motion is resolved; items and slimes pass upward through
/// platforms freely, so they can be launched through a floor above them.
pub(crate) fn land_on_platforms(
    pos: &mut Vec2,
    size: Vec2,
    vel: &mut Vec2,
    platforms: &[(Vec2, Vec2)],
) -> bool {
    let mut landed = false;
    for &(p_pos, p_size) in platforms {
        if vel.y > 0.0 && aabb_overlap(*pos, size, p_pos, p_size) {
            pos.y = p_pos.y - size.y;
            vel.y = 0.0;
            landed = true;
        }
    }
    landed
}

/// Advance the player one tick: gravity, X integration with room bounds,
/// X push-out, Y integration, Y push-out (landing restores air jumps),
/// then the fall check.
///
/// Horizontal velocity and facing were already set from input; this step
/// never reads the input frame.
pub fn step_player(store: &mut EntityStore, room_width: f32, room_height: f32) -> PlayerStep {
    let platforms = store.platform_boxes();
    let boss_alive = store.boss_alive();
    let mut step = PlayerStep::default();

    let player = store.player_mut();
    player.vel.y += GRAVITY;

    // X axis
    player.pos.x += player.vel.x;
    if player.pos.x < 0.0 {
        player.pos.x = 0.0;
    }
    if player.pos.x + player.size.x > room_width {
        if boss_alive {
            player.pos.x = room_width - player.size.x;
            step.room_signal = Some(RoomSignal::BossBlocked);
        } else {
            player.pos.x = ROOM_ENTRY_X;
            step.room_signal = Some(RoomSignal::Advance);
        }
    }
    for &(p_pos, p_size) in &platforms {
        if aabb_overlap(player.pos, player.size, p_pos, p_size) {
            if player.vel.x > 0.0 {
                player.pos.x = p_pos.x - player.size.x;
            } else if player.vel.x < 0.0 {
                player.pos.x = p_pos.x + p_size.x;
            }
            player.vel.x = 0.0;
        }
    }

    // Y axis
    player.pos.y += player.vel.y;
    let mut landed = false;
    for &(p_pos, p_size) in &platforms {
        if aabb_overlap(player.pos, player.size, p_pos, p_size) {
            if player.vel.y > 0.0 {
                player.pos.y = p_pos.y - player.size.y;
                landed = true;
            } else if player.vel.y < 0.0 {
                player.pos.y = p_pos.y + p_size.y;
            }
            player.vel.y = 0.0;
        }
    }

    let fell = player.pos.y > room_height;
    if landed {
        store.player_data_mut().air_jumps = AIR_JUMPS;
    }

    if fell {
        let data = store.player_data_mut();
        data.take_damage(FALL_DAMAGE);
        step.fall_damage = Some(FALL_DAMAGE);
        if !data.is_dead() {
            data.invincibility.set(RESPAWN_INVINCIBILITY);
            let player = store.player_mut();
            player.pos = RESPAWN_POINT;
            player.vel = Vec2::ZERO;
            step.respawned = true;
        }
    }

    step
}

/// Advance every pickup one tick: gravity, both-axis integration, landing
/// on platform tops with a horizontal skid (velocity x0.9 per landing tick).
pub fn step_items(store: &mut EntityStore, platforms: &[(Vec2, Vec2)]) {
    for item in store.entities.iter_mut() {
        if !item.alive || !matches!(item.kind, EntityKind::Item(_)) {
            continue;
        }
        item.vel.y += GRAVITY;
        item.pos += item.vel;
        if land_on_platforms(&mut item.pos, item.size, &mut item.vel, platforms) {
            item.vel.x *= 0.9;
        }
    }
}
