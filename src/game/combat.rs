//! Combat
//!
//! Player attacks (melee arcs, projectile fan, parry), enemy threat
//! resolution and damage application. Resolution is two-phase: threats are
//! collected against a snapshot of the player's pose, then applied, so the
//! outcome never depends on arena iteration order. At most one unblocked
//! hit lands on the player per tick; the first one consumes the
//! invincibility window.

use crate::core::cooldown::Cooldown;
use crate::core::vec2::Vec2;
use crate::game::entity::{
    aabb_overlap, AttackDir, EntityId, EntityKind, HitboxData, ParryState, ParticleData,
    ProjectileData, Side,
};
use crate::game::events::GameEvent;
use crate::game::input::InputFrame;
use crate::game::progression;
use crate::game::state::SimulationState;

/// Ticks between melee swings.
pub const MELEE_COOLDOWN: u32 = 20;
/// Melee reach before bonuses.
pub const MELEE_BASE_RANGE: f32 = 50.0;
/// Melee damage before bonuses.
pub const MELEE_BASE_DAMAGE: f32 = 10.0;
/// Lifetime of a forward slash.
const FORWARD_SLASH_LIFE: u32 = 10;
/// Lifetime of the up and down arcs.
const ARC_LIFE: u32 = 8;

/// Ranged cooldown before the talent multiplier.
pub const RANGED_BASE_COOLDOWN: f32 = 25.0;
/// Player projectile speed.
pub const PROJECTILE_SPEED: f32 = 10.0;
/// Ranged damage before bonuses.
pub const RANGED_BASE_DAMAGE: f32 = 15.0;
/// Projectile lifetime before the talent multiplier.
pub const PROJECTILE_BASE_LIFE: f32 = 120.0;
/// Total fan spread when firing more than one projectile.
const FAN_SPREAD: f32 = std::f32::consts::PI / 8.0;
/// Projectile bounding box.
const PROJECTILE_SIZE: Vec2 = Vec2::new(12.0, 12.0);

/// Active parry window, in ticks.
pub const PARRY_WINDOW: u32 = 15;
/// Refractory period between parries, in ticks.
pub const PARRY_REFRACTORY: u32 = 60;
/// Lifetime reset given to a reflected projectile.
const REFLECT_LIFE: u32 = 300;

/// Invincibility window after an unblocked hit, in ticks.
pub const HIT_INVINCIBILITY: u32 = 30;

/// Spawn the melee hitbox for this swing, if the attack cooldown allows.
///
/// The up and down modifiers pick the arc; otherwise the slash extends
/// ahead of facing. The hitbox damages each enemy at most once over its
/// lifetime.
pub fn perform_melee(state: &mut SimulationState, frame: &InputFrame) {
    let data = state.store.player_data();
    if data.attack_cooldown.active() {
        return;
    }
    let range = MELEE_BASE_RANGE + data.range_bonus;
    let damage = MELEE_BASE_DAMAGE + data.damage_bonus;
    let facing = data.facing;

    let player = state.store.player();
    let (pos, size) = (player.pos, player.size);

    let (dir, hb_pos, hb_size, life) = if frame.up() {
        (
            AttackDir::Up,
            Vec2::new(pos.x - 10.0, pos.y - range + 10.0),
            Vec2::new(size.x + 20.0, range),
            ARC_LIFE,
        )
    } else if frame.down() {
        (
            AttackDir::Down,
            Vec2::new(pos.x - 10.0, pos.y + size.y - 10.0),
            Vec2::new(size.x + 20.0, range),
            ARC_LIFE,
        )
    } else {
        let x = if facing == 1 { pos.x + size.x } else { pos.x - range };
        (
            AttackDir::Forward,
            Vec2::new(x, pos.y + 10.0),
            Vec2::new(range, 30.0),
            FORWARD_SLASH_LIFE,
        )
    };

    state.store.player_data_mut().attack_cooldown.set(MELEE_COOLDOWN);
    state.store.spawn(
        hb_pos,
        hb_size,
        Vec2::ZERO,
        EntityKind::MeleeHitbox(HitboxData {
            side: Side::Player,
            damage,
            dir,
            life: Cooldown::start(life),
            already_hit: Vec::new(),
        }),
    );
}

/// Fire the projectile fan, if the attack cooldown allows.
///
/// Aims up when the up modifier is held, otherwise along facing. With more
/// than one projectile the fan spreads evenly over [`FAN_SPREAD`] centred
/// on the aim direction.
pub fn perform_shoot(state: &mut SimulationState, frame: &InputFrame) {
    let data = state.store.player_data();
    if data.attack_cooldown.active() {
        return;
    }
    let cooldown = (RANGED_BASE_COOLDOWN * data.ranged_cooldown_mult).floor() as u32;
    let damage = RANGED_BASE_DAMAGE + data.damage_bonus;
    let life = (PROJECTILE_BASE_LIFE * data.projectile_life_mult).floor() as u32;
    let count = data.projectile_count.max(1);
    let facing = data.facing;

    let upward = frame.up();
    let base_angle = if upward {
        -std::f32::consts::FRAC_PI_2
    } else if facing == 1 {
        0.0
    } else {
        std::f32::consts::PI
    };

    let player = state.store.player();
    let muzzle = Vec2::new(
        player.pos.x
            + if facing == 1 { player.size.x } else { 0.0 }
            + if upward { player.size.x / 2.0 - 8.0 } else { 0.0 },
        player.pos.y + if upward { -10.0 } else { 20.0 },
    );

    state.store.player_data_mut().attack_cooldown.set(cooldown);
    for i in 0..count {
        let offset = if count > 1 {
            let step = FAN_SPREAD / (count - 1) as f32;
            -FAN_SPREAD / 2.0 + step * i as f32
        } else {
            0.0
        };
        state.store.spawn(
            muzzle,
            PROJECTILE_SIZE,
            Vec2::from_angle(base_angle + offset, PROJECTILE_SPEED),
            EntityKind::Projectile(ProjectileData {
                side: Side::Player,
                damage,
                life: Cooldown::start(life),
            }),
        );
    }
}

/// Raise the parry guard, if the refractory period allows.
pub fn perform_parry(state: &mut SimulationState, frame: &InputFrame) {
    let data = state.store.player_data_mut();
    if data.parry_refractory.active() {
        return;
    }
    data.parry = if frame.up() {
        ParryState::Upward
    } else {
        ParryState::Forward
    };
    data.parry_window.set(PARRY_WINDOW);
    data.parry_refractory.set(PARRY_REFRACTORY);
}

/// Player pose snapshot taken before threat collection.
#[derive(Clone, Copy)]
struct PlayerView {
    pos: Vec2,
    size: Vec2,
    facing: i8,
    parry: ParryState,
    thorns: f32,
}

/// Does the active parry cover a threat at this position?
/// Returns the parry orientation (`true` = upward) when it does.
fn parry_blocks(view: &PlayerView, threat_pos: Vec2, threat_size: Vec2) -> Option<bool> {
    match view.parry {
        ParryState::Inactive => None,
        ParryState::Upward => {
            let above = threat_pos.y + threat_size.y < view.pos.y + view.size.y / 2.0;
            above.then_some(true)
        }
        ParryState::Forward => {
            let in_front = (view.facing == 1 && threat_pos.x > view.pos.x)
                || (view.facing == -1 && threat_pos.x < view.pos.x);
            in_front.then_some(false)
        }
    }
}

struct PlayerHit {
    amount: f32,
    knock_x: Option<f32>,
    knock_y: Option<f32>,
}

/// Resolve all combat interactions for this tick: body contact, projectile
/// flight and impact, melee hitboxes on both sides, thorns, pogo and the
/// resulting deaths.
pub fn resolve(state: &mut SimulationState) {
    let tick = state.tick;
    let platforms = state.store.platform_boxes();

    let player_id = state.store.player().id;
    let view = {
        let player = state.store.player();
        let data = state.store.player_data();
        PlayerView {
            pos: player.pos,
            size: player.size,
            facing: data.facing,
            parry: data.parry,
            thorns: data.thorns,
        }
    };
    let mut vulnerable = state.store.player_data().invincibility.ready();

    let mut events: Vec<GameEvent> = Vec::new();
    let mut player_hits: Vec<PlayerHit> = Vec::new();
    let mut enemy_damage: Vec<(EntityId, f32, bool)> = Vec::new(); // (id, amount, knockback)
    let mut sparks: Vec<Vec2> = Vec::new();
    let mut pogo = false;

    // Enemy bodies against the player.
    for enemy in state.store.entities.iter_mut() {
        if !enemy.alive {
            continue;
        }
        let EntityKind::Enemy(data) = &enemy.kind else {
            continue;
        };
        let contact = data.contact_damage;
        if !aabb_overlap(view.pos, view.size, enemy.pos, enemy.size) {
            continue;
        }
        match parry_blocks(&view, enemy.pos, enemy.size) {
            Some(upward) => {
                enemy.vel.x = if view.pos.x < enemy.pos.x { 15.0 } else { -15.0 };
                if upward {
                    enemy.vel.y = -10.0;
                }
                enemy.pos += enemy.vel;
                sparks.push(view.pos + view.size.scale(0.5));
                events.push(GameEvent::parry_blocked(tick, upward));
            }
            None if vulnerable => {
                vulnerable = false;
                let away = if view.pos.x < enemy.pos.x { -10.0 } else { 10.0 };
                player_hits.push(PlayerHit {
                    amount: contact,
                    knock_x: Some(away),
                    knock_y: Some(-5.0),
                });
                if view.thorns > 0.0 {
                    enemy_damage.push((enemy.id, contact * view.thorns, false));
                }
            }
            _ => {}
        }
    }

    // Projectile flight, player impact and platform culling.
    for proj in state.store.entities.iter_mut() {
        if !proj.alive || !matches!(proj.kind, EntityKind::Projectile(_)) {
            continue;
        }
        proj.pos += proj.vel;
        let EntityKind::Projectile(data) = &mut proj.kind else {
            continue;
        };
        data.life.tick();

        if data.side == Side::Enemy && aabb_overlap(proj.pos, proj.size, view.pos, view.size) {
            match parry_blocks(&view, proj.pos, proj.size) {
                Some(upward) => {
                    data.side = Side::Player;
                    data.life.set(REFLECT_LIFE);
                    proj.vel = if upward {
                        Vec2::new(0.0, -10.0)
                    } else {
                        proj.vel * -1.5
                    };
                    sparks.push(proj.pos);
                    events.push(GameEvent::projectile_reflected(tick, proj.id));
                }
                None if vulnerable => {
                    vulnerable = false;
                    player_hits.push(PlayerHit {
                        amount: data.damage,
                        knock_x: None,
                        knock_y: None,
                    });
                    proj.alive = false;
                }
                _ => {}
            }
        }

        if proj.alive {
            for &(p_pos, p_size) in &platforms {
                if aabb_overlap(proj.pos, proj.size, p_pos, p_size) {
                    proj.alive = false;
                    break;
                }
            }
        }
        if data.life.ready() {
            proj.alive = false;
        }
    }

    // Player projectiles against enemies, collected over a snapshot.
    let mut spent_projectiles: Vec<EntityId> = Vec::new();
    for proj in state.store.entities.iter() {
        if !proj.alive {
            continue;
        }
        let Some(data) = proj.as_projectile() else {
            continue;
        };
        if data.side != Side::Player {
            continue;
        }
        let mut hit = false;
        for enemy in state.store.entities.iter() {
            if enemy.alive && matches!(enemy.kind, EntityKind::Enemy(_)) && proj.overlaps(enemy) {
                enemy_damage.push((enemy.id, data.damage, false));
                hit = true;
            }
        }
        if hit {
            spent_projectiles.push(proj.id);
        }
    }
    for id in spent_projectiles {
        if let Some(proj) = state.store.get_mut(id) {
            proj.alive = false;
        }
    }

    // Enemy melee hitboxes: age and test against the player.
    for hb in state.store.entities.iter_mut() {
        if !hb.alive {
            continue;
        }
        let EntityKind::MeleeHitbox(data) = &mut hb.kind else {
            continue;
        };
        data.life.tick();
        if data.side != Side::Enemy {
            continue;
        }
        if aabb_overlap(hb.pos, hb.size, view.pos, view.size) {
            match parry_blocks(&view, hb.pos, hb.size) {
                // The slash stays put while blocked; mark it so the block
                // reports once, not once per tick of overlap.
                Some(upward) => {
                    if !data.already_hit.contains(&player_id) {
                        data.already_hit.push(player_id);
                        sparks.push(view.pos + view.size.scale(0.5));
                        events.push(GameEvent::parry_blocked(tick, upward));
                    }
                }
                None if vulnerable => {
                    vulnerable = false;
                    let away = if view.pos.x < hb.pos.x { -10.0 } else { 10.0 };
                    player_hits.push(PlayerHit {
                        amount: data.damage,
                        knock_x: Some(away),
                        knock_y: None,
                    });
                }
                _ => {}
            }
        }
    }

    // Player melee hitboxes against enemies, at most one hit per enemy
    // per swing.
    let mut melee_hits: Vec<(EntityId, EntityId, f32, AttackDir)> = Vec::new();
    for hb in state.store.entities.iter() {
        if !hb.alive {
            continue;
        }
        let Some(data) = hb.as_hitbox() else { continue };
        if data.side != Side::Player {
            continue;
        }
        for enemy in state.store.entities.iter() {
            if enemy.alive
                && matches!(enemy.kind, EntityKind::Enemy(_))
                && hb.overlaps(enemy)
                && !data.already_hit.contains(&enemy.id)
            {
                melee_hits.push((hb.id, enemy.id, data.damage, data.dir));
            }
        }
    }
    for (hb_id, enemy_id, damage, dir) in melee_hits {
        if let Some(data) = state.store.get_mut(hb_id).and_then(|e| e.as_hitbox_mut()) {
            data.already_hit.push(enemy_id);
        }
        enemy_damage.push((enemy_id, damage, true));
        if dir == AttackDir::Down {
            pogo = true;
        }
    }

    // Apply enemy damage. A target that already died this tick absorbs
    // nothing further.
    let mut kills: Vec<EntityId> = Vec::new();
    for (id, amount, knockback) in enemy_damage {
        let Some(enemy) = state.store.get_mut(id) else {
            continue;
        };
        if !enemy.alive {
            continue;
        }
        let pos_x = enemy.pos.x;
        let EntityKind::Enemy(data) = &mut enemy.kind else {
            continue;
        };
        data.hp -= amount;
        events.push(GameEvent::enemy_damaged(tick, id, amount, data.hp.max(0.0)));
        if data.hp <= 0.0 {
            kills.push(id);
        } else if knockback {
            let push = if view.pos.x < pos_x { 2.0 } else { -2.0 };
            enemy.vel.x = push;
            enemy.pos.x += push;
        }
    }

    // Apply the player hit, if any landed.
    for hit in player_hits {
        let data = state.store.player_data_mut();
        data.take_damage(hit.amount);
        data.invincibility.set(HIT_INVINCIBILITY);
        events.push(GameEvent::player_damaged(tick, hit.amount, data.hp));
        let player = state.store.player_mut();
        if let Some(x) = hit.knock_x {
            player.vel.x = x;
        }
        if let Some(y) = hit.knock_y {
            player.vel.y = y;
        }
    }

    // A connected downward strike bounces the player and restores exactly
    // one air jump, however many enemies it struck.
    if pogo {
        let player = state.store.player_mut();
        player.vel.y = -10.0;
        let pos = player.pos;
        state.store.player_data_mut().air_jumps = 1;
        events.push(GameEvent::pogo(tick, pos));
    }

    for pos in sparks {
        state.store.spawn(
            pos,
            Vec2::new(20.0, 20.0),
            Vec2::ZERO,
            EntityKind::Particle(ParticleData {
                life: Cooldown::start(5),
            }),
        );
    }

    // Particle drift and transient expiry.
    for e in state.store.entities.iter_mut() {
        if !e.alive {
            continue;
        }
        match &mut e.kind {
            EntityKind::Particle(p) => {
                e.pos += e.vel;
                p.life.tick();
                if p.life.ready() {
                    e.alive = false;
                }
            }
            EntityKind::MeleeHitbox(h) => {
                if h.life.ready() {
                    e.alive = false;
                }
            }
            _ => {}
        }
    }

    for event in events {
        state.push_event(event);
    }

    for id in kills {
        progression::handle_kill(state, id);
    }
}
