//! Progression
//!
//! The single kill handler every damage source routes through, loot drops,
//! pickup collection, talents and shop purchase effects. Death is one-way
//! and idempotent: whichever source reports a kill first wins, later
//! reports for the same enemy are no-ops.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::cooldown::Cooldown;
use crate::core::vec2::Vec2;
use crate::game::entity::{
    aabb_overlap, EntityId, EntityKind, ItemData, ItemKind, ParticleData,
};
use crate::game::events::GameEvent;
use crate::game::state::SimulationState;

/// Base heal granted on every kill.
const KILL_HEAL: f32 = 10.0;
/// Kills per automatic level-up.
const KILLS_PER_LEVEL: u32 = 3;
/// Max-hp growth per level-up.
const LEVEL_MAX_HP: f32 = 20.0;
/// Damage-bonus growth per level-up.
const LEVEL_DAMAGE: f32 = 5.0;
/// Coins in a boss burst.
const BOSS_COIN_COUNT: u32 = 10;
/// Value of each boss coin.
const BOSS_COIN_VALUE: u32 = 10;
/// Chance that a non-boss kill drops a stat pickup.
const LOOT_DROP_CHANCE: f32 = 0.1;

/// Permanent player upgrades chosen outside the simulation.
///
/// Reapplying a talent stacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Talent {
    /// Reflect 20% of unblocked body-contact damage.
    WarriorThorns,
    /// +30 melee range.
    WarriorRange,
    /// +15 healing per kill.
    WarriorLifesteal,
    /// Ranged cooldown x0.6.
    MageSpeed,
    /// Projectile lifetime x1.6.
    MageRange,
    /// +2 projectiles per shot.
    MageMulti,
}

/// Apply a talent to the player.
pub fn apply_talent(state: &mut SimulationState, talent: Talent) {
    let data = state.store.player_data_mut();
    match talent {
        Talent::WarriorThorns => data.thorns = 0.2,
        Talent::WarriorRange => data.range_bonus += 30.0,
        Talent::WarriorLifesteal => data.lifesteal_bonus += 15.0,
        Talent::MageSpeed => data.ranged_cooldown_mult *= 0.6,
        Talent::MageRange => data.projectile_life_mult *= 1.6,
        Talent::MageMulti => data.projectile_count += 2,
    }
    debug!(?talent, "talent applied");
    let tick = state.tick;
    state.push_event(GameEvent::talent_applied(tick, talent));
}

/// Apply a shop purchase effect. Gold accounting and pricing live in the
/// host's shop UI; the core only applies the outcome.
pub fn apply_purchase(state: &mut SimulationState, kind: ItemKind) {
    let data = state.store.player_data_mut();
    match kind {
        ItemKind::Heal => data.hp = data.max_hp,
        ItemKind::RangeBoost => data.range_bonus += 20.0,
        ItemKind::DamageBoost => data.damage_bonus += 10.0,
        // Coins are dropped loot, never sold
        ItemKind::Coin => return,
    }
    debug!(?kind, "purchase applied");
    let tick = state.tick;
    state.push_event(GameEvent::purchase_applied(tick, kind));
}

/// Kill an enemy: flip it dead, count the kill, heal, level up every third
/// kill, and scatter loot. Safe to call repeatedly for the same enemy.
pub fn handle_kill(state: &mut SimulationState, enemy_id: EntityId) {
    let Some(enemy) = state.store.get_mut(enemy_id) else {
        return;
    };
    if !enemy.alive {
        return;
    }
    let EntityKind::Enemy(data) = &mut enemy.kind else {
        return;
    };
    data.hp = 0.0;
    let boss = data.boss;
    let drop_pos = enemy.pos;
    enemy.alive = false;

    state.kills += 1;
    let kills = state.kills;
    let tick = state.tick;

    {
        let player = state.store.player_data_mut();
        player.heal(KILL_HEAL + player.lifesteal_bonus);
        if kills % KILLS_PER_LEVEL == 0 {
            player.max_hp += LEVEL_MAX_HP;
            player.damage_bonus += LEVEL_DAMAGE;
            let (max_hp, damage_bonus) = (player.max_hp, player.damage_bonus);
            state
                .events
                .push(GameEvent::level_up(tick, max_hp, damage_bonus));
        }
    }

    let SimulationState {
        store, rng, events, ..
    } = state;

    let coin_count = if boss {
        BOSS_COIN_COUNT
    } else {
        1 + rng.next_int(2)
    };
    let coin_value = if boss { BOSS_COIN_VALUE } else { 1 };
    for _ in 0..coin_count {
        let offset = rng.next_f32() * 20.0;
        let vel = Vec2::new(
            (rng.next_f32() - 0.5) * 4.0,
            -5.0 - rng.next_f32() * 3.0,
        );
        store.spawn(
            drop_pos + Vec2::new(offset, 0.0),
            Vec2::new(12.0, 12.0),
            vel,
            EntityKind::Item(ItemData {
                kind: ItemKind::Coin,
                value: coin_value,
            }),
        );
    }

    if !boss && rng.chance(LOOT_DROP_CHANCE) {
        let (kind, value) = match rng.next_int(3) {
            0 => (ItemKind::Heal, 20),
            1 => (ItemKind::RangeBoost, 10),
            _ => (ItemKind::DamageBoost, 5),
        };
        store.spawn(
            drop_pos,
            Vec2::new(14.0, 14.0),
            Vec2::new(0.0, -4.0),
            EntityKind::Item(ItemData { kind, value }),
        );
    }

    // Death motes
    for _ in 0..4 {
        let vel = Vec2::new(rng.next_range(-2.0, 2.0), rng.next_range(-3.0, -1.0));
        store.spawn(
            drop_pos,
            Vec2::new(6.0, 6.0),
            vel,
            EntityKind::Particle(ParticleData {
                life: Cooldown::start(20),
            }),
        );
    }

    events.push(GameEvent::enemy_killed(tick, enemy_id, boss, kills));
    info!(kills, boss, "enemy killed");
}

/// Collect every pickup overlapping the player and apply its effect.
pub fn collect_pickups(state: &mut SimulationState) {
    let player = state.store.player();
    let (p_pos, p_size) = (player.pos, player.size);
    let tick = state.tick;

    let collected: Vec<(EntityId, ItemKind, u32)> = state
        .store
        .entities
        .iter()
        .filter(|e| e.alive && aabb_overlap(e.pos, e.size, p_pos, p_size))
        .filter_map(|e| e.as_item().map(|item| (e.id, item.kind, item.value)))
        .collect();

    for (id, kind, value) in collected {
        if let Some(item) = state.store.get_mut(id) {
            item.alive = false;
        }
        let data = state.store.player_data_mut();
        match kind {
            ItemKind::Coin => data.gold += value,
            ItemKind::Heal => data.heal(value as f32),
            ItemKind::RangeBoost => data.range_bonus += value as f32,
            ItemKind::DamageBoost => data.damage_bonus += value as f32,
        }
        state.push_event(GameEvent::item_collected(tick, kind, value));
    }
}
