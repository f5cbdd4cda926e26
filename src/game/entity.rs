//! Entity Arena
//!
//! Every simulated object lives in one [`EntityStore`]: the player, enemies,
//! platforms, NPCs, pickups, projectiles, melee hitboxes and cosmetic
//! particles. Kind-specific fields hang off the [`EntityKind`] variant rather
//! than being optional fields on a shared record, so "field present only for
//! some kinds" cannot happen.
//!
//! The player occupies slot 0 for the whole session; room loads and pruning
//! never remove it.

use serde::{Deserialize, Serialize};

use crate::core::cooldown::Cooldown;
use crate::core::vec2::Vec2;

/// Stable entity identifier, assigned from a monotonic counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Which side of the fight a hitbox or projectile belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Spawned by the player; damages enemies.
    Player,
    /// Spawned by an enemy; damages the player.
    Enemy,
}

/// Enemy behavior profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Archetype {
    /// Ground melee patroller; commits to timed swings up close.
    Skeleton,
    /// Flying chaser; swoops straight at the player, no gravity.
    Bat,
    /// Ground hopper; gravity-bound, random hops toward the player.
    Slime,
    /// Flying kiter; keeps its distance and fires aimed projectiles.
    Mage,
}

/// Direction a melee swing was made in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackDir {
    /// Ahead of facing.
    Forward,
    /// Arcing above the player.
    Up,
    /// Arcing below the player; hits grant the pogo bounce.
    Down,
}

/// Pickup categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Currency; adds its value to gold.
    Coin,
    /// Restores hp by its value.
    Heal,
    /// Permanently extends melee range by its value.
    RangeBoost,
    /// Permanently raises the damage bonus by its value.
    DamageBoost,
}

/// Player parry posture. At most one window is ever active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParryState {
    /// Not parrying.
    #[default]
    Inactive,
    /// Guarding the facing side.
    Forward,
    /// Guarding overhead.
    Upward,
}

/// Player-specific state. Persists across rooms; reset on game restart.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerData {
    /// Current hp, clamped to [0, max_hp].
    pub hp: f32,
    /// Maximum hp; grows with level-ups.
    pub max_hp: f32,
    /// Facing: +1 right, -1 left.
    pub facing: i8,
    /// Remaining air jumps (0..=2).
    pub air_jumps: u8,
    /// Shared melee/ranged attack cooldown.
    pub attack_cooldown: Cooldown,
    /// Active parry direction, if any.
    pub parry: ParryState,
    /// Remaining ticks of the active parry window.
    pub parry_window: Cooldown,
    /// Refractory period before the next parry can start.
    pub parry_refractory: Cooldown,
    /// Hit-invincibility window; no player damage while active.
    pub invincibility: Cooldown,
    /// Flat melee range bonus from talents, pickups and shop.
    pub range_bonus: f32,
    /// Flat damage bonus applied to every attack.
    pub damage_bonus: f32,
    /// Gold carried.
    pub gold: u32,
    /// Fraction of unblocked body-contact damage reflected to the attacker.
    pub thorns: f32,
    /// Extra healing on each kill.
    pub lifesteal_bonus: f32,
    /// Multiplier on the ranged attack cooldown (lower = faster).
    pub ranged_cooldown_mult: f32,
    /// Multiplier on projectile lifetime.
    pub projectile_life_mult: f32,
    /// Projectiles per ranged attack.
    pub projectile_count: u32,
}

impl PlayerData {
    /// Starting hp for a fresh run.
    pub const BASE_HP: f32 = 100.0;

    /// New-game player stats.
    pub fn new() -> Self {
        Self {
            hp: Self::BASE_HP,
            max_hp: Self::BASE_HP,
            facing: 1,
            air_jumps: 2,
            attack_cooldown: Cooldown::READY,
            parry: ParryState::Inactive,
            parry_window: Cooldown::READY,
            parry_refractory: Cooldown::READY,
            invincibility: Cooldown::READY,
            range_bonus: 0.0,
            damage_bonus: 0.0,
            gold: 0,
            thorns: 0.0,
            lifesteal_bonus: 0.0,
            ranged_cooldown_mult: 1.0,
            projectile_life_mult: 1.0,
            projectile_count: 1,
        }
    }

    /// Reduce hp, clamped at zero. Ignores the invincibility window;
    /// callers gate on it.
    pub fn take_damage(&mut self, amount: f32) {
        self.hp = (self.hp - amount).max(0.0);
    }

    /// Restore hp, capped at max_hp.
    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    /// True once hp has reached zero.
    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    /// Facing as a velocity sign.
    #[inline]
    pub fn facing_sign(&self) -> f32 {
        self.facing as f32
    }
}

impl Default for PlayerData {
    fn default() -> Self {
        Self::new()
    }
}

/// Enemy-specific state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnemyData {
    /// Current hp.
    pub hp: f32,
    /// Maximum hp.
    pub max_hp: f32,
    /// Behavior profile.
    pub archetype: Archetype,
    /// Patrol x-bounds (start, end) for patrolling archetypes.
    pub patrol: Option<(f32, f32)>,
    /// Cooldown between committed attacks.
    pub attack_cooldown: Cooldown,
    /// Damage dealt by body contact and by this enemy's attacks.
    pub contact_damage: f32,
    /// Bosses use larger radii and gate the room exit while alive.
    pub boss: bool,
}

/// NPC-specific state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NpcData {
    /// Interaction radius for the shop prompt.
    pub interact_radius: f32,
}

/// Pickup-specific state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemData {
    /// What collecting it does.
    pub kind: ItemKind,
    /// Magnitude of the effect (coin value, heal amount, stat delta).
    pub value: u32,
}

/// Projectile-specific state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectileData {
    /// Owner side. A parried enemy projectile is reclassified to Player.
    pub side: Side,
    /// Damage on hit.
    pub damage: f32,
    /// Remaining lifetime; removed when it reaches zero or on hit.
    pub life: Cooldown,
}

/// Melee-hitbox-specific state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HitboxData {
    /// Owner side.
    pub side: Side,
    /// Damage on hit.
    pub damage: f32,
    /// Swing direction the hitbox came from.
    pub dir: AttackDir,
    /// Remaining lifetime.
    pub life: Cooldown,
    /// Targets this spawn has already resolved against, even though the
    /// hitbox lives several ticks: a player swing damages each enemy at
    /// most once, a parried enemy slash reports its block once.
    pub already_hit: Vec<EntityId>,
}

/// Cosmetic particle state. No gameplay effect.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParticleData {
    /// Remaining lifetime.
    pub life: Cooldown,
}

/// Kind-specific payload of an entity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum EntityKind {
    /// The player character.
    Player(PlayerData),
    /// A hostile.
    Enemy(EnemyData),
    /// Static collision geometry.
    Platform,
    /// A friendly, static character.
    Npc(NpcData),
    /// A collectible pickup.
    Item(ItemData),
    /// A moving projectile.
    Projectile(ProjectileData),
    /// A short-lived melee damage area.
    MeleeHitbox(HitboxData),
    /// A cosmetic particle.
    Particle(ParticleData),
}

/// One simulated object.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identity.
    pub id: EntityId,
    /// Top-left corner of the bounding box.
    pub pos: Vec2,
    /// Bounding-box size.
    pub size: Vec2,
    /// Velocity per tick.
    pub vel: Vec2,
    /// One-way liveness flag; dead entities are pruned at end of tick.
    pub alive: bool,
    /// Kind-specific payload.
    pub kind: EntityKind,
}

/// Axis-aligned bounding-box overlap test.
#[inline]
pub fn aabb_overlap(a_pos: Vec2, a_size: Vec2, b_pos: Vec2, b_size: Vec2) -> bool {
    a_pos.x < b_pos.x + b_size.x
        && a_pos.x + a_size.x > b_pos.x
        && a_pos.y < b_pos.y + b_size.y
        && a_pos.y + a_size.y > b_pos.y
}

impl Entity {
    /// AABB overlap with another entity.
    #[inline]
    pub fn overlaps(&self, other: &Entity) -> bool {
        aabb_overlap(self.pos, self.size, other.pos, other.size)
    }

    /// Center of the bounding box.
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size.scale(0.5)
    }

    /// True for static collision geometry.
    #[inline]
    pub fn is_platform(&self) -> bool {
        matches!(self.kind, EntityKind::Platform)
    }

    /// Enemy payload, if this is an enemy.
    pub fn as_enemy(&self) -> Option<&EnemyData> {
        match &self.kind {
            EntityKind::Enemy(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable enemy payload.
    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyData> {
        match &mut self.kind {
            EntityKind::Enemy(data) => Some(data),
            _ => None,
        }
    }

    /// Item payload, if this is a pickup.
    pub fn as_item(&self) -> Option<&ItemData> {
        match &self.kind {
            EntityKind::Item(data) => Some(data),
            _ => None,
        }
    }

    /// Projectile payload.
    pub fn as_projectile(&self) -> Option<&ProjectileData> {
        match &self.kind {
            EntityKind::Projectile(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable projectile payload.
    pub fn as_projectile_mut(&mut self) -> Option<&mut ProjectileData> {
        match &mut self.kind {
            EntityKind::Projectile(data) => Some(data),
            _ => None,
        }
    }

    /// Hitbox payload.
    pub fn as_hitbox(&self) -> Option<&HitboxData> {
        match &self.kind {
            EntityKind::MeleeHitbox(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable hitbox payload.
    pub fn as_hitbox_mut(&mut self) -> Option<&mut HitboxData> {
        match &mut self.kind {
            EntityKind::MeleeHitbox(data) => Some(data),
            _ => None,
        }
    }
}

/// The arena owning every simulated object.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntityStore {
    /// All entities. Slot 0 is always the player.
    pub entities: Vec<Entity>,
    next_id: u32,
}

/// Where the player stands when a session starts.
pub const PLAYER_SPAWN: Vec2 = Vec2::new(100.0, 300.0);

impl EntityStore {
    /// Create a store holding only the player, at the session spawn point.
    pub fn new() -> Self {
        let mut store = Self {
            entities: Vec::new(),
            next_id: 0,
        };
        store.spawn(
            PLAYER_SPAWN,
            crate::PLAYER_SIZE,
            Vec2::ZERO,
            EntityKind::Player(PlayerData::new()),
        );
        store
    }

    /// Add an entity, assigning the next id.
    pub fn spawn(&mut self, pos: Vec2, size: Vec2, vel: Vec2, kind: EntityKind) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push(Entity {
            id,
            pos,
            size,
            vel,
            alive: true,
            kind,
        });
        id
    }

    /// The player entity.
    pub fn player(&self) -> &Entity {
        &self.entities[0]
    }

    /// The player entity, mutable.
    pub fn player_mut(&mut self) -> &mut Entity {
        &mut self.entities[0]
    }

    /// The player payload.
    pub fn player_data(&self) -> &PlayerData {
        match &self.entities[0].kind {
            EntityKind::Player(data) => data,
            _ => unreachable!("slot 0 is always the player"),
        }
    }

    /// The player payload, mutable.
    pub fn player_data_mut(&mut self) -> &mut PlayerData {
        match &mut self.entities[0].kind {
            EntityKind::Player(data) => data,
            _ => unreachable!("slot 0 is always the player"),
        }
    }

    /// Look up an entity by id.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Look up an entity by id, mutable.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    /// True once room geometry has been instantiated. A store without
    /// platforms has not loaded a room yet (validation requires at least
    /// one), and the simulation refuses to step it.
    pub fn has_platforms(&self) -> bool {
        self.entities.iter().any(|e| e.is_platform())
    }

    /// Snapshot of all platform AABBs, for collision passes that also
    /// mutate entities.
    pub fn platform_boxes(&self) -> Vec<(Vec2, Vec2)> {
        self.entities
            .iter()
            .filter(|e| e.is_platform())
            .map(|e| (e.pos, e.size))
            .collect()
    }

    /// Living enemies.
    pub fn enemies(&self) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(|e| e.alive && matches!(e.kind, EntityKind::Enemy(_)))
    }

    /// Count of living enemies.
    pub fn alive_enemy_count(&self) -> usize {
        self.enemies().count()
    }

    /// True while any living enemy in the room carries the boss flag.
    pub fn boss_alive(&self) -> bool {
        self.enemies().any(|e| e.as_enemy().is_some_and(|d| d.boss))
    }

    /// Remove dead entities. The player is never removed, even at 0 hp;
    /// the session phase handles player death.
    pub fn prune(&mut self) {
        self.entities
            .retain(|e| e.alive || matches!(e.kind, EntityKind::Player(_)));
    }

    /// Remove everything but the player. Used on room load; transient
    /// projectiles, hitboxes, particles and pickups never carry across rooms.
    pub fn clear_room(&mut self) {
        self.entities
            .retain(|e| matches!(e.kind, EntityKind::Player(_)));
    }

    /// Total entity count, including the player.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Always false; the player is always present.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}
