//! Tagged-union entity model and the generational arena that owns it
//!
//! Every actor in the arena is one `Entity`: shared spatial/health state plus
//! a kind-specific payload. The map addresses entities through stable
//! generational ids, so index lists never dangle across removals.

use glam::{IVec2, Vec2};

use super::heatmap::TileHeatMap;
use crate::consts::UNREACHABLE;

/// Allegiance, gating which projectiles damage which agents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Faction {
    Good,
    Neutral,
    Evil,
}

/// Entity variant discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    PlayerTank,
    Leo,
    Aries,
    Scorpio,
    Capricorn,
    Bullet,
    Bolt,
    Missile,
    Flame,
    Explosion,
}

impl EntityKind {
    /// Agents pursue/wander; projectiles and effects do not
    pub fn is_agent(self) -> bool {
        matches!(
            self,
            EntityKind::PlayerTank
                | EntityKind::Leo
                | EntityKind::Aries
                | EntityKind::Scorpio
                | EntityKind::Capricorn
        )
    }

    pub fn is_projectile(self) -> bool {
        matches!(
            self,
            EntityKind::Bullet | EntityKind::Bolt | EntityKind::Missile | EntityKind::Flame
        )
    }
}

/// Tuning constants for a chasing agent, loaded from config at spawn
#[derive(Debug, Clone, Copy)]
pub struct ChaseTuning {
    pub drive_speed: f32,
    pub turn_rate: f32,
    pub drive_aperture: f32,
    pub shoot_aperture: f32,
    pub shoot_cooldown: f32,
    pub visible_range: f32,
}

/// Pathfinding scratch state owned by each chasing agent
#[derive(Debug, Clone)]
pub struct ChaseData {
    pub goal_pos: Vec2,
    /// Change-detection key: the tile the distance field was last seeded at
    pub goal_tile: Option<IVec2>,
    /// Waypoints, seed-first; the back of the list is consumed next
    pub path: Vec<IVec2>,
    /// Owned distance-field scratch buffer
    pub heat: TileHeatMap,
    /// Regenerations performed (observable cache-hit counter)
    pub regen_count: u32,
    pub cooldown_timer: f32,
    pub tuning: ChaseTuning,
}

impl ChaseData {
    pub fn new(map_dims: IVec2, tuning: ChaseTuning) -> Self {
        Self {
            goal_pos: Vec2::ZERO,
            goal_tile: None,
            path: Vec::new(),
            heat: TileHeatMap::new(map_dims, UNREACHABLE),
            regen_count: 0,
            cooldown_timer: 0.0,
            tuning,
        }
    }
}

/// Stationary turret state (Scorpio)
#[derive(Debug, Clone, Copy)]
pub struct TurretData {
    /// Absolute turret orientation, degrees
    pub turret_orient: f32,
    pub bolt_timer: f32,
    pub flame_timer: f32,
    pub turn_rate: f32,
    pub half_aperture: f32,
    pub bolt_cooldown: f32,
    pub flame_cooldown: f32,
    pub visible_range: f32,
}

/// Player-specific state
#[derive(Debug, Clone, Copy)]
pub struct PlayerData {
    /// Turret orientation relative to the hull, degrees
    pub turret_relative: f32,
    pub cooldown_timer: f32,
}

/// Projectile state shared by bullets, bolts and missiles
#[derive(Debug, Clone, Copy)]
pub struct BulletData {
    /// Damage dealt to an agent on impact
    pub damage: i32,
}

/// Flame spray particle state
#[derive(Debug, Clone, Copy)]
pub struct FlameData {
    pub age: f32,
    pub duration: f32,
    /// Current spin, degrees/second, decays to zero over the lifetime
    pub spin_rate: f32,
}

/// Transient explosion effect state
#[derive(Debug, Clone, Copy)]
pub struct ExplosionData {
    pub age: f32,
    pub duration: f32,
    /// Full visual size in world units
    pub size: f32,
}

/// Kind-specific payload
#[derive(Debug, Clone)]
pub enum Payload {
    Player(PlayerData),
    Chase(Box<ChaseData>),
    Turret(TurretData),
    Bullet(BulletData),
    Flame(FlameData),
    Explosion(ExplosionData),
}

/// One simulated actor
#[derive(Debug, Clone)]
pub struct Entity {
    pub kind: EntityKind,
    pub faction: Faction,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Hull orientation, degrees
    pub orient_deg: f32,
    pub physics_radius: f32,
    pub health: i32,
    pub max_health: i32,
    pub dead: bool,
    pub garbage: bool,

    // === Collision participation flags ===
    pub pushed_by_entities: bool,
    pub pushes_entities: bool,
    pub pushed_by_walls: bool,
    pub hittable_by_bullets: bool,
    /// Water tiles are passable for swimmers
    pub can_swim: bool,

    pub payload: Payload,
}

impl Entity {
    /// Capability query: projectile payload if this entity is one
    pub fn as_bullet(&self) -> Option<&BulletData> {
        match &self.payload {
            Payload::Bullet(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_bullet_mut(&mut self) -> Option<&mut BulletData> {
        match &mut self.payload {
            Payload::Bullet(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_chase_mut(&mut self) -> Option<&mut ChaseData> {
        match &mut self.payload {
            Payload::Chase(c) => Some(c),
            _ => None,
        }
    }

    /// Apply damage. Dead entities ignore further damage; health never goes
    /// negative. Returns true exactly when this call caused the death.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if self.dead {
            return false;
        }
        self.health = (self.health - amount).max(0);
        if self.health == 0 {
            self.die();
            return true;
        }
        false
    }

    /// Mark dead. The player entity persists for game-over handling; every
    /// other kind becomes garbage for the end-of-step sweep.
    pub fn die(&mut self) {
        if self.dead {
            return;
        }
        self.dead = true;
        if self.kind != EntityKind::PlayerTank {
            self.garbage = true;
        }
    }

    /// Restore the player after a respawn
    pub fn revive(&mut self) {
        self.dead = false;
        self.garbage = false;
        self.health = self.max_health;
    }

    /// Forward unit vector of the hull orientation
    pub fn forward(&self) -> Vec2 {
        crate::vec2_from_degrees(self.orient_deg)
    }
}

/// Stable handle to an arena slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId {
    pub index: u32,
    pub generation: u32,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    entity: Option<Entity>,
}

/// Generational arena owning every entity of one map
#[derive(Debug, Clone, Default)]
pub struct EntityArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live_count: usize,
}

impl EntityArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.live_count
    }

    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    pub fn insert(&mut self, entity: Entity) -> EntityId {
        self.live_count += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entity = Some(entity);
            EntityId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                entity: Some(entity),
            });
            EntityId {
                index,
                generation: 0,
            }
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entity.as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entity.as_mut()
    }

    /// Borrow the entity out of its slot for an update that also needs the
    /// arena. The slot stays reserved (not on the free list) until
    /// `put_back`, so mid-update lookups simply miss.
    pub fn take(&mut self, id: EntityId) -> Option<Entity> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entity.take()
    }

    pub fn put_back(&mut self, id: EntityId, entity: Entity) {
        let slot = &mut self.slots[id.index as usize];
        debug_assert_eq!(slot.generation, id.generation);
        debug_assert!(slot.entity.is_none());
        slot.entity = Some(entity);
    }

    /// Remove and free the slot; the id becomes permanently stale
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let entity = slot.entity.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live_count -= 1;
        Some(entity)
    }

    /// Mutable access to two distinct entities at once
    pub fn get_pair_mut(
        &mut self,
        a: EntityId,
        b: EntityId,
    ) -> Option<(&mut Entity, &mut Entity)> {
        if a.index == b.index {
            return None;
        }
        let (lo_id, hi_id, swapped) = if a.index < b.index {
            (a, b, false)
        } else {
            (b, a, true)
        };
        let (left, right) = self.slots.split_at_mut(hi_id.index as usize);
        let lo_slot = &mut left[lo_id.index as usize];
        let hi_slot = &mut right[0];
        if lo_slot.generation != lo_id.generation || hi_slot.generation != hi_id.generation {
            return None;
        }
        match (lo_slot.entity.as_mut(), hi_slot.entity.as_mut()) {
            (Some(lo), Some(hi)) => {
                if swapped {
                    Some((hi, lo))
                } else {
                    Some((lo, hi))
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy(kind: EntityKind) -> Entity {
        Entity {
            kind,
            faction: Faction::Evil,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            orient_deg: 0.0,
            physics_radius: 0.25,
            health: 3,
            max_health: 3,
            dead: false,
            garbage: false,
            pushed_by_entities: true,
            pushes_entities: true,
            pushed_by_walls: true,
            hittable_by_bullets: true,
            can_swim: false,
            payload: Payload::Bullet(BulletData { damage: 1 }),
        }
    }

    #[test]
    fn test_stale_id_misses_after_remove() {
        let mut arena = EntityArena::new();
        let id = arena.insert(dummy(EntityKind::Leo));
        assert!(arena.get(id).is_some());
        arena.remove(id).unwrap();
        assert!(arena.get(id).is_none());

        // Reusing the slot must not resurrect the stale id
        let id2 = arena.insert(dummy(EntityKind::Aries));
        assert_eq!(id.index, id2.index);
        assert!(arena.get(id).is_none());
        assert!(arena.get(id2).is_some());
    }

    #[test]
    fn test_take_reserves_slot() {
        let mut arena = EntityArena::new();
        let id = arena.insert(dummy(EntityKind::Leo));
        let entity = arena.take(id).unwrap();
        assert!(arena.get(id).is_none());
        // A fresh insert may not claim the reserved slot
        let other = arena.insert(dummy(EntityKind::Aries));
        assert_ne!(other.index, id.index);
        arena.put_back(id, entity);
        assert!(arena.get(id).is_some());
    }

    #[test]
    fn test_pair_access() {
        let mut arena = EntityArena::new();
        let a = arena.insert(dummy(EntityKind::Leo));
        let b = arena.insert(dummy(EntityKind::Aries));
        let (ea, eb) = arena.get_pair_mut(a, b).unwrap();
        ea.pos.x = 1.0;
        eb.pos.x = 2.0;
        assert_eq!(arena.get(a).unwrap().pos.x, 1.0);
        assert_eq!(arena.get(b).unwrap().pos.x, 2.0);
        // Order-preserving when swapped
        let (eb2, ea2) = arena.get_pair_mut(b, a).unwrap();
        assert_eq!(eb2.pos.x, 2.0);
        assert_eq!(ea2.pos.x, 1.0);
        assert!(arena.get_pair_mut(a, a).is_none());
    }

    #[test]
    fn test_damage_on_dead_is_noop() {
        let mut e = dummy(EntityKind::Leo);
        e.health = 1;
        assert!(e.take_damage(1));
        assert!(e.dead);
        assert!(e.garbage);
        // Second death cannot trigger
        assert!(!e.take_damage(5));
        assert_eq!(e.health, 0);
    }

    #[test]
    fn test_player_death_is_not_garbage() {
        let mut e = dummy(EntityKind::PlayerTank);
        e.health = 1;
        e.take_damage(1);
        assert!(e.dead);
        assert!(!e.garbage);
        e.revive();
        assert!(!e.dead);
        assert_eq!(e.health, e.max_health);
    }

    #[test]
    fn test_capability_query() {
        let e = dummy(EntityKind::Bullet);
        assert!(e.as_bullet().is_some());
        let mut agent = dummy(EntityKind::Leo);
        agent.payload = Payload::Chase(Box::new(ChaseData::new(
            IVec2::new(4, 4),
            ChaseTuning {
                drive_speed: 0.5,
                turn_rate: 120.0,
                drive_aperture: 90.0,
                shoot_aperture: 10.0,
                shoot_cooldown: 1.0,
                visible_range: 10.0,
            },
        )));
        assert!(agent.as_bullet().is_none());
        assert!(agent.as_chase_mut().is_some());
    }
}
