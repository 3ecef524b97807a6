//! The map: tile grid, entity population, and the per-step physics pipeline
//!
//! One world unit is one tile. The map exclusively owns its entities through
//! a generational arena and keeps non-owning index lists per category; the
//! pipeline runs in a fixed pass order so later passes can rely on earlier
//! repositioning being final for the step.

use glam::{IVec2, Vec2};

use super::collision::{
    Aabb2, discs_overlap, push_disc_out_of_fixed_aabb, push_disc_out_of_fixed_disc,
    push_discs_out_of_each_other,
};
use super::entity::{Entity, EntityArena, EntityId, EntityKind, Faction, Payload};
use super::raycast::{RaycastResult, voxel_raycast};
use super::{SimContext, behavior, projectile};
use crate::audio::Sound;
use crate::defs::{Definitions, TileDef};

/// 4-axis then 4-diagonal neighborhood, the wall push-out order
const NEIGHBOR_OFFSETS_8: [IVec2; 8] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(0, -1),
    IVec2::new(1, 1),
    IVec2::new(-1, 1),
    IVec2::new(1, -1),
    IVec2::new(-1, -1),
];

/// A tile grid plus the entities living on it
#[derive(Debug, Clone)]
pub struct Map {
    pub def_name: String,
    dims: IVec2,
    /// Per-cell index into the tile-definition registry
    tiles: Vec<usize>,
    pub entry_tile: IVec2,
    pub exit_tile: IVec2,
    pub(crate) defs: Definitions,

    pub entities: EntityArena,
    // === Non-owning index lists ===
    pub(crate) all: Vec<EntityId>,
    pub(crate) good_agents: Vec<EntityId>,
    pub(crate) evil_agents: Vec<EntityId>,
    pub(crate) good_bullets: Vec<EntityId>,
    pub(crate) evil_bullets: Vec<EntityId>,
    pub(crate) physics: Vec<EntityId>,
    pub(crate) explosions: Vec<EntityId>,
    /// Entities spawned mid-step join at the start of the next step
    pending_spawns: Vec<Entity>,

    /// Cached solidity snapshots: land treats water as solid, amphibian does
    /// not; both mark tiles under living Scorpios solid.
    land_solid: Vec<bool>,
    amphibian_solid: Vec<bool>,
    solid_maps_dirty: bool,

    /// The id of the player entity while it lives on this map
    pub player: Option<EntityId>,
    /// Raised by the exit check, consumed by the game layer
    pub player_reached_exit: bool,
}

impl Map {
    /// Blank map filled with one tile type; generation carves into this
    pub fn new_blank(def_name: &str, dims: IVec2, fill_tile: &str, defs: Definitions) -> Self {
        let fill = defs.tile_index(fill_tile);
        let cells = (dims.x * dims.y) as usize;
        Self {
            def_name: def_name.to_string(),
            dims,
            tiles: vec![fill; cells],
            entry_tile: IVec2::new(1, 1),
            exit_tile: dims - IVec2::new(2, 2),
            defs,
            entities: EntityArena::new(),
            all: Vec::new(),
            good_agents: Vec::new(),
            evil_agents: Vec::new(),
            good_bullets: Vec::new(),
            evil_bullets: Vec::new(),
            physics: Vec::new(),
            explosions: Vec::new(),
            pending_spawns: Vec::new(),
            land_solid: vec![false; cells],
            amphibian_solid: vec![false; cells],
            solid_maps_dirty: true,
            player: None,
            player_reached_exit: false,
        }
    }

    // === Grid queries ===

    pub fn dims(&self) -> IVec2 {
        self.dims
    }

    pub fn cell_count(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn tile_index(&self, coords: IVec2) -> usize {
        (coords.x + coords.y * self.dims.x) as usize
    }

    pub fn in_bounds(&self, coords: IVec2) -> bool {
        coords.x >= 0 && coords.y >= 0 && coords.x < self.dims.x && coords.y < self.dims.y
    }

    pub fn tile_def(&self, coords: IVec2) -> &TileDef {
        self.defs.tile(self.tiles[self.tile_index(coords)])
    }

    pub fn set_tile(&mut self, coords: IVec2, def_index: usize) {
        let i = self.tile_index(coords);
        self.tiles[i] = def_index;
        self.solid_maps_dirty = true;
    }

    pub fn set_tile_by_name(&mut self, coords: IVec2, name: &str) {
        let def_index = self.defs.tile_index(name);
        self.set_tile(coords, def_index);
    }

    /// Out-of-bounds coordinates are solid (closed world)
    pub fn is_tile_solid(&self, coords: IVec2, treat_water_as_solid: bool) -> bool {
        if !self.in_bounds(coords) {
            return true;
        }
        let def = self.tile_def(coords);
        def.is_solid || (treat_water_as_solid && def.is_water)
    }

    pub fn is_tile_water(&self, coords: IVec2) -> bool {
        self.in_bounds(coords) && self.tile_def(coords).is_water
    }

    pub fn tile_of_pos(&self, pos: Vec2) -> IVec2 {
        IVec2::new(pos.x.floor() as i32, pos.y.floor() as i32)
    }

    pub fn tile_center(&self, coords: IVec2) -> Vec2 {
        Vec2::new(coords.x as f32 + 0.5, coords.y as f32 + 0.5)
    }

    pub fn tile_bounds(&self, coords: IVec2) -> Aabb2 {
        let mins = Vec2::new(coords.x as f32, coords.y as f32);
        Aabb2::new(mins, mins + Vec2::ONE)
    }

    pub fn is_point_solid(&self, pos: Vec2, treat_water_as_solid: bool) -> bool {
        self.is_tile_solid(self.tile_of_pos(pos), treat_water_as_solid)
    }

    /// Row-major static solidity snapshot built straight from the tile
    /// definitions, ignoring entities. Used by generation and repair.
    pub fn static_solid_snapshot(&self, treat_water_as_solid: bool) -> Vec<bool> {
        let mut solid = vec![false; self.cell_count()];
        for y in 0..self.dims.y {
            for x in 0..self.dims.x {
                let coords = IVec2::new(x, y);
                solid[self.tile_index(coords)] = self.is_tile_solid(coords, treat_water_as_solid);
            }
        }
        solid
    }

    // === Cached solid snapshots for live pathfinding ===

    pub fn mark_solid_maps_dirty(&mut self) {
        self.solid_maps_dirty = true;
    }

    pub fn rebuild_solid_maps(&mut self) {
        self.land_solid = self.static_solid_snapshot(true);
        self.amphibian_solid = self.static_solid_snapshot(false);
        // Living Scorpios are immovable obstacles for pathing
        for list in [&self.good_agents, &self.evil_agents] {
            for id in list {
                if let Some(e) = self.entities.get(*id) {
                    if e.kind == EntityKind::Scorpio && !e.dead {
                        let i = self.tile_index(self.tile_of_pos(e.pos));
                        self.land_solid[i] = true;
                        self.amphibian_solid[i] = true;
                    }
                }
            }
        }
        self.solid_maps_dirty = false;
    }

    /// Snapshot appropriate for an agent's swim capability
    pub fn solid_snapshot_for(&self, can_swim: bool) -> &[bool] {
        if can_swim {
            &self.amphibian_solid
        } else {
            &self.land_solid
        }
    }

    // === Raycasts & visibility ===

    pub fn raycast_vs_tiles(
        &self,
        start: Vec2,
        fwd: Vec2,
        max_len: f32,
        treat_water_as_solid: bool,
    ) -> RaycastResult {
        voxel_raycast(start, fwd, max_len, |t| {
            self.is_tile_solid(t, treat_water_as_solid)
        })
    }

    /// True iff `to` is within `range` of `from` and no solid tile intercepts
    /// the segment first. Out-of-range pairs skip the raycast entirely.
    pub fn has_line_of_sight(
        &self,
        from: Vec2,
        to: Vec2,
        range: f32,
        treat_water_as_solid: bool,
    ) -> bool {
        let disp = to - from;
        let dist_sq = disp.length_squared();
        if dist_sq >= range * range {
            return false;
        }
        if dist_sq < 1e-12 {
            return true;
        }
        let fwd = disp / dist_sq.sqrt();
        let result = self.raycast_vs_tiles(from, fwd, range, treat_water_as_solid);
        result.dist * result.dist >= dist_sq
    }

    /// Segment clearance without a range gate, for path shortcut tests
    pub fn is_segment_clear(&self, from: Vec2, to: Vec2, treat_water_as_solid: bool) -> bool {
        let disp = to - from;
        let dist_sq = disp.length_squared();
        if dist_sq < 1e-12 {
            return true;
        }
        let dist = dist_sq.sqrt();
        let result = self.raycast_vs_tiles(from, disp / dist, dist, treat_water_as_solid);
        !result.hit
    }

    // === Entity management ===

    /// Insert immediately and link every index list (map setup)
    pub fn spawn_now(&mut self, entity: Entity) -> EntityId {
        let is_player = entity.kind == EntityKind::PlayerTank;
        let id = self.entities.insert(entity);
        self.link_entity(id);
        if is_player {
            self.player = Some(id);
        }
        if self
            .entities
            .get(id)
            .map(|e| e.kind == EntityKind::Scorpio)
            .unwrap_or(false)
        {
            self.solid_maps_dirty = true;
        }
        id
    }

    /// Queue a spawn; the entity participates starting next step
    pub fn queue_spawn(&mut self, entity: Entity) {
        self.pending_spawns.push(entity);
    }

    fn flush_pending_spawns(&mut self) {
        let pending = std::mem::take(&mut self.pending_spawns);
        for entity in pending {
            self.spawn_now(entity);
        }
    }

    fn link_entity(&mut self, id: EntityId) {
        let Some(e) = self.entities.get(id) else {
            return;
        };
        let kind = e.kind;
        let faction = e.faction;
        let in_physics = e.pushed_by_entities || e.pushes_entities || e.pushed_by_walls;

        if kind == EntityKind::Explosion {
            self.explosions.push(id);
            return;
        }
        self.all.push(id);
        if kind.is_agent() {
            match faction {
                Faction::Good => self.good_agents.push(id),
                Faction::Evil => self.evil_agents.push(id),
                Faction::Neutral => {}
            }
        }
        if kind.is_projectile() {
            match faction {
                Faction::Good => self.good_bullets.push(id),
                Faction::Evil => self.evil_bullets.push(id),
                Faction::Neutral => {}
            }
        }
        if in_physics {
            self.physics.push(id);
        }
    }

    /// Remove `id` from `list`, fatal if absent: membership is derived from
    /// immutable entity attributes, so a miss is a bookkeeping bug.
    fn unlink_from(list: &mut Vec<EntityId>, id: EntityId, list_name: &str) {
        match list.iter().position(|x| *x == id) {
            Some(i) => {
                list.remove(i);
            }
            None => {
                log::error!("Entity {id:?} missing from index list '{list_name}'");
                panic!("entity missing from index list '{list_name}'");
            }
        }
    }

    fn unlink_entity(&mut self, id: EntityId) {
        let Some(e) = self.entities.get(id) else {
            return;
        };
        let kind = e.kind;
        let faction = e.faction;
        let in_physics = e.pushed_by_entities || e.pushes_entities || e.pushed_by_walls;

        if kind == EntityKind::Explosion {
            Self::unlink_from(&mut self.explosions, id, "explosions");
            return;
        }
        Self::unlink_from(&mut self.all, id, "all");
        if kind.is_agent() {
            match faction {
                Faction::Good => Self::unlink_from(&mut self.good_agents, id, "good_agents"),
                Faction::Evil => Self::unlink_from(&mut self.evil_agents, id, "evil_agents"),
                Faction::Neutral => {}
            }
        }
        if kind.is_projectile() {
            match faction {
                Faction::Good => Self::unlink_from(&mut self.good_bullets, id, "good_bullets"),
                Faction::Evil => Self::unlink_from(&mut self.evil_bullets, id, "evil_bullets"),
                Faction::Neutral => {}
            }
        }
        if in_physics {
            Self::unlink_from(&mut self.physics, id, "physics");
        }
    }

    /// Unlink then free, for moving the player between maps
    pub fn extract_entity(&mut self, id: EntityId) -> Option<Entity> {
        self.unlink_entity(id);
        if self.player == Some(id) {
            self.player = None;
        }
        self.entities.remove(id)
    }

    /// Live evil agent count, for HUD and demo output
    pub fn evil_agent_count(&self) -> usize {
        self.evil_agents.len()
    }

    /// Every live entity id, effects last (also the draw order)
    pub fn iter_entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.all.iter().chain(self.explosions.iter()).copied()
    }

    /// Spawn a transient explosion effect (importance scales size/duration)
    pub fn spawn_explosion(&mut self, pos: Vec2, importance: f32) {
        self.queue_spawn(projectile::make_explosion(pos, importance));
    }

    // === The per-step pipeline ===

    pub fn update(&mut self, ctx: &mut SimContext, dt: f32) {
        self.flush_pending_spawns();
        self.update_entities(ctx, dt);
        self.update_explosions(dt);
        if self.solid_maps_dirty {
            self.rebuild_solid_maps();
        }
        self.check_player_reached_exit(ctx);
        self.push_entities_off_each_other();
        self.push_entities_out_of_walls(ctx);
        self.check_bullets_vs_agents(ctx);
        self.delete_garbage_entities();
    }

    fn update_entities(&mut self, ctx: &mut SimContext, dt: f32) {
        for id in self.all.clone() {
            let Some(mut entity) = self.entities.take(id) else {
                continue;
            };
            let was_dead = entity.dead;
            if !was_dead {
                match entity.kind {
                    EntityKind::PlayerTank => behavior::update_player(&mut entity, self, ctx, dt),
                    EntityKind::Leo | EntityKind::Aries | EntityKind::Capricorn => {
                        behavior::update_chaser(&mut entity, self, ctx, dt)
                    }
                    EntityKind::Scorpio => behavior::update_scorpio(&mut entity, self, ctx, dt),
                    EntityKind::Bullet | EntityKind::Bolt | EntityKind::Missile => {
                        projectile::update_bullet(&mut entity, self, ctx, dt)
                    }
                    EntityKind::Flame => projectile::update_flame(&mut entity, self, ctx, dt),
                    EntityKind::Explosion => {}
                }
            }
            let died_this_pass = entity.dead && !was_dead;
            let kind = entity.kind;
            let pos = entity.pos;
            self.entities.put_back(id, entity);
            if died_this_pass {
                self.note_death(kind, pos, ctx);
            }
        }
    }

    /// Death side effects safe to repeat are avoided by only calling this
    /// when the dead flag was raised during the current pass.
    fn note_death(&mut self, kind: EntityKind, pos: Vec2, ctx: &mut SimContext) {
        match kind {
            EntityKind::Scorpio => {
                self.mark_solid_maps_dirty();
                self.spawn_explosion(pos, 5.0);
                ctx.audio.play(Sound::EnemyDied);
            }
            EntityKind::Leo | EntityKind::Aries | EntityKind::Capricorn => {
                self.spawn_explosion(pos, 5.0);
                ctx.audio.play(Sound::EnemyDied);
            }
            EntityKind::PlayerTank => {
                self.spawn_explosion(pos, 10.0);
                ctx.audio.play(Sound::PlayerDied);
            }
            EntityKind::Bullet | EntityKind::Bolt | EntityKind::Missile => {
                self.spawn_explosion(pos, 1.0);
                ctx.audio.play(Sound::BulletDied);
            }
            EntityKind::Flame | EntityKind::Explosion => {}
        }
    }

    fn update_explosions(&mut self, dt: f32) {
        for id in self.explosions.clone() {
            if let Some(e) = self.entities.get_mut(id) {
                if let Payload::Explosion(data) = &mut e.payload {
                    data.age += dt;
                    if data.age >= data.duration {
                        e.dead = true;
                        e.garbage = true;
                    }
                }
            }
        }
    }

    fn check_player_reached_exit(&mut self, ctx: &mut SimContext) {
        let Some(pid) = self.player else {
            return;
        };
        let Some(player) = self.entities.get(pid) else {
            return;
        };
        if player.dead {
            return;
        }
        if self.tile_of_pos(player.pos) == self.exit_tile && !self.player_reached_exit {
            self.player_reached_exit = true;
            ctx.audio.play(Sound::ExitReached);
        }
    }

    fn push_entities_off_each_other(&mut self) {
        let ids = self.physics.clone();
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let Some((a, b)) = self.entities.get_pair_mut(ids[i], ids[j]) else {
                    continue;
                };
                if a.dead || b.dead {
                    continue;
                }
                if !discs_overlap(a.pos, a.physics_radius, b.pos, b.physics_radius) {
                    continue;
                }
                let a_pushes_b = a.pushes_entities && b.pushed_by_entities;
                let b_pushes_a = b.pushes_entities && a.pushed_by_entities;
                if a_pushes_b && b_pushes_a {
                    push_discs_out_of_each_other(
                        &mut a.pos,
                        a.physics_radius,
                        &mut b.pos,
                        b.physics_radius,
                    );
                } else if a_pushes_b {
                    push_disc_out_of_fixed_disc(
                        &mut b.pos,
                        b.physics_radius,
                        a.pos,
                        a.physics_radius,
                    );
                } else if b_pushes_a {
                    push_disc_out_of_fixed_disc(
                        &mut a.pos,
                        a.physics_radius,
                        b.pos,
                        b.physics_radius,
                    );
                }
                // Neither flag pair set: pure pass-through
            }
        }
    }

    fn push_entities_out_of_walls(&mut self, ctx: &SimContext) {
        for id in self.physics.clone() {
            let Some(mut e) = self.entities.take(id) else {
                continue;
            };
            let skip = e.dead
                || !e.pushed_by_walls
                || (ctx.cheats.no_clip && e.kind == EntityKind::PlayerTank);
            if !skip {
                self.push_entity_out_of_walls(&mut e);
            }
            self.entities.put_back(id, e);
        }
    }

    fn push_entity_out_of_walls(&self, e: &mut Entity) {
        let home = self.tile_of_pos(e.pos);
        let treat_water_solid = !e.can_swim;
        for offset in NEIGHBOR_OFFSETS_8 {
            let tile = home + offset;
            if self.is_tile_solid(tile, treat_water_solid) {
                push_disc_out_of_fixed_aabb(&mut e.pos, e.physics_radius, self.tile_bounds(tile));
            }
        }
    }

    fn check_bullets_vs_agents(&mut self, ctx: &mut SimContext) {
        self.check_bullet_list_vs_agent_list(
            &self.evil_bullets.clone(),
            &self.good_agents.clone(),
            ctx,
        );
        self.check_bullet_list_vs_agent_list(
            &self.good_bullets.clone(),
            &self.evil_agents.clone(),
            ctx,
        );
    }

    fn check_bullet_list_vs_agent_list(
        &mut self,
        bullets: &[EntityId],
        agents: &[EntityId],
        ctx: &mut SimContext,
    ) {
        let mut deaths: Vec<(EntityKind, Vec2)> = Vec::new();
        for &bid in bullets {
            for &aid in agents {
                let Some((bullet, agent)) = self.entities.get_pair_mut(bid, aid) else {
                    continue;
                };
                if bullet.dead || agent.dead || !agent.hittable_by_bullets {
                    continue;
                }
                if !discs_overlap(
                    bullet.pos,
                    bullet.physics_radius,
                    agent.pos,
                    agent.physics_radius,
                ) {
                    continue;
                }
                // Attacker callback first, then defender
                projectile::resolve_bullet_hit(bullet, agent, ctx, &mut deaths);
            }
        }
        for (kind, pos) in deaths {
            self.note_death(kind, pos, ctx);
        }
    }

    /// End-of-step sweep: unlink garbage from every index list, then free
    /// the arena slot. Explosions sweep separately.
    fn delete_garbage_entities(&mut self) {
        for id in self.all.clone() {
            let is_garbage = self.entities.get(id).map(|e| e.garbage).unwrap_or(false);
            if is_garbage {
                self.unlink_entity(id);
                self.entities.remove(id);
            }
        }
        for id in self.explosions.clone() {
            let is_garbage = self.entities.get(id).map(|e| e.garbage).unwrap_or(false);
            if is_garbage {
                Self::unlink_from(&mut self.explosions, id, "explosions");
                self.entities.remove(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;
    use crate::audio::NullAudio;
    use crate::sim::Cheats;
    use crate::sim::factory::create_entity;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn open_map() -> Map {
        let defs = Definitions::builtin();
        let mut map = Map::new_blank("test", IVec2::new(12, 12), "Grass", defs);
        // Solid border
        for x in 0..12 {
            map.set_tile_by_name(IVec2::new(x, 0), "RockWall");
            map.set_tile_by_name(IVec2::new(x, 11), "RockWall");
        }
        for y in 0..12 {
            map.set_tile_by_name(IVec2::new(0, y), "RockWall");
            map.set_tile_by_name(IVec2::new(11, y), "RockWall");
        }
        map.rebuild_solid_maps();
        map
    }

    fn test_ctx<'a>(
        config: &'a GameConfig,
        audio: &'a mut NullAudio,
        input: &'a crate::input::InputState,
        rng: &'a mut Pcg32,
    ) -> SimContext<'a> {
        SimContext {
            config,
            audio,
            input,
            rng,
            cheats: Cheats::default(),
        }
    }

    #[test]
    fn test_out_of_bounds_is_solid() {
        let map = open_map();
        assert!(map.is_tile_solid(IVec2::new(-1, 3), false));
        assert!(map.is_tile_solid(IVec2::new(3, 12), false));
        assert!(!map.is_tile_solid(IVec2::new(3, 3), false));
    }

    #[test]
    fn test_water_respects_swim_flag() {
        let mut map = open_map();
        map.set_tile_by_name(IVec2::new(4, 4), "Water");
        assert!(map.is_tile_solid(IVec2::new(4, 4), true));
        assert!(!map.is_tile_solid(IVec2::new(4, 4), false));
    }

    #[test]
    fn test_tile_geometry() {
        let map = open_map();
        assert_eq!(map.tile_center(IVec2::new(2, 3)), Vec2::new(2.5, 3.5));
        let bounds = map.tile_bounds(IVec2::new(2, 3));
        assert_eq!(bounds.mins, Vec2::new(2.0, 3.0));
        assert_eq!(bounds.maxs, Vec2::new(3.0, 4.0));
        assert_eq!(map.tile_of_pos(Vec2::new(2.9, 3.1)), IVec2::new(2, 3));
    }

    #[test]
    fn test_line_of_sight_symmetric() {
        let mut map = open_map();
        map.set_tile_by_name(IVec2::new(5, 5), "RockWall");
        map.set_tile_by_name(IVec2::new(5, 6), "RockWall");
        let points = [
            Vec2::new(2.5, 5.5),
            Vec2::new(8.5, 5.5),
            Vec2::new(2.5, 2.5),
            Vec2::new(8.5, 8.5),
        ];
        for a in points {
            for b in points {
                assert_eq!(
                    map.has_line_of_sight(a, b, 10.0, true),
                    map.has_line_of_sight(b, a, 10.0, true),
                    "{a:?} vs {b:?}"
                );
            }
        }
        // Wall actually blocks
        assert!(!map.has_line_of_sight(Vec2::new(2.5, 5.5), Vec2::new(8.5, 5.5), 10.0, true));
        // Out of range is never visible
        assert!(!map.has_line_of_sight(Vec2::new(2.5, 2.5), Vec2::new(8.5, 8.5), 2.0, true));
    }

    #[test]
    fn test_scorpio_blocks_solid_snapshot() {
        let config = GameConfig::new();
        let mut map = open_map();
        let scorpio = create_entity(
            EntityKind::Scorpio,
            Faction::Evil,
            Vec2::new(6.5, 6.5),
            0.0,
            map.dims(),
            &config,
        );
        let id = map.spawn_now(scorpio);
        map.rebuild_solid_maps();
        let i = map.tile_index(IVec2::new(6, 6));
        assert!(map.solid_snapshot_for(false)[i]);
        assert!(map.solid_snapshot_for(true)[i]);
        // Death clears the obstacle after a rebuild
        map.entities.get_mut(id).unwrap().take_damage(999);
        map.rebuild_solid_maps();
        assert!(!map.solid_snapshot_for(false)[i]);
    }

    #[test]
    fn test_pending_spawn_joins_next_step() {
        let config = GameConfig::new();
        let mut audio = NullAudio;
        let input = crate::input::InputState::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut map = open_map();
        let bullet = create_entity(
            EntityKind::Bullet,
            Faction::Evil,
            Vec2::new(5.5, 5.5),
            0.0,
            map.dims(),
            &config,
        );
        map.queue_spawn(bullet);
        assert!(map.all.is_empty());
        let mut ctx = test_ctx(&config, &mut audio, &input, &mut rng);
        map.update(&mut ctx, 1.0 / 60.0);
        assert_eq!(map.all.len(), 1);
        assert_eq!(map.evil_bullets.len(), 1);
    }

    #[test]
    fn test_mutual_push_separates_tanks() {
        let config = GameConfig::new();
        let mut map = open_map();
        let a = create_entity(
            EntityKind::Leo,
            Faction::Evil,
            Vec2::new(5.5, 5.5),
            0.0,
            map.dims(),
            &config,
        );
        let b = create_entity(
            EntityKind::Leo,
            Faction::Evil,
            Vec2::new(5.7, 5.5),
            0.0,
            map.dims(),
            &config,
        );
        let ra = a.physics_radius;
        let rb = b.physics_radius;
        let ida = map.spawn_now(a);
        let idb = map.spawn_now(b);
        map.push_entities_off_each_other();
        let pa = map.entities.get(ida).unwrap().pos;
        let pb = map.entities.get(idb).unwrap().pos;
        assert!(pa.distance(pb) >= ra + rb - 1e-3);
    }

    #[test]
    fn test_wall_push_out() {
        let config = GameConfig::new();
        let mut map = open_map();
        // Tank overlapping the left border wall
        let tank = create_entity(
            EntityKind::Leo,
            Faction::Evil,
            Vec2::new(1.1, 5.5),
            0.0,
            map.dims(),
            &config,
        );
        let r = tank.physics_radius;
        let id = map.spawn_now(tank);
        let mut audio = NullAudio;
        let input = crate::input::InputState::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let ctx = test_ctx(&config, &mut audio, &input, &mut rng);
        map.push_entities_out_of_walls(&ctx);
        let pos = map.entities.get(id).unwrap().pos;
        assert!(pos.x >= 1.0 + r - 1e-3);
    }

    #[test]
    fn test_garbage_sweep_unlinks_everywhere() {
        let config = GameConfig::new();
        let mut map = open_map();
        let leo = create_entity(
            EntityKind::Leo,
            Faction::Evil,
            Vec2::new(5.5, 5.5),
            0.0,
            map.dims(),
            &config,
        );
        let id = map.spawn_now(leo);
        assert_eq!(map.evil_agents.len(), 1);
        assert_eq!(map.physics.len(), 1);
        map.entities.get_mut(id).unwrap().take_damage(999);
        map.delete_garbage_entities();
        assert!(map.all.is_empty());
        assert!(map.evil_agents.is_empty());
        assert!(map.physics.is_empty());
        assert!(map.entities.get(id).is_none());
    }

    #[test]
    fn test_explosion_sweep_is_age_gated() {
        let config = GameConfig::new();
        let mut audio = NullAudio;
        let input = crate::input::InputState::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut map = open_map();
        // importance 5.0 => 0.5 s lifetime
        map.spawn_explosion(Vec2::new(5.5, 5.5), 5.0);
        let mut ctx = test_ctx(&config, &mut audio, &input, &mut rng);
        map.update(&mut ctx, 1.0 / 60.0);
        assert_eq!(map.explosions.len(), 1);
        // Age it past its duration; the next sweep removes it
        for _ in 0..40 {
            let mut ctx = test_ctx(&config, &mut audio, &input, &mut rng);
            map.update(&mut ctx, 1.0 / 60.0);
        }
        assert!(map.explosions.is_empty());
        assert!(map.entities.is_empty());
    }

    #[test]
    fn test_exit_flag_raised() {
        let config = GameConfig::new();
        let mut audio = NullAudio;
        let input = crate::input::InputState::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut map = open_map();
        let exit = map.exit_tile;
        let player = create_entity(
            EntityKind::PlayerTank,
            Faction::Good,
            map.tile_center(exit),
            0.0,
            map.dims(),
            &config,
        );
        map.spawn_now(player);
        let mut ctx = test_ctx(&config, &mut audio, &input, &mut rng);
        map.check_player_reached_exit(&mut ctx);
        assert!(map.player_reached_exit);
    }
}
