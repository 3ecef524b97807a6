//! Geometry emission for an abstract render sink
//!
//! The core turns the map and its entities into colored triangle lists each
//! frame; a platform layer uploads them however it likes. World space is
//! tile space, one unit per tile.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use std::f32::consts::PI;

use crate::consts::UNREACHABLE;
use crate::sim::entity::{Entity, EntityKind, Faction, Payload};
use crate::sim::heatmap::TileHeatMap;
use crate::sim::map::Map;
use crate::sim::projectile::flame_visual_size;
use crate::vec2_from_degrees;

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const PLAYER_HULL: [f32; 4] = [0.2, 0.8, 0.4, 1.0];
    pub const PLAYER_TURRET: [f32; 4] = [0.15, 0.6, 0.3, 1.0];
    pub const ENEMY_HULL: [f32; 4] = [0.8, 0.25, 0.2, 1.0];
    pub const ENEMY_TURRET: [f32; 4] = [0.6, 0.18, 0.15, 1.0];
    pub const ARIES_SHIELD: [f32; 4] = [0.85, 0.7, 0.2, 1.0];
    pub const BULLET_GOOD: [f32; 4] = [1.0, 1.0, 0.9, 1.0];
    pub const BULLET_EVIL: [f32; 4] = [1.0, 0.5, 0.3, 1.0];
    pub const FLAME: [f32; 4] = [1.0, 0.55, 0.1, 0.8];
    pub const EXPLOSION: [f32; 4] = [1.0, 0.8, 0.3, 0.9];
    pub const HEALTH_BACK: [f32; 4] = [0.1, 0.1, 0.1, 0.8];
    pub const HEALTH_FILL: [f32; 4] = [0.2, 0.9, 0.2, 0.9];
    pub const EXIT_MARKER: [f32; 4] = [0.9, 0.9, 0.2, 1.0];
    pub const BACKGROUND: [f32; 4] = [0.02, 0.02, 0.05, 1.0];
}

const DISC_SEGMENTS: usize = 24;

/// Receiver for one frame of emitted triangles
pub trait RenderSink {
    fn submit(&mut self, vertices: &[Vertex]);
}

/// Sink that keeps the last frame (headless runs, tests)
#[derive(Debug, Default)]
pub struct BufferSink {
    pub vertices: Vec<Vertex>,
}

impl RenderSink for BufferSink {
    fn submit(&mut self, vertices: &[Vertex]) {
        self.vertices.clear();
        self.vertices.extend_from_slice(vertices);
    }
}

// === Primitive emitters ===

/// Axis-aligned quad as two triangles
pub fn push_quad(out: &mut Vec<Vertex>, mins: Vec2, maxs: Vec2, color: [f32; 4]) {
    let v = [
        Vertex::new(mins.x, mins.y, color),
        Vertex::new(maxs.x, mins.y, color),
        Vertex::new(maxs.x, maxs.y, color),
        Vertex::new(mins.x, mins.y, color),
        Vertex::new(maxs.x, maxs.y, color),
        Vertex::new(mins.x, maxs.y, color),
    ];
    out.extend_from_slice(&v);
}

/// Disc as a triangle fan
pub fn push_disc(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [f32; 4]) {
    for i in 0..DISC_SEGMENTS {
        let a0 = (i as f32 / DISC_SEGMENTS as f32) * 2.0 * PI;
        let a1 = ((i + 1) as f32 / DISC_SEGMENTS as f32) * 2.0 * PI;
        out.push(Vertex::new(center.x, center.y, color));
        out.push(Vertex::new(
            center.x + radius * a0.cos(),
            center.y + radius * a0.sin(),
            color,
        ));
        out.push(Vertex::new(
            center.x + radius * a1.cos(),
            center.y + radius * a1.sin(),
            color,
        ));
    }
}

/// Thick line segment as a quad
pub fn push_line(out: &mut Vec<Vertex>, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
    let dir = (to - from).normalize_or_zero();
    let perp = Vec2::new(-dir.y, dir.x) * (width * 0.5);
    let v = [
        Vertex::new(from.x + perp.x, from.y + perp.y, color),
        Vertex::new(from.x - perp.x, from.y - perp.y, color),
        Vertex::new(to.x - perp.x, to.y - perp.y, color),
        Vertex::new(from.x + perp.x, from.y + perp.y, color),
        Vertex::new(to.x - perp.x, to.y - perp.y, color),
        Vertex::new(to.x + perp.x, to.y + perp.y, color),
    ];
    out.extend_from_slice(&v);
}

// === Scene emission ===

/// One quad per tile, tinted from the tile definition; the exit tile gets a
/// marker overlay.
pub fn emit_map(out: &mut Vec<Vertex>, map: &Map) {
    let dims = map.dims();
    for y in 0..dims.y {
        for x in 0..dims.x {
            let coords = glam::IVec2::new(x, y);
            let bounds = map.tile_bounds(coords);
            push_quad(out, bounds.mins, bounds.maxs, map.tile_def(coords).tint);
        }
    }
    let exit = map.tile_bounds(map.exit_tile);
    let inset = Vec2::splat(0.3);
    push_quad(out, exit.mins + inset, exit.maxs - inset, colors::EXIT_MARKER);
}

/// Translucent overlay scaled by distance-field values, skipping unreachable
/// cells. Used by the heat-map debug view.
pub fn emit_heat_overlay(out: &mut Vec<Vertex>, map: &Map, heat: &TileHeatMap) {
    let max = heat.max_reachable_value().max(1.0);
    let dims = map.dims();
    for y in 0..dims.y {
        for x in 0..dims.x {
            let coords = glam::IVec2::new(x, y);
            let v = heat.value(coords);
            if v >= UNREACHABLE {
                continue;
            }
            let t = v / max;
            let bounds = map.tile_bounds(coords);
            push_quad(out, bounds.mins, bounds.maxs, [t, 0.0, 1.0 - t, 0.45]);
        }
    }
}

pub fn emit_entities(out: &mut Vec<Vertex>, map: &Map) {
    for id in map.iter_entity_ids() {
        if let Some(e) = map.entities.get(id) {
            emit_entity(out, e);
        }
    }
}

fn emit_entity(out: &mut Vec<Vertex>, e: &Entity) {
    if e.dead && e.kind != EntityKind::Explosion {
        return;
    }
    match e.kind {
        EntityKind::PlayerTank => {
            push_disc(out, e.pos, e.physics_radius, colors::PLAYER_HULL);
            let turret_abs = match &e.payload {
                Payload::Player(p) => e.orient_deg + p.turret_relative,
                _ => e.orient_deg,
            };
            let tip = e.pos + vec2_from_degrees(turret_abs) * (e.physics_radius * 1.5);
            push_line(out, e.pos, tip, 0.1, colors::PLAYER_TURRET);
            emit_health_bar(out, e);
        }
        EntityKind::Leo | EntityKind::Capricorn => {
            push_disc(out, e.pos, e.physics_radius, colors::ENEMY_HULL);
            let tip = e.pos + e.forward() * (e.physics_radius * 1.5);
            push_line(out, e.pos, tip, 0.08, colors::ENEMY_TURRET);
            emit_health_bar(out, e);
        }
        EntityKind::Aries => {
            push_disc(out, e.pos, e.physics_radius, colors::ENEMY_HULL);
            // Front shield arc rendered as a forward-offset bar
            let fwd = e.forward();
            let face = e.pos + fwd * e.physics_radius;
            let perp = Vec2::new(-fwd.y, fwd.x) * e.physics_radius;
            push_line(out, face - perp, face + perp, 0.08, colors::ARIES_SHIELD);
            emit_health_bar(out, e);
        }
        EntityKind::Scorpio => {
            push_disc(out, e.pos, e.physics_radius, colors::ENEMY_HULL);
            if let Payload::Turret(t) = &e.payload {
                let tip = e.pos + vec2_from_degrees(t.turret_orient) * (e.physics_radius * 1.6);
                push_line(out, e.pos, tip, 0.1, colors::ENEMY_TURRET);
            }
            emit_health_bar(out, e);
        }
        EntityKind::Bullet | EntityKind::Bolt | EntityKind::Missile => {
            let color = match e.faction {
                Faction::Good => colors::BULLET_GOOD,
                _ => colors::BULLET_EVIL,
            };
            push_disc(out, e.pos, e.physics_radius.max(0.04), color);
        }
        EntityKind::Flame => {
            if let Payload::Flame(data) = &e.payload {
                push_disc(out, e.pos, flame_visual_size(data) * 0.5, colors::FLAME);
            }
        }
        EntityKind::Explosion => {
            if let Payload::Explosion(data) = &e.payload {
                // Ease out: grows fast, then coasts
                let t = (data.age / data.duration).clamp(0.0, 1.0);
                let eased = 1.0 - (1.0 - t) * (1.0 - t);
                push_disc(out, e.pos, data.size * eased, colors::EXPLOSION);
            }
        }
    }
}

fn emit_health_bar(out: &mut Vec<Vertex>, e: &Entity) {
    if e.health >= e.max_health || e.max_health <= 0 {
        return;
    }
    let width = e.physics_radius * 2.0;
    let mins = e.pos + Vec2::new(-e.physics_radius, e.physics_radius + 0.1);
    push_quad(out, mins, mins + Vec2::new(width, 0.08), colors::HEALTH_BACK);
    let frac = e.health as f32 / e.max_health as f32;
    push_quad(
        out,
        mins,
        mins + Vec2::new(width * frac, 0.08),
        colors::HEALTH_FILL,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;
    use crate::defs::Definitions;
    use crate::sim::factory::create_entity;
    use glam::IVec2;

    fn small_map() -> Map {
        Map::new_blank("test", IVec2::new(4, 4), "Grass", Definitions::builtin())
    }

    #[test]
    fn test_map_emits_one_quad_per_tile() {
        let map = small_map();
        let mut out = Vec::new();
        emit_map(&mut out, &map);
        // 16 tile quads plus the exit marker quad, 6 vertices each
        assert_eq!(out.len(), (16 + 1) * 6);
    }

    #[test]
    fn test_full_health_hides_the_bar() {
        let config = GameConfig::new();
        let mut leo = create_entity(
            crate::sim::entity::EntityKind::Leo,
            crate::sim::entity::Faction::Evil,
            Vec2::new(1.5, 1.5),
            0.0,
            IVec2::new(4, 4),
            &config,
        );
        let mut full = Vec::new();
        emit_entity(&mut full, &leo);
        leo.health -= 1;
        let mut hurt = Vec::new();
        emit_entity(&mut hurt, &leo);
        assert!(hurt.len() > full.len());
    }

    #[test]
    fn test_heat_overlay_skips_unreachable() {
        let map = small_map();
        let mut heat = TileHeatMap::new(IVec2::new(4, 4), UNREACHABLE);
        heat.set_value(IVec2::new(1, 1), 0.0);
        heat.set_value(IVec2::new(2, 1), 1.0);
        let mut out = Vec::new();
        emit_heat_overlay(&mut out, &map, &heat);
        assert_eq!(out.len(), 2 * 6);
    }

    #[test]
    fn test_buffer_sink_replaces_frame() {
        let mut sink = BufferSink::default();
        sink.submit(&[Vertex::new(0.0, 0.0, colors::BACKGROUND)]);
        assert_eq!(sink.vertices.len(), 1);
        sink.submit(&[]);
        assert!(sink.vertices.is_empty());
    }
}
