//! Agent behaviors: chasing tanks, the Scorpio turret, and the player
//!
//! Chasers run a perceive / look-up-map / execute cycle each step. The
//! distance field only regenerates when the goal tile changes, so a
//! stationary goal costs a path pop at most.

use glam::Vec2;
use rand::Rng;

use super::SimContext;
use super::entity::{ChaseTuning, Entity, EntityKind, Payload};
use super::heatmap::{path_to_seed, populate_distance_field};
use super::map::Map;
use super::projectile::make_projectile;
use crate::audio::Sound;
use crate::consts::WANDER_PICK_MAX_ATTEMPTS;
use crate::{degrees_from_vec2, shortest_angular_disp_degrees, turn_toward_degrees, vec2_from_degrees};

/// Waypoints closer than this are considered reached
const WAYPOINT_REACHED_DIST: f32 = 0.25;
/// Scorpio switches from bolts to flame spray inside this range
const SCORPIO_FLAME_RANGE_SQ: f32 = 6.25;

/// Steering decision handed from the look-up phase to the execute phase
struct ChasePlan {
    steer_target: Vec2,
    tuning: ChaseTuning,
    player_visible: bool,
    player_pos: Vec2,
    fire_ready: bool,
}

// === Chasers (Leo, Aries, Capricorn) ===

pub fn update_chaser(e: &mut Entity, map: &mut Map, ctx: &mut SimContext, dt: f32) {
    let pos = e.pos;
    let radius = e.physics_radius;
    let can_swim = e.can_swim;
    let kind = e.kind;
    let faction = e.faction;

    let (player_pos, player_alive) = player_snapshot(map);

    // Phase 1: perceive + path maintenance on the chase payload only
    let plan = {
        let Some(chase) = e.as_chase_mut() else {
            return;
        };
        chase.cooldown_timer = (chase.cooldown_timer - dt).max(0.0);
        let visible = player_alive
            && map.has_line_of_sight(pos, player_pos, chase.tuning.visible_range, false);
        if visible {
            chase.goal_pos = player_pos;
        }

        let arrived = (chase.goal_pos - pos).length() <= radius + 0.01;
        if arrived {
            chase.path.clear();
        } else {
            let goal_tile = map.tile_of_pos(chase.goal_pos);
            if chase.goal_tile != Some(goal_tile) {
                let solid = map.solid_snapshot_for(can_swim);
                populate_distance_field(&mut chase.heat, goal_tile, solid);
                chase.path = path_to_seed(map.tile_of_pos(pos), &chase.heat);
                chase.goal_tile = Some(goal_tile);
                chase.regen_count += 1;
            }

            // Shortcut: when the second-nearest waypoint is reachable by
            // three clear parallel rays, the nearest one is redundant
            if chase.path.len() >= 2 {
                let beyond = map.tile_center(chase.path[chase.path.len() - 2]);
                if rays_clear(map, pos, beyond, radius, !can_swim) {
                    chase.path.pop();
                }
            }
            while let Some(&next) = chase.path.last() {
                if pos.distance(map.tile_center(next)) <= WAYPOINT_REACHED_DIST {
                    chase.path.pop();
                } else {
                    break;
                }
            }
        }

        // Covers an exhausted path and a reached wander goal alike
        if chase.path.is_empty() && !visible {
            pick_wander_goal(chase, map, ctx, can_swim);
        }

        let steer_target = match chase.path.last() {
            Some(&next) => map.tile_center(next),
            None => chase.goal_pos,
        };
        ChasePlan {
            steer_target,
            tuning: chase.tuning,
            player_visible: visible,
            player_pos,
            fire_ready: chase.cooldown_timer <= 0.0,
        }
    };

    // Phase 2: steer and drive
    let to_target = plan.steer_target - pos;
    if to_target.length_squared() > 1e-12 {
        let goal_deg = degrees_from_vec2(to_target);
        e.orient_deg = turn_toward_degrees(e.orient_deg, goal_deg, plan.tuning.turn_rate * dt);
        let off = shortest_angular_disp_degrees(e.orient_deg, goal_deg).abs();
        e.vel = if off <= plan.tuning.drive_aperture * 0.5 {
            e.forward() * plan.tuning.drive_speed
        } else {
            Vec2::ZERO
        };
    } else {
        e.vel = Vec2::ZERO;
    }
    e.pos += e.vel * dt;

    // Phase 3: shoot along the hull when lined up with the visible player
    if plan.player_visible && plan.fire_ready && plan.tuning.shoot_aperture > 0.0 {
        let aim_deg = degrees_from_vec2(plan.player_pos - e.pos);
        let off = shortest_angular_disp_degrees(e.orient_deg, aim_deg).abs();
        if off <= plan.tuning.shoot_aperture * 0.5 {
            let projectile_kind = match kind {
                EntityKind::Capricorn => EntityKind::Missile,
                _ => EntityKind::Bullet,
            };
            let muzzle = e.pos + e.forward() * ctx.config.get_f32("muzzle_offset", 0.3);
            map.queue_spawn(make_projectile(
                projectile_kind,
                faction,
                muzzle,
                e.orient_deg,
                ctx.config,
            ));
            ctx.audio.play(Sound::EnemyShoot);
            if let Some(chase) = e.as_chase_mut() {
                chase.cooldown_timer = chase.tuning.shoot_cooldown;
            }
        }
    }
}

/// Center ray plus one ray per side, offset by the hull radius
fn rays_clear(map: &Map, from: Vec2, to: Vec2, radius: f32, water_solid: bool) -> bool {
    let disp = to - from;
    if disp.length_squared() < 1e-12 {
        return true;
    }
    let side = disp.perp().normalize() * radius;
    map.is_segment_clear(from, to, water_solid)
        && map.is_segment_clear(from + side, to + side, water_solid)
        && map.is_segment_clear(from - side, to - side, water_solid)
}

/// Rejection-sample a random non-solid tile as the next wander goal. Silent
/// fall-through when the budget runs out; the agent idles one step.
fn pick_wander_goal(
    chase: &mut super::entity::ChaseData,
    map: &Map,
    ctx: &mut SimContext,
    can_swim: bool,
) {
    let dims = map.dims();
    let solid = map.solid_snapshot_for(can_swim);
    for _ in 0..WANDER_PICK_MAX_ATTEMPTS {
        let tile = glam::IVec2::new(
            ctx.rng.random_range(1..dims.x - 1),
            ctx.rng.random_range(1..dims.y - 1),
        );
        if !solid[map.tile_index(tile)] {
            chase.goal_pos = map.tile_center(tile);
            chase.goal_tile = None;
            return;
        }
    }
}

// === Scorpio turret ===

pub fn update_scorpio(e: &mut Entity, map: &mut Map, ctx: &mut SimContext, dt: f32) {
    let pos = e.pos;
    let faction = e.faction;
    let (player_pos, player_alive) = player_snapshot(map);

    let Payload::Turret(turret) = &mut e.payload else {
        return;
    };
    turret.bolt_timer = (turret.bolt_timer - dt).max(0.0);
    turret.flame_timer = (turret.flame_timer - dt).max(0.0);

    let visible =
        player_alive && map.has_line_of_sight(pos, player_pos, turret.visible_range, false);
    if !visible {
        // Idle sweep
        turret.turret_orient += turret.turn_rate * dt;
        return;
    }

    let to_player = player_pos - pos;
    let aim_deg = degrees_from_vec2(to_player);
    turret.turret_orient =
        turn_toward_degrees(turret.turret_orient, aim_deg, turret.turn_rate * dt);
    let off = shortest_angular_disp_degrees(turret.turret_orient, aim_deg).abs();
    let muzzle_offset = ctx.config.get_f32("scorpio_muzzle_offset", 0.5);
    let muzzle = pos + vec2_from_degrees(turret.turret_orient) * muzzle_offset;

    if to_player.length_squared() > SCORPIO_FLAME_RANGE_SQ {
        if off <= turret.half_aperture && turret.bolt_timer <= 0.0 {
            map.queue_spawn(make_projectile(
                EntityKind::Bolt,
                faction,
                muzzle,
                turret.turret_orient,
                ctx.config,
            ));
            ctx.audio.play(Sound::EnemyShoot);
            turret.bolt_timer = turret.bolt_cooldown;
        }
    } else if off <= 45.0 && turret.flame_timer <= 0.0 {
        let jitter = ctx.rng.random_range(-15.0..15.0);
        let mut flame = make_projectile(
            EntityKind::Flame,
            faction,
            muzzle,
            turret.turret_orient + jitter,
            ctx.config,
        );
        if let Payload::Flame(data) = &mut flame.payload {
            data.spin_rate = ctx.rng.random_range(-720.0..720.0);
        }
        map.queue_spawn(flame);
        ctx.audio.play(Sound::FlameSpray);
        turret.flame_timer = turret.flame_cooldown;
    }
}

// === Player ===

pub fn update_player(e: &mut Entity, map: &mut Map, ctx: &mut SimContext, dt: f32) {
    let move_axis = ctx.input.move_axis;
    let aim_axis = ctx.input.aim_axis;

    // Hull
    if move_axis.length_squared() > 1e-4 {
        let goal_deg = degrees_from_vec2(move_axis);
        let hull_rate = ctx.config.get_f32("player_hull_turn_rate", 180.0);
        e.orient_deg = turn_toward_degrees(e.orient_deg, goal_deg, hull_rate * dt);
        e.vel = e.forward() * ctx.config.get_f32("player_drive_speed", 1.0);
    } else {
        e.vel = Vec2::ZERO;
    }
    e.pos += e.vel * dt;

    let orient = e.orient_deg;
    let pos = e.pos;
    let faction = e.faction;

    let Payload::Player(data) = &mut e.payload else {
        return;
    };
    data.cooldown_timer = (data.cooldown_timer - dt).max(0.0);

    // Turret aims independently of the hull
    if aim_axis.length_squared() > 1e-4 {
        let goal_abs = degrees_from_vec2(aim_axis);
        let turret_rate = ctx.config.get_f32("player_turret_turn_rate", 360.0);
        let current_abs = orient + data.turret_relative;
        let new_abs = turn_toward_degrees(current_abs, goal_abs, turret_rate * dt);
        data.turret_relative = new_abs - orient;
    }

    if ctx.input.shoot_held && data.cooldown_timer <= 0.0 {
        let turret_abs = orient + data.turret_relative;
        let muzzle = pos + vec2_from_degrees(turret_abs) * ctx.config.get_f32("muzzle_offset", 0.3);
        map.queue_spawn(make_projectile(
            EntityKind::Bullet,
            faction,
            muzzle,
            turret_abs,
            ctx.config,
        ));
        ctx.audio.play(Sound::PlayerShoot);
        data.cooldown_timer = ctx.config.get_f32("player_shoot_cooldown", 0.1);
    }
}

fn player_snapshot(map: &Map) -> (Vec2, bool) {
    match map.player.and_then(|id| map.entities.get(id)) {
        Some(p) if !p.dead => (p.pos, true),
        _ => (Vec2::ZERO, false),
    }
}
