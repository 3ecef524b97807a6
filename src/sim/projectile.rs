//! Projectile construction, flight, wall bounces and agent impacts
//!
//! Speed, health, radius and damage all come from one property table keyed
//! by (kind, faction); asking for a combination no weapon fires is fatal.

use glam::Vec2;

use super::SimContext;
use super::collision::{push_disc_out_of_fixed_disc, reflect_velocity};
use super::entity::{
    BulletData, Entity, EntityKind, ExplosionData, Faction, FlameData, Payload,
};
use super::map::Map;
use crate::audio::Sound;
use crate::{GameConfig, degrees_from_vec2, shortest_angular_disp_degrees, turn_toward_degrees};

/// Flight and impact numbers for one projectile kind
#[derive(Debug, Clone, Copy)]
pub struct ProjectileStats {
    pub speed: f32,
    pub health: i32,
    pub radius: f32,
    pub damage: i32,
}

/// Property table for every combination a weapon actually fires
pub fn projectile_stats(kind: EntityKind, faction: Faction, config: &GameConfig) -> ProjectileStats {
    match (kind, faction) {
        (EntityKind::Bullet, Faction::Good) => ProjectileStats {
            speed: config.get_f32("bullet_speed", 4.0),
            health: 3,
            radius: config.get_f32("bullet_radius", 0.05),
            damage: config.get_i32("bullet_damage", 1),
        },
        (EntityKind::Bullet, Faction::Evil) => ProjectileStats {
            speed: config.get_f32("bullet_speed", 4.0),
            health: 1,
            radius: config.get_f32("bullet_radius", 0.05),
            damage: config.get_i32("bullet_damage", 1),
        },
        (EntityKind::Bolt, Faction::Evil) => ProjectileStats {
            speed: config.get_f32("bolt_speed", 6.0),
            health: 1,
            radius: config.get_f32("bullet_radius", 0.05),
            damage: config.get_i32("bullet_damage", 1),
        },
        (EntityKind::Missile, Faction::Evil) => ProjectileStats {
            speed: config.get_f32("missile_speed", 3.0),
            health: 1,
            radius: config.get_f32("bullet_radius", 0.05),
            damage: config.get_i32("bullet_damage", 1),
        },
        (EntityKind::Flame, Faction::Evil) => ProjectileStats {
            speed: config.get_f32("flame_speed", 1.0),
            health: 1,
            radius: config.get_f32("flame_radius", 0.05),
            damage: 1,
        },
        _ => {
            log::error!("No projectile stats for {kind:?} / {faction:?}");
            panic!("no projectile stats for this kind/faction combination");
        }
    }
}

/// Build a projectile at the muzzle position, already in flight
pub fn make_projectile(
    kind: EntityKind,
    faction: Faction,
    pos: Vec2,
    orient_deg: f32,
    config: &GameConfig,
) -> Entity {
    let stats = projectile_stats(kind, faction, config);
    let payload = match kind {
        EntityKind::Flame => Payload::Flame(FlameData {
            age: 0.0,
            duration: config.get_f32("flame_duration", 1.0),
            spin_rate: 0.0,
        }),
        _ => Payload::Bullet(BulletData {
            damage: stats.damage,
        }),
    };
    Entity {
        kind,
        faction,
        pos,
        vel: crate::vec2_from_degrees(orient_deg) * stats.speed,
        orient_deg,
        physics_radius: stats.radius,
        health: stats.health,
        max_health: stats.health,
        dead: false,
        garbage: false,
        pushed_by_entities: false,
        pushes_entities: false,
        pushed_by_walls: false,
        hittable_by_bullets: false,
        can_swim: true,
        payload,
    }
}

/// Transient explosion effect; importance scales both duration and size
pub fn make_explosion(pos: Vec2, importance: f32) -> Entity {
    Entity {
        kind: EntityKind::Explosion,
        faction: Faction::Neutral,
        pos,
        vel: Vec2::ZERO,
        orient_deg: 0.0,
        physics_radius: 0.0,
        health: 1,
        max_health: 1,
        dead: false,
        garbage: false,
        pushed_by_entities: false,
        pushes_entities: false,
        pushed_by_walls: false,
        hittable_by_bullets: false,
        can_swim: true,
        payload: Payload::Explosion(ExplosionData {
            age: 0.0,
            duration: 0.1 * importance,
            size: 0.1 * importance,
        }),
    }
}

/// Bullet, bolt and missile flight. Water never stops a projectile.
pub fn update_bullet(e: &mut Entity, map: &mut Map, ctx: &mut SimContext, dt: f32) {
    if e.kind == EntityKind::Missile {
        home_toward_player(e, map, dt);
    }
    let prev_pos = e.pos;
    e.pos += e.vel * dt;
    if !map.is_point_solid(e.pos, false) {
        return;
    }
    if e.kind == EntityKind::Missile {
        e.die();
        return;
    }
    // Approximate impact normal from the tile-coordinate difference. A
    // corner-clipping step can produce a diagonal normal; accepted.
    let from = map.tile_of_pos(prev_pos);
    let into = map.tile_of_pos(e.pos);
    let normal = (from - into).as_vec2().normalize_or(-e.forward());
    e.pos = prev_pos;
    e.vel = reflect_velocity(e.vel, normal);
    e.orient_deg = degrees_from_vec2(e.vel);
    e.take_damage(1);
    if !e.dead {
        ctx.audio.play(Sound::BulletBounce);
    }
}

fn home_toward_player(e: &mut Entity, map: &Map, dt: f32) {
    let Some(pid) = map.player else {
        return;
    };
    let Some(player) = map.entities.get(pid) else {
        return;
    };
    if player.dead {
        return;
    }
    let to_player = player.pos - e.pos;
    if to_player.length_squared() < 1e-12 {
        return;
    }
    let homing_rate = 90.0;
    let goal = degrees_from_vec2(to_player);
    e.orient_deg = turn_toward_degrees(e.orient_deg, goal, homing_rate * dt);
    let speed = e.vel.length();
    e.vel = e.forward() * speed;
}

/// Flame spray particle: drifts, spins down, dies in walls or on timeout
pub fn update_flame(e: &mut Entity, map: &mut Map, _ctx: &mut SimContext, dt: f32) {
    let Payload::Flame(data) = &mut e.payload else {
        return;
    };
    data.age += dt;
    let life_left = 1.0 - (data.age / data.duration).min(1.0);
    e.orient_deg += data.spin_rate * life_left * dt;
    let expired = data.age >= data.duration;
    e.pos += e.vel * dt;
    if expired || map.is_point_solid(e.pos, false) {
        e.dead = true;
        e.garbage = true;
    }
}

/// Visual size of a flame, eased from 0.1 up to 0.5 over its lifetime
pub fn flame_visual_size(data: &FlameData) -> f32 {
    let t = (data.age / data.duration).clamp(0.0, 1.0);
    // Ease-out quad
    let eased = 1.0 - (1.0 - t) * (1.0 - t);
    0.1 + 0.4 * eased
}

/// Impact resolution for one overlapping projectile/agent pair. Deaths are
/// recorded for the caller; side effects run after the lists are released.
pub fn resolve_bullet_hit(
    bullet: &mut Entity,
    agent: &mut Entity,
    ctx: &mut SimContext,
    deaths: &mut Vec<(EntityKind, Vec2)>,
) {
    // Aries deflects anything striking its front 45 degree arc
    if agent.kind == EntityKind::Aries {
        let contact_dir = bullet.pos - agent.pos;
        let contact_deg = degrees_from_vec2(contact_dir);
        if shortest_angular_disp_degrees(agent.orient_deg, contact_deg).abs() <= 45.0 {
            if bullet.as_bullet().is_none() {
                log::warn!(
                    "Non-bullet {:?} reached the deflection rule, skipping",
                    bullet.kind
                );
                return;
            }
            let normal = contact_dir.normalize_or(Vec2::X);
            bullet.vel = reflect_velocity(bullet.vel, normal);
            bullet.orient_deg = degrees_from_vec2(bullet.vel);
            push_disc_out_of_fixed_disc(
                &mut bullet.pos,
                bullet.physics_radius,
                agent.pos,
                agent.physics_radius,
            );
            if bullet.take_damage(1) {
                deaths.push((bullet.kind, bullet.pos));
            } else {
                ctx.audio.play(Sound::BulletBounce);
            }
            return;
        }
    }

    let damage = match &bullet.payload {
        Payload::Bullet(b) => b.damage,
        Payload::Flame(_) => 1,
        _ => {
            log::warn!("Non-projectile {:?} in a bullet index list", bullet.kind);
            return;
        }
    };

    let shielded = ctx.cheats.invincible && agent.kind == EntityKind::PlayerTank;
    if !shielded {
        if agent.take_damage(damage) {
            deaths.push((agent.kind, agent.pos));
        } else if agent.kind == EntityKind::PlayerTank {
            ctx.audio.play(Sound::PlayerHit);
        } else {
            ctx.audio.play(Sound::EnemyHit);
        }
    }
    if !bullet.dead {
        bullet.die();
        deaths.push((bullet.kind, bullet.pos));
    }
}
