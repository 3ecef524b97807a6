//! Entity factory keyed by kind + faction
//!
//! All tuning comes from the config blackboard with the defaults listed
//! inline, so a bare config still produces a playable arena.

use glam::{IVec2, Vec2};

use super::entity::{
    ChaseData, ChaseTuning, Entity, EntityKind, Faction, Payload, PlayerData, TurretData,
};
use super::projectile;
use crate::GameConfig;

/// Build an entity of the given kind and faction. Projectile kinds route
/// through the property table, which is fatal for unsupported combinations.
pub fn create_entity(
    kind: EntityKind,
    faction: Faction,
    pos: Vec2,
    orient_deg: f32,
    map_dims: IVec2,
    config: &GameConfig,
) -> Entity {
    match kind {
        EntityKind::PlayerTank => make_player(pos, orient_deg, config),
        EntityKind::Leo | EntityKind::Aries | EntityKind::Capricorn => {
            make_chaser(kind, faction, pos, orient_deg, map_dims, config)
        }
        EntityKind::Scorpio => make_scorpio(faction, pos, orient_deg, config),
        EntityKind::Bullet | EntityKind::Bolt | EntityKind::Missile | EntityKind::Flame => {
            projectile::make_projectile(kind, faction, pos, orient_deg, config)
        }
        EntityKind::Explosion => projectile::make_explosion(pos, 1.0),
    }
}

fn make_player(pos: Vec2, orient_deg: f32, config: &GameConfig) -> Entity {
    let health = config.get_i32("player_health", 10);
    Entity {
        kind: EntityKind::PlayerTank,
        faction: Faction::Good,
        pos,
        vel: Vec2::ZERO,
        orient_deg,
        physics_radius: config.get_f32("player_physics_radius", 0.3),
        health,
        max_health: health,
        dead: false,
        garbage: false,
        pushed_by_entities: true,
        pushes_entities: true,
        pushed_by_walls: true,
        hittable_by_bullets: true,
        can_swim: false,
        payload: Payload::Player(PlayerData {
            turret_relative: 0.0,
            cooldown_timer: 0.0,
        }),
    }
}

fn make_chaser(
    kind: EntityKind,
    faction: Faction,
    pos: Vec2,
    orient_deg: f32,
    map_dims: IVec2,
    config: &GameConfig,
) -> Entity {
    let visible_range = config.get_f32("enemy_visible_range", 10.0);
    // Capricorn is amphibious and lobs homing missiles; Aries never shoots
    let (tuning, radius, health, can_swim) = match kind {
        EntityKind::Leo => (
            ChaseTuning {
                drive_speed: config.get_f32("leo_drive_speed", 0.5),
                turn_rate: config.get_f32("leo_turn_rate", 120.0),
                drive_aperture: config.get_f32("leo_drive_aperture", 90.0),
                shoot_aperture: config.get_f32("leo_shoot_aperture", 10.0),
                shoot_cooldown: config.get_f32("leo_shoot_cooldown", 1.0),
                visible_range,
            },
            config.get_f32("leo_physics_radius", 0.25),
            config.get_i32("leo_health", 3),
            false,
        ),
        EntityKind::Aries => (
            ChaseTuning {
                drive_speed: config.get_f32("aries_drive_speed", 0.5),
                turn_rate: config.get_f32("aries_turn_rate", 120.0),
                drive_aperture: config.get_f32("aries_drive_aperture", 90.0),
                shoot_aperture: 0.0,
                shoot_cooldown: 0.0,
                visible_range,
            },
            config.get_f32("aries_physics_radius", 0.3),
            config.get_i32("aries_health", 5),
            false,
        ),
        EntityKind::Capricorn => (
            ChaseTuning {
                drive_speed: config.get_f32("capricorn_drive_speed", 0.5),
                turn_rate: config.get_f32("capricorn_turn_rate", 120.0),
                drive_aperture: config.get_f32("capricorn_drive_aperture", 90.0),
                shoot_aperture: config.get_f32("capricorn_shoot_aperture", 45.0),
                shoot_cooldown: config.get_f32("capricorn_shoot_cooldown", 2.0),
                visible_range,
            },
            config.get_f32("capricorn_physics_radius", 0.25),
            config.get_i32("capricorn_health", 3),
            true,
        ),
        _ => unreachable!("make_chaser only handles chasing kinds"),
    };
    Entity {
        kind,
        faction,
        pos,
        vel: Vec2::ZERO,
        orient_deg,
        physics_radius: radius,
        health,
        max_health: health,
        dead: false,
        garbage: false,
        pushed_by_entities: true,
        pushes_entities: true,
        pushed_by_walls: true,
        hittable_by_bullets: true,
        can_swim,
        payload: Payload::Chase(Box::new(ChaseData::new(map_dims, tuning))),
    }
}

fn make_scorpio(faction: Faction, pos: Vec2, orient_deg: f32, config: &GameConfig) -> Entity {
    let health = config.get_i32("scorpio_health", 5);
    Entity {
        kind: EntityKind::Scorpio,
        faction,
        pos,
        vel: Vec2::ZERO,
        orient_deg,
        physics_radius: config.get_f32("scorpio_physics_radius", 0.4),
        health,
        max_health: health,
        dead: false,
        garbage: false,
        // Stationary: pushes others but is never moved
        pushed_by_entities: false,
        pushes_entities: true,
        pushed_by_walls: false,
        hittable_by_bullets: true,
        can_swim: false,
        payload: Payload::Turret(TurretData {
            turret_orient: orient_deg,
            bolt_timer: 0.0,
            flame_timer: 0.0,
            turn_rate: config.get_f32("scorpio_turn_rate", 30.0),
            half_aperture: config.get_f32("scorpio_half_aperture", 5.0),
            bolt_cooldown: config.get_f32("scorpio_bolt_cooldown", 0.3),
            flame_cooldown: config.get_f32("scorpio_flame_cooldown", 0.06),
            visible_range: config.get_f32("enemy_visible_range", 10.0),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scorpio_flags() {
        let config = GameConfig::new();
        let e = create_entity(
            EntityKind::Scorpio,
            Faction::Evil,
            Vec2::new(3.5, 3.5),
            0.0,
            IVec2::new(8, 8),
            &config,
        );
        assert!(!e.pushed_by_entities);
        assert!(e.pushes_entities);
        assert!(!e.pushed_by_walls);
        assert!(e.hittable_by_bullets);
    }

    #[test]
    fn test_config_overrides_tuning() {
        let mut config = GameConfig::new();
        config.set("leo_drive_speed", serde_json::json!(2.0));
        let e = create_entity(
            EntityKind::Leo,
            Faction::Evil,
            Vec2::ZERO,
            0.0,
            IVec2::new(8, 8),
            &config,
        );
        match &e.payload {
            Payload::Chase(c) => assert!((c.tuning.drive_speed - 2.0).abs() < 1e-6),
            _ => panic!("expected chase payload"),
        }
    }

    #[test]
    fn test_capricorn_is_amphibious() {
        let config = GameConfig::new();
        let e = create_entity(
            EntityKind::Capricorn,
            Faction::Evil,
            Vec2::ZERO,
            0.0,
            IVec2::new(8, 8),
            &config,
        );
        assert!(e.can_swim);
    }
}
