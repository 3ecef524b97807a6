//! Tank Arena - top-down tank combat simulation core
//!
//! Core modules:
//! - `sim`: Simulation (tile grid, pathfinding, raycasts, entities, physics)
//! - `game`: Mode state machine, time distortion, map roster, cheats
//! - `config`: Typed key-value tuning blackboard
//! - `defs`: Tile and map definition registries
//! - `render`: Geometry emission for an abstract render sink
//! - `audio`: Sound events for an abstract audio sink
//! - `input`: Per-step input snapshot

pub mod audio;
pub mod config;
pub mod defs;
pub mod game;
pub mod input;
pub mod render;
pub mod sim;

pub use config::GameConfig;
pub use game::{Game, GameMode};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Wall-clock delta ceiling, guards against physics tunnelling after pauses
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Sentinel distance-field value for unreachable cells
    pub const UNREACHABLE: f32 = 9999.0;

    /// Map generation retry budget (exhaustion is a data error)
    pub const MAP_GEN_MAX_ATTEMPTS: u32 = 100;
    /// Wander-goal rejection sampling budget
    pub const WANDER_PICK_MAX_ATTEMPTS: u32 = 50;

    /// Sampling raycast resolution (samples per world unit)
    pub const RAYCAST_SAMPLES_PER_UNIT: f32 = 100.0;

    /// Time distortion factors
    pub const SLOW_MO_SCALE: f32 = 0.10;
    pub const FAST_MO_SCALE: f32 = 4.0;
    pub const SLOW_AND_FAST_SCALE: f32 = 8.0;
}

/// Shortest signed angular displacement from `from` to `to`, in degrees,
/// result in [-180, 180)
#[inline]
pub fn shortest_angular_disp_degrees(from: f32, to: f32) -> f32 {
    let mut disp = (to - from) % 360.0;
    if disp >= 180.0 {
        disp -= 360.0;
    } else if disp < -180.0 {
        disp += 360.0;
    }
    disp
}

/// Turn `current` toward `goal` by at most `max_delta` degrees
#[inline]
pub fn turn_toward_degrees(current: f32, goal: f32, max_delta: f32) -> f32 {
    let disp = shortest_angular_disp_degrees(current, goal);
    current + disp.clamp(-max_delta, max_delta)
}

/// Unit vector for an orientation given in degrees
#[inline]
pub fn vec2_from_degrees(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}

/// Orientation in degrees of a (non-zero) vector
#[inline]
pub fn degrees_from_vec2(v: Vec2) -> f32 {
    v.y.atan2(v.x).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortest_angular_disp() {
        assert!((shortest_angular_disp_degrees(10.0, 30.0) - 20.0).abs() < 1e-4);
        assert!((shortest_angular_disp_degrees(350.0, 10.0) - 20.0).abs() < 1e-4);
        assert!((shortest_angular_disp_degrees(10.0, 350.0) + 20.0).abs() < 1e-4);
        // Exactly opposite resolves to -180
        assert!((shortest_angular_disp_degrees(0.0, 180.0) + 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_turn_toward_clamps() {
        let turned = turn_toward_degrees(0.0, 90.0, 30.0);
        assert!((turned - 30.0).abs() < 1e-4);
        let turned = turn_toward_degrees(0.0, 20.0, 30.0);
        assert!((turned - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_vec2_degrees_round_trip() {
        for deg in [0.0f32, 45.0, 90.0, 135.0, -90.0] {
            let v = vec2_from_degrees(deg);
            let back = degrees_from_vec2(v);
            assert!(shortest_angular_disp_degrees(deg, back).abs() < 1e-3);
        }
    }
}
