//! Raycasts against the tile grid
//!
//! Two algorithms over an abstract solidity predicate: a fixed-step sampling
//! march (robust fallback) and the primary DDA voxel traversal that advances
//! grid-line crossing by grid-line crossing.

use glam::{IVec2, Vec2};

use crate::consts::RAYCAST_SAMPLES_PER_UNIT;

/// Result of a raycast
#[derive(Debug, Clone, Copy)]
pub struct RaycastResult {
    pub hit: bool,
    /// Impact position (ray end point on a miss)
    pub pos: Vec2,
    /// Forward distance to the impact (max length on a miss)
    pub dist: f32,
    /// Surface normal at the impact
    pub normal: Vec2,
}

impl RaycastResult {
    pub fn miss(start: Vec2, fwd: Vec2, max_len: f32) -> Self {
        Self {
            hit: false,
            pos: start + fwd * max_len,
            dist: max_len,
            normal: Vec2::ZERO,
        }
    }
}

#[inline]
fn tile_of(pos: Vec2) -> IVec2 {
    IVec2::new(pos.x.floor() as i32, pos.y.floor() as i32)
}

/// Fixed-step sampling raycast: marches `RAYCAST_SAMPLES_PER_UNIT` samples
/// per world unit, testing each sample point for solidity.
pub fn sample_raycast(
    start: Vec2,
    fwd: Vec2,
    max_len: f32,
    is_solid: impl Fn(IVec2) -> bool,
) -> RaycastResult {
    let step_len = 1.0 / RAYCAST_SAMPLES_PER_UNIT;
    let num_steps = (max_len * RAYCAST_SAMPLES_PER_UNIT).ceil() as i32;
    for i in 0..=num_steps {
        let dist = (i as f32 * step_len).min(max_len);
        let pos = start + fwd * dist;
        if is_solid(tile_of(pos)) {
            return RaycastResult {
                hit: true,
                pos,
                dist,
                normal: -fwd,
            };
        }
    }
    RaycastResult::miss(start, fwd, max_len)
}

/// DDA voxel raycast: tracks the forward distance to the next vertical and
/// horizontal grid-line crossing, always advances the sooner axis, and tests
/// the newly entered cell. A start point already inside a solid cell is an
/// immediate impact with the normal pointing back along the ray.
pub fn voxel_raycast(
    start: Vec2,
    fwd: Vec2,
    max_len: f32,
    is_solid: impl Fn(IVec2) -> bool,
) -> RaycastResult {
    let mut tile = tile_of(start);
    if is_solid(tile) {
        return RaycastResult {
            hit: true,
            pos: start,
            dist: 0.0,
            normal: -fwd,
        };
    }

    let (step_x, fwd_dist_per_x, mut fwd_dist_at_next_x) = if fwd.x != 0.0 {
        let step = if fwd.x > 0.0 { 1 } else { -1 };
        let per = 1.0 / fwd.x.abs();
        let leading_edge_x = (tile.x + (step + 1) / 2) as f32;
        (step, per, (leading_edge_x - start.x) / fwd.x)
    } else {
        (0, f32::INFINITY, f32::INFINITY)
    };
    let (step_y, fwd_dist_per_y, mut fwd_dist_at_next_y) = if fwd.y != 0.0 {
        let step = if fwd.y > 0.0 { 1 } else { -1 };
        let per = 1.0 / fwd.y.abs();
        let leading_edge_y = (tile.y + (step + 1) / 2) as f32;
        (step, per, (leading_edge_y - start.y) / fwd.y)
    } else {
        (0, f32::INFINITY, f32::INFINITY)
    };

    loop {
        if fwd_dist_at_next_x <= fwd_dist_at_next_y {
            if fwd_dist_at_next_x > max_len {
                return RaycastResult::miss(start, fwd, max_len);
            }
            tile.x += step_x;
            if is_solid(tile) {
                return RaycastResult {
                    hit: true,
                    pos: start + fwd * fwd_dist_at_next_x,
                    dist: fwd_dist_at_next_x,
                    normal: Vec2::new(-step_x as f32, 0.0),
                };
            }
            fwd_dist_at_next_x += fwd_dist_per_x;
        } else {
            if fwd_dist_at_next_y > max_len {
                return RaycastResult::miss(start, fwd, max_len);
            }
            tile.y += step_y;
            if is_solid(tile) {
                return RaycastResult {
                    hit: true,
                    pos: start + fwd * fwd_dist_at_next_y,
                    dist: fwd_dist_at_next_y,
                    normal: Vec2::new(0.0, -step_y as f32),
                };
            }
            fwd_dist_at_next_y += fwd_dist_per_y;
        }
    }
}
