//! Disc and box collision primitives
//!
//! Everything in the arena is a disc; walls are axis-aligned unit boxes.
//! Resolution is minimum-translation push-out, no impulse physics.

use glam::Vec2;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb2 {
    pub mins: Vec2,
    pub maxs: Vec2,
}

impl Aabb2 {
    pub const fn new(mins: Vec2, maxs: Vec2) -> Self {
        Self { mins, maxs }
    }

    /// Closest point inside the box to `point`
    pub fn nearest_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.mins, self.maxs)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.mins.x
            && point.x <= self.maxs.x
            && point.y >= self.mins.y
            && point.y <= self.maxs.y
    }
}

/// Do two discs overlap?
#[inline]
pub fn discs_overlap(center_a: Vec2, radius_a: f32, center_b: Vec2, radius_b: f32) -> bool {
    let radii = radius_a + radius_b;
    center_a.distance_squared(center_b) < radii * radii
}

/// Push two overlapping discs apart symmetrically (half the correction each).
/// Perfectly coincident centers push along +X arbitrarily.
pub fn push_discs_out_of_each_other(
    center_a: &mut Vec2,
    radius_a: f32,
    center_b: &mut Vec2,
    radius_b: f32,
) {
    let radii = radius_a + radius_b;
    let delta = *center_b - *center_a;
    let dist_sq = delta.length_squared();
    if dist_sq >= radii * radii {
        return;
    }
    let dist = dist_sq.sqrt();
    let dir = if dist > 1e-6 { delta / dist } else { Vec2::X };
    let overlap = radii - dist;
    *center_a -= dir * (overlap * 0.5);
    *center_b += dir * (overlap * 0.5);
}

/// Push a mobile disc fully out of a fixed disc
pub fn push_disc_out_of_fixed_disc(
    mobile_center: &mut Vec2,
    mobile_radius: f32,
    fixed_center: Vec2,
    fixed_radius: f32,
) {
    let radii = mobile_radius + fixed_radius;
    let delta = *mobile_center - fixed_center;
    let dist_sq = delta.length_squared();
    if dist_sq >= radii * radii {
        return;
    }
    let dist = dist_sq.sqrt();
    let dir = if dist > 1e-6 { delta / dist } else { Vec2::X };
    *mobile_center = fixed_center + dir * radii;
}

/// Push a disc out of a fixed box along the minimum-translation direction
pub fn push_disc_out_of_fixed_aabb(center: &mut Vec2, radius: f32, aabb: Aabb2) {
    let nearest = aabb.nearest_point(*center);
    let delta = *center - nearest;
    let dist_sq = delta.length_squared();
    if dist_sq >= radius * radius || dist_sq < 1e-12 {
        // Center inside the box is not resolved here; tile push-out only
        // fires for centers outside the solid tile.
        return;
    }
    let dist = dist_sq.sqrt();
    let dir = delta / dist;
    *center = nearest + dir * radius;
}

/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_discs_overlap() {
        assert!(discs_overlap(Vec2::ZERO, 1.0, Vec2::new(1.5, 0.0), 1.0));
        assert!(!discs_overlap(Vec2::ZERO, 1.0, Vec2::new(2.5, 0.0), 1.0));
    }

    #[test]
    fn test_mutual_push_separates() {
        let mut a = Vec2::new(0.0, 0.0);
        let mut b = Vec2::new(0.5, 0.0);
        push_discs_out_of_each_other(&mut a, 0.5, &mut b, 0.5);
        assert!((a.distance(b) - 1.0).abs() < 1e-4);
        // Symmetric: both moved the same amount
        assert!((a.x + 0.25).abs() < 1e-4);
        assert!((b.x - 0.75).abs() < 1e-4);
    }

    #[test]
    fn test_one_sided_push() {
        let mut mobile = Vec2::new(0.4, 0.0);
        let fixed = Vec2::ZERO;
        push_disc_out_of_fixed_disc(&mut mobile, 0.3, fixed, 0.3);
        assert!((mobile.distance(fixed) - 0.6).abs() < 1e-4);
        assert!(mobile.x > 0.0);
    }

    #[test]
    fn test_push_out_of_aabb() {
        let aabb = Aabb2::new(Vec2::ZERO, Vec2::ONE);
        // Disc overlapping the right face from outside
        let mut center = Vec2::new(1.1, 0.5);
        push_disc_out_of_fixed_aabb(&mut center, 0.25, aabb);
        assert!((center.x - 1.25).abs() < 1e-4);
        assert!((center.y - 0.5).abs() < 1e-4);
        // Non-overlapping disc untouched
        let mut center = Vec2::new(2.0, 0.5);
        push_disc_out_of_fixed_aabb(&mut center, 0.25, aabb);
        assert_eq!(center, Vec2::new(2.0, 0.5));
    }

    #[test]
    fn test_reflect_velocity() {
        let v = Vec2::new(3.0, -1.0);
        let reflected = reflect_velocity(v, Vec2::new(0.0, 1.0));
        assert!((reflected.x - 3.0).abs() < 1e-4);
        assert!((reflected.y - 1.0).abs() < 1e-4);
    }

    proptest! {
        /// One resolution pass always leaves mutually-pushing discs at or
        /// beyond the sum of their radii.
        #[test]
        fn prop_mutual_push_never_leaves_overlap(
            ax in -10.0f32..10.0, ay in -10.0f32..10.0,
            bx in -10.0f32..10.0, by in -10.0f32..10.0,
            ra in 0.05f32..2.0, rb in 0.05f32..2.0,
        ) {
            let mut a = Vec2::new(ax, ay);
            let mut b = Vec2::new(bx, by);
            push_discs_out_of_each_other(&mut a, ra, &mut b, rb);
            prop_assert!(a.distance(b) >= (ra + rb) - 1e-3);
        }

        #[test]
        fn prop_one_sided_push_separates(
            mx in -10.0f32..10.0, my in -10.0f32..10.0,
            rm in 0.05f32..2.0, rf in 0.05f32..2.0,
        ) {
            let mut mobile = Vec2::new(mx, my);
            let fixed = Vec2::new(0.5, -0.5);
            push_disc_out_of_fixed_disc(&mut mobile, rm, fixed, rf);
            prop_assert!(mobile.distance(fixed) >= (rm + rf) - 1e-3);
        }
    }
}
