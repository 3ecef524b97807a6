//! Per-step input snapshot
//!
//! The platform layer fills one of these per frame; the simulation polls it
//! once per step. Continuous state is "held right now", one-shot state is
//! "pressed since the previous step" and must be cleared by the owner after
//! each step.

use glam::Vec2;

/// Input state polled once per simulation step
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Player hull move intention, component range [-1, 1]
    pub move_axis: Vec2,
    /// Player turret aim intention, component range [-1, 1]
    pub aim_axis: Vec2,
    /// Fire control held
    pub shoot_held: bool,

    /// Held modifiers
    pub slow_mo_held: bool,
    pub fast_mo_held: bool,

    // === One-shot controls (cleared after each step) ===
    pub start_pressed: bool,
    pub pause_pressed: bool,
    pub respawn_pressed: bool,
    pub step_once_pressed: bool,
    pub hard_reset_pressed: bool,

    // === Debug cheats ===
    pub toggle_debug_draw: bool,
    pub toggle_invincible: bool,
    pub toggle_no_clip: bool,
    pub toggle_map_view: bool,
    pub cycle_heat_debug: bool,
    pub next_map_pressed: bool,
}

impl InputState {
    /// Clear one-shot controls after a step has consumed them
    pub fn clear_one_shots(&mut self) {
        self.start_pressed = false;
        self.pause_pressed = false;
        self.respawn_pressed = false;
        self.step_once_pressed = false;
        self.hard_reset_pressed = false;
        self.toggle_debug_draw = false;
        self.toggle_invincible = false;
        self.toggle_no_clip = false;
        self.toggle_map_view = false;
        self.cycle_heat_debug = false;
        self.next_map_pressed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_one_shots_keeps_held_state() {
        let mut input = InputState {
            move_axis: Vec2::new(1.0, 0.0),
            shoot_held: true,
            pause_pressed: true,
            toggle_no_clip: true,
            ..Default::default()
        };
        input.clear_one_shots();
        assert_eq!(input.move_axis, Vec2::new(1.0, 0.0));
        assert!(input.shoot_held);
        assert!(!input.pause_pressed);
        assert!(!input.toggle_no_clip);
    }
}
