//! Input mapping
//!
//! Turns raw browser events (key names, pointer deltas, clicks, lock changes)
//! into per-tick [`TickInput`] commands. Held keys are level-triggered; rune
//! toggles, fire and look deltas are one-shots consumed by the next tick.

use std::collections::HashSet;

use glam::Vec2;

use crate::sim::{MoveIntent, Rune, TickInput};

/// Lifecycle request produced by a pointer lock change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockAction {
    /// Lock acquired: begin or resume play
    Start,
    /// Lock released: pause play
    Pause,
}

#[derive(Debug, Clone)]
pub struct InputMapper {
    /// Held keys by lowercase name
    held: HashSet<String>,
    pointer_locked: bool,
    /// Radians per pixel
    sensitivity: f32,
    pending_look: Vec2,
    pending_fire: bool,
    pending_runes: Vec<Rune>,
}

impl InputMapper {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            held: HashSet::new(),
            pointer_locked: false,
            sensitivity,
            pending_look: Vec2::ZERO,
            pending_fire: false,
            pending_runes: Vec::new(),
        }
    }

    pub fn pointer_locked(&self) -> bool {
        self.pointer_locked
    }

    /// Key pressed. Rune keys toggle only while running, and only on the
    /// initial press (auto-repeat is ignored).
    pub fn key_down(&mut self, key: &str, running: bool) {
        let key = key.to_lowercase();
        let fresh = !self.held.contains(&key);
        if running && fresh {
            if let Some(rune) = Rune::from_key(&key) {
                self.pending_runes.push(rune);
            }
        }
        self.held.insert(key);
    }

    pub fn key_up(&mut self, key: &str) {
        self.held.remove(&key.to_lowercase());
    }

    /// Forget every held key (window lost focus)
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// Raw pointer movement in pixels; ignored unless running
    pub fn mouse_move(&mut self, dx: f32, dy: f32, running: bool) {
        if running {
            self.pending_look += Vec2::new(dx, dy) * self.sensitivity;
        }
    }

    /// Primary button; fires only while the pointer is locked
    pub fn mouse_down(&mut self) {
        if self.pointer_locked {
            self.pending_fire = true;
        }
    }

    pub fn pointer_lock_changed(&mut self, locked: bool) -> LockAction {
        self.pointer_locked = locked;
        if locked {
            LockAction::Start
        } else {
            self.clear_pending();
            LockAction::Pause
        }
    }

    /// Current movement intent from held keys
    pub fn movement(&self) -> MoveIntent {
        let down = |a: &str, b: &str| self.held.contains(a) || self.held.contains(b);
        MoveIntent {
            forward: down("w", "arrowup"),
            back: down("s", "arrowdown"),
            left: down("a", "arrowleft"),
            right: down("d", "arrowright"),
        }
    }

    /// Build the input for the next tick, consuming one-shot commands
    pub fn take_tick_input(&mut self) -> TickInput {
        TickInput {
            movement: self.movement(),
            look: std::mem::take(&mut self.pending_look),
            fire: std::mem::take(&mut self.pending_fire),
            rune_toggles: std::mem::take(&mut self.pending_runes),
        }
    }

    /// Drop queued one-shots (held keys are kept)
    pub fn clear_pending(&mut self) {
        self.pending_look = Vec2::ZERO;
        self.pending_fire = false;
        self.pending_runes.clear();
    }
}

impl Default for InputMapper {
    fn default() -> Self {
        Self::new(crate::consts::MOUSE_SENSITIVITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_keys() {
        let mut input = InputMapper::default();
        input.key_down("W", true);
        input.key_down("ArrowRight", true);
        let m = input.movement();
        assert!(m.forward && m.right);
        assert!(!m.back && !m.left);

        input.key_up("w");
        assert!(!input.movement().forward);
        assert!(input.movement().right);
    }

    #[test]
    fn test_held_keys_survive_ticks() {
        let mut input = InputMapper::default();
        input.key_down("s", true);
        assert!(input.take_tick_input().movement.back);
        assert!(input.take_tick_input().movement.back);
    }

    #[test]
    fn test_runes_only_toggle_while_running() {
        let mut input = InputMapper::default();
        input.key_down("q", false);
        input.key_up("q");
        assert!(input.take_tick_input().rune_toggles.is_empty());

        input.key_down("q", true);
        input.key_down("q", true); // auto-repeat
        input.key_up("q");
        input.key_down("r", true);
        assert_eq!(input.take_tick_input().rune_toggles, vec![Rune::Q, Rune::R]);
        assert!(input.take_tick_input().rune_toggles.is_empty());
    }

    #[test]
    fn test_fire_requires_pointer_lock() {
        let mut input = InputMapper::default();
        input.mouse_down();
        assert!(!input.take_tick_input().fire);

        assert_eq!(input.pointer_lock_changed(true), LockAction::Start);
        input.mouse_down();
        assert!(input.take_tick_input().fire);
        assert!(!input.take_tick_input().fire, "fire is a one-shot");
    }

    #[test]
    fn test_lock_release_pauses_and_drops_pending() {
        let mut input = InputMapper::default();
        input.pointer_lock_changed(true);
        input.mouse_down();
        input.mouse_move(10.0, 0.0, true);

        assert_eq!(input.pointer_lock_changed(false), LockAction::Pause);
        let tick = input.take_tick_input();
        assert!(!tick.fire);
        assert_eq!(tick.look, Vec2::ZERO);
    }

    #[test]
    fn test_look_scaled_and_gated() {
        let mut input = InputMapper::new(0.002);
        input.mouse_move(100.0, -50.0, false);
        assert_eq!(input.take_tick_input().look, Vec2::ZERO);

        input.mouse_move(100.0, -50.0, true);
        input.mouse_move(50.0, 0.0, true);
        let look = input.take_tick_input().look;
        assert!((look.x - 0.3).abs() < 1e-6);
        assert!((look.y + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_release_all() {
        let mut input = InputMapper::default();
        input.key_down("a", true);
        input.key_down("d", true);
        input.release_all();
        assert!(!input.movement().is_moving());
    }
}
