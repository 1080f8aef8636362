//! Rune Strike - A first-person color-lock arena shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player, enemies, projectiles, combat)
//! - `input`: Keyboard/mouse/pointer-lock mapping into tick input
//! - `controller`: Fixed-timestep loop wiring the sim to render and audio
//! - `renderer`: Render backends (headless recorder, WebGPU scene)
//! - `audio`: Procedural sound cues and background music
//! - `ui`: HUD model derived from game state
//! - `settings`: Runtime preferences

pub mod audio;
pub mod controller;
pub mod input;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod ui;

pub use controller::GameController;
pub use settings::Settings;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick, 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Simulation time covered by one tick, in milliseconds
    pub const TICK_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Player defaults
    pub const PLAYER_MAX_HP: i32 = 100;
    pub const PLAYER_EYE_HEIGHT: f32 = 1.7;
    /// Walk speed (units/tick)
    pub const PLAYER_SPEED: f32 = 0.15;
    /// Arena half extent on x and z
    pub const ARENA_HALF_EXTENT: f32 = 95.0;
    /// Pitch clamp (radians) so the camera never flips over
    pub const PITCH_LIMIT: f32 = 1.5;
    /// Radians of look per pixel of mouse movement
    pub const MOUSE_SENSITIVITY: f32 = 0.002;

    /// Enemy movement and bobbing
    pub const ENEMY_SPEED: f32 = 0.04;
    pub const ENEMY_BASE_HEIGHT: f32 = 1.0;
    pub const ENEMY_BOB_AMPLITUDE: f32 = 0.2;
    pub const ENEMY_BOB_RATE: f64 = 0.003;
    /// Bob phase offsets are drawn from [0, ENEMY_PHASE_RANGE)
    pub const ENEMY_PHASE_RANGE: f32 = 100.0;

    /// Enemy touching the player
    pub const CONTACT_RADIUS: f32 = 1.0;
    pub const CONTACT_DAMAGE: i32 = 15;

    /// Projectiles
    pub const PROJECTILE_SPEED: f32 = 0.6;
    pub const PROJECTILE_RANGE: f32 = 60.0;
    pub const PROJECTILE_SPIN: f32 = 0.1;
    pub const HIT_RADIUS: f32 = 1.2;
    pub const KILL_SCORE: u64 = 100;
    /// Muzzle offset from the eye: along camera right, and downward
    pub const MUZZLE_RIGHT: f32 = 0.4;
    pub const MUZZLE_DROP: f32 = 0.3;

    /// Spawn pacing (milliseconds of simulation time)
    pub const SPAWN_INTERVAL_START_MS: f64 = 3000.0;
    pub const SPAWN_INTERVAL_MIN_MS: f64 = 800.0;
    pub const SPAWN_INTERVAL_STEP_MS: f64 = 15.0;
    pub const SPAWN_RING_MIN: f32 = 30.0;
    pub const SPAWN_RING_MAX: f32 = 40.0;

    /// Explosion particles
    pub const PARTICLE_BURST: usize = 12;
    pub const PARTICLE_LIFE_MIN: u32 = 30;
    pub const PARTICLE_LIFE_MAX: u32 = 40;
    pub const PARTICLE_SHRINK: f32 = 0.9;

    /// Transient cosmetic effects
    pub const RECOIL_MS: f32 = 80.0;
    pub const DAMAGE_FLASH_MS: f32 = 100.0;
}

/// Distance between two points projected onto the ground plane
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

/// Yaw (radians around +Y) that makes an object at `from` face `to`.
///
/// Zero yaw faces -Z, matching the camera convention.
#[inline]
pub fn yaw_towards(from: Vec3, to: Vec3) -> f32 {
    let d = to - from;
    (-d.x).atan2(-d.z)
}

/// Convert a 0xRRGGBB color to linear-ish float RGB
#[inline]
pub fn hex_to_rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaw_towards_faces_negative_z_at_zero() {
        let yaw = yaw_towards(Vec3::ZERO, Vec3::new(0.0, 0.0, -5.0));
        assert!(yaw.abs() < 1e-6);

        // Target on +X requires turning right (negative yaw in a right-handed frame)
        let yaw = yaw_towards(Vec3::ZERO, Vec3::new(5.0, 0.0, 0.0));
        assert!((yaw + std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_horizontal_distance_ignores_height() {
        let a = Vec3::new(0.0, 10.0, 0.0);
        let b = Vec3::new(3.0, -2.0, 4.0);
        assert!((horizontal_distance(a, b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb(0xFF0000), [1.0, 0.0, 0.0]);
        assert_eq!(hex_to_rgb(0x00FF00), [0.0, 1.0, 0.0]);
    }
}
