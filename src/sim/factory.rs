//! Entity construction
//!
//! Builds gameplay records and appends them to the state. Drawables are
//! attached later by the controller, so every record starts without one.

use glam::Vec3;
use rand::Rng;

use super::rune::ColorTag;
use super::state::{Enemy, GameState, Particle, Projectile};
use crate::consts::*;
use crate::yaw_towards;

/// Spawn a random-colored enemy on the ring around the player
pub fn spawn_enemy(state: &mut GameState) -> u32 {
    let tag = ColorTag::ALL[state.rng.random_range(0..ColorTag::ALL.len())];
    let angle = state.rng.random_range(0.0..std::f32::consts::TAU);
    let dist = state.rng.random_range(SPAWN_RING_MIN..SPAWN_RING_MAX);

    let center = state.player.pos;
    let pos = Vec3::new(
        center.x + angle.cos() * dist,
        ENEMY_BASE_HEIGHT,
        center.z + angle.sin() * dist,
    );
    spawn_enemy_at(state, tag, pos)
}

/// Spawn an enemy of a given color at a fixed position
pub fn spawn_enemy_at(state: &mut GameState, tag: ColorTag, pos: Vec3) -> u32 {
    let id = state.next_entity_id();
    let phase = state.rng.random_range(0.0..ENEMY_PHASE_RANGE);
    let facing = yaw_towards(pos, state.player.pos);
    state.enemies.push(Enemy {
        id,
        tag,
        pos,
        facing,
        phase,
        alive: true,
        drawable: None,
    });
    log::debug!("Spawned {} enemy #{} at {:?}", tag.as_str(), id, pos);
    id
}

/// Launch a bolt from `origin` along `dir`
pub fn spawn_projectile(state: &mut GameState, tag: ColorTag, origin: Vec3, dir: Vec3) -> u32 {
    let id = state.next_entity_id();
    state.projectiles.push(Projectile {
        id,
        tag,
        pos: origin,
        vel: dir.normalize_or_zero() * PROJECTILE_SPEED,
        spin: 0.0,
        alive: true,
        drawable: None,
    });
    id
}

/// Burst of sparks where an enemy died
pub fn spawn_explosion(state: &mut GameState, pos: Vec3, tag: ColorTag) {
    for _ in 0..PARTICLE_BURST {
        let jitter = Vec3::new(
            state.rng.random_range(-0.15..0.15),
            state.rng.random_range(-0.15..0.15),
            0.0,
        );
        // Slight upward bias
        let dir = Vec3::new(
            state.rng.random_range(-0.5..0.5),
            state.rng.random_range(0.0..1.0),
            state.rng.random_range(-0.5..0.5),
        )
        .normalize_or_zero();
        let speed: f32 = state.rng.random_range(0.2..0.3);
        let life = state.rng.random_range(PARTICLE_LIFE_MIN..=PARTICLE_LIFE_MAX);

        let id = state.next_entity_id();
        state.particles.push(Particle {
            id,
            tag,
            pos: pos + jitter,
            vel: dir * speed,
            life,
            scale: 1.0,
            alive: true,
            drawable: None,
        });
    }
}
