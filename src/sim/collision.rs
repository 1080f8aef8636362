//! Proximity checks and color-lock hit resolution
//!
//! Everything collides as a point with a radius; there is no broadphase, the
//! entity counts stay small enough for linear scans.

use glam::Vec3;

use super::rune::ColorTag;
use super::state::Enemy;
use crate::consts::{CONTACT_RADIUS, HIT_RADIUS, PROJECTILE_RANGE};

/// Outcome of a bolt reaching an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Colors match: the enemy dies
    Kill,
    /// Colors differ: the bolt is absorbed, the enemy is untouched
    Absorbed,
}

/// Strict proximity test (`distance < radius`)
#[inline]
pub fn within(a: Vec3, b: Vec3, radius: f32) -> bool {
    a.distance_squared(b) < radius * radius
}

/// Enemy close enough to hurt the player
#[inline]
pub fn enemy_touches_player(enemy_pos: Vec3, player_pos: Vec3) -> bool {
    within(enemy_pos, player_pos, CONTACT_RADIUS)
}

/// Bolt has flown too far from the player
#[inline]
pub fn out_of_range(projectile_pos: Vec3, player_pos: Vec3) -> bool {
    projectile_pos.distance_squared(player_pos) > PROJECTILE_RANGE * PROJECTILE_RANGE
}

/// Index of the first live enemy within hit range of a bolt.
///
/// Scans newest enemies first; at most one enemy is ever reported.
pub fn first_enemy_hit(projectile_pos: Vec3, enemies: &[Enemy]) -> Option<usize> {
    enemies
        .iter()
        .enumerate()
        .rev()
        .find(|(_, e)| e.alive && within(projectile_pos, e.pos, HIT_RADIUS))
        .map(|(i, _)| i)
}

/// Color-lock rule
#[inline]
pub fn resolve_hit(shot: ColorTag, enemy: ColorTag) -> HitOutcome {
    if shot == enemy {
        HitOutcome::Kill
    } else {
        HitOutcome::Absorbed
    }
}
