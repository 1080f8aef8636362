//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod factory;
pub mod rune;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{HitOutcome, first_enemy_hit, resolve_hit};
pub use rune::{ColorTag, NEUTRAL_HEX, Rune, RuneColor, Runes, resolve_color};
pub use spawn::SpawnScheduler;
pub use state::{
    DrawableHandle, Enemy, GameEvent, GamePhase, GameState, MoveIntent, Particle, Player,
    Projectile, SoundCue,
};
pub use tick::{TickInput, fire, pause, restart, start, tick};
