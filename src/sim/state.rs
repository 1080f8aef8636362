//! Game state and core simulation types
//!
//! Entity records are plain data. The drawable each one owns on the render
//! side is held as an opaque [`DrawableHandle`] and never dereferenced here.

use glam::{EulerRot, Quat, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::rune::{ColorTag, Runes};
use super::spawn::SpawnScheduler;
use crate::consts::*;

slotmap::new_key_type! {
    /// Opaque reference to a render-side drawable. Generational, so a stale
    /// handle never aliases a newer drawable.
    pub struct DrawableHandle;
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Waiting for the first pointer lock
    Idle,
    /// Active gameplay
    Running,
    /// Pointer lock lost, resumable
    Paused,
    /// Player died; only a restart leaves this phase
    GameOver,
}

/// One-shot sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Player fired a bolt
    Fire,
    /// Bolt destroyed a matching enemy
    EnemyHit,
    /// Enemy reached the player
    PlayerDamage,
}

/// Events emitted by the simulation, drained by the controller each frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Sound(SoundCue),
    /// An entity was removed; its drawable must be released
    Despawned(DrawableHandle),
    Fired { tag: ColorTag },
    EnemyKilled { tag: ColorTag, pos: Vec3 },
    /// Bolt hit an enemy of another color and was absorbed
    ShotAbsorbed { shot: ColorTag, enemy: ColorTag },
    PlayerDamaged { hp: i32 },
    GameOver { score: u64 },
}

/// The player (camera owner)
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec3,
    /// Rotation around +Y (radians, 0 looks down -Z)
    pub yaw: f32,
    /// Rotation around camera X (radians, clamped to ±PITCH_LIMIT)
    pub pitch: f32,
    pub hp: i32,
    pub score: u64,
    pub runes: Runes,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Self::start_pos(),
            yaw: 0.0,
            pitch: 0.0,
            hp: PLAYER_MAX_HP,
            score: 0,
            runes: Runes::default(),
        }
    }
}

impl Player {
    pub fn start_pos() -> Vec3 {
        Vec3::new(0.0, PLAYER_EYE_HEIGHT, 0.0)
    }

    /// Restore spawn position, orientation and stats (keeps rune flags)
    pub fn reset(&mut self) {
        self.pos = Self::start_pos();
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.hp = PLAYER_MAX_HP;
        self.score = 0;
    }

    /// Camera orientation (yaw then pitch)
    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// View direction including pitch
    pub fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.orientation() * Vec3::X
    }

    /// Apply a look delta in radians (already scaled by sensitivity)
    pub fn look(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw -= yaw_delta;
        self.pitch = (self.pitch - pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Walk on the ground plane, relative to where the camera faces
    pub fn walk(&mut self, intent: MoveIntent) {
        let fwd = flatten(self.forward());
        let rgt = flatten(self.right());

        let mut dir = Vec3::ZERO;
        if intent.forward {
            dir += fwd;
        }
        if intent.back {
            dir -= fwd;
        }
        if intent.right {
            dir += rgt;
        }
        if intent.left {
            dir -= rgt;
        }

        self.pos += dir.normalize_or_zero() * PLAYER_SPEED;
        self.pos.x = self.pos.x.clamp(-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT);
        self.pos.z = self.pos.z.clamp(-ARENA_HALF_EXTENT, ARENA_HALF_EXTENT);
    }

    /// Subtract hp; returns true only on the hit that takes hp to zero or below
    pub fn take_damage(&mut self, amount: i32) -> bool {
        let was_alive = self.hp > 0;
        self.hp -= amount;
        was_alive && self.hp <= 0
    }

    pub fn add_score(&mut self, amount: u64) {
        self.score += amount;
    }

    /// Hp as shown in the HUD (never negative)
    pub fn display_hp(&self) -> i32 {
        self.hp.max(0)
    }
}

fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z).normalize_or_zero()
}

/// Held movement keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveIntent {
    pub fn is_moving(&self) -> bool {
        self.forward || self.back || self.left || self.right
    }
}

/// A monster closing in on the player
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub tag: ColorTag,
    pub pos: Vec3,
    /// Horizontal facing (radians), kept pointed at the player
    pub facing: f32,
    /// Bob phase offset so enemies don't float in sync
    pub phase: f32,
    pub alive: bool,
    pub drawable: Option<DrawableHandle>,
}

/// A colored bolt
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u32,
    pub tag: ColorTag,
    pub pos: Vec3,
    pub vel: Vec3,
    /// Cosmetic tumble angle
    pub spin: f32,
    pub alive: bool,
    pub drawable: Option<DrawableHandle>,
}

/// Explosion spark (not gameplay-affecting)
#[derive(Debug, Clone)]
pub struct Particle {
    pub id: u32,
    pub tag: ColorTag,
    pub pos: Vec3,
    pub vel: Vec3,
    /// Remaining ticks
    pub life: u32,
    pub scale: f32,
    pub alive: bool,
    pub drawable: Option<DrawableHandle>,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed for reproducibility
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub phase: GamePhase,
    /// Simulation clock (milliseconds of Running time)
    pub time_ms: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub particles: Vec<Particle>,
    pub spawner: SpawnScheduler,
    /// Pending events (drained by the controller)
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Idle,
            time_ms: 0.0,
            time_ticks: 0,
            player: Player::default(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            spawner: SpawnScheduler::default(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Remove tombstoned entities, queueing release of their drawables
    pub fn compact(&mut self) {
        let events = &mut self.events;
        self.enemies.retain(|e| keep_or_release(e.alive, e.drawable, events));
        self.projectiles
            .retain(|p| keep_or_release(p.alive, p.drawable, events));
        self.particles
            .retain(|p| keep_or_release(p.alive, p.drawable, events));
    }

    /// Remove every entity regardless of state
    pub fn clear_entities(&mut self) {
        for e in &mut self.enemies {
            e.alive = false;
        }
        for p in &mut self.projectiles {
            p.alive = false;
        }
        for p in &mut self.particles {
            p.alive = false;
        }
        self.compact();
    }

    pub fn entity_count(&self) -> usize {
        self.enemies.len() + self.projectiles.len() + self.particles.len()
    }
}

fn keep_or_release(
    alive: bool,
    drawable: Option<DrawableHandle>,
    events: &mut Vec<GameEvent>,
) -> bool {
    if !alive {
        if let Some(handle) = drawable {
            events.push(GameEvent::Despawned(handle));
        }
    }
    alive
}
