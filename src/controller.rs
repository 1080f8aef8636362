//! Game controller
//!
//! Owns the simulation state and the injected render/audio backends. Each
//! animation frame runs the fixed-timestep accumulator, routes simulation
//! events to the backends, keeps drawables in sync with entities and draws.

use glam::{EulerRot, Quat, Vec3};

use crate::audio::AudioBackend;
use crate::consts::*;
use crate::input::{InputMapper, LockAction};
use crate::renderer::{Camera, DrawableDesc, DrawableHandle, RenderBackend, Shape, Transform};
use crate::settings::Settings;
use crate::sim::{self, GameEvent, GamePhase, GameState};
use crate::ui::HudModel;

/// Weapon rest position in camera space
const WEAPON_OFFSET: Vec3 = Vec3::new(0.4, -0.4, -0.8);
/// How far the weapon kicks back toward the camera when firing
const RECOIL_KICK: f32 = 0.3;

pub struct GameController<R: RenderBackend, A: AudioBackend> {
    state: GameState,
    input: InputMapper,
    renderer: R,
    audio: A,
    settings: Settings,
    accumulator: f32,
    /// Wall-clock time driving cosmetic animation (ms)
    wall_ms: f64,
    recoil_ms: f32,
    flash_ms: f32,
    weapon_offset: Vec3,
    crystal_spin: (f32, f32),
    staff: DrawableHandle,
    crystal: DrawableHandle,
}

impl<R: RenderBackend, A: AudioBackend> GameController<R, A> {
    pub fn new(mut renderer: R, audio: A, settings: Settings, seed: u64) -> Self {
        // The floor never changes, so its handle is not kept
        renderer.create(&DrawableDesc {
            shape: Shape::Floor,
            color: crate::renderer::vertex::colors::FLOOR,
            transform: Transform::default(),
        });
        let weapon = DrawableDesc {
            shape: Shape::Staff,
            color: sim::NEUTRAL_HEX,
            transform: Transform::default(),
        };
        let staff = renderer.create(&weapon);
        let crystal = renderer.create(&DrawableDesc {
            shape: Shape::Crystal,
            ..weapon
        });

        log::info!("Game initialized with seed: {}", seed);
        Self {
            state: GameState::new(seed),
            input: InputMapper::new(settings.mouse_sensitivity),
            renderer,
            audio,
            settings,
            accumulator: 0.0,
            wall_ms: 0.0,
            recoil_ms: 0.0,
            flash_ms: 0.0,
            weapon_offset: WEAPON_OFFSET,
            crystal_spin: (0.0, 0.0),
            staff,
            crystal,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn pointer_locked(&self) -> bool {
        self.input.pointer_locked()
    }

    fn running(&self) -> bool {
        self.state.phase == GamePhase::Running
    }

    // === Input ===

    pub fn key_down(&mut self, key: &str) {
        let running = self.running();
        self.input.key_down(key, running);
    }

    pub fn key_up(&mut self, key: &str) {
        self.input.key_up(key);
    }

    /// Window lost focus
    pub fn blur(&mut self) {
        self.input.release_all();
    }

    pub fn mouse_move(&mut self, dx: f32, dy: f32) {
        let running = self.running();
        self.input.mouse_move(dx, dy, running);
    }

    pub fn mouse_down(&mut self) {
        self.input.mouse_down();
    }

    pub fn pointer_lock_changed(&mut self, locked: bool) {
        match self.input.pointer_lock_changed(locked) {
            LockAction::Start => {
                // Lock implies a user gesture, so audio may start now
                self.audio.init();
                sim::start(&mut self.state);
            }
            LockAction::Pause => {
                sim::pause(&mut self.state);
            }
        }
    }

    // === Lifecycle ===

    /// Clear the arena and play again
    pub fn restart(&mut self) {
        sim::restart(&mut self.state);
        self.input.clear_pending();
        self.accumulator = 0.0;
        self.recoil_ms = 0.0;
        self.flash_ms = 0.0;
        self.process_events();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
    }

    // === Frame ===

    /// Advance by `dt` seconds of wall time and draw one frame
    pub fn frame(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, 0.1);
        self.wall_ms += dt as f64 * 1000.0;

        if self.running() {
            self.accumulator += dt;
            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.take_tick_input();
                sim::tick(&mut self.state, &input);
                self.accumulator -= SIM_DT;
                substeps += 1;
                if !self.running() {
                    break;
                }
            }
        } else {
            self.accumulator = 0.0;
        }

        self.process_events();

        let dt_ms = dt * 1000.0;
        self.recoil_ms = (self.recoil_ms - dt_ms).max(0.0);
        self.flash_ms = (self.flash_ms - dt_ms).max(0.0);

        self.sync_entities();
        self.sync_weapon();

        let camera = self.camera();
        self.renderer.draw(&camera);
    }

    pub fn camera(&self) -> Camera {
        Camera {
            eye: self.state.player.pos,
            orientation: self.state.player.orientation(),
            fov_y: self.settings.fov_degrees.to_radians(),
        }
    }

    pub fn hud(&self) -> HudModel {
        HudModel::from_state(&self.state, self.flash_ms > 0.0)
    }

    /// Route simulation events to the backends
    fn process_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::Sound(cue) => self.audio.play(cue),
                GameEvent::Despawned(handle) => self.renderer.destroy(handle),
                GameEvent::Fired { .. } => self.recoil_ms = RECOIL_MS,
                GameEvent::PlayerDamaged { hp } => {
                    self.flash_ms = DAMAGE_FLASH_MS;
                    log::debug!("Player hit, hp {}", hp);
                }
                GameEvent::EnemyKilled { tag, .. } => {
                    log::debug!("Killed {} enemy", tag.as_str());
                }
                GameEvent::ShotAbsorbed { shot, enemy } => {
                    log::debug!("{} bolt absorbed by {} enemy", shot.as_str(), enemy.as_str());
                }
                GameEvent::GameOver { score } => {
                    log::debug!("Game over event, score {}", score);
                }
            }
        }
    }

    /// Attach drawables to new entities and move existing ones
    fn sync_entities(&mut self) {
        let renderer = &mut self.renderer;

        for e in &mut self.state.enemies {
            let transform = Transform {
                position: e.pos,
                rotation: Quat::from_rotation_y(e.facing),
                scale: 1.0,
            };
            sync_drawable(renderer, &mut e.drawable, Shape::Monster, e.tag.hex(), transform);
        }

        for p in &mut self.state.projectiles {
            let transform = Transform {
                position: p.pos,
                rotation: Quat::from_euler(EulerRot::XYZ, p.spin, p.spin, 0.0),
                scale: 1.0,
            };
            sync_drawable(renderer, &mut p.drawable, Shape::Bolt, p.tag.hex(), transform);
        }

        for p in &mut self.state.particles {
            let transform = Transform {
                position: p.pos,
                rotation: Quat::IDENTITY,
                scale: p.scale,
            };
            sync_drawable(renderer, &mut p.drawable, Shape::Spark, p.tag.hex(), transform);
        }
    }

    /// Keep the weapon in front of the camera: bob, recoil, crystal color
    fn sync_weapon(&mut self) {
        if self.running() && self.input.movement().is_moving() {
            let t = (self.wall_ms * 0.015) as f32;
            self.weapon_offset.y = WEAPON_OFFSET.y + t.sin() * 0.03;
            self.weapon_offset.x = WEAPON_OFFSET.x + (t * 0.5).cos() * 0.02;
        }
        let mut offset = self.weapon_offset;
        if self.recoil_ms > 0.0 {
            offset.z += RECOIL_KICK;
        }

        self.crystal_spin.0 += 0.05;
        self.crystal_spin.1 += 0.02;

        let player = &self.state.player;
        let orientation = player.orientation();
        let position = player.pos + orientation * offset;

        let staff = Transform {
            position,
            rotation: orientation,
            scale: 1.0,
        };
        self.renderer.update(self.staff, &staff, sim::NEUTRAL_HEX);

        let spin = Quat::from_euler(EulerRot::YZX, self.crystal_spin.0, self.crystal_spin.1, 0.0);
        let crystal = Transform {
            position,
            rotation: orientation * spin,
            scale: 1.0,
        };
        let color = player.runes.color().hex;
        self.renderer.update(self.crystal, &crystal, color);
    }
}

fn sync_drawable<R: RenderBackend>(
    renderer: &mut R,
    slot: &mut Option<DrawableHandle>,
    shape: Shape,
    color: u32,
    transform: Transform,
) {
    match slot {
        Some(handle) => renderer.update(*handle, &transform, color),
        None => {
            *slot = Some(renderer.create(&DrawableDesc {
                shape,
                color,
                transform,
            }));
        }
    }
}
