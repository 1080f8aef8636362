//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically, plus the
//! lifecycle transitions (start, pause, game over, restart).

use glam::{Vec2, Vec3};

use super::collision::{HitOutcome, enemy_touches_player, first_enemy_hit, out_of_range, resolve_hit};
use super::factory;
use super::rune::Rune;
use super::state::{GameEvent, GamePhase, GameState, MoveIntent, SoundCue};
use crate::consts::*;
use crate::yaw_towards;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held movement keys
    pub movement: MoveIntent,
    /// Look delta in radians (x = yaw, y = pitch), already scaled
    pub look: Vec2,
    /// Fire a bolt this tick
    pub fire: bool,
    /// Runes toggled since the last tick
    pub rune_toggles: Vec<Rune>,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    if state.phase != GamePhase::Running {
        return;
    }

    state.time_ticks += 1;
    state.time_ms += TICK_MS;

    for &rune in &input.rune_toggles {
        state.player.runes.toggle(rune);
    }
    state.player.look(input.look.x, input.look.y);
    state.player.walk(input.movement);

    if input.fire {
        fire(state);
    }

    if state.spawner.advance(TICK_MS) {
        factory::spawn_enemy(state);
    }

    if update_enemies(state) {
        // World is being torn down: release what died, skip the rest
        state.compact();
        game_over(state);
        return;
    }

    update_projectiles(state);
    update_particles(state);
    state.compact();
}

/// Fire a bolt in the current rune color.
///
/// Returns false when rejected (not running, or no valid rune combination).
pub fn fire(state: &mut GameState) -> bool {
    if state.phase != GamePhase::Running {
        return false;
    }
    let Some(tag) = state.player.runes.color().tag else {
        return false;
    };

    let player = &state.player;
    let origin = player.pos + player.right() * MUZZLE_RIGHT - Vec3::Y * MUZZLE_DROP;
    let dir = player.forward();

    factory::spawn_projectile(state, tag, origin, dir);
    state.push_event(GameEvent::Sound(SoundCue::Fire));
    state.push_event(GameEvent::Fired { tag });
    true
}

/// Move enemies toward the player and resolve contact damage.
///
/// Returns true if the player died, in which case processing stopped early.
fn update_enemies(state: &mut GameState) -> bool {
    let player_pos = state.player.pos;
    let bob_t = state.time_ms * ENEMY_BOB_RATE;

    for i in 0..state.enemies.len() {
        let touched = {
            let enemy = &mut state.enemies[i];
            if !enemy.alive {
                continue;
            }
            enemy.facing = yaw_towards(enemy.pos, player_pos);
            let dir = (player_pos - enemy.pos).normalize_or_zero();
            enemy.pos += dir * ENEMY_SPEED;
            enemy.pos.y =
                ENEMY_BASE_HEIGHT + (bob_t + enemy.phase as f64).sin() as f32 * ENEMY_BOB_AMPLITUDE;

            let touched = enemy_touches_player(enemy.pos, player_pos);
            if touched {
                // Contact always consumes the enemy
                enemy.alive = false;
            }
            touched
        };

        if touched {
            let died = state.player.take_damage(CONTACT_DAMAGE);
            state.push_event(GameEvent::Sound(SoundCue::PlayerDamage));
            state.push_event(GameEvent::PlayerDamaged {
                hp: state.player.hp,
            });
            if died {
                return true;
            }
        }
    }
    false
}

/// Move bolts, resolve hits against enemies, expire bolts out of range
fn update_projectiles(state: &mut GameState) {
    for i in 0..state.projectiles.len() {
        let (pos, shot) = {
            let p = &mut state.projectiles[i];
            if !p.alive {
                continue;
            }
            p.pos += p.vel;
            p.spin += PROJECTILE_SPIN;
            (p.pos, p.tag)
        };

        let mut consumed = false;
        if let Some(j) = first_enemy_hit(pos, &state.enemies) {
            consumed = true;
            let (enemy_tag, enemy_pos) = (state.enemies[j].tag, state.enemies[j].pos);
            match resolve_hit(shot, enemy_tag) {
                HitOutcome::Kill => {
                    state.enemies[j].alive = false;
                    factory::spawn_explosion(state, enemy_pos, enemy_tag);
                    state.player.add_score(KILL_SCORE);
                    state.push_event(GameEvent::Sound(SoundCue::EnemyHit));
                    state.push_event(GameEvent::EnemyKilled {
                        tag: enemy_tag,
                        pos: enemy_pos,
                    });
                }
                HitOutcome::Absorbed => {
                    state.push_event(GameEvent::ShotAbsorbed {
                        shot,
                        enemy: enemy_tag,
                    });
                }
            }
        }

        if consumed || out_of_range(pos, state.player.pos) {
            state.projectiles[i].alive = false;
        }
    }
}

fn update_particles(state: &mut GameState) {
    for p in state.particles.iter_mut().filter(|p| p.alive) {
        p.pos += p.vel;
        p.scale *= PARTICLE_SHRINK;
        p.life = p.life.saturating_sub(1);
        if p.life == 0 {
            p.alive = false;
        }
    }
}

/// Enter Running from Idle or Paused. Ignored after game over.
pub fn start(state: &mut GameState) -> bool {
    match state.phase {
        GamePhase::Idle | GamePhase::Paused => {
            state.phase = GamePhase::Running;
            log::info!("Game running");
            true
        }
        GamePhase::Running | GamePhase::GameOver => false,
    }
}

/// Pause a running game. Any other phase is left alone.
pub fn pause(state: &mut GameState) -> bool {
    if state.phase == GamePhase::Running {
        state.phase = GamePhase::Paused;
        log::info!("Game paused");
        true
    } else {
        false
    }
}

fn game_over(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    log::info!("Game over - final score {}", state.player.score);
    state.push_event(GameEvent::GameOver {
        score: state.player.score,
    });
}

/// Clear the world, reset the player and pacing, and resume play
pub fn restart(state: &mut GameState) {
    state.clear_entities();
    state.player.reset();
    state.spawner.reset();
    state.phase = GamePhase::Running;
    log::info!("Game restarted");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rune::{ColorTag, Runes};
    use crate::sim::state::{DrawableHandle, Player};
    use proptest::prelude::*;

    /// Running state with random spawns disabled
    fn running_state() -> GameState {
        let mut state = GameState::new(12345);
        state.spawner.interval_ms = f64::INFINITY;
        assert!(start(&mut state));
        state
    }

    fn fire_input() -> TickInput {
        TickInput {
            fire: true,
            ..Default::default()
        }
    }

    /// Enemy straight ahead in the bolt's path
    fn enemy_ahead(state: &mut GameState, tag: ColorTag) -> u32 {
        factory::spawn_enemy_at(state, tag, Vec3::new(MUZZLE_RIGHT, 1.0, -5.0))
    }

    /// Tick until the predicate holds (bounded)
    fn tick_until(state: &mut GameState, pred: impl Fn(&GameState) -> bool) {
        for _ in 0..60 {
            if pred(state) {
                return;
            }
            tick(state, &TickInput::default());
        }
        assert!(pred(state), "condition not reached");
    }

    fn count_game_overs(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count()
    }

    #[test]
    fn test_idle_until_started() {
        let mut state = GameState::new(1);
        assert_eq!(state.phase, GamePhase::Idle);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, 0);

        assert!(start(&mut state));
        tick(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut state = running_state();
        assert!(pause(&mut state));
        assert_eq!(state.phase, GamePhase::Paused);

        let before = state.time_ticks;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, before);

        assert!(start(&mut state));
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_fire_matching_color_kills() {
        let mut state = running_state();
        state.player.runes = Runes::new(true, false, false);
        enemy_ahead(&mut state, ColorTag::Red);

        tick(&mut state, &fire_input());
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].tag, ColorTag::Red);
        assert!(state.events.contains(&GameEvent::Sound(SoundCue::Fire)));

        tick_until(&mut state, |s| s.enemies.is_empty());
        assert!(state.projectiles.is_empty());
        assert_eq!(state.player.score, KILL_SCORE);
        assert!(!state.particles.is_empty());
        assert!(state.events.contains(&GameEvent::Sound(SoundCue::EnemyHit)));
    }

    #[test]
    fn test_mismatched_color_absorbs_shot() {
        let mut state = running_state();
        state.player.runes = Runes::new(true, false, false);
        enemy_ahead(&mut state, ColorTag::Yellow);

        tick(&mut state, &fire_input());
        tick_until(&mut state, |s| s.projectiles.is_empty());

        assert_eq!(state.enemies.len(), 1);
        assert!(state.enemies[0].alive);
        assert_eq!(state.player.score, 0);
        assert!(state.particles.is_empty());
        assert!(state.events.contains(&GameEvent::ShotAbsorbed {
            shot: ColorTag::Red,
            enemy: ColorTag::Yellow,
        }));
    }

    #[test]
    fn test_score_is_exact_after_many_hits() {
        let mut state = running_state();
        state.player.runes = Runes::new(false, true, true);

        let hits = 7;
        for _ in 0..hits {
            enemy_ahead(&mut state, ColorTag::Green);
            tick(&mut state, &fire_input());
            tick_until(&mut state, |s| s.enemies.is_empty() && s.projectiles.is_empty());
        }
        assert_eq!(state.player.score, KILL_SCORE * hits);
    }

    #[test]
    fn test_one_kill_per_shot() {
        let mut state = running_state();
        state.player.runes = Runes::new(false, false, true);
        // Two blue enemies stacked in the same spot
        enemy_ahead(&mut state, ColorTag::Blue);
        enemy_ahead(&mut state, ColorTag::Blue);

        tick(&mut state, &fire_input());
        tick_until(&mut state, |s| s.projectiles.is_empty());

        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.player.score, KILL_SCORE);
    }

    #[test]
    fn test_neutral_runes_reject_fire() {
        let mut state = running_state();
        for runes in [Runes::new(false, false, false), Runes::new(true, true, true)] {
            state.player.runes = runes;
            assert!(!fire(&mut state));
        }
        tick(&mut state, &fire_input());
        assert!(state.projectiles.is_empty());
        assert!(!state.events.contains(&GameEvent::Sound(SoundCue::Fire)));
    }

    #[test]
    fn test_fire_rejected_unless_running() {
        let mut state = GameState::new(5);
        state.player.runes = Runes::new(true, false, false);
        assert!(!fire(&mut state));
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_rune_toggles_apply_in_tick() {
        let mut state = running_state();
        let input = TickInput {
            rune_toggles: vec![Rune::Q, Rune::E],
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.player.runes, Runes::new(true, true, false));
        assert_eq!(state.projectiles[0].tag, ColorTag::Orange);
    }

    #[test]
    fn test_projectile_expires_out_of_range() {
        let mut state = running_state();
        state.player.runes = Runes::new(true, false, false);
        tick(&mut state, &fire_input());

        for _ in 0..95 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.projectiles.len(), 1);

        for _ in 0..10 {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_projectile_follows_pitch() {
        let mut state = running_state();
        state.player.runes = Runes::new(true, false, false);
        state.player.pitch = 0.5;
        tick(&mut state, &fire_input());
        assert!(state.projectiles[0].vel.y > 0.0);
    }

    #[test]
    fn test_contact_damage_accumulates() {
        let mut state = running_state();
        for k in 1..=6 {
            factory::spawn_enemy_at(&mut state, ColorTag::Red, Vec3::new(0.0, 1.0, 0.0));
            tick(&mut state, &TickInput::default());
            assert_eq!(state.player.hp, PLAYER_MAX_HP - CONTACT_DAMAGE * k);
            assert!(state.enemies.is_empty(), "contact consumes the enemy");
            assert_eq!(state.phase, GamePhase::Running);
        }

        factory::spawn_enemy_at(&mut state, ColorTag::Red, Vec3::new(0.0, 1.0, 0.0));
        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.hp, PLAYER_MAX_HP - CONTACT_DAMAGE * 7);
        assert_eq!(state.player.display_hp(), 0);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_game_over_fires_once() {
        let mut state = running_state();
        state.player.hp = CONTACT_DAMAGE;
        // Two enemies touching in the same tick
        factory::spawn_enemy_at(&mut state, ColorTag::Red, Vec3::new(0.0, 1.0, 0.0));
        factory::spawn_enemy_at(&mut state, ColorTag::Blue, Vec3::new(0.0, 1.0, 0.0));

        tick(&mut state, &TickInput::default());
        for _ in 0..10 {
            tick(&mut state, &TickInput::default());
        }

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(count_game_overs(&state.events), 1);
        // Processing stopped at the fatal contact
        assert_eq!(state.player.hp, 0);
        assert_eq!(state.enemies.len(), 1);
    }

    #[test]
    fn test_game_over_skips_rest_of_tick() {
        let mut state = running_state();
        state.player.hp = 1;
        state.player.runes = Runes::new(true, false, false);
        tick(&mut state, &fire_input());
        let bolt_pos = state.projectiles[0].pos;

        factory::spawn_enemy_at(&mut state, ColorTag::Red, Vec3::new(0.0, 1.0, 0.0));
        tick(&mut state, &TickInput::default());

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.projectiles[0].pos, bolt_pos);
    }

    #[test]
    fn test_start_and_pause_ignored_after_game_over() {
        let mut state = running_state();
        state.player.hp = 1;
        factory::spawn_enemy_at(&mut state, ColorTag::Red, Vec3::new(0.0, 1.0, 0.0));
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);

        assert!(!start(&mut state));
        assert!(!pause(&mut state));
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_restart_restores_everything() {
        let mut state = running_state();
        state.player.runes = Runes::new(true, false, false);
        enemy_ahead(&mut state, ColorTag::Red);
        tick(&mut state, &fire_input());
        tick_until(&mut state, |s| s.player.score > 0);

        state.player.hp = 1;
        state.spawner.interval_ms = 1200.0;
        factory::spawn_enemy_at(&mut state, ColorTag::Red, Vec3::new(0.0, 1.0, 0.0));
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);

        // Leftover entities with drawables
        factory::spawn_enemy_at(&mut state, ColorTag::Blue, Vec3::new(10.0, 1.0, 10.0));
        let handle = DrawableHandle::from(slotmap::KeyData::from_ffi(42));
        state.enemies[0].drawable = Some(handle);
        state.events.clear();

        restart(&mut state);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.player.hp, PLAYER_MAX_HP);
        assert_eq!(state.player.score, 0);
        assert_eq!(state.player.pos, Player::start_pos());
        assert_eq!(state.spawner.interval_ms, SPAWN_INTERVAL_START_MS);
        assert_eq!(state.entity_count(), 0);
        assert!(state.events.contains(&GameEvent::Despawned(handle)));
    }

    #[test]
    fn test_spawns_arrive_over_time() {
        let mut state = GameState::new(77);
        start(&mut state);
        for _ in 0..200 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.enemies.len(), 1);
        assert!(state.spawner.interval_ms < SPAWN_INTERVAL_START_MS);
    }

    #[test]
    fn test_particles_fade_out() {
        let mut state = running_state();
        factory::spawn_explosion(&mut state, Vec3::new(0.0, 1.0, -20.0), ColorTag::Purple);
        let start_scale = state.particles[0].scale;
        tick(&mut state, &TickInput::default());
        assert!(state.particles[0].scale < start_scale);

        for _ in 0..PARTICLE_LIFE_MAX {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_enemies_close_in_and_bob() {
        let mut state = running_state();
        factory::spawn_enemy_at(&mut state, ColorTag::Red, Vec3::new(0.0, 1.0, -20.0));
        let start_dist = crate::horizontal_distance(state.enemies[0].pos, state.player.pos);

        // One tick covers ENEMY_SPEED along the 3D line to the player
        tick(&mut state, &TickInput::default());
        let step = start_dist - crate::horizontal_distance(state.enemies[0].pos, state.player.pos);
        assert!(step <= ENEMY_SPEED + 1e-5, "step {step}");
        assert!(step > ENEMY_SPEED * 0.99, "step {step}");

        for _ in 0..29 {
            tick(&mut state, &TickInput::default());
            let y = state.enemies[0].pos.y;
            assert!((ENEMY_BASE_HEIGHT - ENEMY_BOB_AMPLITUDE - 1e-4
                ..=ENEMY_BASE_HEIGHT + ENEMY_BOB_AMPLITUDE + 1e-4)
                .contains(&y));
        }
        let end_dist = crate::horizontal_distance(state.enemies[0].pos, state.player.pos);
        assert!((start_dist - end_dist - 30.0 * ENEMY_SPEED).abs() < 0.01);
        // Facing the player straight down -Z from the enemy's side means +Z, yaw = ±π
        assert!((state.enemies[0].facing.abs() - std::f32::consts::PI).abs() < 1e-3);
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(99999);
        let mut b = GameState::new(99999);
        start(&mut a);
        start(&mut b);

        let input = TickInput {
            movement: MoveIntent {
                forward: true,
                ..Default::default()
            },
            look: Vec2::new(0.01, 0.0),
            ..Default::default()
        };
        for _ in 0..400 {
            tick(&mut a, &input);
            tick(&mut b, &input);
        }
        assert_eq!(a.enemies.len(), b.enemies.len());
        for (ea, eb) in a.enemies.iter().zip(&b.enemies) {
            assert_eq!(ea.tag, eb.tag);
            assert_eq!(ea.pos, eb.pos);
        }
    }

    fn intent_from_bits(bits: u8) -> MoveIntent {
        MoveIntent {
            forward: bits & 1 != 0,
            back: bits & 2 != 0,
            left: bits & 4 != 0,
            right: bits & 8 != 0,
        }
    }

    proptest! {
        #[test]
        fn prop_player_stays_in_arena(
            moves in prop::collection::vec((0u8..16, -3.2f32..3.2, 1usize..400), 1..12)
        ) {
            let mut player = Player::default();
            for (bits, yaw, repeat) in moves {
                player.yaw = yaw;
                for _ in 0..repeat {
                    player.walk(intent_from_bits(bits));
                    prop_assert!(player.pos.x.abs() <= ARENA_HALF_EXTENT);
                    prop_assert!(player.pos.z.abs() <= ARENA_HALF_EXTENT);
                }
            }
        }

        #[test]
        fn prop_tick_keeps_player_in_arena(
            moves in prop::collection::vec((0u8..16, -0.5f32..0.5, -0.5f32..0.5), 1..60)
        ) {
            let mut state = running_state();
            for (bits, dyaw, dpitch) in moves {
                let input = TickInput {
                    movement: intent_from_bits(bits),
                    look: Vec2::new(dyaw, dpitch),
                    ..Default::default()
                };
                for _ in 0..20 {
                    tick(&mut state, &input);
                }
                prop_assert!(state.player.pos.x.abs() <= ARENA_HALF_EXTENT);
                prop_assert!(state.player.pos.z.abs() <= ARENA_HALF_EXTENT);
                prop_assert!(state.player.pitch.abs() <= PITCH_LIMIT);
            }
        }
    }
}
