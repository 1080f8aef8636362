//! HUD model
//!
//! Everything the page shows, derived from game state as plain strings and
//! flags. The wasm entry point copies it into the DOM.

use crate::consts::PLAYER_MAX_HP;
use crate::sim::{GamePhase, GameState, Rune, Runes};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HudModel {
    /// CSS width for the health bar, e.g. "85%"
    pub health_width: String,
    pub score: String,
    pub runes: Runes,
    /// Start/pause overlay
    pub show_overlay: bool,
    pub show_game_over: bool,
    pub final_score: String,
    /// Red screen flash after taking damage
    pub damage_flash: bool,
}

impl HudModel {
    pub fn from_state(state: &GameState, damage_flash: bool) -> Self {
        let player = &state.player;
        Self {
            health_width: format!("{}%", health_percent(player.hp)),
            score: player.score.to_string(),
            runes: player.runes,
            show_overlay: matches!(state.phase, GamePhase::Idle | GamePhase::Paused),
            show_game_over: state.phase == GamePhase::GameOver,
            final_score: player.score.to_string(),
            damage_flash,
        }
    }

    /// Class attribute for a rune indicator box
    pub fn rune_class(&self, rune: Rune) -> String {
        let (color, active) = match rune {
            Rune::Q => ("red", self.runes.q),
            Rune::E => ("yellow", self.runes.e),
            Rune::R => ("blue", self.runes.r),
        };
        if active {
            format!("rune-box {color} active")
        } else {
            format!("rune-box {color}")
        }
    }
}

/// Health as a whole percentage of max, clamped to 0..=100
pub fn health_percent(hp: i32) -> i32 {
    (hp.clamp(0, PLAYER_MAX_HP) * 100) / PLAYER_MAX_HP
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{pause, start};

    #[test]
    fn test_health_width_never_negative() {
        assert_eq!(health_percent(100), 100);
        assert_eq!(health_percent(55), 55);
        assert_eq!(health_percent(0), 0);
        assert_eq!(health_percent(-5), 0);
        assert_eq!(health_percent(250), 100);

        let mut state = GameState::new(1);
        state.player.hp = -20;
        assert_eq!(HudModel::from_state(&state, false).health_width, "0%");
    }

    #[test]
    fn test_overlay_follows_phase() {
        let mut state = GameState::new(1);
        assert!(HudModel::from_state(&state, false).show_overlay);

        start(&mut state);
        let hud = HudModel::from_state(&state, false);
        assert!(!hud.show_overlay);
        assert!(!hud.show_game_over);

        pause(&mut state);
        assert!(HudModel::from_state(&state, false).show_overlay);

        state.phase = GamePhase::GameOver;
        state.player.score = 700;
        let hud = HudModel::from_state(&state, false);
        assert!(!hud.show_overlay);
        assert!(hud.show_game_over);
        assert_eq!(hud.final_score, "700");
    }

    #[test]
    fn test_rune_classes() {
        let mut state = GameState::new(1);
        state.player.runes = Runes::new(true, false, true);
        let hud = HudModel::from_state(&state, false);
        assert_eq!(hud.rune_class(Rune::Q), "rune-box red active");
        assert_eq!(hud.rune_class(Rune::E), "rune-box yellow");
        assert_eq!(hud.rune_class(Rune::R), "rune-box blue active");
    }
}
