//! Game settings and preferences
//!
//! Defaults can be overridden by a JSON block embedded in the page.

use serde::{Deserialize, Serialize};

use crate::consts::MOUSE_SENSITIVITY;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Controls ===
    /// Look speed (radians per pixel of pointer movement)
    pub mouse_sensitivity: f32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    // === Graphics ===
    /// Fraction of the device pixel resolution to render at
    pub render_scale: f32,
    /// Vertical field of view
    pub fov_degrees: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mouse_sensitivity: MOUSE_SENSITIVITY,

            master_volume: 1.0,
            music_volume: 1.0,
            muted: false,

            render_scale: 1.0,
            fov_degrees: 75.0,
        }
    }
}

impl Settings {
    /// Parse overrides; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::sanitized)
    }

    /// Pull out-of-range values back into something playable
    pub fn sanitized(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self.render_scale = self.render_scale.clamp(0.25, 2.0);
        self.fov_degrees = self.fov_degrees.clamp(40.0, 120.0);
        if !(self.mouse_sensitivity > 0.0) {
            self.mouse_sensitivity = MOUSE_SENSITIVITY;
        }
        self
    }

    /// Element holding JSON overrides
    const CONFIG_ELEMENT_ID: &'static str = "game-config";

    /// Load settings from the page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());

        if let Some(json) = json {
            match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from page");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring malformed settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "fov_degrees": 90.0, "muted": true }"#).unwrap();
        assert_eq!(settings.fov_degrees, 90.0);
        assert!(settings.muted);
        assert_eq!(settings.mouse_sensitivity, MOUSE_SENSITIVITY);
        assert_eq!(settings.master_volume, 1.0);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Settings::from_json("{ fov: ").is_err());
        assert!(Settings::from_json(r#"{ "muted": "yes" }"#).is_err());
    }

    #[test]
    fn test_values_are_sanitized() {
        let settings = Settings::from_json(
            r#"{ "master_volume": 4.0, "render_scale": 0.0, "mouse_sensitivity": -1.0 }"#,
        )
        .unwrap();
        assert_eq!(settings.master_volume, 1.0);
        assert_eq!(settings.render_scale, 0.25);
        assert_eq!(settings.mouse_sensitivity, MOUSE_SENSITIVITY);
    }

    #[test]
    fn test_page_config_keeps_low_render_scale() {
        let settings = Settings::from_json(
            r#"{ "mouse_sensitivity": 0.002, "master_volume": 1.0, "fov_degrees": 75, "render_scale": 0.25 }"#,
        )
        .unwrap();
        assert_eq!(settings.render_scale, 0.25);
        assert_eq!(settings.fov_degrees, 75.0);
    }

    #[test]
    fn test_round_trip() {
        let settings = Settings {
            fov_degrees: 100.0,
            ..Default::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }
}
