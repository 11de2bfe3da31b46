//! Engine configuration.
//!
//! Every field has a default matching the spaceship demo, so a JSON file
//! only needs the keys it changes:
//!
//! ```
//! use comet_engine::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "fixed_dt": 0.02 }"#).unwrap();
//! assert_eq!(config.fixed_dt, Some(0.02));
//! assert_eq!(config.simulation_scale, 0.1);
//! ```

use std::path::Path;

use crate::components::Vec2;
use crate::physics::{PhysicsWorld, DEFAULT_SIMULATION_SCALE};
use crate::render::Color;
use crate::EngineError;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// World units → physics units factor.
    pub simulation_scale: f32,
    /// World units per second².
    pub gravity: Vec2,
    /// Physics step in seconds. `None` steps by the time source's delta.
    pub fixed_dt: Option<f32>,
    /// Camera pan speed in world units per second at zoom 1.
    pub camera_speed: f32,
    pub zoom: f32,
    /// Viewport size in pixels.
    pub viewport: Vec2,
    pub clear_color: Color,
    /// Base seed for particle emitters.
    pub particle_seed: u64,
    /// Particles emitted per frame by a moving emitter.
    pub particles_per_frame: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            simulation_scale: DEFAULT_SIMULATION_SCALE,
            gravity: Vec2::ZERO,
            fixed_dt: None,
            camera_speed: 200.0,
            zoom: 1.0,
            viewport: Vec2::new(800.0, 600.0),
            clear_color: Color::WHITE,
            particle_seed: 1,
            particles_per_frame: 20,
        }
    }
}

impl EngineConfig {
    /// Parse and validate.
    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        positive("simulation_scale", self.simulation_scale)?;
        positive("zoom", self.zoom)?;
        positive("viewport.x", self.viewport.x)?;
        positive("viewport.y", self.viewport.y)?;
        if let Some(dt) = self.fixed_dt {
            positive("fixed_dt", dt)?;
        }
        if !(self.camera_speed.is_finite() && self.camera_speed >= 0.0) {
            return Err(EngineError::InvalidConfig(format!(
                "camera_speed must be non-negative, got {}",
                self.camera_speed
            )));
        }
        if !(self.gravity.x.is_finite() && self.gravity.y.is_finite()) {
            return Err(EngineError::InvalidConfig("gravity must be finite".into()));
        }
        Ok(())
    }

    /// A physics world with this config's gravity and scale.
    pub fn physics_world(&self) -> Result<PhysicsWorld, EngineError> {
        PhysicsWorld::new(self.gravity, self.simulation_scale)
    }
}

fn positive(name: &str, value: f32) -> Result<(), EngineError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::InvalidConfig(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.clear_color, Color::WHITE);
        assert_eq!(config.fixed_dt, None);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{ "zoom": 2.0, "clear_color": { "r": 0, "g": 0, "b": 0, "a": 255 } }"#,
        )
        .unwrap();
        assert_eq!(config.zoom, 2.0);
        assert_eq!(config.clear_color, Color::BLACK);
        assert_eq!(config.camera_speed, 200.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for json in [
            r#"{ "simulation_scale": 0.0 }"#,
            r#"{ "zoom": -1.0 }"#,
            r#"{ "fixed_dt": 0.0 }"#,
            r#"{ "camera_speed": -5.0 }"#,
        ] {
            let err = EngineConfig::from_json_str(json).unwrap_err();
            assert!(matches!(err, EngineError::InvalidConfig(_)), "{json}: {err}");
        }
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            EngineConfig::from_json_str("{ zoom: 1 }"),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
