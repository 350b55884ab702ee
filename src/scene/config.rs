//! Scene composition tuning.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::placement::PlacementParams;

/// Every size, offset, and timing the composer and table manager use.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Largest bounding-box dimension of a dish in the single viewer.
    pub dish_target_size: f32,
    /// Same, for dishes on the multi-dish table.
    pub table_dish_target_size: f32,
    pub topping_target_size: f32,
    /// Height of the dish surface toppings rest on.
    pub surface_base_y: f32,
    pub fallback_topping_radius: f32,
    pub fallback_dish_thickness: f32,

    // Drop-in
    pub drop_height: f32,
    pub drop_duration_ms: f64,
    pub drop_stagger_ms: f64,

    // Exploded view
    pub explode_duration_ms: f64,
    pub dough_offset: f32,
    pub sauce_offset: f32,
    pub cheese_offset: f32,
    pub topping_lift_base: f32,
    pub topping_lift_per_group: f32,
    pub base_sink: f32,

    // Table
    pub pop_duration_ms: f64,
    pub pop_stagger_ms: f64,
    pub relayout_duration_ms: f64,
    /// Scale used for "not yet revealed".
    pub hidden_scale: f32,

    pub placement: PlacementParams,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            dish_target_size: 0.28,
            table_dish_target_size: 0.30,
            topping_target_size: 0.028,
            surface_base_y: 0.012,
            fallback_topping_radius: 0.014,
            fallback_dish_thickness: 0.02,
            drop_height: 0.25,
            drop_duration_ms: 500.0,
            drop_stagger_ms: 70.0,
            explode_duration_ms: 700.0,
            dough_offset: 0.03,
            sauce_offset: 0.07,
            cheese_offset: 0.11,
            topping_lift_base: 0.15,
            topping_lift_per_group: 0.035,
            base_sink: 0.04,
            pop_duration_ms: 600.0,
            pop_stagger_ms: 250.0,
            relayout_duration_ms: 400.0,
            hidden_scale: 0.001,
            placement: PlacementParams::default(),
        }
    }
}

impl SceneConfig {
    /// Load from file (sync). Missing fields keep their defaults.
    pub fn load_sync(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        log::info!("Loaded scene config from {}", path.display());
        Ok(config)
    }

    /// Reject sizes that must be positive, negative timings, and bad placement
    /// limits.
    pub fn validate(&self) -> Result<()> {
        let sizes = [
            ("dish_target_size", self.dish_target_size),
            ("table_dish_target_size", self.table_dish_target_size),
            ("topping_target_size", self.topping_target_size),
            ("fallback_topping_radius", self.fallback_topping_radius),
            ("fallback_dish_thickness", self.fallback_dish_thickness),
            ("hidden_scale", self.hidden_scale),
        ];
        for (name, value) in sizes {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::Config(format!("{name} must be positive, got {value}")));
            }
        }

        let timings = [
            ("drop_duration_ms", self.drop_duration_ms),
            ("drop_stagger_ms", self.drop_stagger_ms),
            ("explode_duration_ms", self.explode_duration_ms),
            ("pop_duration_ms", self.pop_duration_ms),
            ("pop_stagger_ms", self.pop_stagger_ms),
            ("relayout_duration_ms", self.relayout_duration_ms),
        ];
        for (name, value) in timings {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::Config(format!("{name} must not be negative, got {value}")));
            }
        }

        self.placement.validate()
    }

    /// Save to file (sync)
    pub fn save_sync(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Vertical lift of a topping group in the exploded view.
    pub fn topping_lift(&self, group_index: usize) -> f32 {
        self.topping_lift_base + self.topping_lift_per_group * group_index as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = SceneConfig::default();
        assert_eq!(config.dish_target_size, 0.28);
        assert_eq!(config.drop_stagger_ms, 70.0);
        assert_eq!(config.placement.max_attempts, 80);
    }

    #[test]
    fn test_topping_lift_grows_with_group() {
        let config = SceneConfig::default();
        assert!(config.topping_lift(1) > config.topping_lift(0));
        assert!((config.topping_lift(2) - (0.15 + 0.07)).abs() < 1e-6);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        std::fs::write(&path, r#"{"drop_height": 0.5, "placement": {"min_distance": 0.03}}"#)
            .unwrap();
        let config = SceneConfig::load_sync(&path).unwrap();
        assert_eq!(config.drop_height, 0.5);
        assert_eq!(config.placement.min_distance, 0.03);
        assert_eq!(config.placement.inner_radius, 0.11);
        assert_eq!(config.explode_duration_ms, 700.0);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        let mut config = SceneConfig::default();
        config.base_sink = 0.05;
        config.save_sync(&path).unwrap();
        assert_eq!(SceneConfig::load_sync(&path).unwrap(), config);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        for json in [
            r#"{"drop_duration_ms": -1.0}"#,
            r#"{"hidden_scale": 0.0}"#,
            r#"{"placement": {"instances_per_topping": 9223372036854775807}}"#,
        ] {
            std::fs::write(&path, json).unwrap();
            let err = SceneConfig::load_sync(&path).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{json}: {err}");
        }
        assert!(SceneConfig::default().validate().is_ok());
    }
}
