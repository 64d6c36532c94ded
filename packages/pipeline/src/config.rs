//! Run configuration.
//!
//! Everything the original hardcoded is an explicit named field here:
//! input and output paths, the two route weights, and the composite
//! weights. A config file is optional; defaults reproduce the reference
//! behavior. Validation runs once at startup so a bad configuration
//! fails before any file is read.

use std::fs;
use std::path::{Path, PathBuf};

use fragility_map_models::CompositeWeights;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Read {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// The configuration parsed but fails a validity rule.
    #[error("Invalid config: {message}")]
    Invalid {
        /// Which rule failed.
        message: String,
    },
}

/// Paths to the four input `GeoJSON` feature collections.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputPaths {
    /// Census tract polygons with a `geoid` property.
    pub tracts: PathBuf,
    /// Flood zone polygons, already in the tracts' reference frame.
    pub flood_zones: PathBuf,
    /// Truck route lines with a `routetype` property.
    pub truck_routes: PathBuf,
    /// Cleaned wholesale market points with a `MARKET` property.
    pub markets: PathBuf,
}

impl Default for InputPaths {
    fn default() -> Self {
        Self {
            tracts: PathBuf::from("data/census-tracts.geojson"),
            flood_zones: PathBuf::from("data/flood-zones.geojson"),
            truck_routes: PathBuf::from("data/truck-routes.geojson"),
            markets: PathBuf::from("data/wholesale-markets-clean.geojson"),
        }
    }
}

/// Full pipeline configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input feature collection paths.
    pub inputs: InputPaths,
    /// Where the scored feature collection is written.
    pub output: PathBuf,
    /// Route weight applied to `routetype == "Through"` routes.
    pub truck_weight_through: f64,
    /// Route weight applied to every other route.
    pub truck_weight_other: f64,
    /// Weights combining the three normalized signals.
    pub composite_weights: CompositeWeights,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inputs: InputPaths::default(),
            output: PathBuf::from("data/census-tracts-fragility.geojson"),
            truck_weight_through: 1.0,
            truck_weight_other: 0.6,
            composite_weights: CompositeWeights::default(),
        }
    }
}

impl Config {
    /// Loads and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML,
    /// or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the validity rules: non-negative weights, composite
    /// weights summing to 1.0, non-empty paths.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first rule violated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.truck_weight_through < 0.0 || self.truck_weight_other < 0.0 {
            return Err(invalid("route weights must be non-negative"));
        }
        let w = &self.composite_weights;
        if w.truck < 0.0 || w.flood < 0.0 || w.hub < 0.0 {
            return Err(invalid("composite weights must be non-negative"));
        }
        if (w.sum() - 1.0).abs() > 1e-9 {
            return Err(invalid(&format!(
                "composite weights must sum to 1.0, got {}",
                w.sum()
            )));
        }
        for (name, path) in [
            ("inputs.tracts", &self.inputs.tracts),
            ("inputs.flood_zones", &self.inputs.flood_zones),
            ("inputs.truck_routes", &self.inputs.truck_routes),
            ("inputs.markets", &self.inputs.markets),
            ("output", &self.output),
        ] {
            if path.as_os_str().is_empty() {
                return Err(invalid(&format!("{name} path must not be empty")));
            }
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid {
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn default_weights_match_reference_constants() {
        let config = Config::default();
        assert!((config.truck_weight_through - 1.0).abs() < 1e-12);
        assert!((config.truck_weight_other - 0.6).abs() < 1e-12);
        assert!((config.composite_weights.truck - 0.4).abs() < 1e-12);
        assert!((config.composite_weights.flood - 0.4).abs() < 1e-12);
        assert!((config.composite_weights.hub - 0.2).abs() < 1e-12);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let config: Config = toml::from_str(
            r#"
            output = "out/scored.geojson"

            [inputs]
            tracts = "in/tracts.geojson"
            "#,
        )
        .unwrap();
        assert_eq!(config.output, PathBuf::from("out/scored.geojson"));
        assert_eq!(config.inputs.tracts, PathBuf::from("in/tracts.geojson"));
        assert_eq!(
            config.inputs.markets,
            PathBuf::from("data/wholesale-markets-clean.geojson")
        );
        config.validate().unwrap();
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let config: Config = toml::from_str(
            r"
            [composite_weights]
            truck = 0.5
            flood = 0.5
            hub = 0.5
            ",
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn rejects_negative_route_weight() {
        let config = Config {
            truck_weight_other: -0.1,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_empty_path() {
        let mut config = Config::default();
        config.inputs.flood_zones = PathBuf::new();
        assert!(config.validate().is_err());
    }
}
