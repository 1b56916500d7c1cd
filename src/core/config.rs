//! Runtime configuration
//!
//! Built-in defaults, optionally overlaid by a JSON file, then by
//! `CAMPUS_ROUTE_*` environment variables.

use std::env;
use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::core::error::{Error, Result};
use crate::core::map::{Bounds, LngLat, MapViewState};

pub const ENV_ACCESS_TOKEN: &str = "CAMPUS_ROUTE_ACCESS_TOKEN";
pub const ENV_ALL_ACCESS_URL: &str = "CAMPUS_ROUTE_ALL_ACCESS_URL";
pub const ENV_STEP_FREE_URL: &str = "CAMPUS_ROUTE_STEP_FREE_URL";
pub const ENV_GEOCODE_URL: &str = "CAMPUS_ROUTE_GEOCODE_URL";

/// Base URL of each routing backend
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoutingEndpoints {
    pub all_access: String,
    pub step_free: String,
}

impl Default for RoutingEndpoints {
    fn default() -> Self {
        Self {
            all_access: "https://all-access.onrender.com".to_string(),
            step_free: "https://step-free-yhgh.onrender.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub base_url: String,
    pub access_token: String,
    /// Results outside this box are never suggested
    pub bbox: Bounds,
    pub limit: usize,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mapbox.com/geocoding/v5/mapbox.places".to_string(),
            access_token: String::new(),
            bbox: Bounds::from([-4.35, 55.83, -4.20, 55.90]),
            limit: 3,
        }
    }
}

/// Basemap style URLs
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StyleUrls {
    pub detailed: String,
    pub high_contrast: String,
    pub satellite: String,
}

impl Default for StyleUrls {
    fn default() -> Self {
        Self {
            detailed: "mapbox://styles/wenqiz/cmcghjml7051e01s5bte83vm3".to_string(),
            high_contrast: "mapbox://styles/wenqiz/cmdmxmd08000301p915cm90zc".to_string(),
            satellite: "mapbox://styles/mapbox/satellite-streets-v11".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub routing: RoutingEndpoints,
    pub geocoding: GeocodingConfig,
    pub styles: StyleUrls,
    pub initial_view: MapViewState,
    /// Padding in pixels around a fitted route
    pub fit_padding: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            routing: RoutingEndpoints::default(),
            geocoding: GeocodingConfig::default(),
            styles: StyleUrls::default(),
            initial_view: MapViewState {
                center: LngLat::new(-4.289, 55.873),
                zoom: 15.0,
            },
            fit_padding: 50,
        }
    }
}

impl AppConfig {
    /// Defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// Read a JSON file; keys it leaves out keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading configuration from {}", path.display());
        let data = fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&data)
            .map_err(|e| Error::ConfigError(format!("invalid {}: {e}", path.display())))
    }

    /// Apply `CAMPUS_ROUTE_*` values looked up through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut String, key: &str| {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                debug!("{key} overrides configuration");
                *target = value;
            }
        };
        set(&mut self.geocoding.access_token, ENV_ACCESS_TOKEN);
        set(&mut self.routing.all_access, ENV_ALL_ACCESS_URL);
        set(&mut self.routing.step_free, ENV_STEP_FREE_URL);
        set(&mut self.geocoding.base_url, ENV_GEOCODE_URL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.routing.all_access, "https://all-access.onrender.com");
        assert_eq!(config.geocoding.limit, 3);
        assert_eq!(config.geocoding.bbox.to_query_value(), "-4.35,55.83,-4.2,55.9");
        assert_eq!(config.fit_padding, 50);
        assert_eq!(config.initial_view.zoom, 15.0);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "routing": {{ "step_free": "http://localhost:5001" }}, "fit_padding": 80 }}"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.routing.step_free, "http://localhost:5001");
        assert_eq!(config.routing.all_access, "https://all-access.onrender.com");
        assert_eq!(config.fit_padding, 80);
        assert_eq!(config.geocoding, GeocodingConfig::default());
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_overrides_skip_blank_values() {
        let vars: HashMap<&str, &str> = [
            (ENV_ACCESS_TOKEN, "pk.override"),
            (ENV_ALL_ACCESS_URL, "  "),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.geocoding.access_token, "pk.override");
        assert_eq!(config.routing.all_access, "https://all-access.onrender.com");
    }
}
