//! Map configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).
//!
//! | Key | Default |
//! |---|---|
//! | `MAP_TITLE` | unset |
//! | `MAP_CRS` | unset |
//! | `MAP_MANIFEST` | `map.json` |
//! | `MAP_OUTPUT_PRETTY` | `true` |

use std::path::PathBuf;

use crate::domain::Crs;
use crate::error::MapError;

/// Default manifest path for the `map-bounds` binary.
pub const DEFAULT_MANIFEST: &str = "map.json";

/// Top-level map configuration.
///
/// Loaded once at startup via [`MapConfig::from_env`].
#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Initial map title.
    pub title: Option<String>,

    /// Reference CRS for bounds aggregation.
    pub crs: Option<Crs>,

    /// Manifest describing the layers to load.
    pub manifest_path: PathBuf,

    /// Whether JSON output is pretty-printed.
    pub output_pretty: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            title: None,
            crs: None,
            manifest_path: PathBuf::from(DEFAULT_MANIFEST),
            output_pretty: true,
        }
    }
}

impl MapConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file, then
    /// falls back to defaults for every unset key.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidConfig`] if `MAP_CRS` is set but blank.
    pub fn from_env() -> Result<Self, MapError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::InvalidConfig`] if `MAP_CRS` is set but blank.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MapError> {
        let title = lookup("MAP_TITLE").filter(|t| !t.trim().is_empty());

        let crs = lookup("MAP_CRS")
            .map(|code| {
                code.parse::<Crs>()
                    .map_err(|e| MapError::InvalidConfig(format!("MAP_CRS: {e}")))
            })
            .transpose()?;

        let manifest_path = lookup("MAP_MANIFEST")
            .filter(|p| !p.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_MANIFEST), PathBuf::from);

        let output_pretty = parse_bool(lookup("MAP_OUTPUT_PRETTY").as_deref(), true);

        Ok(Self {
            title,
            crs,
            manifest_path,
            output_pretty,
        })
    }
}

/// Parses a boolean flag. Accepts `"true"`, `"1"`, `"false"`, `"0"`
/// (case-insensitive). Returns `default` otherwise.
fn parse_bool(value: Option<&str>, default: bool) -> bool {
    match value.map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => true,
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => false,
        _ => default,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let Ok(config) = MapConfig::from_lookup(lookup(&[])) else {
            panic!("defaults should load");
        };
        assert_eq!(config, MapConfig::default());
        assert_eq!(config.manifest_path, PathBuf::from("map.json"));
        assert!(config.output_pretty);
    }

    #[test]
    fn reads_every_key() {
        let Ok(config) = MapConfig::from_lookup(lookup(&[
            ("MAP_TITLE", "Harbour"),
            ("MAP_CRS", "EPSG:3857"),
            ("MAP_MANIFEST", "/srv/maps/harbour.json"),
            ("MAP_OUTPUT_PRETTY", "0"),
        ])) else {
            panic!("config should load");
        };
        assert_eq!(config.title.as_deref(), Some("Harbour"));
        assert_eq!(config.crs, Some(Crs::new("EPSG:3857")));
        assert_eq!(config.manifest_path, PathBuf::from("/srv/maps/harbour.json"));
        assert!(!config.output_pretty);
    }

    #[test]
    fn blank_crs_is_rejected() {
        let Err(err) = MapConfig::from_lookup(lookup(&[("MAP_CRS", "  ")])) else {
            panic!("blank CRS should fail");
        };
        assert!(matches!(err, MapError::InvalidConfig(_)));
    }

    #[test]
    fn parse_bool_accepts_common_spellings() {
        assert!(parse_bool(Some("TRUE"), false));
        assert!(parse_bool(Some("1"), false));
        assert!(!parse_bool(Some("False"), true));
        assert!(!parse_bool(Some("0"), true));
        assert!(parse_bool(Some("maybe"), true));
        assert!(!parse_bool(None, false));
    }
}
