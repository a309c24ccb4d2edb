//! map-bounds entry point.
//!
//! Builds a map from a JSON manifest and prints its maximum bounds.

use std::io::Write;

use anyhow::Context;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use map_content::config::MapConfig;
use map_content::domain::ReferencedEnvelope;
use map_content::manifest::MapManifest;

#[derive(Debug, Serialize)]
struct Report {
    title: Option<String>,
    layers: usize,
    max_bounds: Option<ReferencedEnvelope>,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let mut config = MapConfig::from_env()?;
    if let Some(path) = std::env::args_os().nth(1) {
        config.manifest_path = path.into();
    }
    tracing::info!(manifest = %config.manifest_path.display(), "starting map-bounds");

    // Build the map
    let manifest = MapManifest::from_path(&config.manifest_path)?;
    let map = manifest
        .build(&config)
        .with_context(|| format!("building map from {}", config.manifest_path.display()))?;

    let report = Report {
        title: map.title(),
        layers: map.layer_count(),
        max_bounds: map.max_bounds(),
    };
    map.dispose();

    let json = if config.output_pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    writeln!(std::io::stdout().lock(), "{json}")?;

    Ok(())
}
