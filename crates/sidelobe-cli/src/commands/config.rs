//! Configuration display.

use anyhow::{Context, Result};
use sidelobe_config::{ConfigLoader, SidelobeConfig};
use std::path::Path;

pub(crate) fn load(project_dir: Option<&Path>) -> Result<SidelobeConfig> {
    let loader = match project_dir {
        Some(dir) => ConfigLoader::new().with_project_dir(dir),
        None => ConfigLoader::new(),
    };
    loader.load().context("Failed to load configuration")
}

/// Show the effective configuration after every layer is merged.
pub fn show(project_dir: Option<&Path>, format: &str) -> Result<()> {
    let config = load(project_dir)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&config)?),
        "toml" => print!("{}", config.to_toml()?),
        other => anyhow::bail!("Unknown format '{other}' (expected toml or json)"),
    }
    Ok(())
}
