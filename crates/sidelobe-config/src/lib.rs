//! Configuration management for sidelobe
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. CLI arguments (highest precedence, applied by the binary)
//! 2. Environment variables (`SIDELOBE_<SECTION>__<KEY>`)
//! 3. sidelobe.local.toml (gitignored, local overrides)
//! 4. sidelobe.toml (git-tracked, project config)
//! 5. ~/.config/sidelobe/config.toml (user defaults)
//! 6. Built-in defaults (lowest precedence)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sidelobe_harness::MatchMode;
use sidelobe_types::{Channel, ConstraintSet};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main sidelobe configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidelobeConfig {
    pub run: RunConfig,
    pub harness: HarnessConfig,
    pub interface: InterfaceConfig,
    pub generator: GeneratorConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub iterations: u32,
    /// Delay between transmit and validity check, in milliseconds.
    pub settle_ms: u64,
    /// Record the hex of every control and test case in each result.
    pub record_raw: bool,
    /// Give up after this many consecutive control misses; unset retries
    /// indefinitely.
    pub max_control_attempts: Option<u32>,
    pub warn_every: u32,
    /// Where to write the result set; unset writes to stdout.
    pub results_file: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            iterations: 1,
            settle_ms: 500,
            record_raw: true,
            max_control_attempts: None,
            warn_every: 10,
            results_file: None,
        }
    }
}

impl RunConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub tick_ms: u64,
    pub queue_capacity: usize,
    pub match_mode: MatchMode,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            queue_capacity: 1024,
            match_mode: MatchMode::FrameContainsExpected,
        }
    }
}

impl HarnessConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceConfig {
    pub channel: u8,
    pub tx_addr: SocketAddr,
    pub rx_bind: Option<SocketAddr>,
    pub generate_phy: bool,
    pub generate_mac: bool,
    pub tx_gain: u32,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            channel: Channel::MIN,
            tx_addr: SocketAddr::from(([127, 0, 0, 1], 52001)),
            rx_bind: None,
            generate_phy: false,
            generate_mac: false,
            tx_gain: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub start_sequence: u8,
    pub target_pan: u16,
    pub target_addr: u16,
    pub source_addr: u16,
    pub seed: u64,
    /// Generator-scoped default constraints.
    pub constraints: ConstraintSet,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            start_sequence: 0,
            target_pan: 0xFFFF,
            target_addr: 0x0000,
            source_addr: 0x0000,
            seed: 0,
            constraints: ConstraintSet::new(),
        }
    }
}

impl SidelobeConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Rejects values no run could use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.harness.tick_ms == 0 {
            return Err(ConfigError::ValidationError(
                "harness.tick_ms must be positive".to_string(),
            ));
        }
        if self.harness.queue_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "harness.queue_capacity must be positive".to_string(),
            ));
        }
        if self.run.max_control_attempts == Some(0) {
            return Err(ConfigError::ValidationError(
                "run.max_control_attempts must be positive when set".to_string(),
            ));
        }
        self.channel()?;
        Ok(())
    }

    pub fn channel(&self) -> Result<Channel, ConfigError> {
        Channel::new(self.interface.channel)
            .map_err(|e| ConfigError::ValidationError(format!("interface.channel: {e}")))
    }

    /// Resolve relative paths to absolute
    pub fn resolve_paths(&mut self, base_dir: impl AsRef<Path>) {
        if let Some(file) = &self.run.results_file
            && file.is_relative()
        {
            self.run.results_file = Some(base_dir.as_ref().join(file));
        }
    }

    /// Renders the effective configuration.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
