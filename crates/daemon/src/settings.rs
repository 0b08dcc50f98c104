//! Daemon settings
//!
//! Layered: optional TOML file, then `MESHGATE_<SECTION>__<KEY>` environment
//! variables on top. Lists (`api.services`) are comma separated.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use config::{Config, Environment, File, FileFormat};
use meshgate_core::application::post_setup::progress::DEFAULT_SUBSCRIBER_CAPACITY;
use meshgate_core::config::ApiConfig;
use meshgate_infra_local::LocalPostConfig;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "~/.meshgate/config.toml";
const ENV_PREFIX: &str = "MESHGATE";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiConfig,
    pub clock: ClockSettings,
    pub post: PostSettings,
    pub smesher: SmesherSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClockSettings {
    /// Genesis of layer 0 (RFC 3339); daemon start time when unset
    pub genesis_time: Option<DateTime<Utc>>,
    pub layer_duration_secs: u64,
    pub layers_per_epoch: u64,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            genesis_time: None,
            layer_duration_secs: 30,
            layers_per_epoch: 4032,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostSettings {
    pub chunk_bytes: usize,
    pub benchmark_bytes: usize,
    pub progress_buffer: usize,
    pub throttle_delay_ms: u64,
    /// Pending progress events kept per stream subscriber
    pub subscriber_capacity: usize,
}

impl Default for PostSettings {
    fn default() -> Self {
        let local = LocalPostConfig::default();
        Self {
            chunk_bytes: local.chunk_bytes,
            benchmark_bytes: local.benchmark_bytes,
            progress_buffer: local.progress_buffer,
            throttle_delay_ms: local.throttle_delay.as_millis() as u64,
            subscriber_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
        }
    }
}

impl PostSettings {
    pub fn local_config(&self) -> LocalPostConfig {
        LocalPostConfig {
            chunk_bytes: self.chunk_bytes,
            benchmark_bytes: self.benchmark_bytes,
            progress_buffer: self.progress_buffer,
            throttle_delay: Duration::from_millis(self.throttle_delay_ms),
            ..LocalPostConfig::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SmesherSettings {
    /// Initial reward address (hex)
    pub coinbase: Option<String>,
}

impl Settings {
    /// Load from `MESHGATE_CONFIG` (or the default path) and the environment
    pub fn load() -> Result<Self> {
        let path = std::env::var("MESHGATE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        let path = shellexpand::tilde(&path).into_owned();
        Self::from_sources(&path, environment())
    }

    fn from_sources(path: &str, env: Environment) -> Result<Self> {
        Config::builder()
            .add_source(File::new(path, FileFormat::Toml).required(false))
            .add_source(env)
            .build()
            .with_context(|| format!("failed to read configuration ({})", path))?
            .try_deserialize()
            .context("invalid configuration")
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("api.services")
        .try_parsing(true)
}
