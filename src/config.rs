//! Engine configuration.
//!
//! The catalog, reservation rules, and request limits are deployment
//! data, loaded from a TOML file:
//!
//! ```toml
//! [limits]
//! max_workers = 1000
//! max_working_hours = 24
//! max_units = 100000
//!
//! [[task_types]]
//! name = "Priority Small"
//! tier = "Priority"
//! hours = 0.0875
//!
//! [[reservations]]
//! label = "Autopsy"
//! min_workers = 2
//! select = { kind = "from_end", offset = 4 }
//! ```
//!
//! Any section left out falls back to the built-in default
//! ([`Catalog::standard`], [`ReservationPolicy::standard`]).
//!
//! The file path can be given explicitly or through `U_CASELOAD_CONFIG`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Catalog;
use crate::scheduler::ReservationPolicy;
use crate::validation::validate_config;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "U_CASELOAD_CONFIG";

/// Bounds applied to every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLimits {
    /// Largest accepted worker count.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Largest accepted per-worker hour budget.
    #[serde(default = "default_max_working_hours")]
    pub max_working_hours: u32,
    /// Largest accepted total unit count across all lines.
    #[serde(default = "default_max_units")]
    pub max_units: u64,
}

fn default_max_workers() -> usize {
    1000
}

fn default_max_working_hours() -> u32 {
    24
}

fn default_max_units() -> u64 {
    100_000
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            max_working_hours: default_max_working_hours(),
            max_units: default_max_units(),
        }
    }
}

/// Everything the engine needs besides the request itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub limits: RequestLimits,
    #[serde(rename = "task_types", default = "Catalog::standard")]
    pub catalog: Catalog,
    #[serde(default = "ReservationPolicy::standard")]
    pub reservations: ReservationPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            limits: RequestLimits::default(),
            catalog: Catalog::standard(),
            reservations: ReservationPolicy::standard(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(src: &str) -> Result<Self> {
        let config: Self = toml::from_str(src)?;
        validate_config(&config).map_err(Error::InvalidConfig)?;
        Ok(config)
    }

    /// Loads configuration from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading engine config");
        let config = Self::from_toml_str(&fs::read_to_string(path)?)?;
        debug!(
            task_types = config.catalog.len(),
            rules = config.reservations.rules().len(),
            "engine config loaded"
        );
        Ok(config)
    }

    /// Loads from `path`, else from `U_CASELOAD_CONFIG`, else the default.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        match path {
            Some(p) => Self::load(&p),
            None => {
                debug!("no config file given, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Renders the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
