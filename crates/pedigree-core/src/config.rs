//! Configuration for traversals and the simulated source.
//!
//! Values are layered with `figment`: built-in defaults, then an optional
//! TOML file, then `PEDIGREE_`-prefixed environment variables (nested keys
//! use `__`, e.g. `PEDIGREE_TRAVERSAL__BFS_WORKERS=8`).

use std::path::Path;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::traversal::{DEFAULT_BFS_WORKERS, LIMITED_BFS_WORKERS};

/// Default config file looked up by [`PedigreeConfig::load`].
pub const DEFAULT_CONFIG_FILE: &str = "pedigree.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "PEDIGREE_";

/// Worker-count settings for the breadth-first strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalSettings {
    /// Workers of the "as fast as possible" breadth-first run.
    pub bfs_workers: usize,
    /// Workers of the breadth-first run that caps concurrent calls.
    pub limited_bfs_workers: usize,
}

impl Default for TraversalSettings {
    fn default() -> Self {
        Self {
            bfs_workers: DEFAULT_BFS_WORKERS,
            limited_bfs_workers: LIMITED_BFS_WORKERS,
        }
    }
}

/// Settings of the simulated remote source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Fixed latency of every call, in milliseconds.
    pub latency_ms: u64,
    /// Seed of the pedigree generator.
    pub seed: u64,
    /// Upper bound of children per family (at least 1).
    pub max_children: usize,
    /// Probability that a couple shares one parent family.
    pub shared_ancestry: f64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            latency_ms: 250,
            seed: 0,
            max_children: 5,
            shared_ancestry: 0.0,
        }
    }
}

impl SourceSettings {
    /// Returns the per-call latency.
    #[must_use]
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default `tracing` filter directive; `RUST_LOG` takes precedence.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PedigreeConfig {
    /// Breadth-first worker counts.
    pub traversal: TraversalSettings,
    /// Simulated source.
    pub source: SourceSettings,
    /// Logging.
    pub logging: LoggingSettings,
}

impl PedigreeConfig {
    /// Loads defaults, `pedigree.toml` from the working directory if present,
    /// then the environment.
    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment(Path::new(DEFAULT_CONFIG_FILE)))
    }

    /// Like [`PedigreeConfig::load`] with an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        Self::from_figment(Self::figment(path))
    }

    /// Parses a TOML document layered over the defaults, without the environment.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Self::from_figment(
            Figment::from(Serialized::defaults(PedigreeConfig::default()))
                .merge(Toml::string(toml)),
        )
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(PedigreeConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        let config: PedigreeConfig = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.traversal.bfs_workers == 0 {
            return Err(Error::Config(
                "traversal.bfs_workers must be at least 1".to_string(),
            ));
        }
        if self.traversal.limited_bfs_workers == 0 {
            return Err(Error::Config(
                "traversal.limited_bfs_workers must be at least 1".to_string(),
            ));
        }
        if self.source.max_children == 0 {
            return Err(Error::Config(
                "source.max_children must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.source.shared_ancestry) {
            return Err(Error::Config(format!(
                "source.shared_ancestry must be within [0, 1], got {}",
                self.source.shared_ancestry
            )));
        }
        Ok(())
    }
}
