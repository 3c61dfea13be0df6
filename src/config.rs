//! Configuration file for codelens.
//!
//! Every field is optional; an empty file yields the defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::detect::ComplexityThresholds;

/// Default configuration file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["codelens.yaml", ".codelens.yaml"];

/// Files larger than this are skipped unless configured otherwise.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1024 * 1024;

/// The default configuration, as written by `codelens init`.
pub const DEFAULT_TEMPLATE: &str = include_str!("templates/default.yaml");

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub version: String,
    /// Glob patterns for paths to exclude from analysis (e.g., "**/dist/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    /// Whether to descend into hidden directories (default: false)
    #[serde(default)]
    pub include_hidden: bool,
    #[serde(default)]
    pub complexity: ComplexityThresholds,
    #[serde(default)]
    pub security: SecurityConfig,
    /// Minimum acceptable health score.
    #[serde(default)]
    pub threshold: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: String::new(),
            excluded_paths: Vec::new(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            include_hidden: false,
            complexity: ComplexityThresholds::default(),
            security: SecurityConfig::default(),
            threshold: None,
        }
    }
}

fn default_max_file_bytes() -> u64 {
    DEFAULT_MAX_FILE_BYTES
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecurityConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        // serde_yaml rejects an empty document
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    /// Uses globset for matching, which supports `**` for recursive directory matching.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();

        for pattern in &self.excluded_paths {
            if let Ok(glob) = globset::Glob::new(pattern) {
                let matcher = glob.compile_matcher();
                if matcher.is_match(&*path_str) {
                    return true;
                }
            }
        }
        false
    }
}

/// Look for a configuration file in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Load the configuration at `path`, or the discovered one, or the defaults.
pub fn load(path: Option<&Path>, dir: &Path) -> anyhow::Result<(Config, Option<PathBuf>)> {
    let path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => discover(dir),
    };
    let config = match &path {
        Some(p) => Config::parse_file(p)
            .map_err(|e| anyhow::anyhow!("parsing config {}: {}", p.display(), e))?,
        None => Config::default(),
    };
    validate(&config)?;
    Ok((config, path))
}

/// Validate a configuration for semantic correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    let c = &config.complexity;
    if c.medium < 0 || c.medium >= c.high {
        anyhow::bail!(
            "invalid complexity thresholds: medium ({}) must be non-negative and below high ({})",
            c.medium,
            c.high
        );
    }

    if let Some(threshold) = config.threshold {
        if threshold > 100 {
            anyhow::bail!("invalid threshold {}, must be between 0 and 100", threshold);
        }
    }

    if config.max_file_bytes == 0 {
        anyhow::bail!("max_file_bytes must be greater than zero");
    }

    // Validate excluded_paths glob patterns compile
    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    Ok(())
}
