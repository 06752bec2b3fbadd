//! Configuration file support
//!
//! Loads settings from ~/.spectral.toml (or %USERPROFILE%\.spectral.toml on Windows)
//!
//! Example:
//! ```text
//! # spectral configuration
//! global-class = "hl"
//! rules-per-yield = 4
//! time-slice-ms = 8
//! max-depth = 16
//! language-dirs = ["~/.config/spectral/languages"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::error::{HighlightError, Result};
use crate::syntax::DEFAULT_MAX_DEPTH;

/// Configuration settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Class appended to every generated span
    pub global_class: Option<String>,
    /// Rules applied between yields (0 = only yield on time slice, and
    /// falls back to 1 when no time slice is set)
    pub rules_per_yield: usize,
    /// Longest stretch of work between yields
    pub time_slice: Option<Duration>,
    /// Bound on nested group delegation
    pub max_depth: usize,
    /// Directories of TOML language files loaded at startup
    pub language_dirs: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            global_class: None,
            rules_per_yield: 1,
            time_slice: None,
            max_depth: DEFAULT_MAX_DEPTH,
            language_dirs: Vec::new(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(windows)]
        {
            std::env::var("USERPROFILE")
                .ok()
                .map(|home| PathBuf::from(home).join(".spectral.toml"))
        }

        #[cfg(not(windows))]
        {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".spectral.toml"))
        }
    }

    /// Load configuration from the default path
    ///
    /// A missing file gives the defaults; a broken one is reported and
    /// ignored.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path).unwrap_or_else(|e| {
                warn!("ignoring {}: {}", path.display(), e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse config file contents
    pub fn parse(contents: &str) -> Result<Self> {
        let table: toml::Table = contents
            .parse()
            .map_err(|e: toml::de::Error| HighlightError::Config(e.message().to_string()))?;
        let mut config = Config::default();
        config.apply(&table)?;
        Ok(config)
    }

    /// Apply settings from a parsed table
    fn apply(&mut self, settings: &toml::Table) -> Result<()> {
        if let Some(value) = settings.get("global-class") {
            let class = expect_str(value, "global-class")?.trim();
            self.global_class = (!class.is_empty()).then(|| class.to_string());
        }

        if let Some(value) = settings.get("rules-per-yield") {
            let n = expect_int(value, "rules-per-yield")?;
            self.rules_per_yield = n.clamp(0, 10_000) as usize;
        }

        if let Some(value) = settings.get("time-slice-ms") {
            let ms = expect_int(value, "time-slice-ms")?;
            self.time_slice = (ms > 0).then(|| Duration::from_millis(ms.min(60_000) as u64));
        }

        if let Some(value) = settings.get("max-depth") {
            let n = expect_int(value, "max-depth")?;
            self.max_depth = n.clamp(1, 64) as usize; // Between 1 and 64
        }

        if let Some(value) = settings.get("language-dirs") {
            let dirs = value
                .as_array()
                .ok_or_else(|| HighlightError::Config("language-dirs must be an array".to_string()))?;
            self.language_dirs = dirs
                .iter()
                .map(|dir| expect_str(dir, "language-dirs").map(expand_home))
                .collect::<Result<_>>()?;
        }

        Ok(())
    }
}

fn expect_str<'a>(value: &'a toml::Value, key: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| HighlightError::Config(format!("{} must be a string", key)))
}

fn expect_int(value: &toml::Value, key: &str) -> Result<i64> {
    value
        .as_integer()
        .ok_or_else(|| HighlightError::Config(format!("{} must be an integer", key)))
}

/// Expand a leading `~/` against the home directory
fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => Config::config_path()
            .and_then(|p| p.parent().map(|home| home.join(rest)))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
