use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::builders::importer::{DEFAULT_IGNOREFILE, ignorefile_name};

/// Options for one matching call.
///
/// Every field has a default, so a config file only needs to name what it
/// changes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct MatchesOptions {
    /// Ignorefile name, similar to `.gitignore`, `.dockerignore` or
    /// `chefignore`. Empty means `.xignore`.
    pub ignorefile: String,
    /// Apply ignorefiles found in subdirectories.
    pub nested: bool,
    /// Rules evaluated before the ignorefile's own; the lowest precedence.
    pub before_patterns: Vec<String>,
    /// Rules evaluated after the ignorefile's own; the highest precedence.
    pub after_patterns: Vec<String>,
}

impl Default for MatchesOptions {
    fn default() -> Self {
        Self {
            ignorefile: DEFAULT_IGNOREFILE.to_string(),
            nested: false,
            before_patterns: Vec::new(),
            after_patterns: Vec::new(),
        }
    }
}

impl MatchesOptions {
    pub fn new(ignorefile: impl Into<String>) -> Self {
        Self {
            ignorefile: ignorefile.into(),
            ..Self::default()
        }
    }

    pub fn nested(mut self, nested: bool) -> Self {
        self.nested = nested;
        self
    }

    pub fn before_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.before_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn after_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.after_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// The ignorefile name with the default applied.
    pub fn effective_ignorefile(&self) -> &str {
        ignorefile_name(&self.ignorefile)
    }
}

pub trait ConfigProvider {
    fn load_config(&self) -> Result<MatchesOptions>;
    fn save_config(&self, config: &MatchesOptions) -> Result<()>;
}

/// Reads and writes `MatchesOptions` as a TOML file.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Writes a default config file unless one already exists.
    ///
    /// # Returns
    /// `true` when a file was written.
    pub fn initialize(&self) -> Result<bool> {
        if self.config_path.exists() {
            return Ok(false);
        }

        let default_config = MatchesOptions::default();
        self.save_config(&default_config)?;
        Ok(true)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Loads a config file the user named explicitly. Unlike `load_config`,
    /// a missing file is an error.
    pub fn load_required(&self) -> Result<MatchesOptions> {
        if !self.config_path.exists() {
            bail!("Config file {} does not exist", self.config_path().display());
        }
        self.load_config()
    }
}

impl ConfigProvider for ConfigManager {
    fn load_config(&self) -> Result<MatchesOptions> {
        if !self.config_path.exists() {
            return Ok(MatchesOptions::default());
        }

        let content = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file {}", self.config_path.display())
        })?;

        toml::from_str(&content).with_context(|| {
            format!("Failed to parse config file {}", self.config_path.display())
        })
    }

    fn save_config(&self, config: &MatchesOptions) -> Result<()> {
        let content = toml::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, content).with_context(|| {
            format!("Failed to write config file {}", self.config_path.display())
        })?;

        Ok(())
    }
}
