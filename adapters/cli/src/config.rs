use std::{fs, path::Path};

use anyhow::{Context, Result};
use arrow_heart_core::SilhouetteMask;
use arrow_heart_system_generation::GenerationTuning;
use arrow_heart_system_session::STARTING_LIVES;
use serde::Deserialize;

/// Settings read from the optional TOML configuration file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CliConfig {
    /// Generator budgets and curve bias.
    pub(crate) generation: GenerationTuning,
    /// Lives granted at the start of each level.
    pub(crate) lives: u8,
    /// Custom silhouette; the heart is used when absent.
    pub(crate) mask: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            generation: GenerationTuning::default(),
            lives: STARTING_LIVES,
            mask: None,
        }
    }
}

impl CliConfig {
    /// Loads the configuration at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid config at {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse config toml")?;
        config
            .generation
            .validate()
            .context("invalid [generation] tuning")?;
        Ok(config)
    }

    /// Silhouette the session plays on.
    pub(crate) fn silhouette(&self) -> Result<SilhouetteMask> {
        match &self.mask {
            Some(text) => SilhouetteMask::parse(text).context("invalid mask in config"),
            None => Ok(SilhouetteMask::heart()),
        }
    }
}
