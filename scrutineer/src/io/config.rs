//! Per-project defaults stored in `scrutineer.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

/// File probed in the working directory (after `-C` has taken effect).
pub const CONFIG_FILE: &str = "scrutineer.toml";

/// Defaults for a project, intended to sit next to the recipe under audit.
///
/// Missing fields take the built-in defaults; command-line flags override
/// both.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build command; `{}` is replaced with the target name.
    pub build: String,
    /// Clean command, run verbatim.
    pub clean: String,
    /// Emit the aggregate `.PHONY:` declaration.
    pub phony: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            build: "make {}".to_string(),
            clean: "make clean".to_string(),
            phony: false,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.build.trim().is_empty() {
            return Err(anyhow!("build command must not be blank"));
        }
        if self.clean.trim().is_empty() {
            return Err(anyhow!("clean command must not be blank"));
        }
        Ok(())
    }
}

/// Load the config file, falling back to defaults when it is missing.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let config = Config::default();
        config.validate()?;
        return Ok(config);
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let config: Config =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    config.validate()?;
    Ok(config)
}
