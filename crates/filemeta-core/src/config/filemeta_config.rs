//! Top-level filemeta settings with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{GateSettings, PolicySettings};
use crate::checks::parse_flag;
use crate::constants::PROJECT_CONFIG_FILE;
use crate::errors::ConfigError;

/// All settings.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`FILEMETA_*`)
/// 3. Project settings (`filemeta.toml` in the repository root)
/// 4. User settings (`~/.filemeta/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct FilemetaConfig {
    pub policy: PolicySettings,
    pub gate: GateSettings,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub pattern_files: Option<Vec<String>>,
    pub default_syntax: Option<String>,
    pub mandatory: Option<Vec<String>>,
    pub fail_fast: Option<bool>,
}

impl FilemetaConfig {
    /// Resolve settings for the repository at `root`.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(user_path) = Self::user_config_path() {
            if user_path.is_file() {
                Self::merge_toml_file(&mut config, &user_path)?;
            }
        }

        let project_path = root.join(PROJECT_CONFIG_FILE);
        if project_path.is_file() {
            Self::merge_toml_file(&mut config, &project_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        config.validate()?;
        tracing::debug!(
            pattern_files = ?config.policy.effective_pattern_files(),
            mandatory = ?config.gate.mandatory,
            "settings resolved"
        );
        Ok(config)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Reject unknown syntax keywords, unknown check names, and empty file names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.effective_default_syntax()?;
        self.gate.mandatory_kinds()?;
        if self.policy.pattern_files.iter().any(|f| f.trim().is_empty()) {
            return Err(ConfigError::InvalidSetting {
                field: "policy.pattern_files".to_string(),
                message: "file names must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    fn user_config_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(|home| PathBuf::from(home).join(".filemeta").join("config.toml"))
    }

    fn merge_toml_file(config: &mut FilemetaConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let file_config: FilemetaConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.merge(file_config);
        Ok(())
    }

    /// Values present in `other` replace those in `self`.
    fn merge(&mut self, other: FilemetaConfig) {
        if !other.policy.pattern_files.is_empty() {
            self.policy.pattern_files = other.policy.pattern_files;
        }
        if other.policy.default_syntax.is_some() {
            self.policy.default_syntax = other.policy.default_syntax;
        }
        if !other.gate.mandatory.is_empty() {
            self.gate.mandatory = other.gate.mandatory;
        }
        if other.gate.fail_fast.is_some() {
            self.gate.fail_fast = other.gate.fail_fast;
        }
    }

    /// `FILEMETA_PATTERN_FILES` and `FILEMETA_MANDATORY` are comma lists.
    fn apply_env_overrides(config: &mut FilemetaConfig) {
        if let Ok(val) = std::env::var("FILEMETA_PATTERN_FILES") {
            config.policy.pattern_files = split_list(&val);
        }
        if let Ok(val) = std::env::var("FILEMETA_DEFAULT_SYNTAX") {
            config.policy.default_syntax = Some(val.trim().to_string());
        }
        if let Ok(val) = std::env::var("FILEMETA_MANDATORY") {
            config.gate.mandatory = split_list(&val);
        }
        if let Ok(val) = std::env::var("FILEMETA_FAIL_FAST") {
            config.gate.fail_fast = Some(parse_flag(&val));
        }
    }

    fn apply_cli_overrides(config: &mut FilemetaConfig, cli: &CliOverrides) {
        if let Some(ref files) = cli.pattern_files {
            config.policy.pattern_files = files.clone();
        }
        if let Some(ref syntax) = cli.default_syntax {
            config.policy.default_syntax = Some(syntax.clone());
        }
        if let Some(ref mandatory) = cli.mandatory {
            config.gate.mandatory = mandatory.clone();
        }
        if let Some(v) = cli.fail_fast {
            config.gate.fail_fast = Some(v);
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
