//! Policy source settings.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PATTERN_FILE;
use crate::errors::ConfigError;
use crate::policy::SyntaxKind;

/// `[policy]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PolicySettings {
    /// Root-relative policy files, read in order. Default: `[".filemeta"]`.
    pub pattern_files: Vec<String>,
    /// Syntax in effect before the first `syntax:` line. Default: `relre`.
    pub default_syntax: Option<String>,
}

impl PolicySettings {
    pub fn effective_pattern_files(&self) -> Vec<String> {
        if self.pattern_files.is_empty() {
            vec![DEFAULT_PATTERN_FILE.to_string()]
        } else {
            self.pattern_files.clone()
        }
    }

    pub fn effective_default_syntax(&self) -> Result<SyntaxKind, ConfigError> {
        match self.default_syntax.as_deref() {
            None => Ok(SyntaxKind::default()),
            Some(token) => token.parse().map_err(|e: crate::errors::PatternError| {
                ConfigError::InvalidSetting {
                    field: "policy.default_syntax".to_string(),
                    message: e.to_string(),
                }
            }),
        }
    }
}
