//! Policy gate settings.

use serde::{Deserialize, Serialize};

use crate::checks::CheckKind;
use crate::errors::ConfigError;

/// `[gate]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GateSettings {
    /// Check names every matched file must carry, e.g. `["encoding"]`.
    pub mandatory: Vec<String>,
    /// Stop at the first rejected file. Default: true.
    pub fail_fast: Option<bool>,
}

impl GateSettings {
    /// Returns the effective fail-fast flag, defaulting to true.
    pub fn effective_fail_fast(&self) -> bool {
        self.fail_fast.unwrap_or(true)
    }

    /// Mandatory names resolved to check kinds.
    pub fn mandatory_kinds(&self) -> Result<Vec<CheckKind>, ConfigError> {
        self.mandatory
            .iter()
            .map(|name| {
                name.trim()
                    .parse::<CheckKind>()
                    .map_err(|e| ConfigError::InvalidSetting {
                        field: "gate.mandatory".to_string(),
                        message: e.to_string(),
                    })
            })
            .collect()
    }
}
