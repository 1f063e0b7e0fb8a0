//! Host collaborator: the changed files and their content.

use std::collections::BTreeMap;

use crate::errors::GateError;

/// What the gate needs from the host version-control system.
///
/// Implementations are shared across worker threads in aggregate mode.
pub trait ChangeSource: Sync {
    /// Repository-relative paths of the files in the batch.
    fn changed_paths(&self) -> Result<Vec<String>, GateError>;

    /// File content as of the revision being checked.
    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, GateError>;

    /// Text of a policy file at the same revision, `None` if it does not exist.
    fn policy_text(&self, path: &str) -> Result<Option<String>, GateError>;
}

/// In-memory change set.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    changed: Vec<String>,
    files: BTreeMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a changed file.
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let path = path.into();
        self.changed.push(path.clone());
        self.files.insert(path, content.into());
        self
    }

    /// Add a file that exists at the revision but is not part of the batch.
    pub fn with_unchanged(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    /// List a path as changed without giving it content, so reading it fails.
    pub fn with_missing(mut self, path: impl Into<String>) -> Self {
        self.changed.push(path.into());
        self
    }
}

impl ChangeSource for MemorySource {
    fn changed_paths(&self) -> Result<Vec<String>, GateError> {
        Ok(self.changed.clone())
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, GateError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| GateError::ReadFailed {
                path: path.to_string(),
                message: "no such file".to_string(),
            })
    }

    fn policy_text(&self, path: &str) -> Result<Option<String>, GateError> {
        Ok(self
            .files
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned()))
    }
}
