//! Change sources backed by the working tree, the git index and git history.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use filemeta_core::engine::normalize_path;
use filemeta_core::errors::GateError;
use filemeta_core::gate::ChangeSource;
use git2::{Delta, DiffFindOptions, ErrorCode, Oid, Repository, RevparseMode};

/// Files on disk under `root`. The batch is the list of paths given.
#[derive(Debug, Clone)]
pub struct WorkTreeSource {
    root: PathBuf,
    paths: Vec<String>,
}

impl WorkTreeSource {
    /// Paths may be absolute (inside `root`) or relative to `root`.
    pub fn new(root: impl Into<PathBuf>, paths: &[PathBuf]) -> Self {
        let root = root.into();
        let paths = paths
            .iter()
            .map(|path| {
                let relative = path.strip_prefix(&root).unwrap_or(path);
                normalize_path(&relative.to_string_lossy())
            })
            .collect();
        Self { root, paths }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, path: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(self.root.join(path))
    }
}

impl ChangeSource for WorkTreeSource {
    fn changed_paths(&self) -> Result<Vec<String>, GateError> {
        Ok(self.paths.clone())
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, GateError> {
        self.read(path).map_err(|e| GateError::ReadFailed {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    fn policy_text(&self, path: &str) -> Result<Option<String>, GateError> {
        match self.read(path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GateError::ReadFailed {
                path: path.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

/// Staged changes: files added, modified, renamed or copied between `HEAD`
/// and the index. Content and policy files are read from the index.
pub struct GitIndexSource {
    repo: Mutex<Repository>,
    workdir: PathBuf,
}

impl GitIndexSource {
    /// Open the repository containing `path`.
    pub fn discover(path: &Path) -> Result<Self, GateError> {
        let (repo, workdir) = open_repository(path)?;
        Ok(Self {
            repo: Mutex::new(repo),
            workdir,
        })
    }

    /// Root of the working tree, where `filemeta.toml` lives.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn lock(&self) -> Result<MutexGuard<'_, Repository>, GateError> {
        self.repo
            .lock()
            .map_err(|_| GateError::SourceUnavailable("repository lock poisoned".to_string()))
    }

    fn staged_blob(&self, path: &str) -> Result<Option<Vec<u8>>, GateError> {
        let repo = self.lock()?;
        let index = repo.index().map_err(source_error)?;
        let Some(entry) = index.get_path(Path::new(path), 0) else {
            return Ok(None);
        };
        let blob = repo.find_blob(entry.id).map_err(|e| GateError::ReadFailed {
            path: path.to_string(),
            message: e.message().to_string(),
        })?;
        Ok(Some(blob.content().to_vec()))
    }
}

impl ChangeSource for GitIndexSource {
    fn changed_paths(&self) -> Result<Vec<String>, GateError> {
        let repo = self.lock()?;
        let head_tree = match repo.head() {
            Ok(head) => Some(head.peel_to_tree().map_err(source_error)?),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => None,
            Err(e) => return Err(source_error(e)),
        };
        let index = repo.index().map_err(source_error)?;
        let mut diff = repo
            .diff_tree_to_index(head_tree.as_ref(), Some(&index), None)
            .map_err(source_error)?;
        diff.find_similar(Some(DiffFindOptions::new().renames(true).copies(true)))
            .map_err(source_error)?;

        let paths = diff
            .deltas()
            .filter(|delta| {
                matches!(
                    delta.status(),
                    Delta::Added | Delta::Modified | Delta::Renamed | Delta::Copied
                )
            })
            .filter_map(|delta| delta.new_file().path())
            .map(|path| normalize_path(&path.to_string_lossy()))
            .collect::<Vec<_>>();
        tracing::debug!(staged = paths.len(), "staged changes listed");
        Ok(paths)
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, GateError> {
        self.staged_blob(path)?.ok_or_else(|| GateError::ReadFailed {
            path: path.to_string(),
            message: "not in the index".to_string(),
        })
    }

    fn policy_text(&self, path: &str) -> Result<Option<String>, GateError> {
        Ok(self
            .staged_blob(path)?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }
}

/// Every file touched by the commits in `<old>..<new>`, checked as it is at
/// `<new>`. Files that no longer exist at `<new>` are left out. Policy files
/// are read from `<new>` too.
pub struct GitRangeSource {
    repo: Mutex<Repository>,
    workdir: PathBuf,
    tip: Oid,
    paths: Vec<String>,
}

impl GitRangeSource {
    /// Open the repository containing `path` and walk `range`.
    pub fn discover(path: &Path, range: &str) -> Result<Self, GateError> {
        let (repo, workdir) = open_repository(path)?;
        let (tip, paths) = range_paths(&repo, range).map_err(source_error)?;
        tracing::debug!(range, tip = %tip, files = paths.len(), "revision range listed");
        Ok(Self {
            repo: Mutex::new(repo),
            workdir,
            tip,
            paths,
        })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn blob_at_tip(&self, path: &str) -> Result<Option<Vec<u8>>, GateError> {
        let repo = self
            .repo
            .lock()
            .map_err(|_| GateError::SourceUnavailable("repository lock poisoned".to_string()))?;
        let read_failed = |e: git2::Error| GateError::ReadFailed {
            path: path.to_string(),
            message: e.message().to_string(),
        };
        let tree = repo
            .find_commit(self.tip)
            .and_then(|commit| commit.tree())
            .map_err(source_error)?;
        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(read_failed(e)),
        };
        let blob = entry
            .to_object(&repo)
            .and_then(|object| object.peel_to_blob())
            .map_err(read_failed)?;
        Ok(Some(blob.content().to_vec()))
    }
}

impl ChangeSource for GitRangeSource {
    fn changed_paths(&self) -> Result<Vec<String>, GateError> {
        Ok(self.paths.clone())
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, GateError> {
        self.blob_at_tip(path)?.ok_or_else(|| GateError::ReadFailed {
            path: path.to_string(),
            message: "not in the tip revision".to_string(),
        })
    }

    fn policy_text(&self, path: &str) -> Result<Option<String>, GateError> {
        Ok(self
            .blob_at_tip(path)?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }
}

/// Resolve the tip of `range` and collect the paths its commits touch,
/// each commit diffed against its first parent.
fn range_paths(repo: &Repository, range: &str) -> Result<(Oid, Vec<String>), git2::Error> {
    let spec = repo.revparse(range)?;
    if !spec.mode().contains(RevparseMode::RANGE) {
        return Err(git2::Error::from_str("expected a range of the form <old>..<new>"));
    }
    let tip = spec
        .to()
        .ok_or_else(|| git2::Error::from_str("range has no end revision"))?
        .peel_to_commit()?;
    let tip_tree = tip.tree()?;

    let mut walk = repo.revwalk()?;
    walk.push_range(range)?;

    let mut touched = BTreeSet::new();
    for oid in walk {
        let commit = repo.find_commit(oid?)?;
        let parent_tree = match commit.parents().next() {
            Some(parent) => Some(parent.tree()?),
            None => None,
        };
        let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&commit.tree()?), None)?;
        for delta in diff.deltas() {
            if let Some(path) = delta.new_file().path() {
                touched.insert(path.to_path_buf());
            }
        }
    }

    let paths = touched
        .into_iter()
        .filter(|path| tip_tree.get_path(path).is_ok())
        .map(|path| normalize_path(&path.to_string_lossy()))
        .collect();
    Ok((tip.id(), paths))
}

fn open_repository(path: &Path) -> Result<(Repository, PathBuf), GateError> {
    let repo = Repository::discover(path).map_err(source_error)?;
    let workdir = repo
        .workdir()
        .map(Path::to_path_buf)
        .ok_or_else(|| GateError::SourceUnavailable("bare repository".to_string()))?;
    Ok((repo, workdir))
}

fn source_error(e: git2::Error) -> GateError {
    GateError::SourceUnavailable(e.message().to_string())
}
