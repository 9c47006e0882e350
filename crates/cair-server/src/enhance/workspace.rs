//! Workspace guard: every filesystem path the enhance service touches is
//! resolved here first.
//!
//! Paths are canonicalized (symlinks resolved) before the prefix check. When
//! the target does not exist, the lexically normalized path decides between
//! `PathEscape` and `NotFound`, so probing outside the root never reports
//! whether something exists there.

use std::path::{Component, Path, PathBuf};

use cair_core::ErrorKind;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("Invalid workspace: {reason}")]
    Invalid { reason: String },

    #[error("Access denied")]
    PathEscape { requested: String },

    #[error("Not found: {requested}")]
    NotFound { requested: String },

    #[error("Not a directory: {requested}")]
    NotADirectory { requested: String },

    #[error("Is a directory: {requested}")]
    IsADirectory { requested: String },

    #[error("File too large: {requested} ({size} bytes, limit {limit})")]
    TooLarge {
        requested: String,
        size: u64,
        limit: u64,
    },

    #[error("I/O error on {requested}: {source}")]
    Io {
        requested: String,
        #[source]
        source: std::io::Error,
    },
}

impl WorkspaceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PathEscape { .. } => ErrorKind::PathEscape,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Io { .. } => ErrorKind::Upstream,
            Self::Invalid { .. }
            | Self::NotADirectory { .. }
            | Self::IsADirectory { .. }
            | Self::TooLarge { .. } => ErrorKind::Input,
        }
    }

    pub(crate) fn io(requested: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound {
                requested: requested.to_string(),
            }
        } else {
            Self::Io {
                requested: requested.to_string(),
                source,
            }
        }
    }
}

/// A canonical, existing directory root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Open a workspace root. Must be absolute and an existing directory.
    pub fn open(raw: impl AsRef<Path>) -> Result<Self, WorkspaceError> {
        let raw = raw.as_ref();
        if raw.as_os_str().is_empty() || !raw.is_absolute() {
            return Err(WorkspaceError::Invalid {
                reason: format!("'{}' is not an absolute path", raw.display()),
            });
        }

        let root = std::fs::canonicalize(raw).map_err(|e| WorkspaceError::Invalid {
            reason: format!("'{}': {}", raw.display(), e),
        })?;
        if !root.is_dir() {
            return Err(WorkspaceError::Invalid {
                reason: format!("'{}' is not a directory", raw.display()),
            });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `requested` (relative to the root) to a canonical path under it.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf, WorkspaceError> {
        let rel = if requested.trim().is_empty() {
            "."
        } else {
            requested
        };
        let candidate = self.root.join(rel);

        match std::fs::canonicalize(&candidate) {
            Ok(real) if real.starts_with(&self.root) => Ok(real),
            Ok(real) => {
                warn!(
                    requested,
                    resolved = %real.display(),
                    root = %self.root.display(),
                    "path escapes workspace"
                );
                Err(WorkspaceError::PathEscape {
                    requested: requested.to_string(),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if normalize_lexically(&candidate).starts_with(&self.root) {
                    Err(WorkspaceError::NotFound {
                        requested: requested.to_string(),
                    })
                } else {
                    warn!(requested, root = %self.root.display(), "path escapes workspace");
                    Err(WorkspaceError::PathEscape {
                        requested: requested.to_string(),
                    })
                }
            }
            Err(e) => Err(WorkspaceError::io(requested, e)),
        }
    }

    /// Display form of a path under the root, using `/` separators.
    pub fn relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if parts.is_empty() {
            ".".to_string()
        } else {
            parts.join("/")
        }
    }
}

/// Resolve `.` and `..` without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                clean.pop();
            }
            other => clean.push(other),
        }
    }
    clean
}
