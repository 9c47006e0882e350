//! Error types for the scoring pipeline.

use std::path::PathBuf;

/// Coarse error taxonomy shared by every service.
///
/// Services report the kind in structured error bodies so callers can branch
/// on it without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Input,
    Upstream,
    Timeout,
    NotReady,
    PathEscape,
    NotFound,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Upstream => "upstream",
            Self::Timeout => "timeout",
            Self::NotReady => "not_ready",
            Self::PathEscape => "path_escape",
            Self::NotFound => "not_found",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the core pipeline.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Query text was empty or whitespace only.
    #[error("query text must not be empty")]
    EmptyQuery,

    /// Vector width did not match the stage contract.
    #[error("{stage} expects a {expected}-wide vector, got {actual}")]
    InputShape {
        stage: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Judge weights are not loaded.
    #[error("judge not ready: {reason}")]
    NotReady { reason: String },

    /// Weights file exists but does not describe a usable network.
    #[error("invalid judge weights in {}: {reason}", path.display())]
    WeightsInvalid { path: PathBuf, reason: String },

    /// External embedder failed.
    #[error("embedder '{provider}' failed: {message}")]
    Embed { provider: String, message: String },

    /// I/O error while reading or writing weights.
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    /// Map onto the shared taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyQuery | Self::InputShape { .. } => ErrorKind::Input,
            Self::NotReady { .. } | Self::WeightsInvalid { .. } => ErrorKind::NotReady,
            Self::Embed { .. } => ErrorKind::Upstream,
            Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                ErrorKind::NotFound
            }
            Self::Io { .. } => ErrorKind::NotReady,
        }
    }

    pub(crate) fn shape(stage: &'static str, expected: usize, actual: usize) -> Self {
        Self::InputShape {
            stage,
            expected,
            actual,
        }
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_errors_are_input_kind() {
        let err = CoreError::shape("judge", 512, 3);
        assert_eq!(err.kind(), ErrorKind::Input);
        assert_eq!(err.to_string(), "judge expects a 512-wide vector, got 3");
    }

    #[test]
    fn weights_errors_are_not_ready() {
        let err = CoreError::WeightsInvalid {
            path: PathBuf::from("w.json"),
            reason: "bad".into(),
        };
        assert_eq!(err.kind(), ErrorKind::NotReady);
        assert_eq!(ErrorKind::PathEscape.as_str(), "path_escape");
    }
}
