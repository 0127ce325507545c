use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a matching call.
///
/// Per-path failures during the walk or the final partitioning never surface
/// here; they are routed into the error lists of a `MatchesResult` instead.
#[derive(Debug, Error)]
pub enum MatchError {
    /// The base directory does not exist or is not a directory.
    #[error("base directory not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A rule could not be compiled. Classification of the whole scope would
    /// be undefined, so the call fails.
    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: GlobError,
    },

    /// A filesystem failure at a point where it cannot be recovered from,
    /// such as reading an ignorefile or testing a cascading directory.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MatchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Syntax errors in the glob dialect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GlobError {
    #[error("unterminated character class")]
    UnterminatedClass,
    #[error("trailing escape character")]
    TrailingEscape,
    #[error("invalid character range `{0}-{1}`")]
    InvalidRange(char, char),
    #[error("failed to compile glob: {0}")]
    Compile(String),
}

pub type Result<T, E = MatchError> = std::result::Result<T, E>;
