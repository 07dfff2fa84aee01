//! Error types for the search engine.
//!
//! Errors fall into two groups. Pattern, root-directory, configuration and
//! worker-pool errors abort a search before any file is read. File access,
//! archive and markup errors are produced per file; the engine records them as
//! diagnostics and keeps going, so a single unreadable file never fails the
//! whole search.
//!
//! ```rust,ignore
//! match tripofob::search(&config) {
//!     Ok(report) => // Render report.file_results,
//!     Err(SearchError::InvalidPattern(msg)) => // Fix the pattern,
//!     Err(e) => // Report and stop
//! }
//! ```
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur during search operations
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Archive error in {path}: {message}")]
    Archive { path: PathBuf, message: String },
    #[error("Malformed worksheet markup in {path}: {message}")]
    Xml { path: PathBuf, message: String },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
    #[error("Export error: {0}")]
    Export(String),
}

/// Canonicalize the path and strip UNC prefixes so that
/// comparisons on Windows are consistent.
pub fn unify_path(original: &Path) -> PathBuf {
    let canonical = original
        .canonicalize()
        .unwrap_or_else(|_| original.to_path_buf());
    strip_unc_prefix(&canonical)
}

/// Strips the Windows UNC prefix (\\?\) from a path if present
fn strip_unc_prefix(p: &Path) -> PathBuf {
    let s = p.display().to_string();
    if let Some(stripped) = s.strip_prefix(r"\\?\") {
        PathBuf::from(stripped)
    } else {
        p.to_path_buf()
    }
}

impl SearchError {
    pub fn invalid_pattern(msg: impl Into<String>) -> Self {
        Self::InvalidPattern(msg.into())
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Self::NotADirectory(path.into())
    }

    pub fn archive(path: impl Into<PathBuf>, msg: impl ToString) -> Self {
        Self::Archive {
            path: path.into(),
            message: msg.to_string(),
        }
    }

    pub fn xml(path: impl Into<PathBuf>, msg: impl ToString) -> Self {
        Self::Xml {
            path: path.into(),
            message: msg.to_string(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn worker_pool(msg: impl ToString) -> Self {
        Self::WorkerPool(msg.to_string())
    }

    pub fn export(msg: impl ToString) -> Self {
        Self::Export(msg.to_string())
    }

    /// Maps an I/O error raised while opening `path` to the closest variant.
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::IoError(err),
        }
    }

    /// True for errors that are contained at a single file boundary.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound(_)
                | Self::PermissionDenied(_)
                | Self::IoError(_)
                | Self::Archive { .. }
                | Self::Xml { .. }
        )
    }
}
