use std::path::PathBuf;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the application.
///
/// Only configuration-level problems surface here; per-file and per-class
/// failures are downgraded to [`crate::model::Diagnostic`] records instead.
#[derive(Debug)]
pub enum Error {
    InvalidProjectRoot(PathBuf),
    NoAppsDiscovered(PathBuf),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::InvalidProjectRoot(path) => {
                write!(f, "not a usable project root: {}", path.display())
            }
            Error::NoAppsDiscovered(path) => {
                write!(f, "no Django apps found under {}", path.display())
            }
        }
    }
}

impl std::error::Error for Error {}
