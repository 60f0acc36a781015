//! Error types for sidecar loading.

use std::path::PathBuf;

/// Errors raised while loading an EDL sidecar.
///
/// A missing sidecar is not an error; see [`crate::load_skip_ranges`].
#[derive(Debug, thiserror::Error)]
pub enum EdlError {
    /// The sidecar exists but could not be read.
    #[error("Failed to read EDL file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EdlError {
    /// Path of the sidecar that failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } => path,
        }
    }
}

/// Result type alias using [`EdlError`].
pub type Result<T> = std::result::Result<T, EdlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_path() {
        let err = EdlError::Io {
            path: PathBuf::from("/movies/foo.edl"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("foo.edl"));
        assert!(msg.contains("denied"));
        assert_eq!(err.path(), std::path::Path::new("/movies/foo.edl"));
    }
}
