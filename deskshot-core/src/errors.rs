//! Error types for `deskshot_core`.
//!
//! Platform backends report failures through [`BackendError`]; the
//! compositor and writer lift those into [`DeskshotError`], which carries
//! enough context (display index, path) for a useful message and maps each
//! failure class to a process exit code.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure raised by a [`crate::backend::DisplayBackend`] implementation.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// OS capture / enumeration API failure.
    #[error("platform error: {0}")]
    Platform(String),

    /// `bounds_of` or `capture_rect` asked about a display that does not exist.
    #[error("display index {index} out of range; {count} display(s) enumerated")]
    IndexOutOfRange { index: usize, count: usize },

    /// The backend cannot serve this request (e.g. a rectangle spanning
    /// two monitors on a per-monitor API).
    #[error("unsupported request: {0}")]
    Unsupported(String),
}

/// Top-level error type for a capture run.
///
/// Each variant corresponds to one failure stage of the run and maps to a
/// distinct exit code via [`DeskshotError::exit_code`].
#[derive(Debug, Error)]
pub enum DeskshotError {
    /// Enumeration succeeded but reported zero usable displays.
    #[error("no active displays detected")]
    NoDisplays,

    /// Display enumeration itself failed.
    #[error("display enumeration failed: {0}")]
    Enumeration(#[source] BackendError),

    /// The displays' bounding box is too large to allocate as one canvas.
    #[error("virtual desktop too large: {0}")]
    DesktopTooLarge(String),

    /// Capturing a single display failed; the whole run is aborted.
    #[error("capture display {index}: {source}")]
    Capture {
        index: usize,
        #[source]
        source: BackendError,
    },

    /// The directory that should hold the output file could not be created.
    #[error("create output dir {}: {source}", .path.display())]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The output file could not be created or finalized.
    #[error("create file {}: {source}", .path.display())]
    FileCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// PNG encoding (or flushing the encoded bytes) failed.
    #[error("encode png: {0}")]
    Encode(String),
}

impl DeskshotError {
    /// Process exit status for this failure.
    ///
    /// `2` directory, `3` capture (including no displays), `4` file, `5` encode.
    pub fn exit_code(&self) -> i32 {
        match self {
            DeskshotError::DirectoryCreate { .. } => 2,
            DeskshotError::NoDisplays
            | DeskshotError::Enumeration(_)
            | DeskshotError::DesktopTooLarge(_)
            | DeskshotError::Capture { .. } => 3,
            DeskshotError::FileCreate { .. } => 4,
            DeskshotError::Encode(_) => 5,
        }
    }

    /// True for failures in the enumerate / capture stage.
    pub fn is_capture_failure(&self) -> bool {
        self.exit_code() == 3
    }
}

impl From<image::ImageError> for DeskshotError {
    fn from(err: image::ImageError) -> Self {
        DeskshotError::Encode(err.to_string())
    }
}
