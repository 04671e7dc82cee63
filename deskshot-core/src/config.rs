//! Immutable run configuration.
//!
//! Everything process-wide the run depends on (the invocation timestamp
//! and the output path derived from it) is read once up front and carried
//! in a [`RunConfig`].

use std::path::PathBuf;

use chrono::{DateTime, Local};

/// `strftime` pattern for the timestamp in default file names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// File name used when no output path is given: `screenshot_<timestamp>.png`.
pub fn default_filename(at: &DateTime<Local>) -> String {
    format!("screenshot_{}.png", at.format(TIMESTAMP_FORMAT))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Where the PNG is written.  Relative paths resolve against the
    /// current working directory.
    pub output: PathBuf,
    /// Invocation start time.
    pub started_at: DateTime<Local>,
}

impl RunConfig {
    /// Build the configuration from the parsed `-o` value and the clock
    /// reading taken at startup.
    ///
    /// An absent or empty output path selects [`default_filename`] in the
    /// current directory.
    pub fn from_cli(output: Option<PathBuf>, started_at: DateTime<Local>) -> Self {
        let output = output
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(default_filename(&started_at)));
        Self { output, started_at }
    }
}
