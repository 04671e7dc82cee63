//! One end-to-end invocation: directory, capture, encode.

use std::path::PathBuf;

use crate::backend::DisplayBackend;
use crate::compositor::capture_virtual_screen;
use crate::config::RunConfig;
use crate::errors::DeskshotError;
use crate::output::{ensure_parent_dir, write_png};

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Saved screenshot to {} ({}x{})",
            self.path.display(),
            self.width,
            self.height
        )
    }
}

/// Capture every display of `backend` and write the PNG named by `config`.
///
/// The output directory is created first; the output file is created only
/// after every display has been captured, so capture failures leave no file.
pub fn run(config: &RunConfig, backend: &dyn DisplayBackend) -> Result<RunSummary, DeskshotError> {
    ensure_parent_dir(&config.output)?;

    let canvas = capture_virtual_screen(backend)?;
    write_png(&canvas, &config.output)?;

    Ok(RunSummary {
        path: config.output.clone(),
        width: canvas.width(),
        height: canvas.height(),
    })
}
