//! `deskshot_core` -- capture every display into one virtual-desktop image.
//!
//! The library owns all logic; the `deskshot` binary in `deskshot-cli` only
//! parses arguments and maps errors to exit codes.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`errors`] | `DeskshotError` / `BackendError` via `thiserror`, exit codes |
//! | [`geometry`] | `Rect` in virtual desktop coordinates, union / bounding box |
//! | [`backend`] | `DisplayBackend` capability trait and `MockBackend` |
//! | [`platform`] | GDI (Windows) and `xcap` (elsewhere) backends, `NativeBackend` |
//! | [`compositor`] | enumerate, capture and blit into a `Canvas` |
//! | [`output`] | PNG encoding and atomic file writing via `image` + `tempfile` |
//! | [`config`] | immutable `RunConfig`, default timestamped file name |
//! | [`run`] | one full invocation from config to `RunSummary` |
//!
//! # Examples
//!
//! ```no_run
//! use deskshot_core::{config::RunConfig, platform::NativeBackend, run::run};
//!
//! let config = RunConfig::from_cli(None, chrono::Local::now());
//! let backend = NativeBackend::new().expect("monitor enumeration failed");
//! let summary = run(&config, &backend).expect("capture failed");
//! println!("{summary}");
//! ```

pub mod backend;
pub mod compositor;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod output;
pub mod platform;
pub mod run;
