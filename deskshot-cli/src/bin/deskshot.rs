//! Standalone CLI tool that saves all connected displays as one PNG.
//!
//! Exit codes: `0` ok, `2` output directory, `3` capture, `4` output file,
//! `5` encoding.  Argument errors use clap's own status and usage output.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use deskshot_core::config::RunConfig;
use deskshot_core::errors::DeskshotError;
use deskshot_core::platform::NativeBackend;

#[derive(Parser)]
#[command(
    name = "deskshot",
    version,
    about = "Capture every display into a single PNG of the virtual desktop"
)]
struct Args {
    /// Output PNG path (default: screenshot_<YYYYMMDD_HHMMSS>.png in the current dir)
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: Option<PathBuf>,
}

fn capture(config: &RunConfig) -> Result<deskshot_core::run::RunSummary, DeskshotError> {
    let backend = NativeBackend::new().map_err(DeskshotError::Enumeration)?;
    deskshot_core::run::run(config, &backend)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let started_at = chrono::Local::now();
    let args = Args::parse();
    let config = RunConfig::from_cli(args.output, started_at);
    log::debug!("run config: {config:?}");

    match capture(&config) {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            let prefix = if e.is_capture_failure() {
                "capture failed: "
            } else {
                ""
            };
            eprintln!("{prefix}{e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
