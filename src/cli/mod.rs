//! Command line interface for the build environment runner.
//!
//! Parses arguments into [`Settings`](crate::settings::Settings), then either
//! prints the resolved plan (`--dry-run`) or drives the orchestrator against
//! the local Docker daemon.

mod args;

pub use args::Args;

use crate::docker::{DockerEngine, check_engine_available};
use crate::error::Result;
use crate::orchestrator::{Orchestrator, Plan};
use crate::platform::{PlatformProfile, ProcessIdentity};
use crate::relay::LoggerSink;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let settings = args.to_settings()?;
    let sink = LoggerSink;
    let profile = PlatformProfile::detect();

    if args.dry_run {
        Plan::resolve(&settings, profile, &ProcessIdentity)?.emit(&sink);
        return Ok(0);
    }

    let engine = DockerEngine::connect()?;
    check_engine_available(&engine).await?;

    Orchestrator::new(&engine, &settings, &sink)
        .run(profile, &ProcessIdentity)
        .await?;
    Ok(0)
}
