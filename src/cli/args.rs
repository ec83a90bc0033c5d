//! Command line argument parsing.
//!
//! Arguments are turned into an immutable [`Settings`] once at startup.

use clap::Parser;
use std::path::PathBuf;

use crate::docker::image::config::{CONTAINER_MOUNT_TARGET, DEFAULT_CONTEXT_DIR, DEFAULT_NAMESPACE};
use crate::pipeline::Pipeline;
use crate::settings::Settings;

/// Containerized build-and-test runner
#[derive(Parser, Debug)]
#[command(
    name = "buildenv",
    version,
    about = "Builds the build environment image and runs the pipeline inside it",
    long_about = "Builds the <namespace>/buildenv image from the build context (mapping the host \
user into the image on Linux), then runs the pipeline steps in a container with the working \
directory mounted read-write, streaming all output.

Usage:
  buildenv
  buildenv --step 'cargo test' --step 'cargo build --release'
  buildenv --dry-run

Exit code 0 = image built and every pipeline step succeeded."
)]
pub struct Args {
    /// Project namespace used for the image tag and the container name
    #[arg(long, env = "BUILDENV_NAMESPACE", default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Image reference to build and run (defaults to <namespace>/buildenv:0.1)
    #[arg(long, env = "BUILDENV_IMAGE_TAG", value_name = "TAG")]
    pub image_tag: Option<String>,

    /// Build context directory, relative to the host directory
    #[arg(long, env = "BUILDENV_CONTEXT", value_name = "DIR", default_value = DEFAULT_CONTEXT_DIR)]
    pub context: PathBuf,

    /// Host directory mounted into the container (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub host_dir: Option<PathBuf>,

    /// Container path the host directory is mounted at
    #[arg(long, value_name = "PATH", default_value = CONTAINER_MOUNT_TARGET)]
    pub mount_target: String,

    /// Pipeline step, repeatable; steps run in order and stop at the first failure
    #[arg(long = "step", value_name = "COMMAND")]
    pub steps: Vec<String>,

    /// Suffix the container name with a unique run id
    #[arg(long)]
    pub unique_name: bool,

    /// Print the resolved plan without contacting Docker
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Builds the run settings, defaulting the host directory to the current directory.
    pub fn to_settings(&self) -> std::io::Result<Settings> {
        let host_dir = match &self.host_dir {
            Some(dir) => std::path::absolute(dir)?,
            None => std::env::current_dir()?,
        };

        let mut settings = Settings::new(&self.namespace, host_dir)
            .with_context_dir(&self.context)
            .with_mount_target(self.mount_target.clone());

        if let Some(tag) = &self.image_tag {
            settings = settings.with_image_tag(tag.clone());
        }
        if !self.steps.is_empty() {
            settings = settings.with_pipeline(Pipeline::new(self.steps.iter().cloned()));
        }
        if self.unique_name {
            settings = settings.with_unique_name();
        }

        Ok(settings)
    }
}
