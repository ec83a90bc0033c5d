//! Docker container execution and output streaming.

use std::path::PathBuf;

use futures_lite::StreamExt;

use super::engine::{ContainerEngine, MountMode, RunSpec, VolumeBinding};
use crate::error::{Error, Result};
use crate::pipeline::Pipeline;
use crate::relay::{LogSink, emit_raw};

/// Exit status of a finished container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerExit {
    /// Exit code reported by the engine; `None` when it could not be observed
    pub status_code: Option<i64>,
}

impl ContainerExit {
    pub fn succeeded(&self) -> bool {
        self.status_code == Some(0)
    }
}

/// Runs the build pipeline in a single auto-removed container.
#[derive(Debug, Clone)]
pub struct ContainerRunner {
    image_tag: String,
    container_name: String,
    host_dir: PathBuf,
    mount_target: String,
}

impl ContainerRunner {
    /// Creates a new container runner.
    ///
    /// # Arguments
    ///
    /// * `image_tag` - Image to start the container from
    /// * `container_name` - Container name
    /// * `host_dir` - Host directory bound read-write into the container
    /// * `mount_target` - Container path of the mount, also the working directory
    pub fn new(
        image_tag: impl Into<String>,
        container_name: impl Into<String>,
        host_dir: impl Into<PathBuf>,
        mount_target: impl Into<String>,
    ) -> Self {
        Self {
            image_tag: image_tag.into(),
            container_name: container_name.into(),
            host_dir: host_dir.into(),
            mount_target: mount_target.into(),
        }
    }

    /// Builds the run request: one read-write bind of the host directory, detached, auto-removed.
    pub fn run_spec(&self, pipeline: &Pipeline) -> RunSpec {
        RunSpec {
            image: self.image_tag.clone(),
            name: self.container_name.clone(),
            volume_bindings: vec![VolumeBinding {
                host_path: self.host_dir.clone(),
                container_path: self.mount_target.clone(),
                mode: MountMode::ReadWrite,
            }],
            working_dir: self.mount_target.clone(),
            command: pipeline.compose(),
            detach: true,
            auto_remove: true,
        }
    }

    /// Starts the container and relays its output until the stream ends.
    ///
    /// Blocks for the container's whole lifetime. Engine errors from the run
    /// or from the output stream are returned as [`Error::Run`].
    pub async fn run_pipeline<E: ContainerEngine>(
        &self,
        engine: &E,
        pipeline: &Pipeline,
        sink: &dyn LogSink,
    ) -> Result<ContainerExit> {
        let spec = self.run_spec(pipeline);
        log::debug!("running `{}` in {}", spec.command, spec.name);

        let mut handle = engine.run_container(&spec).await.map_err(Error::Run)?;

        while let Some(chunk) = handle.output.next().await {
            let chunk = chunk.map_err(Error::Run)?;
            emit_raw(sink, &chunk);
        }

        let status_code = handle.exit.await;
        Ok(ContainerExit { status_code })
    }
}
