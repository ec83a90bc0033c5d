//! [`ContainerEngine`] backed by the Docker Engine API.

use std::collections::HashMap;
use std::future::Future;

use bollard::Docker;
use bollard::container::{
    Config, CreateContainerOptions, LogOutput, LogsOptions, StartContainerOptions,
    WaitContainerOptions,
};
use bollard::image::BuildImageOptions;
use bollard::models::{BuildInfo, HostConfig};
use futures_lite::{StreamExt, stream};

use super::context::pack_context;
use super::engine::{
    BuildFailure, BuildRequest, ContainerEngine, ContainerHandle, EngineError, ExitFuture,
    LogRecord, RecordStream, RunSpec,
};
use super::image::config::DOCKERFILE_NAME;

/// Wait condition for auto-removed containers: resolves once the daemon has deleted it
const WAIT_CONDITION_REMOVED: &str = "removed";

/// Docker daemon connection.
#[derive(Debug, Clone)]
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    /// Connects using the local defaults (`DOCKER_HOST` or the platform socket).
    pub fn connect() -> Result<Self, EngineError> {
        Ok(Self {
            docker: Docker::connect_with_local_defaults()?,
        })
    }

    pub fn docker(&self) -> &Docker {
        &self.docker
    }
}

/// Maps one daemon build record to a [`LogRecord`] or a [`BuildFailure`].
fn decode_build_info(info: BuildInfo) -> Result<LogRecord, EngineError> {
    if let Some(message) = info.error_detail.and_then(|detail| detail.message) {
        return Err(build_failure(message));
    }
    let aux_id = info.aux.and_then(|aux| aux.id);
    Ok(LogRecord::decode(info.stream.as_deref(), aux_id.as_deref()))
}

/// The daemon's error text travels in the failure log so it is relayed with the build output.
fn build_failure(message: String) -> EngineError {
    EngineError::Build(BuildFailure {
        log: vec![LogRecord::Stream(message.clone())],
        message,
    })
}

impl ContainerEngine for DockerEngine {
    fn build_image<'a>(&'a self, request: &BuildRequest) -> RecordStream<'a, LogRecord> {
        let body = match pack_context(&request.context_path) {
            Ok(body) => body,
            Err(e) => return stream::once(Err(EngineError::Io(e))).boxed(),
        };

        let options = BuildImageOptions {
            dockerfile: DOCKERFILE_NAME.to_string(),
            t: request.image_tag.clone(),
            buildargs: request
                .build_args
                .as_ref()
                .map(|args| args.to_map())
                .unwrap_or_else(HashMap::new),
            rm: true,
            ..Default::default()
        };

        log::debug!(
            "building {} from {} ({} byte context)",
            request.image_tag,
            request.context_path.display(),
            body.len()
        );

        self.docker
            .build_image(options, None, Some(body.into()))
            .map(|item| match item {
                Ok(info) => decode_build_info(info),
                Err(bollard::errors::Error::DockerStreamError { error }) => {
                    Err(build_failure(error))
                }
                Err(e) => Err(EngineError::Docker(e)),
            })
            .boxed()
    }

    fn run_container<'a>(
        &'a self,
        spec: &RunSpec,
    ) -> impl Future<Output = Result<ContainerHandle<'a>, EngineError>> + Send {
        let spec = spec.clone();
        async move {
            let options = CreateContainerOptions {
                name: spec.name.clone(),
                platform: None,
            };
            let config = Config {
                image: Some(spec.image.clone()),
                cmd: Some(spec.entry_command()),
                working_dir: Some(spec.working_dir.clone()),
                attach_stdout: Some(true),
                attach_stderr: Some(true),
                host_config: Some(HostConfig {
                    binds: Some(spec.binds()),
                    auto_remove: Some(spec.auto_remove),
                    ..Default::default()
                }),
                ..Default::default()
            };

            let created = self.docker.create_container(Some(options), config).await?;
            for warning in &created.warnings {
                log::warn!("docker: {}", warning);
            }

            // Spawned before start, but the wait request may still reach the daemon after
            // an auto-removed container is gone; the exit status is then `None`.
            let waiter = tokio::spawn(wait_for_exit(self.docker.clone(), spec.name.clone()));

            self.docker
                .start_container(&spec.name, None::<StartContainerOptions<String>>)
                .await?;
            log::debug!("container {} started from {}", spec.name, spec.image);

            let logs_options = LogsOptions::<String> {
                follow: true,
                stdout: true,
                stderr: true,
                tail: "all".to_string(),
                ..Default::default()
            };
            let output = self
                .docker
                .logs(&spec.name, Some(logs_options))
                .map(|item| item.map(LogOutput::into_bytes).map_err(EngineError::from))
                .boxed();

            let exit: ExitFuture<'a> = Box::pin(async move {
                match waiter.await {
                    Ok(code) => code,
                    Err(e) => {
                        log::warn!("exit waiter did not complete: {}", e);
                        None
                    }
                }
            });

            Ok(ContainerHandle { output, exit })
        }
    }
}

/// Waits for the container to be removed and returns its exit code, if the daemon reports one.
async fn wait_for_exit(docker: Docker, name: String) -> Option<i64> {
    let options = WaitContainerOptions {
        condition: WAIT_CONDITION_REMOVED,
    };
    let mut responses = Box::pin(docker.wait_container(&name, Some(options)));
    match responses.next().await {
        Some(Ok(response)) => Some(response.status_code),
        Some(Err(bollard::errors::Error::DockerContainerWaitError { code, .. })) => Some(code),
        Some(Err(e)) => {
            log::debug!("waiting on {} failed: {}", name, e);
            None
        }
        None => None,
    }
}
