//! Docker image configuration and constants.

use std::time::Duration;

/// Project namespace used for the image repository and the container name
pub const DEFAULT_NAMESPACE: &str = "feeless";

/// Repository name (under the namespace) of the build environment image
pub const IMAGE_REPOSITORY: &str = "buildenv";

/// Version tag of the build environment image
pub const IMAGE_VERSION: &str = "0.1";

/// Build context directory, relative to the host working directory
pub const DEFAULT_CONTEXT_DIR: &str = "buildenv/";

/// Dockerfile name inside the build context
pub const DOCKERFILE_NAME: &str = "Dockerfile";

/// Mount point of the host working directory inside the container
pub const CONTAINER_MOUNT_TARGET: &str = "/root/app/";

/// Timeout for the Docker ping check (5 seconds)
/// Quick daemon availability check shouldn't take long
pub const DOCKER_PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Platform-specific Docker startup instructions
#[cfg(target_os = "macos")]
pub const DOCKER_START_HELP: &str = "Start Docker Desktop from Applications or Spotlight";

#[cfg(target_os = "linux")]
pub const DOCKER_START_HELP: &str = "Start Docker daemon: sudo systemctl start docker";

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub const DOCKER_START_HELP: &str = "Start Docker Desktop and wait until the engine is running";

/// Image reference for a namespace, e.g. `feeless/buildenv:0.1`.
pub fn image_tag(namespace: &str) -> String {
    format!("{namespace}/{IMAGE_REPOSITORY}:{IMAGE_VERSION}")
}
