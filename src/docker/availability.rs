//! Docker daemon availability checking.

use tokio::time::timeout;

use super::client::DockerEngine;
use super::image::config::{DOCKER_PING_TIMEOUT, DOCKER_START_HELP};
use crate::error::{Error, Result};

/// Checks that the Docker daemon answers a ping.
///
/// # Returns
///
/// * `Ok(())` - Docker is available
/// * `Err(Error::EngineUnavailable)` - daemon unreachable or not responding in time
pub async fn check_engine_available(engine: &DockerEngine) -> Result<()> {
    match timeout(DOCKER_PING_TIMEOUT, engine.docker().ping()).await {
        Ok(Ok(_)) => Ok(()),

        Ok(Err(e)) => Err(Error::EngineUnavailable {
            reason: format!(
                "Docker daemon is not responding: {}\n\
                 \n\
                 {}\n\
                 \n\
                 If Docker is not installed, visit: https://docs.docker.com/get-docker/",
                e, DOCKER_START_HELP
            ),
        }),

        Err(_) => Err(Error::EngineUnavailable {
            reason: format!(
                "Docker daemon check timed out after {} seconds.\n\
                 \n\
                 {}",
                DOCKER_PING_TIMEOUT.as_secs(),
                DOCKER_START_HELP
            ),
        }),
    }
}
