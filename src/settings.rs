//! Run settings, assembled once at startup and read-only afterwards.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::docker::engine::BuildRequest;
use crate::docker::image::config::{self, CONTAINER_MOUNT_TARGET, DEFAULT_CONTEXT_DIR};
use crate::docker::ContainerRunner;
use crate::pipeline::Pipeline;
use crate::platform::BuildArgs;

/// Everything one invocation needs to build the image and run the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub namespace: String,
    pub image_tag: String,
    /// Build context, resolved against `host_dir`
    pub context_dir: PathBuf,
    /// Host directory mounted into the container
    pub host_dir: PathBuf,
    pub mount_target: String,
    pub container_name: String,
    pub pipeline: Pipeline,
}

impl Settings {
    /// Defaults for a namespace rooted at `host_dir`.
    pub fn new(namespace: &str, host_dir: impl Into<PathBuf>) -> Self {
        let host_dir = host_dir.into();
        Self {
            namespace: namespace.to_string(),
            image_tag: config::image_tag(namespace),
            context_dir: host_dir.join(DEFAULT_CONTEXT_DIR),
            host_dir,
            mount_target: CONTAINER_MOUNT_TARGET.to_string(),
            container_name: namespace.to_string(),
            pipeline: Pipeline::default_for(namespace),
        }
    }

    pub fn with_image_tag(mut self, tag: impl Into<String>) -> Self {
        self.image_tag = tag.into();
        self
    }

    /// Relative paths are taken from the host directory.
    pub fn with_context_dir(mut self, context: impl AsRef<Path>) -> Self {
        self.context_dir = self.host_dir.join(context);
        self
    }

    pub fn with_mount_target(mut self, target: impl Into<String>) -> Self {
        self.mount_target = target.into();
        self
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Suffixes the container name with a random run id so concurrent runs don't collide.
    pub fn with_unique_name(mut self) -> Self {
        self.container_name = format!("{}-{}", self.namespace, Uuid::new_v4());
        self
    }

    pub fn build_request(&self, build_args: Option<BuildArgs>) -> BuildRequest {
        BuildRequest {
            context_path: self.context_dir.clone(),
            image_tag: self.image_tag.clone(),
            build_args,
        }
    }

    pub fn runner(&self) -> ContainerRunner {
        ContainerRunner::new(
            self.image_tag.clone(),
            self.container_name.clone(),
            self.host_dir.clone(),
            self.mount_target.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_namespace() {
        let settings = Settings::new("feeless", "/work");

        assert_eq!(settings.image_tag, "feeless/buildenv:0.1");
        assert_eq!(settings.context_dir, PathBuf::from("/work/buildenv/"));
        assert_eq!(settings.mount_target, "/root/app/");
        assert_eq!(settings.container_name, "feeless");
        assert_eq!(
            settings.pipeline.compose(),
            "cargo test && cargo build && cargo run --example cli -- target/Debug/feeless"
        );
    }

    #[test]
    fn context_overrides_resolve_against_host_dir() {
        let relative = Settings::new("feeless", "/work").with_context_dir("docker/env");
        assert_eq!(relative.context_dir, PathBuf::from("/work/docker/env"));

        let absolute = Settings::new("feeless", "/work").with_context_dir("/opt/ctx");
        assert_eq!(absolute.context_dir, PathBuf::from("/opt/ctx"));
    }

    #[test]
    fn unique_names_keep_the_namespace_prefix() {
        let a = Settings::new("feeless", "/work").with_unique_name();
        let b = Settings::new("feeless", "/work").with_unique_name();

        assert!(a.container_name.starts_with("feeless-"));
        assert_ne!(a.container_name, b.container_name);
    }

    #[test]
    fn build_request_carries_tag_and_context() {
        let request = Settings::new("feeless", "/work").build_request(None);
        assert_eq!(request.image_tag, "feeless/buildenv:0.1");
        assert_eq!(request.context_path, PathBuf::from("/work/buildenv/"));
        assert!(request.build_args.is_none());
    }
}
