//! Build-then-run orchestration.
//!
//! One invocation resolves the platform policy, builds the image, then runs
//! the pipeline in a container, strictly in that order. Each stage's failure
//! stops the run before the next stage begins.

use crate::docker::engine::{BuildRequest, ContainerEngine, RunSpec};
use crate::docker::image::{build_with_logs, ensure_dockerfile};
use crate::error::{Error, Result};
use crate::platform::{IdentitySource, PlatformProfile, resolve_build_args};
use crate::relay::LogSink;
use crate::settings::Settings;

const BANNER_RULE: &str = "=============================================";

/// Fully resolved requests for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub profile: PlatformProfile,
    pub build: BuildRequest,
    pub run: RunSpec,
}

impl Plan {
    /// Resolves the platform policy and assembles both requests.
    pub fn resolve(
        settings: &Settings,
        profile: PlatformProfile,
        identity: &dyn IdentitySource,
    ) -> Result<Self> {
        let build_args = resolve_build_args(profile, identity)?;
        Ok(Self {
            profile,
            build: settings.build_request(build_args),
            run: settings.runner().run_spec(&settings.pipeline),
        })
    }

    /// Relays a human-readable description of the plan.
    pub fn emit(&self, sink: &dyn LogSink) {
        sink.emit(&format!("Platform: {}", self.profile));
        sink.emit(&format!("Image: {}", self.build.image_tag));
        sink.emit(&format!("Context: {}", self.build.context_path.display()));
        match &self.build.build_args {
            Some(args) => sink.emit(&format!(
                "Build args: USER_NAME={} USER_ID={} GROUP_ID={}",
                args.user_name, args.user_id, args.group_id
            )),
            None => sink.emit("Build args: none (container runs as root)"),
        }
        sink.emit(&format!("Container: {}", self.run.name));
        for bind in self.run.binds() {
            sink.emit(&format!("Mount: {}", bind));
        }
        sink.emit(&format!("Command: bash -c \"{}\"", self.run.command));
    }
}

/// Drives one image build followed by one container run.
pub struct Orchestrator<'a, E> {
    engine: &'a E,
    settings: &'a Settings,
    sink: &'a dyn LogSink,
}

impl<'a, E: ContainerEngine> Orchestrator<'a, E> {
    pub fn new(engine: &'a E, settings: &'a Settings, sink: &'a dyn LogSink) -> Self {
        Self {
            engine,
            settings,
            sink,
        }
    }

    /// Builds the image and runs the pipeline.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Pipeline exited zero, or its exit status could not be observed
    /// * `Err(Error::PipelineFailed)` - Pipeline exited non-zero
    /// * `Err` - Resolution, build or run failed; later stages are not attempted
    pub async fn run(&self, profile: PlatformProfile, identity: &dyn IdentitySource) -> Result<()> {
        self.sink.emit(BANNER_RULE);
        self.sink.emit(&format!("Operating System Detected [{}]", profile));
        self.sink.emit("Building the build environment... Please wait");
        self.sink.emit(BANNER_RULE);

        let plan = Plan::resolve(self.settings, profile, identity)?;
        ensure_dockerfile(&plan.build.context_path)?;

        self.sink.emit(&format!(
            "Building image {} from {}",
            plan.build.image_tag,
            plan.build.context_path.display()
        ));
        let image = build_with_logs(self.engine, &plan.build, self.sink).await?;
        log::debug!("built {} ({:?})", image.tag, image.id);

        self.sink.emit(&format!(
            "Running pipeline in container {} ({})",
            plan.run.name, plan.run.image
        ));
        let exit = self
            .settings
            .runner()
            .run_pipeline(self.engine, &self.settings.pipeline, self.sink)
            .await?;

        match exit.status_code {
            Some(code) => {
                self.sink.emit(&format!(
                    "Container {} exited with status {}",
                    plan.run.name, code
                ));
                if code == 0 {
                    Ok(())
                } else {
                    Err(Error::PipelineFailed { code })
                }
            }
            None => {
                self.sink.emit(&format!(
                    "Container {} exit status not observed",
                    plan.run.name
                ));
                Ok(())
            }
        }
    }
}
