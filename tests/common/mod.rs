//! Scripted in-memory container engine shared by the integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::path::Path;
use std::sync::Mutex;

use buildenv::docker::{
    BuildFailure, BuildRequest, ContainerEngine, ContainerHandle, EngineError, LogRecord,
    RecordStream, RunSpec,
};
use buildenv::platform::{HostIdentity, IdentitySource, ResolutionError};
use bytes::Bytes;
use futures_lite::{StreamExt, stream};

/// Engine replaying canned build records and container output.
#[derive(Default)]
pub struct ScriptedEngine {
    pub build_items: Vec<Result<LogRecord, BuildFailure>>,
    pub output: Vec<String>,
    pub exit_code: Option<i64>,
    pub builds: Mutex<Vec<BuildRequest>>,
    pub runs: Mutex<Vec<RunSpec>>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self {
            exit_code: Some(0),
            ..Default::default()
        }
    }

    pub fn build_streams(mut self, lines: &[&str]) -> Self {
        self.build_items = lines
            .iter()
            .map(|line| Ok(LogRecord::Stream(format!("{line}\n"))))
            .collect();
        self
    }

    pub fn build_fails(mut self, partial: &[&str]) -> Self {
        self.build_items = vec![Err(BuildFailure {
            message: "The command '/bin/sh -c false' returned a non-zero code: 1".into(),
            log: partial
                .iter()
                .map(|line| LogRecord::Stream(format!("{line}\n")))
                .collect(),
        })];
        self
    }

    pub fn outputs(mut self, lines: &[&str]) -> Self {
        self.output = lines.iter().map(|line| format!("{line}\n")).collect();
        self
    }

    pub fn exits_with(mut self, code: Option<i64>) -> Self {
        self.exit_code = code;
        self
    }

    pub fn build_requests(&self) -> Vec<BuildRequest> {
        self.builds.lock().unwrap().clone()
    }

    pub fn run_specs(&self) -> Vec<RunSpec> {
        self.runs.lock().unwrap().clone()
    }
}

impl ContainerEngine for ScriptedEngine {
    fn build_image<'a>(&'a self, request: &BuildRequest) -> RecordStream<'a, LogRecord> {
        self.builds.lock().unwrap().push(request.clone());
        let items: Vec<_> = self
            .build_items
            .iter()
            .cloned()
            .map(|item| item.map_err(EngineError::Build))
            .collect();
        stream::iter(items).boxed()
    }

    fn run_container<'a>(
        &'a self,
        spec: &RunSpec,
    ) -> impl Future<Output = Result<ContainerHandle<'a>, EngineError>> + Send {
        self.runs.lock().unwrap().push(spec.clone());
        let chunks: Vec<Result<Bytes, EngineError>> = self
            .output
            .iter()
            .map(|line| Ok(Bytes::from(line.clone())))
            .collect();
        let exit = self.exit_code;
        async move {
            Ok(ContainerHandle {
                output: stream::iter(chunks).boxed(),
                exit: Box::pin(async move { exit }),
            })
        }
    }
}

/// Identity of the test user `alice` (uid/gid 1000).
pub struct Alice;

impl IdentitySource for Alice {
    fn identity(&self) -> Result<HostIdentity, ResolutionError> {
        Ok(HostIdentity {
            user_name: "alice".into(),
            uid: 1000,
            gid: 1000,
        })
    }
}

/// Identity source that always fails.
pub struct Nobody;

impl IdentitySource for Nobody {
    fn identity(&self) -> Result<HostIdentity, ResolutionError> {
        Err(ResolutionError::MissingUserName { uid: 1000 })
    }
}

/// Creates `<root>/buildenv/Dockerfile`.
pub fn write_context(root: &Path) {
    let context = root.join("buildenv");
    std::fs::create_dir_all(&context).unwrap();
    std::fs::write(context.join("Dockerfile"), "FROM rust:1\n").unwrap();
}
