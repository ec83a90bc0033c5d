//! Boundary between the orchestrator and the container engine.
//!
//! Everything the orchestrator needs from Docker goes through
//! [`ContainerEngine`]: one image build and one container run. Engine
//! records are decoded into [`LogRecord`] here so nothing downstream
//! inspects raw daemon JSON.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use bytes::Bytes;
use futures_lite::Stream;
use thiserror::Error;

use crate::platform::BuildArgs;

/// Lazy, engine-driven stream of records.
pub type RecordStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T, EngineError>> + Send + 'a>>;

/// Eventual exit status of a container.
pub type ExitFuture<'a> = Pin<Box<dyn Future<Output = Option<i64>> + Send + 'a>>;

/// One decoded build log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    /// Free-text build output
    Stream(String),
    /// Structured auxiliary payload, reduced to its identifier
    Aux(String),
    /// Record with neither field (progress, status, ...)
    Empty,
}

impl LogRecord {
    /// Decodes a record from its optional fields, preferring stream text over the aux id.
    ///
    /// Empty strings count as absent.
    pub fn decode(stream: Option<&str>, aux_id: Option<&str>) -> Self {
        match (stream, aux_id) {
            (Some(text), _) if !text.is_empty() => Self::Stream(text.to_string()),
            (_, Some(id)) if !id.is_empty() => Self::Aux(id.to_string()),
            _ => Self::Empty,
        }
    }
}

/// A failed image build together with the log the engine attached to the failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BuildFailure {
    pub message: String,
    pub log: Vec<LogRecord>,
}

/// Errors surfaced by a [`ContainerEngine`]
#[derive(Error, Debug)]
pub enum EngineError {
    /// Docker API errors
    #[error("Docker API error: {0}")]
    Docker(#[from] bollard::errors::Error),

    /// The image build was rejected by the engine
    #[error("image build failed: {0}")]
    Build(BuildFailure),

    /// IO errors (build context packing)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Input to the image build operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub context_path: PathBuf,
    pub image_tag: String,
    pub build_args: Option<BuildArgs>,
}

/// Access mode of a bind mount. The workspace mount is always read-write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountMode {
    ReadWrite,
}

impl MountMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadWrite => "rw",
        }
    }
}

/// Host directory bound into the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeBinding {
    pub host_path: PathBuf,
    pub container_path: String,
    pub mode: MountMode,
}

impl VolumeBinding {
    /// Docker `binds` syntax: `host:container:mode`.
    pub fn to_bind(&self) -> String {
        format!(
            "{}:{}:{}",
            self.host_path.display(),
            self.container_path,
            self.mode.as_str()
        )
    }
}

/// Input to the container run operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    pub image: String,
    pub name: String,
    pub volume_bindings: Vec<VolumeBinding>,
    pub working_dir: String,
    /// Joined pipeline, run through `bash -c`
    pub command: String,
    pub detach: bool,
    pub auto_remove: bool,
}

impl RunSpec {
    /// Entry command handed to the container: a single bash invocation.
    pub fn entry_command(&self) -> Vec<String> {
        vec!["bash".to_string(), "-c".to_string(), self.command.clone()]
    }

    pub fn binds(&self) -> Vec<String> {
        self.volume_bindings.iter().map(VolumeBinding::to_bind).collect()
    }
}

/// A started container: its live output plus its eventual exit status.
pub struct ContainerHandle<'a> {
    /// Raw combined stdout/stderr chunks, in arrival order
    pub output: RecordStream<'a, Bytes>,
    /// Resolves to the exit status once known; `None` when it cannot be observed
    pub exit: ExitFuture<'a>,
}

/// Container engine operations used by the build environment.
pub trait ContainerEngine {
    /// Builds an image, yielding its log records as they are produced.
    ///
    /// A failing build yields `Err(EngineError::Build(_))` carrying its partial log.
    fn build_image<'a>(&'a self, request: &BuildRequest) -> RecordStream<'a, LogRecord>;

    /// Creates and starts a container, returning a handle to its live output.
    fn run_container<'a>(
        &'a self,
        spec: &RunSpec,
    ) -> impl Future<Output = Result<ContainerHandle<'a>, EngineError>> + Send;
}
