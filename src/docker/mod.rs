//! Docker integration for the build environment.
//!
//! The orchestrator builds one image and runs one container through the
//! [`ContainerEngine`] seam:
//!
//! - `engine` - Engine trait, request types and decoded log records
//! - `client` - Docker Engine API implementation (bollard)
//! - `context` - Build context packing
//! - `availability` - Daemon ping check
//! - `image` - Image constants and the log-relaying builder
//! - `container_runner` - Pipeline execution and output streaming

pub mod availability;
pub mod client;
pub mod container_runner;
pub mod context;
pub mod engine;
pub mod image;

pub use availability::check_engine_available;
pub use client::DockerEngine;
pub use container_runner::{ContainerExit, ContainerRunner};
pub use engine::{
    BuildFailure, BuildRequest, ContainerEngine, ContainerHandle, EngineError, ExitFuture,
    LogRecord, MountMode, RecordStream, RunSpec, VolumeBinding,
};
