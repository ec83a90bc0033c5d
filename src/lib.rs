//! Containerized build-and-test orchestrator.
//!
//! Builds a reproducible Docker build environment image (mapping the host
//! user into it on Linux so files written to the mounted workspace stay
//! owned by that user), then runs an AND-chained shell pipeline inside a
//! container, relaying all build and container output line by line.
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod docker;
pub mod error;
pub mod orchestrator;
pub mod pipeline;
pub mod platform;
pub mod relay;
pub mod settings;

// Re-export commonly used types
pub use error::{Error, Result};
pub use orchestrator::{Orchestrator, Plan};
pub use pipeline::Pipeline;
pub use platform::PlatformProfile;
pub use relay::{LogSink, LoggerSink, MemorySink};
pub use settings::Settings;
