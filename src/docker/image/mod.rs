//! Build environment image: constants and the log-relaying builder.

pub mod builder;
pub mod config;

pub use builder::{build_with_logs, ensure_dockerfile};
pub use config::image_tag;
