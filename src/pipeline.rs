//! Composition of the in-container shell pipeline.

/// Shell separator that runs the next step only if the previous one succeeded
pub const AND_SEPARATOR: &str = " && ";

/// Ordered shell steps executed inside the build container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    steps: Vec<String>,
}

impl Pipeline {
    pub fn new<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            steps: steps.into_iter().map(Into::into).collect(),
        }
    }

    /// Default pipeline: test, build, then run the CLI example against the built artifact.
    pub fn default_for(project: &str) -> Self {
        Self::new([
            "cargo test".to_string(),
            "cargo build".to_string(),
            format!("cargo run --example cli -- target/Debug/{project}"),
        ])
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Joins the steps into one AND-chained command string.
    pub fn compose(&self) -> String {
        compose(&self.steps)
    }
}

/// Joins steps with [`AND_SEPARATOR`], preserving order. Commands are not validated.
pub fn compose<S: AsRef<str>>(steps: &[S]) -> String {
    steps
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(AND_SEPARATOR)
}
