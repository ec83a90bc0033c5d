//! Docker image building operations.

use std::path::Path;

use futures_lite::StreamExt;

use super::config::DOCKERFILE_NAME;
use crate::docker::engine::{BuildRequest, ContainerEngine, EngineError, LogRecord};
use crate::error::{Error, Result};
use crate::relay::{LogSink, emit_failure_record, emit_record};

/// Outcome of a successful image build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltImage {
    /// Tag the image was built under
    pub tag: String,
    /// Last image id reported by the engine, if any
    pub id: Option<String>,
}

/// Checks the build context before anything is sent to the engine.
///
/// # Returns
///
/// * `Ok(())` - Context directory contains a Dockerfile
/// * `Err(Error::MissingDockerfile)` - Dockerfile not found
pub fn ensure_dockerfile(context_path: &Path) -> Result<()> {
    let dockerfile_path = context_path.join(DOCKERFILE_NAME);
    if dockerfile_path.is_file() {
        Ok(())
    } else {
        Err(Error::MissingDockerfile {
            path: dockerfile_path,
        })
    }
}

/// Builds the image and relays its log as it streams.
///
/// Each stream record is relayed as one trimmed line, else its aux id; empty
/// records are skipped. When the engine reports a build failure, every stream
/// record of the failure's own log is relayed before the failure is returned.
///
/// # Arguments
///
/// * `engine` - Container engine performing the build
/// * `request` - Context path, tag and optional build arguments
/// * `sink` - Destination of relayed lines
pub async fn build_with_logs<E: ContainerEngine>(
    engine: &E,
    request: &BuildRequest,
    sink: &dyn LogSink,
) -> Result<BuiltImage> {
    let mut records = engine.build_image(request);
    let mut id = None;

    while let Some(item) = records.next().await {
        match item {
            Ok(record) => {
                if let LogRecord::Aux(image_id) = &record {
                    id = Some(image_id.trim().to_string());
                }
                emit_record(sink, &record);
            }
            Err(EngineError::Build(failure)) => {
                for record in &failure.log {
                    emit_failure_record(sink, record);
                }
                return Err(Error::Build(failure));
            }
            Err(e) => return Err(Error::Engine(e)),
        }
    }

    log::debug!("image {} built (id: {:?})", request.image_tag, id);

    Ok(BuiltImage {
        tag: request.image_tag.clone(),
        id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docker::engine::{BuildFailure, ContainerHandle, RecordStream, RunSpec};
    use crate::relay::MemorySink;
    use futures_lite::stream;
    use std::future::Future;
    use std::path::PathBuf;

    /// Engine replaying a fixed list of build stream items.
    struct Replay(Vec<std::result::Result<LogRecord, BuildFailure>>);

    impl ContainerEngine for Replay {
        fn build_image<'a>(&'a self, _request: &BuildRequest) -> RecordStream<'a, LogRecord> {
            let items: Vec<_> = self
                .0
                .iter()
                .cloned()
                .map(|item| item.map_err(EngineError::Build))
                .collect();
            stream::iter(items).boxed()
        }

        #[allow(clippy::manual_async_fn)]
        fn run_container<'a>(
            &'a self,
            _spec: &RunSpec,
        ) -> impl Future<Output = std::result::Result<ContainerHandle<'a>, EngineError>> + Send
        {
            async { Err(EngineError::Io(std::io::Error::other("not used"))) }
        }
    }

    fn request() -> BuildRequest {
        BuildRequest {
            context_path: PathBuf::from("buildenv/"),
            image_tag: "feeless/buildenv:0.1".into(),
            build_args: None,
        }
    }

    fn stream_record(text: &str) -> LogRecord {
        LogRecord::Stream(text.to_string())
    }

    #[tokio::test]
    async fn relays_one_line_per_stream_or_aux_record_in_order() {
        let engine = Replay(vec![
            Ok(stream_record("Step 1/5 : FROM rust\n")),
            Ok(LogRecord::Empty),
            Ok(LogRecord::Aux("sha256:1234".into())),
            Ok(LogRecord::Empty),
            Ok(stream_record("Successfully tagged feeless/buildenv:0.1\n")),
        ]);
        let sink = MemorySink::new();

        let built = build_with_logs(&engine, &request(), &sink).await.unwrap();

        assert_eq!(
            sink.lines(),
            vec![
                "Step 1/5 : FROM rust",
                "sha256:1234",
                "Successfully tagged feeless/buildenv:0.1",
            ]
        );
        assert_eq!(built.tag, "feeless/buildenv:0.1");
        assert_eq!(built.id.as_deref(), Some("sha256:1234"));
    }

    #[tokio::test]
    async fn failure_log_is_relayed_before_the_error_returns() {
        let failure = BuildFailure {
            message: "step 3 returned a non-zero code: 1".into(),
            log: vec![
                stream_record("Step 1/5\n"),
                LogRecord::Aux("sha256:ignored".into()),
                stream_record("Step 2/5\n"),
                LogRecord::Empty,
                stream_record("Step 3/5\n"),
            ],
        };
        let engine = Replay(vec![Err(failure.clone())]);
        let sink = MemorySink::new();

        let err = build_with_logs(&engine, &request(), &sink).await.unwrap_err();

        assert_eq!(sink.lines(), vec!["Step 1/5", "Step 2/5", "Step 3/5"]);
        assert!(matches!(err, Error::Build(f) if f == failure));
    }

    #[tokio::test]
    async fn records_after_a_failure_are_not_relayed() {
        let engine = Replay(vec![
            Ok(stream_record("Step 1/5")),
            Err(BuildFailure {
                message: "boom".into(),
                log: vec![],
            }),
            Ok(stream_record("never")),
        ]);
        let sink = MemorySink::new();

        assert!(build_with_logs(&engine, &request(), &sink).await.is_err());
        assert_eq!(sink.lines(), vec!["Step 1/5"]);
    }

    #[test]
    fn dockerfile_must_exist_in_context() {
        let dir = tempfile::tempdir().unwrap();
        let err = ensure_dockerfile(dir.path()).unwrap_err();
        assert!(matches!(err, Error::MissingDockerfile { ref path } if path.ends_with("Dockerfile")));

        std::fs::write(dir.path().join("Dockerfile"), "FROM rust\n").unwrap();
        ensure_dockerfile(dir.path()).unwrap();
    }
}
