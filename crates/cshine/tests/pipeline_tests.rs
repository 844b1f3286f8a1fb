//! Submit pipeline: validation, signing, upload, creation.

mod common;

use std::sync::Arc;

use common::{artifact, polling, MockUploader, RecordingProgress, ScriptedBackend, Step};
use cshine::config::ProgressConfig;
use cshine::error::ClientError;
use cshine::job::JobKind;
use cshine::pipeline::{
    JobMetadata, NoopProgress, SubmitPipeline, FLASH_CONTENT_PLACEHOLDER,
};
use cshine::polling::{PollCallbacks, PollingRegistry};

fn pipeline(backend: &Arc<ScriptedBackend>, uploader: &Arc<MockUploader>) -> SubmitPipeline {
    SubmitPipeline::new(backend.clone(), uploader.clone())
}

#[tokio::test]
async fn test_oversized_artifact_never_reaches_network() {
    let backend = ScriptedBackend::new(vec![]);
    let uploader = MockUploader::new(vec![50]);
    let progress = Arc::new(RecordingProgress::default());

    let err = pipeline(&backend, &uploader)
        .with_max_upload_bytes(1024)
        .submit(JobKind::Meeting, &artifact(1025), JobMetadata::default(), progress.clone())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(backend.sign_calls(), 0);
    assert_eq!(uploader.calls(), 0);
    assert_eq!(backend.create_calls(), 0);
    assert_eq!(progress.failures(), 1);
}

#[tokio::test]
async fn test_submit_reports_monotonic_progress() {
    let backend = ScriptedBackend::new(vec![]);
    backend.assign_job_id("m-42");
    let uploader = MockUploader::new(vec![10, 40, 30, 80]);
    let progress = Arc::new(RecordingProgress::default());

    let job = pipeline(&backend, &uploader)
        .submit(
            JobKind::Meeting,
            &artifact(2048),
            JobMetadata {
                title: Some("Weekly sync".to_string()),
                participants: JobMetadata::parse_participants("Ann，Bo"),
                ..JobMetadata::default()
            },
            progress.clone(),
        )
        .await
        .unwrap();

    assert_eq!(job.id.as_str(), "m-42");
    assert_eq!(job.audio_url, "https://bucket.oss.example.com/audio/2024/rec.m4a");

    let values = progress.values();
    assert!(values.windows(2).all(|w| w[0] <= w[1]), "{values:?}");
    assert!(values.iter().all(|v| *v <= 50));
    assert_eq!(values.last(), Some(&50));
    assert!(values.contains(&30));

    let created = backend.created.lock().unwrap();
    let (kind, request) = &created[0];
    assert_eq!(*kind, JobKind::Meeting);
    assert_eq!(request.audio_url, job.audio_url);
    assert_eq!(request.audio_duration, Some(42));
    assert_eq!(request.participants, vec!["Ann".to_string(), "Bo".to_string()]);
}

#[tokio::test]
async fn test_custom_progress_ranges() {
    let backend = ScriptedBackend::new(vec![]);
    let uploader = MockUploader::new(vec![50]);
    let progress = Arc::new(RecordingProgress::default());

    pipeline(&backend, &uploader)
        .with_progress_config(ProgressConfig {
            upload_start: 10,
            upload_end: 60,
            created: 70,
        })
        .submit(JobKind::Flash, &artifact(10), JobMetadata::default(), progress.clone())
        .await
        .unwrap();

    let values = progress.values();
    assert_eq!(values.first(), Some(&10));
    assert!(values.contains(&35));
    assert_eq!(values.last(), Some(&70));
}

#[tokio::test]
async fn test_flash_gets_placeholder_content() {
    let backend = ScriptedBackend::new(vec![]);
    let uploader = MockUploader::new(vec![]);

    pipeline(&backend, &uploader)
        .submit(
            JobKind::Flash,
            &artifact(10),
            JobMetadata::default(),
            Arc::new(NoopProgress),
        )
        .await
        .unwrap();

    let created = backend.created.lock().unwrap();
    assert_eq!(created[0].1.content.as_deref(), Some(FLASH_CONTENT_PLACEHOLDER));
}

#[tokio::test]
async fn test_signature_failure_aborts() {
    let backend = ScriptedBackend::new(vec![]);
    backend.fail_signature("signing service down");
    let uploader = MockUploader::new(vec![50]);
    let progress = Arc::new(RecordingProgress::default());

    let err = pipeline(&backend, &uploader)
        .submit(JobKind::Flash, &artifact(10), JobMetadata::default(), progress.clone())
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "signing service down");
    assert_eq!(uploader.calls(), 0);
    assert_eq!(backend.create_calls(), 0);
    assert_eq!(progress.failures(), 1);
}

#[tokio::test]
async fn test_rejected_upload_aborts_before_creation() {
    let backend = ScriptedBackend::new(vec![]);
    let uploader = MockUploader::rejecting(403);

    let err = pipeline(&backend, &uploader)
        .submit(
            JobKind::Meeting,
            &artifact(10),
            JobMetadata::default(),
            Arc::new(NoopProgress),
        )
        .await
        .unwrap_err();

    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "upload failed: 403");
        }
        other => panic!("expected api error, got {other:?}"),
    }
    assert_eq!(backend.create_calls(), 0);
}

#[tokio::test]
async fn test_missing_job_id_is_api_error() {
    let backend = ScriptedBackend::new(vec![]);
    backend.assign_job_id("");
    let uploader = MockUploader::new(vec![]);

    let err = pipeline(&backend, &uploader)
        .submit(
            JobKind::Flash,
            &artifact(10),
            JobMetadata::default(),
            Arc::new(NoopProgress),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Api { .. }));
}

#[tokio::test]
async fn test_each_submit_uploads_again() {
    let backend = ScriptedBackend::new(vec![]);
    let uploader = MockUploader::new(vec![]);
    let pipeline = pipeline(&backend, &uploader);

    for _ in 0..2 {
        pipeline
            .submit(
                JobKind::Flash,
                &artifact(10),
                JobMetadata::default(),
                Arc::new(NoopProgress),
            )
            .await
            .unwrap();
    }

    assert_eq!(uploader.calls(), 2);
    assert_eq!(backend.create_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_submit_and_track_starts_polling() {
    let backend = ScriptedBackend::new(vec![Step::Completed]);
    backend.assign_job_id("f-9");
    let uploader = MockUploader::new(vec![]);
    let registry = PollingRegistry::new(backend.clone(), polling(90), polling(90));
    let (tx, rx) = tokio::sync::oneshot::channel();

    let job = pipeline(&backend, &uploader)
        .submit_and_track(
            JobKind::Flash,
            &artifact(10),
            JobMetadata::default(),
            Arc::new(NoopProgress),
            &registry,
            PollCallbacks::new().on_done(move |result| {
                let _ = tx.send(result);
            }),
        )
        .await
        .unwrap();

    assert!(registry.is_active(&job.id));
    let result = rx.await.unwrap();
    assert_eq!(result.content(), Some("buy milk and eggs"));
    assert_eq!(backend.status_calls(), 1);
}
