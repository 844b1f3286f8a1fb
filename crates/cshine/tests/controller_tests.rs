//! Page controllers wired through an `AppContext` with scripted parts.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{artifact, config, context, drain, MockUploader, ScriptedBackend, Step};
use cshine::broadcast::NoticeLevel;
use cshine::controller::{
    FlashRecorderController, FlashRefresh, MeetingUploadController, UploadStatus,
};
use cshine::error::ClientError;
use cshine::job::{JobId, StatusReport};
use cshine::pipeline::JobMetadata;
use cshine::playback::AudioBackend;

fn titled(title: &str) -> JobMetadata {
    JobMetadata {
        title: Some(title.to_string()),
        ..JobMetadata::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_meeting_upload_requires_title_and_file() {
    let backend = ScriptedBackend::new(vec![]);
    let ctx = context(backend.clone(), MockUploader::new(vec![]), config(90));
    let mut notices = ctx.notifier().subscribe();
    let controller = MeetingUploadController::new(&ctx);

    let err = controller
        .submit(Some(&artifact(10)), JobMetadata::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(ref m) if m.contains("title")));

    let err = controller.submit(None, titled("Sync")).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(ref m) if m.contains("audio")));

    assert_eq!(drain(&mut notices).len(), 2);
    assert_eq!(backend.sign_calls(), 0);
    assert_eq!(controller.current().status, UploadStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_meeting_upload_runs_to_completion() {
    let backend = ScriptedBackend::new(vec![Step::Processing, Step::Completed]);
    backend.assign_job_id("m-1");
    let ctx = context(backend.clone(), MockUploader::new(vec![50]), config(90));
    let mut notices = ctx.notifier().subscribe();
    let controller = MeetingUploadController::new(&ctx);
    let mut state = controller.subscribe();

    let id = controller
        .submit(Some(&artifact(10)), titled("Weekly sync"))
        .await
        .unwrap();
    assert_eq!(id, JobId::new("m-1"));

    let view = controller.current();
    assert_eq!(view.status, UploadStatus::Processing);
    assert_eq!(view.progress, 50);
    assert_eq!(view.meeting_id, Some(JobId::new("m-1")));

    state
        .wait_for(|s| s.status == UploadStatus::Completed)
        .await
        .unwrap();
    assert_eq!(controller.current().progress, 100);

    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
}

#[tokio::test(start_paused = true)]
async fn test_meeting_failure_produces_one_error_notice() {
    let backend = ScriptedBackend::new(vec![Step::Failed("speaker separation failed".to_string())]);
    let ctx = context(backend.clone(), MockUploader::new(vec![]), config(90));
    let mut notices = ctx.notifier().subscribe();
    let controller = MeetingUploadController::new(&ctx);
    let mut state = controller.subscribe();

    controller
        .submit(Some(&artifact(10)), titled("Retro"))
        .await
        .unwrap();
    state
        .wait_for(|s| s.status == UploadStatus::Failed)
        .await
        .unwrap();

    let view = controller.current();
    assert!(view.error_message.unwrap().contains("speaker separation failed"));
    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test(start_paused = true)]
async fn test_meeting_upload_failure_is_reported_once() {
    let backend = ScriptedBackend::new(vec![]);
    let ctx = context(backend.clone(), MockUploader::rejecting(500), config(90));
    let mut notices = ctx.notifier().subscribe();
    let controller = MeetingUploadController::new(&ctx);

    let err = controller
        .submit(Some(&artifact(10)), titled("Retro"))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "upload failed: 500");
    assert_eq!(controller.current().status, UploadStatus::Failed);
    assert_eq!(drain(&mut notices).len(), 1);
    assert_eq!(backend.create_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_resume_polls_existing_meeting() {
    let backend = ScriptedBackend::new(vec![Step::Completed]);
    let ctx = context(backend.clone(), MockUploader::new(vec![]), config(90));
    let controller = MeetingUploadController::new(&ctx);
    let mut state = controller.subscribe();

    let status = controller.resume(JobId::new("m-7")).await.unwrap();
    assert_eq!(status, UploadStatus::Processing);
    assert_eq!(controller.current().progress, 50);

    state
        .wait_for(|s| s.status == UploadStatus::Completed)
        .await
        .unwrap();
    assert_eq!(backend.create_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_resume_pending_meeting_starts_from_zero() {
    let backend = ScriptedBackend::new(vec![Step::ProcessingAt(20)]);
    backend.store_status(StatusReport::new("pending"));
    let ctx = context(backend.clone(), MockUploader::new(vec![]), config(90));
    let controller = MeetingUploadController::new(&ctx);

    controller.resume(JobId::new("m-8")).await.unwrap();
    assert_eq!(controller.current().progress, 0);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(backend.status_calls(), 1);
    assert_eq!(controller.current().progress, 20);
}

#[tokio::test(start_paused = true)]
async fn test_resume_failed_meeting_does_not_poll_or_notify() {
    let backend = ScriptedBackend::new(vec![]);
    backend.store_status(StatusReport::new("failed").with_error("no speech detected"));
    let ctx = context(backend.clone(), MockUploader::new(vec![]), config(90));
    let mut notices = ctx.notifier().subscribe();
    let controller = MeetingUploadController::new(&ctx);

    let status = controller.resume(JobId::new("m-9")).await.unwrap();
    assert_eq!(status, UploadStatus::Failed);

    tokio::time::sleep(Duration::from_secs(30)).await;
    let view = controller.current();
    assert_eq!(view.error_message.as_deref(), Some("no speech detected"));
    assert_eq!(view.meeting_id, Some(JobId::new("m-9")));
    assert_eq!(backend.status_calls(), 0);
    assert_eq!(controller.registry().active_count(), 0);
    assert!(drain(&mut notices).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_resume_completed_meeting_shows_full_progress() {
    let backend = ScriptedBackend::new(vec![]);
    backend.store_status(StatusReport::new("completed"));
    let ctx = context(backend.clone(), MockUploader::new(vec![]), config(90));
    let controller = MeetingUploadController::new(&ctx);

    let status = controller.resume(JobId::new("m-10")).await.unwrap();

    assert_eq!(status, UploadStatus::Completed);
    assert_eq!(controller.current().progress, 100);
    assert_eq!(controller.registry().active_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_processing_ticks_raise_view_progress() {
    let backend = ScriptedBackend::new(vec![Step::ProcessingAt(75)]);
    let ctx = context(backend.clone(), MockUploader::new(vec![]), config(90));
    let controller = MeetingUploadController::new(&ctx);

    controller
        .submit(Some(&artifact(10)), titled("Planning"))
        .await
        .unwrap();
    assert_eq!(controller.current().progress, 50);

    tokio::time::sleep(Duration::from_secs(5)).await;
    let view = controller.current();
    assert_eq!(view.status, UploadStatus::Processing);
    assert_eq!(view.progress, 75);
}

#[tokio::test(start_paused = true)]
async fn test_lower_tick_progress_never_moves_view_back() {
    let backend = ScriptedBackend::new(vec![Step::ProcessingAt(80), Step::ProcessingAt(10)]);
    let ctx = context(backend.clone(), MockUploader::new(vec![]), config(90));
    let controller = MeetingUploadController::new(&ctx);

    controller
        .submit(Some(&artifact(10)), titled("Planning"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(backend.status_calls(), 3);
    assert_eq!(controller.current().progress, 80);
}

#[tokio::test(start_paused = true)]
async fn test_leaving_upload_page_stops_polling() {
    let backend = ScriptedBackend::new(vec![]);
    let ctx = context(backend.clone(), MockUploader::new(vec![]), config(90));
    let controller = MeetingUploadController::new(&ctx);

    controller
        .submit(Some(&artifact(10)), titled("Long meeting"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(600)).await;
    let calls = backend.status_calls();
    assert_eq!(calls, 1);

    drop(controller);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(backend.status_calls(), calls);
}

#[tokio::test(start_paused = true)]
async fn test_flash_tracking_outlives_recorder() {
    let backend = ScriptedBackend::new(vec![Step::Processing, Step::Completed]);
    backend.assign_job_id("f-1");
    let ctx = context(backend.clone(), MockUploader::new(vec![]), config(90));
    let (controller, mut refresh) = FlashRecorderController::new(&ctx);

    controller
        .submit_recording(&artifact(10), JobMetadata::default())
        .await
        .unwrap();
    assert_eq!(
        refresh.recv().await,
        Some(FlashRefresh::Created(JobId::new("f-1")))
    );
    assert!(ctx.flash_registry().is_active(&JobId::new("f-1")));

    // The recorder page goes away; the global registry keeps polling.
    drop(controller);

    match refresh.recv().await {
        Some(FlashRefresh::Processed(result)) => {
            assert_eq!(result.summary(), Some("groceries"));
        }
        other => panic!("expected processed refresh, got {other:?}"),
    }
    assert_eq!(backend.status_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_flash_timeout_notifies_once() {
    let backend = ScriptedBackend::new(vec![]);
    let ctx = context(backend.clone(), MockUploader::new(vec![]), config(2));
    let mut notices = ctx.notifier().subscribe();
    let (controller, _refresh) = FlashRecorderController::new(&ctx);

    controller
        .submit_recording(&artifact(10), JobMetadata::default())
        .await
        .unwrap();

    let notice = notices.recv().await.unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.message.contains("timed out"));
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(drain(&mut notices).is_empty());
    assert_eq!(backend.status_calls(), 2);
}

struct SilentPlayer;

impl AudioBackend for SilentPlayer {
    fn play(&self) {}
    fn pause(&self) {}
    fn seek(&self, _seconds: f64) {}
    fn set_playback_rate(&self, _rate: f32) {}
    fn current_time(&self) -> f64 {
        0.0
    }
    fn duration(&self) -> Option<f64> {
        None
    }
}

#[tokio::test]
async fn test_context_playback_uses_configured_tick() {
    let backend = ScriptedBackend::new(vec![]);
    let mut cfg = config(90);
    cfg.playback_tick_ms = 300;
    let ctx = context(backend, MockUploader::new(vec![]), cfg);

    let player = ctx.playback(Arc::new(SilentPlayer), Some(120.0));

    assert_eq!(player.tick(), Duration::from_millis(300));
    assert_eq!(player.duration(), Some(120.0));
}
