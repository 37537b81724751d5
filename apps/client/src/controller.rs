//! Submission controller: one form, one submission at a time.
//!
//! Flow: Idle → validate → (errors: notices, back to Idle)
//!       → Submitting: control busy, progress 30 → POST → progress 60 →
//!         parse → success: progress 100, success notice, results shown
//!               → failure: error notice
//!       → Idle: control re-enabled on every path.
//!
//! The live preview (`on_input`) is independent of this state.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::backend::{ResumeBackend, SubmitResponse};
use crate::config::Config;
use crate::download::{FileSink, FileType};
use crate::errors::ClientError;
use crate::models::Submission;
use crate::notice::{Feedback, NoticeKind};
use crate::preview::{refresh_preview, Markup};
use crate::validation::validate;
use crate::view::View;

pub const SUCCESS_MESSAGE: &str = "Resume created successfully!";
pub const PROGRESS_SENT: f64 = 30.0;
pub const PROGRESS_RECEIVED: f64 = 60.0;
pub const PROGRESS_DONE: f64 = 100.0;

/// How a call to [`SubmissionController::submit`] ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Invalid(Vec<String>),
    Created(SubmitResponse),
    /// Transport, parse or application failure, with the message shown.
    Failed(String),
    /// Another submission is in flight; the control is disabled.
    Busy,
}

pub struct SubmissionController {
    view: Arc<dyn View>,
    backend: Arc<dyn ResumeBackend>,
    feedback: Feedback,
    markup: Markup,
    submitting: AtomicBool,
}

impl SubmissionController {
    pub fn new(view: Arc<dyn View>, backend: Arc<dyn ResumeBackend>) -> Self {
        Self {
            feedback: Feedback::new(Arc::clone(&view)),
            view,
            backend,
            markup: Markup::default(),
            submitting: AtomicBool::new(false),
        }
    }

    pub fn from_config(
        view: Arc<dyn View>,
        backend: Arc<dyn ResumeBackend>,
        config: &Config,
    ) -> Self {
        let mut controller = Self::new(view, backend);
        controller.feedback = Feedback::with_ttl(Arc::clone(&controller.view), config.notice_ttl);
        controller.markup = config.markup;
        controller
    }

    pub fn with_markup(mut self, markup: Markup) -> Self {
        self.markup = markup;
        self
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Input/change event on any control: re-render the preview.
    pub fn on_input(&self) {
        refresh_preview(self.view.as_ref(), self.markup);
    }

    /// Submit event. Never panics and always leaves the form interactive.
    pub async fn submit(&self) -> SubmitOutcome {
        if self.is_submitting() {
            debug!("submit ignored while a submission is in flight");
            return SubmitOutcome::Busy;
        }

        let submission = Submission::from_view(self.view.as_ref());
        let errors = validate(&submission);
        if !errors.is_empty() {
            info!(count = errors.len(), "submission failed validation");
            for message in &errors {
                self.feedback.show_alert(message.clone(), NoticeKind::Error);
            }
            return SubmitOutcome::Invalid(errors);
        }

        let Some(_busy) = BusyGuard::engage(&self.submitting, self.view.as_ref()) else {
            return SubmitOutcome::Busy;
        };

        match self.send(&submission).await {
            Ok(response) => {
                self.feedback.update_progress(PROGRESS_DONE);
                let message = response
                    .message
                    .clone()
                    .unwrap_or_else(|| SUCCESS_MESSAGE.to_string());
                info!(timestamp = ?response.timestamp, "resume created");
                self.feedback.show_alert(message, NoticeKind::Success);
                self.view.show_results(&response);
                SubmitOutcome::Created(response)
            }
            Err(err) => {
                error!("resume submission failed: {err}");
                let message = err.to_string();
                self.feedback.show_alert(message.clone(), NoticeKind::Error);
                SubmitOutcome::Failed(message)
            }
        }
    }

    async fn send(&self, submission: &Submission) -> Result<SubmitResponse, ClientError> {
        self.feedback.update_progress(PROGRESS_SENT);
        let reply = self.backend.create_resume(submission).await?;
        self.feedback.update_progress(PROGRESS_RECEIVED);
        SubmitResponse::from_reply(&reply)?.into_result()
    }

    /// Fetches one generated file and saves it as `file_type.file_name(timestamp)`.
    ///
    /// Any failure is shown as a single error notice; the sink is only called
    /// with a successful response.
    pub async fn download(
        &self,
        timestamp: &str,
        file_type: FileType,
        sink: &dyn FileSink,
    ) -> Result<PathBuf, ClientError> {
        let result = match self.backend.fetch_file(timestamp, file_type).await {
            Ok(bytes) => sink.save(&file_type.file_name(timestamp), &bytes),
            Err(err) => Err(err),
        };

        match &result {
            Ok(path) => info!(path = %path.display(), "downloaded {file_type}"),
            Err(err) => {
                warn!("download of {file_type} for {timestamp} failed: {err}");
                self.feedback.show_alert(err.to_string(), NoticeKind::Error);
            }
        }
        result
    }
}

/// Holds the submit control disabled; dropping it re-enables the control.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
    view: &'a dyn View,
}

impl<'a> BusyGuard<'a> {
    fn engage(flag: &'a AtomicBool, view: &'a dyn View) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        view.set_submit_busy(true);
        Some(Self { flag, view })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.view.set_submit_busy(false);
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;
    use tokio::sync::Notify;

    use crate::backend::Reply;
    use crate::download::DirectorySink;
    use crate::models::Field;
    use crate::view::{MemoryView, BUSY_LABEL, SUBMIT_LABEL};

    #[derive(Default)]
    struct StubBackend {
        reply: Mutex<Option<Result<Reply, ClientError>>>,
        file: Mutex<Option<Result<Bytes, ClientError>>>,
        gate: Option<Arc<Notify>>,
        posts: AtomicUsize,
    }

    impl StubBackend {
        fn replying(status: u16, body: &'static str) -> Self {
            Self {
                reply: Mutex::new(Some(Ok(Reply {
                    status,
                    body: Bytes::from_static(body.as_bytes()),
                }))),
                ..Default::default()
            }
        }

        fn failing(err: ClientError) -> Self {
            Self {
                reply: Mutex::new(Some(Err(err))),
                ..Default::default()
            }
        }

        fn serving_file(file: Result<Bytes, ClientError>) -> Self {
            Self {
                file: Mutex::new(Some(file)),
                ..Default::default()
            }
        }

        fn posts(&self) -> usize {
            self.posts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ResumeBackend for StubBackend {
        async fn create_resume(&self, _submission: &Submission) -> Result<Reply, ClientError> {
            self.posts.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.reply
                .lock()
                .unwrap()
                .take()
                .expect("stub reply configured")
        }

        async fn fetch_file(
            &self,
            _timestamp: &str,
            _file_type: FileType,
        ) -> Result<Bytes, ClientError> {
            self.file
                .lock()
                .unwrap()
                .take()
                .expect("stub file configured")
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        saved: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl FileSink for RecordingSink {
        fn save(&self, file_name: &str, contents: &[u8]) -> Result<PathBuf, ClientError> {
            self.saved
                .lock()
                .unwrap()
                .push((file_name.to_string(), contents.to_vec()));
            Ok(PathBuf::from(file_name))
        }
    }

    const CREATED: &str =
        r#"{"success": true, "message": "Resume created successfully!", "timestamp": "20240101_120000", "files": {"pdf": "resume_20240101_120000.pdf"}}"#;

    fn valid_view() -> Arc<MemoryView> {
        Arc::new(MemoryView::with_submission(&Submission {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "(555) 123-4567".to_string(),
            job_title: "Engineer".to_string(),
            company: "Acme".to_string(),
            education: "BS Computer Science".to_string(),
            experience: "Built payment systems".to_string(),
            skills: "Rust, Go".to_string(),
        }))
    }

    fn controller(view: &Arc<MemoryView>, backend: &Arc<StubBackend>) -> SubmissionController {
        SubmissionController::new(view.clone(), backend.clone())
    }

    fn messages(view: &MemoryView) -> Vec<(NoticeKind, String)> {
        view.notices()
            .into_iter()
            .map(|n| (n.kind, n.message))
            .collect()
    }

    #[tokio::test]
    async fn test_invalid_submission_never_posts() {
        let view = valid_view();
        view.set_field(Field::Phone, "");
        let backend = Arc::new(StubBackend::default());

        let outcome = controller(&view, &backend).submit().await;

        let expected = vec![
            "phone is required".to_string(),
            "Phone number must have at least 10 digits".to_string(),
        ];
        assert_eq!(outcome, SubmitOutcome::Invalid(expected.clone()));
        assert_eq!(backend.posts(), 0);
        assert_eq!(
            messages(&view),
            expected
                .into_iter()
                .map(|m| (NoticeKind::Error, m))
                .collect::<Vec<_>>()
        );
        assert!(view.progress_history().is_empty());
        assert!(!view.is_submit_disabled());
    }

    #[tokio::test]
    async fn test_successful_submission_reaches_full_progress() {
        let view = valid_view();
        let backend = Arc::new(StubBackend::replying(200, CREATED));

        let outcome = controller(&view, &backend).submit().await;

        let SubmitOutcome::Created(response) = outcome else {
            panic!("expected Created, got {outcome:?}");
        };
        assert_eq!(response.timestamp.as_deref(), Some("20240101_120000"));
        assert_eq!(backend.posts(), 1);
        assert_eq!(view.progress_history(), vec![30.0, 60.0, 100.0]);
        assert_eq!(
            messages(&view),
            vec![(NoticeKind::Success, SUCCESS_MESSAGE.to_string())]
        );
        assert_eq!(view.results(), vec![response]);
        assert!(!view.is_submit_disabled());
        assert_eq!(view.submit_label(), SUBMIT_LABEL);
    }

    #[tokio::test]
    async fn test_application_failure_shows_backend_message() {
        let view = valid_view();
        let backend = Arc::new(StubBackend::replying(
            400,
            r#"{"success": false, "message": "At least one skill is required"}"#,
        ));

        let outcome = controller(&view, &backend).submit().await;

        assert_eq!(
            outcome,
            SubmitOutcome::Failed("At least one skill is required".to_string())
        );
        assert_eq!(view.progress_history(), vec![30.0, 60.0]);
        assert_eq!(
            messages(&view),
            vec![(NoticeKind::Error, "At least one skill is required".to_string())]
        );
        assert!(view.results().is_empty());
        assert!(!view.is_submit_disabled());
    }

    #[tokio::test]
    async fn test_unparseable_body_fails_and_reenables() {
        let view = valid_view();
        let backend = Arc::new(StubBackend::replying(200, "<html>oops</html>"));

        let outcome = controller(&view, &backend).submit().await;

        let SubmitOutcome::Failed(message) = outcome else {
            panic!("expected Failed, got {outcome:?}");
        };
        assert!(message.starts_with("Invalid server response"));
        assert!(!view.is_submit_disabled());
    }

    #[tokio::test]
    async fn test_transport_failure_fails_and_reenables() {
        let view = valid_view();
        let backend = Arc::new(StubBackend::failing(ClientError::Status {
            status: 503,
            message: "Service Unavailable".to_string(),
        }));

        let outcome = controller(&view, &backend).submit().await;

        assert_eq!(
            outcome,
            SubmitOutcome::Failed("Request failed (status 503): Service Unavailable".to_string())
        );
        assert_eq!(view.progress_history(), vec![30.0]);
        assert_eq!(view.notices().len(), 1);
        assert!(!view.is_submit_disabled());
        assert_eq!(view.submit_label(), SUBMIT_LABEL);
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_busy() {
        let view = valid_view();
        let gate = Arc::new(Notify::new());
        let backend = Arc::new(StubBackend {
            gate: Some(gate.clone()),
            ..StubBackend::replying(200, CREATED)
        });
        let controller = controller(&view, &backend);

        let (first, second) = tokio::join!(controller.submit(), async {
            while !controller.is_submitting() {
                tokio::task::yield_now().await;
            }
            assert!(view.is_submit_disabled());
            assert_eq!(view.submit_label(), BUSY_LABEL);
            let outcome = controller.submit().await;
            gate.notify_one();
            outcome
        });

        assert!(matches!(first, SubmitOutcome::Created(_)));
        assert_eq!(second, SubmitOutcome::Busy);
        assert_eq!(backend.posts(), 1);
        assert!(!controller.is_submitting());
        assert!(!view.is_submit_disabled());
    }

    #[tokio::test]
    async fn test_on_input_renders_preview() {
        let view = valid_view();
        let backend = Arc::new(StubBackend::default());
        let controller = controller(&view, &backend).with_markup(Markup::Raw);

        view.set_field(Field::Name, "<i>Jane</i>");
        controller.on_input();

        let html = view.preview().unwrap();
        assert!(html.contains("<h2><i>Jane</i></h2>"));
        assert!(html.contains("jane@example.com | (555) 123-4567"));
        assert!(!controller.is_submitting());
    }

    #[tokio::test]
    async fn test_download_saves_under_derived_name() {
        let view = valid_view();
        let backend = Arc::new(StubBackend::serving_file(Ok(Bytes::from_static(b"%PDF"))));
        let sink = RecordingSink::default();

        let path = controller(&view, &backend)
            .download("20240101_120000", FileType::Pdf, &sink)
            .await
            .unwrap();

        assert_eq!(path, PathBuf::from("resume_20240101_120000.pdf"));
        assert_eq!(
            *sink.saved.lock().unwrap(),
            vec![("resume_20240101_120000.pdf".to_string(), b"%PDF".to_vec())]
        );
        assert!(view.notices().is_empty());
    }

    #[tokio::test]
    async fn test_failed_download_shows_one_notice_and_never_saves() {
        let view = valid_view();
        let backend = Arc::new(StubBackend::serving_file(Err(ClientError::Status {
            status: 404,
            message: "File not found".to_string(),
        })));
        let sink = RecordingSink::default();

        let result = controller(&view, &backend)
            .download("20240101_120000", FileType::CoverLetter, &sink)
            .await;

        assert!(result.is_err());
        assert!(sink.saved.lock().unwrap().is_empty());
        assert_eq!(
            messages(&view),
            vec![(
                NoticeKind::Error,
                "Request failed (status 404): File not found".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_sink_failure_is_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let view = valid_view();
        let backend = Arc::new(StubBackend::serving_file(Ok(Bytes::from_static(b"{}"))));
        let sink = DirectorySink::new(blocker.join("out"));

        let result = controller(&view, &backend)
            .download("20240101_120000", FileType::Json, &sink)
            .await;

        assert!(matches!(result, Err(ClientError::Io(_))));
        assert_eq!(view.notices().len(), 1);
    }
}
