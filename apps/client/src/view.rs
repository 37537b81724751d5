//! View port: everything the controller knows about the page.
//!
//! The controller, validator and preview renderer only talk to `dyn View`,
//! so they run headless against [`MemoryView`] or against the terminal view
//! used by the binary. Implementations decide what "absent" means: a missing
//! preview container, notice container or progress bar turns the matching
//! call into a silent no-op.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::backend::SubmitResponse;
use crate::models::{Field, Submission};
use crate::notice::Notice;

pub const SUBMIT_LABEL: &str = "Create Resume";
pub const BUSY_LABEL: &str = "Processing...";

pub trait View: Send + Sync {
    /// Current value of a form control, `None` when the control is absent.
    fn get_field(&self, field: Field) -> Option<String>;

    /// Replaces the preview container's content.
    fn render_preview(&self, fragment: &str);

    /// Appends a notice below any already shown.
    fn push_notice(&self, notice: &Notice);

    /// Removes a notice; unknown ids are ignored.
    fn remove_notice(&self, id: Uuid);

    fn set_progress(&self, percent: f64);

    /// Disables the submit control and swaps its label while busy.
    fn set_submit_busy(&self, busy: bool);

    /// Hands a successful response to whatever displays download links.
    fn show_results(&self, _response: &SubmitResponse) {}
}

// ────────────────────────────────────────────────────────────────────────────
// MemoryView: headless document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct MemoryState {
    controls: HashMap<Field, String>,
    preview: Option<String>,
    notices: Option<Vec<Notice>>,
    progress: Option<Vec<f64>>,
    submit_disabled: bool,
    submit_label: String,
    results: Vec<SubmitResponse>,
}

/// In-memory stand-in for the resume form page.
#[derive(Debug)]
pub struct MemoryView {
    state: Mutex<MemoryState>,
}

impl MemoryView {
    /// A page with every control (empty) and every container present.
    pub fn new() -> Self {
        Self::with_submission(&Submission::default())
    }

    pub fn with_submission(submission: &Submission) -> Self {
        let controls = Field::ALL
            .into_iter()
            .map(|f| (f, submission.get(f).to_string()))
            .collect();
        Self {
            state: Mutex::new(MemoryState {
                controls,
                preview: Some(String::new()),
                notices: Some(Vec::new()),
                progress: Some(Vec::new()),
                submit_label: SUBMIT_LABEL.to_string(),
                ..Default::default()
            }),
        }
    }

    /// A page with none of the expected elements.
    pub fn detached() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                submit_label: SUBMIT_LABEL.to_string(),
                ..Default::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Simulates typing into a control, creating it if needed.
    pub fn set_field(&self, field: Field, value: impl Into<String>) {
        self.state().controls.insert(field, value.into());
    }

    pub fn remove_field(&self, field: Field) {
        self.state().controls.remove(&field);
    }

    pub fn preview(&self) -> Option<String> {
        self.state().preview.clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.state().notices.clone().unwrap_or_default()
    }

    pub fn progress(&self) -> Option<f64> {
        self.state().progress.as_ref().and_then(|h| h.last().copied())
    }

    /// Every value the progress bar was set to, oldest first.
    pub fn progress_history(&self) -> Vec<f64> {
        self.state().progress.clone().unwrap_or_default()
    }

    pub fn is_submit_disabled(&self) -> bool {
        self.state().submit_disabled
    }

    pub fn submit_label(&self) -> String {
        self.state().submit_label.clone()
    }

    pub fn results(&self) -> Vec<SubmitResponse> {
        self.state().results.clone()
    }
}

impl Default for MemoryView {
    fn default() -> Self {
        Self::new()
    }
}

impl View for MemoryView {
    fn get_field(&self, field: Field) -> Option<String> {
        self.state().controls.get(&field).cloned()
    }

    fn render_preview(&self, fragment: &str) {
        if let Some(preview) = self.state().preview.as_mut() {
            *preview = fragment.to_string();
        }
    }

    fn push_notice(&self, notice: &Notice) {
        if let Some(notices) = self.state().notices.as_mut() {
            notices.push(notice.clone());
        }
    }

    fn remove_notice(&self, id: Uuid) {
        if let Some(notices) = self.state().notices.as_mut() {
            notices.retain(|n| n.id != id);
        }
    }

    fn set_progress(&self, percent: f64) {
        if let Some(history) = self.state().progress.as_mut() {
            history.push(percent);
        }
    }

    fn set_submit_busy(&self, busy: bool) {
        let mut state = self.state();
        state.submit_disabled = busy;
        state.submit_label = if busy { BUSY_LABEL } else { SUBMIT_LABEL }.to_string();
    }

    fn show_results(&self, response: &SubmitResponse) {
        self.state().results.push(response.clone());
    }
}
