//! Terminal front-end: a `View` that prints instead of touching a page.
//!
//! Notices and progress go to stderr so stdout carries only the preview
//! fragment or the results JSON.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use tracing::{debug, warn};
use uuid::Uuid;

use resume_client::backend::SubmitResponse;
use resume_client::models::{Field, Submission};
use resume_client::notice::{Notice, NoticeKind};
use resume_client::view::{View, BUSY_LABEL};

pub struct TerminalView {
    fields: Submission,
}

impl TerminalView {
    pub fn new(fields: Submission) -> Self {
        Self { fields }
    }
}

impl View for TerminalView {
    fn get_field(&self, field: Field) -> Option<String> {
        Some(self.fields.get(field).to_string())
    }

    fn render_preview(&self, fragment: &str) {
        println!("{fragment}");
    }

    fn push_notice(&self, notice: &Notice) {
        let tag = match notice.kind {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        };
        eprintln!("[{tag}] {}", notice.message);
    }

    fn remove_notice(&self, id: Uuid) {
        debug!(%id, "notice expired");
    }

    fn set_progress(&self, percent: f64) {
        eprintln!("Progress: {percent}%");
    }

    fn set_submit_busy(&self, busy: bool) {
        if busy {
            eprintln!("{BUSY_LABEL}");
        }
    }

    fn show_results(&self, response: &SubmitResponse) {
        match serde_json::to_string_pretty(response) {
            Ok(json) => println!("{json}"),
            Err(e) => warn!("could not render results: {e}"),
        }
    }
}

/// Asks for each field on stdin, one line per field.
pub fn prompt_submission() -> Result<Submission> {
    let stdin = io::stdin();
    let mut stderr = io::stderr();
    let mut submission = Submission::default();

    eprintln!("Welcome to the Resume Builder!");
    for field in Field::ALL {
        eprint!("{}: ", field.prompt());
        stderr.flush()?;

        let mut line = String::new();
        stdin
            .lock()
            .read_line(&mut line)
            .with_context(|| format!("Failed to read {}", field.label()))?;
        submission.set(field, line.trim_end_matches(['\r', '\n']));
    }

    Ok(submission)
}
