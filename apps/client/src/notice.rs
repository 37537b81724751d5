//! Transient notices and the progress bar.
//!
//! Every notice owns its own removal timer. Two notices shown a second apart
//! disappear a second apart; nothing synchronises them.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

use crate::view::View;

pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

impl NoticeKind {
    /// Stylesheet class for the notice container.
    pub fn css_class(self) -> &'static str {
        match self {
            NoticeKind::Success => "alert-success",
            NoticeKind::Error => "alert-danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: Uuid,
    pub message: String,
    pub kind: NoticeKind,
    pub created_at: DateTime<Utc>,
}

impl Notice {
    pub fn new(message: impl Into<String>, kind: NoticeKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.into(),
            kind,
            created_at: Utc::now(),
        }
    }
}

/// A shown notice. Dropping the handle leaves the removal timer running.
pub struct NoticeHandle {
    id: Uuid,
    timer: JoinHandle<()>,
    view: Arc<dyn View>,
}

impl NoticeHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Removes the notice now and cancels its timer.
    pub fn dismiss(self) {
        self.timer.abort();
        self.view.remove_notice(self.id);
    }
}

/// Alert and progress helpers bound to one view.
#[derive(Clone)]
pub struct Feedback {
    view: Arc<dyn View>,
    ttl: Duration,
}

impl Feedback {
    pub fn new(view: Arc<dyn View>) -> Self {
        Self::with_ttl(view, NOTICE_TTL)
    }

    pub fn with_ttl(view: Arc<dyn View>, ttl: Duration) -> Self {
        Self { view, ttl }
    }

    /// Appends a notice and schedules its removal after the TTL.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn show_alert(&self, message: impl Into<String>, kind: NoticeKind) -> NoticeHandle {
        let notice = Notice::new(message, kind);
        debug!(id = %notice.id, ?kind, "showing notice: {}", notice.message);
        self.view.push_notice(&notice);

        let id = notice.id;
        let ttl = self.ttl;
        let view = Arc::clone(&self.view);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            view.remove_notice(id);
        });

        NoticeHandle {
            id,
            timer,
            view: Arc::clone(&self.view),
        }
    }

    /// Sets the bar's fill. Not clamped.
    pub fn update_progress(&self, percent: f64) {
        self.view.set_progress(percent);
    }
}
