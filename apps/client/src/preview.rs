//! Live preview renderer.
//!
//! Pure function of the field mapping: identical input renders identical
//! markup. The fragment mirrors the final resume's layout closely enough for
//! the user to see what they typed land in the right place.

use serde::{Deserialize, Serialize};

use crate::models::Submission;
use crate::view::View;

pub const EDUCATION_TITLE: &str = "Education";
pub const EXPERIENCE_TITLE: &str = "Experience";
pub const SKILLS_TITLE: &str = "Skills";

/// How field values are interpolated into markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Markup {
    /// Markup-significant characters are entity-encoded.
    #[default]
    Escaped,
    /// Values are inserted verbatim and interpreted as markup.
    Raw,
}

impl Markup {
    pub fn apply(self, value: &str) -> String {
        match self {
            Markup::Escaped => escape_html(value),
            Markup::Raw => value.to_string(),
        }
    }
}

/// Renders the preview fragment: heading, contact line, job title, then the
/// Education, Experience and Skills sections. Every comma-separated skill gets
/// its own tag, empty ones included.
pub fn render_preview(submission: &Submission, markup: Markup) -> String {
    let text = |value: &str| markup.apply(value);

    let tags: String = submission
        .skills()
        .into_iter()
        .map(|skill| format!("<span class=\"skill-tag\">{}</span>", text(skill)))
        .collect();

    let mut html = String::new();
    html.push_str(&format!("<h2>{}</h2>\n", text(&submission.name)));
    html.push_str(&format!(
        "<p class=\"contact\">{} | {}</p>\n",
        text(&submission.email),
        text(&submission.phone)
    ));
    html.push_str(&format!(
        "<p class=\"job-title\">{}</p>\n",
        text(&submission.job_title)
    ));
    html.push_str(&section(EDUCATION_TITLE, &format!("<p>{}</p>", text(&submission.education))));
    html.push_str(&section(EXPERIENCE_TITLE, &format!("<p>{}</p>", text(&submission.experience))));
    html.push_str(&section(SKILLS_TITLE, &format!("<div class=\"skills\">{tags}</div>")));
    html
}

/// Re-reads the form through the view and replaces the preview.
pub fn refresh_preview(view: &dyn View, markup: Markup) {
    let submission = Submission::from_view(view);
    view.render_preview(&render_preview(&submission, markup));
}

fn section(title: &str, body: &str) -> String {
    format!("<div class=\"preview-section\">\n<h3>{title}</h3>\n{body}\n</div>\n")
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
