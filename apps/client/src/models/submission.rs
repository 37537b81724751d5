use serde::{Deserialize, Serialize};

use crate::view::View;

/// One of the eight form controls the resume builder collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Phone,
    JobTitle,
    Company,
    Education,
    Experience,
    Skills,
}

impl Field {
    /// Declared field order. Validation errors and the multipart body follow it.
    pub const ALL: [Field; 8] = [
        Field::Name,
        Field::Email,
        Field::Phone,
        Field::JobTitle,
        Field::Company,
        Field::Education,
        Field::Experience,
        Field::Skills,
    ];

    /// Form/wire key, e.g. `job_title`.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::JobTitle => "job_title",
            Field::Company => "company",
            Field::Education => "education",
            Field::Experience => "experience",
            Field::Skills => "skills",
        }
    }

    /// Human-readable key used in "<label> is required".
    pub fn label(self) -> String {
        self.key().replace('_', " ")
    }

    /// Prompt shown by the interactive terminal front-end.
    pub fn prompt(self) -> &'static str {
        match self {
            Field::Name => "Full Name",
            Field::Email => "Email",
            Field::Phone => "Phone",
            Field::JobTitle => "Job Title",
            Field::Company => "Company",
            Field::Education => "Education",
            Field::Experience => "Work Experience",
            Field::Skills => "Skills (comma-separated)",
        }
    }
}

/// The field mapping captured from the form at one instant.
///
/// Built fresh on every input/submit event and dropped afterwards.
/// A control that is missing from the view reads as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub job_title: String,
    pub company: String,
    pub education: String,
    pub experience: String,
    /// Comma-delimited, see [`Submission::skills`].
    pub skills: String,
}

impl Submission {
    pub fn from_view(view: &dyn View) -> Self {
        let mut submission = Submission::default();
        for field in Field::ALL {
            if let Some(value) = view.get_field(field) {
                submission.set(field, value);
            }
        }
        submission
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::JobTitle => &self.job_title,
            Field::Company => &self.company,
            Field::Education => &self.education,
            Field::Experience => &self.experience,
            Field::Skills => &self.skills,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::JobTitle => &mut self.job_title,
            Field::Company => &mut self.company,
            Field::Education => &mut self.education,
            Field::Experience => &mut self.experience,
            Field::Skills => &mut self.skills,
        };
        *slot = value.into();
    }

    /// Splits `skills` on `,` and trims each piece. Empty pieces are kept,
    /// so `"a,,b"` yields three entries.
    pub fn skills(&self) -> Vec<&str> {
        self.skills.split(',').map(str::trim).collect()
    }

    /// `(key, value)` pairs in declared field order.
    pub fn form_pairs(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        Field::ALL.into_iter().map(move |f| (f.key(), self.get(f)))
    }
}
