use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Field, Submission};

pub const INVALID_EMAIL: &str = "Invalid email format";
pub const PHONE_TOO_SHORT: &str = "Phone number must have at least 10 digits";
pub const MIN_PHONE_DIGITS: usize = 10;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

/// Validates a submission, collecting every violation in one pass.
///
/// Order of the returned messages:
/// - one `"<label> is required"` per blank field, in declared field order
/// - `"Invalid email format"` if `email` does not look like `local@domain.tld`
/// - the phone message if `phone` has fewer than 10 digits
///
/// The email and phone checks always run, so a blank phone produces both
/// "phone is required" and the digit-count message.
pub fn validate(submission: &Submission) -> Vec<String> {
    let mut errors: Vec<String> = Field::ALL
        .into_iter()
        .filter(|field| submission.get(*field).trim().is_empty())
        .map(|field| format!("{} is required", field.label()))
        .collect();

    if !is_valid_email(&submission.email) {
        errors.push(INVALID_EMAIL.to_string());
    }

    if phone_digit_count(&submission.phone) < MIN_PHONE_DIGITS {
        errors.push(PHONE_TOO_SHORT.to_string());
    }

    errors
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Number of ASCII digits left after stripping everything else.
pub fn phone_digit_count(phone: &str) -> usize {
    phone.chars().filter(|c| c.is_ascii_digit()).count()
}
