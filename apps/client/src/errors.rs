use thiserror::Error;

/// Client-level error type.
///
/// The `Display` text is what the user sees in the error notice, so callers
/// never need to inspect the variant to report it.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request failed (status {status}): {message}")]
    Status { status: u16, message: String },

    /// The backend answered `success: false`.
    #[error("{0}")]
    Rejected(String),

    #[error("Invalid server response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_displays_bare_message() {
        let err = ClientError::Rejected("Missing required field: name".to_string());
        assert_eq!(err.to_string(), "Missing required field: name");
    }

    #[test]
    fn test_status_display_includes_code() {
        let err = ClientError::Status {
            status: 404,
            message: "File not found".to_string(),
        };
        assert_eq!(err.to_string(), "Request failed (status 404): File not found");
    }
}
