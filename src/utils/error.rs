use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Template error: {message}")]
    TemplateError { message: String },

    #[error("Unexpected status {actual} (expected {expected})")]
    UnexpectedStatus { expected: String, actual: u16 },

    #[error("Assertion failed: {message}")]
    AssertionFailed { status: Option<u16>, message: String },
}

impl ProbeError {
    /// HTTP status of the response the error was raised for, if one arrived.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ProbeError::UnexpectedStatus { actual, .. } => Some(*actual),
            ProbeError::AssertionFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// Short message for the terminal, without the wrapped source chain.
    pub fn user_friendly_message(&self) -> String {
        match self {
            ProbeError::HttpError(e) if e.is_timeout() => {
                "The backend did not answer in time".to_string()
            }
            ProbeError::HttpError(e) if e.is_connect() => {
                "Could not connect to the backend".to_string()
            }
            ProbeError::HttpError(_) => "HTTP request to the backend failed".to_string(),
            ProbeError::IoError(e) => format!("File operation failed: {}", e),
            ProbeError::SerializationError(_) => {
                "Response or report was not valid JSON".to_string()
            }
            ProbeError::ConfigValidationError { field, message } => {
                format!("Invalid configuration ({}): {}", field, message)
            }
            ProbeError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid value for {}: {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ProbeError::HttpError(e) if e.is_timeout() => "Raise --timeout or check backend load",
            ProbeError::HttpError(_) => {
                "Check that the backend is running and --base-url is correct"
            }
            ProbeError::IoError(_) => "Check file paths and permissions",
            ProbeError::SerializationError(_) => "Inspect the raw response with --verbose",
            ProbeError::ConfigValidationError { .. }
            | ProbeError::InvalidConfigValueError { .. } => {
                "Fix the suite file or command line flags"
            }
            ProbeError::TemplateError { .. } => {
                "Make sure the check that captures this variable runs first (depends_on)"
            }
            ProbeError::UnexpectedStatus { .. } | ProbeError::AssertionFailed { .. } => {
                "Compare the backend response against the suite expectations"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;
