use crate::error::*;
use std::time::Duration;
use tracing::{error, info, warn};

pub trait ErrorExt {
    fn log_error(&self) -> &Self;
    fn log_warn(&self) -> &Self;
    fn is_retryable(&self) -> bool;
    fn retry_after(&self) -> Option<Duration>;
    fn user_friendly_message(&self) -> String;
    fn error_code(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_error(&self) -> &Self {
        error!("CoreError: {}", self);
        match self {
            CoreError::Input(e) => {
                error!("Input error details: {:?}", e);
            }
            CoreError::Lexicon(e) => {
                error!("Lexicon error details: {:?}", e);
            }
            CoreError::Config(e) => {
                error!("Configuration error details: {:?}", e);
            }
            CoreError::Store(e) => {
                error!("Store error details: {:?}", e);
            }
            _ => {}
        }
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        match self {
            CoreError::Lexicon(e) => e.is_retryable(),
            CoreError::Network(e) => e.is_timeout() || e.is_connect(),
            CoreError::RequestFailed { status_code, .. } => {
                matches!(status_code, Some(429) | Some(500..=599))
            }
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            CoreError::Input(e) => e.retry_after(),
            CoreError::Lexicon(e) => e.retry_after(),
            CoreError::Score(e) => e.retry_after(),
            CoreError::Config(e) => e.retry_after(),
            CoreError::Store(e) => e.retry_after(),
            CoreError::RequestFailed {
                status_code: Some(429),
                ..
            } => Some(Duration::from_secs(60)),
            _ if self.is_retryable() => Some(Duration::from_secs(2)),
            _ => None,
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Input(e) => e.user_friendly_message(),
            CoreError::Lexicon(e) => e.user_friendly_message(),
            CoreError::Score(e) => e.user_friendly_message(),
            CoreError::Config(e) => e.user_friendly_message(),
            CoreError::Store(e) => e.user_friendly_message(),
            CoreError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            CoreError::InvalidInput { .. } => {
                "Invalid input provided. Please check your input and try again.".to_string()
            }
            CoreError::RequestFailed { message, .. } => {
                format!("Request failed: {}", message)
            }
            _ => "An unexpected error occurred. Please try again later.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            CoreError::Input(_) => "INPUT".to_string(),
            CoreError::Lexicon(_) => "LEXICON".to_string(),
            CoreError::Score(_) => "SCORE".to_string(),
            CoreError::Config(_) => "CONFIG".to_string(),
            CoreError::Store(_) => "STORE".to_string(),
            CoreError::Io(_) => "IO".to_string(),
            CoreError::Serialization(_) => "SERIALIZATION".to_string(),
            CoreError::Network(_) => "NETWORK".to_string(),
            CoreError::InvalidInput { .. } => "INVALID_INPUT".to_string(),
            CoreError::RequestFailed { .. } => "REQUEST_FAILED".to_string(),
        }
    }
}

impl ErrorExt for InputError {
    fn log_error(&self) -> &Self {
        error!("InputError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("InputError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        match self {
            InputError::BatchNotFound { path } => format!(
                "No fetched reviews found at '{}'. Run the scraper first.",
                path
            ),
            InputError::MalformedBatch { path, .. } => format!(
                "The fetched reviews at '{}' could not be read. Re-run the scraper.",
                path
            ),
        }
    }

    fn error_code(&self) -> String {
        match self {
            InputError::BatchNotFound { .. } => "INPUT_BATCH_NOT_FOUND".to_string(),
            InputError::MalformedBatch { .. } => "INPUT_MALFORMED_BATCH".to_string(),
        }
    }
}

impl ErrorExt for LexiconError {
    fn log_error(&self) -> &Self {
        error!("LexiconError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("LexiconError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        matches!(self, LexiconError::DownloadFailed { .. })
    }

    fn retry_after(&self) -> Option<Duration> {
        if self.is_retryable() {
            Some(Duration::from_secs(2))
        } else {
            None
        }
    }

    fn user_friendly_message(&self) -> String {
        match self {
            LexiconError::ResourceUnavailable { location } => format!(
                "The sentiment lexicon is not available at '{}'. Enable fetching or download it manually.",
                location
            ),
            LexiconError::DownloadFailed { .. } => {
                "Downloading the sentiment lexicon failed. Please check your connection."
                    .to_string()
            }
            LexiconError::MalformedEntry { line_number, .. } => format!(
                "The sentiment lexicon is corrupt near line {}. Delete it to fetch a fresh copy.",
                line_number
            ),
            LexiconError::Empty { .. } => {
                "The sentiment lexicon is empty. Delete it to fetch a fresh copy.".to_string()
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            LexiconError::ResourceUnavailable { .. } => "LEXICON_UNAVAILABLE".to_string(),
            LexiconError::DownloadFailed { .. } => "LEXICON_DOWNLOAD_FAILED".to_string(),
            LexiconError::MalformedEntry { .. } => "LEXICON_MALFORMED_ENTRY".to_string(),
            LexiconError::Empty { .. } => "LEXICON_EMPTY".to_string(),
        }
    }
}

impl ErrorExt for ScoreError {
    fn log_error(&self) -> &Self {
        error!("ScoreError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ScoreError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        "A review could not be scored and was skipped.".to_string()
    }

    fn error_code(&self) -> String {
        match self {
            ScoreError::EmptyText => "SCORE_EMPTY_TEXT".to_string(),
            ScoreError::NonFiniteScore { .. } => "SCORE_NON_FINITE".to_string(),
        }
    }
}

impl ErrorExt for ConfigError {
    fn log_error(&self) -> &Self {
        error!("ConfigError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("ConfigError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false // Config errors are typically not retryable
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        match self {
            ConfigError::FileNotFound { path } => {
                format!("Configuration file '{}' not found.", path)
            }
            ConfigError::InvalidValue { field, .. } => {
                format!("Invalid value for configuration field '{}'.", field)
            }
            ConfigError::DuplicateCategory { label } => format!(
                "Category '{}' is defined more than once. Remove the duplicate or set on_duplicate = \"merge\".",
                label
            ),
            ConfigError::InvalidPattern { label, .. } => {
                format!("The pattern for category '{}' is not a valid regular expression.", label)
            }
            _ => "Configuration error occurred. Please check your settings.".to_string(),
        }
    }

    fn error_code(&self) -> String {
        match self {
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND".to_string(),
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE".to_string(),
            ConfigError::ValidationFailed { .. } => "CONFIG_VALIDATION_FAILED".to_string(),
            ConfigError::DuplicateCategory { .. } => "CONFIG_DUPLICATE_CATEGORY".to_string(),
            ConfigError::InvalidPattern { .. } => "CONFIG_INVALID_PATTERN".to_string(),
            ConfigError::Parse(_) => "CONFIG_PARSE_ERROR".to_string(),
        }
    }
}

impl ErrorExt for StoreError {
    fn log_error(&self) -> &Self {
        error!("StoreError: {}", self);
        self
    }

    fn log_warn(&self) -> &Self {
        warn!("StoreError (warning): {}", self);
        self
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }

    fn user_friendly_message(&self) -> String {
        match self {
            StoreError::ReportNotReady { .. } => {
                "No classified reviews yet. Run the pipeline first.".to_string()
            }
            StoreError::WriteFailed { path, .. } => {
                format!("Could not write the classified reviews to '{}'.", path)
            }
            StoreError::MalformedReport { path, .. } => {
                format!("The classified reviews at '{}' could not be read.", path)
            }
        }
    }

    fn error_code(&self) -> String {
        match self {
            StoreError::ReportNotReady { .. } => "STORE_REPORT_NOT_READY".to_string(),
            StoreError::WriteFailed { .. } => "STORE_WRITE_FAILED".to_string(),
            StoreError::MalformedReport { .. } => "STORE_MALFORMED_REPORT".to_string(),
        }
    }
}

/// Logs a fatal error with its code and the message shown to the user.
#[derive(Debug, Default)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report_error(&self, error: &CoreError) {
        error.log_error();
        info!("Error code: {}", error.error_code());
        info!("User message: {}", error.user_friendly_message());
    }
}
