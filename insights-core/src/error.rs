use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Lexicon error: {0}")]
    Lexicon(#[from] LexiconError),

    #[error("Scoring error: {0}")]
    Score(#[from] ScoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Request failed: {message}")]
    RequestFailed {
        message: String,
        status_code: Option<u16>,
    },
}

/// Problems with the fetched review batch. All of them end the run.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Review batch not found: {path}")]
    BatchNotFound { path: String },

    #[error("Malformed review batch {path}: {details}")]
    MalformedBatch { path: String, details: String },
}

#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("Sentiment lexicon unavailable: {location}")]
    ResourceUnavailable { location: String },

    #[error("Lexicon download failed from {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Malformed lexicon entry on line {line_number}: {line}")]
    MalformedEntry { line_number: usize, line: String },

    #[error("Lexicon contains no entries: {path}")]
    Empty { path: String },
}

/// Per-record scoring failures. The pipeline drops the record and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("Cannot score empty text")]
    EmptyText,

    #[error("Polarity score is not a finite number for text of {text_length} characters")]
    NonFiniteScore { text_length: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Category label defined more than once: {label}")]
    DuplicateCategory { label: String },

    #[error("Invalid pattern for category {label}: {reason}")]
    InvalidPattern { label: String, reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Classified report not ready yet: {path}")]
    ReportNotReady { path: String },

    #[error("Failed to write {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    #[error("Malformed classified report {path}: {details}")]
    MalformedReport { path: String, details: String },
}
