//! Application configuration loaded from a TOML file.
//!
//! Every field has a default so that an empty file (or no file at all)
//! yields a runnable configuration.

use crate::{ConfigError, CoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

pub const DEFAULT_LEXICON_URL: &str =
    "https://raw.githubusercontent.com/cjhutto/vaderSentiment/master/vaderSentiment/vader_lexicon.txt";

/// Label assigned when no category rule matches.
pub const FALLBACK_CATEGORY: &str = "Other";

/// Built-in category rules in evaluation order.
pub const DEFAULT_CATEGORY_RULES: &[(&str, &str)] = &[
    (
        "Crashes",
        r"\b(crash|crashing|crashed|freeze[sd]?|hangs?|force\s*close|stuck)\b",
    ),
    (
        "Bugs",
        r"\b(bug|glitch|issue|error|fail(ed|ure)?|problem|broken|fix)\b",
    ),
    (
        "Complaints",
        r"\b(slow|lag|ads?|ad-?heavy|paywall|bad|hate|worst|disappoint|annoy|expensive|confusing)\b",
    ),
    (
        "Praises",
        r"\b(love|great|amazing|awesome|nice|excellent|useful|best|fantastic|smooth)\b",
    ),
    ("UI/Design", r"\b(interface|ui|design|layout|look|feel|theme)\b"),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub lexicon: LexiconConfig,
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Batch document produced by the fetch step.
    pub input: PathBuf,
    /// Report document read by the display layer.
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("reviews/fetch.json"),
            output: PathBuf::from("reviews/classified_reviews.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    pub path: PathBuf,
    pub url: String,
    pub fetch_if_missing: bool,
    pub download_timeout_secs: u64,
    pub max_attempts: usize,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("reviews/vader_lexicon.txt"),
            url: DEFAULT_LEXICON_URL.to_string(),
            fetch_if_missing: true,
            download_timeout_secs: 30,
            max_attempts: 3,
        }
    }
}

/// What to do when the same category label appears more than once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateLabelPolicy {
    /// Refuse to build the rule table.
    #[default]
    Reject,
    /// Keep the first position and match either pattern.
    Merge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRuleConfig {
    pub label: String,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub fallback: String,
    pub on_duplicate: DuplicateLabelPolicy,
    pub rules: Vec<CategoryRuleConfig>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            fallback: FALLBACK_CATEGORY.to_string(),
            on_duplicate: DuplicateLabelPolicy::default(),
            rules: DEFAULT_CATEGORY_RULES
                .iter()
                .map(|(label, pattern)| CategoryRuleConfig {
                    label: label.to_string(),
                    pattern: pattern.to_string(),
                })
                .collect(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, CoreError> {
        let config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    }
                    .into());
                }
                debug!("Loading configuration from {}", path.display());
                let raw = std::fs::read_to_string(path)?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paths.input.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "paths.input must not be empty".to_string(),
            });
        }
        if self.paths.output.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "paths.output must not be empty".to_string(),
            });
        }
        if self.lexicon.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "lexicon.path must not be empty".to_string(),
            });
        }

        let url = Url::parse(&self.lexicon.url).map_err(|e| ConfigError::InvalidValue {
            field: "lexicon.url".to_string(),
            value: format!("{} ({e})", self.lexicon.url),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                field: "lexicon.url".to_string(),
                value: self.lexicon.url.clone(),
            });
        }

        if self.lexicon.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "lexicon.max_attempts".to_string(),
                value: "0".to_string(),
            });
        }
        if self.lexicon.download_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "lexicon.download_timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        if self.classifier.fallback.trim().is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "classifier.fallback must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
