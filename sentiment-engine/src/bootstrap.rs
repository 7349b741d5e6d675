//! Makes sure the lexicon file exists before the first text is scored.

use insights_core::{
    CoreError, ErrorExt, ErrorRecovery, LexiconConfig, LexiconError, RecoveryStrategy,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct LexiconBootstrap {
    path: PathBuf,
    url: String,
    fetch_if_missing: bool,
    timeout: Duration,
    max_attempts: usize,
}

impl LexiconBootstrap {
    pub fn new(path: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
            fetch_if_missing: true,
            timeout: Duration::from_secs(30),
            max_attempts: 3,
        }
    }

    pub fn from_config(config: &LexiconConfig) -> Self {
        Self {
            path: config.path.clone(),
            url: config.url.clone(),
            fetch_if_missing: config.fetch_if_missing,
            timeout: Duration::from_secs(config.download_timeout_secs),
            max_attempts: config.max_attempts,
        }
    }

    pub fn with_fetch_if_missing(mut self, enabled: bool) -> Self {
        self.fetch_if_missing = enabled;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Returns the path of a lexicon file that exists, downloading it first
    /// when allowed. Any failure here is fatal for the run.
    pub async fn ensure(&self) -> Result<PathBuf, CoreError> {
        if tokio::fs::try_exists(&self.path).await? {
            debug!("Sentiment lexicon present at {}", self.path.display());
            return Ok(self.path.clone());
        }

        if !self.fetch_if_missing {
            return Err(LexiconError::ResourceUnavailable {
                location: self.path.display().to_string(),
            }
            .into());
        }

        info!(
            "Sentiment lexicon missing at {}, downloading from {}",
            self.path.display(),
            self.url
        );

        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        let body = match self.download(&client).await {
            Ok(body) => body,
            Err(error) => {
                let strategy = self.bounded(ErrorRecovery::determine_strategy(&error));
                let recovered =
                    ErrorRecovery::apply_strategy(strategy, error, || self.download(&client))
                        .await
                        .into_result();
                match recovered {
                    Ok(Some(body)) => body,
                    outcome => {
                        if let Err(error) = outcome {
                            error.log_warn();
                        }
                        return Err(self.unavailable());
                    }
                }
            }
        };

        // refuse to persist something that is not a lexicon, e.g. an HTML error page
        let lexicon = crate::Lexicon::parse(&body)?;
        if lexicon.is_empty() {
            return Err(LexiconError::Empty {
                path: self.url.clone(),
            }
            .into());
        }

        self.persist(&body).await?;
        info!(
            "Downloaded {} lexicon entries to {}",
            lexicon.len(),
            self.path.display()
        );
        Ok(self.path.clone())
    }

    async fn download(&self, client: &reqwest::Client) -> Result<String, CoreError> {
        let response = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.download_failed(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::RequestFailed {
                message: format!("GET {} returned {}", self.url, status),
                status_code: Some(status.as_u16()),
            });
        }

        response.text().await.map_err(|e| self.download_failed(e))
    }

    /// Writes to a sibling temp file first so a partial download never
    /// looks like a lexicon.
    async fn persist(&self, body: &str) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "lexicon".to_string());
        let temp_path = self
            .path
            .with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

        tokio::fs::write(&temp_path, body).await?;
        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            warn!("Failed to move downloaded lexicon into place: {}", e);
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Retries keep the strategy's delays but never exceed the configured
    /// number of attempts, the failed first one included.
    fn bounded(&self, strategy: RecoveryStrategy) -> RecoveryStrategy {
        match strategy {
            RecoveryStrategy::RetryWithBackoff {
                initial_delay,
                max_delay,
                ..
            } => RecoveryStrategy::RetryWithBackoff {
                max_attempts: self.max_attempts.saturating_sub(1),
                initial_delay,
                max_delay,
            },
            other => other,
        }
    }

    fn download_failed(&self, error: reqwest::Error) -> CoreError {
        LexiconError::DownloadFailed {
            url: self.url.clone(),
            reason: error.to_string(),
        }
        .into()
    }

    fn unavailable(&self) -> CoreError {
        LexiconError::ResourceUnavailable {
            location: self.url.clone(),
        }
        .into()
    }
}
