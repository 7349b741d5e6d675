use insights_core::{ClassifiedReport, CoreError, FetchBatch, InputError, PathsConfig, StoreError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};


/// File-backed access to the fetched batch and the classified report.
pub struct ReviewStore {
    input_path: PathBuf,
    output_path: PathBuf,
}

impl ReviewStore {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
        }
    }

    pub fn from_config(paths: &PathsConfig) -> Self {
        Self::new(&paths.input, &paths.output)
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Reads the fetched batch. A missing document is fatal for the run.
    pub async fn load_batch(&self) -> Result<FetchBatch, CoreError> {
        let raw = match tokio::fs::read_to_string(&self.input_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(InputError::BatchNotFound {
                    path: self.input_path.display().to_string(),
                }
                .into())
            }
            Err(e) => return Err(e.into()),
        };

        let batch: FetchBatch =
            serde_json::from_str(&raw).map_err(|e| InputError::MalformedBatch {
                path: self.input_path.display().to_string(),
                details: e.to_string(),
            })?;

        debug!(
            "Loaded {} review records from {}",
            batch.reviews.len(),
            self.input_path.display()
        );
        Ok(batch)
    }

    /// Writes the report atomically: readers see either the previous
    /// document or the complete new one.
    pub async fn save_report(&self, report: &ClassifiedReport) -> Result<(), CoreError> {
        let json = serde_json::to_string_pretty(report)?;

        if let Some(parent) = self
            .output_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.write_failed(e))?;
        }

        let temp_path = self.temp_output_path();
        tokio::fs::write(&temp_path, json)
            .await
            .map_err(|e| self.write_failed(e))?;

        if let Err(e) = tokio::fs::rename(&temp_path, &self.output_path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(self.write_failed(e));
        }

        info!(
            "Wrote {} classified reviews to {}",
            report.data.len(),
            self.output_path.display()
        );
        Ok(())
    }

    /// Reads the last report written. A missing report means the pipeline
    /// has not produced one yet.
    pub async fn load_report(&self) -> Result<ClassifiedReport, CoreError> {
        let raw = match tokio::fs::read_to_string(&self.output_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::ReportNotReady {
                    path: self.output_path.display().to_string(),
                }
                .into())
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&raw).map_err(|e| {
            StoreError::MalformedReport {
                path: self.output_path.display().to_string(),
                details: e.to_string(),
            }
            .into()
        })
    }

    fn temp_output_path(&self) -> PathBuf {
        let file_name = self
            .output_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "classified_reviews.json".to_string());
        self.output_path
            .with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()))
    }

    fn write_failed(&self, error: std::io::Error) -> CoreError {
        StoreError::WriteFailed {
            path: self.output_path.display().to_string(),
            reason: error.to_string(),
        }
        .into()
    }
}
