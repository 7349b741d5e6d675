use crate::{ReportFilter, ReviewPipeline};
use insights_core::{AppConfig, CoreError, PathsConfig, RunSummary};
use review_classifier::CategoryRuleSet;
use review_store::ReviewStore;
use tracing::{debug, info, warn};

/// One end-to-end batch run driven by the application configuration.
pub struct BatchJob;

impl BatchJob {
    /// Loads the batch, bootstraps the lexicon, compiles the rules, runs the
    /// pipeline and writes the report. Any failure before the final write
    /// leaves the previous report untouched.
    pub async fn run(config: &AppConfig) -> Result<RunSummary, CoreError> {
        let store = ReviewStore::from_config(&config.paths);

        let batch = store.load_batch().await?;
        info!(
            "Starting batch run over {} reviews from {} (product {})",
            batch.reviews.len(),
            store.input_path().display(),
            batch
                .product_id
                .as_ref()
                .map_or_else(|| "unknown".to_string(), |id| id.to_string())
        );

        let analyzer = sentiment_engine::initialize(&config.lexicon).await?;
        let rules = CategoryRuleSet::from_config(&config.classifier)?;
        if rules.is_empty() {
            warn!(
                "No category rules configured; every review will be labelled '{}'",
                rules.fallback()
            );
        }

        let pipeline = ReviewPipeline::new(rules, analyzer);
        let report = pipeline.run(&batch.reviews, &batch.metadata())?;

        store.save_report(&report).await?;
        Ok(report.summary)
    }

    /// Summarizes the last written report, restricted by `filter` when it
    /// is not empty. Fails with `ReportNotReady` before the first run.
    pub async fn summarize(
        paths: &PathsConfig,
        filter: &ReportFilter,
    ) -> Result<RunSummary, CoreError> {
        filter.validate()?;

        let store = ReviewStore::from_config(paths);
        debug!("Reading report from {}", store.output_path().display());
        let report = store.load_report().await?;

        if filter.is_empty() {
            return Ok(report.summary);
        }
        Ok(filter.apply(&report)?.summary)
    }
}
