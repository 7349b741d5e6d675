use crate::Tally;
use insights_core::{
    BatchMetadata, ClassifiedReport, ClassifiedReview, CoreError, ErrorRecovery, RecoveryStrategy,
    ReviewRecord,
};
use review_classifier::CategoryClassifier;
use sentiment_engine::PolarityScorer;
use tracing::{debug, info};

/// Single-pass batch transform: classify, score and tally each review.
pub struct ReviewPipeline<C, S> {
    classifier: C,
    scorer: S,
}

impl<C, S> ReviewPipeline<C, S>
where
    C: CategoryClassifier,
    S: PolarityScorer,
{
    pub fn new(classifier: C, scorer: S) -> Self {
        Self { classifier, scorer }
    }

    /// Processes the records in input order. Blank snippets and records that
    /// cannot be scored are left out of both the output and the tallies.
    pub fn run(
        &self,
        records: &[ReviewRecord],
        metadata: &BatchMetadata,
    ) -> Result<ClassifiedReport, CoreError> {
        let mut tally = Tally::new();
        let mut data = Vec::with_capacity(records.len());
        let mut blank = 0usize;
        let mut skipped = 0usize;

        for (index, record) in records.iter().enumerate() {
            let Some(text) = record.trimmed_text() else {
                blank += 1;
                continue;
            };

            let Some(review) = self.classify_record(index, record, text)? else {
                skipped += 1;
                continue;
            };

            tally.record(&review.category, review.sentiment);
            data.push(review);
        }

        info!(
            "Classified {} of {} reviews ({} blank, {} unscorable)",
            data.len(),
            records.len(),
            blank,
            skipped
        );

        Ok(ClassifiedReport {
            summary: tally.into_summary(metadata),
            data,
        })
    }

    fn classify_record(
        &self,
        index: usize,
        record: &ReviewRecord,
        text: &str,
    ) -> Result<Option<ClassifiedReview>, CoreError> {
        let score = match self.scorer.score(text) {
            Ok(score) => score,
            Err(e) => {
                let error = CoreError::from(e);
                return match ErrorRecovery::determine_strategy(&error) {
                    RecoveryStrategy::Skip => {
                        debug!("Skipping review at position {}: {}", index, error);
                        Ok(None)
                    }
                    _ => Err(error),
                };
            }
        };

        Ok(Some(ClassifiedReview {
            id: record.id.clone(),
            rating: record.rating.clone(),
            text: text.to_string(),
            date: record.date.clone(),
            category: self.classifier.classify(text).to_string(),
            sentiment: score.sentiment(),
            vader: score,
        }))
    }
}
