use insights_core::{BatchMetadata, RunSummary, Sentiment};
use std::collections::BTreeMap;

/// Running category and sentiment counters for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tally {
    by_category: BTreeMap<String, usize>,
    by_sentiment: BTreeMap<Sentiment, usize>,
    total: usize,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one classified review in exactly one bucket of each mapping.
    pub fn record(&mut self, category: &str, sentiment: Sentiment) {
        *self.by_category.entry(category.to_string()).or_insert(0) += 1;
        *self.by_sentiment.entry(sentiment).or_insert(0) += 1;
        self.total += 1;
    }

    /// Adds another partial tally. The result does not depend on the order
    /// in which partial tallies are merged.
    pub fn merge(&mut self, other: Tally) {
        for (category, count) in other.by_category {
            *self.by_category.entry(category).or_insert(0) += count;
        }
        for (sentiment, count) in other.by_sentiment {
            *self.by_sentiment.entry(sentiment).or_insert(0) += count;
        }
        self.total += other.total;
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn into_summary(self, metadata: &BatchMetadata) -> RunSummary {
        RunSummary {
            by_category: self.by_category,
            by_sentiment: self.by_sentiment,
            total: self.total,
            product_id: metadata.product_id.clone(),
            fetched_at: metadata.fetched_at.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_each_mapping_once() {
        let mut tally = Tally::new();
        tally.record("Crashes", Sentiment::Negative);
        tally.record("Crashes", Sentiment::Neutral);
        tally.record("Praises", Sentiment::Positive);

        let summary = tally.into_summary(&BatchMetadata::default());
        assert_eq!(summary.total, 3);
        assert_eq!(summary.by_category["Crashes"], 2);
        assert_eq!(summary.by_category["Praises"], 1);
        assert_eq!(summary.by_sentiment[&Sentiment::Negative], 1);
        assert_eq!(summary.by_sentiment.values().sum::<usize>(), 3);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let mut a = Tally::new();
        a.record("Bugs", Sentiment::Negative);
        let mut b = Tally::new();
        b.record("Bugs", Sentiment::Neutral);
        b.record("Other", Sentiment::Neutral);

        let mut ab = a.clone();
        ab.merge(b.clone());
        let mut ba = b;
        ba.merge(a);

        assert_eq!(ab, ba);
        assert_eq!(ab.total(), 3);
    }

    #[test]
    fn test_summary_echoes_metadata() {
        let metadata = BatchMetadata {
            product_id: Some("com.example.app".into()),
            fetched_at: Some("2025-01-05T10:00:00Z".into()),
        };
        let summary = Tally::new().into_summary(&metadata);
        assert_eq!(summary.total, 0);
        assert!(summary.by_category.is_empty());
        assert!(summary.by_sentiment.is_empty());
        assert_eq!(summary.metadata(), metadata);
    }
}
