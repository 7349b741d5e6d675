pub mod analyzer;
pub mod bootstrap;
pub mod heuristics;
pub mod lexicon;

pub use analyzer::SentimentAnalyzer;
pub use bootstrap::LexiconBootstrap;
pub use lexicon::Lexicon;

use insights_core::{CoreError, LexiconConfig, PolarityScore, ScoreError, Sentiment};
use tracing::info;

/// Maps text to a polarity breakdown.
pub trait PolarityScorer {
    fn score(&self, text: &str) -> Result<PolarityScore, ScoreError>;

    fn label(&self, text: &str) -> Result<Sentiment, ScoreError> {
        self.score(text).map(|score| score.sentiment())
    }
}

/// One-time setup before a batch: makes sure the lexicon resource exists
/// (fetching it if configured to) and loads it. The returned analyzer is
/// used for the remainder of the run without re-validating the resource.
pub async fn initialize(config: &LexiconConfig) -> Result<SentimentAnalyzer, CoreError> {
    let path = LexiconBootstrap::from_config(config).ensure().await?;
    let analyzer = SentimentAnalyzer::from_path(&path).await?;
    info!(
        "Sentiment analyzer ready with {} lexicon entries",
        analyzer.lexicon().len()
    );
    Ok(analyzer)
}
