use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Compound score at or above which a text is labelled positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;
/// Compound score at or below which a text is labelled negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// A single review entry as found in the fetched batch document. Every
/// field except the snippet is opaque and passed through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub rating: Option<Value>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub date: Option<Value>,
}

impl ReviewRecord {
    /// The snippet with surrounding whitespace removed, or `None` when there
    /// is nothing left to classify.
    pub fn trimmed_text(&self) -> Option<&str> {
        self.snippet
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// Provenance copied verbatim from the batch into the run summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchMetadata {
    pub product_id: Option<Value>,
    pub fetched_at: Option<Value>,
}

/// The document written by the fetch step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchBatch {
    #[serde(default)]
    pub product_id: Option<Value>,
    #[serde(default)]
    pub fetched_at: Option<Value>,
    #[serde(default)]
    pub reviews: Vec<ReviewRecord>,
}

impl FetchBatch {
    pub fn metadata(&self) -> BatchMetadata {
        BatchMetadata {
            product_id: self.product_id.clone(),
            fetched_at: self.fetched_at.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// The only place the compound thresholds are applied. A non-finite
    /// compound counts as 0.0.
    pub fn from_compound(compound: f64) -> Self {
        let compound = if compound.is_finite() { compound } else { 0.0 };
        if compound >= POSITIVE_THRESHOLD {
            Sentiment::Positive
        } else if compound <= NEGATIVE_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Polarity breakdown of one text. `neg`, `neu` and `pos` are shares in
/// [0, 1]; `compound` is the normalized aggregate in [-1, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PolarityScore {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

impl PolarityScore {
    pub fn sentiment(&self) -> Sentiment {
        Sentiment::from_compound(self.compound)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedReview {
    pub id: Option<Value>,
    pub rating: Option<Value>,
    pub text: String,
    pub date: Option<Value>,
    pub category: String,
    pub sentiment: Sentiment,
    pub vader: PolarityScore,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub by_category: BTreeMap<String, usize>,
    pub by_sentiment: BTreeMap<Sentiment, usize>,
    pub total: usize,
    pub product_id: Option<Value>,
    pub fetched_at: Option<Value>,
}

impl RunSummary {
    pub fn metadata(&self) -> BatchMetadata {
        BatchMetadata {
            product_id: self.product_id.clone(),
            fetched_at: self.fetched_at.clone(),
        }
    }
}

/// The document consumed by the display layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedReport {
    pub summary: RunSummary,
    pub data: Vec<ClassifiedReview>,
}
