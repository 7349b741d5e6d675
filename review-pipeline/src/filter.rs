use crate::Tally;
use chrono::{DateTime, NaiveDate};
use insights_core::{ClassifiedReport, ClassifiedReview, CoreError};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%B %d, %Y"];

/// Parses the date formats found in fetched reviews: RFC 3339 timestamps,
/// `2025-01-05` and `January 05, 2025`.
pub fn parse_review_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// A view over a classified report restricted by date range and category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub categories: Vec<String>,
}

impl ReportFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_from(mut self, from: NaiveDate) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_to(mut self, to: NaiveDate) -> Self {
        self.to = Some(to);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none() && self.categories.is_empty()
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        match (self.from, self.to) {
            (Some(from), Some(to)) if from > to => Err(CoreError::InvalidInput {
                message: format!("date range is empty: {from} is after {to}"),
            }),
            _ => Ok(()),
        }
    }

    pub fn matches(&self, review: &ClassifiedReview) -> bool {
        if !self.categories.is_empty()
            && !self.categories.iter().any(|label| label == &review.category)
        {
            return false;
        }

        if self.from.is_none() && self.to.is_none() {
            return true;
        }

        let raw = review.date.as_ref().and_then(|date| date.as_str());
        let Some(date) = raw.and_then(parse_review_date) else {
            return false;
        };
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }

    /// Keeps the matching reviews in order and recounts the summary from
    /// them. Provenance fields are carried over unchanged.
    pub fn apply(&self, report: &ClassifiedReport) -> Result<ClassifiedReport, CoreError> {
        self.validate()?;

        let data: Vec<ClassifiedReview> = report
            .data
            .iter()
            .filter(|review| self.matches(review))
            .cloned()
            .collect();

        let mut tally = Tally::new();
        for review in &data {
            tally.record(&review.category, review.sentiment);
        }

        Ok(ClassifiedReport {
            summary: tally.into_summary(&report.summary.metadata()),
            data,
        })
    }
}
