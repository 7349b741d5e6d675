use insights_core::{ClassifierConfig, ConfigError, DuplicateLabelPolicy};
use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct CategoryRule {
    label: String,
    pattern: Regex,
}

impl CategoryRule {
    pub fn new(label: &str, pattern: &str) -> Result<Self, ConfigError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "category label must not be empty".to_string(),
            });
        }

        let pattern = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| ConfigError::InvalidPattern {
                label: label.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            label: label.to_string(),
            pattern,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Ordered category rules; the first matching rule decides the label.
#[derive(Debug, Clone)]
pub struct CategoryRuleSet {
    rules: Vec<CategoryRule>,
    fallback: String,
}

impl CategoryRuleSet {
    /// Builds the rule table from `(label, pattern)` pairs in order.
    pub fn from_pairs<'a, I>(
        pairs: I,
        fallback: &str,
        policy: DuplicateLabelPolicy,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        // patterns are combined per label before compiling so that merged
        // duplicates keep the position of their first definition
        let mut ordered: Vec<(String, Vec<String>)> = Vec::new();

        for (label, pattern) in pairs {
            let label = label.trim();
            match ordered.iter_mut().find(|(existing, _)| existing.as_str() == label) {
                Some((_, patterns)) => match policy {
                    DuplicateLabelPolicy::Reject => {
                        return Err(ConfigError::DuplicateCategory {
                            label: label.to_string(),
                        })
                    }
                    DuplicateLabelPolicy::Merge => {
                        warn!(
                            "Category '{}' is defined more than once; merging its patterns",
                            label
                        );
                        patterns.push(pattern.to_string());
                    }
                },
                None => ordered.push((label.to_string(), vec![pattern.to_string()])),
            }
        }

        let fallback = fallback.trim();
        if fallback.is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "fallback category must not be empty".to_string(),
            });
        }
        if ordered.iter().any(|(label, _)| label == fallback) {
            return Err(ConfigError::ValidationFailed {
                reason: format!("fallback category '{fallback}' is also a rule label"),
            });
        }

        let rules = ordered
            .iter()
            .map(|(label, patterns)| {
                let combined = if patterns.len() == 1 {
                    patterns[0].clone()
                } else {
                    patterns
                        .iter()
                        .map(|pattern| format!("(?:{pattern})"))
                        .collect::<Vec<_>>()
                        .join("|")
                };
                CategoryRule::new(label, &combined)
            })
            .collect::<Result<Vec<_>, _>>()?;

        for rule in &rules {
            debug!("Category '{}' matches /{}/", rule.label(), rule.pattern());
        }
        debug!(
            "Compiled {} category rules with fallback '{}'",
            rules.len(),
            fallback
        );

        Ok(Self {
            rules,
            fallback: fallback.to_string(),
        })
    }

    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ConfigError> {
        Self::from_pairs(
            config
                .rules
                .iter()
                .map(|rule| (rule.label.as_str(), rule.pattern.as_str())),
            &config.fallback,
            config.on_duplicate,
        )
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
