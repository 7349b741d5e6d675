pub mod rules;

pub use rules::{CategoryRule, CategoryRuleSet};

/// Assigns exactly one category label to a piece of review text.
pub trait CategoryClassifier {
    fn classify(&self, text: &str) -> &str;

    /// Every label `classify` can return, in evaluation order.
    fn labels(&self) -> Vec<&str>;
}

impl CategoryClassifier for CategoryRuleSet {
    fn classify(&self, text: &str) -> &str {
        let lowered = text.to_lowercase();
        self.rules()
            .iter()
            .find(|rule| rule.matches(&lowered))
            .map(CategoryRule::label)
            .unwrap_or_else(|| self.fallback())
    }

    fn labels(&self) -> Vec<&str> {
        self.rules()
            .iter()
            .map(CategoryRule::label)
            .chain(std::iter::once(self.fallback()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_core::{ClassifierConfig, DuplicateLabelPolicy};

    fn default_rules() -> CategoryRuleSet {
        CategoryRuleSet::from_config(&ClassifierConfig::default()).unwrap()
    }

    #[test]
    fn test_classify_default_categories() {
        let rules = default_rules();
        assert_eq!(rules.classify("This app keeps crashing and freezing"), "Crashes");
        assert_eq!(rules.classify("Found a bug in the sync"), "Bugs");
        assert_eq!(rules.classify("Too many ads, very annoying and expensive"), "Complaints");
        assert_eq!(rules.classify("I love this app, it's amazing and smooth"), "Praises");
        assert_eq!(rules.classify("The new theme is different"), "UI/Design");
        assert_eq!(rules.classify("It's an app."), "Other");
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = default_rules();
        // matches Crashes, Bugs and Praises; Crashes is declared first
        assert_eq!(rules.classify("Great app but it crashed with an error"), "Crashes");
        // matches Complaints and Praises
        assert_eq!(rules.classify("Love it, but it is confusing"), "Complaints");
    }

    #[test]
    fn test_matching_is_word_bounded_and_case_insensitive() {
        let rules = default_rules();
        assert_eq!(rules.classify("FORCE CLOSE every time"), "Crashes");
        assert_eq!(rules.classify("forceclose on launch"), "Crashes");
        // "adding" and "badge" contain "ad"/"bad" but not as words
        assert_eq!(rules.classify("adding a badge"), "Other");
        assert_eq!(rules.classify("The UI is cluttered"), "UI/Design");
    }

    #[test]
    fn test_classify_always_returns_known_label() {
        let rules = default_rules();
        let labels = rules.labels();
        assert_eq!(labels.last(), Some(&"Other"));
        for text in [
            "crash",
            "meh",
            "¿qué?",
            "12345",
            "ads ads ads",
            "looks nice",
            "…",
        ] {
            assert!(labels.contains(&rules.classify(text)));
        }
    }

    #[test]
    fn test_classify_is_deterministic() {
        let rules = default_rules();
        let text = "slow and buggy, the layout is a problem";
        let first = rules.classify(text).to_string();
        for _ in 0..10 {
            assert_eq!(rules.classify(text), first);
        }
    }

    #[test]
    fn test_custom_rules_and_fallback() {
        let rules = CategoryRuleSet::from_pairs(
            [("Billing", r"\b(refund|charged?)\b")],
            "Uncategorized",
            DuplicateLabelPolicy::Reject,
        )
        .unwrap();
        assert_eq!(rules.classify("I was charged twice"), "Billing");
        assert_eq!(rules.classify("crashes all the time"), "Uncategorized");
        assert_eq!(rules.labels(), vec!["Billing", "Uncategorized"]);
    }
}
