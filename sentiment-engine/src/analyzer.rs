//! Valence-aware lexicon scoring.
//!
//! Each token contributes its lexicon valence, adjusted by the words that
//! precede it (boosters, negations, idioms), by capitalization and by the
//! contrastive "but". The per-token valences are then folded into a
//! normalized compound score and the positive/neutral/negative shares.

use crate::heuristics::{
    booster_scalar, is_all_caps, is_negation, special_case, C_INCR, NORMALIZATION_ALPHA,
    N_SCALAR,
};
use crate::lexicon::Lexicon;
use crate::PolarityScorer;
use insights_core::{CoreError, PolarityScore, ScoreError};
use std::path::Path;
use std::sync::Arc;

/// Tokenized view of a text.
struct SentiText<'a> {
    words: Vec<&'a str>,
    lowered: Vec<String>,
    is_cap_diff: bool,
}

impl<'a> SentiText<'a> {
    fn new(text: &'a str) -> Self {
        let words: Vec<&str> = text
            .split_whitespace()
            .filter(|token| token.chars().count() > 1)
            .map(strip_punctuation)
            .collect();
        let lowered = words.iter().map(|word| word.to_lowercase()).collect();
        let caps = words.iter().filter(|word| is_all_caps(word)).count();
        let differential = words.len() - caps;

        Self {
            is_cap_diff: differential > 0 && differential < words.len(),
            words,
            lowered,
        }
    }

    fn len(&self) -> usize {
        self.words.len()
    }

    fn lower(&self, index: usize) -> &str {
        &self.lowered[index]
    }
}

/// Strips surrounding punctuation from word tokens; emoticons such as `:)`
/// would vanish entirely and are kept as they are.
fn strip_punctuation(token: &str) -> &str {
    let stripped = token.trim_matches(|c: char| c.is_ascii_punctuation());
    if stripped.chars().count() > 1 {
        stripped
    } else {
        token
    }
}

fn normalize(score: f64) -> f64 {
    let normalized = score / (score * score + NORMALIZATION_ALPHA).sqrt();
    normalized.clamp(-1.0, 1.0)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Emphasis added by exclamation marks (up to four) and repeated question
/// marks.
fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(4);
    let questions = text.matches('?').count();

    let question_amplifier = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * 0.18,
        _ => 0.96,
    };

    exclamations as f64 * 0.292 + question_amplifier
}

/// Booster contribution of `word` to a sentiment-laden word with `valence`.
fn scalar_inc_dec(word: &str, valence: f64, is_cap_diff: bool) -> f64 {
    let Some(mut scalar) = booster_scalar(&word.to_lowercase()) else {
        return 0.0;
    };
    if valence < 0.0 {
        scalar = -scalar;
    }
    if is_all_caps(word) && is_cap_diff {
        if valence > 0.0 {
            scalar += C_INCR;
        } else {
            scalar -= C_INCR;
        }
    }
    scalar
}

fn negation_check(valence: f64, text: &SentiText<'_>, start: usize, i: usize) -> f64 {
    let back = |offset: usize| text.lower(i - offset);
    let so_or_this = |word: &str| word == "so" || word == "this";

    match start {
        0 => {
            if is_negation(back(1)) {
                valence * N_SCALAR
            } else {
                valence
            }
        }
        1 => {
            if back(2) == "never" && so_or_this(back(1)) {
                valence * 1.25
            } else if back(2) == "without" && back(1) == "doubt" {
                valence
            } else if is_negation(back(2)) {
                valence * N_SCALAR
            } else {
                valence
            }
        }
        _ => {
            if back(3) == "never" && (so_or_this(back(2)) || so_or_this(back(1))) {
                valence * 1.25
            } else if back(3) == "without" && (back(2) == "doubt" || back(1) == "doubt") {
                valence
            } else if is_negation(back(3)) {
                valence * N_SCALAR
            } else {
                valence
            }
        }
    }
}

/// Idioms ending at, around or just before `i`. Only called for `i >= 3`.
fn special_idioms_check(mut valence: f64, text: &SentiText<'_>, i: usize) -> f64 {
    let w = |index: usize| text.lower(index);

    let one_zero = format!("{} {}", w(i - 1), w(i));
    let two_one_zero = format!("{} {} {}", w(i - 2), w(i - 1), w(i));
    let two_one = format!("{} {}", w(i - 2), w(i - 1));
    let three_two_one = format!("{} {} {}", w(i - 3), w(i - 2), w(i - 1));
    let three_two = format!("{} {}", w(i - 3), w(i - 2));

    for sequence in [&one_zero, &two_one_zero, &two_one, &three_two_one, &three_two] {
        if let Some(replacement) = special_case(sequence) {
            valence = replacement;
            break;
        }
    }

    if text.len() - 1 > i {
        let zero_one = format!("{} {}", w(i), w(i + 1));
        if let Some(replacement) = special_case(&zero_one) {
            valence = replacement;
        }
    }
    if text.len() - 1 > i + 1 {
        let zero_one_two = format!("{} {} {}", w(i), w(i + 1), w(i + 2));
        if let Some(replacement) = special_case(&zero_one_two) {
            valence = replacement;
        }
    }

    // multi-word boosters such as "kind of"
    for n_gram in [&three_two_one, &three_two, &two_one] {
        if let Some(scalar) = booster_scalar(n_gram) {
            valence += scalar;
        }
    }

    valence
}

/// Halves everything before the first "but" and amplifies everything after.
fn but_check(text: &SentiText<'_>, sentiments: &mut [f64]) {
    let Some(but_index) = text.lowered.iter().position(|word| word == "but") else {
        return;
    };
    for (index, sentiment) in sentiments.iter_mut().enumerate() {
        if index < but_index {
            *sentiment *= 0.5;
        } else if index > but_index {
            *sentiment *= 1.5;
        }
    }
}

fn score_valence(sentiments: &[f64], text: &str) -> PolarityScore {
    if sentiments.is_empty() {
        return PolarityScore::default();
    }

    let amplifier = punctuation_emphasis(text);
    let mut sum: f64 = sentiments.iter().sum();
    if sum > 0.0 {
        sum += amplifier;
    } else if sum < 0.0 {
        sum -= amplifier;
    }
    let compound = normalize(sum);

    let mut positive_sum = 0.0;
    let mut negative_sum = 0.0;
    let mut neutral_count = 0usize;
    for &sentiment in sentiments {
        if sentiment > 0.0 {
            positive_sum += sentiment + 1.0;
        } else if sentiment < 0.0 {
            negative_sum += sentiment - 1.0;
        } else {
            neutral_count += 1;
        }
    }

    if positive_sum > negative_sum.abs() {
        positive_sum += amplifier;
    } else if positive_sum < negative_sum.abs() {
        negative_sum -= amplifier;
    }

    let total = positive_sum + negative_sum.abs() + neutral_count as f64;
    PolarityScore {
        neg: round_to((negative_sum / total).abs(), 3),
        neu: round_to((neutral_count as f64 / total).abs(), 3),
        pos: round_to((positive_sum / total).abs(), 3),
        compound: round_to(compound, 4),
    }
}

#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    lexicon: Arc<Lexicon>,
}

impl SentimentAnalyzer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self {
            lexicon: Arc::new(lexicon),
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, CoreError> {
        Ok(Self::new(Lexicon::load(path).await?))
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn polarity_scores(&self, text: &str) -> PolarityScore {
        let senti = SentiText::new(text);
        let mut sentiments = Vec::with_capacity(senti.len());

        for i in 0..senti.len() {
            let lower = senti.lower(i);
            let kind_of = lower == "kind" && i + 1 < senti.len() && senti.lower(i + 1) == "of";
            if booster_scalar(lower).is_some() || kind_of {
                sentiments.push(0.0);
                continue;
            }
            sentiments.push(self.sentiment_valence(&senti, i));
        }

        but_check(&senti, &mut sentiments);
        score_valence(&sentiments, text)
    }

    fn sentiment_valence(&self, text: &SentiText<'_>, i: usize) -> f64 {
        let lower = text.lower(i);
        let Some(base) = self.lexicon.get(lower) else {
            return 0.0;
        };
        let mut valence = base;

        // "no" directly before another lexicon word acts as a negation, not
        // as a word of its own
        if lower == "no" && i + 1 < text.len() && self.lexicon.contains(text.lower(i + 1)) {
            valence = 0.0;
        }
        if (i > 0 && text.lower(i - 1) == "no")
            || (i > 1 && text.lower(i - 2) == "no")
            || (i > 2 && text.lower(i - 3) == "no" && matches!(text.lower(i - 1), "or" | "nor"))
        {
            valence = base * N_SCALAR;
        }

        if is_all_caps(text.words[i]) && text.is_cap_diff {
            if valence > 0.0 {
                valence += C_INCR;
            } else {
                valence -= C_INCR;
            }
        }

        for start in 0..3 {
            if i > start && !self.lexicon.contains(text.lower(i - (start + 1))) {
                let mut scalar = scalar_inc_dec(text.words[i - (start + 1)], valence, text.is_cap_diff);
                if start == 1 {
                    scalar *= 0.95;
                } else if start == 2 {
                    scalar *= 0.9;
                }
                valence += scalar;
                valence = negation_check(valence, text, start, i);
                if start == 2 {
                    valence = special_idioms_check(valence, text, i);
                }
            }
        }

        self.least_check(valence, text, i)
    }

    fn least_check(&self, valence: f64, text: &SentiText<'_>, i: usize) -> f64 {
        if i > 1 && !self.lexicon.contains(text.lower(i - 1)) && text.lower(i - 1) == "least" {
            if text.lower(i - 2) != "at" && text.lower(i - 2) != "very" {
                return valence * N_SCALAR;
            }
        } else if i > 0 && !self.lexicon.contains(text.lower(i - 1)) && text.lower(i - 1) == "least"
        {
            return valence * N_SCALAR;
        }
        valence
    }
}

impl PolarityScorer for SentimentAnalyzer {
    fn score(&self, text: &str) -> Result<PolarityScore, ScoreError> {
        if text.trim().is_empty() {
            return Err(ScoreError::EmptyText);
        }
        let score = self.polarity_scores(text);
        if !score.compound.is_finite() {
            return Err(ScoreError::NonFiniteScore {
                text_length: text.chars().count(),
            });
        }
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insights_core::Sentiment;

    fn analyzer() -> SentimentAnalyzer {
        let entries = [
            ("good", 1.9),
            ("great", 3.1),
            ("love", 3.2),
            ("bad", -2.5),
            ("hate", -2.7),
            ("no", -1.2),
            ("problem", -1.7),
        ];
        SentimentAnalyzer::new(
            entries
                .iter()
                .map(|(word, valence)| (word.to_string(), *valence))
                .collect(),
        )
    }

    #[test]
    fn test_tokenizer_drops_single_characters_and_strips_punctuation() {
        let text = SentiText::new("I love it, really! :)");
        assert_eq!(text.words, vec!["love", "it", "really", ":)"]);
        assert!(!text.is_cap_diff);
    }

    #[test]
    fn test_cap_differential() {
        assert!(SentiText::new("this is GREAT").is_cap_diff);
        assert!(!SentiText::new("THIS IS GREAT").is_cap_diff);
        assert!(!SentiText::new("this is great").is_cap_diff);
    }

    #[test]
    fn test_single_word_compound() {
        let score = analyzer().polarity_scores("good");
        // 1.9 / sqrt(1.9^2 + 15)
        assert!((score.compound - 0.4404).abs() < 1e-4);
        assert_eq!(score.neg, 0.0);
        assert_eq!(score.neu, 0.0);
        assert_eq!(score.pos, 1.0);
    }

    #[test]
    fn test_no_lexicon_hits_is_neutral() {
        let score = analyzer().polarity_scores("It's an app.");
        assert_eq!(score.compound, 0.0);
        assert_eq!(score.neu, 1.0);
        assert_eq!(score.sentiment(), Sentiment::Neutral);
    }

    #[test]
    fn test_negation_flips_polarity() {
        let analyzer = analyzer();
        let plain = analyzer.polarity_scores("this is good");
        let negated = analyzer.polarity_scores("this is not good");
        assert!(plain.compound > 0.0);
        assert!(negated.compound < 0.0);
        let contracted = analyzer.polarity_scores("this isn't good");
        assert_eq!(contracted.compound, negated.compound);
    }

    #[test]
    fn test_booster_intensifies_and_dampener_softens() {
        let analyzer = analyzer();
        let plain = analyzer.polarity_scores("the app is good").compound;
        let boosted = analyzer.polarity_scores("the app is very good").compound;
        let dampened = analyzer.polarity_scores("the app is slightly good").compound;
        assert!(boosted > plain);
        assert!(dampened < plain);
    }

    #[test]
    fn test_caps_emphasis() {
        let analyzer = analyzer();
        let plain = analyzer.polarity_scores("the app is great").compound;
        let shouted = analyzer.polarity_scores("the app is GREAT").compound;
        assert!(shouted > plain);
    }

    #[test]
    fn test_exclamation_emphasis_is_capped() {
        let analyzer = analyzer();
        let one = analyzer.polarity_scores("good!").compound;
        let four = analyzer.polarity_scores("good!!!!").compound;
        let many = analyzer.polarity_scores("good!!!!!!!!").compound;
        assert!(four > one);
        assert_eq!(four, many);
    }

    #[test]
    fn test_but_shifts_weight_to_second_clause() {
        let score = analyzer().polarity_scores("the design is good but the sync is bad");
        assert!(score.compound < 0.0);
    }

    #[test]
    fn test_no_before_lexicon_word() {
        let score = analyzer().polarity_scores("no problem at all");
        // "no" is neutralized, "problem" is negated
        assert!(score.compound > 0.0);
    }

    #[test]
    fn test_least_negates() {
        let analyzer = analyzer();
        assert!(analyzer.polarity_scores("the least good app").compound < 0.0);
        assert!(analyzer.polarity_scores("at least good").compound > 0.0);
    }

    #[test]
    fn test_special_idiom_overrides_valence() {
        let analyzer = SentimentAnalyzer::new(
            [("heart".to_string(), 0.0), ("broken".to_string(), -1.5)]
                .into_iter()
                .collect(),
        );
        let score = analyzer.polarity_scores("it left me with a broken heart");
        assert!(score.compound < -0.5);
    }

    #[test]
    fn test_score_rejects_empty_text() {
        assert_eq!(analyzer().score("   "), Err(ScoreError::EmptyText));
    }

    #[test]
    fn test_scores_are_deterministic() {
        let analyzer = analyzer();
        let text = "I hate the new layout but love the features!!";
        assert_eq!(analyzer.score(text), analyzer.score(text));
    }
}
