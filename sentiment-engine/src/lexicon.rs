//! Token valence table.
//!
//! One entry per line, tab separated: `token<TAB>mean[<TAB>std<TAB>ratings]`.
//! Only the first two columns are used.

use insights_core::{CoreError, LexiconError};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: HashMap<String, f64>,
}

impl Lexicon {
    pub fn parse(raw: &str) -> Result<Self, LexiconError> {
        let mut entries = HashMap::new();

        for (index, line) in raw.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let mut fields = line.split('\t');
            let token = fields.next().map(str::trim).filter(|token| !token.is_empty());
            let valence = fields
                .next()
                .and_then(|value| value.trim().parse::<f64>().ok())
                .filter(|value| value.is_finite());

            match (token, valence) {
                (Some(token), Some(valence)) => {
                    entries.insert(token.to_string(), valence);
                }
                _ => {
                    return Err(LexiconError::MalformedEntry {
                        line_number: index + 1,
                        line: line.to_string(),
                    })
                }
            }
        }

        Ok(Self { entries })
    }

    pub async fn load(path: &Path) -> Result<Self, CoreError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LexiconError::ResourceUnavailable {
                    location: path.display().to_string(),
                }
                .into())
            }
            Err(e) => return Err(e.into()),
        };

        let lexicon = Self::parse(&raw)?;
        if lexicon.is_empty() {
            return Err(LexiconError::Empty {
                path: path.display().to_string(),
            }
            .into());
        }

        debug!(
            "Loaded {} lexicon entries from {}",
            lexicon.len(),
            path.display()
        );
        Ok(lexicon)
    }

    pub fn get(&self, token: &str) -> Option<f64> {
        self.entries.get(token).copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, f64)> for Lexicon {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uses_first_two_columns() {
        let lexicon =
            Lexicon::parse("good\t1.9\t0.9\t[2, 1, 2]\nbad\t-2.5\t0.67\t[-3, -2]\n\n").unwrap();
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.get("good"), Some(1.9));
        assert_eq!(lexicon.get("bad"), Some(-2.5));
        assert!(!lexicon.contains("ugly"));
    }

    #[test]
    fn test_parse_accepts_crlf_and_two_columns() {
        let lexicon = Lexicon::parse("ok\t1.2\r\n:)\t2.0\r\n").unwrap();
        assert_eq!(lexicon.get("ok"), Some(1.2));
        assert_eq!(lexicon.get(":)"), Some(2.0));
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let err = Lexicon::parse("good\t1.9\nbroken line\n").unwrap_err();
        match err {
            LexiconError::MalformedEntry { line_number, line } => {
                assert_eq!(line_number, 2);
                assert_eq!(line, "broken line");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(Lexicon::parse("nan\tNaN\n").is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file_is_unavailable() {
        let path = std::env::temp_dir().join(format!("lexicon_{}.txt", uuid::Uuid::new_v4()));
        let err = Lexicon::load(&path).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Lexicon(LexiconError::ResourceUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_empty_file_is_rejected() {
        let path = std::env::temp_dir().join(format!("lexicon_{}.txt", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, "\n\n").await.unwrap();
        let err = Lexicon::load(&path).await.unwrap_err();
        assert!(matches!(err, CoreError::Lexicon(LexiconError::Empty { .. })));
        tokio::fs::remove_file(&path).await.unwrap();
    }
}
