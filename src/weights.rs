//! Source-language weights.
//!
//! Score files hold one `language score` row per source language. With
//! several files the scores are folded together with the harmonic mean in
//! file order, then normalized so the weights sum to 1.

use crate::error::{read_file, Error, Result};
use log::{debug, info};
use std::collections::HashMap;
use std::path::Path;

/// Normalized per-language weights plus the order languages were declared in
#[derive(Clone, Debug, PartialEq)]
pub struct SourceWeights {
    order: Vec<String>,
    weights: HashMap<String, f64>,
}

/// Harmonic mean of two non-negative scores
pub fn harmonic_mean(a: f64, b: f64) -> f64 {
    if a == 0.0 || b == 0.0 {
        0.0
    } else {
        2.0 / (1.0 / a + 1.0 / b)
    }
}

/// Load `language score` rows, skipping blank lines
pub fn parse_score_file(path: &Path) -> Result<Vec<(String, f64)>> {
    let content = read_file(path)?;
    parse_scores(&content, path)
}

pub fn parse_scores(content: &str, path: &Path) -> Result<Vec<(String, f64)>> {
    let mut rows = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let mut parts = line.split_whitespace();
        let Some(language) = parts.next() else {
            continue;
        };
        let raw = parts
            .next()
            .ok_or_else(|| Error::malformed(path, idx + 1, "missing score column"))?;
        let score: f64 = raw
            .parse()
            .map_err(|_| Error::malformed(path, idx + 1, format!("invalid score '{}'", raw)))?;
        if !score.is_finite() || score < 0.0 {
            return Err(Error::malformed(
                path,
                idx + 1,
                format!("score must be non-negative, got {}", score),
            ));
        }
        rows.push((language.to_string(), score));
    }
    Ok(rows)
}

impl SourceWeights {
    /// Equal weight for every language
    pub fn uniform(languages: &[String]) -> Result<Self> {
        let mut weights = SourceWeights {
            order: Vec::new(),
            weights: HashMap::new(),
        };
        for language in languages {
            if weights.weights.insert(language.clone(), 1.0).is_none() {
                weights.order.push(language.clone());
            }
        }
        weights.normalize()?;
        Ok(weights)
    }

    /// Fold score tables with the harmonic mean, then normalize.
    ///
    /// The first table fixes the language order; later tables may only
    /// name languages it declared.
    pub fn from_tables(tables: &[Vec<(String, f64)>]) -> Result<Self> {
        let mut weights = SourceWeights {
            order: Vec::new(),
            weights: HashMap::new(),
        };
        let Some((first, rest)) = tables.split_first() else {
            return Err(Error::Config("No score tables given".to_string()));
        };

        for (language, score) in first {
            if weights.weights.insert(language.clone(), *score).is_none() {
                weights.order.push(language.clone());
            }
        }
        for table in rest {
            for (language, score) in table {
                let current = weights.weights.get_mut(language).ok_or_else(|| {
                    Error::Config(format!(
                        "Language '{}' is missing from the first score file",
                        language
                    ))
                })?;
                *current = harmonic_mean(*score, *current);
            }
        }

        weights.normalize()?;
        Ok(weights)
    }

    /// Read and combine score files; each must list exactly `expected` languages
    pub fn from_score_files<P: AsRef<Path>>(paths: &[P], expected: usize) -> Result<Self> {
        let mut tables = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let rows = parse_score_file(path)?;
            if rows.len() != expected {
                return Err(Error::Config(format!(
                    "{:?} lists {} languages but {} alignment files were given",
                    path,
                    rows.len(),
                    expected
                )));
            }
            debug!("Loaded {} scores from {:?}", rows.len(), path);
            tables.push(rows);
        }
        let weights = Self::from_tables(&tables)?;
        info!("Source weights: {}", weights.summary());
        Ok(weights)
    }

    fn normalize(&mut self) -> Result<()> {
        let total: f64 = self.weights.values().sum();
        if total <= 0.0 {
            return Err(Error::Config("Language scores sum to zero".to_string()));
        }
        for weight in self.weights.values_mut() {
            *weight /= total;
        }
        Ok(())
    }

    pub fn weight(&self, language: &str) -> Option<f64> {
        self.weights.get(language).copied()
    }

    pub fn languages(&self) -> &[String] {
        &self.order
    }

    /// Fail unless every listed language has a weight
    pub fn require(&self, languages: &[String]) -> Result<()> {
        for language in languages {
            if !self.weights.contains_key(language) {
                return Err(Error::Config(format!("No score given for language '{}'", language)));
            }
        }
        Ok(())
    }

    fn summary(&self) -> String {
        self.order
            .iter()
            .map(|lang| format!("{}={:.4}", lang, self.weights[lang]))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn table(rows: &[(&str, f64)]) -> Vec<(String, f64)> {
        rows.iter().map(|(l, s)| (l.to_string(), *s)).collect()
    }

    #[test]
    fn test_uniform_weights() {
        let weights = SourceWeights::uniform(&["de".to_string(), "fr".to_string()]).unwrap();
        assert!((weights.weight("de").unwrap() - 0.5).abs() < 1e-12);
        assert!((weights.weight("fr").unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(weights.languages(), &["de".to_string(), "fr".to_string()]);
    }

    #[test]
    fn test_normalized_weights_sum_to_one() {
        let scores = table(&[("de", 3.0), ("fr", 0.7), ("cs", 12.5)]);
        let weights = SourceWeights::from_tables(&[scores]).unwrap();
        let total: f64 = weights.languages().iter().filter_map(|l| weights.weight(l)).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(weights.languages().iter().all(|l| weights.weight(l).unwrap() >= 0.0));
    }

    #[test]
    fn test_harmonic_combination() {
        let weights = SourceWeights::from_tables(&[
            table(&[("de", 1.0), ("fr", 4.0)]),
            table(&[("fr", 1.0), ("de", 1.0)]),
        ])
        .unwrap();
        // de: hm(1, 1) = 1, fr: hm(1, 4) = 1.6
        assert!((weights.weight("de").unwrap() - 1.0 / 2.6).abs() < 1e-9);
        assert!((weights.weight("fr").unwrap() - 1.6 / 2.6).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_language_in_later_file() {
        let err = SourceWeights::from_tables(&[table(&[("de", 1.0)]), table(&[("fr", 1.0)])])
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_parse_scores() {
        let path = PathBuf::from("scores.txt");
        let rows = parse_scores("de 0.8\n\nfr\t0.2\n", &path).unwrap();
        assert_eq!(rows, table(&[("de", 0.8), ("fr", 0.2)]));

        assert!(matches!(
            parse_scores("de\n", &path),
            Err(Error::MalformedInput { line: 1, .. })
        ));
        assert!(parse_scores("de -1\n", &path).is_err());
    }

    #[test]
    fn test_zero_scores_rejected() {
        assert!(SourceWeights::from_tables(&[table(&[("de", 0.0)])]).is_err());
    }
}
