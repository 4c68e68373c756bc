//! Word and lemma POS frequency indexes.
//!
//! Both indexes are snapshots rebuilt from the tokens that currently hold a
//! single resolved tag; they are never updated in place by the passes that
//! read them.

use crate::conllu::{Corpus, Field};
use crate::types::{Decision, EMPTY_FIELD};
use crate::voting::DecisionTable;
use serde::Serialize;
use std::collections::BTreeMap;

/// Lowercased key -> tag -> occurrences
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PosStats {
    counts: BTreeMap<String, BTreeMap<String, usize>>,
}

impl PosStats {
    /// Count resolved tags per lowercased surface form
    pub fn from_words(decisions: &DecisionTable) -> Self {
        let mut stats = PosStats::default();
        for (_, token, decision) in decisions.iter() {
            if let Some(tag) = decision.resolved() {
                stats.record(token, tag);
            }
        }
        stats
    }

    /// Count resolved tags per lemma of the target corpus
    pub fn from_lemmas(decisions: &DecisionTable, lemmas: &LemmaIndex) -> Self {
        let mut stats = PosStats::default();
        for (sentence, token, decision) in decisions.iter() {
            if let (Some(tag), Some(lemma)) = (decision.resolved(), lemmas.lemma(sentence, token)) {
                stats.record(&lemma, tag);
            }
        }
        stats
    }

    pub fn record(&mut self, key: &str, tag: &str) {
        *self
            .counts
            .entry(key.to_lowercase())
            .or_default()
            .entry(tag.to_string())
            .or_insert(0) += 1;
    }

    pub fn counts(&self, key: &str) -> Option<&BTreeMap<String, usize>> {
        self.counts.get(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Most frequent tag(s) seen for `key`
    pub fn majority(&self, key: &str) -> Decision {
        match self.counts(key) {
            Some(counts) => most_frequent(counts.iter()),
            None => Decision::Unresolved,
        }
    }

    /// Most frequent tag(s) for `key`, considering only `tags`
    pub fn majority_among(&self, key: &str, tags: &[String]) -> Decision {
        match self.counts(key) {
            Some(counts) => most_frequent(counts.iter().filter(|(tag, _)| tags.contains(*tag))),
            None => Decision::Unresolved,
        }
    }
}

fn most_frequent<'a>(counts: impl Iterator<Item = (&'a String, &'a usize)>) -> Decision {
    let mut best = 0usize;
    let mut tags: Vec<String> = Vec::new();
    for (tag, &count) in counts {
        if count > best {
            best = count;
            tags.clear();
            tags.push(tag.clone());
        } else if count == best && count > 0 {
            tags.push(tag.clone());
        }
    }
    Decision::from_tags(tags)
}

/// Lemma lookup against the annotated target corpus
pub struct LemmaIndex<'a> {
    corpus: &'a Corpus,
}

impl<'a> LemmaIndex<'a> {
    pub fn new(corpus: &'a Corpus) -> Self {
        LemmaIndex { corpus }
    }

    /// Lowercased lemma of `token` in `sentence`.
    ///
    /// The token itself stands in for its lemma when no row has that form;
    /// `_` lemmas give `None`.
    pub fn lemma(&self, sentence: &str, token: &str) -> Option<String> {
        let lemma = self
            .corpus
            .find(sentence)
            .and_then(|block| block.lookup(token, Field::Lemma))
            .unwrap_or(token);
        if lemma == EMPTY_FIELD {
            None
        } else {
            Some(lemma.to_lowercase())
        }
    }
}
