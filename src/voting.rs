//! First-pass decision: strict maximum of aggregated weights.

use crate::types::{Candidate, Decision, TokenTable, WEIGHT_EPSILON};
use std::collections::BTreeMap;

/// Per-token decisions for the whole target corpus
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecisionTable {
    sentences: TokenTable<Decision>,
}

impl DecisionTable {
    pub fn get(&self, sentence: &str, token: &str) -> Option<&Decision> {
        self.sentences.get(sentence).and_then(|tokens| tokens.get(token))
    }

    pub fn insert(&mut self, sentence: &str, token: &str, decision: Decision) {
        self.sentences
            .entry(sentence.to_string())
            .or_default()
            .insert(token.to_string(), decision);
    }

    /// (sentence, token, decision) in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &Decision)> {
        self.sentences.iter().flat_map(|(sentence, tokens)| {
            tokens
                .iter()
                .map(move |(token, decision)| (sentence.as_str(), token.as_str(), decision))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &str, &mut Decision)> {
        self.sentences.iter_mut().flat_map(|(sentence, tokens)| {
            tokens
                .iter_mut()
                .map(move |(token, decision)| (sentence.as_str(), token.as_str(), decision))
        })
    }

    pub fn count(&self, predicate: impl Fn(&Decision) -> bool) -> usize {
        self.iter().filter(|(_, _, decision)| predicate(*decision)).count()
    }
}

/// Tags sharing the highest weight, sorted
pub fn maximal_tags(candidates: &[Candidate]) -> Vec<String> {
    let Some(max) = candidates.iter().map(|c| c.weight).reduce(f64::max) else {
        return Vec::new();
    };
    let mut tags: Vec<String> = candidates
        .iter()
        .filter(|c| (c.weight - max).abs() <= WEIGHT_EPSILON)
        .map(|c| c.tag.clone())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

/// Resolve a token only when one tag holds the maximum on its own
pub fn vote(candidates: &[Candidate]) -> Decision {
    Decision::from_tags(maximal_tags(candidates))
}

pub fn decide_all(combined: &TokenTable<Vec<Candidate>>) -> DecisionTable {
    let sentences = combined
        .iter()
        .map(|(sentence, tokens)| {
            let decisions: BTreeMap<String, Decision> = tokens
                .iter()
                .map(|(token, candidates)| (token.clone(), vote(candidates)))
                .collect();
            (sentence.clone(), decisions)
        })
        .collect();
    DecisionTable { sentences }
}
