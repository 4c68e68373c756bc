//! Weighting of projected tags and merging across source languages.

use crate::alignment::WordAlignment;
use crate::conllu::Corpus;
use crate::error::{Error, Result};
use crate::projection::ProjectedSource;
use crate::types::{Candidate, Projected, TokenTable, EMPTY_FIELD};
use crate::weights::SourceWeights;
use std::collections::BTreeMap;

/// What to do with a source form that had no row in its own block
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissPolicy {
    /// Use the surface form itself as the tag
    #[default]
    PassThrough,
    Drop,
    Fail,
}

/// Attach the source weight to every projected tag of one language
pub fn score_source(
    source: &ProjectedSource,
    weight: f64,
    policy: MissPolicy,
) -> Result<WordAlignment<Candidate>> {
    let mut scored = WordAlignment::new();
    for (sentence, tokens) in &source.words {
        let mut scored_tokens = BTreeMap::new();
        for (token, projected) in tokens {
            let mut candidates = Vec::with_capacity(projected.len());
            for item in projected {
                let tag = match item {
                    Projected::Tag(tag) => tag,
                    Projected::Unmatched(form) => match policy {
                        MissPolicy::PassThrough => form,
                        MissPolicy::Drop => continue,
                        MissPolicy::Fail => {
                            return Err(Error::UnmatchedSource {
                                language: source.language.clone(),
                                sentence: sentence.clone(),
                                form: form.clone(),
                            })
                        }
                    },
                };
                if tag != EMPTY_FIELD {
                    candidates.push(Candidate::new(weight, tag.as_str()));
                }
            }
            scored_tokens.insert(token.clone(), candidates);
        }
        scored.insert(sentence.clone(), scored_tokens);
    }
    Ok(scored)
}

/// Score every source with its normalized weight
pub fn score_sources(
    sources: &[ProjectedSource],
    weights: &SourceWeights,
    policy: MissPolicy,
) -> Result<Vec<WordAlignment<Candidate>>> {
    sources
        .iter()
        .map(|source| {
            let weight = weights.weight(&source.language).ok_or_else(|| {
                Error::Config(format!("No weight for source language '{}'", source.language))
            })?;
            score_source(source, weight, policy)
        })
        .collect()
}

/// Sum the weights of candidates naming the same tag, keeping first-seen order
pub fn aggregate(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut merged: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match merged.iter_mut().find(|c| c.tag == candidate.tag) {
            Some(existing) => existing.weight += candidate.weight,
            None => merged.push(candidate),
        }
    }
    merged
}

/// Merge scored sources over the sentences of the target corpus.
///
/// Sentences and whitespace tokens come from the target corpus, so tokens
/// nothing was aligned to still get an (empty) entry.
pub fn combine(target: &Corpus, scored: &[WordAlignment<Candidate>]) -> TokenTable<Vec<Candidate>> {
    let mut combined = TokenTable::new();
    for sentence in target.sentences() {
        let mut tokens = BTreeMap::new();
        for token in sentence.split_whitespace() {
            if tokens.contains_key(token) {
                continue;
            }
            let mut candidates = Vec::new();
            for source in scored {
                if let Some(aligned) = source.get(sentence).and_then(|t| t.get(token)) {
                    candidates.extend(aligned.iter().cloned());
                }
            }
            tokens.insert(token.to_string(), aggregate(candidates));
        }
        combined.insert(sentence.to_string(), tokens);
    }
    combined
}
