//! Replace aligned source tokens by their UPOS in the source corpus.

use crate::alignment::{AlignedSource, SentenceAlignment, WordAlignment};
use crate::conllu::{Block, Corpus, Field};
use crate::types::Projected;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Alignments of one source language after projection
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectedSource {
    pub language: String,
    pub sentences: SentenceAlignment,
    pub words: WordAlignment<Projected>,
}

impl ProjectedSource {
    /// Projected items aligned with `token` in `sentence`
    pub fn aligned(&self, sentence: &str, token: &str) -> Option<&[Projected]> {
        self.words
            .get(sentence)
            .and_then(|tokens| tokens.get(token))
            .map(Vec::as_slice)
    }
}

/// Look up the UPOS of the first row in `block` with this surface form
pub fn project_form(block: Option<&Block>, form: &str) -> Projected {
    match block.and_then(|block| block.lookup(form, Field::Upos)) {
        Some(tag) => Projected::Tag(tag.to_string()),
        None => Projected::Unmatched(form.to_string()),
    }
}

/// Project every aligned source token of `source` through its annotated corpus
pub fn project(source: AlignedSource, corpus: &Corpus) -> ProjectedSource {
    let AlignedSource {
        language,
        sentences,
        words,
    } = source;

    let mut missing_blocks = 0usize;
    let mut unmatched = 0usize;
    let mut projected = WordAlignment::new();

    for (target, tokens) in words {
        let block = sentences.get(&target).and_then(|text| corpus.find(text));
        if block.is_none() {
            missing_blocks += 1;
            debug!("[{}] no annotated block for the source of {:?}", language, target);
        }

        let tokens = tokens
            .into_iter()
            .map(|(token, forms)| {
                let tags: Vec<Projected> = forms
                    .iter()
                    .map(|form| project_form(block, form))
                    .inspect(|item| {
                        if matches!(item, Projected::Unmatched(_)) {
                            unmatched += 1;
                        }
                    })
                    .collect();
                (token, tags)
            })
            .collect();
        projected.insert(target, tokens);
    }

    if missing_blocks > 0 {
        warn!("[{}] {} sentences have no block in the annotated corpus", language, missing_blocks);
    }
    if unmatched > 0 {
        warn!("[{}] {} aligned source forms were not found in their block", language, unmatched);
    }

    ProjectedSource {
        language,
        sentences,
        words: projected,
    }
}
