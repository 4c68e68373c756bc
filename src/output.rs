//! Substitution of final tags into the target skeleton.

use crate::conllu::{render_blocks, Block, Line};
use crate::sampler::TieBreaker;
use crate::stats::{LemmaIndex, PosStats};
use crate::types::Decision;
use crate::voting::DecisionTable;

/// Lemma index used as a last statistical fallback
pub struct LemmaFallback<'a> {
    pub stats: &'a PosStats,
    pub index: &'a LemmaIndex<'a>,
}

pub struct OutputWriter<'a, S: TieBreaker> {
    decisions: &'a DecisionTable,
    word_stats: &'a PosStats,
    lemma_fallback: Option<LemmaFallback<'a>>,
    default_tag: &'a str,
    sampler: &'a mut S,
}

impl<'a, S: TieBreaker> OutputWriter<'a, S> {
    pub fn new(
        decisions: &'a DecisionTable,
        word_stats: &'a PosStats,
        default_tag: &'a str,
        sampler: &'a mut S,
    ) -> Self {
        OutputWriter {
            decisions,
            word_stats,
            lemma_fallback: None,
            default_tag,
            sampler,
        }
    }

    pub fn with_lemma_fallback(mut self, fallback: LemmaFallback<'a>) -> Self {
        self.lemma_fallback = Some(fallback);
        self
    }

    /// Replace the UPOS column of every token row; range rows are left alone
    pub fn substitute(&mut self, blocks: &mut [Block]) {
        for block in blocks.iter_mut() {
            let sentence = block.text.clone();
            for line in block.lines.iter_mut() {
                if let Line::Token(row) = line {
                    if row.is_range() {
                        continue;
                    }
                    let tag = self.tag_for(sentence.as_deref(), row.form());
                    row.set_upos(tag);
                }
            }
        }
    }

    /// Substitute and serialize, one string per output line
    pub fn render(&mut self, mut blocks: Vec<Block>) -> Vec<String> {
        self.substitute(&mut blocks);
        render_blocks(&blocks)
    }

    /// Final tag of `form` in `sentence`; never empty
    pub fn tag_for(&mut self, sentence: Option<&str>, form: &str) -> String {
        let decisions = self.decisions;
        let decision = sentence.and_then(|s| decisions.get(s, form));
        let tag = match decision {
            Some(Decision::Resolved(tag)) => Some(tag.clone()),
            Some(Decision::Ambiguous(tags)) => self.settle(form, tags),
            Some(Decision::Unresolved) => self.from_stats(sentence, form),
            None if form.contains(char::is_whitespace) => self.from_parts(sentence, form),
            None => self.from_stats(sentence, form),
        };
        tag.unwrap_or_else(|| self.default_tag.to_string())
    }

    /// Pick among tied tags, preferring the most frequent one
    fn settle(&mut self, form: &str, tags: &[String]) -> Option<String> {
        match self.word_stats.majority_among(form, tags) {
            Decision::Resolved(tag) => Some(tag),
            Decision::Ambiguous(best) => self.sampler.pick(&best),
            Decision::Unresolved => self.sampler.pick(tags),
        }
    }

    fn sample(&mut self, outcome: Decision) -> Option<String> {
        match outcome {
            Decision::Resolved(tag) => Some(tag),
            Decision::Ambiguous(tags) => self.sampler.pick(&tags),
            Decision::Unresolved => None,
        }
    }

    fn from_stats(&mut self, sentence: Option<&str>, form: &str) -> Option<String> {
        let outcome = match self.word_stats.majority(form) {
            Decision::Unresolved => self.lemma_majority(sentence, form),
            found => found,
        };
        self.sample(outcome)
    }

    fn lemma_majority(&self, sentence: Option<&str>, form: &str) -> Decision {
        let Some(fallback) = &self.lemma_fallback else {
            return Decision::Unresolved;
        };
        match fallback.index.lemma(sentence.unwrap_or_default(), form) {
            Some(lemma) => fallback.stats.majority(&lemma),
            None => Decision::Unresolved,
        }
    }

    /// A form holding several target tokens: collect what its parts resolved to
    fn from_parts(&mut self, sentence: Option<&str>, form: &str) -> Option<String> {
        let decisions = self.decisions;
        let mut tags: Vec<String> = Vec::new();
        for part in form.split_whitespace() {
            let tag = match sentence.and_then(|s| decisions.get(s, part)) {
                Some(Decision::Resolved(tag)) => Some(tag.clone()),
                Some(Decision::Unresolved) => self.from_stats(sentence, part),
                _ => None,
            };
            if let Some(tag) = tag {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
        }
        match tags.len() {
            0 => None,
            1 => tags.pop(),
            _ => self.sampler.pick(&tags),
        }
    }
}
