//! Second-stage decisions: breaking voting ties and filling empty tokens
//! from corpus-wide frequency statistics.

use crate::stats::{LemmaIndex, PosStats};
use crate::types::Decision;
use crate::voting::DecisionTable;
use log::info;

/// How ties left after the word-frequency pass are handled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// Consult lemma, then word frequencies
    #[default]
    Frequency,
    /// Leave the tie to uniform sampling when writing output
    Random,
}

/// Which index fills tokens that received no candidate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GapFill {
    #[default]
    WordForm,
    Lemma,
}

/// Outcome of the gap-filling pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FillReport {
    pub empty: usize,
    pub filled: usize,
}

impl FillReport {
    pub fn unfilled(&self) -> usize {
        self.empty - self.filled
    }
}

pub struct Disambiguator<'a> {
    lemmas: LemmaIndex<'a>,
    tie_break: TieBreak,
    gap_fill: GapFill,
}

/// Apply a frequency lookup; an unknown key leaves the token as it was
fn narrow(current: &mut Decision, outcome: Decision) -> bool {
    match outcome {
        Decision::Unresolved => false,
        outcome => {
            let changed = *current != outcome;
            *current = outcome;
            changed
        }
    }
}

impl<'a> Disambiguator<'a> {
    pub fn new(lemmas: LemmaIndex<'a>, tie_break: TieBreak, gap_fill: GapFill) -> Self {
        Disambiguator {
            lemmas,
            tie_break,
            gap_fill,
        }
    }

    pub fn word_stats(&self, decisions: &DecisionTable) -> PosStats {
        PosStats::from_words(decisions)
    }

    pub fn lemma_stats(&self, decisions: &DecisionTable) -> PosStats {
        PosStats::from_lemmas(decisions, &self.lemmas)
    }

    /// Phase A: resolve voting ties. Returns the number of tokens changed.
    pub fn break_ties(&self, decisions: &mut DecisionTable) -> usize {
        // Each ambiguous occurrence votes once for every tag it is tied on
        let mut votes = self.word_stats(decisions);
        for (_, token, decision) in decisions.iter() {
            if let Decision::Ambiguous(tags) = decision {
                for tag in tags {
                    votes.record(token, tag);
                }
            }
        }

        let mut changed = 0;
        for (_, token, decision) in decisions.iter_mut() {
            if let Decision::Ambiguous(tags) = &*decision {
                let outcome = votes.majority_among(token, tags);
                if narrow(decision, outcome) {
                    changed += 1;
                }
            }
        }

        if self.tie_break == TieBreak::Frequency {
            let words = self.word_stats(decisions);
            let lemmas = self.lemma_stats(decisions);
            for (sentence, token, decision) in decisions.iter_mut() {
                let Decision::Ambiguous(tags) = &*decision else {
                    continue;
                };
                let by_lemma = match self.lemmas.lemma(sentence, token) {
                    Some(lemma) => lemmas.majority_among(&lemma, tags),
                    None => Decision::Unresolved,
                };
                let outcome = match by_lemma {
                    Decision::Unresolved => words.majority_among(token, tags),
                    found => found,
                };
                if narrow(decision, outcome) {
                    changed += 1;
                }
            }
        }

        info!(
            "Tie-break pass changed {} tokens, {} remain ambiguous",
            changed,
            decisions.count(Decision::is_ambiguous)
        );
        changed
    }

    /// Phase B: fill tokens that had no candidate from the rebuilt index
    pub fn fill_gaps(&self, decisions: &mut DecisionTable) -> FillReport {
        let stats = match self.gap_fill {
            GapFill::WordForm => self.word_stats(decisions),
            GapFill::Lemma => self.lemma_stats(decisions),
        };

        let mut report = FillReport::default();
        for (sentence, token, decision) in decisions.iter_mut() {
            if !decision.is_unresolved() {
                continue;
            }
            report.empty += 1;
            let outcome = match self.gap_fill {
                GapFill::WordForm => stats.majority(token),
                GapFill::Lemma => match self.lemmas.lemma(sentence, token) {
                    Some(lemma) => stats.majority(&lemma),
                    None => Decision::Unresolved,
                },
            };
            if narrow(decision, outcome) {
                report.filled += 1;
            }
        }

        if report.empty > 0 {
            info!(
                "{:.4} % of originally empty values ({} of {}) remain unfilled",
                report.unfilled() as f64 * 100.0 / report.empty as f64,
                report.unfilled(),
                report.empty
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conllu::Corpus;
    use std::path::PathBuf;

    fn resolved(tag: &str) -> Decision {
        Decision::Resolved(tag.to_string())
    }

    fn tied(tags: &[&str]) -> Decision {
        Decision::from_tags(tags.iter().map(|t| t.to_string()).collect())
    }

    fn empty_corpus() -> Corpus {
        Corpus::default()
    }

    #[test]
    fn test_tie_broken_by_word_frequency() {
        let mut decisions = DecisionTable::default();
        decisions.insert("s1", "run", resolved("VERB"));
        decisions.insert("s2", "run", resolved("VERB"));
        decisions.insert("s3", "run", resolved("VERB"));
        decisions.insert("s4", "run", resolved("NOUN"));
        decisions.insert("s5", "run", tied(&["VERB", "NOUN"]));

        let corpus = empty_corpus();
        let disambiguator =
            Disambiguator::new(LemmaIndex::new(&corpus), TieBreak::Random, GapFill::WordForm);
        assert_eq!(disambiguator.break_ties(&mut decisions), 1);
        assert_eq!(decisions.get("s5", "run"), Some(&resolved("VERB")));
    }

    #[test]
    fn test_result_stays_within_tied_tags() {
        let mut decisions = DecisionTable::default();
        decisions.insert("s1", "fast", resolved("ADJ"));
        decisions.insert("s2", "fast", resolved("ADJ"));
        decisions.insert("s3", "fast", tied(&["ADV", "VERB"]));

        let corpus = empty_corpus();
        let disambiguator =
            Disambiguator::new(LemmaIndex::new(&corpus), TieBreak::Frequency, GapFill::WordForm);
        disambiguator.break_ties(&mut decisions);
        assert_eq!(decisions.get("s3", "fast"), Some(&tied(&["ADV", "VERB"])));
    }

    #[test]
    fn test_no_ties_is_a_no_op() {
        let mut decisions = DecisionTable::default();
        decisions.insert("s1", "run", resolved("VERB"));
        decisions.insert("s1", "home", Decision::Unresolved);
        let before = decisions.clone();

        let corpus = empty_corpus();
        for tie_break in [TieBreak::Frequency, TieBreak::Random] {
            let disambiguator =
                Disambiguator::new(LemmaIndex::new(&corpus), tie_break, GapFill::WordForm);
            assert_eq!(disambiguator.break_ties(&mut decisions), 0);
            assert_eq!(decisions, before);
        }
    }

    #[test]
    fn test_lemma_tie_break() {
        let corpus = Corpus::parse(
            "# text = runs\n1\truns\trun\t_\t_\t_\t_\t_\t_\t_\n\n\
# text = ran\n1\tran\trun\t_\t_\t_\t_\t_\t_\t_\n\n\
# text = run\n1\trun\trun\t_\t_\t_\t_\t_\t_\t_\n",
            &PathBuf::from("target"),
        )
        .unwrap();
        let mut decisions = DecisionTable::default();
        decisions.insert("runs", "runs", resolved("VERB"));
        decisions.insert("ran", "ran", resolved("VERB"));
        decisions.insert("run", "run", tied(&["NOUN", "VERB"]));

        let disambiguator =
            Disambiguator::new(LemmaIndex::new(&corpus), TieBreak::Frequency, GapFill::WordForm);
        disambiguator.break_ties(&mut decisions);
        assert_eq!(decisions.get("run", "run"), Some(&resolved("VERB")));

        // Random tie-break leaves the same token for the output stage
        let mut decisions = DecisionTable::default();
        decisions.insert("runs", "runs", resolved("VERB"));
        decisions.insert("run", "run", tied(&["NOUN", "VERB"]));
        let disambiguator =
            Disambiguator::new(LemmaIndex::new(&corpus), TieBreak::Random, GapFill::WordForm);
        disambiguator.break_ties(&mut decisions);
        assert!(decisions.get("run", "run").unwrap().is_ambiguous());
    }

    #[test]
    fn test_fill_gaps_by_word_form() {
        let mut decisions = DecisionTable::default();
        decisions.insert("s1", "Home", resolved("NOUN"));
        decisions.insert("s2", "home", Decision::Unresolved);
        decisions.insert("s2", "zzz", Decision::Unresolved);

        let corpus = empty_corpus();
        let disambiguator =
            Disambiguator::new(LemmaIndex::new(&corpus), TieBreak::Frequency, GapFill::WordForm);
        let report = disambiguator.fill_gaps(&mut decisions);

        assert_eq!(report, FillReport { empty: 2, filled: 1 });
        assert_eq!(decisions.get("s2", "home"), Some(&resolved("NOUN")));
        assert_eq!(decisions.get("s2", "zzz"), Some(&Decision::Unresolved));
    }

    #[test]
    fn test_fill_gaps_by_lemma() {
        let corpus = Corpus::parse(
            "# text = dogs dog\n\
1\tdogs\tdog\t_\t_\t_\t_\t_\t_\t_\n\
2\tdog\tdog\t_\t_\t_\t_\t_\t_\t_\n",
            &PathBuf::from("target"),
        )
        .unwrap();
        let mut decisions = DecisionTable::default();
        decisions.insert("dogs dog", "dog", resolved("NOUN"));
        decisions.insert("dogs dog", "dogs", Decision::Unresolved);

        let disambiguator =
            Disambiguator::new(LemmaIndex::new(&corpus), TieBreak::Frequency, GapFill::Lemma);
        let report = disambiguator.fill_gaps(&mut decisions);
        assert_eq!(report.filled, 1);
        assert_eq!(decisions.get("dogs dog", "dogs"), Some(&resolved("NOUN")));
    }

    #[test]
    fn test_fill_gap_tie_becomes_ambiguous() {
        let mut decisions = DecisionTable::default();
        decisions.insert("s1", "light", resolved("ADJ"));
        decisions.insert("s2", "light", resolved("NOUN"));
        decisions.insert("s3", "light", Decision::Unresolved);

        let corpus = empty_corpus();
        let disambiguator =
            Disambiguator::new(LemmaIndex::new(&corpus), TieBreak::Frequency, GapFill::WordForm);
        disambiguator.fill_gaps(&mut decisions);
        assert_eq!(decisions.get("s3", "light"), Some(&tied(&["ADJ", "NOUN"])));
    }
}
