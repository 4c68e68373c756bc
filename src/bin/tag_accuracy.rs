//! Tool to measure UPOS agreement between two CoNLL-U files.
//!
//! Token rows of the generated file are compared position by position with
//! the gold file. Prints the overall accuracy and, on request, a per-tag
//! breakdown keyed by the gold tag.

use anyhow::{bail, Context};
use clap::Parser;
use pos_projector::conllu::{Corpus, Field};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// UPOS column of every token row, in file order
fn load_tags(path: &Path) -> anyhow::Result<Vec<String>> {
    let corpus =
        Corpus::read(path).with_context(|| format!("Failed to read CoNLL-U file: {:?}", path))?;
    Ok(corpus
        .blocks()
        .iter()
        .flat_map(|block| block.rows())
        .map(|row| row.get(Field::Upos).to_string())
        .collect())
}

#[derive(Debug, Default, PartialEq)]
struct TagScore {
    matched: usize,
    total: usize,
}

impl TagScore {
    fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.matched as f64 * 100.0 / self.total as f64
        }
    }
}

/// Overall and per-gold-tag agreement
fn compare(gold: &[String], generated: &[String]) -> (TagScore, BTreeMap<String, TagScore>) {
    let mut overall = TagScore::default();
    let mut per_tag: BTreeMap<String, TagScore> = BTreeMap::new();
    for (expected, actual) in gold.iter().zip(generated) {
        let entry = per_tag.entry(expected.clone()).or_default();
        entry.total += 1;
        overall.total += 1;
        if expected == actual {
            entry.matched += 1;
            overall.matched += 1;
        }
    }
    (overall, per_tag)
}

#[derive(Parser)]
#[command(
    name = "tag_accuracy",
    about = "Token-level UPOS accuracy of a generated CoNLL-U file",
    long_about = "Compares the UPOS column of a generated CoNLL-U file with a gold\n\
                  standard file, token row by token row, and prints the accuracy.\n\
                  Both files must contain the same number of token rows."
)]
struct Args {
    /// Gold standard CoNLL-U file
    #[arg(short = 't', long = "true", required = true)]
    gold: PathBuf,

    /// Generated CoNLL-U file
    #[arg(short = 'g', long = "generated", required = true)]
    generated: PathBuf,

    /// Also print accuracy per gold tag
    #[arg(short = 'p', long = "per-tag")]
    per_tag: bool,

    /// Round percentages to this many decimal places (default: 4)
    #[arg(short = 'r', long = "round", default_value = "4")]
    decimal_places: usize,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let gold = load_tags(&args.gold)?;
    let generated = load_tags(&args.generated)?;
    if gold.len() != generated.len() {
        bail!(
            "{:?} has {} tokens but {:?} has {}",
            args.gold,
            gold.len(),
            args.generated,
            generated.len()
        );
    }

    let (overall, per_tag) = compare(&gold, &generated);
    println!(
        "{}\t{:.*}",
        args.generated.display(),
        args.decimal_places,
        overall.percent()
    );

    if args.per_tag {
        eprintln!("\nPer-tag accuracy ({} tags):", per_tag.len());
        for (tag, score) in &per_tag {
            eprintln!(
                "  {:<6} {:>7} / {:<7} {:.*} %",
                tag,
                score.matched,
                score.total,
                args.decimal_places,
                score.percent()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_compare() {
        let (overall, per_tag) = compare(
            &tags(&["NOUN", "VERB", "NOUN", "DET"]),
            &tags(&["NOUN", "NOUN", "NOUN", "DET"]),
        );
        assert_eq!(overall, TagScore { matched: 3, total: 4 });
        assert!((overall.percent() - 75.0).abs() < 1e-9);
        assert_eq!(per_tag["VERB"], TagScore { matched: 0, total: 1 });
        assert_eq!(per_tag["NOUN"], TagScore { matched: 2, total: 2 });
    }
}
