//! Project POS tags onto a target corpus from aligned, annotated sources.
//!
//! Reads word alignments and annotated CoNLL-U corpora for one or more
//! source languages, votes on the projected tags for every target token,
//! fills the remaining gaps from corpus statistics and writes the target
//! skeleton back out with the chosen UPOS tags.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;
use pos_projector::{
    run, CheckpointMode, GapFill, MissPolicy, ProjectionConfig, RunOutcome, SeededSampler, TieBreak,
};
use std::path::PathBuf;

/// Handling of aligned source forms missing from their own annotated block
#[derive(Clone, Copy, Debug, ValueEnum)]
enum OnMiss {
    /// Use the form itself as its tag
    PassThrough,
    /// Ignore the form
    Drop,
    /// Stop with an error
    Fail,
}

impl From<OnMiss> for MissPolicy {
    fn from(value: OnMiss) -> Self {
        match value {
            OnMiss::PassThrough => MissPolicy::PassThrough,
            OnMiss::Drop => MissPolicy::Drop,
            OnMiss::Fail => MissPolicy::Fail,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "pos_projector",
    about = "Project POS tags from aligned source languages onto a target corpus",
    long_about = "Reads word alignments between a target corpus and one or more annotated\n\
                  source corpora, projects the source UPOS tags along the alignments,\n\
                  weights them per language and votes for one tag per target token.\n\
                  Ties and unaligned tokens are settled from word and lemma statistics.\n\
                  The output is written to the '-o' file name followed by a two digit\n\
                  strategy code: random fill, then lemma fill (00, 01, 10, 11)."
)]
struct Args {
    /// Target corpus in CoNLL-U format, lemmas are read from here
    #[arg(short = 'i', long = "input", required = true)]
    input: PathBuf,

    /// Language score files (`language score` per line), combined by harmonic mean
    #[arg(short = 'l', long = "lang-scores", num_args = 1..)]
    lang_scores: Vec<PathBuf>,

    /// Alignment files, one per source language (`<dir>/<lang>_...`)
    #[arg(short = 'a', long = "alignments", num_args = 1.., required = true)]
    alignments: Vec<PathBuf>,

    /// Annotated source corpora matching '--alignments' (`<dir>/<lang>.conllu`)
    #[arg(short = 'c', long = "conllu", num_args = 1.., required = true)]
    conllu: Vec<PathBuf>,

    /// CoNLL-U skeleton the predicted tags are written into
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Save the projected alignments to this file and quit
    #[arg(long = "save-checkpoint", conflicts_with = "resume")]
    save_checkpoint: Option<PathBuf>,

    /// Load projected alignments saved earlier instead of parsing the inputs
    #[arg(long = "resume")]
    resume: Option<PathBuf>,

    /// Leave remaining ties to a random pick instead of lemma/form frequencies
    #[arg(long = "random-fill")]
    random_fill: bool,

    /// Fill tokens without candidates from lemma frequencies instead of form frequencies
    #[arg(short = 'f', long = "lemma-fill")]
    lemma_fill: bool,

    /// Handling of source forms missing from their annotated sentence
    #[arg(long = "on-miss", value_enum, default_value = "pass-through")]
    on_miss: OnMiss,

    /// Tag for tokens nothing else could decide
    #[arg(long = "default-tag", default_value = "NOUN")]
    default_tag: String,

    /// Seed for random tie-breaking (default: from entropy)
    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Store the rendered output lines as a binary snapshot
    #[arg(long = "output-snapshot")]
    output_snapshot: Option<PathBuf>,

    /// Write the final word -> POS count statistics as YAML
    #[arg(long = "dump-stats")]
    dump_stats: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides RUST_LOG (default: info)
    #[arg(long)]
    log_level: Option<log::LevelFilter>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let env = env_logger::Env::default().default_filter_or("info");
    let mut logger = env_logger::Builder::from_env(env);
    if let Some(level) = args.log_level {
        logger.filter_level(level);
    }
    logger.init();

    let mut config =
        ProjectionConfig::new(args.input, &args.alignments, &args.conllu, &args.lang_scores)
            .context("Invalid input files")?;
    config.output = args.output;
    config.tie_break = if args.random_fill {
        TieBreak::Random
    } else {
        TieBreak::Frequency
    };
    config.gap_fill = if args.lemma_fill {
        GapFill::Lemma
    } else {
        GapFill::WordForm
    };
    config.miss_policy = args.on_miss.into();
    config.default_tag = args.default_tag;
    config.output_snapshot = args.output_snapshot;
    config.stats_dump = args.dump_stats;
    config.checkpoint = match (args.save_checkpoint, args.resume) {
        (Some(path), _) => CheckpointMode::SaveAndExit(path),
        (None, Some(path)) => CheckpointMode::Resume(path),
        (None, None) => CheckpointMode::Off,
    };

    let mut sampler = SeededSampler::from_seed(args.seed);
    match run(&config, &mut sampler).context("Projection failed")? {
        RunOutcome::Checkpointed(path) => info!("Checkpoint written to {:?}, stopping", path),
        RunOutcome::Decided(decided) => info!(
            "Decided {} tokens; no '-o' skeleton given, nothing written",
            decided.table.iter().count()
        ),
        RunOutcome::Written { path, lines } => info!("Wrote {} lines to {:?}", lines.len(), path),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["pos_projector", "-i", "t.conllu", "-a", "de_en.A3", "-c", "de.conllu"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_log_level_left_to_rust_log_by_default() {
        assert_eq!(parse(&[]).log_level, None);
        assert_eq!(
            parse(&["--log-level", "debug"]).log_level,
            Some(log::LevelFilter::Debug)
        );
    }

    #[test]
    fn test_checkpoint_flags_conflict() {
        let argv = ["--save-checkpoint", "saved.bin", "--resume", "saved.bin"];
        let mut full = vec!["pos_projector", "-i", "t.conllu", "-a", "de_en.A3", "-c", "de.conllu"];
        full.extend_from_slice(&argv);
        assert!(Args::try_parse_from(full).is_err());
    }
}
