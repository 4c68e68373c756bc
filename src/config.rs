//! Run configuration assembled by the command-line front end.

use crate::disambiguate::{GapFill, TieBreak};
use crate::error::Result;
use crate::scoring::MissPolicy;
use crate::sources::{pair_source_files, SourceFiles};
use crate::weights::SourceWeights;
use log::info;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const DEFAULT_TAG: &str = "NOUN";

/// Whether projected alignments are cached between runs
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CheckpointMode {
    #[default]
    Off,
    /// Save projected alignments and stop before voting
    SaveAndExit(PathBuf),
    /// Skip parsing and projection, loading them from a previous save
    Resume(PathBuf),
}

#[derive(Clone, Debug)]
pub struct ProjectionConfig {
    /// Annotated target corpus: sentence list and lemmas
    pub input: PathBuf,
    /// Skeleton the final tags are written into
    pub output: Option<PathBuf>,
    pub sources: Vec<SourceFiles>,
    pub weights: SourceWeights,
    pub tie_break: TieBreak,
    pub gap_fill: GapFill,
    pub miss_policy: MissPolicy,
    pub default_tag: String,
    pub checkpoint: CheckpointMode,
    pub output_snapshot: Option<PathBuf>,
    pub stats_dump: Option<PathBuf>,
}

impl ProjectionConfig {
    /// Pair the source files and derive weights: from score files when
    /// given, uniform otherwise
    pub fn new(
        input: PathBuf,
        alignments: &[PathBuf],
        corpora: &[PathBuf],
        score_files: &[PathBuf],
    ) -> Result<Self> {
        let sources = pair_source_files(alignments, corpora)?;
        let languages: Vec<String> = sources.iter().map(|s| s.language.clone()).collect();
        let weights = if score_files.is_empty() {
            info!("No language scores given, all sources get equal weight");
            SourceWeights::uniform(&languages)?
        } else {
            SourceWeights::from_score_files(score_files, sources.len())?
        };
        weights.require(&languages)?;

        Ok(ProjectionConfig {
            input,
            output: None,
            sources,
            weights,
            tie_break: TieBreak::default(),
            gap_fill: GapFill::default(),
            miss_policy: MissPolicy::default(),
            default_tag: DEFAULT_TAG.to_string(),
            checkpoint: CheckpointMode::default(),
            output_snapshot: None,
            stats_dump: None,
        })
    }

    pub fn languages(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.language.clone()).collect()
    }

    /// Two-digit code for the strategy pair: random tie-break, lemma gap fill
    pub fn strategy_code(&self) -> &'static str {
        match (self.tie_break, self.gap_fill) {
            (TieBreak::Frequency, GapFill::WordForm) => "00",
            (TieBreak::Frequency, GapFill::Lemma) => "01",
            (TieBreak::Random, GapFill::WordForm) => "10",
            (TieBreak::Random, GapFill::Lemma) => "11",
        }
    }

    /// Output file: the skeleton path with the strategy code appended
    pub fn output_path(&self, skeleton: &Path) -> PathBuf {
        let mut name = OsString::from(skeleton.as_os_str());
        name.push(self.strategy_code());
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProjectionConfig {
        ProjectionConfig::new(
            PathBuf::from("d/target.conllu"),
            &[PathBuf::from("d/de_a3")],
            &[PathBuf::from("d/de.conllu")],
            &[],
        )
        .unwrap()
    }

    #[test]
    fn test_output_suffix() {
        let mut config = config();
        assert_eq!(config.output_path(Path::new("d/out.conllu")), PathBuf::from("d/out.conllu00"));
        config.tie_break = TieBreak::Random;
        config.gap_fill = GapFill::Lemma;
        assert_eq!(config.output_path(Path::new("d/out.conllu")), PathBuf::from("d/out.conllu11"));
        config.tie_break = TieBreak::Frequency;
        assert_eq!(config.strategy_code(), "01");
    }

    #[test]
    fn test_uniform_weights_without_scores() {
        let config = config();
        assert_eq!(config.languages(), vec!["de".to_string()]);
        assert_eq!(config.weights.weight("de"), Some(1.0));
        assert_eq!(config.default_tag, "NOUN");
    }
}
