//! End-to-end run: load, project, score, combine, vote, disambiguate, write.

use crate::alignment::load_source;
use crate::checkpoint;
use crate::config::{CheckpointMode, ProjectionConfig};
use crate::conllu::{Block, Corpus};
use crate::disambiguate::{Disambiguator, FillReport, GapFill};
use crate::error::{Error, Result};
use crate::output::{LemmaFallback, OutputWriter};
use crate::projection::{project, ProjectedSource};
use crate::sampler::TieBreaker;
use crate::scoring::{combine, score_sources};
use crate::stats::{LemmaIndex, PosStats};
use crate::voting::{decide_all, DecisionTable};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Decisions after both disambiguation passes, with the rebuilt indexes
#[derive(Clone, Debug)]
pub struct Decided {
    pub table: DecisionTable,
    pub word_stats: PosStats,
    pub lemma_stats: PosStats,
    pub fill: FillReport,
}

/// What a run produced
#[derive(Debug)]
pub enum RunOutcome {
    /// Projected alignments were saved and the run stopped
    Checkpointed(PathBuf),
    /// No skeleton configured; only decisions were computed
    Decided(Decided),
    Written { path: PathBuf, lines: Vec<String> },
}

/// Parse and project every configured source language
pub fn project_sources(config: &ProjectionConfig) -> Result<Vec<ProjectedSource>> {
    let started = Instant::now();
    let mut projected = Vec::with_capacity(config.sources.len());
    for files in &config.sources {
        let aligned = load_source(files)?;
        let corpus = Corpus::read(&files.corpus)?;
        debug!("[{}] {} annotated blocks", files.language, corpus.blocks().len());
        projected.push(project(aligned, &corpus));
    }
    info!("Projected {} sources in {:?}", projected.len(), started.elapsed());
    Ok(projected)
}

/// Weight, combine and decide tags for every token of the target corpus
pub fn decide(
    target: &Corpus,
    projections: &[ProjectedSource],
    config: &ProjectionConfig,
) -> Result<Decided> {
    let started = Instant::now();
    let scored = score_sources(projections, &config.weights, config.miss_policy)?;
    let combined = combine(target, &scored);
    let mut table = decide_all(&combined);
    info!(
        "Voting: {} tokens, {} resolved, {} tied, {} without candidates",
        table.iter().count(),
        table.count(|d| d.resolved().is_some()),
        table.count(|d| d.is_ambiguous()),
        table.count(|d| d.is_unresolved())
    );

    let disambiguator =
        Disambiguator::new(LemmaIndex::new(target), config.tie_break, config.gap_fill);
    disambiguator.break_ties(&mut table);
    let fill = disambiguator.fill_gaps(&mut table);

    let word_stats = disambiguator.word_stats(&table);
    let lemma_stats = disambiguator.lemma_stats(&table);
    info!("Decisions computed in {:?}", started.elapsed());
    Ok(Decided {
        table,
        word_stats,
        lemma_stats,
        fill,
    })
}

/// Substitute the decided tags into the skeleton blocks
pub fn render_output<S: TieBreaker>(
    target: &Corpus,
    skeleton: Vec<Block>,
    decided: &Decided,
    config: &ProjectionConfig,
    sampler: &mut S,
) -> Vec<String> {
    let index = LemmaIndex::new(target);
    let mut writer =
        OutputWriter::new(&decided.table, &decided.word_stats, &config.default_tag, sampler);
    if config.gap_fill == GapFill::Lemma {
        writer = writer.with_lemma_fallback(LemmaFallback {
            stats: &decided.lemma_stats,
            index: &index,
        });
    }
    writer.render(skeleton)
}

fn write_lines(lines: &[String], path: &Path) -> Result<()> {
    let mut content = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    fs::write(path, content).map_err(|e| Error::io(path, e))
}

/// Run the whole pipeline as configured
pub fn run<S: TieBreaker>(config: &ProjectionConfig, sampler: &mut S) -> Result<RunOutcome> {
    let projections = match &config.checkpoint {
        CheckpointMode::Resume(path) => {
            let loaded = checkpoint::load(path, &config.languages())?;
            info!("Loaded projected alignments from {:?}", path);
            loaded
        }
        CheckpointMode::SaveAndExit(path) => {
            let projections = project_sources(config)?;
            checkpoint::save(&projections, path)?;
            info!("Projected alignments saved to {:?}", path);
            return Ok(RunOutcome::Checkpointed(path.clone()));
        }
        CheckpointMode::Off => project_sources(config)?,
    };

    let target = Corpus::read(&config.input)?;
    let decided = decide(&target, &projections, config)?;

    if let Some(path) = &config.stats_dump {
        let yaml = serde_yaml::to_string(&decided.word_stats)?;
        fs::write(path, yaml).map_err(|e| Error::io(path, e))?;
        info!("Word statistics for {} forms saved to {:?}", decided.word_stats.len(), path);
    }

    let Some(skeleton_path) = &config.output else {
        return Ok(RunOutcome::Decided(decided));
    };

    let started = Instant::now();
    let skeleton = Corpus::read(skeleton_path)?;
    let lines = render_output(&target, skeleton.into_blocks(), &decided, config, sampler);
    if let Some(snapshot) = &config.output_snapshot {
        checkpoint::save_output(&lines, snapshot)?;
        info!("Output snapshot stored in {:?}", snapshot);
    }

    let path = config.output_path(skeleton_path);
    write_lines(&lines, &path)?;
    info!("Outputs written to {:?} in {:?}", path, started.elapsed());
    Ok(RunOutcome::Written { path, lines })
}
