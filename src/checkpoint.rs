//! Binary checkpoints of projected alignments and rendered output.
//!
//! Files are written to a temporary sibling first and then persisted, so an
//! interrupted run never leaves a half-written checkpoint behind.

use crate::error::{Error, Result};
use crate::projection::ProjectedSource;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

const CHECKPOINT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Checkpoint {
    version: u32,
    sources: Vec<ProjectedSource>,
}

fn write_atomic<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir).map_err(|e| Error::io(parent_dir, e))?;

    let temp_file = NamedTempFile::new_in(parent_dir).map_err(|e| Error::io(parent_dir, e))?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        bincode::serialize_into(&mut writer, value)?;
        writer.flush().map_err(|e| Error::io(path, e))?;
    }
    temp_file.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}

fn read_binary<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    Ok(bincode::deserialize_from(BufReader::new(file))?)
}

/// Save projected alignments of every source language
pub fn save(sources: &[ProjectedSource], path: &Path) -> Result<()> {
    let checkpoint = Checkpoint {
        version: CHECKPOINT_VERSION,
        sources: sources.to_vec(),
    };
    write_atomic(&checkpoint, path)
}

/// Load a checkpoint and check it covers exactly `languages`, in that order
pub fn load(path: &Path, languages: &[String]) -> Result<Vec<ProjectedSource>> {
    let checkpoint: Checkpoint = read_binary(path)?;
    if checkpoint.version != CHECKPOINT_VERSION {
        return Err(Error::Checkpoint(format!(
            "{:?} has version {}, expected {}",
            path, checkpoint.version, CHECKPOINT_VERSION
        )));
    }

    let mut ordered = Vec::with_capacity(languages.len());
    let mut sources = checkpoint.sources;
    for language in languages {
        let pos = sources
            .iter()
            .position(|source| &source.language == language)
            .ok_or_else(|| {
                Error::Checkpoint(format!("{:?} holds no alignments for '{}'", path, language))
            })?;
        ordered.push(sources.remove(pos));
    }
    if let Some(extra) = sources.first() {
        return Err(Error::Checkpoint(format!(
            "{:?} holds alignments for '{}', which is not a configured source",
            path, extra.language
        )));
    }
    Ok(ordered)
}

/// Save rendered output lines
pub fn save_output(lines: &[String], path: &Path) -> Result<()> {
    write_atomic(&lines, path)
}

pub fn load_output(path: &Path) -> Result<Vec<String>> {
    read_binary(path)
}
