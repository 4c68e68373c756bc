//! Pairing of per-language input files.
//!
//! Alignment files are named `<dir>/<lang>_...`, annotated source corpora
//! `<dir>/<lang>.conllu`, and the parallel sentence file for a language sits
//! next to its alignment file as `<dir>/<dir name>-<lang>`.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Every file needed for one source language
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFiles {
    pub language: String,
    pub alignment: PathBuf,
    pub parallel: PathBuf,
    pub corpus: PathBuf,
}

fn file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::Config(format!("Not a usable file name: {:?}", path)))
}

/// Language id of an alignment file (`de_giza.A3.final` -> `de`)
pub fn alignment_language(path: &Path) -> Result<String> {
    Ok(file_name(path)?.split('_').next().unwrap_or_default().to_string())
}

/// Language id of an annotated corpus (`de.conllu` -> `de`)
pub fn corpus_language(path: &Path) -> Result<String> {
    Ok(file_name(path)?.split('.').next().unwrap_or_default().to_string())
}

/// Parallel sentence file belonging to an alignment file
pub fn parallel_path(alignment: &Path, language: &str) -> PathBuf {
    let dir = alignment.parent().unwrap_or_else(|| Path::new(""));
    let folder = dir
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(".");
    dir.join(format!("{}-{}", folder, language))
}

/// Match alignment files with annotated corpora by language, in alignment order
pub fn pair_source_files(alignments: &[PathBuf], corpora: &[PathBuf]) -> Result<Vec<SourceFiles>> {
    if alignments.len() != corpora.len() {
        return Err(Error::Config(format!(
            "Unequal number of alignment files ({}) and CoNLL-U files ({})",
            alignments.len(),
            corpora.len()
        )));
    }

    let mut remaining = corpora
        .iter()
        .map(|path| Ok((corpus_language(path)?, path.clone())))
        .collect::<Result<Vec<_>>>()?;

    let mut sources = Vec::with_capacity(alignments.len());
    for alignment in alignments {
        let language = alignment_language(alignment)?;
        let pos = remaining
            .iter()
            .position(|(lang, _)| *lang == language)
            .ok_or_else(|| {
                Error::Config(format!("No CoNLL-U file found for alignment file {:?}", alignment))
            })?;
        let (_, corpus) = remaining.remove(pos);
        sources.push(SourceFiles {
            parallel: parallel_path(alignment, &language),
            alignment: alignment.clone(),
            corpus,
            language,
        });
    }

    // Counts are equal, so every corpus file has been claimed here
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_languages_from_names() {
        assert_eq!(alignment_language(Path::new("data/de_en.A3")).unwrap(), "de");
        assert_eq!(corpus_language(Path::new("data/de.conllu")).unwrap(), "de");
        assert_eq!(
            parallel_path(Path::new("data/de_en.A3"), "de"),
            PathBuf::from("data/data-de")
        );
    }

    #[test]
    fn test_pairing_follows_alignment_order() {
        let sources = pair_source_files(
            &[PathBuf::from("d/fr_a3"), PathBuf::from("d/de_a3")],
            &[PathBuf::from("d/de.conllu"), PathBuf::from("d/fr.conllu")],
        )
        .unwrap();
        assert_eq!(sources[0].language, "fr");
        assert_eq!(sources[0].corpus, PathBuf::from("d/fr.conllu"));
        assert_eq!(sources[1].parallel, PathBuf::from("d/d-de"));
    }

    #[test]
    fn test_missing_corpus_is_fatal() {
        let err = pair_source_files(
            &[PathBuf::from("d/fr_a3")],
            &[PathBuf::from("d/de.conllu")],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = pair_source_files(&[PathBuf::from("d/fr_a3")], &[]).unwrap_err();
        assert!(err.to_string().contains("Unequal"));
    }

    #[test]
    fn test_unused_corpus_is_fatal() {
        let err = pair_source_files(
            &[PathBuf::from("d/fr_a3"), PathBuf::from("d/fr_b3")],
            &[PathBuf::from("d/fr.conllu"), PathBuf::from("d/de.conllu")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("fr_b3"));
    }
}
