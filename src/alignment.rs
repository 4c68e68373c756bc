//! Loading of sentence pairs and word alignment records.
//!
//! The parallel file has one `target<TAB>source` pair per line. The alignment
//! file holds three-line records:
//!
//! ```text
//! # Sentence pair (12) source length 4 target length 3 alignment score : 1e-06
//! das Haus ist klein
//! NULL ({ }) the ({ 1 }) house ({ 2 }) is ({ 3 }) small ({ 4 })
//! ```
//!
//! The header names the 1-based parallel pair, the second line is the
//! tokenized source sentence and the third maps each target token to the
//! 1-based positions of the source tokens it is aligned with.

use crate::error::{read_file, Error, Result};
use crate::sources::SourceFiles;
use crate::types::TokenTable;
use log::debug;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

/// Target sentence text -> source sentence text
pub type SentenceAlignment = BTreeMap<String, String>;

/// Target sentence -> target token -> aligned source items
pub type WordAlignment<T> = TokenTable<Vec<T>>;

/// Raw alignments of one source language, source tokens still as surface forms
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AlignedSource {
    pub language: String,
    pub sentences: SentenceAlignment,
    pub words: WordAlignment<String>,
}

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\((\d+)\)").expect("valid header regex"))
}

fn link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*(.+?) \(\{([^}]*)\}\)").expect("valid link regex"))
}

/// Read `target<TAB>source` pairs.
///
/// Alignment headers index pairs by physical line, so a blank line before
/// the last pair is rejected rather than skipped.
pub fn read_parallel(path: &Path) -> Result<Vec<(String, String)>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let mut pairs = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let expected = pairs.len() + 1;
        if line != expected {
            return Err(Error::malformed(path, expected, "empty line in parallel file"));
        }
        if record.len() != 2 {
            return Err(Error::malformed(
                path,
                line,
                format!("expected 2 tab-separated sentences, found {}", record.len()),
            ));
        }
        pairs.push((record[0].to_string(), record[1].to_string()));
    }
    Ok(pairs)
}

fn csv_error(path: &Path, err: csv::Error) -> Error {
    let line = err.position().map(|p| p.line() as usize).unwrap_or(0);
    match err.into_kind() {
        csv::ErrorKind::Io(source) => Error::io(path, source),
        other => Error::malformed(path, line, format!("{:?}", other)),
    }
}

/// Parse alignment records against already loaded sentence pairs
pub fn parse_alignments(
    content: &str,
    path: &Path,
    pairs: &[(String, String)],
) -> Result<(SentenceAlignment, WordAlignment<String>)> {
    let mut sentences = SentenceAlignment::new();
    let mut words = WordAlignment::new();

    let mut lines: Vec<&str> = content.lines().collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    for (record, chunk) in lines.chunks(3).enumerate() {
        let first_line = record * 3 + 1;
        if chunk.len() < 3 {
            return Err(Error::malformed(path, first_line, "truncated alignment record"));
        }

        let pair_no: usize = header_regex()
            .captures(chunk[0])
            .and_then(|caps| caps[1].parse().ok())
            .ok_or_else(|| {
                Error::malformed(path, first_line, "header has no '(N)' sentence pair index")
            })?;
        let (target, source) = pair_no
            .checked_sub(1)
            .and_then(|idx| pairs.get(idx))
            .ok_or_else(|| {
                Error::malformed(
                    path,
                    first_line,
                    format!(
                        "sentence pair {} is outside the parallel file ({} pairs)",
                        pair_no,
                        pairs.len()
                    ),
                )
            })?;

        let source_tokens: Vec<&str> = chunk[1].split_whitespace().collect();
        let links = parse_links(chunk[2], &source_tokens, path, first_line + 2)?;

        sentences.insert(target.clone(), source.clone());
        words.insert(target.clone(), links);
    }

    Ok((sentences, words))
}

/// Parse `NULL ({ }) tok ({ 1 2 }) ...`, dropping the leading NULL slot
fn parse_links(
    line: &str,
    source_tokens: &[&str],
    path: &Path,
    line_no: usize,
) -> Result<BTreeMap<String, Vec<String>>> {
    let mut links = BTreeMap::new();
    for caps in link_regex().captures_iter(line).skip(1) {
        let token = caps[1].trim().to_string();
        let mut aligned = Vec::new();
        for raw in caps[2].split_whitespace() {
            let position: usize = raw
                .parse()
                .map_err(|_| {
                    Error::malformed(path, line_no, format!("invalid alignment index '{}'", raw))
                })?;
            let source = position
                .checked_sub(1)
                .and_then(|idx| source_tokens.get(idx))
                .ok_or_else(|| {
                    Error::malformed(
                        path,
                        line_no,
                        format!(
                            "alignment index {} outside source sentence of {} tokens",
                            position,
                            source_tokens.len()
                        ),
                    )
                })?;
            aligned.push(source.to_string());
        }
        links.insert(token, aligned);
    }
    Ok(links)
}

/// Load the sentence and word alignments of one source language
pub fn load_source(files: &SourceFiles) -> Result<AlignedSource> {
    let pairs = read_parallel(&files.parallel)?;
    let content = read_file(&files.alignment)?;
    let (sentences, words) = parse_alignments(&content, &files.alignment, &pairs)?;
    debug!(
        "[{}] {} parallel pairs, {} aligned sentences",
        files.language,
        pairs.len(),
        words.len()
    );
    Ok(AlignedSource {
        language: files.language.clone(),
        sentences,
        words,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn pairs() -> Vec<(String, String)> {
        vec![
            ("the house is small".into(), "das Haus ist klein".into()),
            ("hello".into(), "hallo".into()),
        ]
    }

    #[test]
    fn test_parse_record() {
        let content = "# Sentence pair (1) source length 4 target length 4 score : 1e-06\n\
das Haus ist klein\n\
NULL ({ }) the ({ 1 }) house ({ 2 }) is ({ }) small ({ 3 4 })\n";
        let (sentences, words) = parse_alignments(content, &PathBuf::from("a3"), &pairs()).unwrap();

        assert_eq!(sentences["the house is small"], "das Haus ist klein");
        let links = &words["the house is small"];
        assert_eq!(links["the"], vec!["das"]);
        assert_eq!(links["house"], vec!["Haus"]);
        assert!(links["is"].is_empty());
        assert_eq!(links["small"], vec!["ist", "klein"]);
        assert!(!links.contains_key("NULL"));
    }

    #[test]
    fn test_parenthesis_tokens() {
        let content = "# Sentence pair (2)\nhallo ( )\nNULL ({ }) ( ({ 2 }) hello ({ 1 })\n";
        let (_, words) = parse_alignments(content, &PathBuf::from("a3"), &pairs()).unwrap();
        assert_eq!(words["hello"]["("], vec!["("]);
        assert_eq!(words["hello"]["hello"], vec!["hallo"]);
    }

    #[test]
    fn test_out_of_range_index() {
        let content = "# Sentence pair (2)\nhallo\nNULL ({ }) hello ({ 2 })\n";
        let err = parse_alignments(content, &PathBuf::from("a3"), &pairs()).unwrap_err();
        assert!(matches!(err, Error::MalformedInput { line: 3, .. }));
    }

    #[test]
    fn test_bad_header_and_truncation() {
        let path = PathBuf::from("a3");
        assert!(parse_alignments("# no index\nx\nNULL ({ })\n", &path, &pairs()).is_err());
        assert!(parse_alignments("# Sentence pair (9)\nx\nNULL ({ })\n", &path, &pairs()).is_err());
        assert!(matches!(
            parse_alignments("# Sentence pair (1)\nx\n", &path, &pairs()),
            Err(Error::MalformedInput { line: 1, .. })
        ));
    }

    #[test]
    fn test_read_parallel() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "a b\tc d\n\"quoted\"\tx\n").unwrap();
        let pairs = read_parallel(file.path()).unwrap();
        assert_eq!(pairs[1], ("\"quoted\"".to_string(), "x".to_string()));

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, "a\tb\nonly one\n").unwrap();
        assert!(matches!(
            read_parallel(bad.path()),
            Err(Error::MalformedInput { line: 2, .. })
        ));
    }

    #[test]
    fn test_blank_line_in_parallel_file() {
        let mut gap = tempfile::NamedTempFile::new().unwrap();
        write!(gap, "one\teins\n\nthree\tdrei\n").unwrap();
        assert!(matches!(
            read_parallel(gap.path()),
            Err(Error::MalformedInput { line: 2, .. })
        ));

        // trailing blank lines are not followed by a pair and stay harmless
        let mut trailing = tempfile::NamedTempFile::new().unwrap();
        write!(trailing, "one\teins\ntwo\tzwei\n\n\n").unwrap();
        let pairs = read_parallel(trailing.path()).unwrap();
        assert_eq!(pairs.len(), 2);
        let content = "# Sentence pair (2)\nzwei\nNULL ({ }) two ({ 1 })\n";
        let (sentences, _) = parse_alignments(content, &PathBuf::from("a3"), &pairs).unwrap();
        assert_eq!(sentences["two"], "zwei");
    }
}
