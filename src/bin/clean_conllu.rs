//! Tool to strip `score*TAG` artifacts from the UPOS column.
//!
//! Older projection output could carry the weighted candidate (`0.5*VERB`)
//! instead of the bare tag. For each file the number of cleaned rows is
//! printed, and a cleaned copy `<file>_final` is written when there were any.

use anyhow::Context;
use clap::Parser;
use pos_projector::conllu::{render_blocks, Corpus, Field};
use std::ffi::OsString;
use std::path::PathBuf;

/// Tag part of a `score*TAG` value, if the value has that shape
fn strip_score(upos: &str) -> Option<&str> {
    upos.split_once('*').map(|(_, tag)| tag)
}

#[derive(Parser)]
#[command(
    name = "clean_conllu",
    about = "Remove weight prefixes from UPOS values in CoNLL-U files",
    long_about = "Rewrites UPOS values of the form 'score*TAG' to 'TAG'.\n\
                  Prints '<file>\\t:\\t<count>' for every input and writes the\n\
                  cleaned corpus to '<file>_final' when the count is not zero."
)]
struct Args {
    /// CoNLL-U files to clean
    #[arg(required = true, num_args = 1..)]
    files: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    for path in &args.files {
        let corpus = Corpus::read(path)
            .with_context(|| format!("Failed to read CoNLL-U file: {:?}", path))?;
        let mut blocks = corpus.into_blocks();

        let mut count = 0usize;
        for row in blocks.iter_mut().flat_map(|block| block.rows_mut()) {
            if let Some(tag) = strip_score(row.get(Field::Upos)).map(str::to_string) {
                row.set_upos(tag);
                count += 1;
            }
        }
        println!("{}\t:\t{}", path.display(), count);

        if count != 0 {
            let mut name = OsString::from(path.as_os_str());
            name.push("_final");
            let output = PathBuf::from(name);
            let mut content = render_blocks(&blocks).join("\n");
            content.push('\n');
            std::fs::write(&output, content)
                .with_context(|| format!("Failed to write output to {:?}", output))?;
            eprintln!("Cleaned corpus saved to {:?}", output);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_score() {
        assert_eq!(strip_score("0.5*VERB"), Some("VERB"));
        assert_eq!(strip_score("NOUN"), None);
    }
}
