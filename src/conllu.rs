//! Minimal CoNLL-U reader/writer.
//!
//! Blocks are kept line for line so a corpus can be re-emitted with only the
//! UPOS column changed. Token rows must carry all ten columns.

use crate::error::{read_file, Error, Result};
use std::collections::HashMap;
use std::path::Path;

pub const FIELD_COUNT: usize = 10;

const TEXT_PREFIX: &str = "# text = ";

/// Column positions of a token row
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Id = 0,
    Form = 1,
    Lemma = 2,
    Upos = 3,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRow {
    fields: Vec<String>,
}

impl TokenRow {
    pub fn parse(line: &str, path: &Path, line_no: usize) -> Result<Self> {
        let fields: Vec<String> = line.split('\t').map(str::to_string).collect();
        if fields.len() != FIELD_COUNT {
            return Err(Error::malformed(
                path,
                line_no,
                format!("expected {} tab-separated fields, found {}", FIELD_COUNT, fields.len()),
            ));
        }
        Ok(TokenRow { fields })
    }

    pub fn get(&self, field: Field) -> &str {
        &self.fields[field as usize]
    }

    pub fn id(&self) -> &str {
        self.get(Field::Id)
    }

    pub fn form(&self) -> &str {
        self.get(Field::Form)
    }

    /// Multi-word token header such as `3-4`
    pub fn is_range(&self) -> bool {
        self.id().contains('-')
    }

    pub fn set_upos(&mut self, tag: impl Into<String>) {
        self.fields[Field::Upos as usize] = tag.into();
    }

    pub fn to_line(&self) -> String {
        self.fields.join("\t")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Line {
    Comment(String),
    Token(TokenRow),
}

/// One sentence: its comment lines and token rows in file order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    pub text: Option<String>,
    pub lines: Vec<Line>,
}

impl Block {
    pub fn rows(&self) -> impl Iterator<Item = &TokenRow> {
        self.lines.iter().filter_map(|line| match line {
            Line::Token(row) => Some(row),
            Line::Comment(_) => None,
        })
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut TokenRow> {
        self.lines.iter_mut().filter_map(|line| match line {
            Line::Token(row) => Some(row),
            Line::Comment(_) => None,
        })
    }

    /// First row whose FORM equals `form`, returning its `field`
    pub fn lookup(&self, form: &str, field: Field) -> Option<&str> {
        self.rows().find(|row| row.form() == form).map(|row| row.get(field))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Corpus {
    blocks: Vec<Block>,
    by_text: HashMap<String, usize>,
}

impl Corpus {
    pub fn read(path: &Path) -> Result<Self> {
        let content = read_file(path)?;
        Self::parse(&content, path)
    }

    /// Parse CoNLL-U content; `path` is only used for error context
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let mut blocks = Vec::new();
        let mut current = Block::default();

        for (idx, line) in content.lines().enumerate() {
            if line.is_empty() {
                if !current.lines.is_empty() {
                    blocks.push(std::mem::take(&mut current));
                }
            } else if line.starts_with('#') {
                if let Some(text) = line.strip_prefix(TEXT_PREFIX) {
                    current.text = Some(text.to_string());
                }
                current.lines.push(Line::Comment(line.to_string()));
            } else {
                current.lines.push(Line::Token(TokenRow::parse(line, path, idx + 1)?));
            }
        }
        if !current.lines.is_empty() {
            blocks.push(current);
        }

        let mut by_text = HashMap::new();
        for (idx, block) in blocks.iter().enumerate() {
            if let Some(text) = &block.text {
                by_text.entry(text.clone()).or_insert(idx);
            }
        }
        Ok(Corpus { blocks, by_text })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// First block whose `# text` equals `text`
    pub fn find(&self, text: &str) -> Option<&Block> {
        self.by_text.get(text).map(|&idx| &self.blocks[idx])
    }

    /// Sentence texts in corpus order
    pub fn sentences(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|block| block.text.as_deref())
    }
}

/// Serialize blocks back to CoNLL-U lines, one blank line after each block
pub fn render_blocks(blocks: &[Block]) -> Vec<String> {
    let mut out = Vec::new();
    for block in blocks {
        for line in &block.lines {
            match line {
                Line::Comment(text) => out.push(text.clone()),
                Line::Token(row) => out.push(row.to_line()),
            }
        }
        out.push(String::new());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SAMPLE: &str = "# sent_id = 1\n\
# text = the dogs run\n\
1\tthe\tthe\tDET\t_\t_\t2\tdet\t_\t_\n\
2\tdogs\tdog\tNOUN\t_\t_\t3\tnsubj\t_\t_\n\
3\trun\trun\tVERB\t_\t_\t0\troot\t_\t_\n\
\n\
# text = hi\n\
1\thi\thi\tINTJ\t_\t_\t0\troot\t_\t_\n";

    #[test]
    fn test_parse_blocks() {
        let corpus = Corpus::parse(SAMPLE, &PathBuf::from("sample")).unwrap();
        assert_eq!(corpus.blocks().len(), 2);
        assert_eq!(corpus.sentences().collect::<Vec<_>>(), vec!["the dogs run", "hi"]);
        let block = corpus.find("the dogs run").unwrap();
        assert_eq!(block.lookup("dogs", Field::Lemma), Some("dog"));
        assert_eq!(block.lookup("run", Field::Upos), Some("VERB"));
        assert_eq!(block.lookup("cats", Field::Upos), None);
    }

    #[test]
    fn test_short_row_is_malformed() {
        let err = Corpus::parse("# text = a\n1\ta\n", &PathBuf::from("bad.conllu")).unwrap_err();
        match err {
            Error::MalformedInput { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_render_keeps_layout() {
        let corpus = Corpus::parse(SAMPLE, &PathBuf::from("sample")).unwrap();
        let rendered = render_blocks(corpus.blocks()).join("\n");
        assert_eq!(rendered, SAMPLE);
    }
}
