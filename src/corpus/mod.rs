use crate::content::Mode;
use crate::error::{GameError, Result};
use include_dir::{include_dir, Dir};
use serde::Deserialize;
use std::fs;
use std::path::Path;

static CORPUS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/corpus/data");

/// A named list of sentences or single words that sessions draw targets from
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Corpus {
    pub name: String,
    pub entries: Vec<String>,
}

impl Corpus {
    pub fn new(name: impl Into<String>, entries: Vec<String>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    /// The corpus shipped with the binary for `mode`
    pub fn builtin(mode: Mode) -> Result<Self> {
        let file_name = format!("{}.json", mode.to_string().to_lowercase());
        let file = CORPUS_DIR
            .get_file(&file_name)
            .ok_or_else(|| GameError::Corpus(format!("built-in corpus {file_name} not found")))?;
        let text = file
            .contents_utf8()
            .ok_or_else(|| GameError::Corpus(format!("{file_name} is not valid UTF-8")))?;

        Ok(serde_json::from_str(text)?)
    }

    /// Load a corpus from disk. Accepts a JSON object (`{ name, entries }`),
    /// a JSON array of strings, or plain text with one entry per line.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "custom".to_string());
        Self::parse(name, &text)
    }

    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self> {
        let trimmed = text.trim_start();
        if trimmed.starts_with('{') {
            return Ok(serde_json::from_str(text)?);
        }
        if trimmed.starts_with('[') {
            let entries: Vec<String> = serde_json::from_str(text)?;
            return Ok(Self::new(name, entries));
        }

        let entries = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Ok(Self::new(name, entries))
    }

    /// A corpus must hold at least one entry and no blank entries
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(GameError::EmptyCorpus);
        }
        if let Some(pos) = self.entries.iter().position(|e| e.trim().is_empty()) {
            return Err(GameError::Corpus(format!(
                "entry {pos} of corpus '{}' is blank",
                self.name
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
