//! Memory images: the textual format holds one hexadecimal word per line.

use std::path::Path;

use crate::error::LoadError;

/// A sequence of words loaded at consecutive word addresses starting at 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    words: Vec<u32>,
}

impl Image {
    pub fn from_words(words: Vec<u32>) -> Self {
        Self { words }
    }

    /// Parse an image. Each non-empty line is one word written in hex, with
    /// an optional `0x` prefix. Lines starting with `#` are comments.
    ///
    /// Either every line parses or nothing is returned.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let mut words = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let digits = line
                .strip_prefix("0x")
                .or_else(|| line.strip_prefix("0X"))
                .unwrap_or(line);
            let word = u32::from_str_radix(digits, 16).map_err(|_| LoadError::Malformed {
                line: i + 1,
                text: line.to_string(),
            })?;
            words.push(word);
        }
        Ok(Self { words })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Fail if the image does not fit into `capacity` words.
    pub fn ensure_fits(&self, capacity: usize) -> Result<(), LoadError> {
        if self.words.len() > capacity {
            return Err(LoadError::TooLarge {
                words: self.words.len(),
                capacity,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (addr, word) in self.words.iter().enumerate() {
            let text = crate::isa::Inst::disassemble(*word)
                .map(|inst| inst.to_string())
                .unwrap_or_else(|| String::from("(unsupported)"));
            writeln!(f, "{:#06x}: {:08x}  {}", addr, word, text)?;
        }
        Ok(())
    }
}
