//! Token table and greedy CTC decoding.

use std::fs;
use std::path::Path;

use crate::error::{Result, SttError};

/// SentencePiece token table for a CTC model.
///
/// Token ids are line numbers; the id column in the file is assumed to
/// agree with it. `▁` marks word boundaries.
pub struct TokenDecoder {
    tokens: Vec<String>,
    blank_id: usize,
}

impl TokenDecoder {
    /// Load a `tokens.txt` with one `<token_text> <token_id>` pair per
    /// line, e.g. `▁the 4`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            SttError::model_load(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let tokens: Vec<String> = contents
            .lines()
            .map(|line| line.split_whitespace().next().unwrap_or("").to_string())
            .collect();
        if tokens.is_empty() {
            return Err(SttError::model_load(format!(
                "Token file is empty: {}",
                path.display()
            )));
        }

        // CTC blank is conventionally the last id when not listed
        let blank_id = tokens
            .iter()
            .position(|t| t == "<blk>" || t == "<blank>")
            .unwrap_or(tokens.len() - 1);

        Ok(Self { tokens, blank_id })
    }

    pub fn vocab_size(&self) -> usize {
        self.tokens.len()
    }

    pub fn blank_id(&self) -> usize {
        self.blank_id
    }

    /// Collapse repeated ids, drop blanks, and join the remaining token
    /// texts into words.
    pub fn decode(&self, ids: &[usize]) -> String {
        let mut pieces: Vec<&str> = Vec::new();
        let mut prev = self.blank_id;
        for &id in ids {
            if id != self.blank_id && id != prev {
                if let Some(token) = self.tokens.get(id) {
                    pieces.push(token);
                }
            }
            prev = id;
        }
        pieces.concat().replace("▁", " ").trim().to_string()
    }
}
