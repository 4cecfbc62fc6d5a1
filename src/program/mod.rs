//! Program storage and management
//!
//! Holds numbered program lines in ascending order. Each line keeps the text
//! the user typed (for LIST and SAVE) next to its tokens (for execution).

use crate::error::{BasicError, Result};
use crate::tokenizer::{tokenize, TokenizedLine};
use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

/// One stored program line
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramLine {
    /// Statement text as entered, without the line number
    pub text: String,
    /// Tokenized form of `text`
    pub tokens: TokenizedLine,
}

/// Program line storage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramStore {
    lines: BTreeMap<u32, ProgramLine>,
}

impl ProgramStore {
    /// Create a new program store
    pub fn new() -> Self {
        Self {
            lines: BTreeMap::new(),
        }
    }

    /// Build a store from program text, one `<number> <statement>` per line
    pub fn from_text(source: &str) -> Result<Self> {
        let mut store = Self::new();
        for raw in source.lines() {
            if raw.trim().is_empty() {
                continue;
            }
            match parse_numbered_line(raw)? {
                Some((number, body)) => store.set_line(number, body).map_err(|e| {
                    BasicError::Lex(format!("{} in line {}", e.message(), number))
                })?,
                None => {
                    return Err(BasicError::syntax(format!(
                        "missing line number: {}",
                        raw.trim()
                    )))
                }
            }
        }
        Ok(store)
    }

    /// Store, replace or (with an empty body) delete a program line
    pub fn set_line(&mut self, line_number: u32, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            self.delete_line(line_number);
            return Ok(());
        }
        let tokens = tokenize(text)?;
        self.lines.insert(
            line_number,
            ProgramLine {
                text: text.to_string(),
                tokens,
            },
        );
        Ok(())
    }

    /// Get a program line
    pub fn get_line(&self, line_number: u32) -> Option<&ProgramLine> {
        self.lines.get(&line_number)
    }

    /// Delete a program line
    pub fn delete_line(&mut self, line_number: u32) {
        self.lines.remove(&line_number);
    }

    pub fn contains(&self, line_number: u32) -> bool {
        self.lines.contains_key(&line_number)
    }

    /// Lowest line number, where RUN starts
    pub fn first_line(&self) -> Option<u32> {
        self.lines.keys().next().copied()
    }

    /// The next stored line strictly after `line_number`, skipping gaps
    pub fn next_line_after(&self, line_number: u32) -> Option<u32> {
        self.lines
            .range((Excluded(line_number), Unbounded))
            .next()
            .map(|(number, _)| *number)
    }

    /// All lines in ascending order as (number, text) pairs
    pub fn list(&self) -> Vec<(u32, String)> {
        self.lines
            .iter()
            .map(|(number, line)| (*number, line.text.clone()))
            .collect()
    }

    /// Program text in the file format: `<number> <statement>` per line
    pub fn to_text(&self) -> String {
        self.lines
            .iter()
            .map(|(number, line)| format!("{} {}\n", number, line.text))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Clear all program lines
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// Split `"20 FD 100"` into `(20, "FD 100")`
///
/// Returns `Ok(None)` when the text does not start with a line number,
/// including text that opens with a `0x` hexadecimal literal. Line numbers
/// must be positive and fit in 32 bits.
pub fn parse_numbered_line(text: &str) -> Result<Option<(u32, &str)>> {
    let text = text.trim_start();
    let digits_end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    if digits_end == 0 {
        return Ok(None);
    }
    if text.starts_with("0x") || text.starts_with("0X") {
        return Ok(None);
    }

    let number = text[..digits_end]
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| BasicError::value("line number out of range"))?;
    Ok(Some((number, text[digits_end..].trim())))
}
