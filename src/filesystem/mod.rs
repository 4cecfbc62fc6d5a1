//! Program storage for SAVE, LOAD and DIR
//!
//! Programs are stored as plain text in the `<number> <statement>` format.
//! The interpreter only talks to the `ProgramStorage` trait; the directory
//! backend writes `<NAME>.bas` files and the memory backend serves tests and
//! embedders without a file system.

use crate::error::{BasicError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// File extension of saved programs
const EXTENSION: &str = "bas";

/// Where SAVE writes and LOAD reads program text
pub trait ProgramStorage: fmt::Debug {
    /// Store program text under a name, replacing any previous copy
    fn save(&mut self, name: &str, text: &str) -> Result<()>;
    /// Fetch program text by name
    fn load(&self, name: &str) -> Result<String>;
    /// Names of all stored programs, sorted
    fn list(&self) -> Result<Vec<String>>;
}

/// Reject names that are empty or would escape the storage directory
fn check_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(BasicError::value(format!("bad program name \"{}\"", name)));
    }
    Ok(name)
}

/// Programs as `<NAME>.bas` files in one directory
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    dir: PathBuf,
}

impl DirectoryStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        Ok(self.dir.join(format!("{}.{}", check_name(name)?, EXTENSION)))
    }
}

impl ProgramStorage for DirectoryStorage {
    fn save(&mut self, name: &str, text: &str) -> Result<()> {
        let path = self.path_for(name)?;
        fs::write(&path, text)?;
        tracing::info!(path = %path.display(), "program saved");
        Ok(())
    }

    fn load(&self, name: &str) -> Result<String> {
        let path = self.path_for(name)?;
        match fs::read_to_string(&path) {
            Ok(text) => {
                tracing::info!(path = %path.display(), "program loaded");
                Ok(text)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BasicError::Io(format!(
                "program {} not found",
                name.trim()
            ))),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some(EXTENSION) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Programs kept in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    programs: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgramStorage for MemoryStorage {
    fn save(&mut self, name: &str, text: &str) -> Result<()> {
        let name = check_name(name)?;
        self.programs.insert(name.to_string(), text.to_string());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<String> {
        let name = check_name(name)?;
        self.programs
            .get(name)
            .cloned()
            .ok_or_else(|| BasicError::Io(format!("program {} not found", name)))
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.programs.keys().cloned().collect())
    }
}
