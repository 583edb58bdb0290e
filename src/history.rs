//! Finished calculations, newest first.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Entries are kept on a single line each so the saved file reads back the same.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<String>,
    capacity: Option<usize>,
    file: Option<PathBuf>,
}

impl History {
    /// `capacity` of `None` keeps every entry.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            file: None,
        }
    }

    /// Writes the history to `path` after every change from now on.
    pub fn persist_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Adds an entry at the front, dropping the oldest ones past capacity.
    ///
    /// Line breaks and other control characters become spaces.
    pub fn push(&mut self, entry: impl Into<String>) {
        let mut entry = entry.into();
        if entry.contains(char::is_control) {
            entry = entry
                .chars()
                .map(|c| if c.is_control() { ' ' } else { c })
                .collect();
        }
        self.entries.push_front(entry);
        if let Some(capacity) = self.capacity {
            self.entries.truncate(capacity);
        }
        self.write_through();
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn latest(&self) -> Option<&str> {
        self.entries.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.write_through();
    }

    /// One entry per line, newest first.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(entry);
            out.push('\n');
        }
        out
    }

    /// Reads a history written by [`History::save`]. A missing file is an empty history.
    pub fn load(path: &Path, capacity: Option<usize>) -> io::Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e),
        };

        let mut entries: VecDeque<String> = contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        if let Some(capacity) = capacity {
            entries.truncate(capacity);
        }

        Ok(Self {
            entries,
            capacity,
            file: None,
        })
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render())
    }

    fn write_through(&self) {
        if let Some(path) = &self.file {
            if let Err(e) = self.save(path) {
                warn!(path = %path.display(), error = %e, "failed to save history");
            }
        }
    }
}
