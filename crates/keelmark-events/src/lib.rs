//! Append-only JSON-Lines mirror of a design's [`HistoryEntry`] log.
//!
//! `keelmark-state` keeps the authoritative history inside `DesignState`
//! itself; this crate exists for tooling that wants to tail a run (`tail
//! -f events.jsonl`) rather than re-read the whole state snapshot after
//! every change.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use keelmark_types::HistoryEntry;

pub const EVENTS_FILE: &str = "events.jsonl";

pub fn events_path(state_dir: &Path) -> PathBuf {
    state_dir.join(EVENTS_FILE)
}

/// In-memory buffer of history entries not yet flushed to disk.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<HistoryEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog { entries: Vec::new() }
    }

    /// Buffers every entry in `history` that is not already present in
    /// `existing_count` (the number of entries already flushed), so a
    /// caller can mirror a `DesignState`'s growing history without
    /// re-writing lines already on disk.
    pub fn from_new_history(history: &[HistoryEntry], existing_count: usize) -> Self {
        EventLog {
            entries: history.iter().skip(existing_count).cloned().collect(),
        }
    }

    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// Appends every buffered entry to `path` as one JSON object per
    /// line, creating the file and its parent directory if needed.
    /// Existing lines in the file are never touched.
    pub fn write_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create events dir {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open events file {}", path.display()))?;
        let mut writer = std::io::BufWriter::new(file);

        for entry in &self.entries {
            let line = serde_json::to_string(entry).context("failed to serialize history entry")?;
            writeln!(writer, "{line}").context("failed to write event line")?;
        }
        writer.flush().context("failed to flush events file")?;
        Ok(())
    }

    pub fn read_from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let file = File::open(path)
            .with_context(|| format!("failed to open events file {}", path.display()))?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line.with_context(|| {
                format!("failed to read line from events file {}", path.display())
            })?;
            let entry: HistoryEntry = serde_json::from_str(&line)
                .with_context(|| format!("failed to parse event JSON from line: {line}"))?;
            entries.push(entry);
        }
        Ok(EventLog { entries })
    }

    pub fn all_entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
