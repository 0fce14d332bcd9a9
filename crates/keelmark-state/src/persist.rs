//! Atomic on-disk persistence for a [`DesignState`]: write to a sibling
//! `.tmp` file, then rename over the real path so a crash or concurrent
//! reader never observes a half-written design.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use keelmark_types::DesignState;

#[derive(Debug, Clone)]
pub struct DesignFile {
    path: PathBuf,
}

impl DesignFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, state: &DesignState) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create state dir {}", parent.display()))?;
        }
        let tmp_path = self.path.with_extension("tmp");
        let json = serde_json::to_string_pretty(state)
            .context("failed to serialize design state to JSON")?;
        fs::write(&tmp_path, json)
            .with_context(|| format!("failed to write state file {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("failed to rename state file to {}", self.path.display()))?;
        Ok(())
    }

    pub fn load(&self) -> anyhow::Result<DesignState> {
        if !self.path.exists() {
            return Err(anyhow::anyhow!(
                "design state file not found: {}",
                self.path.display()
            ));
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read state file {}", self.path.display()))?;
        let state: DesignState = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse design state JSON from {}", self.path.display()))?;
        Ok(state)
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn delete(&self) -> anyhow::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("failed to delete state file {}", self.path.display()))?;
        }
        Ok(())
    }
}
