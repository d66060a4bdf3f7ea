//! Network snapshot persistence
//!
//! Lets the CLI keep one registry across invocations. The tracker itself
//! never touches the filesystem.

use eyre::{Context, Result};
use std::fs;
use std::path::PathBuf;

use super::Qci;

pub struct NetworkStore {
    path: PathBuf,
}

impl NetworkStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the saved network, or an empty one if nothing was saved yet
    pub fn load(&self) -> Result<Qci> {
        if !self.path.exists() {
            log::debug!("No network snapshot at {}, starting empty", self.path.display());
            return Ok(Qci::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read network snapshot: {}", self.path.display()))?;
        let qci: Qci = serde_json::from_str(&content).context("Failed to parse network snapshot")?;

        log::debug!("Loaded {} agents from {}", qci.len(), self.path.display());
        Ok(qci)
    }

    /// Write the network. Infinite and NaN values have no JSON form, so a
    /// network holding one is refused and the previous snapshot is kept.
    pub fn save(&self, qci: &Qci) -> Result<()> {
        if let Some((id, field)) = qci.first_non_finite() {
            eyre::bail!("Agent {} has a non-finite {}; network not saved", id, field);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create state directory")?;
        }

        let json = serde_json::to_string_pretty(qci).context("Failed to serialize network")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write network snapshot: {}", self.path.display()))?;

        log::info!("Saved {} agents to {}", qci.len(), self.path.display());
        Ok(())
    }

    /// Remove the snapshot; returns whether one existed
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path).context("Failed to remove network snapshot")?;
        Ok(true)
    }
}
