//! JSONL bridge backend
//!
//! Format: `<bridge dir>/YYYY-MM/YYYY-MM-DD.jsonl`, one record per line.

use chrono::Local;
use eyre::{Context, Result};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::{AgentTraffic, BridgeRecord, Direction, MessageLog, tally};
use crate::protocol::Message;

pub struct JsonlBridge {
    base_path: PathBuf,
    enabled: bool,
}

impl JsonlBridge {
    pub fn new(base_path: PathBuf, enabled: bool) -> Self {
        Self { base_path, enabled }
    }

    fn today_log_path(&self) -> PathBuf {
        let now = Local::now();
        self.base_path
            .join(now.format("%Y-%m").to_string())
            .join(format!("{}.jsonl", now.format("%Y-%m-%d")))
    }

    fn append(&self, record: &BridgeRecord) -> Result<()> {
        let log_path = self.today_log_path();

        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent).context("Failed to create bridge directory")?;
        }

        let json_line = serde_json::to_string(record).context("Failed to serialize bridge record")?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open bridge log: {}", log_path.display()))?;

        writeln!(file, "{}", json_line).context("Failed to write bridge record")?;

        log::debug!("Bridged {} {} -> {}", record.direction, record.source, record.dest);
        Ok(())
    }

    /// All daily log files, oldest first
    fn log_files(&self) -> Result<Vec<PathBuf>> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for month_entry in fs::read_dir(&self.base_path)? {
            let month_path = month_entry?.path();
            if !month_path.is_dir() {
                continue;
            }
            for file_entry in fs::read_dir(&month_path)? {
                let file_path = file_entry?.path();
                if file_path.extension().is_some_and(|e| e == "jsonl") {
                    files.push(file_path);
                }
            }
        }

        // file names are dates, so name order is chronological
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    fn read_file(&self, path: &Path) -> Result<Vec<BridgeRecord>> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read bridge log: {}", path.display()))?;

        let mut records = Vec::new();
        for line in content.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!("Skipping unreadable bridge record in {}: {}", path.display(), e),
            }
        }
        Ok(records)
    }

    /// Every record, oldest first
    pub fn read_all(&self) -> Result<Vec<BridgeRecord>> {
        let mut records = Vec::new();
        for path in self.log_files()? {
            records.extend(self.read_file(&path)?);
        }
        Ok(records)
    }
}

impl MessageLog for JsonlBridge {
    fn record(&self, message: &Message, direction: Direction) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        self.append(&BridgeRecord::new(message, direction))
    }

    fn traffic(&self) -> Result<BTreeMap<String, AgentTraffic>> {
        Ok(tally(&self.read_all()?))
    }

    fn recent(&self, limit: usize) -> Result<Vec<BridgeRecord>> {
        let mut records = self.read_all()?;
        records.reverse();
        records.truncate(limit);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Command, FlagVector};
    use tempfile::TempDir;

    fn message(source: &str, dest: &str, payload: &str) -> Message {
        Message::new(source, dest, FlagVector::new(0b1111), payload, Command::Query).unwrap()
    }

    #[test]
    fn test_disabled_bridge_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let bridge = JsonlBridge::new(temp.path().join("bridge"), false);
        bridge.record(&message("a", "b", "x"), Direction::Sent).unwrap();
        assert!(!temp.path().join("bridge").exists());
        assert!(bridge.traffic().unwrap().is_empty());
    }

    #[test]
    fn test_record_and_count() {
        let temp = TempDir::new().unwrap();
        let bridge = JsonlBridge::new(temp.path().to_path_buf(), true);

        bridge.record(&message("5510", "7C1", "one"), Direction::Sent).unwrap();
        bridge.record(&message("5510", "7C1", "two"), Direction::Sent).unwrap();
        bridge.record(&message("7C1", "5510", "three"), Direction::Received).unwrap();

        let traffic = bridge.traffic().unwrap();
        assert_eq!(traffic["5510"], AgentTraffic { sent: 2, received: 1 });
        assert_eq!(traffic["7C1"], AgentTraffic::default());
    }

    #[test]
    fn test_recent_is_newest_first() {
        let temp = TempDir::new().unwrap();
        let bridge = JsonlBridge::new(temp.path().to_path_buf(), true);

        for payload in ["first", "second", "third"] {
            bridge.record(&message("a", "b", payload), Direction::Sent).unwrap();
        }

        let recent = bridge.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].payload, "third");
        assert_eq!(recent[1].payload, "second");
    }

    #[test]
    fn test_unreadable_lines_are_skipped() {
        let temp = TempDir::new().unwrap();
        let bridge = JsonlBridge::new(temp.path().to_path_buf(), true);
        bridge.record(&message("a", "b", "ok"), Direction::Sent).unwrap();

        let path = bridge.today_log_path();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{not json").unwrap();

        assert_eq!(bridge.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_records_decode_back_to_messages() {
        let temp = TempDir::new().unwrap();
        let bridge = JsonlBridge::new(temp.path().to_path_buf(), true);
        let original = message("5510", "7C1", "hello");
        bridge.record(&original, Direction::Sent).unwrap();

        let recent = bridge.recent(1).unwrap();
        assert_eq!(crate::protocol::decode(&recent[0].line).unwrap(), original);
    }
}
