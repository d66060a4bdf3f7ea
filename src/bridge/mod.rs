//! Message bridge log
//!
//! Records messages that crossed the bridge and answers per-agent traffic
//! questions. Storage is behind [`MessageLog`]; the shipped backend writes
//! daily JSONL files.

pub mod jsonl;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::protocol::{Command, FlagVector, Message, encode};

pub use jsonl::JsonlBridge;

/// Which way a recorded message was travelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Sent => f.write_str("sent"),
            Direction::Received => f.write_str("received"),
        }
    }
}

/// One logged message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeRecord {
    pub timestamp: DateTime<Utc>,
    pub local_time: String,
    pub direction: Direction,
    pub source: String,
    pub dest: String,
    pub flags: FlagVector,
    pub payload: String,
    pub command: Command,
    /// Encoded wire form
    pub line: String,
}

impl BridgeRecord {
    pub fn new(message: &Message, direction: Direction) -> Self {
        Self {
            timestamp: Utc::now(),
            local_time: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            direction,
            source: message.source().to_string(),
            dest: message.dest().to_string(),
            flags: message.flags(),
            payload: message.payload().to_string(),
            command: message.command(),
            line: encode(message),
        }
    }
}

/// Sent/received counts for one agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgentTraffic {
    pub sent: usize,
    pub received: usize,
}

/// Tally records per agent.
///
/// A `Sent` record counts for its source, a `Received` record for its dest.
/// Both ends always get an entry, so a message bridged out by one side and
/// in by the other counts once as sent and once as received.
pub fn tally<'a>(records: impl IntoIterator<Item = &'a BridgeRecord>) -> BTreeMap<String, AgentTraffic> {
    let mut traffic: BTreeMap<String, AgentTraffic> = BTreeMap::new();
    for record in records {
        let source = traffic.entry(record.source.clone()).or_default();
        if record.direction == Direction::Sent {
            source.sent += 1;
        }
        let dest = traffic.entry(record.dest.clone()).or_default();
        if record.direction == Direction::Received {
            dest.received += 1;
        }
    }
    traffic
}

/// Storage interface for bridged messages
pub trait MessageLog {
    /// Record a message
    fn record(&self, message: &Message, direction: Direction) -> eyre::Result<()>;

    /// Sent/received counts per agent over everything recorded; see [`tally`]
    fn traffic(&self) -> eyre::Result<BTreeMap<String, AgentTraffic>>;

    /// Most recent records, newest first
    fn recent(&self, limit: usize) -> eyre::Result<Vec<BridgeRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(source: &str, dest: &str) -> Message {
        Message::new(source, dest, FlagVector::new(1), "x", Command::Query).unwrap()
    }

    #[test]
    fn test_record_carries_encoded_line() {
        let record = BridgeRecord::new(&message("5510", "7C1"), Direction::Sent);
        assert_eq!(record.line, "5510 7C1 0000000000000001 • x • Q");
        assert_eq!(record.direction, Direction::Sent);
    }

    #[test]
    fn test_tally_counts_by_direction() {
        let records = vec![
            BridgeRecord::new(&message("a", "b"), Direction::Sent),
            BridgeRecord::new(&message("a", "c"), Direction::Sent),
            BridgeRecord::new(&message("b", "a"), Direction::Received),
        ];

        let traffic = tally(&records);
        assert_eq!(traffic["a"], AgentTraffic { sent: 2, received: 1 });
        assert_eq!(traffic["b"], AgentTraffic::default());
        assert_eq!(traffic["c"], AgentTraffic::default());
    }

    #[test]
    fn test_tally_same_message_seen_from_both_ends() {
        let msg = message("5510", "7C1");
        let records = vec![
            BridgeRecord::new(&msg, Direction::Sent),
            BridgeRecord::new(&msg, Direction::Received),
        ];

        let traffic = tally(&records);
        assert_eq!(traffic["5510"], AgentTraffic { sent: 1, received: 0 });
        assert_eq!(traffic["7C1"], AgentTraffic { sent: 0, received: 1 });
    }

    #[test]
    fn test_record_serializes_flags_numerically() {
        let record = BridgeRecord::new(&message("a", "b"), Direction::Received);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["flags"], serde_json::json!(1));
        assert_eq!(json["command"], serde_json::json!("QUERY"));
        assert_eq!(json["direction"], serde_json::json!("received"));
    }
}
