//! Agent handle for building outgoing messages

use serde::Serialize;

use super::flags::{Flag, FlagVector};
use super::message::{Command, Message, validate_identifier};
use crate::error::McbResult;

/// A protocol endpoint: an identifier plus the flags it advertises
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct McbAgent {
    id: String,
    flags: FlagVector,
}

impl McbAgent {
    pub fn new(id: impl Into<String>, flags: FlagVector) -> McbResult<Self> {
        let id = id.into();
        validate_identifier("agent id", &id)?;
        Ok(Self { id, flags })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn flags(&self) -> FlagVector {
        self.flags
    }

    pub fn set_flag(&mut self, flag: Flag) {
        self.flags = self.flags.with(flag);
    }

    pub fn clear_flag(&mut self, flag: Flag) {
        self.flags = self.flags.without(flag);
    }

    fn message(&self, dest: &str, payload: &str, command: Command, flags: FlagVector) -> McbResult<Message> {
        Message::new(self.id.as_str(), dest, flags, payload, command)
    }

    pub fn init(&self, dest: &str, payload: &str) -> McbResult<Message> {
        self.message(dest, payload, Command::Init, self.flags)
    }

    pub fn node(&self, dest: &str, payload: &str) -> McbResult<Message> {
        self.message(dest, payload, Command::Node, self.flags)
    }

    pub fn query(&self, dest: &str, payload: &str) -> McbResult<Message> {
        self.message(dest, payload, Command::Query, self.flags)
    }

    /// Connection request; always advertises CONNECTED and BIDIRECTIONAL
    pub fn connect(&self, dest: &str) -> McbResult<Message> {
        let flags = self.flags.with(Flag::Connected).with(Flag::Bidirectional);
        self.message(dest, "", Command::Connect, flags)
    }

    /// Query with a JSON payload
    pub fn query_json(&self, dest: &str, payload: &serde_json::Value) -> McbResult<Message> {
        Message::with_json(self.id.as_str(), dest, self.flags, payload, Command::Query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::codec;

    #[test]
    fn test_agent_rejects_bad_id() {
        assert!(McbAgent::new("", FlagVector::EMPTY).is_err());
        assert!(McbAgent::new("has space", FlagVector::EMPTY).is_err());
    }

    #[test]
    fn test_builders_set_command() {
        let agent = McbAgent::new("5510", FlagVector::new(0b1111)).unwrap();
        assert_eq!(agent.init("7C1", "boot").unwrap().command(), Command::Init);
        assert_eq!(agent.node("7C1", "n").unwrap().command(), Command::Node);

        let query = agent.query("7C1", "hello").unwrap();
        assert_eq!(codec::encode(&query), "5510 7C1 0000000000001111 • hello • Q");
    }

    #[test]
    fn test_connect_sets_flags() {
        let agent = McbAgent::new("A", FlagVector::EMPTY).unwrap();
        let msg = agent.connect("B").unwrap();
        assert!(msg.flags().contains(Flag::Connected));
        assert!(msg.flags().contains(Flag::Bidirectional));
        assert_eq!(msg.payload(), "");
        // agent's own flags are untouched
        assert_eq!(agent.flags(), FlagVector::EMPTY);
    }

    #[test]
    fn test_set_and_clear_flag() {
        let mut agent = McbAgent::new("A", FlagVector::EMPTY).unwrap();
        agent.set_flag(Flag::Encrypted);
        assert!(agent.flags().contains(Flag::Encrypted));
        agent.clear_flag(Flag::Encrypted);
        assert_eq!(agent.flags(), FlagVector::EMPTY);
    }

    #[test]
    fn test_query_json() {
        let agent = McbAgent::new("A", FlagVector::EMPTY).unwrap();
        let msg = agent.query_json("B", &serde_json::json!({"k": 1})).unwrap();
        assert_eq!(msg.payload(), r#"{"k":1}"#);
    }
}
