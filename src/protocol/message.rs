//! Protocol message and command types

use lazy_regex::regex_is_match;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DELIMITER;
use super::flags::FlagVector;
use crate::error::{McbError, McbResult};

/// One-letter command tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Command {
    Init,
    Node,
    Query,
    Connect,
}

impl Command {
    pub const ALL: [Command; 4] = [Command::Init, Command::Node, Command::Query, Command::Connect];

    pub fn letter(self) -> char {
        match self {
            Command::Init => 'I',
            Command::Node => 'N',
            Command::Query => 'Q',
            Command::Connect => 'C',
        }
    }

    /// Wire letter lookup. Case-sensitive: only `I`, `N`, `Q`, `C`.
    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'I' => Some(Command::Init),
            'N' => Some(Command::Node),
            'Q' => Some(Command::Query),
            'C' => Some(Command::Connect),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::Init => "INIT",
            Command::Node => "NODE",
            Command::Query => "QUERY",
            Command::Connect => "CONNECT",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lenient parsing for command-line input: the wire letter or the full name, any case.
impl FromStr for Command {
    type Err = McbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "I" | "INIT" => Ok(Command::Init),
            "N" | "NODE" => Ok(Command::Node),
            "Q" | "QUERY" => Ok(Command::Query),
            "C" | "CONNECT" => Ok(Command::Connect),
            _ => Err(McbError::malformed(format!("unknown command: {}", s))),
        }
    }
}

/// Check that `id` can be used as a routing identifier on the wire
pub fn validate_identifier(field: &str, id: &str) -> McbResult<()> {
    if regex_is_match!(r"^\w+$", id) {
        Ok(())
    } else {
        Err(McbError::malformed(format!("{} must be a non-empty word token, got {:?}", field, id)))
    }
}

/// A protocol message. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    source: String,
    dest: String,
    flags: FlagVector,
    payload: String,
    command: Command,
}

impl Message {
    /// Build a message, rejecting fields that could not survive encoding
    pub fn new(
        source: impl Into<String>,
        dest: impl Into<String>,
        flags: FlagVector,
        payload: impl Into<String>,
        command: Command,
    ) -> McbResult<Self> {
        let source = source.into();
        let dest = dest.into();
        let payload = payload.into();

        validate_identifier("source", &source)?;
        validate_identifier("dest", &dest)?;

        if payload.contains(DELIMITER) {
            return Err(McbError::malformed("payload contains the field delimiter"));
        }
        if payload.contains(['\n', '\r']) {
            return Err(McbError::malformed("payload contains a line break"));
        }

        Ok(Self {
            source,
            dest,
            flags,
            payload,
            command,
        })
    }

    /// Build a message whose payload is compact JSON
    pub fn with_json(
        source: impl Into<String>,
        dest: impl Into<String>,
        flags: FlagVector,
        payload: &serde_json::Value,
        command: Command,
    ) -> McbResult<Self> {
        let payload = serde_json::to_string(payload)
            .map_err(|e| McbError::malformed(format!("payload is not serializable: {}", e)))?;
        Self::new(source, dest, flags, payload, command)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn dest(&self) -> &str {
        &self.dest
    }

    pub fn flags(&self) -> FlagVector {
        self.flags
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn command(&self) -> Command {
        self.command
    }

    /// Parse the payload as JSON. The codec itself never does this.
    pub fn payload_json(&self) -> McbResult<serde_json::Value> {
        serde_json::from_str(&self.payload).map_err(|e| McbError::malformed(format!("payload is not JSON: {}", e)))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::codec::encode(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_letters() {
        for cmd in Command::ALL {
            assert_eq!(Command::from_letter(cmd.letter()), Some(cmd));
        }
        assert_eq!(Command::from_letter('q'), None);
        assert_eq!(Command::from_letter('Z'), None);
    }

    #[test]
    fn test_command_from_str_is_lenient() {
        assert_eq!("q".parse::<Command>().unwrap(), Command::Query);
        assert_eq!("Connect".parse::<Command>().unwrap(), Command::Connect);
        assert!("X".parse::<Command>().is_err());
    }

    #[test]
    fn test_new_rejects_bad_identifiers() {
        let flags = FlagVector::EMPTY;
        assert!(Message::new("", "B", flags, "x", Command::Query).is_err());
        assert!(Message::new("A A", "B", flags, "x", Command::Query).is_err());
        assert!(Message::new("A", "B•", flags, "x", Command::Query).is_err());
        assert!(Message::new("agent_1", "7C1", flags, "x", Command::Query).is_ok());
    }

    #[test]
    fn test_new_rejects_delimiter_in_payload() {
        let result = Message::new("A", "B", FlagVector::EMPTY, "x • y", Command::Node);
        assert!(matches!(result, Err(McbError::MalformedMessage { .. })));

        let result = Message::new("A", "B", FlagVector::EMPTY, "line\nbreak", Command::Node);
        assert!(result.is_err());
    }

    #[test]
    fn test_json_payload() {
        let value = serde_json::json!({"test": true});
        let msg = Message::with_json("5510", "7C1", FlagVector::new(1), &value, Command::Query).unwrap();
        assert_eq!(msg.payload(), r#"{"test":true}"#);
        assert_eq!(msg.payload_json().unwrap(), value);

        let plain = Message::new("5510", "7C1", FlagVector::EMPTY, "hello", Command::Query).unwrap();
        assert!(plain.payload_json().is_err());
    }
}
