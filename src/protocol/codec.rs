//! Wire line codec
//!
//! `<source> <dest> <16 binary flags> • <payload> • <command letter>`

use once_cell::sync::Lazy;
use regex::Regex;

use super::DELIMITER;
use super::flags::FlagVector;
use super::message::{Command, Message};
use crate::error::{McbError, McbResult};

static WIRE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\w+) (\w+) ([01]{16}) • (.*) • ([INQC])$").expect("wire pattern is valid"));

/// Encode a message as a single line, no trailing newline
pub fn encode(message: &Message) -> String {
    format!(
        "{} {} {}{}{}{}{}",
        message.source(),
        message.dest(),
        message.flags().to_binary(),
        DELIMITER,
        message.payload(),
        DELIMITER,
        message.command().letter()
    )
}

/// Validate the fields and encode them in one step
pub fn encode_fields(
    source: &str,
    dest: &str,
    flags: FlagVector,
    payload: &str,
    command: Command,
) -> McbResult<String> {
    let message = Message::new(source, dest, flags, payload, command)?;
    Ok(encode(&message))
}

/// Encode with a JSON payload, argument order as in `encode_mcb(source, dest, flags, command, payload)`
pub fn encode_json(
    source: &str,
    dest: &str,
    flags: FlagVector,
    command: Command,
    payload: &serde_json::Value,
) -> McbResult<String> {
    let message = Message::with_json(source, dest, flags, payload, command)?;
    Ok(encode(&message))
}

/// Decode a wire line. Surrounding whitespace is trimmed; nothing else is normalized.
pub fn decode(raw: &str) -> McbResult<Message> {
    let line = raw.trim();

    let Some(caps) = WIRE_LINE.captures(line) else {
        return Err(McbError::malformed(diagnose(line)));
    };

    let flags = FlagVector::from_binary(&caps[3])?;
    let command = caps[5]
        .chars()
        .next()
        .and_then(Command::from_letter)
        .ok_or_else(|| McbError::malformed(format!("unknown command letter: {}", &caps[5])))?;

    let message = Message::new(&caps[1], &caps[2], flags, &caps[4], command)?;
    log::debug!("Decoded {} message {} -> {}", command, message.source(), message.dest());
    Ok(message)
}

/// Work out why `line` did not match the wire pattern
fn diagnose(line: &str) -> String {
    let fields: Vec<&str> = line.split(DELIMITER).collect();
    if fields.len() == 1 {
        return "missing field delimiters".to_string();
    }
    if fields.len() != 3 {
        return format!("expected 3 delimited fields, got {}", fields.len());
    }

    let header: Vec<&str> = fields[0].split(' ').collect();
    if header.len() != 3 {
        return format!("expected '<source> <dest> <flags>', got {:?}", fields[0]);
    }
    if let Err(McbError::MalformedMessage { reason }) = FlagVector::from_binary(header[2]) {
        return reason;
    }

    let mut letters = fields[2].chars();
    match (letters.next(), letters.next()) {
        (Some(c), None) if Command::from_letter(c).is_some() => {}
        _ => return format!("command must be one of I, N, Q, C, got {:?}", fields[2]),
    }

    "source and dest must be word tokens".to_string()
}
