//! Agent-to-agent wire protocol
//!
//! A message is a single text line carrying routing identifiers, a 16-bit
//! flag vector, an opaque payload and a one-letter command. Encoding and
//! decoding are pure; moving the line between processes is someone else's job.

pub mod agent;
pub mod codec;
pub mod flags;
pub mod message;

pub use agent::McbAgent;
pub use codec::{decode, encode};
pub use flags::{Flag, FlagVector};
pub use message::{Command, Message};

/// Field delimiter: U+2022 with one space either side
pub const DELIMITER: &str = " \u{2022} ";
