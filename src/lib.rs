//! MCB: compact agent-to-agent wire protocol and network coherence tracker
//!
//! - [`protocol`]: flag vectors, messages and the single-line wire codec
//! - [`qci`]: per-agent coherence state, broadcast reception and aggregation
//! - [`bridge`]: message log interface with a JSONL backend
//! - [`config`]: YAML configuration with a file fallback chain

pub mod bridge;
pub mod config;
pub mod error;
pub mod protocol;
pub mod qci;

pub use error::{McbError, McbResult};
