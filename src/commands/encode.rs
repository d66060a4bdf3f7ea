use eyre::{Context, Result};

use mcb::bridge::{Direction, JsonlBridge, MessageLog};
use mcb::config::Config;
use mcb::protocol::{Command, FlagVector, Message, encode};

#[allow(clippy::too_many_arguments)]
pub fn run(
    source: &str,
    dest: &str,
    flags: FlagVector,
    command: Command,
    payload: &str,
    json: bool,
    record: bool,
    config: &Config,
) -> Result<()> {
    let message = if json {
        let value: serde_json::Value = serde_json::from_str(payload).context("Payload is not valid JSON")?;
        Message::with_json(source, dest, flags, &value, command)?
    } else {
        Message::new(source, dest, flags, payload, command)?
    };

    if record {
        let bridge = JsonlBridge::new(config.bridge_path(), config.bridge.enabled);
        bridge.record(&message, Direction::Sent)?;
    }

    log::info!("Encoded {} message {} -> {}", message.command(), source, dest);
    println!("{}", encode(&message));
    Ok(())
}
