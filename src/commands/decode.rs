use colored::*;
use eyre::Result;
use serde::Serialize;

use crate::cli::OutputFormat;
use mcb::bridge::{Direction, JsonlBridge, MessageLog};
use mcb::config::Config;
use mcb::protocol::{Message, decode};

#[derive(Serialize)]
struct Decoded<'a> {
    source: &'a str,
    dest: &'a str,
    flags: u16,
    flags_binary: String,
    active_flags: Vec<String>,
    payload: &'a str,
    command: String,
    command_letter: char,
}

impl<'a> Decoded<'a> {
    fn from_message(message: &'a Message) -> Self {
        Self {
            source: message.source(),
            dest: message.dest(),
            flags: message.flags().bits(),
            flags_binary: message.flags().to_binary(),
            active_flags: message.flags().active().iter().map(|f| f.to_string()).collect(),
            payload: message.payload(),
            command: message.command().to_string(),
            command_letter: message.command().letter(),
        }
    }
}

pub fn run(line: &str, format: OutputFormat, record: bool, config: &Config) -> Result<()> {
    let message = decode(line)?;

    if record {
        let bridge = JsonlBridge::new(config.bridge_path(), config.bridge.enabled);
        bridge.record(&message, Direction::Received)?;
    }

    let decoded = Decoded::from_message(&message);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&decoded)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&decoded)?),
        OutputFormat::Text => print_text(&decoded),
    }

    Ok(())
}

fn print_text(decoded: &Decoded) {
    let flag_names = if decoded.active_flags.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        decoded.active_flags.join(", ").yellow().to_string()
    };

    println!("  {:10} {}", "Source:".dimmed(), decoded.source.green());
    println!("  {:10} {}", "Dest:".dimmed(), decoded.dest.green());
    println!("  {:10} {} {}", "Flags:".dimmed(), decoded.flags_binary, flag_names);
    println!(
        "  {:10} {} ({})",
        "Command:".dimmed(),
        decoded.command.cyan(),
        decoded.command_letter
    );
    println!("  {:10} {}", "Payload:".dimmed(), decoded.payload);
}
