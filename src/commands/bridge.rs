use colored::*;
use eyre::Result;

use crate::cli::{BridgeAction, OutputFormat};
use mcb::bridge::{Direction, JsonlBridge, MessageLog};
use mcb::config::Config;

pub fn run(action: BridgeAction, config: &Config) -> Result<()> {
    let bridge = JsonlBridge::new(config.bridge_path(), config.bridge.enabled);

    match action {
        BridgeAction::Stats { format } => stats(&bridge, OutputFormat::resolve(format)),
        BridgeAction::Recent { count } => recent(&bridge, count),
    }
}

fn stats(bridge: &impl MessageLog, format: OutputFormat) -> Result<()> {
    let traffic = bridge.traffic()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&traffic)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&traffic)?),
        OutputFormat::Text => {
            println!("{}", "Bridge traffic:".bold());
            println!();

            if traffic.is_empty() {
                println!("  {}", "(no messages yet)".dimmed());
                return Ok(());
            }

            for (agent, counts) in &traffic {
                println!(
                    "  {:12} {:>5} sent {:>5} received",
                    agent.cyan(),
                    counts.sent.to_string().yellow(),
                    counts.received.to_string().yellow()
                );
            }
        }
    }

    Ok(())
}

fn recent(bridge: &impl MessageLog, count: usize) -> Result<()> {
    let records = bridge.recent(count)?;

    println!("{} Recent bridged messages:", "📋".blue());
    println!();

    if records.is_empty() {
        println!("  {}", "(no messages yet)".dimmed());
        return Ok(());
    }

    for record in &records {
        let direction = match record.direction {
            Direction::Sent => "→".green(),
            Direction::Received => "←".blue(),
        };
        println!("  {} {} {}", record.local_time.dimmed(), direction, record.line);
    }

    Ok(())
}
