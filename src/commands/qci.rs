//! Coherence tracker commands
//!
//! Each invocation loads the saved network, applies one operation and saves
//! it again if anything changed.

use colored::*;
use eyre::{Context, Result};
use serde::Serialize;

use crate::cli::{OutputFormat, QciAction};
use mcb::config::Config;
use mcb::qci::{BreathingCycle, NetworkStore, Qci, Reception};

pub fn run(action: QciAction, config: &Config) -> Result<()> {
    let store = NetworkStore::new(config.state_path());

    match action {
        QciAction::Status { format } => status(&store, OutputFormat::resolve(format)),
        QciAction::Register { id, coherence } => {
            register(&store, &id, coherence.unwrap_or(config.qci.default_coherence))
        }
        QciAction::Update { id, level } => update(&store, &id, level),
        QciAction::Signal { id, base } => signal(&store, &id, base.unwrap_or(config.qci.signal_base)),
        QciAction::Rovq {
            id,
            resonance,
            quality,
        } => rov_q(&store, &id, resonance, quality),
        QciAction::Broadcast { id, payload, format } => {
            broadcast(&store, &id, &payload, OutputFormat::resolve(format))
        }
        QciAction::Breathe { cycle, ids } => breathe(&store, cycle, &ids),
        QciAction::Flags { level } => flags(level),
        QciAction::Reset => reset(&store),
    }
}

#[derive(Serialize)]
struct AgentStatus {
    id: String,
    coherence_level: f64,
    coherence_flags: String,
    resonance: f64,
    quality: f64,
    rov_q: f64,
    signal: Option<f64>,
    breathing_cycle: Option<BreathingCycle>,
}

#[derive(Serialize)]
struct Status {
    network_coherence: f64,
    agent_count: usize,
    agents: Vec<AgentStatus>,
}

fn gather_status(qci: &Qci) -> Status {
    let agents = qci
        .agents()
        .map(|a| AgentStatus {
            id: a.id().to_string(),
            coherence_level: a.coherence_level(),
            coherence_flags: Qci::coherence_to_flags(a.coherence_level()).to_binary(),
            resonance: a.resonance(),
            quality: a.quality(),
            rov_q: a.rov_q(),
            signal: a.signal(),
            breathing_cycle: a.breathing_cycle(),
        })
        .collect();

    Status {
        network_coherence: qci.calculate_network_coherence(),
        agent_count: qci.len(),
        agents,
    }
}

fn status(store: &NetworkStore, format: OutputFormat) -> Result<()> {
    let qci = store.load()?;
    let status = gather_status(&qci);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&status)?),
        OutputFormat::Text => print_text_status(&status),
    }

    Ok(())
}

fn print_text_status(status: &Status) {
    println!("{}", "QCI Network Status".bold());
    println!();
    println!(
        "  {:20} {}",
        "Network coherence:".dimmed(),
        format!("{:.3}", status.network_coherence).yellow()
    );
    println!();

    println!(
        "{} ({}):",
        "Agents".cyan(),
        format!("{} registered", status.agent_count).dimmed()
    );
    if status.agents.is_empty() {
        println!("  {}", "(none)".dimmed());
        return;
    }

    for agent in &status.agents {
        let signal = agent
            .signal
            .map(|s| format!("signal {:.3}", s))
            .unwrap_or_else(|| "signal -".to_string());
        let cycle = agent
            .breathing_cycle
            .map(|c| format!("[{}]", c).cyan().to_string())
            .unwrap_or_default();
        println!(
            "  {} {:12} {} {} {} {}",
            "●".green(),
            agent.id.green(),
            format!("coherence {:.3}", agent.coherence_level).yellow(),
            signal.dimmed(),
            format!("rov-q {:.3}", agent.rov_q).dimmed(),
            cycle
        );
    }
}

fn register(store: &NetworkStore, id: &str, coherence: f64) -> Result<()> {
    let mut qci = store.load()?;
    let replaced = qci.contains(id);
    let level = qci.register_agent(id, coherence)?.coherence_level();
    store.save(&qci)?;

    let verb = if replaced { "Re-registered" } else { "Registered" };
    println!("{} {} {} at coherence {:.3}", "✓".green(), verb, id.cyan(), level);
    Ok(())
}

fn update(store: &NetworkStore, id: &str, level: f64) -> Result<()> {
    let mut qci = store.load()?;
    let level = qci.update_coherence(id, level)?.coherence_level();
    store.save(&qci)?;

    println!("{} {} coherence = {:.3}", "✓".green(), id.cyan(), level);
    Ok(())
}

fn signal(store: &NetworkStore, id: &str, base: f64) -> Result<()> {
    let mut qci = store.load()?;
    let signal = qci.calculate_signal(id, base)?;
    store.save(&qci)?;

    println!("{:.6}", signal);
    Ok(())
}

fn rov_q(store: &NetworkStore, id: &str, resonance: f64, quality: f64) -> Result<()> {
    let mut qci = store.load()?;
    let rov_q = qci.calculate_rov_q(id, resonance, quality)?;
    store.save(&qci)?;

    println!("{:.6}", rov_q);
    Ok(())
}

fn broadcast(store: &NetworkStore, id: &str, payload: &str, format: OutputFormat) -> Result<()> {
    let payload: serde_json::Value = serde_json::from_str(payload).context("Broadcast payload must be JSON")?;
    let qci = store.load()?;
    let results = qci.broadcast_signal(id, &payload)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&results)?),
        OutputFormat::Text => {
            let received = results.values().filter(|r| r.received).count();
            println!(
                "{} Broadcast from {} reached {}/{} agents",
                "→".blue(),
                id.cyan(),
                received.to_string().yellow(),
                results.len()
            );
            for (recipient, reception) in &results {
                print_reception(recipient, reception);
            }
        }
    }

    Ok(())
}

fn print_reception(recipient: &str, reception: &Reception) {
    let mark = if reception.received { "✓".green() } else { "○".dimmed() };
    println!("  {} {:12} clarity {:.3}", mark, recipient, reception.clarity);
}

fn breathe(store: &NetworkStore, cycle: BreathingCycle, ids: &[String]) -> Result<()> {
    let mut qci = store.load()?;
    let tagged = qci.sync_breathing(ids, cycle);
    store.save(&qci)?;

    println!(
        "{} {} of {} agents now in {}",
        "✓".green(),
        tagged,
        ids.len(),
        cycle.to_string().cyan()
    );
    Ok(())
}

fn flags(level: f64) -> Result<()> {
    println!("{}", Qci::coherence_to_flags(level).to_binary());
    Ok(())
}

fn reset(store: &NetworkStore) -> Result<()> {
    if store.clear()? {
        println!("{} Network cleared", "✓".green());
    } else {
        println!("  {}", "(no saved network)".dimmed());
    }
    Ok(())
}
