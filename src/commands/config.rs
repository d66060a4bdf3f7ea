use colored::*;
use eyre::Result;

use crate::cli::{ConfigAction, OutputFormat};
use mcb::config::Config;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
        ConfigAction::Get { key } => get(&key, config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "MCB Configuration".bold());
            println!();

            println!("  log_level: {}", config.log_level.as_filter());
            println!();

            println!("{}:", "paths".cyan());
            println!("  state: {}", config.paths.state.display());
            println!("  bridge: {}", config.paths.bridge.display());
            println!();

            println!("{}:", "qci".cyan());
            println!("  default_coherence: {}", config.qci.default_coherence);
            println!("  signal_base: {}", config.qci.signal_base);
            println!();

            println!("{}:", "bridge".cyan());
            println!("  enabled: {}", config.bridge.enabled);
        }
    }

    Ok(())
}

fn lookup(key: &str, config: &Config) -> Option<String> {
    match key {
        "log_level" | "log-level" => Some(config.log_level.as_filter().to_string()),
        "paths.state" => Some(config.paths.state.display().to_string()),
        "paths.bridge" => Some(config.paths.bridge.display().to_string()),
        "qci.default_coherence" => Some(config.qci.default_coherence.to_string()),
        "qci.signal_base" => Some(config.qci.signal_base.to_string()),
        "bridge.enabled" => Some(config.bridge.enabled.to_string()),
        _ => None,
    }
}

fn get(key: &str, config: &Config) -> Result<()> {
    match lookup(key, config) {
        Some(v) => println!("{}", v),
        None => eyre::bail!("Unknown config key: {}", key),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_keys() {
        let config = Config::default();
        assert_eq!(lookup("qci.signal_base", &config), Some("1".to_string()));
        assert_eq!(lookup("bridge.enabled", &config), Some("true".to_string()));
        assert_eq!(lookup("log-level", &config), Some("info".to_string()));
    }

    #[test]
    fn test_lookup_unknown_key() {
        assert_eq!(lookup("nope", &Config::default()), None);
    }
}
