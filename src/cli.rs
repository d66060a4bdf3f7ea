use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

use mcb::protocol::{Command, FlagVector};
use mcb::qci::BreathingCycle;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "mcb",
    about = "Agent wire protocol codec and network coherence tracker",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/mcb/logs/mcb.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to mcb.yaml config file")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode a message as a wire line
    Encode {
        /// Source agent id
        source: String,

        /// Destination agent id
        dest: String,

        /// Flags: 0b..., 0x..., 16 binary digits, or decimal
        flags: FlagVector,

        /// Command: I/N/Q/C or INIT/NODE/QUERY/CONNECT
        command: Command,

        /// Payload text
        #[arg(default_value = "")]
        payload: String,

        /// Require the payload to be valid JSON and write it compactly
        #[arg(long)]
        json: bool,

        /// Also record the message in the bridge log as sent
        #[arg(long)]
        record: bool,
    },

    /// Decode a wire line
    Decode {
        /// The line to decode
        line: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,

        /// Also record the message in the bridge log as received
        #[arg(long)]
        record: bool,
    },

    /// Coherence tracker operations
    Qci {
        #[command(subcommand)]
        action: QciAction,
    },

    /// Query the message bridge log
    Bridge {
        #[command(subcommand)]
        action: BridgeAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum QciAction {
    /// Show network coherence and every agent's state
    Status {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Register (or re-register) an agent
    Register {
        /// Agent id
        id: String,

        /// Initial coherence (clamped to 0..1; defaults to qci.default_coherence)
        #[arg(long, allow_hyphen_values = true)]
        coherence: Option<f64>,
    },

    /// Set a registered agent's coherence level
    Update {
        /// Agent id
        id: String,

        /// New level (clamped to 0..1)
        #[arg(allow_hyphen_values = true)]
        level: f64,
    },

    /// Compute and store an agent's signal
    Signal {
        /// Agent id
        id: String,

        /// Base signal (defaults to qci.signal_base)
        #[arg(long, allow_hyphen_values = true)]
        base: Option<f64>,
    },

    /// Compute and store an agent's ROV-Q
    Rovq {
        /// Agent id
        id: String,

        #[arg(long, allow_hyphen_values = true)]
        resonance: f64,

        #[arg(long, allow_hyphen_values = true)]
        quality: f64,
    },

    /// Broadcast from one agent to all others
    Broadcast {
        /// Source agent id
        id: String,

        /// JSON payload
        #[arg(long, default_value = "{}")]
        payload: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Tag agents with a breathing cycle
    Breathe {
        /// INHALE, HOLD or EXHALE
        cycle: BreathingCycle,

        /// Agent ids (unregistered ids are skipped)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show the flag vector for a coherence level (display only)
    Flags {
        #[arg(allow_hyphen_values = true)]
        level: f64,
    },

    /// Forget every registered agent
    Reset,
}

#[derive(Subcommand)]
pub enum BridgeAction {
    /// Sent/received counts per agent
    Stats {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Show recent bridged messages
    Recent {
        /// Number of entries
        #[arg(long, default_value = "10")]
        count: usize,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Get a configuration value
    Get {
        /// Configuration key (dot notation)
        key: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_encode() {
        let cli = Cli::try_parse_from(["mcb", "encode", "5510", "7C1", "0b1111", "Q", "hello"]).unwrap();
        match cli.command {
            Commands::Encode {
                source,
                flags,
                command,
                payload,
                ..
            } => {
                assert_eq!(source, "5510");
                assert_eq!(flags.bits(), 15);
                assert_eq!(command, Command::Query);
                assert_eq!(payload, "hello");
            }
            _ => panic!("expected encode"),
        }
    }

    #[test]
    fn test_parse_rejects_oversized_flags() {
        assert!(Cli::try_parse_from(["mcb", "encode", "A", "B", "70000", "Q"]).is_err());
    }

    #[test]
    fn test_parse_breathe() {
        let cli = Cli::try_parse_from(["mcb", "qci", "breathe", "inhale", "a", "b"]).unwrap();
        match cli.command {
            Commands::Qci {
                action: QciAction::Breathe { cycle, ids },
            } => {
                assert_eq!(cycle, BreathingCycle::Inhale);
                assert_eq!(ids, vec!["a", "b"]);
            }
            _ => panic!("expected qci breathe"),
        }
    }

    #[test]
    fn test_parse_negative_coherence() {
        let cli = Cli::try_parse_from(["mcb", "qci", "register", "x", "--coherence", "-0.3"]).unwrap();
        match cli.command {
            Commands::Qci {
                action: QciAction::Register { coherence, .. },
            } => assert_eq!(coherence, Some(-0.3)),
            _ => panic!("expected qci register"),
        }
    }
}
