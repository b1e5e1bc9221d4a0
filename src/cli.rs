//! Command-line interface (SPEC_FULL.md §10.4)
//!
//! Trimmed from the teacher's flat flag set down to the gateway's actual
//! surface: a `run` subcommand for normal operation, `discover` to bind
//! on-disk provider manifests into the registry and report what was found,
//! and a hidden `completions` subcommand for shell completion scripts.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

/// Universal MCP Gateway — aggregates multiple MCP providers behind one
/// stdio endpoint.
#[derive(Parser, Debug)]
#[command(name = "mcp-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long, global = true, env = "MCP_GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "MCP_GATEWAY_LOG_LEVEL")]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long, global = true, env = "MCP_GATEWAY_LOG_FORMAT")]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Gateway subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the gateway and serve MCP over stdio (the default).
    Run,

    /// Walk a directory of `provider.toml` manifests and report what the
    /// registry would bind, without starting the gateway.
    Discover {
        /// Directory to walk for provider manifests.
        #[arg(long)]
        dir: PathBuf,
    },

    /// Generate a shell completion script and print it to stdout.
    #[command(hide = true)]
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

/// Print a completion script for `shell` to stdout.
pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_as_default_subcommand() {
        let cli = Cli::parse_from(["mcp-gateway", "run"]);
        assert!(matches!(cli.command, Some(Command::Run)));
    }

    #[test]
    fn parses_discover_with_dir() {
        let cli = Cli::parse_from(["mcp-gateway", "discover", "--dir", "/tmp/providers"]);
        match cli.command {
            Some(Command::Discover { dir }) => assert_eq!(dir, PathBuf::from("/tmp/providers")),
            other => panic!("expected Discover, got {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_defaults_to_none() {
        let cli = Cli::parse_from(["mcp-gateway", "--log-level", "debug"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "debug");
    }
}
