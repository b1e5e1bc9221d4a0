//! MCP Gateway — aggregates multiple MCP providers behind one stdio server.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use mcp_gateway::cli::{Cli, Command, print_completions};
use mcp_gateway::config::Config;
use mcp_gateway::gateway::Gateway;
use mcp_gateway::registry::Registry;
use mcp_gateway::setup_tracing;
use mcp_gateway::supervisor::{ProviderConfig, Supervisor};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(Command::Completions { shell }) = cli.command {
        print_completions(shell);
        return ExitCode::SUCCESS;
    }

    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref()) {
        eprintln!("failed to set up logging: {e}");
        return ExitCode::FAILURE;
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            error!("failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let registry = Arc::new(Registry::new());

    if let Some(Command::Discover { dir }) = &cli.command {
        let bound = registry.discover(dir);
        info!(dir = %dir.display(), bound, "provider manifest discovery complete");
        return ExitCode::SUCCESS;
    }

    let provider_configs: Vec<(String, ProviderConfig)> = config
        .enabled_providers
        .iter()
        .map(|name| {
            let fragment = config.provider_config(name);
            let adapter_name = fragment
                .get("adapter")
                .and_then(serde_json::Value::as_str)
                .unwrap_or(name)
                .to_string();
            (
                name.clone(),
                ProviderConfig {
                    adapter_name,
                    config: fragment,
                },
            )
        })
        .collect();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        providers = provider_configs.len(),
        "starting mcp gateway"
    );

    let supervisor = Arc::new(Supervisor::new(registry));
    if let Err(e) = supervisor.start(&provider_configs).await {
        error!("failed to start gateway: {e}");
        return ExitCode::FAILURE;
    }

    let gateway = Gateway::new(supervisor.clone());
    if let Err(e) = gateway.run().await {
        error!("gateway error: {e}");
        return ExitCode::FAILURE;
    }

    supervisor.stop().await;
    info!("gateway shutdown complete");
    ExitCode::SUCCESS
}
