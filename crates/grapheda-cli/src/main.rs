//! GraphEDA CLI - exploratory analysis of a Neo4j graph.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::Cli;

/// Initialize tracing on stderr so stdout carries only results.
///
/// The driver is held at `warn` unless `RUST_LOG` says otherwise.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "grapheda=debug,grapheda_graph=debug,neo4rs=warn"
    } else {
        "grapheda=info,grapheda_graph=info,neo4rs=warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    cli.execute().await
}
