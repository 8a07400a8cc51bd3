//! CLI command definitions and handlers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use grapheda_core::{ConnectionConfig, EngineConfig};
use grapheda_graph::GraphEda;

pub mod analysis;

/// GraphEDA - exploratory analysis of a Neo4j graph
#[derive(Parser)]
#[command(name = "grapheda")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine settings (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Database credentials; each falls back to its environment variable.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Neo4j URI, e.g. bolt://localhost:7687
    #[arg(long, env = "NEO4J_URI", global = true)]
    pub uri: Option<String>,

    /// Neo4j user name
    #[arg(long, env = "NEO4J_USERNAME", global = true)]
    pub username: Option<String>,

    /// Neo4j password
    #[arg(long, env = "NEO4J_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Database name (server default if omitted)
    #[arg(long, env = "NEO4J_DATABASE", global = true)]
    pub database: Option<String>,
}

impl ConnectionArgs {
    pub fn to_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            uri: self.uri.clone().unwrap_or_default(),
            username: self.username.clone().unwrap_or_default(),
            password: self.password.clone().unwrap_or_default(),
            database: self.database.clone().filter(|db| !db.trim().is_empty()),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List available analyses
    Catalog {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run an analysis
    Run(analysis::RunArgs),

    /// Show headline counts of the graph
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Confirm the database is reachable
    Ping,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let engine_config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };
        let eda = GraphEda::neo4j(engine_config);

        if let Commands::Catalog { json } = self.command {
            return analysis::cmd_catalog(&eda, json);
        }

        eda.connect(&self.connection.to_config())
            .await
            .context("Failed to connect to Neo4j")?;

        let outcome = match self.command {
            Commands::Run(args) => analysis::cmd_run(&eda, args).await,
            Commands::Summary { json } => analysis::cmd_summary(&eda, json).await,
            Commands::Ping => analysis::cmd_ping(&eda).await,
            Commands::Catalog { .. } => Ok(()),
        };

        eda.close().await;
        outcome
    }
}
