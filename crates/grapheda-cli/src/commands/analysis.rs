//! Analysis commands.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use grapheda_core::params::parse_assignment;
use grapheda_core::ParamValue;
use grapheda_graph::{GraphEda, RunOptions};

use crate::output;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Analysis name (see `grapheda catalog`)
    pub name: String,

    /// Query parameter as key=value; repeatable
    #[arg(short, long = "param", value_parser = parse_assignment)]
    pub params: Vec<(String, ParamValue)>,

    /// Ignore any cached result
    #[arg(long)]
    pub refresh: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Query timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// List analyses.
pub fn cmd_catalog(eda: &GraphEda, json: bool) -> Result<()> {
    let entries = eda.catalog();
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        output::print_catalog(&entries);
    }
    Ok(())
}

/// Run one analysis and print its rows.
pub async fn cmd_run(eda: &GraphEda, args: RunArgs) -> Result<()> {
    let mut options = RunOptions::new()
        .refresh(args.refresh)
        .table(!args.json)
        .params(args.params.into_iter().collect());
    if let Some(secs) = args.timeout {
        options = options.timeout(Duration::from_secs(secs));
    }

    let outcome = eda.run(&args.name, &options).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&*outcome.result)?);
        return Ok(());
    }

    println!(
        "{} {}",
        outcome.result.analysis_name.cyan().bold(),
        format!("({})", outcome.result.computed_at.format("%Y-%m-%d %H:%M:%S UTC")).dimmed()
    );
    println!();
    match &outcome.table {
        Some(table) => output::print_table(table),
        None => println!("{}", "No results.".dimmed()),
    }
    Ok(())
}

/// Print headline counts.
pub async fn cmd_summary(eda: &GraphEda, json: bool) -> Result<()> {
    let summary = eda.summary().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        output::print_summary(&summary);
    }
    Ok(())
}

pub async fn cmd_ping(eda: &GraphEda) -> Result<()> {
    eda.ping().await?;
    println!("{}", "Connection to Neo4j confirmed".green());
    Ok(())
}
