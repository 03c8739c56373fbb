/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use anyhow::Context;
use clap::Parser;
use gnat_firewall::pipeline::export::AnomalyProcessor;
use gnat_firewall::pipeline::{resolve_input, DashboardError, DatasetProcessor, INPUT_ENV};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(long)]
    input: Option<String>,

    /// Existing directory for the JSON-lines files
    #[arg(long)]
    output: String,

    #[arg(long)]
    options: Option<String>,
}

fn run(args: &Args) -> anyhow::Result<()> {
    let input = resolve_input(args.input.as_deref())?;

    let mut anomaly_processor = AnomalyProcessor::new(
        "anomaly",
        &input,
        &args.output,
        &args.options.clone().unwrap_or_default(),
    )?;

    anomaly_processor
        .run()
        .with_context(|| format!("anomaly export of {}", input.display()))?;
    for path in &anomaly_processor.exported {
        println!("{}", path.display());
    }
    Ok(())
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("anomaly: {:#}", err);
        match err.downcast_ref::<DashboardError>() {
            Some(dashboard_err) if dashboard_err.is_load_failure() => {
                eprintln!(
                    "anomaly: check that the file exists and has the firewall log header (use --input or {})",
                    INPUT_ENV
                );
                std::process::exit(exitcode::IOERR);
            }
            Some(DashboardError::Output(_)) => std::process::exit(exitcode::CANTCREAT),
            _ => std::process::exit(exitcode::CONFIG),
        }
    }
}
