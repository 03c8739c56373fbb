/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use anyhow::Context;
use clap::Parser;
use gnat_firewall::model::table::NumericColumn;
use gnat_firewall::pipeline::report::ReportProcessor;
use gnat_firewall::pipeline::selection::{parse_port_list, ViewSelection, DEFAULT_TOP_N};
use gnat_firewall::pipeline::{resolve_input, DashboardError, DatasetProcessor, INPUT_ENV};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// Firewall log CSV; falls back to GNAT_FIREWALL_INPUT
    #[arg(long)]
    input: Option<String>,

    /// Write the report here instead of stdout
    #[arg(long)]
    output: Option<String>,

    #[arg(long)]
    options: Option<String>,

    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top_n: usize,

    /// Comma separated destination ports from the top-N
    #[arg(long)]
    ports: Option<String>,

    #[arg(long, default_value = "Packets")]
    x_axis: NumericColumn,

    #[arg(long, default_value = "Bytes")]
    y_axis: NumericColumn,

    /// text or json
    #[arg(long, default_value = "text")]
    format: String,
}

fn run(args: &Args) -> anyhow::Result<()> {
    let input = resolve_input(args.input.as_deref())?;
    let ports = args.ports.as_deref().map(parse_port_list).transpose()?;
    let selection = ViewSelection::new(args.top_n, ports, args.x_axis, args.y_axis)?;

    let mut report_processor = ReportProcessor::new(
        "report",
        &input,
        args.output.as_deref(),
        &args.format,
        selection,
        &args.options.clone().unwrap_or_default(),
    )?;

    report_processor
        .run()
        .with_context(|| format!("report on {}", input.display()))?;
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
        eprintln!("report: {:#}", err);
        match err.downcast_ref::<DashboardError>() {
            Some(dashboard_err) if dashboard_err.is_load_failure() => {
                eprintln!(
                    "report: check that the file exists and has the firewall log header (use --input or {})",
                    INPUT_ENV
                );
                std::process::exit(exitcode::IOERR);
            }
            Some(DashboardError::Output(_)) => std::process::exit(exitcode::CANTCREAT),
            _ => std::process::exit(exitcode::CONFIG),
        }
    }
}
