/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use crate::model::table::*;
use crate::pipeline::aggregate::*;
use crate::pipeline::anomaly::{anomaly_summaries, AnomalySummary};
use crate::pipeline::dataset::Dataset;
use crate::pipeline::recommend::{recommendations, Recommendations};
use crate::pipeline::selection::ViewSelection;
use crate::pipeline::{DashboardError, DatasetProcessor, ReportOptions};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

const BAR_WIDTH: usize = 40;
const BAR_CHAR: &str = "#";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionTab {
    pub counts: Vec<ActionCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortTab {
    pub top_n: usize,
    pub top_ports: Vec<PortCount>,
    pub selected_ports: Vec<i64>,
    pub port_actions: Vec<PortActionCount>,
    pub port_stats: Vec<PortStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalTab {
    pub time_categories: Vec<TimeCategoryStats>,
    pub time_actions: Vec<TimeActionCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationTab {
    pub matrix: CorrelationMatrix,
    pub x_axis: NumericColumn,
    pub y_axis: NumericColumn,
    pub sample: Vec<ScatterPoint>,
    pub packet_sizes: Vec<PacketSizeCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub generated_at: String,
    pub input: String,
    pub overview: Overview,
    pub actions: ActionTab,
    pub ports: PortTab,
    pub temporal: TemporalTab,
    pub correlations: CorrelationTab,
    pub anomalies: Vec<AnomalySummary>,
    pub recommendations: Recommendations,
}

/// Compute every view of the dashboard for one selection.
pub fn build_report(
    dataset: &Dataset,
    selection: &ViewSelection,
    input: &Path,
) -> Result<Report, DashboardError> {
    let options = dataset.options();
    let top_ports = top_ports(dataset, selection.top_n)?;
    let selected_ports = selection.resolve_ports(&top_ports)?;

    let ports = PortTab {
        top_n: selection.top_n,
        port_actions: port_action_counts(dataset, &selected_ports)?,
        port_stats: port_stats(dataset, &selected_ports)?,
        top_ports,
        selected_ports,
    };
    let correlations = CorrelationTab {
        matrix: correlation_matrix(dataset, &NumericColumn::ALL)?,
        x_axis: selection.x_axis,
        y_axis: selection.y_axis,
        sample: scatter_sample(
            dataset,
            selection.x_axis,
            selection.y_axis,
            options.sample_size,
            options.seed,
        )?,
        packet_sizes: packet_size_distribution(dataset)?,
    };

    let current_utc: DateTime<Utc> = Utc::now();
    Ok(Report {
        generated_at: current_utc.to_rfc3339(),
        input: input.display().to_string(),
        overview: overview(dataset)?,
        actions: ActionTab {
            counts: action_counts(dataset)?,
        },
        ports,
        temporal: TemporalTab {
            time_categories: time_category_stats(dataset)?,
            time_actions: time_action_counts(dataset)?,
        },
        correlations,
        anomalies: anomaly_summaries(dataset, options.preview_rows)?,
        recommendations: recommendations(dataset)?,
    })
}

fn optional(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(value) => format!("{:.*}", precision, value),
        None => "-".to_string(),
    }
}

fn bar(count: u64, max: u64) -> String {
    if max == 0 {
        return String::new();
    }
    let width = ((count as f64 / max as f64) * BAR_WIDTH as f64).round() as usize;
    BAR_CHAR.repeat(width)
}

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "-".repeat(title.len()))
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Firewall log analysis: {}", self.input)?;
        writeln!(f, "generated {}", self.generated_at)?;
        writeln!(f, "  connections:     {}", self.overview.connections)?;
        writeln!(f, "  total traffic:   {:.2} MB", self.overview.bytes_total_mb)?;
        writeln!(f, "  allow rate:      {} %", optional(self.overview.allow_rate, 1))?;

        section(f, "Action Distribution")?;
        let max = self.actions.counts.iter().map(|entry| entry.count).max().unwrap_or(0);
        for entry in &self.actions.counts {
            writeln!(
                f,
                "  {:<12} {:>10} {}",
                entry.action.to_string(),
                entry.count,
                bar(entry.count, max)
            )?;
        }

        section(f, &format!("Port Analysis (top {})", self.ports.top_n))?;
        let max = self.ports.top_ports.first().map(|entry| entry.count).unwrap_or(0);
        for entry in &self.ports.top_ports {
            writeln!(f, "  {:>5} {:>10} {}", entry.port, entry.count, bar(entry.count, max))?;
        }
        writeln!(f, "  selected ports: {:?}", self.ports.selected_ports)?;
        for entry in &self.ports.port_actions {
            writeln!(f, "  {:>5} {:<12} {:>10}", entry.port, entry.action.to_string(), entry.count)?;
        }
        writeln!(
            f,
            "  {:>5} {:>14} {:>12} {:>12} {:>12} {:>12}",
            "port", "bytes mean", "total MB", "pkts mean", "pkts total", "elapsed"
        )?;
        for stats in &self.ports.port_stats {
            writeln!(
                f,
                "  {:>5} {:>14} {:>12} {:>12} {:>12} {:>12}",
                stats.port,
                optional(stats.bytes_mean, 1),
                optional(stats.bytes_total_mb, 2),
                optional(stats.packets_mean, 1),
                optional(stats.packets_total, 0),
                optional(stats.elapsed_mean, 1)
            )?;
        }

        section(f, "Temporal Analysis")?;
        let max = self
            .temporal
            .time_categories
            .iter()
            .map(|entry| entry.count)
            .max()
            .unwrap_or(0);
        for entry in &self.temporal.time_categories {
            writeln!(
                f,
                "  {:<8} {:>10} {:>10} KB {}",
                entry.category.label(),
                entry.count,
                optional(entry.bytes_mean_kb, 2),
                bar(entry.count, max)
            )?;
        }
        for entry in &self.temporal.time_actions {
            writeln!(
                f,
                "  {:<8} {:<12} {:>10}",
                entry.category.label(),
                entry.action.to_string(),
                entry.count
            )?;
        }

        section(f, "Correlations")?;
        write!(f, "  {:>15}", "")?;
        for column in &self.correlations.matrix.columns {
            write!(f, " {:>15}", column.column())?;
        }
        writeln!(f)?;
        for (column, values) in self
            .correlations
            .matrix
            .columns
            .iter()
            .zip(&self.correlations.matrix.values)
        {
            write!(f, "  {:>15}", column.column())?;
            for value in values {
                write!(f, " {:>15}", optional(*value, 3))?;
            }
            writeln!(f)?;
        }
        writeln!(
            f,
            "  scatter {} vs {}: {} sampled points",
            self.correlations.y_axis,
            self.correlations.x_axis,
            self.correlations.sample.len()
        )?;
        let max = self
            .correlations
            .packet_sizes
            .iter()
            .map(|entry| entry.count)
            .max()
            .unwrap_or(0);
        for entry in &self.correlations.packet_sizes {
            writeln!(
                f,
                "  {:<20} {:>10} {}",
                entry.category.label(),
                entry.count,
                bar(entry.count, max)
            )?;
        }

        section(f, "Anomalies")?;
        for summary in &self.anomalies {
            writeln!(f, "  {}: {}", summary.description, summary.count)?;
            for row in &summary.preview {
                writeln!(
                    f,
                    "    #{:<8} port {:>5} {:<12} bytes {:>12} packets {:>8} elapsed {:>8}",
                    row.row_id,
                    row.record
                        .destination_port
                        .map(|port| port.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    row.record.action.to_string(),
                    optional(row.record.bytes, 0),
                    optional(row.record.packets, 0),
                    optional(row.record.elapsed_time, 0)
                )?;
            }
        }

        section(f, "Recommendations")?;
        writeln!(f, "  most blocked ports:")?;
        for entry in &self.recommendations.blocked_ports {
            writeln!(f, "    {:>5} {:>10}", entry.port, entry.count)?;
        }
        writeln!(f, "  {}", self.recommendations.allow)?;
        writeln!(f, "  {}", self.recommendations.smb)?;
        for line in &self.recommendations.guidance {
            writeln!(f, "  * {}", line)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = DashboardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            _ => Err(DashboardError::Config(format!("unknown format {}", value))),
        }
    }
}

pub fn render(report: &Report, format: ReportFormat) -> Result<String, DashboardError> {
    match format {
        ReportFormat::Text => Ok(report.to_string()),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

pub struct ReportProcessor {
    pub command: String,
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub format: ReportFormat,
    pub selection: ViewSelection,
    pub options: ReportOptions,
}

impl ReportProcessor {
    pub fn new(
        command: &str,
        input: &Path,
        output: Option<&str>,
        format: &str,
        selection: ViewSelection,
        options_string: &str,
    ) -> Result<Self, DashboardError> {
        let options = ReportOptions::parse(command, options_string)?;
        Ok(Self {
            command: command.to_string(),
            input: input.to_path_buf(),
            output: output.map(PathBuf::from),
            format: format.parse::<ReportFormat>()?,
            selection,
            options,
        })
    }
}

impl DatasetProcessor for ReportProcessor {
    fn get_command(&self) -> &String {
        &self.command
    }
    fn get_input(&self) -> &PathBuf {
        &self.input
    }
    fn get_options(&self) -> &ReportOptions {
        &self.options
    }

    fn process(&mut self, dataset: &Dataset) -> Result<(), DashboardError> {
        let report = build_report(dataset, &self.selection, &self.input)?;
        let rendered = render(&report, self.format)?;
        match &self.output {
            Some(output) => {
                fs::write(output, rendered)?;
                info!("{}: wrote {:?}", self.command, output);
            }
            None => print!("{}", rendered),
        }
        Ok(())
    }
}
