/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use crate::pipeline::anomaly::{anomaly_rows, AnomalyKind};
use crate::pipeline::dataset::Dataset;
use crate::pipeline::{DashboardError, DatasetProcessor, ReportOptions};
use crate::utils::filename::generate_output_path;
use serde_jsonlines::write_json_lines;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const EXPORT_SUFFIX: &str = "jsonl";

pub struct AnomalyProcessor {
    pub command: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub kinds: Vec<AnomalyKind>,
    pub options: ReportOptions,
    pub exported: Vec<PathBuf>,
}

impl AnomalyProcessor {
    pub fn new(
        command: &str,
        input: &Path,
        output: &str,
        options_string: &str,
    ) -> Result<Self, DashboardError> {
        let options = ReportOptions::parse(command, options_string)?;

        // Validate the output directory
        let output_path = Path::new(output);
        if !output_path.is_dir() {
            return Err(DashboardError::Config(format!(
                "output directory {} does not exist",
                output
            )));
        }

        Ok(Self {
            command: command.to_string(),
            input: input.to_path_buf(),
            output: output_path.to_path_buf(),
            kinds: AnomalyKind::ALL.to_vec(),
            options,
            exported: Vec::new(),
        })
    }
}

impl DatasetProcessor for AnomalyProcessor {
    fn get_command(&self) -> &String {
        &self.command
    }
    fn get_input(&self) -> &PathBuf {
        &self.input
    }
    fn get_options(&self) -> &ReportOptions {
        &self.options
    }

    /// One JSON-lines file per anomaly kind, empty kinds included.
    fn process(&mut self, dataset: &Dataset) -> Result<(), DashboardError> {
        for kind in &self.kinds {
            let rows = anomaly_rows(dataset, *kind)?;
            if rows.is_empty() {
                warn!("{}: no rows match {}", self.command, kind.description());
            }
            let output_file =
                generate_output_path(&self.output, &self.command, kind.name(), EXPORT_SUFFIX);
            write_json_lines(&output_file, &rows)?;
            info!(
                "{}: exported {} {} rows to {:?}",
                self.command,
                rows.len(),
                kind.name(),
                output_file
            );
            self.exported.push(output_file);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
