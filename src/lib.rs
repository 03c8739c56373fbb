/*!
 *  Galileo Network Analytics (GNA) Toolkit
 *
 *  Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 *  All Rights Reserved.
 *  See license information in LICENSE.
 */

pub mod utils {
    pub mod duckdb;
    pub mod filename;
}

pub mod model {
    pub mod binning;
    pub mod derived;
    pub mod record;
    pub mod table;
}

pub mod pipeline {
    use crate::model::derived::RatioPolicy;
    use dotenv::dotenv;
    use std::collections::HashMap;
    use std::env;
    use std::path::PathBuf;
    use thiserror::Error;
    use tracing::info;

    pub mod aggregate;
    pub mod anomaly;
    pub mod dataset;
    pub mod export;
    pub mod load;
    pub mod recommend;
    pub mod report;
    pub mod selection;

    pub const INPUT_ENV: &str = "GNAT_FIREWALL_INPUT";
    pub const DEFAULT_SAMPLE_SIZE: usize = 5000;
    pub const DEFAULT_PREVIEW_ROWS: usize = 10;

    #[derive(Debug, Error)]
    pub enum DashboardError {
        #[error("failed to read {path}: {source}")]
        Io {
            path: PathBuf,
            source: std::io::Error,
        },
        #[error("I/O error: {0}")]
        Output(#[from] std::io::Error),
        #[error("CSV error: {0}")]
        Csv(#[from] csv::Error),
        #[error("missing required column '{0}'")]
        MissingColumn(String),
        #[error("failed to build the log table: {0}")]
        Materialize(duckdb::Error),
        #[error("DuckDB error: {0}")]
        DuckDb(#[from] duckdb::Error),
        #[error("JSON error: {0}")]
        Json(#[from] serde_json::Error),
        #[error("invalid selection: {0}")]
        Selection(String),
        #[error("invalid option: {0}")]
        Config(String),
    }

    impl DashboardError {
        /// Failures that stop the whole session before any view is built.
        pub fn is_load_failure(&self) -> bool {
            matches!(
                self,
                DashboardError::Io { .. }
                    | DashboardError::Csv(_)
                    | DashboardError::MissingColumn(_)
                    | DashboardError::Materialize(_)
            )
        }
    }

    /// Settings taken from `--options "key=value;key=value"`.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ReportOptions {
        pub ratio_policy: RatioPolicy,
        pub sample_size: usize,
        pub seed: Option<u64>,
        pub preview_rows: usize,
        pub memory_gig: u32,
    }

    impl Default for ReportOptions {
        fn default() -> Self {
            ReportOptions {
                ratio_policy: RatioPolicy::Substitute,
                sample_size: DEFAULT_SAMPLE_SIZE,
                seed: None,
                preview_rows: DEFAULT_PREVIEW_ROWS,
                memory_gig: crate::utils::duckdb::DEFAULT_MEMORY_GIG,
            }
        }
    }

    fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, DashboardError> {
        value
            .parse::<T>()
            .map_err(|_| DashboardError::Config(format!("{}={}", key, value)))
    }

    impl ReportOptions {
        pub fn parse(command: &str, options_string: &str) -> Result<Self, DashboardError> {
            let options = parse_options(options_string)?;
            let mut report_options = ReportOptions::default();
            for (key, value) in &options {
                if !value.is_empty() {
                    info!("{}: [{}={}]", command, key, value);
                }
                match *key {
                    "ratio" => {
                        report_options.ratio_policy = value
                            .parse::<RatioPolicy>()
                            .map_err(|e| DashboardError::Config(e.to_string()))?
                    }
                    "sample" => report_options.sample_size = parse_value(key, value)?,
                    "seed" => report_options.seed = Some(parse_value(key, value)?),
                    "head" => report_options.preview_rows = parse_value(key, value)?,
                    "memory" => report_options.memory_gig = parse_value(key, value)?,
                    _ => return Err(DashboardError::Config(format!("unknown option {}", key))),
                }
            }
            if report_options.memory_gig == 0 {
                return Err(DashboardError::Config("memory must be at least 1GB".to_string()));
            }
            Ok(report_options)
        }
    }

    pub fn parse_options(options_string: &str) -> Result<HashMap<&str, &str>, DashboardError> {
        let mut options: HashMap<&str, &str> = HashMap::new();
        for pair in options_string.split(';').filter(|s| !s.trim().is_empty()) {
            match pair.split_once('=') {
                Some((key, value)) => {
                    options.insert(key.trim(), value.trim());
                }
                None => {
                    return Err(DashboardError::Config(format!("missing '=' in option {}", pair)))
                }
            }
        }
        Ok(options)
    }

    pub fn load_environment() {
        dotenv().ok();
    }

    /// Input path from the command line, else from `GNAT_FIREWALL_INPUT`.
    pub fn resolve_input(input: Option<&str>) -> Result<PathBuf, DashboardError> {
        if let Some(input) = input {
            return Ok(PathBuf::from(input));
        }
        load_environment();
        match env::var(INPUT_ENV) {
            Ok(value) if !value.is_empty() => Ok(PathBuf::from(value)),
            _ => Err(DashboardError::Config(format!(
                "no input given: use --input or set {}",
                INPUT_ENV
            ))),
        }
    }

    pub use dataset::{Dataset, Session};

    pub trait DatasetProcessor {
        fn get_command(&self) -> &String;
        fn get_input(&self) -> &PathBuf;
        fn get_options(&self) -> &ReportOptions;
        fn process(&mut self, dataset: &Dataset) -> Result<(), DashboardError>;

        /// Load the input once and hand the augmented table to `process`.
        fn run(&mut self) -> Result<(), DashboardError> {
            let command = self.get_command().clone();
            let input = self.get_input().clone();
            info!("{}: input: {:?}", command, input);

            let mut session = Session::new(&input, self.get_options().clone());
            let dataset = session.dataset()?;
            info!("{}: loaded {} rows", command, dataset.len());

            self.process(dataset)?;
            info!("{}: done.", command);
            Ok(())
        }
    }

}
