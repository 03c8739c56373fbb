/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use crate::model::record::{LogRecord, RawLogRecord, REQUIRED_FIELDS};
use crate::pipeline::DashboardError;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Read a firewall log. Cells that do not parse become missing values;
/// structural problems (ragged rows, missing columns, I/O) abort the load.
pub fn read_log<R: Read>(reader: R) -> Result<Vec<LogRecord>, DashboardError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for field in REQUIRED_FIELDS {
        if !headers.iter().any(|header| header == *field) {
            return Err(DashboardError::MissingColumn(field.to_string()));
        }
    }

    let mut records = Vec::new();
    for result in csv_reader.deserialize::<RawLogRecord>() {
        let raw = result?;
        records.push(LogRecord::from(raw));
    }
    debug!("read {} log records", records.len());
    Ok(records)
}

pub fn load_log(path: &Path) -> Result<Vec<LogRecord>, DashboardError> {
    let file = File::open(path).map_err(|source| DashboardError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_log(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::Action;

    const HEADER: &str = "Source Port,Destination Port,NAT Source Port,NAT Destination Port,Action,Bytes,Bytes Sent,Bytes Received,Packets,Elapsed Time (sec),pkts_sent,pkts_received";

    #[test]
    fn test_read_log() {
        let data = format!(
            "{}\n57222,53,54587,53,allow,177,94,83,2,30,1,1\n56258,3389,56258,3389,deny,4768,1600,3168,19,17,10,9\n",
            HEADER
        );
        let records = read_log(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].destination_port, Some(53));
        assert_eq!(records[0].action, Action::Allow);
        assert_eq!(records[1].bytes, Some(4768.0));
        assert_eq!(records[1].elapsed_time, Some(17.0));
        assert_eq!(records[1].pkts_received, Some(9.0));
    }

    #[test]
    fn test_bad_cells_become_missing() {
        let data = format!("{}\n1,80,0,0,allow,abc,,10,x,5,1,1\n", HEADER);
        let records = read_log(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].bytes, None);
        assert_eq!(records[0].bytes_sent, None);
        assert_eq!(records[0].bytes_received, Some(10.0));
        assert_eq!(records[0].packets, None);
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let data = "Action,Destination Port,Bytes,Bytes Sent,Bytes Received,Packets,Elapsed Time (sec)\ndrop,445,60,60,0,1,0\n";
        let records = read_log(data.as_bytes()).unwrap();
        assert_eq!(records[0].source_port, None);
        assert_eq!(records[0].pkts_sent, None);
        assert_eq!(records[0].action, Action::Drop);
    }

    #[test]
    fn test_missing_required_column() {
        let data = "Action,Destination Port,Bytes\nallow,80,10\n";
        match read_log(data.as_bytes()) {
            Err(DashboardError::MissingColumn(column)) => assert_eq!(column, "Bytes Sent"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_ragged_row_fails_load() {
        let data = format!("{}\n1,80,0,0,allow,1\n", HEADER);
        let result = read_log(data.as_bytes());
        assert!(matches!(result, Err(DashboardError::Csv(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = load_log(Path::new("/nonexistent/gnat/log2.csv"));
        assert!(matches!(result, Err(DashboardError::Io { .. })));
        assert!(result.unwrap_err().is_load_failure());
    }
}
