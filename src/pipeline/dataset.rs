/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use crate::model::derived::{derive_all, AugmentedRecord};
use crate::model::record::LogRecord;
use crate::model::table::{LOG_ROW_COUNT, LOG_TABLE};
use crate::pipeline::load::load_log;
use crate::pipeline::{DashboardError, ReportOptions};
use crate::utils::duckdb::duckdb_open_memory;
use duckdb::{params, Appender, Connection};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The augmented log: every row with its derived columns, mirrored into an
/// in-memory DuckDB `log` table. Read-only once built.
pub struct Dataset {
    rows: Vec<AugmentedRecord>,
    conn: Connection,
    options: ReportOptions,
}

impl Dataset {
    pub fn from_records(
        records: Vec<LogRecord>,
        options: &ReportOptions,
    ) -> Result<Dataset, DashboardError> {
        let rows = derive_all(&records, options.ratio_policy);
        let mut conn =
            duckdb_open_memory(options.memory_gig).map_err(DashboardError::Materialize)?;
        materialize(&mut conn, &rows).map_err(DashboardError::Materialize)?;
        Ok(Dataset {
            rows,
            conn,
            options: options.clone(),
        })
    }

    pub fn load(path: &Path, options: &ReportOptions) -> Result<Dataset, DashboardError> {
        let records = load_log(path)?;
        Dataset::from_records(records, options)
    }

    pub fn rows(&self) -> &[AugmentedRecord] {
        &self.rows
    }

    pub fn row(&self, row_id: usize) -> Option<&AugmentedRecord> {
        self.rows.get(row_id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run a query returning `row_id`s and resolve them to rows, in query order.
    pub fn select_rows(&self, sql_command: &str) -> Result<Vec<&AugmentedRecord>, DashboardError> {
        let mut stmt = self.conn.prepare(sql_command)?;
        let id_iter = stmt.query_map([], |row| row.get::<_, i64>(0))?;

        let mut rows = Vec::new();
        for row_id in id_iter {
            let row_id = row_id?;
            if let Some(row) = usize::try_from(row_id).ok().and_then(|id| self.rows.get(id)) {
                rows.push(row);
            }
        }
        Ok(rows)
    }
}

fn append_rows(appender: &mut Appender, rows: &[AugmentedRecord]) -> Result<(), duckdb::Error> {
    for row in rows {
        let record = &row.record;
        let metrics = &row.metrics;
        appender.append_row(params![
            row.row_id as i64,
            record.source_port,
            record.destination_port,
            record.nat_source_port,
            record.nat_destination_port,
            record.action.as_str(),
            record.bytes,
            record.bytes_sent,
            record.bytes_received,
            record.packets,
            record.elapsed_time,
            record.pkts_sent,
            record.pkts_received,
            metrics.bytes_per_packet,
            metrics.sent_received_ratio,
            metrics.is_incoming,
            metrics.time_category.map(|category| category.index() as i32),
            metrics.bytes_per_packet_cat.map(|category| category.index() as i32),
        ])?;
    }
    Ok(())
}

fn materialize(conn: &mut Connection, rows: &[AugmentedRecord]) -> Result<(), duckdb::Error> {
    conn.execute_batch(LOG_TABLE)?;

    let tx = conn.transaction()?;
    {
        let mut appender = tx.appender("log")?;
        append_rows(&mut appender, rows)?;
        appender.flush()?;
    }
    tx.commit()?;

    let count: i64 = conn.query_row(LOG_ROW_COUNT, [], |row| row.get(0))?;
    debug!("materialized {} rows into log table", count);
    Ok(())
}

/// Owns the lifecycle of one input's dataset: loaded on first use, kept
/// until `reload` or `invalidate`, never mutated in between.
pub struct Session {
    input: PathBuf,
    options: ReportOptions,
    dataset: Option<Dataset>,
    loads: usize,
}

impl Session {
    pub fn new(input: &Path, options: ReportOptions) -> Session {
        Session {
            input: input.to_path_buf(),
            options,
            dataset: None,
            loads: 0,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    /// Number of times the input has been read in this session.
    pub fn load_count(&self) -> usize {
        self.loads
    }

    pub fn dataset(&mut self) -> Result<&Dataset, DashboardError> {
        let dataset = match self.dataset.take() {
            Some(dataset) => dataset,
            None => {
                let dataset = Dataset::load(&self.input, &self.options)?;
                self.loads += 1;
                info!("loaded {} rows from {:?}", dataset.len(), self.input);
                dataset
            }
        };
        Ok(self.dataset.insert(dataset))
    }

    pub fn invalidate(&mut self) {
        self.dataset = None;
    }

    pub fn reload(&mut self) -> Result<&Dataset, DashboardError> {
        self.invalidate();
        self.dataset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::Action;
    use std::fs;

    fn record(port: i64, action: Action, bytes: f64, packets: f64) -> LogRecord {
        LogRecord {
            source_address: None,
            destination_address: None,
            source_port: Some(40000),
            destination_port: Some(port),
            nat_source_port: None,
            nat_destination_port: None,
            action,
            bytes: Some(bytes),
            bytes_sent: Some(bytes / 2.0),
            bytes_received: Some(bytes / 2.0),
            packets: Some(packets),
            elapsed_time: Some(1.0),
            pkts_sent: None,
            pkts_received: None,
        }
    }

    #[test]
    fn test_from_records_materializes_table() {
        let records = vec![
            record(80, Action::Allow, 100.0, 1.0),
            record(443, Action::Deny, 200.0, 0.0),
        ];
        let dataset = Dataset::from_records(records, &ReportOptions::default()).unwrap();
        assert_eq!(dataset.len(), 2);
        let count: i64 = dataset
            .connection()
            .query_row(LOG_ROW_COUNT, [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);

        let missing: i64 = dataset
            .connection()
            .query_row("SELECT count(*) FROM log WHERE bytes_per_packet IS NULL", [], |row| row.get(0))
            .unwrap();
        assert_eq!(missing, 1);
    }

    #[test]
    fn test_select_rows_in_query_order() {
        let records = vec![
            record(80, Action::Allow, 100.0, 1.0),
            record(443, Action::Deny, 200.0, 1.0),
            record(22, Action::Drop, 300.0, 1.0),
        ];
        let dataset = Dataset::from_records(records, &ReportOptions::default()).unwrap();
        let rows = dataset
            .select_rows("SELECT row_id FROM log WHERE bytes > 150 ORDER BY row_id DESC")
            .unwrap();
        let ports: Vec<Option<i64>> = rows.iter().map(|row| row.record.destination_port).collect();
        assert_eq!(ports, vec![Some(22), Some(443)]);
    }

    #[test]
    fn test_query_error_after_load_is_not_a_load_failure() {
        let dataset =
            Dataset::from_records(vec![record(80, Action::Allow, 100.0, 1.0)], &ReportOptions::default())
                .unwrap();
        let query_error = dataset
            .connection()
            .query_row("SELECT no_such_column FROM log", [], |row| row.get::<_, i64>(0))
            .unwrap_err();
        assert!(!DashboardError::from(query_error).is_load_failure());

        let build_error = dataset
            .connection()
            .execute_batch("INSERT INTO log (row_id) VALUES (NULL)")
            .unwrap_err();
        assert!(DashboardError::Materialize(build_error).is_load_failure());
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::from_records(Vec::new(), &ReportOptions::default()).unwrap();
        assert!(dataset.is_empty());
        assert!(dataset.row(0).is_none());
    }

    #[test]
    fn test_session_loads_once_and_reloads() {
        let path = std::env::temp_dir().join(format!("gnat-session-{}.csv", std::process::id()));
        fs::write(
            &path,
            "Action,Destination Port,Bytes,Bytes Sent,Bytes Received,Packets,Elapsed Time (sec)\nallow,80,100,50,50,2,3\n",
        )
        .unwrap();

        let mut session = Session::new(&path, ReportOptions::default());
        assert!(!session.is_loaded());
        assert_eq!(session.dataset().unwrap().len(), 1);
        assert_eq!(session.dataset().unwrap().len(), 1);
        assert_eq!(session.load_count(), 1);

        fs::write(
            &path,
            "Action,Destination Port,Bytes,Bytes Sent,Bytes Received,Packets,Elapsed Time (sec)\nallow,80,100,50,50,2,3\ndeny,22,60,60,0,1,0\n",
        )
        .unwrap();
        // cached until an explicit reload
        assert_eq!(session.dataset().unwrap().len(), 1);
        assert_eq!(session.reload().unwrap().len(), 2);
        assert_eq!(session.load_count(), 2);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_session_load_failure() {
        let mut session = Session::new(Path::new("/nonexistent/gnat.csv"), ReportOptions::default());
        assert!(session.dataset().is_err());
        assert!(!session.is_loaded());
    }
}
