/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use crate::model::derived::AugmentedRecord;
use crate::pipeline::dataset::Dataset;
use crate::pipeline::DashboardError;
use serde::Serialize;

pub const LONG_CONNECTION_SEC: f64 = 300.0;
pub const LOW_DATA_BYTES: f64 = 1000.0;
pub const HIGH_BYTES_PER_PACKET: f64 = 10000.0;
pub const LOW_BYTES_PER_PACKET: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Longer than 5 minutes but under 1KB transferred.
    LongLowData,
    /// Average packet size above 10000 or below 10 bytes.
    AbnormalPacketSize,
}

impl AnomalyKind {
    pub const ALL: [AnomalyKind; 2] = [AnomalyKind::LongLowData, AnomalyKind::AbnormalPacketSize];

    pub fn name(self) -> &'static str {
        match self {
            AnomalyKind::LongLowData => "long_low_data",
            AnomalyKind::AbnormalPacketSize => "abnormal_ratio",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AnomalyKind::LongLowData => "long connections (>5min) with little data (<1KB)",
            AnomalyKind::AbnormalPacketSize => "connections with an unusual bytes/packet ratio",
        }
    }

    fn filter(self) -> String {
        match self {
            AnomalyKind::LongLowData => format!(
                "elapsed_sec > {} AND bytes < {}",
                LONG_CONNECTION_SEC, LOW_DATA_BYTES
            ),
            AnomalyKind::AbnormalPacketSize => format!(
                "bytes_per_packet > {} OR bytes_per_packet < {}",
                HIGH_BYTES_PER_PACKET, LOW_BYTES_PER_PACKET
            ),
        }
    }

    /// Row-level form of the SQL filter.
    pub fn matches(self, row: &AugmentedRecord) -> bool {
        match self {
            AnomalyKind::LongLowData => match (row.record.elapsed_time, row.record.bytes) {
                (Some(elapsed), Some(bytes)) => elapsed > LONG_CONNECTION_SEC && bytes < LOW_DATA_BYTES,
                _ => false,
            },
            AnomalyKind::AbnormalPacketSize => match row.metrics.bytes_per_packet {
                Some(ratio) => ratio > HIGH_BYTES_PER_PACKET || ratio < LOW_BYTES_PER_PACKET,
                None => false,
            },
        }
    }
}

/// Every row matching `kind`, in file order.
pub fn anomaly_rows(
    dataset: &Dataset,
    kind: AnomalyKind,
) -> Result<Vec<&AugmentedRecord>, DashboardError> {
    let sql_command = format!(
        "SELECT row_id FROM log WHERE {} ORDER BY row_id;",
        kind.filter()
    );
    dataset.select_rows(&sql_command)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalySummary {
    pub kind: AnomalyKind,
    pub description: &'static str,
    pub count: usize,
    pub preview: Vec<AugmentedRecord>,
}

pub fn anomaly_summary(
    dataset: &Dataset,
    kind: AnomalyKind,
    preview_rows: usize,
) -> Result<AnomalySummary, DashboardError> {
    let rows = anomaly_rows(dataset, kind)?;
    Ok(AnomalySummary {
        kind,
        description: kind.description(),
        count: rows.len(),
        preview: rows.into_iter().take(preview_rows).cloned().collect(),
    })
}

pub fn anomaly_summaries(
    dataset: &Dataset,
    preview_rows: usize,
) -> Result<Vec<AnomalySummary>, DashboardError> {
    AnomalyKind::ALL
        .iter()
        .map(|kind| anomaly_summary(dataset, *kind, preview_rows))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::{Action, LogRecord};
    use crate::pipeline::ReportOptions;

    fn record(elapsed: f64, bytes: f64, packets: f64) -> LogRecord {
        LogRecord {
            source_address: None,
            destination_address: None,
            source_port: None,
            destination_port: Some(80),
            nat_source_port: None,
            nat_destination_port: None,
            action: Action::Allow,
            bytes: Some(bytes),
            bytes_sent: Some(bytes),
            bytes_received: Some(0.0),
            packets: Some(packets),
            elapsed_time: Some(elapsed),
            pkts_sent: None,
            pkts_received: None,
        }
    }

    fn dataset(records: Vec<LogRecord>) -> Dataset {
        Dataset::from_records(records, &ReportOptions::default()).unwrap()
    }

    #[test]
    fn test_long_low_data_is_strict() {
        let dataset = dataset(vec![record(301.0, 999.0, 10.0), record(300.0, 999.0, 10.0)]);
        let rows = anomaly_rows(&dataset, AnomalyKind::LongLowData).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_id, 0);
        assert!(AnomalyKind::LongLowData.matches(&dataset.rows()[0]));
        assert!(!AnomalyKind::LongLowData.matches(&dataset.rows()[1]));
    }

    #[test]
    fn test_long_low_data_byte_bound() {
        let dataset = dataset(vec![record(301.0, 1000.0, 10.0)]);
        assert!(anomaly_rows(&dataset, AnomalyKind::LongLowData).unwrap().is_empty());
    }

    #[test]
    fn test_abnormal_packet_size() {
        let dataset = dataset(vec![
            record(1.0, 20001.0, 2.0), // 10000.5 per packet
            record(1.0, 20000.0, 2.0), // exactly 10000
            record(1.0, 9.0, 1.0),
            record(1.0, 10.0, 1.0),
            record(1.0, 500.0, 0.0), // undefined ratio
        ]);
        let rows = anomaly_rows(&dataset, AnomalyKind::AbnormalPacketSize).unwrap();
        let ids: Vec<usize> = rows.iter().map(|row| row.row_id).collect();
        assert_eq!(ids, vec![0, 2]);
        for row in dataset.rows() {
            assert_eq!(
                AnomalyKind::AbnormalPacketSize.matches(row),
                ids.contains(&row.row_id)
            );
        }
    }

    #[test]
    fn test_undefined_ratio_agrees_with_row_filter() {
        let dataset = dataset(vec![
            record(1.0, f64::INFINITY, f64::INFINITY),
            record(1.0, f64::INFINITY, 2.0),
        ]);
        assert_eq!(dataset.rows()[0].metrics.bytes_per_packet, None);
        let ids: Vec<usize> = anomaly_rows(&dataset, AnomalyKind::AbnormalPacketSize)
            .unwrap()
            .iter()
            .map(|row| row.row_id)
            .collect();
        assert_eq!(ids, vec![1]);
        assert!(!AnomalyKind::AbnormalPacketSize.matches(&dataset.rows()[0]));
        assert!(AnomalyKind::AbnormalPacketSize.matches(&dataset.rows()[1]));
    }

    #[test]
    fn test_summary_preview_is_bounded() {
        let records: Vec<LogRecord> = (0..15).map(|_| record(400.0, 10.0, 1.0)).collect();
        let dataset = dataset(records);
        let summary = anomaly_summary(&dataset, AnomalyKind::LongLowData, 10).unwrap();
        assert_eq!(summary.count, 15);
        assert_eq!(summary.preview.len(), 10);
        assert_eq!(summary.preview[0].row_id, 0);

        let summaries = anomaly_summaries(&dataset, 3).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].kind, AnomalyKind::LongLowData);
        assert_eq!(summaries[0].preview.len(), 3);
    }
}
