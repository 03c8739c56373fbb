/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use crate::model::binning::{PacketSizeCategory, TimeCategory};
use crate::model::record::*;
use serde::{Serialize, Serializer};
use std::fmt;
use std::io::Error;
use std::str::FromStr;

pub static LOG_TABLE: &str = "CREATE OR REPLACE TABLE log
(
    row_id BIGINT NOT NULL,
    sport BIGINT,
    dport BIGINT,
    nat_sport BIGINT,
    nat_dport BIGINT,
    action VARCHAR NOT NULL,
    bytes DOUBLE,
    bytes_sent DOUBLE,
    bytes_received DOUBLE,
    packets DOUBLE,
    elapsed_sec DOUBLE,
    pkts_sent DOUBLE,
    pkts_received DOUBLE,
    bytes_per_packet DOUBLE,
    sent_received_ratio DOUBLE,
    is_incoming BOOLEAN NOT NULL,
    time_category INTEGER,
    bytes_per_packet_cat INTEGER
);";

pub static LOG_ROW_COUNT: &str = "SELECT count(*) FROM log;";

/// Numeric columns offered to the correlation matrix and the scatter axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericColumn {
    Bytes,
    BytesSent,
    BytesReceived,
    Packets,
    ElapsedTime,
    PktsSent,
    PktsReceived,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 7] = [
        NumericColumn::Bytes,
        NumericColumn::BytesSent,
        NumericColumn::BytesReceived,
        NumericColumn::Packets,
        NumericColumn::ElapsedTime,
        NumericColumn::PktsSent,
        NumericColumn::PktsReceived,
    ];

    /// Header name in the input file.
    pub fn name(self) -> &'static str {
        match self {
            NumericColumn::Bytes => BYTES,
            NumericColumn::BytesSent => BYTES_SENT,
            NumericColumn::BytesReceived => BYTES_RECEIVED,
            NumericColumn::Packets => PACKETS,
            NumericColumn::ElapsedTime => ELAPSED_TIME,
            NumericColumn::PktsSent => PKTS_SENT,
            NumericColumn::PktsReceived => PKTS_RECEIVED,
        }
    }

    /// Column name in the `log` table.
    pub fn column(self) -> &'static str {
        match self {
            NumericColumn::Bytes => "bytes",
            NumericColumn::BytesSent => "bytes_sent",
            NumericColumn::BytesReceived => "bytes_received",
            NumericColumn::Packets => "packets",
            NumericColumn::ElapsedTime => "elapsed_sec",
            NumericColumn::PktsSent => "pkts_sent",
            NumericColumn::PktsReceived => "pkts_received",
        }
    }

    pub fn value(self, record: &LogRecord) -> Option<f64> {
        match self {
            NumericColumn::Bytes => record.bytes,
            NumericColumn::BytesSent => record.bytes_sent,
            NumericColumn::BytesReceived => record.bytes_received,
            NumericColumn::Packets => record.packets,
            NumericColumn::ElapsedTime => record.elapsed_time,
            NumericColumn::PktsSent => record.pkts_sent,
            NumericColumn::PktsReceived => record.pkts_received,
        }
    }
}

impl FromStr for NumericColumn {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        NumericColumn::ALL
            .into_iter()
            .find(|column| column.name() == value || column.column() == value)
            .ok_or_else(|| Error::other(format!("unknown numeric column: {}", value)))
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for NumericColumn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub connections: u64,
    pub bytes_total_mb: f64,
    pub allow_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionCount {
    pub action: Action,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortCount {
    pub port: i64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortActionCount {
    pub port: i64,
    pub action: Action,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortStats {
    pub port: i64,
    pub bytes_mean: Option<f64>,
    pub bytes_total: Option<f64>,
    pub packets_mean: Option<f64>,
    pub packets_total: Option<f64>,
    pub elapsed_mean: Option<f64>,
    pub bytes_total_mb: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeCategoryStats {
    pub category: TimeCategory,
    pub count: u64,
    pub bytes_mean: Option<f64>,
    pub bytes_mean_kb: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeActionCount {
    pub category: TimeCategory,
    pub action: Action,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PacketSizeCount {
    pub category: PacketSizeCategory,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<NumericColumn>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: NumericColumn, column: NumericColumn) -> Option<f64> {
        let i = self.columns.iter().position(|c| *c == row)?;
        let j = self.columns.iter().position(|c| *c == column)?;
        self.values[i][j]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub row_id: usize,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub action: Action,
    pub destination_port: Option<i64>,
    pub elapsed_time: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_column_parse() {
        assert_eq!("Packets".parse::<NumericColumn>().unwrap(), NumericColumn::Packets);
        assert_eq!(
            "Elapsed Time (sec)".parse::<NumericColumn>().unwrap(),
            NumericColumn::ElapsedTime
        );
        assert_eq!("elapsed_sec".parse::<NumericColumn>().unwrap(), NumericColumn::ElapsedTime);
        assert!("Destination Port".parse::<NumericColumn>().is_err());
    }

    #[test]
    fn test_correlation_lookup() {
        let matrix = CorrelationMatrix {
            columns: vec![NumericColumn::Bytes, NumericColumn::Packets],
            values: vec![vec![Some(1.0), Some(0.5)], vec![Some(0.5), None]],
        };
        assert_eq!(matrix.get(NumericColumn::Bytes, NumericColumn::Packets), Some(0.5));
        assert_eq!(matrix.get(NumericColumn::Packets, NumericColumn::Packets), None);
        assert_eq!(matrix.get(NumericColumn::PktsSent, NumericColumn::Bytes), None);
    }
}
