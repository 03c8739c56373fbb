/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use crate::model::binning::{PacketSizeCategory, TimeCategory};
use crate::model::record::LogRecord;
use serde::Serialize;
use std::io::Error;
use std::str::FromStr;

/// How `sent_received_ratio` treats a zero `Bytes Received` denominator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RatioPolicy {
    /// Divide by 1 instead of 0.
    #[default]
    Substitute,
    /// Leave the ratio missing.
    Missing,
}

impl FromStr for RatioPolicy {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "substitute" => Ok(RatioPolicy::Substitute),
            "missing" => Ok(RatioPolicy::Missing),
            _ => Err(Error::other(format!("invalid ratio policy: {}", value))),
        }
    }
}

/// Columns computed from a single `LogRecord`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub bytes_per_packet: Option<f64>,
    pub sent_received_ratio: Option<f64>,
    pub is_incoming: bool,
    pub time_category: Option<TimeCategory>,
    pub bytes_per_packet_cat: Option<PacketSizeCategory>,
}

pub fn bytes_per_packet(bytes: Option<f64>, packets: Option<f64>) -> Option<f64> {
    let packets = packets?;
    if packets == 0.0 {
        return None;
    }
    Some(bytes? / packets).filter(|value| !value.is_nan())
}

pub fn sent_received_ratio(
    sent: Option<f64>,
    received: Option<f64>,
    policy: RatioPolicy,
) -> Option<f64> {
    let sent = sent?;
    let received = received?;
    if received == 0.0 {
        return match policy {
            RatioPolicy::Substitute => Some(sent / 1.0),
            RatioPolicy::Missing => None,
        };
    }
    Some(sent / received).filter(|value| !value.is_nan())
}

impl DerivedMetrics {
    pub fn derive(record: &LogRecord, policy: RatioPolicy) -> DerivedMetrics {
        let bytes_per_packet = bytes_per_packet(record.bytes, record.packets);
        let is_incoming = match (record.bytes_received, record.bytes_sent) {
            (Some(received), Some(sent)) => received > sent,
            _ => false,
        };
        DerivedMetrics {
            bytes_per_packet,
            sent_received_ratio: sent_received_ratio(
                record.bytes_sent,
                record.bytes_received,
                policy,
            ),
            is_incoming,
            time_category: TimeCategory::classify(record.elapsed_time),
            bytes_per_packet_cat: PacketSizeCategory::classify(bytes_per_packet),
        }
    }
}

/// A log row together with its derived columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AugmentedRecord {
    pub row_id: usize,
    #[serde(flatten)]
    pub record: LogRecord,
    #[serde(flatten)]
    pub metrics: DerivedMetrics,
}

pub fn derive_all(records: &[LogRecord], policy: RatioPolicy) -> Vec<AugmentedRecord> {
    records
        .iter()
        .enumerate()
        .map(|(row_id, record)| AugmentedRecord {
            row_id,
            record: record.clone(),
            metrics: DerivedMetrics::derive(record, policy),
        })
        .collect()
}
