/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

pub const SOURCE_ADDRESS: &str = "Source Address";
pub const DESTINATION_ADDRESS: &str = "Destination Address";
pub const SOURCE_PORT: &str = "Source Port";
pub const DESTINATION_PORT: &str = "Destination Port";
pub const NAT_SOURCE_PORT: &str = "NAT Source Port";
pub const NAT_DESTINATION_PORT: &str = "NAT Destination Port";
pub const ACTION: &str = "Action";
pub const BYTES: &str = "Bytes";
pub const BYTES_SENT: &str = "Bytes Sent";
pub const BYTES_RECEIVED: &str = "Bytes Received";
pub const PACKETS: &str = "Packets";
pub const ELAPSED_TIME: &str = "Elapsed Time (sec)";
pub const PKTS_SENT: &str = "pkts_sent";
pub const PKTS_RECEIVED: &str = "pkts_received";

/// Columns the derivation and the views cannot do without.
pub static REQUIRED_FIELDS: &[&str] = &[
    ACTION,
    DESTINATION_PORT,
    BYTES,
    BYTES_SENT,
    BYTES_RECEIVED,
    PACKETS,
    ELAPSED_TIME,
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Action {
    Allow,
    Deny,
    Drop,
    ResetBoth,
    Unknown(String),
}

impl Action {
    pub const BLOCKING: [Action; 3] = [Action::Deny, Action::Drop, Action::ResetBoth];

    pub fn parse(value: &str) -> Action {
        match value {
            "allow" => Action::Allow,
            "deny" => Action::Deny,
            "drop" => Action::Drop,
            "reset-both" => Action::ResetBoth,
            other => Action::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Action::Allow => "allow",
            Action::Deny => "deny",
            Action::Drop => "drop",
            Action::ResetBoth => "reset-both",
            Action::Unknown(value) => value.as_str(),
        }
    }

    pub fn is_blocking(&self) -> bool {
        Action::BLOCKING.contains(self)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Unknown(value) if value.is_empty() => write!(f, "(missing)"),
            _ => write!(f, "{}", self.as_str()),
        }
    }
}

impl From<String> for Action {
    fn from(value: String) -> Self {
        Action::parse(&value)
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.as_str().to_string()
    }
}

/// A CSV row exactly as read, before any coercion.
#[derive(Debug, Default, Deserialize)]
pub struct RawLogRecord {
    #[serde(rename = "Source Address", default)]
    pub source_address: Option<String>,
    #[serde(rename = "Destination Address", default)]
    pub destination_address: Option<String>,
    #[serde(rename = "Source Port", default)]
    pub source_port: Option<String>,
    #[serde(rename = "Destination Port", default)]
    pub destination_port: Option<String>,
    #[serde(rename = "NAT Source Port", default)]
    pub nat_source_port: Option<String>,
    #[serde(rename = "NAT Destination Port", default)]
    pub nat_destination_port: Option<String>,
    #[serde(rename = "Action", default)]
    pub action: Option<String>,
    #[serde(rename = "Bytes", default)]
    pub bytes: Option<String>,
    #[serde(rename = "Bytes Sent", default)]
    pub bytes_sent: Option<String>,
    #[serde(rename = "Bytes Received", default)]
    pub bytes_received: Option<String>,
    #[serde(rename = "Packets", default)]
    pub packets: Option<String>,
    #[serde(rename = "Elapsed Time (sec)", default)]
    pub elapsed_time: Option<String>,
    #[serde(rename = "pkts_sent", default)]
    pub pkts_sent: Option<String>,
    #[serde(rename = "pkts_received", default)]
    pub pkts_received: Option<String>,
}

/// One firewall log entry with every numeric field coerced.
/// `None` marks a cell that was absent or could not be parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub source_address: Option<String>,
    pub destination_address: Option<String>,
    pub source_port: Option<i64>,
    pub destination_port: Option<i64>,
    pub nat_source_port: Option<i64>,
    pub nat_destination_port: Option<i64>,
    pub action: Action,
    pub bytes: Option<f64>,
    pub bytes_sent: Option<f64>,
    pub bytes_received: Option<f64>,
    pub packets: Option<f64>,
    pub elapsed_time: Option<f64>,
    pub pkts_sent: Option<f64>,
    pub pkts_received: Option<f64>,
}

/// Parses a numeric cell, returning `None` instead of an error.
pub fn coerce_number(cell: Option<&str>) -> Option<f64> {
    let text = cell?.trim();
    if text.is_empty() {
        return None;
    }
    match text.parse::<f64>() {
        Ok(value) if value.is_nan() => None,
        Ok(value) => Some(value),
        Err(_) => None,
    }
}

/// Ports must be integral and within 0..=65535.
pub fn coerce_port(cell: Option<&str>) -> Option<i64> {
    let value = coerce_number(cell)?;
    if value.fract() != 0.0 || !(0.0..=65535.0).contains(&value) {
        return None;
    }
    Some(value as i64)
}

fn coerce_text(cell: Option<String>) -> Option<String> {
    cell.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl From<RawLogRecord> for LogRecord {
    fn from(raw: RawLogRecord) -> Self {
        LogRecord {
            source_port: coerce_port(raw.source_port.as_deref()),
            destination_port: coerce_port(raw.destination_port.as_deref()),
            nat_source_port: coerce_port(raw.nat_source_port.as_deref()),
            nat_destination_port: coerce_port(raw.nat_destination_port.as_deref()),
            action: Action::parse(raw.action.as_deref().unwrap_or("")),
            bytes: coerce_number(raw.bytes.as_deref()),
            bytes_sent: coerce_number(raw.bytes_sent.as_deref()),
            bytes_received: coerce_number(raw.bytes_received.as_deref()),
            packets: coerce_number(raw.packets.as_deref()),
            elapsed_time: coerce_number(raw.elapsed_time.as_deref()),
            pkts_sent: coerce_number(raw.pkts_sent.as_deref()),
            pkts_received: coerce_number(raw.pkts_received.as_deref()),
            source_address: coerce_text(raw.source_address),
            destination_address: coerce_text(raw.destination_address),
        }
    }
}
