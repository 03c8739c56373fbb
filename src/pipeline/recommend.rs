/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use crate::model::record::Action;
use crate::model::table::PortCount;
use crate::pipeline::aggregate::ranked_ports;
use crate::pipeline::dataset::Dataset;
use crate::pipeline::DashboardError;
use crate::utils::duckdb::sql_string_list;
use serde::Serialize;
use std::fmt;

pub const LOW_ALLOW_RATE: f64 = 60.0;
pub const PROTECTED_BLOCK_RATE: f64 = 80.0;
pub const SMB_PORT: i64 = 445;
pub const BLOCKED_PORT_LIMIT: usize = 5;

pub static GENERAL_GUIDANCE: &[&str] = &[
    "Review long-lived connections that transfer very little data",
    "Check connections with unusual bytes/packet ratios",
    "Watch ports of sensitive services (80, 443, 445, 3389)",
    "Analyze traffic patterns to spot abnormal behavior",
];

/// Percentage of rows whose action is `allow`; `None` for an empty table.
pub fn allow_rate(dataset: &Dataset) -> Result<Option<f64>, DashboardError> {
    let rate: Option<f64> = dataset.connection().query_row(
        "SELECT CAST(avg(CASE WHEN action = 'allow' THEN 100.0 ELSE 0.0 END) AS DOUBLE) FROM log;",
        [],
        |row| row.get(0),
    )?;
    Ok(rate)
}

/// Percentage of non-`allow` rows for one destination port; `None` when the
/// port never appears.
pub fn port_block_rate(dataset: &Dataset, port: i64) -> Result<Option<f64>, DashboardError> {
    let sql_command = format!(
        "SELECT CAST(avg(CASE WHEN action <> 'allow' THEN 100.0 ELSE 0.0 END) AS DOUBLE)
         FROM log WHERE dport = {};",
        port
    );
    let rate: Option<f64> = dataset
        .connection()
        .query_row(&sql_command, [], |row| row.get(0))?;
    Ok(rate)
}

/// Destination ports most often denied, dropped or reset.
pub fn blocked_ports(dataset: &Dataset, limit: usize) -> Result<Vec<PortCount>, DashboardError> {
    let blocking_actions = Action::BLOCKING;
    let blocking: Vec<&str> = blocking_actions.iter().map(|action| action.as_str()).collect();
    let filter = format!("AND action IN ({})", sql_string_list(&blocking));
    ranked_ports(dataset, &filter, limit)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "verdict", content = "rate", rename_all = "snake_case")]
pub enum AllowVerdict {
    Low(f64),
    Good(f64),
    NoTraffic,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "verdict", content = "rate", rename_all = "snake_case")]
pub enum PortVerdict {
    Protected(f64),
    Exposed(f64),
    NotObserved,
}

impl AllowVerdict {
    pub fn from_rate(rate: Option<f64>) -> AllowVerdict {
        match rate {
            Some(rate) if rate < LOW_ALLOW_RATE => AllowVerdict::Low(rate),
            Some(rate) => AllowVerdict::Good(rate),
            None => AllowVerdict::NoTraffic,
        }
    }
}

impl PortVerdict {
    pub fn from_rate(rate: Option<f64>) -> PortVerdict {
        match rate {
            Some(rate) if rate > PROTECTED_BLOCK_RATE => PortVerdict::Protected(rate),
            Some(rate) => PortVerdict::Exposed(rate),
            None => PortVerdict::NotObserved,
        }
    }
}

impl fmt::Display for AllowVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllowVerdict::Low(rate) => write!(
                f,
                "warning: the acceptance rate is relatively low ({:.2}%). Review the firewall rules.",
                rate
            ),
            AllowVerdict::Good(rate) => write!(f, "the acceptance rate is good ({:.2}%).", rate),
            AllowVerdict::NoTraffic => write!(f, "no connections to rate."),
        }
    }
}

impl fmt::Display for PortVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortVerdict::Protected(rate) => write!(
                f,
                "port {} (SMB) is well protected with a block rate of {:.2}%.",
                SMB_PORT, rate
            ),
            PortVerdict::Exposed(rate) => write!(
                f,
                "warning: port {} (SMB) has a block rate of only {:.2}%.",
                SMB_PORT, rate
            ),
            PortVerdict::NotObserved => write!(f, "port {} (SMB) not observed.", SMB_PORT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    pub blocked_ports: Vec<PortCount>,
    pub allow_rate: Option<f64>,
    pub allow: AllowVerdict,
    pub smb_block_rate: Option<f64>,
    pub smb: PortVerdict,
    pub guidance: Vec<&'static str>,
}

pub fn recommendations(dataset: &Dataset) -> Result<Recommendations, DashboardError> {
    let allow_rate = allow_rate(dataset)?;
    let smb_block_rate = port_block_rate(dataset, SMB_PORT)?;
    Ok(Recommendations {
        blocked_ports: blocked_ports(dataset, BLOCKED_PORT_LIMIT)?,
        allow_rate,
        allow: AllowVerdict::from_rate(allow_rate),
        smb_block_rate,
        smb: PortVerdict::from_rate(smb_block_rate),
        guidance: GENERAL_GUIDANCE.to_vec(),
    })
}
