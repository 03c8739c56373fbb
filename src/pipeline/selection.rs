/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use crate::model::table::{NumericColumn, PortCount};
use crate::pipeline::DashboardError;
use serde::Serialize;
use std::ops::RangeInclusive;

pub const TOP_N_RANGE: RangeInclusive<usize> = 5..=20;
pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_SELECTED_PORTS: usize = 5;

/// The interactive parameters a view is computed for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSelection {
    pub top_n: usize,
    /// Drill-down ports; `None` means the first five of the top-N.
    pub ports: Option<Vec<i64>>,
    pub x_axis: NumericColumn,
    pub y_axis: NumericColumn,
}

impl Default for ViewSelection {
    fn default() -> Self {
        ViewSelection {
            top_n: DEFAULT_TOP_N,
            ports: None,
            x_axis: NumericColumn::Packets,
            y_axis: NumericColumn::Bytes,
        }
    }
}

impl ViewSelection {
    pub fn new(
        top_n: usize,
        ports: Option<Vec<i64>>,
        x_axis: NumericColumn,
        y_axis: NumericColumn,
    ) -> Result<ViewSelection, DashboardError> {
        if !TOP_N_RANGE.contains(&top_n) {
            return Err(DashboardError::Selection(format!(
                "top-n {} outside {}..={}",
                top_n,
                TOP_N_RANGE.start(),
                TOP_N_RANGE.end()
            )));
        }
        Ok(ViewSelection {
            top_n,
            ports,
            x_axis,
            y_axis,
        })
    }

    /// Resolve the drill-down ports against the current top-N ranking.
    pub fn resolve_ports(&self, top_ports: &[PortCount]) -> Result<Vec<i64>, DashboardError> {
        match &self.ports {
            None => Ok(top_ports
                .iter()
                .take(DEFAULT_SELECTED_PORTS)
                .map(|entry| entry.port)
                .collect()),
            Some(ports) => {
                for port in ports {
                    if !top_ports.iter().any(|entry| entry.port == *port) {
                        return Err(DashboardError::Selection(format!(
                            "port {} is not among the top {} destination ports",
                            port, self.top_n
                        )));
                    }
                }
                Ok(ports.clone())
            }
        }
    }
}

pub fn parse_port_list(value: &str) -> Result<Vec<i64>, DashboardError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|port| !port.is_empty())
        .map(|port| {
            port.parse::<u16>()
                .map(i64::from)
                .map_err(|_| DashboardError::Selection(format!("invalid port {}", port)))
        })
        .collect()
}
