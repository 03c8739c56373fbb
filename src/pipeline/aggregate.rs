/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use crate::model::binning::{PacketSizeCategory, TimeCategory};
use crate::model::record::Action;
use crate::model::table::*;
use crate::pipeline::dataset::Dataset;
use crate::pipeline::recommend::allow_rate;
use crate::pipeline::DashboardError;
use crate::utils::duckdb::sql_integer_list;
use std::collections::HashMap;

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
pub const BYTES_PER_KB: f64 = 1024.0;

pub fn overview(dataset: &Dataset) -> Result<Overview, DashboardError> {
    let (connections, bytes_total): (i64, f64) = dataset.connection().query_row(
        "SELECT count(*), CAST(coalesce(sum(bytes), 0) AS DOUBLE) FROM log;",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(Overview {
        connections: connections as u64,
        bytes_total_mb: bytes_total / BYTES_PER_MB,
        allow_rate: allow_rate(dataset)?,
    })
}

/// Frequency of each `Action`, most frequent first.
pub fn action_counts(dataset: &Dataset) -> Result<Vec<ActionCount>, DashboardError> {
    let mut stmt = dataset.connection().prepare(
        "SELECT action, count(*) AS n FROM log
         GROUP BY action
         ORDER BY n DESC, action;",
    )?;
    let record_iter = stmt.query_map([], |row| {
        Ok(ActionCount {
            action: Action::parse(&row.get::<_, String>(0)?),
            count: row.get::<_, i64>(1)? as u64,
        })
    })?;
    Ok(record_iter.collect::<Result<Vec<_>, _>>()?)
}

/// Ports ranked by connection count; equal counts fall back to ascending port.
pub(crate) fn ranked_ports(
    dataset: &Dataset,
    filter: &str,
    limit: usize,
) -> Result<Vec<PortCount>, DashboardError> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let sql_command = format!(
        "SELECT dport, count(*) AS n FROM log
         WHERE dport IS NOT NULL {}
         GROUP BY dport
         ORDER BY n DESC, dport ASC
         LIMIT {};",
        filter, limit
    );
    let mut stmt = dataset.connection().prepare(&sql_command)?;
    let record_iter = stmt.query_map([], |row| {
        Ok(PortCount {
            port: row.get(0)?,
            count: row.get::<_, i64>(1)? as u64,
        })
    })?;
    Ok(record_iter.collect::<Result<Vec<_>, _>>()?)
}

pub fn top_ports(dataset: &Dataset, top_n: usize) -> Result<Vec<PortCount>, DashboardError> {
    ranked_ports(dataset, "", top_n)
}

pub fn port_action_counts(
    dataset: &Dataset,
    ports: &[i64],
) -> Result<Vec<PortActionCount>, DashboardError> {
    if ports.is_empty() {
        return Ok(Vec::new());
    }
    let sql_command = format!(
        "SELECT dport, action, count(*) FROM log
         WHERE dport IN ({})
         GROUP BY dport, action
         ORDER BY dport, action;",
        sql_integer_list(ports)
    );
    let mut stmt = dataset.connection().prepare(&sql_command)?;
    let record_iter = stmt.query_map([], |row| {
        Ok(PortActionCount {
            port: row.get(0)?,
            action: Action::parse(&row.get::<_, String>(1)?),
            count: row.get::<_, i64>(2)? as u64,
        })
    })?;
    Ok(record_iter.collect::<Result<Vec<_>, _>>()?)
}

pub fn port_stats(dataset: &Dataset, ports: &[i64]) -> Result<Vec<PortStats>, DashboardError> {
    if ports.is_empty() {
        return Ok(Vec::new());
    }
    let sql_command = format!(
        "SELECT dport, avg(bytes), sum(bytes), avg(packets), sum(packets), avg(elapsed_sec)
         FROM log
         WHERE dport IN ({})
         GROUP BY dport
         ORDER BY dport;",
        sql_integer_list(ports)
    );
    let mut stmt = dataset.connection().prepare(&sql_command)?;
    let record_iter = stmt.query_map([], |row| {
        let bytes_total: Option<f64> = row.get(2)?;
        Ok(PortStats {
            port: row.get(0)?,
            bytes_mean: row.get(1)?,
            bytes_total,
            packets_mean: row.get(3)?,
            packets_total: row.get(4)?,
            elapsed_mean: row.get(5)?,
            bytes_total_mb: bytes_total.map(|bytes| bytes / BYTES_PER_MB),
        })
    })?;
    Ok(record_iter.collect::<Result<Vec<_>, _>>()?)
}

/// Count and mean bytes for every duration bucket, empty buckets included.
pub fn time_category_stats(dataset: &Dataset) -> Result<Vec<TimeCategoryStats>, DashboardError> {
    let mut stmt = dataset.connection().prepare(
        "SELECT time_category, count(*), avg(bytes) FROM log
         WHERE time_category IS NOT NULL
         GROUP BY time_category;",
    )?;
    let record_iter = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i32>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, Option<f64>>(2)?,
        ))
    })?;
    let mut buckets: HashMap<i32, (i64, Option<f64>)> = HashMap::new();
    for record in record_iter {
        let (index, count, bytes_mean) = record?;
        buckets.insert(index, (count, bytes_mean));
    }

    Ok(TimeCategory::ALL
        .iter()
        .map(|category| {
            let (count, bytes_mean) = buckets
                .get(&(category.index() as i32))
                .copied()
                .unwrap_or((0, None));
            TimeCategoryStats {
                category: *category,
                count: count as u64,
                bytes_mean,
                bytes_mean_kb: bytes_mean.map(|bytes| bytes / BYTES_PER_KB),
            }
        })
        .collect())
}

pub fn time_action_counts(dataset: &Dataset) -> Result<Vec<TimeActionCount>, DashboardError> {
    let mut stmt = dataset.connection().prepare(
        "SELECT time_category, action, count(*) FROM log
         WHERE time_category IS NOT NULL
         GROUP BY time_category, action
         ORDER BY time_category, action;",
    )?;
    let record_iter = stmt.query_map([], |row| {
        Ok((
            row.get::<_, i32>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
        ))
    })?;
    let mut counts = Vec::new();
    for record in record_iter {
        let (index, action, count) = record?;
        if let Some(category) = TimeCategory::from_index(index as usize) {
            counts.push(TimeActionCount {
                category,
                action: Action::parse(&action),
                count: count as u64,
            });
        }
    }
    Ok(counts)
}

/// Rows per `bytes_per_packet` bucket, empty buckets included.
pub fn packet_size_distribution(dataset: &Dataset) -> Result<Vec<PacketSizeCount>, DashboardError> {
    let mut stmt = dataset.connection().prepare(
        "SELECT bytes_per_packet_cat, count(*) FROM log
         WHERE bytes_per_packet_cat IS NOT NULL
         GROUP BY bytes_per_packet_cat;",
    )?;
    let record_iter =
        stmt.query_map([], |row| Ok((row.get::<_, i32>(0)?, row.get::<_, i64>(1)?)))?;
    let mut buckets: HashMap<i32, i64> = HashMap::new();
    for record in record_iter {
        let (index, count) = record?;
        buckets.insert(index, count);
    }

    Ok(PacketSizeCategory::ALL
        .iter()
        .map(|category| PacketSizeCount {
            category: *category,
            count: buckets.get(&(category.index() as i32)).copied().unwrap_or(0) as u64,
        })
        .collect())
}

/// Pearson coefficient of `pairs`. Values are scaled into [-1, 1] per axis
/// first so that large counters cannot overflow the sums of squares.
pub(crate) fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let scale_x = pairs.iter().map(|(x, _)| x.abs()).fold(0.0, f64::max);
    let scale_y = pairs.iter().map(|(_, y)| y.abs()).fold(0.0, f64::max);
    if scale_x == 0.0 || scale_y == 0.0 {
        return None;
    }

    let n = pairs.len() as f64;
    let (sum_x, sum_y) = pairs.iter().fold((0.0, 0.0), |(sum_x, sum_y), (x, y)| {
        (sum_x + x / scale_x, sum_y + y / scale_y)
    });
    let (mean_x, mean_y) = (sum_x / n, sum_y / n);

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let dx = x / scale_x - mean_x;
        let dy = y / scale_y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    let coefficient = sxy / (sxx.sqrt() * syy.sqrt());
    coefficient
        .is_finite()
        .then(|| coefficient.clamp(-1.0, 1.0))
}

/// Pairwise-complete Pearson correlation over `columns`. A pair of cells is
/// used only when both are finite; undefined coefficients come back as `None`.
pub fn correlation_matrix(
    dataset: &Dataset,
    columns: &[NumericColumn],
) -> Result<CorrelationMatrix, DashboardError> {
    let size = columns.len();
    let mut values: Vec<Vec<Option<f64>>> = vec![vec![None; size]; size];

    let mut pairs = Vec::with_capacity(dataset.len());
    for i in 0..size {
        for j in i..size {
            pairs.clear();
            for row in dataset.rows() {
                if let (Some(x), Some(y)) = (
                    columns[i].value(&row.record),
                    columns[j].value(&row.record),
                ) {
                    if x.is_finite() && y.is_finite() {
                        pairs.push((x, y));
                    }
                }
            }
            let coefficient = pearson(&pairs);
            values[i][j] = coefficient;
            values[j][i] = coefficient;
        }
    }

    Ok(CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    })
}

/// Uniform sample without replacement of at most `limit` rows, projected on
/// the chosen axes. Returns every row when the table is not larger than `limit`.
pub fn scatter_sample(
    dataset: &Dataset,
    x_axis: NumericColumn,
    y_axis: NumericColumn,
    limit: usize,
    seed: Option<u64>,
) -> Result<Vec<ScatterPoint>, DashboardError> {
    let sample_size = limit.min(dataset.len());
    if sample_size == 0 {
        return Ok(Vec::new());
    }

    let sql_command = if sample_size == dataset.len() {
        "SELECT row_id FROM log ORDER BY row_id;".to_string()
    } else {
        let repeatable = match seed {
            Some(seed) => format!(" REPEATABLE ({})", seed),
            None => String::new(),
        };
        format!(
            "SELECT row_id FROM (SELECT row_id FROM log USING SAMPLE reservoir({} ROWS){})
             ORDER BY row_id;",
            sample_size, repeatable
        )
    };

    let points = dataset
        .select_rows(&sql_command)?
        .into_iter()
        .map(|row| ScatterPoint {
            row_id: row.row_id,
            x: x_axis.value(&row.record),
            y: y_axis.value(&row.record),
            action: row.record.action.clone(),
            destination_port: row.record.destination_port,
            elapsed_time: row.record.elapsed_time,
        })
        .collect();
    Ok(points)
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
