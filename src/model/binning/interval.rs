/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use std::io::Error;

/// Fixed-edge binning over half-open intervals `[edge[i], edge[i + 1])`.
/// The last edge may be `f64::INFINITY` to leave the top bin open.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalBinner {
    edges: Vec<f64>,
}

impl IntervalBinner {
    /// Create a binner from strictly increasing edges (at least two).
    pub fn new(edges: &[f64]) -> Result<Self, Error> {
        if edges.len() < 2 {
            return Err(Error::other("interval binner needs at least two edges"));
        }
        if edges.iter().any(|edge| edge.is_nan()) {
            return Err(Error::other("interval binner edges must not be NaN"));
        }
        if edges.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(Error::other("interval binner edges must be strictly increasing"));
        }
        Ok(IntervalBinner {
            edges: edges.to_vec(),
        })
    }

    /// Build from edges already known to be valid (compile-time tables).
    pub(crate) fn fixed(edges: &[f64]) -> Self {
        debug_assert!(edges.len() >= 2 && edges.windows(2).all(|pair| pair[0] < pair[1]));
        IntervalBinner {
            edges: edges.to_vec(),
        }
    }

    pub fn bin_count(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Index of the bin holding `value`, or `None` for NaN, infinities and
    /// values outside the edges. A value sitting exactly on an edge belongs
    /// to the upper bin.
    pub fn bin(&self, value: f64) -> Option<usize> {
        if !value.is_finite() {
            return None;
        }
        let first = self.edges[0];
        let last = self.edges[self.edges.len() - 1];
        if value < first || value >= last {
            return None;
        }
        // number of edges <= value, minus the lower bound itself
        let position = self.edges.partition_point(|edge| *edge <= value);
        Some(position - 1)
    }

    /// Count how many values fall into each bin; unbinned values are skipped.
    pub fn frequencies<I>(&self, values: I) -> Vec<usize>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut counts = vec![0; self.bin_count()];
        for value in values {
            if let Some(index) = self.bin(value) {
                counts[index] += 1;
            }
        }
        counts
    }
}
