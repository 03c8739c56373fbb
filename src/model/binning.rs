/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

pub mod interval;

use crate::model::binning::interval::IntervalBinner;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

pub const TIME_CATEGORY_EDGES: [f64; 6] = [0.0, 10.0, 60.0, 300.0, 1800.0, f64::INFINITY];
pub const PACKET_SIZE_EDGES: [f64; 5] = [0.0, 100.0, 500.0, 1000.0, f64::INFINITY];

static TIME_BINNER: OnceLock<IntervalBinner> = OnceLock::new();
static PACKET_SIZE_BINNER: OnceLock<IntervalBinner> = OnceLock::new();

fn time_binner() -> &'static IntervalBinner {
    TIME_BINNER.get_or_init(|| IntervalBinner::fixed(&TIME_CATEGORY_EDGES))
}

fn packet_size_binner() -> &'static IntervalBinner {
    PACKET_SIZE_BINNER.get_or_init(|| IntervalBinner::fixed(&PACKET_SIZE_EDGES))
}

/// Connection duration bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeCategory {
    UnderTenSeconds,
    TenToSixtySeconds,
    OneToFiveMinutes,
    FiveToThirtyMinutes,
    OverThirtyMinutes,
}

impl TimeCategory {
    pub const ALL: [TimeCategory; 5] = [
        TimeCategory::UnderTenSeconds,
        TimeCategory::TenToSixtySeconds,
        TimeCategory::OneToFiveMinutes,
        TimeCategory::FiveToThirtyMinutes,
        TimeCategory::OverThirtyMinutes,
    ];

    pub fn classify(elapsed: Option<f64>) -> Option<TimeCategory> {
        let index = time_binner().bin(elapsed?)?;
        TimeCategory::from_index(index)
    }

    pub fn from_index(index: usize) -> Option<TimeCategory> {
        TimeCategory::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeCategory::UnderTenSeconds => "0-10s",
            TimeCategory::TenToSixtySeconds => "10-60s",
            TimeCategory::OneToFiveMinutes => "1-5min",
            TimeCategory::FiveToThirtyMinutes => "5-30min",
            TimeCategory::OverThirtyMinutes => ">30min",
        }
    }
}

/// Average payload size bucket (`bytes_per_packet_cat`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PacketSizeCategory {
    Small,
    Medium,
    Large,
    Jumbo,
}

impl PacketSizeCategory {
    pub const ALL: [PacketSizeCategory; 4] = [
        PacketSizeCategory::Small,
        PacketSizeCategory::Medium,
        PacketSizeCategory::Large,
        PacketSizeCategory::Jumbo,
    ];

    pub fn classify(bytes_per_packet: Option<f64>) -> Option<PacketSizeCategory> {
        let index = packet_size_binner().bin(bytes_per_packet?)?;
        PacketSizeCategory::from_index(index)
    }

    pub fn from_index(index: usize) -> Option<PacketSizeCategory> {
        PacketSizeCategory::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            PacketSizeCategory::Small => "<100 bytes/pkt",
            PacketSizeCategory::Medium => "100-500 bytes/pkt",
            PacketSizeCategory::Large => "500-1000 bytes/pkt",
            PacketSizeCategory::Jumbo => ">1000 bytes/pkt",
        }
    }
}

impl fmt::Display for TimeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for PacketSizeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for TimeCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl Serialize for PacketSizeCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_time_category_boundaries() {
        assert_eq!(TimeCategory::classify(Some(0.0)), Some(TimeCategory::UnderTenSeconds));
        assert_eq!(TimeCategory::classify(Some(9.9)), Some(TimeCategory::UnderTenSeconds));
        assert_eq!(TimeCategory::classify(Some(10.0)), Some(TimeCategory::TenToSixtySeconds));
        assert_eq!(TimeCategory::classify(Some(60.0)), Some(TimeCategory::OneToFiveMinutes));
        assert_eq!(TimeCategory::classify(Some(300.0)), Some(TimeCategory::FiveToThirtyMinutes));
        assert_eq!(TimeCategory::classify(Some(1800.0)), Some(TimeCategory::OverThirtyMinutes));
        assert_eq!(TimeCategory::classify(Some(-1.0)), None);
        assert_eq!(TimeCategory::classify(None), None);
    }

    #[test]
    fn test_packet_size_boundaries() {
        assert_eq!(PacketSizeCategory::classify(Some(99.9)), Some(PacketSizeCategory::Small));
        assert_eq!(PacketSizeCategory::classify(Some(100.0)), Some(PacketSizeCategory::Medium));
        assert_eq!(PacketSizeCategory::classify(Some(500.0)), Some(PacketSizeCategory::Large));
        assert_eq!(PacketSizeCategory::classify(Some(1000.0)), Some(PacketSizeCategory::Jumbo));
        assert_eq!(PacketSizeCategory::classify(Some(f64::INFINITY)), None);
        assert_eq!(PacketSizeCategory::Medium.label(), "100-500 bytes/pkt");
    }

    #[test]
    fn test_index_roundtrip_labels() {
        let labels: Vec<&str> = TimeCategory::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["0-10s", "10-60s", "1-5min", "5-30min", ">30min"]);
        for category in TimeCategory::ALL {
            assert_eq!(TimeCategory::from_index(category.index()), Some(category));
        }
        assert_eq!(TimeCategory::from_index(5), None);
    }

    proptest! {
        #[test]
        fn prop_time_category_total_on_non_negative(value in 0.0f64..1e12) {
            let category = TimeCategory::classify(Some(value));
            prop_assert!(category.is_some());
            let index = category.unwrap().index();
            prop_assert!(TIME_CATEGORY_EDGES[index] <= value);
            prop_assert!(value < TIME_CATEGORY_EDGES[index + 1]);
        }

        #[test]
        fn prop_negative_values_unbinned(value in -1e12f64..-1e-9) {
            prop_assert!(TimeCategory::classify(Some(value)).is_none());
            prop_assert!(PacketSizeCategory::classify(Some(value)).is_none());
        }
    }
}
