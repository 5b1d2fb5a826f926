use crate::data_loading::MetRecord;
use crate::levels::Level;
use crate::periods::Period;
use chrono::NaiveDateTime;
use std::collections::HashSet;

/// Range of variation (max − min) of the meteorological variables that the
/// microphone sensitivity terms depend on, over one period's records.
#[derive(Debug, Clone, Copy)]
pub struct MetRanges {
    pub delta_temp: Level,
    pub delta_pressure: Level,
}

impl MetRanges {
    /// Ranges for a station with no usable met coverage: every dependent
    /// uncertainty term comes out undefined.
    pub fn undefined() -> MetRanges {
        MetRanges {
            delta_temp: Level::Undefined,
            delta_pressure: Level::Undefined,
        }
    }
}

/// Computes the per-period temperature and pressure ranges.
pub fn period_ranges(records: &[MetRecord], period: Period) -> MetRanges {
    let in_period: Vec<&MetRecord> = records
        .iter()
        .filter(|r| period.contains(r.timestamp.time()))
        .collect();

    MetRanges {
        delta_temp: range_of(in_period.iter().filter_map(|r| r.temperature)),
        delta_pressure: range_of(in_period.iter().filter_map(|r| r.pressure)),
    }
}

/// Timestamps whose hourly precipitation exceeds the threshold; acoustic
/// samples taken in those hours are discarded before aggregation.
pub fn rainy_hours(records: &[MetRecord], threshold: f64) -> HashSet<NaiveDateTime> {
    records
        .iter()
        .filter(|r| r.precipitation.map(|p| p > threshold).unwrap_or(false))
        .map(|r| r.timestamp)
        .collect()
}

fn range_of(values: impl Iterator<Item = f64>) -> Level {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut any = false;
    for v in values {
        if v.is_finite() {
            any = true;
            min = min.min(v);
            max = max.max(v);
        }
    }
    if any {
        Level::new(max - min)
    } else {
        Level::Undefined
    }
}
