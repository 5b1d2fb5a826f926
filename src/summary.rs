use crate::aggregation::{DailyAggregate, SpectrumSample};
use crate::levels::{day_night_level, log_mean, time_weighted_level, Level};
use crate::periods::DayType;

/// Row key of a period summary: the two day-types plus the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayGroup {
    Ordinary,
    SundayHoliday,
    Total,
}

impl DayGroup {
    pub const ALL: [DayGroup; 3] = [DayGroup::Ordinary, DayGroup::SundayHoliday, DayGroup::Total];

    pub fn matches(self, day_type: DayType) -> bool {
        match self {
            DayGroup::Ordinary => day_type == DayType::Ordinary,
            DayGroup::SundayHoliday => day_type == DayType::SundayHoliday,
            DayGroup::Total => true,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayGroup::Ordinary => "ordinary",
            DayGroup::SundayHoliday => "sunday-holiday",
            DayGroup::Total => "total",
        }
    }
}

/// Statistical summary of one (day-group, period) cell: counts, logarithmic
/// means, the day-count-weighted corrected level and the energy-domain
/// dispersion of the corrected per-sample levels.
#[derive(Debug, Clone)]
pub struct PeriodSummary {
    pub group: DayGroup,
    pub count: usize,
    pub laseq_k: Level,
    pub laieq_k: Level,
    pub lraseq_k: Level,
    pub s2: Level,
    pub s: Level,
}

/// Builds the three summary rows for one period.
///
/// `LASeq_k`/`LAIeq_k` are logarithmic means over the per-sample levels;
/// `LRASeq_k` is the time-weighted rollup over the daily aggregates, so the
/// Total row is the weighted combination of its parts rather than a naive
/// average. All three rows are always present; an empty group carries count
/// 0 and undefined levels.
pub fn summarize(
    valid: &[&SpectrumSample],
    dailies: &[DailyAggregate],
    interval_secs: f64,
) -> Vec<PeriodSummary> {
    DayGroup::ALL
        .iter()
        .map(|&group| {
            let group_samples: Vec<&&SpectrumSample> = valid
                .iter()
                .filter(|s| group.matches(DayType::of(crate::periods::measurement_date(s.timestamp))))
                .collect();

            let laseq_values: Vec<f64> = group_samples
                .iter()
                .filter_map(|s| s.laseq.value())
                .collect();
            let laieq_values: Vec<f64> = group_samples
                .iter()
                .filter_map(|s| s.laieq.value())
                .collect();

            let day_levels: Vec<(f64, usize)> = dailies
                .iter()
                .filter(|d| group.matches(d.day_type))
                .filter_map(|d| d.lraseq_1d.value().map(|l| (l, d.count)))
                .collect();
            let lraseq_k = time_weighted_level(&day_levels, interval_secs);

            let count = group_samples.len();
            let (s2, s) = dispersion(&group_samples, lraseq_k, count);

            PeriodSummary {
                group,
                count,
                laseq_k: log_mean(&laseq_values),
                laieq_k: log_mean(&laieq_values),
                lraseq_k,
                s2,
                s,
            }
        })
        .collect()
}

/// Energy-domain sample variance and standard error of a group's corrected
/// levels around the group's weighted level:
/// `s² = Σ(10^(0.1·Li) − 10^(0.1·Lk))² / (N−1)`, `s = √s² / √N`.
/// N ≤ 1 leaves the variance undefined rather than dividing by zero.
fn dispersion(samples: &[&&SpectrumSample], lraseq_k: Level, n: usize) -> (Level, Level) {
    let Some(lk) = lraseq_k.value() else {
        return (Level::Undefined, Level::Undefined);
    };
    if n <= 1 {
        return (Level::Undefined, Level::Undefined);
    }

    let reference = 10f64.powf(0.1 * lk);
    let sum_sq: f64 = samples
        .iter()
        .filter_map(|s| s.lraseq.value())
        .map(|li| {
            let diff = 10f64.powf(0.1 * li) - reference;
            diff * diff
        })
        .sum();

    let s2 = sum_sq / (n as f64 - 1.0);
    let s = s2.sqrt() / (n as f64).sqrt();
    (Level::new(s2), Level::new(s))
}

/// One row of the combined day-night table.
#[derive(Debug, Clone)]
pub struct DayNightRow {
    pub group: DayGroup,
    pub count: usize,
    pub laseq: Level,
    pub laieq: Level,
    pub lraseq: Level,
}

/// Combines matching day and night summary rows into the 24 h table.
pub fn day_night_rows(day: &[PeriodSummary], night: &[PeriodSummary]) -> Vec<DayNightRow> {
    day.iter()
        .zip(night.iter())
        .map(|(d, n)| DayNightRow {
            group: d.group,
            count: d.count + n.count,
            laseq: day_night_level(d.laseq_k, n.laseq_k),
            laieq: day_night_level(d.laieq_k, n.laieq_k),
            lraseq: day_night_level(d.lraseq_k, n.lraseq_k),
        })
        .collect()
}
