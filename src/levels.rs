use std::fmt;

/// A sound level (or any derived dB quantity) that may be missing.
///
/// Spreadsheet cells that fail numeric conversion, statistics over too few
/// samples and unknown-station lookups all collapse into `Undefined`, which
/// every downstream formula propagates instead of raising. `Invalid` carries
/// the reason for a data-shape problem (e.g. a band/level length mismatch)
/// so it survives into the rendered table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Level {
    Value(f64),
    Undefined,
    Invalid(&'static str),
}

impl Level {
    /// Non-finite floats (NaN from a bad cell, infinities from log of zero)
    /// become `Undefined` rather than leaking into later arithmetic.
    pub fn new(x: f64) -> Level {
        if x.is_finite() {
            Level::Value(x)
        } else {
            Level::Undefined
        }
    }

    pub fn from_opt(x: Option<f64>) -> Level {
        match x {
            Some(v) => Level::new(v),
            None => Level::Undefined,
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Level::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_value(self) -> bool {
        matches!(self, Level::Value(_))
    }

    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Level {
        match self {
            Level::Value(v) => Level::new(f(v)),
            other => other,
        }
    }

    pub fn zip(self, other: Level, f: impl FnOnce(f64, f64) -> f64) -> Level {
        match (self, other) {
            (Level::Value(a), Level::Value(b)) => Level::new(f(a, b)),
            (Level::Invalid(r), _) | (_, Level::Invalid(r)) => Level::Invalid(r),
            _ => Level::Undefined,
        }
    }

    pub fn round1(self) -> Level {
        self.map(round1)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Value(v) => write!(f, "{}", v),
            Level::Undefined => write!(f, "—"),
            Level::Invalid(reason) => write!(f, "{}", reason),
        }
    }
}

pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Energy-domain mean of a dB sequence, rounded to 1 decimal.
///
/// Each level is converted to linear power, arithmetically averaged and
/// converted back. Empty input yields `Undefined`.
pub fn log_mean(levels: &[f64]) -> Level {
    if levels.is_empty() {
        return Level::Undefined;
    }
    let mean = levels.iter().map(|l| 10f64.powf(l / 10.0)).sum::<f64>() / levels.len() as f64;
    Level::new(round1(10.0 * mean.log10()))
}

/// Time-weighted equivalent level across days.
///
/// Each day contributes with weight `count × interval` seconds, so a day
/// with a handful of valid hours does not count as much as a fully sampled
/// one. Days with zero measuring time are skipped; an empty set yields
/// `Undefined`.
pub fn time_weighted_level(days: &[(f64, usize)], interval_secs: f64) -> Level {
    let mut energy = 0.0;
    let mut seconds = 0.0;
    for &(level, count) in days {
        let t = count as f64 * interval_secs;
        if t <= 0.0 {
            continue;
        }
        energy += 10f64.powf(0.1 * (level + 10.0 * t.log10()));
        seconds += t;
    }
    if seconds <= 0.0 {
        return Level::Undefined;
    }
    Level::new(round1(10.0 * energy.log10() - 10.0 * seconds.log10()))
}

/// Combined day-night level: 14 h of the day level plus 10 h of the night
/// level with a 10 dB penalty, energy-averaged over 24 h.
pub fn day_night_level(day: Level, night: Level) -> Level {
    day.zip(night, |ld, ln| {
        let day_part = 14.0 * 10f64.powf(0.1 * ld);
        let night_part = 10.0 * 10f64.powf(0.1 * (ln + 10.0));
        10.0 * ((day_part + night_part) / 24.0).log10()
    })
}

/// Impulsivity correction KI, stepped from the Impulse minus Slow level
/// difference. A missing difference stays missing.
pub fn impulse_correction(diff: Level) -> Level {
    diff.map(|d| {
        if d < 3.0 {
            0.0
        } else if d < 6.0 {
            3.0
        } else {
            6.0
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_mean_of_identical_values_is_identity() {
        for level in [-10.0, 0.0, 35.7, 62.3, 104.9] {
            assert_eq!(log_mean(&[level, level, level]), Level::Value(round1(level)));
        }
    }

    #[test]
    fn log_mean_of_empty_input_is_undefined() {
        assert_eq!(log_mean(&[]), Level::Undefined);
    }

    #[test]
    fn log_mean_is_dominated_by_the_loudest_sample() {
        // 60 and 70 dB combine to ~67.4 dB, much closer to the louder one.
        let combined = log_mean(&[60.0, 70.0]).value().unwrap();
        assert!((combined - 67.4).abs() < 0.05);
    }

    #[test]
    fn time_weighting_favors_fully_sampled_days() {
        // A single-hour 80 dB day must not pull the average as hard as it
        // would under an unweighted mean of daily levels.
        let weighted = time_weighted_level(&[(60.0, 13), (80.0, 1)], 3600.0)
            .value()
            .unwrap();
        let naive = log_mean(&[60.0, 80.0]).value().unwrap();
        assert!(weighted < naive);
    }

    #[test]
    fn time_weighting_with_no_days_is_undefined() {
        assert_eq!(time_weighted_level(&[], 3600.0), Level::Undefined);
        assert_eq!(time_weighted_level(&[(60.0, 0)], 3600.0), Level::Undefined);
    }

    #[test]
    fn time_weighting_with_equal_counts_matches_log_mean() {
        let weighted = time_weighted_level(&[(55.0, 14), (65.0, 14)], 3600.0)
            .value()
            .unwrap();
        let plain = log_mean(&[55.0, 65.0]).value().unwrap();
        assert!((weighted - plain).abs() < 0.05);
    }

    #[test]
    fn day_night_with_uniform_levels_matches_closed_form() {
        // With Ld == Ln == L the formula reduces to L + 10·log10(114/24):
        // 14 day-hours plus 10 night-hours carrying the 10 dB penalty.
        let offset = 10.0 * (114.0_f64 / 24.0).log10();
        for level in [40.0, 55.0, 63.2, 75.0] {
            let dn = day_night_level(Level::Value(level), Level::Value(level))
                .value()
                .unwrap();
            assert!((dn - (level + offset)).abs() < 1e-9);
        }
    }

    #[test]
    fn day_night_propagates_missing_inputs() {
        assert_eq!(
            day_night_level(Level::Value(60.0), Level::Undefined),
            Level::Undefined
        );
        assert_eq!(
            day_night_level(Level::Undefined, Level::Value(50.0)),
            Level::Undefined
        );
    }

    #[test]
    fn impulse_correction_steps() {
        assert_eq!(impulse_correction(Level::Value(0.0)), Level::Value(0.0));
        assert_eq!(impulse_correction(Level::Value(2.9)), Level::Value(0.0));
        assert_eq!(impulse_correction(Level::Value(3.0)), Level::Value(3.0));
        assert_eq!(impulse_correction(Level::Value(5.9)), Level::Value(3.0));
        assert_eq!(impulse_correction(Level::Value(6.0)), Level::Value(6.0));
        assert_eq!(impulse_correction(Level::Value(11.0)), Level::Value(6.0));
        assert_eq!(impulse_correction(Level::Undefined), Level::Undefined);
    }

    #[test]
    fn non_finite_values_collapse_to_undefined() {
        assert_eq!(Level::new(f64::NAN), Level::Undefined);
        assert_eq!(Level::new(f64::INFINITY), Level::Undefined);
        assert_eq!(
            Level::Value(1.0).map(|_| f64::NAN),
            Level::Undefined
        );
    }

    #[test]
    fn invalid_reason_wins_over_undefined_in_zip() {
        let invalid = Level::Invalid("band/level count mismatch");
        assert_eq!(invalid.zip(Level::Undefined, |a, b| a + b), invalid);
    }
}
