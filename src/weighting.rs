use crate::levels::Level;

/// One-third-octave band center frequencies (Hz), ascending. The A-weighting
/// gains below are indexed in lockstep with this table.
pub const FREQUENCIES: [f64; 36] = [
    6.3, 8.0, 10.0, 12.5, 16.0, 20.0, 25.0, 31.5, 40.0, 50.0, 63.0, 80.0, 100.0, 125.0, 160.0,
    200.0, 250.0, 315.0, 400.0, 500.0, 630.0, 800.0, 1000.0, 1250.0, 1600.0, 2000.0, 2500.0,
    3150.0, 4000.0, 5000.0, 6300.0, 8000.0, 10000.0, 12500.0, 16000.0, 20000.0,
];

/// A-weighting gain (dB) per band.
pub const A_WEIGHTING: [f64; 36] = [
    -85.4, -77.8, -70.4, -63.4, -56.7, -50.5, -44.7, -39.4, -34.6, -30.2, -26.2, -22.5, -19.1,
    -16.1, -13.4, -10.9, -8.6, -6.6, -4.8, -3.2, -1.9, -0.8, 0.0, 0.6, 1.0, 1.2, 1.3, 1.2, 1.0,
    0.5, -0.1, -1.1, -2.5, -4.3, -6.6, -9.3,
];

/// Parses a nominal band label as it appears in sonometer exports: a plain
/// number in Hz or a `k`/`K`-suffixed number in kHz (e.g. "12.5", "1k").
pub fn parse_band_label(label: &str) -> Option<f64> {
    let trimmed = label.trim();
    let (digits, multiplier) = match trimmed
        .strip_suffix('k')
        .or_else(|| trimmed.strip_suffix('K'))
    {
        Some(rest) => (rest, 1000.0),
        None => (trimmed, 1.0),
    };
    digits.trim().parse::<f64>().ok().map(|v| v * multiplier)
}

/// Gain of the tabulated frequency nearest to `freq`, ties broken toward the
/// lower entry, out-of-range inputs clamped to the first/last gain.
pub fn gain_for(freq: f64) -> f64 {
    let idx = FREQUENCIES.partition_point(|&f| f < freq);
    if idx == 0 {
        A_WEIGHTING[0]
    } else if idx == FREQUENCIES.len() {
        A_WEIGHTING[FREQUENCIES.len() - 1]
    } else if (FREQUENCIES[idx] - freq).abs() < (FREQUENCIES[idx - 1] - freq).abs() {
        A_WEIGHTING[idx]
    } else {
        A_WEIGHTING[idx - 1]
    }
}

/// Applies the A-weighting correction for the band named by `label` to a raw
/// level. Unparseable labels report the shape error inline.
pub fn a_weight(label: &str, level: f64) -> Level {
    match parse_band_label(label) {
        Some(freq) => Level::new(level + gain_for(freq)),
        None => Level::Invalid("unrecognized band label"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kilohertz_labels_parse() {
        assert_eq!(parse_band_label("1k"), Some(1000.0));
        assert_eq!(parse_band_label("12.5K"), Some(12500.0));
        assert_eq!(parse_band_label(" 6.3 "), Some(6.3));
        assert_eq!(parse_band_label("Desconocido_3"), None);
    }

    #[test]
    fn exact_band_lookup() {
        assert_eq!(gain_for(1000.0), 0.0);
        assert_eq!(gain_for(6.3), -85.4);
        assert_eq!(gain_for(20000.0), -9.3);
    }

    #[test]
    fn nearest_band_with_lower_tie_break() {
        // 22.5 Hz is equidistant from 20 and 25; the lower entry wins.
        assert_eq!(gain_for(22.5), -50.5);
        // 24 Hz is closer to 25.
        assert_eq!(gain_for(24.0), -44.7);
    }

    #[test]
    fn out_of_range_clamps() {
        assert_eq!(gain_for(1.0), -85.4);
        assert_eq!(gain_for(40000.0), -9.3);
    }

    #[test]
    fn weighting_is_deterministic_under_relookup() {
        let first = a_weight("2k", 54.2);
        let second = a_weight("2k", 54.2);
        assert_eq!(first, second);
        assert_eq!(first, Level::Value(54.2 + 1.2));
    }

    #[test]
    fn bad_label_is_reported_inline() {
        assert_eq!(
            a_weight("??", 50.0),
            Level::Invalid("unrecognized band label")
        );
    }
}
