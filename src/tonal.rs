use crate::levels::Level;

pub const NO_TONAL_ADJUSTMENT: &str = "no tonal adjustment";
const LENGTH_MISMATCH: &str = "band/level count mismatch";

const REGIME_LABELS: [&str; 3] = ["<= 125 Hz", ">= 160 Hz & <= 400 Hz", ">= 500 Hz"];

/// Result of scanning one spectrum for tonal prominence: the adjustment KT
/// (0, 3 or 6 dB) and a description of the frequency regime(s) that raised
/// it, or the no-adjustment marker.
#[derive(Debug, Clone, PartialEq)]
pub struct TonalOutcome {
    pub kt: Level,
    pub bands: String,
}

/// Evaluates the tonal adjustment over parallel band-frequency and level
/// slices.
///
/// For each interior band the tone-to-masking-noise difference
/// `l = level[i] - avg(level[i-1], level[i+1])` is classified into one of
/// three frequency regimes with regime-specific thresholds. The running
/// adjustment only ever increases. Bands with NaN levels (missing cells)
/// never trigger. Mismatched slice lengths report the shape error inline
/// instead of panicking.
pub fn tonal_adjustment(frequencies: &[f64], levels: &[f64]) -> TonalOutcome {
    if frequencies.len() != levels.len() {
        return TonalOutcome {
            kt: Level::Invalid(LENGTH_MISMATCH),
            bands: LENGTH_MISMATCH.to_string(),
        };
    }

    let mut adjustment = 0.0_f64;
    let mut triggered = [false; 3];

    for i in 1..frequencies.len().saturating_sub(1) {
        let tone = levels[i];
        let masking = (levels[i - 1] + levels[i + 1]) / 2.0;
        let l = tone - masking;
        let freq = frequencies[i];

        // (regime index, threshold for +3, threshold for +6)
        let regime = if (20.0..=125.0).contains(&freq) {
            Some((0, 8.0, 12.0))
        } else if (160.0..=400.0).contains(&freq) {
            Some((1, 5.0, 8.0))
        } else if freq >= 500.0 {
            Some((2, 3.0, 5.0))
        } else {
            None
        };
        let Some((idx, step3, step6)) = regime else {
            continue;
        };

        if l > step6 && l <= tone {
            adjustment = 6.0;
            triggered[idx] = true;
        } else if l > step3 && l <= step6 {
            adjustment = adjustment.max(3.0);
            triggered[idx] = true;
        }
    }

    let bands = if triggered.iter().any(|&hit| hit) {
        REGIME_LABELS
            .iter()
            .zip(triggered.iter())
            .filter(|(_, &hit)| hit)
            .map(|(label, _)| *label)
            .collect::<Vec<_>>()
            .join("; ")
    } else {
        NO_TONAL_ADJUSTMENT.to_string()
    };

    TonalOutcome {
        kt: Level::Value(adjustment),
        bands,
    }
}
