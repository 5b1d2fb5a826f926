use crate::data_loading::StationData;
use crate::levels::{impulse_correction, log_mean, Level};
use crate::periods::{measurement_date, DayType, Period};
use crate::tonal::{tonal_adjustment, NO_TONAL_ADJUSTMENT};
use crate::weighting::{a_weight, parse_band_label};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashSet};

/// One fully corrected measurement: A-weighted spectrum, scalar levels and
/// the per-sample corrections. Immutable once computed.
#[derive(Debug, Clone)]
pub struct SpectrumSample {
    pub timestamp: NaiveDateTime,
    pub bands: Vec<Level>,
    pub laseq: Level,
    pub laieq: Level,
    pub ki: Level,
    pub kt: Level,
    pub tonal_bands: String,
    pub lraseq: Level,
}

impl SpectrumSample {
    /// A sample only takes part in aggregation when all three scalar levels
    /// are present; partial rows are excluded, never imputed.
    pub fn is_valid(&self) -> bool {
        self.laseq.is_value() && self.laieq.is_value() && self.lraseq.is_value()
    }
}

/// Daily aggregate for one (measurement date, period) pair.
#[derive(Debug, Clone)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub day_type: DayType,
    pub count: usize,
    pub laseq_1d: Level,
    pub laieq_1d: Level,
    pub ki_1d: Level,
    pub kt_1d: Level,
    pub tonal_bands: String,
    pub lraseq_1d: Level,
}

/// Applies A-weighting, the tonal adjustment and the impulsivity correction
/// to every raw row, producing the corrected sample table.
///
/// The corrected level takes the worse of KI and KT, never their sum:
/// `LRASeq,i = LASeq,i + max(KI,i, KT,i)`.
pub fn weigh_and_correct(data: &StationData) -> Vec<SpectrumSample> {
    let frequencies: Vec<f64> = data
        .band_labels
        .iter()
        .map(|label| parse_band_label(label).unwrap_or(f64::NAN))
        .collect();

    data.samples
        .iter()
        .map(|raw| {
            let bands: Vec<Level> = data
                .band_labels
                .iter()
                .zip(raw.bands.iter())
                .map(|(label, value)| match value {
                    Some(v) => a_weight(label, *v),
                    None => Level::Undefined,
                })
                .collect();

            // Missing cells enter the tonal scan as NaN so they can never
            // trigger an adjustment.
            let weighted: Vec<f64> = bands
                .iter()
                .map(|b| b.value().unwrap_or(f64::NAN))
                .collect();
            let tonal = tonal_adjustment(&frequencies, &weighted);

            let laseq = Level::from_opt(raw.laseq);
            let laieq = Level::from_opt(raw.laieq);
            let ki = impulse_correction(laieq.zip(laseq, |i, s| i - s));
            let lraseq = laseq.zip(ki.zip(tonal.kt, f64::max), |base, correction| {
                base + correction
            });

            SpectrumSample {
                timestamp: raw.timestamp,
                bands,
                laseq,
                laieq,
                ki,
                kt: tonal.kt,
                tonal_bands: tonal.bands,
                lraseq,
            }
        })
        .collect()
}

/// Drops samples measured during hours with disqualifying precipitation.
pub fn exclude_rain(
    samples: Vec<SpectrumSample>,
    rainy: &HashSet<NaiveDateTime>,
) -> Vec<SpectrumSample> {
    if rainy.is_empty() {
        return samples;
    }
    let before = samples.len();
    let kept: Vec<SpectrumSample> = samples
        .into_iter()
        .filter(|s| !rainy.contains(&s.timestamp))
        .collect();
    if kept.len() != before {
        log::debug!("Discarded {} rain-affected samples", before - kept.len());
    }
    kept
}

/// Valid samples belonging to one period, in input order.
pub fn period_samples<'a>(samples: &'a [SpectrumSample], period: Period) -> Vec<&'a SpectrumSample> {
    samples
        .iter()
        .filter(|s| period.contains(s.timestamp.time()) && s.is_valid())
        .collect()
}

/// Builds the per-day aggregates for one period.
///
/// The daily tonal adjustment is evaluated on the day's band-wise
/// logarithmic-mean spectrum (all of the day's period samples contribute
/// their available bands), and the daily impulsivity correction comes from
/// the aggregated `LAIeq_1d − LASeq_1d`. The final daily corrected level is
/// `LRASeq_1d = LASeq_1d + max(KI_1d, KT_1d)`.
pub fn daily_aggregates(
    samples: &[SpectrumSample],
    band_labels: &[String],
    period: Period,
) -> Vec<DailyAggregate> {
    let frequencies: Vec<f64> = band_labels
        .iter()
        .map(|label| parse_band_label(label).unwrap_or(f64::NAN))
        .collect();

    // All period samples feed the daily mean spectrum; only valid ones feed
    // the scalar aggregates.
    let mut spectra_by_date: BTreeMap<NaiveDate, Vec<&SpectrumSample>> = BTreeMap::new();
    for sample in samples.iter().filter(|s| period.contains(s.timestamp.time())) {
        spectra_by_date
            .entry(measurement_date(sample.timestamp))
            .or_default()
            .push(sample);
    }

    let mut valid_by_date: BTreeMap<NaiveDate, Vec<&SpectrumSample>> = BTreeMap::new();
    for sample in period_samples(samples, period) {
        valid_by_date
            .entry(measurement_date(sample.timestamp))
            .or_default()
            .push(sample);
    }

    valid_by_date
        .into_iter()
        .map(|(date, day_samples)| {
            let laseq_values: Vec<f64> =
                day_samples.iter().filter_map(|s| s.laseq.value()).collect();
            let laieq_values: Vec<f64> =
                day_samples.iter().filter_map(|s| s.laieq.value()).collect();

            let laseq_1d = log_mean(&laseq_values);
            let laieq_1d = log_mean(&laieq_values);
            let ki_1d = impulse_correction(laieq_1d.zip(laseq_1d, |i, s| i - s));

            let (kt_1d, tonal_bands) = match spectra_by_date.get(&date) {
                Some(day_spectra) => {
                    let mean_spectrum = mean_spectrum(day_spectra, frequencies.len());
                    let tonal = tonal_adjustment(&frequencies, &mean_spectrum);
                    (tonal.kt, tonal.bands)
                }
                None => (Level::Undefined, NO_TONAL_ADJUSTMENT.to_string()),
            };

            let lraseq_1d = laseq_1d.zip(ki_1d.zip(kt_1d, f64::max), |base, correction| {
                base + correction
            });

            DailyAggregate {
                date,
                day_type: DayType::of(date),
                count: day_samples.len(),
                laseq_1d,
                laieq_1d,
                ki_1d,
                kt_1d,
                tonal_bands,
                lraseq_1d,
            }
        })
        .collect()
}

/// Band-wise logarithmic mean across one day's spectra; bands with no valid
/// value in any sample come out as NaN, which the tonal scan ignores.
fn mean_spectrum(day_spectra: &[&SpectrumSample], band_count: usize) -> Vec<f64> {
    (0..band_count)
        .map(|band| {
            let values: Vec<f64> = day_spectra
                .iter()
                .filter_map(|s| s.bands.get(band).and_then(|l| l.value()))
                .collect();
            log_mean(&values).value().unwrap_or(f64::NAN)
        })
        .collect()
}
