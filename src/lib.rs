pub mod aggregation;
pub mod compliance;
pub mod config;
pub mod data_loading;
pub mod levels;
pub mod meteorology;
pub mod output;
pub mod periods;
pub mod summary;
pub mod tonal;
pub mod uncertainty;
pub mod weighting;

use aggregation::{DailyAggregate, SpectrumSample};
use compliance::ComplianceFields;
use config::{AnalysisOptions, StationConfig};
use data_loading::{MetRecord, StationData};
use levels::Level;
use periods::Period;
use summary::{DayGroup, DayNightRow, PeriodSummary};
use uncertainty::Expanded;

/// One summary row with its compliance columns.
#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub stats: PeriodSummary,
    pub compliance: ComplianceFields,
}

/// One daily row with its compliance columns.
#[derive(Debug, Clone)]
pub struct DailyRow {
    pub daily: DailyAggregate,
    pub compliance: ComplianceFields,
}

/// Everything computed for one period of one station.
#[derive(Debug, Clone)]
pub struct PeriodReport {
    pub period: Period,
    pub dailies: Vec<DailyRow>,
    pub summaries: Vec<SummaryRow>,
}

/// The complete per-station result set, ready for rendering.
#[derive(Debug, Clone)]
pub struct StationReport {
    pub station: String,
    pub band_labels: Vec<String>,
    pub samples: Vec<SpectrumSample>,
    pub day: PeriodReport,
    pub night: PeriodReport,
    pub day_night: Vec<DayNightRow>,
}

/// Runs the full metrics pipeline for one station: weighting and
/// per-sample corrections, rain exclusion, daily and period aggregation,
/// dispersion, uncertainty propagation and the compliance decision.
///
/// A station without a limit entry still produces the full statistical
/// tables; its compliance columns come out undefined. Nothing here can
/// abort the batch.
pub fn analyze_station(
    data: &StationData,
    station_config: Option<&StationConfig>,
    met: &[MetRecord],
    opts: &AnalysisOptions,
) -> StationReport {
    let samples = aggregation::weigh_and_correct(data);
    let rainy = meteorology::rainy_hours(met, opts.rain_threshold);
    let samples = aggregation::exclude_rain(samples, &rainy);

    let day = analyze_period(&samples, data, station_config, met, Period::Day, opts);
    let night = analyze_period(&samples, data, station_config, met, Period::Night, opts);

    let day_summaries: Vec<PeriodSummary> = day.summaries.iter().map(|r| r.stats.clone()).collect();
    let night_summaries: Vec<PeriodSummary> =
        night.summaries.iter().map(|r| r.stats.clone()).collect();
    let day_night = summary::day_night_rows(&day_summaries, &night_summaries);

    StationReport {
        station: data.station.clone(),
        band_labels: data.band_labels.clone(),
        samples,
        day,
        night,
        day_night,
    }
}

fn analyze_period(
    samples: &[SpectrumSample],
    data: &StationData,
    station_config: Option<&StationConfig>,
    met: &[MetRecord],
    period: Period,
    opts: &AnalysisOptions,
) -> PeriodReport {
    let valid = aggregation::period_samples(samples, period);
    let dailies = aggregation::daily_aggregates(samples, &data.band_labels, period);
    let summaries = summary::summarize(&valid, &dailies, opts.interval_secs);

    let limit = match (station_config, period) {
        (Some(cfg), Period::Day) => Level::new(cfg.day_limit),
        (Some(cfg), Period::Night) => Level::new(cfg.night_limit),
        (None, _) => Level::Undefined,
    };

    let ranges = if met.is_empty() {
        meteorology::MetRanges::undefined()
    } else {
        meteorology::period_ranges(met, period)
    };

    // One expansion per day-group; daily rows reuse their group's factors.
    let expansions: Vec<Expanded> = summaries
        .iter()
        .map(|row| {
            let budget = uncertainty::budget(row, &ranges, opts.siting_uncertainty);
            uncertainty::expand(&budget)
        })
        .collect();

    let summary_rows: Vec<SummaryRow> = summaries
        .into_iter()
        .zip(expansions.iter())
        .map(|(stats, expanded)| SummaryRow {
            compliance: compliance::evaluate(stats.lraseq_k, limit, expanded),
            stats,
        })
        .collect();

    let daily_rows: Vec<DailyRow> = dailies
        .into_iter()
        .map(|daily| {
            let group = match daily.day_type {
                periods::DayType::Ordinary => DayGroup::Ordinary,
                periods::DayType::SundayHoliday => DayGroup::SundayHoliday,
            };
            let expanded = DayGroup::ALL
                .iter()
                .position(|&g| g == group)
                .map(|idx| expansions[idx])
                .unwrap_or_else(Expanded::undefined);
            DailyRow {
                compliance: compliance::evaluate(daily.lraseq_1d, limit, &expanded),
                daily,
            }
        })
        .collect();

    PeriodReport {
        period,
        dailies: daily_rows,
        summaries: summary_rows,
    }
}
