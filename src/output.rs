use crate::levels::Level;
use crate::{PeriodReport, StationReport};
use anyhow::Result;
use std::path::Path;

/// Writes the full report set for one station next to the output prefix:
/// the corrected sample table, the daily day/night tables, the period
/// summary tables and the combined day-night table.
pub fn write_station_reports(base_path: &str, report: &StationReport) -> Result<()> {
    let path = Path::new(base_path);
    let dir = path.parent().unwrap_or(Path::new("."));

    // Create directory if it doesn't exist
    std::fs::create_dir_all(dir)?;

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("results");

    let file_for = |table: &str| dir.join(format!("{}_{}_{}.csv", stem, report.station, table));

    write_samples(&file_for("samples"), report)?;
    write_dailies(&file_for("day_daily"), &report.day)?;
    write_dailies(&file_for("night_daily"), &report.night)?;
    write_summary(&file_for("day_summary"), &report.day)?;
    write_summary(&file_for("night_summary"), &report.night)?;
    write_day_night(&file_for("day_night"), report)?;

    Ok(())
}

fn write_samples(path: &Path, report: &StationReport) -> Result<()> {
    log::info!("Writing {}", path.display());
    let file = std::fs::File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    let mut header = vec![
        "timestamp".to_string(),
        "laseq".to_string(),
        "laieq".to_string(),
        "ki".to_string(),
        "kt".to_string(),
        "tonal_bands".to_string(),
        "lraseq".to_string(),
    ];
    header.extend(report.band_labels.iter().cloned());
    writer.write_record(&header)?;

    for sample in &report.samples {
        let mut record = vec![
            sample.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            dec1(sample.laseq),
            dec1(sample.laieq),
            dec1(sample.ki),
            dec1(sample.kt),
            sample.tonal_bands.clone(),
            dec1(sample.lraseq),
        ];
        record.extend(sample.bands.iter().map(|b| dec1(*b)));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

fn write_dailies(path: &Path, period: &PeriodReport) -> Result<()> {
    log::info!("Writing {}", path.display());
    let file = std::fs::File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record([
        "date",
        "day_type",
        "count",
        "laseq_1d",
        "laieq_1d",
        "ki_1d",
        "kt_1d",
        "tonal_bands",
        "lraseq_1d",
        "limit",
        "excess",
        "k",
        "u",
        "margin",
        "upper",
        "z",
        "p_compliance",
        "p_exceedance",
        "decision",
    ])?;

    for row in &period.dailies {
        writer.write_record([
            row.daily.date.format("%Y-%m-%d").to_string(),
            row.daily.day_type.label().to_string(),
            row.daily.count.to_string(),
            dec1(row.daily.laseq_1d),
            dec1(row.daily.laieq_1d),
            dec1(row.daily.ki_1d),
            dec1(row.daily.kt_1d),
            row.daily.tonal_bands.clone(),
            dec1(row.daily.lraseq_1d),
            dec1(row.compliance.limit),
            dec1(row.compliance.excess),
            dec3(row.compliance.k),
            dec3(row.compliance.u),
            dec3(row.compliance.margin),
            dec1(row.compliance.upper),
            dec3(row.compliance.z),
            prob(row.compliance.p_compliance),
            prob(row.compliance.p_exceedance),
            row.compliance.decision.label().to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn write_summary(path: &Path, period: &PeriodReport) -> Result<()> {
    log::info!("Writing {}", path.display());
    let file = std::fs::File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record([
        "day_group",
        "count",
        "laseq_k",
        "laieq_k",
        "lraseq_k",
        "s2",
        "s",
        "limit",
        "excess",
        "k",
        "u",
        "margin",
        "upper",
        "z",
        "p_compliance",
        "p_exceedance",
        "decision",
    ])?;

    for row in &period.summaries {
        writer.write_record([
            row.stats.group.label().to_string(),
            row.stats.count.to_string(),
            dec1(row.stats.laseq_k),
            dec1(row.stats.laieq_k),
            dec1(row.stats.lraseq_k),
            sci(row.stats.s2),
            sci(row.stats.s),
            dec1(row.compliance.limit),
            dec1(row.compliance.excess),
            dec3(row.compliance.k),
            dec3(row.compliance.u),
            dec3(row.compliance.margin),
            dec1(row.compliance.upper),
            dec3(row.compliance.z),
            prob(row.compliance.p_compliance),
            prob(row.compliance.p_exceedance),
            row.compliance.decision.label().to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn write_day_night(path: &Path, report: &StationReport) -> Result<()> {
    log::info!("Writing {}", path.display());
    let file = std::fs::File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(["day_group", "count", "laseq_dn", "laieq_dn", "lraseq_dn"])?;
    for row in &report.day_night {
        writer.write_record([
            row.group.label().to_string(),
            row.count.to_string(),
            dec1(row.laseq),
            dec1(row.laieq),
            dec1(row.lraseq),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn dec1(level: Level) -> String {
    match level {
        Level::Value(v) => format!("{:.1}", v),
        other => other.to_string(),
    }
}

fn dec3(level: Level) -> String {
    match level {
        Level::Value(v) => format!("{:.3}", v),
        other => other.to_string(),
    }
}

/// Dispersion columns use scientific notation; the energy-domain variance
/// spans many orders of magnitude.
fn sci(level: Level) -> String {
    match level {
        Level::Value(v) => format!("{:.2e}", v),
        other => other.to_string(),
    }
}

fn prob(level: Level) -> String {
    match level {
        Level::Value(v) => format!("{:.4}", v),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatting_renders_sentinels_as_dashes() {
        assert_eq!(dec1(Level::Value(57.35)), "57.3");
        assert_eq!(dec1(Level::Undefined), "—");
        assert_eq!(
            dec1(Level::Invalid("band/level count mismatch")),
            "band/level count mismatch"
        );
        assert_eq!(sci(Level::Value(12345.678)), "1.23e4");
        assert_eq!(prob(Level::Value(0.97561)), "0.9756");
    }
}
