use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// One raw measurement row as it comes out of the station export: scalar
/// Slow/Impulse levels plus the one-third-octave band vector. Cells that do
/// not parse as numbers are carried as `None` and treated as missing
/// downstream, never as zero.
#[derive(Debug, Clone)]
pub struct RawSample {
    pub timestamp: NaiveDateTime,
    pub laseq: Option<f64>,
    pub laieq: Option<f64>,
    pub bands: Vec<Option<f64>>,
}

/// A full station export: the nominal band labels from the header and the
/// measurement rows.
#[derive(Debug, Clone)]
pub struct StationData {
    pub station: String,
    pub band_labels: Vec<String>,
    pub samples: Vec<RawSample>,
}

/// One hourly meteorological record for a met station.
#[derive(Debug, Clone)]
pub struct MetRecord {
    pub timestamp: NaiveDateTime,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub precipitation: Option<f64>,
}

/// Reads a per-station measurement CSV.
///
/// Expected header: `timestamp,laseq,laieq,<band label>...` where the band
/// labels are the nominal center frequencies ("6.3" .. "20k"). The station
/// identifier is the file stem.
pub fn load_station_csv(path: &Path) -> Result<StationData> {
    let station = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .with_context(|| format!("Invalid station file name: {}", path.display()))?;

    let file = File::open(path)
        .with_context(|| format!("Failed to open station file: {}", path.display()))?;
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let headers = rdr
        .headers()
        .with_context(|| format!("Missing header row in {}", path.display()))?
        .clone();
    if headers.len() < 4 {
        bail!(
            "Station file {} has {} columns, expected timestamp, laseq, laieq and band levels",
            path.display(),
            headers.len()
        );
    }
    let band_labels: Vec<String> = headers.iter().skip(3).map(|h| h.trim().to_string()).collect();

    let mut samples = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let ts_field = record
            .get(0)
            .with_context(|| format!("Row without timestamp in {}", path.display()))?;
        let timestamp = parse_timestamp(ts_field)
            .with_context(|| format!("Bad timestamp {:?} in {}", ts_field, path.display()))?;

        let laseq = record.get(1).and_then(parse_cell);
        let laieq = record.get(2).and_then(parse_cell);
        let bands: Vec<Option<f64>> = (0..band_labels.len())
            .map(|i| record.get(3 + i).and_then(parse_cell))
            .collect();

        samples.push(RawSample {
            timestamp,
            laseq,
            laieq,
            bands,
        });
    }

    log::debug!("{}: loaded {} measurement rows", station, samples.len());
    Ok(StationData {
        station,
        band_labels,
        samples,
    })
}

/// Reads the hourly meteorology CSV, long format:
/// `timestamp,station,temperature,humidity,pressure,precipitation`.
/// Records are grouped by met-station name.
pub fn load_met_csv(path: &Path) -> Result<HashMap<String, Vec<MetRecord>>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open meteorology file: {}", path.display()))?;
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let mut by_station: HashMap<String, Vec<MetRecord>> = HashMap::new();
    for result in rdr.records() {
        let record = result?;
        let ts_field = record
            .get(0)
            .with_context(|| format!("Met row without timestamp in {}", path.display()))?;
        let timestamp = parse_timestamp(ts_field)
            .with_context(|| format!("Bad met timestamp {:?} in {}", ts_field, path.display()))?;
        let station = record
            .get(1)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        if station.is_empty() {
            continue;
        }

        by_station.entry(station).or_default().push(MetRecord {
            timestamp,
            temperature: record.get(2).and_then(parse_cell),
            humidity: record.get(3).and_then(parse_cell),
            pressure: record.get(4).and_then(parse_cell),
            precipitation: record.get(5).and_then(parse_cell),
        });
    }

    Ok(by_station)
}

/// Non-numeric content (dashes, annotations, empty cells) coerces to missing.
fn parse_cell(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Station exports appear in either ISO or the sonometer's 12-hour format.
fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let trimmed = s.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%d/%m/%Y %I:%M:%S %p"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(ts);
        }
    }
    bail!("Unrecognized timestamp format: {:?}", trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_cells_parse_and_junk_coerces_to_missing() {
        assert_eq!(parse_cell("54.3"), Some(54.3));
        assert_eq!(parse_cell("  -1.2 "), Some(-1.2));
        assert_eq!(parse_cell("—"), None);
        assert_eq!(parse_cell(""), None);
        assert_eq!(parse_cell("n/a"), None);
    }

    #[test]
    fn both_timestamp_formats_are_accepted() {
        assert!(parse_timestamp("2024-04-08 14:00:00").is_ok());
        assert!(parse_timestamp("2024-04-08 14:00").is_ok());
        assert!(parse_timestamp("08/04/2024 02:00:00 PM").is_ok());
        assert!(parse_timestamp("yesterday").is_err());
    }
}
