use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Compute environmental-noise compliance reports from station measurements
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory containing per-station measurement CSV files
    #[arg(help = "Directory containing per-station measurement CSV files")]
    pub input_dir: PathBuf,

    /// JSON file with per-station regulatory limits and met-station mapping
    #[arg(long)]
    pub stations: PathBuf,

    /// CSV file with hourly meteorological records
    #[arg(long)]
    pub met: Option<PathBuf>,

    /// Output file prefix (e.g. /path/to/output/prefix)
    #[arg(long, default_value = "reports/station")]
    pub output: String,

    /// Siting standard uncertainty in dB
    #[arg(long, default_value = "0.0")]
    pub siting_uncertainty: f64,

    /// Sampling interval of one measurement in seconds
    #[arg(long, default_value = "3600.0")]
    pub interval_secs: f64,

    /// Hourly precipitation (mm) above which samples are discarded
    #[arg(long, default_value = "0.5")]
    pub rain_threshold: f64,
}

/// Regulatory limits and met-station assignment for one monitoring station.
#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub day_limit: f64,
    pub night_limit: f64,
    #[serde(default)]
    pub met_station: Option<String>,
}

/// Static site configuration, loaded once at startup and never mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    pub stations: HashMap<String, StationConfig>,
}

impl SiteConfig {
    pub fn load(path: &Path) -> Result<SiteConfig> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open station config: {}", path.display()))?;
        let config: SiteConfig = serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse station config: {}", path.display()))?;
        Ok(config)
    }

    /// Looks a station up by its sheet name; hyphen and underscore spellings
    /// of the same identifier are treated as equal.
    pub fn station(&self, name: &str) -> Option<&StationConfig> {
        self.stations
            .get(name)
            .or_else(|| self.stations.get(&name.replace('-', "_")))
            .or_else(|| self.stations.get(&name.replace('_', "-")))
    }
}

/// Analysis tunables threaded through the pipeline.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub siting_uncertainty: f64,
    pub interval_secs: f64,
    pub rain_threshold: f64,
}

impl From<&Args> for AnalysisOptions {
    fn from(args: &Args) -> AnalysisOptions {
        AnalysisOptions {
            siting_uncertainty: args.siting_uncertainty,
            interval_secs: args.interval_secs,
            rain_threshold: args.rain_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_lookup_tolerates_separator_spelling() {
        let json = r#"{
            "stations": {
                "EMRI_7": { "day_limit": 65.0, "night_limit": 55.0, "met_station": "CE0335" }
            }
        }"#;
        let config: SiteConfig = serde_json::from_str(json).unwrap();
        assert!(config.station("EMRI_7").is_some());
        assert!(config.station("EMRI-7").is_some());
        assert!(config.station("EMRI-8").is_none());
    }
}
