use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use std::collections::HashMap;
use std::path::Path;
use walkdir::WalkDir;

use noise_compliance::analyze_station;
use noise_compliance::config::{AnalysisOptions, Args, SiteConfig};
use noise_compliance::data_loading::{load_met_csv, load_station_csv, MetRecord};
use noise_compliance::output::write_station_reports;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();

    let site = SiteConfig::load(&args.stations)
        .with_context(|| format!("Failed to load station config: {}", args.stations.display()))?;

    let met = match &args.met {
        Some(path) => load_met_csv(path)
            .with_context(|| format!("Failed to load met data: {}", path.display()))?,
        None => Default::default(),
    };

    let opts = AnalysisOptions::from(&args);

    let mut station_files: Vec<_> = WalkDir::new(&args.input_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry.path().extension().and_then(|s| s.to_str()) == Some("csv")
        })
        .map(|entry| entry.into_path())
        .collect();
    station_files.sort();

    if station_files.is_empty() {
        anyhow::bail!("No .csv files found under {}", args.input_dir.display());
    }

    for path in &station_files {
        // One bad station file must not sink the whole batch
        if let Err(err) = process_station(path, &site, &met, &opts, &args.output) {
            warn!("Skipping {}: {:#}", path.display(), err);
        }
    }

    Ok(())
}

fn process_station(
    path: &Path,
    site: &SiteConfig,
    met: &HashMap<String, Vec<MetRecord>>,
    opts: &AnalysisOptions,
    output: &str,
) -> anyhow::Result<()> {
    info!("Loading station file: {}", path.display());
    let data = load_station_csv(path)?;

    let station_cfg = site.station(&data.station);
    if station_cfg.is_none() {
        warn!(
            "No limits configured for station {}; compliance columns will be undefined",
            data.station
        );
    }

    let met_records = station_cfg
        .and_then(|cfg| cfg.met_station.as_deref())
        .and_then(|name| met.get(name))
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let report = analyze_station(&data, station_cfg, met_records, opts);
    write_station_reports(output, &report)?;

    info!(
        "Finished station {}: {} samples, {} day / {} night daily rows",
        report.station,
        report.samples.len(),
        report.day.dailies.len(),
        report.night.dailies.len()
    );

    Ok(())
}
