use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use specfp::batch::{BatchDriver, BatchOptions, FileOutcome};
use specfp::export::{
    write_fingerprint_csv, write_fingerprints_json, write_summary_csv, FingerprintRecord,
};

use super::config::Config;
use super::{FingerprintArgs, OutputFormat};

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    })
}

/// Fingerprint every input, write the bands and report per-file outcomes
pub fn run(
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
    format: OutputFormat,
    summary: Option<PathBuf>,
    config_path: Option<PathBuf>,
    params: FingerprintArgs,
) -> Result<()> {
    let file_config = Config::load(config_path.as_deref())?;
    let (config, jobs) = file_config.resolve(&params);

    info!(
        "Fingerprinting {} files (window {}, prominence x{}, separation {}, baseline {})",
        inputs.len(),
        config.smoothing_window,
        config.prominence_factor,
        config.min_band_separation,
        config.baseline_method
    );

    let driver = BatchDriver::new(config, BatchOptions { jobs })
        .context("Invalid fingerprint configuration")?;
    let (outcomes, report) = driver.run_report(&inputs);

    let labels: Vec<String> = outcomes
        .iter()
        .map(|o| o.path().display().to_string())
        .collect();
    let records: Vec<FingerprintRecord<'_>> = outcomes
        .iter()
        .zip(&labels)
        .filter_map(|(outcome, label)| match outcome {
            FileOutcome::Completed { fingerprint, .. } => Some(FingerprintRecord {
                file: label,
                fingerprint,
            }),
            _ => None,
        })
        .collect();

    let writer = open_output(output.as_deref())?;
    match format {
        OutputFormat::Csv => write_fingerprint_csv(writer, records)
            .context("Failed to write fingerprint CSV")?,
        OutputFormat::Json => write_fingerprints_json(writer, &records)
            .context("Failed to write fingerprint JSON")?,
    }

    if let Some(path) = &summary {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_summary_csv(BufWriter::new(file), &report).context("Failed to write summary")?;
        info!("Wrote summary to {}", path.display());
    }

    eprintln!("{}", report.format_colored());

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}
