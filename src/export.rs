//! Tabular and JSON output.
//!
//! Flattens spectra, fingerprints and batch reports into CSV rows (crate
//! `csv`) or JSON documents (`serde_json`). The decode and fingerprint modules
//! know nothing about these formats.

use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use crate::batch::BatchReport;
use crate::fingerprint::Fingerprint;
use crate::spectrum::Spectrum;

/// Errors during export
#[derive(Error, Debug)]
pub enum ExportError {
    /// Underlying writer failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON encoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct PointRow {
    x: f64,
    y: f64,
}

#[derive(Serialize)]
struct BandRow<'a> {
    file: &'a str,
    center: f64,
    width: f64,
    height: f64,
    area: f64,
    shape: &'static str,
}

#[derive(Serialize)]
struct SummaryRow<'a> {
    file: &'a str,
    status: &'static str,
    bands: usize,
    error: &'a str,
}

/// A fingerprint labelled with the file it came from
#[derive(Debug, Serialize)]
pub struct FingerprintRecord<'a> {
    /// Source file
    pub file: &'a str,
    /// Extracted fingerprint
    pub fingerprint: &'a Fingerprint,
}

/// Write `x,y` rows for every sample of `spectrum`.
pub fn write_spectrum_csv<W: Write>(writer: W, spectrum: &Spectrum) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for (x, y) in spectrum.points() {
        csv.serialize(PointRow { x, y })?;
    }
    csv.flush()?;
    Ok(())
}

/// Write `file,center,width,height,area,shape` rows for each labelled fingerprint.
///
/// The header is written even when there are no bands.
pub fn write_fingerprint_csv<'a, W, I>(writer: W, records: I) -> Result<(), ExportError>
where
    W: Write,
    I: IntoIterator<Item = FingerprintRecord<'a>>,
{
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(["file", "center", "width", "height", "area", "shape"])?;
    for record in records {
        for band in record.fingerprint {
            csv.serialize(BandRow {
                file: record.file,
                center: band.center(),
                width: band.width(),
                height: band.height(),
                area: band.area(),
                shape: band.shape().name(),
            })?;
        }
    }
    csv.flush()?;
    Ok(())
}

/// Write `file,status,bands,error` rows for every report entry.
pub fn write_summary_csv<W: Write>(writer: W, report: &BatchReport) -> Result<(), ExportError> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(["file", "status", "bands", "error"])?;
    for entry in &report.entries {
        csv.serialize(SummaryRow {
            file: &entry.file,
            status: entry.status.label(),
            bands: entry.bands,
            error: entry.error().unwrap_or(""),
        })?;
    }
    csv.flush()?;
    Ok(())
}

/// Write labelled fingerprints as a pretty-printed JSON array.
pub fn write_fingerprints_json<W: Write>(
    mut writer: W,
    records: &[FingerprintRecord<'_>],
) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writeln!(writer)?;
    Ok(())
}
