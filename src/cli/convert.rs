use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use specfp::export::write_spectrum_csv;

/// Decode a container and write its spectrum as x,y CSV
pub fn run(input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }

    let bytes = std::fs::read(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let spectrum = specfp::parse(&bytes)
        .with_context(|| format!("Failed to decode {}", input.display()))?;

    info!(
        "{}: {} samples, unit {}, {:?} axis",
        input.display(),
        spectrum.len(),
        spectrum.unit().symbol(),
        spectrum.direction()
    );

    let writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    write_spectrum_csv(writer, &spectrum).context("Failed to write spectrum CSV")?;

    if let Some(path) = output {
        info!("Wrote {}", path.display());
    }

    Ok(())
}
