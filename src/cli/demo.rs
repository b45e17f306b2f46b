use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use std::path::PathBuf;

use specfp::spectrum::{AxisUnit, MetadataValue};
use specfp::wdf::{BlockTag, FileBuilder, SampleEncoding};

/// Bands written into the demo spectrum: (center, height, width, lorentzian)
const DEMO_BANDS: [(f64, f64, f64, bool); 4] = [
    (520.0, 1200.0, 4.0, false),
    (1001.0, 900.0, 3.0, true),
    (1450.0, 400.0, 8.0, false),
    (1600.0, 650.0, 6.0, true),
];

/// Write a synthetic container with known bands
pub fn run(output: PathBuf, streamed: bool) -> Result<()> {
    info!("specfp demo container");
    info!("=====================");

    let (x, y) = generate_spectrum();
    info!(
        "Generated {} samples with {} bands",
        x.len(),
        DEMO_BANDS.len()
    );

    let bytes = FileBuilder::new()
        .streamed(streamed)
        .properties(&[
            ("title", MetadataValue::Text("Synthetic reference".to_string())),
            ("laser_wavelength_nm", MetadataValue::Float(785.0)),
            ("accumulations", MetadataValue::Integer(4)),
            ("acquired", MetadataValue::Timestamp(Utc::now())),
        ])
        .axis(AxisUnit::RamanShift, SampleEncoding::Float32, &x)
        // Blocks no reader knows about; they must be skipped
        .raw_block(BlockTag::from_ascii(b"ZMAP"), vec![0xAB; 16])
        .raw_block(BlockTag::YLST, vec![0; 24])
        .intensity(SampleEncoding::Float32, &y)
        .comment("Generated by specfp demo")
        .build();

    std::fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Wrote {} ({} bytes)", output.display(), bytes.len());
    for (center, _, _, lorentzian) in DEMO_BANDS {
        info!(
            "  band at {:.1} cm-1 ({})",
            center,
            if lorentzian { "lorentzian" } else { "gaussian" }
        );
    }

    Ok(())
}

/// Raman-shift axis 200..1800 at 0.5 cm-1 with a fluorescence slope and
/// deterministic ripple standing in for noise.
fn generate_spectrum() -> (Vec<f64>, Vec<f64>) {
    let x: Vec<f64> = (0..=3200).map(|i| 200.0 + i as f64 * 0.5).collect();
    let y = x
        .iter()
        .enumerate()
        .map(|(i, &shift)| {
            let background = 150.0 + 0.05 * shift;
            let ripple = (i as f64 * 0.731).sin() * 2.0 + (i as f64 * 0.173).cos() * 1.5;
            let bands: f64 = DEMO_BANDS
                .iter()
                .map(|&(center, height, width, lorentzian)| {
                    let d = shift - center;
                    if lorentzian {
                        height / (1.0 + (d / width).powi(2))
                    } else {
                        height * (-(d * d) / (2.0 * width * width)).exp()
                    }
                })
                .sum();
            background + ripple + bands
        })
        .collect();
    (x, y)
}
