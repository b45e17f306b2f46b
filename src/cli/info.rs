use anyhow::{Context, Result};
use std::path::PathBuf;

use specfp::spectrum::SpectrumAssembler;
use specfp::wdf::{parse_blocks, BlockRegistry};

/// Display header, block listing and spectrum summary of a container
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let bytes = std::fs::read(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let parsed = parse_blocks(&bytes, BlockRegistry::standard())
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    println!("WDF File Information");
    println!("====================");
    println!("File: {}", file.display());
    println!("Size: {} bytes", bytes.len());
    println!();

    println!("Header:");
    println!("  Version: {}", parsed.header.version);
    if parsed.header.is_streamed() {
        println!("  Blocks: streamed to end of file");
    } else {
        println!("  Blocks: {}", parsed.header.block_count);
    }
    println!("  Flags: 0x{:08X}", parsed.header.flags);
    println!();

    println!("Blocks:");
    for record in &parsed.blocks {
        println!(
            "  {:>8}  {:<6} uid {:<4} {:>10} bytes  {}",
            record.offset,
            record.tag.to_string(),
            record.uid,
            record.length,
            record.decoder.unwrap_or("(unknown, skipped)")
        );
    }
    println!();

    let spectrum = SpectrumAssembler::assemble(parsed.fragments)
        .with_context(|| format!("Failed to assemble spectrum from {}", file.display()))?;

    println!("Spectrum:");
    println!("  Samples: {}", spectrum.len());
    println!("  Unit: {}", spectrum.unit().symbol());
    println!("  Direction: {:?}", spectrum.direction());
    let x = spectrum.x();
    println!("  Range: {} .. {}", x[0], x[x.len() - 1]);
    println!("  Mean spacing: {:.4}", spectrum.mean_spacing());

    if !spectrum.metadata().is_empty() {
        println!();
        println!("Metadata:");
        for (key, value) in spectrum.metadata() {
            let text = value.to_string();
            let preview = if text.chars().count() > 100 {
                format!("{}... ({} chars)", text.chars().take(100).collect::<String>(), text.chars().count())
            } else {
                text
            };
            println!("  {}: {}", key, preview);
        }
    }

    Ok(())
}
