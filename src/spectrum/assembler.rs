//! Reduction of decoded fragments to a validated spectrum.

use std::collections::BTreeMap;

use log::debug;

use crate::wdf::{AxisFragment, Fragment, IntensityFragment};

use super::error::AssemblyError;
use super::types::{MetadataValue, Spectrum};

/// Reduces the fragments of a completed parse into one [`Spectrum`].
///
/// Exactly one axis and one intensity fragment are required. Metadata fragments
/// are merged in order, so a later value for an existing key replaces the
/// earlier one. Image and unknown fragments do not take part in assembly.
#[derive(Debug, Default)]
pub struct SpectrumAssembler {
    axis: Option<AxisFragment>,
    intensity: Option<IntensityFragment>,
    metadata: BTreeMap<String, MetadataValue>,
}

impl SpectrumAssembler {
    /// Create an empty assembler
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduce a whole fragment sequence
    pub fn assemble<I>(fragments: I) -> Result<Spectrum, AssemblyError>
    where
        I: IntoIterator<Item = Fragment>,
    {
        let mut assembler = Self::new();
        for fragment in fragments {
            assembler.push(fragment)?;
        }
        assembler.finish()
    }

    /// Fold one fragment into the pending spectrum
    pub fn push(&mut self, fragment: Fragment) -> Result<(), AssemblyError> {
        match fragment {
            Fragment::Axis(axis) => {
                if self.axis.is_some() {
                    return Err(AssemblyError::DuplicateBlock { block: "axis" });
                }
                self.axis = Some(axis);
            }
            Fragment::Intensity(intensity) => {
                if self.intensity.is_some() {
                    return Err(AssemblyError::DuplicateBlock { block: "intensity" });
                }
                self.intensity = Some(intensity);
            }
            Fragment::Metadata(metadata) => {
                for (key, value) in metadata.entries {
                    if let Some(previous) = self.metadata.insert(key.clone(), value) {
                        debug!("Metadata key '{}' overrides earlier value {}", key, previous);
                    }
                }
            }
            Fragment::Image(image) => {
                debug!(
                    "Ignoring {}x{} image ({} bytes) during assembly",
                    image.width,
                    image.height,
                    image.data.len()
                );
            }
            Fragment::Unknown(_) => {}
        }
        Ok(())
    }

    /// Validate what was collected and build the spectrum
    pub fn finish(self) -> Result<Spectrum, AssemblyError> {
        let axis = self
            .axis
            .ok_or(AssemblyError::MissingRequiredBlock { block: "axis" })?;
        let intensity = self
            .intensity
            .ok_or(AssemblyError::MissingRequiredBlock { block: "intensity" })?;

        Spectrum::new(axis.unit, axis.values, intensity.values, self.metadata)
    }
}
