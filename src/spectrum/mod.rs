//! # Spectrum Module
//!
//! The validated spectrum entity and the assembler that builds it from the
//! fragments of a completed container parse.
//!
//! A [`Spectrum`] can only be obtained through a validating constructor, so the
//! invariants below hold for every value of the type:
//!
//! - `x.len() == y.len() >= 2`
//! - every sample is finite
//! - `x` is strictly ascending or strictly descending throughout

mod assembler;
mod error;
mod types;

#[cfg(test)]
mod tests;

pub use assembler::SpectrumAssembler;
pub use error::AssemblyError;
pub use types::{AxisDirection, AxisUnit, MetadataValue, Spectrum};
