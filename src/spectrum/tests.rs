use std::collections::BTreeMap;

use super::*;
use crate::wdf::{
    AxisFragment, Fragment, ImageFragment, IntensityFragment, MetadataFragment, SampleEncoding,
};

fn axis(values: &[f64]) -> Fragment {
    Fragment::Axis(AxisFragment {
        unit: AxisUnit::RamanShift,
        encoding: SampleEncoding::Float64,
        values: values.to_vec(),
    })
}

fn intensity(values: &[f64]) -> Fragment {
    Fragment::Intensity(IntensityFragment {
        encoding: SampleEncoding::Float64,
        values: values.to_vec(),
    })
}

fn metadata(entries: &[(&str, MetadataValue)]) -> Fragment {
    Fragment::Metadata(MetadataFragment {
        entries: entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    })
}

// ==================== Spectrum construction ====================

#[test]
fn test_spectrum_ascending() {
    let spectrum = Spectrum::new(
        AxisUnit::Wavenumber,
        vec![1.0, 2.0, 4.0],
        vec![0.5, 0.6, 0.7],
        BTreeMap::new(),
    )
    .unwrap();

    assert_eq!(spectrum.len(), 3);
    assert_eq!(spectrum.direction(), AxisDirection::Ascending);
    assert!((spectrum.mean_spacing() - 1.5).abs() < 1e-12);
    assert_eq!(spectrum.points().nth(2), Some((4.0, 0.7)));
}

#[test]
fn test_spectrum_descending() {
    let spectrum = Spectrum::new(
        AxisUnit::RamanShift,
        vec![300.0, 200.0, 100.0],
        vec![1.0, 2.0, 3.0],
        BTreeMap::new(),
    )
    .unwrap();

    assert_eq!(spectrum.direction(), AxisDirection::Descending);
    assert!((spectrum.mean_spacing() - 100.0).abs() < 1e-12);
}

#[test]
fn test_spectrum_rejects_single_sample() {
    let err = Spectrum::new(AxisUnit::Arbitrary, vec![1.0], vec![1.0], BTreeMap::new())
        .unwrap_err();
    assert!(matches!(err, AssemblyError::InvalidAxis(_)));
}

#[test]
fn test_spectrum_rejects_mixed_direction() {
    let err = Spectrum::new(
        AxisUnit::Arbitrary,
        vec![1.0, 2.0, 1.5],
        vec![0.0; 3],
        BTreeMap::new(),
    )
    .unwrap_err();
    assert!(matches!(err, AssemblyError::InvalidAxis(_)));
}

#[test]
fn test_spectrum_rejects_repeated_axis_value() {
    let err = Spectrum::new(
        AxisUnit::Arbitrary,
        vec![1.0, 2.0, 2.0],
        vec![0.0; 3],
        BTreeMap::new(),
    )
    .unwrap_err();
    assert!(matches!(err, AssemblyError::InvalidAxis(_)));
}

#[test]
fn test_spectrum_rejects_non_finite() {
    let err = Spectrum::new(
        AxisUnit::Arbitrary,
        vec![1.0, f64::NAN],
        vec![0.0; 2],
        BTreeMap::new(),
    )
    .unwrap_err();
    assert!(matches!(err, AssemblyError::InvalidAxis(_)));

    let err = Spectrum::new(
        AxisUnit::Arbitrary,
        vec![1.0, 2.0],
        vec![0.0, f64::INFINITY],
        BTreeMap::new(),
    )
    .unwrap_err();
    assert!(matches!(err, AssemblyError::InvalidIntensity { index: 1, .. }));
}

// ==================== Assembly ====================

#[test]
fn test_assemble_basic() {
    let spectrum = SpectrumAssembler::assemble(vec![
        axis(&[1.0, 2.0, 3.0, 4.0]),
        intensity(&[0.1, 0.2, 5.0, 0.15]),
    ])
    .unwrap();

    assert_eq!(spectrum.x(), &[1.0, 2.0, 3.0, 4.0]);
    assert_eq!(spectrum.y(), &[0.1, 0.2, 5.0, 0.15]);
    assert_eq!(spectrum.unit(), AxisUnit::RamanShift);
    assert!(spectrum.metadata().is_empty());
}

#[test]
fn test_assemble_order_independent() {
    let a = SpectrumAssembler::assemble(vec![axis(&[1.0, 2.0]), intensity(&[3.0, 4.0])]).unwrap();
    let b = SpectrumAssembler::assemble(vec![intensity(&[3.0, 4.0]), axis(&[1.0, 2.0])]).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_assemble_missing_blocks() {
    let err = SpectrumAssembler::assemble(vec![intensity(&[1.0, 2.0])]).unwrap_err();
    assert_eq!(err, AssemblyError::MissingRequiredBlock { block: "axis" });

    let err = SpectrumAssembler::assemble(vec![axis(&[1.0, 2.0])]).unwrap_err();
    assert_eq!(err, AssemblyError::MissingRequiredBlock { block: "intensity" });

    let err = SpectrumAssembler::assemble(Vec::new()).unwrap_err();
    assert!(matches!(err, AssemblyError::MissingRequiredBlock { .. }));
}

#[test]
fn test_assemble_duplicate_axis() {
    let err = SpectrumAssembler::assemble(vec![
        axis(&[1.0, 2.0]),
        axis(&[1.0, 2.0]),
        intensity(&[1.0, 2.0]),
    ])
    .unwrap_err();
    assert_eq!(err, AssemblyError::DuplicateBlock { block: "axis" });
}

#[test]
fn test_assemble_dimension_mismatch() {
    let err = SpectrumAssembler::assemble(vec![
        axis(&[1.0, 2.0, 3.0, 4.0]),
        intensity(&[0.1, 0.2, 5.0]),
    ])
    .unwrap_err();
    assert_eq!(
        err,
        AssemblyError::DimensionMismatch {
            axis: 4,
            intensity: 3
        }
    );
}

#[test]
fn test_metadata_last_write_wins() {
    let spectrum = SpectrumAssembler::assemble(vec![
        metadata(&[
            ("laser", MetadataValue::Float(532.0)),
            ("operator", MetadataValue::Text("a".into())),
        ]),
        axis(&[1.0, 2.0]),
        intensity(&[1.0, 2.0]),
        metadata(&[("laser", MetadataValue::Float(785.0))]),
    ])
    .unwrap();

    assert_eq!(spectrum.metadata().len(), 2);
    assert_eq!(spectrum.metadata()["laser"], MetadataValue::Float(785.0));
    assert_eq!(
        spectrum.metadata()["operator"],
        MetadataValue::Text("a".into())
    );
}

#[test]
fn test_image_does_not_affect_assembly() {
    let with_image = SpectrumAssembler::assemble(vec![
        axis(&[1.0, 2.0]),
        Fragment::Image(ImageFragment {
            width: 2,
            height: 1,
            data: vec![0, 255],
        }),
        intensity(&[1.0, 2.0]),
    ])
    .unwrap();
    let without = SpectrumAssembler::assemble(vec![axis(&[1.0, 2.0]), intensity(&[1.0, 2.0])])
        .unwrap();
    assert_eq!(with_image, without);
}

#[test]
fn test_axis_unit_codes() {
    assert_eq!(AxisUnit::from_code(1), AxisUnit::RamanShift);
    assert_eq!(AxisUnit::from_code(16), AxisUnit::Pixel);
    assert_eq!(AxisUnit::from_code(99), AxisUnit::Other(99));
    assert_eq!(AxisUnit::Other(99).code(), 99);
    assert_eq!(AxisUnit::Nanometre.symbol(), "nm");
}
