//! Property-based tests for decoding and fingerprint extraction

use specfp::fingerprint::{BaselineMethod, FingerprintConfig};
use specfp::spectrum::AxisUnit;
use specfp::wdf::{BlockRegistry, BlockTag, FileBuilder, SampleEncoding};
use specfp::{extract_fingerprint, parse, ErrorKind};

fn axis(len: usize) -> Vec<f64> {
    (0..len).map(|i| 100.0 + i as f64 * 2.0).collect()
}

/// Axis and intensity blocks, optionally with an extra block before slot `at`
/// (0 = before the axis, 1 = between, 2 = after the intensity).
fn build(x: &[f64], y: &[f64], unknown: Option<(usize, BlockTag, Vec<u8>)>) -> Vec<u8> {
    let mut builder = FileBuilder::new();
    for slot in 0..3 {
        if let Some((at, tag, payload)) = &unknown {
            if *at == slot {
                builder = builder.raw_block(*tag, payload.clone());
            }
        }
        builder = match slot {
            0 => builder.axis(AxisUnit::RamanShift, SampleEncoding::Float64, x),
            1 => builder.intensity(SampleEncoding::Float64, y),
            _ => builder,
        };
    }
    builder.build()
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn unregistered_tag() -> impl Strategy<Value = BlockTag> {
        any::<u32>().prop_map(BlockTag).prop_filter("unregistered", |tag| {
            *tag != BlockTag::WDF1 && BlockRegistry::standard().lookup(*tag).is_none()
        })
    }

    fn intensities() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(0.0f64..1000.0, 2..120)
    }

    fn config() -> impl Strategy<Value = FingerprintConfig> {
        (
            1.0f64..100.0,
            0.5f64..20.0,
            0.0f64..20.0,
            prop_oneof![
                Just(BaselineMethod::RollingMin),
                Just(BaselineMethod::AsymmetricSmoothing)
            ],
        )
            .prop_map(|(window, factor, separation, method)| FingerprintConfig {
                smoothing_window: window,
                prominence_factor: factor,
                min_band_separation: separation,
                baseline_method: method,
                ..Default::default()
            })
    }

    proptest! {
        /// Arbitrary bytes must produce an error or a spectrum, never a panic
        #[test]
        fn test_parse_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
            let _ = parse(&bytes);
        }

        /// Arbitrary bytes behind a valid header must not panic either
        #[test]
        fn test_parse_never_panics_after_header(
            count in 0u32..4,
            body in prop::collection::vec(any::<u8>(), 0..512)
        ) {
            let mut bytes = Vec::with_capacity(16 + body.len());
            bytes.extend_from_slice(b"WDF1");
            bytes.extend_from_slice(&1u32.to_le_bytes());
            bytes.extend_from_slice(&count.to_le_bytes());
            bytes.extend_from_slice(&0u32.to_le_bytes());
            bytes.extend_from_slice(&body);
            let _ = parse(&bytes);
        }

        /// An unregistered block anywhere in the file does not change the spectrum
        #[test]
        fn test_unknown_blocks_are_transparent(
            y in intensities(),
            tag in unregistered_tag(),
            payload in prop::collection::vec(any::<u8>(), 0..64),
            at in 0usize..3
        ) {
            let x = axis(y.len());
            let plain = parse(&build(&x, &y, None)).unwrap();
            let extended = parse(&build(&x, &y, Some((at, tag, payload)))).unwrap();
            prop_assert_eq!(plain, extended);
        }

        /// A declared length past the end of the buffer is always CorruptFile
        #[test]
        fn test_overrun_is_corrupt_file(
            y in intensities(),
            tag in unregistered_tag(),
            payload_len in 0usize..32,
            excess in 1u64..1_000_000
        ) {
            let x = axis(y.len());
            let mut bytes = build(&x, &y, Some((2, tag, vec![0; payload_len])));
            let length_at = bytes.len() - payload_len - 8;
            let declared = payload_len as u64 + excess;
            bytes[length_at..length_at + 8].copy_from_slice(&declared.to_le_bytes());

            let err = parse(&bytes).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::CorruptFile);
        }

        /// Bands are well formed and ordered by center
        #[test]
        fn test_bands_sorted_and_finite(y in intensities(), config in config()) {
            let spectrum = parse(&build(&axis(y.len()), &y, None)).unwrap();
            let fingerprint = extract_fingerprint(&spectrum, &config).unwrap();

            for band in fingerprint.iter() {
                prop_assert!(band.center().is_finite());
                prop_assert!(band.width() > 0.0 && band.width().is_finite());
                prop_assert!(band.height() >= 0.0 && band.height().is_finite());
                prop_assert!(band.area() >= 0.0 && band.area().is_finite());
            }
            for pair in fingerprint.bands().windows(2) {
                prop_assert!(pair[0].center() <= pair[1].center());
            }
        }

        /// A constant intensity never produces bands, whatever its value
        #[test]
        fn test_constant_signal_has_no_bands(
            value in -1e6f64..1e6,
            len in 2usize..4000,
            window in 1.0f64..200.0,
            factor in prop_oneof![Just(0.0f64), 0.0f64..20.0],
            method in prop_oneof![
                Just(BaselineMethod::RollingMin),
                Just(BaselineMethod::AsymmetricSmoothing)
            ]
        ) {
            let spectrum = parse(&build(&axis(len), &vec![value; len], None)).unwrap();
            let config = FingerprintConfig {
                smoothing_window: window,
                prominence_factor: factor,
                baseline_method: method,
                ..Default::default()
            };
            let fingerprint = extract_fingerprint(&spectrum, &config).unwrap();
            prop_assert!(fingerprint.is_empty(), "{} bands", fingerprint.len());
        }

        /// Same input and configuration give bitwise identical output
        #[test]
        fn test_extraction_is_deterministic(y in intensities(), config in config()) {
            let spectrum = parse(&build(&axis(y.len()), &y, None)).unwrap();
            let first = extract_fingerprint(&spectrum, &config).unwrap();
            let second = extract_fingerprint(&spectrum, &config).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Axis direction does not affect the result
        #[test]
        fn test_descending_axis_equivalent(y in intensities(), config in config()) {
            let x = axis(y.len());
            let ascending = parse(&build(&x, &y, None)).unwrap();

            let x_rev: Vec<f64> = x.iter().rev().copied().collect();
            let y_rev: Vec<f64> = y.iter().rev().copied().collect();
            let descending = parse(&build(&x_rev, &y_rev, None)).unwrap();

            prop_assert_eq!(
                extract_fingerprint(&ascending, &config).unwrap(),
                extract_fingerprint(&descending, &config).unwrap()
            );
        }
    }
}
