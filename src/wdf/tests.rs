use super::*;
use crate::spectrum::{AxisUnit, MetadataValue};
use chrono::{TimeZone, Utc};

fn scenario_builder() -> FileBuilder {
    FileBuilder::new()
        .axis(
            AxisUnit::RamanShift,
            SampleEncoding::Float64,
            &[1.0, 2.0, 3.0, 4.0],
        )
        .intensity(SampleEncoding::Float64, &[0.1, 0.2, 5.0, 0.15])
}

fn parse(buffer: &[u8]) -> Result<ParsedFile, ParseError> {
    parse_blocks(buffer, BlockRegistry::standard())
}

// ==================== Header ====================

#[test]
fn test_header_fields() {
    let buffer = scenario_builder().flags(0x5).build();
    let parsed = parse(&buffer).unwrap();

    assert_eq!(parsed.header.version, MAX_SUPPORTED_VERSION);
    assert_eq!(parsed.header.block_count, 2);
    assert_eq!(parsed.header.flags, 0x5);
    assert_eq!(parsed.blocks.len(), 2);
    assert_eq!(parsed.blocks[0].offset, FILE_HEADER_LEN);
}

#[test]
fn test_bad_magic() {
    let mut buffer = scenario_builder().build();
    buffer[0..4].copy_from_slice(b"RIFF");

    let err = parse(&buffer).unwrap_err();
    assert_eq!(
        err,
        ParseError::BadMagic {
            found: BlockTag::from_ascii(b"RIFF")
        }
    );
}

#[test]
fn test_unsupported_version() {
    let buffer = scenario_builder().version(MAX_SUPPORTED_VERSION + 1).build();
    let err = parse(&buffer).unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedVersion { version, .. } if version == MAX_SUPPORTED_VERSION + 1));

    let buffer = scenario_builder().version(0).build();
    assert!(matches!(
        parse(&buffer).unwrap_err(),
        ParseError::UnsupportedVersion { version: 0, .. }
    ));
}

#[test]
fn test_empty_and_short_buffers() {
    assert!(matches!(
        parse(&[]).unwrap_err(),
        ParseError::UnexpectedEndOfData { offset: 0, .. }
    ));

    let buffer = scenario_builder().build();
    assert!(matches!(
        parse(&buffer[..10]).unwrap_err(),
        ParseError::UnexpectedEndOfData { .. }
    ));
}

#[test]
fn test_header_only_is_done() {
    let buffer = FileBuilder::new().build();
    let parsed = parse(&buffer).unwrap();
    assert!(parsed.fragments.is_empty());

    let buffer = FileBuilder::new().streamed(true).build();
    let parsed = parse(&buffer).unwrap();
    assert!(parsed.header.is_streamed());
    assert!(parsed.fragments.is_empty());
}

// ==================== Block framing ====================

#[test]
fn test_declared_length_overrun_is_corrupt_file() {
    let mut buffer = FileBuilder::new().streamed(true).build();
    buffer.extend_from_slice(&BlockTag::DATA.0.to_le_bytes());
    buffer.extend_from_slice(&0u32.to_le_bytes());
    buffer.extend_from_slice(&1000u64.to_le_bytes());
    buffer.extend_from_slice(&[0u8; 10]);

    let err = parse(&buffer).unwrap_err();
    assert_eq!(
        err,
        ParseError::CorruptFile {
            tag: BlockTag::DATA,
            offset: FILE_HEADER_LEN,
            declared: 1000,
            remaining: 10,
        }
    );
}

#[test]
fn test_overrun_on_unknown_tag_is_corrupt_file() {
    let mut buffer = FileBuilder::new().streamed(true).build();
    buffer.extend_from_slice(b"ZZZZ");
    buffer.extend_from_slice(&0u32.to_le_bytes());
    buffer.extend_from_slice(&u64::MAX.to_le_bytes());

    assert!(matches!(
        parse(&buffer).unwrap_err(),
        ParseError::CorruptFile { declared: u64::MAX, remaining: 0, .. }
    ));
}

#[test]
fn test_truncated_block_header() {
    let mut buffer = scenario_builder().streamed(true).build();
    buffer.extend_from_slice(&[1, 2, 3]);

    assert!(matches!(
        parse(&buffer).unwrap_err(),
        ParseError::UnexpectedEndOfData { needed: 4, remaining: 3, .. }
    ));
}

#[test]
fn test_counted_mode_missing_blocks() {
    let mut buffer = scenario_builder().build();
    // Claim one more block than present
    buffer[8..12].copy_from_slice(&3u32.to_le_bytes());

    assert!(matches!(
        parse(&buffer).unwrap_err(),
        ParseError::UnexpectedEndOfData { .. }
    ));
}

#[test]
fn test_counted_mode_ignores_trailing_bytes() {
    let mut buffer = scenario_builder().build();
    let clean = parse(&buffer).unwrap();
    buffer.extend_from_slice(&[0xAB; 7]);

    let parsed = parse(&buffer).unwrap();
    assert_eq!(parsed.fragments, clean.fragments);
}

#[test]
fn test_unknown_block_is_skipped() {
    let buffer = FileBuilder::new()
        .raw_block(BlockTag::from_ascii(b"WMAP"), vec![7u8; 16])
        .raw_block(BlockTag::YLST, Vec::new())
        .build();

    let parsed = parse(&buffer).unwrap();
    assert_eq!(parsed.fragments.len(), 2);
    match &parsed.fragments[0] {
        Fragment::Unknown(unknown) => {
            assert_eq!(unknown.tag.to_string(), "WMAP");
            assert_eq!(unknown.length, 16);
            assert_eq!(unknown.offset, FILE_HEADER_LEN);
            assert_eq!(unknown.uid, 0);
        }
        other => panic!("expected unknown fragment, got {:?}", other),
    }
    assert!(parsed.blocks.iter().all(|b| b.decoder.is_none()));
}

// ==================== Payload decoding ====================

#[test]
fn test_axis_and_intensity_decode() {
    let parsed = parse(&scenario_builder().build()).unwrap();

    match &parsed.fragments[0] {
        Fragment::Axis(axis) => {
            assert_eq!(axis.unit, AxisUnit::RamanShift);
            assert_eq!(axis.values, vec![1.0, 2.0, 3.0, 4.0]);
        }
        other => panic!("expected axis, got {:?}", other),
    }
    match &parsed.fragments[1] {
        Fragment::Intensity(intensity) => {
            assert_eq!(intensity.values, vec![0.1, 0.2, 5.0, 0.15]);
        }
        other => panic!("expected intensity, got {:?}", other),
    }
    assert_eq!(parsed.blocks[0].decoder, Some("axis"));
}

#[test]
fn test_float32_samples() {
    let buffer = FileBuilder::new()
        .intensity(SampleEncoding::Float32, &[1.5, -2.25])
        .build();
    let parsed = parse(&buffer).unwrap();

    match &parsed.fragments[0] {
        Fragment::Intensity(intensity) => {
            assert_eq!(intensity.encoding, SampleEncoding::Float32);
            assert_eq!(intensity.values, vec![1.5, -2.25]);
        }
        other => panic!("expected intensity, got {:?}", other),
    }
}

#[test]
fn test_sample_count_mismatch_is_corrupt_block() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&2u32.to_le_bytes());
    payload.extend_from_slice(&3u64.to_le_bytes());
    payload.extend_from_slice(&1.0f64.to_le_bytes());
    let buffer = FileBuilder::new().raw_block(BlockTag::DATA, payload).build();

    match parse(&buffer).unwrap_err() {
        ParseError::CorruptBlock { tag, offset, reason } => {
            assert_eq!(tag, BlockTag::DATA);
            assert_eq!(offset, FILE_HEADER_LEN);
            assert!(reason.contains("3 samples"), "{}", reason);
        }
        other => panic!("expected corrupt block, got {:?}", other),
    }
}

#[test]
fn test_short_payload_is_corrupt_block() {
    let buffer = FileBuilder::new()
        .raw_block(BlockTag::XLST, vec![0u8; 4])
        .build();
    assert!(matches!(
        parse(&buffer).unwrap_err(),
        ParseError::CorruptBlock { tag: BlockTag::XLST, .. }
    ));
}

#[test]
fn test_unknown_encoding_is_corrupt_block() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&9u32.to_le_bytes());
    payload.extend_from_slice(&0u64.to_le_bytes());
    let buffer = FileBuilder::new().raw_block(BlockTag::DATA, payload).build();

    match parse(&buffer).unwrap_err() {
        ParseError::CorruptBlock { reason, .. } => assert!(reason.contains("encoding")),
        other => panic!("expected corrupt block, got {:?}", other),
    }
}

#[test]
fn test_unknown_axis_unit_is_preserved() {
    let mut payload = Vec::new();
    payload.extend_from_slice(&42u32.to_le_bytes());
    payload.extend_from_slice(&SampleEncoding::Float64.code().to_le_bytes());
    payload.extend_from_slice(&2u64.to_le_bytes());
    payload.extend_from_slice(&1.0f64.to_le_bytes());
    payload.extend_from_slice(&2.0f64.to_le_bytes());
    let buffer = FileBuilder::new().raw_block(BlockTag::XLST, payload).build();

    match &parse(&buffer).unwrap().fragments[0] {
        Fragment::Axis(axis) => assert_eq!(axis.unit, AxisUnit::Other(42)),
        other => panic!("expected axis, got {:?}", other),
    }
}

#[test]
fn test_property_set_decode() {
    let time = Utc.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
    let buffer = FileBuilder::new()
        .properties(&[
            ("operator", MetadataValue::Text("lab-7".into())),
            ("laser_nm", MetadataValue::Float(532.0)),
            ("accumulations", MetadataValue::Integer(-3)),
            ("time_start", MetadataValue::Timestamp(time)),
        ])
        .build();

    match &parse(&buffer).unwrap().fragments[0] {
        Fragment::Metadata(metadata) => {
            assert_eq!(metadata.entries.len(), 4);
            assert_eq!(metadata.entries[0].1, MetadataValue::Text("lab-7".into()));
            assert_eq!(metadata.entries[1].1, MetadataValue::Float(532.0));
            assert_eq!(metadata.entries[2].1, MetadataValue::Integer(-3));
            assert_eq!(metadata.entries[3].1, MetadataValue::Timestamp(time));
        }
        other => panic!("expected metadata, got {:?}", other),
    }
}

#[test]
fn test_property_set_structural_checks() {
    // Unknown value kind
    let mut payload = Vec::new();
    payload.extend_from_slice(&1u32.to_le_bytes());
    payload.extend_from_slice(&1u32.to_le_bytes());
    payload.extend_from_slice(b"k");
    payload.extend_from_slice(&77u32.to_le_bytes());
    let buffer = FileBuilder::new().raw_block(BlockTag::PSET, payload).build();
    assert!(matches!(
        parse(&buffer).unwrap_err(),
        ParseError::CorruptBlock { tag: BlockTag::PSET, .. }
    ));

    // Key length overruns the payload
    let mut payload = Vec::new();
    payload.extend_from_slice(&1u32.to_le_bytes());
    payload.extend_from_slice(&100u32.to_le_bytes());
    payload.extend_from_slice(b"short");
    let buffer = FileBuilder::new().raw_block(BlockTag::PSET, payload).build();
    assert!(matches!(
        parse(&buffer).unwrap_err(),
        ParseError::CorruptBlock { .. }
    ));

    // Invalid UTF-8 key
    let mut payload = Vec::new();
    payload.extend_from_slice(&1u32.to_le_bytes());
    payload.extend_from_slice(&2u32.to_le_bytes());
    payload.extend_from_slice(&[0xFF, 0xFE]);
    payload.extend_from_slice(&1u32.to_le_bytes());
    payload.extend_from_slice(&1.0f64.to_le_bytes());
    let buffer = FileBuilder::new().raw_block(BlockTag::PSET, payload).build();
    match parse(&buffer).unwrap_err() {
        ParseError::CorruptBlock { reason, .. } => assert!(reason.contains("UTF-8")),
        other => panic!("expected corrupt block, got {:?}", other),
    }

    // Trailing bytes after the declared entries
    let mut payload = Vec::new();
    payload.extend_from_slice(&0u32.to_le_bytes());
    payload.push(0);
    let buffer = FileBuilder::new().raw_block(BlockTag::PSET, payload).build();
    assert!(matches!(
        parse(&buffer).unwrap_err(),
        ParseError::CorruptBlock { .. }
    ));
}

#[test]
fn test_comment_and_image() {
    let buffer = FileBuilder::new()
        .comment("polystyrene reference\0\0")
        .image(2, 2, &[1, 2, 3, 4])
        .build();
    let parsed = parse(&buffer).unwrap();

    match &parsed.fragments[0] {
        Fragment::Metadata(metadata) => assert_eq!(
            metadata.entries,
            vec![(
                COMMENT_KEY.to_string(),
                MetadataValue::Text("polystyrene reference".into())
            )]
        ),
        other => panic!("expected metadata, got {:?}", other),
    }
    match &parsed.fragments[1] {
        Fragment::Image(image) => {
            assert_eq!((image.width, image.height), (2, 2));
            assert_eq!(image.data, vec![1, 2, 3, 4]);
        }
        other => panic!("expected image, got {:?}", other),
    }
}

// ==================== Registry ====================

#[test]
fn test_standard_registry_contents() {
    let registry = BlockRegistry::standard();
    assert_eq!(registry.len(), 5);
    assert!(registry.lookup(BlockTag::XLST).is_some());
    assert!(registry.lookup(BlockTag::DATA).is_some());
    assert!(registry.lookup(BlockTag::YLST).is_none());
    assert!(std::ptr::eq(registry, BlockRegistry::standard()));
}

#[test]
fn test_custom_registry_decodes_new_tag() {
    fn decode_map(block: &RawBlock<'_>) -> Result<Fragment, BlockDecodeError> {
        Ok(Fragment::Metadata(MetadataFragment {
            entries: vec![(
                "map_bytes".to_string(),
                MetadataValue::Integer(block.payload.len() as i64),
            )],
        }))
    }

    let tag = BlockTag::from_ascii(b"WMAP");
    let registry = BlockRegistry::builder()
        .with_standard_blocks()
        .register(tag, DecoderEntry::new("map area", 0, decode_map))
        .build();
    let buffer = FileBuilder::new().raw_block(tag, vec![0u8; 12]).build();

    let parsed = parse_blocks(&buffer, &registry).unwrap();
    assert_eq!(parsed.fragments[0].kind(), FragmentKind::Metadata);

    // The standard registry still skips it
    let parsed = parse(&buffer).unwrap();
    assert_eq!(parsed.fragments[0].kind(), FragmentKind::Unknown);
}

#[test]
fn test_unregistered_standard_tag_is_skipped() {
    let registry = BlockRegistry::builder()
        .with_standard_blocks()
        .unregister(BlockTag::WHTL)
        .build();
    // Too short for the image decoder
    let payload = vec![0u8; 2];
    let buffer = FileBuilder::new().raw_block(BlockTag::WHTL, payload).build();

    assert!(parse(&buffer).is_err());
    let parsed = parse_blocks(&buffer, &registry).unwrap();
    assert_eq!(parsed.fragments[0].kind(), FragmentKind::Unknown);
}

// ==================== State machine ====================

#[test]
fn test_state_sequence() {
    let buffer = FileBuilder::new()
        .axis(AxisUnit::Nanometre, SampleEncoding::Float64, &[1.0, 2.0])
        .raw_block(BlockTag::from_ascii(b"NEW1"), vec![0u8; 16])
        .build();
    let registry = BlockRegistry::standard();
    let mut parser = FileParser::new(&buffer, registry);

    let mut names = vec![parser.state().name()];
    while !parser.state().is_terminal() {
        names.push(parser.step().name());
    }

    assert_eq!(
        names,
        vec![
            "Start",
            "ReadHeader",
            "ReadBlockHeader",
            "DecodeBlock",
            "ReadBlockHeader",
            "SkipBlock",
            "Done"
        ]
    );
    assert_eq!(parser.fragments().len(), 2);
    assert_eq!(parser.header().map(|h| h.block_count), Some(2));

    // Terminal states are sticky
    assert_eq!(parser.step().name(), "Done");
}

#[test]
fn test_failed_state_carries_error() {
    let buffer = scenario_builder().version(9).build();
    let mut parser = FileParser::new(&buffer, BlockRegistry::standard());

    match parser.step() {
        ParserState::Failed(ParseError::UnsupportedVersion { version: 9, .. }) => {}
        other => panic!("expected failed state, got {}", other.name()),
    }
    assert!(parser.step().is_terminal());
    assert!(parser.fragments().is_empty());
}
