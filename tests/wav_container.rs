// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Integration tests for WAV parsing and byte-exact re-serialization.

mod common;

use common::{mono16, noise_samples, WavBuilder};
use stegowav::{AudioContainer, Endianness, WavError};

#[test]
fn passthrough_is_byte_exact() {
    let original = mono16(10_000, 1);
    let wav = AudioContainer::from_bytes(&original).unwrap();
    assert_eq!(wav.to_bytes(), original);
}

#[test]
fn passthrough_with_extra_chunks() {
    let original = WavBuilder::new(2, 48_000, 16)
        .noise(2_000, 2)
        .chunk_before_data(b"fact", &[1, 2, 3, 4])
        .chunk_before_data(b"junk", b"odd")
        .chunk_after_data(b"LIST", b"INFOISFT\x05\x00\x00\x00test\x00")
        .build();
    let wav = AudioContainer::from_bytes(&original).unwrap();
    assert_eq!(wav.extra_chunks().len(), 2);
    assert_eq!(&wav.extra_chunks()[1].tag, b"junk");
    assert_eq!(wav.extra_chunks()[1].pad, Some(0));
    assert_eq!(wav.num_amplitudes(), 2_000);
    assert_eq!(wav.to_bytes(), original);
}

#[test]
fn every_supported_width_parses() {
    for bits in [8u16, 16, 32] {
        let samples = noise_samples(501, bits, bits as u64);
        let bytes = WavBuilder::new(1, 8_000, bits).samples(samples.clone()).build();
        let wav = AudioContainer::from_bytes(&bytes).unwrap();
        assert_eq!(wav.bits_per_sample(), bits);
        assert_eq!(wav.samples(), &samples[..], "bits={bits}");
        assert_eq!(wav.to_bytes(), bytes, "bits={bits}");
    }
}

#[test]
fn rifx_samples_are_big_endian() {
    let samples = noise_samples(300, 16, 7);
    let bytes = WavBuilder::new(1, 22_050, 16).samples(samples.clone()).big_endian().build();
    let wav = AudioContainer::from_bytes(&bytes).unwrap();
    assert_eq!(wav.endianness(), Endianness::Big);
    assert_eq!(wav.samples(), &samples[..]);
    assert_eq!(wav.to_bytes(), bytes);
}

#[test]
fn header_fields_exposed() {
    let bytes = WavBuilder::new(2, 44_100, 16).noise(44_100 * 2, 3).build();
    let wav = AudioContainer::from_bytes(&bytes).unwrap();
    assert_eq!(wav.channels(), 2);
    assert_eq!(wav.sample_rate(), 44_100);
    assert_eq!(wav.block_align(), 4);
    assert_eq!(wav.byte_rate(), 176_400);
    assert_eq!(wav.num_frames(), 44_100);
    assert!((wav.duration_secs() - 1.0).abs() < 1e-9);
}

#[test]
fn missing_tags_are_format_errors() {
    let good = mono16(100, 4);

    let mut bad = good.clone();
    bad[..4].copy_from_slice(b"RIFQ");
    let err = AudioContainer::from_bytes(&bad).unwrap_err();
    assert!(matches!(err, WavError::BadTag { .. }));
    assert!(err.is_format_error());

    let mut bad = good.clone();
    bad[8..12].copy_from_slice(b"AVI ");
    assert!(matches!(AudioContainer::from_bytes(&bad), Err(WavError::BadTag { .. })));

    // No data chunk at all.
    assert!(matches!(AudioContainer::from_bytes(&good[..36]), Err(WavError::UnexpectedEof)));
}

#[test]
fn unsupported_formats_rejected() {
    let good = mono16(100, 5);

    // 24 bits per sample.
    let mut bad = good.clone();
    bad[34..36].copy_from_slice(&24u16.to_le_bytes());
    assert!(matches!(AudioContainer::from_bytes(&bad), Err(WavError::UnsupportedFormat(_))));

    // Three channels.
    let mut bad = good.clone();
    bad[22..24].copy_from_slice(&3u16.to_le_bytes());
    assert!(matches!(AudioContainer::from_bytes(&bad), Err(WavError::UnsupportedFormat(_))));

    // Byte rate inconsistent with the rest.
    let mut bad = good;
    bad[28..32].copy_from_slice(&1u32.to_le_bytes());
    assert!(matches!(AudioContainer::from_bytes(&bad), Err(WavError::InvalidField(_))));
}

#[test]
fn write_refuses_to_overwrite() {
    let dir = std::env::temp_dir().join(format!("stegowav-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("out.wav");
    let _ = std::fs::remove_file(&path);

    let wav = AudioContainer::from_bytes(&mono16(64, 6)).unwrap();
    wav.write_to_path(&path, false).unwrap();
    assert!(matches!(wav.write_to_path(&path, false), Err(WavError::Overwrite(_))));
    wav.write_to_path(&path, true).unwrap();
    assert_eq!(AudioContainer::from_path(&path).unwrap().to_bytes(), wav.to_bytes());

    std::fs::remove_dir_all(&dir).unwrap();
}
