// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Payload recovery after the carrier's low bits are damaged.

mod common;

use common::mono16;
use stegowav::stego::read_header;
use stegowav::{decode, encode, AudioContainer, EmbedParams, Encryptor, ErrorCorrection, NoCredentials, StegoError};

/// First payload amplitude: 66 coded header bytes at one bit each.
const PAYLOAD_START: usize = 528;

fn embed(payload: &[u8], params: EmbedParams, enc: &Encryptor, ecc: ErrorCorrection) -> AudioContainer {
    let mut wav = AudioContainer::from_bytes(&mono16(10_000, 42)).unwrap();
    encode(&mut wav, payload, &params, enc, ecc).unwrap();
    wav
}

#[test]
fn hamming_corrects_single_flip() {
    let mut wav = embed(b"ABCDEF", EmbedParams::new(2, 1).with_redundancy(8), &Encryptor::None, ErrorCorrection::Hamming);
    assert_eq!(read_header(&wav).unwrap().0.payload_size, 9);

    wav.samples_mut()[PAYLOAD_START] ^= 1;
    assert_eq!(decode(&wav, None, None, &mut NoCredentials).unwrap(), b"ABCDEF");
}

#[test]
fn hamming_corrects_one_flip_per_block() {
    let mut wav = embed(b"ABCDEF", EmbedParams::new(2, 1).with_redundancy(4), &Encryptor::None, ErrorCorrection::Hamming);
    // 72 coded bits: six 12-bit blocks of six amplitudes each. Hit a
    // different position in each block.
    for block in 0..6 {
        wav.samples_mut()[PAYLOAD_START + 6 * block + block] ^= 1;
    }
    assert_eq!(decode(&wav, None, None, &mut NoCredentials).unwrap(), b"ABCDEF");
}

#[test]
fn unprotected_payload_is_corrupted() {
    let mut wav = embed(b"ABCDEF", EmbedParams::new(2, 1), &Encryptor::None, ErrorCorrection::None);
    wav.samples_mut()[PAYLOAD_START] ^= 1;
    assert_ne!(decode(&wav, None, None, &mut NoCredentials).unwrap(), b"ABCDEF");
}

#[test]
fn header_survives_single_flips() {
    let mut wav = embed(b"ABCDEF", EmbedParams::new(2, 1), &Encryptor::None, ErrorCorrection::None);
    // One flip in every other 12-bit header block.
    for block in (0..44).step_by(2) {
        wav.samples_mut()[12 * block + 5] ^= 1;
    }
    assert_eq!(decode(&wav, None, None, &mut NoCredentials).unwrap(), b"ABCDEF");
}

#[test]
fn reed_solomon_corrects_many_bytes() {
    let params = EmbedParams::new(2, 1).with_redundancy(16);
    let mut wav = embed(b"ABCDEF", params, &Encryptor::None, ErrorCorrection::ReedSolomon);
    // 6 data + 170 parity bytes; damage 40 of them, one bit each.
    assert_eq!(read_header(&wav).unwrap().0.payload_size, 176);
    for byte in 0..40 {
        wav.samples_mut()[PAYLOAD_START + 4 * byte] ^= 1;
    }
    assert_eq!(decode(&wav, None, None, &mut NoCredentials).unwrap(), b"ABCDEF");
}

#[test]
fn reed_solomon_protects_ciphertext() {
    let enc = Encryptor::token("noisy channel").unwrap();
    let params = EmbedParams::new(1, 1).with_redundancy(8);
    let mut wav = embed(b"authenticated", params, &enc, ErrorCorrection::ReedSolomon);
    for byte in [0usize, 3, 17, 30] {
        wav.samples_mut()[PAYLOAD_START + 8 * byte + 2] ^= 1;
    }
    assert_eq!(decode(&wav, Some(&enc), None, &mut NoCredentials).unwrap(), b"authenticated");
}

#[test]
fn reed_solomon_gives_up_beyond_capacity() {
    let params = EmbedParams::new(1, 1).with_redundancy(8);
    let mut wav = embed(b"ABCDEF", params, &Encryptor::None, ErrorCorrection::ReedSolomon);
    let coded = read_header(&wav).unwrap().0.payload_size as usize;
    for s in &mut wav.samples_mut()[PAYLOAD_START..PAYLOAD_START + 8 * coded] {
        *s ^= 1;
    }
    match decode(&wav, None, None, &mut NoCredentials) {
        Err(StegoError::Integrity(_)) => {}
        Ok(data) => assert_ne!(data, b"ABCDEF"),
        Err(other) => panic!("unexpected error {other:?}"),
    }
}
