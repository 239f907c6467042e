// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! # stegowav
//!
//! LSB steganography for uncompressed PCM WAV audio. A payload is encrypted,
//! protected by an error-correcting code and written into the low bits of
//! the carrier's sample amplitudes, preceded by a self-describing header.
//!
//! The WAV codec (`wav` module) depends only on `byteorder`. The
//! steganography layer (`stego` module) adds AES-256-GCM-SIV encryption,
//! passphrase key derivation (Argon2id, PBKDF2 or scrypt), X25519 sealed
//! boxes, Hamming and Reed-Solomon error correction.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use stegowav::{decode_wav, encode_wav, Credentials, EmbedParams, Encryptor, ErrorCorrection};
//!
//! let carrier = std::fs::read("song.wav").unwrap();
//! let enc = Encryptor::token("passphrase").unwrap();
//! let params = EmbedParams::default().with_redundancy(8);
//! let stego = encode_wav(&carrier, b"secret", &params, &enc, ErrorCorrection::Hamming).unwrap();
//!
//! // The header names the strategies; only the passphrase is needed.
//! let mut creds = Credentials::with_passphrase("passphrase");
//! let message = decode_wav(&stego, None, None, &mut creds).unwrap();
//! assert_eq!(message, b"secret");
//! ```

pub mod stego;
pub mod wav;

pub use stego::{
    decode, decode_repeated, decode_wav, encode, encode_wav, max_payload_len, CredentialSource, Credentials,
    DataChunk, EmbedParams, EncodeReport, EncryptionKind, Encryptor, ErrorCorrection, HashKind, MessageHeader,
    NoCredentials, StegoError,
};
pub use wav::{AudioContainer, Endianness, FormatChunk, RawChunk, WavError};
