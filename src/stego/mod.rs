// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Steganographic encoding and decoding for PCM WAV carriers.
//!
//! A message is written as two regions of the carrier's amplitude stream:
//!
//! - **Header**: a fixed 44-byte record, Hamming-coded and embedded at one
//!   LSB per amplitude from amplitude 0. It records the payload's embedding
//!   parameters, its error-correction and encryption strategies, the KDF salt
//!   and nonce, and the coded payload length.
//! - **Payload**: `encrypt` then `error-correct`, embedded at the caller's
//!   `lsb_count` and `stride` directly after the header, optionally repeated
//!   to fill the carrier.
//!
//! Because the header is self-describing, [`decode`] needs nothing but the
//! carrier and, for encrypted messages, a [`CredentialSource`].

pub mod bits;
pub mod capacity;
pub mod crypto;
pub mod ecc;
pub mod embedding;
pub mod encryptor;
pub mod error;
pub mod header;
pub mod message;
mod pipeline;
pub mod repetition;

pub use capacity::max_payload_len;
pub use ecc::ErrorCorrection;
pub use embedding::DataChunk;
pub use encryptor::{CredentialSource, Credentials, EncryptionKind, Encryptor, HashKind, NoCredentials};
pub use error::StegoError;
pub use header::MessageHeader;
pub use pipeline::{decode, decode_repeated, decode_wav, encode, encode_wav, read_header, EmbedParams, EncodeReport};
