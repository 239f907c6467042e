// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Message framing: encrypt, error-correct and describe a payload.
//!
//! Encode order is strictly `encrypt` then `error-correct`; decode is the
//! exact reverse. The header records the coded length, not the plaintext
//! length.

use crate::stego::ecc::ErrorCorrection;
use crate::stego::embedding::DataChunk;
use crate::stego::encryptor::{CredentialSource, Encryptor};
use crate::stego::error::StegoError;
use crate::stego::header::{MessageHeader, HEADER_LSB_COUNT, HEADER_STRIDE};

/// A payload ready to embed.
#[derive(Debug, Clone)]
pub struct FramedMessage {
    pub header: MessageHeader,
    /// Encryptor output, before error correction.
    pub ciphertext: Vec<u8>,
    /// Coded header, at the protocol-fixed width and stride.
    pub header_chunk: DataChunk,
    /// Encrypted and error-corrected payload, at the caller's width and stride.
    pub payload_chunk: DataChunk,
}

/// Build the header and payload chunks for `payload`.
pub fn encode_message(
    payload: &[u8],
    lsb_count: u8,
    stride: u16,
    redundancy_bits: u16,
    encryptor: &Encryptor,
    error_correction: ErrorCorrection,
) -> Result<FramedMessage, StegoError> {
    let ciphertext = encryptor.encrypt(payload)?;
    let coded = error_correction.encode(&ciphertext, redundancy_bits)?;
    let payload_size = u32::try_from(coded.len())
        .map_err(|_| StegoError::config(format!("coded payload of {} bytes exceeds the header's u32 size", coded.len())))?;

    let header = MessageHeader::for_payload(lsb_count, stride, redundancy_bits, error_correction, encryptor, payload_size);
    log::debug!(
        "framed {} plaintext bytes -> {} ciphertext -> {} coded ({error_correction}, {redundancy_bits} bits/byte)",
        payload.len(),
        ciphertext.len(),
        coded.len()
    );
    Ok(FramedMessage {
        header_chunk: DataChunk::new(header.encode()?, HEADER_LSB_COUNT, HEADER_STRIDE),
        payload_chunk: DataChunk::new(coded, lsb_count, stride),
        header,
        ciphertext,
    })
}

/// Parse a coded header.
///
/// # Errors
/// [`StegoError::Integrity`] if error correction cannot recover a valid record.
pub fn decode_header(header_bytes: &[u8]) -> Result<MessageHeader, StegoError> {
    MessageHeader::decode(header_bytes)
}

/// Resolve the strategy to use for a header: the caller's, which must match,
/// or the header's own.
pub fn resolve_error_correction(
    header: &MessageHeader,
    error_correction: Option<ErrorCorrection>,
) -> Result<ErrorCorrection, StegoError> {
    match error_correction {
        Some(ecc) if ecc != header.error_correction => Err(StegoError::config(format!(
            "message was coded with {}, not {ecc}",
            header.error_correction
        ))),
        _ => Ok(header.error_correction),
    }
}

/// Undo the error correction. Yields the ciphertext.
pub fn remove_error_correction(
    header: &MessageHeader,
    payload_bytes: &[u8],
    error_correction: Option<ErrorCorrection>,
) -> Result<Vec<u8>, StegoError> {
    resolve_error_correction(header, error_correction)?.decode(payload_bytes, header.redundancy_bits)
}

/// Recover the plaintext from a parsed header and its extracted payload.
///
/// Without an explicit `encryptor` one is rebuilt from the header, asking
/// `credentials` for the passphrase or secret key.
pub fn decode_message(
    header: &MessageHeader,
    payload_bytes: &[u8],
    encryptor: Option<&Encryptor>,
    error_correction: Option<ErrorCorrection>,
    credentials: &mut dyn CredentialSource,
) -> Result<Vec<u8>, StegoError> {
    // Check the strategy before any ECC work or credential prompt.
    if let Some(enc) = encryptor {
        if enc.kind() != header.encryption_kind {
            return Err(StegoError::config(format!(
                "message was encrypted with {:?}, not {:?}",
                header.encryption_kind,
                enc.kind()
            )));
        }
    }
    let ciphertext = remove_error_correction(header, payload_bytes, error_correction)?;
    match encryptor {
        Some(enc) => enc.decrypt(&ciphertext),
        None => Encryptor::from_header(header, credentials)?.decrypt(&ciphertext),
    }
}
