// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Message header wire format.
//!
//! ```text
//! [lsb_count: 1][stride: 2 LE][redundancy_bits: 2 LE][ecc: 1][enc: 1][hash: 1]
//! [salt: 16][nonce: 16][payload_size: 4 LE]
//! ```
//!
//! The 44-byte record is Hamming-coded with a fixed budget and embedded at
//! amplitude 0 with one LSB per amplitude and no stride, so it can be read
//! before anything about the payload is known.

use std::io::Cursor;

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};

use crate::stego::ecc::{hamming, ErrorCorrection};
use crate::stego::encryptor::{EncryptionKind, Encryptor, HashKind};
use crate::stego::error::StegoError;

/// LSBs per amplitude used for the header region.
pub const HEADER_LSB_COUNT: u8 = 1;
/// Stride used for the header region.
pub const HEADER_STRIDE: u16 = 1;
/// Strategy protecting the header.
pub const HEADER_ERROR_CORRECTION: ErrorCorrection = ErrorCorrection::Hamming;
/// Redundancy budget for the header.
pub const HEADER_REDUNDANCY_BITS: u16 = 4;

pub const SALT_LEN: usize = 16;
pub const HEADER_NONCE_LEN: usize = 16;

/// Plain header length in bytes.
pub const HEADER_LEN: usize = 1 + 2 + 2 + 1 + 1 + 1 + SALT_LEN + HEADER_NONCE_LEN + 4;
/// Header length after Hamming coding (12 bits per byte).
pub const HEADER_CODED_LEN: usize = HEADER_LEN * 12 / 8;

/// Salt/nonce filler for strategies that have none.
pub const PLACEHOLDER: [u8; 16] = *b"stegowav-nosalt\0";

/// Decoded header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub lsb_count: u8,
    pub stride: u16,
    pub redundancy_bits: u16,
    pub error_correction: ErrorCorrection,
    pub encryption_kind: EncryptionKind,
    pub hash_kind: HashKind,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; HEADER_NONCE_LEN],
    /// Length of the coded payload in bytes (one copy).
    pub payload_size: u32,
}

impl MessageHeader {
    /// Describe a payload produced with these parameters and strategies.
    pub fn for_payload(
        lsb_count: u8,
        stride: u16,
        redundancy_bits: u16,
        error_correction: ErrorCorrection,
        encryptor: &Encryptor,
        payload_size: u32,
    ) -> Self {
        Self {
            lsb_count,
            stride,
            redundancy_bits,
            error_correction,
            encryption_kind: encryptor.kind(),
            hash_kind: encryptor.hash_kind(),
            salt: encryptor.salt().unwrap_or(PLACEHOLDER),
            nonce: encryptor.nonce().unwrap_or(PLACEHOLDER),
            payload_size,
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0] = self.lsb_count;
        LittleEndian::write_u16(&mut buf[1..3], self.stride);
        LittleEndian::write_u16(&mut buf[3..5], self.redundancy_bits);
        buf[5] = self.error_correction.id();
        buf[6] = self.encryption_kind.id();
        buf[7] = self.hash_kind.id();
        buf[8..8 + SALT_LEN].copy_from_slice(&self.salt);
        buf[24..24 + HEADER_NONCE_LEN].copy_from_slice(&self.nonce);
        LittleEndian::write_u32(&mut buf[40..44], self.payload_size);
        buf
    }

    /// Parse and range-check a plain header record.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StegoError> {
        if bytes.len() != HEADER_LEN {
            return Err(StegoError::integrity(format!(
                "header is {} bytes, expected {HEADER_LEN}",
                bytes.len()
            )));
        }
        let mut r = Cursor::new(bytes);
        let short = |_| StegoError::integrity("header record truncated");
        let lsb_count = r.read_u8().map_err(short)?;
        let stride = r.read_u16::<LittleEndian>().map_err(short)?;
        let redundancy_bits = r.read_u16::<LittleEndian>().map_err(short)?;
        let ecc_id = r.read_u8().map_err(short)?;
        let enc_id = r.read_u8().map_err(short)?;
        let hash_id = r.read_u8().map_err(short)?;
        let mut salt = [0u8; SALT_LEN];
        std::io::Read::read_exact(&mut r, &mut salt).map_err(short)?;
        let mut nonce = [0u8; HEADER_NONCE_LEN];
        std::io::Read::read_exact(&mut r, &mut nonce).map_err(short)?;
        let payload_size = r.read_u32::<LittleEndian>().map_err(short)?;

        let error_correction = ErrorCorrection::from_id(ecc_id)
            .ok_or_else(|| StegoError::integrity(format!("unknown error-correction id {ecc_id}")))?;
        let encryption_kind = EncryptionKind::from_id(enc_id)
            .ok_or_else(|| StegoError::integrity(format!("unknown encryption id {enc_id}")))?;
        let hash_kind =
            HashKind::from_id(hash_id).ok_or_else(|| StegoError::integrity(format!("unknown hash id {hash_id}")))?;

        if lsb_count == 0 || lsb_count > 32 {
            return Err(StegoError::integrity(format!("header lsb_count {lsb_count} out of range")));
        }
        if stride == 0 {
            return Err(StegoError::integrity("header stride is zero"));
        }
        error_correction
            .validate(redundancy_bits)
            .map_err(|_| StegoError::integrity(format!("header redundancy {redundancy_bits} invalid for {error_correction}")))?;

        Ok(Self {
            lsb_count,
            stride,
            redundancy_bits,
            error_correction,
            encryption_kind,
            hash_kind,
            salt,
            nonce,
            payload_size,
        })
    }

    /// Serialize and apply the header error correction.
    pub fn encode(&self) -> Result<Vec<u8>, StegoError> {
        HEADER_ERROR_CORRECTION.encode(&self.to_bytes(), HEADER_REDUNDANCY_BITS)
    }

    /// Inverse of [`encode`](Self::encode).
    ///
    /// # Errors
    /// [`StegoError::Integrity`] if the code cannot recover a valid record.
    pub fn decode(coded: &[u8]) -> Result<Self, StegoError> {
        let plain = HEADER_ERROR_CORRECTION.decode(coded, HEADER_REDUNDANCY_BITS)?;
        Self::from_bytes(&plain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MessageHeader {
        MessageHeader {
            lsb_count: 2,
            stride: 3,
            redundancy_bits: 8,
            error_correction: ErrorCorrection::Hamming,
            encryption_kind: EncryptionKind::Block,
            hash_kind: HashKind::Argon2id,
            salt: [0xAA; SALT_LEN],
            nonce: [0x55; HEADER_NONCE_LEN],
            payload_size: 0x0102_0304,
        }
    }

    #[test]
    fn sizes() {
        assert_eq!(HEADER_LEN, 44);
        assert_eq!(HEADER_CODED_LEN, 66);
        assert_eq!(hamming::encoded_len(HEADER_LEN), HEADER_CODED_LEN);
    }

    #[test]
    fn byte_layout_is_little_endian() {
        let bytes = sample().to_bytes();
        assert_eq!(&bytes[..8], &[2, 3, 0, 8, 0, 1, 2, 1]);
        assert_eq!(&bytes[40..], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(MessageHeader::from_bytes(&bytes).unwrap(), sample());
    }

    #[test]
    fn coded_roundtrip_survives_flips() {
        let coded = sample().encode().unwrap();
        assert_eq!(coded.len(), HEADER_CODED_LEN);
        let mut damaged = coded.clone();
        // One flip in each of the first few 12-bit blocks (3 bytes = 2 blocks).
        damaged[0] ^= 0x80;
        damaged[2] ^= 0x01;
        damaged[30] ^= 0x10;
        assert_eq!(MessageHeader::decode(&damaged).unwrap(), sample());
    }

    #[test]
    fn placeholder_for_plain_strategies() {
        let header = MessageHeader::for_payload(1, 1, 0, ErrorCorrection::None, &Encryptor::None, 6);
        assert_eq!(header.salt, PLACEHOLDER);
        assert_eq!(header.nonce, PLACEHOLDER);
        assert_eq!(header.encryption_kind, EncryptionKind::None);
        assert_eq!(header.hash_kind, HashKind::None);
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let mut bytes = sample().to_bytes();
        bytes[0] = 0;
        assert!(matches!(MessageHeader::from_bytes(&bytes), Err(StegoError::Integrity(_))));

        let mut bytes = sample().to_bytes();
        bytes[5] = 9;
        assert!(matches!(MessageHeader::from_bytes(&bytes), Err(StegoError::Integrity(_))));

        let mut bytes = sample().to_bytes();
        bytes[1] = 0;
        bytes[2] = 0;
        assert!(matches!(MessageHeader::from_bytes(&bytes), Err(StegoError::Integrity(_))));

        // Hamming with 2 redundancy bits.
        let mut bytes = sample().to_bytes();
        bytes[3] = 2;
        assert!(matches!(MessageHeader::from_bytes(&bytes), Err(StegoError::Integrity(_))));

        assert!(MessageHeader::from_bytes(&bytes[..43]).is_err());
    }

    #[test]
    fn garbage_is_not_a_header() {
        // An all-ones carrier region decodes to Integrity, not a bogus header.
        let result = MessageHeader::decode(&[0xFF; HEADER_CODED_LEN]);
        assert!(matches!(result, Err(StegoError::Integrity(_))));
    }
}
