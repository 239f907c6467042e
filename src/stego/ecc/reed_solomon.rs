// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Reed-Solomon strategy: translates a per-byte redundancy budget into a
//! per-chunk parity count and delegates to [`RsCodec`].

use super::rs_codec::{RsCodec, BLOCK_LEN};
use crate::stego::error::StegoError;

/// Parity symbols per 255-byte chunk for `redundancy_bits` redundant bits per
/// input byte.
///
/// Returns `Ok(None)` for 0, which disables the code entirely.
pub fn parity_per_chunk(redundancy_bits: u16) -> Result<Option<usize>, StegoError> {
    if redundancy_bits == 0 {
        return Ok(None);
    }
    let bits = redundancy_bits as usize;
    if bits >= BLOCK_LEN * 8 {
        return Err(StegoError::config(format!(
            "too many redundant bits for Reed-Solomon: {bits}, must be less than {}",
            BLOCK_LEN * 8
        )));
    }
    let data_per_chunk = BLOCK_LEN / (bits / 8 + 1);
    let parity = (BLOCK_LEN - data_per_chunk).max(1);
    if parity >= BLOCK_LEN {
        return Err(StegoError::config(format!(
            "Reed-Solomon cannot protect data with {bits} redundant bits per byte"
        )));
    }
    Ok(Some(parity))
}

/// Check that `redundancy_bits` yields a usable code.
pub fn validate_redundancy(redundancy_bits: u16) -> Result<(), StegoError> {
    parity_per_chunk(redundancy_bits).map(|_| ())
}

fn codec(redundancy_bits: u16) -> Result<Option<RsCodec>, StegoError> {
    let codec = parity_per_chunk(redundancy_bits)?.map(RsCodec::new);
    if let Some(c) = &codec {
        log::debug!(
            "Reed-Solomon: {redundancy_bits} bits/byte -> RS({BLOCK_LEN}, {}), corrects {} symbols per chunk",
            c.max_data_len(),
            c.correction_capacity()
        );
    }
    Ok(codec)
}

/// Coded length for `data_len` bytes.
pub fn encoded_len(data_len: usize, redundancy_bits: u16) -> Result<usize, StegoError> {
    Ok(match parity_per_chunk(redundancy_bits)? {
        None => data_len,
        Some(parity) => data_len + data_len.div_ceil(BLOCK_LEN - parity) * parity,
    })
}

pub fn encode(data: &[u8], redundancy_bits: u16) -> Result<Vec<u8>, StegoError> {
    let Some(codec) = codec(redundancy_bits)? else {
        return Ok(data.to_vec());
    };
    let mut coded = Vec::with_capacity(encoded_len(data.len(), redundancy_bits)?);
    for chunk in data.chunks(codec.max_data_len()) {
        coded.extend_from_slice(&codec.encode_block(chunk));
    }
    Ok(coded)
}

pub fn decode(coded: &[u8], redundancy_bits: u16) -> Result<Vec<u8>, StegoError> {
    let Some(codec) = codec(redundancy_bits)? else {
        return Ok(coded.to_vec());
    };
    let mut data = Vec::with_capacity(coded.len());
    let mut corrected = 0usize;
    for (i, chunk) in coded.chunks(BLOCK_LEN).enumerate() {
        if chunk.len() <= codec.parity_len() {
            return Err(StegoError::integrity(format!(
                "Reed-Solomon chunk {i} has {} bytes, not more than its {} parity bytes",
                chunk.len(),
                codec.parity_len()
            )));
        }
        let (block, fixed) = codec.decode_block(chunk).map_err(|e| {
            log::warn!("Reed-Solomon: chunk {i} is uncorrectable");
            StegoError::integrity(format!("chunk {i}: {e}"))
        })?;
        corrected += fixed;
        data.extend_from_slice(&block);
    }
    if corrected > 0 {
        log::debug!("Reed-Solomon: corrected {corrected} symbol errors");
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizing_follows_bits_per_byte() {
        assert_eq!(parity_per_chunk(0).unwrap(), None);
        // Under one byte of redundancy: minimum of one parity symbol.
        assert_eq!(parity_per_chunk(1).unwrap(), Some(1));
        assert_eq!(parity_per_chunk(7).unwrap(), Some(1));
        // One redundant byte per data byte: 127 data + 128 parity.
        assert_eq!(parity_per_chunk(8).unwrap(), Some(128));
        assert_eq!(parity_per_chunk(16).unwrap(), Some(255 - 85));
        assert_eq!(parity_per_chunk(2039).unwrap(), Some(254));
    }

    #[test]
    fn oversized_redundancy_rejected() {
        assert!(matches!(parity_per_chunk(2040), Err(StegoError::Configuration(_))));
        assert!(matches!(encode(b"x", u16::MAX), Err(StegoError::Configuration(_))));
    }

    #[test]
    fn zero_redundancy_is_identity() {
        let data = b"untouched".to_vec();
        assert_eq!(encode(&data, 0).unwrap(), data);
        assert_eq!(decode(&data, 0).unwrap(), data);
        assert_eq!(encoded_len(9, 0).unwrap(), 9);
    }

    #[test]
    fn multi_chunk_roundtrip() {
        let data: Vec<u8> = (0..300).map(|i| (i % 251) as u8).collect();
        let coded = encode(&data, 8).unwrap();
        // 127 + 127 + 46 data bytes, each chunk with 128 parity bytes.
        assert_eq!(coded.len(), 300 + 3 * 128);
        assert_eq!(coded.len(), encoded_len(300, 8).unwrap());
        assert_eq!(decode(&coded, 8).unwrap(), data);
    }

    #[test]
    fn corrects_burst_in_each_chunk() {
        let data: Vec<u8> = (0..254).map(|i| i as u8).collect();
        let mut coded = encode(&data, 8).unwrap();
        for offset in [0, 255] {
            for i in 0..40 {
                coded[offset + i] ^= 0xA5;
            }
        }
        assert_eq!(decode(&coded, 8).unwrap(), data);
    }

    #[test]
    fn truncated_chunk_is_integrity_error() {
        let coded = encode(b"abc", 8).unwrap();
        assert!(matches!(decode(&coded[..100], 8), Err(StegoError::Integrity(_))));
    }

    #[test]
    fn uncorrectable_chunk_is_integrity_error() {
        let mut coded = encode(b"hello", 3).unwrap();
        coded[0] ^= 1;
        assert!(matches!(decode(&coded, 3), Err(StegoError::Integrity(_))));
    }
}
