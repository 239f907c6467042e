// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Hamming single-error-correcting code.
//!
//! Each input byte becomes one block of `8 + r` bits. Block positions are
//! 1-indexed; every power-of-two position `2^k` holds the even parity of all
//! positions whose index has bit `k` set, and the remaining positions carry
//! the data bits MSB first. On decode the parity checks form a syndrome equal
//! to the index of a single flipped bit (0 = no error).
//!
//! The layout logic works on explicit bit arrays for any data width so that
//! it can be checked against a brute-force nearest-codeword decoder; the byte
//! codec is the `d = 8` instance, which needs `r = 4` (a 12-bit block).

use crate::stego::bits::{bits_to_bytes, bytes_to_bits};
use crate::stego::error::StegoError;

/// Data bits per block for the byte codec.
pub const DATA_BITS: usize = 8;

/// Smallest caller redundancy accepted for byte blocks (`2^r >= 8 + r + 1`).
pub const MIN_REDUNDANCY_BITS: u16 = 4;

/// Position layout of a Hamming block with `data_bits` data bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HammingLayout {
    data_bits: usize,
    parity_bits: usize,
}

/// A block whose syndrome points outside the block: more than one bit flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UncorrectableBlock {
    pub syndrome: usize,
}

impl HammingLayout {
    /// Layout with the minimum parity count able to address every position.
    pub fn for_data_bits(data_bits: usize) -> Self {
        assert!(data_bits > 0, "Hamming block needs at least one data bit");
        let mut parity_bits = 1;
        while (1usize << parity_bits) < data_bits + parity_bits + 1 {
            parity_bits += 1;
        }
        Self { data_bits, parity_bits }
    }

    pub fn data_bits(&self) -> usize {
        self.data_bits
    }

    pub fn parity_bits(&self) -> usize {
        self.parity_bits
    }

    pub fn block_len(&self) -> usize {
        self.data_bits + self.parity_bits
    }

    /// 1-indexed positions that carry data, in ascending order.
    pub fn data_positions(&self) -> impl Iterator<Item = usize> {
        (1..=self.block_len()).filter(|p| !p.is_power_of_two())
    }

    /// Encode `data` (one bit per element, `data_bits` long) into a block.
    pub fn encode_block(&self, data: &[u8]) -> Vec<u8> {
        debug_assert_eq!(data.len(), self.data_bits);
        let mut block = vec![0u8; self.block_len()];
        for (pos, &bit) in self.data_positions().zip(data) {
            block[pos - 1] = bit & 1;
        }
        for k in 0..self.parity_bits {
            let p = 1usize << k;
            block[p - 1] = covered_parity(&block, p);
        }
        block
    }

    /// Recompute the parity checks. Returns the 1-indexed position of a
    /// single flipped bit, or 0 if all checks pass.
    pub fn syndrome(&self, block: &[u8]) -> usize {
        debug_assert_eq!(block.len(), self.block_len());
        (0..self.parity_bits)
            .map(|k| (covered_parity(block, 1 << k) as usize) << k)
            .sum()
    }

    /// Correct at most one flipped bit and strip the parity positions.
    ///
    /// Returns the data bits and the corrected position, if any.
    pub fn decode_block(&self, block: &[u8]) -> Result<(Vec<u8>, Option<usize>), UncorrectableBlock> {
        let syndrome = self.syndrome(block);
        if syndrome > self.block_len() {
            return Err(UncorrectableBlock { syndrome });
        }
        let mut fixed = block.to_vec();
        let corrected = if syndrome != 0 {
            fixed[syndrome - 1] ^= 1;
            Some(syndrome)
        } else {
            None
        };
        let data = self.data_positions().map(|pos| fixed[pos - 1]).collect();
        Ok((data, corrected))
    }
}

/// XOR of all 1-indexed positions whose index has the `mask` bit set.
fn covered_parity(block: &[u8], mask: usize) -> u8 {
    block
        .iter()
        .enumerate()
        .filter(|(i, _)| (i + 1) & mask != 0)
        .fold(0u8, |acc, (_, &bit)| acc ^ (bit & 1))
}

/// Byte codec layout: 8 data bits, 4 parity bits.
fn byte_layout() -> HammingLayout {
    HammingLayout::for_data_bits(DATA_BITS)
}

/// Check that `redundancy_bits` parity bits could address an `8 + r` block.
pub fn validate_redundancy(redundancy_bits: u16) -> Result<(), StegoError> {
    let r = redundancy_bits as u32;
    // 2^16 already exceeds any 8 + r + 1 with r < 2^16.
    let sufficient = r >= 16 || (1u32 << r) >= DATA_BITS as u32 + r + 1;
    if !sufficient {
        return Err(StegoError::config(format!(
            "Hamming code needs at least {MIN_REDUNDANCY_BITS} redundant bits per byte, got {redundancy_bits}"
        )));
    }
    Ok(())
}

/// Coded length in bytes for `data_len` input bytes.
pub fn encoded_len(data_len: usize) -> usize {
    (data_len * byte_layout().block_len()).div_ceil(8)
}

/// Number of whole input bytes recoverable from `coded_len` coded bytes.
pub fn decoded_len(coded_len: usize) -> usize {
    coded_len * 8 / byte_layout().block_len()
}

/// Decode statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HammingStats {
    /// Blocks decoded.
    pub blocks: usize,
    /// Blocks in which a single flipped bit was repaired.
    pub corrected: usize,
}

/// Hamming-encode every byte of `data` and pack the blocks MSB first.
pub fn encode(data: &[u8], redundancy_bits: u16) -> Result<Vec<u8>, StegoError> {
    validate_redundancy(redundancy_bits)?;
    let layout = byte_layout();
    let mut coded_bits = Vec::with_capacity(data.len() * layout.block_len());
    for &byte in data {
        coded_bits.extend(layout.encode_block(&bytes_to_bits(&[byte])));
    }
    Ok(bits_to_bytes(&coded_bits))
}

/// Inverse of [`encode`].
pub fn decode(coded: &[u8], redundancy_bits: u16) -> Result<Vec<u8>, StegoError> {
    decode_with_stats(coded, redundancy_bits).map(|(data, _)| data)
}

/// Decode and report how many blocks needed correction.
///
/// # Errors
/// [`StegoError::Integrity`] if any block has more errors than the code can
/// correct.
pub fn decode_with_stats(coded: &[u8], redundancy_bits: u16) -> Result<(Vec<u8>, HammingStats), StegoError> {
    validate_redundancy(redundancy_bits)?;
    let layout = byte_layout();
    let n = layout.block_len();
    let bits = bytes_to_bits(coded);
    let whole = bits.len() / n;

    // Whatever is left after the last whole block is byte-packing padding.
    let tail = &bits[whole * n..];
    if tail.iter().any(|&b| b != 0) {
        log::warn!("Hamming: {} padding bits are not all zero", tail.len());
    }

    let mut data = Vec::with_capacity(whole);
    let mut stats = HammingStats::default();
    for (i, block) in bits.chunks_exact(n).enumerate() {
        let (data_bits, corrected) = layout.decode_block(block).map_err(|e| {
            log::warn!("Hamming: block {i} is uncorrectable (syndrome {})", e.syndrome);
            StegoError::integrity(format!(
                "Hamming block {i} has more than one flipped bit (syndrome {} > {n})",
                e.syndrome
            ))
        })?;
        if corrected.is_some() {
            stats.corrected += 1;
        }
        data.extend(bits_to_bytes(&data_bits));
        stats.blocks += 1;
    }
    if stats.corrected > 0 {
        log::debug!("Hamming: corrected {} of {} blocks", stats.corrected, stats.blocks);
    }
    Ok((data, stats))
}
