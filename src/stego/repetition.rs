// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Repeat-fill mode.
//!
//! The coded payload is laid out `k` times back to back so it fills the free
//! part of the carrier. On extraction a bitwise majority vote over the copies
//! recovers the payload even when individual copies were damaged.

use crate::stego::embedding::amplitudes_for;
use crate::stego::error::StegoError;

/// Number of whole copies of a `coded_len`-byte payload that fit in
/// `available` amplitudes. Forced odd when `k >= 3` so votes cannot tie.
///
/// # Errors
/// [`StegoError::Capacity`] if not even one copy fits.
pub fn repeat_factor(available: usize, lsb_count: u8, stride: u16, coded_len: usize) -> Result<usize, StegoError> {
    if coded_len == 0 {
        return Ok(1);
    }
    let slots = available / stride as usize;
    let k = slots * lsb_count as usize / (8 * coded_len);
    if k < 1 {
        return Err(StegoError::Capacity {
            required: amplitudes_for(coded_len * 8, lsb_count, stride),
            available,
        });
    }
    Ok(if k >= 3 && k % 2 == 0 { k - 1 } else { k })
}

/// `k` copies of `data`, back to back.
pub fn tile(data: &[u8], k: usize) -> Vec<u8> {
    data.repeat(k)
}

/// Bitwise majority vote over `k` consecutive copies of `copy_len` bytes.
///
/// A tie (possible only for `k == 2`) keeps the first copy's bit.
pub fn majority_vote(copies: &[u8], copy_len: usize, k: usize) -> Vec<u8> {
    if copy_len == 0 || k == 0 {
        return Vec::new();
    }
    let mut disputed = 0usize;
    let voted: Vec<u8> = (0..copy_len)
        .map(|i| {
            let mut byte = 0u8;
            for bit in (0..8).rev() {
                let ones = (0..k)
                    .filter_map(|c| copies.get(c * copy_len + i))
                    .filter(|&&b| (b >> bit) & 1 == 1)
                    .count();
                let first = (copies[i] >> bit) & 1;
                if ones != 0 && ones != k {
                    disputed += 1;
                }
                let winner = match (2 * ones).cmp(&k) {
                    std::cmp::Ordering::Greater => 1,
                    std::cmp::Ordering::Less => 0,
                    std::cmp::Ordering::Equal => first,
                };
                byte |= winner << bit;
            }
            byte
        })
        .collect();
    if disputed > 0 {
        log::debug!("repetition: {disputed} of {} bits disagreed across {k} copies", copy_len * 8);
    }
    voted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factor_counts_whole_copies() {
        // 1000 amplitudes, 2 bits each = 2000 bits; 10-byte payload = 80 bits -> 25.
        assert_eq!(repeat_factor(1000, 2, 1, 10).unwrap(), 25);
        // Stride halves the usable slots: 12 -> forced odd 11.
        assert_eq!(repeat_factor(1000, 2, 2, 10).unwrap(), 11);
        assert_eq!(repeat_factor(80, 1, 1, 10).unwrap(), 1);
        assert_eq!(repeat_factor(160, 1, 1, 10).unwrap(), 2);
        assert_eq!(repeat_factor(320, 1, 1, 10).unwrap(), 3);
    }

    #[test]
    fn factor_rejects_no_room() {
        let result = repeat_factor(79, 1, 1, 10);
        assert!(matches!(result, Err(StegoError::Capacity { required: 80, available: 79 })));
    }

    #[test]
    fn vote_repairs_minority_damage() {
        let payload = b"majority".to_vec();
        let mut copies = tile(&payload, 5);
        copies[0] ^= 0xFF;
        copies[8 + 3] ^= 0x0F;
        copies[16 + 3] ^= 0xF0;
        copies[32 + 7] ^= 0x01;
        assert_eq!(majority_vote(&copies, payload.len(), 5), payload);
    }

    #[test]
    fn vote_tie_keeps_first_copy() {
        let copies = [0b1010_1010u8, 0b0101_0101];
        assert_eq!(majority_vote(&copies, 1, 2), vec![0b1010_1010]);
    }

    #[test]
    fn vote_single_copy_is_identity() {
        assert_eq!(majority_vote(b"abc", 3, 1), b"abc".to_vec());
        assert!(majority_vote(&[], 0, 3).is_empty());
    }
}
