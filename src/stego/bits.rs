// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Bit packing between byte streams and fixed-width bit groups.
//!
//! Bytes are expanded MSB-first into a flat bitstring, which is then cut into
//! groups of `width` bits (the number of LSBs written per amplitude). The
//! same packing is used for the header and for the payload.

/// Widest group that fits in a `u32`.
pub const MAX_GROUP_WIDTH: u8 = 32;

/// Convert bytes to a bit vector (MSB first within each byte).
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for bit_pos in (0..8).rev() {
            bits.push((byte >> bit_pos) & 1);
        }
    }
    bits
}

/// Convert a bit vector (MSB first) back to bytes.
/// Pads the last byte with zero bits if `bits.len()` is not a multiple of 8.
pub fn bits_to_bytes(bits: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(bits.len().div_ceil(8));
    for chunk in bits.chunks(8) {
        let mut byte = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            byte |= (bit & 1) << (7 - i);
        }
        bytes.push(byte);
    }
    bytes
}

/// Number of `width`-bit groups needed to carry `bit_count` bits.
pub fn group_count(bit_count: usize, width: u8) -> usize {
    bit_count.div_ceil(width as usize)
}

/// Slice `bytes` into `width`-bit groups (1..=32), MSB first.
///
/// The final group is zero-padded at its low end when the bit count is not a
/// multiple of `width`.
pub fn pack(bytes: &[u8], width: u8) -> Vec<u32> {
    debug_assert!((1..=MAX_GROUP_WIDTH).contains(&width));
    let bits = bytes_to_bits(bytes);
    bits.chunks(width as usize)
        .map(|chunk| {
            let mut group = 0u32;
            for i in 0..width as usize {
                group = (group << 1) | chunk.get(i).copied().unwrap_or(0) as u32;
            }
            group
        })
        .collect()
}

/// Inverse of [`pack`]: reassemble the first `bit_count` bits of `groups`.
///
/// Passing the exact bit count keeps the zero padding of the last group from
/// turning into a spurious trailing byte.
pub fn unpack(groups: &[u32], width: u8, bit_count: usize) -> Vec<u8> {
    debug_assert!((1..=MAX_GROUP_WIDTH).contains(&width));
    let mut bits = Vec::with_capacity(groups.len() * width as usize);
    for &group in groups {
        for bit_pos in (0..width as u32).rev() {
            bits.push(((group >> bit_pos) & 1) as u8);
        }
    }
    bits.truncate(bit_count);
    bits_to_bytes(&bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn bytes_bits_roundtrip() {
        let original = vec![0xDE, 0xAD, 0xBE, 0xEF];
        let bits = bytes_to_bits(&original);
        assert_eq!(bits.len(), 32);
        assert_eq!(bits_to_bytes(&bits), original);
    }

    #[test]
    fn bits_to_bytes_partial_byte() {
        // 10110_000 = 0xB0
        assert_eq!(bits_to_bytes(&[1, 0, 1, 1, 0]), vec![0xB0]);
    }

    #[test]
    fn pack_two_bit_groups() {
        // 0x41 = 01 00 00 01
        assert_eq!(pack(&[0x41], 2), vec![1, 0, 0, 1]);
    }

    #[test]
    fn pack_pads_final_group() {
        // 0xFF with width 3: 111 111 11(0)
        assert_eq!(pack(&[0xFF], 3), vec![7, 7, 6]);
        assert_eq!(group_count(8, 3), 3);
    }

    #[test]
    fn pack_width_32() {
        assert_eq!(pack(&[0x12, 0x34, 0x56, 0x78], 32), vec![0x1234_5678]);
    }

    #[test]
    fn unpack_drops_padding() {
        let groups = pack(b"ABC", 5);
        assert_eq!(groups.len(), 5);
        assert_eq!(unpack(&groups, 5, 24), b"ABC".to_vec());
    }

    proptest! {
        #[test]
        fn pack_unpack_inverse(data in proptest::collection::vec(any::<u8>(), 0..64), width in 1u8..=32) {
            let groups = pack(&data, width);
            prop_assert_eq!(groups.len(), group_count(data.len() * 8, width));
            prop_assert!(groups.iter().all(|&g| width == 32 || g < (1u32 << width)));
            prop_assert_eq!(unpack(&groups, width, data.len() * 8), data);
        }
    }
}
