// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! LSB embedding engine.
//!
//! A [`DataChunk`] is written as `L`-bit groups into every `N`-th amplitude
//! of the carrier. Each target amplitude keeps its high bits and has its low
//! `L` bits replaced: `s' = s ^ (s & mask) ^ g` with `mask = 2^L - 1`.
//! Extraction masks the same amplitudes and re-packs the groups.

use crate::stego::bits::{group_count, pack, unpack, MAX_GROUP_WIDTH};
use crate::stego::error::StegoError;
use crate::wav::AudioContainer;

/// One homogeneous region to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataChunk {
    data: Vec<u8>,
    lsb_count: u8,
    stride: u16,
}

impl DataChunk {
    pub fn new(data: Vec<u8>, lsb_count: u8, stride: u16) -> Self {
        Self { data, lsb_count, stride }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn lsb_count(&self) -> u8 {
        self.lsb_count
    }

    pub fn stride(&self) -> u16 {
        self.stride
    }

    pub fn bit_count(&self) -> usize {
        self.data.len() * 8
    }

    /// `ceil(len * 8 / L) * N`.
    pub fn amplitudes_required(&self) -> usize {
        amplitudes_for(self.bit_count(), self.lsb_count, self.stride)
    }
}

/// Amplitudes spanned by `bit_count` bits at `lsb_count` bits every `stride`.
pub fn amplitudes_for(bit_count: usize, lsb_count: u8, stride: u16) -> usize {
    group_count(bit_count, lsb_count.max(1)) * stride as usize
}

/// Check embedding parameters against the carrier's sample width.
pub fn validate_params(lsb_count: u8, stride: u16, bits_per_sample: u16) -> Result<(), StegoError> {
    if lsb_count == 0 || lsb_count > MAX_GROUP_WIDTH || lsb_count as u16 > bits_per_sample {
        return Err(StegoError::config(format!(
            "lsb_count must be between 1 and {bits_per_sample} for this carrier, got {lsb_count}"
        )));
    }
    if stride == 0 {
        return Err(StegoError::config("stride must be at least 1"));
    }
    Ok(())
}

fn low_mask(lsb_count: u8) -> u32 {
    u32::MAX >> (32 - lsb_count as u32)
}

/// Write `chunk` starting at amplitude `start`. Returns the first amplitude
/// after the chunk's region.
///
/// Nothing is modified if the chunk does not fit.
pub fn write_chunk(container: &mut AudioContainer, chunk: &DataChunk, start: usize) -> Result<usize, StegoError> {
    let (lsb_count, stride) = (chunk.lsb_count, chunk.stride);
    validate_params(lsb_count, stride, container.bits_per_sample())?;
    let end = start + chunk.amplitudes_required();
    if end > container.num_amplitudes() {
        return Err(StegoError::Capacity {
            required: end,
            available: container.num_amplitudes(),
        });
    }

    let mask = low_mask(lsb_count);
    for (i, group) in pack(&chunk.data, lsb_count).into_iter().enumerate() {
        let index = start + i * stride as usize;
        let sample = container.samples()[index] as u32;
        container.set(index, (sample ^ (sample & mask) ^ group) as i32);
    }
    Ok(end)
}

/// Read `bit_count` bits written with `lsb_count`/`stride` starting at
/// amplitude `start`. Returns the bytes and the first amplitude after the
/// region.
pub fn read_chunk(
    container: &AudioContainer,
    start: usize,
    bit_count: usize,
    lsb_count: u8,
    stride: u16,
) -> Result<(Vec<u8>, usize), StegoError> {
    validate_params(lsb_count, stride, container.bits_per_sample())?;
    let end = start + amplitudes_for(bit_count, lsb_count, stride);
    if end > container.num_amplitudes() {
        return Err(StegoError::integrity(format!(
            "region of {bit_count} bits at amplitude {start} runs past the carrier end ({})",
            container.num_amplitudes()
        )));
    }

    let mask = low_mask(lsb_count);
    let groups: Vec<u32> = container
        .strided(start, stride as usize)
        .take(group_count(bit_count, lsb_count))
        .map(|s| s as u32 & mask)
        .collect();
    Ok((unpack(&groups, lsb_count, bit_count), end))
}
