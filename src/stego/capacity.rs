// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Capacity estimation.
//!
//! The carrier's amplitudes are split into the fixed header region and the
//! payload region. The payload region holds `floor(free / N) * L` bits; the
//! largest plaintext is the one whose encrypted and error-corrected form
//! still fits in that many bytes.

use crate::stego::ecc::ErrorCorrection;
use crate::stego::embedding::{amplitudes_for, validate_params};
use crate::stego::encryptor::EncryptionKind;
use crate::stego::error::StegoError;
use crate::stego::header::{HEADER_CODED_LEN, HEADER_LSB_COUNT, HEADER_STRIDE};
use crate::stego::pipeline::EmbedParams;
use crate::wav::AudioContainer;

/// Amplitudes occupied by the coded header.
pub fn header_amplitudes() -> usize {
    amplitudes_for(HEADER_CODED_LEN * 8, HEADER_LSB_COUNT, HEADER_STRIDE)
}

/// Largest coded payload, in bytes, that fits after the header.
pub fn max_coded_len(num_amplitudes: usize, lsb_count: u8, stride: u16) -> usize {
    let free = num_amplitudes.saturating_sub(header_amplitudes());
    free / stride as usize * lsb_count as usize / 8
}

/// Largest plaintext, in bytes, that [`encode`](crate::stego::encode) can
/// embed with these settings. Repeat mode does not change the answer; it only
/// fills what is left over.
///
/// Returns 0 if not even an empty message fits.
pub fn max_payload_len(
    container: &AudioContainer,
    params: &EmbedParams,
    error_correction: ErrorCorrection,
    encryption: EncryptionKind,
) -> Result<usize, StegoError> {
    validate_params(params.lsb_count, params.stride, container.bits_per_sample())?;
    error_correction.validate(params.redundancy_bits)?;
    let budget = max_coded_len(container.num_amplitudes(), params.lsb_count, params.stride);
    let fits = |plain: usize| -> Result<bool, StegoError> {
        Ok(error_correction.encoded_len(plain + encryption.overhead(), params.redundancy_bits)? <= budget)
    };

    if !fits(0)? {
        return Ok(0);
    }
    // encoded_len is monotonic, so binary-search the largest fitting length.
    let (mut lo, mut hi) = (0usize, budget);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if fits(mid)? {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    log::debug!(
        "capacity: {} amplitudes, {budget} coded bytes -> {lo} plaintext bytes ({error_correction}, {encryption:?})",
        container.num_amplitudes()
    );
    Ok(lo)
}
