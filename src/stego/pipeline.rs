// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Encode/decode pipeline.
//!
//! Encode:
//! 1. Validate parameters against the carrier and strategy
//! 2. Encrypt, error-correct and build the header
//! 3. Check the full region (header + payload, all copies) fits
//! 4. Write the header at amplitude 0 and the payload right after it
//! 5. Read everything back and compare (self-check)
//!
//! Decode reads the header at the fixed width and stride, then uses its
//! fields to locate and interpret the payload region.

use crate::stego::capacity::header_amplitudes;
use crate::stego::ecc::ErrorCorrection;
use crate::stego::embedding::{read_chunk, validate_params, write_chunk, DataChunk};
use crate::stego::encryptor::{CredentialSource, Encryptor};
use crate::stego::error::StegoError;
use crate::stego::header::{MessageHeader, HEADER_CODED_LEN, HEADER_LSB_COUNT, HEADER_STRIDE};
use crate::stego::message::{decode_header, decode_message, encode_message, remove_error_correction};
use crate::stego::repetition::{majority_vote, repeat_factor, tile};
use crate::wav::AudioContainer;

/// Embedding parameters for one encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedParams {
    /// Low bits replaced per amplitude (1..=bits_per_sample).
    pub lsb_count: u8,
    /// Use every `stride`-th amplitude.
    pub stride: u16,
    /// Redundant bits per input byte for the error-correction strategy.
    pub redundancy_bits: u16,
    /// Tile the payload to fill the carrier.
    pub repeat: bool,
}

impl Default for EmbedParams {
    fn default() -> Self {
        Self {
            lsb_count: 2,
            stride: 1,
            redundancy_bits: 0,
            repeat: false,
        }
    }
}

impl EmbedParams {
    pub fn new(lsb_count: u8, stride: u16) -> Self {
        Self {
            lsb_count,
            stride,
            ..Self::default()
        }
    }

    pub fn with_redundancy(self, redundancy_bits: u16) -> Self {
        Self { redundancy_bits, ..self }
    }

    pub fn with_repeat(self, repeat: bool) -> Self {
        Self { repeat, ..self }
    }

    pub fn validate(&self, bits_per_sample: u16, error_correction: ErrorCorrection) -> Result<(), StegoError> {
        validate_params(self.lsb_count, self.stride, bits_per_sample)?;
        error_correction.validate(self.redundancy_bits)
    }
}

/// What an encode wrote where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeReport {
    pub header: MessageHeader,
    /// Amplitudes taken by the header region (starting at 0).
    pub header_amplitudes: usize,
    /// Amplitudes taken by the payload region, all copies included.
    pub payload_amplitudes: usize,
    /// Copies of the payload written (1 unless repeat mode).
    pub repeat_factor: usize,
}

impl EncodeReport {
    pub fn amplitudes_used(&self) -> usize {
        self.header_amplitudes + self.payload_amplitudes
    }
}

/// Embed `payload` into `container`.
///
/// On any error before the write the carrier is untouched; in particular a
/// [`StegoError::Capacity`] never leaves a partial message behind.
///
/// # Errors
/// - [`StegoError::Configuration`] for out-of-range parameters.
/// - [`StegoError::Capacity`] if the message does not fit.
/// - [`StegoError::Consistency`] if the written message does not read back.
pub fn encode(
    container: &mut AudioContainer,
    payload: &[u8],
    params: &EmbedParams,
    encryptor: &Encryptor,
    error_correction: ErrorCorrection,
) -> Result<EncodeReport, StegoError> {
    params.validate(container.bits_per_sample(), error_correction)?;
    let framed = encode_message(
        payload,
        params.lsb_count,
        params.stride,
        params.redundancy_bits,
        encryptor,
        error_correction,
    )?;

    let total = container.num_amplitudes();
    let header_amps = framed.header_chunk.amplitudes_required();
    let single_amps = framed.payload_chunk.amplitudes_required();
    if header_amps + single_amps > total {
        return Err(StegoError::Capacity {
            required: header_amps + single_amps,
            available: total,
        });
    }

    let coded = framed.payload_chunk.data();
    let k = if params.repeat {
        repeat_factor(total - header_amps, params.lsb_count, params.stride, coded.len())?
    } else {
        1
    };
    let payload_chunk = if k > 1 {
        DataChunk::new(tile(coded, k), params.lsb_count, params.stride)
    } else {
        framed.payload_chunk.clone()
    };
    let payload_amps = payload_chunk.amplitudes_required();
    log::debug!(
        "encode: header {header_amps} amplitudes, payload {payload_amps} amplitudes ({k} x {} bytes), carrier {total}",
        coded.len()
    );

    let next = write_chunk(container, &framed.header_chunk, 0)?;
    write_chunk(container, &payload_chunk, next)?;

    if let Err(reason) = self_check(container, &framed.header, coded, &framed.ciphertext, payload, encryptor, k) {
        log::warn!("encode self-check failed: {reason}");
        return Err(StegoError::Consistency(reason));
    }

    Ok(EncodeReport {
        header: framed.header,
        header_amplitudes: header_amps,
        payload_amplitudes: payload_amps,
        repeat_factor: k,
    })
}

/// Read back what [`encode`] just wrote and compare every stage.
fn self_check(
    container: &AudioContainer,
    header: &MessageHeader,
    coded: &[u8],
    ciphertext: &[u8],
    payload: &[u8],
    encryptor: &Encryptor,
    k: usize,
) -> Result<(), &'static str> {
    let (read_header, start) = read_header(container).map_err(|_| "header does not parse")?;
    if &read_header != header {
        return Err("header fields differ");
    }
    let read_coded = read_payload(container, &read_header, start, k).map_err(|_| "payload region unreadable")?;
    if read_coded != coded {
        return Err("coded payload differs");
    }
    let read_ciphertext =
        remove_error_correction(&read_header, &read_coded, None).map_err(|_| "error correction does not decode")?;
    if read_ciphertext != ciphertext {
        return Err("ciphertext differs");
    }
    // A public-key-only encryptor cannot open its own output.
    if encryptor.can_decrypt() {
        let plain = encryptor.decrypt(&read_ciphertext).map_err(|_| "ciphertext does not decrypt")?;
        if plain != payload {
            return Err("plaintext differs");
        }
    }
    Ok(())
}

/// Extract and parse the header. Returns it with the first payload amplitude.
pub fn read_header(container: &AudioContainer) -> Result<(MessageHeader, usize), StegoError> {
    let (bytes, next) = read_chunk(container, 0, HEADER_CODED_LEN * 8, HEADER_LSB_COUNT, HEADER_STRIDE)
        .map_err(|_| StegoError::integrity("carrier too short to hold a message header"))?;
    debug_assert_eq!(next, header_amplitudes());
    let header = decode_header(&bytes)?;
    if header.lsb_count as u16 > container.bits_per_sample() {
        return Err(StegoError::integrity(format!(
            "header lsb_count {} exceeds the carrier's {} bits per sample",
            header.lsb_count,
            container.bits_per_sample()
        )));
    }
    Ok((header, next))
}

/// Extract `k` copies of the coded payload and vote them down to one.
fn read_payload(container: &AudioContainer, header: &MessageHeader, start: usize, k: usize) -> Result<Vec<u8>, StegoError> {
    let copy_len = header.payload_size as usize;
    let (bytes, _) = read_chunk(container, start, copy_len * k * 8, header.lsb_count, header.stride)?;
    Ok(if k > 1 { majority_vote(&bytes, copy_len, k) } else { bytes })
}

/// Extract and decrypt a message.
///
/// `encryptor` and `error_correction` may be omitted; the header says which
/// strategies were used, and `credentials` is asked for the passphrase or
/// secret key if one is needed. A supplied strategy that disagrees with the
/// header is a [`StegoError::Configuration`] error.
pub fn decode(
    container: &AudioContainer,
    encryptor: Option<&Encryptor>,
    error_correction: Option<ErrorCorrection>,
    credentials: &mut dyn CredentialSource,
) -> Result<Vec<u8>, StegoError> {
    decode_impl(container, encryptor, error_correction, credentials, false)
}

/// Like [`decode`] for a message written in repeat mode. The copy count is
/// recomputed from the carrier size and the header, and the copies are
/// majority-voted before error correction.
pub fn decode_repeated(
    container: &AudioContainer,
    encryptor: Option<&Encryptor>,
    error_correction: Option<ErrorCorrection>,
    credentials: &mut dyn CredentialSource,
) -> Result<Vec<u8>, StegoError> {
    decode_impl(container, encryptor, error_correction, credentials, true)
}

fn decode_impl(
    container: &AudioContainer,
    encryptor: Option<&Encryptor>,
    error_correction: Option<ErrorCorrection>,
    credentials: &mut dyn CredentialSource,
    repeated: bool,
) -> Result<Vec<u8>, StegoError> {
    let (header, start) = read_header(container)?;
    let k = if repeated {
        let free = container.num_amplitudes() - start;
        repeat_factor(free, header.lsb_count, header.stride, header.payload_size as usize)
            .map_err(|_| StegoError::integrity("header payload size exceeds the carrier"))?
    } else {
        1
    };
    log::debug!(
        "decode: {} coded bytes at {} bits/amplitude, stride {}, {k} copies",
        header.payload_size,
        header.lsb_count,
        header.stride
    );
    let coded = read_payload(container, &header, start, k)?;
    decode_message(&header, &coded, encryptor, error_correction, credentials)
}

/// [`encode`] over serialized WAV bytes.
pub fn encode_wav(
    wav_bytes: &[u8],
    payload: &[u8],
    params: &EmbedParams,
    encryptor: &Encryptor,
    error_correction: ErrorCorrection,
) -> Result<Vec<u8>, StegoError> {
    let mut container = AudioContainer::from_bytes(wav_bytes)?;
    encode(&mut container, payload, params, encryptor, error_correction)?;
    Ok(container.to_bytes())
}

/// [`decode`] over serialized WAV bytes.
pub fn decode_wav(
    wav_bytes: &[u8],
    encryptor: Option<&Encryptor>,
    error_correction: Option<ErrorCorrection>,
    credentials: &mut dyn CredentialSource,
) -> Result<Vec<u8>, StegoError> {
    let container = AudioContainer::from_bytes(wav_bytes)?;
    decode(&container, encryptor, error_correction, credentials)
}
