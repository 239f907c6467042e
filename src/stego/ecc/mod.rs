// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Error-correction strategies.
//!
//! Every strategy maps `(data, redundancy_bits)` to coded bytes and back. The
//! redundancy budget is expressed in redundant bits per input byte; how that
//! budget is spent is up to the strategy.

pub mod hamming;
pub mod reed_solomon;
pub mod rs_codec;

use crate::stego::error::StegoError;

/// Error-correction strategy, identified on the wire by its discriminant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCorrection {
    /// Identity pass-through.
    #[default]
    None = 0,
    /// Single-error-correcting Hamming code, one block per byte.
    Hamming = 1,
    /// Reed-Solomon over 255-byte chunks.
    ReedSolomon = 2,
}

impl ErrorCorrection {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::None),
            1 => Some(Self::Hamming),
            2 => Some(Self::ReedSolomon),
            _ => None,
        }
    }

    /// Reject redundancy values the strategy cannot honour.
    pub fn validate(self, redundancy_bits: u16) -> Result<(), StegoError> {
        match self {
            Self::None => Ok(()),
            Self::Hamming => hamming::validate_redundancy(redundancy_bits),
            Self::ReedSolomon => reed_solomon::validate_redundancy(redundancy_bits),
        }
    }

    pub fn encode(self, data: &[u8], redundancy_bits: u16) -> Result<Vec<u8>, StegoError> {
        match self {
            Self::None => Ok(data.to_vec()),
            Self::Hamming => hamming::encode(data, redundancy_bits),
            Self::ReedSolomon => reed_solomon::encode(data, redundancy_bits),
        }
    }

    pub fn decode(self, coded: &[u8], redundancy_bits: u16) -> Result<Vec<u8>, StegoError> {
        match self {
            Self::None => Ok(coded.to_vec()),
            Self::Hamming => hamming::decode(coded, redundancy_bits),
            Self::ReedSolomon => reed_solomon::decode(coded, redundancy_bits),
        }
    }

    /// Length of `encode` output for `data_len` input bytes.
    pub fn encoded_len(self, data_len: usize, redundancy_bits: u16) -> Result<usize, StegoError> {
        self.validate(redundancy_bits)?;
        match self {
            Self::None => Ok(data_len),
            Self::Hamming => Ok(hamming::encoded_len(data_len)),
            Self::ReedSolomon => reed_solomon::encoded_len(data_len, redundancy_bits),
        }
    }
}

impl std::fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Hamming => "hamming",
            Self::ReedSolomon => "reed-solomon",
        })
    }
}
