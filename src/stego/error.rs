// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Error types for the steganography pipeline.
//!
//! [`StegoError`] covers all failure modes from WAV parsing through
//! error correction, encryption and header extraction.

use thiserror::Error;

use crate::wav::WavError;

/// Errors that can occur during steganographic encoding or decoding.
#[derive(Debug, Error)]
pub enum StegoError {
    /// The carrier could not be parsed or written as a PCM WAV file.
    #[error("invalid carrier: {0}")]
    Format(#[from] WavError),
    /// The message (after encryption and ECC expansion) does not fit.
    /// Always reported before any sample is modified.
    #[error("message needs {required} amplitudes but the carrier only has {available}")]
    Capacity { required: usize, available: usize },
    /// Embedding or error-correction parameters are out of range.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// The header or payload could not be recovered (invalid header fields,
    /// or more bit errors than the code can correct).
    #[error("integrity check failed: {0}")]
    Integrity(String),
    /// Authenticated decryption failed (wrong passphrase or key, or corrupted data).
    #[error("decryption failed (wrong passphrase or key?)")]
    DecryptionFailed,
    /// The credential collaborator could not supply what the header requires.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
    /// The encoder could not read back what it just wrote. This is a bug.
    #[error("encode self-check failed: {0}")]
    Consistency(&'static str),
}

impl StegoError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }
}
