// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Error types for WAV parsing and writing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while parsing or writing a WAV container.
#[derive(Debug, Error)]
pub enum WavError {
    /// Input data is too short or a chunk runs past the end of the file.
    #[error("unexpected end of WAV data")]
    UnexpectedEof,
    /// A required four-character chunk tag is missing.
    #[error("expected chunk tag {expected:?}, found {:?}", String::from_utf8_lossy(.found))]
    BadTag {
        expected: &'static str,
        found: [u8; 4],
    },
    /// The format chunk describes an encoding we do not handle
    /// (compressed audio, more than two channels, 24-bit samples, ...).
    #[error("unsupported WAV format: {0}")]
    UnsupportedFormat(&'static str),
    /// A header field is inconsistent with the others.
    #[error("invalid WAV header field: {0}")]
    InvalidField(&'static str),
    /// The output file exists and overwriting was not requested.
    #[error("refusing to overwrite existing file {}", .0.display())]
    Overwrite(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WavError {
    /// Returns `true` for errors caused by malformed carrier bytes, as opposed
    /// to filesystem problems.
    pub fn is_format_error(&self) -> bool {
        !matches!(self, Self::Overwrite(_) | Self::Io(_))
    }
}

pub type Result<T> = std::result::Result<T, WavError>;
