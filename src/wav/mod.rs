// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Uncompressed PCM WAV container codec.
//!
//! Parses a RIFF/RIFX `WAVE` file into its format description plus a flat,
//! channel-interleaved buffer of signed sample amplitudes, and writes it back.
//! This is the carrier medium for the steganography layer, which only ever
//! touches the low bits of the amplitudes.
//!
//! Supports:
//! - Linear PCM (`AudioFormat == 1`), mono or stereo
//! - 8, 16 and 32 bits per sample
//! - Little-endian (`RIFF`) and big-endian (`RIFX`) sample data
//! - Unknown sub-chunks between `fmt ` and `data` (kept verbatim)
//! - Byte-for-byte round-trip for unmodified files
//!
//! Does NOT support:
//! - Compressed formats, `WAVE_FORMAT_EXTENSIBLE`, 24-bit samples

pub mod chunk;
pub mod error;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use chunk::{parse_layout, write_layout, Layout};
pub use chunk::{Endianness, FormatChunk, RawChunk};
pub use error::{Result, WavError};

/// A parsed WAV file with mutable access to its sample amplitudes.
///
/// Created with [`AudioContainer::from_bytes`] (or [`AudioContainer::new`]
/// for synthetic audio). Every sample is held as an `i32` regardless of the
/// on-disk width; values are kept sign-extended from `bits_per_sample`, so
/// the in-memory value always equals what a re-parse of [`to_bytes`] yields.
///
/// [`to_bytes`]: AudioContainer::to_bytes
#[derive(Debug, Clone)]
pub struct AudioContainer {
    layout: Layout,
    /// Interleaved samples: frame 0 channel 0, frame 0 channel 1, ...
    samples: Vec<i32>,
    /// Bytes following the last whole sample: a ragged data tail, the RIFF
    /// pad byte and any chunks after `data`.
    trailer: Vec<u8>,
}

impl AudioContainer {
    /// Parse a WAV file from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let layout = parse_layout(data)?;

        let available = data.len() - layout.data_offset;
        let data_size = layout.data_size as usize;
        if data_size > available {
            return Err(WavError::UnexpectedEof);
        }

        let bps = layout.format.bytes_per_sample();
        let sample_bytes = data_size / bps * bps;
        let start = layout.data_offset;
        let raw = &data[start..start + sample_bytes];
        let bits = layout.format.bits_per_sample;
        let samples = match layout.endianness {
            Endianness::Little => decode_samples::<LittleEndian>(raw, bits),
            Endianness::Big => decode_samples::<BigEndian>(raw, bits),
        };
        let trailer = data[start + sample_bytes..].to_vec();

        Ok(Self { layout, samples, trailer })
    }

    /// Read and parse a WAV file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Build a canonical little-endian WAV from interleaved samples.
    ///
    /// Samples are truncated to `format.bits_per_sample` and sign-extended.
    pub fn new(format: FormatChunk, samples: Vec<i32>) -> Result<Self> {
        format.validate()?;
        let bits = format.bits_per_sample;
        let data_size = samples.len() * format.bytes_per_sample();
        let data_size: u32 = data_size
            .try_into()
            .map_err(|_| WavError::InvalidField("sample data exceeds 4 GiB"))?;
        let trailer = if data_size % 2 == 1 { vec![0] } else { Vec::new() };
        let layout = Layout {
            endianness: Endianness::Little,
            riff_size: 36 + data_size + trailer.len() as u32,
            format,
            extra_chunks: Vec::new(),
            data_size,
            data_offset: 44,
        };
        let samples = samples.into_iter().map(|s| sign_extend(s, bits)).collect();
        Ok(Self { layout, samples, trailer })
    }

    /// Serialize to WAV bytes. Unmodified containers reproduce their input
    /// exactly.
    pub fn to_bytes(&self) -> Vec<u8> {
        let bps = self.layout.format.bytes_per_sample();
        let mut out = Vec::with_capacity(
            self.layout.data_offset + self.samples.len() * bps + self.trailer.len(),
        );
        write_layout(&self.layout, &mut out);
        let bits = self.layout.format.bits_per_sample;
        match self.layout.endianness {
            Endianness::Little => encode_samples::<LittleEndian>(&self.samples, bits, &mut out),
            Endianness::Big => encode_samples::<BigEndian>(&self.samples, bits, &mut out),
        }
        out.extend_from_slice(&self.trailer);
        out
    }

    /// Write the container to `path`.
    ///
    /// # Errors
    /// [`WavError::Overwrite`] if the file exists and `overwrite` is false.
    pub fn write_to_path(&self, path: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        let path = path.as_ref();
        let mut options = OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        let mut file = options.open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                WavError::Overwrite(path.to_path_buf())
            } else {
                WavError::Io(e)
            }
        })?;
        file.write_all(&self.to_bytes())?;
        Ok(())
    }

    pub fn format(&self) -> &FormatChunk {
        &self.layout.format
    }

    pub fn endianness(&self) -> Endianness {
        self.layout.endianness
    }

    pub fn channels(&self) -> u16 {
        self.layout.format.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.layout.format.sample_rate
    }

    pub fn byte_rate(&self) -> u32 {
        self.layout.format.byte_rate
    }

    pub fn block_align(&self) -> u16 {
        self.layout.format.block_align
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.layout.format.bits_per_sample
    }

    /// Sub-chunks found between `fmt ` and `data`.
    pub fn extra_chunks(&self) -> &[RawChunk] {
        &self.layout.extra_chunks
    }

    /// Total number of amplitudes (samples across all channels).
    pub fn num_amplitudes(&self) -> usize {
        self.samples.len()
    }

    /// Number of frames (samples per channel).
    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.channels() as usize
    }

    pub fn duration_secs(&self) -> f64 {
        self.num_frames() as f64 / self.sample_rate() as f64
    }

    /// Interleaved samples.
    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    /// Raw mutable access to the interleaved samples.
    ///
    /// Values written here must fit in `bits_per_sample`; anything wider is
    /// truncated by [`to_bytes`](AudioContainer::to_bytes).
    pub fn samples_mut(&mut self) -> &mut [i32] {
        &mut self.samples
    }

    pub fn get(&self, index: usize) -> Option<i32> {
        self.samples.get(index).copied()
    }

    /// Overwrite one amplitude, truncating `value` to the sample width.
    ///
    /// # Panics
    /// Panics if `index >= num_amplitudes()`.
    pub fn set(&mut self, index: usize, value: i32) {
        self.samples[index] = sign_extend(value, self.layout.format.bits_per_sample);
    }

    /// Every `stride`-th amplitude starting at `start`.
    ///
    /// # Panics
    /// Panics if `stride == 0`.
    pub fn strided(&self, start: usize, stride: usize) -> impl Iterator<Item = i32> + '_ {
        self.samples.get(start..).unwrap_or(&[]).iter().step_by(stride).copied()
    }

    /// De-interleaved view of one channel.
    pub fn channel(&self, channel: u16) -> impl Iterator<Item = i32> + '_ {
        let channels = self.channels();
        let start = if channel < channels { channel as usize } else { self.samples.len() };
        self.strided(start, channels as usize)
    }
}

/// Sign-extend the low `bits` bits of `value`.
pub(crate) fn sign_extend(value: i32, bits: u16) -> i32 {
    let shift = 32 - bits as u32;
    if shift == 0 {
        value
    } else {
        (value << shift) >> shift
    }
}

fn decode_samples<B: ByteOrder>(raw: &[u8], bits: u16) -> Vec<i32> {
    match bits {
        8 => raw.iter().map(|&b| b as i8 as i32).collect(),
        16 => raw.chunks_exact(2).map(|c| B::read_i16(c) as i32).collect(),
        _ => raw.chunks_exact(4).map(B::read_i32).collect(),
    }
}

fn encode_samples<B: ByteOrder>(samples: &[i32], bits: u16, out: &mut Vec<u8>) {
    match bits {
        8 => out.extend(samples.iter().map(|&s| s as i8 as u8)),
        16 => {
            let mut buf = [0u8; 2];
            for &s in samples {
                B::write_i16(&mut buf, s as i16);
                out.extend_from_slice(&buf);
            }
        }
        _ => {
            let mut buf = [0u8; 4];
            for &s in samples {
                B::write_i32(&mut buf, s);
                out.extend_from_slice(&buf);
            }
        }
    }
}
