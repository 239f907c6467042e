// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! RIFF chunk parsing and serialization.
//!
//! Walks the chunk headers of a RIFF/RIFX `WAVE` stream, decoding the `fmt `
//! chunk and preserving every other chunk verbatim. All chunk header fields
//! are little-endian; the `RIFX` tag only switches the byte order of the
//! PCM samples themselves.

use std::io::{self, Cursor};

use byteorder::{LittleEndian, ReadBytesExt};

use super::error::{Result, WavError};

/// Chunk tags.
pub const RIFF: [u8; 4] = *b"RIFF";
pub const RIFX: [u8; 4] = *b"RIFX";
pub const WAVE: [u8; 4] = *b"WAVE";
pub const FMT: [u8; 4] = *b"fmt ";
pub const DATA: [u8; 4] = *b"data";

/// Size of a plain PCM `fmt ` chunk body.
pub const FMT_CHUNK_SIZE: u32 = 16;

/// `AudioFormat` code for uncompressed linear PCM.
pub const PCM_FORMAT: u16 = 1;

/// Byte order of the PCM sample data, selected by the RIFF/RIFX tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    pub fn from_riff_tag(tag: [u8; 4]) -> Option<Self> {
        match tag {
            RIFF => Some(Self::Little),
            RIFX => Some(Self::Big),
            _ => None,
        }
    }

    pub fn riff_tag(self) -> [u8; 4] {
        match self {
            Self::Little => RIFF,
            Self::Big => RIFX,
        }
    }
}

/// Decoded `fmt ` chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatChunk {
    /// Audio format code; always [`PCM_FORMAT`] for parsed files.
    pub audio_format: u16,
    /// Number of interleaved channels (1 or 2).
    pub channels: u16,
    /// Frames per second.
    pub sample_rate: u32,
    /// `sample_rate * channels * bits_per_sample / 8`.
    pub byte_rate: u32,
    /// `channels * bits_per_sample / 8`.
    pub block_align: u16,
    /// Sample width in bits (8, 16 or 32).
    pub bits_per_sample: u16,
}

impl FormatChunk {
    /// Build a consistent PCM format description.
    ///
    /// Derived fields that do not fit their width saturate, so
    /// [`validate`](Self::validate) rejects the result instead of the
    /// arithmetic overflowing.
    pub fn pcm(channels: u16, sample_rate: u32, bits_per_sample: u16) -> Self {
        let block_align = channels as u32 * bits_per_sample as u32 / 8;
        let byte_rate = sample_rate as u64 * block_align as u64;
        Self {
            audio_format: PCM_FORMAT,
            channels,
            sample_rate,
            byte_rate: u32::try_from(byte_rate).unwrap_or(u32::MAX),
            block_align: u16::try_from(block_align).unwrap_or(u16::MAX),
            bits_per_sample,
        }
    }

    /// Bytes occupied by one sample of one channel.
    pub fn bytes_per_sample(&self) -> usize {
        self.bits_per_sample as usize / 8
    }

    /// Check the fields against what this crate can embed into.
    pub fn validate(&self) -> Result<()> {
        if self.audio_format != PCM_FORMAT {
            return Err(WavError::UnsupportedFormat("audio format is not linear PCM"));
        }
        if !matches!(self.channels, 1 | 2) {
            return Err(WavError::UnsupportedFormat("channel count must be 1 or 2"));
        }
        if !matches!(self.bits_per_sample, 8 | 16 | 32) {
            return Err(WavError::UnsupportedFormat("bits per sample must be 8, 16 or 32"));
        }
        if self.block_align as u32 != self.channels as u32 * self.bits_per_sample as u32 / 8 {
            return Err(WavError::InvalidField("block align does not match channels and sample width"));
        }
        let expected_byte_rate =
            self.sample_rate as u64 * self.channels as u64 * self.bits_per_sample as u64 / 8;
        if self.byte_rate as u64 != expected_byte_rate {
            return Err(WavError::InvalidField("byte rate does not match sample rate and block align"));
        }
        Ok(())
    }

    fn parse(body: &[u8]) -> Result<Self> {
        let mut r = Cursor::new(body);
        let fmt = Self {
            audio_format: r.read_u16::<LittleEndian>().map_err(eof)?,
            channels: r.read_u16::<LittleEndian>().map_err(eof)?,
            sample_rate: r.read_u32::<LittleEndian>().map_err(eof)?,
            byte_rate: r.read_u32::<LittleEndian>().map_err(eof)?,
            block_align: r.read_u16::<LittleEndian>().map_err(eof)?,
            bits_per_sample: r.read_u16::<LittleEndian>().map_err(eof)?,
        };
        fmt.validate()?;
        Ok(fmt)
    }

    fn write_body(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.audio_format.to_le_bytes());
        out.extend_from_slice(&self.channels.to_le_bytes());
        out.extend_from_slice(&self.sample_rate.to_le_bytes());
        out.extend_from_slice(&self.byte_rate.to_le_bytes());
        out.extend_from_slice(&self.block_align.to_le_bytes());
        out.extend_from_slice(&self.bits_per_sample.to_le_bytes());
    }
}

/// A sub-chunk we do not interpret, kept for byte-exact re-serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk {
    pub tag: [u8; 4],
    pub body: Vec<u8>,
    /// RIFF word-alignment byte following an odd-sized body, if present.
    pub pad: Option<u8>,
}

impl RawChunk {
    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&(self.body.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.body);
        if let Some(pad) = self.pad {
            out.push(pad);
        }
    }
}

/// Everything in a WAV stream apart from the decoded samples.
#[derive(Debug, Clone)]
pub(crate) struct Layout {
    pub endianness: Endianness,
    /// The RIFF size field exactly as read (not recomputed, so that
    /// slightly-off writers still round-trip).
    pub riff_size: u32,
    pub format: FormatChunk,
    /// Chunks between `fmt ` and `data`, in file order.
    pub extra_chunks: Vec<RawChunk>,
    /// Declared size of the `data` chunk.
    pub data_size: u32,
    /// Byte offset of the first sample.
    pub data_offset: usize,
}

/// Map a short read to [`WavError::UnexpectedEof`].
fn eof(e: io::Error) -> WavError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        WavError::UnexpectedEof
    } else {
        WavError::Io(e)
    }
}

/// Sequential reader over the chunk structure of a WAV byte stream.
struct ChunkReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> ChunkReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { cursor: Cursor::new(data) }
    }

    fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.position())
    }

    fn read_tag(&mut self) -> Result<[u8; 4]> {
        let mut tag = [0u8; 4];
        io::Read::read_exact(&mut self.cursor, &mut tag).map_err(eof)?;
        Ok(tag)
    }

    fn expect_tag(&mut self, expected: [u8; 4], name: &'static str) -> Result<()> {
        let found = self.read_tag()?;
        if found != expected {
            return Err(WavError::BadTag { expected: name, found });
        }
        Ok(())
    }

    fn read_u32(&mut self) -> Result<u32> {
        self.cursor.read_u32::<LittleEndian>().map_err(eof)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(WavError::UnexpectedEof);
        }
        let start = self.position();
        let data: &'a [u8] = *self.cursor.get_ref();
        self.cursor.set_position((start + len) as u64);
        Ok(&data[start..start + len])
    }

    /// Read an optional pad byte after an odd-sized chunk body.
    fn take_pad(&mut self, body_len: usize) -> Option<u8> {
        if body_len % 2 == 1 && self.remaining() > 0 {
            self.take(1).ok().map(|b| b[0])
        } else {
            None
        }
    }
}

/// Parse the RIFF header, the `fmt ` chunk and any chunks up to `data`.
///
/// Returns the layout with `data_offset` pointing at the first sample byte.
/// The caller verifies that the declared data size is actually present.
pub(crate) fn parse_layout(data: &[u8]) -> Result<Layout> {
    let mut r = ChunkReader::new(data);

    let riff_tag = r.read_tag()?;
    let endianness = Endianness::from_riff_tag(riff_tag).ok_or(WavError::BadTag {
        expected: "RIFF",
        found: riff_tag,
    })?;
    let riff_size = r.read_u32()?;
    r.expect_tag(WAVE, "WAVE")?;

    r.expect_tag(FMT, "fmt ")?;
    let fmt_size = r.read_u32()?;
    if fmt_size != FMT_CHUNK_SIZE {
        return Err(WavError::UnsupportedFormat("fmt chunk size must be 16"));
    }
    let format = FormatChunk::parse(r.take(FMT_CHUNK_SIZE as usize)?)?;

    let mut extra_chunks = Vec::new();
    loop {
        let tag = r.read_tag()?;
        let size = r.read_u32()?;
        if tag == DATA {
            return Ok(Layout {
                endianness,
                riff_size,
                format,
                extra_chunks,
                data_size: size,
                data_offset: r.position(),
            });
        }
        let body = r.take(size as usize)?.to_vec();
        let pad = r.take_pad(body.len());
        log::trace!(
            "skipping {:?} chunk ({} bytes)",
            String::from_utf8_lossy(&tag),
            body.len()
        );
        extra_chunks.push(RawChunk { tag, body, pad });
    }
}

/// Serialize everything that precedes the sample bytes.
pub(crate) fn write_layout(layout: &Layout, out: &mut Vec<u8>) {
    out.extend_from_slice(&layout.endianness.riff_tag());
    out.extend_from_slice(&layout.riff_size.to_le_bytes());
    out.extend_from_slice(&WAVE);

    out.extend_from_slice(&FMT);
    out.extend_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
    layout.format.write_body(out);

    for chunk in &layout.extra_chunks {
        chunk.write_to(out);
    }

    out.extend_from_slice(&DATA);
    out.extend_from_slice(&layout.data_size.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(fmt: &FormatChunk, data_size: u32) -> Vec<u8> {
        let layout = Layout {
            endianness: Endianness::Little,
            riff_size: 36 + data_size,
            format: fmt.clone(),
            extra_chunks: Vec::new(),
            data_size,
            data_offset: 44,
        };
        let mut out = Vec::new();
        write_layout(&layout, &mut out);
        out
    }

    #[test]
    fn canonical_header_is_44_bytes() {
        let out = header(&FormatChunk::pcm(2, 44_100, 16), 0);
        assert_eq!(out.len(), 44);
        assert_eq!(&out[..4], b"RIFF");
        assert_eq!(&out[8..16], b"WAVEfmt ");
        assert_eq!(&out[36..40], b"data");
    }

    #[test]
    fn parse_layout_roundtrip() {
        let fmt = FormatChunk::pcm(1, 8_000, 8);
        let out = header(&fmt, 0);
        let layout = parse_layout(&out).unwrap();
        assert_eq!(layout.format, fmt);
        assert_eq!(layout.data_offset, 44);
        assert_eq!(layout.riff_size, 36);
    }

    #[test]
    fn pcm_derives_rates() {
        let fmt = FormatChunk::pcm(2, 44_100, 16);
        assert_eq!(fmt.block_align, 4);
        assert_eq!(fmt.byte_rate, 176_400);
        assert!(fmt.validate().is_ok());
    }

    #[test]
    fn pcm_saturates_oversized_rates() {
        let fmt = FormatChunk::pcm(2, u32::MAX, 32);
        assert_eq!(fmt.block_align, 8);
        assert_eq!(fmt.byte_rate, u32::MAX);
        assert!(matches!(fmt.validate(), Err(WavError::InvalidField(_))));

        let fmt = FormatChunk::pcm(u16::MAX, 8_000, 32);
        assert_eq!(fmt.block_align, u16::MAX);
        assert!(fmt.validate().is_err());
    }

    #[test]
    fn rejects_bad_block_align() {
        let mut fmt = FormatChunk::pcm(2, 44_100, 16);
        fmt.block_align = 2;
        assert!(matches!(fmt.validate(), Err(WavError::InvalidField(_))));
    }

    #[test]
    fn rejects_24_bit() {
        let fmt = FormatChunk::pcm(1, 44_100, 24);
        assert!(matches!(fmt.validate(), Err(WavError::UnsupportedFormat(_))));
    }

    #[test]
    fn rejects_missing_wave_tag() {
        let mut out = header(&FormatChunk::pcm(1, 8_000, 16), 0);
        out[8..12].copy_from_slice(b"AVI ");
        assert!(matches!(
            parse_layout(&out),
            Err(WavError::BadTag { expected: "WAVE", .. })
        ));
    }

    #[test]
    fn truncated_input_is_eof() {
        let out = header(&FormatChunk::pcm(1, 8_000, 16), 0);
        assert!(matches!(parse_layout(&out[..30]), Err(WavError::UnexpectedEof)));
        assert!(matches!(parse_layout(&[]), Err(WavError::UnexpectedEof)));
    }

    #[test]
    fn write_layout_reproduces_parsed_header() {
        let mut out = header(&FormatChunk::pcm(2, 48_000, 32), 0);
        let mut extra = Vec::new();
        extra.extend_from_slice(b"fact");
        extra.extend_from_slice(&5u32.to_le_bytes());
        extra.extend_from_slice(&[9, 8, 7, 6, 5, 0]);
        out.splice(36..36, extra);

        let layout = parse_layout(&out).unwrap();
        let mut written = Vec::new();
        write_layout(&layout, &mut written);
        assert_eq!(written, out);
    }

    #[test]
    fn extra_chunks_are_collected() {
        let mut out = header(&FormatChunk::pcm(1, 8_000, 16), 0);
        // Splice a 3-byte odd chunk (plus pad) before "data".
        let mut extra = Vec::new();
        extra.extend_from_slice(b"junk");
        extra.extend_from_slice(&3u32.to_le_bytes());
        extra.extend_from_slice(&[1, 2, 3, 0]);
        out.splice(36..36, extra);

        let layout = parse_layout(&out).unwrap();
        assert_eq!(layout.extra_chunks.len(), 1);
        assert_eq!(layout.extra_chunks[0].tag, *b"junk");
        assert_eq!(layout.extra_chunks[0].body, vec![1, 2, 3]);
        assert_eq!(layout.extra_chunks[0].pad, Some(0));
        assert_eq!(layout.data_offset, out.len());
    }
}
