// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Synthetic WAV carriers for integration tests.
//!
//! Files are assembled byte by byte here, independent of the crate's own
//! writer, so parse tests check against a second implementation.

#![allow(dead_code)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic noise in the full signed range of `bits`-bit samples.
pub fn noise_samples(n: usize, bits: u16, seed: u64) -> Vec<i32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let (lo, hi) = match bits {
        8 => (i8::MIN as i32, i8::MAX as i32),
        16 => (i16::MIN as i32, i16::MAX as i32),
        _ => (i32::MIN, i32::MAX),
    };
    (0..n).map(|_| rng.gen_range(lo..=hi)).collect()
}

pub struct WavBuilder {
    big_endian: bool,
    channels: u16,
    sample_rate: u32,
    bits: u16,
    samples: Vec<i32>,
    before_data: Vec<([u8; 4], Vec<u8>)>,
    after_data: Vec<([u8; 4], Vec<u8>)>,
}

impl WavBuilder {
    pub fn new(channels: u16, sample_rate: u32, bits: u16) -> Self {
        Self {
            big_endian: false,
            channels,
            sample_rate,
            bits,
            samples: Vec::new(),
            before_data: Vec::new(),
            after_data: Vec::new(),
        }
    }

    pub fn samples(mut self, samples: Vec<i32>) -> Self {
        self.samples = samples;
        self
    }

    pub fn noise(self, n: usize, seed: u64) -> Self {
        let bits = self.bits;
        self.samples(noise_samples(n, bits, seed))
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    pub fn chunk_before_data(mut self, tag: &[u8; 4], body: &[u8]) -> Self {
        self.before_data.push((*tag, body.to_vec()));
        self
    }

    pub fn chunk_after_data(mut self, tag: &[u8; 4], body: &[u8]) -> Self {
        self.after_data.push((*tag, body.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let bytes_per_sample = self.bits as usize / 8;
        let mut data = Vec::with_capacity(self.samples.len() * bytes_per_sample);
        for &s in &self.samples {
            let le = s.to_le_bytes();
            let mut word = le[..bytes_per_sample].to_vec();
            if self.big_endian {
                word.reverse();
            }
            data.extend_from_slice(&word);
        }

        let mut body = Vec::new();
        body.extend_from_slice(b"WAVE");
        body.extend_from_slice(b"fmt ");
        body.extend_from_slice(&16u32.to_le_bytes());
        body.extend_from_slice(&1u16.to_le_bytes());
        body.extend_from_slice(&self.channels.to_le_bytes());
        body.extend_from_slice(&self.sample_rate.to_le_bytes());
        let block_align = self.channels * self.bits / 8;
        body.extend_from_slice(&(self.sample_rate * block_align as u32).to_le_bytes());
        body.extend_from_slice(&block_align.to_le_bytes());
        body.extend_from_slice(&self.bits.to_le_bytes());
        for (tag, chunk) in &self.before_data {
            push_chunk(&mut body, tag, chunk);
        }
        push_chunk(&mut body, b"data", &data);
        for (tag, chunk) in &self.after_data {
            push_chunk(&mut body, tag, chunk);
        }

        let mut out = Vec::with_capacity(body.len() + 8);
        out.extend_from_slice(if self.big_endian { b"RIFX" } else { b"RIFF" });
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&body);
        out
    }
}

fn push_chunk(out: &mut Vec<u8>, tag: &[u8; 4], body: &[u8]) {
    out.extend_from_slice(tag);
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(body);
    if body.len() % 2 == 1 {
        out.push(0);
    }
}

/// Mono 16-bit 44.1 kHz noise carrier.
pub fn mono16(n: usize, seed: u64) -> Vec<u8> {
    WavBuilder::new(1, 44_100, 16).noise(n, seed).build()
}
