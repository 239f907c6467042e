// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! General-purpose Reed-Solomon codec over GF(2^8).
//!
//! Systematic RS(255, k) with primitive polynomial 0x11D and first consecutive
//! root alpha^0. The number of parity symbols is chosen at construction time
//! (1..=254). Blocks shorter than 255 symbols are treated as shortened codes:
//! they are virtually zero-padded at the front to 255 symbols.
//!
//! Decoding uses Berlekamp-Massey to find the error locator, Chien search to
//! find its roots and Forney's formula for the error values. A block is
//! correctable if it has at most `parity_len / 2` symbol errors.

use std::sync::OnceLock;

/// x^8 + x^4 + x^3 + x^2 + 1.
const PRIMITIVE: u16 = 0x11D;

/// Symbols in a full codeword.
pub const BLOCK_LEN: usize = 255;

struct Field {
    exp: [u8; 512],
    log: [u8; 256],
}

fn field() -> &'static Field {
    static FIELD: OnceLock<Field> = OnceLock::new();
    FIELD.get_or_init(|| {
        let mut exp = [0u8; 512];
        let mut log = [0u8; 256];
        let mut x: u16 = 1;
        for i in 0..255usize {
            exp[i] = x as u8;
            exp[i + 255] = x as u8;
            log[x as usize] = i as u8;
            x <<= 1;
            if x & 0x100 != 0 {
                x ^= PRIMITIVE;
            }
        }
        exp[510] = exp[0];
        exp[511] = exp[1];
        Field { exp, log }
    })
}

/// alpha^i for any i (reduced mod 255).
fn alpha_pow(i: usize) -> u8 {
    field().exp[i % 255]
}

/// alpha^-i.
fn alpha_pow_neg(i: usize) -> u8 {
    field().exp[(255 - i % 255) % 255]
}

fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let f = field();
    f.exp[f.log[a as usize] as usize + f.log[b as usize] as usize]
}

fn inv(a: u8) -> u8 {
    assert_ne!(a, 0, "zero has no inverse in GF(2^8)");
    let f = field();
    f.exp[255 - f.log[a as usize] as usize]
}

/// Horner evaluation, highest-degree coefficient first.
fn eval_desc(poly: &[u8], x: u8) -> u8 {
    poly.iter().fold(0u8, |acc, &c| mul(acc, x) ^ c)
}

/// Evaluation with the constant term first.
fn eval_asc(poly: &[u8], x: u8) -> u8 {
    let mut acc = 0u8;
    let mut power = 1u8;
    for &c in poly {
        acc ^= mul(c, power);
        power = mul(power, x);
    }
    acc
}

/// g(x) = (x - alpha^0)(x - alpha^1)...(x - alpha^(n-1)), highest degree first.
fn generator(parity_len: usize) -> Vec<u8> {
    let mut g = vec![1u8];
    for i in 0..parity_len {
        let root = alpha_pow(i);
        let mut next = vec![0u8; g.len() + 1];
        for (j, &c) in g.iter().enumerate() {
            next[j] ^= c;
            next[j + 1] ^= mul(c, root);
        }
        g = next;
    }
    g
}

/// The block had more symbol errors than the code can correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uncorrectable;

impl std::fmt::Display for Uncorrectable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Reed-Solomon block has too many errors to correct")
    }
}

impl std::error::Error for Uncorrectable {}

/// A Reed-Solomon codec with a fixed number of parity symbols.
#[derive(Debug, Clone)]
pub struct RsCodec {
    parity_len: usize,
    generator: Vec<u8>,
}

impl RsCodec {
    /// # Panics
    /// If `parity_len` is 0 or leaves no room for data (>= 255).
    pub fn new(parity_len: usize) -> Self {
        assert!(
            (1..BLOCK_LEN).contains(&parity_len),
            "parity length {parity_len} out of range 1..{BLOCK_LEN}"
        );
        Self {
            parity_len,
            generator: generator(parity_len),
        }
    }

    pub fn parity_len(&self) -> usize {
        self.parity_len
    }

    /// Largest number of data symbols in one block.
    pub fn max_data_len(&self) -> usize {
        BLOCK_LEN - self.parity_len
    }

    /// Maximum correctable symbol errors per block.
    pub fn correction_capacity(&self) -> usize {
        self.parity_len / 2
    }

    /// Encode one block: `data ‖ parity`.
    ///
    /// # Panics
    /// If `data` is longer than [`max_data_len`](Self::max_data_len).
    pub fn encode_block(&self, data: &[u8]) -> Vec<u8> {
        assert!(
            data.len() <= self.max_data_len(),
            "block of {} bytes exceeds {} data symbols",
            data.len(),
            self.max_data_len()
        );
        let n = self.parity_len;
        // Remainder of data(x) * x^n mod g(x), as an LFSR.
        let mut remainder = vec![0u8; n];
        for &symbol in data {
            let feedback = symbol ^ remainder[0];
            for j in 0..n - 1 {
                remainder[j] = remainder[j + 1] ^ mul(feedback, self.generator[j + 1]);
            }
            remainder[n - 1] = mul(feedback, self.generator[n]);
        }
        let mut block = Vec::with_capacity(data.len() + n);
        block.extend_from_slice(data);
        block.extend_from_slice(&remainder);
        block
    }

    /// Correct a received block and return its data part together with the
    /// number of symbols that were repaired.
    ///
    /// # Panics
    /// If `received` is shorter than the parity or longer than 255 symbols.
    pub fn decode_block(&self, received: &[u8]) -> Result<(Vec<u8>, usize), Uncorrectable> {
        assert!(
            received.len() >= self.parity_len && received.len() <= BLOCK_LEN,
            "received block of {} symbols is not a valid codeword length",
            received.len()
        );
        let data_len = received.len() - self.parity_len;
        let shortened = BLOCK_LEN - received.len();
        let mut full = vec![0u8; BLOCK_LEN];
        full[shortened..].copy_from_slice(received);

        let syndromes = self.syndromes(&full);
        if syndromes.iter().all(|&s| s == 0) {
            return Ok((received[..data_len].to_vec(), 0));
        }

        let locator = berlekamp_massey(&syndromes);
        let error_count = locator.len() - 1;
        if error_count > self.correction_capacity() {
            return Err(Uncorrectable);
        }

        let positions = chien_search(&locator).ok_or(Uncorrectable)?;
        let values = forney(&locator, &syndromes, &positions);
        for (&(_, index), &value) in positions.iter().zip(&values) {
            // An error in the virtual zero prefix means we located garbage.
            if index < shortened {
                return Err(Uncorrectable);
            }
            full[index] ^= value;
        }

        if self.syndromes(&full).iter().any(|&s| s != 0) {
            return Err(Uncorrectable);
        }
        Ok((full[shortened..shortened + data_len].to_vec(), error_count))
    }

    /// S_i = r(alpha^i) for i in 0..parity_len.
    fn syndromes(&self, full: &[u8]) -> Vec<u8> {
        (0..self.parity_len).map(|i| eval_desc(full, alpha_pow(i))).collect()
    }
}

/// Error locator sigma(x), constant term first.
fn berlekamp_massey(syndromes: &[u8]) -> Vec<u8> {
    let n = syndromes.len();
    let mut current = vec![0u8; n + 1];
    current[0] = 1;
    let mut current_len = 1usize;
    let mut previous = vec![0u8; n + 1];
    previous[0] = 1;
    let mut previous_len = 1usize;

    let mut errors = 0usize;
    let mut last_discrepancy = 1u8;
    let mut shift = 1usize;

    for step in 0..n {
        let mut discrepancy = syndromes[step];
        for i in 1..current_len {
            discrepancy ^= mul(current[i], syndromes[step - i]);
        }
        if discrepancy == 0 {
            shift += 1;
            continue;
        }

        let scale = mul(discrepancy, inv(last_discrepancy));
        let grows = 2 * errors <= step;
        let saved = grows.then(|| (current.clone(), current_len));

        current_len = current_len.max(previous_len + shift);
        for j in 0..previous_len {
            current[j + shift] ^= mul(scale, previous[j]);
        }

        match saved {
            Some((old, old_len)) => {
                previous = old;
                previous_len = old_len;
                errors = step + 1 - errors;
                last_discrepancy = discrepancy;
                shift = 1;
            }
            None => shift += 1,
        }
    }

    current.truncate(current_len);
    current
}

/// Roots of the locator. Returns `(power, index)` pairs where `power` is the
/// exponent of x for the erroneous coefficient and `index` its position in
/// the 255-symbol block. `None` if the root count does not match the degree.
fn chien_search(locator: &[u8]) -> Option<Vec<(usize, usize)>> {
    let degree = locator.len() - 1;
    let roots: Vec<(usize, usize)> = (0..BLOCK_LEN)
        .filter(|&p| eval_asc(locator, alpha_pow_neg(p)) == 0)
        .map(|p| (p, BLOCK_LEN - 1 - p))
        .collect();
    (roots.len() == degree).then_some(roots)
}

/// Error values: e = X * Omega(X^-1) / sigma'(X^-1) for a first root of alpha^0.
fn forney(locator: &[u8], syndromes: &[u8], positions: &[(usize, usize)]) -> Vec<u8> {
    let n = syndromes.len();
    // Omega(x) = S(x) * sigma(x) mod x^n
    let mut omega = vec![0u8; n];
    for (i, &l) in locator.iter().enumerate().take(n) {
        for (j, &s) in syndromes.iter().enumerate().take(n - i) {
            omega[i + j] ^= mul(l, s);
        }
    }
    // Formal derivative: only odd powers survive in characteristic 2.
    let mut derivative = vec![0u8; locator.len().saturating_sub(1)];
    for i in (1..locator.len()).step_by(2) {
        derivative[i - 1] = locator[i];
    }

    positions
        .iter()
        .map(|&(power, _)| {
            let x_inv = alpha_pow_neg(power);
            let denom = eval_asc(&derivative, x_inv);
            if denom == 0 {
                0
            } else {
                mul(alpha_pow(power), mul(eval_asc(&omega, x_inv), inv(denom)))
            }
        })
        .collect()
}
