// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Cryptographic primitives behind the encryption strategies.
//!
//! - Passphrase keys come from Argon2id, PBKDF2-HMAC-SHA256 or scrypt over
//!   a random 16-byte salt. The header records which one.
//! - All symmetric encryption is AES-256-GCM-SIV with a 12-byte nonce. The
//!   16-byte authentication tag is appended to the ciphertext.
//! - Public-key encryption is ephemeral-static X25519. The AES key is
//!   SHA-256 over a domain label, the shared secret and both public keys.

use aes_gcm_siv::aead::Aead;
use aes_gcm_siv::{Aes256GcmSiv, Key, KeyInit, Nonce};
use argon2::Argon2;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::stego::encryptor::HashKind;
use crate::stego::error::StegoError;

/// KDF salt length in bytes.
pub const SALT_LEN: usize = 16;
/// AES-GCM-SIV nonce length in bytes.
pub const NONCE_LEN: usize = 12;
/// AES-GCM-SIV authentication tag length in bytes.
pub const TAG_LEN: usize = 16;
/// AES-256 key length, also the X25519 key length.
pub const KEY_LEN: usize = 32;

/// PBKDF2-HMAC-SHA256 iteration count.
pub const PBKDF2_ROUNDS: u32 = 100_000;
/// scrypt cost: N = 2^14, r = 8, p = 1.
pub const SCRYPT_LOG_N: u8 = 14;
pub const SCRYPT_R: u32 = 8;
pub const SCRYPT_P: u32 = 1;

const SEALED_BOX_DOMAIN: &[u8] = b"stegowav-x25519-aes256gcmsiv-v1";

pub fn random_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

pub fn random_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Derive an AES-256 key from a passphrase and salt.
///
/// # Errors
/// [`StegoError::Configuration`] for [`HashKind::None`] or parameters the
/// KDF rejects (e.g. an Argon2 salt shorter than 8 bytes).
pub fn derive_key(kdf: HashKind, passphrase: &str, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, StegoError> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    match kdf {
        HashKind::None => return Err(StegoError::config("passphrase keys need a key-derivation function")),
        HashKind::Argon2id => Argon2::default()
            .hash_password_into(passphrase.as_bytes(), salt, &mut *key)
            .map_err(|e| StegoError::config(format!("Argon2 key derivation failed: {e}")))?,
        HashKind::Pbkdf2Sha256 => pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, PBKDF2_ROUNDS, &mut *key),
        HashKind::Scrypt => {
            let params = scrypt::Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN)
                .map_err(|e| StegoError::config(format!("invalid scrypt parameters: {e}")))?;
            scrypt::scrypt(passphrase.as_bytes(), salt, &params, &mut *key)
                .map_err(|e| StegoError::config(format!("scrypt key derivation failed: {e}")))?;
        }
    }
    Ok(key)
}

fn cipher(key: &[u8; KEY_LEN]) -> Aes256GcmSiv {
    Aes256GcmSiv::new(Key::<Aes256GcmSiv>::from_slice(key))
}

/// AES-256-GCM-SIV encrypt. Returns `ciphertext ‖ tag`.
pub fn seal(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN], plaintext: &[u8]) -> Result<Vec<u8>, StegoError> {
    cipher(key)
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| StegoError::config("plaintext too long for AES-GCM-SIV"))
}

/// AES-256-GCM-SIV decrypt and authenticate.
///
/// # Errors
/// [`StegoError::DecryptionFailed`] on a wrong key or tampered ciphertext.
pub fn open(key: &[u8; KEY_LEN], nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Result<Vec<u8>, StegoError> {
    cipher(key)
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| StegoError::DecryptionFailed)
}

/// Generate an X25519 key pair. Returns `(secret, public)`.
pub fn generate_keypair() -> (Zeroizing<[u8; KEY_LEN]>, [u8; KEY_LEN]) {
    let secret = StaticSecret::random_from_rng(OsRng);
    let public = PublicKey::from(&secret);
    (Zeroizing::new(secret.to_bytes()), public.to_bytes())
}

/// Public key belonging to an X25519 secret key.
pub fn public_key(secret: &[u8; KEY_LEN]) -> [u8; KEY_LEN] {
    PublicKey::from(&StaticSecret::from(*secret)).to_bytes()
}

fn sealed_box_key(shared: &[u8], ephemeral: &[u8; KEY_LEN], recipient: &[u8; KEY_LEN]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut hasher = Sha256::new();
    hasher.update(SEALED_BOX_DOMAIN);
    hasher.update(shared);
    hasher.update(ephemeral);
    hasher.update(recipient);
    Zeroizing::new(hasher.finalize().into())
}

/// Encrypt to an X25519 public key. Returns `ephemeral_pub ‖ nonce ‖ ciphertext ‖ tag`.
pub fn seal_to(recipient: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>, StegoError> {
    let ephemeral = StaticSecret::random_from_rng(OsRng);
    let ephemeral_pub = PublicKey::from(&ephemeral).to_bytes();
    let shared = ephemeral.diffie_hellman(&PublicKey::from(*recipient));
    let key = sealed_box_key(shared.as_bytes(), &ephemeral_pub, recipient);
    let nonce = random_nonce();
    let ciphertext = seal(&key, &nonce, plaintext)?;

    let mut out = Vec::with_capacity(KEY_LEN + NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&ephemeral_pub);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Inverse of [`seal_to`] using the recipient's secret key.
pub fn open_with(secret: &[u8; KEY_LEN], sealed: &[u8]) -> Result<Vec<u8>, StegoError> {
    if sealed.len() < KEY_LEN + NONCE_LEN + TAG_LEN {
        return Err(StegoError::DecryptionFailed);
    }
    let (ephemeral_pub, rest) = sealed.split_at(KEY_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
    let mut ephemeral = [0u8; KEY_LEN];
    ephemeral.copy_from_slice(ephemeral_pub);
    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(nonce);

    let secret = StaticSecret::from(*secret);
    let recipient = PublicKey::from(&secret).to_bytes();
    let shared = secret.diffie_hellman(&PublicKey::from(ephemeral));
    let key = sealed_box_key(shared.as_bytes(), &ephemeral, &recipient);
    open(&key, &nonce_bytes, ciphertext)
}
