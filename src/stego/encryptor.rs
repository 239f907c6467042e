// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/phasmcore

//! Encryption strategies and the credential boundary.
//!
//! An [`Encryptor`] is an immutable value built by the caller. Besides
//! `encrypt`/`decrypt` it answers capability queries (`kind`, `hash_kind`,
//! `salt`, `nonce`) that the message header records, so a decoder can rebuild
//! the matching strategy from the header plus one [`CredentialSource`]
//! request.

use std::fmt;

use zeroize::Zeroizing;

use crate::stego::crypto::{self, KEY_LEN, NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::stego::error::StegoError;
use crate::stego::header::{MessageHeader, HEADER_NONCE_LEN};

/// Version byte that opens every token ciphertext.
const TOKEN_VERSION: u8 = 0x80;

/// Encryption scheme identifier stored in the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EncryptionKind {
    #[default]
    None = 0,
    /// Self-contained authenticated token from a passphrase.
    Token = 1,
    /// Passphrase-keyed cipher with its nonce stored in the header.
    Block = 2,
    /// Public-key sealed box.
    Asymmetric = 3,
}

impl EncryptionKind {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::None),
            1 => Some(Self::Token),
            2 => Some(Self::Block),
            3 => Some(Self::Asymmetric),
            _ => None,
        }
    }

    /// Bytes the scheme adds to any plaintext.
    pub fn overhead(self) -> usize {
        match self {
            Self::None => 0,
            Self::Token => 1 + NONCE_LEN + TAG_LEN,
            Self::Block => TAG_LEN,
            Self::Asymmetric => KEY_LEN + NONCE_LEN + TAG_LEN,
        }
    }
}

/// Key-derivation function identifier stored in the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HashKind {
    #[default]
    None = 0,
    Argon2id = 1,
    /// PBKDF2-HMAC-SHA256, 100 000 rounds.
    Pbkdf2Sha256 = 2,
    /// scrypt with N = 2^14, r = 8, p = 1.
    Scrypt = 3,
}

impl HashKind {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::None),
            1 => Some(Self::Argon2id),
            2 => Some(Self::Pbkdf2Sha256),
            3 => Some(Self::Scrypt),
            _ => None,
        }
    }
}

/// Supplies secrets when a decoder has to rebuild an encryptor from a header.
///
/// Implement this to prompt a user; each method is called at most once per
/// decode.
pub trait CredentialSource {
    fn passphrase(&mut self) -> Result<Zeroizing<String>, StegoError>;
    fn secret_key(&mut self) -> Result<Zeroizing<[u8; KEY_LEN]>, StegoError>;
}

/// Credentials known up front.
#[derive(Clone, Default)]
pub struct Credentials {
    passphrase: Option<Zeroizing<String>>,
    secret_key: Option<Zeroizing<[u8; KEY_LEN]>>,
}

impl Credentials {
    pub fn with_passphrase(passphrase: impl Into<String>) -> Self {
        Self {
            passphrase: Some(Zeroizing::new(passphrase.into())),
            secret_key: None,
        }
    }

    pub fn with_secret_key(secret_key: [u8; KEY_LEN]) -> Self {
        Self {
            passphrase: None,
            secret_key: Some(Zeroizing::new(secret_key)),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl CredentialSource for Credentials {
    fn passphrase(&mut self) -> Result<Zeroizing<String>, StegoError> {
        self.passphrase.clone().ok_or(StegoError::MissingCredential("passphrase"))
    }

    fn secret_key(&mut self) -> Result<Zeroizing<[u8; KEY_LEN]>, StegoError> {
        self.secret_key.clone().ok_or(StegoError::MissingCredential("secret key"))
    }
}

/// A source that has nothing to give. Enough for unencrypted messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialSource for NoCredentials {
    fn passphrase(&mut self) -> Result<Zeroizing<String>, StegoError> {
        Err(StegoError::MissingCredential("passphrase"))
    }

    fn secret_key(&mut self) -> Result<Zeroizing<[u8; KEY_LEN]>, StegoError> {
        Err(StegoError::MissingCredential("secret key"))
    }
}

/// Encryption strategy.
#[derive(Clone, Default)]
pub enum Encryptor {
    /// Identity.
    #[default]
    None,
    /// `0x80 ‖ nonce ‖ AES-GCM-SIV(plaintext)` under a passphrase key.
    Token {
        key: Zeroizing<[u8; KEY_LEN]>,
        kdf: HashKind,
        salt: [u8; SALT_LEN],
    },
    /// Bare AES-GCM-SIV under a passphrase key; the nonce travels in the header.
    Block {
        key: Zeroizing<[u8; KEY_LEN]>,
        kdf: HashKind,
        salt: [u8; SALT_LEN],
        nonce: [u8; NONCE_LEN],
    },
    /// X25519 sealed box. Without a secret key the value can only encrypt.
    Asymmetric {
        public_key: [u8; KEY_LEN],
        secret_key: Option<Zeroizing<[u8; KEY_LEN]>>,
    },
}

impl Encryptor {
    /// Token strategy with an Argon2id key and a fresh random salt.
    pub fn token(passphrase: &str) -> Result<Self, StegoError> {
        Self::token_with(passphrase, HashKind::Argon2id, crypto::random_salt())
    }

    /// Token strategy with an explicit key-derivation function and salt.
    ///
    /// # Errors
    /// [`StegoError::Configuration`] if `kdf` is [`HashKind::None`].
    pub fn token_with(passphrase: &str, kdf: HashKind, salt: [u8; SALT_LEN]) -> Result<Self, StegoError> {
        let key = crypto::derive_key(kdf, passphrase, &salt)?;
        Ok(Self::Token { key, kdf, salt })
    }

    /// Block strategy with an Argon2id key and a fresh random salt and nonce.
    pub fn block(passphrase: &str) -> Result<Self, StegoError> {
        Self::block_with(passphrase, HashKind::Argon2id, crypto::random_salt(), crypto::random_nonce())
    }

    pub fn block_with(
        passphrase: &str,
        kdf: HashKind,
        salt: [u8; SALT_LEN],
        nonce: [u8; NONCE_LEN],
    ) -> Result<Self, StegoError> {
        let key = crypto::derive_key(kdf, passphrase, &salt)?;
        Ok(Self::Block { key, kdf, salt, nonce })
    }

    /// Encrypt-only strategy for a recipient's public key.
    pub fn asymmetric(public_key: [u8; KEY_LEN]) -> Self {
        Self::Asymmetric {
            public_key,
            secret_key: None,
        }
    }

    /// Strategy that can both encrypt and decrypt.
    pub fn asymmetric_keypair(secret_key: [u8; KEY_LEN]) -> Self {
        Self::Asymmetric {
            public_key: crypto::public_key(&secret_key),
            secret_key: Some(Zeroizing::new(secret_key)),
        }
    }

    pub fn kind(&self) -> EncryptionKind {
        match self {
            Self::None => EncryptionKind::None,
            Self::Token { .. } => EncryptionKind::Token,
            Self::Block { .. } => EncryptionKind::Block,
            Self::Asymmetric { .. } => EncryptionKind::Asymmetric,
        }
    }

    pub fn hash_kind(&self) -> HashKind {
        match self {
            Self::Token { kdf, .. } | Self::Block { kdf, .. } => *kdf,
            Self::None | Self::Asymmetric { .. } => HashKind::None,
        }
    }

    /// KDF salt for the header, if the scheme has one.
    pub fn salt(&self) -> Option<[u8; SALT_LEN]> {
        match self {
            Self::Token { salt, .. } | Self::Block { salt, .. } => Some(*salt),
            _ => None,
        }
    }

    /// Header nonce field (zero-padded to the header width), if the scheme
    /// keeps its nonce outside the ciphertext.
    pub fn nonce(&self) -> Option<[u8; HEADER_NONCE_LEN]> {
        match self {
            Self::Block { nonce, .. } => {
                let mut field = [0u8; HEADER_NONCE_LEN];
                field[..NONCE_LEN].copy_from_slice(nonce);
                Some(field)
            }
            _ => None,
        }
    }

    /// False for an asymmetric strategy that only holds a public key.
    pub fn can_decrypt(&self) -> bool {
        match self {
            Self::Asymmetric { secret_key, .. } => secret_key.is_some(),
            _ => true,
        }
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, StegoError> {
        match self {
            Self::None => Ok(plaintext.to_vec()),
            Self::Token { key, .. } => {
                let nonce = crypto::random_nonce();
                let sealed = crypto::seal(key, &nonce, plaintext)?;
                let mut out = Vec::with_capacity(1 + NONCE_LEN + sealed.len());
                out.push(TOKEN_VERSION);
                out.extend_from_slice(&nonce);
                out.extend_from_slice(&sealed);
                Ok(out)
            }
            Self::Block { key, nonce, .. } => crypto::seal(key, nonce, plaintext),
            Self::Asymmetric { public_key, .. } => crypto::seal_to(public_key, plaintext),
        }
    }

    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, StegoError> {
        match self {
            Self::None => Ok(ciphertext.to_vec()),
            Self::Token { key, .. } => {
                if ciphertext.len() < 1 + NONCE_LEN + TAG_LEN || ciphertext[0] != TOKEN_VERSION {
                    return Err(StegoError::DecryptionFailed);
                }
                let mut nonce = [0u8; NONCE_LEN];
                nonce.copy_from_slice(&ciphertext[1..1 + NONCE_LEN]);
                crypto::open(key, &nonce, &ciphertext[1 + NONCE_LEN..])
            }
            Self::Block { key, nonce, .. } => crypto::open(key, nonce, ciphertext),
            Self::Asymmetric { secret_key, .. } => {
                let secret = secret_key.as_ref().ok_or(StegoError::MissingCredential("secret key"))?;
                crypto::open_with(secret, ciphertext)
            }
        }
    }

    /// Rebuild the strategy a message was encrypted with from its header,
    /// asking `credentials` for the one secret the scheme needs.
    pub fn from_header(header: &MessageHeader, credentials: &mut dyn CredentialSource) -> Result<Self, StegoError> {
        let require_kdf = || {
            if header.hash_kind == HashKind::None {
                Err(StegoError::integrity(format!(
                    "{:?} encryption needs a key-derivation function, header says none",
                    header.encryption_kind
                )))
            } else {
                Ok(header.hash_kind)
            }
        };
        match header.encryption_kind {
            EncryptionKind::None => Ok(Self::None),
            EncryptionKind::Token => {
                let kdf = require_kdf()?;
                let passphrase = credentials.passphrase()?;
                Self::token_with(&passphrase, kdf, header.salt)
            }
            EncryptionKind::Block => {
                let kdf = require_kdf()?;
                let passphrase = credentials.passphrase()?;
                let mut nonce = [0u8; NONCE_LEN];
                nonce.copy_from_slice(&header.nonce[..NONCE_LEN]);
                Self::block_with(&passphrase, kdf, header.salt, nonce)
            }
            EncryptionKind::Asymmetric => {
                let secret = credentials.secret_key()?;
                Ok(Self::asymmetric_keypair(*secret))
            }
        }
    }
}

impl fmt::Debug for Encryptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("Encryptor::None"),
            Self::Token { kdf, salt, .. } => f
                .debug_struct("Encryptor::Token")
                .field("kdf", kdf)
                .field("salt", salt)
                .finish_non_exhaustive(),
            Self::Block { kdf, salt, nonce, .. } => f
                .debug_struct("Encryptor::Block")
                .field("kdf", kdf)
                .field("salt", salt)
                .field("nonce", nonce)
                .finish_non_exhaustive(),
            Self::Asymmetric { public_key, secret_key } => f
                .debug_struct("Encryptor::Asymmetric")
                .field("public_key", public_key)
                .field("can_decrypt", &secret_key.is_some())
                .finish(),
        }
    }
}
