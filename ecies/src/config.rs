//! Negotiated algorithms.

/// Key derivation function used to stretch the shared secret.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum KdfAlgorithm {
    /// HKDF with SHA-256 (RFC 5869), salted with the exchange salt.
    #[default]
    HkdfSha256,

    /// ANSI X9.63 KDF with SHA-256. The exchange salt is prepended to the
    /// shared info.
    X963Sha256,
}

/// Message authentication code appended to each ciphertext.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum MacAlgorithm {
    /// HMAC-SHA256 with a 32-byte key and tag.
    #[default]
    HmacSha256,
}

impl MacAlgorithm {
    /// Key length in bytes.
    pub fn key_len(self) -> usize {
        match self {
            MacAlgorithm::HmacSha256 => 32,
        }
    }

    /// Tag length in bytes.
    pub fn tag_len(self) -> usize {
        match self {
            MacAlgorithm::HmacSha256 => 32,
        }
    }
}

/// Block cipher used for the message body, with PKCS#7 padding.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum CipherAlgorithm {
    /// AES-128 in CBC mode.
    #[default]
    Aes128Cbc,

    /// AES-256 in CBC mode.
    Aes256Cbc,
}

impl CipherAlgorithm {
    /// Key length in bytes.
    pub fn key_len(self) -> usize {
        match self {
            CipherAlgorithm::Aes128Cbc => 16,
            CipherAlgorithm::Aes256Cbc => 32,
        }
    }

    /// IV length in bytes.
    pub fn iv_len(self) -> usize {
        16
    }
}

/// Algorithms and KDF info shared by both sides of an exchange.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Config {
    /// Key derivation function.
    pub kdf: KdfAlgorithm,

    /// Message authentication code.
    pub mac: MacAlgorithm,

    /// Block cipher.
    pub cipher: CipherAlgorithm,

    /// Optional context info mixed into key derivation.
    pub info: Vec<u8>,
}

impl Config {
    /// Length of one derived keyset: `encryption key ∥ IV ∥ MAC key`.
    pub(crate) fn keyset_len(&self) -> usize {
        self.cipher.key_len() + self.cipher.iv_len() + self.mac.key_len()
    }
}
