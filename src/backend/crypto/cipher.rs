/**
 * Content Cipher
 *
 * Symmetric encryption of chat message bodies before they are persisted.
 *
 * # Blob Format
 *
 * ```text
 * hex( nonce (12 bytes) || AES-256-GCM ciphertext || tag (16 bytes) )
 * ```
 *
 * A fresh random nonce is drawn for every call, so encrypting the same
 * plaintext twice yields different blobs. The blob is self-contained: the
 * shared key is all that is needed to open it.
 *
 * # Key Material
 *
 * The key is process-wide configuration loaded once at startup and never
 * mutated, so the cipher is shared without locking. When no key is
 * configured every call fails with `CipherError::MissingKey`; plaintext is
 * never passed through.
 */
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use thiserror::Error;

/// Nonce length for AES-GCM
pub const NONCE_SIZE: usize = 12;

/// Authentication tag length for AES-GCM
pub const TAG_SIZE: usize = 16;

/// Smallest blob that can possibly decrypt (empty plaintext)
pub const MIN_BLOB_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// Key length for AES-256
pub const KEY_SIZE: usize = 32;

/// Content cipher failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// No key material was configured
    #[error("encryption key is not configured")]
    MissingKey,

    /// Configured key material has the wrong shape
    #[error("invalid encryption key: {0}")]
    InvalidKey(String),

    /// Encryption failed
    #[error("encryption failed")]
    Encryption,

    /// Blob could not be opened (too short, not hex, tampered or wrong key)
    #[error("decryption failed: {0}")]
    Decryption(&'static str),
}

/// Encrypts and decrypts message bodies with a shared key
#[derive(Clone)]
pub struct ContentCipher {
    cipher: Option<Aes256Gcm>,
}

impl std::fmt::Debug for ContentCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentCipher")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl ContentCipher {
    /// Cipher with a 256-bit key
    pub fn new(key: &[u8; KEY_SIZE]) -> Self {
        Self {
            cipher: Some(Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key))),
        }
    }

    /// Cipher without key material; every operation fails with `MissingKey`
    pub fn unconfigured() -> Self {
        Self { cipher: None }
    }

    /// Build from configuration
    ///
    /// Accepts 64 hex characters or exactly 32 raw bytes. `None` yields an
    /// unconfigured cipher.
    pub fn from_config(key: Option<&str>) -> Result<Self, CipherError> {
        match key {
            None => Ok(Self::unconfigured()),
            Some(raw) => Ok(Self::new(&parse_key(raw)?)),
        }
    }

    /// Whether key material is present
    pub fn is_configured(&self) -> bool {
        self.cipher.is_some()
    }

    /// Encrypt a message body into a hex blob
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let cipher = self.cipher.as_ref().ok_or(CipherError::MissingKey)?;

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CipherError::Encryption)?;

        let mut blob = Vec::with_capacity(NONCE_SIZE + sealed.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&sealed);
        Ok(hex::encode(blob))
    }

    /// Decrypt a hex blob produced by `encrypt`
    pub fn decrypt(&self, blob: &str) -> Result<String, CipherError> {
        let cipher = self.cipher.as_ref().ok_or(CipherError::MissingKey)?;

        let bytes = hex::decode(blob).map_err(|_| CipherError::Decryption("blob is not valid hex"))?;
        if bytes.len() < MIN_BLOB_SIZE {
            return Err(CipherError::Decryption("ciphertext too short"));
        }

        let (nonce, sealed) = bytes.split_at(NONCE_SIZE);
        let opened = cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| CipherError::Decryption("authentication failed"))?;

        String::from_utf8(opened).map_err(|_| CipherError::Decryption("plaintext is not UTF-8"))
    }
}

fn parse_key(raw: &str) -> Result<[u8; KEY_SIZE], CipherError> {
    let trimmed = raw.trim();
    let bytes = if trimmed.len() == KEY_SIZE * 2 && trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
        hex::decode(trimmed).map_err(|e| CipherError::InvalidKey(e.to_string()))?
    } else {
        raw.as_bytes().to_vec()
    };

    bytes.try_into().map_err(|bytes: Vec<u8>| {
        CipherError::InvalidKey(format!(
            "expected {} raw bytes or {} hex characters, got {} bytes",
            KEY_SIZE,
            KEY_SIZE * 2,
            bytes.len()
        ))
    })
}
