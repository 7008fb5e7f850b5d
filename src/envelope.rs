//! Cipher envelope - the persisted unit
//!
//! Binary layout:
//! ```text
//! [VERSION 1B][0x01 AES-256-GCM | 0x02 ChaCha20-Poly1305]
//! [SALT 16B][Argon2id salt, random per envelope]
//! [NONCE 12B][random per envelope]
//! [CIPHERTEXT variable]
//! [TAG 16B][AEAD tag over ciphertext, AAD = version || salt || caller AAD]
//! ```
//!
//! The text armor is standard base64 of the same bytes.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::crypto::{AeadCipher, NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::error::{CipherError, CipherResult};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Header size: VERSION(1) + SALT(16) + NONCE(12)
pub const HEADER_LEN: usize = 1 + SALT_LEN + NONCE_LEN;

/// Smallest well-formed envelope (empty plaintext)
pub const MIN_ENVELOPE_LEN: usize = HEADER_LEN + TAG_LEN;

// ---------------------------------------------------------------------------
// CipherEnvelope
// ---------------------------------------------------------------------------

/// Everything needed to decrypt except the passphrase
///
/// Only constructible with a known version, so a held envelope always maps
/// to a cipher.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherEnvelope {
    cipher: AeadCipher,
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
    ciphertext: Vec<u8>,
    tag: [u8; TAG_LEN],
}

impl CipherEnvelope {
    pub(crate) fn new(
        cipher: AeadCipher,
        salt: [u8; SALT_LEN],
        nonce: [u8; NONCE_LEN],
        ciphertext: Vec<u8>,
        tag: [u8; TAG_LEN],
    ) -> Self {
        Self {
            cipher,
            salt,
            nonce,
            ciphertext,
            tag,
        }
    }

    pub fn version(&self) -> u8 {
        self.cipher.format_version()
    }

    pub fn cipher(&self) -> AeadCipher {
        self.cipher
    }

    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    pub fn nonce(&self) -> &[u8; NONCE_LEN] {
        &self.nonce
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    pub fn tag(&self) -> &[u8; TAG_LEN] {
        &self.tag
    }

    /// Serialized length in bytes
    pub fn len(&self) -> usize {
        MIN_ENVELOPE_LEN + self.ciphertext.len()
    }

    /// True when the envelope carries an empty plaintext
    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }

    /// Header fields bound into the tag
    pub(crate) fn header_aad(version: u8, salt: &[u8; SALT_LEN], caller_aad: &[u8]) -> Vec<u8> {
        let mut aad = Vec::with_capacity(1 + SALT_LEN + caller_aad.len());
        aad.push(version);
        aad.extend_from_slice(salt);
        aad.extend_from_slice(caller_aad);
        aad
    }

    /// Serialize to bytes (version || salt || nonce || ciphertext || tag)
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        out.push(self.version());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Parse and validate envelope bytes
    pub fn from_bytes(data: &[u8]) -> CipherResult<Self> {
        let version = *data
            .first()
            .ok_or_else(|| CipherError::MalformedEnvelope("empty input".into()))?;

        let cipher =
            AeadCipher::from_version(version).ok_or(CipherError::UnsupportedVersion(version))?;

        if data.len() < MIN_ENVELOPE_LEN {
            return Err(CipherError::MalformedEnvelope(format!(
                "{} bytes is shorter than the {} byte minimum",
                data.len(),
                MIN_ENVELOPE_LEN
            )));
        }

        let tag_start = data.len() - TAG_LEN;
        let salt: [u8; SALT_LEN] = data[1..1 + SALT_LEN]
            .try_into()
            .map_err(|_| CipherError::MalformedEnvelope("invalid salt".into()))?;
        let nonce: [u8; NONCE_LEN] = data[1 + SALT_LEN..HEADER_LEN]
            .try_into()
            .map_err(|_| CipherError::MalformedEnvelope("invalid nonce".into()))?;
        let tag: [u8; TAG_LEN] = data[tag_start..]
            .try_into()
            .map_err(|_| CipherError::MalformedEnvelope("invalid tag".into()))?;

        Ok(Self::new(
            cipher,
            salt,
            nonce,
            data[HEADER_LEN..tag_start].to_vec(),
            tag,
        ))
    }

    /// Base64 text armor
    pub fn to_armored(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Parse base64 text armor; surrounding whitespace is ignored
    pub fn from_armored(text: &str) -> CipherResult<Self> {
        let bytes = STANDARD.decode(text.trim())?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Debug for CipherEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherEnvelope")
            .field("version", &self.version())
            .field("cipher", &self.cipher.name())
            .field("ciphertext_len", &self.ciphertext.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
