//! AEAD encryption - AES-256-GCM and ChaCha20-Poly1305
//!
//! Both ciphers use a 96-bit nonce and a 128-bit tag, so envelopes share one
//! layout and the version byte alone selects the algorithm.

use aes_gcm::{
    aead::{consts::U12, Aead, AeadCore, KeyInit, Nonce, Payload},
    Aes256Gcm,
};
use chacha20poly1305::ChaCha20Poly1305;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{KeyMaterial, NONCE_LEN, TAG_LEN};
use crate::error::{CipherError, CipherResult};

/// AEAD algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AeadCipher {
    /// AES-256-GCM - envelope version 0x01
    #[default]
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
    /// ChaCha20-Poly1305 - envelope version 0x02, faster without AES-NI
    #[serde(rename = "chacha20-poly1305")]
    ChaCha20Poly1305,
}

impl AeadCipher {
    /// Envelope version byte written for this cipher
    pub fn format_version(&self) -> u8 {
        match self {
            Self::Aes256Gcm => 0x01,
            Self::ChaCha20Poly1305 => 0x02,
        }
    }

    /// Cipher for a version byte, `None` if unknown
    pub fn from_version(version: u8) -> Option<Self> {
        match version {
            0x01 => Some(Self::Aes256Gcm),
            0x02 => Some(Self::ChaCha20Poly1305),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Aes256Gcm => "AES-256-GCM",
            Self::ChaCha20Poly1305 => "ChaCha20-Poly1305",
        }
    }
}

/// Encrypt, returning ciphertext and detached tag
pub fn seal(
    cipher: AeadCipher,
    key: &KeyMaterial,
    nonce: &[u8; NONCE_LEN],
    aad: &[u8],
    plaintext: &[u8],
) -> CipherResult<(Vec<u8>, [u8; TAG_LEN])> {
    match cipher {
        AeadCipher::Aes256Gcm => seal_with::<Aes256Gcm>(key, nonce, aad, plaintext),
        AeadCipher::ChaCha20Poly1305 => seal_with::<ChaCha20Poly1305>(key, nonce, aad, plaintext),
    }
}

/// Verify the tag and decrypt; nothing is returned unless the tag verifies
pub fn open(
    cipher: AeadCipher,
    key: &KeyMaterial,
    nonce: &[u8; NONCE_LEN],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8; TAG_LEN],
) -> CipherResult<Zeroizing<Vec<u8>>> {
    match cipher {
        AeadCipher::Aes256Gcm => open_with::<Aes256Gcm>(key, nonce, aad, ciphertext, tag),
        AeadCipher::ChaCha20Poly1305 => {
            open_with::<ChaCha20Poly1305>(key, nonce, aad, ciphertext, tag)
        }
    }
}

fn seal_with<C>(
    key: &KeyMaterial,
    nonce: &[u8; NONCE_LEN],
    aad: &[u8],
    plaintext: &[u8],
) -> CipherResult<(Vec<u8>, [u8; TAG_LEN])>
where
    C: KeyInit + Aead + AeadCore<NonceSize = U12>,
{
    let cipher = C::new_from_slice(key.expose_secret())
        .map_err(|e| CipherError::Encryption(e.to_string()))?;

    let mut ciphertext = cipher
        .encrypt(Nonce::<C>::from_slice(nonce), Payload { msg: plaintext, aad })
        .map_err(|e| CipherError::Encryption(e.to_string()))?;

    // aead appends the tag to the ciphertext
    let split = ciphertext
        .len()
        .checked_sub(TAG_LEN)
        .ok_or_else(|| CipherError::Encryption("cipher output shorter than tag".into()))?;
    let tag: [u8; TAG_LEN] = ciphertext[split..]
        .try_into()
        .map_err(|_| CipherError::Encryption("invalid tag length".into()))?;
    ciphertext.truncate(split);

    Ok((ciphertext, tag))
}

fn open_with<C>(
    key: &KeyMaterial,
    nonce: &[u8; NONCE_LEN],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8; TAG_LEN],
) -> CipherResult<Zeroizing<Vec<u8>>>
where
    C: KeyInit + Aead + AeadCore<NonceSize = U12>,
{
    let cipher = C::new_from_slice(key.expose_secret())
        .map_err(|_| CipherError::Authentication)?;

    let mut combined = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    combined.extend_from_slice(ciphertext);
    combined.extend_from_slice(tag);

    cipher
        .decrypt(Nonce::<C>::from_slice(nonce), Payload { msg: &combined, aad })
        .map(Zeroizing::new)
        .map_err(|_| CipherError::Authentication)
}
