//! Cryptographic core - Argon2id, AES-256-GCM, ChaCha20-Poly1305

mod aead;
mod kdf;

pub use aead::{open, seal, AeadCipher};
pub use kdf::{derive_key, KdfParams};

use rand::{rngs::OsRng, RngCore};

use crate::error::{CipherError, CipherResult};

/// Key length for AES-256 / ChaCha20
pub const KEY_LEN: usize = 32;

/// Argon2 salt length
pub const SALT_LEN: usize = 16;

/// AEAD nonce length (96 bits)
pub const NONCE_LEN: usize = 12;

/// AEAD tag length (128 bits)
pub const TAG_LEN: usize = 16;

/// 256-bit key, zeroized on drop
pub type KeyMaterial = secrecy::SecretBox<[u8; KEY_LEN]>;

/// Generate a random salt from the OS RNG
pub fn generate_salt() -> CipherResult<[u8; SALT_LEN]> {
    random_bytes()
}

/// Generate a random nonce from the OS RNG
pub fn generate_nonce() -> CipherResult<[u8; NONCE_LEN]> {
    random_bytes()
}

fn random_bytes<const N: usize>() -> CipherResult<[u8; N]> {
    let mut bytes = [0u8; N];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CipherError::Encryption(format!("RNG failed: {}", e)))?;
    Ok(bytes)
}
