//! Argon2id KDF - passphrase to 256-bit key material

use argon2::{Algorithm, Argon2, Params, Version};
use secrecy::{ExposeSecret, SecretBox, SecretString};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use super::{KeyMaterial, KEY_LEN, SALT_LEN};
use crate::error::{CipherError, CipherResult};

/// Argon2id work factor
///
/// Not stored in the envelope: decryption must use the same parameters
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    /// Memory in KiB
    pub memory_kib: u32,
    /// Iterations (time cost)
    pub iterations: u32,
    /// Lanes
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024, // 64 MiB
            iterations: 3,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    /// Weak devices (OWASP minimum for Argon2id)
    pub fn low_memory() -> Self {
        Self {
            memory_kib: 19 * 1024, // 19 MiB
            iterations: 2,
            parallelism: 1,
        }
    }

    /// Desktop-class devices
    pub fn high_security() -> Self {
        Self {
            memory_kib: 256 * 1024, // 256 MiB
            iterations: 4,
            parallelism: 4,
        }
    }

    /// Build Argon2 parameters, rejecting values Argon2 would refuse
    pub fn to_argon2_params(&self) -> CipherResult<Params> {
        Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(KEY_LEN),
        )
        .map_err(|e| CipherError::KeyDerivation(format!("invalid Argon2 params: {}", e)))
    }
}

/// Derive key material from a passphrase and a 16-byte salt
pub fn derive_key(
    passphrase: &SecretString,
    salt: &[u8],
    params: &KdfParams,
) -> CipherResult<KeyMaterial> {
    let passphrase = passphrase.expose_secret();
    if passphrase.is_empty() {
        return Err(CipherError::KeyDerivation("passphrase is empty".into()));
    }
    if salt.len() != SALT_LEN {
        return Err(CipherError::KeyDerivation(format!(
            "salt must be {} bytes, got {}",
            SALT_LEN,
            salt.len()
        )));
    }

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.to_argon2_params()?);

    let mut output = Box::new([0u8; KEY_LEN]);
    if let Err(e) = argon2.hash_password_into(passphrase.as_bytes(), salt, &mut output[..]) {
        output.zeroize();
        return Err(CipherError::KeyDerivation(format!("hashing failed: {}", e)));
    }

    Ok(SecretBox::new(output))
}
