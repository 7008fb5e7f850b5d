//! Cipher configuration
//!
//! ```json
//! {
//!   "cipher": "aes-256-gcm",
//!   "kdf": { "memory_kib": 65536, "iterations": 3, "parallelism": 1 },
//!   "max_plaintext_bytes": 67108864
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::{AeadCipher, KdfParams};
use crate::error::{CipherError, CipherResult};

/// Default plaintext cap (64 MiB)
pub const DEFAULT_MAX_PLAINTEXT_BYTES: usize = 64 * 1024 * 1024;

/// Directory name under the platform config dir
const CONFIG_DIR_NAME: &str = "vault-cipher";

/// Config file name
const CONFIG_FILE_NAME: &str = "config.json";

/// CipherService configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CipherConfig {
    /// AEAD used for new envelopes; decryption follows the envelope version
    pub cipher: AeadCipher,
    /// Argon2id work factor
    pub kdf: KdfParams,
    /// Largest plaintext accepted by encrypt, and largest ciphertext by decrypt
    pub max_plaintext_bytes: usize,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            cipher: AeadCipher::default(),
            kdf: KdfParams::default(),
            max_plaintext_bytes: DEFAULT_MAX_PLAINTEXT_BYTES,
        }
    }
}

impl CipherConfig {
    /// Check limits and Argon2 parameters
    pub fn validate(&self) -> CipherResult<()> {
        if self.max_plaintext_bytes == 0 {
            return Err(CipherError::Config(
                "max_plaintext_bytes must be greater than zero".into(),
            ));
        }

        self.kdf
            .to_argon2_params()
            .map_err(|e| CipherError::Config(e.to_string()))?;

        Ok(())
    }

    /// Parse and validate JSON
    pub fn from_json(json: &str) -> CipherResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: &Path) -> CipherResult<Self> {
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), "loaded cipher config");
        Ok(config)
    }

    /// Load `path` if given, else the platform default file if it exists,
    /// else defaults
    pub fn load_or_default(path: Option<&Path>) -> CipherResult<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// `<config_dir>/vault-cipher/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }
}
