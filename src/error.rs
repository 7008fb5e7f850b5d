//! Vault Cipher - Error Types

use thiserror::Error;

/// Result type for cipher operations
pub type CipherResult<T> = Result<T, CipherError>;

/// Cipher error types
#[derive(Error, Debug)]
pub enum CipherError {
    // ═══════════════════════════════════════════════════════════════
    // CRYPTO ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Wrong passphrase and tampered data are deliberately indistinguishable.
    #[error("Authentication failed - incorrect passphrase or corrupted data")]
    Authentication,

    // ═══════════════════════════════════════════════════════════════
    // ENVELOPE ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Unsupported envelope version: {0:#04x}")]
    UnsupportedVersion(u8),

    // ═══════════════════════════════════════════════════════════════
    // CONFIG / RUNTIME ERRORS
    // ═══════════════════════════════════════════════════════════════

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl CipherError {
    /// Errors a UI should report as "incorrect PIN or corrupted file"
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            CipherError::Authentication
                | CipherError::MalformedEnvelope(_)
                | CipherError::UnsupportedVersion(_)
        )
    }

    /// Errors caused by the envelope bytes rather than the passphrase or config
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            CipherError::MalformedEnvelope(_) | CipherError::UnsupportedVersion(_)
        )
    }
}

impl From<serde_json::Error> for CipherError {
    fn from(e: serde_json::Error) -> Self {
        CipherError::Config(e.to_string())
    }
}

impl From<base64::DecodeError> for CipherError {
    fn from(e: base64::DecodeError) -> Self {
        CipherError::MalformedEnvelope(format!("invalid base64 armor: {}", e))
    }
}
