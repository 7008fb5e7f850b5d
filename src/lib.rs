//! # Vault Cipher
//!
//! Encryption core for the File Vault: documents picked by the user are
//! sealed into self-describing envelopes keyed from a passphrase.
//!
//! ## Security Model
//!
//! - Argon2id passphrase derivation, fresh 16-byte salt per envelope
//! - AES-256-GCM (or ChaCha20-Poly1305) with a fresh 96-bit nonce
//! - Version and salt bound into the authentication tag
//! - Wrong passphrase and tampering fail identically
//! - Keys and decrypted buffers zeroized on drop
//!
//! ```no_run
//! use secrecy::SecretString;
//! use vault_cipher::CipherService;
//!
//! # fn main() -> vault_cipher::CipherResult<()> {
//! let service = CipherService::new();
//! let passphrase = SecretString::from("correct-horse".to_owned());
//!
//! let envelope = service.encrypt(b"hello world", &passphrase)?;
//! let stored = envelope.to_bytes();
//!
//! let plaintext = service.decrypt_bytes(&stored, &passphrase)?;
//! assert_eq!(plaintext.as_slice(), b"hello world");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod service;

#[cfg(feature = "async")]
mod task;

pub use config::CipherConfig;
pub use crypto::{AeadCipher, KdfParams, KeyMaterial};
pub use envelope::CipherEnvelope;
pub use error::{CipherError, CipherResult};
pub use service::{CipherService, PlaintextBuffer};

/// Vault Cipher version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
