//! CipherService - passphrase-keyed envelope encryption
//!
//! Every call derives a fresh key from the passphrase and a per-envelope
//! salt. Nothing is cached between calls.

use secrecy::SecretString;
use zeroize::Zeroizing;

use crate::config::CipherConfig;
use crate::crypto::{self, AeadCipher, KeyMaterial};
use crate::envelope::CipherEnvelope;
use crate::error::{CipherError, CipherResult};

/// Decrypted file bytes, zeroized on drop
pub type PlaintextBuffer = Zeroizing<Vec<u8>>;

/// Stateless encrypt/decrypt over a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct CipherService {
    config: CipherConfig,
}

impl CipherService {
    /// Service with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Service with a validated configuration
    pub fn with_config(config: CipherConfig) -> CipherResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CipherConfig {
        &self.config
    }

    /// Derive key material with this service's Argon2 parameters
    pub fn derive_key(&self, passphrase: &SecretString, salt: &[u8]) -> CipherResult<KeyMaterial> {
        crypto::derive_key(passphrase, salt, &self.config.kdf)
    }

    /// Encrypt plaintext into a new envelope
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        passphrase: &SecretString,
    ) -> CipherResult<CipherEnvelope> {
        self.encrypt_with_aad(plaintext, passphrase, &[])
    }

    /// Encrypt, binding caller associated data into the tag
    ///
    /// The same `aad` must be supplied to [`CipherService::decrypt_with_aad`].
    pub fn encrypt_with_aad(
        &self,
        plaintext: &[u8],
        passphrase: &SecretString,
        aad: &[u8],
    ) -> CipherResult<CipherEnvelope> {
        if plaintext.len() > self.config.max_plaintext_bytes {
            return Err(CipherError::Encryption(format!(
                "plaintext too large: {} bytes (max: {})",
                plaintext.len(),
                self.config.max_plaintext_bytes
            )));
        }

        let cipher = self.config.cipher;
        let salt = crypto::generate_salt()?;
        let nonce = crypto::generate_nonce()?;
        let key = self.derive_key(passphrase, &salt)?;

        let header = CipherEnvelope::header_aad(cipher.format_version(), &salt, aad);
        let (ciphertext, tag) = crypto::seal(cipher, &key, &nonce, &header, plaintext)?;

        tracing::debug!(
            cipher = cipher.name(),
            plaintext_len = plaintext.len(),
            "encrypted envelope"
        );

        Ok(CipherEnvelope::new(cipher, salt, nonce, ciphertext, tag))
    }

    /// Decrypt an envelope
    pub fn decrypt(
        &self,
        envelope: &CipherEnvelope,
        passphrase: &SecretString,
    ) -> CipherResult<PlaintextBuffer> {
        self.decrypt_with_aad(envelope, passphrase, &[])
    }

    /// Decrypt an envelope sealed with caller associated data
    pub fn decrypt_with_aad(
        &self,
        envelope: &CipherEnvelope,
        passphrase: &SecretString,
        aad: &[u8],
    ) -> CipherResult<PlaintextBuffer> {
        let cipher = self.check_shape(envelope)?;
        let key = self.derive_key(passphrase, envelope.salt())?;

        let header = CipherEnvelope::header_aad(envelope.version(), envelope.salt(), aad);
        let plaintext = crypto::open(
            cipher,
            &key,
            envelope.nonce(),
            &header,
            envelope.ciphertext(),
            envelope.tag(),
        )
        .inspect_err(|e| {
            if matches!(e, CipherError::Authentication) {
                tracing::warn!(cipher = cipher.name(), "envelope authentication failed");
            }
        })?;

        tracing::debug!(
            cipher = cipher.name(),
            plaintext_len = plaintext.len(),
            "decrypted envelope"
        );

        Ok(plaintext)
    }

    /// Parse envelope bytes and decrypt
    pub fn decrypt_bytes(
        &self,
        data: &[u8],
        passphrase: &SecretString,
    ) -> CipherResult<PlaintextBuffer> {
        let envelope = CipherEnvelope::from_bytes(data)?;
        self.decrypt(&envelope, passphrase)
    }

    /// Parse base64 armor and decrypt
    pub fn decrypt_armored(
        &self,
        text: &str,
        passphrase: &SecretString,
    ) -> CipherResult<PlaintextBuffer> {
        let envelope = CipherEnvelope::from_armored(text)?;
        self.decrypt(&envelope, passphrase)
    }

    /// Structural checks that run before any key derivation
    fn check_shape(&self, envelope: &CipherEnvelope) -> CipherResult<AeadCipher> {
        let cipher = AeadCipher::from_version(envelope.version())
            .ok_or(CipherError::UnsupportedVersion(envelope.version()))?;

        if envelope.ciphertext().len() > self.config.max_plaintext_bytes {
            return Err(CipherError::MalformedEnvelope(format!(
                "ciphertext too large: {} bytes (max: {})",
                envelope.ciphertext().len(),
                self.config.max_plaintext_bytes
            )));
        }

        Ok(cipher)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::crypto::KdfParams;
    use crate::envelope::{HEADER_LEN, MIN_ENVELOPE_LEN};

    /// Cheap Argon2 parameters so tests stay fast
    pub(crate) fn test_service() -> CipherService {
        CipherService::with_config(CipherConfig {
            kdf: KdfParams {
                memory_kib: 256,
                iterations: 1,
                parallelism: 1,
            },
            max_plaintext_bytes: 4096,
            ..CipherConfig::default()
        })
        .unwrap()
    }

    pub(crate) fn pass(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[test]
    fn test_hello_world() {
        let service = test_service();
        let envelope = service.encrypt(b"hello world", &pass("correct-horse")).unwrap();

        let plaintext = service.decrypt(&envelope, &pass("correct-horse")).unwrap();
        assert_eq!(plaintext.as_slice(), b"hello world");

        let result = service.decrypt(&envelope, &pass("wrong-password"));
        assert!(matches!(result, Err(CipherError::Authentication)));
    }

    #[test]
    fn test_envelope_size() {
        let service = test_service();
        let envelope = service.encrypt(b"hello world", &pass("pw")).unwrap();

        assert_eq!(envelope.to_bytes().len(), MIN_ENVELOPE_LEN + 11);
        assert_eq!(envelope.len(), MIN_ENVELOPE_LEN + 11);
    }

    #[test]
    fn test_encrypt_is_randomized() {
        let service = test_service();
        let e1 = service.encrypt(b"same", &pass("pw")).unwrap();
        let e2 = service.encrypt(b"same", &pass("pw")).unwrap();

        assert_ne!(e1.salt(), e2.salt());
        assert_ne!(e1.nonce(), e2.nonce());
        assert_ne!(e1.to_bytes(), e2.to_bytes());

        assert_eq!(service.decrypt(&e1, &pass("pw")).unwrap().as_slice(), b"same");
        assert_eq!(service.decrypt(&e2, &pass("pw")).unwrap().as_slice(), b"same");
    }

    #[test]
    fn test_empty_plaintext() {
        let service = test_service();
        let envelope = service.encrypt(b"", &pass("pw")).unwrap();

        assert!(envelope.is_empty());
        assert!(service.decrypt(&envelope, &pass("pw")).unwrap().is_empty());
    }

    #[test]
    fn test_empty_passphrase() {
        let service = test_service();
        let result = service.encrypt(b"data", &pass(""));

        assert!(matches!(result, Err(CipherError::KeyDerivation(_))));
    }

    #[test]
    fn test_oversized_plaintext() {
        let service = test_service();
        let data = vec![0u8; 4097];
        let result = service.encrypt(&data, &pass("pw"));

        assert!(matches!(result, Err(CipherError::Encryption(_))));
    }

    #[test]
    fn test_limit_is_inclusive() {
        let service = test_service();
        let data = vec![9u8; 4096];
        let envelope = service.encrypt(&data, &pass("pw")).unwrap();

        assert_eq!(service.decrypt(&envelope, &pass("pw")).unwrap().as_slice(), data);
    }

    #[test]
    fn test_oversized_envelope_malformed() {
        let big = CipherService::with_config(CipherConfig {
            max_plaintext_bytes: 8192,
            ..test_service().config().clone()
        })
        .unwrap();
        let envelope = big.encrypt(&[1u8; 5000], &pass("pw")).unwrap();

        let result = test_service().decrypt(&envelope, &pass("pw"));
        assert!(matches!(result, Err(CipherError::MalformedEnvelope(_))));
    }

    #[test]
    fn test_tampered_ciphertext() {
        let service = test_service();
        let mut bytes = service.encrypt(b"hello world", &pass("pw")).unwrap().to_bytes();
        bytes[HEADER_LEN + 3] ^= 0x01;

        let result = service.decrypt_bytes(&bytes, &pass("pw"));
        assert!(matches!(result, Err(CipherError::Authentication)));
    }

    #[test]
    fn test_tampered_header() {
        let service = test_service();
        let bytes = service.encrypt(b"hello world", &pass("pw")).unwrap().to_bytes();

        // salt and nonce bytes
        for index in [1, 16, 17, HEADER_LEN - 1] {
            let mut tampered = bytes.clone();
            tampered[index] ^= 0x80;
            let result = service.decrypt_bytes(&tampered, &pass("pw"));
            assert!(matches!(result, Err(CipherError::Authentication)), "byte {}", index);
        }
    }

    #[test]
    fn test_version_swap_fails() {
        let service = test_service();
        let mut bytes = service.encrypt(b"hello world", &pass("pw")).unwrap().to_bytes();
        bytes[0] = AeadCipher::ChaCha20Poly1305.format_version();

        let result = service.decrypt_bytes(&bytes, &pass("pw"));
        assert!(matches!(result, Err(CipherError::Authentication)));
    }

    #[test]
    fn test_unknown_version() {
        let service = test_service();
        let mut bytes = service.encrypt(b"hello world", &pass("pw")).unwrap().to_bytes();
        bytes[0] = 0x7F;

        let result = service.decrypt_bytes(&bytes, &pass("pw"));
        assert!(matches!(result, Err(CipherError::UnsupportedVersion(0x7F))));
    }

    #[test]
    fn test_chacha_envelope_decrypts_with_default_cipher() {
        let chacha = CipherService::with_config(CipherConfig {
            cipher: AeadCipher::ChaCha20Poly1305,
            ..test_service().config().clone()
        })
        .unwrap();
        let envelope = chacha.encrypt(b"index", &pass("pw")).unwrap();
        assert_eq!(envelope.version(), 0x02);

        let plaintext = test_service().decrypt(&envelope, &pass("pw")).unwrap();
        assert_eq!(plaintext.as_slice(), b"index");
    }

    #[test]
    fn test_aad() {
        let service = test_service();
        let envelope = service
            .encrypt_with_aad(b"report", &pass("pw"), b"report.pdf")
            .unwrap();

        let plaintext = service
            .decrypt_with_aad(&envelope, &pass("pw"), b"report.pdf")
            .unwrap();
        assert_eq!(plaintext.as_slice(), b"report");

        let result = service.decrypt_with_aad(&envelope, &pass("pw"), b"other.pdf");
        assert!(matches!(result, Err(CipherError::Authentication)));

        let result = service.decrypt(&envelope, &pass("pw"));
        assert!(matches!(result, Err(CipherError::Authentication)));
    }

    #[test]
    fn test_armored() {
        let service = test_service();
        let text = service.encrypt(b"hello world", &pass("pw")).unwrap().to_armored();

        let plaintext = service.decrypt_armored(&text, &pass("pw")).unwrap();
        assert_eq!(plaintext.as_slice(), b"hello world");
    }

    #[test]
    fn test_derive_key_matches_envelope_salt() {
        use secrecy::ExposeSecret;

        let service = test_service();
        let envelope = service.encrypt(b"x", &pass("pw")).unwrap();

        let k1 = service.derive_key(&pass("pw"), envelope.salt()).unwrap();
        let k2 = service.derive_key(&pass("pw"), envelope.salt()).unwrap();
        assert_eq!(k1.expose_secret(), k2.expose_secret());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = CipherService::with_config(CipherConfig {
            max_plaintext_bytes: 0,
            ..CipherConfig::default()
        });
        assert!(matches!(result, Err(CipherError::Config(_))));
    }
}
