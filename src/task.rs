//! Blocking-task offload for async callers
//!
//! Argon2 is CPU and memory bound. UI and async callers should not run it on
//! their executor threads, so these wrappers move the whole call onto tokio's
//! blocking pool.

use secrecy::SecretString;

use crate::envelope::CipherEnvelope;
use crate::error::{CipherError, CipherResult};
use crate::service::{CipherService, PlaintextBuffer};

impl CipherService {
    /// [`CipherService::encrypt`] on the blocking pool
    pub async fn encrypt_blocking_task(
        &self,
        plaintext: Vec<u8>,
        passphrase: SecretString,
    ) -> CipherResult<CipherEnvelope> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.encrypt(&plaintext, &passphrase))
            .await
            .map_err(|e| CipherError::TaskFailed(e.to_string()))?
    }

    /// [`CipherService::decrypt`] on the blocking pool
    pub async fn decrypt_blocking_task(
        &self,
        envelope: CipherEnvelope,
        passphrase: SecretString,
    ) -> CipherResult<PlaintextBuffer> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || service.decrypt(&envelope, &passphrase))
            .await
            .map_err(|e| CipherError::TaskFailed(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use crate::error::CipherError;
    use crate::service::tests::{pass, test_service};

    #[tokio::test]
    async fn test_blocking_task_roundtrip() {
        let service = test_service();

        let envelope = service
            .encrypt_blocking_task(b"hello world".to_vec(), pass("correct-horse"))
            .await
            .unwrap();
        let plaintext = service
            .decrypt_blocking_task(envelope, pass("correct-horse"))
            .await
            .unwrap();

        assert_eq!(plaintext.as_slice(), b"hello world");
    }

    #[tokio::test]
    async fn test_blocking_task_wrong_passphrase() {
        let service = test_service();
        let envelope = service
            .encrypt_blocking_task(b"hello world".to_vec(), pass("correct-horse"))
            .await
            .unwrap();

        let result = service
            .decrypt_blocking_task(envelope, pass("wrong-password"))
            .await;
        assert!(matches!(result, Err(CipherError::Authentication)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_calls_are_independent() {
        let service = test_service();

        let handles: Vec<_> = (0u8..8)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    let secret = format!("pass-{}", i);
                    let envelope = service
                        .encrypt_blocking_task(vec![i; 64], pass(&secret))
                        .await?;
                    service.decrypt_blocking_task(envelope, pass(&secret)).await
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let plaintext = handle.await.unwrap().unwrap();
            assert_eq!(plaintext.as_slice(), vec![i as u8; 64].as_slice());
        }
    }
}
