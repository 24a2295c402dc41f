use async_trait::async_trait;
use aws_sdk_kms::error::DisplayErrorContext;
use aws_sdk_kms::primitives::Blob;
use aws_sdk_kms::Client as KmsClient;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::errors::{DecryptError, DispatchResult};

#[async_trait]
pub trait SecretDecryptor: Send + Sync {
    /// Decrypt a base64-encoded ciphertext into its UTF-8 plaintext.
    async fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptError>;
}

/// Decrypts with AWS KMS using the Lambda's own credentials and region.
pub struct KmsDecryptor {
    client: KmsClient,
}

impl KmsDecryptor {
    pub fn new(client: KmsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretDecryptor for KmsDecryptor {
    async fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptError> {
        let blob = STANDARD.decode(ciphertext.trim())?;

        let response = self
            .client
            .decrypt()
            .ciphertext_blob(Blob::new(blob))
            .send()
            .await
            .map_err(|e| DecryptError::Kms {
                message: DisplayErrorContext(&e).to_string(),
                source: Some(Box::new(e)),
            })?;

        let plaintext = response.plaintext().ok_or(DecryptError::NoPlaintext)?;
        Ok(String::from_utf8(plaintext.as_ref().to_vec())?)
    }
}

/// Turn the configured webhook setting into a usable URL.
///
/// Values starting with `http` are already plaintext. Anything else is
/// decrypted once; a failure fails the invocation.
pub async fn resolve_endpoint<D>(configured: &str, decryptor: &D) -> DispatchResult<String>
where
    D: SecretDecryptor + ?Sized,
{
    if configured.starts_with("http") {
        return Ok(configured.to_string());
    }

    Ok(decryptor.decrypt(configured).await?)
}
