//! Webhook authenticity checks.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Verifies a hex-encoded HMAC-SHA256 of the raw request body.
#[derive(Clone)]
pub struct HmacBodyVerifier {
    secret: Vec<u8>,
}

impl HmacBodyVerifier {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
        }
    }

    /// Checks `signature_hex` against the body.
    pub fn verify(&self, payload: &[u8], signature_hex: &str) -> Result<(), WebhookError> {
        let provided =
            hex::decode(signature_hex.trim()).map_err(|_| WebhookError::InvalidSignature)?;
        let expected = self.sign(payload)?;
        if constant_time_compare(&expected, &provided) {
            Ok(())
        } else {
            Err(WebhookError::InvalidSignature)
        }
    }

    /// Hex signature of `payload`, as a provider would send it.
    pub fn sign_hex(&self, payload: &[u8]) -> Result<String, WebhookError> {
        self.sign(payload).map(hex::encode)
    }

    fn sign(&self, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| WebhookError::InvalidSignature)?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

/// Compares a shared secret token without leaking timing.
pub fn secret_token_matches(expected: &str, provided: &str) -> bool {
    constant_time_compare(expected.as_bytes(), provided.as_bytes())
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes a hex HMAC-SHA256 signature for test fixtures.
#[cfg(test)]
pub fn compute_test_signature(secret: &str, payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}
