//! Form tokens derived from a shared secret

use crate::domain::hooks::NonceProvider;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Bytes of the MAC embedded in forms, hex encoded
const NONCE_BYTES: usize = 10;

/// Deterministic nonce: truncated HMAC-SHA256 of the action under the secret
pub struct HmacNonceProvider {
    secret: Vec<u8>,
}

impl HmacNonceProvider {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into().into_bytes(),
        }
    }

    fn mac(&self, action: &str) -> Option<HmacSha256> {
        // HMAC accepts keys of any length
        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(action.as_bytes());
        Some(mac)
    }
}

impl NonceProvider for HmacNonceProvider {
    fn create(&self, action: &str) -> String {
        match self.mac(action) {
            Some(mac) => hex::encode(&mac.finalize().into_bytes()[..NONCE_BYTES]),
            None => String::new(),
        }
    }

    fn verify(&self, action: &str, nonce: &str) -> bool {
        let Ok(bytes) = hex::decode(nonce) else {
            return false;
        };
        if bytes.len() != NONCE_BYTES {
            return false;
        }
        self.mac(action)
            .is_some_and(|mac| mac.verify_truncated_left(&bytes).is_ok())
    }
}
