use axum::http::{HeaderMap, Method};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthResult {
    Allowed,
    MissingKey,
    InvalidKey,
    /// No key configured, the check is off for the whole process.
    Skipped,
}

impl AuthResult {
    pub fn passes(self) -> bool {
        matches!(self, AuthResult::Allowed | AuthResult::Skipped)
    }
}

// Only the digest of the expected key is kept around
pub struct Authenticator {
    expected: Option<[u8; 32]>,
}

fn digest(key: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(key);
    hasher.finalize().into()
}

impl Authenticator {
    pub fn new(required_key: &str) -> Self {
        let expected = (!required_key.is_empty()).then(|| digest(required_key.as_bytes()));
        Self { expected }
    }

    pub fn is_enabled(&self) -> bool {
        self.expected.is_some()
    }

    pub fn authorize(&self, method: &Method, headers: &HeaderMap) -> AuthResult {
        // preflights cannot carry the custom header
        if method == Method::OPTIONS {
            return AuthResult::Allowed;
        }

        let Some(expected) = &self.expected else {
            return AuthResult::Skipped;
        };

        match headers.get(API_KEY_HEADER) {
            None => AuthResult::MissingKey,
            Some(value) if value.is_empty() => AuthResult::MissingKey,
            Some(value) => {
                let presented = digest(value.as_bytes());
                if bool::from(presented.as_slice().ct_eq(expected.as_slice())) {
                    AuthResult::Allowed
                } else {
                    AuthResult::InvalidKey
                }
            }
        }
    }
}
