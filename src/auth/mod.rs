//! Authentication module for API key and admin key verification.

mod extractor;

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

pub use extractor::{AdminAuth, ApiKeyAuth};

/// Wrapper type for the bootstrap admin key.
///
/// `Debug` prints `[REDACTED]`; the value is only reachable through `verify`.
#[derive(Clone)]
pub struct AdminKey(Option<SecretString>);

impl AdminKey {
    /// Create a new AdminKey from an optional string. Blank keys disable admin access.
    pub fn new(key: Option<String>) -> Self {
        Self(
            key.filter(|k| !k.trim().is_empty())
                .map(SecretString::from),
        )
    }

    /// Compare the provided key with the stored admin key in constant time.
    pub fn verify(&self, provided: &str) -> bool {
        match &self.0 {
            Some(secret) => {
                let expected = secret.expose_secret();
                // Unequal lengths compare as false without an early exit
                expected.as_bytes().ct_eq(provided.as_bytes()).into()
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for AdminKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(_) => write!(f, "AdminKey([REDACTED])"),
            None => write!(f, "AdminKey(None)"),
        }
    }
}
