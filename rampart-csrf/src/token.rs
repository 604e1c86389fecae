use base64::{Engine, engine::general_purpose::STANDARD};
use rand::rngs::{OsRng, SmallRng};
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;
use tracing::warn;

/// Number of random bytes drawn for a token
pub const TOKEN_BYTES: usize = 32;

/// Opaque anti-forgery token
///
/// Comparison is constant-time and `Debug` never prints the value.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// Wrap an existing token value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generate a fresh token
    pub fn generate() -> Self {
        TokenGenerator::generate()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Constant-time comparison against a submitted value
    pub fn matches(&self, candidate: &str) -> bool {
        self.0.as_bytes().ct_eq(candidate.as_bytes()).into()
    }
}

impl PartialEq for CsrfToken {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl Eq for CsrfToken {}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CsrfToken").field(&"[redacted]").finish()
    }
}

impl fmt::Display for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CsrfToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for CsrfToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<CsrfToken> for String {
    fn from(token: CsrfToken) -> Self {
        token.0
    }
}

/// Randomness source a token was produced from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// 32 bytes from the operating system CSPRNG, base64 encoded
    OsRng,
    /// SHA-256 of a time-seeded non-cryptographic random number, hex encoded
    HashedFallback,
}

/// Token generator with a degraded fallback when the OS RNG is unavailable
pub struct TokenGenerator;

static FALLBACK_COUNTER: AtomicU64 = AtomicU64::new(0);

impl TokenGenerator {
    /// Generate a token. Never fails.
    pub fn generate() -> CsrfToken {
        Self::generate_with_source().0
    }

    /// Generate a token and report which source produced it
    pub fn generate_with_source() -> (CsrfToken, TokenSource) {
        Self::generate_from(&mut OsRng)
    }

    /// Generate a token from `rng`, falling back to the hashed source if it errors
    pub fn generate_from<R: RngCore + ?Sized>(rng: &mut R) -> (CsrfToken, TokenSource) {
        let mut bytes = [0u8; TOKEN_BYTES];
        match rng.try_fill_bytes(&mut bytes) {
            Ok(()) => (CsrfToken(STANDARD.encode(bytes)), TokenSource::OsRng),
            Err(err) => {
                warn!(error = %err, "secure random source unavailable, using hashed fallback token");
                (Self::hashed_fallback(), TokenSource::HashedFallback)
            }
        }
    }

    fn hashed_fallback() -> CsrfToken {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        let counter = FALLBACK_COUNTER.fetch_add(1, Ordering::Relaxed);
        let seed = nanos ^ u64::from(std::process::id()) ^ counter.rotate_left(32);

        let mut rng = SmallRng::seed_from_u64(seed);
        let number = rng.next_u64();
        let digest = Sha256::digest(number.to_string().as_bytes());
        CsrfToken(hex::encode(digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::other("entropy source offline")))
        }
    }

    #[test]
    fn test_token_generation() {
        let (token, source) = TokenGenerator::generate_with_source();
        assert_eq!(source, TokenSource::OsRng);
        assert_eq!(token.as_str().len(), 44);
        assert_eq!(STANDARD.decode(token.as_str()).unwrap().len(), TOKEN_BYTES);
    }

    #[test]
    fn test_fallback_token() {
        let (token, source) = TokenGenerator::generate_from(&mut FailingRng);
        assert_eq!(source, TokenSource::HashedFallback);
        assert_eq!(token.as_str().len(), 64);
        assert!(token.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fallback_tokens_differ() {
        let tokens: HashSet<String> = (0..100)
            .map(|_| TokenGenerator::generate_from(&mut FailingRng).0.into_inner())
            .collect();
        assert_eq!(tokens.len(), 100);
    }

    #[test]
    fn test_matches() {
        let token = CsrfToken::new("abc");
        assert!(token.matches("abc"));
        assert!(!token.matches("abd"));
        assert!(!token.matches("ab"));
        assert!(!token.matches(""));
        assert_eq!(token, CsrfToken::from("abc".to_string()));
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = CsrfToken::new("super-secret");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("super-secret"));
        assert_eq!(token.to_string(), "super-secret");
    }

    #[test]
    fn test_serde_transparent() {
        let token = CsrfToken::new("abc");
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"abc\"");
    }
}
