//! Token Codec
//!
//! Issues and verifies compact HS256 JWS tokens over [`Claims`].
//!
//! ## Security Features
//! - One symmetric secret, fixed for the process lifetime
//! - Only HS256 is accepted; any other `alg` header is rejected
//! - Optional maximum age enforced both through `exp` and the `iat` claim

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use platform::crypto::{from_base64, random_secret};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};

use crate::domain::value_object::claims::{Claims, EXPIRES_AT, ISSUED_AT};
use crate::error::{ConfigError, VerifyError};

/// Minimum signing secret length, in characters
pub const MIN_SECRET_LENGTH: usize = 8;

const ALGORITHM: Algorithm = Algorithm::HS256;

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    max_age: Option<Duration>,
}

impl TokenCodec {
    /// Create a codec; `max_age = None` means tokens are valid until sign-out
    pub fn new(secret: SecretString, max_age: Option<Duration>) -> Result<Self, ConfigError> {
        let secret = secret.expose_secret();
        if secret.chars().count() < MIN_SECRET_LENGTH {
            return Err(ConfigError::SecretTooShort {
                min: MIN_SECRET_LENGTH,
            });
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.required_spec_claims = HashSet::new();
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            max_age,
        })
    }

    /// Create a codec with a random secret (for development)
    ///
    /// Tokens do not survive a restart.
    pub fn with_random_secret(max_age: Option<Duration>) -> Result<Self, ConfigError> {
        Self::new(SecretString::from(random_secret()), max_age)
    }

    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// Sign `claims`, adding `iat` and (with a max age) `exp`
    pub fn issue(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(claims, Utc::now().timestamp())
    }

    pub(crate) fn issue_at(
        &self,
        claims: &Claims,
        issued_at: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let mut payload = claims.clone().without_metadata();
        payload.insert(ISSUED_AT, issued_at);
        if let Some(max_age) = self.max_age {
            payload.insert(EXPIRES_AT, issued_at.saturating_add(max_age_secs(max_age)));
        }

        jsonwebtoken::encode(&Header::new(ALGORITHM), &payload, &self.encoding_key)
    }

    /// Verify a token and return its claims, including `iat`
    pub fn verify(&self, token: &str) -> Result<Claims, VerifyError> {
        // Everything after the second dot is the signature
        let mut segments = token.splitn(3, '.');
        let (Some(header), Some(payload), Some(signature)) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(VerifyError::Malformed);
        };

        let header: Header = from_base64(header)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or(VerifyError::Malformed)?;
        if header.alg != ALGORITHM {
            return Err(VerifyError::BadSignature);
        }

        // Payload structure is checked before the signature so that a garbled
        // payload is reported as malformed rather than as a bad signature.
        let payload = from_base64(payload).map_err(|_| VerifyError::Malformed)?;
        serde_json::from_slice::<Map<String, Value>>(&payload)
            .map_err(|_| VerifyError::Malformed)?;

        if !signature
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        {
            return Err(VerifyError::BadSignature);
        }

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => VerifyError::Expired,
                JwtErrorKind::InvalidSignature
                | JwtErrorKind::InvalidAlgorithm
                | JwtErrorKind::Base64(_) => VerifyError::BadSignature,
                _ => VerifyError::Malformed,
            })?;
        let claims = data.claims;

        if let Some(max_age) = self.max_age {
            let issued_at = claims.issued_at().ok_or(VerifyError::Malformed)?;
            let age = Utc::now().timestamp().saturating_sub(issued_at);
            if age > max_age_secs(max_age) {
                return Err(VerifyError::Expired);
            }
        }

        Ok(claims)
    }
}

fn max_age_secs(max_age: Duration) -> i64 {
    i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX)
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .field("secret", &"[REDACTED]")
            .field("max_age", &self.max_age)
            .finish()
    }
}
