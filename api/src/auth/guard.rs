//! Access guard
//!
//! Verifies access tokens issued by the identity service against the shared
//! verification key. Holds no session state; every call is independent.

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::AuthError;

/// Identity of a caller whose token was accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub subject: String,
}

/// Claims the guard reads; anything else in the token is ignored
#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: Option<String>,
    /// Subject claim used by the identity service
    #[serde(default)]
    user_id: Option<Value>,
    #[serde(default)]
    token_type: Option<String>,
}

impl Claims {
    fn subject(&self) -> Option<String> {
        if let Some(sub) = self.sub.as_ref().filter(|s| !s.is_empty()) {
            return Some(sub.clone());
        }
        match self.user_id.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

pub struct AccessGuard {
    key: DecodingKey,
    validation: Validation,
}

impl AccessGuard {
    pub fn new(secret: &[u8], algorithm: Algorithm, leeway_secs: u64) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = leeway_secs;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.jwt_verification_key.as_bytes(),
            config.jwt_algorithm,
            config.jwt_leeway_secs,
        )
    }

    /// Check signature, expiry and token type, and return the subject
    pub fn verify(&self, token: &str) -> Result<Authenticated, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;
        let claims = data.claims;

        if let Some(token_type) = claims.token_type.as_deref() {
            if token_type != "access" {
                return Err(AuthError::InvalidToken(format!(
                    "token type {:?} cannot be used for access",
                    token_type
                )));
            }
        }

        let subject = claims
            .subject()
            .ok_or_else(|| AuthError::InvalidToken("token carries no subject".to_string()))?;

        Ok(Authenticated { subject })
    }
}
