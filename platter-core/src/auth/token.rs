use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::UserRole;
use crate::{Error, Result};

pub const DEFAULT_TTL_MINUTES: i64 = 15;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: UserRole,
    pub iat: usize,
    pub exp: usize,
}

/// Issues and verifies signed, time-limited access tokens. The token
/// is integrity-protected, not encrypted: it carries identity, role,
/// and expiry, nothing else. There is no server-side session state,
/// so a token cannot be revoked before it expires.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: TimeDelta,
}

impl TokenService {
    pub fn new(secret: &str, ttl: TimeDelta) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            ttl,
        }
    }

    pub fn with_default_ttl(secret: &str) -> Self {
        Self::new(secret, TimeDelta::minutes(DEFAULT_TTL_MINUTES))
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    pub fn issue(&self, user_id: i32, role: UserRole) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| Error::Internal("Cannot issue token".to_string()))
    }

    /// Decodes and checks signature and expiry. Malformed structure,
    /// signature mismatch, expiry, and missing claims all collapse
    /// into Unauthorized; callers learn nothing about which check
    /// failed.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| Error::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::with_default_ttl("test-secret")
    }

    #[test]
    fn issue_then_verify_returns_id_and_role() {
        let tokens = service();
        let token = tokens.issue(42, UserRole::RestaurantAdmin).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.role, UserRole::RestaurantAdmin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_expired_token() {
        // Past the default 60s validation leeway.
        let tokens = TokenService::new("test-secret", TimeDelta::minutes(-5));
        let token = tokens.issue(1, UserRole::User).unwrap();

        assert!(matches!(tokens.verify(&token), Err(Error::Unauthorized)));
    }

    #[test]
    fn verify_rejects_tampered_payload() {
        let tokens = service();
        let token = tokens.issue(7, UserRole::User).unwrap();

        // Flip one character inside the signed payload segment.
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        assert_eq!(parts.len(), 3);
        let payload = &mut parts[1];
        let flipped = if payload.as_bytes()[3] == b'A' { "B" } else { "A" };
        payload.replace_range(3..4, flipped);
        let tampered = parts.join(".");
        assert_ne!(tampered, token);

        assert!(matches!(tokens.verify(&tampered), Err(Error::Unauthorized)));
    }

    #[test]
    fn verify_rejects_token_signed_with_other_secret() {
        let token = TokenService::with_default_ttl("other-secret")
            .issue(7, UserRole::Admin)
            .unwrap();

        assert!(matches!(service().verify(&token), Err(Error::Unauthorized)));
    }

    #[test]
    fn verify_rejects_malformed_token() {
        assert!(matches!(
            service().verify("definitely.not.a-jwt"),
            Err(Error::Unauthorized)
        ));
    }
}
