/// Credential and session-token service
///
/// Password hashing uses Argon2id with a random salt (PHC string format).
/// Session tokens are HS256 JWTs carrying the caller's identity and role.
use crate::{
    auth::Identity,
    db::models::Role,
    error::{ApiError, ApiResult},
};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use password_hash::{PasswordHash, SaltString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim on every token
pub const TOKEN_ISSUER: &str = "upskill-server";
/// Audience claim on every token
pub const TOKEN_AUDIENCE: &str = "upskill-clients";

/// Hash a password with Argon2id
pub fn hash_password(password: &str) -> ApiResult<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| ApiError::Internal(format!("Salt generation failed: {}", e)))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| ApiError::Internal(format!("Salt encoding failed: {}", e)))?;

    let argon2 = Argon2::default();
    let phc = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    Ok(phc)
}

/// Verify a password against a stored PHC hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    } else {
        false
    }
}

/// JWT claims embedded in a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: String,
    pub role: String,
    pub email: String,
    pub elevated: bool,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Signed-session-token issuance and verification
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a signed session token for an identity
    pub fn issue(&self, identity: &Identity) -> ApiResult<String> {
        if identity.email.is_empty() {
            return Err(ApiError::Validation(
                "Cannot issue token without an email".to_string(),
            ));
        }

        let now = Utc::now();
        let claims = Claims {
            sub: identity.id.to_string(),
            role: identity.role.as_str().to_string(),
            email: identity.email.clone(),
            elevated: identity.elevated,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            iss: TOKEN_ISSUER.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Token signing failed: {}", e)))
    }

    /// Verify a session token and return its claims
    ///
    /// Expiry, signature, and structural failures each map to their own
    /// taxonomy kind; an unknown role claim is rejected, never defaulted.
    pub fn verify(&self, token: &str) -> ApiResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_audience(&[TOKEN_AUDIENCE]);
        validation.leeway = 30;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => ApiError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    ApiError::TokenInvalid("bad signature".to_string())
                }
                _ => ApiError::TokenInvalid(e.to_string()),
            }
        })?;

        let claims = data.claims;
        Role::parse(&claims.role)
            .map_err(|_| ApiError::TokenInvalid(format!("unknown role: {}", claims.role)))?;
        Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::TokenInvalid("malformed subject".to_string()))?;

        Ok(claims)
    }

    /// Build an identity from verified claims
    pub fn identity_from_claims(&self, claims: &Claims) -> ApiResult<Identity> {
        Ok(Identity {
            id: Uuid::parse_str(&claims.sub)
                .map_err(|_| ApiError::TokenInvalid("malformed subject".to_string()))?,
            role: Role::parse(&claims.role)
                .map_err(|_| ApiError::TokenInvalid("unknown role".to_string()))?,
            email: claims.email.clone(),
            elevated: claims.elevated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("0123456789abcdef0123456789abcdef", 24)
    }

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            role: Role::Member,
            email: "alice@example.com".to_string(),
            elevated: false,
        }
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2hunter2", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn test_verify_garbage_hash_is_false() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_token_round_trip() {
        let svc = service();
        let ident = identity();

        let token = svc.issue(&ident).unwrap();
        let claims = svc.verify(&token).unwrap();

        assert_eq!(claims.sub, ident.id.to_string());
        assert_eq!(claims.role, "member");
        assert_eq!(claims.email, ident.email);
        assert!(!claims.elevated);

        let restored = svc.identity_from_claims(&claims).unwrap();
        assert_eq!(restored.id, ident.id);
        assert_eq!(restored.role, ident.role);
        assert_eq!(restored.elevated, ident.elevated);
    }

    #[test]
    fn test_issue_requires_email() {
        let svc = service();
        let mut ident = identity();
        ident.email = String::new();
        assert!(matches!(svc.issue(&ident), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let svc = service();
        let token = svc.issue(&identity()).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(if token.ends_with('A') { 'B' } else { 'A' });
        assert!(svc.verify(&tampered).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue(&identity()).unwrap();
        let other = TokenService::new("ffffffffffffffffffffffffffffffff", 24);
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let svc = TokenService::new("0123456789abcdef0123456789abcdef", -2);
        let token = svc.issue(&identity()).unwrap();
        assert!(matches!(svc.verify(&token), Err(ApiError::TokenExpired)));
    }
}
