//! Session token issue and verification (HS256).
//!
//! Claims bind a user id and role; handlers still re-resolve the user
//! record on every protected call so identity changes take effect
//! before the token expires.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;

use crate::auth::middleware::Claims;
use crate::store::models::{Role, User};

/// Generate a fresh 256-bit signing key. The store is in-memory, so a
/// per-boot key matches the lifetime of everything it signs.
pub fn generate_jwt_secret() -> Vec<u8> {
    let key: [u8; 32] = rand::rng().random();
    key.to_vec()
}

/// Issue a session token for a user. Claims: sub=user id, role, iat, exp.
pub fn issue_token(
    secret: &[u8],
    user: &User,
    ttl_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user.id,
        role: user.role,
        iat: now,
        exp: now + ttl_hours * 3600,
    };
    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(secret),
    )
}

/// Decode and verify a token: signature, expiry, well-formedness.
pub fn validate_token(
    secret: &[u8],
    token: &str,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)?;
    Ok(token_data.claims)
}
