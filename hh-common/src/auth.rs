//! Password hashing and JWT session tokens
//!
//! # Architecture
//!
//! - Passwords are stored as bcrypt hashes with cost 10
//! - Sessions are stateless HS256 JWTs valid for 2 hours
//! - The signing secret comes from bootstrap config, or else the `settings`
//!   table (generated and persisted on first run)
//!
//! This module has no HTTP framework dependencies. The API service wraps
//! these functions in axum extractors.

use chrono::{Duration, Utc};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::{Error, Result};

/// bcrypt work factor for stored passwords
pub const BCRYPT_COST: u32 = 10;

/// Session token lifetime
pub const TOKEN_TTL_HOURS: i64 = 2;

const JWT_SECRET_KEY: &str = "jwt_secret";

// ========================================
// Passwords
// ========================================

/// Hash a plaintext password for storage
pub fn hash_password(plain: &str) -> Result<String> {
    bcrypt::hash(plain, BCRYPT_COST).map_err(|e| Error::Auth(format!("Password hashing failed: {}", e)))
}

/// Check a plaintext password against a stored hash
///
/// Malformed hashes never verify.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    bcrypt::verify(plain, hash).unwrap_or(false)
}

// ========================================
// Tokens
// ========================================

/// JWT claims carried by session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id
    pub sub: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
}

impl Claims {
    /// Parse the subject back into a user id
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// Token verification failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Invalid(String),
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Expired => write!(f, "Token expired"),
            TokenError::Invalid(reason) => write!(f, "Invalid token: {}", reason),
        }
    }
}

impl std::error::Error for TokenError {}

/// Issue a session token for a user
pub fn issue_token(user_id: Uuid, secret: &str) -> Result<String> {
    let iat = Utc::now();
    let exp = iat + Duration::hours(TOKEN_TTL_HOURS);
    let claims = Claims {
        sub: user_id.to_string(),
        iat: iat.timestamp(),
        exp: exp.timestamp(),
    };
    encode_claims(&claims, secret)
}

fn encode_claims(claims: &Claims, secret: &str) -> Result<String> {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| Error::Auth(format!("Failed to encode token: {}", e)))
}

/// Verify signature and expiry of a session token
pub fn verify_token(token: &str, secret: &str) -> std::result::Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub"]);

    jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })
}

// ========================================
// Signing Secret Management
// ========================================

/// Resolve the JWT signing secret
///
/// An explicitly configured secret wins. Otherwise the `jwt_secret` setting
/// is used, generating and storing a random one when missing.
pub async fn resolve_jwt_secret(db: &SqlitePool, configured: Option<&str>) -> Result<String> {
    if let Some(secret) = configured.filter(|s| !s.trim().is_empty()) {
        return Ok(secret.to_string());
    }

    let stored: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(JWT_SECRET_KEY)
        .fetch_optional(db)
        .await?;

    match stored {
        Some((value,)) if !value.is_empty() => Ok(value),
        _ => initialize_jwt_secret(db).await,
    }
}

/// Generate a random signing secret and store it in settings
pub async fn initialize_jwt_secret(db: &SqlitePool) -> Result<String> {
    let secret = generate_secret();

    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(JWT_SECRET_KEY)
        .bind(&secret)
        .execute(db)
        .await?;

    info!("Generated new JWT signing secret");
    Ok(secret)
}

fn generate_secret() -> String {
    let bytes: [u8; 32] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
