use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's unique identifier. Nothing else
    /// sensitive is embedded; the token is integrity-protected, not encrypted.
    pub sub: Uuid,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Issues and validates session tokens, and owns the revocation list.
///
/// The signing secret is injected at construction; revoked tokens are
/// persisted in the `revoked_tokens` table so a logout survives restarts.
/// A token's lifecycle is one-way: issued, then either expired (time-based)
/// or revoked (explicit logout), never valid again.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    pool: PgPool,
}

impl TokenService {
    pub fn new(secret: &str, pool: PgPool) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            pool,
        }
    }

    /// Produces a signed token for the given user, expiring in 24 hours.
    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        let expiration = chrono::Utc::now()
            .checked_add_signed(chrono::Duration::hours(24))
            .expect("valid timestamp")
            .timestamp() as usize;

        let claims = Claims {
            sub: user_id,
            exp: expiration,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validates signature and expiry only; no revocation check. This is the
    /// pure half of `verify`.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthenticated(format!("invalid token: {}", e)))
    }

    /// Full validation: the revocation list is consulted first (a revoked
    /// token is invalid regardless of signature or expiry, and the lookup is
    /// cheaper than signature verification), then signature and expiry.
    pub async fn verify(&self, token: &str) -> Result<Claims, AppError> {
        if self.is_revoked(token).await? {
            return Err(AppError::Unauthenticated("token revoked".into()));
        }
        self.decode(token)
    }

    pub async fn is_revoked(&self, token: &str) -> Result<bool, AppError> {
        let row: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM revoked_tokens WHERE token = $1")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    /// Inserts the token into the revocation list. Idempotent: revoking an
    /// already-revoked token has no additional effect.
    pub async fn revoke(&self, token: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO revoked_tokens (token) VALUES ($1) ON CONFLICT (token) DO NOTHING")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
