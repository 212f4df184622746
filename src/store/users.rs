use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::models::{FullName, User};

/// Persistence for user records, and the only component that touches password
/// material. The pepper is injected at construction; plaintext passwords are
/// hashed on the way in and never stored or logged. Default reads exclude the
/// password hash column; only `verify_credentials` selects it.
#[derive(Clone)]
pub struct UserStore {
    pool: PgPool,
    pepper: String,
}

impl UserStore {
    pub fn new(pool: PgPool, pepper: String) -> Self {
        Self { pool, pepper }
    }

    /// Creates a user, failing with `DuplicateEmail` if the address is taken.
    /// Checked-then-insert; the unique constraint on `email` closes the race
    /// window (a concurrent insert surfaces as `DuplicateEmail` too, via the
    /// unique-violation mapping).
    pub async fn create(
        &self,
        fullname: &FullName,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        if self.find_by_email(email).await?.is_some() {
            return Err(AppError::DuplicateEmail("Email already registered".into()));
        }

        let password_hash = hash_password(password, &self.pepper)?;

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, firstname, lastname, email, password_hash)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, firstname, lastname, email",
        )
        .bind(Uuid::new_v4())
        .bind(&fullname.firstname)
        .bind(&fullname.lastname)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, firstname, lastname, email FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, firstname, lastname, email FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Looks up the user by email with the password hash explicitly selected,
    /// and compares the peppered hash. Unknown email and wrong password fail
    /// identically so the response does not reveal which one it was.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, firstname, lastname, email, password_hash
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let mut user = match user {
            Some(user) => user,
            None => {
                return Err(AppError::Unauthenticated("invalid email or password".into()));
            }
        };

        let hash = user
            .password_hash
            .as_deref()
            .ok_or_else(|| AppError::Internal("password hash missing on credential read".into()))?;

        if !verify_password(password, &self.pepper, hash)? {
            return Err(AppError::Unauthenticated("invalid email or password".into()));
        }

        // Don't carry the hash beyond the comparison.
        user.password_hash = None;
        Ok(user)
    }
}
