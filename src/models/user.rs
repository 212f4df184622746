use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::auth::NAME_REGEX;

/// A user's display name, nested on the wire as
/// `{"fullname": {"firstname": ..., "lastname": ...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, FromRow)]
#[serde(deny_unknown_fields)]
pub struct FullName {
    /// Required; at least 3 characters, letters with optional hyphens,
    /// apostrophes, or spaces.
    #[validate(
        length(min = 3, max = 50),
        regex(
            path = "NAME_REGEX",
            message = "Name must contain only letters, hyphens, apostrophes, or spaces"
        )
    )]
    pub firstname: String,
    /// Optional; same constraints as `firstname` when present.
    #[validate(
        length(min = 3, max = 50),
        regex(
            path = "NAME_REGEX",
            message = "Name must contain only letters, hyphens, apostrophes, or spaces"
        )
    )]
    pub lastname: Option<String>,
}

/// A registered user as stored in the database and returned by the API.
///
/// The password hash is excluded from default reads (queries that do not need
/// it simply don't select the column, leaving the field `None`) and is never
/// serialized into a response.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    /// Unique identifier, exposed on the wire as `_id`.
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[sqlx(flatten)]
    pub fullname: FullName,
    pub email: String,
    /// Populated only by credential-comparison queries at login.
    #[serde(skip_serializing)]
    #[sqlx(default)]
    pub password_hash: Option<String>,
}
