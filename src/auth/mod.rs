pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{FullName, User};

// Re-export necessary items
pub use extractors::CurrentUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};

lazy_static! {
    // Regex for name validation: letters with optional hyphens, apostrophes,
    // or spaces.
    pub static ref NAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-zA-Z][a-zA-Z' -]*$").unwrap();
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    /// User's email address.
    /// Must be a valid email format.
    #[validate(email)]
    pub email: String,
    /// User's password.
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
/// Unknown fields are rejected rather than silently dropped.
#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    /// Display name for the new account, nested as
    /// `{firstname, lastname}`.
    #[validate]
    pub fullname: FullName,
    /// Email address for the new account.
    /// Must be a valid email format.
    #[validate(email)]
    pub email: String,
    /// Password for the new account.
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
}

/// Response structure after successful authentication (login or registration).
/// Contains the session token and the authenticated user record.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The signed session token.
    pub token: String,
    /// The authenticated user (password hash excluded by serialization).
    pub user: User,
}
