use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::User;

/// Extracts the authenticated `User` from request extensions.
///
/// Intended for routes guarded by `AuthMiddleware`, which validates the token
/// and inserts the resolved user. If no user is present (middleware missing
/// or misconfigured), the request is denied with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<User>().cloned() {
            Some(user) => ready(Ok(CurrentUser(user))),
            None => {
                let err = AppError::Unauthenticated(
                    "no authenticated user in request extensions".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
