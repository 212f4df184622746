use crate::{
    auth::{AuthResponse, CurrentUser, LoginRequest, RegisterRequest, TokenService},
    error::AppError,
    store::UserStore,
};
use actix_web::{cookie::Cookie, get, post, web, HttpRequest, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Register a new user
///
/// Creates a new user account and returns a session token alongside the
/// created user. Fails with 409 if the email is already registered.
#[post("/register")]
pub async fn register(
    users: web::Data<UserStore>,
    tokens: web::Data<TokenService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let user = users
        .create(
            &register_data.fullname,
            &register_data.email,
            &register_data.password,
        )
        .await?;

    let token = tokens.issue(user.id)?;

    Ok(HttpResponse::Created().json(AuthResponse { token, user }))
}

/// Login user
///
/// Authenticates a user, returns a session token, and also sets it as a
/// `token` cookie for browser clients.
#[post("/login")]
pub async fn login(
    users: web::Data<UserStore>,
    tokens: web::Data<TokenService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let user = users
        .verify_credentials(&login_data.email, &login_data.password)
        .await?;

    let token = tokens.issue(user.id)?;

    let cookie = Cookie::build("token", token.clone())
        .path("/")
        .http_only(true)
        .finish();

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(AuthResponse { token, user }))
}

/// Logout
///
/// Revokes the presented bearer token (idempotent) and clears the `token`
/// cookie. The token is already past the auth gate here, so it is present and
/// valid; after this call it fails verification until its natural expiry, at
/// which point the revocation entry could be garbage-collected.
#[post("/logout")]
pub async fn logout(
    tokens: web::Data<TokenService>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthenticated("no bearer token on logout".into()))?;

    tokens.revoke(token).await?;

    let mut removal = Cookie::new("token", "");
    removal.set_path("/");
    removal.make_removal();

    Ok(HttpResponse::Ok()
        .cookie(removal)
        .json(json!({ "message": "Logged out successfully" })))
}

/// Current user's profile.
#[get("/profile")]
pub async fn profile(user: CurrentUser) -> Result<impl Responder, AppError> {
    let CurrentUser(user) = user;
    Ok(HttpResponse::Ok().json(json!({
        "user": {
            "fullname": user.fullname,
            "email": user.email
        }
    })))
}
