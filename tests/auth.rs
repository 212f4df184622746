use actix_cors::Cors;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{http::header, test, web, App, HttpResponse};
use dotenv::dotenv;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use taskdeck::auth::{AuthMiddleware, TokenService};
use taskdeck::config::Config;
use taskdeck::models::FullName;
use taskdeck::routes;
use taskdeck::routes::health;
use taskdeck::store::{TaskStore, UserStore};

// Test-only secrets when no .env provides them; DATABASE_URL must point at a
// real Postgres instance.
fn ensure_test_env() {
    dotenv().ok();
    if std::env::var("JWT_SECRET").is_err() {
        std::env::set_var("JWT_SECRET", "integration-test-secret");
    }
    if std::env::var("PASSWORD_PEPPER").is_err() {
        std::env::set_var("PASSWORD_PEPPER", "integration-test-pepper");
    }
}

async fn test_pool(config: &Config) -> PgPool {
    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to test DB");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

async fn cleanup_user(pool: &PgPool, email: &str) {
    let _ = sqlx::query("DELETE FROM tasks WHERE owner IN (SELECT id FROM users WHERE email = $1)")
        .bind(email)
        .execute(pool)
        .await;
    let _ = sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(email)
        .execute(pool)
        .await;
}

fn unique_email(prefix: &str) -> String {
    format!("{}_{}@example.com", prefix, Uuid::new_v4().simple())
}

macro_rules! test_app {
    ($config:expr, $pool:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(TokenService::new(
                    &$config.jwt_secret,
                    $pool.clone(),
                )))
                .app_data(web::Data::new(UserStore::new(
                    $pool.clone(),
                    $config.password_pepper.clone(),
                )))
                .app_data(web::Data::new(TaskStore::new($pool.clone())))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(Logger::default())
                // In a real server actix-http turns a service-level Err into
                // its ResponseError response; test::init_service stops below
                // that layer, so replicate the conversion here so
                // call_service sees the same responses a client would.
                .wrap_fn(|req, srv| {
                    let fut = srv.call(req);
                    async move {
                        match fut.await {
                            Ok(resp) => Ok(resp.map_into_boxed_body()),
                            // The original request is gone; the assertions
                            // only look at the response, so carry it on a
                            // placeholder request.
                            Err(err) => Ok(ServiceResponse::new(
                                test::TestRequest::default().to_http_request(),
                                HttpResponse::from_error(err),
                            )),
                        }
                    }
                })
                .service(health::health)
                .service(
                    web::scope("/api")
                        .wrap(AuthMiddleware)
                        .configure(routes::config),
                ),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_register_and_login_flow() {
    ensure_test_env();
    let config = Config::from_env();
    let pool = test_pool(&config).await;
    let app = test_app!(config, pool);

    let email = unique_email("register_flow");
    let register_payload = json!({
        "fullname": { "firstname": "Ann", "lastname": "Lee" },
        "email": email,
        "password": "Secret123!"
    });

    // Register a new user
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&register_payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body_bytes = test::read_body(resp).await;
    assert_eq!(
        status,
        actix_web::http::StatusCode::CREATED,
        "Registration failed. Body: {:?}",
        String::from_utf8_lossy(&body_bytes)
    );

    let register_response: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
    assert!(
        !register_response["token"].as_str().unwrap().is_empty(),
        "Token should be a non-empty string"
    );
    assert_eq!(register_response["user"]["fullname"]["firstname"], "Ann");
    assert_eq!(register_response["user"]["email"], email);
    assert!(
        register_response["user"].get("password_hash").is_none(),
        "Password hash must never appear in responses"
    );

    // The stored password must be hashed, never the plaintext
    let (stored_hash,): (String,) =
        sqlx::query_as("SELECT password_hash FROM users WHERE email = $1")
            .bind(&email)
            .fetch_one(&pool)
            .await
            .expect("registered user should exist");
    assert_ne!(stored_hash, "Secret123!");
    assert!(stored_hash.starts_with("$2"), "expected a bcrypt hash");

    // A second registration with the same email fails with 409
    let req_conflict = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&register_payload)
        .to_request();
    let resp_conflict = test::call_service(&app, req_conflict).await;
    assert_eq!(
        resp_conflict.status(),
        actix_web::http::StatusCode::CONFLICT,
        "Duplicate registration did not fail as expected"
    );

    // Login with the registered user
    let req_login = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(&json!({ "email": email, "password": "Secret123!" }))
        .to_request();
    let resp_login = test::call_service(&app, req_login).await;
    assert_eq!(resp_login.status(), actix_web::http::StatusCode::OK);

    // Login also sets the token cookie for browser clients
    let set_cookie = resp_login
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert!(
        set_cookie.starts_with("token="),
        "Expected a token cookie, got: {}",
        set_cookie
    );

    let body_login = test::read_body(resp_login).await;
    let login_response: serde_json::Value = serde_json::from_slice(&body_login).unwrap();
    let token = login_response["token"].as_str().unwrap().to_owned();
    assert!(!token.is_empty());

    // Use the token on a protected route: the profile endpoint
    let req_profile = test::TestRequest::get()
        .uri("/api/auth/profile")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp_profile = test::call_service(&app, req_profile).await;
    assert_eq!(resp_profile.status(), actix_web::http::StatusCode::OK);
    let profile: serde_json::Value = test::read_body_json(resp_profile).await;
    assert_eq!(profile["user"]["fullname"]["firstname"], "Ann");
    assert_eq!(profile["user"]["email"], email);

    cleanup_user(&pool, &email).await;
}

#[actix_rt::test]
async fn test_invalid_registration_inputs() {
    ensure_test_env();
    let config = Config::from_env();
    let pool = test_pool(&config).await;
    let app = test_app!(config, pool);

    let test_cases = vec![
        // Deserialization errors (expect 400 for missing fields)
        (
            json!({ "email": "test@example.com", "password": "Secret123!" }),
            actix_web::http::StatusCode::BAD_REQUEST,
            "missing fullname",
        ),
        (
            json!({ "fullname": { "firstname": "Ann" }, "password": "Secret123!" }),
            actix_web::http::StatusCode::BAD_REQUEST,
            "missing email",
        ),
        (
            json!({ "fullname": { "firstname": "Ann" }, "email": "test@example.com" }),
            actix_web::http::StatusCode::BAD_REQUEST,
            "missing password",
        ),
        // Validation errors (expect 422 after successful deserialization)
        (
            json!({ "fullname": { "firstname": "Ann" }, "email": "invalid-email", "password": "Secret123!" }),
            actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
            "invalid email format",
        ),
        (
            json!({ "fullname": { "firstname": "Al" }, "email": "test@example.com", "password": "Secret123!" }),
            actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
            "firstname too short",
        ),
        (
            json!({ "fullname": { "firstname": "Ann3" }, "email": "test@example.com", "password": "Secret123!" }),
            actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
            "firstname with invalid chars",
        ),
        (
            json!({ "fullname": { "firstname": "Ann", "lastname": "Li" }, "email": "test@example.com", "password": "Secret123!" }),
            actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
            "lastname too short",
        ),
        (
            json!({ "fullname": { "firstname": "Ann" }, "email": "test@example.com", "password": "123" }),
            actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
            "password too short",
        ),
    ];

    for (payload, expected_status, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(&payload)
            .to_request();

        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body_bytes = test::read_body(resp).await;

        assert_eq!(
            status,
            expected_status,
            "Test case failed: {}. Expected {}, got {}. Body: {:?}",
            description,
            expected_status,
            status,
            String::from_utf8_lossy(&body_bytes)
        );
    }
}

#[actix_rt::test]
async fn test_invalid_login_inputs() {
    ensure_test_env();
    let config = Config::from_env();
    let pool = test_pool(&config).await;
    let app = test_app!(config, pool);

    // Setup a valid user for the credential-failure cases
    let email = unique_email("login_inputs");
    let register_payload = json!({
        "fullname": { "firstname": "Ann", "lastname": "Lee" },
        "email": email,
        "password": "Secret123!"
    });
    let reg_req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&register_payload)
        .to_request();
    let reg_resp = test::call_service(&app, reg_req).await;
    assert!(
        reg_resp.status().is_success(),
        "Setup: failed to register test user"
    );

    let test_cases = vec![
        (
            json!({ "password": "Secret123!" }),
            actix_web::http::StatusCode::BAD_REQUEST,
            "missing email",
        ),
        (
            json!({ "email": email }),
            actix_web::http::StatusCode::BAD_REQUEST,
            "missing password",
        ),
        (
            json!({ "email": "invalid-email", "password": "Secret123!" }),
            actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
            "invalid email format",
        ),
        (
            json!({ "email": email, "password": "123" }),
            actix_web::http::StatusCode::UNPROCESSABLE_ENTITY,
            "password too short",
        ),
        (
            json!({ "email": email, "password": "WrongPassword123!" }),
            actix_web::http::StatusCode::UNAUTHORIZED,
            "incorrect password",
        ),
        (
            json!({ "email": unique_email("nonexistent"), "password": "Secret123!" }),
            actix_web::http::StatusCode::UNAUTHORIZED,
            "non-existent user",
        ),
    ];

    for (payload, expected_status, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(&payload)
            .to_request();

        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body_bytes = test::read_body(resp).await;

        assert_eq!(
            status,
            expected_status,
            "Test case failed: {}. Expected {}, got {}. Body: {:?}",
            description,
            expected_status,
            status,
            String::from_utf8_lossy(&body_bytes)
        );
    }

    cleanup_user(&pool, &email).await;
}

#[actix_rt::test]
async fn test_logout_revokes_token() {
    ensure_test_env();
    let config = Config::from_env();
    let pool = test_pool(&config).await;
    let app = test_app!(config, pool);

    let email = unique_email("logout_flow");
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&json!({
            "fullname": { "firstname": "Ann" },
            "email": email,
            "password": "Secret123!"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    let auth: serde_json::Value = test::read_body_json(resp).await;
    let token = auth["token"].as_str().unwrap().to_owned();

    // The fresh token passes the gate
    let req_tasks = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp_tasks = test::call_service(&app, req_tasks).await;
    assert_eq!(resp_tasks.status(), actix_web::http::StatusCode::OK);

    // Logout revokes it and clears the cookie
    let req_logout = test::TestRequest::post()
        .uri("/api/auth/logout")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp_logout = test::call_service(&app, req_logout).await;
    assert_eq!(resp_logout.status(), actix_web::http::StatusCode::OK);

    // The same, otherwise-unexpired token now fails verification
    let req_after = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let resp_after = test::call_service(&app, req_after).await;
    assert_eq!(
        resp_after.status(),
        actix_web::http::StatusCode::UNAUTHORIZED,
        "A revoked token must be rejected even though it has not expired"
    );

    // Revocation is persisted exactly once
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM revoked_tokens WHERE token = $1")
        .bind(&token)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    let _ = sqlx::query("DELETE FROM revoked_tokens WHERE token = $1")
        .bind(&token)
        .execute(&pool)
        .await;
    cleanup_user(&pool, &email).await;
}

#[test_log::test(actix_rt::test)]
async fn test_revoke_is_idempotent() {
    ensure_test_env();
    let config = Config::from_env();
    let pool = test_pool(&config).await;
    let tokens = TokenService::new(&config.jwt_secret, pool.clone());

    let token = tokens.issue(Uuid::new_v4()).unwrap();
    assert!(tokens.verify(&token).await.is_ok());

    // Revoking twice has no additional effect: both calls succeed and the
    // revocation list still holds a single entry for the token.
    tokens.revoke(&token).await.expect("first revoke");
    tokens.revoke(&token).await.expect("repeated revoke must also succeed");

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM revoked_tokens WHERE token = $1")
        .bind(&token)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);

    // And the token stays invalid
    assert!(tokens.verify(&token).await.is_err());

    let _ = sqlx::query("DELETE FROM revoked_tokens WHERE token = $1")
        .bind(&token)
        .execute(&pool)
        .await;
}

#[test_log::test(actix_rt::test)]
async fn test_find_by_email_excludes_password_hash() {
    ensure_test_env();
    let config = Config::from_env();
    let pool = test_pool(&config).await;
    let users = UserStore::new(pool.clone(), config.password_pepper.clone());

    let email = unique_email("find_by_email");
    let fullname = FullName {
        firstname: "Ann".to_string(),
        lastname: Some("Lee".to_string()),
    };
    let created = users
        .create(&fullname, &email, "Secret123!")
        .await
        .expect("Failed to create user");

    // Default reads resolve the user without the password hash
    let found = users
        .find_by_email(&email)
        .await
        .unwrap()
        .expect("created user should be found by email");
    assert_eq!(found.id, created.id);
    assert_eq!(found.email, email);
    assert!(
        found.password_hash.is_none(),
        "default reads must not carry the password hash"
    );

    let missing = users.find_by_email(&unique_email("missing")).await.unwrap();
    assert!(missing.is_none());

    cleanup_user(&pool, &email).await;
}

#[actix_rt::test]
async fn test_missing_token_is_unauthorized() {
    ensure_test_env();
    let config = Config::from_env();
    let pool = test_pool(&config).await;
    let app = test_app!(config, pool);

    let req = test::TestRequest::get().uri("/api/tasks").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);

    // The denial body is generic and does not say what was wrong
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Not authorized");

    // Garbage tokens are rejected the same way
    let req = test::TestRequest::get()
        .uri("/api/tasks")
        .append_header((header::AUTHORIZATION, "Bearer not-a-real-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Not authorized");
}
