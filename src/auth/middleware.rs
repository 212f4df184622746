use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::token::TokenService;
use crate::error::AppError;
use crate::store::UserStore;

/// Request guard for the authenticated API scope.
///
/// Extracts the bearer token, checks the revocation list, verifies signature
/// and expiry, and resolves the embedded user id against the user store. On
/// success the resolved `User` is attached to request extensions for the
/// `CurrentUser` extractor; on any failure the request is denied with a
/// generic 401. Pure gate: no side effects on success.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            // Registration and login are the only unauthenticated endpoints
            // inside the scope.
            let path = req.path();
            if path.starts_with("/api/auth/login") || path.starts_with("/api/auth/register") {
                return service.call(req).await;
            }

            let token = req
                .headers()
                .get("Authorization")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(|value| value.to_owned());

            let token = match token {
                Some(token) => token,
                None => {
                    return Err(AppError::Unauthenticated("no bearer token".into()).into());
                }
            };

            let tokens = req
                .app_data::<web::Data<TokenService>>()
                .cloned()
                .ok_or_else(|| AppError::Internal("TokenService not configured".into()))?;
            let users = req
                .app_data::<web::Data<UserStore>>()
                .cloned()
                .ok_or_else(|| AppError::Internal("UserStore not configured".into()))?;

            // Revocation is checked before signature/expiry inside verify.
            let claims = tokens.verify(&token).await?;

            // Covers deleted accounts holding otherwise-valid tokens.
            let user = users
                .find_by_id(claims.sub)
                .await?
                .ok_or_else(|| AppError::Unauthenticated("user not found".into()))?;

            req.extensions_mut().insert(user);
            service.call(req).await
        })
    }
}
