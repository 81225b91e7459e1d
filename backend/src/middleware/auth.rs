//! Authentication middleware
//!
//! Validates the bearer JWT and makes the authenticated user available to
//! handlers through the `CurrentUser` extractor.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

/// JWT claims carried by access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated user information extracted from the token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

/// Extractor for handlers running behind `auth_middleware`
pub struct CurrentUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::InvalidToken.into_response())
    }
}

/// Middleware that validates the `Authorization: Bearer` token and attaches
/// the decoded user to the request
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(&request) {
        Some(token) => token,
        None => return AppError::InvalidToken.into_response(),
    };

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.config.jwt.secret.as_bytes()),
        &Validation::default(),
    );

    match decoded {
        Ok(data) => {
            request.extensions_mut().insert(AuthUser {
                user_id: data.claims.sub,
                role: data.claims.role,
            });
            next.run(request).await
        }
        Err(err) if matches!(err.kind(), jsonwebtoken::errors::ErrorKind::ExpiredSignature) => {
            AppError::TokenExpired.into_response()
        }
        Err(_) => AppError::InvalidToken.into_response(),
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
