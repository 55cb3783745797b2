use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
};

use crate::auth::{extract_bearer_token, AuthError, AuthService, Role, UserSession};
use crate::error::ApiError;

/// Authenticated caller. Rejects with 401 when the bearer token is missing,
/// malformed, expired or revoked.
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserSession);

impl std::ops::Deref for AuthUser {
    type Target = UserSession;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AuthService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Already validated by a middleware further up the stack.
        if let Some(session) = parts.extensions.get::<UserSession>() {
            return Ok(AuthUser(session.clone()));
        }

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .ok_or(AuthError::MissingAuthHeader)?;
        let token = extract_bearer_token(auth_header)?;

        let auth_service = AuthService::from_ref(state);
        let session = auth_service.validate_session(token).await?;
        parts.extensions.insert(session.clone());

        Ok(AuthUser(session))
    }
}

/// Admin-only middleware: 401 without a valid session, 403 for other roles.
pub async fn admin_only_middleware(
    State(auth_service): State<AuthService>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;
    let token = extract_bearer_token(auth_header)?;
    let session = auth_service.validate_session(token).await?;

    if session.role != Role::Admin {
        tracing::warn!(user_id = %session.user_id, "non-admin access to admin console");
        return Err(ApiError::forbidden());
    }

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// CORS configuration. Bearer tokens travel in a header, so credentials
/// mode stays off and any origin is accepted.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

pub fn security_headers_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    )
}
