use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use axum_extra::extract::WithRejection;

use super::state::AppState;
use crate::auth::{
    AuthResponse, AuthUser, LoginRequest, MessageResponse, RefreshTokenRequest, SessionUser,
    TokenResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::models::{SignupRequest, SignupResponse};

/// Public account creation, merged at the root.
pub fn signup_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/signup", post(signup))
        .with_state(state)
}

/// Session routes, mounted at `/api/auth`.
pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh_token))
        .route("/logout", post(logout))
        .route("/session", get(session))
        .with_state(state)
}

/// Register a new account
#[tracing::instrument(skip(state, request))]
async fn signup(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<SignupRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    let response = state.user_service.signup(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login user
#[tracing::instrument(skip(state, request))]
async fn login(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> ApiResult<Json<AuthResponse>> {
    let response = state.auth_service.login(request).await?;
    Ok(Json(response))
}

/// Refresh access token
#[tracing::instrument(skip(state, request))]
async fn refresh_token(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<RefreshTokenRequest>, ApiError>,
) -> ApiResult<Json<TokenResponse>> {
    let response = state.auth_service.refresh_token(request).await?;
    Ok(Json(response))
}

/// Logout user
#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn logout(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<MessageResponse>> {
    let response = state.auth_service.logout(&user).await?;
    Ok(Json(response))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn session(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<SessionUser>> {
    let profile = state.user_service.session_profile(user.user_id).await?;
    Ok(Json(profile))
}
