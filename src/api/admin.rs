use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{delete, get, patch},
    Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use super::state::AppState;
use crate::auth::{admin_only_middleware, AuthUser, MessageResponse};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    AdminFormation, AdminStats, AdminUser, CreateUserRequest, PublishState,
    TogglePublishRequest,
};

type IdPath = WithRejection<Path<Uuid>, ApiError>;

/// Admin console, mounted at `/api/admin`. Every route requires an ADMIN
/// session.
pub fn admin_routes(state: AppState) -> Router {
    Router::new()
        .route("/stats", get(stats))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", delete(delete_user))
        .route("/formations", get(list_formations))
        .route("/formations/:id", delete(delete_formation))
        .route("/formations/:id/toggle-publish", patch(toggle_publish))
        .route_layer(middleware::from_fn_with_state(
            state.auth_service.clone(),
            admin_only_middleware,
        ))
        .with_state(state)
}

#[tracing::instrument(skip(state))]
async fn stats(State(state): State<AppState>) -> ApiResult<Json<AdminStats>> {
    let stats = state.admin_service.stats().await?;
    Ok(Json(stats))
}

#[tracing::instrument(skip(state))]
async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<AdminUser>>> {
    let users = state.admin_service.list_users().await?;
    Ok(Json(users))
}

#[tracing::instrument(skip(state, request))]
async fn create_user(
    State(state): State<AppState>,
    WithRejection(Json(request), _): WithRejection<Json<CreateUserRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<AdminUser>)> {
    let user = state.admin_service.create_user(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[tracing::instrument(skip(state))]
async fn delete_user(
    State(state): State<AppState>,
    WithRejection(Path(id), _): IdPath,
) -> ApiResult<Json<MessageResponse>> {
    state.admin_service.delete_user(id).await?;
    Ok(Json(MessageResponse::new("Utilisateur supprimé avec succès")))
}

#[tracing::instrument(skip(state))]
async fn list_formations(State(state): State<AppState>) -> ApiResult<Json<Vec<AdminFormation>>> {
    let formations = state.admin_service.list_formations().await?;
    Ok(Json(formations))
}

#[tracing::instrument(skip(state, admin), fields(admin_id = %admin.user_id))]
async fn delete_formation(
    State(state): State<AppState>,
    admin: AuthUser,
    WithRejection(Path(id), _): IdPath,
) -> ApiResult<Json<MessageResponse>> {
    state.formation_service.delete(&admin, id).await?;
    Ok(Json(MessageResponse::new("Formation supprimée avec succès")))
}

#[tracing::instrument(skip(state, request))]
async fn toggle_publish(
    State(state): State<AppState>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(request), _): WithRejection<Json<TogglePublishRequest>, ApiError>,
) -> ApiResult<Json<PublishState>> {
    let is_published = request
        .is_published
        .ok_or_else(|| ApiError::bad_request("Statut de publication requis"))?;
    let formation = state
        .formation_service
        .set_published(id, is_published)
        .await?;
    Ok(Json(formation))
}
