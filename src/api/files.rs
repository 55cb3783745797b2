use axum::{extract::State, response::Json, routing::post, Router};
use axum_extra::extract::WithRejection;

use super::state::AppState;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{DownloadRequest, DownloadResponse};

/// Mounted at `/api/files`.
pub fn file_routes(state: AppState) -> Router {
    Router::new()
        .route("/download", post(download_url))
        .with_state(state)
}

/// Issues a time-limited download URL for a stored formation file.
#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
async fn download_url(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<DownloadRequest>, ApiError>,
) -> ApiResult<Json<DownloadResponse>> {
    let signed_url = state
        .formation_service
        .download_url(request.cloud_storage_path.as_deref())
        .await?;
    Ok(Json(DownloadResponse { signed_url }))
}
