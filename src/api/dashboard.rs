use axum::{extract::State, response::Json, routing::get, Router};

use super::state::AppState;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::models::{LearnerDashboard, TrainerDashboard};

/// Mounted at `/api/dashboard`.
pub fn dashboard_routes(state: AppState) -> Router {
    Router::new()
        .route("/apprenant", get(learner_dashboard))
        .route("/formateur", get(trainer_dashboard))
        .with_state(state)
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn learner_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<LearnerDashboard>> {
    let dashboard = state.dashboard_service.learner(&user).await?;
    Ok(Json(dashboard))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn trainer_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<TrainerDashboard>> {
    let dashboard = state.dashboard_service.trainer(&user).await?;
    Ok(Json(dashboard))
}
