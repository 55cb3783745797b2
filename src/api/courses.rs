use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, patch, post},
    Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use super::state::AppState;
use crate::auth::{AuthUser, MessageResponse};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    CreateExerciseRequest, ExerciseSubmission, ExerciseWithCount, Module,
    ReviewSubmissionRequest, SubmitExerciseRequest, UpdateModuleRequest,
};

type IdPath = WithRejection<Path<Uuid>, ApiError>;

/// Mounted at `/api/modules`.
pub fn module_routes(state: AppState) -> Router {
    Router::new()
        .route("/:module_id", patch(update_module).delete(delete_module))
        .route("/:module_id/exercises", post(create_exercise))
        .with_state(state)
}

/// Mounted at `/api/exercises`.
pub fn exercise_routes(state: AppState) -> Router {
    Router::new()
        .route("/:exercise_id", delete(delete_exercise))
        .route("/:exercise_id/submit", post(submit_exercise))
        .with_state(state)
}

/// Mounted at `/api/submissions`.
pub fn submission_routes(state: AppState) -> Router {
    Router::new()
        .route("/:submission_id/review", patch(review_submission))
        .with_state(state)
}

#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
async fn update_module(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(module_id), _): IdPath,
    WithRejection(Json(request), _): WithRejection<Json<UpdateModuleRequest>, ApiError>,
) -> ApiResult<Json<Module>> {
    let module = state
        .course_service
        .update_module(&user, module_id, request)
        .await?;
    Ok(Json(module))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn delete_module(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(module_id), _): IdPath,
) -> ApiResult<Json<MessageResponse>> {
    state.course_service.delete_module(&user, module_id).await?;
    Ok(Json(MessageResponse::new("Module supprimé avec succès")))
}

#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
async fn create_exercise(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(module_id), _): IdPath,
    WithRejection(Json(request), _): WithRejection<Json<CreateExerciseRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<ExerciseWithCount>)> {
    let exercise = state
        .course_service
        .create_exercise(&user, module_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(exercise)))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn delete_exercise(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(exercise_id), _): IdPath,
) -> ApiResult<Json<MessageResponse>> {
    state.course_service.delete_exercise(&user, exercise_id).await?;
    Ok(Json(MessageResponse::new("Exercice supprimé avec succès")))
}

#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
async fn submit_exercise(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(exercise_id), _): IdPath,
    WithRejection(Json(request), _): WithRejection<Json<SubmitExerciseRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<ExerciseSubmission>)> {
    let submission = state
        .course_service
        .submit(&user, exercise_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
async fn review_submission(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(submission_id), _): IdPath,
    WithRejection(Json(request), _): WithRejection<Json<ReviewSubmissionRequest>, ApiError>,
) -> ApiResult<Json<ExerciseSubmission>> {
    let submission = state
        .course_service
        .review(&user, submission_id, request)
        .await?;
    Ok(Json(submission))
}
