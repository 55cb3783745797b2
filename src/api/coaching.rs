use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch},
    Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use super::state::AppState;
use crate::auth::{AuthUser, MessageResponse};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    CoachingNoteView, CoachingQuery, CreateNoteRequest, LearnerWithCounts,
    NoteWithClient, UpdateNoteRequest,
};

type NotePath = WithRejection<Path<Uuid>, ApiError>;

/// Coaching notes, mounted at `/api/coaching`.
pub fn coaching_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_notes).post(create_note))
        .route("/clients", get(list_clients))
        .route("/:note_id", patch(update_note).delete(delete_note))
        .with_state(state)
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn list_notes(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Query(query), _): WithRejection<Query<CoachingQuery>, ApiError>,
) -> ApiResult<Json<Vec<CoachingNoteView>>> {
    let notes = state.coaching_service.list(&user, query.client_id).await?;
    Ok(Json(notes))
}

#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
async fn create_note(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<CreateNoteRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<NoteWithClient>)> {
    let note = state.coaching_service.create(&user, request).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
async fn update_note(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(note_id), _): NotePath,
    WithRejection(Json(request), _): WithRejection<Json<UpdateNoteRequest>, ApiError>,
) -> ApiResult<Json<NoteWithClient>> {
    let note = state.coaching_service.update(&user, note_id, request).await?;
    Ok(Json(note))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn delete_note(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(note_id), _): NotePath,
) -> ApiResult<Json<MessageResponse>> {
    state.coaching_service.delete(&user, note_id).await?;
    Ok(Json(MessageResponse::new("Note supprimée avec succès")))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn list_clients(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<LearnerWithCounts>>> {
    let learners = state.coaching_service.list_learners(&user).await?;
    Ok(Json(learners))
}
