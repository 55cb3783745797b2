use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use super::state::AppState;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::{Conversation, MessageWithParticipants, SendMessageRequest, TrainerContact};

/// Private messaging, mounted at `/api/messages`.
pub fn message_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_conversations).post(send_message))
        .route("/formateurs", get(list_trainers))
        .route("/:user_id", get(thread))
        .with_state(state)
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn list_conversations(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Conversation>>> {
    let conversations = state.message_service.conversations(&user).await?;
    Ok(Json(conversations))
}

#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<SendMessageRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<MessageWithParticipants>)> {
    let message = state.message_service.send(&user, request).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn thread(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(other_user_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> ApiResult<Json<Vec<MessageWithParticipants>>> {
    let messages = state.message_service.thread(&user, other_user_id).await?;
    Ok(Json(messages))
}

#[tracing::instrument(skip(state, _user))]
async fn list_trainers(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Json<Vec<TrainerContact>>> {
    let trainers = state.user_service.list_trainers().await?;
    Ok(Json(trainers))
}
