use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use super::state::AppState;
use crate::auth::{AuthUser, MessageResponse};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    CommentWithAuthor, CreateCommentRequest, CreatePostRequest, PinPostRequest, PostSummary,
    PostWithRelations, ReactRequest, Reaction, SharePostRequest, ShareWithUser,
};

type IdPath = WithRejection<Path<Uuid>, ApiError>;

/// Community feed, mounted at `/api/community`.
pub fn community_routes(state: AppState) -> Router {
    Router::new()
        .route("/posts", get(feed).post(create_post))
        .route("/posts/:post_id", delete(delete_post).patch(pin_post))
        .route("/posts/:post_id/comments", post(add_comment))
        .route(
            "/posts/:post_id/reactions",
            post(react).delete(remove_reaction),
        )
        .route("/posts/:post_id/share", post(share_post))
        .route("/comments/:comment_id", delete(delete_comment))
        .with_state(state)
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn feed(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<Vec<PostWithRelations>>> {
    let posts = state.community_service.feed().await?;
    Ok(Json(posts))
}

#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Json(request), _): WithRejection<Json<CreatePostRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<PostSummary>)> {
    let post = state.community_service.create_post(&user, request).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn delete_post(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(post_id), _): IdPath,
) -> ApiResult<Json<MessageResponse>> {
    state.community_service.delete_post(&user, post_id).await?;
    Ok(Json(MessageResponse::new("Post supprimé avec succès")))
}

#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
async fn pin_post(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(post_id), _): IdPath,
    WithRejection(Json(request), _): WithRejection<Json<PinPostRequest>, ApiError>,
) -> ApiResult<Json<PostSummary>> {
    let post = state
        .community_service
        .set_pinned(&user, post_id, request.is_pinned)
        .await?;
    Ok(Json(post))
}

#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
async fn add_comment(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(post_id), _): IdPath,
    WithRejection(Json(request), _): WithRejection<Json<CreateCommentRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<CommentWithAuthor>)> {
    let comment = state
        .community_service
        .add_comment(&user, post_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn delete_comment(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(comment_id), _): IdPath,
) -> ApiResult<Json<MessageResponse>> {
    state.community_service.delete_comment(&user, comment_id).await?;
    Ok(Json(MessageResponse::new("Commentaire supprimé avec succès")))
}

#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
async fn react(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(post_id), _): IdPath,
    WithRejection(Json(request), _): WithRejection<Json<ReactRequest>, ApiError>,
) -> ApiResult<(StatusCode, Json<Reaction>)> {
    let reaction = state.community_service.react(&user, post_id, request).await?;
    Ok((StatusCode::CREATED, Json(reaction)))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn remove_reaction(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(post_id), _): IdPath,
) -> ApiResult<Json<MessageResponse>> {
    state.community_service.remove_reaction(&user, post_id).await?;
    Ok(Json(MessageResponse::new("Réaction supprimée avec succès")))
}

/// The body is optional; an empty request shares without comment.
#[tracing::instrument(skip(state, user, request), fields(user_id = %user.user_id))]
async fn share_post(
    State(state): State<AppState>,
    user: AuthUser,
    WithRejection(Path(post_id), _): IdPath,
    request: Option<Json<SharePostRequest>>,
) -> ApiResult<(StatusCode, Json<ShareWithUser>)> {
    let request = request.map(|Json(request)| request).unwrap_or_default();
    let share = state.community_service.share(&user, post_id, request).await?;
    Ok((StatusCode::CREATED, Json(share)))
}
