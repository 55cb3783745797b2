use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::auth::UserSession;
use crate::error::{ApiError, ApiResult, OrInternal};
use crate::models::{
    require_text, trimmed, CommentRow, CommentWithAuthor, CreateCommentRequest,
    CreatePostRequest, PostRow, PostSummary, PostWithRelations, ReactRequest, Reaction,
    ReactionRow, ReactionType, ReactionWithUser, SharePostRequest, ShareRow, ShareWithUser,
};

const POST_NOT_FOUND: &str = "Post non trouvé";
const CONTENT_REQUIRED: &str = "Le contenu est requis";

const POST_SELECT: &str = "SELECT p.id, p.content, p.is_pinned, p.author_id, p.created_at, p.updated_at,
            u.full_name AS author_full_name, u.image AS author_image,
            u.client_type AS author_client_type, u.role AS author_role,
            (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count,
            (SELECT COUNT(*) FROM reactions r WHERE r.post_id = p.id) AS reactions_count,
            (SELECT COUNT(*) FROM shares s WHERE s.post_id = p.id) AS shares_count
     FROM posts p
     JOIN users u ON u.id = p.author_id";

#[derive(Clone)]
pub struct CommunityService {
    db: PgPool,
}

impl CommunityService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Whole feed, pinned posts first then newest.
    pub async fn feed(&self) -> ApiResult<Vec<PostWithRelations>> {
        const LOAD_FAILED: &str = "Erreur lors de la récupération des posts";

        let posts = sqlx::query_as::<_, PostRow>(&format!(
            "{POST_SELECT} ORDER BY p.is_pinned DESC, p.created_at DESC"
        ))
        .fetch_all(&self.db)
        .await
        .or_internal(LOAD_FAILED)?;

        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = posts.iter().map(|row| row.post.id).collect();

        let comments = sqlx::query_as::<_, CommentRow>(
            "SELECT c.id, c.content, c.post_id, c.author_id, c.created_at, c.updated_at,
                    u.full_name AS author_full_name, u.image AS author_image
             FROM comments c
             JOIN users u ON u.id = c.author_id
             WHERE c.post_id = ANY($1)
             ORDER BY c.created_at ASC",
        )
        .bind(&post_ids)
        .fetch_all(&self.db)
        .await
        .or_internal(LOAD_FAILED)?;

        let reactions = sqlx::query_as::<_, ReactionRow>(
            "SELECT r.id, r.type, r.post_id, r.user_id, r.created_at,
                    u.full_name AS user_full_name
             FROM reactions r
             JOIN users u ON u.id = r.user_id
             WHERE r.post_id = ANY($1)
             ORDER BY r.created_at ASC",
        )
        .bind(&post_ids)
        .fetch_all(&self.db)
        .await
        .or_internal(LOAD_FAILED)?;

        let shares = sqlx::query_as::<_, ShareRow>(
            "SELECT s.id, s.comment, s.post_id, s.user_id, s.created_at,
                    u.full_name AS user_full_name, u.image AS user_image
             FROM shares s
             JOIN users u ON u.id = s.user_id
             WHERE s.post_id = ANY($1)
             ORDER BY s.created_at ASC",
        )
        .bind(&post_ids)
        .fetch_all(&self.db)
        .await
        .or_internal(LOAD_FAILED)?;

        Ok(assemble_feed(posts, comments, reactions, shares))
    }

    pub async fn create_post(
        &self,
        session: &UserSession,
        request: CreatePostRequest,
    ) -> ApiResult<PostSummary> {
        let content = require_text(request.content.as_deref(), CONTENT_REQUIRED)?;

        let post_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO posts (content, author_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(&content)
        .bind(session.user_id)
        .fetch_one(&self.db)
        .await
        .or_internal("Erreur lors de la création du post")?;

        tracing::info!(%post_id, author_id = %session.user_id, "post created");
        self.post_summary(post_id).await
    }

    /// Authors remove their own posts, admins any post.
    pub async fn delete_post(&self, session: &UserSession, post_id: Uuid) -> ApiResult<()> {
        let author_id = sqlx::query_scalar::<_, Uuid>("SELECT author_id FROM posts WHERE id = $1")
            .bind(post_id)
            .fetch_optional(&self.db)
            .await
            .or_internal("Erreur lors de la suppression du post")?
            .ok_or_else(|| ApiError::not_found(POST_NOT_FOUND))?;
        session.require_owner_or_admin(author_id)?;

        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.db)
            .await
            .or_internal("Erreur lors de la suppression du post")?;

        tracing::info!(%post_id, deleted_by = %session.user_id, "post deleted");
        Ok(())
    }

    pub async fn set_pinned(
        &self,
        session: &UserSession,
        post_id: Uuid,
        is_pinned: Option<bool>,
    ) -> ApiResult<PostSummary> {
        session.require_trainer()?;
        let is_pinned =
            is_pinned.ok_or_else(|| ApiError::bad_request("Statut d'épinglage requis"))?;

        let updated = sqlx::query(
            "UPDATE posts SET is_pinned = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(post_id)
        .bind(is_pinned)
        .execute(&self.db)
        .await
        .or_internal("Erreur lors de la mise à jour du post")?;

        if updated.rows_affected() == 0 {
            return Err(ApiError::not_found(POST_NOT_FOUND));
        }
        self.post_summary(post_id).await
    }

    pub async fn add_comment(
        &self,
        session: &UserSession,
        post_id: Uuid,
        request: CreateCommentRequest,
    ) -> ApiResult<CommentWithAuthor> {
        let content = require_text(request.content.as_deref(), CONTENT_REQUIRED)?;

        let row = sqlx::query_as::<_, CommentRow>(
            "WITH c AS (
                INSERT INTO comments (content, post_id, author_id)
                VALUES ($1, $2, $3)
                RETURNING *
             )
             SELECT c.id, c.content, c.post_id, c.author_id, c.created_at, c.updated_at,
                    u.full_name AS author_full_name, u.image AS author_image
             FROM c JOIN users u ON u.id = c.author_id",
        )
        .bind(&content)
        .bind(post_id)
        .bind(session.user_id)
        .fetch_one(&self.db)
        .await
        .map_err(|err| {
            ApiError::from_insert(err, POST_NOT_FOUND, "Erreur lors de la création du commentaire")
        })?;

        Ok(CommentWithAuthor::from(row))
    }

    pub async fn delete_comment(&self, session: &UserSession, comment_id: Uuid) -> ApiResult<()> {
        let author_id =
            sqlx::query_scalar::<_, Uuid>("SELECT author_id FROM comments WHERE id = $1")
                .bind(comment_id)
                .fetch_optional(&self.db)
                .await
                .or_internal("Erreur lors de la suppression du commentaire")?
                .ok_or_else(|| ApiError::not_found("Commentaire non trouvé"))?;
        session.require_owner_or_admin(author_id)?;

        sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(comment_id)
            .execute(&self.db)
            .await
            .or_internal("Erreur lors de la suppression du commentaire")?;
        Ok(())
    }

    /// One reaction per (post, user); reacting again changes its type.
    pub async fn react(
        &self,
        session: &UserSession,
        post_id: Uuid,
        request: ReactRequest,
    ) -> ApiResult<Reaction> {
        let reaction_type = request
            .reaction_type
            .as_deref()
            .and_then(ReactionType::parse)
            .ok_or_else(|| ApiError::bad_request("Type de réaction invalide"))?;

        sqlx::query_as::<_, Reaction>(
            "INSERT INTO reactions (type, post_id, user_id)
             VALUES ($1, $2, $3)
             ON CONFLICT (post_id, user_id) DO UPDATE SET type = EXCLUDED.type
             RETURNING id, type, post_id, user_id, created_at",
        )
        .bind(reaction_type)
        .bind(post_id)
        .bind(session.user_id)
        .fetch_one(&self.db)
        .await
        .map_err(|err| {
            ApiError::from_insert(err, POST_NOT_FOUND, "Erreur lors de la création de la réaction")
        })
    }

    pub async fn remove_reaction(&self, session: &UserSession, post_id: Uuid) -> ApiResult<()> {
        let deleted = sqlx::query("DELETE FROM reactions WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(session.user_id)
            .execute(&self.db)
            .await
            .or_internal("Erreur lors de la suppression de la réaction")?;

        if deleted.rows_affected() == 0 {
            return Err(ApiError::not_found("Réaction non trouvée"));
        }
        Ok(())
    }

    pub async fn share(
        &self,
        session: &UserSession,
        post_id: Uuid,
        request: SharePostRequest,
    ) -> ApiResult<ShareWithUser> {
        let row = sqlx::query_as::<_, ShareRow>(
            "WITH s AS (
                INSERT INTO shares (comment, post_id, user_id)
                VALUES ($1, $2, $3)
                RETURNING *
             )
             SELECT s.id, s.comment, s.post_id, s.user_id, s.created_at,
                    u.full_name AS user_full_name, u.image AS user_image
             FROM s JOIN users u ON u.id = s.user_id",
        )
        .bind(trimmed(request.comment.as_deref()))
        .bind(post_id)
        .bind(session.user_id)
        .fetch_one(&self.db)
        .await
        .map_err(|err| ApiError::from_insert(err, POST_NOT_FOUND, "Erreur lors du partage du post"))?;

        Ok(ShareWithUser::from(row))
    }

    async fn post_summary(&self, post_id: Uuid) -> ApiResult<PostSummary> {
        sqlx::query_as::<_, PostRow>(&format!("{POST_SELECT} WHERE p.id = $1"))
            .bind(post_id)
            .fetch_optional(&self.db)
            .await
            .or_internal("Erreur interne du serveur")?
            .map(PostSummary::from)
            .ok_or_else(|| ApiError::not_found(POST_NOT_FOUND))
    }
}

/// Attaches comments, reactions and shares to their posts, keeping each
/// list in query order.
pub fn assemble_feed(
    posts: Vec<PostRow>,
    comments: Vec<CommentRow>,
    reactions: Vec<ReactionRow>,
    shares: Vec<ShareRow>,
) -> Vec<PostWithRelations> {
    let mut comments_by_post: HashMap<Uuid, Vec<CommentWithAuthor>> = HashMap::new();
    for row in comments {
        comments_by_post
            .entry(row.comment.post_id)
            .or_default()
            .push(row.into());
    }

    let mut reactions_by_post: HashMap<Uuid, Vec<ReactionWithUser>> = HashMap::new();
    for row in reactions {
        reactions_by_post
            .entry(row.reaction.post_id)
            .or_default()
            .push(row.into());
    }

    let mut shares_by_post: HashMap<Uuid, Vec<ShareWithUser>> = HashMap::new();
    for row in shares {
        shares_by_post
            .entry(row.share.post_id)
            .or_default()
            .push(row.into());
    }

    posts
        .into_iter()
        .map(|row| {
            let post_id = row.post.id;
            let summary = PostSummary::from(row);
            PostWithRelations {
                post: summary.post,
                author: summary.author,
                comments: comments_by_post.remove(&post_id).unwrap_or_default(),
                reactions: reactions_by_post.remove(&post_id).unwrap_or_default(),
                shares: shares_by_post.remove(&post_id).unwrap_or_default(),
                count: summary.count,
            }
        })
        .collect()
}
