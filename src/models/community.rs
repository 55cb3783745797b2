use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::user::{UserName, UserSummary};
use crate::auth::{ClientType, Role};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "reaction_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReactionType {
    Like,
    Love,
    Support,
    Celebrate,
}

impl ReactionType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "LIKE" => Some(ReactionType::Like),
            "LOVE" => Some(ReactionType::Love),
            "SUPPORT" => Some(ReactionType::Support),
            "CELEBRATE" => Some(ReactionType::Celebrate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub content: String,
    pub is_pinned: bool,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostAuthor {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub image: Option<String>,
    pub client_type: Option<ClientType>,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PostCounts {
    pub comments: i64,
    pub reactions: i64,
    pub shares: i64,
}

/// Post joined with its author and engagement counts.
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    #[sqlx(flatten)]
    pub post: Post,
    pub author_full_name: Option<String>,
    pub author_image: Option<String>,
    pub author_client_type: Option<ClientType>,
    pub author_role: Role,
    pub comments_count: i64,
    pub reactions_count: i64,
    pub shares_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    #[serde(flatten)]
    pub post: Post,
    pub author: PostAuthor,
    #[serde(rename = "_count")]
    pub count: PostCounts,
}

impl From<PostRow> for PostSummary {
    fn from(row: PostRow) -> Self {
        Self {
            author: PostAuthor {
                id: row.post.author_id,
                full_name: row.author_full_name,
                image: row.author_image,
                client_type: row.author_client_type,
                role: row.author_role,
            },
            post: row.post,
            count: PostCounts {
                comments: row.comments_count,
                reactions: row.reactions_count,
                shares: row.shares_count,
            },
        }
    }
}

/// Feed entry with every comment, reaction and share attached.
#[derive(Debug, Clone, Serialize)]
pub struct PostWithRelations {
    #[serde(flatten)]
    pub post: Post,
    pub author: PostAuthor,
    pub comments: Vec<CommentWithAuthor>,
    pub reactions: Vec<ReactionWithUser>,
    pub shares: Vec<ShareWithUser>,
    #[serde(rename = "_count")]
    pub count: PostCounts,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    #[sqlx(flatten)]
    pub comment: Comment,
    pub author_full_name: Option<String>,
    pub author_image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: UserSummary,
}

impl From<CommentRow> for CommentWithAuthor {
    fn from(row: CommentRow) -> Self {
        Self {
            author: UserSummary {
                id: row.comment.author_id,
                full_name: row.author_full_name,
                image: row.author_image,
            },
            comment: row.comment,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub id: Uuid,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub reaction_type: ReactionType,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ReactionRow {
    #[sqlx(flatten)]
    pub reaction: Reaction,
    pub user_full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReactionWithUser {
    #[serde(flatten)]
    pub reaction: Reaction,
    pub user: UserName,
}

impl From<ReactionRow> for ReactionWithUser {
    fn from(row: ReactionRow) -> Self {
        Self {
            user: UserName {
                id: row.reaction.user_id,
                full_name: row.user_full_name,
            },
            reaction: row.reaction,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    pub id: Uuid,
    pub comment: Option<String>,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ShareRow {
    #[sqlx(flatten)]
    pub share: Share,
    pub user_full_name: Option<String>,
    pub user_image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareWithUser {
    #[serde(flatten)]
    pub share: Share,
    pub user: UserSummary,
}

impl From<ShareRow> for ShareWithUser {
    fn from(row: ShareRow) -> Self {
        Self {
            user: UserSummary {
                id: row.share.user_id,
                full_name: row.user_full_name,
                image: row.user_image,
            },
            share: row.share,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinPostRequest {
    pub is_pinned: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: Option<String>,
}

/// Kept as a string so an unknown value yields the dedicated 400 message.
#[derive(Debug, Deserialize)]
pub struct ReactRequest {
    #[serde(rename = "type")]
    pub reaction_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SharePostRequest {
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_type_parse() {
        assert_eq!(ReactionType::parse("LIKE"), Some(ReactionType::Like));
        assert_eq!(ReactionType::parse("CELEBRATE"), Some(ReactionType::Celebrate));
        assert_eq!(ReactionType::parse("like"), None);
        assert_eq!(ReactionType::parse("ANGRY"), None);
    }

    #[test]
    fn test_post_summary_shape() {
        let author_id = Uuid::new_v4();
        let summary = PostSummary::from(PostRow {
            post: Post {
                id: Uuid::new_v4(),
                content: "Bienvenue dans la communauté".to_string(),
                is_pinned: true,
                author_id,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            author_full_name: Some("John Doe".to_string()),
            author_image: None,
            author_client_type: None,
            author_role: Role::FormateurAdmin,
            comments_count: 1,
            reactions_count: 2,
            shares_count: 0,
        });

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["isPinned"], true);
        assert_eq!(json["author"]["id"], author_id.to_string());
        assert_eq!(json["author"]["role"], "FORMATEUR_ADMIN");
        assert_eq!(json["_count"]["reactions"], 2);
    }

    #[test]
    fn test_react_request_keeps_raw_type() {
        let request: ReactRequest = serde_json::from_str(r#"{"type": "ANGRY"}"#).unwrap();
        assert_eq!(request.reaction_type.as_deref(), Some("ANGRY"));
    }
}
