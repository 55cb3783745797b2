use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::Role;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub image: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub is_read: bool,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MessageRow {
    #[sqlx(flatten)]
    pub message: Message,
    pub sender_full_name: Option<String>,
    pub sender_image: Option<String>,
    pub sender_role: Role,
    pub receiver_full_name: Option<String>,
    pub receiver_image: Option<String>,
    pub receiver_role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageWithParticipants {
    #[serde(flatten)]
    pub message: Message,
    pub sender: Participant,
    pub receiver: Participant,
}

impl From<MessageRow> for MessageWithParticipants {
    fn from(row: MessageRow) -> Self {
        Self {
            sender: Participant {
                id: row.message.sender_id,
                full_name: row.sender_full_name,
                image: row.sender_image,
                role: row.sender_role,
            },
            receiver: Participant {
                id: row.message.receiver_id,
                full_name: row.receiver_full_name,
                image: row.receiver_image,
                role: row.receiver_role,
            },
            message: row.message,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub other_user: Participant,
    pub last_message: MessageWithParticipants,
    pub unread_count: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub receiver_id: Option<Uuid>,
    pub content: Option<String>,
}
