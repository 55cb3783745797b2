use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::user::UserSummary;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CoachingNote {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub is_visible: bool,
    pub coach_id: Uuid,
    pub client_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Note joined with the other party: the client for coaches, the coach for
/// learners.
#[derive(Debug, Clone, FromRow)]
pub struct CoachingNoteRow {
    #[sqlx(flatten)]
    pub note: CoachingNote,
    pub party_id: Uuid,
    pub party_full_name: Option<String>,
    pub party_image: Option<String>,
}

impl CoachingNoteRow {
    fn party(&self) -> UserSummary {
        UserSummary {
            id: self.party_id,
            full_name: self.party_full_name.clone(),
            image: self.party_image.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteWithClient {
    #[serde(flatten)]
    pub note: CoachingNote,
    pub client: UserSummary,
}

impl From<CoachingNoteRow> for NoteWithClient {
    fn from(row: CoachingNoteRow) -> Self {
        Self {
            client: row.party(),
            note: row.note,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteWithCoach {
    #[serde(flatten)]
    pub note: CoachingNote,
    pub coach: UserSummary,
}

impl From<CoachingNoteRow> for NoteWithCoach {
    fn from(row: CoachingNoteRow) -> Self {
        Self {
            coach: row.party(),
            note: row.note,
        }
    }
}

/// What `GET /api/coaching` returns depends on the caller's role.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CoachingNoteView {
    Authored(NoteWithClient),
    Received(NoteWithCoach),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachingQuery {
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub client_id: Option<Uuid>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_visible: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_visible: Option<bool>,
}
