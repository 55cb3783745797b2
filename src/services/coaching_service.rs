use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::UserSession;
use crate::error::{ApiError, ApiResult, OrInternal};
use crate::models::{
    optional_text, require_text, CoachingNoteRow, CoachingNoteView,
    CreateNoteRequest, LearnerRow, LearnerWithCounts, NoteWithCoach, NoteWithClient,
    UpdateNoteRequest,
};

const NOTE_COLUMNS: &str = "n.id, n.title, n.content, n.is_visible, n.coach_id, n.client_id, \
     n.created_at, n.updated_at";
const NOTE_NOT_FOUND: &str = "Note non trouvée";

#[derive(Clone)]
pub struct CoachingService {
    db: PgPool,
}

impl CoachingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Trainers see the notes they wrote, learners the visible notes
    /// addressed to them.
    pub async fn list(
        &self,
        session: &UserSession,
        client_id: Option<Uuid>,
    ) -> ApiResult<Vec<CoachingNoteView>> {
        const LOAD_FAILED: &str = "Erreur lors de la récupération des notes";

        if session.is_trainer() {
            let rows = sqlx::query_as::<_, CoachingNoteRow>(&format!(
                "SELECT {NOTE_COLUMNS}, u.id AS party_id, u.full_name AS party_full_name,
                        u.image AS party_image
                 FROM coaching_notes n
                 JOIN users u ON u.id = n.client_id
                 WHERE n.coach_id = $1 AND ($2::uuid IS NULL OR n.client_id = $2)
                 ORDER BY n.created_at DESC"
            ))
            .bind(session.user_id)
            .bind(client_id)
            .fetch_all(&self.db)
            .await
            .or_internal(LOAD_FAILED)?;

            return Ok(rows
                .into_iter()
                .map(|row| CoachingNoteView::Authored(NoteWithClient::from(row)))
                .collect());
        }

        let notes = self.visible_notes_for(session.user_id, None).await?;
        Ok(notes.into_iter().map(CoachingNoteView::Received).collect())
    }

    /// Visible notes addressed to a learner, newest first.
    pub async fn visible_notes_for(
        &self,
        client_id: Uuid,
        limit: Option<i64>,
    ) -> ApiResult<Vec<NoteWithCoach>> {
        let rows = sqlx::query_as::<_, CoachingNoteRow>(&format!(
            "SELECT {NOTE_COLUMNS}, u.id AS party_id, u.full_name AS party_full_name,
                    u.image AS party_image
             FROM coaching_notes n
             JOIN users u ON u.id = n.coach_id
             WHERE n.client_id = $1 AND n.is_visible
             ORDER BY n.created_at DESC
             LIMIT $2"
        ))
        .bind(client_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .or_internal("Erreur lors de la récupération des notes")?;

        Ok(rows.into_iter().map(NoteWithCoach::from).collect())
    }

    pub async fn create(
        &self,
        session: &UserSession,
        request: CreateNoteRequest,
    ) -> ApiResult<NoteWithClient> {
        session.require_trainer()?;

        const MISSING: &str = "Données manquantes";
        let client_id = request
            .client_id
            .ok_or_else(|| ApiError::bad_request(MISSING))?;
        let title = require_text(request.title.as_deref(), MISSING)?;
        let content = require_text(request.content.as_deref(), MISSING)?;

        let row = sqlx::query_as::<_, CoachingNoteRow>(&format!(
            "WITH n AS (
                INSERT INTO coaching_notes (title, content, is_visible, coach_id, client_id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
             )
             SELECT {NOTE_COLUMNS}, u.id AS party_id, u.full_name AS party_full_name,
                    u.image AS party_image
             FROM n JOIN users u ON u.id = n.client_id"
        ))
        .bind(&title)
        .bind(&content)
        .bind(request.is_visible.unwrap_or(true))
        .bind(session.user_id)
        .bind(client_id)
        .fetch_one(&self.db)
        .await
        .map_err(|err| {
            ApiError::from_insert(err, "Apprenant non trouvé", "Erreur lors de la création de la note")
        })?;

        tracing::info!(note_id = %row.note.id, coach_id = %session.user_id, %client_id, "coaching note created");
        Ok(NoteWithClient::from(row))
    }

    /// Only the note's author may edit it.
    pub async fn update(
        &self,
        session: &UserSession,
        note_id: Uuid,
        request: UpdateNoteRequest,
    ) -> ApiResult<NoteWithClient> {
        session.require_trainer()?;
        let coach_id = self.coach_of(note_id).await?;
        session.require_owner(coach_id)?;

        let title = optional_text(request.title.as_deref(), "Le titre ne peut pas être vide")?;
        let content =
            optional_text(request.content.as_deref(), "Le contenu ne peut pas être vide")?;

        let row = sqlx::query_as::<_, CoachingNoteRow>(&format!(
            "WITH n AS (
                UPDATE coaching_notes SET
                    title = COALESCE($2, title),
                    content = COALESCE($3, content),
                    is_visible = COALESCE($4, is_visible),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
             )
             SELECT {NOTE_COLUMNS}, u.id AS party_id, u.full_name AS party_full_name,
                    u.image AS party_image
             FROM n JOIN users u ON u.id = n.client_id"
        ))
        .bind(note_id)
        .bind(title)
        .bind(content)
        .bind(request.is_visible)
        .fetch_optional(&self.db)
        .await
        .or_internal("Erreur lors de la mise à jour de la note")?
        .ok_or_else(|| ApiError::not_found(NOTE_NOT_FOUND))?;

        Ok(NoteWithClient::from(row))
    }

    pub async fn delete(&self, session: &UserSession, note_id: Uuid) -> ApiResult<()> {
        session.require_trainer()?;
        let coach_id = self.coach_of(note_id).await?;
        session.require_owner(coach_id)?;

        sqlx::query("DELETE FROM coaching_notes WHERE id = $1")
            .bind(note_id)
            .execute(&self.db)
            .await
            .or_internal("Erreur lors de la suppression de la note")?;
        Ok(())
    }

    /// Learners a trainer can write notes for.
    pub async fn list_learners(&self, session: &UserSession) -> ApiResult<Vec<LearnerWithCounts>> {
        session.require_trainer()?;

        let rows = sqlx::query_as::<_, LearnerRow>(
            "SELECT u.id, u.full_name, u.email, u.image, u.client_type, u.bio,
                    (SELECT COUNT(*) FROM coaching_notes n WHERE n.client_id = u.id)
                        AS coaching_received_count,
                    (SELECT COUNT(*) FROM enrollments e WHERE e.user_id = u.id)
                        AS enrollments_count
             FROM users u
             WHERE u.role = 'APPRENANT'
             ORDER BY u.full_name ASC NULLS LAST",
        )
        .fetch_all(&self.db)
        .await
        .or_internal("Erreur lors de la récupération des apprenants")?;

        Ok(rows.into_iter().map(LearnerWithCounts::from).collect())
    }

    async fn coach_of(&self, note_id: Uuid) -> ApiResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>("SELECT coach_id FROM coaching_notes WHERE id = $1")
            .bind(note_id)
            .fetch_optional(&self.db)
            .await
            .or_internal("Erreur interne du serveur")?
            .ok_or_else(|| ApiError::not_found(NOTE_NOT_FOUND))
    }
}
