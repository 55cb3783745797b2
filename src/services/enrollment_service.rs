use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::UserSession;
use crate::error::{ApiError, ApiResult, OrInternal};
use crate::models::{
    validate_progress, EnrollResponse, Enrollment, EnrollmentRow, EnrollmentWithFormation,
    FORMATION_COLUMNS,
};

#[derive(Clone)]
pub struct EnrollmentService {
    db: PgPool,
}

impl EnrollmentService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Enrolls the calling learner. The unique (user, formation) index
    /// decides between concurrent duplicates.
    pub async fn enroll(
        &self,
        session: &UserSession,
        formation_id: Uuid,
    ) -> ApiResult<EnrollResponse> {
        session.require_learner().map_err(|_| {
            ApiError::forbidden_with("Accès non autorisé - seuls les apprenants peuvent s'inscrire")
        })?;

        let published = sqlx::query_scalar::<_, bool>(
            "SELECT is_published FROM formations WHERE id = $1",
        )
        .bind(formation_id)
        .fetch_optional(&self.db)
        .await
        .or_internal("Erreur lors de l'inscription")?;

        if published != Some(true) {
            return Err(ApiError::not_found("Formation non trouvée ou non disponible"));
        }

        let enrollment_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO enrollments (user_id, formation_id)
             VALUES ($1, $2)
             ON CONFLICT (user_id, formation_id) DO NOTHING
             RETURNING id",
        )
        .bind(session.user_id)
        .bind(formation_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|err| {
            ApiError::from_insert(
                err,
                "Formation non trouvée ou non disponible",
                "Erreur lors de l'inscription",
            )
        })?
        .ok_or_else(|| ApiError::bad_request("Vous êtes déjà inscrit à cette formation"))?;

        tracing::info!(%enrollment_id, %formation_id, user_id = %session.user_id, "learner enrolled");

        Ok(EnrollResponse {
            message: "Inscription réussie".to_string(),
            enrollment_id,
        })
    }

    pub async fn update_progress(
        &self,
        session: &UserSession,
        formation_id: Uuid,
        progress: Option<i32>,
    ) -> ApiResult<Enrollment> {
        session.require_learner()?;
        let progress = progress.ok_or_else(|| ApiError::bad_request("Progression requise"))?;
        let progress = validate_progress(progress)?;

        sqlx::query_as::<_, Enrollment>(
            "UPDATE enrollments SET progress = $3, updated_at = NOW()
             WHERE user_id = $1 AND formation_id = $2
             RETURNING id, user_id, formation_id, progress, created_at, updated_at",
        )
        .bind(session.user_id)
        .bind(formation_id)
        .bind(progress)
        .fetch_optional(&self.db)
        .await
        .or_internal("Erreur lors de la mise à jour de la progression")?
        .ok_or_else(|| ApiError::not_found("Inscription non trouvée"))
    }

    /// A learner's enrollments with their formation, latest first.
    pub async fn list_for_user(&self, user_id: Uuid) -> ApiResult<Vec<EnrollmentWithFormation>> {
        let rows = sqlx::query_as::<_, EnrollmentRow>(&format!(
            "SELECT e.id AS enrollment_id, e.user_id, e.progress,
                    e.created_at AS enrolled_at, e.updated_at AS enrollment_updated_at,
                    {FORMATION_COLUMNS}, u.full_name AS creator_full_name,
                    (SELECT COUNT(*) FROM enrollments c WHERE c.formation_id = f.id) AS enrollments_count
             FROM enrollments e
             JOIN formations f ON f.id = e.formation_id
             JOIN users u ON u.id = f.creator_id
             WHERE e.user_id = $1
             ORDER BY e.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .or_internal("Erreur interne du serveur")?;

        Ok(rows.into_iter().map(EnrollmentWithFormation::from).collect())
    }
}
