use sqlx::PgPool;

use crate::auth::UserSession;
use crate::error::{ApiResult, OrInternal};
use crate::models::{
    FormationListRow, FormationSummary, LearnerDashboard, LearnerStats, TrainerDashboard,
    TrainerFormation, TrainerFormationRow, TrainerStats, FORMATION_COLUMNS,
};
use crate::services::formation_service::formation_list_select;
use crate::services::{CoachingService, EnrollmentService};

#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
    enrollments: EnrollmentService,
    coaching: CoachingService,
}

impl DashboardService {
    pub fn new(db: PgPool, enrollments: EnrollmentService, coaching: CoachingService) -> Self {
        Self {
            db,
            enrollments,
            coaching,
        }
    }

    pub async fn learner(&self, session: &UserSession) -> ApiResult<LearnerDashboard> {
        session.require_learner()?;

        let enrollments = self.enrollments.list_for_user(session.user_id).await?;
        let stats = LearnerStats::from_progress(enrollments.iter().map(|e| e.progress));

        let available_formations = sqlx::query_as::<_, FormationListRow>(&format!(
            "{} WHERE f.is_published
                AND NOT EXISTS (
                    SELECT 1 FROM enrollments e WHERE e.formation_id = f.id AND e.user_id = $1
                )
             ORDER BY f.created_at DESC
             LIMIT 6",
            formation_list_select()
        ))
        .bind(session.user_id)
        .fetch_all(&self.db)
        .await
        .or_internal("Erreur lors du chargement du tableau de bord")?
        .into_iter()
        .map(FormationSummary::from)
        .collect();

        let coaching_notes = self
            .coaching
            .visible_notes_for(session.user_id, Some(3))
            .await?;

        Ok(LearnerDashboard {
            enrollments,
            stats,
            available_formations,
            coaching_notes,
        })
    }

    pub async fn trainer(&self, session: &UserSession) -> ApiResult<TrainerDashboard> {
        session.require_trainer()?;

        let formations: Vec<TrainerFormation> = sqlx::query_as::<_, TrainerFormationRow>(&format!(
            "SELECT {FORMATION_COLUMNS}, u.full_name AS creator_full_name,
                    (SELECT COUNT(*) FROM enrollments e WHERE e.formation_id = f.id) AS enrollments_count,
                    (SELECT COUNT(*) FROM formation_files ff WHERE ff.formation_id = f.id) AS files_count,
                    (SELECT COUNT(*) FROM modules m WHERE m.formation_id = f.id) AS modules_count
             FROM formations f
             JOIN users u ON u.id = f.creator_id
             WHERE f.creator_id = $1
             ORDER BY f.created_at DESC"
        ))
        .bind(session.user_id)
        .fetch_all(&self.db)
        .await
        .or_internal("Erreur lors du chargement du tableau de bord")?
        .into_iter()
        .map(TrainerFormation::from)
        .collect();

        let stats = TrainerStats::from_formations(&formations);
        Ok(TrainerDashboard { formations, stats })
    }
}
