use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, OrInternal};
use crate::models::{
    AdminFormation, AdminFormationRow, AdminStats, AdminUser, AdminUserRow, CreateUserRequest,
    FormationListRow, FormationSummary, RecentUser, FORMATION_COLUMNS,
};
use crate::services::formation_service::formation_list_select;
use crate::services::UserService;

const ADMIN_USER_SELECT: &str = "SELECT u.id, u.email, u.full_name, u.role, u.client_type, u.created_at,
            (SELECT COUNT(*) FROM formations f WHERE f.creator_id = u.id) AS formations_count,
            (SELECT COUNT(*) FROM enrollments e WHERE e.user_id = u.id) AS enrollments_count
     FROM users u";

/// Back-office queries. Callers are already checked to be ADMIN by the
/// admin middleware.
#[derive(Clone)]
pub struct AdminService {
    db: PgPool,
    users: UserService,
    protected_admin_email: String,
}

impl AdminService {
    pub fn new(db: PgPool, users: UserService, protected_admin_email: impl Into<String>) -> Self {
        Self {
            db,
            users,
            protected_admin_email: protected_admin_email.into(),
        }
    }

    pub async fn stats(&self) -> ApiResult<AdminStats> {
        const LOAD_FAILED: &str = "Erreur lors de la récupération des statistiques";

        let (total_users, total_formations, total_enrollments, published_formations) =
            sqlx::query_as::<_, (i64, i64, i64, i64)>(
                "SELECT
                    (SELECT COUNT(*) FROM users),
                    (SELECT COUNT(*) FROM formations),
                    (SELECT COUNT(*) FROM enrollments),
                    (SELECT COUNT(*) FROM formations WHERE is_published)",
            )
            .fetch_one(&self.db)
            .await
            .or_internal(LOAD_FAILED)?;

        let recent_users = sqlx::query_as::<_, RecentUser>(
            "SELECT id, email, full_name, role, created_at
             FROM users
             ORDER BY created_at DESC
             LIMIT 5",
        )
        .fetch_all(&self.db)
        .await
        .or_internal(LOAD_FAILED)?;

        let recent_formations = sqlx::query_as::<_, FormationListRow>(&format!(
            "{} ORDER BY f.created_at DESC LIMIT 5",
            formation_list_select()
        ))
        .fetch_all(&self.db)
        .await
        .or_internal(LOAD_FAILED)?
        .into_iter()
        .map(FormationSummary::from)
        .collect();

        Ok(AdminStats {
            total_users,
            total_formations,
            total_enrollments,
            published_formations,
            recent_users,
            recent_formations,
        })
    }

    pub async fn list_users(&self) -> ApiResult<Vec<AdminUser>> {
        let rows = sqlx::query_as::<_, AdminUserRow>(&format!(
            "{ADMIN_USER_SELECT} ORDER BY u.created_at DESC"
        ))
        .fetch_all(&self.db)
        .await
        .or_internal("Erreur lors de la récupération des utilisateurs")?;

        Ok(rows.into_iter().map(AdminUser::from).collect())
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> ApiResult<AdminUser> {
        let user_id = self.users.create_from_admin(request).await?;
        tracing::info!(%user_id, "user created from admin console");

        sqlx::query_as::<_, AdminUserRow>(&format!("{ADMIN_USER_SELECT} WHERE u.id = $1"))
            .bind(user_id)
            .fetch_one(&self.db)
            .await
            .map(AdminUser::from)
            .or_internal("Erreur lors de la création de l'utilisateur")
    }

    /// Deletes an account and everything it owns. The bootstrap admin
    /// account cannot be removed.
    pub async fn delete_user(&self, user_id: Uuid) -> ApiResult<()> {
        const DELETE_FAILED: &str = "Erreur lors de la suppression de l'utilisateur";

        let email = sqlx::query_scalar::<_, String>("SELECT email FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .or_internal(DELETE_FAILED)?
            .ok_or_else(|| ApiError::not_found("Utilisateur non trouvé"))?;

        if email.eq_ignore_ascii_case(&self.protected_admin_email) {
            return Err(ApiError::bad_request(
                "Impossible de supprimer le compte administrateur principal",
            ));
        }

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await
            .or_internal(DELETE_FAILED)?;

        tracing::info!(%user_id, "user deleted");
        Ok(())
    }

    pub async fn list_formations(&self) -> ApiResult<Vec<AdminFormation>> {
        let rows = sqlx::query_as::<_, AdminFormationRow>(&format!(
            "SELECT {FORMATION_COLUMNS}, u.full_name AS creator_full_name, u.email AS creator_email,
                    (SELECT COUNT(*) FROM enrollments e WHERE e.formation_id = f.id) AS enrollments_count
             FROM formations f
             JOIN users u ON u.id = f.creator_id
             ORDER BY f.created_at DESC"
        ))
        .fetch_all(&self.db)
        .await
        .or_internal("Erreur lors de la récupération des formations")?;

        Ok(rows.into_iter().map(AdminFormation::from).collect())
    }
}
