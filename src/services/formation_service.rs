use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{Role, UserSession};
use crate::error::{ApiError, ApiResult, OrInternal};
use crate::models::{
    optional_text, require_text, trimmed, CreateFormationRequest, Formation, FormationDetail,
    FormationFile, FormationListRow, FormationSummary, PublishState, UpdateFormationRequest,
    UploadForm, FORMATION_COLUMNS,
};
use crate::services::storage::ObjectStorage;

const NOT_FOUND: &str = "Formation non trouvée";
const ACCESS_DENIED: &str = "Accès non autorisé";

pub(crate) const FORMATION_FILE_COLUMNS: &str = "id, title, filename, file_type, file_size, \
     cloud_storage_path, mime_type, \"order\", formation_id, created_at";

/// `FORMATION_COLUMNS` plus creator name and enrollment count; expects the
/// formation aliased `f` joined to its creator aliased `u`.
pub(crate) fn formation_list_select() -> String {
    format!(
        "SELECT {FORMATION_COLUMNS}, u.full_name AS creator_full_name,
                (SELECT COUNT(*) FROM enrollments e WHERE e.formation_id = f.id) AS enrollments_count
         FROM formations f
         JOIN users u ON u.id = f.creator_id"
    )
}

#[derive(Clone)]
pub struct FormationService {
    db: PgPool,
    storage: Arc<dyn ObjectStorage>,
}

impl FormationService {
    pub fn new(db: PgPool, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { db, storage }
    }

    /// Catalog, newest first.
    pub async fn list(&self, published_only: bool) -> ApiResult<Vec<FormationSummary>> {
        let rows = sqlx::query_as::<_, FormationListRow>(&format!(
            "{} WHERE ($1 = FALSE OR f.is_published) ORDER BY f.created_at DESC",
            formation_list_select()
        ))
        .bind(published_only)
        .fetch_all(&self.db)
        .await
        .or_internal("Erreur interne du serveur")?;

        Ok(rows.into_iter().map(FormationSummary::from).collect())
    }

    pub async fn create(
        &self,
        session: &UserSession,
        request: CreateFormationRequest,
    ) -> ApiResult<Formation> {
        session
            .require_role(Role::FormateurAdmin)
            .map_err(|_| ApiError::forbidden_with(ACCESS_DENIED))?;

        const REQUIRED: &str = "Tous les champs sont requis";
        let title = require_text(request.title.as_deref(), REQUIRED)?;
        let description = require_text(request.description.as_deref(), REQUIRED)?;
        let category = require_text(request.category.as_deref(), REQUIRED)?;

        let formation = sqlx::query_as::<_, Formation>(&format!(
            "INSERT INTO formations AS f (title, description, category, level, thumbnail, creator_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {FORMATION_COLUMNS}"
        ))
        .bind(&title)
        .bind(&description)
        .bind(&category)
        .bind(request.level.unwrap_or_default())
        .bind(trimmed(request.thumbnail.as_deref()))
        .bind(session.user_id)
        .fetch_one(&self.db)
        .await
        .or_internal("Erreur interne du serveur")?;

        tracing::info!(formation_id = %formation.id, creator_id = %session.user_id, "formation created");
        Ok(formation)
    }

    pub async fn get_detail(&self, formation_id: Uuid) -> ApiResult<FormationDetail> {
        let row = sqlx::query_as::<_, FormationListRow>(&format!(
            "{} WHERE f.id = $1",
            formation_list_select()
        ))
        .bind(formation_id)
        .fetch_optional(&self.db)
        .await
        .or_internal("Erreur interne du serveur")?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

        let files = self.list_files(formation_id).await?;
        Ok(FormationDetail::new(row, files))
    }

    /// Partial update by an admin or the creating trainer.
    pub async fn update(
        &self,
        session: &UserSession,
        formation_id: Uuid,
        request: UpdateFormationRequest,
    ) -> ApiResult<FormationDetail> {
        session
            .require_trainer()
            .map_err(|_| ApiError::forbidden_with(ACCESS_DENIED))?;

        let title = optional_text(request.title.as_deref(), "Le titre ne peut pas être vide")?;
        let description = optional_text(
            request.description.as_deref(),
            "La description ne peut pas être vide",
        )?;
        let category =
            optional_text(request.category.as_deref(), "La catégorie ne peut pas être vide")?;

        let creator_id = self.creator_of(formation_id).await?;
        session.require_owner_or_admin_with(
            creator_id,
            "Vous ne pouvez modifier que vos propres formations",
        )?;

        let (set_thumbnail, thumbnail) = match request.thumbnail {
            None => (false, None),
            Some(value) => (true, trimmed(value.as_deref())),
        };

        sqlx::query(
            "UPDATE formations SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                level = COALESCE($5, level),
                thumbnail = CASE WHEN $6 THEN $7 ELSE thumbnail END,
                is_published = COALESCE($8, is_published),
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(formation_id)
        .bind(title)
        .bind(description)
        .bind(category)
        .bind(request.level)
        .bind(set_thumbnail)
        .bind(thumbnail)
        .bind(request.is_published)
        .execute(&self.db)
        .await
        .or_internal("Erreur interne du serveur")?;

        self.get_detail(formation_id).await
    }

    /// Admins delete any formation, trainers only their own. Modules,
    /// exercises, files and enrollments go with it.
    pub async fn delete(&self, session: &UserSession, formation_id: Uuid) -> ApiResult<()> {
        session
            .require_trainer()
            .map_err(|_| ApiError::forbidden_with(ACCESS_DENIED))?;

        let creator_id = self.creator_of(formation_id).await?;
        session.require_owner_or_admin_with(
            creator_id,
            "Vous ne pouvez supprimer que vos propres formations",
        )?;

        const DELETE_FAILED: &str = "Erreur lors de la suppression de la formation";
        let mut tx = self.db.begin().await.or_internal(DELETE_FAILED)?;

        let paths = sqlx::query_scalar::<_, String>(
            "DELETE FROM formation_files WHERE formation_id = $1 RETURNING cloud_storage_path",
        )
        .bind(formation_id)
        .fetch_all(&mut *tx)
        .await
        .or_internal(DELETE_FAILED)?;

        let deleted = sqlx::query("DELETE FROM formations WHERE id = $1")
            .bind(formation_id)
            .execute(&mut *tx)
            .await
            .or_internal(DELETE_FAILED)?;

        if deleted.rows_affected() == 0 {
            return Err(ApiError::not_found(NOT_FOUND));
        }

        tx.commit().await.or_internal(DELETE_FAILED)?;

        // Objects go only once the rows are gone for good.
        for path in paths {
            if let Err(err) = self.storage.delete(&path).await {
                tracing::warn!(error = ?err, %path, "stored file left behind");
            }
        }

        tracing::info!(%formation_id, deleted_by = %session.user_id, "formation deleted");
        Ok(())
    }

    /// Sets the publication flag to the given value. Repeating the call with
    /// the same value leaves the row unchanged.
    pub async fn set_published(
        &self,
        formation_id: Uuid,
        is_published: bool,
    ) -> ApiResult<PublishState> {
        sqlx::query_as::<_, PublishState>(
            "UPDATE formations SET is_published = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING id, title, is_published",
        )
        .bind(formation_id)
        .bind(is_published)
        .fetch_optional(&self.db)
        .await
        .or_internal("Erreur lors de la modification du statut")?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
    }

    pub async fn list_files(&self, formation_id: Uuid) -> ApiResult<Vec<FormationFile>> {
        sqlx::query_as::<_, FormationFile>(&format!(
            "SELECT {FORMATION_FILE_COLUMNS} FROM formation_files
             WHERE formation_id = $1
             ORDER BY \"order\" ASC, created_at ASC"
        ))
        .bind(formation_id)
        .fetch_all(&self.db)
        .await
        .or_internal("Erreur interne du serveur")
    }

    /// Stores the uploaded file and records it under the formation. Only the
    /// trainer who created the formation may upload to it.
    pub async fn upload_file(
        &self,
        session: &UserSession,
        formation_id: Uuid,
        form: UploadForm,
    ) -> ApiResult<FormationFile> {
        session.require_role(Role::FormateurAdmin)?;
        let upload = form.into_new_file()?;

        const UPLOAD_FAILED: &str = "Erreur lors de l'upload du fichier";

        let owned = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM formations WHERE id = $1 AND creator_id = $2",
        )
        .bind(formation_id)
        .bind(session.user_id)
        .fetch_optional(&self.db)
        .await
        .or_internal(UPLOAD_FAILED)?;

        if owned.is_none() {
            return Err(ApiError::not_found("Formation non trouvée ou non autorisée"));
        }

        let file_size = upload.data.len() as i64;
        let file_type = upload.file_type();
        let path = self
            .storage
            .upload(upload.data.clone(), &upload.filename, &upload.content_type)
            .await
            .or_internal(UPLOAD_FAILED)?;

        let inserted = sqlx::query_as::<_, FormationFile>(&format!(
            "INSERT INTO formation_files
                (title, filename, file_type, file_size, cloud_storage_path, mime_type, \"order\", formation_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {FORMATION_FILE_COLUMNS}"
        ))
        .bind(&upload.title)
        .bind(&upload.filename)
        .bind(file_type)
        .bind(file_size)
        .bind(&path)
        .bind(&upload.content_type)
        .bind(upload.order)
        .bind(formation_id)
        .fetch_one(&self.db)
        .await;

        match inserted {
            Ok(file) => {
                tracing::info!(file_id = %file.id, %formation_id, size = file_size, "file uploaded");
                Ok(file)
            }
            Err(err) => {
                if let Err(cleanup) = self.storage.delete(&path).await {
                    tracing::warn!(error = ?cleanup, %path, "orphaned upload left in storage");
                }
                Err(ApiError::from_insert(err, NOT_FOUND, UPLOAD_FAILED))
            }
        }
    }

    /// Time-limited download link for a stored file.
    pub async fn download_url(&self, path: Option<&str>) -> ApiResult<String> {
        let path = trimmed(path).ok_or_else(|| ApiError::bad_request("Chemin du fichier requis"))?;
        self.storage
            .download_url(&path)
            .await
            .or_internal("Erreur lors de la génération de l'URL de téléchargement")
    }

    pub async fn creator_of(&self, formation_id: Uuid) -> ApiResult<Uuid> {
        sqlx::query_scalar::<_, Uuid>("SELECT creator_id FROM formations WHERE id = $1")
            .bind(formation_id)
            .fetch_optional(&self.db)
            .await
            .or_internal("Erreur interne du serveur")?
            .ok_or_else(|| ApiError::not_found(NOT_FOUND))
    }
}
