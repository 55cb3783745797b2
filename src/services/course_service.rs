use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::auth::UserSession;
use crate::error::{ApiError, ApiResult, OrInternal};
use crate::models::{
    optional_text, require_text, trimmed, CreateExerciseRequest, CreateModuleRequest, Exercise,
    ExerciseRow, ExerciseSubmission, ExerciseWithCount, ExerciseWithSubmissions, Module,
    ModuleOwnership, ModuleWithExercises, ReviewSubmissionRequest, SubmissionCount,
    SubmitExerciseRequest, UpdateModuleRequest,
};

const MODULE_COLUMNS: &str =
    "id, title, description, \"order\", formation_id, created_at, updated_at";
const EXERCISE_COLUMNS: &str =
    "id, title, description, type, required, \"order\", module_id, created_at, updated_at";
const SUBMISSION_COLUMNS: &str =
    "id, content, is_approved, feedback, exercise_id, user_id, created_at, updated_at";

const MODULE_NOT_FOUND: &str = "Module non trouvé";
const EXERCISE_NOT_FOUND: &str = "Exercice non trouvé";

/// Modules, exercises and submissions of a formation.
#[derive(Clone)]
pub struct CourseService {
    db: PgPool,
}

impl CourseService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Course outline for the caller: modules and exercises in order, each
    /// exercise carrying only the caller's own submissions.
    pub async fn list_modules(
        &self,
        session: &UserSession,
        formation_id: Uuid,
    ) -> ApiResult<Vec<ModuleWithExercises<ExerciseWithSubmissions>>> {
        const LOAD_FAILED: &str = "Erreur lors de la récupération des modules";

        let modules = sqlx::query_as::<_, Module>(&format!(
            "SELECT {MODULE_COLUMNS} FROM modules
             WHERE formation_id = $1
             ORDER BY \"order\" ASC, created_at ASC"
        ))
        .bind(formation_id)
        .fetch_all(&self.db)
        .await
        .or_internal(LOAD_FAILED)?;

        if modules.is_empty() {
            return Ok(Vec::new());
        }

        let module_ids: Vec<Uuid> = modules.iter().map(|m| m.id).collect();
        let exercises = sqlx::query_as::<_, ExerciseRow>(&format!(
            "SELECT {EXERCISE_COLUMNS},
                    (SELECT COUNT(*) FROM exercise_submissions s WHERE s.exercise_id = exercises.id)
                        AS submissions_count
             FROM exercises
             WHERE module_id = ANY($1)
             ORDER BY \"order\" ASC, created_at ASC"
        ))
        .bind(&module_ids)
        .fetch_all(&self.db)
        .await
        .or_internal(LOAD_FAILED)?;

        let exercise_ids: Vec<Uuid> = exercises.iter().map(|e| e.exercise.id).collect();
        let submissions = sqlx::query_as::<_, ExerciseSubmission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM exercise_submissions
             WHERE exercise_id = ANY($1) AND user_id = $2
             ORDER BY created_at DESC"
        ))
        .bind(&exercise_ids)
        .bind(session.user_id)
        .fetch_all(&self.db)
        .await
        .or_internal(LOAD_FAILED)?;

        Ok(assemble_outline(modules, exercises, submissions))
    }

    pub async fn create_module(
        &self,
        session: &UserSession,
        formation_id: Uuid,
        request: CreateModuleRequest,
    ) -> ApiResult<ModuleWithExercises<ExerciseWithCount>> {
        session.require_trainer()?;

        let creator_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT creator_id FROM formations WHERE id = $1",
        )
        .bind(formation_id)
        .fetch_optional(&self.db)
        .await
        .or_internal("Erreur lors de la création du module")?
        .ok_or_else(|| ApiError::not_found("Formation non trouvée"))?;
        session.require_owner_or_admin(creator_id)?;

        let title = require_text(request.title.as_deref(), "Titre requis")?;

        let module = sqlx::query_as::<_, Module>(&format!(
            "INSERT INTO modules (title, description, \"order\", formation_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {MODULE_COLUMNS}"
        ))
        .bind(&title)
        .bind(trimmed(request.description.as_deref()))
        .bind(request.order.unwrap_or(0))
        .bind(formation_id)
        .fetch_one(&self.db)
        .await
        .map_err(|err| {
            ApiError::from_insert(err, "Formation non trouvée", "Erreur lors de la création du module")
        })?;

        tracing::info!(module_id = %module.id, %formation_id, "module created");

        Ok(ModuleWithExercises {
            module,
            exercises: Vec::new(),
        })
    }

    pub async fn update_module(
        &self,
        session: &UserSession,
        module_id: Uuid,
        request: UpdateModuleRequest,
    ) -> ApiResult<Module> {
        session.require_trainer()?;
        let ownership = self.module_ownership(module_id).await?;
        session.require_owner_or_admin(ownership.creator_id)?;

        let title = optional_text(request.title.as_deref(), "Titre requis")?;
        let (set_description, description) = match request.description {
            None => (false, None),
            Some(value) => (true, trimmed(value.as_deref())),
        };

        sqlx::query_as::<_, Module>(&format!(
            "UPDATE modules SET
                title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                \"order\" = COALESCE($5, \"order\"),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {MODULE_COLUMNS}"
        ))
        .bind(ownership.module_id)
        .bind(title)
        .bind(set_description)
        .bind(description)
        .bind(request.order)
        .fetch_optional(&self.db)
        .await
        .or_internal("Erreur lors de la mise à jour du module")?
        .ok_or_else(|| ApiError::not_found(MODULE_NOT_FOUND))
    }

    /// Removes the module; its exercises and their submissions cascade.
    pub async fn delete_module(&self, session: &UserSession, module_id: Uuid) -> ApiResult<()> {
        session.require_trainer()?;
        let ownership = self.module_ownership(module_id).await?;
        session.require_owner_or_admin(ownership.creator_id)?;

        let deleted = sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(module_id)
            .execute(&self.db)
            .await
            .or_internal("Erreur lors de la suppression du module")?;

        if deleted.rows_affected() == 0 {
            return Err(ApiError::not_found(MODULE_NOT_FOUND));
        }

        tracing::info!(%module_id, formation_id = %ownership.formation_id, "module deleted");
        Ok(())
    }

    pub async fn create_exercise(
        &self,
        session: &UserSession,
        module_id: Uuid,
        request: CreateExerciseRequest,
    ) -> ApiResult<ExerciseWithCount> {
        session.require_trainer()?;
        let ownership = self.module_ownership(module_id).await?;
        session.require_owner_or_admin(ownership.creator_id)?;

        const MISSING: &str = "Données manquantes";
        let title = require_text(request.title.as_deref(), MISSING)?;
        let description = require_text(request.description.as_deref(), MISSING)?;
        let exercise_type = request
            .exercise_type
            .ok_or_else(|| ApiError::bad_request(MISSING))?;

        let exercise = sqlx::query_as::<_, Exercise>(&format!(
            "INSERT INTO exercises (title, description, type, required, \"order\", module_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {EXERCISE_COLUMNS}"
        ))
        .bind(&title)
        .bind(&description)
        .bind(exercise_type)
        .bind(request.required.unwrap_or(false))
        .bind(request.order.unwrap_or(0))
        .bind(module_id)
        .fetch_one(&self.db)
        .await
        .map_err(|err| {
            ApiError::from_insert(err, MODULE_NOT_FOUND, "Erreur lors de la création de l'exercice")
        })?;

        tracing::info!(exercise_id = %exercise.id, %module_id, "exercise created");

        Ok(ExerciseWithCount {
            exercise,
            count: SubmissionCount { submissions: 0 },
        })
    }

    pub async fn delete_exercise(&self, session: &UserSession, exercise_id: Uuid) -> ApiResult<()> {
        session.require_trainer()?;

        let creator_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT f.creator_id
             FROM exercises e
             JOIN modules m ON m.id = e.module_id
             JOIN formations f ON f.id = m.formation_id
             WHERE e.id = $1",
        )
        .bind(exercise_id)
        .fetch_optional(&self.db)
        .await
        .or_internal("Erreur lors de la suppression de l'exercice")?
        .ok_or_else(|| ApiError::not_found(EXERCISE_NOT_FOUND))?;
        session.require_owner_or_admin(creator_id)?;

        let deleted = sqlx::query("DELETE FROM exercises WHERE id = $1")
            .bind(exercise_id)
            .execute(&self.db)
            .await
            .or_internal("Erreur lors de la suppression de l'exercice")?;

        if deleted.rows_affected() == 0 {
            return Err(ApiError::not_found(EXERCISE_NOT_FOUND));
        }
        Ok(())
    }

    /// One submission per (exercise, user): submitting again replaces the
    /// content and clears any previous review.
    pub async fn submit(
        &self,
        session: &UserSession,
        exercise_id: Uuid,
        request: SubmitExerciseRequest,
    ) -> ApiResult<ExerciseSubmission> {
        let content = require_text(request.content.as_deref(), "Contenu requis")?;

        let submission = sqlx::query_as::<_, ExerciseSubmission>(&format!(
            "INSERT INTO exercise_submissions (content, exercise_id, user_id)
             VALUES ($1, $2, $3)
             ON CONFLICT (exercise_id, user_id) DO UPDATE SET
                content = EXCLUDED.content,
                is_approved = FALSE,
                feedback = NULL,
                updated_at = NOW()
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(&content)
        .bind(exercise_id)
        .bind(session.user_id)
        .fetch_one(&self.db)
        .await
        .map_err(|err| {
            ApiError::from_insert(err, EXERCISE_NOT_FOUND, "Erreur lors de la soumission")
        })?;

        tracing::debug!(submission_id = %submission.id, %exercise_id, "exercise submitted");
        Ok(submission)
    }

    pub async fn review(
        &self,
        session: &UserSession,
        submission_id: Uuid,
        request: ReviewSubmissionRequest,
    ) -> ApiResult<ExerciseSubmission> {
        session.require_trainer()?;

        let creator_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT f.creator_id
             FROM exercise_submissions s
             JOIN exercises e ON e.id = s.exercise_id
             JOIN modules m ON m.id = e.module_id
             JOIN formations f ON f.id = m.formation_id
             WHERE s.id = $1",
        )
        .bind(submission_id)
        .fetch_optional(&self.db)
        .await
        .or_internal("Erreur lors de la correction")?
        .ok_or_else(|| ApiError::not_found("Soumission non trouvée"))?;
        session.require_owner_or_admin(creator_id)?;

        let (set_feedback, feedback) = match request.feedback {
            None => (false, None),
            Some(value) => (true, trimmed(value.as_deref())),
        };

        sqlx::query_as::<_, ExerciseSubmission>(&format!(
            "UPDATE exercise_submissions SET
                is_approved = COALESCE($2, is_approved),
                feedback = CASE WHEN $3 THEN $4 ELSE feedback END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(submission_id)
        .bind(request.is_approved)
        .bind(set_feedback)
        .bind(feedback)
        .fetch_optional(&self.db)
        .await
        .or_internal("Erreur lors de la correction")?
        .ok_or_else(|| ApiError::not_found("Soumission non trouvée"))
    }

    async fn module_ownership(&self, module_id: Uuid) -> ApiResult<ModuleOwnership> {
        sqlx::query_as::<_, ModuleOwnership>(
            "SELECT m.id AS module_id, m.formation_id, f.creator_id
             FROM modules m
             JOIN formations f ON f.id = m.formation_id
             WHERE m.id = $1",
        )
        .bind(module_id)
        .fetch_optional(&self.db)
        .await
        .or_internal("Erreur interne du serveur")?
        .ok_or_else(|| ApiError::not_found(MODULE_NOT_FOUND))
    }
}

/// Groups exercises under their module and submissions under their exercise,
/// keeping the order of each input list.
pub fn assemble_outline(
    modules: Vec<Module>,
    exercises: Vec<ExerciseRow>,
    submissions: Vec<ExerciseSubmission>,
) -> Vec<ModuleWithExercises<ExerciseWithSubmissions>> {
    let mut submissions_by_exercise: HashMap<Uuid, Vec<ExerciseSubmission>> = HashMap::new();
    for submission in submissions {
        submissions_by_exercise
            .entry(submission.exercise_id)
            .or_default()
            .push(submission);
    }

    let mut exercises_by_module: HashMap<Uuid, Vec<ExerciseWithSubmissions>> = HashMap::new();
    for row in exercises {
        let submissions = submissions_by_exercise
            .remove(&row.exercise.id)
            .unwrap_or_default();
        exercises_by_module
            .entry(row.exercise.module_id)
            .or_default()
            .push(ExerciseWithSubmissions {
                exercise: row.exercise,
                submissions,
                count: SubmissionCount {
                    submissions: row.submissions_count,
                },
            });
    }

    modules
        .into_iter()
        .map(|module| ModuleWithExercises {
            exercises: exercises_by_module.remove(&module.id).unwrap_or_default(),
            module,
        })
        .collect()
}
