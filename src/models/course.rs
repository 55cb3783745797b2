use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::serde_ext::double_option;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "exercise_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExerciseType {
    Text,
    File,
    Quiz,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub order: i32,
    pub formation_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub exercise_type: ExerciseType,
    pub required: bool,
    pub order: i32,
    pub module_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSubmission {
    pub id: Uuid,
    pub content: String,
    pub is_approved: bool,
    pub feedback: Option<String>,
    pub exercise_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubmissionCount {
    pub submissions: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct ExerciseRow {
    #[sqlx(flatten)]
    pub exercise: Exercise,
    pub submissions_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExerciseWithCount {
    #[serde(flatten)]
    pub exercise: Exercise,
    #[serde(rename = "_count")]
    pub count: SubmissionCount,
}

impl From<ExerciseRow> for ExerciseWithCount {
    fn from(row: ExerciseRow) -> Self {
        Self {
            exercise: row.exercise,
            count: SubmissionCount {
                submissions: row.submissions_count,
            },
        }
    }
}

/// Exercise as seen by one user: their own submissions plus the total count.
#[derive(Debug, Clone, Serialize)]
pub struct ExerciseWithSubmissions {
    #[serde(flatten)]
    pub exercise: Exercise,
    pub submissions: Vec<ExerciseSubmission>,
    #[serde(rename = "_count")]
    pub count: SubmissionCount,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleWithExercises<E> {
    #[serde(flatten)]
    pub module: Module,
    pub exercises: Vec<E>,
}

/// Module row joined with the creator of its formation, for ownership checks.
#[derive(Debug, Clone, FromRow)]
pub struct ModuleOwnership {
    pub module_id: Uuid,
    pub formation_id: Uuid,
    pub creator_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateModuleRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateModuleRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateExerciseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub exercise_type: Option<ExerciseType>,
    pub required: Option<bool>,
    pub order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitExerciseRequest {
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmissionRequest {
    pub is_approved: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub feedback: Option<Option<String>>,
}
