use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::formation::{Formation, FormationListRow, FormationSummary};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub formation_id: Uuid,
    pub progress: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollResponse {
    pub message: String,
    pub enrollment_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub progress: Option<i32>,
}

/// Enrollment joined with its formation, creator name and enrollment count.
#[derive(Debug, Clone, FromRow)]
pub struct EnrollmentRow {
    pub enrollment_id: Uuid,
    pub user_id: Uuid,
    pub progress: i32,
    pub enrolled_at: DateTime<Utc>,
    pub enrollment_updated_at: DateTime<Utc>,
    #[sqlx(flatten)]
    pub formation: Formation,
    pub creator_full_name: Option<String>,
    pub enrollments_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentWithFormation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub formation_id: Uuid,
    pub progress: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub formation: FormationSummary,
}

impl From<EnrollmentRow> for EnrollmentWithFormation {
    fn from(row: EnrollmentRow) -> Self {
        let formation_id = row.formation.id;
        Self {
            id: row.enrollment_id,
            user_id: row.user_id,
            formation_id,
            progress: row.progress,
            created_at: row.enrolled_at,
            updated_at: row.enrollment_updated_at,
            formation: FormationSummary::from(FormationListRow {
                formation: row.formation,
                creator_full_name: row.creator_full_name,
                enrollments_count: row.enrollments_count,
            }),
        }
    }
}
