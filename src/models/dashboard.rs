use serde::Serialize;

use super::coaching::NoteWithCoach;
use super::enrollment::EnrollmentWithFormation;
use super::formation::{FormationSummary, TrainerFormation};
use super::user::RecentUser;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    pub total_formations: i64,
    pub total_enrollments: i64,
    pub published_formations: i64,
    pub recent_users: Vec<RecentUser>,
    pub recent_formations: Vec<FormationSummary>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LearnerStats {
    pub total_enrollments: usize,
    pub completed_courses: usize,
    pub in_progress: usize,
}

impl LearnerStats {
    /// Completed means 100 %, in progress means strictly between 0 and 100.
    pub fn from_progress<I>(progress: I) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        progress
            .into_iter()
            .fold(LearnerStats::default(), |mut stats, value| {
                stats.total_enrollments += 1;
                if value == 100 {
                    stats.completed_courses += 1;
                } else if value > 0 {
                    stats.in_progress += 1;
                }
                stats
            })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerDashboard {
    pub enrollments: Vec<EnrollmentWithFormation>,
    pub stats: LearnerStats,
    pub available_formations: Vec<FormationSummary>,
    pub coaching_notes: Vec<NoteWithCoach>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrainerStats {
    pub total_formations: usize,
    pub published_formations: usize,
    pub total_enrollments: i64,
    pub total_files: i64,
}

impl TrainerStats {
    pub fn from_formations(formations: &[TrainerFormation]) -> Self {
        TrainerStats {
            total_formations: formations.len(),
            published_formations: formations
                .iter()
                .filter(|f| f.formation.is_published)
                .count(),
            total_enrollments: formations.iter().map(|f| f.count.enrollments).sum(),
            total_files: formations.iter().map(|f| f.count.files).sum(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerDashboard {
    pub formations: Vec<TrainerFormation>,
    pub stats: TrainerStats,
}
