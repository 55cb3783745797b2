use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::{ClientType, Role};

/// Minimal public identity attached to comments, shares and notes.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserName {
    pub id: Uuid,
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub client_type: Option<ClientType>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub message: String,
    pub user_id: Uuid,
}

/// Account creation from the admin console.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub client_type: Option<ClientType>,
}

/// Validated insert payload shared by signup, admin creation and seeding.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    pub client_type: Option<ClientType>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct AdminUserRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub client_type: Option<ClientType>,
    pub created_at: DateTime<Utc>,
    pub formations_count: i64,
    pub enrollments_count: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserCounts {
    pub formations: i64,
    pub enrollments: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub client_type: Option<ClientType>,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "_count")]
    pub count: UserCounts,
}

impl From<AdminUserRow> for AdminUser {
    fn from(row: AdminUserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            role: row.role,
            client_type: row.client_type,
            created_at: row.created_at,
            count: UserCounts {
                formations: row.formations_count,
                enrollments: row.enrollments_count,
            },
        }
    }
}

/// Trainer listed as a messaging contact.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TrainerContact {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub image: Option<String>,
    pub role: Role,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct LearnerRow {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: String,
    pub image: Option<String>,
    pub client_type: Option<ClientType>,
    pub bio: Option<String>,
    pub coaching_received_count: i64,
    pub enrollments_count: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LearnerCounts {
    pub coaching_received: i64,
    pub enrollments: i64,
}

/// Learner as seen from the coaching console.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerWithCounts {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: String,
    pub image: Option<String>,
    pub client_type: Option<ClientType>,
    pub bio: Option<String>,
    #[serde(rename = "_count")]
    pub count: LearnerCounts,
}

impl From<LearnerRow> for LearnerWithCounts {
    fn from(row: LearnerRow) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            image: row.image,
            client_type: row.client_type,
            bio: row.bio,
            count: LearnerCounts {
                coaching_received: row.coaching_received_count,
                enrollments: row.enrollments_count,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_user_count_shape() {
        let user = AdminUser::from(AdminUserRow {
            id: Uuid::new_v4(),
            email: "john@doe.com".to_string(),
            full_name: Some("John Doe".to_string()),
            role: Role::FormateurAdmin,
            client_type: None,
            created_at: Utc::now(),
            formations_count: 3,
            enrollments_count: 0,
        });

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["fullName"], "John Doe");
        assert_eq!(json["role"], "FORMATEUR_ADMIN");
        assert_eq!(json["_count"]["formations"], 3);
        assert_eq!(json["_count"]["enrollments"], 0);
    }

    #[test]
    fn test_learner_counts_are_camel_case() {
        let learner = LearnerWithCounts::from(LearnerRow {
            id: Uuid::new_v4(),
            full_name: Some("Marie Dupont".to_string()),
            email: "marie@test.com".to_string(),
            image: None,
            client_type: Some(ClientType::EnLigne),
            bio: None,
            coaching_received_count: 2,
            enrollments_count: 1,
        });

        let json = serde_json::to_value(&learner).unwrap();
        assert_eq!(json["clientType"], "EN_LIGNE");
        assert_eq!(json["_count"]["coachingReceived"], 2);
    }

    #[test]
    fn test_signup_request_fields_are_optional() {
        let request: SignupRequest = serde_json::from_str(r#"{"email": "a@b.co"}"#).unwrap();
        assert!(request.password.is_none());
        assert!(request.role.is_none());
    }
}
