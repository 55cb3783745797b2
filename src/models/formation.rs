use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::serde_ext::{double_option, i64_as_string};
use super::validation::trimmed;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "formation_level", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormationLevel {
    #[default]
    Debutant,
    Intermediaire,
    Avance,
}

/// Column list for `Formation` when the table is aliased as `f`.
pub const FORMATION_COLUMNS: &str = "f.id, f.title, f.description, f.category, f.level, \
     f.thumbnail, f.is_published, f.creator_id, f.created_at, f.updated_at";

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Formation {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: FormationLevel,
    pub thumbnail: Option<String>,
    pub is_published: bool,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatorName {
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatorContact {
    pub full_name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EnrollmentCount {
    pub enrollments: i64,
}

/// Formation joined with its creator's name and enrollment count.
#[derive(Debug, Clone, FromRow)]
pub struct FormationListRow {
    #[sqlx(flatten)]
    pub formation: Formation,
    pub creator_full_name: Option<String>,
    pub enrollments_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FormationSummary {
    #[serde(flatten)]
    pub formation: Formation,
    pub creator: CreatorName,
    #[serde(rename = "_count")]
    pub count: EnrollmentCount,
}

impl From<FormationListRow> for FormationSummary {
    fn from(row: FormationListRow) -> Self {
        Self {
            formation: row.formation,
            creator: CreatorName {
                full_name: row.creator_full_name,
            },
            count: EnrollmentCount {
                enrollments: row.enrollments_count,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FormationDetail {
    #[serde(flatten)]
    pub formation: Formation,
    pub creator: CreatorName,
    pub files: Vec<FormationFile>,
    #[serde(rename = "_count")]
    pub count: EnrollmentCount,
}

impl FormationDetail {
    pub fn new(row: FormationListRow, files: Vec<FormationFile>) -> Self {
        let summary = FormationSummary::from(row);
        Self {
            formation: summary.formation,
            creator: summary.creator,
            files,
            count: summary.count,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct AdminFormationRow {
    #[sqlx(flatten)]
    pub formation: Formation,
    pub creator_full_name: Option<String>,
    pub creator_email: String,
    pub enrollments_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminFormation {
    #[serde(flatten)]
    pub formation: Formation,
    pub creator: CreatorContact,
    #[serde(rename = "_count")]
    pub count: EnrollmentCount,
}

impl From<AdminFormationRow> for AdminFormation {
    fn from(row: AdminFormationRow) -> Self {
        Self {
            formation: row.formation,
            creator: CreatorContact {
                full_name: row.creator_full_name,
                email: row.creator_email,
            },
            count: EnrollmentCount {
                enrollments: row.enrollments_count,
            },
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TrainerFormationRow {
    #[sqlx(flatten)]
    pub formation: Formation,
    pub creator_full_name: Option<String>,
    pub enrollments_count: i64,
    pub files_count: i64,
    pub modules_count: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FormationContentCounts {
    pub enrollments: i64,
    pub files: i64,
    pub modules: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainerFormation {
    #[serde(flatten)]
    pub formation: Formation,
    pub creator: CreatorName,
    #[serde(rename = "_count")]
    pub count: FormationContentCounts,
}

impl From<TrainerFormationRow> for TrainerFormation {
    fn from(row: TrainerFormationRow) -> Self {
        Self {
            formation: row.formation,
            creator: CreatorName {
                full_name: row.creator_full_name,
            },
            count: FormationContentCounts {
                enrollments: row.enrollments_count,
                files: row.files_count,
                modules: row.modules_count,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FormationFile {
    pub id: Uuid,
    pub title: String,
    pub filename: String,
    pub file_type: String,
    #[serde(serialize_with = "i64_as_string")]
    pub file_size: i64,
    #[serde(rename = "cloud_storage_path")]
    pub cloud_storage_path: String,
    pub mime_type: String,
    pub order: i32,
    pub formation_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Upload accepted from the multipart form, before it reaches storage.
#[derive(Debug, Clone)]
pub struct NewFormationFile {
    pub title: String,
    pub filename: String,
    pub content_type: String,
    pub order: i32,
    pub data: bytes::Bytes,
}

/// Raw multipart fields of a file upload.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub title: Option<String>,
    pub order: Option<String>,
    pub file: Option<UploadedFile>,
}

#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: bytes::Bytes,
}

impl UploadForm {
    pub fn into_new_file(self) -> ApiResult<NewFormationFile> {
        let title = trimmed(self.title.as_deref());
        let (Some(file), Some(title)) = (self.file.filter(|f| !f.filename.is_empty()), title)
        else {
            return Err(ApiError::bad_request("Fichier et titre sont requis"));
        };

        let order = match trimmed(self.order.as_deref()) {
            None => 0,
            Some(order) => order
                .parse()
                .map_err(|_| ApiError::bad_request("Ordre invalide"))?,
        };

        Ok(NewFormationFile {
            title,
            filename: file.filename,
            content_type: file.content_type,
            order,
            data: file.data,
        })
    }
}

impl NewFormationFile {
    /// `video` for any video MIME type, `document` otherwise.
    pub fn file_type(&self) -> &'static str {
        let is_video = self
            .content_type
            .parse::<mime::Mime>()
            .map(|parsed| parsed.type_() == mime::VIDEO)
            .unwrap_or(false);
        if is_video {
            "video"
        } else {
            "document"
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFormationRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<FormationLevel>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFormationRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<FormationLevel>,
    #[serde(default, deserialize_with = "double_option")]
    pub thumbnail: Option<Option<String>>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct FormationQuery {
    pub published: Option<String>,
}

impl FormationQuery {
    pub fn published_only(&self) -> bool {
        self.published.as_deref() == Some("true")
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TogglePublishRequest {
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublishState {
    pub id: Uuid,
    pub title: String,
    pub is_published: bool,
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub cloud_storage_path: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub signed_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formation() -> Formation {
        Formation {
            id: Uuid::new_v4(),
            title: "Développement personnel".to_string(),
            description: "Apprendre à se connaître".to_string(),
            category: "Bien-être".to_string(),
            level: FormationLevel::Debutant,
            thumbnail: None,
            is_published: true,
            creator_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_serializes_flat_with_count() {
        let summary = FormationSummary::from(FormationListRow {
            formation: formation(),
            creator_full_name: Some("John Doe".to_string()),
            enrollments_count: 4,
        });

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["title"], "Développement personnel");
        assert_eq!(json["isPublished"], true);
        assert_eq!(json["level"], "DEBUTANT");
        assert_eq!(json["creator"]["fullName"], "John Doe");
        assert_eq!(json["_count"]["enrollments"], 4);
    }

    #[test]
    fn test_file_size_is_a_string() {
        let file = FormationFile {
            id: Uuid::new_v4(),
            title: "Introduction".to_string(),
            filename: "intro.mp4".to_string(),
            file_type: "video".to_string(),
            file_size: 5_368_709_120,
            cloud_storage_path: "uploads/1700000000000-intro.mp4".to_string(),
            mime_type: "video/mp4".to_string(),
            order: 1,
            formation_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["fileSize"], "5368709120");
        assert_eq!(json["cloud_storage_path"], "uploads/1700000000000-intro.mp4");
        assert_eq!(json["mimeType"], "video/mp4");
    }

    #[test]
    fn test_file_type_from_mime() {
        let mut upload = NewFormationFile {
            title: "Cours".to_string(),
            filename: "cours.mp4".to_string(),
            content_type: "video/mp4".to_string(),
            order: 0,
            data: bytes::Bytes::from_static(b"data"),
        };
        assert_eq!(upload.file_type(), "video");

        upload.content_type = "application/pdf".to_string();
        assert_eq!(upload.file_type(), "document");
    }

    #[test]
    fn test_upload_form_validation() {
        let missing_file = UploadForm {
            title: Some("Cours".to_string()),
            ..UploadForm::default()
        };
        assert_eq!(
            missing_file.into_new_file().unwrap_err().to_string(),
            "Fichier et titre sont requis"
        );

        let form = UploadForm {
            title: Some(" Cours 1 ".to_string()),
            order: Some("3".to_string()),
            file: Some(UploadedFile {
                filename: "cours.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                data: bytes::Bytes::from_static(b"%PDF"),
            }),
        };
        let upload = form.into_new_file().unwrap();
        assert_eq!(upload.title, "Cours 1");
        assert_eq!(upload.order, 3);
        assert_eq!(upload.file_type(), "document");
    }

    #[test]
    fn test_update_request_thumbnail_null_vs_absent() {
        let absent: UpdateFormationRequest = serde_json::from_str(r#"{"title": "T"}"#).unwrap();
        assert_eq!(absent.thumbnail, None);

        let cleared: UpdateFormationRequest =
            serde_json::from_str(r#"{"thumbnail": null}"#).unwrap();
        assert_eq!(cleared.thumbnail, Some(None));
    }

    #[test]
    fn test_published_query() {
        assert!(FormationQuery { published: Some("true".to_string()) }.published_only());
        assert!(!FormationQuery { published: Some("false".to_string()) }.published_only());
        assert!(!FormationQuery { published: None }.published_only());
    }
}
