use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by every handler. The message is user facing (French);
/// internal sources are logged and never serialized.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Non authentifié")]
    Unauthenticated,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{message}")]
    Internal {
        message: String,
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn forbidden() -> Self {
        ApiError::Forbidden("Non autorisé".to_string())
    }

    pub fn forbidden_with(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        ApiError::Internal {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(err) => err.status(),
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Maps a failed insert of a child row: a foreign-key violation means the
    /// parent does not exist.
    pub fn from_insert(err: sqlx::Error, missing_parent: &str, message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                ApiError::not_found(missing_parent)
            }
            _ => ApiError::internal(message, err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Auth(err) = self {
            return err.into_response();
        }

        if let ApiError::Internal { message, source } = &self {
            tracing::error!(error = ?source, "{}", message);
        }

        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(%rejection, "rejected request body");
        ApiError::bad_request("Corps de requête invalide")
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(%rejection, "rejected path parameter");
        ApiError::bad_request("Identifiant invalide")
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(%rejection, "rejected query string");
        ApiError::bad_request("Paramètres de requête invalides")
    }
}

/// Attaches the user-facing message of a 500 response to any failure.
pub trait OrInternal<T> {
    fn or_internal(self, message: &str) -> ApiResult<T>;
}

impl<T, E> OrInternal<T> for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn or_internal(self, message: &str) -> ApiResult<T> {
        self.map_err(|err| ApiError::internal(message, err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::forbidden().status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("Post non trouvé").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::bad_request("Contenu requis").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::internal("Erreur interne du serveur", anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_source_is_not_exposed() {
        let err = ApiError::internal(
            "Erreur lors de la création du post",
            anyhow::anyhow!("connection refused"),
        );
        assert_eq!(err.to_string(), "Erreur lors de la création du post");
    }

    #[test]
    fn test_or_internal_keeps_ok_values() {
        let ok: Result<u8, std::io::Error> = Ok(3);
        assert_eq!(ok.or_internal("unused").unwrap(), 3);

        let failed: Result<u8, std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        let err = failed.or_internal("Erreur lors de l'upload du fichier").unwrap_err();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Erreur lors de l'upload du fichier");
    }

    #[test]
    fn test_insert_error_without_constraint_is_internal() {
        let err = ApiError::from_insert(
            sqlx::Error::RowNotFound,
            "Post non trouvé",
            "Erreur lors de la création du commentaire",
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
