use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Email ou mot de passe incorrect")]
    InvalidCredentials,
    #[error("Non authentifié")]
    MissingAuthHeader,
    #[error("Non authentifié")]
    InvalidAuthHeaderFormat,
    #[error("Session invalide")]
    InvalidToken,
    #[error("Session expirée")]
    TokenExpired,
    #[error("Mot de passe invalide : {0}")]
    PasswordValidation(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Password hashing error: {0}")]
    PasswordHashing(#[from] crate::auth::password::PasswordError),
    #[error("Blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeaderFormat
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AuthError::PasswordValidation(_) => StatusCode::BAD_REQUEST,
            AuthError::Database(_) | AuthError::PasswordHashing(_) | AuthError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AuthError::Database(err) => {
                tracing::error!(error = ?err, "authentication store failure");
                "Erreur interne du serveur".to_string()
            }
            AuthError::PasswordHashing(err) => {
                tracing::error!(error = ?err, "password hashing failure");
                "Erreur interne du serveur".to_string()
            }
            AuthError::Task(err) => {
                tracing::error!(error = ?err, "password verification task failed");
                "Erreur interne du serveur".to_string()
            }
            AuthError::Jwt(_) => "Session invalide".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
