use crate::error::{ApiError, ApiResult};

/// Trims a text field; blank input counts as absent.
pub fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Trimmed, non-empty text or a 400 with the given message.
pub fn require_text(value: Option<&str>, message: &str) -> ApiResult<String> {
    trimmed(value).ok_or_else(|| ApiError::bad_request(message))
}

/// For partial updates: absent stays absent, blank is rejected.
pub fn optional_text(value: Option<&str>, message: &str) -> ApiResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(value) => require_text(Some(value), message).map(Some),
    }
}

/// Lightweight shape check; the unique index on users.email is the real guard.
pub fn validate_email(email: &str) -> ApiResult<()> {
    let valid = email.len() <= 255
        && email
            .split_once('@')
            .map(|(local, domain)| !local.is_empty() && domain.contains('.'))
            .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        Err(ApiError::bad_request("Adresse email invalide"))
    }
}

pub fn validate_progress(progress: i32) -> ApiResult<i32> {
    if (0..=100).contains(&progress) {
        Ok(progress)
    } else {
        Err(ApiError::bad_request(
            "La progression doit être comprise entre 0 et 100",
        ))
    }
}
