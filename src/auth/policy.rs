//! Role and ownership checks shared by every service. They run before any
//! database access that depends on the caller's rights.

use uuid::Uuid;

use crate::auth::{Role, UserSession};
use crate::error::{ApiError, ApiResult};

impl UserSession {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_trainer(&self) -> bool {
        self.role.is_trainer()
    }

    pub fn require_role(&self, role: Role) -> ApiResult<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(ApiError::forbidden())
        }
    }

    /// FORMATEUR_ADMIN or ADMIN.
    pub fn require_trainer(&self) -> ApiResult<()> {
        if self.is_trainer() {
            Ok(())
        } else {
            Err(ApiError::forbidden())
        }
    }

    pub fn require_learner(&self) -> ApiResult<()> {
        self.require_role(Role::Apprenant)
    }

    pub fn owns(&self, owner_id: Uuid) -> bool {
        self.user_id == owner_id
    }

    pub fn require_owner(&self, owner_id: Uuid) -> ApiResult<()> {
        if self.owns(owner_id) {
            Ok(())
        } else {
            Err(ApiError::forbidden())
        }
    }

    /// Admins may act on anything, everyone else only on what they own.
    pub fn require_owner_or_admin(&self, owner_id: Uuid) -> ApiResult<()> {
        self.require_owner_or_admin_with(owner_id, "Non autorisé")
    }

    pub fn require_owner_or_admin_with(&self, owner_id: Uuid, message: &str) -> ApiResult<()> {
        if self.is_admin() || self.owns(owner_id) {
            Ok(())
        } else {
            Err(ApiError::forbidden_with(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn session(role: Role) -> UserSession {
        UserSession {
            user_id: Uuid::new_v4(),
            email: "user@test.com".to_string(),
            role,
            client_type: None,
            jti: Uuid::new_v4().to_string(),
            expires_at: 0,
        }
    }

    fn status(result: ApiResult<()>) -> StatusCode {
        match result {
            Ok(()) => StatusCode::OK,
            Err(err) => err.status(),
        }
    }

    #[test]
    fn test_role_requirements() {
        let learner = session(Role::Apprenant);
        let trainer = session(Role::FormateurAdmin);
        let admin = session(Role::Admin);

        assert_eq!(status(learner.require_learner()), StatusCode::OK);
        assert_eq!(status(trainer.require_learner()), StatusCode::FORBIDDEN);
        assert_eq!(status(admin.require_learner()), StatusCode::FORBIDDEN);

        assert_eq!(status(learner.require_trainer()), StatusCode::FORBIDDEN);
        assert_eq!(status(trainer.require_trainer()), StatusCode::OK);
        assert_eq!(status(admin.require_trainer()), StatusCode::OK);

        assert_eq!(status(admin.require_role(Role::FormateurAdmin)), StatusCode::FORBIDDEN);
        assert_eq!(status(trainer.require_role(Role::FormateurAdmin)), StatusCode::OK);
    }

    #[test]
    fn test_owner_or_admin_matrix() {
        let owner = session(Role::FormateurAdmin);
        let other_trainer = session(Role::FormateurAdmin);
        let learner = session(Role::Apprenant);
        let admin = session(Role::Admin);
        let resource_owner = owner.user_id;

        assert_eq!(status(owner.require_owner_or_admin(resource_owner)), StatusCode::OK);
        assert_eq!(status(admin.require_owner_or_admin(resource_owner)), StatusCode::OK);
        assert_eq!(
            status(other_trainer.require_owner_or_admin(resource_owner)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status(learner.require_owner_or_admin(resource_owner)),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_owner_only_excludes_admin() {
        let coach = session(Role::FormateurAdmin);
        let admin = session(Role::Admin);

        assert_eq!(status(coach.require_owner(coach.user_id)), StatusCode::OK);
        assert_eq!(status(admin.require_owner(coach.user_id)), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_custom_forbidden_message() {
        let author = session(Role::Apprenant);
        let other = session(Role::Apprenant);

        let err = other
            .require_owner_or_admin_with(author.user_id, "Non autorisé à supprimer ce post")
            .unwrap_err();
        assert_eq!(err.to_string(), "Non autorisé à supprimer ce post");
    }
}
