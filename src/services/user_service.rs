use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::{hash_password, PasswordPolicy};
use crate::auth::{AuthError, Role, SessionUser};
use crate::error::{ApiError, ApiResult, OrInternal};
use crate::models::{
    trimmed, validate_email, CreateUserRequest, NewUser, SignupRequest, SignupResponse,
    TrainerContact,
};

const FIELDS_REQUIRED: &str = "Tous les champs sont requis";

#[derive(Clone)]
pub struct UserService {
    db: PgPool,
    password_policy: PasswordPolicy,
}

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            password_policy: PasswordPolicy::default(),
        }
    }

    /// Public registration. Only FORMATEUR_ADMIN may be self-selected; any
    /// other role value registers a learner.
    pub async fn signup(&self, request: SignupRequest) -> ApiResult<SignupResponse> {
        let email = trimmed(request.email.as_deref());
        let full_name = trimmed(request.full_name.as_deref());
        let role = trimmed(request.role.as_deref());
        let password = request.password.filter(|p| !p.is_empty());

        let (Some(email), Some(full_name), Some(role), Some(password)) =
            (email, full_name, role, password)
        else {
            return Err(ApiError::bad_request(FIELDS_REQUIRED));
        };

        let role = match Role::parse(&role) {
            Some(Role::FormateurAdmin) => Role::FormateurAdmin,
            _ => Role::Apprenant,
        };

        let new_user = NewUser {
            email,
            password,
            full_name,
            role,
            client_type: request.client_type,
        };

        let user_id = self
            .create_user(new_user)
            .await?
            .ok_or_else(|| ApiError::bad_request("Un compte avec cet email existe déjà"))?;

        tracing::info!(%user_id, role = role.as_str(), "account created");

        Ok(SignupResponse {
            message: "Compte créé avec succès".to_string(),
            user_id,
        })
    }

    /// Account creation from the admin console; the role is taken as given.
    pub async fn create_from_admin(&self, request: CreateUserRequest) -> ApiResult<Uuid> {
        let email = trimmed(request.email.as_deref());
        let full_name = trimmed(request.full_name.as_deref());
        let password = request.password.filter(|p| !p.is_empty());

        let (Some(email), Some(full_name), Some(password), Some(role)) =
            (email, full_name, password, request.role)
        else {
            return Err(ApiError::bad_request(FIELDS_REQUIRED));
        };

        self.create_user(NewUser {
            email,
            password,
            full_name,
            role,
            client_type: request.client_type,
        })
        .await?
        .ok_or_else(|| ApiError::bad_request("Un utilisateur avec cet email existe déjà"))
    }

    /// Inserts a user; `None` when the email is already taken.
    pub async fn create_user(&self, user: NewUser) -> ApiResult<Option<Uuid>> {
        validate_email(&user.email)?;
        self.password_policy
            .validate(&user.password)
            .map_err(|err| AuthError::PasswordValidation(err.to_string()))?;

        let password = user.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .or_internal("Erreur interne du serveur")?
            .map_err(AuthError::from)?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO users (email, password_hash, full_name, role, client_type)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (email) DO NOTHING
             RETURNING id",
        )
        .bind(&user.email)
        .bind(&password_hash)
        .bind(&user.full_name)
        .bind(user.role)
        .bind(user.client_type)
        .fetch_optional(&self.db)
        .await
        .or_internal("Erreur lors de la création de l'utilisateur")?;

        Ok(user_id)
    }

    pub async fn get_user_id_by_email(&self, email: &str) -> ApiResult<Option<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .or_internal("Erreur interne du serveur")
    }

    /// Current profile, re-read so edits show without a new login.
    pub async fn session_profile(&self, user_id: Uuid) -> ApiResult<SessionUser> {
        sqlx::query_as::<_, SessionUser>(
            "SELECT id, email, full_name, role, client_type, bio, image, created_at
             FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .or_internal("Erreur interne du serveur")?
        .ok_or_else(|| ApiError::not_found("Utilisateur non trouvé"))
    }

    /// Trainers a learner can write to.
    pub async fn list_trainers(&self) -> ApiResult<Vec<TrainerContact>> {
        sqlx::query_as::<_, TrainerContact>(
            "SELECT id, full_name, image, role, bio
             FROM users
             WHERE role = 'FORMATEUR_ADMIN'
             ORDER BY full_name ASC NULLS LAST",
        )
        .fetch_all(&self.db)
        .await
        .or_internal("Erreur lors de la récupération des formateurs")
    }
}
