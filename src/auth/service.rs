use chrono::DateTime;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::verify_password;
use crate::auth::{
    AuthError, AuthResponse, ClientType, JwtService, LoginRequest, MessageResponse,
    RefreshTokenRequest, Role, SessionUser, TokenResponse, TokenSubject, TokenType, UserSession,
};

/// Credential row used for login and token refresh.
#[derive(Debug, Clone, sqlx::FromRow)]
struct Account {
    id: Uuid,
    email: String,
    password_hash: String,
    full_name: Option<String>,
    role: Role,
    client_type: Option<ClientType>,
    bio: Option<String>,
    image: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl Account {
    fn subject(&self) -> TokenSubject<'_> {
        TokenSubject {
            user_id: self.id,
            email: &self.email,
            role: self.role,
            client_type: self.client_type,
        }
    }
}

const ACCOUNT_COLUMNS: &str =
    "id, email, password_hash, full_name, role, client_type, bio, image, created_at";

#[derive(Debug, Clone)]
pub struct AuthService {
    jwt_service: JwtService,
    db: PgPool,
}

impl AuthService {
    pub fn new(db: PgPool, jwt_service: JwtService) -> Self {
        Self { jwt_service, db }
    }

    /// Login user
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let email = request.email.trim();
        if email.is_empty() || request.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let account = self
            .get_account_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password = request.password;
        let password_hash = account.password_hash.clone();
        let verified =
            tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
                .await??;
        if !verified {
            return Err(AuthError::InvalidCredentials);
        }

        let (access_token, refresh_token) =
            self.jwt_service.create_token_pair(&account.subject())?;
        self.store_refresh_token(account.id, &refresh_token).await?;

        tracing::info!(user_id = %account.id, role = account.role.as_str(), "user logged in");

        Ok(AuthResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.access_token_expires_in_seconds(),
            user: SessionUser {
                id: account.id,
                email: account.email,
                full_name: account.full_name,
                role: account.role,
                client_type: account.client_type,
                bio: account.bio,
                image: account.image,
                created_at: account.created_at,
            },
        })
    }

    /// Issue a new access token. Role and client type are re-read so that a
    /// role change made by an administrator applies on the next refresh.
    pub async fn refresh_token(
        &self,
        request: RefreshTokenRequest,
    ) -> Result<TokenResponse, AuthError> {
        let claims = self
            .jwt_service
            .validate_token_of_type(&request.refresh_token, TokenType::Refresh)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        if !self
            .is_refresh_token_valid(user_id, &request.refresh_token)
            .await?
        {
            return Err(AuthError::InvalidToken);
        }

        let account = self
            .get_account_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let access_token = self.jwt_service.create_access_token(&account.subject())?;

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.access_token_expires_in_seconds(),
        })
    }

    /// Blacklist the current access token and revoke every refresh token.
    pub async fn logout(&self, session: &UserSession) -> Result<MessageResponse, AuthError> {
        self.blacklist_token(&session.jti, session.expires_at as i64)
            .await?;
        self.revoke_user_refresh_tokens(session.user_id).await?;

        tracing::info!(user_id = %session.user_id, "user logged out");

        Ok(MessageResponse::new("Déconnexion réussie"))
    }

    /// Access-token session. Revoked tokens and tokens of deleted
    /// accounts are rejected.
    pub async fn validate_session(&self, token: &str) -> Result<UserSession, AuthError> {
        let session = self.jwt_service.extract_user_session(token)?;

        let (account_exists, blacklisted) = sqlx::query_as::<_, (bool, bool)>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE id = $1),
                    EXISTS (SELECT 1 FROM token_blacklist WHERE jti = $2 AND expires_at > NOW())",
        )
        .bind(session.user_id)
        .bind(&session.jti)
        .fetch_one(&self.db)
        .await?;

        if !account_exists || blacklisted {
            return Err(AuthError::InvalidToken);
        }

        Ok(session)
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, AuthError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        Ok(account)
    }

    async fn get_account_by_id(&self, user_id: Uuid) -> Result<Option<Account>, AuthError> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(account)
    }

    async fn store_refresh_token(
        &self,
        user_id: Uuid,
        refresh_token: &str,
    ) -> Result<(), AuthError> {
        let claims = self
            .jwt_service
            .validate_token_of_type(refresh_token, TokenType::Refresh)?;
        let expires_at =
            DateTime::from_timestamp(claims.exp as i64, 0).ok_or(AuthError::InvalidToken)?;

        sqlx::query(
            "INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(hash_token(refresh_token))
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn is_refresh_token_valid(
        &self,
        user_id: Uuid,
        refresh_token: &str,
    ) -> Result<bool, AuthError> {
        let result = sqlx::query(
            "SELECT 1 FROM refresh_tokens
             WHERE user_id = $1 AND token_hash = $2 AND expires_at > NOW() AND NOT revoked",
        )
        .bind(user_id)
        .bind(hash_token(refresh_token))
        .fetch_optional(&self.db)
        .await?;

        Ok(result.is_some())
    }

    async fn revoke_user_refresh_tokens(&self, user_id: Uuid) -> Result<(), AuthError> {
        sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    async fn blacklist_token(&self, jti: &str, exp: i64) -> Result<(), AuthError> {
        let expires_at = DateTime::from_timestamp(exp, 0).ok_or(AuthError::InvalidToken)?;

        sqlx::query(
            "INSERT INTO token_blacklist (jti, expires_at) VALUES ($1, $2)
             ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

fn hash_token(token: &str) -> String {
    format!("{:x}", md5::compute(token))
}
