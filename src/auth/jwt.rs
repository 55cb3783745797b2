use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::{AuthError, Claims, ClientType, Role, TokenType, UserSession};

/// JWT token service for creating and validating tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: Duration,
    refresh_token_expires_in: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .field("access_token_expires_in", &self.access_token_expires_in)
            .field("refresh_token_expires_in", &self.refresh_token_expires_in)
            .finish()
    }
}

/// Identity encoded into every token.
#[derive(Debug, Clone)]
pub struct TokenSubject<'a> {
    pub user_id: Uuid,
    pub email: &'a str,
    pub role: Role,
    pub client_type: Option<ClientType>,
}

impl JwtService {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in: access_ttl,
            refresh_token_expires_in: refresh_ttl,
        }
    }

    pub fn create_access_token(&self, subject: &TokenSubject<'_>) -> Result<String, AuthError> {
        self.sign(subject, self.access_token_expires_in, TokenType::Access)
    }

    pub fn create_refresh_token(&self, subject: &TokenSubject<'_>) -> Result<String, AuthError> {
        self.sign(subject, self.refresh_token_expires_in, TokenType::Refresh)
    }

    fn sign(
        &self,
        subject: &TokenSubject<'_>,
        ttl: Duration,
        typ: TokenType,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + ttl;

        let claims = Claims {
            sub: subject.user_id.to_string(),
            email: subject.email.to_string(),
            role: subject.role,
            client_type: subject.client_type,
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            typ,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }

    /// Validates a token and checks it was issued for `expected` use.
    pub fn validate_token_of_type(
        &self,
        token: &str,
        expected: TokenType,
    ) -> Result<Claims, AuthError> {
        let claims = self.validate_token(token)?;
        if claims.typ != expected {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }

    /// Session carried by an access token. Refresh tokens are rejected.
    pub fn extract_user_session(&self, token: &str) -> Result<UserSession, AuthError> {
        let claims = self.validate_token_of_type(token, TokenType::Access)?;
        UserSession::from_claims(&claims).map_err(|_| AuthError::InvalidToken)
    }

    pub fn access_token_expires_in_seconds(&self) -> usize {
        self.access_token_expires_in.num_seconds() as usize
    }

    /// Create token pair (access + refresh)
    pub fn create_token_pair(
        &self,
        subject: &TokenSubject<'_>,
    ) -> Result<(String, String), AuthError> {
        let access_token = self.create_access_token(subject)?;
        let refresh_token = self.create_refresh_token(subject)?;
        Ok((access_token, refresh_token))
    }
}

/// Extract bearer token from authorization header
pub fn extract_bearer_token(auth_header: &str) -> Result<&str, AuthError> {
    match auth_header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AuthError::InvalidAuthHeaderFormat),
    }
}
