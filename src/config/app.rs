use anyhow::{bail, Result};
use std::env;

pub const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Memory,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub folder_prefix: String,
    pub signed_url_ttl_seconds: u64,
    pub max_upload_bytes: usize,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self> {
        let backend = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .to_lowercase()
            .as_str()
        {
            "s3" => StorageBackend::S3,
            "memory" => StorageBackend::Memory,
            other => bail!("unknown STORAGE_BACKEND '{}', expected 's3' or 'memory'", other),
        };

        let bucket = env::var("S3_BUCKET").unwrap_or_default();
        if backend == StorageBackend::S3 && bucket.is_empty() {
            bail!("S3_BUCKET must be set when STORAGE_BACKEND=s3");
        }

        Ok(Self {
            backend,
            bucket,
            folder_prefix: env::var("S3_FOLDER_PREFIX").unwrap_or_default(),
            signed_url_ttl_seconds: parse_var("SIGNED_URL_TTL_SECONDS", 3600),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 500 * 1024 * 1024),
        })
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            bucket: String::new(),
            folder_prefix: String::new(),
            signed_url_ttl_seconds: 3600,
            max_upload_bytes: 500 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub log_level: String,
    pub jwt_secret: String,
    pub access_token_ttl_minutes: i64,
    pub refresh_token_ttl_days: i64,
    /// Account that the admin console refuses to delete.
    pub protected_admin_email: String,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let config = AppConfig {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 3000),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
            access_token_ttl_minutes: parse_var("ACCESS_TOKEN_TTL_MINUTES", 60),
            refresh_token_ttl_days: parse_var("REFRESH_TOKEN_TTL_DAYS", 30),
            protected_admin_email: env::var("PROTECTED_ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@admin.com".to_string()),
            storage: StorageConfig::from_env()?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_production() && self.jwt_secret == DEFAULT_JWT_SECRET {
            bail!("JWT_SECRET must be set in production");
        }
        if self.access_token_ttl_minutes <= 0 || self.refresh_token_ttl_days <= 0 {
            bail!("token lifetimes must be positive");
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: "development".to_string(),
            log_level: "info".to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            access_token_ttl_minutes: 60,
            refresh_token_ttl_days: 30,
            protected_admin_email: "admin@admin.com".to_string(),
            storage: StorageConfig::default(),
        }
    }
}

/// Reads and parses an environment variable, falling back on absence or
/// parse failure.
pub(crate) fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
