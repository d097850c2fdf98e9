use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::env;
use config;

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub web: WebConfig,
    // Populated from the .env file
    pub database_path: String,
    pub media_path: String,
    pub allowed_origins: String,
    pub log_level: String,
    pub session_secret_key: String,
    pub admin_url_prefix: String,
    pub use_secure_cookies: bool,
    pub max_upload_size_mb: u64,
}

const DEFAULT_MAX_UPLOAD_SIZE_MB: u64 = 10;

fn required_var(name: &str) -> Result<String, config::ConfigError> {
    env::var(name).map_err(|_| config::ConfigError::Message(format!(
        "FATAL: Environment variable '{}' is not set in your .env file.", name
    )))
}

/// Rejects relative storage paths; the server may be started from any working directory.
pub fn validate_absolute_path(name: &str, value: &str) -> Result<(), config::ConfigError> {
    if Path::new(value).is_relative() {
        return Err(config::ConfigError::Message(format!(
            "FATAL: The '{}' in your .env file is a relative path ('{}'). It MUST be an absolute path.",
            name, value
        )));
    }
    Ok(())
}

/// The session key must be 128 hex characters (64 bytes).
pub fn validate_session_secret(value: &str) -> Result<(), config::ConfigError> {
    if value.len() != 128 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(config::ConfigError::Message(
            "FATAL: 'SESSION_SECRET_KEY' must be 128 hexadecimal characters long (64 bytes).".to_string()
        ));
    }
    Ok(())
}

pub fn validate_admin_prefix(value: &str) -> Result<(), config::ConfigError> {
    if value.is_empty() || !value.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(config::ConfigError::Message(
            "FATAL: 'ADMIN_URL_PREFIX' must not be empty and can only contain letters, numbers, underscores, and hyphens.".to_string()
        ));
    }
    Ok(())
}

/// Converts the upload limit to bytes, rejecting sizes a u64 cannot hold.
pub fn upload_limit_bytes(size_mb: u64) -> Result<u64, config::ConfigError> {
    size_mb.checked_mul(1024 * 1024).ok_or_else(|| config::ConfigError::Message(format!(
        "FATAL: 'MAX_UPLOAD_SIZE_MB' is too large ({}).", size_mb
    )))
}

impl Config {
    pub fn from_env(env_path: &Path) -> Result<Self, config::ConfigError> {
        dotenvy::from_path(env_path)
            .map_err(|e| config::ConfigError::Message(format!(
                "FATAL: Failed to load .env file from '{}'. Error: {}", env_path.display(), e
            )))?;

        let database_path = required_var("DATABASE_PATH")?;
        let media_path = required_var("MEDIA_PATH")?;
        let session_secret_key = required_var("SESSION_SECRET_KEY")?;
        let admin_url_prefix = required_var("ADMIN_URL_PREFIX")?;

        validate_absolute_path("DATABASE_PATH", &database_path)?;
        validate_absolute_path("MEDIA_PATH", &media_path)?;
        validate_session_secret(&session_secret_key)?;
        validate_admin_prefix(&admin_url_prefix)?;

        let allowed_origins = env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "".to_string());
        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let use_secure_cookies = env::var("USE_SECURE_COOKIES")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let max_upload_size_mb = match env::var("MAX_UPLOAD_SIZE_MB") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| config::ConfigError::Message(format!(
                "FATAL: 'MAX_UPLOAD_SIZE_MB' must be a whole number, got '{}'.", raw
            )))?,
            Err(_) => DEFAULT_MAX_UPLOAD_SIZE_MB,
        };
        upload_limit_bytes(max_upload_size_mb)?;

        let builder = config::Config::builder()
            // Base settings (web host/port) come from the TOML file.
            .add_source(config::File::new("config/default.toml", config::FileFormat::Toml))
            .set_override("database_path", database_path)?
            .set_override("media_path", media_path)?
            .set_override("session_secret_key", session_secret_key)?
            .set_override("allowed_origins", allowed_origins)?
            .set_override("log_level", log_level)?
            .set_override("use_secure_cookies", use_secure_cookies)?
            .set_override("admin_url_prefix", admin_url_prefix)?
            .set_override("max_upload_size_mb", max_upload_size_mb as i64)?
            .build()?;

        builder.try_deserialize()
    }

    /// Returns the full path to the site database file inside its own folder.
    pub fn site_db_path(&self) -> PathBuf {
        PathBuf::from(&self.database_path)
            .join("site")
            .join("site.db")
    }

    /// Directory holding uploaded gallery photos. Served publicly under `/media/gallery`.
    pub fn gallery_path(&self) -> PathBuf {
        PathBuf::from(&self.media_path).join("gallery")
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn admin_base_url(&self) -> String {
        format!("/management/{}", self.admin_url_prefix)
    }
}
