use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::i18n::LocaleCode;
use crate::security::AdminCredentials;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,

    // Filesystem
    pub data_dir: PathBuf,
    pub photos_dir: PathBuf,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,

    // Database
    pub database_url: String,

    // Admin
    pub admin: AdminCredentials,

    // Locale used when neither the saved preference nor the browser matches
    pub default_locale: LocaleCode,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let data_dir = PathBuf::from(
            std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
        );

        let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            format!("sqlite:{}?mode=rwc", data_dir.join("guestbook.db").display())
        });

        let default_locale = match std::env::var("DEFAULT_LOCALE") {
            Ok(code) => LocaleCode::from_code(&code).context("DEFAULT_LOCALE is not supported")?,
            Err(_) => LocaleCode::fallback(),
        };

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: match std::env::var("PORT") {
                Ok(port) => port.parse().context("PORT must be a valid port number")?,
                Err(_) => 7554,
            },

            photos_dir: PathBuf::from(
                std::env::var("PHOTOS_DIR").unwrap_or_else(|_| "photos".to_string()),
            ),
            static_dir: PathBuf::from(
                std::env::var("STATIC_DIR").unwrap_or_else(|_| "frontend/dist".to_string()),
            ),
            data_dir,
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(bytes) => bytes.parse().context("MAX_UPLOAD_BYTES must be a number")?,
                Err(_) => 32 * 1024 * 1024,
            },

            database_url,

            admin: AdminCredentials::new(
                std::env::var("ADMIN_ID").context("ADMIN_ID not set")?,
                std::env::var("ADMIN_PASSWORD").context("ADMIN_PASSWORD not set")?,
            ),

            default_locale,
        })
    }

    /// Address the HTTP listener binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
