use crate::sanitize::{sanitize_language_code, FolderSet};
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub locales_dir: PathBuf,
    pub folders: FolderSet,
    pub template_language: String,

    // Static editor page
    pub static_dir: PathBuf,

    // Server
    pub host: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let folders = match std::env::var("LOCALE_FOLDERS") {
            Ok(raw) => FolderSet::new(
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            )
            .context("LOCALE_FOLDERS is invalid")?,
            Err(_) => FolderSet::default(),
        };

        let template_language = std::env::var("TEMPLATE_LANGUAGE")
            .unwrap_or_else(|_| "en".to_string());
        let template_language = sanitize_language_code(&template_language)
            .context("TEMPLATE_LANGUAGE is invalid")?;

        Ok(Self {
            // Storage
            locales_dir: std::env::var("LOCALES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./locales")),
            folders,
            template_language,

            // Static editor page
            static_dir: std::env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./public")),

            // Server
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10 * 1024 * 1024),
        })
    }

    /// Address to bind the HTTP listener to
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}
