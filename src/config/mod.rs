use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Application configuration structure
///
/// Sources, later ones winning:
/// - built-in defaults
/// - `config.yaml`
/// - `PORTAL_`-prefixed env vars, `__` separating sections
///   (`PORTAL_STORAGE__BUCKET=lectures`)
/// - the legacy deployment variables (`PORT`, `APP_BASE_URL`, `WASABI_*`, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub translate: TranslateConfig,
    pub upload: UploadConfig,
    pub media: MediaConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub version: String,
    pub debug: bool,
    /// Prefix of the canonical watch link encoded in every QR code.
    pub watch_base_url: String,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseProvider {
    Mongo,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub provider: DatabaseProvider,
    pub url: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Gateway,
    Memory,
}

/// Object storage (Wasabi, S3-compatible) reached through an upload gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub gateway_url: String,
    pub bucket: String,
    pub region: String,
    /// Public CDN prefix; when empty, URLs point at the Wasabi endpoint.
    pub cdn_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_file_size: u64,
    pub min_description_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub ffprobe_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// When unset, admin routes are open.
    pub api_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: "lecture-portal".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                debug: true,
                watch_base_url: "http://localhost:8080/watch/".to_string(),
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                provider: DatabaseProvider::Mongo,
                url: "mongodb://localhost:27017".to_string(),
                name: "lecture_portal".to_string(),
            },
            storage: StorageConfig {
                provider: StorageProvider::Gateway,
                gateway_url: "http://localhost:5001".to_string(),
                bucket: "lecture-videos".to_string(),
                region: "us-east-1".to_string(),
                cdn_url: String::new(),
                timeout_secs: 600,
            },
            translate: TranslateConfig {
                api_key: None,
                endpoint: "https://translation.googleapis.com/language/translate/v2".to_string(),
                timeout_secs: 30,
                max_retries: 2,
            },
            upload: UploadConfig {
                max_file_size: 5 * 1024 * 1024 * 1024,
                min_description_chars: 10,
            },
            media: MediaConfig {
                ffprobe_path: "ffprobe".to_string(),
            },
            admin: AdminConfig { api_token: None },
        }
    }
}

impl AppConfig {
    /// Extracts the layered configuration. Runs before logging is set up, so
    /// call [`AppConfig::log_summary`] afterwards.
    pub fn load() -> Result<Self> {
        let config: AppConfig = Self::figment().extract()?;
        Ok(config)
    }

    pub fn log_summary(&self) {
        info!("Configuration loaded successfully");
        info!("name: {:?}", self.app.name);
        info!("Watch links: {}", self.app.watch_base_url);
        info!("Storage: {:?} bucket={} region={}", self.storage.provider, self.storage.bucket, self.storage.region);
        info!("Database: {:?} {}", self.database.provider, self.database.name);
        if self.translate.api_key.is_none() {
            warn!("No translation API key configured, keyword translation will be used");
        }
        if self.admin.api_token.is_none() {
            warn!("No admin token configured, admin routes are unprotected");
        }
    }

    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file("config.yaml"))
            .merge(Env::prefixed("PORTAL_").split("__"))
            .merge(Self::legacy_env())
    }

    /// Variable names used by existing deployments.
    fn legacy_env() -> Env {
        Env::raw()
            .only(&[
                "PORT",
                "APP_BASE_URL",
                "MONGODB_URL",
                "WASABI_BUCKET_NAME",
                "WASABI_REGION",
                "WASABI_CDN_URL",
                "GOOGLE_TRANSLATE_API_KEY",
            ])
            .map(|key| {
                let mapped = match key.as_str().to_ascii_lowercase().as_str() {
                    "port" => "server.port",
                    "app_base_url" => "app.watch_base_url",
                    "mongodb_url" => "database.url",
                    "wasabi_bucket_name" => "storage.bucket",
                    "wasabi_region" => "storage.region",
                    "wasabi_cdn_url" => "storage.cdn_url",
                    "google_translate_api_key" => "translate.api_key",
                    _ => "unused",
                };
                mapped.into()
            })
    }

    /// Canonical, language-independent watch link for a lecture.
    pub fn watch_link(&self, group_id: &str) -> String {
        format!("{}/{}", self.app.watch_base_url.trim_end_matches('/'), group_id)
    }
}
