use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory for the filesystem media store.
    pub media_dir: String,
    /// Maximum accepted upload size in bytes.
    pub max_upload_size: u64,
}

/// External music search service.
#[derive(Debug, Deserialize, Clone)]
pub struct MusicConfig {
    pub api_base: String,
    pub client_id: String,
}

/// Outbound mail for the anonymous contact form.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MailConfig {
    /// When false, contact messages are logged instead of sent.
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_username: String,
    pub smtp_password: String,
    /// Sender address for relayed messages.
    pub from: String,
    /// Support inbox that receives contact-form messages.
    pub contact_inbox: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub music: MusicConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("storage.media_dir", "./media")?
            .set_default("storage.max_upload_size", 64 * 1024 * 1024)?
            .set_default("music.api_base", "https://api-v2.soundcloud.com")?
            .set_default("music.client_id", "")?
            .set_default("mail.enabled", false)?
            .set_default("mail.smtp_host", "")?
            .set_default("mail.smtp_username", "")?
            .set_default("mail.smtp_password", "")?
            .set_default("mail.from", "")?
            .set_default("mail.contact_inbox", "")?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., TREASURES__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("TREASURES").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
