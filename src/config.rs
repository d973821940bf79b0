use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// SQLite database connection URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Music gateway base URL
    #[serde(default = "default_catalog_api_url")]
    pub catalog_api_url: String,

    /// Music gateway API key, sent as `X-Api-Key` when set
    #[serde(default)]
    pub catalog_api_key: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Externally reachable base URL, used in verification links
    #[serde(default = "default_public_url")]
    pub public_url: String,

    /// Mail relay endpoint. Verification links are only logged when unset.
    #[serde(default)]
    pub mail_relay_url: Option<String>,

    #[serde(default)]
    pub mail_api_key: Option<String>,

    #[serde(default = "default_mail_from")]
    pub mail_from: String,

    /// Search query behind the generic home feed
    #[serde(default = "default_feed_fallback_query")]
    pub feed_fallback_query: String,

    #[serde(default = "default_feed_popular_title")]
    pub feed_popular_title: String,

    #[serde(default = "default_feed_unavailable_title")]
    pub feed_unavailable_title: String,
}

fn default_database_url() -> String {
    "sqlite://melodeck.db".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_catalog_api_url() -> String {
    "http://localhost:9000".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8022
}

fn default_public_url() -> String {
    "http://localhost:8022".to_string()
}

fn default_mail_from() -> String {
    "no-reply@melodeck.local".to_string()
}

fn default_feed_fallback_query() -> String {
    "Hits Poland Rap Pop".to_string()
}

fn default_feed_popular_title() -> String {
    "🔥 Trending hits in Poland".to_string()
}

fn default_feed_unavailable_title() -> String {
    "Couldn't load trending hits".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the HTTP listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
