use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Postgres {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct App {
    /// Shared receiving address shown to every user; falls back to the
    /// address generated at registration when unset.
    pub deposit_address: Option<String>,
    pub admin_access_code: String,
    pub min_deposit_in_cents: i64,
    pub require_tx_hash: bool,
    pub auto_confirm_deposits: bool,
    pub session_ttl_minutes: u64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub postgres: Postgres,
    pub server: Server,
    pub app: App,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .build()?;

        config.try_deserialize()
    }
}
