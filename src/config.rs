use std::env;
use std::time::Duration;

pub const DEFAULT_SECRET_KEY: &str = "dev-secret-key-change-in-production";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub secret_key: String,
    pub session_ttl: Duration,
    pub market_data_base_url: String,
    pub market_data_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, falling back to defaults
    /// for unset variables.
    pub fn from_vars<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://investment.db".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "5000".to_string())
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("Invalid PORT value"))?;

        let secret_key = lookup("SECRET_KEY")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SECRET_KEY.to_string());

        let session_ttl_secs = lookup("SESSION_TTL_HOURS")
            .unwrap_or_else(|| "168".to_string())
            .parse::<u64>()
            .ok()
            .and_then(|hours| hours.checked_mul(3600))
            .ok_or_else(|| anyhow::anyhow!("Invalid SESSION_TTL_HOURS value"))?;

        let market_data_base_url = lookup("MARKET_DATA_BASE_URL")
            .unwrap_or_else(|| "https://query1.finance.yahoo.com".to_string());

        let timeout_secs = lookup("MARKET_DATA_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("Invalid MARKET_DATA_TIMEOUT_SECS value"))?;

        Ok(Config {
            database_url,
            port,
            secret_key,
            session_ttl: Duration::from_secs(session_ttl_secs),
            market_data_base_url,
            market_data_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}
