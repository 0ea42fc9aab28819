use crate::auth::SessionManager;
use crate::config::Config;
use crate::database::Database;
use crate::services::market_data::{MarketData, YahooMarketData};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub market_data: Arc<dyn MarketData>,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(pool: SqlitePool, market_data: Arc<dyn MarketData>, sessions: SessionManager) -> Self {
        Self {
            pool,
            market_data,
            sessions: Arc::new(sessions),
        }
    }
}

/// Connects the store, applies migrations and wires the production gateway.
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let db = Database::new(&config.database_url).await?;
    db.migrate().await?;

    let market_data = YahooMarketData::new(&config.market_data_base_url, config.market_data_timeout)?;
    let sessions = SessionManager::new(&config.secret_key, config.session_ttl)?;

    Ok(AppState::new(db.pool().clone(), Arc::new(market_data), sessions))
}
