use portfolio_backend::{app_router, build_state, config::Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("portfolio_backend=debug,tower_http=debug")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    if config.uses_default_secret() {
        tracing::warn!("SECRET_KEY is not set; using the development default");
    }

    let state = build_state(&config).await?;
    let app = app_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Portfolio backend running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
